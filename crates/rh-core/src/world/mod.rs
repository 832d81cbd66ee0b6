//! World state and the services that act on it as a whole
//!
//! One [`WorldState`] owns everything that changes while a game runs. It is
//! created at new-game (or restore) time and handed to each operation
//! explicitly; there are no process-wide singletons.

mod actions;
mod end;
mod errors;
mod flags;
mod interface;
mod lock;
mod options;
mod paths;
mod state;
mod store;
mod timeout;
mod topten;
mod turn;

pub use actions::{
    doengrave, dodown, dodrop, doeat, domove, dopickup, doquaff, doup, ActionResult,
};
pub use end::{done_summary, final_score, score_entry, FinalScore};
pub use errors::{Impossible, OutOfBounds};
pub use flags::{phase_of_the_moon, Flags, FULL_MOON, NEW_MOON};
pub use interface::{Interface, Transcript, UiEvent};
pub use lock::{acquire, LockBackend, LockError, LockGuard, LockPolicy};
pub use options::{parse_option, parse_options, OptionsError, OptionsFile, MAX_OPTIONS_LEN};
pub use paths::{default_playground, game_lock_path, lock_name, regularize};
pub use state::{Death, DeathKind, NewGame, WorldState};
#[cfg(test)]
pub(crate) use state::test_world;
pub use store::{goto_level, LevelStore, StoreError};
pub use timeout::{float_down, stoned_dialogue, timeout, Petrification};
pub use topten::{
    getdatestr, list_scores, ordin, outheader, record_score, Insertion, Placement, ScoreEntry,
    ScoreReport, TopTen, TopTenError, ENTRYMAX, PERSMAX, POINTSMIN, RECORD,
};
pub use turn::end_of_turn;
