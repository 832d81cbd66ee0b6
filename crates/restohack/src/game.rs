//! Command dispatch and the turn loop (cmd.c, allmain.c)

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use rh_core::dungeon::SimpleGenerator;
use rh_core::entity::EntityId;
use rh_core::monster::Wanderer;
use rh_core::object::ObjectClass;
use rh_core::world::{
    doengrave, dodown, dodrop, doeat, domove, dopickup, doquaff, done_summary, doup, end_of_turn,
    goto_level, record_score, score_entry, ActionResult, DeathKind, Interface, LevelStore,
    LockBackend, NewGame, StoreError,
};
use rh_core::WorldState;
use rh_save::{dosave, emergency_save, SavePaths};

use crate::tty::{direction_of, Tty};
use crate::RunError;

/// One keystroke command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(i32, i32),
    Pickup,
    Drop,
    Eat,
    Quaff,
    Engrave,
    Up,
    Down,
    Inventory,
    Rest,
    Redraw,
    Save,
    Quit,
    Help,
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let key = line.trim().chars().next()?;
        if let Some((dx, dy)) = direction_of(key) {
            return Some(Command::Move(dx, dy));
        }
        Some(match key {
            ',' => Command::Pickup,
            'd' => Command::Drop,
            'e' => Command::Eat,
            'q' => Command::Quaff,
            'E' => Command::Engrave,
            '<' => Command::Up,
            '>' => Command::Down,
            'i' => Command::Inventory,
            's' | '.' => Command::Rest,
            '\u{12}' | 'r' => Command::Redraw,
            'S' => Command::Save,
            'Q' => Command::Quit,
            '?' => Command::Help,
            _ => return None,
        })
    }
}

const HELP: &[&str] = &[
    "y k u   move one step; h j k l y u b n",
    " \\|/    , pick up     d drop      e eat      q quaff",
    "h-.-l   E engrave     < up        > down     i inventory",
    " /|\\    s rest        r redraw    S save     Q quit",
    "b j n",
];

/// Inventory letter of the `index`th item
pub fn invlet(index: usize) -> char {
    const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    LETTERS.get(index).map_or('#', |&b| b as char)
}

/// Start a fresh game. Level files left by a session that never saved
/// belong to no game any more and are removed first.
pub fn begin_new_game<R: BufRead, W: Write>(
    setup: NewGame,
    store: &LevelStore,
    tty: &mut Tty<R, W>,
) -> Result<WorldState, RunError> {
    let stale = store.stored_levels();
    if !stale.is_empty() {
        warn!(levels = ?stale, "removing level files of an unfinished game");
    }
    store.purge()?;
    Ok(WorldState::new_game(setup, &mut SimpleGenerator, tty)?)
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Finished,
    Saved,
    HungUp,
}

pub struct Session<R: BufRead, W: Write> {
    pub world: WorldState,
    pub store: LevelStore,
    pub paths: SavePaths,
    pub tty: Tty<R, W>,
    pub backend: LockBackend,
    pub hangup: Arc<AtomicBool>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn playground(&self) -> PathBuf {
        self.paths.playground().to_path_buf()
    }

    /// Play until the game ends, is saved or the terminal goes away
    pub fn run(&mut self) -> Result<Ending, RunError> {
        loop {
            if self.hangup.load(Ordering::SeqCst) || self.tty.at_eof() {
                return Ok(self.hang_up());
            }
            if self.world.is_over() {
                self.finish()?;
                return Ok(Ending::Finished);
            }
            if self.world.you.multi < 0 {
                end_of_turn(&mut self.world, &mut Wanderer, &mut self.tty)?;
                continue;
            }

            self.tty.refresh(&self.world);
            let Some(line) = self.tty.read_raw("> ") else {
                continue;
            };
            let Some(cmd) = Command::parse(&line) else {
                if !line.trim().is_empty() {
                    self.tty.pline("Unknown command.");
                }
                continue;
            };
            debug!(?cmd, moves = self.world.moves, "command");
            match cmd {
                Command::Save => match dosave(&self.world, &self.store, &self.paths, &mut self.tty) {
                    Ok(()) => return Ok(Ending::Saved),
                    Err(e) => {
                        warn!("save failed: {e}");
                        self.tty.pline(&format!("Cannot save the game: {e}"));
                        self.tty.pline("Play continues; try again later.");
                    }
                },
                Command::Quit => self.confirm_quit(),
                cmd => {
                    let result = self.execute(cmd)?;
                    self.after(result)?;
                }
            }
        }
    }

    fn execute(&mut self, cmd: Command) -> Result<ActionResult, RunError> {
        let result = match cmd {
            Command::Move(dx, dy) => domove(&mut self.world, &mut self.tty, dx, dy)?,
            Command::Pickup => dopickup(&mut self.world, &mut self.tty)?,
            Command::Drop => match self.pick_item("drop", None) {
                Some(id) => dodrop(&mut self.world, &mut self.tty, id)?,
                None => ActionResult::NoTime,
            },
            Command::Eat => match self.pick_item("eat", Some(ObjectClass::Food)) {
                Some(id) => doeat(&mut self.world, &mut self.tty, id)?,
                None => ActionResult::NoTime,
            },
            Command::Quaff => match self.pick_item("drink", Some(ObjectClass::Potion)) {
                Some(id) => doquaff(&mut self.world, &mut self.tty, id)?,
                None => ActionResult::NoTime,
            },
            Command::Engrave => doengrave(&mut self.world, &mut self.tty)?,
            Command::Up => doup(&mut self.world, &mut self.tty)?,
            Command::Down => dodown(&mut self.world, &mut self.tty)?,
            Command::Inventory => {
                self.show_inventory();
                ActionResult::NoTime
            }
            Command::Rest => ActionResult::TookTime,
            Command::Redraw => {
                self.tty.redraw_screen();
                self.tty.status_dirty();
                ActionResult::NoTime
            }
            Command::Help => {
                for line in HELP {
                    self.tty.print(line);
                }
                ActionResult::NoTime
            }
            Command::Save | Command::Quit => ActionResult::NoTime,
        };
        Ok(result)
    }

    fn after(&mut self, result: ActionResult) -> Result<(), RunError> {
        match result {
            ActionResult::NoTime => return Ok(()),
            ActionResult::TookTime => {}
            ActionResult::ChangeLevel { to, at_stairs } => {
                match goto_level(
                    &mut self.world,
                    &self.store,
                    &mut SimpleGenerator,
                    &mut self.tty,
                    to,
                    at_stairs,
                ) {
                    Ok(()) => {}
                    Err(StoreError::LevelOutOfRange(n)) => {
                        warn!(level = n, "refused level change");
                        self.tty.pline("You feel a strange vibration under your feet.");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        if !self.world.is_over() {
            end_of_turn(&mut self.world, &mut Wanderer, &mut self.tty)?;
        }
        Ok(())
    }

    fn letters(&self, class: Option<ObjectClass>) -> Vec<(char, EntityId)> {
        self.world
            .invent
            .iter()
            .enumerate()
            .filter(|(_, o)| class.is_none_or(|c| o.class == c))
            .map(|(i, o)| (invlet(i), o.id))
            .collect()
    }

    fn pick_item(&mut self, verb: &str, class: Option<ObjectClass>) -> Option<EntityId> {
        let choices = self.letters(class);
        if choices.is_empty() {
            self.tty.pline(&format!("You don't have anything to {verb}."));
            return None;
        }
        let letters: String = choices.iter().map(|(c, _)| *c).collect();
        let answer = self
            .tty
            .read_raw(&format!("What do you want to {verb}? [{letters}] "))?;
        let key = answer.trim().chars().next()?;
        let found = choices.iter().find(|(c, _)| *c == key).map(|(_, id)| *id);
        if found.is_none() {
            self.tty.pline("You don't have that object.");
        }
        found
    }

    fn show_inventory(&mut self) {
        if self.world.invent.is_empty() {
            self.tty.pline("You are empty handed.");
            return;
        }
        let lines: Vec<String> = self
            .world
            .invent
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let mut line = format!("{} - {}", invlet(i), o.xname());
                if !o.worn.is_empty() {
                    line.push_str(if o.class == ObjectClass::Weapon {
                        " (weapon in hand)"
                    } else {
                        " (being worn)"
                    });
                }
                line
            })
            .collect();
        for line in lines {
            self.tty.print(&line);
        }
    }

    fn confirm_quit(&mut self) {
        let answer = self.tty.read_raw("Really quit? ");
        if answer.is_some_and(|a| a.trim_start().starts_with(['y', 'Y'])) {
            self.world.done(DeathKind::Quit, "");
        }
    }

    fn hang_up(&mut self) -> Ending {
        info!("hangup, saving the game");
        if !emergency_save(&self.world, &self.store, &self.paths) {
            warn!("game could not be saved on hangup");
        }
        Ending::HungUp
    }

    /// Settle the score and clear the game's files
    fn finish(&mut self) -> Result<(), RunError> {
        self.tty.refresh(&self.world);
        for line in done_summary(&mut self.world) {
            self.tty.print(&line);
        }
        let entry = score_entry(&self.world, chrono::Local::now().date_naive());
        match record_score(&self.playground(), entry, self.backend, &self.world.flags) {
            Ok(report) => {
                for line in report.lines {
                    self.tty.print(&line);
                }
            }
            Err(e) => self.tty.print(&e.to_string()),
        }
        self.store.purge()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rh_core::world::{NewGame, Transcript};

    #[test]
    fn test_command_keys() {
        assert_eq!(Command::parse("l"), Some(Command::Move(1, 0)));
        assert_eq!(Command::parse("  >"), Some(Command::Down));
        assert_eq!(Command::parse("E"), Some(Command::Engrave));
        assert_eq!(Command::parse("S"), Some(Command::Save));
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("Z"), None);
    }

    #[test]
    fn test_invlet() {
        assert_eq!(invlet(0), 'a');
        assert_eq!(invlet(26), 'A');
        assert_eq!(invlet(60), '#');
    }

    fn session(dir: &std::path::Path, input: &'static str) -> Session<&'static [u8], Vec<u8>> {
        let mut setup = NewGame::new("tester", 1000);
        setup.seed = Some(17);
        setup.date = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let world =
            WorldState::new_game(setup, &mut SimpleGenerator, &mut Transcript::default()).unwrap();
        let paths = SavePaths::new(dir, 1000, "tester");
        Session {
            world,
            store: paths.level_store(),
            paths,
            tty: Tty::new(input.as_bytes(), Vec::new()),
            backend: LockBackend::Flock,
            hangup: Arc::new(AtomicBool::new(false)),
        }
    }

    #[test]
    fn test_quit_records_score() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path(), "i\nQ\ny\n");
        assert_eq!(s.run().unwrap(), Ending::Finished);
        let out = String::from_utf8(s.tty.into_output()).unwrap();
        assert!(out.contains("a - a food ration"));
        assert!(out.contains("Goodbye Fighter tester..."));
        assert!(out.contains("You quit on dungeon level 1"));
        assert!(dir.path().join("record").is_file());
    }

    #[test]
    fn test_end_of_input_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path(), "s\n");
        assert_eq!(s.run().unwrap(), Ending::HungUp);
        assert!(s.paths.exists());
    }

    #[test]
    fn test_failed_save_keeps_playing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("save"), b"not a directory").unwrap();
        let mut s = session(dir.path(), "S\nQ\ny\n");
        assert_eq!(s.run().unwrap(), Ending::Finished);
        assert!(!s.paths.exists());
        let out = String::from_utf8(s.tty.into_output()).unwrap();
        assert!(out.contains("Cannot save the game:"));
        assert!(out.contains("You quit on dungeon level 1"));
    }

    #[test]
    fn test_new_game_discards_unsaved_levels() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SavePaths::new(dir.path(), 1000, "tester");
        let store = paths.level_store();

        let mut crashed = session(dir.path(), "").world;
        let mut ui = Transcript::default();
        for n in [2, 3] {
            goto_level(&mut crashed, &store, &mut SimpleGenerator, &mut ui, n, true).unwrap();
        }
        assert_eq!(store.stored_levels(), vec![1, 2]);
        drop(crashed);

        let mut setup = NewGame::new("tester", 1000);
        setup.seed = Some(99);
        setup.date = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let mut tty = Tty::new(&b""[..], Vec::new());
        let mut world = begin_new_game(setup, &store, &mut tty).unwrap();
        assert!(store.stored_levels().is_empty());

        goto_level(&mut world, &store, &mut SimpleGenerator, &mut ui, 2, true).unwrap();
        assert_eq!(store.stored_levels(), vec![1]);
        world.check_integrity().unwrap();
    }

    #[test]
    fn test_save_command() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path(), "S\n");
        assert_eq!(s.run().unwrap(), Ending::Saved);
        assert!(s.paths.exists());
    }
}
