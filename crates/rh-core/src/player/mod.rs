//! The player (you.h)

mod hunger;
mod properties;

pub use hunger::{gethungry, newuhs, regenerate, HungerState};
pub use properties::{
    PropFlags, PropSlot, Properties, Property, TimeoutCallback, PROP_COUNT, TIMEOUT,
};

use crate::consts::INITIAL_NUTRITION;
use crate::dungeon::Pos;
use crate::entity::EntityId;
use crate::object::def;
use crate::rng::GameRng;

/// What made the player sick.
///
/// Either a specific object type (the usual case: something they ate) or a
/// generic cause used when the original is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SickCause {
    Object(u16),
    Generic,
}

impl SickCause {
    pub fn describe(&self) -> &'static str {
        match self {
            SickCause::Object(otyp) => def(*otyp).name,
            SickCause::Generic => "contaminated meal",
        }
    }
}

/// Player state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct You {
    pub pos: Pos,
    pub ulevel: u8,
    pub uhp: i32,
    pub uhpmax: i32,
    pub ustr: i8,
    pub ustrmax: i8,
    pub uac: i8,
    pub ugold: i64,
    /// Gold carried at the start of the game
    pub ugold0: i64,
    pub uexp: i64,
    /// Score
    pub urexp: i64,
    pub uluck: i8,
    pub uhunger: i32,
    pub uhs: HungerState,
    /// Turns left stuck in a trap
    pub utrap: u8,
    pub uswallow: bool,
    /// Negative while helpless, positive while repeating a command
    pub multi: i32,
    /// Printed when a helpless spell ends
    pub nomovemsg: Option<String>,
    pub props: Properties,
    pub usick_cause: Option<SickCause>,
    /// Monster the player is stuck to, by id
    pub ustuck: Option<EntityId>,
}

impl You {
    pub fn new(pos: Pos, rng: &mut GameRng) -> Self {
        let hp = 12 + rng.rnd(4) as i32;
        Self {
            pos,
            ulevel: 1,
            uhp: hp,
            uhpmax: hp,
            ustr: 16,
            ustrmax: 16,
            uac: 7,
            ugold: 0,
            ugold0: 0,
            uexp: 0,
            urexp: 0,
            uluck: 0,
            uhunger: INITIAL_NUTRITION,
            uhs: HungerState::NotHungry,
            utrap: 0,
            uswallow: false,
            multi: 0,
            nomovemsg: None,
            props: Properties::default(),
            usick_cause: None,
            ustuck: None,
        }
    }

    pub fn blind(&self) -> bool {
        self.props.has(Property::Blind)
    }

    pub fn levitating(&self) -> bool {
        self.props.has(Property::Levitation)
    }

    pub fn fast(&self) -> bool {
        self.props.has(Property::Fast)
    }

    pub fn confused(&self) -> bool {
        self.props.has(Property::Confusion)
    }

    pub fn invisible(&self) -> bool {
        self.props.has(Property::Invis)
    }

    pub fn sick(&self) -> bool {
        self.props.has(Property::Sick)
    }

    pub fn stoned(&self) -> bool {
        self.props.get(Property::Stoned).timeout() > 0
    }

    /// Become helpless (negative) or repeat a command (positive) for `n` turns.
    /// An ongoing helpless spell is not shortened.
    pub fn nomul(&mut self, n: i32) {
        if self.multi < 0 {
            return;
        }
        self.multi = n;
    }

    /// Fall ill from `cause`, dying after `turns` unless cured
    pub fn make_sick(&mut self, cause: SickCause, turns: u32) {
        let slot = self.props.get_mut(Property::Sick);
        if slot.timeout() == 0 || slot.timeout() > turns {
            slot.set_timeout(turns);
        }
        self.usick_cause = Some(cause);
    }

    pub fn cure_sickness(&mut self) {
        self.props.get_mut(Property::Sick).clear();
        self.usick_cause = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::otyp_by_name;

    fn you() -> You {
        You::new(Pos::checked(1, 1).unwrap(), &mut GameRng::new(1))
    }

    #[test]
    fn test_nomul_does_not_shorten_helplessness() {
        let mut u = you();
        u.nomul(-3);
        u.nomul(-1);
        assert_eq!(u.multi, -3);
    }

    #[test]
    fn test_sickness_cause_tracks_flag() {
        let mut u = you();
        let lizard = otyp_by_name("dead lizard").unwrap();
        u.make_sick(SickCause::Object(lizard), 20);
        assert!(u.sick());
        assert_eq!(u.usick_cause.unwrap().describe(), "dead lizard");
        u.cure_sickness();
        assert!(!u.sick());
        assert_eq!(u.usick_cause, None);
    }
}
