//! Timed properties (timeout.c)
//!
//! Once per turn every property slot with a running counter is decremented.
//! When a counter reaches zero the slot's callback fires, or the built-in
//! action for that slot runs. Petrification adds a scripted countdown on
//! top of its counter.

use strum::{EnumIter, IntoEnumIterator};
use tracing::warn;

use super::{DeathKind, Impossible, Interface, WorldState};
use crate::dungeon::{read_engr_at, vision};
use crate::player::{PropFlags, Property, SickCause, TimeoutCallback, PROP_COUNT};

/// Stages of turning to stone, keyed by the remaining countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum Petrification {
    Slowing = 5,
    Stiffening = 4,
    StoneLimbs = 3,
    FullStone = 2,
    Statue = 1,
}

impl Petrification {
    pub fn from_countdown(turns: u32) -> Option<Petrification> {
        Petrification::iter().find(|stage| *stage as u32 == turns)
    }

    pub const fn message(self) -> &'static str {
        match self {
            Petrification::Slowing => "You are slowing down.",
            Petrification::Stiffening => "Your limbs are stiffening.",
            Petrification::StoneLimbs => "Your limbs have turned to stone.",
            Petrification::FullStone => "You have turned to stone.",
            Petrification::Statue => "You are a statue.",
        }
    }

    /// Side effects of entering this stage
    fn apply(self, world: &mut WorldState) {
        match self {
            Petrification::Slowing => world.you.props.get_mut(Property::Fast).clear(),
            Petrification::StoneLimbs => world.you.nomul(-3),
            _ => {}
        }
    }
}

/// Narrate the current petrification stage
pub fn stoned_dialogue(world: &mut WorldState, ui: &mut dyn Interface) {
    let turns = world.you.props.get(Property::Stoned).timeout();
    if let Some(stage) = Petrification::from_countdown(turns) {
        ui.pline(stage.message());
        stage.apply(world);
    }
}

/// Advance every property counter by one turn
pub fn timeout(world: &mut WorldState, ui: &mut dyn Interface) -> Result<(), Impossible> {
    if world.you.stoned() {
        stoned_dialogue(world, ui);
    }
    for index in 0..PROP_COUNT {
        let slot = world.you.props.slot_mut(index)?;
        if !slot.tick() {
            continue;
        }
        let prop = Property::from_index(index)?;
        match slot.callback.take() {
            Some(callback) => fire(callback, world, ui),
            None => expire(prop, world, ui),
        }
    }
    Ok(())
}

fn fire(callback: TimeoutCallback, world: &mut WorldState, ui: &mut dyn Interface) {
    match callback {
        TimeoutCallback::FloatDown => float_down(world, ui),
    }
}

/// Built-in action for a counter that ran out without a callback
fn expire(prop: Property, world: &mut WorldState, ui: &mut dyn Interface) {
    match prop {
        Property::Stoned => world.done(DeathKind::Died, "cockatrice"),
        Property::Sick => {
            ui.pline("You die because of food poisoning.");
            let cause = world.you.usick_cause.unwrap_or(SickCause::Generic);
            world.done(DeathKind::Died, cause.describe());
        }
        Property::Fast => ui.pline("You feel yourself slowing down."),
        Property::Confusion => ui.pline("You feel less confused now."),
        Property::Blind => {
            ui.pline("You can see again.");
            vision::setsee(world);
            ui.recompute_vision();
        }
        Property::Invis => {
            let pos = world.you.pos;
            ui.redraw_region(pos, pos);
            ui.pline("You are no longer invisible.");
        }
        Property::WoundedLegs => heal_legs(world, ui),
        Property::Levitation => float_down(world, ui),
        other => warn!(property = %other, "timed out with no expiry action"),
    }
}

fn heal_legs(world: &mut WorldState, ui: &mut dyn Interface) {
    let slot = world.you.props.get_mut(Property::WoundedLegs);
    let both = slot.flags.contains(PropFlags::BOTH_SIDES);
    slot.clear();
    ui.pline(if both {
        "Your legs feel somewhat better."
    } else {
        "Your leg feels somewhat better."
    });
    if world.you.ustr < world.you.ustrmax {
        world.you.ustr += 1;
    }
    ui.status_dirty();
}

/// Levitation ended. A ring may still hold the player up.
pub fn float_down(world: &mut WorldState, ui: &mut dyn Interface) {
    if world.you.levitating() {
        return;
    }
    ui.pline("You float gently to the ground.");
    read_engr_at(&world.level, world.you.pos, ui);
    ui.status_dirty();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::otyp_by_name;
    use crate::world::{test_world, Transcript, UiEvent};

    #[test]
    fn test_blind_expires_with_builtin_action() {
        let mut world = test_world(11);
        world.you.props.get_mut(Property::Blind).set_timeout(1);
        assert!(world.you.blind());
        let mut ui = Transcript::default();
        timeout(&mut world, &mut ui).unwrap();
        assert!(!world.you.blind());
        assert!(ui.said("You can see again."));
        assert!(ui.saw(UiEvent::RecomputeVision));
    }

    #[test]
    fn test_counter_only_fires_once() {
        let mut world = test_world(11);
        world.you.props.get_mut(Property::Confusion).set_timeout(2);
        let mut ui = Transcript::default();
        timeout(&mut world, &mut ui).unwrap();
        assert!(ui.messages.is_empty());
        timeout(&mut world, &mut ui).unwrap();
        timeout(&mut world, &mut ui).unwrap();
        assert_eq!(ui.messages, vec!["You feel less confused now."]);
    }

    #[test]
    fn test_callback_preferred_over_builtin() {
        let mut world = test_world(11);
        let slot = world.you.props.get_mut(Property::Levitation);
        slot.set_timeout(1);
        slot.callback = Some(TimeoutCallback::FloatDown);
        let mut ui = Transcript::default();
        timeout(&mut world, &mut ui).unwrap();
        assert!(ui.said("You float gently to the ground."));
        assert_eq!(world.you.props.get(Property::Levitation).callback, None);
    }

    #[test]
    fn test_ring_keeps_player_afloat() {
        let mut world = test_world(11);
        let slot = world.you.props.get_mut(Property::Levitation);
        slot.flags = PropFlags::LEFT_RING;
        slot.set_timeout(1);
        slot.callback = Some(TimeoutCallback::FloatDown);
        let mut ui = Transcript::default();
        timeout(&mut world, &mut ui).unwrap();
        assert!(world.you.levitating());
        assert!(!ui.said("You float gently to the ground."));
    }

    #[test]
    fn test_sickness_kills_with_cause() {
        let mut world = test_world(11);
        let jackal = otyp_by_name("dead jackal").unwrap();
        world.you.make_sick(SickCause::Object(jackal), 1);
        let mut ui = Transcript::default();
        timeout(&mut world, &mut ui).unwrap();
        let death = world.death.clone().unwrap();
        assert_eq!(death.how, DeathKind::Died);
        assert_eq!(death.killer, "dead jackal");
    }

    #[test]
    fn test_petrification_stages() {
        let mut world = test_world(11);
        world.you.props.get_mut(Property::Fast).flags = PropFlags::INTRINSIC;
        world.you.props.get_mut(Property::Stoned).set_timeout(5);
        let mut ui = Transcript::default();
        for _ in 0..5 {
            assert!(!world.is_over());
            timeout(&mut world, &mut ui).unwrap();
        }
        let stages: Vec<&str> = Petrification::iter().map(Petrification::message).collect();
        assert_eq!(ui.messages, stages);
        assert!(!world.you.fast());
        assert_eq!(world.you.multi, -3);
        let death = world.death.unwrap();
        assert_eq!(death.killer, "cockatrice");
    }

    #[test]
    fn test_ring_slot_without_action_is_ignored() {
        let mut world = test_world(11);
        world.you.props.get_mut(Property::Searching).set_timeout(1);
        let mut ui = Transcript::default();
        timeout(&mut world, &mut ui).unwrap();
        assert!(!world.you.props.has(Property::Searching));
        assert!(!world.is_over());
    }
}
