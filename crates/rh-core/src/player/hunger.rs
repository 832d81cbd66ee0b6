//! Hunger and hit point regeneration (eat.c, allmain.c)

use strum::Display;

use super::Property;
use crate::consts::{HUNGRY_AT, NOT_HUNGRY_AT, SATIATED_AT};
use crate::world::{DeathKind, Interface, WorldState};

/// Hunger status shown on the bottom line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display)]
#[repr(u8)]
pub enum HungerState {
    Satiated = 0,
    #[default]
    #[strum(serialize = "")]
    NotHungry = 1,
    Hungry = 2,
    Weak = 3,
    Fainting = 4,
}

impl HungerState {
    pub const fn from_nutrition(uhunger: i32) -> HungerState {
        if uhunger > SATIATED_AT {
            HungerState::Satiated
        } else if uhunger > NOT_HUNGRY_AT {
            HungerState::NotHungry
        } else if uhunger > HUNGRY_AT {
            HungerState::Hungry
        } else if uhunger > 0 {
            HungerState::Weak
        } else {
            HungerState::Fainting
        }
    }

    pub fn from_u8(value: u8) -> Option<HungerState> {
        Some(match value {
            0 => HungerState::Satiated,
            1 => HungerState::NotHungry,
            2 => HungerState::Hungry,
            3 => HungerState::Weak,
            4 => HungerState::Fainting,
            _ => return None,
        })
    }
}

/// Burn one turn's worth of nutrition
pub fn gethungry(world: &mut WorldState, ui: &mut dyn Interface) {
    world.you.uhunger -= 1;
    newuhs(world, true, ui);
}

/// Recompute the hunger state. `incr` is true when getting hungrier.
pub fn newuhs(world: &mut WorldState, incr: bool, ui: &mut dyn Interface) {
    let you = &mut world.you;
    let newhs = HungerState::from_nutrition(you.uhunger);

    if newhs == HungerState::Fainting {
        if you.uhs <= HungerState::Weak || world.rng.rn2((20 - you.uhunger / 10).max(1) as u32) >= 19 {
            if you.uhs != HungerState::Fainting && you.multi >= 0 {
                ui.pline("You faint from lack of food.");
                you.nomul(-10 + you.uhunger / 10);
                you.nomovemsg = Some("You regain consciousness.".into());
            }
        }
        if you.uhunger < -(200 + 25 * you.ulevel as i32) {
            ui.pline("You die from starvation.");
            world.done(DeathKind::Starved, "starvation");
            return;
        }
    }

    if newhs != you.uhs {
        if newhs >= HungerState::Weak && you.uhs < HungerState::Weak {
            you.ustr -= 1;
        } else if newhs < HungerState::Weak && you.uhs >= HungerState::Weak && you.ustr < you.ustrmax {
            you.ustr += 1;
        }
        match newhs {
            HungerState::Hungry => ui.pline(if !incr {
                "You only feel hungry now."
            } else if you.uhunger < 145 {
                "You feel hungry."
            } else {
                "You are beginning to feel hungry."
            }),
            HungerState::Weak => ui.pline(if !incr {
                "You feel weak now."
            } else if you.uhunger < 45 {
                "You feel weak."
            } else {
                "You are beginning to feel weak."
            }),
            _ => {}
        }
        you.uhs = newhs;
        ui.status_dirty();
    }
}

/// Regain hit points over time
pub fn regenerate(world: &mut WorldState) {
    let regen = world.you.props.has(Property::Regeneration);
    let moves = world.moves;
    let you = &mut world.you;
    if you.uhp >= you.uhpmax {
        return;
    }
    if you.ulevel > 9 {
        if regen || moves % 3 == 0 {
            you.uhp += world.rng.rnd(you.ulevel as u32 - 9) as i32;
        }
    } else {
        let period = (22 - you.ulevel as u64 * 2).max(1);
        if regen || moves % period == 0 {
            you.uhp += 1;
        }
    }
    you.uhp = you.uhp.min(you.uhpmax);
}
