//! The player record and its surrogate fields
//!
//! Three fields of the player refer to something else:
//!
//! * the monster they are stuck to travels as its entity id,
//! * the cause of sickness travels as an object table index, or
//!   [`SICK_NONE`] / [`SICK_GENERIC`],
//! * each property's expiry callback travels as a [`TimeoutCallback`] id,
//!   0 meaning none.
//!
//! [`resolve_surrogates`] checks them against the restored world.

use std::io::{Read, Write};

use super::{RestoreReport, SaveError, SaveReader, SaveWriter};
use crate::entity::EntityId;
use crate::object::OBJECTS;
use crate::player::{HungerState, PropSlot, Property, SickCause, TimeoutCallback, You, PROP_COUNT};
use crate::world::WorldState;

/// Sickness surrogate: not sick
pub const SICK_NONE: u16 = 0xFFFF;
/// Sickness surrogate: cause unknown
pub const SICK_GENERIC: u16 = 0xFFFE;

pub fn write_you<W: Write>(w: &mut SaveWriter<W>, you: &You) -> Result<(), SaveError> {
    w.pos(you.pos)?;
    w.u8(you.ulevel)?;
    w.i32(you.uhp)?;
    w.i32(you.uhpmax)?;
    w.i8(you.ustr)?;
    w.i8(you.ustrmax)?;
    w.i8(you.uac)?;
    w.i64(you.ugold)?;
    w.i64(you.ugold0)?;
    w.i64(you.uexp)?;
    w.i64(you.urexp)?;
    w.i8(you.uluck)?;
    w.i32(you.uhunger)?;
    w.u8(you.uhs as u8)?;
    w.u8(you.utrap)?;
    w.bool(you.uswallow)?;
    w.i32(you.multi)?;
    w.opt_str(you.nomovemsg.as_deref())?;
    for (_, slot) in you.props.iter() {
        w.u32(slot.to_word())?;
        w.u8(slot.callback.map_or(0, TimeoutCallback::id))?;
    }
    w.u16(match you.usick_cause {
        None => SICK_NONE,
        Some(SickCause::Generic) => SICK_GENERIC,
        Some(SickCause::Object(otyp)) => otyp,
    })?;
    w.bool(you.ustuck.is_some())?;
    w.id(you.ustuck.unwrap_or(EntityId::NONE))
}

pub fn read_you<R: Read>(
    r: &mut SaveReader<R>,
    you: &mut You,
    report: &mut RestoreReport,
) -> Result<(), SaveError> {
    you.pos = r.pos()?;
    you.ulevel = r.u8()?;
    you.uhp = r.i32()?;
    you.uhpmax = r.i32()?;
    you.ustr = r.i8()?;
    you.ustrmax = r.i8()?;
    you.uac = r.i8()?;
    you.ugold = r.i64()?;
    you.ugold0 = r.i64()?;
    you.uexp = r.i64()?;
    you.urexp = r.i64()?;
    you.uluck = r.i8()?;
    you.uhunger = r.i32()?;
    let uhs = r.u8()?;
    you.uhs = HungerState::from_u8(uhs)
        .ok_or_else(|| SaveError::Corrupted(format!("hunger state {uhs}")))?;
    you.utrap = r.u8()?;
    you.uswallow = r.bool()?;
    you.multi = r.i32()?;
    you.nomovemsg = r.opt_str()?;

    for index in 0..PROP_COUNT {
        let word = r.u32()?;
        let callback_id = r.u8()?;
        let mut slot = PropSlot::from_word(word);
        slot.callback = match callback_id {
            0 => None,
            id => {
                let callback = TimeoutCallback::from_id(id);
                if callback.is_none() {
                    report.note(format!(
                        "{}: unknown timeout callback {id}, dropped",
                        Property::from_index(index)?
                    ));
                }
                callback
            }
        };
        *you.props.slot_mut(index)? = slot;
    }

    you.usick_cause = match r.u16()? {
        SICK_NONE => None,
        SICK_GENERIC => Some(SickCause::Generic),
        otyp if (otyp as usize) < OBJECTS.len() => Some(SickCause::Object(otyp)),
        otyp => {
            report.note(format!("sickness cause {otyp} out of range, using generic cause"));
            Some(SickCause::Generic)
        }
    };

    let stuck = r.bool()?;
    let id = r.id()?;
    you.ustuck = stuck.then_some(id);
    Ok(())
}

/// Re-resolve id references and make flags agree with their surrogates
pub fn resolve_surrogates(world: &mut WorldState, report: &mut RestoreReport) {
    if let Some(id) = world.you.ustuck {
        if !world.level.monsters.contains(id) {
            report.note(format!("stuck to monster {id}, which is not on this level"));
            world.you.ustuck = None;
            world.you.uswallow = false;
        }
    }
    if world.you.uswallow && world.you.ustuck.is_none() {
        report.note("swallowed without a swallower");
        world.you.uswallow = false;
    }

    let sick = world.you.props.get(Property::Sick).is_active();
    match (sick, world.you.usick_cause) {
        (true, None) => {
            report.note("sick without a recorded cause");
            world.you.usick_cause = Some(SickCause::Generic);
        }
        (false, Some(_)) => world.you.usick_cause = None,
        _ => {}
    }
}
