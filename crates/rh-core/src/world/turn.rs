//! The per-turn sequence (allmain.c)

use super::{timeout, Impossible, Interface, WorldState};
use crate::monster::{movemon, MonsterAi};
use crate::player::{gethungry, regenerate};

/// Everything that happens after the player acts, in a fixed order:
/// monsters move, timeouts tick, hunger and regeneration are applied, then
/// a helpless player recovers one turn and the status line is refreshed.
pub fn end_of_turn(
    world: &mut WorldState,
    ai: &mut dyn MonsterAi,
    ui: &mut dyn Interface,
) -> Result<(), Impossible> {
    movemon(world, ai, ui);
    if world.is_over() {
        return Ok(());
    }
    timeout(world, ui)?;
    if world.is_over() {
        return Ok(());
    }
    gethungry(world, ui);
    if world.is_over() {
        return Ok(());
    }
    regenerate(world);
    unmul(world, ui);
    ui.status_dirty();
    world.moves += 1;
    Ok(())
}

/// One turn of helplessness wears off
fn unmul(world: &mut WorldState, ui: &mut dyn Interface) {
    let you = &mut world.you;
    if you.multi >= 0 {
        return;
    }
    you.multi += 1;
    if you.multi == 0 {
        let msg = you
            .nomovemsg
            .take()
            .unwrap_or_else(|| "You can move again.".to_string());
        ui.pline(&msg);
    }
}
