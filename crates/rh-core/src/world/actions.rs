//! Player commands that change the world (hack.c, do.c, engrave.c, potion.c, eat.c)
//!
//! Each command reports whether it used up the player's move. Level changes
//! are returned to the caller, which owns the level store.

use tracing::debug;

use super::{DeathKind, Impossible, Interface, WorldState};
use crate::consts::{BUFSZ, MAXLEVEL};
use crate::dungeon::{
    del_engr, engr_at, make_engr_at, read_engr_at, u_wipe_engr, vision, EngravingKind, Pos,
    TrapKind,
};
use crate::entity::{relink, EntityId};
use crate::monster::{cutworm, MonsterFlags};
use crate::object::{otyp_by_name, ObjectClass, WornMask};
use crate::player::{newuhs, Property, SickCause, TimeoutCallback};

/// Texts longer than this take more than one move to write
const QUICK_WRITE_LEN: usize = 15;

/// Outcome of a player command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    /// The command did nothing; the move is not used up
    NoTime,
    TookTime,
    /// The player leaves for another level
    ChangeLevel { to: i32, at_stairs: bool },
}

impl ActionResult {
    pub fn took_time(self) -> bool {
        self != ActionResult::NoTime
    }
}

fn plur(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn wielded_otyp(world: &WorldState) -> Option<u16> {
    world
        .invent
        .iter()
        .find(|o| o.worn.contains(WornMask::WEAPON))
        .map(|o| o.otyp)
}

/// Step or attack in direction `(dx, dy)`
pub fn domove(
    world: &mut WorldState,
    ui: &mut dyn Interface,
    dx: i32,
    dy: i32,
) -> Result<ActionResult, Impossible> {
    let (dx, dy) = if world.you.confused() {
        let dx = world.rng.rn2(3) as i32 - 1;
        let dy = world.rng.rn2(3) as i32 - 1;
        (dx, dy)
    } else {
        (dx, dy)
    };
    if dx == 0 && dy == 0 {
        return Ok(ActionResult::NoTime);
    }
    let Ok(target) = world.you.pos.offset(dx, dy) else {
        return Ok(ActionResult::NoTime);
    };

    if let Some(stuck) = world.stuck_monster() {
        if stuck.pos != target {
            let name = stuck.monnam();
            if world.rng.rn2(8) == 0 {
                ui.pline(&format!("You pull free from {name}."));
                world.you.ustuck = None;
                world.you.uswallow = false;
            } else {
                ui.pline(&format!("You cannot escape from {name}!"));
                world.you.nomul(0);
                return Ok(ActionResult::TookTime);
            }
        }
    }

    if world.you.utrap > 0 {
        world.you.utrap -= 1;
        let what = match world.level.trap_at(world.you.pos).map(|t| t.kind) {
            Some(TrapKind::Pit) => "You are still in a pit.",
            _ => "You are caught in a bear trap.",
        };
        ui.pline(what);
        return Ok(ActionResult::TookTime);
    }

    if let Some(id) = world.level.occupant(target) {
        return attack(world, ui, id, target);
    }
    let typ = world.level.cell(target).typ;
    if !(typ.is_accessible() || typ.is_pool()) {
        world.flags.moved = false;
        return Ok(ActionResult::NoTime);
    }

    let from = world.you.pos;
    let wipe = world.rng.rnd(5);
    u_wipe_engr(world, wipe)?;
    world.you.pos = target;
    ui.redraw_region(from, target);
    vision::setsee(world);

    if typ.is_pool() && !world.you.levitating() {
        drown(world, ui);
        return Ok(ActionResult::TookTime);
    }
    if let Some(result) = spoteffects(world, ui)? {
        return Ok(result);
    }
    read_engr_at(&world.level, world.you.pos, ui);
    pickup_gold(world, ui)?;
    if let Some(obj) = world.level.object_at(world.you.pos) {
        ui.pline(&format!("You see here {}.", obj.xname()));
    }
    Ok(ActionResult::TookTime)
}

/// Crawl out to a dry neighbour or drown
fn drown(world: &mut WorldState, ui: &mut dyn Interface) {
    ui.pline("You fall into the water!");
    ui.pline("You try to crawl out of the water.");
    let level = &world.level;
    let dry: Vec<Pos> = world
        .you
        .pos
        .neighbors()
        .filter(|&p| {
            level.is_accessible(p) && !level.cell(p).typ.is_pool() && level.occupant(p).is_none()
        })
        .collect();
    match world.rng.choose(&dry).copied() {
        Some(pos) => {
            world.you.pos = pos;
            ui.pline("Pheew!  That was close.");
            vision::setsee(world);
        }
        None => {
            ui.pline("You drown.");
            world.done(DeathKind::Drowned, "");
        }
    }
}

/// Trigger a trap under the player
fn spoteffects(
    world: &mut WorldState,
    ui: &mut dyn Interface,
) -> Result<Option<ActionResult>, Impossible> {
    let pos = world.you.pos;
    let Some(trap) = world.level.traps.at_mut(pos) else {
        return Ok(None);
    };
    trap.seen = true;
    let kind = trap.kind;
    debug!(%kind, %pos, "trap triggered");

    let hurt = |world: &mut WorldState, dmg: u32, killer: &str| {
        world.you.uhp -= dmg as i32;
        if world.you.uhp < 1 {
            world.done(DeathKind::Died, killer);
        }
    };
    match kind {
        TrapKind::BearTrap => {
            world.you.utrap = world.rng.rn1(4, 4) as u8;
            ui.pline("A bear trap closes on your foot!");
        }
        TrapKind::ArrowTrap => {
            ui.pline("An arrow shoots out at you!");
            let dmg = world.rng.d(1, 6);
            hurt(world, dmg, "arrow");
        }
        TrapKind::DartTrap => {
            ui.pline("A little dart shoots out at you!");
            let dmg = world.rng.d(1, 3);
            hurt(world, dmg, "little dart");
        }
        TrapKind::TrapDoor => {
            if world.you.levitating() || world.dlevel >= MAXLEVEL {
                ui.pline("A trap door opens, but you don't fall through.");
            } else {
                ui.pline("A trap door opens up under you!");
                return Ok(Some(ActionResult::ChangeLevel {
                    to: world.dlevel as i32 + 1,
                    at_stairs: false,
                }));
            }
        }
        TrapKind::TeleportTrap => {
            ui.pline("You feel a wrenching sensation.");
            if let Some(to) = world.level.random_free_room_pos(&mut world.rng) {
                let from = world.you.pos;
                world.you.pos = to;
                ui.redraw_region(from, to);
                vision::setsee(world);
            }
        }
        TrapKind::Pit => {
            if world.you.levitating() {
                ui.pline("A pit opens up under you!");
                ui.pline("You don't fall in!");
            } else {
                ui.pline("You fall into a pit!");
                world.you.utrap = world.rng.rn1(6, 2) as u8;
                let dmg = world.rng.rnd(6);
                hurt(world, dmg, "pit");
            }
        }
        TrapKind::SleepingGasTrap => {
            ui.pline("A cloud of gas puts you to sleep!");
            let turns = world.rng.rnd(25) as i32;
            world.you.nomul(-turns);
            world.you.nomovemsg = Some("You wake up.".to_string());
        }
    }
    ui.status_dirty();
    Ok(None)
}

fn attack(
    world: &mut WorldState,
    ui: &mut dyn Interface,
    id: EntityId,
    target: Pos,
) -> Result<ActionResult, Impossible> {
    let Some(mon) = world.level.monsters.get(id) else {
        return Ok(ActionResult::NoTime);
    };
    if mon.pos == target && mon.is_tame() {
        let name = mon.monnam();
        let from = world.you.pos;
        if let Some(pet) = world.level.monsters.get_mut(id) {
            pet.pos = from;
        }
        world.you.pos = target;
        ui.pline(&format!("You swap places with {name}."));
        ui.redraw_region(from, target);
        vision::setsee(world);
        return Ok(ActionResult::TookTime);
    }

    let weapon = wielded_otyp(world);
    if mon.pos != target {
        let good = weapon.is_some_and(|otyp| {
            otyp_by_name("long sword") == Some(otyp) || otyp_by_name("axe") == Some(otyp)
        });
        cutworm(
            &mut world.level,
            &mut world.ids,
            &mut world.rng,
            id,
            target,
            good,
            ui,
        )?;
        return Ok(ActionResult::TookTime);
    }

    let name = mon.monnam();
    let to_hit = 10 + world.you.ulevel as i32 + world.you.uluck as i32;
    if (world.rng.rnd(20) as i32) >= to_hit {
        ui.pline(&format!("You miss {name}."));
        if let Some(mon) = world.level.monsters.get_mut(id) {
            mon.flags.remove(MonsterFlags::SLEEPING);
        }
        return Ok(ActionResult::TookTime);
    }
    let dmg = world.rng.rnd(if weapon.is_some() { 4 } else { 2 }) as i32;
    let Some(mon) = world.level.monsters.get_mut(id) else {
        return Ok(ActionResult::TookTime);
    };
    mon.hp -= dmg;
    mon.flags.remove(MonsterFlags::SLEEPING);
    if mon.hp > 0 {
        ui.pline(&format!("You hit {name}."));
        return Ok(ActionResult::TookTime);
    }

    ui.pline(&format!("You kill {name}!"));
    let mut dead = world.remove_monster(id)?;
    let drops: Vec<EntityId> = dead.inventory.ids().collect();
    for oid in drops {
        if let Some(obj) = dead.inventory.get_mut(oid) {
            obj.pos = Some(target);
        }
        relink(&mut dead.inventory, &mut world.level.objects, oid)?;
    }
    world.you.uexp += dead.data().level as i64 + 1;
    world.you.urexp += 4 * (dead.data().level as i64 + 1);
    ui.redraw_region(target, target);
    ui.status_dirty();
    Ok(ActionResult::TookTime)
}

fn pickup_gold(world: &mut WorldState, ui: &mut dyn Interface) -> Result<bool, Impossible> {
    let Some(pile) = world.level.gold_at(world.you.pos) else {
        return Ok(false);
    };
    let (id, amount) = (pile.id, pile.amount);
    world.level.gold.unlink(id)?;
    world.you.ugold += amount;
    ui.pline(&format!("{amount} gold piece{}.", plur(amount)));
    ui.status_dirty();
    Ok(true)
}

/// Pick up everything on the player's square
pub fn dopickup(
    world: &mut WorldState,
    ui: &mut dyn Interface,
) -> Result<ActionResult, Impossible> {
    if world.you.uswallow {
        ui.pline("You pick up the contents of the stomach... not!");
        return Ok(ActionResult::NoTime);
    }
    if world.you.levitating() {
        ui.pline("You cannot reach the floor.");
        return Ok(ActionResult::NoTime);
    }
    let pos = world.you.pos;
    let got_gold = pickup_gold(world, ui)?;
    let here: Vec<EntityId> = world
        .level
        .objects
        .iter()
        .filter(|o| o.pos == Some(pos))
        .map(|o| o.id)
        .collect();
    if here.is_empty() && !got_gold {
        ui.pline("There is nothing here to pick up.");
        return Ok(ActionResult::NoTime);
    }
    for id in here {
        if let Some(obj) = world.level.objects.get_mut(id) {
            obj.pos = None;
        }
        relink(&mut world.level.objects, &mut world.invent, id)?;
        if let Some(obj) = world.invent.get(id) {
            ui.pline(&format!("You pick up {}.", obj.xname()));
        }
    }
    ui.redraw_region(pos, pos);
    Ok(ActionResult::TookTime)
}

/// Drop inventory object `id` where the player stands
pub fn dodrop(
    world: &mut WorldState,
    ui: &mut dyn Interface,
    id: EntityId,
) -> Result<ActionResult, Impossible> {
    let Some(obj) = world.invent.get(id) else {
        ui.pline("You don't have that object.");
        return Ok(ActionResult::NoTime);
    };
    let worn = WornMask::ARMOR
        | WornMask::HELMET
        | WornMask::LEFT_RING
        | WornMask::RIGHT_RING
        | WornMask::AMULET;
    if obj.worn.intersects(worn) {
        ui.pline("You cannot drop something you are wearing.");
        return Ok(ActionResult::NoTime);
    }
    if obj.worn.contains(WornMask::WEAPON) && obj.is_cursed() {
        ui.pline("Your weapon is welded to your hand!");
        return Ok(ActionResult::NoTime);
    }
    let pos = if world.you.uswallow { None } else { Some(world.you.pos) };
    let name = obj.xname();
    if let Some(obj) = world.invent.get_mut(id) {
        obj.worn = WornMask::empty();
        obj.pos = pos;
    }
    match pos {
        Some(pos) => {
            relink(&mut world.invent, &mut world.level.objects, id)?;
            ui.redraw_region(pos, pos);
        }
        // swallowed: the engulfer keeps it
        None => {
            let obj = world.invent.unlink(id)?;
            if let Some(id) = world.you.ustuck {
                if let Some(mon) = world.level.monsters.get_mut(id) {
                    mon.inventory.push_front(obj)?;
                }
            }
        }
    }
    ui.pline(&format!("You dropped {name}."));
    Ok(ActionResult::TookTime)
}

/// Write in the dust with a finger
pub fn doengrave(
    world: &mut WorldState,
    ui: &mut dyn Interface,
) -> Result<ActionResult, Impossible> {
    world.you.multi = 0;
    if world.you.uswallow {
        ui.pline("You're joking. Hahaha!");
        return Ok(ActionResult::NoTime);
    }
    if world.you.levitating() {
        ui.pline("You can't reach the floor!");
        return Ok(ActionResult::TookTime);
    }
    let pos = world.you.pos;
    if let Some(old) = engr_at(&world.level, pos) {
        if old.kind == EngravingKind::Dust {
            let id = old.id;
            ui.pline("You wipe out the message that was written here.");
            del_engr(&mut world.level, id)?;
        } else {
            let how = if old.kind == EngravingKind::Burn {
                "burned"
            } else {
                "engraved"
            };
            ui.pline(&format!(
                "You cannot wipe out the message that is {how} in the rock."
            ));
            return Ok(ActionResult::TookTime);
        }
    }

    let Some(line) = ui.read_line("What do you want to write on the floor here? ") else {
        return Ok(ActionResult::NoTime);
    };
    let text: String = line
        .trim_start_matches(' ')
        .chars()
        .take(BUFSZ - 1)
        .collect();
    if text.is_empty() || text.starts_with('\u{1b}') {
        return Ok(ActionResult::NoTime);
    }
    let len = text.chars().count();
    if len > QUICK_WRITE_LEN {
        world.you.multi = -((len / 10) as i32);
        world.you.nomovemsg = Some("You finished writing.".to_string());
    }
    let id = make_engr_at(&mut world.level, &mut world.ids, pos, &text)?;
    let finished = world.moves + world.you.multi.unsigned_abs() as u64;
    if let Some(engr) = world.level.engravings.get_mut(id) {
        engr.time = finished;
    }
    Ok(ActionResult::TookTime)
}

fn use_up(world: &mut WorldState, id: EntityId) -> Result<(), Impossible> {
    match world.invent.get_mut(id) {
        Some(obj) if obj.quantity > 1 => {
            obj.quantity -= 1;
            Ok(())
        }
        _ => world.invent.unlink(id).map(drop),
    }
}

/// Drink potion `id`
pub fn doquaff(
    world: &mut WorldState,
    ui: &mut dyn Interface,
    id: EntityId,
) -> Result<ActionResult, Impossible> {
    let Some(obj) = world.invent.get(id) else {
        ui.pline("You don't have that object.");
        return Ok(ActionResult::NoTime);
    };
    if obj.class != ObjectClass::Potion {
        ui.pline("That is a silly thing to drink.");
        return Ok(ActionResult::NoTime);
    }
    let otyp = obj.otyp;
    let name = obj.def().name;
    use_up(world, id)?;

    let rng = &mut world.rng;
    let you = &mut world.you;
    match name.strip_prefix("potion of ").unwrap_or(name) {
        "healing" => {
            ui.pline("You begin to feel better.");
            you.uhp += rng.rnd(8) as i32;
            if you.uhp > you.uhpmax {
                you.uhpmax += 1;
                you.uhp = you.uhpmax;
            }
            if you.blind() {
                you.props.get_mut(Property::Blind).set_timeout(1);
            }
        }
        "confusion" => {
            ui.pline("Huh, What?  Where am I?");
            let turns = rng.rn1(100, 250);
            you.props.get_mut(Property::Confusion).incr_timeout(turns);
        }
        "blindness" => {
            ui.pline("A cloud of darkness falls upon you.");
            let turns = rng.rn1(100, 250);
            you.props.get_mut(Property::Blind).incr_timeout(turns);
            ui.redraw_screen();
            ui.recompute_vision();
        }
        "speed" => {
            ui.pline("You are suddenly moving much faster.");
            let turns = rng.rn1(10, 100);
            you.props.get_mut(Property::Fast).incr_timeout(turns);
        }
        "levitation" => {
            if you.levitating() {
                ui.pline("You float a little higher.");
            } else {
                ui.pline("You start to float in the air!");
            }
            let turns = rng.rnd(100);
            let slot = you.props.get_mut(Property::Levitation);
            slot.incr_timeout(turns);
            slot.callback = Some(TimeoutCallback::FloatDown);
        }
        "invisibility" => {
            ui.pline("Gee!  All of a sudden, you can't see yourself.");
            let turns = rng.rn1(15, 31);
            you.props.get_mut(Property::Invis).incr_timeout(turns);
            ui.redraw_region(you.pos, you.pos);
        }
        other => {
            debug!(potion = other, "potion has no effect");
            ui.pline("This tastes like water.");
        }
    }
    world.discoveries.learn(otyp);
    ui.status_dirty();
    Ok(ActionResult::TookTime)
}

/// Eat food item `id`
pub fn doeat(
    world: &mut WorldState,
    ui: &mut dyn Interface,
    id: EntityId,
) -> Result<ActionResult, Impossible> {
    let Some(obj) = world.invent.get(id) else {
        ui.pline("You don't have that object.");
        return Ok(ActionResult::NoTime);
    };
    if obj.class != ObjectClass::Food {
        ui.pline("You cannot eat that!");
        return Ok(ActionResult::NoTime);
    }
    let otyp = obj.otyp;
    let def = obj.def();
    use_up(world, id)?;

    if def.name.starts_with("dead ") && def.name != "dead lizard" && world.rng.rn2(5) == 0 {
        ui.pline("Ulch -- that meat was tainted!");
        ui.pline("You feel deathly sick.");
        let turns = 10 + world.rng.rn2(10);
        world.you.make_sick(SickCause::Object(otyp), turns);
    } else if def.name == "food ration" {
        if world.you.uhunger >= 1500 {
            ui.pline("You're having a hard time getting all of it down.");
            world.you.nomovemsg = Some("You're finally finished.".to_string());
        } else {
            world.you.nomovemsg = Some("You finished eating the food ration.".to_string());
            ui.pline("That food really hit the spot!");
        }
        world.you.nomul(-5);
    } else {
        ui.pline(&format!("This {} is delicious!", def.name));
    }
    world.you.uhunger += def.nutrition as i32;
    newuhs(world, false, ui);
    ui.status_dirty();
    Ok(ActionResult::TookTime)
}

/// Climb the up staircase. Leaving level 1 ends the game.
pub fn doup(world: &mut WorldState, ui: &mut dyn Interface) -> Result<ActionResult, Impossible> {
    if world.level.upstair != Some(world.you.pos) {
        ui.pline("You can't go up here.");
        return Ok(ActionResult::NoTime);
    }
    if world.you.ustuck.is_some() {
        ui.pline("You are being held, and cannot go up.");
        return Ok(ActionResult::TookTime);
    }
    if world.dlevel == 1 {
        world.done(DeathKind::Escaped, "");
        return Ok(ActionResult::TookTime);
    }
    Ok(ActionResult::ChangeLevel {
        to: world.dlevel as i32 - 1,
        at_stairs: true,
    })
}

pub fn dodown(world: &mut WorldState, ui: &mut dyn Interface) -> Result<ActionResult, Impossible> {
    if world.level.downstair != Some(world.you.pos) {
        ui.pline("You can't go down here.");
        return Ok(ActionResult::NoTime);
    }
    if world.you.levitating() {
        ui.pline("You're floating high above the stairs.");
        return Ok(ActionResult::NoTime);
    }
    if world.you.ustuck.is_some() {
        ui.pline("You are being held, and cannot go down.");
        return Ok(ActionResult::TookTime);
    }
    Ok(ActionResult::ChangeLevel {
        to: world.dlevel as i32 + 1,
        at_stairs: true,
    })
}
