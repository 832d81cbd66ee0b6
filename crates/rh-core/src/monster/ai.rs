//! Monster movement (mon.c)
//!
//! Combat is not modelled; monsters close in, follow the player, or wander.

use super::{worm_move, worm_nomove, Monster, MonsterFlags};
use crate::dungeon::Pos;
use crate::entity::EntityId;
use crate::rng::GameRng;
use crate::world::{Interface, WorldState};

/// Decides where a monster wants to step
pub trait MonsterAi {
    /// Direction to step in this turn, or `None` to stay put
    fn choose_move(&mut self, mon: &Monster, player: Pos, rng: &mut GameRng) -> Option<(i32, i32)>;
}

/// Tame monsters tag along, hostile ones close in, everyone else wanders
#[derive(Debug, Default, Clone, Copy)]
pub struct Wanderer;

impl MonsterAi for Wanderer {
    fn choose_move(&mut self, mon: &Monster, player: Pos, rng: &mut GameRng) -> Option<(i32, i32)> {
        let toward = (
            (player.x() as i32 - mon.pos.x() as i32).signum(),
            (player.y() as i32 - mon.pos.y() as i32).signum(),
        );
        let dist = mon.pos.dist2(player);
        if mon.is_tame() && dist > 8 {
            return Some(toward);
        }
        if mon.is_hostile() && !mon.flags.contains(MonsterFlags::FLEEING) && dist < 100 {
            return Some(toward);
        }
        let step = (rng.rn2(3) as i32 - 1, rng.rn2(3) as i32 - 1);
        (step != (0, 0)).then_some(step)
    }
}

/// Give every monster on the resident level its move for this turn
pub fn movemon(world: &mut WorldState, ai: &mut dyn MonsterAi, ui: &mut dyn Interface) {
    let ids: Vec<EntityId> = world.level.monsters.ids().collect();
    for id in ids {
        let player = world.you.pos;
        let Some(mon) = world.level.monsters.get(id) else {
            continue;
        };

        if mon.is_asleep() {
            if mon.pos.dist2(player) < 100 && world.rng.one_in(10) {
                if let Some(mon) = world.level.monsters.get_mut(id) {
                    mon.flags.remove(MonsterFlags::SLEEPING);
                }
            }
            continue;
        }

        let speed = mon.data().speed as u32;
        if speed < 12 && world.rng.rn2(12) >= speed {
            continue;
        }

        let target = ai
            .choose_move(mon, player, &mut world.rng)
            .and_then(|(dx, dy)| mon.pos.offset(dx, dy).ok())
            .filter(|&p| {
                p != player && world.level.is_accessible(p) && world.level.occupant(p).is_none()
            });

        let moves = world.moves;
        let Some(mon) = world.level.monsters.get_mut(id) else {
            continue;
        };
        match target {
            Some(to) => {
                let from = mon.pos;
                mon.pos = to;
                worm_move(mon, from, moves, &mut world.rng);
                ui.redraw_region(from, to);
            }
            None => worm_nomove(mon),
        }

        if mon.data().sticky
            && mon.is_hostile()
            && mon.pos.is_adjacent(player)
            && world.you.ustuck.is_none()
            && world.rng.one_in(3)
        {
            ui.pline(&format!("{} touches you!", capitalize(&mon.monnam())));
            world.you.ustuck = Some(id);
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: i32, y: i32) -> Pos {
        Pos::checked(x, y).unwrap()
    }

    #[test]
    fn test_hostile_closes_in() {
        let mut rng = GameRng::new(1);
        let mut mon = Monster::blank(EntityId(1));
        mon.pos = at(10, 10);
        let step = Wanderer.choose_move(&mon, at(14, 8), &mut rng);
        assert_eq!(step, Some((1, -1)));
    }

    #[test]
    fn test_tame_stays_near() {
        let mut rng = GameRng::new(1);
        let mut mon = Monster::blank(EntityId(1));
        mon.flags.insert(MonsterFlags::TAME);
        mon.pos = at(10, 10);
        assert_eq!(Wanderer.choose_move(&mon, at(20, 10), &mut rng), Some((1, 0)));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("the lichen"), "The lichen");
        assert_eq!(capitalize(""), "");
    }
}
