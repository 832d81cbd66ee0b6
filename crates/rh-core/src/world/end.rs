//! End of game: final score and the closing summary (hack.end.c done)

use chrono::NaiveDate;

use super::store::would_follow;
use super::{getdatestr, DeathKind, ScoreEntry, WorldState};
use crate::object::ObjectClass;

/// Score worth of the Amulet of Yendor, unless it is a cheap imitation
const AMULET_WORTH: i64 = 5000;
const FAKE_AMULET_WORTH: i64 = 2;

/// The score a finished game is worth, and what went into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalScore {
    /// Score before escape bonuses
    pub base: i64,
    pub points: i64,
    /// Names of the pets that escaped along
    pub companions: Vec<String>,
    /// Valuable gems carried out, with their worth
    pub gems: Vec<(String, i64)>,
    /// Pieces of worthless glass carried out
    pub worthless: u32,
    /// The amulet carried out
    pub amulets: Vec<(String, i64)>,
    pub has_amulet: bool,
}

fn plur(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Compute the final score without changing the world.
///
/// Gold gained counts (a tenth is lost on death), plus 50 per level
/// reached and a bonus past level 20. Escaping adds pets' hit points,
/// gems and the amulet, which doubles everything.
pub fn final_score(world: &WorldState) -> FinalScore {
    let how = world.death.as_ref().map(|d| d.how);
    let mut gained = (world.you.ugold - world.you.ugold0).max(0);
    if matches!(how, Some(DeathKind::Died | DeathKind::Drowned)) {
        gained -= gained / 10;
    }
    let maxdlevel = world.maxdlevel as i64;
    let mut points = world.you.urexp + gained + 50 * maxdlevel;
    if maxdlevel > 20 {
        points += 1000 * if maxdlevel > 30 { 10 } else { maxdlevel - 20 };
    }

    let mut score = FinalScore {
        base: points,
        points,
        companions: Vec::new(),
        gems: Vec::new(),
        worthless: 0,
        amulets: Vec::new(),
        has_amulet: false,
    };
    if how != Some(DeathKind::Escaped) {
        return score;
    }

    for mon in world.level.monsters.iter().filter(|m| would_follow(m, world.you.pos)) {
        score.companions.push(mon.monnam());
        score.base += mon.hp as i64;
    }
    score.points = score.base;
    for obj in world.invent.iter() {
        match obj.class {
            ObjectClass::Gem => {
                let worth = obj.quantity as i64 * obj.def().value as i64;
                if worth == 0 {
                    score.worthless += obj.quantity;
                } else {
                    score.points += worth;
                    score.gems.push((obj.xname(), worth));
                }
            }
            ObjectClass::Amulet => {
                let worth = if obj.spe < 0 {
                    FAKE_AMULET_WORTH
                } else {
                    score.has_amulet = true;
                    AMULET_WORTH
                };
                score.points += worth;
                score.amulets.push((obj.xname(), worth));
            }
            _ => {}
        }
    }
    if score.has_amulet {
        score.points *= 2;
    }
    score
}

/// Settle the score and produce the closing lines.
///
/// Stores the result in `urexp`. An escape with the real amulet is
/// recorded as "escaped (with amulet)".
pub fn done_summary(world: &mut WorldState) -> Vec<String> {
    let Some(death) = world.death.clone() else {
        return Vec::new();
    };
    let score = final_score(world);
    world.you.urexp = score.points;

    let verb = death.how.verb();
    let mut lines = vec![
        format!("Goodbye {} {}...", world.pl_character, world.plname),
        String::new(),
    ];
    if death.how == DeathKind::Escaped {
        if score.has_amulet {
            if let Some(d) = world.death.as_mut() {
                d.killer = "escaped (with amulet)".to_string();
            }
        }
        if score.companions.is_empty() {
            lines.push(format!(
                "You escaped from the dungeon with {} points,",
                score.base
            ));
        } else {
            let mut who = String::from("You");
            for name in &score.companions {
                who.push_str(" and ");
                who.push_str(name);
            }
            lines.push(who);
            lines.push(format!("escaped from the dungeon with {} points,", score.base));
        }
        for (name, worth) in score.gems.iter().chain(score.amulets.iter()) {
            lines.push(format!("\t{name} (worth {worth} Zorkmids),"));
        }
        if score.worthless > 0 {
            lines.push(format!(
                "\t{} worthless piece{} of coloured glass,",
                score.worthless,
                plur(score.worthless as i64)
            ));
        }
    } else {
        lines.push(format!(
            "You {verb} on dungeon level {} with {} points,",
            world.dlevel, score.points
        ));
    }
    lines.push(format!(
        "and {} piece{} of gold, after {} move{}.",
        world.you.ugold,
        plur(world.you.ugold),
        world.moves,
        plur(world.moves as i64)
    ));
    lines.push(format!(
        "You were level {} with a maximum of {} hit points when you {verb}.",
        world.you.ulevel, world.you.uhpmax
    ));
    lines
}

/// The record-file entry for a finished game
pub fn score_entry(world: &WorldState, date: NaiveDate) -> ScoreEntry {
    ScoreEntry {
        date: getdatestr(date),
        uid: world.uid,
        level: world.dlevel as i32,
        maxlvl: world.maxdlevel as i32,
        hp: world.you.uhp,
        maxhp: world.you.uhpmax,
        points: world.you.urexp,
        plchar: world.pl_character.chars().next().unwrap_or('X'),
        sex: if world.flags.female { 'F' } else { 'M' },
        name: world.plname.clone(),
        death: world
            .death
            .as_ref()
            .map(|d| d.killer.clone())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{otyp_by_name, Object};
    use crate::world::test_world;

    fn carry(world: &mut WorldState, name: &str, quantity: u32, spe: i8) {
        let otyp = otyp_by_name(name).unwrap();
        let mut obj = Object::new(world.ids.fresh(), otyp);
        obj.quantity = quantity;
        obj.spe = spe;
        world.invent.push_back(obj).unwrap();
    }

    #[test]
    fn test_death_taxes_gold() {
        let mut world = test_world(1);
        world.you.ugold = 1000;
        world.maxdlevel = 3;
        world.done(DeathKind::Died, "jackal");
        assert_eq!(final_score(&world).points, 900 + 150);
    }

    #[test]
    fn test_quit_keeps_gold_and_deep_bonus() {
        let mut world = test_world(1);
        world.you.ugold = 1000;
        world.you.ugold0 = 200;
        world.maxdlevel = 25;
        world.done(DeathKind::Quit, "");
        assert_eq!(final_score(&world).points, 800 + 50 * 25 + 5000);
        world.maxdlevel = 35;
        assert_eq!(final_score(&world).points, 800 + 50 * 35 + 10000);
    }

    #[test]
    fn test_escape_with_amulet_doubles() {
        let mut world = test_world(1);
        world.level.monsters.clear();
        carry(&mut world, "diamond", 2, 0);
        carry(&mut world, "worthless piece of glass", 3, 0);
        carry(&mut world, "Amulet of Yendor", 1, 0);
        world.done(DeathKind::Escaped, "");
        let score = final_score(&world);
        assert_eq!(score.base, 50);
        assert_eq!(score.points, (50 + 8000 + 5000) * 2);
        assert_eq!(score.worthless, 3);

        let lines = done_summary(&mut world);
        assert_eq!(world.you.urexp, score.points);
        assert_eq!(
            world.death.as_ref().map(|d| d.killer.as_str()),
            Some("escaped (with amulet)")
        );
        assert!(lines.contains(&"You escaped from the dungeon with 50 points,".to_string()));
        assert!(lines.contains(&"\t3 worthless pieces of coloured glass,".to_string()));
    }

    #[test]
    fn test_fake_amulet_is_worth_two() {
        let mut world = test_world(1);
        world.level.monsters.clear();
        carry(&mut world, "Amulet of Yendor", 1, -1);
        world.done(DeathKind::Escaped, "");
        let score = final_score(&world);
        assert!(!score.has_amulet);
        assert_eq!(score.points, 52);
    }

    #[test]
    fn test_summary_lines() {
        let mut world = test_world(1);
        world.you.ugold = 1;
        world.moves = 120;
        world.done(DeathKind::Starved, "");
        let lines = done_summary(&mut world);
        assert_eq!(lines[0], "Goodbye Fighter tester...");
        assert_eq!(lines[2], "You starved on dungeon level 1 with 51 points,");
        assert_eq!(lines[3], "and 1 piece of gold, after 120 moves.");
        assert!(lines[4].ends_with("hit points when you starved."));

        let entry = score_entry(&world, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert_eq!(entry.date, "240314");
        assert_eq!(entry.plchar, 'F');
        assert_eq!(entry.death, "starvation");
        assert_eq!(entry.points, 51);
    }
}
