//! The explicit world object (decl.c)
//!
//! Everything that used to be a global lives on [`WorldState`]: the resident
//! level, the player, the object chains outside the level and the counters
//! that tie them together.

use chrono::NaiveDate;
use hashbrown::HashSet;
use strum::Display;
use tracing::{debug, info};

use super::{phase_of_the_moon, Flags, Impossible, Interface, FULL_MOON, NEW_MOON};
use crate::consts::{PL_CSIZ, PL_NSIZ};
use crate::dungeon::{vision, Level, LevelGenerator, Pos};
use crate::entity::{Chain, EntityId, IdAllocator};
use crate::monster::{Monster, MonsterFlags, SpeciesId};
use crate::object::{otyp_by_name, Discoveries, Object, WornMask};
use crate::player::You;
use crate::rng::GameRng;

/// How the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum DeathKind {
    Died,
    Choked,
    Starved,
    Drowned,
    Quit,
    Escaped,
}

impl DeathKind {
    /// Past tense used in the final summary
    pub fn verb(self) -> &'static str {
        match self {
            DeathKind::Died => "died",
            DeathKind::Choked => "choked",
            DeathKind::Starved => "starved",
            DeathKind::Drowned => "drowned",
            DeathKind::Quit => "quit",
            DeathKind::Escaped => "escaped",
        }
    }

    /// Deaths that count as being killed (gold is taxed, a tombstone is drawn)
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            DeathKind::Died | DeathKind::Choked | DeathKind::Starved | DeathKind::Drowned
        )
    }
}

/// Recorded end of game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Death {
    pub how: DeathKind,
    /// Death text as it goes into the score file
    pub killer: String,
}

/// Settings for a brand new game
#[derive(Debug, Clone)]
pub struct NewGame {
    pub plname: String,
    pub pl_character: String,
    pub uid: u32,
    pub seed: Option<u64>,
    pub flags: Flags,
    pub date: NaiveDate,
}

impl NewGame {
    pub fn new(plname: &str, uid: u32) -> Self {
        Self {
            plname: plname.chars().take(PL_NSIZ - 1).collect(),
            pl_character: "Fighter".into(),
            uid,
            seed: None,
            flags: Flags::default(),
            date: chrono::Local::now().date_naive(),
        }
    }
}

/// All mutable game state
#[derive(Debug, Clone)]
pub struct WorldState {
    pub flags: Flags,
    pub ids: IdAllocator,
    pub rng: GameRng,
    /// Owner of this game
    pub uid: u32,
    pub plname: String,
    pub pl_character: String,
    pub you: You,
    /// The resident level
    pub level: Level,
    pub dlevel: u8,
    pub maxdlevel: u8,
    pub moves: u64,
    pub invent: Chain<Object>,
    /// Contents of containers
    pub contained: Chain<Object>,
    /// Unpaid shop goods
    pub billed: Chain<Object>,
    /// Monsters in transit to the next level entered
    pub fallen_down: Chain<Monster>,
    /// Tame monsters following the player between levels
    pub followers: Chain<Monster>,
    /// Symbols of genocided species
    pub genocided: String,
    /// Genocides pending for levels not generated yet
    pub fut_geno: String,
    pub discoveries: Discoveries,
    pub death: Option<Death>,
}

impl WorldState {
    /// Start a fresh game on level 1
    pub fn new_game(
        setup: NewGame,
        generator: &mut dyn LevelGenerator,
        ui: &mut dyn Interface,
    ) -> Result<WorldState, Impossible> {
        let mut rng = match setup.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        let mut ids = IdAllocator::new();
        let level = generator.generate(1, &mut rng, &mut ids, "")?;
        let start = match level.upstair {
            Some(pos) => pos,
            None => level
                .random_free_room_pos(&mut rng)
                .ok_or_else(|| Impossible::Inconsistent {
                    what: "level 1 has no room to start in".into(),
                }
                .report())?,
        };
        let you = You::new(start, &mut rng);

        let mut world = WorldState {
            flags: setup.flags,
            ids,
            rng,
            uid: setup.uid,
            plname: setup.plname,
            pl_character: setup.pl_character.chars().take(PL_CSIZ - 1).collect(),
            you,
            level,
            dlevel: 1,
            maxdlevel: 1,
            moves: 1,
            invent: Chain::new("invent"),
            contained: Chain::new("contained"),
            billed: Chain::new("billed"),
            fallen_down: Chain::new("fallen_down"),
            followers: Chain::new("followers"),
            genocided: String::new(),
            fut_geno: String::new(),
            discoveries: Discoveries::default(),
            death: None,
        };
        info!(seed = world.rng.seed(), name = %world.plname, "new game");

        world.starting_inventory()?;
        world.place_pet()?;

        world.flags.moonphase = phase_of_the_moon(setup.date);
        if world.flags.moonphase == FULL_MOON {
            ui.pline("You are lucky! Full moon tonight.");
            world.you.uluck += 1;
        } else if world.flags.moonphase == NEW_MOON {
            ui.pline("Be careful! New moon tonight.");
        }

        vision::setsee(&mut world);
        ui.redraw_screen();
        ui.status_dirty();
        Ok(world)
    }

    fn starting_inventory(&mut self) -> Result<(), Impossible> {
        let kit: [(&str, WornMask); 3] = [
            ("food ration", WornMask::empty()),
            ("dagger", WornMask::WEAPON),
            ("leather armor", WornMask::ARMOR),
        ];
        for (name, worn) in kit {
            let Some(otyp) = otyp_by_name(name) else {
                continue;
            };
            let mut obj = Object::new(self.ids.fresh(), otyp);
            obj.worn = worn;
            self.discoveries.learn(otyp);
            self.invent.push_back(obj)?;
        }
        Ok(())
    }

    fn place_pet(&mut self) -> Result<(), Impossible> {
        let spot = self
            .you
            .pos
            .neighbors()
            .find(|&p| self.level.is_accessible(p) && self.level.occupant(p).is_none());
        let Some(spot) = spot else {
            debug!("no room next to the player for a pet");
            return Ok(());
        };
        let id = self.ids.fresh();
        let mut dog = Monster::new(id, SpeciesId::LITTLE_DOG, spot, &mut self.rng);
        dog.flags.insert(MonsterFlags::TAME);
        self.level.monsters.push_front(dog)
    }

    /// Record the end of the game. The first recorded death wins.
    pub fn done(&mut self, how: DeathKind, killer: &str) {
        if self.death.is_some() {
            return;
        }
        let (how, killer) = match how {
            DeathKind::Quit if self.you.uhp < 1 => {
                (DeathKind::Died, "quit while already on Charon's boat")
            }
            DeathKind::Starved => (how, "starvation"),
            DeathKind::Drowned => (how, "drowning"),
            DeathKind::Died => (how, killer),
            other => (other, other.verb()),
        };
        info!(how = %how, killer, "game over");
        self.death = Some(Death {
            how,
            killer: killer.to_string(),
        });
    }

    pub fn is_over(&self) -> bool {
        self.death.is_some()
    }

    /// Monster the player is stuck to, if it is still around
    pub fn stuck_monster(&self) -> Option<&Monster> {
        self.you.ustuck.and_then(|id| self.level.monsters.get(id))
    }

    /// Take a monster off the level, dropping any reference the player holds
    pub fn remove_monster(&mut self, id: EntityId) -> Result<Monster, Impossible> {
        let mon = self.level.monsters.unlink(id)?;
        if self.you.ustuck == Some(id) {
            self.you.ustuck = None;
            self.you.uswallow = false;
        }
        Ok(mon)
    }

    /// Every reachable record, with monster inventories flattened in
    fn all_ids(&self) -> Vec<EntityId> {
        let monsters: Vec<&Monster> = self
            .level
            .monsters
            .iter()
            .chain(self.fallen_down.iter())
            .chain(self.followers.iter())
            .collect();
        let mut ids: Vec<EntityId> = monsters.iter().map(|m| m.id).collect();
        ids.extend(monsters.iter().flat_map(|m| m.inventory.ids()));
        ids.extend(self.level.objects.ids());
        ids.extend(self.level.gold.ids());
        ids.extend(self.level.traps.ids());
        ids.extend(self.level.engravings.ids());
        ids.extend(self.invent.ids());
        ids.extend(self.contained.ids());
        ids.extend(self.billed.ids());
        ids
    }

    /// Every record appears on exactly one chain, ids are unique and below
    /// the allocator, and the stuck-to reference resolves
    pub fn check_integrity(&self) -> Result<(), Impossible> {
        let mut seen = HashSet::new();
        for id in self.all_ids() {
            if id.is_none() || !seen.insert(id) || id.0 >= self.ids.peek() {
                return Err(Impossible::Inconsistent {
                    what: format!("entity {id} is duplicated or was never allocated"),
                }
                .report());
            }
        }
        if let Some(id) = self.you.ustuck {
            if !self.level.monsters.contains(id) {
                return Err(Impossible::Inconsistent {
                    what: format!("stuck to missing monster {id}"),
                }
                .report());
            }
        }
        Ok(())
    }

    /// Grid position of the player
    pub fn player_pos(&self) -> Pos {
        self.you.pos
    }
}

/// A seeded level-1 game for unit tests
#[cfg(test)]
pub(crate) fn test_world(seed: u64) -> WorldState {
    let mut setup = NewGame::new("tester", 1000);
    setup.seed = Some(seed);
    setup.date = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
    let mut ui = super::Transcript::default();
    WorldState::new_game(setup, &mut crate::dungeon::SimpleGenerator, &mut ui).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::SimpleGenerator;
    use crate::world::Transcript;

    #[test]
    fn test_new_game_is_consistent() {
        let world = test_world(7);
        world.check_integrity().unwrap();
        assert_eq!(world.dlevel, 1);
        assert_eq!(world.invent.len(), 3);
        assert!(world.level.is_accessible(world.you.pos));
        assert!(world.level.monsters.iter().any(|m| m.is_tame()));
    }

    #[test]
    fn test_same_seed_same_level() {
        let a = test_world(99);
        let b = test_world(99);
        assert_eq!(a.you.pos, b.you.pos);
        assert_eq!(a.level.entity_count(), b.level.entity_count());
    }

    #[test]
    fn test_first_death_wins() {
        let mut world = test_world(3);
        world.done(DeathKind::Starved, "ignored");
        world.done(DeathKind::Died, "jackal");
        let death = world.death.clone().unwrap();
        assert_eq!(death.how, DeathKind::Starved);
        assert_eq!(death.killer, "starvation");
    }

    #[test]
    fn test_quit_at_zero_hp_counts_as_death() {
        let mut world = test_world(3);
        world.you.uhp = 0;
        world.done(DeathKind::Quit, "");
        let death = world.death.unwrap();
        assert_eq!(death.how, DeathKind::Died);
        assert_eq!(death.killer, "quit while already on Charon's boat");
    }

    #[test]
    fn test_remove_monster_clears_stuck() {
        let mut world = test_world(5);
        let id = world.level.monsters.ids().next().unwrap();
        world.you.ustuck = Some(id);
        world.remove_monster(id).unwrap();
        assert_eq!(world.you.ustuck, None);
        world.check_integrity().unwrap();
    }

    #[test]
    fn test_full_moon_brings_luck() {
        let mut setup = NewGame::new("tester", 1);
        setup.seed = Some(1);
        setup.date = (0..60)
            .filter_map(|d| NaiveDate::from_ymd_opt(2024, 1, 1)?.checked_add_days(chrono::Days::new(d)))
            .find(|&d| phase_of_the_moon(d) == FULL_MOON)
            .unwrap();
        let mut ui = Transcript::default();
        let world = WorldState::new_game(setup, &mut SimpleGenerator, &mut ui).unwrap();
        assert_eq!(world.you.uluck, 1);
        assert!(ui.said("You are lucky! Full moon tonight."));
    }
}
