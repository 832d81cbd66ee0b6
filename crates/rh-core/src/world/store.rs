//! Level backing files and level changes (lev.c, do.c)
//!
//! Only one level is resident. Leaving it writes it to `<lockname>.<n>` in
//! the playground; returning reads it back and removes the file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::{Impossible, Interface, WorldState};
use crate::consts::MAXLEVEL;
use crate::dungeon::{vision, Level, LevelGenerator, Pos};
use crate::entity::{relink, EntityId, IdAllocator};
use crate::monster::{Monster, WormTail};
use crate::save::{
    check_header, read_level, write_header, write_level, RestoreCtx, RestoreReport, SaveError,
    SaveReader, SaveWriter,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("There is no dungeon level {0} (levels run from 1 to {max}).", max = MAXLEVEL)]
    LevelOutOfRange(i32),

    #[error("Cannot access level file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Impossible(#[from] Impossible),
}

/// Per-level backing files for one game
#[derive(Debug, Clone)]
pub struct LevelStore {
    dir: PathBuf,
    lockname: String,
}

impl LevelStore {
    pub fn new(dir: impl Into<PathBuf>, lockname: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            lockname: lockname.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn lockname(&self) -> &str {
        &self.lockname
    }

    pub fn level_path(&self, n: u8) -> PathBuf {
        self.dir.join(format!("{}.{}", self.lockname, n))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Write `level` to its backing file through a temporary file
    pub fn save_level(&self, level: &Level) -> Result<(), StoreError> {
        let path = self.level_path(level.dlevel);
        let tmp = self.dir.join(format!("{}.{}.tmp", self.lockname, level.dlevel));
        let result = (|| -> Result<(), StoreError> {
            let file = File::create(&tmp).map_err(|e| Self::io_error(&tmp, e))?;
            let mut w = SaveWriter::new(BufWriter::new(file));
            write_header(&mut w)?;
            write_level(&mut w, level)?;
            let mut out = w.into_inner();
            out.flush().map_err(|e| Self::io_error(&tmp, e))?;
            fs::rename(&tmp, &path).map_err(|e| Self::io_error(&path, e))
        })();
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        debug!(level = level.dlevel, path = %path.display(), "level stored");
        result
    }

    /// Read level `n` back. The file is left in place.
    pub fn load_level(
        &self,
        n: u8,
        ids: &mut IdAllocator,
    ) -> Result<(Level, RestoreReport), StoreError> {
        let path = self.level_path(n);
        let file = File::open(&path).map_err(|e| Self::io_error(&path, e))?;
        let mut r = SaveReader::new(BufReader::new(file));
        check_header(&mut r)?;
        let mut ctx = RestoreCtx::new(ids);
        let level = read_level(&mut r, &mut ctx)?;
        if level.dlevel != n {
            return Err(SaveError::Corrupted(format!(
                "{} holds level {}",
                path.display(),
                level.dlevel
            ))
            .into());
        }
        Ok((level, ctx.into_report()))
    }

    pub fn has_level(&self, n: u8) -> bool {
        self.level_path(n).is_file()
    }

    pub fn remove_level(&self, n: u8) -> Result<(), StoreError> {
        let path = self.level_path(n);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    /// Levels with a backing file, in order
    pub fn stored_levels(&self) -> Vec<u8> {
        (1..=MAXLEVEL).filter(|&n| self.has_level(n)).collect()
    }

    /// Delete every backing file of this game
    pub fn purge(&self) -> Result<(), StoreError> {
        for n in self.stored_levels() {
            self.remove_level(n)?;
        }
        Ok(())
    }
}

/// Tame, awake monsters next to the player come along
pub(crate) fn would_follow(mon: &Monster, player: Pos) -> bool {
    mon.is_tame() && !mon.is_asleep() && mon.pos.is_adjacent(player)
}

fn keepdogs(world: &mut WorldState) -> Result<(), Impossible> {
    let you = world.you.pos;
    let coming: Vec<EntityId> = world
        .level
        .monsters
        .iter()
        .filter(|m| would_follow(m, you))
        .map(|m| m.id)
        .collect();
    for id in coming {
        relink(&mut world.level.monsters, &mut world.followers, id)?;
    }
    world.you.ustuck = None;
    world.you.uswallow = false;
    Ok(())
}

/// Put a newly arrived monster down near `near`, or anywhere free
fn place_arrival(world: &mut WorldState, near: Option<Pos>) -> Option<Pos> {
    let level = &world.level;
    let player = world.you.pos;
    near.and_then(|near| {
        near.neighbors()
            .find(|&p| p != player && level.is_accessible(p) && level.occupant(p).is_none())
    })
    .or_else(|| {
        level
            .random_free_room_pos(&mut world.rng)
            .filter(|&p| p != player)
    })
}

/// Followers land next to the player; fallen monsters anywhere
fn losedogs(world: &mut WorldState) -> Result<(), Impossible> {
    let player = world.you.pos;
    let arrivals: Vec<(EntityId, bool)> = world
        .followers
        .ids()
        .map(|id| (id, true))
        .chain(world.fallen_down.ids().map(|id| (id, false)))
        .collect();
    for (id, follower) in arrivals {
        let spot = place_arrival(world, follower.then_some(player));
        let from = if follower {
            &mut world.followers
        } else {
            &mut world.fallen_down
        };
        let Some(spot) = spot else {
            debug!(%id, "no room for arriving monster");
            continue;
        };
        if let Some(mon) = from.get_mut(id) {
            mon.pos = spot;
            if mon.worm.is_some() {
                mon.worm = Some(WormTail::new());
            }
        }
        relink(from, &mut world.level.monsters, id)?;
    }
    Ok(())
}

/// Leave the resident level for `newlevel`.
///
/// The target is validated before anything changes. With `at_stairs` the
/// player arrives on the matching staircase, otherwise somewhere random.
pub fn goto_level(
    world: &mut WorldState,
    store: &LevelStore,
    generator: &mut dyn LevelGenerator,
    ui: &mut dyn Interface,
    newlevel: i32,
    at_stairs: bool,
) -> Result<(), StoreError> {
    if newlevel < 1 || newlevel > MAXLEVEL as i32 {
        return Err(StoreError::LevelOutOfRange(newlevel));
    }
    let newlevel = newlevel as u8;
    if newlevel == world.dlevel {
        return Ok(());
    }
    let going_down = newlevel > world.dlevel;

    keepdogs(world)?;
    if let Err(e) = store.save_level(&world.level) {
        let back: Vec<EntityId> = world.followers.ids().collect();
        for id in back {
            relink(&mut world.followers, &mut world.level.monsters, id)?;
        }
        return Err(e);
    }

    let level = if store.has_level(newlevel) {
        let (level, _report) = store.load_level(newlevel, &mut world.ids)?;
        store.remove_level(newlevel)?;
        level
    } else {
        let mut level =
            generator.generate(newlevel, &mut world.rng, &mut world.ids, &world.genocided)?;
        level.clear_memory();
        level
    };
    info!(from = world.dlevel, to = newlevel, "changing level");
    world.level = level;
    world.dlevel = newlevel;
    world.maxdlevel = world.maxdlevel.max(newlevel);
    world.you.utrap = 0;

    let stairs = if going_down {
        world.level.upstair
    } else {
        world.level.downstair
    };
    let arrival = at_stairs
        .then_some(stairs)
        .flatten()
        .or_else(|| world.level.random_free_room_pos(&mut world.rng))
        .ok_or_else(|| {
            Impossible::Inconsistent {
                what: format!("nowhere to arrive on level {newlevel}"),
            }
            .report()
        })?;
    world.you.pos = arrival;

    losedogs(world)?;
    vision::setsee(world);
    ui.redraw_screen();
    ui.status_dirty();
    ui.recompute_vision();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::SimpleGenerator;
    use crate::monster::MonsterFlags;
    use crate::world::{test_world, Transcript};

    fn store(dir: &Path) -> LevelStore {
        LevelStore::new(dir, "1000tester")
    }

    #[test]
    fn test_out_of_range_rejected_before_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut world = test_world(1);
        let before = (world.dlevel, world.you.pos, world.level.entity_count());
        let mut ui = Transcript::default();
        for bad in [0, -3, MAXLEVEL as i32 + 1] {
            let err = goto_level(&mut world, &store, &mut SimpleGenerator, &mut ui, bad, true);
            assert!(matches!(err, Err(StoreError::LevelOutOfRange(n)) if n == bad));
        }
        assert_eq!(before, (world.dlevel, world.you.pos, world.level.entity_count()));
        assert!(store.stored_levels().is_empty());
    }

    #[test]
    fn test_out_of_range_message() {
        assert_eq!(
            StoreError::LevelOutOfRange(41).to_string(),
            format!("There is no dungeon level 41 (levels run from 1 to {MAXLEVEL}).")
        );
    }

    #[test]
    fn test_descend_stores_level_and_arrives_on_upstairs() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut world = test_world(2);
        let mut ui = Transcript::default();
        goto_level(&mut world, &store, &mut SimpleGenerator, &mut ui, 2, true).unwrap();
        assert_eq!(world.dlevel, 2);
        assert_eq!(world.maxdlevel, 2);
        assert_eq!(Some(world.you.pos), world.level.upstair);
        assert_eq!(store.stored_levels(), vec![1]);
        world.check_integrity().unwrap();

        goto_level(&mut world, &store, &mut SimpleGenerator, &mut ui, 1, true).unwrap();
        assert_eq!(Some(world.you.pos), world.level.downstair);
        assert_eq!(store.stored_levels(), vec![2]);
        store.purge().unwrap();
        assert!(store.stored_levels().is_empty());
    }

    #[test]
    fn test_adjacent_pet_follows() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut world = test_world(3);
        let pet = world
            .level
            .monsters
            .iter()
            .find(|m| m.is_tame())
            .map(|m| m.id)
            .unwrap();
        if let Some(dog) = world.level.monsters.get_mut(pet) {
            dog.flags.remove(MonsterFlags::SLEEPING);
        }
        let mut ui = Transcript::default();
        goto_level(&mut world, &store, &mut SimpleGenerator, &mut ui, 2, true).unwrap();
        let dog = world.level.monsters.get(pet).expect("pet came along");
        assert!(dog.pos.is_adjacent(world.you.pos));
        assert!(world.followers.is_empty());
        world.check_integrity().unwrap();
    }

    #[test]
    fn test_missing_directory_rolls_back_followers() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir.path().join("missing"));
        let mut world = test_world(3);
        let count = world.level.monsters.len();
        let mut ui = Transcript::default();
        let err = goto_level(&mut world, &store, &mut SimpleGenerator, &mut ui, 2, true);
        assert!(matches!(err, Err(StoreError::Io { .. })));
        assert_eq!(world.dlevel, 1);
        assert_eq!(world.level.monsters.len(), count);
        assert!(world.followers.is_empty());
    }
}
