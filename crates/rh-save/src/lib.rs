//! rh-save: whole-game save and restore (save.c, restore.c)
//!
//! A save file holds the complete game: the resident level and every level
//! that was written to the level store. It is written through a temporary
//! file, synced, then renamed into place, so an interrupted save leaves the
//! previous one intact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use rh_core::dungeon::Pos;
use rh_core::entity::{Chain, IdAllocator};
use rh_core::object::{Discoveries, OBJECTS};
use rh_core::player::You;
use rh_core::save::{
    check_header, read_chain, read_level, read_you, resolve_surrogates, write_chain, write_header,
    write_level, write_you, RestoreCtx, RestoreReport, SaveError, SaveReader, SaveWriter,
};
use rh_core::world::{lock_name, Flags, Interface, LevelStore, StoreError, WorldState};
use rh_core::GameRng;

/// Terminates the list of stored levels
const LEVELS_END: i32 = -1;

/// Save/restore errors
#[derive(Debug, Error)]
pub enum GameSaveError {
    #[error("Cannot access save file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No saved game for you in {}.", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Format(#[from] SaveError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn io_error(path: &Path, source: std::io::Error) -> GameSaveError {
    GameSaveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where one player's save lives: `<playground>/save/<uid><name>`
#[derive(Debug, Clone)]
pub struct SavePaths {
    playground: PathBuf,
    lockname: String,
}

impl SavePaths {
    pub fn new(playground: impl Into<PathBuf>, uid: u32, plname: &str) -> Self {
        Self {
            playground: playground.into(),
            lockname: lock_name(uid, plname),
        }
    }

    pub fn playground(&self) -> &Path {
        &self.playground
    }

    pub fn lockname(&self) -> &str {
        &self.lockname
    }

    pub fn save_dir(&self) -> PathBuf {
        self.playground.join("save")
    }

    pub fn save_file(&self) -> PathBuf {
        self.save_dir().join(&self.lockname)
    }

    fn temp_file(&self) -> PathBuf {
        self.save_dir().join(format!("{}.tmp", self.lockname))
    }

    pub fn exists(&self) -> bool {
        self.save_file().is_file()
    }

    /// The level store of this player's game
    pub fn level_store(&self) -> LevelStore {
        LevelStore::new(&self.playground, &self.lockname)
    }
}

fn write_discoveries<W: Write>(
    w: &mut SaveWriter<W>,
    disc: &Discoveries,
) -> Result<(), SaveError> {
    let known: Vec<u16> = disc.known_types().collect();
    w.u16(known.len() as u16)?;
    for otyp in known {
        w.u16(otyp)?;
    }
    let called = disc.called_names();
    w.u16(called.len() as u16)?;
    for (otyp, name) in called {
        w.u16(otyp)?;
        w.str(name)?;
    }
    Ok(())
}

fn read_discoveries<R: Read>(
    r: &mut SaveReader<R>,
    report: &mut RestoreReport,
) -> Result<Discoveries, SaveError> {
    let mut disc = Discoveries::default();
    let valid = |otyp: u16| (otyp as usize) < OBJECTS.len();
    for _ in 0..r.u16()? {
        let otyp = r.u16()?;
        if valid(otyp) {
            disc.learn(otyp);
        } else {
            report.note(format!("dropped discovery of unknown object type {otyp}"));
        }
    }
    for _ in 0..r.u16()? {
        let otyp = r.u16()?;
        let name = r.str()?;
        if valid(otyp) {
            disc.call(otyp, name);
        } else {
            report.note(format!("dropped name {name:?} for unknown object type {otyp}"));
        }
    }
    Ok(disc)
}

/// Serialize the whole game. Levels in `store` other than the resident one
/// are read back and embedded.
fn write_game<W: Write>(
    w: &mut SaveWriter<W>,
    world: &WorldState,
    store: &LevelStore,
) -> Result<(), GameSaveError> {
    write_header(w)?;
    w.u32(world.uid)?;
    for word in world.flags.pack(world.ids.peek()) {
        w.u32(word)?;
    }
    w.u8(world.dlevel)?;
    w.u8(world.maxdlevel)?;
    w.u64(world.moves)?;
    w.u64(world.rng.seed())?;
    let word_pos = world.rng.word_pos();
    w.u64((word_pos >> 64) as u64)?;
    w.u64(word_pos as u64)?;
    write_you(w, &world.you)?;
    w.str(&world.plname)?;
    w.str(&world.pl_character)?;
    w.str(&world.genocided)?;
    w.str(&world.fut_geno)?;
    write_discoveries(w, &world.discoveries)?;
    write_chain(w, &world.invent)?;
    write_chain(w, &world.contained)?;
    write_chain(w, &world.billed)?;
    write_chain(w, &world.fallen_down)?;
    write_level(w, &world.level)?;

    // Reading a level may hand out ids for records without one; those must
    // not disturb the counter the save carries.
    let mut scratch = world.ids.clone();
    for n in store.stored_levels() {
        if n == world.dlevel {
            continue;
        }
        let (level, _) = store.load_level(n, &mut scratch)?;
        w.i32(n as i32)?;
        write_level(w, &level)?;
    }
    w.i32(LEVELS_END)?;
    Ok(())
}

/// Write the save file atomically
pub fn save_game(
    world: &WorldState,
    store: &LevelStore,
    paths: &SavePaths,
) -> Result<(), GameSaveError> {
    let dir = paths.save_dir();
    fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
    let tmp = paths.temp_file();
    let path = paths.save_file();

    let result = (|| -> Result<(), GameSaveError> {
        let file = File::create(&tmp).map_err(|e| io_error(&tmp, e))?;
        let mut w = SaveWriter::new(BufWriter::new(file));
        write_game(&mut w, world, store)?;
        let file = w
            .into_inner()
            .into_inner()
            .map_err(|e| io_error(&tmp, e.into_error()))?;
        file.sync_all().map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// The player's save command: write the game and clear the level files
pub fn dosave(
    world: &WorldState,
    store: &LevelStore,
    paths: &SavePaths,
    ui: &mut dyn Interface,
) -> Result<(), GameSaveError> {
    ui.pline("Saving...");
    save_game(world, store, paths)?;
    store.purge()?;
    info!(path = %paths.save_file().display(), moves = world.moves, "game saved");
    Ok(())
}

/// Save on hangup or termination. Failures are logged, never raised.
pub fn emergency_save(world: &WorldState, store: &LevelStore, paths: &SavePaths) -> bool {
    match save_game(world, store, paths) {
        Ok(()) => {
            if let Err(e) = store.purge() {
                warn!("could not remove level files after emergency save: {e}");
            }
            info!(path = %paths.save_file().display(), "emergency save written");
            true
        }
        Err(e) => {
            error!("emergency save failed: {e}");
            false
        }
    }
}

fn read_game<R: Read>(
    r: &mut SaveReader<R>,
    uid: u32,
    store: &LevelStore,
) -> Result<(WorldState, RestoreReport), GameSaveError> {
    check_header(r)?;
    let owner = r.u32()?;
    if owner != uid {
        return Err(SaveError::NotYours { owner }.into());
    }
    let words = [r.u32()?, r.u32()?, r.u32()?, r.u32()?];
    let (flags, counter): (Flags, u32) = Flags::unpack(words);
    let mut ids = IdAllocator::from_counter(counter);
    let dlevel = r.u8()?;
    let maxdlevel = r.u8()?;
    let moves = r.u64()?;
    let seed = r.u64()?;
    let hi = r.u64()? as u128;
    let lo = r.u64()? as u128;
    let rng = GameRng::resume(seed, (hi << 64) | lo);

    let mut report = RestoreReport::default();
    let mut you = You::new(Pos::default(), &mut GameRng::new(seed));
    read_you(r, &mut you, &mut report)?;
    let plname = r.str()?;
    let pl_character = r.str()?;
    let genocided = r.str()?;
    let fut_geno = r.str()?;
    let discoveries = read_discoveries(r, &mut report)?;

    let mut ctx = RestoreCtx::new(&mut ids);
    let invent = read_chain(r, "invent", &mut ctx)?;
    let contained = read_chain(r, "contained", &mut ctx)?;
    let billed = read_chain(r, "billed", &mut ctx)?;
    let fallen_down = read_chain(r, "fallen_down", &mut ctx)?;
    let level = read_level(r, &mut ctx)?;
    if level.dlevel != dlevel {
        return Err(SaveError::Corrupted(format!(
            "resident level is {} but the player is on {dlevel}",
            level.dlevel
        ))
        .into());
    }
    loop {
        let n = r.i32()?;
        if n == LEVELS_END {
            break;
        }
        let other = read_level(r, &mut ctx)?;
        if other.dlevel as i32 != n || other.dlevel == dlevel {
            return Err(SaveError::Corrupted(format!("stored level {n} is out of place")).into());
        }
        store.save_level(&other)?;
    }
    for note in ctx.into_report().diagnostics {
        report.diagnostics.push(note);
    }

    let mut world = WorldState {
        flags,
        ids,
        rng,
        uid: owner,
        plname,
        pl_character,
        you,
        level,
        dlevel,
        maxdlevel: maxdlevel.max(dlevel),
        moves,
        invent,
        contained,
        billed,
        fallen_down,
        followers: Chain::new("followers"),
        genocided,
        fut_geno,
        discoveries,
        death: None,
    };
    resolve_surrogates(&mut world, &mut report);
    Ok((world, report))
}

/// Restore the saved game of `uid` and delete the save file.
///
/// Stored levels are written back into the level store. A save that belongs
/// to someone else is refused and left alone.
pub fn dorecover(
    paths: &SavePaths,
    uid: u32,
    ui: &mut dyn Interface,
) -> Result<(WorldState, RestoreReport), GameSaveError> {
    let path = paths.save_file();
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(GameSaveError::NotFound(path));
        }
        Err(e) => return Err(io_error(&path, e)),
    };
    let store = paths.level_store();
    let mut r = SaveReader::new(BufReader::new(file));
    let (mut world, report) = match read_game(&mut r, uid, &store) {
        Ok(restored) => restored,
        Err(e) => {
            // half-written level files from a refused save are useless
            if !matches!(e, GameSaveError::Format(SaveError::NotYours { .. })) {
                let _ = store.purge();
            }
            return Err(e);
        }
    };
    fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
    info!(
        name = %world.plname,
        dlevel = world.dlevel,
        repairs = report.diagnostics.len(),
        "game restored"
    );

    rh_core::dungeon::vision::setsee(&mut world);
    ui.redraw_screen();
    ui.status_dirty();
    ui.recompute_vision();
    Ok((world, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rh_core::dungeon::SimpleGenerator;
    use rh_core::world::{NewGame, Transcript};

    fn new_world(seed: u64) -> WorldState {
        let mut setup = NewGame::new("tester", 1000);
        setup.seed = Some(seed);
        setup.date = chrono::NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        WorldState::new_game(setup, &mut SimpleGenerator, &mut Transcript::default()).unwrap()
    }

    #[test]
    fn test_paths() {
        let paths = SavePaths::new("/games", 1000, "a.b/c");
        assert_eq!(paths.lockname(), "1000a_b_c");
        assert_eq!(paths.save_file(), PathBuf::from("/games/save/1000a_b_c"));
        assert!(!paths.exists());
    }

    #[test]
    fn test_missing_save_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SavePaths::new(dir.path(), 1000, "tester");
        let err = dorecover(&paths, 1000, &mut Transcript::default()).unwrap_err();
        assert!(matches!(err, GameSaveError::NotFound(_)));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SavePaths::new(dir.path(), 1000, "tester");
        let world = new_world(3);
        save_game(&world, &paths.level_store(), &paths).unwrap();
        assert!(paths.exists());
        assert!(!paths.temp_file().exists());
    }

    #[test]
    fn test_discoveries_survive() {
        let mut disc = Discoveries::default();
        disc.learn(3);
        disc.call(5, "fizzy");
        let mut w = SaveWriter::new(Vec::new());
        write_discoveries(&mut w, &disc).unwrap();
        let bytes = w.into_inner();
        let mut report = RestoreReport::default();
        let back = read_discoveries(&mut SaveReader::new(bytes.as_slice()), &mut report).unwrap();
        assert_eq!(back, disc);
        assert!(report.is_clean());
    }
}
