//! restohack
//!
//! Main entry point for the game.

mod game;
mod tty;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rh_core::world::{
    acquire, default_playground, game_lock_path, list_scores, lock_name, parse_options, Flags,
    Impossible, LockBackend, LockError, LockPolicy, NewGame, OptionsFile, StoreError, TopTenError,
};
use rh_core::WorldState;
use rh_save::{dorecover, GameSaveError, SavePaths};

use crate::game::{begin_new_game, Ending, Session};
use crate::tty::Tty;

/// Errors that end the program
#[derive(Debug, Error)]
pub enum RunError {
    #[error("No playground directory; use --playground.")]
    NoPlayground,

    #[error("Cannot create playground {}: {source}", .path.display())]
    Playground {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Save(#[from] GameSaveError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Scores(#[from] TopTenError),

    #[error(transparent)]
    Impossible(#[from] Impossible),

    #[error("Cannot set up the hangup handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// A dungeon game in the old style
#[derive(Parser, Debug)]
#[command(name = "restohack")]
#[command(author, version, about = "restohack - Explore the dungeon!", long_about = None)]
struct Args {
    /// Player name
    #[arg(short = 'u', long = "name")]
    name: Option<String>,

    /// Directory for saves, level files and the record
    #[arg(long = "playground")]
    playground: Option<PathBuf>,

    /// How the game and record locks are taken
    #[arg(long = "lock-backend", default_value_t = LockBackend::Flock)]
    lock_backend: LockBackend,

    /// Show the high-score list and exit
    #[arg(short = 's', long = "scores")]
    scores: bool,

    /// Players whose scores to show (with --scores)
    #[arg(requires = "scores")]
    players: Vec<String>,

    /// Seed for the random generator of a new game
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Start a new game even if a save exists
    #[arg(long = "new")]
    new: bool,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("RESTOHACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn current_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail
    unsafe { libc::getuid() }
}

fn default_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "player".to_string())
}

/// Options file first, then HACKOPTIONS
fn load_options(flags: &mut Flags, plname: &mut String) {
    if let Some(path) = dirs::config_dir().map(|d| d.join("restohack").join("options.json")) {
        if path.is_file() {
            match OptionsFile::load_from_file(&path) {
                Ok(file) => {
                    for e in file.apply(flags, plname) {
                        println!("{e}");
                    }
                }
                Err(e) => warn!(path = %path.display(), "{e}"),
            }
        }
    }
    if let Ok(opts) = std::env::var("HACKOPTIONS") {
        for e in parse_options(flags, plname, &opts, true) {
            println!("{e}");
        }
    }
}

fn ensure_playground(args: &Args) -> Result<PathBuf, RunError> {
    let dir = args
        .playground
        .clone()
        .or_else(default_playground)
        .ok_or(RunError::NoPlayground)?;
    std::fs::create_dir_all(&dir).map_err(|source| RunError::Playground {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

fn start_world(
    args: &Args,
    paths: &SavePaths,
    uid: u32,
    plname: &str,
    flags: Flags,
    tty: &mut Tty<std::io::StdinLock<'static>, std::io::Stdout>,
) -> Result<WorldState, RunError> {
    if paths.exists() && !args.new {
        tty.print("Restoring old save file...");
        let (world, report) = dorecover(paths, uid, tty)?;
        if !report.is_clean() {
            tty.print("Your save file needed repairs; see the log for details.");
        }
        tty.print(&format!("Hello {}, welcome back!", world.plname));
        return Ok(world);
    }
    let mut setup = NewGame::new(plname, uid);
    setup.seed = args.seed;
    setup.flags = flags;
    let world = begin_new_game(setup, &paths.level_store(), tty)?;
    tty.print(&format!(
        "Hello {}, welcome to restohack! You are a {}.",
        world.plname, world.pl_character
    ));
    Ok(world)
}

fn run(args: Args) -> Result<(), RunError> {
    let uid = current_uid();
    let playground = ensure_playground(&args)?;

    if args.scores {
        for line in list_scores(&playground, uid, &args.players)? {
            println!("{line}");
        }
        return Ok(());
    }

    let mut flags = Flags::default();
    let mut plname = args.name.clone().unwrap_or_else(default_name);
    load_options(&mut flags, &mut plname);
    if let Some(name) = &args.name {
        plname = name.clone();
    }

    let lock_path = game_lock_path(&playground, &lock_name(uid, &plname));
    let _game_lock = acquire(&lock_path, args.lock_backend, LockPolicy::GAME, "start game")?;
    info!(name = %plname, uid, playground = %playground.display(), "starting");

    let hangup = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&hangup);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let paths = SavePaths::new(&playground, uid, &plname);
    let mut tty = Tty::stdio();
    let world = start_world(&args, &paths, uid, &plname, flags, &mut tty)?;
    let mut session = Session {
        world,
        store: paths.level_store(),
        paths,
        tty,
        backend: args.lock_backend,
        hangup,
    };
    match session.run()? {
        Ending::Finished => {}
        Ending::Saved => session.tty.print("Be seeing you..."),
        Ending::HungUp => info!("saved after hangup"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
