//! rh-core: World state, entity model and save codec for restohack
//!
//! Everything that mutates the dungeon lives here: the resident level and its
//! entity chains, the player and their timed properties, the level store that
//! swaps levels in and out of backing files, and the portable binary codec
//! used for both level files and the whole-game save.
//!
//! Rendering and input are not part of this crate. The core talks to them
//! through [`world::Interface`].

pub mod consts;
pub mod dungeon;
pub mod entity;
pub mod monster;
pub mod object;
pub mod player;
pub mod rng;
pub mod save;
pub mod world;

pub use dungeon::{Level, Pos};
pub use entity::{Chain, EntityId, IdAllocator};
pub use rng::GameRng;
pub use world::{Interface, WorldState};
