//! Structural error types shared across the core
//!
//! [`Impossible`] is the fatal channel: a detected violation of an invariant
//! that leaves the world in an unknown state. Callers propagate it to the
//! turn driver, which saves what it can and exits.

use thiserror::Error;

use crate::entity::EntityId;

/// An invariant violation. Never absorbed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Impossible {
    #[error("{chain}: entity {id} is not on this chain")]
    NotInChain { chain: &'static str, id: EntityId },

    #[error("{chain}: entity {id} is already linked")]
    AlreadyLinked { chain: &'static str, id: EntityId },

    #[error("payload of {len} bytes exceeds the {max} byte limit")]
    PayloadLength { len: usize, max: usize },

    #[error("property index {0} out of range")]
    PropertyIndex(usize),

    #[error("{what}")]
    Inconsistent { what: String },
}

impl Impossible {
    /// Emit the fatal diagnostic and hand the error back for propagation
    pub fn report(self) -> Self {
        tracing::error!(target: "impossible", "{}", self);
        self
    }
}

/// A grid coordinate outside `[0, COLNO) x [0, ROWNO)`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("position ({x}, {y}) is outside the map")]
pub struct OutOfBounds {
    pub x: i32,
    pub y: i32,
}
