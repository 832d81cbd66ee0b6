//! Portable binary save codec (save.c, restore.c)
//!
//! Every multi-byte field is written big-endian, one field at a time, so the
//! bytes never depend on the writer's struct layout or byte order. Pointers
//! never reach the file: references travel as entity ids or small table
//! indices and are resolved again after loading.
//!
//! The same codec serves the per-level backing files and the whole-game
//! save; both start with the versioned [`header`].

mod codec;
pub mod header;
mod level;
mod player;
mod records;

pub use codec::{SaveReader, SaveWriter};
pub use header::{check_header, write_header, ENDIAN_TAG, MAGIC, VERSION};
pub use level::{read_level, write_level};
pub use player::{read_you, resolve_surrogates, write_you, SICK_GENERIC, SICK_NONE};
pub use records::{read_chain, write_chain, Persist, CHAIN_END};

use hashbrown::HashSet;
use thiserror::Error;
use tracing::warn;

use crate::entity::{EntityId, IdAllocator};
use crate::world::Impossible;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a restohack save file (old or foreign format).")]
    UnrecognizedFormat,

    #[error("Save file has byte-order tag {found:#010x}; it was written on an incompatible machine.")]
    EndianMismatch { found: u32 },

    #[error("Save file version {found} is not supported (this is version {expected}).")]
    VersionMismatch { found: u16, expected: u16 },

    #[error("Saved game was not yours.")]
    NotYours { owner: u32 },

    #[error("Corrupted save file: {0}")]
    Corrupted(String),

    #[error(transparent)]
    Impossible(#[from] Impossible),
}

/// Repairs made while restoring. Each one is logged as it happens.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub diagnostics: Vec<String>,
}

impl RestoreReport {
    pub fn note(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!(target: "restore", "{msg}");
        self.diagnostics.push(msg);
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Id bookkeeping for one restore pass
pub struct RestoreCtx<'a> {
    ids: &'a mut IdAllocator,
    seen: HashSet<EntityId>,
    pub report: RestoreReport,
}

impl<'a> RestoreCtx<'a> {
    pub fn new(ids: &'a mut IdAllocator) -> Self {
        Self {
            ids,
            seen: HashSet::new(),
            report: RestoreReport::default(),
        }
    }

    /// Accept a restored id. Id 0 gets a fresh one; a repeat is corruption.
    pub fn claim(&mut self, id: EntityId) -> Result<EntityId, SaveError> {
        let id = if id.is_none() {
            let fresh = self.ids.fresh();
            self.report
                .note(format!("record without an id was given {fresh}"));
            fresh
        } else {
            id
        };
        if !self.seen.insert(id) {
            return Err(SaveError::Corrupted(format!("entity {id} appears twice")));
        }
        self.ids.ensure_above(id);
        Ok(id)
    }

    pub fn into_report(self) -> RestoreReport {
        self.report
    }
}
