//! Crate-level error type.

use thiserror::Error;

/// Errors surfaced by the wilderness engine. Terrain sampling and
/// classification are total functions and never appear here.
#[derive(Debug, Error)]
pub enum WildernessError {
    /// Every slot in the dynamic room pool is bound. Fatal to the request
    /// that needed a room, not to the process.
    #[error("dynamic room pool exhausted ({capacity} slots bound)")]
    PoolExhausted { capacity: usize },

    /// Configuration rejected at startup.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A slot id outside the pool.
    #[error("no such pool slot: {0}")]
    NoSuchSlot(usize),

    /// Attempted to bind a slot that is already bound.
    #[error("pool slot {0} is already bound")]
    SlotBusy(usize),

    /// Attempted to bind a coordinate that another slot already holds.
    #[error("a slot is already bound at ({x}, {y})")]
    DuplicateBinding { x: i32, y: i32 },
}
