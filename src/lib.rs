//! Procedural wilderness engine
//!
//! Synthesizes an unbounded seeded 2D world, classifies coordinates into
//! terrain sectors, pages the infinite coordinate space onto a finite pool
//! of room records, indexes hand-authored rooms for spatial lookup, and
//! renders terrain-aware local maps.

pub mod ascii;
pub mod config;
pub mod error;
pub mod export;
pub mod index;
pub mod map;
pub mod noise;
pub mod region;
pub mod rooms;
pub mod scheduler;
pub mod sector;
pub mod terrain;
pub mod world;
