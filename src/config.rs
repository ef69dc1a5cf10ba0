//! World configuration: map extents, noise seeds and parameters, classifier
//! bands, pool sizing, visibility costs.
//!
//! Everything tunable lives here and is validated once at startup; query
//! paths never re-check.

use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WildernessError;

// =============================================================================
// SEEDS
// =============================================================================

/// Per-channel noise seeds.
///
/// Each logical field gets its own channel so the fields stay statistically
/// independent. Seeds can be set individually or derived from a master seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSeeds {
    /// Elevation field
    pub elevation: u64,
    /// Elevation distortion field (blended into elevation)
    pub elevation_distortion: u64,
    /// Moisture field
    pub moisture: u64,
    /// Weather field (3D, time-varying)
    pub weather: u64,
}

impl Default for ChannelSeeds {
    fn default() -> Self {
        Self {
            elevation: 27023,
            elevation_distortion: 1,
            moisture: 3,
            weather: 113,
        }
    }
}

impl ChannelSeeds {
    /// Derive all channel seeds deterministically from a master seed.
    pub fn from_master(master: u64) -> Self {
        Self {
            elevation: derive_seed(master, "elevation"),
            elevation_distortion: derive_seed(master, "elevation_distortion"),
            moisture: derive_seed(master, "moisture"),
            weather: derive_seed(master, "weather"),
        }
    }
}

/// Derive a sub-seed from a master seed and a system name.
fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// NOISE PARAMETERS
// =============================================================================

/// Fractal-sum parameters for one terrain field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FractalParams {
    /// Per-octave amplitude divisor
    pub persistence: f64,
    /// Per-octave frequency multiplier
    pub lacunarity: f64,
    /// Number of octaves summed
    pub octaves: u32,
}

/// Noise parameters for every generated field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub elevation: FractalParams,
    pub elevation_distortion: FractalParams,
    pub moisture: FractalParams,
    pub weather: FractalParams,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            elevation: FractalParams { persistence: 2.0, lacunarity: 2.0, octaves: 16 },
            elevation_distortion: FractalParams { persistence: 1.5, lacunarity: 2.0, octaves: 16 },
            moisture: FractalParams { persistence: 1.5, lacunarity: 2.0, octaves: 8 },
            weather: FractalParams { persistence: 2.0, lacunarity: 2.0, octaves: 8 },
        }
    }
}

// =============================================================================
// CLASSIFIER BANDS
// =============================================================================

/// Elevation band widths for the terrain classifier.
///
/// The bands partition 0..=255 elevation relative to the waterline:
/// water below it, beach/marsh within `coastline` above it, plains within
/// `plains` above it, and the high end split into hill, mountain and high
/// mountain caps measured down from 255. Defaults match the original
/// authored values; note that the waterline also feeds temperature's
/// elevation-cooling term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierBands {
    /// Elevation below which everything is water
    pub waterline: i32,
    /// Water shallower than `waterline - shallow` is ocean
    pub shallow: i32,
    /// Beach/marsh strip above the waterline
    pub coastline: i32,
    /// Plains/tundra/desert band above the coastline strip
    pub plains: i32,
    /// High-mountain cap, measured down from 255
    pub high_mountain: i32,
    /// Mountain cap, measured down from 255
    pub mountain: i32,
    /// Hill cap, measured down from 255
    pub hill: i32,
}

impl Default for ClassifierBands {
    fn default() -> Self {
        Self {
            waterline: 128,
            shallow: 20,
            coastline: 10,
            plains: 35,
            high_mountain: 40,
            mountain: 55,
            hill: 65,
        }
    }
}

// =============================================================================
// TEMPERATURE / VISIBILITY
// =============================================================================

/// Latitude-gradient temperature model parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureParams {
    /// Temperature at the equator row
    pub max_temp: i32,
    /// Temperature at the map edge farthest from the equator
    pub min_temp: i32,
    /// Y coordinate of the equator
    pub equator: i32,
}

impl Default for TemperatureParams {
    fn default() -> Self {
        Self { max_temp: 35, min_temp: -30, equator: 0 }
    }
}

/// Visibility budget and per-sector opacity costs for map ray-casting.
///
/// Each traversed tile subtracts its sector's cost from the remaining
/// budget; a high-mountain tile instead forces the budget to 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityParams {
    /// Starting budget for every ray
    pub budget: i32,
    pub mountain_cost: i32,
    pub jungle_cost: i32,
    pub forest_cost: i32,
    pub taiga_cost: i32,
    pub hills_cost: i32,
}

impl Default for VisibilityParams {
    fn default() -> Self {
        Self {
            budget: 10,
            mountain_cost: 3,
            jungle_cost: 2,
            forest_cost: 1,
            taiga_cost: 1,
            hills_cost: 1,
        }
    }
}

// =============================================================================
// CONTINENT BOXES
// =============================================================================

/// Axis-aligned bounding box placing one continent. Stored as
/// (lower-left, upper-right), inclusive of the upper edge like the
/// original authoring data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinentBox {
    pub ll_x: i32,
    pub ll_y: i32,
    pub ur_x: i32,
    pub ur_y: i32,
}

impl ContinentBox {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x > self.ll_x && x <= self.ur_x && y > self.ll_y && y <= self.ur_y
    }

    pub fn width(&self) -> i32 {
        self.ur_x - self.ll_x
    }

    pub fn height(&self) -> i32 {
        self.ur_y - self.ll_y
    }
}

// =============================================================================
// WORLD CONFIG
// =============================================================================

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Map half-extent in x: the world spans [-half_x, half_x]
    pub half_x: i32,
    /// Map half-extent in y
    pub half_y: i32,
    /// Per-channel noise seeds
    pub seeds: ChannelSeeds,
    /// Fractal parameters per field
    pub noise: NoiseParams,
    /// Classifier band widths
    pub bands: ClassifierBands,
    /// Temperature gradient model
    pub temperature: TemperatureParams,
    /// Visibility budget and opacity costs
    pub visibility: VisibilityParams,
    /// Continent placement boxes
    pub continents: Vec<ContinentBox>,
    /// Dynamic room pool capacity
    pub pool_capacity: usize,
    /// Ticks between reclamation polls on a bound slot
    pub reclaim_interval: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            half_x: 1024,
            half_y: 1024,
            seeds: ChannelSeeds::default(),
            noise: NoiseParams::default(),
            bands: ClassifierBands::default(),
            temperature: TemperatureParams::default(),
            visibility: VisibilityParams::default(),
            continents: vec![ContinentBox { ll_x: -1024, ll_y: -1024, ur_x: 1024, ur_y: 1024 }],
            pool_capacity: 2000,
            reclaim_interval: 10,
        }
    }
}

impl WorldConfig {
    /// Reject configurations that would make query-time behavior undefined.
    /// Called once by `Wilderness::new`; query paths assume a valid config.
    pub fn validate(&self) -> Result<(), WildernessError> {
        if self.half_x <= 0 || self.half_y <= 0 {
            return Err(WildernessError::InvalidConfig(format!(
                "map half-extents must be positive (got {} x {})",
                self.half_x, self.half_y
            )));
        }
        if self.pool_capacity == 0 {
            return Err(WildernessError::InvalidConfig(
                "dynamic room pool capacity must be at least 1".into(),
            ));
        }
        if self.reclaim_interval == 0 {
            return Err(WildernessError::InvalidConfig(
                "reclaim poll interval must be at least 1 tick".into(),
            ));
        }
        let b = &self.bands;
        if !(0..=255).contains(&b.waterline) {
            return Err(WildernessError::InvalidConfig(format!(
                "waterline {} outside elevation range 0..=255",
                b.waterline
            )));
        }
        for (name, v) in [
            ("shallow", b.shallow),
            ("coastline", b.coastline),
            ("plains", b.plains),
            ("high_mountain", b.high_mountain),
            ("mountain", b.mountain),
            ("hill", b.hill),
        ] {
            if v < 0 {
                return Err(WildernessError::InvalidConfig(format!(
                    "classifier band {name} must be non-negative (got {v})"
                )));
            }
        }
        // The caps must nest so the high-elevation rules stay ordered.
        if !(b.high_mountain <= b.mountain && b.mountain <= b.hill) {
            return Err(WildernessError::InvalidConfig(
                "elevation caps must nest: high_mountain <= mountain <= hill".into(),
            ));
        }
        if self.visibility.budget <= 0 {
            return Err(WildernessError::InvalidConfig(
                "visibility budget must be positive".into(),
            ));
        }
        if self.continents.is_empty() {
            return Err(WildernessError::InvalidConfig(
                "at least one continent box is required".into(),
            ));
        }
        for (i, c) in self.continents.iter().enumerate() {
            if c.width() <= 0 || c.height() <= 0 {
                return Err(WildernessError::InvalidConfig(format!(
                    "continent box {i} is degenerate ({c:?})"
                )));
            }
        }
        for p in [
            self.noise.elevation,
            self.noise.elevation_distortion,
            self.noise.moisture,
            self.noise.weather,
        ] {
            if p.octaves == 0 || p.persistence <= 0.0 || p.lacunarity <= 0.0 {
                return Err(WildernessError::InvalidConfig(format!(
                    "fractal parameters must be positive ({p:?})"
                )));
            }
        }
        Ok(())
    }

    /// Clamp a coordinate to the configured extents. Policy for
    /// out-of-extent queries: clamp, keeping every public operation total.
    pub fn clamp_coords(&self, x: i32, y: i32) -> (i32, i32) {
        (x.clamp(-self.half_x, self.half_x), y.clamp(-self.half_y, self.half_y))
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, WildernessError> {
        let file = File::open(path)
            .map_err(|e| WildernessError::InvalidConfig(format!("{}: {e}", path.display())))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| WildernessError::InvalidConfig(format!("{}: {e}", path.display())))
    }

    /// Save this configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), WildernessError> {
        let file = File::create(path)
            .map_err(|e| WildernessError::InvalidConfig(format!("{}: {e}", path.display())))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| WildernessError::InvalidConfig(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_pool() {
        let cfg = WorldConfig { pool_capacity: 0, ..WorldConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_extents() {
        let cfg = WorldConfig { half_x: 0, ..WorldConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_unnested_caps() {
        let mut cfg = WorldConfig::default();
        cfg.bands.high_mountain = 100;
        cfg.bands.mountain = 50;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_derived_seeds_are_stable_and_distinct() {
        let a = ChannelSeeds::from_master(12345);
        let b = ChannelSeeds::from_master(12345);
        assert_eq!(a, b);
        assert_ne!(a.elevation, a.moisture);
        assert_ne!(a.elevation, a.elevation_distortion);
    }

    #[test]
    fn test_clamp_coords() {
        let cfg = WorldConfig::default();
        assert_eq!(cfg.clamp_coords(5000, -5000), (1024, -1024));
        assert_eq!(cfg.clamp_coords(10, 20), (10, 20));
    }
}
