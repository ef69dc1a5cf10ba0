//! Sector (biome) classification
//!
//! Maps (elevation, temperature, moisture) samples to a discrete sector via
//! an ordered, first-match decision table. Bands are tunable through
//! `ClassifierBands`; the defaults are documented there.

use serde::{Deserialize, Serialize};

use crate::config::ClassifierBands;

/// Discrete terrain kind of one coordinate.
///
/// The first group is produced by the classifier; the second group never
/// comes out of generation and only appears on hand-authored static rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    // Generated wilderness sectors
    Ocean,
    ShallowWater,
    Beach,
    Marsh,
    Plains,
    Desert,
    Tundra,
    Taiga,
    Forest,
    Jungle,
    Hills,
    Mountain,
    HighMountain,

    // Static-room-only sectors
    Inside,
    City,
    Road,
    Cave,
    Lava,
}

impl Sector {
    /// Classify a terrain sample. Evaluated strictly top-down; the first
    /// matching band wins, and the bands partition the elevation range by
    /// construction.
    pub fn classify(elevation: i32, temperature: i32, moisture: i32, bands: &ClassifierBands) -> Self {
        let waterline = bands.waterline;

        // Water
        if elevation < waterline {
            if elevation > waterline - bands.shallow {
                return Sector::ShallowWater;
            }
            return Sector::Ocean;
        }

        // Marshes can replace the beach along the waterline.
        if elevation < waterline + bands.coastline {
            if moisture > 180 && temperature > 8 {
                return Sector::Marsh;
            }
            return Sector::Beach;
        }

        if elevation < waterline + bands.plains {
            if moisture > 180 && temperature > 8 {
                return Sector::Marsh;
            }
            if temperature < 8 {
                return Sector::Tundra;
            }
            if temperature > 25 && moisture < 80 {
                return Sector::Desert;
            }
            return Sector::Plains;
        }

        if elevation > 255 - bands.high_mountain {
            return Sector::HighMountain;
        }

        if elevation > 255 - bands.mountain {
            return Sector::Mountain;
        }

        if elevation > 255 - bands.hill {
            if temperature < 10 && moisture > 128 {
                return Sector::Taiga;
            }
            return Sector::Hills;
        }

        if temperature < 10 {
            return Sector::Taiga;
        }
        if temperature > 18 && moisture > 180 {
            return Sector::Jungle;
        }
        Sector::Forest
    }

    /// True for sectors a character would drown in without a boat.
    pub fn is_water(&self) -> bool {
        matches!(self, Sector::Ocean | Sector::ShallowWater)
    }

    /// Plain-text glyph for debug/ascii maps.
    pub fn glyph(&self) -> char {
        match self {
            Sector::Ocean => '=',
            Sector::ShallowWater => '~',
            Sector::Beach => ':',
            Sector::Marsh => ',',
            Sector::Plains => '.',
            Sector::Desert => 'd',
            Sector::Tundra => '_',
            Sector::Taiga => 'A',
            Sector::Forest => 'Y',
            Sector::Jungle => '&',
            Sector::Hills => 'n',
            Sector::Mountain => '^',
            Sector::HighMountain => 'M',
            Sector::Inside => 'o',
            Sector::City => 'C',
            Sector::Road => '+',
            Sector::Cave => 'c',
            Sector::Lava => 'x',
        }
    }

    /// RGB color for PNG map export.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Sector::Ocean => [0, 0, 128],
            Sector::ShallowWater => [0, 0, 255],
            Sector::Beach => [215, 208, 19],
            Sector::Marsh => [33, 146, 75],
            Sector::Plains => [0, 128, 0],
            Sector::Desert => [255, 236, 159],
            Sector::Tundra => [240, 248, 255],
            Sector::Taiga => [107, 142, 35],
            Sector::Forest => [0, 100, 0],
            Sector::Jungle => [85, 107, 47],
            Sector::Hills => [139, 69, 19],
            Sector::Mountain => [176, 176, 176],
            Sector::HighMountain => [224, 224, 224],
            Sector::Inside => [161, 161, 161],
            Sector::City => [0, 0, 0],
            Sector::Road => [97, 87, 82],
            Sector::Cave => [77, 77, 77],
            Sector::Lava => [245, 57, 0],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sector::Ocean => "ocean",
            Sector::ShallowWater => "shallow water",
            Sector::Beach => "beach",
            Sector::Marsh => "marsh",
            Sector::Plains => "plains",
            Sector::Desert => "desert",
            Sector::Tundra => "tundra",
            Sector::Taiga => "taiga",
            Sector::Forest => "forest",
            Sector::Jungle => "jungle",
            Sector::Hills => "hills",
            Sector::Mountain => "mountain",
            Sector::HighMountain => "high mountain",
            Sector::Inside => "inside",
            Sector::City => "city",
            Sector::Road => "road",
            Sector::Cave => "cave",
            Sector::Lava => "lava",
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
