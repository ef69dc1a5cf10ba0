//! Plain-text map rendering
//!
//! Turns a rendered `MapGrid` into a string of glyphs for debugging and
//! the CLI. Invisible tiles print blank, the center prints `*`, and the
//! grid can be clipped to the traditional circular viewport. No color or
//! markup; presentation beyond plain text belongs to the game layer.

use std::fs::File;
use std::io::{self, Write};

use crate::map::MapGrid;

/// Viewport shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapShape {
    /// Clip to a circle of the grid's radius (the in-game look)
    Circle,
    /// Show the full square grid
    Rect,
}

/// What the glyphs show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapView {
    /// Terrain sectors
    Terrain,
    /// Terrain with storm fronts overlaid on top
    Weather,
}

/// Weather intensity above which a storm glyph replaces the terrain.
const STORM_THRESHOLD: u8 = 178;

fn storm_glyph(weather: u8) -> char {
    if weather >= 225 {
        'L' // lightning
    } else if weather >= 200 {
        'R' // heavy rain
    } else {
        'r'
    }
}

/// Render a grid to text, north at the top.
pub fn render_to_string(grid: &MapGrid, shape: MapShape, view: MapView) -> String {
    let size = grid.size();
    let radius = grid.radius();
    let mut out = String::with_capacity(size * (size + 1));

    for gy in (0..size).rev() {
        for gx in 0..size {
            let dx = gx as i32 - radius;
            let dy = gy as i32 - radius;

            let inside = match shape {
                MapShape::Rect => true,
                MapShape::Circle => (((dx * dx + dy * dy) as f64).sqrt()) <= (radius + 1) as f64,
            };
            if !inside {
                out.push(' ');
                continue;
            }

            if dx == 0 && dy == 0 {
                out.push('*');
                continue;
            }

            let tile = grid.get(gx, gy);
            if !tile.visible {
                out.push(' ');
                continue;
            }

            match view {
                MapView::Terrain => out.push(tile.sector.glyph()),
                MapView::Weather => {
                    if tile.weather >= STORM_THRESHOLD {
                        out.push(storm_glyph(tile.weather));
                    } else {
                        out.push(tile.sector.glyph());
                    }
                }
            }
        }
        out.push('\n');
    }

    out
}

/// Write a rendered map to a text file.
pub fn export_ascii(grid: &MapGrid, shape: MapShape, view: MapView, path: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(render_to_string(grid, shape, view).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisibilityParams;
    use crate::map::{compute_visibility, MapGrid};
    use crate::sector::Sector;

    fn plains_grid(radius: i32) -> MapGrid {
        let mut grid = MapGrid::new(0, 0, radius);
        for gy in 0..grid.size() {
            for gx in 0..grid.size() {
                grid.get_mut(gx, gy).sector = Sector::Plains;
            }
        }
        compute_visibility(&mut grid, &VisibilityParams::default());
        grid
    }

    #[test]
    fn test_center_marker_and_dimensions() {
        let grid = plains_grid(2);
        let text = render_to_string(&grid, MapShape::Rect, MapView::Terrain);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.chars().count() == 5));
        // Center of the middle row.
        assert_eq!(lines[2].chars().nth(2), Some('*'));
        // Everything else is visible plains.
        assert_eq!(lines[0], ".....");
    }

    #[test]
    fn test_circle_clip_blanks_corners() {
        let grid = plains_grid(3);
        let text = render_to_string(&grid, MapShape::Circle, MapView::Terrain);
        let lines: Vec<&str> = text.lines().collect();
        // Corner tiles are at distance ~4.24 > radius + 1.
        assert_eq!(lines[0].chars().next(), Some(' '));
        assert_eq!(lines[0].chars().nth(3), Some('.'));
    }

    #[test]
    fn test_weather_view_overlays_storms() {
        let mut grid = plains_grid(1);
        grid.get_mut(0, 0).weather = 230;
        grid.get_mut(2, 0).weather = 201;
        grid.get_mut(0, 2).weather = 180;
        let text = render_to_string(&grid, MapShape::Rect, MapView::Weather);
        let lines: Vec<&str> = text.lines().collect();

        // Grid y is flipped in the output: (0, 0) prints on the last line.
        assert_eq!(lines[2].chars().next(), Some('L'));
        assert_eq!(lines[2].chars().nth(2), Some('R'));
        assert_eq!(lines[0].chars().next(), Some('r'));
    }
}
