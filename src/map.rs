//! Map rendering and terrain-aware visibility
//!
//! Builds a square tile grid around a center coordinate from the terrain
//! pipeline, overlays region and static-room data, then ray-casts from the
//! center to every edge tile, spending a visibility budget on intervening
//! terrain. The grid is recomputed in full on every call; nothing is
//! cached between renders.

use crate::config::{ClassifierBands, VisibilityParams};
use crate::index::SpatialIndex;
use crate::region::RegionResolver;
use crate::rooms::StaticRoom;
use crate::sector::Sector;
use crate::terrain::TerrainPipeline;

/// One rendered tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapTile {
    pub sector: Sector,
    /// Set by the visibility pass; invisible tiles render blank.
    pub visible: bool,
    /// Weather intensity 0..=255 at render time
    pub weather: u8,
}

/// Square grid of (2·radius + 1)² tiles centered on a world coordinate.
/// Grid x runs west→east, grid y runs south→north.
#[derive(Clone)]
pub struct MapGrid {
    center_x: i32,
    center_y: i32,
    radius: i32,
    size: usize,
    tiles: Vec<MapTile>,
}

impl MapGrid {
    pub fn new(center_x: i32, center_y: i32, radius: i32) -> Self {
        let size = (2 * radius.max(0) + 1) as usize;
        Self {
            center_x,
            center_y,
            radius: radius.max(0),
            size,
            tiles: vec![
                MapTile { sector: Sector::Ocean, visible: false, weather: 0 };
                size * size
            ],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn center(&self) -> (i32, i32) {
        (self.center_x, self.center_y)
    }

    /// World coordinate of a grid cell.
    pub fn world_coords(&self, gx: usize, gy: usize) -> (i32, i32) {
        (
            self.center_x - self.radius + gx as i32,
            self.center_y - self.radius + gy as i32,
        )
    }

    pub fn get(&self, gx: usize, gy: usize) -> &MapTile {
        &self.tiles[gy * self.size + gx]
    }

    pub fn get_mut(&mut self, gx: usize, gy: usize) -> &mut MapTile {
        &mut self.tiles[gy * self.size + gx]
    }

    /// Tile at an offset from the center, e.g. (1, 0) is one tile east.
    pub fn tile_at_offset(&self, dx: i32, dy: i32) -> &MapTile {
        let gx = (self.radius + dx) as usize;
        let gy = (self.radius + dy) as usize;
        self.get(gx, gy)
    }
}

// =============================================================================
// RENDERER
// =============================================================================

/// Borrows the engine parts a render needs; construct per call site, not
/// per frame.
pub struct MapRenderer<'a> {
    pub terrain: &'a TerrainPipeline,
    pub bands: &'a ClassifierBands,
    pub index: &'a SpatialIndex,
    pub static_rooms: &'a [StaticRoom],
    pub regions: &'a dyn RegionResolver,
    pub visibility: &'a VisibilityParams,
}

impl MapRenderer<'_> {
    /// Build the tile grid around (center_x, center_y) and run the
    /// visibility pass. `time_base` is the weather phase in [0, 1).
    pub fn render(&self, center_x: i32, center_y: i32, radius: i32, time_base: f64) -> MapGrid {
        let mut grid = MapGrid::new(center_x, center_y, radius);
        let size = grid.size();

        // Base tiles from the generated terrain, with region overrides.
        for gy in 0..size {
            for gx in 0..size {
                let (wx, wy) = grid.world_coords(gx, gy);
                let mut sector = self.terrain.sector(wx, wy, self.bands);
                if let Some(region) = self.regions.resolve_region(wx, wy) {
                    if let Some(s) = region.sector_override {
                        sector = s;
                    }
                }
                let weather = self.terrain.weather(wx, wy, time_base) as u8;
                *grid.get_mut(gx, gy) = MapTile { sector, visible: false, weather };
            }
        }

        // Authored rooms win over anything generated at their coordinate.
        for (wx, wy, id) in self.index.range(center_x, center_y, radius + 1) {
            let gx = wx - (center_x - radius);
            let gy = wy - (center_y - radius);
            if (0..size as i32).contains(&gx) && (0..size as i32).contains(&gy) {
                if let Some(room) = self.static_rooms.get(id) {
                    grid.get_mut(gx as usize, gy as usize).sector = room.sector;
                }
            }
        }

        compute_visibility(&mut grid, self.visibility);
        grid
    }
}

// =============================================================================
// VISIBILITY
// =============================================================================

/// Opacity cost one tile charges a passing ray. High mountains are handled
/// separately: they clamp the remaining budget instead of subtracting.
fn opacity_cost(sector: Sector, params: &VisibilityParams) -> i32 {
    match sector {
        Sector::Mountain => params.mountain_cost,
        Sector::Jungle => params.jungle_cost,
        Sector::Forest => params.forest_cost,
        Sector::Taiga => params.taiga_cost,
        Sector::Hills => params.hills_cost,
        _ => 0,
    }
}

/// Recompute the `visible` flag of every tile by casting a ray from the
/// center to each tile on the grid's outer edge.
pub fn compute_visibility(grid: &mut MapGrid, params: &VisibilityParams) {
    let size = grid.size();
    for t in grid.tiles.iter_mut() {
        t.visible = false;
    }

    let last = size - 1;
    for i in 0..size {
        line_vis(grid, i, 0, params);
        line_vis(grid, i, last, params);
        line_vis(grid, 0, i, params);
        line_vis(grid, last, i, params);
    }
}

/// Walk one ray from the center to (x2, y2) with an integer Bresenham
/// line, spending the visibility budget on each traversed tile. A tile is
/// visible when the rounded Euclidean distance from the center still fits
/// in the remaining budget.
fn line_vis(grid: &mut MapGrid, x2: usize, y2: usize, params: &VisibilityParams) {
    let center = grid.radius() as i64;
    let (orig_x, orig_y) = (center, center);
    let (mut x, mut y) = (center, center);
    let mut budget = params.budget;

    let w = x2 as i64 - x;
    let h = y2 as i64 - y;
    let dx1 = w.signum();
    let dy1 = h.signum();
    let (mut dx2, mut dy2) = (w.signum(), 0);

    let mut longest = w.abs();
    let mut shortest = h.abs();
    if longest <= shortest {
        std::mem::swap(&mut longest, &mut shortest);
        dy2 = h.signum();
        dx2 = 0;
    }

    let mut numerator = longest >> 1;
    for _ in 0..=longest {
        let tile = grid.get_mut(x as usize, y as usize);
        match tile.sector {
            // An impassable wall of rock: whatever is left collapses to 1.
            Sector::HighMountain => budget = 1,
            s => budget -= opacity_cost(s, params),
        }

        let dist = (((x - orig_x).pow(2) + (y - orig_y).pow(2)) as f64).sqrt().round() as i64;
        if dist <= budget as i64 {
            tile.visible = true;
        }

        numerator += shortest;
        if numerator >= longest {
            numerator -= longest;
            x += dx1;
            y += dy1;
        } else {
            x += dx2;
            y += dy2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisibilityParams;

    /// Grid with uniform terrain, for visibility-only tests.
    fn flat_grid(radius: i32, sector: Sector) -> MapGrid {
        let mut grid = MapGrid::new(0, 0, radius);
        let size = grid.size();
        for gy in 0..size {
            for gx in 0..size {
                grid.get_mut(gx, gy).sector = sector;
            }
        }
        grid
    }

    #[test]
    fn test_open_terrain_is_fully_visible() {
        let mut grid = flat_grid(5, Sector::Plains);
        compute_visibility(&mut grid, &VisibilityParams::default());
        let size = grid.size();
        for gy in 0..size {
            for gx in 0..size {
                assert!(grid.get(gx, gy).visible, "({gx},{gy}) should be visible");
            }
        }
    }

    #[test]
    fn test_high_mountain_occludes_tiles_behind_it() {
        let mut grid = flat_grid(2, Sector::Plains);
        // One high-mountain tile directly east of the center.
        grid.get_mut(3, 2).sector = Sector::HighMountain;
        compute_visibility(&mut grid, &VisibilityParams::default());

        // The mountain itself is visible; the tile behind it is not.
        assert!(grid.tile_at_offset(1, 0).visible);
        assert!(!grid.tile_at_offset(2, 0).visible);
        // A ray with no mountain is unaffected.
        assert!(grid.tile_at_offset(0, 1).visible);
        assert!(grid.tile_at_offset(0, 2).visible);
        // Center is always visible.
        assert!(grid.tile_at_offset(0, 0).visible);
    }

    #[test]
    fn test_center_visible_even_inside_high_mountain() {
        let mut grid = flat_grid(3, Sector::HighMountain);
        compute_visibility(&mut grid, &VisibilityParams::default());
        assert!(grid.tile_at_offset(0, 0).visible);
        // Standing in a wall of peaks, the neighbors are still in reach.
        assert!(grid.tile_at_offset(1, 0).visible);
        assert!(!grid.tile_at_offset(2, 0).visible);
    }

    #[test]
    fn test_forest_erodes_the_budget_gradually() {
        let mut grid = flat_grid(10, Sector::Forest);
        compute_visibility(&mut grid, &VisibilityParams::default());
        // Budget 10, forest costs 1 per tile including the center: after k
        // eastward tiles the budget is 10 - (k + 1), so distance 4 fits
        // (4 <= 5) and distance 6 does not (6 > 3).
        assert!(grid.tile_at_offset(4, 0).visible);
        assert!(!grid.tile_at_offset(6, 0).visible);
    }

    #[test]
    fn test_grid_world_coords() {
        let grid = MapGrid::new(100, -50, 3);
        assert_eq!(grid.world_coords(0, 0), (97, -53));
        assert_eq!(grid.world_coords(3, 3), (100, -50));
        assert_eq!(grid.world_coords(6, 6), (103, -47));
    }
}
