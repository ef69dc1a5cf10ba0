//! Wilderness facade
//!
//! Owns the terrain pipeline, the static-room set and its spatial index,
//! the dynamic room pool and the reclamation scheduler, and exposes the
//! operations the game layer consumes: resolving coordinates to rooms,
//! materializing rooms on demand, rendering local maps, and ticking the
//! reclamation clock.

use tracing::info;

use crate::config::WorldConfig;
use crate::error::WildernessError;
use crate::index::{SpatialIndex, StaticRoomId};
use crate::map::{MapGrid, MapRenderer};
use crate::region::{NoRegions, RegionResolver};
use crate::rooms::{OccupancySource, RoomPool, SlotId, StaticRoom};
use crate::scheduler::ReclaimScheduler;
use crate::sector::Sector;
use crate::terrain::TerrainPipeline;

/// Longest river the tracer will follow before giving up.
const RIVER_MAX_VERTICES: usize = 1024;

/// Reference to a live room record.
///
/// `Static` handles index the static-room list as of the last rebuild and
/// are invalidated by any static-room edit, exactly like the spatial
/// index itself. `Dynamic` handles stay valid until the slot is reclaimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomHandle {
    Static(StaticRoomId),
    Dynamic(SlotId),
}

pub struct Wilderness {
    config: WorldConfig,
    terrain: TerrainPipeline,
    static_rooms: Vec<StaticRoom>,
    index: SpatialIndex,
    pool: RoomPool,
    scheduler: ReclaimScheduler,
    regions: Box<dyn RegionResolver>,
    /// Last tick seen by `tick`; new reclaim checks are armed against it.
    clock: u64,
}

impl Wilderness {
    /// Build an engine with no region data. Validates the configuration up
    /// front; query paths assume it is sound.
    pub fn new(config: WorldConfig) -> Result<Self, WildernessError> {
        Self::with_regions(config, Box::new(NoRegions))
    }

    /// Build an engine backed by an external region store.
    pub fn with_regions(
        config: WorldConfig,
        regions: Box<dyn RegionResolver>,
    ) -> Result<Self, WildernessError> {
        config.validate()?;
        info!(
            half_x = config.half_x,
            half_y = config.half_y,
            pool = config.pool_capacity,
            "initializing wilderness engine"
        );
        Ok(Self {
            terrain: TerrainPipeline::new(&config),
            static_rooms: Vec::new(),
            index: SpatialIndex::new(),
            pool: RoomPool::new(config.pool_capacity),
            scheduler: ReclaimScheduler::new(config.reclaim_interval),
            regions,
            clock: 0,
            config,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn terrain(&self) -> &TerrainPipeline {
        &self.terrain
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn pool(&self) -> &RoomPool {
        &self.pool
    }

    pub fn static_rooms(&self) -> &[StaticRoom] {
        &self.static_rooms
    }

    pub fn static_room(&self, id: StaticRoomId) -> Option<&StaticRoom> {
        self.static_rooms.get(id)
    }

    // =========================================================================
    // STATIC ROOM EDITS
    // =========================================================================

    /// Add a batch of authored rooms and rebuild the index once. Handles
    /// from before this call are invalid afterwards.
    pub fn add_static_rooms(&mut self, rooms: impl IntoIterator<Item = StaticRoom>) {
        self.static_rooms.extend(rooms);
        self.index.rebuild(&self.static_rooms);
    }

    /// Remove the authored room at (x, y), if any, and rebuild the index.
    pub fn remove_static_room(&mut self, x: i32, y: i32) -> Option<StaticRoom> {
        let pos = self.static_rooms.iter().position(|r| r.x == x && r.y == y)?;
        let room = self.static_rooms.remove(pos);
        self.index.rebuild(&self.static_rooms);
        Some(room)
    }

    // =========================================================================
    // ROOM RESOLUTION
    // =========================================================================

    /// Find the room at a coordinate without creating one: authored rooms
    /// first, then the dynamic pool.
    pub fn resolve(&self, x: i32, y: i32) -> Option<RoomHandle> {
        let (x, y) = self.config.clamp_coords(x, y);
        if let Some(id) = self.index.nearest_exact(x, y) {
            return Some(RoomHandle::Static(id));
        }
        self.pool.lookup(x, y).map(RoomHandle::Dynamic)
    }

    /// Resolve a coordinate, materializing a dynamic room if nothing lives
    /// there yet. Pool exhaustion fails this request only.
    pub fn materialize(&mut self, x: i32, y: i32) -> Result<RoomHandle, WildernessError> {
        let (x, y) = self.config.clamp_coords(x, y);
        if let Some(handle) = self.resolve(x, y) {
            return Ok(handle);
        }

        let id = self.pool.allocate()?;
        self.pool
            .bind(id, x, y, &self.terrain, &self.config.bands, self.regions.as_ref())?;
        self.scheduler.schedule(id, self.clock);
        Ok(RoomHandle::Dynamic(id))
    }

    /// Advance the cooperative clock, running every reclaim check that has
    /// come due. Returns the number of slots freed.
    pub fn tick(&mut self, now: u64, occupancy: &dyn OccupancySource) -> usize {
        self.clock = now;
        self.scheduler.advance(now, &mut self.pool, occupancy)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Effective sector at a coordinate: authored room, then region
    /// override, then the generated terrain.
    pub fn sector_at(&self, x: i32, y: i32) -> Sector {
        let (x, y) = self.config.clamp_coords(x, y);
        if let Some(id) = self.index.nearest_exact(x, y) {
            return self.static_rooms[id].sector;
        }
        if let Some(region) = self.regions.resolve_region(x, y) {
            if let Some(sector) = region.sector_override {
                return sector;
            }
        }
        self.terrain.sector(x, y, &self.config.bands)
    }

    /// Render the local map around a center. `time_base` is the weather
    /// phase in [0, 1), normally derived from the wall clock.
    pub fn render(&self, center_x: i32, center_y: i32, radius: i32, time_base: f64) -> MapGrid {
        let (cx, cy) = self.config.clamp_coords(center_x, center_y);
        MapRenderer {
            terrain: &self.terrain,
            bands: &self.config.bands,
            index: &self.index,
            static_rooms: &self.static_rooms,
            regions: self.regions.as_ref(),
            visibility: &self.config.visibility,
        }
        .render(cx, cy, radius, time_base)
    }

    /// Trace a river downhill from (x, y) by gradient descent until it
    /// reaches water, refusing to double back or revisit a tile. Returns
    /// the path vertices; persisting them is the caller's concern.
    pub fn trace_river(&self, x: i32, y: i32) -> Vec<(i32, i32)> {
        let (mut x, mut y) = self.config.clamp_coords(x, y);
        let mut vertices: Vec<(i32, i32)> = Vec::new();
        let mut came_from: Option<(i32, i32)> = None;

        while !self.sector_at(x, y).is_water() {
            if vertices.len() == RIVER_MAX_VERTICES {
                break;
            }
            vertices.push((x, y));

            let here = self.terrain.elevation(x, y);
            let mut next: Option<(i32, i32, i32)> = None;
            for (nx, ny) in [(x, y + 1), (x + 1, y), (x, y - 1), (x - 1, y)] {
                if came_from == Some((nx, ny)) || vertices.contains(&(nx, ny)) {
                    continue;
                }
                let elev = self.terrain.elevation(nx, ny);
                if elev < next.map_or(here, |(_, _, e)| e) {
                    next = Some((nx, ny, elev));
                }
            }

            // A local pit with no fresh downhill neighbor ends the river.
            let Some((nx, ny, _)) = next else { break };
            came_from = Some((x, y));
            (x, y) = (nx, ny);
        }

        vertices
    }
}
