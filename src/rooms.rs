//! Static rooms and the dynamic room pool
//!
//! The wilderness is unbounded but the set of live room records is not:
//! hand-authored static rooms exist for the whole process lifetime, while
//! every other coordinate is paged onto a fixed pool of reassignable
//! slots. A slot is either `Free` or `Bound`; binding and occupancy are a
//! single state, so a bound-but-unmarked slot cannot exist.

use tracing::{debug, warn};

use crate::config::ClassifierBands;
use crate::error::WildernessError;
use crate::region::{RegionInfo, RegionResolver};
use crate::sector::Sector;
use crate::terrain::TerrainPipeline;

/// Name given to dynamic rooms outside any named region.
pub const GENERIC_WILDERNESS_NAME: &str = "The Wilderness";
/// Description shared by all generated wilderness rooms.
pub const GENERIC_WILDERNESS_DESC: &str = "The wilderness extends in all directions.";

// =============================================================================
// STATIC ROOMS
// =============================================================================

/// A permanently authored room bound to one coordinate for its entire
/// lifetime. Created at world load, removed only by an explicit edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticRoom {
    pub x: i32,
    pub y: i32,
    pub name: String,
    pub description: String,
    pub sector: Sector,
}

// =============================================================================
// DYNAMIC POOL
// =============================================================================

/// Index of a slot in the dynamic room pool.
pub type SlotId = usize;

/// Metadata of one bound slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundRoom {
    pub x: i32,
    pub y: i32,
    pub name: String,
    pub description: String,
    pub sector: Sector,
    /// Effect tags inherited from the covering region, if any
    pub effects: Vec<String>,
}

/// One reassignable room record.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Slot {
    #[default]
    Free,
    Bound(BoundRoom),
}

impl Slot {
    pub fn is_free(&self) -> bool {
        matches!(self, Slot::Free)
    }
}

/// Occupancy counts a reclaim check inspects, supplied by the game layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OccupancyReport {
    /// Characters (players or mobiles) standing in the room
    pub occupants: usize,
    /// Objects lying in the room
    pub items: usize,
    /// Active room-level status effects
    pub effects: usize,
    /// Timed work attached to the room, including the reclaim check itself
    pub pending_tasks: usize,
}

/// Presence queries against the game state, injected so the reclamation
/// predicate stays a pure function.
pub trait OccupancySource {
    fn occupancy(&self, slot: SlotId) -> OccupancyReport;
}

/// Occupancy source for tests and tools: every room is empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOccupants;

impl OccupancySource for NoOccupants {
    fn occupancy(&self, _slot: SlotId) -> OccupancyReport {
        OccupancyReport::default()
    }
}

/// A bound slot may be reclaimed only when nothing is present and no timed
/// work remains beyond the reclaim check asking.
pub fn is_reclaimable(report: &OccupancyReport) -> bool {
    report.occupants == 0 && report.items == 0 && report.effects == 0 && report.pending_tasks <= 1
}

/// Fixed-capacity pool of reassignable room slots.
///
/// Lookups and allocation are linear scans; capacity stays small enough
/// that this bound is acceptable, and swapping in a coordinate map would
/// not change observable behavior.
pub struct RoomPool {
    slots: Vec<Slot>,
}

impl RoomPool {
    pub fn new(capacity: usize) -> Self {
        Self { slots: vec![Slot::Free; capacity] }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_free()).count()
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id)
    }

    /// Find the slot bound to (x, y), if any. Callers decide whether a miss
    /// means "allocate one" or "no room here".
    pub fn lookup(&self, x: i32, y: i32) -> Option<SlotId> {
        self.slots.iter().position(
            |s| matches!(s, Slot::Bound(b) if b.x == x && b.y == y),
        )
    }

    /// Claim the first free slot. Exhaustion is a hard failure; there is no
    /// eviction-under-pressure path.
    pub fn allocate(&mut self) -> Result<SlotId, WildernessError> {
        match self.slots.iter().position(|s| s.is_free()) {
            Some(id) => Ok(id),
            None => {
                warn!(capacity = self.capacity(), "dynamic room pool exhausted");
                Err(WildernessError::PoolExhausted { capacity: self.capacity() })
            }
        }
    }

    /// Bind a free slot to a coordinate: classify the terrain there, take
    /// the covering region's name (or the generic wilderness name) and mark
    /// the slot bound, all in one step.
    pub fn bind(
        &mut self,
        id: SlotId,
        x: i32,
        y: i32,
        terrain: &TerrainPipeline,
        bands: &ClassifierBands,
        regions: &dyn RegionResolver,
    ) -> Result<(), WildernessError> {
        if id >= self.slots.len() {
            return Err(WildernessError::NoSuchSlot(id));
        }
        if !self.slots[id].is_free() {
            return Err(WildernessError::SlotBusy(id));
        }
        if self.lookup(x, y).is_some() {
            return Err(WildernessError::DuplicateBinding { x, y });
        }

        let mut sector = terrain.sector(x, y, bands);
        let mut name = GENERIC_WILDERNESS_NAME.to_string();
        let mut effects = Vec::new();

        if let Some(RegionInfo { name: region_name, sector_override, effects: region_effects }) =
            regions.resolve_region(x, y)
        {
            name = region_name;
            effects = region_effects;
            if let Some(s) = sector_override {
                sector = s;
            }
        }

        debug!(slot = id, x, y, %sector, "binding dynamic room");
        self.slots[id] = Slot::Bound(BoundRoom {
            x,
            y,
            name,
            description: GENERIC_WILDERNESS_DESC.to_string(),
            sector,
            effects,
        });
        Ok(())
    }

    /// One reclamation poll: free the slot if nothing holds it. Returns
    /// true when the slot was freed (the poll must not be re-armed), false
    /// when it stays bound. Polling a free slot is a no-op that also stops
    /// re-arming.
    pub fn reclaim_check(&mut self, id: SlotId, occupancy: &dyn OccupancySource) -> bool {
        match self.slots.get(id) {
            Some(Slot::Bound(b)) => {
                let report = occupancy.occupancy(id);
                if is_reclaimable(&report) {
                    debug!(slot = id, x = b.x, y = b.y, "reclaiming idle dynamic room");
                    self.slots[id] = Slot::Free;
                    true
                } else {
                    false
                }
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::region::NoRegions;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn fixture() -> (RoomPool, TerrainPipeline, ClassifierBands) {
        let cfg = WorldConfig::default();
        (RoomPool::new(8), TerrainPipeline::new(&cfg), cfg.bands)
    }

    #[test]
    fn test_bind_marks_bound_and_lookup_finds_it() {
        let (mut pool, terrain, bands) = fixture();
        let id = pool.allocate().unwrap();
        pool.bind(id, 5, 5, &terrain, &bands, &NoRegions).unwrap();

        assert_eq!(pool.lookup(5, 5), Some(id));
        assert_eq!(pool.bound_count(), 1);
        match pool.slot(id).unwrap() {
            Slot::Bound(b) => {
                assert_eq!((b.x, b.y), (5, 5));
                assert_eq!(b.name, GENERIC_WILDERNESS_NAME);
            }
            Slot::Free => panic!("slot should be bound"),
        }
    }

    #[test]
    fn test_pool_exhaustion_is_reported() {
        let (mut pool, terrain, bands) = fixture();
        for i in 0..pool.capacity() {
            let id = pool.allocate().unwrap();
            pool.bind(id, i as i32, 0, &terrain, &bands, &NoRegions).unwrap();
        }
        assert!(matches!(
            pool.allocate(),
            Err(WildernessError::PoolExhausted { capacity: 8 })
        ));
    }

    #[test]
    fn test_duplicate_coordinate_rejected() {
        let (mut pool, terrain, bands) = fixture();
        let a = pool.allocate().unwrap();
        pool.bind(a, 3, 4, &terrain, &bands, &NoRegions).unwrap();
        let b = pool.allocate().unwrap();
        assert!(matches!(
            pool.bind(b, 3, 4, &terrain, &bands, &NoRegions),
            Err(WildernessError::DuplicateBinding { x: 3, y: 4 })
        ));
    }

    #[test]
    fn test_region_supplies_name_and_sector() {
        struct Fens;
        impl RegionResolver for Fens {
            fn resolve_region(&self, _x: i32, _y: i32) -> Option<RegionInfo> {
                Some(RegionInfo {
                    name: "The Whispering Fens".into(),
                    sector_override: Some(Sector::Marsh),
                    effects: vec!["misty".into()],
                })
            }
        }

        let (mut pool, terrain, bands) = fixture();
        let id = pool.allocate().unwrap();
        pool.bind(id, 0, 0, &terrain, &bands, &Fens).unwrap();
        match pool.slot(id).unwrap() {
            Slot::Bound(b) => {
                assert_eq!(b.name, "The Whispering Fens");
                assert_eq!(b.sector, Sector::Marsh);
                assert_eq!(b.effects, vec!["misty".to_string()]);
            }
            Slot::Free => panic!("slot should be bound"),
        }
    }

    #[test]
    fn test_reclaim_frees_empty_room_in_one_poll() {
        let (mut pool, terrain, bands) = fixture();
        let id = pool.allocate().unwrap();
        pool.bind(id, 5, 5, &terrain, &bands, &NoRegions).unwrap();

        assert!(pool.reclaim_check(id, &NoOccupants));
        assert!(pool.slot(id).unwrap().is_free());
        assert_eq!(pool.lookup(5, 5), None);
    }

    #[test]
    fn test_reclaim_keeps_occupied_room() {
        struct OnePlayer;
        impl OccupancySource for OnePlayer {
            fn occupancy(&self, _slot: SlotId) -> OccupancyReport {
                OccupancyReport { occupants: 1, pending_tasks: 1, ..Default::default() }
            }
        }

        let (mut pool, terrain, bands) = fixture();
        let id = pool.allocate().unwrap();
        pool.bind(id, 5, 5, &terrain, &bands, &NoRegions).unwrap();

        assert!(!pool.reclaim_check(id, &OnePlayer));
        assert_eq!(pool.lookup(5, 5), Some(id));
    }

    #[test]
    fn test_reclaim_predicate() {
        // Only the reclaim check's own pending task may remain.
        assert!(is_reclaimable(&OccupancyReport { pending_tasks: 1, ..Default::default() }));
        assert!(is_reclaimable(&OccupancyReport::default()));
        assert!(!is_reclaimable(&OccupancyReport { occupants: 1, ..Default::default() }));
        assert!(!is_reclaimable(&OccupancyReport { items: 2, ..Default::default() }));
        assert!(!is_reclaimable(&OccupancyReport { effects: 1, ..Default::default() }));
        assert!(!is_reclaimable(&OccupancyReport { pending_tasks: 2, ..Default::default() }));
    }

    #[test]
    fn test_no_two_bound_slots_share_a_coordinate() {
        // Random interleaving of lookup-or-bind and reclaim against a tiny
        // pool; the coordinate-uniqueness invariant must hold throughout.
        let (mut pool, terrain, bands) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);

        for _ in 0..2000 {
            let x = rng.gen_range(-3..3);
            let y = rng.gen_range(-3..3);
            if rng.gen_bool(0.6) {
                if pool.lookup(x, y).is_none() {
                    if let Ok(id) = pool.allocate() {
                        pool.bind(id, x, y, &terrain, &bands, &NoRegions).unwrap();
                    }
                }
            } else {
                let id = rng.gen_range(0..pool.capacity());
                pool.reclaim_check(id, &NoOccupants);
            }

            let mut coords: Vec<(i32, i32)> = pool
                .slots
                .iter()
                .filter_map(|s| match s {
                    Slot::Bound(b) => Some((b.x, b.y)),
                    Slot::Free => None,
                })
                .collect();
            let before = coords.len();
            coords.sort_unstable();
            coords.dedup();
            assert_eq!(before, coords.len(), "two slots bound to one coordinate");
        }
    }
}
