//! Spatial index over static rooms
//!
//! A rebuildable 2D point index mapping coordinates to entries in the
//! static room list. There is no incremental insert or delete: any change
//! to the static set requires a full `rebuild`, which bumps a version
//! counter so callers can assert they never query a stale index.

use rstar::primitives::GeomWithData;
use rstar::RTree;
use tracing::debug;

use crate::rooms::StaticRoom;

type Entry = GeomWithData<[i32; 2], usize>;

/// Index handle into the static-room list the index was last rebuilt from.
pub type StaticRoomId = usize;

pub struct SpatialIndex {
    tree: RTree<Entry>,
    version: u64,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex {
    /// An empty index. Queries against it return nothing; they never fail.
    pub fn new() -> Self {
        Self { tree: RTree::new(), version: 0 }
    }

    /// Full rebuild from the current static-room set. O(n log n); call once
    /// per batch of edits, never per query or per tick.
    pub fn rebuild(&mut self, rooms: &[StaticRoom]) {
        let entries: Vec<Entry> = rooms
            .iter()
            .enumerate()
            .map(|(i, r)| Entry::new([r.x, r.y], i))
            .collect();
        self.tree = RTree::bulk_load(entries);
        self.version += 1;
        debug!(rooms = rooms.len(), version = self.version, "rebuilt static room index");
    }

    /// Number of completed rebuilds. Bumps on every structural change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// The static room occupying exactly (x, y), if any. Coordinates are
    /// integers, so exact-point lookup replaces the old float tolerance.
    pub fn nearest_exact(&self, x: i32, y: i32) -> Option<StaticRoomId> {
        self.tree.locate_at_point(&[x, y]).map(|e| e.data)
    }

    /// All static rooms within Euclidean `radius` of the center, as
    /// (x, y, room) triples.
    pub fn range(
        &self,
        center_x: i32,
        center_y: i32,
        radius: i32,
    ) -> impl Iterator<Item = (i32, i32, StaticRoomId)> + '_ {
        self.tree
            .locate_within_distance([center_x, center_y], radius.saturating_mul(radius))
            .map(|e| (e.geom()[0], e.geom()[1], e.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sector::Sector;

    fn room(x: i32, y: i32, sector: Sector) -> StaticRoom {
        StaticRoom {
            x,
            y,
            name: format!("Room at ({x}, {y})"),
            description: String::new(),
            sector,
        }
    }

    #[test]
    fn test_queries_before_rebuild_are_empty() {
        let index = SpatialIndex::new();
        assert_eq!(index.nearest_exact(0, 0), None);
        assert_eq!(index.range(0, 0, 100).count(), 0);
        assert_eq!(index.version(), 0);
    }

    #[test]
    fn test_rebuild_reflects_exact_set() {
        let rooms = vec![
            room(10, 10, Sector::Forest),
            room(-5, 3, Sector::City),
            room(0, 0, Sector::Plains),
        ];
        let mut index = SpatialIndex::new();
        index.rebuild(&rooms);

        assert_eq!(index.len(), 3);
        assert_eq!(index.nearest_exact(10, 10), Some(0));
        assert_eq!(index.nearest_exact(-5, 3), Some(1));
        assert_eq!(index.nearest_exact(10, 11), None);

        // Removing a room is just another rebuild.
        index.rebuild(&rooms[..2]);
        assert_eq!(index.nearest_exact(0, 0), None);
        assert_eq!(index.version(), 2);
    }

    #[test]
    fn test_range_query_uses_euclidean_radius() {
        let rooms = vec![
            room(0, 0, Sector::Plains),
            room(3, 4, Sector::Forest),  // distance 5
            room(7, 0, Sector::Hills),   // distance 7
        ];
        let mut index = SpatialIndex::new();
        index.rebuild(&rooms);

        let mut hits: Vec<_> = index.range(0, 0, 5).map(|(_, _, id)| id).collect();
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1]);

        let all: Vec<_> = index.range(0, 0, 7).collect();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let rooms = vec![room(1, 2, Sector::Cave), room(-8, -9, Sector::Inside)];
        let mut index = SpatialIndex::new();

        index.rebuild(&rooms);
        let first: Vec<_> = {
            let mut v: Vec<_> = index.range(0, 0, 20).collect();
            v.sort_unstable();
            v
        };

        index.rebuild(&rooms);
        let second: Vec<_> = {
            let mut v: Vec<_> = index.range(0, 0, 20).collect();
            v.sort_unstable();
            v
        };

        assert_eq!(first, second);
        assert_eq!(index.version(), 2);
    }
}
