//! Integer 3D positions and the fixed 6-neighbor adjacency relation.

use serde::{Deserialize, Serialize};

/// A block position in the world grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Return this position offset by the given amounts.
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// One block north (negative Z).
    pub fn north(&self) -> Self {
        self.offset(0, 0, -1)
    }

    /// One block south (positive Z).
    pub fn south(&self) -> Self {
        self.offset(0, 0, 1)
    }

    /// One block east (positive X).
    pub fn east(&self) -> Self {
        self.offset(1, 0, 0)
    }

    /// One block west (negative X).
    pub fn west(&self) -> Self {
        self.offset(-1, 0, 0)
    }

    /// One block up (positive Y).
    pub fn up(&self) -> Self {
        self.offset(0, 1, 0)
    }

    /// One block down (negative Y).
    pub fn down(&self) -> Self {
        self.offset(0, -1, 0)
    }

    /// The 6 face-adjacent positions.
    pub fn adjacent(&self) -> [BlockPos; 6] {
        [
            self.north(),
            self.south(),
            self.east(),
            self.west(),
            self.up(),
            self.down(),
        ]
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &BlockPos) -> u32 {
        (self.x - other.x).unsigned_abs()
            + (self.y - other.y).unsigned_abs()
            + (self.z - other.z).unsigned_abs()
    }

    /// Squared Euclidean distance to another position.
    pub fn distance_squared(&self, other: &BlockPos) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        let dz = i64::from(self.z) - i64::from(other.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Whether this position is face-adjacent to another (Manhattan distance 1).
    pub fn is_adjacent(&self, other: &BlockPos) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
