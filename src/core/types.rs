//! Core types used throughout the codebase

use derive_more::Display;
use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for agents
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Id drawn from a caller-supplied generator, so seeded spawns are reproducible.
    pub fn from_rng<R: Rng>(rng: &mut R) -> Self {
        Self(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulation tick counter
pub type Tick = u64;

/// Simulated time in seconds since the engine was constructed
pub type SimTime = f64;

/// Axis-aligned rectangle on the ground plane.
///
/// `y` is the world Z axis: agents live in 3D but all spatial partitioning
/// happens on the X/Z plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Square of side `2 * half_extent` centered on `center`
    pub fn centered(center: Vec2, half_extent: f32) -> Self {
        Self {
            x: center.x - half_extent,
            y: center.y - half_extent,
            width: half_extent * 2.0,
            height: half_extent * 2.0,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Half-open containment: lower edges inclusive, upper edges exclusive
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Rectangles that merely touch count as intersecting
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.x > self.right()
            || other.right() < self.x
            || other.y > self.bottom()
            || other.bottom() < self.y)
    }

    /// The four quadrants in NW, NE, SW, SE order.
    ///
    /// East and south halves take whatever remains up to the parent's far
    /// edges, so the children tile the parent exactly.
    pub fn quadrants(&self) -> [Rect; 4] {
        let mid_x = self.x + self.width / 2.0;
        let mid_y = self.y + self.height / 2.0;
        let west = mid_x - self.x;
        let east = self.right() - mid_x;
        let north = mid_y - self.y;
        let south = self.bottom() - mid_y;
        [
            Rect::new(self.x, self.y, west, north),
            Rect::new(mid_x, self.y, east, north),
            Rect::new(self.x, mid_y, west, south),
            Rect::new(mid_x, mid_y, east, south),
        ]
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Project a world position onto the X/Z ground plane
#[inline]
pub fn ground(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}

/// Drop the vertical component of a world vector
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
