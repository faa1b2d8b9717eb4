//! Spatial partitioning on the X/Z ground plane

pub mod grid;
pub mod quadtree;

pub use grid::{ExplorationGrid, Grid};
pub use quadtree::{QuadTree, DEFAULT_CAPACITY};
