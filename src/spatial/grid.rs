//! Fixed-size grid over the ground plane, used to track exploration coverage

use glam::{Vec2, Vec3};

use crate::core::types::Rect;

/// Generic 2D grid with configurable cell size
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub origin: Vec2,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec2) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
            data: vec![T::default(); width * height],
        }
    }

    /// Grid covering `bounds` with square cells of `cell_size`
    pub fn covering(bounds: Rect, cell_size: f32) -> Self {
        let width = (bounds.width / cell_size).ceil().max(1.0) as usize;
        let height = (bounds.height / cell_size).ceil().max(1.0) as usize;
        Self::new(width, height, cell_size, Vec2::new(bounds.x, bounds.y))
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(&self.data[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.width && y < self.height {
            Some(&mut self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Convert a ground-plane position to cell coordinates, clamped to the grid
    #[inline]
    pub fn world_to_cell(&self, pos: Vec2) -> (usize, usize) {
        let x = ((pos.x - self.origin.x) / self.cell_size).floor() as i32;
        let y = ((pos.y - self.origin.y) / self.cell_size).floor() as i32;
        (
            x.clamp(0, self.width as i32 - 1) as usize,
            y.clamp(0, self.height as i32 - 1) as usize,
        )
    }

    /// Cell center in world coordinates
    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            self.origin.x + (x as f32 + 0.5) * self.cell_size,
            self.origin.y + (y as f32 + 0.5) * self.cell_size,
        )
    }
}

/// Visit counts per cell, steering explorers toward less-visited ground
#[derive(Debug, Clone)]
pub struct ExplorationGrid {
    visits: Grid<u32>,
}

impl ExplorationGrid {
    pub fn new(bounds: Rect, cell_size: f32) -> Self {
        Self {
            visits: Grid::covering(bounds, cell_size),
        }
    }

    pub fn record(&mut self, position: Vec3) {
        let (x, y) = self.visits.world_to_cell(Vec2::new(position.x, position.z));
        if let Some(count) = self.visits.get_mut(x, y) {
            *count = count.saturating_add(1);
        }
    }

    pub fn visits_at(&self, position: Vec3) -> u32 {
        let (x, y) = self.visits.world_to_cell(Vec2::new(position.x, position.z));
        self.visits.get(x, y).copied().unwrap_or(0)
    }

    /// Unit planar direction toward the least-visited of the four adjacent
    /// cells, if it has been visited less than the current one
    pub fn unexplored_direction(&self, position: Vec3) -> Option<Vec3> {
        let (cx, cy) = self.visits.world_to_cell(Vec2::new(position.x, position.z));
        let current = *self.visits.get(cx, cy)?;

        let offsets: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        let (best, count) = offsets
            .iter()
            .filter_map(|&(dx, dy)| {
                let nx = usize::try_from(cx as i32 + dx).ok()?;
                let ny = usize::try_from(cy as i32 + dy).ok()?;
                self.visits.get(nx, ny).map(|&c| ((nx, ny), c))
            })
            .min_by_key(|&(_, c)| c)?;

        if count >= current {
            return None;
        }

        let target = self.visits.cell_center(best.0, best.1);
        let direction = Vec3::new(target.x - position.x, 0.0, target.y - position.z);
        direction.try_normalize()
    }
}
