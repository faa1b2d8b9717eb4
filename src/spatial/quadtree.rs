//! Quadrant tree over the ground plane for rectangular range queries
//!
//! Nodes live in a flat arena owned by the tree. The swarm engine rebuilds
//! the whole tree once per tick with [`QuadTree::rebuild`], which keeps the
//! arena's allocation around instead of freeing every node.

use glam::Vec2;

use crate::core::error::{Result, SwarmError};
use crate::core::types::Rect;

/// Items a node holds before it subdivides
pub const DEFAULT_CAPACITY: usize = 4;

/// Nodes at this depth keep accepting items past capacity instead of
/// subdividing. Without it, more than `capacity` coincident points would
/// subdivide until the quadrants collapse to zero width and get dropped.
pub const MAX_DEPTH: u32 = 16;

#[derive(Debug, Clone)]
struct Node<T> {
    bounds: Rect,
    depth: u32,
    items: Vec<T>,
    /// Arena indices in NW, NE, SW, SE order
    children: Option<[usize; 4]>,
}

impl<T> Node<T> {
    fn new(bounds: Rect, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }
}

/// Quadrant tree with a fixed per-node capacity
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    nodes: Vec<Node<T>>,
    capacity: usize,
    len: usize,
}

impl<T: Clone> QuadTree<T> {
    pub fn new(bounds: Rect, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SwarmError::InvalidConfig(
                "quadtree capacity must be at least 1".into(),
            ));
        }
        if !bounds.is_valid() {
            return Err(SwarmError::InvalidConfig(format!(
                "quadtree bounds must be finite with positive extent, got {:?}",
                bounds
            )));
        }

        Ok(Self {
            nodes: vec![Node::new(bounds, 0)],
            capacity,
            len: 0,
        })
    }

    pub fn with_default_capacity(bounds: Rect) -> Result<Self> {
        Self::new(bounds, DEFAULT_CAPACITY)
    }

    pub fn bounds(&self) -> Rect {
        self.nodes[0].bounds
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert an item at a ground-plane point.
    ///
    /// Returns false when the point lies outside the root rectangle; the item
    /// is then not stored anywhere. A point inside the root is always stored.
    pub fn insert(&mut self, item: T, point: Vec2) -> bool {
        if !self.nodes[0].bounds.contains(point) {
            return false;
        }

        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            if node.items.len() < self.capacity || node.depth >= MAX_DEPTH {
                self.nodes[idx].items.push(item);
                self.len += 1;
                return true;
            }

            let existing = node.children;
            let children = match existing {
                Some(children) => children,
                None => self.subdivide(idx),
            };

            // The SE child's corner is the midpoint; half-open on both midlines
            let mid = self.nodes[children[3]].bounds;
            let east = point.x >= mid.x;
            let south = point.y >= mid.y;
            idx = children[usize::from(south) * 2 + usize::from(east)];
        }
    }

    /// All items whose owning node intersects `range`.
    ///
    /// Items are not filtered by their own position; callers needing an exact
    /// radius do a narrow-phase pass over the result.
    pub fn query(&self, range: &Rect) -> Vec<T> {
        let mut found = Vec::new();
        self.query_into(range, &mut found);
        found
    }

    /// Like [`QuadTree::query`] but appends into a caller-owned buffer
    pub fn query_into(&self, range: &Rect, found: &mut Vec<T>) {
        let mut stack = vec![0usize];

        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.bounds.intersects(range) {
                continue;
            }

            found.extend(node.items.iter().cloned());

            if let Some(children) = node.children {
                // Reversed so NW is visited first
                stack.extend(children.iter().rev());
            }
        }
    }

    /// Drop every node but the root, keeping the root bounds
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        let root = &mut self.nodes[0];
        root.items.clear();
        root.children = None;
        self.len = 0;
    }

    /// Clear and reinsert. Returns how many items fell outside the bounds.
    pub fn rebuild(&mut self, items: impl IntoIterator<Item = (T, Vec2)>) -> usize {
        self.clear();
        let mut rejected = 0;
        for (item, point) in items {
            if !self.insert(item, point) {
                rejected += 1;
            }
        }
        rejected
    }

    fn subdivide(&mut self, idx: usize) -> [usize; 4] {
        let quadrants = self.nodes[idx].bounds.quadrants();
        let depth = self.nodes[idx].depth + 1;
        let first = self.nodes.len();

        self.nodes
            .extend(quadrants.into_iter().map(|bounds| Node::new(bounds, depth)));

        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[idx].children = Some(children);
        children
    }
}
