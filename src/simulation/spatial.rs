//! Uniform-grid spatial hash for neighbor queries.
//!
//! The arena is cut into square nodes of [`CELL_SIZE`] units. Each entity is
//! registered "fat": into its own node plus the eight surrounding ones, so a
//! lookup of a single node already sees everything within one node of it.
//! Nodes are pre-allocated over the arena's coordinate range; lookups outside
//! that range find nothing.

use std::collections::HashMap;

use geo::{Rect, coord};

use super::entity::EntityKey;
use super::geometric_utils::Vec2;

/// log2 of the node edge length.
pub const CELL_SHIFT: i32 = 6;
/// Node edge length in world units.
pub const CELL_SIZE: f32 = (1 << CELL_SHIFT) as f32;
/// Largest node coordinate a grid allocates in each direction.
pub const MAX_GRID_EXTENT: i32 = 512;
/// Largest arena radius the grid can cover.
pub const MAX_WORLD_RADIUS: f32 = ((MAX_GRID_EXTENT - 2) << CELL_SHIFT) as f32;

/// Node coordinates containing `position`: integer truncation followed by an
/// arithmetic shift.
#[inline]
pub fn node_coordinates(position: Vec2) -> (i32, i32) {
    ((position.x as i32) >> CELL_SHIFT, (position.y as i32) >> CELL_SHIFT)
}

/// Packs node coordinates into one key, `x` in the high half.
#[inline]
pub fn hash_key(x: i32, y: i32) -> u64 {
    ((x as u32 as u64) << 32) | (y as u32 as u64)
}

/// Where an entity is currently registered.
///
/// Only [`SpatialHash::register_entity`] and [`SpatialHash::unregister`]
/// change it, so it always mirrors the hash contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashMembership {
    node: Option<(i32, i32)>,
    nodes: Vec<u64>,
}

impl HashMembership {
    /// Node the entity was last registered around.
    pub fn node(&self) -> Option<(i32, i32)> {
        self.node
    }

    /// Keys of every node holding the entity.
    pub fn registered_nodes(&self) -> &[u64] {
        &self.nodes
    }

    /// True once the entity is in the hash.
    pub fn is_registered(&self) -> bool {
        self.node.is_some()
    }
}

/// One grid cell and the entities registered in it.
#[derive(Debug, Clone)]
pub struct HashNode {
    x: i32,
    y: i32,
    entities: Vec<EntityKey>,
}

impl HashNode {
    /// Entities registered here.
    pub fn entities(&self) -> &[EntityKey] {
        &self.entities
    }

    /// World-space square covered by this node.
    pub fn bounds(&self) -> Rect<f32> {
        let min_x = self.x as f32 * CELL_SIZE;
        let min_y = self.y as f32 * CELL_SIZE;
        Rect::new(
            coord! { x: min_x, y: min_y },
            coord! { x: min_x + CELL_SIZE, y: min_y + CELL_SIZE },
        )
    }
}

/// Debug view of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBounds {
    /// Square covered by the node.
    pub rect: Rect<f32>,
    /// Whether any entity is registered in it.
    pub occupied: bool,
}

/// Grid of pre-allocated nodes keyed by [`hash_key`].
#[derive(Debug, Clone)]
pub struct SpatialHash {
    nodes: HashMap<u64, HashNode>,
    extent: i32,
}

impl SpatialHash {
    /// Allocates nodes covering a circular arena of `world_radius`, with a
    /// margin of two nodes on every side. The grid never grows past
    /// [`MAX_GRID_EXTENT`].
    pub fn new(world_radius: f32) -> Self {
        let radius = world_radius.clamp(0.0, MAX_WORLD_RADIUS);
        let extent = (((radius as i32) >> CELL_SHIFT) + 2).min(MAX_GRID_EXTENT);
        let side = (2 * extent + 1) as usize;
        let mut nodes = HashMap::with_capacity(side * side);

        for x in -extent..=extent {
            for y in -extent..=extent {
                nodes.insert(
                    hash_key(x, y),
                    HashNode {
                        x,
                        y,
                        entities: Vec::new(),
                    },
                );
            }
        }

        Self { nodes, extent }
    }

    /// Largest node coordinate allocated in each direction.
    pub fn extent(&self) -> i32 {
        self.extent
    }

    /// Number of allocated nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node at `(x, y)`, if allocated.
    pub fn node(&self, x: i32, y: i32) -> Option<&HashNode> {
        self.nodes.get(&hash_key(x, y))
    }

    /// Moves `key` to the 3x3 block around the node containing `position`.
    ///
    /// Any previous registration is dropped first, so registering twice at
    /// the same place leaves one entry per node.
    pub fn register_entity(&mut self, key: EntityKey, position: Vec2, membership: &mut HashMembership) {
        self.unregister(key, membership);

        let (cx, cy) = node_coordinates(position);
        membership.node = Some((cx, cy));

        for x in cx - 1..=cx + 1 {
            for y in cy - 1..=cy + 1 {
                let hash = hash_key(x, y);
                if let Some(node) = self.nodes.get_mut(&hash) {
                    node.entities.push(key);
                    membership.nodes.push(hash);
                }
            }
        }
    }

    /// Removes `key` from every node in `membership`. Unknown nodes and keys
    /// are ignored.
    pub fn unregister(&mut self, key: EntityKey, membership: &mut HashMembership) {
        for hash in membership.nodes.drain(..) {
            if let Some(node) = self.nodes.get_mut(&hash) {
                node.entities.retain(|&k| k != key);
            }
        }
        membership.node = None;
    }

    /// Collects entities near `key` into `out`, which is cleared first.
    ///
    /// With `full_search` the union of every node the entity is registered in
    /// is returned; otherwise only its own node. The result is sorted,
    /// duplicate-free and never contains `key`.
    pub fn query_into(
        &self,
        key: EntityKey,
        membership: &HashMembership,
        full_search: bool,
        out: &mut Vec<EntityKey>,
    ) {
        out.clear();

        if full_search {
            for hash in &membership.nodes {
                if let Some(node) = self.nodes.get(hash) {
                    out.extend(node.entities.iter().copied().filter(|&k| k != key));
                }
            }
        } else if let Some((x, y)) = membership.node {
            if let Some(node) = self.nodes.get(&hash_key(x, y)) {
                out.extend(node.entities.iter().copied().filter(|&k| k != key));
            }
        }

        out.sort_unstable();
        out.dedup();
    }

    /// Allocating form of [`SpatialHash::query_into`].
    pub fn query(&self, key: EntityKey, membership: &HashMembership, full_search: bool) -> Vec<EntityKey> {
        let mut out = Vec::new();
        self.query_into(key, membership, full_search, &mut out);
        out
    }

    /// True when `key` is registered in any node.
    pub fn contains(&self, key: EntityKey) -> bool {
        self.nodes.values().any(|node| node.entities.contains(&key))
    }

    /// Drops every registration, keeping the allocated nodes.
    pub fn clear(&mut self) {
        for node in self.nodes.values_mut() {
            node.entities.clear();
        }
    }

    /// Bounds of every node with an occupied flag, ordered by coordinates.
    pub fn debug_geometry(&self) -> Vec<NodeBounds> {
        let mut nodes: Vec<&HashNode> = self.nodes.values().collect();
        nodes.sort_unstable_by_key(|node| (node.x, node.y));
        nodes
            .into_iter()
            .map(|node| NodeBounds {
                rect: node.bounds(),
                occupied: !node.entities.is_empty(),
            })
            .collect()
    }
}
