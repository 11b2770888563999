//! Octree spatial partitioning structure
//!
//! Objects are filed into the deepest node whose region fully contains their
//! collider bounds; objects straddling a splitting plane stay in the shallower
//! node. Nodes subdivide lazily once they hold more than one object, and only
//! the occupied octants get a child. The root is a catch-all: anything outside
//! its region is kept in the root's own list.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. An empty,
//! childless node is not freed immediately; it counts down a lifespan first
//! and is pruned by its parent when the countdown reaches zero. Nodes that
//! keep getting re-used earn a longer lifespan next time.
//!
//! Collision detection walks the tree once per step, testing each node's
//! objects against each other and against every object held by its
//! ancestors. Sibling subtrees are never tested against each other because
//! their regions are disjoint.

use std::any::Any;

use bitflags::bitflags;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::foundation::collections::{NodeId, ObjectHandle, SecondaryMap, SlotMap};
use crate::foundation::math::Vec3;
use crate::foundation::time::Stopwatch;
use crate::physics::collision::AABB;
use crate::physics::resolution::{resolve_collisions, test_pair, CollisionInfo};
use crate::physics::step::{ObjectSet, StepEnvironment};
use super::BroadPhase;

/// Configuration for octree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Fixed root region; when unset the root is sized to enclose the objects
    /// present at build time
    pub region: Option<AABB>,

    /// Nodes at or below this size on every axis never subdivide
    pub min_node_size: f32,

    /// Steps an empty node survives before it is pruned
    pub initial_lifespan: u32,

    /// Upper bound for the lifespan doubling of re-used nodes
    pub max_lifespan: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            region: None,
            min_node_size: 1.0,
            initial_lifespan: 8,
            max_lifespan: 64,
        }
    }
}

bitflags! {
    /// Occupied child slots of a node, one bit per octant index
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Octants: u8 {
        /// Octant on the -x -y -z side
        const NEG_X_NEG_Y_NEG_Z = 1 << 0;
        /// Octant on the +x -y -z side
        const POS_X_NEG_Y_NEG_Z = 1 << 1;
        /// Octant on the -x +y -z side
        const NEG_X_POS_Y_NEG_Z = 1 << 2;
        /// Octant on the +x +y -z side
        const POS_X_POS_Y_NEG_Z = 1 << 3;
        /// Octant on the -x -y +z side
        const NEG_X_NEG_Y_POS_Z = 1 << 4;
        /// Octant on the +x -y +z side
        const POS_X_NEG_Y_POS_Z = 1 << 5;
        /// Octant on the -x +y +z side
        const NEG_X_POS_Y_POS_Z = 1 << 6;
        /// Octant on the +x +y +z side
        const POS_X_POS_Y_POS_Z = 1 << 7;
    }
}

impl Octants {
    /// Flag for octant `index` (0-7)
    pub fn of(index: usize) -> Self {
        Self::from_bits_truncate(1u8 << (index & 7))
    }
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode {
    region: AABB,
    objects: Vec<ObjectHandle>,
    parent: Option<NodeId>,
    children: [Option<NodeId>; 8],
    active: Octants,
    /// Remaining steps before pruning, `None` while the node is in use
    life: Option<u32>,
    max_lifespan: u32,
    depth: u32,
}

impl OctreeNode {
    fn new(region: AABB, parent: Option<NodeId>, depth: u32, lifespan: u32) -> Self {
        Self {
            region,
            objects: Vec::new(),
            parent,
            children: [None; 8],
            active: Octants::empty(),
            life: None,
            max_lifespan: lifespan,
            depth,
        }
    }

    /// Region covered by this node
    pub fn region(&self) -> AABB {
        self.region
    }

    /// Objects filed directly in this node
    pub fn objects(&self) -> &[ObjectHandle] {
        &self.objects
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Allocated children
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().flatten().copied()
    }

    /// Occupied octants
    pub fn active_octants(&self) -> Octants {
        self.active
    }

    /// Depth in the tree (0 = root)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Check if this node has no children
    pub fn is_leaf(&self) -> bool {
        self.active.is_empty()
    }

    /// Pruning countdown, `None` while the node is in use
    pub fn lifespan(&self) -> Option<u32> {
        self.life
    }

    /// Advance the pruning countdown
    fn tick_lifespan(&mut self, cap: u32) {
        if self.objects.is_empty() && self.is_leaf() {
            self.life = Some(match self.life {
                None => self.max_lifespan,
                Some(remaining) => remaining.saturating_sub(1),
            });
        } else if self.life.take().is_some() {
            self.max_lifespan = self.max_lifespan.saturating_mul(2).min(cap);
        }
    }
}

/// Octree broad phase
pub struct Octree {
    config: OctreeConfig,
    nodes: SlotMap<NodeId, OctreeNode>,
    root: NodeId,
    locations: SecondaryMap<ObjectHandle, NodeId>,
    pending: Vec<ObjectHandle>,
    built: bool,
    pairs: Vec<CollisionInfo>,
}

impl Octree {
    /// Create an empty octree
    pub fn new(config: OctreeConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let region = config.region.unwrap_or_else(|| AABB::point(Vec3::zeros()));
        let root = nodes.insert(OctreeNode::new(region, None, 0, config.initial_lifespan));
        Self {
            config,
            nodes,
            root,
            locations: SecondaryMap::new(),
            pending: Vec::new(),
            built: false,
            pairs: Vec::new(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&OctreeNode> {
        self.nodes.get(id)
    }

    /// Every live node
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &OctreeNode)> {
        self.nodes.iter()
    }

    /// Number of live nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest node depth
    pub fn depth(&self) -> u32 {
        self.nodes.values().map(OctreeNode::depth).max().unwrap_or(0)
    }

    /// Node currently holding `handle`; `None` while queued or unknown
    pub fn location(&self, handle: ObjectHandle) -> Option<NodeId> {
        self.locations.get(handle).copied()
    }

    /// Whether the first build has happened
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Objects waiting to be filed on the next update
    pub fn pending(&self) -> &[ObjectHandle] {
        &self.pending
    }

    fn can_subdivide(&self, region: &AABB) -> bool {
        let size = region.size();
        let center = region.center();
        // Halving stops once the centre is lost to float precision.
        let splits = (0..3).any(|axis| region.min[axis] < center[axis] && center[axis] < region.max[axis]);
        splits
            && (size.x > self.config.min_node_size
                || size.y > self.config.min_node_size
                || size.z > self.config.min_node_size)
    }

    /// Record `handle` as held by `node`
    fn place(&mut self, node: NodeId, handle: ObjectHandle) {
        if let Some(target) = self.nodes.get_mut(node) {
            target.objects.push(handle);
            self.locations.insert(handle, node);
        }
    }

    /// Child in `octant`, allocating it on first use
    fn child_or_create(&mut self, parent: NodeId, octant: usize) -> NodeId {
        let (region, depth, existing) = {
            let node = &self.nodes[parent];
            (node.region.octant(octant), node.depth + 1, node.children[octant])
        };
        if let Some(child) = existing {
            return child;
        }

        let child = self
            .nodes
            .insert(OctreeNode::new(region, Some(parent), depth, self.config.initial_lifespan));
        let node = &mut self.nodes[parent];
        node.children[octant] = Some(child);
        node.active.insert(Octants::of(octant));
        child
    }

    /// Push a node's objects down into children where they fit
    fn build_node(&mut self, id: NodeId, objects: &ObjectSet) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.objects.is_empty() || (node.is_leaf() && node.objects.len() == 1) {
            return;
        }

        if id == self.root && node.is_leaf() && self.config.region.is_none() {
            let bounds: Vec<AABB> = node
                .objects
                .iter()
                .filter_map(|&handle| objects.get(handle).map(|object| object.bounds()))
                .collect();
            if let Some(enclosing) = AABB::enclosing(&bounds) {
                let region = enclosing.enclosing_cube();
                debug!("Octree root region set to {:?} -> {:?}", region.min, region.max);
                self.nodes[id].region = region;
            }
        }

        let region = self.nodes[id].region;
        if !self.can_subdivide(&region) {
            return;
        }

        let mut buckets: [Vec<ObjectHandle>; 8] = Default::default();
        let mut remaining = Vec::new();
        for handle in std::mem::take(&mut self.nodes[id].objects) {
            let Some(bounds) = objects.get(handle).map(|object| object.bounds()) else {
                self.locations.remove(handle);
                continue;
            };
            match Some(bounds)
                .filter(|bounds| region.contains(bounds))
                .and_then(|bounds| region.octant_containing(&bounds))
            {
                Some(octant) => buckets[octant].push(handle),
                None => remaining.push(handle),
            }
        }
        self.nodes[id].objects = remaining;

        for (octant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let child = self.child_or_create(id, octant);
            for &handle in &bucket {
                self.locations.insert(handle, child);
            }
            self.nodes[child].objects.extend(bucket);
            self.build_node(child, objects);
        }
    }

    /// File `handle` starting at `start` and descending as far as it fits
    fn insert_from(&mut self, start: NodeId, handle: ObjectHandle, objects: &ObjectSet) {
        let Some(bounds) = objects.get(handle).map(|object| object.bounds()) else {
            return;
        };

        let mut current = start;
        loop {
            let node = &self.nodes[current];
            if node.is_leaf() {
                self.place(current, handle);
                self.build_node(current, objects);
                return;
            }
            if !node.region.contains(&bounds) {
                if current == self.root {
                    warn!("Object {:?} lies outside the octree region, keeping it in the root", handle);
                }
                self.place(current, handle);
                return;
            }
            match node.region.octant_containing(&bounds) {
                Some(octant) => current = self.child_or_create(current, octant),
                None => {
                    self.place(current, handle);
                    return;
                }
            }
        }
    }

    /// Drain the pending queue, building the tree on first use
    fn flush_pending(&mut self, objects: &ObjectSet) {
        let pending = std::mem::take(&mut self.pending);
        if !self.built {
            for handle in pending {
                if objects.contains_key(handle) {
                    self.place(self.root, handle);
                }
            }
            self.build_node(self.root, objects);
            self.built = true;
            debug!(
                "Octree built: {} objects in {} nodes, depth {}",
                self.locations.len(),
                self.nodes.len(),
                self.depth()
            );
        } else {
            for handle in pending {
                self.insert_from(self.root, handle, objects);
            }
        }
    }

    /// Re-file an object whose node no longer suits it
    fn relocate(&mut self, handle: ObjectHandle, objects: &ObjectSet) {
        let Some(current) = self.locations.remove(handle) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(current) {
            node.objects.retain(|&held| held != handle);
        }
        let Some(bounds) = objects.get(handle).map(|object| object.bounds()) else {
            return;
        };

        let mut target = current;
        while target != self.root {
            match self.nodes.get(target) {
                Some(node) if node.region.contains(&bounds) => break,
                Some(node) => target = node.parent.unwrap_or(self.root),
                None => target = self.root,
            }
        }
        trace!("Re-filing {:?} from {:?} starting at {:?}", handle, current, target);
        self.insert_from(target, handle, objects);
    }

    /// Lifespan, integration and pruning for one subtree
    fn update_node(
        &mut self,
        id: NodeId,
        objects: &mut ObjectSet,
        env: &StepEnvironment,
        movers: &mut Vec<ObjectHandle>,
    ) {
        let cap = self.config.max_lifespan;
        let is_root = id == self.root;
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };

        let (live, stale): (Vec<ObjectHandle>, Vec<ObjectHandle>) =
            node.objects.iter().partition(|&&handle| objects.contains_key(handle));
        node.objects = live;
        node.tick_lifespan(cap);

        for &handle in &node.objects {
            if let Some(object) = objects.get_mut(handle) {
                let moved = env.integrate(object);
                if moved || (!is_root && !node.region.contains(&object.bounds())) {
                    movers.push(handle);
                }
            }
        }
        let children: Vec<NodeId> = node.children().collect();
        for handle in stale {
            self.locations.remove(handle);
        }

        for child in children {
            self.update_node(child, objects, env, movers);
        }

        for octant in 0..8 {
            let Some(child) = self.nodes[id].children[octant] else {
                continue;
            };
            if self.nodes.get(child).and_then(OctreeNode::lifespan) == Some(0) {
                self.nodes.remove(child);
                let node = &mut self.nodes[id];
                node.children[octant] = None;
                node.active.remove(Octants::of(octant));
                trace!("Pruned octree node {:?}", child);
            }
        }
    }
}

/// Test a node's objects against each other and against every ancestor object,
/// then recurse into its children
fn detect(
    nodes: &SlotMap<NodeId, OctreeNode>,
    id: NodeId,
    objects: &ObjectSet,
    ancestors: &mut Vec<ObjectHandle>,
    pairs: &mut Vec<CollisionInfo>,
) {
    let Some(node) = nodes.get(id) else {
        return;
    };

    for (index, &a) in node.objects.iter().enumerate() {
        for &b in &node.objects[index + 1..] {
            pairs.extend(test_pair(objects, a, b));
        }
        for &ancestor in ancestors.iter() {
            pairs.extend(test_pair(objects, ancestor, a));
        }
    }

    let mark = ancestors.len();
    ancestors.extend_from_slice(&node.objects);
    for child in node.children() {
        detect(nodes, child, objects, ancestors, pairs);
    }
    ancestors.truncate(mark);
}

impl BroadPhase for Octree {
    fn insert(&mut self, handle: ObjectHandle) {
        if !self.locations.contains_key(handle) && !self.pending.contains(&handle) {
            self.pending.push(handle);
        }
    }

    fn remove(&mut self, handle: ObjectHandle) -> bool {
        let queued = self.pending.len();
        self.pending.retain(|&pending| pending != handle);
        let was_pending = self.pending.len() != queued;

        let was_filed = match self.locations.remove(handle) {
            Some(node) => {
                if let Some(node) = self.nodes.get_mut(node) {
                    node.objects.retain(|&held| held != handle);
                }
                true
            }
            None => false,
        };
        self.pairs.retain(|pair| !pair.involves(handle));
        was_pending || was_filed
    }

    fn update(&mut self, objects: &mut ObjectSet, env: &StepEnvironment) -> &[CollisionInfo] {
        self.flush_pending(objects);

        let mut movers = Vec::new();
        self.update_node(self.root, objects, env, &mut movers);
        for handle in movers {
            self.relocate(handle, objects);
        }

        self.pairs.clear();
        let timer = Stopwatch::start_new();
        let mut ancestors = Vec::new();
        detect(&self.nodes, self.root, objects, &mut ancestors, &mut self.pairs);
        let detect_ms = timer.elapsed_millis();

        let timer = Stopwatch::start_new();
        resolve_collisions(objects, &self.pairs);
        trace!(
            "Octree step: {} pairs, detect {:.3}ms, resolve {:.3}ms, {} nodes",
            self.pairs.len(),
            detect_ms,
            timer.elapsed_millis(),
            self.nodes.len()
        );

        &self.pairs
    }

    fn collisions(&self) -> &[CollisionInfo] {
        &self.pairs
    }

    fn object_count(&self) -> usize {
        self.locations.len() + self.pending.len()
    }

    fn name(&self) -> &'static str {
        "octree"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
