//! BVH Common

use tinsel_core::geometry::*;
use tinsel_core::{stat_counter, stat_memory_counter, stat_ratio, stat_register_fns};

stat_memory_counter!("Memory/BVH tree", TREE_BYTES, bvh_stats_tree_bytes);
stat_ratio!(
    "BVH/Primitives per leaf node",
    TOTAL_PRIMITIVES,
    TOTAL_LEAF_NODES,
    bvh_stats_prims_per_leaf_node,
);
stat_counter!("BVH/Interior nodes", INTERIOR_NODES, bvh_stats_interior_nodes);
stat_counter!("BVH/Leaf nodes", LEAF_NODES, bvh_stats_leaf_nodes);
stat_counter!("BVH/Degenerate primitives dropped", DROPPED_PRIMITIVES, bvh_stats_dropped);
stat_counter!("Intersections/Nearest hit queries", NEAREST_HIT_QUERIES, bvh_stats_nearest_hit);
stat_counter!("Intersections/Any hit queries", ANY_HIT_QUERIES, bvh_stats_any_hit);
stat_ratio!(
    "Intersections/Nodes visited per nearest hit query",
    NODES_VISITED,
    NODES_VISITED_QUERIES,
    bvh_stats_nodes_visited,
);

stat_register_fns!(
    bvh_stats_tree_bytes,
    bvh_stats_prims_per_leaf_node,
    bvh_stats_interior_nodes,
    bvh_stats_leaf_nodes,
    bvh_stats_dropped,
    bvh_stats_nearest_hit,
    bvh_stats_any_hit,
    bvh_stats_nodes_visited,
);

/// Deepest tree the traversal stack can handle.
pub const MAX_DEPTH: u32 = 63;

/// Build parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BVHOptions {
    /// Nodes with at most this many primitives always become leaves.
    pub leaf_threshold: usize,

    /// Largest leaf created when no split improves on the leaf cost. Bigger
    /// nodes are always split.
    pub max_prims_in_node: usize,

    /// Nodes at this depth become leaves. Clamped to `MAX_DEPTH`.
    pub max_depth: u32,

    /// Below this depth nodes are split at the median instead of by SAH,
    /// which bounds the height of the tree on skewed inputs.
    pub sah_depth: u32,

    /// Relative cost of visiting an interior node.
    pub traversal_cost: Float,

    /// Relative cost of one ray-primitive test.
    pub intersect_cost: Float,

    /// Drop degenerate primitives with a warning instead of failing.
    pub drop_degenerate: bool,
}

impl Default for BVHOptions {
    fn default() -> Self {
        Self {
            leaf_threshold: 2,
            max_prims_in_node: 8,
            max_depth: MAX_DEPTH,
            sah_depth: 32,
            traversal_cost: 0.125,
            intersect_cost: 1.0,
            drop_degenerate: true,
        }
    }
}

/// SAH bucket information.
#[derive(Copy, Clone, Debug)]
pub struct BucketInfo {
    /// Count of primitives.
    pub count: usize,

    /// Bounding box for the bucket.
    pub bounds: Bounds3f,
}

impl Default for BucketInfo {
    /// Returns the "default value" for `BucketInfo`.
    fn default() -> Self {
        Self {
            count: 0,
            bounds: Bounds3f::EMPTY,
        }
    }
}

/// Stores information about a primitive.
#[derive(Copy, Clone, Debug)]
pub struct BVHPrimitiveInfo {
    /// Index of the primitive in the scene.
    pub primitive_number: usize,

    /// The bounding box of primitive.
    pub bounds: Bounds3f,

    /// The centroid of bounding box of primitive.
    pub centroid: Point3f,
}

impl BVHPrimitiveInfo {
    /// Create a `BVHPrimitiveInfo`.
    ///
    /// * `primitive_number` - Index of the primitive in the scene.
    /// * `bounds`           - The bounding box of primitive.
    pub fn new(primitive_number: usize, bounds: Bounds3f) -> Self {
        Self {
            primitive_number,
            bounds,
            centroid: bounds.centroid(),
        }
    }
}

/// Stores information needed to traverse the BVH.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinearBVHNode {
    /// Bounding box for the node.
    pub bounds: Bounds3f,

    /// For leaf nodes, offset for the primitives in the node. For interior nodes, offset to the second child.
    pub offset: u32,

    /// For leaf nodes, the number of primitives in the node. For interior nodes, 0.
    pub n_primitives: u16,

    /// For interior nodes, which coordinate axis was used for partitioning.
    pub axis: u8,

    /// Padding used to align everything to 32 byte total size.
    pub pad: u8,
}

impl Default for LinearBVHNode {
    /// Returns the "default value" for `LinearBVHNode`.
    fn default() -> Self {
        Self {
            bounds: Bounds3f::EMPTY,
            offset: 0,
            n_primitives: 0,
            axis: 0,
            pad: 0,
        }
    }
}

impl LinearBVHNode {
    /// Creates a leaf linear bvh node.
    ///
    /// * `bounds`       - Bounding box for the node.
    /// * `offset`       - Offset for primitives in the node.
    /// * `n_primitives` - Number of primitives in the node.
    pub fn new_leaf_node(bounds: Bounds3f, offset: u32, n_primitives: u16) -> Self {
        Self {
            bounds,
            offset,
            n_primitives,
            axis: 0,
            pad: 0,
        }
    }

    /// Creates an interior linear bvh node. The offset of the second child is
    /// filled in once that child is emitted.
    ///
    /// * `bounds` - Bounding box for the node.
    /// * `axis`   - Axis used for partitioning.
    pub fn new_interior_node(bounds: Bounds3f, axis: u8) -> Self {
        Self {
            bounds,
            offset: 0,
            axis,
            n_primitives: 0,
            pad: 0,
        }
    }

    /// Returns true for leaf nodes.
    pub fn is_leaf(&self) -> bool {
        self.n_primitives > 0
    }
}
