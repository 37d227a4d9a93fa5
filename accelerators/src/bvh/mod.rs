//! Bounding Volume Hierarchy.

use std::mem::size_of;
use std::ops::Range;
use std::sync::Arc;
use tinsel_core::error::BuildError;
use tinsel_core::geometry::*;
use tinsel_core::primitive::*;
use tinsel_core::stat_inc;

mod common;
mod sah;

pub use common::*;

/// Bounding Volume Hierarchy Accelerator.
pub struct BVHAccel {
    /// The scene primitives.
    primitives: Arc<Vec<Triangle>>,

    /// Scene indices of the primitives, grouped so that each leaf covers a
    /// contiguous range.
    indices: Vec<u32>,

    /// The list of nodes.
    nodes: Vec<LinearBVHNode>,

    /// Number of degenerate primitives left out of the tree.
    dropped: usize,
}

impl BVHAccel {
    /// Create a new Bounding Volume Hierarchy Accelerator. Construction must
    /// complete before any query is issued; the result is immutable.
    ///
    /// * `primitives` - The primitives.
    /// * `options`    - Build parameters.
    pub fn new(primitives: Arc<Vec<Triangle>>, options: BVHOptions) -> Result<Self, BuildError> {
        register_stats();

        if primitives.is_empty() {
            return Err(BuildError::EmptyScene);
        }
        if options.max_depth > MAX_DEPTH {
            warn!(
                "BVH maximum depth {} exceeds the traversal stack; using {}",
                options.max_depth, MAX_DEPTH
            );
        }

        // Initializes primitive_info array for primitives.
        let mut primitive_info: Vec<BVHPrimitiveInfo> = Vec::with_capacity(primitives.len());
        let mut dropped = 0;
        for (i, p) in primitives.iter().enumerate() {
            if p.is_degenerate() {
                if !options.drop_degenerate {
                    return Err(BuildError::DegeneratePrimitive { index: i });
                }
                warn!("Dropping degenerate primitive {}", i);
                dropped += 1;
            } else {
                primitive_info.push(BVHPrimitiveInfo::new(i, p.bounds()));
            }
        }
        stat_inc!(DROPPED_PRIMITIVES, dropped as i64);
        if primitive_info.is_empty() {
            return Err(BuildError::NoValidPrimitives { dropped });
        }

        let result = sah::build(&mut primitive_info, &options);
        let indices: Vec<u32> = primitive_info
            .iter()
            .map(|info| info.primitive_number as u32)
            .collect();

        let tree_bytes = result.nodes.len() * size_of::<LinearBVHNode>()
            + indices.len() * size_of::<u32>()
            + size_of::<Self>();
        stat_inc!(TREE_BYTES, tree_bytes as u64);
        info!(
            "BVH created with {} nodes (depth {}) for {} primitives ({:.2} MB), {} dropped",
            result.nodes.len(),
            result.depth,
            indices.len(),
            tree_bytes as f32 / (1024.0 * 1024.0),
            dropped
        );

        Ok(Self {
            primitives,
            indices,
            nodes: result.nodes,
            dropped,
        })
    }

    /// Returns the flattened nodes.
    pub fn nodes(&self) -> &[LinearBVHNode] {
        &self.nodes
    }

    /// Returns the reordered primitive indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Returns the number of degenerate primitives left out of the tree.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Returns the range of `indices` covered by each leaf.
    pub fn leaf_ranges(&self) -> Vec<Range<usize>> {
        self.nodes
            .iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.offset as usize..n.offset as usize + n.n_primitives as usize)
            .collect()
    }

    /// Returns the reciprocal direction of a ray and the sign of each
    /// component. Zero components are nudged so that slab tests never
    /// multiply zero by infinity.
    ///
    /// * `r` - The ray.
    fn ray_setup(r: &Ray) -> (Vector3f, [usize; 3]) {
        let safe = |v: Float| {
            if v.abs() < 1e-20 {
                if v.is_sign_negative() {
                    -1e-20
                } else {
                    1e-20
                }
            } else {
                v
            }
        };
        let inv_dir = Vector3f::new(1.0 / safe(r.d.x), 1.0 / safe(r.d.y), 1.0 / safe(r.d.z));
        let dir_is_neg = [
            (inv_dir.x < 0.0) as usize,
            (inv_dir.y < 0.0) as usize,
            (inv_dir.z < 0.0) as usize,
        ];
        (inv_dir, dir_is_neg)
    }

    /// Follows a ray through the BVH nodes. `visit` is called for every leaf
    /// the ray enters with the current upper bound of the interval and
    /// returns the new bound, or `None` to stop the traversal.
    ///
    /// * `r`     - The ray.
    /// * `stats` - Traversal statistics.
    /// * `visit` - Leaf callback.
    fn traverse<F>(&self, r: &Ray, stats: &mut TraversalStats, mut visit: F)
    where
        F: FnMut(&LinearBVHNode, Float, &mut TraversalStats) -> Option<Float>,
    {
        if r.has_nans() || self.nodes.is_empty() {
            return;
        }
        let (inv_dir, dir_is_neg) = Self::ray_setup(r);
        let mut t_max = r.t_max;

        let (mut to_visit_offset, mut current_node_index) = (0, 0);
        let mut nodes_to_visit = [0_usize; 64];

        loop {
            // Check ray against BVH node.
            let node = &self.nodes[current_node_index];
            stats.nodes_visited += 1;
            if node.bounds.intersect_p_inv(r, t_max, &inv_dir, &dir_is_neg).is_some() {
                if node.is_leaf() {
                    match visit(node, t_max, stats) {
                        Some(t) => t_max = t,
                        None => return,
                    }
                    if to_visit_offset == 0 {
                        break;
                    }
                    to_visit_offset -= 1;
                    current_node_index = nodes_to_visit[to_visit_offset];
                } else if dir_is_neg[node.axis as usize] == 1 {
                    // Put far BVH node on nodes_to_visit stack, advance to near node.
                    nodes_to_visit[to_visit_offset] = current_node_index + 1;
                    to_visit_offset += 1;
                    current_node_index = node.offset as usize;
                } else {
                    nodes_to_visit[to_visit_offset] = node.offset as usize;
                    to_visit_offset += 1;
                    current_node_index += 1;
                }
            } else {
                if to_visit_offset == 0 {
                    break;
                }
                to_visit_offset -= 1;
                current_node_index = nodes_to_visit[to_visit_offset];
            }
        }
    }
}

impl Aggregate for BVHAccel {
    /// Returns a bounding box in the world space.
    fn world_bound(&self) -> Bounds3f {
        self.nodes.first().map_or(Bounds3f::EMPTY, |n| n.bounds)
    }

    /// Returns `true` as soon as any primitive intersects the ray.
    ///
    /// * `r` - The ray.
    fn intersect_p(&self, r: &Ray) -> bool {
        stat_inc!(ANY_HIT_QUERIES, 1);
        let mut hit = false;
        let mut stats = TraversalStats::default();
        self.traverse(r, &mut stats, |node, t_max, _| {
            let start = node.offset as usize;
            let end = start + node.n_primitives as usize;
            for &idx in self.indices[start..end].iter() {
                if self.primitives[idx as usize].intersect(r, t_max).is_some() {
                    hit = true;
                    return None;
                }
            }
            Some(t_max)
        });
        hit
    }

    /// Returns the closest intersection. Subtrees whose boxes start beyond the
    /// closest hit found so far are pruned.
    ///
    /// * `r` - The ray.
    fn intersect_with_stats(&self, r: &Ray) -> (Option<Intersection>, TraversalStats) {
        stat_inc!(NEAREST_HIT_QUERIES, 1);
        let mut closest: Option<(usize, TriangleHit)> = None;
        let mut stats = TraversalStats::default();
        self.traverse(r, &mut stats, |node, mut t_max, stats| {
            let start = node.offset as usize;
            let end = start + node.n_primitives as usize;
            for &idx in self.indices[start..end].iter() {
                stats.primitives_tested += 1;
                if let Some(hit) = self.primitives[idx as usize].intersect(r, t_max) {
                    t_max = hit.t;
                    closest = Some((idx as usize, hit));
                }
            }
            Some(t_max)
        });
        stat_inc!(NODES_VISITED, stats.nodes_visited as i64);
        stat_inc!(NODES_VISITED_QUERIES, 1);

        let isect = closest.and_then(|(i, hit)| Intersection::new(&self.primitives[i], i, hit.t, hit.b));
        (isect, stats)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
