//! Surface Area Heuristic Algorithm

use super::common::*;
use order_stat::kth_by;
use std::cmp::Ordering;
use tinsel_core::geometry::*;
use tinsel_core::stat_inc;

const N_BUCKETS: usize = 12;

/// A pending node of the iterative build.
#[derive(Copy, Clone, Debug)]
struct BuildTask {
    /// Starting index in `primitive_info`.
    start: usize,

    /// Ending index + 1 in `primitive_info`.
    end: usize,

    /// Depth of the node.
    depth: u32,

    /// Interior node whose second child this task is.
    second_child_of: Option<usize>,
}

/// Result of the build.
pub struct BuildResult {
    /// Nodes in depth-first order; the first child of an interior node
    /// immediately follows it.
    pub nodes: Vec<LinearBVHNode>,

    /// Height of the tree.
    pub depth: u32,
}

/// Builds the BVH iteratively with an explicit work stack. Reorders
/// `primitive_info` so that every leaf covers a contiguous range of it.
///
/// * `primitive_info` - Primitive information; must not be empty.
/// * `options`        - Build parameters.
pub fn build(primitive_info: &mut [BVHPrimitiveInfo], options: &BVHOptions) -> BuildResult {
    let max_depth = options.max_depth.min(MAX_DEPTH);
    let mut nodes: Vec<LinearBVHNode> = Vec::with_capacity(2 * primitive_info.len());
    let mut tree_depth = 0;

    let mut stack = vec![BuildTask {
        start: 0,
        end: primitive_info.len(),
        depth: 0,
        second_child_of: None,
    }];

    while let Some(task) = stack.pop() {
        let index = nodes.len();
        if let Some(parent) = task.second_child_of {
            nodes[parent].offset = index as u32;
        }
        tree_depth = tree_depth.max(task.depth);

        let BuildTask { start, end, depth, .. } = task;
        let n_primitives = end - start;

        // Compute bounds of all primitives in BVH node.
        let bounds = primitive_info[start..end]
            .iter()
            .fold(Bounds3f::EMPTY, |b, info| b.union(&info.bounds));

        let must_split = n_primitives > u16::MAX as usize;
        let split = if !must_split && (n_primitives <= options.leaf_threshold || depth >= max_depth) {
            None
        } else if depth >= options.sah_depth || must_split {
            let centroid_bounds = centroid_bounds(&primitive_info[start..end]);
            let dim = centroid_bounds.maximum_extent();
            Some((dim, split_equal_counts(primitive_info, start, end, dim)))
        } else {
            split_sah(primitive_info, start, end, &bounds, options)
        };

        match split {
            Some((dim, mid)) => {
                stat_inc!(INTERIOR_NODES, 1);
                nodes.push(LinearBVHNode::new_interior_node(bounds, dim.into()));

                // The first child is popped next so it lands right after its
                // parent.
                stack.push(BuildTask {
                    start: mid,
                    end,
                    depth: depth + 1,
                    second_child_of: Some(index),
                });
                stack.push(BuildTask {
                    start,
                    end: mid,
                    depth: depth + 1,
                    second_child_of: None,
                });
            }
            None => {
                stat_inc!(LEAF_NODES, 1);
                stat_inc!(TOTAL_LEAF_NODES, 1);
                stat_inc!(TOTAL_PRIMITIVES, n_primitives as i64);
                nodes.push(LinearBVHNode::new_leaf_node(
                    bounds,
                    start as u32,
                    n_primitives as u16,
                ));
            }
        }
    }

    BuildResult {
        nodes,
        depth: tree_depth,
    }
}

/// Returns the bounding box of the primitive centroids.
///
/// * `infos` - Primitive information.
fn centroid_bounds(infos: &[BVHPrimitiveInfo]) -> Bounds3f {
    infos
        .iter()
        .fold(Bounds3f::EMPTY, |b, info| b.union_point(&info.centroid))
}

/// Partition primitives into equally sized subsets such that the first half
/// of the primitives have smallest centroid coordinate values along the
/// chosen axis, and second have have the largest centroid coordinate values.
/// Always makes progress, even when all centroids coincide.
///
/// * `primitive_info`  - Primitive information.
/// * `start`           - Starting index in primitive_info.
/// * `end`             - Ending index + 1 in primitive_info.
/// * `dim`             - Axis used to partition primitives.
fn split_equal_counts(primitive_info: &mut [BVHPrimitiveInfo], start: usize, end: usize, dim: Axis) -> usize {
    let mid = (start + end) / 2;
    kth_by(&mut primitive_info[start..end], mid - start, |a, b| {
        a.centroid[dim]
            .partial_cmp(&b.centroid[dim])
            .unwrap_or(Ordering::Equal)
    });
    mid
}

/// Returns the bucket of a centroid along an axis.
///
/// * `centroid_bounds` - Bounding box of the centroids.
/// * `centroid`        - The centroid.
/// * `dim`             - The axis.
fn bucket_index(centroid_bounds: &Bounds3f, centroid: &Point3f, dim: Axis) -> usize {
    let b = (N_BUCKETS as Float * centroid_bounds.offset(centroid)[dim]) as usize;
    b.min(N_BUCKETS - 1)
}

/// Partition primitives using Surface Area Heuristic over all three axes.
///
/// Returns the split axis and the pivot index (mid) for interior node
/// creation; returns `None` to indicate leaf node creation when no split
/// beats the cost of a leaf and the node is small enough.
///
/// * `primitive_info` - Primitive information.
/// * `start`          - Start index in primitive_info.
/// * `end`            - End index + 1 in primitive_info.
/// * `bounds`         - Bound box of all primitives in BVH node.
/// * `options`        - Build parameters.
fn split_sah(
    primitive_info: &mut [BVHPrimitiveInfo],
    start: usize,
    end: usize,
    bounds: &Bounds3f,
    options: &BVHOptions,
) -> Option<(Axis, usize)> {
    let n_primitives = end - start;
    let centroid_bounds = centroid_bounds(&primitive_info[start..end]);
    let widest = centroid_bounds.maximum_extent();
    let area = bounds.surface_area();

    // Coincident centroids or a flat node leave nothing for SAH to work with.
    let (lo, hi) = centroid_bounds.extent(widest);
    if hi <= lo || !(area > 0.0) {
        return Some((widest, split_equal_counts(primitive_info, start, end, widest)));
    }

    let mut best: Option<(Float, Axis, usize)> = None;
    for dim in [Axis::X, Axis::Y, Axis::Z] {
        let (lo, hi) = centroid_bounds.extent(dim);
        if hi <= lo {
            continue;
        }

        // Initialize BucketInfo for SAH partition buckets.
        let mut buckets = [BucketInfo::default(); N_BUCKETS];
        for info in primitive_info[start..end].iter() {
            let b = bucket_index(&centroid_bounds, &info.centroid, dim);
            buckets[b].count += 1;
            buckets[b].bounds = buckets[b].bounds.union(&info.bounds);
        }

        // Compute costs for splitting after each bucket; skip candidates that
        // leave one side empty.
        for i in 0..N_BUCKETS - 1 {
            let (mut b0, mut b1) = (Bounds3f::EMPTY, Bounds3f::EMPTY);
            let (mut count0, mut count1) = (0, 0);
            for bucket in buckets[..=i].iter() {
                b0 = b0.union(&bucket.bounds);
                count0 += bucket.count;
            }
            for bucket in buckets[i + 1..].iter() {
                b1 = b1.union(&bucket.bounds);
                count1 += bucket.count;
            }
            if count0 == 0 || count1 == 0 {
                continue;
            }

            let cost = options.traversal_cost
                + options.intersect_cost
                    * (count0 as Float * b0.surface_area() + count1 as Float * b1.surface_area())
                    / area;
            if best.map_or(true, |(c, _, _)| cost < c) {
                best = Some((cost, dim, i));
            }
        }
    }

    let (min_cost, dim, split_bucket) = match best {
        Some(b) => b,
        None => return Some((widest, split_equal_counts(primitive_info, start, end, widest))),
    };

    // Either create leaf or split primitives at selected SAH bucket.
    let leaf_cost = options.intersect_cost * n_primitives as Float;
    if min_cost >= leaf_cost && n_primitives <= options.max_prims_in_node {
        return None;
    }

    let infos = primitive_info[start..end].iter_mut();
    let split = itertools::partition(infos, |pi| {
        bucket_index(&centroid_bounds, &pi.centroid, dim) <= split_bucket
    });
    let mid = start + split;
    if mid == start || mid == end {
        Some((dim, split_equal_counts(primitive_info, start, end, dim)))
    } else {
        Some((dim, mid))
    }
}
