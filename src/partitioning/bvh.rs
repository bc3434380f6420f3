use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::query::project_point_on_triangle;
use crate::shape::{TriMesh, Triangle};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

const NUM_BINS: usize = 8;
const BIN_EPSILON: Real = 1.0e-5;
const MAX_LEAF_SIZE: usize = 4;

#[derive(Copy, Clone, Debug)]
struct BvhNode {
    aabb: Aabb,
    // Leaf: the range `start..start + count` of `TriangleBvh::primitives`.
    // Internal node (`count == 0`): children at `start` and `start + 1`.
    start: u32,
    count: u32,
}

impl BvhNode {
    #[inline]
    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

#[derive(Copy, Clone, Debug)]
struct BvhBin {
    aabb: Aabb,
    leaf_count: u32,
}

impl Default for BvhBin {
    fn default() -> Self {
        Self {
            aabb: Aabb::new_invalid(),
            leaf_count: 0,
        }
    }
}

/// The closest point of a triangle set to a query point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointProjection {
    /// The projected point.
    pub point: Point<Real>,
    /// The distance between the query point and its projection.
    pub distance: Real,
    /// The index of the triangle containing the projection.
    pub triangle: u32,
}

/// A binary bounding-volume hierarchy over the triangles of a mesh.
///
/// The tree is built once with a binned surface-area heuristic and is immutable
/// afterward. It is mostly used for closest-point queries.
#[derive(Clone, Debug)]
pub struct TriangleBvh {
    nodes: Vec<BvhNode>,
    primitives: Vec<u32>,
    triangles: Vec<Triangle>,
}

impl TriangleBvh {
    /// Builds a BVH over all the triangles of `mesh`.
    pub fn new(mesh: &TriMesh) -> Self {
        Self::from_triangles(mesh.triangles().collect())
    }

    /// Builds a BVH over the given triangles.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let mut result = Self {
            nodes: Vec::with_capacity(triangles.len().max(1) * 2 / MAX_LEAF_SIZE + 1),
            primitives: (0..triangles.len() as u32).collect(),
            triangles,
        };

        if result.triangles.is_empty() {
            return result;
        }

        let aabbs: Vec<_> = result
            .triangles
            .iter()
            .map(|tri| Aabb::from_points(&tri.vertices()))
            .collect();
        let mut primitives = std::mem::take(&mut result.primitives);
        result.nodes.push(BvhNode {
            aabb: Aabb::new_invalid(),
            start: 0,
            count: 0,
        });
        result.build_range(0, 0, &mut primitives, &aabbs);
        result.primitives = primitives;
        result
    }

    /// The number of triangles in this BVH.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Is this BVH empty?
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The bounding box of all the triangles, or an invalid box if this BVH is empty.
    pub fn root_aabb(&self) -> Aabb {
        self.nodes
            .first()
            .map(|node| node.aabb)
            .unwrap_or_else(Aabb::new_invalid)
    }

    fn build_range(&mut self, node_id: usize, offset: usize, prims: &mut [u32], aabbs: &[Aabb]) {
        let aabb = prims
            .iter()
            .fold(Aabb::new_invalid(), |acc, i| acc.merged(&aabbs[*i as usize]));

        if prims.len() <= MAX_LEAF_SIZE {
            self.nodes[node_id] = BvhNode {
                aabb,
                start: offset as u32,
                count: prims.len() as u32,
            };
            return;
        }

        let centers: Vec<_> = prims.iter().map(|i| aabbs[*i as usize].center()).collect();
        let centroid_aabb = Aabb::from_points(&centers);
        let center = |i: u32| aabbs[i as usize].center();
        let bins_axis = centroid_aabb.longest_axis();
        let bins_range = [centroid_aabb.mins[bins_axis], centroid_aabb.maxs[bins_axis]];
        let width = bins_range[1] - bins_range[0];

        let mut mid = 0;

        if width > 0.0 {
            let k1 = NUM_BINS as Real * (1.0 - BIN_EPSILON) / width;
            let k0 = bins_range[0];
            let bin = |i: u32| ((k1 * (center(i)[bins_axis] - k0)) as usize).min(NUM_BINS - 1);

            let mut bins = [BvhBin::default(); NUM_BINS];
            for i in &*prims {
                let bin = &mut bins[bin(*i)];
                bin.aabb = bin.aabb.merged(&aabbs[*i as usize]);
                bin.leaf_count += 1;
            }

            // Select the best splitting plane based on SAH.
            let mut right_merges = bins;
            for i in (0..NUM_BINS - 1).rev() {
                right_merges[i].aabb = right_merges[i].aabb.merged(&right_merges[i + 1].aabb);
                right_merges[i].leaf_count += right_merges[i + 1].leaf_count;
            }

            let mut best_cost = Real::MAX;
            let mut best_plane = 0;
            let mut left_merge = bins[0];

            for i in 0..NUM_BINS - 1 {
                let right = &right_merges[i + 1];
                let cost = surface_area(&left_merge.aabb) * left_merge.leaf_count as Real
                    + surface_area(&right.aabb) * right.leaf_count as Real;

                if cost < best_cost {
                    best_cost = cost;
                    best_plane = i;
                    mid = left_merge.leaf_count as usize;
                }

                left_merge.aabb = left_merge.aabb.merged(&bins[i + 1].aabb);
                left_merge.leaf_count += bins[i + 1].leaf_count;
            }

            if mid != 0 && mid != prims.len() {
                // Partition in-place.
                let mut left_id = 0;
                for k in 0..prims.len() {
                    if bin(prims[k]) <= best_plane {
                        prims.swap(left_id, k);
                        left_id += 1;
                    }
                }
            }
        }

        // All the centroids ended up in the same bin: split the range in two.
        if mid == 0 || mid == prims.len() {
            mid = prims.len() / 2;
        }

        let children = self.nodes.len();
        self.nodes[node_id] = BvhNode {
            aabb,
            start: children as u32,
            count: 0,
        };
        let placeholder = self.nodes[node_id];
        self.nodes.push(placeholder);
        self.nodes.push(placeholder);

        let (left, right) = prims.split_at_mut(mid);
        self.build_range(children, offset, left, aabbs);
        self.build_range(children + 1, offset + mid, right, aabbs);
    }

    /// Finds the point of the triangle set closest to `pt`.
    ///
    /// Returns `None` if this BVH is empty.
    pub fn project_point(&self, pt: &Point<Real>) -> Option<PointProjection> {
        let root = self.nodes.first()?;
        let mut best: Option<PointProjection> = None;
        let mut best_dist2 = Real::MAX;
        let mut queue = BinaryHeap::new();
        queue.push(Reverse((OrderedFloat(root.aabb.distance_squared_to_point(pt)), 0u32)));

        while let Some(Reverse((OrderedFloat(dist2), node_id))) = queue.pop() {
            if dist2 >= best_dist2 {
                break;
            }

            let node = &self.nodes[node_id as usize];

            if node.is_leaf() {
                let range = node.start as usize..(node.start + node.count) as usize;
                for tri_id in &self.primitives[range] {
                    let proj = project_point_on_triangle(&self.triangles[*tri_id as usize], pt);
                    let d2 = na::distance_squared(&proj, pt);

                    if d2 < best_dist2 {
                        best_dist2 = d2;
                        best = Some(PointProjection {
                            point: proj,
                            distance: 0.0,
                            triangle: *tri_id,
                        });
                    }
                }
            } else {
                for child in [node.start, node.start + 1] {
                    let child_dist2 = self.nodes[child as usize].aabb.distance_squared_to_point(pt);

                    if child_dist2 < best_dist2 {
                        queue.push(Reverse((OrderedFloat(child_dist2), child)));
                    }
                }
            }
        }

        best.map(|mut proj| {
            proj.distance = best_dist2.sqrt();
            proj
        })
    }

    /// The distance between `pt` and the closest triangle, or `None` if this BVH is empty.
    pub fn distance_to_point(&self, pt: &Point<Real>) -> Option<Real> {
        self.project_point(pt).map(|proj| proj.distance)
    }
}

fn surface_area(aabb: &Aabb) -> Real {
    if !aabb.is_valid() {
        return 0.0;
    }

    let e = aabb.extents();
    2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
}
