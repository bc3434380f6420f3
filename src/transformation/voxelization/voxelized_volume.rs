// Rust port, with modifications, of https://github.com/kmammou/v-hacd/blob/master/src/VHACD_Lib/src/vhacdVolume.cpp
// By Khaled Mamou
//
// # License of the original C++ code:
// > Copyright (c) 2011 Khaled Mamou (kmamou at gmail dot com)
// > All rights reserved.
// >
// >
// > Redistribution and use in source and binary forms, with or without modification, are permitted provided that the following conditions are met:
// >
// > 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following disclaimer.
// >
// > 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the following disclaimer in the documentation and/or other materials provided with the distribution.
// >
// > 3. The names of the contributors may not be used to endorse or promote products derived from this software without specific prior written permission.
// >
// > THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::query::intersection_test_aabb_triangle;
use crate::shape::{TriMesh, Triangle};

// Empty voxels surrounding the grid, so that the exterior is always connected.
const PADDING: u32 = 2;

/// The classification of a voxel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VoxelValue {
    /// Not classified yet.
    PrimitiveUndefined,
    /// Outside of the mesh, with its neighbors still to be visited by the flood fill.
    PrimitiveOutsideSurfaceToWalk,
    /// Outside of the mesh.
    PrimitiveOutsideSurface,
    /// Enclosed by the mesh.
    PrimitiveInsideSurface,
    /// Crossed by a triangle of the mesh.
    PrimitiveOnSurface,
}

impl VoxelValue {
    /// Is this voxel part of the solid (surface or interior)?
    #[inline]
    pub fn is_solid(self) -> bool {
        self == VoxelValue::PrimitiveOnSurface || self == VoxelValue::PrimitiveInsideSurface
    }
}

/// A dense voxelization of the solid enclosed by a triangle mesh.
///
/// The voxel `(i, j, k)` is centered at `origin + (i, j, k) * scale`.
pub struct VoxelizedVolume {
    origin: Point<Real>,
    scale: Real,
    resolution: [u32; 3],
    data: Vec<VoxelValue>,
}

impl VoxelizedVolume {
    /// The number of voxels along each axis of the grid needed to voxelize `aabb`
    /// with `resolution` voxels along its longest side.
    pub fn grid_dimensions(aabb: &Aabb, resolution: u32) -> [u32; 3] {
        let d = aabb.extents();
        let r = d.max();
        let resolution = resolution.max(2);

        std::array::from_fn(|i| {
            let n = if r > 0.0 {
                (resolution as Real * d[i] / r).ceil() as u32
            } else {
                1
            };
            n.clamp(1, resolution) + 1 + 2 * PADDING
        })
    }

    /// Voxelizes `mesh` and fills its interior.
    ///
    /// The caller is responsible for bounding the grid size beforehand (see
    /// [`VoxelizedVolume::grid_dimensions`]).
    pub fn voxelize(mesh: &TriMesh, resolution: u32) -> Self {
        let aabb = mesh.aabb();
        let dims = Self::grid_dimensions(&aabb, resolution);
        let r = aabb.max_extent();
        let scale = if r > 0.0 { r / resolution.max(2) as Real } else { 1.0 };

        let mut result = VoxelizedVolume {
            origin: aabb.mins - Vector::repeat(PADDING as Real * scale),
            scale,
            resolution: dims,
            data: vec![VoxelValue::PrimitiveUndefined; dims.iter().map(|d| *d as usize).product()],
        };

        let inv_scale = 1.0 / scale;
        let box_half_size = Vector::repeat(0.5);

        for tri in mesh.triangles() {
            // Triangle in voxel coordinates.
            let tri_pts = tri
                .vertices()
                .map(|pt| Point::from((pt - result.origin) * inv_scale));

            // Find the range of voxels potentially intersecting the triangle.
            let tri_aabb = Aabb::from_points(&tri_pts);
            let ijk0: [u32; 3] = std::array::from_fn(|c| {
                ((tri_aabb.mins[c] + 0.5).floor().max(1.0) as u32 - 1).min(dims[c] - 1)
            });
            let ijk1: [u32; 3] = std::array::from_fn(|c| {
                ((tri_aabb.maxs[c] + 0.5).floor().max(0.0) as u32 + 2).min(dims[c])
            });

            let triangle = Triangle::from(tri_pts);

            // Determine exactly what voxel intersect the triangle.
            for i in ijk0[0]..ijk1[0] {
                for j in ijk0[1]..ijk1[1] {
                    for k in ijk0[2]..ijk1[2] {
                        let value = result.voxel_mut(i, j, k);

                        if *value == VoxelValue::PrimitiveUndefined {
                            let aabb = Aabb::from_half_extents(
                                Point::new(i as Real, j as Real, k as Real),
                                box_half_size,
                            );

                            if intersection_test_aabb_triangle(&aabb, &triangle) {
                                *value = VoxelValue::PrimitiveOnSurface;
                            }
                        }
                    }
                }
            }
        }

        let [ni, nj, nk] = result.resolution;
        result.mark_outside_surface([0, 0, 0], [ni, nj, 1]);
        result.mark_outside_surface([0, 0, nk - 1], [ni, nj, nk]);
        result.mark_outside_surface([0, 0, 0], [ni, 1, nk]);
        result.mark_outside_surface([0, nj - 1, 0], [ni, nj, nk]);
        result.mark_outside_surface([0, 0, 0], [1, nj, nk]);
        result.mark_outside_surface([ni - 1, 0, 0], [ni, nj, nk]);
        result.fill_outside_surface();
        result.fill_inside_surface();

        result
    }

    /// The number of voxels along each axis.
    pub fn resolution(&self) -> [u32; 3] {
        self.resolution
    }

    /// The edge length of a voxel.
    pub fn scale(&self) -> Real {
        self.scale
    }

    /// The center of the voxel `(0, 0, 0)`.
    pub fn origin(&self) -> Point<Real> {
        self.origin
    }

    fn voxel_index(&self, i: u32, j: u32, k: u32) -> usize {
        i as usize
            + j as usize * self.resolution[0] as usize
            + k as usize * self.resolution[0] as usize * self.resolution[1] as usize
    }

    fn voxel_mut(&mut self, i: u32, j: u32, k: u32) -> &mut VoxelValue {
        let idx = self.voxel_index(i, j, k);
        &mut self.data[idx]
    }

    /// The value of the voxel `(i, j, k)`.
    pub fn voxel(&self, i: u32, j: u32, k: u32) -> VoxelValue {
        self.data[self.voxel_index(i, j, k)]
    }

    /// Is the voxel at the given signed coordinates solid? Voxels outside of the grid are empty.
    pub fn is_solid(&self, ijk: [i64; 3]) -> bool {
        (0..3).all(|c| ijk[c] >= 0 && ijk[c] < self.resolution[c] as i64)
            && self
                .voxel(ijk[0] as u32, ijk[1] as u32, ijk[2] as u32)
                .is_solid()
    }

    /// Turns an empty voxel into an interior voxel.
    pub fn fill(&mut self, i: u32, j: u32, k: u32) {
        let v = self.voxel_mut(i, j, k);

        if !v.is_solid() {
            *v = VoxelValue::PrimitiveInsideSurface;
        }
    }

    /// Mark all the PrimitiveUndefined voxels within the given bounds as PrimitiveOutsideSurfaceToWalk.
    fn mark_outside_surface(&mut self, ijk0: [u32; 3], ijk1: [u32; 3]) {
        for i in ijk0[0]..ijk1[0] {
            for j in ijk0[1]..ijk1[1] {
                for k in ijk0[2]..ijk1[2] {
                    let v = self.voxel_mut(i, j, k);

                    if *v == VoxelValue::PrimitiveUndefined {
                        *v = VoxelValue::PrimitiveOutsideSurfaceToWalk;
                    }
                }
            }
        }
    }

    // Marks at most `max_distance` undefined voxels as to-be-walked, starting at
    // `ptr` and moving by `stride` for `steps` voxels.
    fn walk(out: &mut [VoxelValue], mut ptr: isize, stride: isize, steps: isize, max_distance: isize) {
        let mut count = 0;

        while count < max_distance.min(steps) && out[ptr as usize] == VoxelValue::PrimitiveUndefined
        {
            out[ptr as usize] = VoxelValue::PrimitiveOutsideSurfaceToWalk;
            ptr += stride;
            count += 1;
        }
    }

    fn fill_outside_surface(&mut self) {
        let [i0, j0, k0] = self.resolution;

        // Avoid striding too far in each direction to stay in L1 cache as much as possible.
        let walk_distance = 64;

        let istride = 1isize;
        let jstride = i0 as isize;
        let kstride = i0 as isize * j0 as isize;

        // Sweeping the whole grid several times in memory order leaves far fewer
        // cache misses than a breadth-first traversal, and needs no queue.
        loop {
            let mut voxels_walked = 0;

            for k in 0..k0 {
                for j in 0..j0 {
                    for i in 0..i0 {
                        let idx = self.voxel_index(i, j, k);

                        if self.data[idx] != VoxelValue::PrimitiveOutsideSurfaceToWalk {
                            continue;
                        }

                        voxels_walked += 1;
                        self.data[idx] = VoxelValue::PrimitiveOutsideSurface;
                        let idx = idx as isize;

                        // Walk in each direction to mark other voxels that should be walked.
                        for (c, stride, n) in [(i, istride, i0), (j, jstride, j0), (k, kstride, k0)] {
                            let (c, n) = (c as isize, n as isize);
                            Self::walk(&mut self.data, idx + stride, stride, n - c - 1, walk_distance);
                            Self::walk(&mut self.data, idx - stride, -stride, c, walk_distance);
                        }
                    }
                }
            }

            if voxels_walked == 0 {
                break;
            }
        }
    }

    fn fill_inside_surface(&mut self) {
        for v in &mut self.data {
            if *v == VoxelValue::PrimitiveUndefined {
                *v = VoxelValue::PrimitiveInsideSurface;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn voxelize_cube() {
        let cube = TriMesh::from_aabb(&Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));
        let volume = VoxelizedVolume::voxelize(&cube, 10);

        let [ni, nj, nk] = volume.resolution();
        let mut counts = [0; 2];
        for i in 0..ni {
            for j in 0..nj {
                for k in 0..nk {
                    match volume.voxel(i, j, k) {
                        VoxelValue::PrimitiveOnSurface => counts[0] += 1,
                        VoxelValue::PrimitiveInsideSurface => counts[1] += 1,
                        VoxelValue::PrimitiveOutsideSurface => {}
                        other => panic!("unclassified voxel: {other:?}"),
                    }
                }
            }
        }
        assert!(counts[0] > 0 && counts[1] > 0);

        // The center is inside, the corners of the grid are outside.
        let center = (0.5 - volume.origin().x) / volume.scale();
        let c = center.round() as u32;
        assert!(volume.voxel(c, c, c).is_solid());
        assert_eq!(volume.voxel(0, 0, 0), VoxelValue::PrimitiveOutsideSurface);
    }
}
