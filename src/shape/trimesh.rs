use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::shape::Triangle;
use crate::utils::hashmap::HashMap;
use crate::utils::SortedPair;

/// Indicated an inconsistency while building a triangle mesh.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum InvalidMeshError {
    /// A triangle mesh must contain at least one vertex.
    #[error("the mesh has no vertices")]
    EmptyVertices,
    /// A triangle mesh must contain at least one triangle.
    #[error("the mesh has no triangles")]
    EmptyTriangles,
    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references the vertex {index}, but the mesh only has {num_vertices} vertices")]
    IndexOutOfBounds {
        /// The offending triangle.
        triangle: usize,
        /// The out-of-bounds vertex index.
        index: u32,
        /// The number of vertices of the mesh.
        num_vertices: usize,
    },
    /// A vertex has a NaN or infinite coordinate.
    #[error("the vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// The offending vertex.
        vertex: usize,
    },
    /// A flat buffer does not have a length that is a multiple of 3.
    #[error("a flat buffer of length {len} cannot be split into triplets")]
    MalformedBuffer {
        /// The length of the buffer.
        len: usize,
    },
}

/// A triangle mesh.
///
/// Meshes are immutable snapshots: every operation of this crate producing a mesh
/// returns a new one instead of modifying its input.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TriMesh {
    vertices: Vec<Point<Real>>,
    indices: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Creates a new triangle mesh from a vertex buffer and an index buffer.
    ///
    /// Fails if either buffer is empty, if an index is out of bounds, or if a
    /// coordinate is not finite. Degenerate triangles are accepted (see
    /// [`TriMesh::num_degenerate_triangles`]).
    pub fn new(
        vertices: Vec<Point<Real>>,
        indices: Vec<[u32; 3]>,
    ) -> Result<Self, InvalidMeshError> {
        if vertices.is_empty() {
            return Err(InvalidMeshError::EmptyVertices);
        }

        if indices.is_empty() {
            return Err(InvalidMeshError::EmptyTriangles);
        }

        if let Some(vertex) = vertices
            .iter()
            .position(|pt| !pt.iter().all(|e| e.is_finite()))
        {
            return Err(InvalidMeshError::NonFiniteCoordinate { vertex });
        }

        for (triangle, idx) in indices.iter().enumerate() {
            for index in idx {
                if *index as usize >= vertices.len() {
                    return Err(InvalidMeshError::IndexOutOfBounds {
                        triangle,
                        index: *index,
                        num_vertices: vertices.len(),
                    });
                }
            }
        }

        Ok(Self { vertices, indices })
    }

    /// Creates a new triangle mesh from flat `N×3` coordinate and `M×3` index buffers.
    pub fn from_buffers(vertices: &[Real], indices: &[u32]) -> Result<Self, InvalidMeshError> {
        if vertices.len() % 3 != 0 {
            return Err(InvalidMeshError::MalformedBuffer {
                len: vertices.len(),
            });
        }

        if indices.len() % 3 != 0 {
            return Err(InvalidMeshError::MalformedBuffer { len: indices.len() });
        }

        let vertices = vertices
            .chunks_exact(3)
            .map(|c| Point::new(c[0], c[1], c[2]))
            .collect();
        let indices = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Self::new(vertices, indices)
    }

    /// A mesh without any vertex nor triangle.
    ///
    /// This is what the clipping returns on the side of a plane that does not touch the mesh.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a mesh from buffers known to be consistent.
    pub(crate) fn new_unchecked(vertices: Vec<Point<Real>>, indices: Vec<[u32; 3]>) -> Self {
        debug_assert!(indices
            .iter()
            .all(|idx| idx.iter().all(|i| (*i as usize) < vertices.len())));
        Self { vertices, indices }
    }

    /// The closed triangle mesh of the boundary of `aabb`, with outward normals.
    pub fn from_aabb(aabb: &Aabb) -> Self {
        let vertices = aabb.vertices().to_vec();
        // Vertex `i` takes its coordinate `d` from `maxs` if the bit `d` of `i` is set.
        let indices = vec![
            [0, 2, 1],
            [1, 2, 3], // z = min
            [4, 5, 6],
            [5, 7, 6], // z = max
            [0, 1, 4],
            [1, 5, 4], // y = min
            [2, 6, 3],
            [3, 6, 7], // y = max
            [0, 4, 2],
            [2, 4, 6], // x = min
            [1, 3, 5],
            [3, 7, 5], // x = max
        ];
        Self { vertices, indices }
    }

    /// The vertex buffer of this mesh.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The index buffer of this mesh.
    #[inline]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// Consumes this mesh and returns its vertex and index buffers.
    #[inline]
    pub fn into_parts(self) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        (self.vertices, self.indices)
    }

    /// The number of triangles of this mesh.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// Does this mesh have no triangle?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The `i`-th triangle of this mesh.
    #[inline]
    pub fn triangle(&self, i: usize) -> Triangle {
        let idx = self.indices[i];
        Triangle::new(
            self.vertices[idx[0] as usize],
            self.vertices[idx[1] as usize],
            self.vertices[idx[2] as usize],
        )
    }

    /// An iterator through all the triangles of this mesh.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Triangle> + '_ {
        (0..self.indices.len()).map(move |i| self.triangle(i))
    }

    /// The AABB of this mesh's vertices.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    /// Half of the largest extent of this mesh's AABB.
    ///
    /// This is the length used to make concavity values scale-invariant; it is `1` for a
    /// normalized mesh. Returns `1` for a mesh with no extent.
    pub fn characteristic_length(&self) -> Real {
        let half = self.aabb().max_extent() * 0.5;

        if half > crate::math::DEFAULT_EPSILON {
            half
        } else {
            1.0
        }
    }

    /// The signed volume enclosed by this mesh.
    ///
    /// This is positive for a closed mesh with outward-facing triangles.
    pub fn volume(&self) -> Real {
        // Translating toward the AABB center reduces the cancellation errors.
        let center = self.aabb().center();
        self.triangles()
            .map(|tri| {
                Triangle::new(
                    tri.a - center.coords,
                    tri.b - center.coords,
                    tri.c - center.coords,
                )
                .signed_volume_from_origin()
            })
            .sum()
    }

    /// The total area of the triangles of this mesh.
    pub fn area(&self) -> Real {
        self.triangles().map(|tri| tri.area()).sum()
    }

    /// The number of triangles with a zero (or almost zero) area.
    pub fn num_degenerate_triangles(&self) -> usize {
        self.triangles()
            .filter(|tri| tri.is_affinely_dependent())
            .count()
    }

    /// Is this mesh a closed, consistently oriented, two-manifold surface?
    ///
    /// This checks that every undirected edge is shared by exactly two triangles, and
    /// that these two triangles traverse it in opposite directions.
    pub fn is_manifold(&self) -> bool {
        if self.indices.is_empty() {
            return false;
        }

        // (number of incident triangles, sum of the traversal directions)
        let mut edges: HashMap<SortedPair<u32>, (u32, i32)> = HashMap::default();

        for idx in &self.indices {
            if idx[0] == idx[1] || idx[0] == idx[2] || idx[1] == idx[2] {
                return false;
            }

            for i in 0..3 {
                let a = idx[i];
                let b = idx[(i + 1) % 3];
                let entry = edges.entry(SortedPair::new(a, b)).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += if a < b { 1 } else { -1 };
            }
        }

        edges.values().all(|(count, dir)| *count == 2 && *dir == 0)
    }

    /// Returns a copy of this mesh with every vertex transformed by `f`.
    pub fn map_vertices(&self, f: impl Fn(&Point<Real>) -> Point<Real>) -> Self {
        Self {
            vertices: self.vertices.iter().map(f).collect(),
            indices: self.indices.clone(),
        }
    }

    /// Returns a copy of this mesh with the orientation of every triangle reversed.
    pub fn flipped(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            indices: self.indices.iter().map(|t| [t[0], t[2], t[1]]).collect(),
        }
    }

    /// Returns a copy of this mesh where vertices with identical coordinates are merged
    /// and triangles that became degenerate are removed.
    pub fn welded(&self) -> Self {
        let (vertices, indices) = crate::utils::weld_vertices(&self.vertices, &self.indices);
        Self { vertices, indices }
    }

    /// The union of the vertex and index buffers of `self` and `other`.
    pub fn concatenated(&self, other: &TriMesh) -> Self {
        let base = self.vertices.len() as u32;
        let mut vertices = self.vertices.clone();
        vertices.extend_from_slice(&other.vertices);
        let mut indices = self.indices.clone();
        indices.extend(
            other
                .indices
                .iter()
                .map(|t| [t[0] + base, t[1] + base, t[2] + base]),
        );
        Self { vertices, indices }
    }
}
