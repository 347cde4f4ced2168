//! Body tessellation with global-vertex and per-face access.
//!
//! Global vertex numbering concatenates the faces in face order; both the
//! global index and the per-face IDs are 1-based at the API.

use interfere_math::Point3;

use crate::body::{Body, Face};
use crate::mass::MassProperties;
use crate::{KernelError, Result};

/// Tessellation parameters: maximum edge length, maximum chord deviation
/// and maximum angular step in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessParams {
    /// Maximum triangle edge length.
    pub max_len: f64,
    /// Maximum chord deviation from curved surfaces.
    pub chord: f64,
    /// Maximum angular step on curved surfaces, in degrees.
    pub angle_deg: f64,
}

impl TessParams {
    /// Create params from explicit values.
    pub fn new(max_len: f64, chord: f64, angle_deg: f64) -> Self {
        Self {
            max_len,
            chord,
            angle_deg,
        }
    }

    /// Build from `[max_len, chord, angle_deg]`.
    pub fn from_array(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }

    /// Flatten to `[max_len, chord, angle_deg]`.
    pub fn to_array(&self) -> [f64; 3] {
        [self.max_len, self.chord, self.angle_deg]
    }

    /// Reject non-positive or non-finite parameters.
    pub fn validate(&self) -> Result<()> {
        let ok = self
            .to_array()
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        if ok {
            Ok(())
        } else {
            Err(KernelError::Degenerate(format!(
                "tessellation parameters must be positive: {:?}",
                self.to_array()
            )))
        }
    }
}

/// Tessellation of a single face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceTess {
    /// Vertex positions.
    pub points: Vec<Point3>,
    /// Surface parameters per vertex.
    pub uvs: Vec<[f64; 2]>,
    /// Triangles as 0-based indices into `points`.
    pub triangles: Vec<[u32; 3]>,
}

impl FaceTess {
    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.points.len()
    }

    /// Keep only the triangles accepted by `keep` and drop vertices no
    /// longer referenced.
    pub(crate) fn retain_triangles(&mut self, mut keep: impl FnMut(&[Point3; 3]) -> bool) {
        let points = &self.points;
        self.triangles.retain(|t| {
            keep(&[
                points[t[0] as usize],
                points[t[1] as usize],
                points[t[2] as usize],
            ])
        });

        let mut remap = vec![u32::MAX; self.points.len()];
        let mut points = Vec::new();
        let mut uvs = Vec::new();
        for tri in &mut self.triangles {
            for idx in tri.iter_mut() {
                let old = *idx as usize;
                if remap[old] == u32::MAX {
                    remap[old] = points.len() as u32;
                    points.push(self.points[old]);
                    uvs.push(self.uvs[old]);
                }
                *idx = remap[old];
            }
        }
        self.points = points;
        self.uvs = uvs;
    }
}

/// A vertex addressed through the global numbering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalVertex {
    /// 1-based face the vertex belongs to.
    pub face: usize,
    /// 1-based index within that face.
    pub local: usize,
    /// Position.
    pub point: Point3,
}

/// Tessellation of every face of a body.
#[derive(Debug, Clone)]
pub struct Tessellation {
    faces: Vec<FaceTess>,
    /// `offsets[f]` is the number of vertices before face `f` (0-based).
    offsets: Vec<usize>,
    params: TessParams,
}

impl Tessellation {
    /// Parameters used to build this tessellation.
    pub fn params(&self) -> TessParams {
        self.params
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Total vertex count over all faces.
    pub fn num_vertices(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
            + self.faces.last().map_or(0, FaceTess::num_vertices)
    }

    /// Tessellation of face `face_id` (1-based).
    pub fn face(&self, face_id: usize) -> Result<&FaceTess> {
        if face_id == 0 || face_id > self.faces.len() {
            return Err(KernelError::FaceIndex {
                face: face_id,
                count: self.faces.len(),
            });
        }
        Ok(&self.faces[face_id - 1])
    }

    /// All face tessellations in face order.
    pub fn faces(&self) -> &[FaceTess] {
        &self.faces
    }

    /// Look up global vertex `index` (1-based).
    pub fn global_vertex(&self, index: usize) -> Result<GlobalVertex> {
        let count = self.num_vertices();
        if index == 0 || index > count {
            return Err(KernelError::VertexIndex { index, count });
        }
        let zero = index - 1;
        // Last face whose offset is <= zero. Empty faces share their offset
        // with the next face, so this always lands on a non-empty one.
        let f = self.offsets.partition_point(|&o| o <= zero) - 1;
        let local = zero - self.offsets[f];
        Ok(GlobalVertex {
            face: f + 1,
            local: local + 1,
            point: self.faces[f].points[local],
        })
    }

    /// Mass properties of the closed triangle surface.
    pub fn mass_properties(&self) -> MassProperties {
        MassProperties::from_faces(&self.faces)
    }
}

/// Tessellate every face of `body`.
pub fn tessellate(body: &Body, params: &TessParams) -> Result<Tessellation> {
    params.validate()?;
    let mut faces = Vec::with_capacity(body.num_faces());
    let mut offsets = Vec::with_capacity(body.num_faces());
    let mut total = 0;
    for face in body.faces() {
        let tess = tessellate_face(face, params);
        offsets.push(total);
        total += tess.num_vertices();
        faces.push(tess);
    }
    Ok(Tessellation {
        faces,
        offsets,
        params: *params,
    })
}

/// Tessellate one face, clipping it against its trims.
///
/// A triangle survives when its centroid satisfies every trim.
pub(crate) fn tessellate_face(face: &Face, params: &TessParams) -> FaceTess {
    let mut tess = face.surface.sample(params);
    if !face.trims.is_empty() {
        tess.retain_triangles(|tri| {
            let centroid = Point3::from((tri[0].coords + tri[1].coords + tri[2].coords) / 3.0);
            face.trims.iter().all(|trim| trim.accepts(&centroid))
        });
    }
    tess
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::make_box;
    use interfere_math::Vec3;

    #[test]
    fn test_global_vertex_walks_faces() {
        let body = make_box(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let tess = tessellate(&body, &TessParams::new(0.5, 0.1, 30.0)).unwrap();
        assert_eq!(tess.num_faces(), 6);
        // 3x3 grid per face
        assert_eq!(tess.num_vertices(), 6 * 9);

        let first = tess.global_vertex(1).unwrap();
        assert_eq!((first.face, first.local), (1, 1));
        let tenth = tess.global_vertex(10).unwrap();
        assert_eq!((tenth.face, tenth.local), (2, 1));
        assert_eq!(tenth.point, tess.face(2).unwrap().points[0]);
        let last = tess.global_vertex(54).unwrap();
        assert_eq!((last.face, last.local), (6, 9));

        assert_eq!(
            tess.global_vertex(0),
            Err(KernelError::VertexIndex { index: 0, count: 54 })
        );
        assert!(tess.global_vertex(55).is_err());
        assert!(tess.face(7).is_err());
    }

    #[test]
    fn test_global_vertex_skips_empty_faces() {
        let mut tess = tessellate(
            &make_box(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)).unwrap(),
            &TessParams::new(1.0, 0.1, 30.0),
        )
        .unwrap();
        // empty out face 2 and rebuild offsets
        tess.faces[1] = FaceTess::default();
        let mut total = 0;
        for (f, face) in tess.faces.iter().enumerate() {
            tess.offsets[f] = total;
            total += face.num_vertices();
        }
        assert_eq!(tess.num_vertices(), 5 * 4);
        let v = tess.global_vertex(5).unwrap();
        assert_eq!((v.face, v.local), (3, 1));
    }

    #[test]
    fn test_invalid_params() {
        let body = make_box(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        assert!(tessellate(&body, &TessParams::new(0.0, 0.1, 30.0)).is_err());
        assert!(tessellate(&body, &TessParams::new(0.1, f64::NAN, 30.0)).is_err());
    }

    #[test]
    fn test_retain_compacts_vertices() {
        let mut tess = FaceTess {
            points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(5.0, 5.0, 0.0),
            ],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [5.0, 5.0]],
            triangles: vec![[0, 1, 2], [1, 3, 2]],
        };
        tess.retain_triangles(|tri| tri.iter().all(|p| p.x < 2.0));
        assert_eq!(tess.triangles, vec![[0, 1, 2]]);
        assert_eq!(tess.points.len(), 3);
        assert_eq!(tess.uvs.len(), 3);
    }
}
