//! Tessellation-backed point clouds.

use std::sync::Arc;

use interfere_kernel::{tessellate, Body, KernelError, TessParams, Tessellation};
use interfere_math::{BoundingBox, Point3, Transform};

use crate::{CloudError, Result};

/// Faces selected for a subset cloud, with the position of each face's
/// first vertex in the cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceSubset {
    faces: Vec<usize>,
    starts: Vec<usize>,
}

impl FaceSubset {
    /// Selected face IDs (1-based), in selection order.
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    /// Cloud offset of the first vertex of each selected face.
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }
}

/// Vertices of a body's tessellation, optionally restricted to a face subset
/// and optionally moved by a transform.
///
/// A whole-body cloud follows global vertex order. A subset cloud
/// concatenates its faces' vertices in selection order.
#[derive(Debug)]
pub struct PointCloud {
    body: Arc<Body>,
    tess: Tessellation,
    params: TessParams,
    transform: Option<Transform>,
    subset: Option<FaceSubset>,
    outer: bool,
    points: Vec<Point3>,
    bbox: BoundingBox,
}

impl PointCloud {
    /// Tessellate `body` and collect its vertices.
    ///
    /// `outer` marks the body as the containing (OML) body. `faces`, when
    /// given, restricts the cloud to those 1-based face IDs; each must be in
    /// range and listed once. Fails with [`CloudError::NoData`] when the
    /// selection has no vertices.
    pub fn new(
        body: Arc<Body>,
        params: TessParams,
        outer: bool,
        faces: Option<&[usize]>,
    ) -> Result<Self> {
        if let Some(faces) = faces {
            check_subset(faces, body.num_faces())?;
        }
        let tess = tessellate(&body, &params)?;

        let (points, subset) = match faces {
            None => {
                let points = (1..=tess.num_vertices())
                    .map(|i| tess.global_vertex(i).map(|v| v.point))
                    .collect::<std::result::Result<Vec<_>, KernelError>>()?;
                (points, None)
            }
            Some(faces) => {
                let mut points = Vec::new();
                let mut starts = Vec::with_capacity(faces.len());
                for &face in faces {
                    starts.push(points.len());
                    points.extend_from_slice(&tess.face(face)?.points);
                }
                let subset = FaceSubset {
                    faces: faces.to_vec(),
                    starts,
                };
                (points, Some(subset))
            }
        };
        if points.is_empty() {
            return Err(CloudError::NoData);
        }

        let bbox = BoundingBox::from_points(&points);
        Ok(Self {
            body,
            tess,
            params,
            transform: None,
            subset,
            outer,
            points,
            bbox,
        })
    }

    /// Whole-body cloud.
    pub fn from_body(body: Arc<Body>, params: TessParams, outer: bool) -> Result<Self> {
        Self::new(body, params, outer, None)
    }

    /// Recompute every point from the tessellation, moved by `transform`
    /// (or left in place for `None`), and refresh the bounding box.
    ///
    /// Subset clouds cannot be retransformed.
    pub fn retransform(&mut self, transform: Option<&Transform>) -> Result<()> {
        if self.subset.is_some() {
            return Err(CloudError::Topology(
                "cannot retransform a face-subset cloud".into(),
            ));
        }
        for (i, point) in self.points.iter_mut().enumerate() {
            let local = self.tess.global_vertex(i + 1)?.point;
            *point = match transform {
                Some(t) => t.apply_point(&local),
                None => local,
            };
        }
        self.bbox = BoundingBox::from_points(&self.points);
        self.transform = transform.cloned();
        Ok(())
    }

    /// Source body.
    pub fn body(&self) -> &Arc<Body> {
        &self.body
    }

    /// Tessellation the points were taken from.
    pub fn tessellation(&self) -> &Tessellation {
        &self.tess
    }

    /// Tessellation parameters.
    pub fn params(&self) -> TessParams {
        self.params
    }

    /// Transform applied by the last [`retransform`](Self::retransform).
    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Face selection of a subset cloud.
    pub fn subset(&self) -> Option<&FaceSubset> {
        self.subset.as_ref()
    }

    /// Whether the body is the containing (OML) body.
    pub fn is_outer(&self) -> bool {
        self.outer
    }

    /// Cloud points.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Number of points.
    pub fn num_vertices(&self) -> usize {
        self.points.len()
    }

    /// Bounds of the current points.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }
}

fn check_subset(faces: &[usize], count: usize) -> Result<()> {
    for (k, &face) in faces.iter().enumerate() {
        if face == 0 || face > count {
            return Err(CloudError::Index(format!(
                "face {face} out of range 1..={count}"
            )));
        }
        if faces[..k].contains(&face) {
            return Err(CloudError::Index(format!("face {face} listed twice")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use interfere_kernel::make_box;
    use interfere_math::Vec3;

    fn unit_cube() -> Arc<Body> {
        Arc::new(make_box(Point3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 1.0, 1.0)).unwrap())
    }

    fn params() -> TessParams {
        TessParams::new(0.25, 0.01, 15.0)
    }

    #[test]
    fn test_whole_body_cloud() {
        let cloud = PointCloud::from_body(unit_cube(), params(), false).unwrap();
        assert_eq!(cloud.num_vertices(), cloud.tessellation().num_vertices());
        assert!(cloud.subset().is_none());
        assert!(!cloud.is_outer());
        assert!(cloud.transform().is_none());
        assert_relative_eq!(cloud.bbox().min.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(cloud.bbox().max.z, 1.0, epsilon = 1e-12);

        let v = cloud.tessellation().global_vertex(7).unwrap();
        assert_eq!(cloud.points()[6], v.point);
    }

    #[test]
    fn test_subset_cloud_concatenates_faces() {
        let body = unit_cube();
        let cloud = PointCloud::new(body, params(), false, Some(&[6, 1])).unwrap();
        let subset = cloud.subset().unwrap();
        assert_eq!(subset.faces(), &[6, 1]);

        let top = cloud.tessellation().face(6).unwrap().num_vertices();
        let left = cloud.tessellation().face(1).unwrap().num_vertices();
        assert_eq!(subset.starts(), &[0, top]);
        assert_eq!(cloud.num_vertices(), top + left);
        // First block lies on z = 1, second on x = 0.
        assert!(cloud.points()[..top].iter().all(|p| (p.z - 1.0).abs() < 1e-12));
        assert!(cloud.points()[top..].iter().all(|p| p.x.abs() < 1e-12));
    }

    #[test]
    fn test_subset_validation() {
        let err = PointCloud::new(unit_cube(), params(), false, Some(&[0])).unwrap_err();
        assert!(matches!(err, CloudError::Index(_)));
        let err = PointCloud::new(unit_cube(), params(), false, Some(&[7])).unwrap_err();
        assert!(matches!(err, CloudError::Index(_)));
        let err = PointCloud::new(unit_cube(), params(), false, Some(&[2, 3, 2])).unwrap_err();
        assert!(matches!(err, CloudError::Index(_)));
    }

    #[test]
    fn test_empty_selection_has_no_data() {
        let err = PointCloud::new(unit_cube(), params(), false, Some(&[])).unwrap_err();
        assert_eq!(err, CloudError::NoData);
    }

    #[test]
    fn test_bad_params_propagate() {
        let err = PointCloud::from_body(unit_cube(), TessParams::new(0.0, 0.01, 15.0), false)
            .unwrap_err();
        assert!(matches!(err, CloudError::Kernel(_)));
    }

    #[test]
    fn test_retransform_moves_points_and_bbox() {
        let mut cloud = PointCloud::from_body(unit_cube(), params(), true).unwrap();
        let shift = Transform::translation(10.0, 0.0, -2.0);
        cloud.retransform(Some(&shift)).unwrap();
        assert!(cloud.transform().is_some());
        assert_relative_eq!(cloud.bbox().min.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(cloud.bbox().max.z, -1.0, epsilon = 1e-12);

        cloud.retransform(None).unwrap();
        assert!(cloud.transform().is_none());
        assert_relative_eq!(cloud.bbox().min.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_retransform_rejects_subset() {
        let mut cloud = PointCloud::new(unit_cube(), params(), false, Some(&[1])).unwrap();
        let err = cloud.retransform(None).unwrap_err();
        assert!(matches!(err, CloudError::Topology(_)));
    }
}
