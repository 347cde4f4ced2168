//! Pair classification.
//!
//! Both bodies are duplicated (under their cloud transforms), their faces
//! tagged with their origin, and combined with a boolean:
//! intersection for a solid source, subtraction for the outer body. A
//! result means the bodies overlap; the result's faces are split by tag
//! into source and target sub-clouds. No result means disjoint or nested,
//! told apart by bounding-box containment.

use std::sync::Arc;

use interfere_kernel::{AttrValue, Body, BooleanOp, Context, KernelError, Model, TessParams};
use interfere_math::Transform;
use tracing::debug;

use crate::nearest::Nearest;
use crate::pair::{CloudPair, Detail, OverlapPart, PairKind, PairState};
use crate::{CloudError, PointCloud, Result};

/// Face attribute naming the originating source face.
pub const SOURCE_TAG: &str = ".source";
/// Face attribute naming the originating target face.
pub const TARGET_TAG: &str = ".target";

impl<'a> CloudPair<'a> {
    /// Build and classify the pair of `source` and `target`.
    ///
    /// The target must not be the outer body.
    pub fn classify(ctx: &Context, source: &'a PointCloud, target: &'a PointCloud) -> Result<Self> {
        let mut pair = Self::new(source, target);
        pair.classify_with(ctx)?;
        Ok(pair)
    }

    /// Classify an unclassified pair in place.
    pub fn classify_with(&mut self, ctx: &Context) -> Result<()> {
        if self.state != PairState::Unclassified {
            return Err(CloudError::Consistency("pair is already classified".into()));
        }
        if self.target.is_outer() {
            return Err(CloudError::Topology(
                "the outer body cannot be the target of a pair".into(),
            ));
        }

        let model = {
            let _quiet = ctx.quiet();
            let source = tagged_copy(self.source, SOURCE_TAG)?;
            let target = tagged_copy(self.target, TARGET_TAG)?;
            let op = if self.source.is_outer() {
                BooleanOp::Subtraction
            } else {
                BooleanOp::Intersection
            };
            match ctx.boolean(&source, &target, op) {
                Ok(model) => Some(model),
                Err(KernelError::EmptyResult) => None,
                Err(err) => return Err(err.into()),
            }
        };

        let detail = match model {
            Some(model) => {
                let parts = overlap_parts(&model, self.source, self.target)?;
                Detail::Overlap { model, parts }
            }
            None => Detail::Separate {
                kind: containment(self.source, self.target),
                nearest: Nearest::new(self.source.num_vertices()),
            },
        };
        self.detail = Some(detail);
        self.state = PairState::Classified;
        debug!(kind = ?self.kind(), parts = self.parts().len(), "classified cloud pair");
        Ok(())
    }
}

fn containment(source: &PointCloud, target: &PointCloud) -> PairKind {
    if target.bbox().contains(source.bbox()) {
        PairKind::SourceInsideTarget
    } else if source.bbox().contains(target.bbox()) {
        PairKind::TargetInsideSource
    } else {
        PairKind::Disjoint
    }
}

/// Copy of the cloud's body, moved by its transform, with every face tagged
/// `key` = its own face ID.
fn tagged_copy(cloud: &PointCloud, key: &str) -> Result<Body> {
    let identity = Transform::identity();
    let mut body = cloud
        .body()
        .duplicate(cloud.transform().unwrap_or(&identity))?;
    for face in 1..=body.num_faces() {
        body.set_face_attr(face, key, AttrValue::Int(vec![face as i32]))?;
    }
    Ok(body)
}

/// Finer parameters for overlap sub-clouds.
fn overlap_params(a: &TessParams, b: &TessParams) -> TessParams {
    TessParams::new(
        0.5 * a.max_len.min(b.max_len),
        0.5 * a.chord.min(b.chord),
        a.angle_deg.max(b.angle_deg),
    )
}

fn has_tag(body: &Body, face: usize, key: &str) -> Result<bool> {
    Ok(body
        .face_attr(face, key)?
        .and_then(AttrValue::as_int)
        .is_some())
}

fn overlap_parts(model: &Model, source: &PointCloud, target: &PointCloud) -> Result<Vec<OverlapPart>> {
    let params = overlap_params(&source.params(), &target.params());
    let mut parts = Vec::with_capacity(model.num_bodies());
    for (b, body) in model.bodies().iter().enumerate() {
        let mut source_faces = Vec::new();
        let mut target_faces = Vec::new();
        for face in 1..=body.num_faces() {
            if has_tag(body, face, SOURCE_TAG)? {
                source_faces.push(face);
            } else if has_tag(body, face, TARGET_TAG)? {
                target_faces.push(face);
            }
        }
        if source_faces.is_empty() || target_faces.is_empty() {
            return Err(CloudError::Topology(format!(
                "result body {} has {} source and {} target faces",
                b + 1,
                source_faces.len(),
                target_faces.len()
            )));
        }

        let source = PointCloud::new(Arc::clone(body), params, false, Some(&source_faces))?;
        let target = PointCloud::new(Arc::clone(body), params, false, Some(&target_faces))?;
        parts.push(OverlapPart {
            to_target: Nearest::new(source.num_vertices()),
            to_source: Nearest::new(target.num_vertices()),
            source,
            target,
        });
    }
    Ok(parts)
}
