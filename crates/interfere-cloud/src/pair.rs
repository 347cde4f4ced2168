//! Classified cloud pairs and their clearance witness.
//!
//! A [`CloudPair`] moves through three states:
//!
//! ```text
//! Unclassified --classify--> Classified --minimize--> Minimized
//! ```
//!
//! Classification decides how the two bodies relate (see [`PairKind`]);
//! minimization runs the nearest-neighbour search that the kind calls for;
//! the [`Witness`] is read from a minimized pair.

use interfere_kernel::Model;
use interfere_math::Point3;

use crate::nearest::{Nearest, NearestSolver};
use crate::{CloudError, PointCloud, Result};

/// Spatial relation between the source and target bodies of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PairKind {
    /// Bodies do not touch.
    Disjoint = 1,
    /// Bodies cross; the boolean produced a result.
    Overlapping = 2,
    /// No boolean result and the source box lies within the target box.
    SourceInsideTarget = 3,
    /// No boolean result and the target box lies within the source box.
    TargetInsideSource = 4,
}

impl PairKind {
    /// Numeric classification code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Progress of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PairState {
    /// Freshly constructed.
    Unclassified,
    /// Kind decided, nearest records allocated.
    Classified,
    /// Nearest records filled.
    Minimized,
}

/// Sub-clouds of one body of an overlap result.
///
/// `source` holds the result faces that came from the source body and
/// `target` those that came from the target body.
#[derive(Debug)]
pub struct OverlapPart {
    pub(crate) source: PointCloud,
    pub(crate) target: PointCloud,
    pub(crate) to_target: Nearest,
    pub(crate) to_source: Nearest,
}

impl OverlapPart {
    /// Cloud of the source-derived faces.
    pub fn source(&self) -> &PointCloud {
        &self.source
    }

    /// Cloud of the target-derived faces.
    pub fn target(&self) -> &PointCloud {
        &self.target
    }

    /// Nearest target point of every source point.
    pub fn to_target(&self) -> &Nearest {
        &self.to_target
    }

    /// Nearest source point of every target point.
    pub fn to_source(&self) -> &Nearest {
        &self.to_source
    }
}

#[derive(Debug)]
pub(crate) enum Detail {
    Separate { kind: PairKind, nearest: Nearest },
    Overlap { model: Model, parts: Vec<OverlapPart> },
}

/// Signed clearance between two bodies and the points realising it.
///
/// Positive distances are gaps; negative distances are penetration depths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Witness {
    /// Signed distance.
    pub distance: f64,
    /// Witness point on the source side.
    pub source_point: Point3,
    /// Witness point on the target side.
    pub target_point: Point3,
}

/// Interaction record between a source cloud and a target cloud.
///
/// The pair borrows both clouds; overlap sub-clouds and the boolean result
/// are owned by the pair and dropped with it.
#[derive(Debug)]
pub struct CloudPair<'a> {
    pub(crate) source: &'a PointCloud,
    pub(crate) target: &'a PointCloud,
    pub(crate) state: PairState,
    pub(crate) detail: Option<Detail>,
}

impl<'a> CloudPair<'a> {
    /// Unclassified pair.
    pub fn new(source: &'a PointCloud, target: &'a PointCloud) -> Self {
        Self {
            source,
            target,
            state: PairState::Unclassified,
            detail: None,
        }
    }

    /// Source cloud.
    pub fn source(&self) -> &'a PointCloud {
        self.source
    }

    /// Target cloud.
    pub fn target(&self) -> &'a PointCloud {
        self.target
    }

    /// Current state.
    pub fn state(&self) -> PairState {
        self.state
    }

    /// Kind, once classified.
    pub fn kind(&self) -> Option<PairKind> {
        match self.detail.as_ref()? {
            Detail::Separate { kind, .. } => Some(*kind),
            Detail::Overlap { .. } => Some(PairKind::Overlapping),
        }
    }

    /// Source-to-target records of a non-overlapping pair.
    pub fn nearest(&self) -> Option<&Nearest> {
        match self.detail.as_ref()? {
            Detail::Separate { nearest, .. } => Some(nearest),
            Detail::Overlap { .. } => None,
        }
    }

    /// Boolean result of an overlapping pair.
    pub fn model(&self) -> Option<&Model> {
        match self.detail.as_ref()? {
            Detail::Overlap { model, .. } => Some(model),
            Detail::Separate { .. } => None,
        }
    }

    /// Overlap parts, one per result body (empty unless overlapping).
    pub fn parts(&self) -> &[OverlapPart] {
        match &self.detail {
            Some(Detail::Overlap { parts, .. }) => parts,
            _ => &[],
        }
    }

    /// Run the nearest-neighbour searches the pair's kind requires.
    ///
    /// Non-overlapping pairs search source points against the whole target
    /// cloud. Overlapping pairs search in both directions within each part.
    pub fn minimize(&mut self, solver: &NearestSolver) -> Result<()> {
        match self.state {
            PairState::Unclassified => return Err(CloudError::NotClassified),
            PairState::Minimized => return Err(CloudError::AlreadyMinimized),
            PairState::Classified => {}
        }
        let (source, target) = (self.source, self.target);
        match self.detail.as_mut().ok_or(CloudError::NotClassified)? {
            Detail::Separate { nearest, .. } => {
                solver.solve_into(source.points(), target.points(), nearest)?;
            }
            Detail::Overlap { parts, .. } => {
                for part in parts.iter_mut() {
                    solver.solve_into(part.source.points(), part.target.points(), &mut part.to_target)?;
                    solver.solve_into(part.target.points(), part.source.points(), &mut part.to_source)?;
                }
            }
        }
        self.state = PairState::Minimized;
        Ok(())
    }

    /// Signed clearance of a minimized pair.
    ///
    /// A disjoint pair with a solid source, or a contained pair with the
    /// outer body as source, yields the smallest source-to-target distance.
    /// An overlapping pair yields minus the largest nearest distance over
    /// all parts and both directions. Any other combination is a
    /// [`CloudError::Consistency`] error.
    pub fn witness(&self) -> Result<Witness> {
        match self.state {
            PairState::Unclassified => return Err(CloudError::NotClassified),
            PairState::Classified => return Err(CloudError::NotMinimized),
            PairState::Minimized => {}
        }
        match self.detail.as_ref().ok_or(CloudError::NotClassified)? {
            Detail::Separate { kind, nearest } => self.clearance(*kind, nearest),
            Detail::Overlap { parts, .. } => penetration(parts),
        }
    }

    fn clearance(&self, kind: PairKind, nearest: &Nearest) -> Result<Witness> {
        let outer = self.source.is_outer();
        let expected = if outer {
            PairKind::TargetInsideSource
        } else {
            PairKind::Disjoint
        };
        if kind != expected {
            return Err(CloudError::Consistency(format!(
                "{kind:?} pair has no clearance (outer source: {outer})"
            )));
        }

        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..nearest.len() {
            if let Some((j, d)) = nearest.get(i) {
                if best.map_or(true, |(_, _, b)| d < b) {
                    best = Some((i, j, d));
                }
            }
        }
        let (i, j, distance) = best.ok_or_else(|| {
            CloudError::Consistency("no source point has a nearest target".into())
        })?;
        Ok(Witness {
            distance,
            source_point: self.source.points()[i],
            target_point: self.target.points()[j],
        })
    }
}

fn penetration(parts: &[OverlapPart]) -> Result<Witness> {
    let mut best: Option<(f64, Point3, Point3)> = None;
    let mut consider = |d: f64, source_point: Point3, target_point: Point3| {
        if best.map_or(true, |(b, _, _)| d > b) {
            best = Some((d, source_point, target_point));
        }
    };
    for part in parts {
        let (src, tgt) = (part.source.points(), part.target.points());
        for i in 0..part.to_target.len() {
            if let Some((j, d)) = part.to_target.get(i) {
                consider(d, src[i], tgt[j]);
            }
        }
        for i in 0..part.to_source.len() {
            if let Some((j, d)) = part.to_source.get(i) {
                consider(d, src[j], tgt[i]);
            }
        }
    }
    let (d, source_point, target_point) = best.ok_or_else(|| {
        CloudError::Consistency("overlap has no minimized points".into())
    })?;
    Ok(Witness {
        distance: -d,
        source_point,
        target_point,
    })
}
