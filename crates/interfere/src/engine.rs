//! Interference run driver.
//!
//! Pipeline:
//! 1. **Select**: keep bodies carrying a string under the name attribute
//! 2. **Container**: with `oml` on, the named body with the largest
//!    bounding-box volume becomes the outer container
//! 3. **Tessellate**: one cloud per body, parameters scaled by the largest
//!    bounding-box extent
//! 4. **Pairs**: classify, minimize and measure every non-container pair,
//!    then every container pair with the container as source
//! 5. **Assemble**: symmetric distance matrix and per-body mass properties
//!
//! A pair that fails is logged and left at distance 0; the run carries on.

use std::path::Path;
use std::sync::Arc;

use interfere_cloud::{CloudPair, NearestSolver, PairKind, PointCloud, Witness};
use interfere_kernel::{AttrValue, Body, Context};
use tracing::{debug, info, warn};

use crate::{InterferenceConfig, InterferenceError, InterferenceReport, Result};

/// Diagonal entry marking the outer container.
pub const CONTAINER_MARK: f64 = 1.0;

/// Runs interference analyses over sets of bodies.
#[derive(Debug)]
pub struct InterferenceEngine {
    ctx: Context,
    config: InterferenceConfig,
    solver: NearestSolver,
}

impl InterferenceEngine {
    /// Engine with a fresh kernel context.
    pub fn new(config: InterferenceConfig) -> Result<Self> {
        Self::with_context(Context::new(), config)
    }

    /// Engine using `ctx` for kernel calls.
    pub fn with_context(ctx: Context, config: InterferenceConfig) -> Result<Self> {
        config.validate()?;
        let solver = config.solver();
        Ok(Self {
            ctx,
            config,
            solver,
        })
    }

    /// Run configuration.
    pub fn config(&self) -> &InterferenceConfig {
        &self.config
    }

    /// Kernel context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Analyse `bodies` and return the report.
    pub fn execute(&self, bodies: &[Body]) -> Result<InterferenceReport> {
        let attr = self.config.attr_name.as_str();
        let named: Vec<(String, &Body)> = bodies
            .iter()
            .filter_map(|b| {
                let name = b.attr(attr).and_then(AttrValue::as_str)?;
                Some((name.to_owned(), b))
            })
            .collect();
        if named.len() < 2 {
            return Err(InterferenceError::Source(format!(
                "{} of {} bodies carry a string `{attr}` attribute, need at least 2",
                named.len(),
                bodies.len()
            )));
        }

        let bboxes: Vec<_> = named.iter().map(|(_, b)| b.bounding_box()).collect();
        let container = if self.config.oml {
            let mut best = 0;
            for (i, bbox) in bboxes.iter().enumerate().skip(1) {
                if bbox.volume() > bboxes[best].volume() {
                    best = i;
                }
            }
            Some(best)
        } else {
            None
        };
        let size = bboxes.iter().map(|b| b.max_extent()).fold(0.0, f64::max);
        if !(size.is_finite() && size > 0.0) {
            return Err(InterferenceError::Source(format!(
                "bodies have no extent (reference size {size})"
            )));
        }
        let params = self.config.tess_params(size);
        debug!(
            bodies = named.len(),
            container = ?container.map(|c| named[c].0.as_str()),
            size,
            ?params,
            "starting interference run"
        );

        let clouds = named
            .iter()
            .enumerate()
            .map(|(i, (_, body))| {
                PointCloud::from_body(Arc::new(Body::clone(body)), params, container == Some(i))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let names: Vec<String> = named.into_iter().map(|(name, _)| name).collect();
        let mass = clouds
            .iter()
            .map(|c| c.tessellation().mass_properties())
            .collect();
        let mut report = InterferenceReport::new(names, mass)?;

        let n = clouds.len();
        let mut failed = 0usize;
        let mut measure = |report: &mut InterferenceReport, i: usize, j: usize| {
            match self.measure(&clouds[i], &clouds[j]) {
                Ok((kind, witness)) => {
                    debug!(
                        source = %report.names()[i],
                        target = %report.names()[j],
                        ?kind,
                        distance = witness.distance,
                        "measured pair"
                    );
                    report.set_distance(i, j, witness.distance);
                }
                Err(err) => {
                    failed += 1;
                    warn!(
                        source = %report.names()[i],
                        target = %report.names()[j],
                        error = %err,
                        "pair failed, distance left at 0"
                    );
                }
            }
        };

        for i in 0..n {
            for j in (i + 1)..n {
                if container != Some(i) && container != Some(j) {
                    measure(&mut report, i, j);
                }
            }
        }
        if let Some(c) = container {
            for j in (0..n).filter(|&j| j != c) {
                measure(&mut report, c, j);
            }
            report.set_distance(c, c, CONTAINER_MARK);
        }

        info!(
            bodies = n,
            pairs = n * (n - 1) / 2,
            failed,
            "interference run complete"
        );
        Ok(report)
    }

    /// Analyse `bodies` and write the report to the scratch file at `path`.
    pub fn run(&self, bodies: &[Body], path: &Path) -> Result<InterferenceReport> {
        let report = self.execute(bodies)?;
        report.save(path)?;
        info!(path = %path.display(), "wrote scratch file");
        Ok(report)
    }

    fn measure(
        &self,
        source: &PointCloud,
        target: &PointCloud,
    ) -> interfere_cloud::Result<(PairKind, Witness)> {
        let mut pair = CloudPair::classify(&self.ctx, source, target)?;
        pair.minimize(&self.solver)?;
        let witness = pair.witness()?;
        let kind = pair.kind().ok_or(interfere_cloud::CloudError::NotClassified)?;
        Ok((kind, witness))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use interfere_kernel::{make_box, make_sphere};
    use interfere_math::{Point3, Vec3};

    use crate::InterferenceOutputs;

    fn named(mut body: Body, name: &str) -> Body {
        body.set_attr("_name", AttrValue::Str(name.into()));
        body
    }

    fn cube(name: &str, x: f64) -> Body {
        named(make_box(Point3::new(x, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)).unwrap(), name)
    }

    fn engine(oml: bool, tess_params: [f64; 3]) -> InterferenceEngine {
        InterferenceEngine::new(InterferenceConfig {
            oml,
            tess_params,
            workers: Some(2),
            ..InterferenceConfig::default()
        })
        .unwrap()
    }

    fn assert_symmetric(report: &InterferenceReport) {
        for i in 0..report.len() {
            for j in 0..report.len() {
                assert_eq!(report.distance(i, j), report.distance(j, i));
            }
        }
    }

    #[test]
    fn test_disjoint_cubes() {
        let bodies = [cube("a", 0.0), cube("b", 5.0)];
        let report = engine(false, [0.1, 0.01, 15.0]).execute(&bodies).unwrap();
        assert_eq!(report.names(), &["a".to_string(), "b".to_string()]);
        assert_relative_eq!(report.distance(0, 1), 4.0, epsilon = 1e-9);
        assert_eq!(report.distance(0, 0), 0.0);
        assert_eq!(report.distance(1, 1), 0.0);
        assert_symmetric(&report);
        assert_relative_eq!(report.mass()[0].volume, 1.0, epsilon = 1e-9);
        assert_relative_eq!(report.mass()[1].center.x, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overlapping_cubes() {
        let bodies = [cube("a", 0.0), cube("b", 0.5)];
        let report = engine(false, [0.1, 0.01, 15.0]).execute(&bodies).unwrap();
        let d = report.distance(0, 1);
        assert!(d < 0.0);
        assert!(d >= -1.0 - 1e-9);
        assert_symmetric(&report);
    }

    #[test]
    fn test_container_scene() {
        let bodies = [
            named(make_sphere(Point3::origin(), 5.0).unwrap(), "shell"),
            cube("inner", 0.0),
            cube("side", 2.0),
        ];
        let report = engine(true, [0.05, 0.005, 15.0]).execute(&bodies).unwrap();
        assert_eq!(report.distance(0, 0), CONTAINER_MARK);
        assert_eq!(report.distance(1, 1), 0.0);
        assert_relative_eq!(report.distance(1, 2), 1.0, epsilon = 1e-9);

        // Clearance to the inner wall.
        let inner = report.distance(0, 1);
        assert!(inner > 0.0 && inner < 5.0);
        let side = report.distance(0, 2);
        assert!(side > 0.0 && side < inner);
        assert_symmetric(&report);
    }

    #[test]
    fn test_container_off_has_zero_diagonal() {
        let bodies = [
            named(make_sphere(Point3::origin(), 5.0).unwrap(), "shell"),
            cube("inner", 0.0),
        ];
        let report = engine(false, [0.05, 0.005, 15.0]).execute(&bodies).unwrap();
        assert_eq!(report.distance(0, 0), 0.0);
        // Nested solid pair: no clearance is defined, so the entry stays 0.
        assert_eq!(report.distance(0, 1), 0.0);
    }

    #[test]
    fn test_needs_two_named_bodies() {
        let unnamed = make_box(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let bodies = [cube("only", 0.0), unnamed];
        let err = engine(false, [0.1, 0.01, 15.0]).execute(&bodies).unwrap_err();
        assert!(matches!(err, InterferenceError::Source(_)));
    }

    #[test]
    fn test_unnamed_bodies_are_ignored() {
        let unnamed = make_box(Point3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let bodies = [cube("a", 0.0), unnamed, cube("b", 3.0)];
        let report = engine(false, [0.1, 0.01, 15.0]).execute(&bodies).unwrap();
        assert_eq!(report.len(), 2);
        assert_relative_eq!(report.distance(0, 1), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_worker_count_does_not_change_report() {
        let bodies = [cube("a", 0.0), cube("b", 0.5), cube("c", 3.0)];
        let params = [0.1, 0.01, 15.0];
        let serial = InterferenceEngine::new(InterferenceConfig {
            oml: false,
            tess_params: params,
            workers: Some(1),
            ..InterferenceConfig::default()
        })
        .unwrap()
        .execute(&bodies)
        .unwrap();
        let parallel = engine(false, params).execute(&bodies).unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_run_round_trips_through_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interference.bin");
        let bodies = [cube("a", 0.0), cube("b", 5.0), cube("c", 0.5)];
        let report = engine(false, [0.1, 0.01, 15.0]).run(&bodies, &path).unwrap();

        let outputs = InterferenceOutputs::open(&path);
        assert_eq!(outputs.names().unwrap(), report.names());
        let d = outputs.distances().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(d[(i, j)], report.distance(i, j));
            }
        }
        let volumes = outputs.volumes().unwrap();
        let cgs = outputs.cgs().unwrap();
        for (k, mass) in report.mass().iter().enumerate() {
            assert_eq!(volumes[(0, k)], mass.volume);
            assert_eq!(cgs[(0, k)], mass.center.x);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = InterferenceConfig {
            attr_name: String::new(),
            ..InterferenceConfig::default()
        };
        assert!(matches!(
            InterferenceEngine::new(config),
            Err(InterferenceError::Config(_))
        ));
    }
}
