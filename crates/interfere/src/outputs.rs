//! Lazily loaded run outputs.

use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use interfere_kernel::MassProperties;
use nalgebra::DMatrix;
use serde_json::{json, Value};

use crate::{InterferenceError, InterferenceReport, Result};

/// Named outputs of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// Body names (1×N).
    Names,
    /// Signed distances (N×N).
    Distances,
    /// Volumes (1×N).
    Volumes,
    /// Surface areas (1×N).
    Areas,
    /// Centers of gravity (3×N).
    CGs,
    /// Flattened inertia tensors (9×N).
    Inertias,
}

impl OutputKind {
    /// Every output, in declaration order.
    pub const ALL: [OutputKind; 6] = [
        OutputKind::Names,
        OutputKind::Distances,
        OutputKind::Volumes,
        OutputKind::Areas,
        OutputKind::CGs,
        OutputKind::Inertias,
    ];

    /// Output name.
    pub fn name(self) -> &'static str {
        match self {
            OutputKind::Names => "Names",
            OutputKind::Distances => "Distances",
            OutputKind::Volumes => "Volumes",
            OutputKind::Areas => "Areas",
            OutputKind::CGs => "CGs",
            OutputKind::Inertias => "Inertias",
        }
    }

    /// Look up an output by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputKind {
    type Err = InterferenceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| {
            InterferenceError::Config(format!(
                "unknown output {s:?}, expected one of Names, Distances, Volumes, Areas, CGs, Inertias"
            ))
        })
    }
}

/// Value of one output.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    /// String vector.
    Names(Vec<String>),
    /// Double matrix.
    Matrix(DMatrix<f64>),
}

impl OutputValue {
    /// JSON form: an array of strings, or an array of rows.
    pub fn to_json(&self) -> Value {
        match self {
            OutputValue::Names(names) => json!(names),
            OutputValue::Matrix(m) => Value::Array(
                m.row_iter()
                    .map(|row| json!(row.iter().copied().collect::<Vec<f64>>()))
                    .collect(),
            ),
        }
    }
}

/// Outputs of a run, read from its scratch file on first access.
#[derive(Debug)]
pub struct InterferenceOutputs {
    path: PathBuf,
    report: OnceCell<InterferenceReport>,
}

impl InterferenceOutputs {
    /// Outputs backed by the scratch file at `path`. Nothing is read yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            report: OnceCell::new(),
        }
    }

    /// Scratch-file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the scratch file has been read.
    pub fn is_loaded(&self) -> bool {
        self.report.get().is_some()
    }

    /// The underlying report, loading it on first use.
    pub fn report(&self) -> Result<&InterferenceReport> {
        if let Some(report) = self.report.get() {
            return Ok(report);
        }
        let report = InterferenceReport::load(&self.path)?;
        Ok(self.report.get_or_init(|| report))
    }

    /// Body names.
    pub fn names(&self) -> Result<&[String]> {
        Ok(self.report()?.names())
    }

    /// N×N distance matrix.
    pub fn distances(&self) -> Result<DMatrix<f64>> {
        let report = self.report()?;
        let n = report.len();
        Ok(DMatrix::from_row_slice(n, n, report.distances()))
    }

    /// 1×N volumes.
    pub fn volumes(&self) -> Result<DMatrix<f64>> {
        self.columns(1, |m, _| m.volume)
    }

    /// 1×N surface areas.
    pub fn areas(&self) -> Result<DMatrix<f64>> {
        self.columns(1, |m, _| m.area)
    }

    /// 3×N centers of gravity.
    pub fn cgs(&self) -> Result<DMatrix<f64>> {
        self.columns(3, |m, r| m.center[r])
    }

    /// 9×N inertia tensors, each column row-major.
    pub fn inertias(&self) -> Result<DMatrix<f64>> {
        self.columns(9, |m, r| m.inertia[(r / 3, r % 3)])
    }

    /// Any output by kind.
    pub fn value(&self, kind: OutputKind) -> Result<OutputValue> {
        Ok(match kind {
            OutputKind::Names => OutputValue::Names(self.names()?.to_vec()),
            OutputKind::Distances => OutputValue::Matrix(self.distances()?),
            OutputKind::Volumes => OutputValue::Matrix(self.volumes()?),
            OutputKind::Areas => OutputValue::Matrix(self.areas()?),
            OutputKind::CGs => OutputValue::Matrix(self.cgs()?),
            OutputKind::Inertias => OutputValue::Matrix(self.inertias()?),
        })
    }

    fn columns(
        &self,
        rows: usize,
        f: impl Fn(&MassProperties, usize) -> f64,
    ) -> Result<DMatrix<f64>> {
        let mass = self.report()?.mass();
        Ok(DMatrix::from_fn(rows, mass.len(), |r, c| f(&mass[c], r)))
    }
}

impl From<InterferenceReport> for InterferenceOutputs {
    /// Outputs of a report already in memory; no file is read.
    fn from(report: InterferenceReport) -> Self {
        Self {
            path: PathBuf::new(),
            report: OnceCell::from(report),
        }
    }
}
