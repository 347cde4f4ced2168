//! In-memory run report and its binary scratch-file form.
//!
//! Layout, native byte order, no header:
//!
//! ```text
//! i32 N
//! N × { i32 L (name bytes + NUL), u8[L] name, f64[14] mass properties }
//! f64[N*N] distances, row-major
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use interfere_kernel::MassProperties;

use crate::{InterferenceError, Result};

/// Names, mass properties and the symmetric distance matrix of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct InterferenceReport {
    names: Vec<String>,
    mass: Vec<MassProperties>,
    distances: Vec<f64>,
}

impl InterferenceReport {
    /// Report with all distances zero.
    ///
    /// `names` and `mass` must have the same length.
    pub fn new(names: Vec<String>, mass: Vec<MassProperties>) -> Result<Self> {
        if names.len() != mass.len() {
            return Err(InterferenceError::Format(format!(
                "{} names but {} mass records",
                names.len(),
                mass.len()
            )));
        }
        let n = names.len();
        Ok(Self {
            names,
            mass,
            distances: vec![0.0; n * n],
        })
    }

    /// Number of bodies.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the report has no bodies.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Body names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Mass properties, one per body.
    pub fn mass(&self) -> &[MassProperties] {
        &self.mass
    }

    /// Row-major N×N distances.
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Distance between bodies `i` and `j` (0-based).
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[i * self.len() + j]
    }

    /// Write `d` at `(i, j)` and `(j, i)`.
    pub fn set_distance(&mut self, i: usize, j: usize, d: f64) {
        let n = self.len();
        self.distances[i * n + j] = d;
        self.distances[j * n + i] = d;
    }

    /// Index of the first body called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Serialize to `w`.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<()> {
        let count = i32::try_from(self.len())
            .map_err(|_| InterferenceError::Format(format!("{} bodies", self.len())))?;
        put(&mut w, &count.to_ne_bytes())?;
        for (name, mass) in self.names.iter().zip(&self.mass) {
            if name.contains('\0') {
                return Err(InterferenceError::Format(format!(
                    "body name {name:?} contains NUL"
                )));
            }
            let len = i32::try_from(name.len() + 1)
                .map_err(|_| InterferenceError::Format("body name too long".into()))?;
            put(&mut w, &len.to_ne_bytes())?;
            put(&mut w, name.as_bytes())?;
            put(&mut w, &[0])?;
            for v in mass.to_array() {
                put(&mut w, &v.to_ne_bytes())?;
            }
        }
        for d in &self.distances {
            put(&mut w, &d.to_ne_bytes())?;
        }
        w.flush()
            .map_err(|source| InterferenceError::Scratch { op: "flush", source })
    }

    /// Deserialize from `r`, which must hold exactly one report.
    pub fn read_from<R: Read>(mut r: R) -> Result<Self> {
        let count = get_i32(&mut r, "body count")?;
        let n = usize::try_from(count)
            .map_err(|_| InterferenceError::Format(format!("negative body count {count}")))?;

        let mut names = Vec::new();
        let mut mass = Vec::new();
        for b in 0..n {
            let len = get_i32(&mut r, "name length")?;
            if len <= 0 {
                return Err(InterferenceError::Format(format!(
                    "body {b} has name length {len}"
                )));
            }
            let mut bytes = Vec::new();
            r.by_ref()
                .take(len as u64)
                .read_to_end(&mut bytes)
                .map_err(|source| InterferenceError::Scratch { op: "read", source })?;
            if bytes.len() != len as usize {
                return Err(InterferenceError::Format(
                    "file ends while reading name".into(),
                ));
            }
            if bytes.pop() != Some(0) || bytes.contains(&0) {
                return Err(InterferenceError::Format(format!(
                    "body {b} name is not NUL-terminated"
                )));
            }
            let name = String::from_utf8(bytes).map_err(|_| {
                InterferenceError::Format(format!("body {b} name is not UTF-8"))
            })?;

            let mut values = [0.0; MassProperties::LEN];
            for v in &mut values {
                *v = get_f64(&mut r, "mass properties")?;
            }
            names.push(name);
            mass.push(MassProperties::from_array(&values));
        }

        let mut report = Self::new(names, mass)?;
        for d in &mut report.distances {
            *d = get_f64(&mut r, "distances")?;
        }

        let mut extra = [0u8; 1];
        match r.read(&mut extra) {
            Ok(0) => Ok(report),
            Ok(_) => Err(InterferenceError::Format(
                "trailing bytes after distances".into(),
            )),
            Err(source) => Err(InterferenceError::Scratch { op: "read", source }),
        }
    }

    /// Write the report to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).map_err(|source| InterferenceError::Scratch { op: "create", source })?;
        self.write_to(BufWriter::new(file))
    }

    /// Read a report from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).map_err(|source| InterferenceError::Scratch { op: "open", source })?;
        Self::read_from(BufReader::new(file))
    }
}

fn put<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    w.write_all(bytes)
        .map_err(|source| InterferenceError::Scratch { op: "write", source })
}

fn get<R: Read>(r: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => {
            InterferenceError::Format(format!("file ends while reading {what}"))
        }
        _ => InterferenceError::Scratch { op: "read", source: e },
    })
}

fn get_i32<R: Read>(r: &mut R, what: &str) -> Result<i32> {
    let mut buf = [0u8; 4];
    get(r, &mut buf, what)?;
    Ok(i32::from_ne_bytes(buf))
}

fn get_f64<R: Read>(r: &mut R, what: &str) -> Result<f64> {
    let mut buf = [0u8; 8];
    get(r, &mut buf, what)?;
    Ok(f64::from_ne_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use interfere_math::Point3;
    use nalgebra::Matrix3;

    fn sample() -> InterferenceReport {
        let mass = |v: f64| MassProperties {
            volume: v,
            area: 6.0 * v,
            center: Point3::new(v, -v, 0.5),
            inertia: Matrix3::new(1.0, 0.1, 0.2, 0.1, 2.0, 0.3, 0.2, 0.3, 3.0) * v,
        };
        let mut report = InterferenceReport::new(
            vec!["wing".into(), "fuselage".into(), "tail".into()],
            vec![mass(1.0), mass(2.5), mass(0.125)],
        )
        .unwrap();
        report.set_distance(0, 1, 0.1 + 0.2);
        report.set_distance(0, 2, -1.0 / 3.0);
        report.set_distance(1, 2, 4.0);
        report.set_distance(1, 1, 1.0);
        report
    }

    fn encode(report: &InterferenceReport) -> Vec<u8> {
        let mut bytes = Vec::new();
        report.write_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_set_distance_is_symmetric() {
        let report = sample();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(report.distance(i, j), report.distance(j, i));
            }
        }
        assert_eq!(report.distance(1, 1), 1.0);
        assert_eq!(report.distance(0, 0), 0.0);
        assert_eq!(report.index_of("tail"), Some(2));
        assert_eq!(report.index_of("nose"), None);
    }

    #[test]
    fn test_layout() {
        let report = sample();
        let bytes = encode(&report);
        let names: usize = report.names().iter().map(|n| n.len() + 1).sum();
        assert_eq!(bytes.len(), 4 + 3 * (4 + 14 * 8) + names + 9 * 8);
        assert_eq!(&bytes[..4], &3i32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &5i32.to_ne_bytes());
        assert_eq!(&bytes[8..13], b"wing\0");
    }

    #[test]
    fn test_round_trip_is_exact() {
        let report = sample();
        let back = InterferenceReport::read_from(encode(&report).as_slice()).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interference.bin");
        let report = sample();
        report.save(&path).unwrap();
        assert_eq!(InterferenceReport::load(&path).unwrap(), report);
    }

    #[test]
    fn test_truncated_input() {
        let bytes = encode(&sample());
        for cut in [0, 3, 4, 10, bytes.len() - 1] {
            let err = InterferenceReport::read_from(&bytes[..cut]).unwrap_err();
            assert!(matches!(err, InterferenceError::Format(_)), "cut at {cut}");
        }
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode(&sample());
        bytes.push(7);
        let err = InterferenceReport::read_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, InterferenceError::Format(_)));
    }

    #[test]
    fn test_rejects_bad_headers() {
        let negative = (-1i32).to_ne_bytes();
        assert!(matches!(
            InterferenceReport::read_from(negative.as_slice()),
            Err(InterferenceError::Format(_))
        ));

        let mut zero_len = 1i32.to_ne_bytes().to_vec();
        zero_len.extend_from_slice(&0i32.to_ne_bytes());
        assert!(matches!(
            InterferenceReport::read_from(zero_len.as_slice()),
            Err(InterferenceError::Format(_))
        ));

        let mut no_nul = 1i32.to_ne_bytes().to_vec();
        no_nul.extend_from_slice(&2i32.to_ne_bytes());
        no_nul.extend_from_slice(b"ab");
        no_nul.extend(std::iter::repeat(0u8).take(15 * 8));
        assert!(matches!(
            InterferenceReport::read_from(no_nul.as_slice()),
            Err(InterferenceError::Format(_))
        ));
    }

    #[test]
    fn test_rejects_nul_in_name() {
        let report = InterferenceReport::new(
            vec!["a\0b".into()],
            vec![MassProperties::from_array(&[0.0; 14])],
        )
        .unwrap();
        let err = report.write_to(Vec::new()).unwrap_err();
        assert!(matches!(err, InterferenceError::Format(_)));
    }

    #[test]
    fn test_empty_report() {
        let report = InterferenceReport::new(Vec::new(), Vec::new()).unwrap();
        assert!(report.is_empty());
        let back = InterferenceReport::read_from(encode(&report).as_slice()).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = InterferenceReport::load(&dir.path().join("nope.bin")).unwrap_err();
        assert!(matches!(err, InterferenceError::Scratch { op: "open", .. }));
    }
}
