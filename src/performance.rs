//! Alpha-indexed aerodynamic coefficient tables.

use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use itertools::Itertools;
use ndarray::Array2;
use ndarray_csv::Array2Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PerformanceError {
    #[error("cannot read performance file: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    BadFormat(String),
    #[error("alpha values must be strictly increasing: {0}")]
    Monotonic(String),
    #[error("query against an empty performance table")]
    EmptyTable,
    #[error("no performance point within {tol}° of alpha = {alpha}°")]
    NotFound { alpha: f64, tol: f64 },
}

/// One tabulated operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformancePoint {
    /// angle of attack in degrees
    pub alpha: f64,
    pub cl: f64,
    pub cd: f64,
    pub cm: f64,
}

/// Aerodynamic performance of one airfoil at one Reynolds number,
/// sorted strictly increasing in alpha.
#[derive(Debug, Clone)]
pub struct PerformanceTable {
    name: String,
    /// relative thickness of the reference geometry in percent of chord
    relative_thickness: f64,
    /// pitch-axis offset in percent of chord
    pitch_axis: f64,
    reynolds: f64,
    /// design twist angle in degrees
    design_twist: f64,
    points: Vec<PerformancePoint>,
}

impl PerformanceTable {
    pub fn new(name: impl Into<String>) -> Self {
        PerformanceTable {
            name: name.into(),
            relative_thickness: 0.0,
            pitch_axis: 0.0,
            reynolds: 0.0,
            design_twist: 0.0,
            points: Vec::new(),
        }
    }

    /// Load a performance file: `key value` header lines (`name`,
    /// `relative_thickness`, `pitch_axis`, `reynolds`, `design_twist`)
    /// followed by comma-separated `alpha,cl,cd,cm` rows.
    pub fn from_file(path: &Path) -> Result<Self, PerformanceError> {
        let text = fs::read_to_string(path)?;
        let mut table = PerformanceTable::new("");
        let mut body = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+') {
                body.push_str(trimmed);
                body.push('\n');
                continue;
            }
            let (key, value) = trimmed.split_once(char::is_whitespace).ok_or_else(|| {
                PerformanceError::BadFormat(format!("header line without a value: {trimmed:?}"))
            })?;
            let value = value.trim();
            let parse = |v: &str| {
                v.parse::<f64>().map_err(|_| {
                    PerformanceError::BadFormat(format!("cannot parse {v:?} for key {key:?}"))
                })
            };
            match key {
                "name" => table.name = value.to_string(),
                "relative_thickness" => table.relative_thickness = parse(value)?,
                "pitch_axis" => table.pitch_axis = parse(value)?,
                "reynolds" => table.reynolds = parse(value)?,
                "design_twist" => table.design_twist = parse(value)?,
                _ => {
                    return Err(PerformanceError::BadFormat(format!(
                        "unknown performance header key {key:?}"
                    )))
                }
            }
        }
        if table.name.is_empty() {
            table.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .delimiter(b',')
            .from_reader(body.as_bytes());
        let rows: Array2<f64> = reader
            .deserialize_array2_dynamic()
            .map_err(|e| PerformanceError::BadFormat(e.to_string()))?;
        if rows.shape()[1] != 4 {
            return Err(PerformanceError::BadFormat(format!(
                "performance rows must have 4 columns (alpha, cl, cd, cm), got {}",
                rows.shape()[1]
            )));
        }
        for row in rows.rows() {
            table.add_point(PerformancePoint {
                alpha: row[0],
                cl: row[1],
                cd: row[2],
                cm: row[3],
            })?;
        }
        Ok(table)
    }

    pub fn add_point(&mut self, point: PerformancePoint) -> Result<(), PerformanceError> {
        if let Some(last) = self.points.last() {
            if point.alpha <= last.alpha {
                return Err(PerformanceError::Monotonic(format!(
                    "alpha = {}° after {}°",
                    point.alpha, last.alpha
                )));
            }
        }
        self.points.push(point);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relative_thickness(&self) -> f64 {
        self.relative_thickness
    }

    pub fn pitch_axis(&self) -> f64 {
        self.pitch_axis
    }

    pub fn reynolds(&self) -> f64 {
        self.reynolds
    }

    pub fn design_twist(&self) -> f64 {
        self.design_twist
    }

    pub fn set_relative_thickness(&mut self, percent: f64) {
        self.relative_thickness = percent;
    }

    pub fn set_pitch_axis(&mut self, percent: f64) {
        self.pitch_axis = percent;
    }

    pub fn set_reynolds(&mut self, reynolds: f64) {
        self.reynolds = reynolds;
    }

    pub fn set_design_twist(&mut self, degrees: f64) {
        self.design_twist = degrees;
    }

    pub fn points(&self) -> &[PerformancePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First tabulated point within `tol` degrees of `alpha`.
    pub fn performance_at_alpha(
        &self,
        alpha: f64,
        tol: f64,
    ) -> Result<&PerformancePoint, PerformanceError> {
        if self.points.is_empty() {
            return Err(PerformanceError::EmptyTable);
        }
        self.points
            .iter()
            .find(|p| (p.alpha - alpha).abs() <= tol)
            .ok_or(PerformanceError::NotFound { alpha, tol })
    }

    /// Coefficients at `alpha`, linearly interpolated between the two
    /// bracketing rows and clamped to the first/last row outside the
    /// tabulated range.
    pub fn interpolate_performance(&self, alpha: f64) -> Result<PerformancePoint, PerformanceError> {
        let first = self.points.first().ok_or(PerformanceError::EmptyTable)?;
        let last = self.points.last().ok_or(PerformanceError::EmptyTable)?;
        if alpha <= first.alpha {
            return Ok(PerformancePoint { alpha, ..*first });
        }
        if alpha >= last.alpha {
            return Ok(PerformancePoint { alpha, ..*last });
        }
        let (lo, hi) = self
            .points
            .iter()
            .tuple_windows()
            .find(|(a, b)| a.alpha < alpha && alpha <= b.alpha)
            .unwrap_or_else(|| unreachable!());
        let t = (alpha - lo.alpha) / (hi.alpha - lo.alpha);
        Ok(PerformancePoint {
            alpha,
            cl: lo.cl + t * (hi.cl - lo.cl),
            cd: lo.cd + t * (hi.cd - lo.cd),
            cm: lo.cm + t * (hi.cm - lo.cm),
        })
    }

    fn max_cl_point(&self) -> Result<&PerformancePoint, PerformanceError> {
        self.points
            .iter()
            .max_by(|a, b| a.cl.partial_cmp(&b.cl).unwrap())
            .ok_or(PerformanceError::EmptyTable)
    }

    /// Angle of attack at maximum lift.
    pub fn max_cl_alpha(&self) -> Result<f64, PerformanceError> {
        Ok(self.max_cl_point()?.alpha)
    }

    pub fn max_cl(&self) -> Result<f64, PerformanceError> {
        Ok(self.max_cl_point()?.cl)
    }

    pub fn min_cd(&self) -> Result<f64, PerformanceError> {
        self.points
            .iter()
            .map(|p| p.cd)
            .min_by(|a, b| a.partial_cmp(b).unwrap())
            .ok_or(PerformanceError::EmptyTable)
    }

    /// Stall is the angle of attack at maximum lift.
    pub fn stall_alpha(&self) -> Result<f64, PerformanceError> {
        self.max_cl_alpha()
    }
}
