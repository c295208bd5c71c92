//! Blade definition and spanwise section assembly.

use std::fs;
use std::path::Path;

use log::info;
use ndarray::Array1;
use thiserror::Error;

use crate::airfoil::{self, Airfoil, GeometryError};
use crate::interpolate::{self, InterpError};
use crate::project::AirfoilCatalog;

#[derive(Debug, Error)]
pub enum BladeError {
    #[error("cannot read blade file: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    BadFormat(String),
    #[error("radii must be strictly increasing: {0}")]
    Monotonic(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Interp(#[from] InterpError),
}

/// Spanwise blade definition: parallel per-station arrays over strictly
/// increasing absolute radii.
#[derive(Debug, Clone)]
pub struct BladeDefinition {
    /// absolute radius [m]
    radius: Array1<f64>,
    /// radius relative to the tip, in [0, 1]
    relative_radius: Array1<f64>,
    /// relative thickness in percent of chord
    relative_thickness: Array1<f64>,
    /// chord length [m]
    chord: Array1<f64>,
    /// pitch-axis offset in percent of chord
    pitch_axis: Array1<f64>,
    /// twist angle [deg]
    twist: Array1<f64>,
}

impl BladeDefinition {
    /// Load a blade geometry file: `#` comments, then whitespace-separated
    /// rows of `radius  rel_thickness  chord  pitch_axis  twist`.
    pub fn from_file(path: &Path) -> Result<Self, BladeError> {
        let text = fs::read_to_string(path)?;
        let mut rows: Vec<[f64; 5]> = Vec::new();
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<f64> = line
                .split_whitespace()
                .map(|t| {
                    t.parse::<f64>().map_err(|_| {
                        BladeError::BadFormat(format!("cannot parse blade value {t:?}"))
                    })
                })
                .collect::<Result<_, _>>()?;
            let row: [f64; 5] = fields.try_into().map_err(|fields: Vec<f64>| {
                BladeError::BadFormat(format!(
                    "blade rows need 5 columns (radius, thickness, chord, pitch axis, twist), got {}",
                    fields.len()
                ))
            })?;
            rows.push(row);
        }
        if rows.len() < 3 {
            return Err(BladeError::BadFormat(format!(
                "a blade needs at least 3 stations, got {}",
                rows.len()
            )));
        }
        for pair in rows.windows(2) {
            if pair[1][0] <= pair[0][0] {
                return Err(BladeError::Monotonic(format!(
                    "station at r = {} m after r = {} m",
                    pair[1][0], pair[0][0]
                )));
            }
        }

        let column = |i: usize| Array1::from_iter(rows.iter().map(move |r| r[i]));
        let radius = column(0);
        let tip = radius[radius.len() - 1];
        let relative_radius = &radius / tip;
        Ok(BladeDefinition {
            radius,
            relative_radius,
            relative_thickness: column(1),
            chord: column(2),
            pitch_axis: column(3),
            twist: column(4),
        })
    }

    pub fn n_stations(&self) -> usize {
        self.radius.len()
    }

    pub fn radius(&self) -> &Array1<f64> {
        &self.radius
    }

    pub fn relative_radius(&self) -> &Array1<f64> {
        &self.relative_radius
    }

    pub fn relative_thickness(&self) -> &Array1<f64> {
        &self.relative_thickness
    }

    /// relative thickness in percent at an arbitrary radius
    pub fn thickness_at(&self, radius: f64) -> Result<f64, InterpError> {
        interpolate::monotonic_cubic(
            radius,
            self.radius.view(),
            self.relative_thickness.view(),
        )
    }

    pub fn chord_at(&self, radius: f64) -> Result<f64, InterpError> {
        interpolate::monotonic_cubic(radius, self.radius.view(), self.chord.view())
    }

    pub fn pitch_axis_at(&self, radius: f64) -> Result<f64, InterpError> {
        interpolate::monotonic_cubic(radius, self.radius.view(), self.pitch_axis.view())
    }

    pub fn twist_at(&self, radius: f64) -> Result<f64, InterpError> {
        interpolate::monotonic_cubic(radius, self.radius.view(), self.twist.view())
    }
}

/// One finished spanwise section. Owns its interpolated airfoil.
#[derive(Debug, Clone)]
pub struct BladeSection {
    pub airfoil: Airfoil,
    pub name: String,
    /// relative thickness in percent of chord
    pub relative_thickness: f64,
    /// station radius [m]
    pub radius: f64,
    /// chord length [m]
    pub chord: f64,
    /// pitch-axis offset in percent of chord
    pub pitch_axis: f64,
    /// twist angle [deg]
    pub twist: f64,
}

/// Assemble one section per requested radius: interpolate the airfoil from
/// the bracketing catalog entries, then scale, twist about the quarter
/// chord and move the pitch axis onto the stacking axis.
pub fn assemble_sections(
    blade: &BladeDefinition,
    catalog: &AirfoilCatalog,
    radii: &[f64],
) -> Result<Vec<BladeSection>, BladeError> {
    radii
        .iter()
        .map(|&r| assemble_section(blade, catalog, r))
        .collect()
}

fn assemble_section(
    blade: &BladeDefinition,
    catalog: &AirfoilCatalog,
    radius: f64,
) -> Result<BladeSection, BladeError> {
    let thickness = blade.thickness_at(radius)?;
    let (left, right) = catalog.bracketing(thickness)?;
    let mut foil = airfoil::interpolate_between(left, right, thickness)?;

    let chord = blade.chord_at(radius)?;
    let pitch_axis = blade.pitch_axis_at(radius)?;
    let twist = blade.twist_at(radius)?;

    // the thickness interpolation already carries the target relative
    // thickness, so y scales with the chord
    foil.apply_scaling(chord, chord, radius);
    foil.apply_twist_around_quarter_chord(twist, pitch_axis)?;
    foil.apply_translation_xy(-(0.25 + pitch_axis / 100.0) * chord, 0.0);

    info!(
        "section at r = {radius:.2} m: t = {thickness:.1}%, chord = {chord:.3} m, twist = {twist:.2} deg"
    );
    let name = foil.name().unwrap_or("section").to_string();
    Ok(BladeSection {
        airfoil: foil,
        name,
        relative_thickness: thickness,
        radius,
        chord,
        pitch_axis,
        twist,
    })
}
