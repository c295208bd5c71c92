//! Airfoil contour container and the normalization pipeline.
//!
//! A contour is stored counter-clockwise starting at the upper trailing
//! edge, chord-normalized to `x ∈ [0, 1]` with the nose at the origin.
//! [`Airfoil::normalize`] takes any raw imported contour and establishes
//! that canonical form; every public mutation keeps it intact.

use std::fs;
use std::path::Path;

use log::debug;
use ndarray::Array1;
use thiserror::Error;

use crate::geom::{Marker, MarkerKind, Point};
use crate::interpolate::{self, InterpError};

/// Two x values closer than this refer to the same chordwise station.
const X_MATCH_TOL: f64 = 1e-3;
/// Exact-position tolerance for nose and trailing edge tests.
const POS_TOL: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("cannot read geometry file: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    BadFormat(String),
    #[error("marker {0:?} is not set on this airfoil")]
    MarkerMissing(MarkerKind),
    #[error("{0}")]
    NotFound(String),
    #[error("thickness {target}% is outside the bracketing range [{low}%, {high}%]")]
    OutOfRange { target: f64, low: f64, high: f64 },
    #[error(transparent)]
    Interp(#[from] InterpError),
}

/// An airfoil contour with its markers, header block and the parallel
/// scaled/rotated/translated copy used for 3-d placement.
#[derive(Debug, Clone, Default)]
pub struct Airfoil {
    name: Option<String>,
    coordinates: Vec<Point>,
    markers: Vec<Marker>,
    headers: Vec<String>,
    /// relative thickness as a fraction of chord
    relative_thickness: f64,
    scaled: Vec<Point>,
    orientation_normalized: bool,
}

impl Airfoil {
    pub fn new() -> Self {
        Airfoil::default()
    }

    /// Load a Selig-style geometry file: optional non-numeric header lines,
    /// then one `x y` pair per line, trailing edge over the upper surface to
    /// the nose and back. The contour is normalized before returning.
    pub fn from_selig_file(path: &Path) -> Result<Self, GeometryError> {
        let text = fs::read_to_string(path)?;
        let mut airfoil = Airfoil::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let pair = match (tokens.next(), tokens.next()) {
                (Some(a), Some(b)) => a.parse::<f64>().ok().zip(b.parse::<f64>().ok()),
                _ => None,
            };
            match pair {
                Some((x, y)) => {
                    let index = airfoil.coordinates.len();
                    airfoil.add_coordinate(Point::new(index, x, y));
                }
                None if airfoil.coordinates.is_empty() => airfoil.add_header(line.to_string()),
                None => {
                    return Err(GeometryError::BadFormat(format!(
                        "non-numeric line inside the coordinate block: {line:?}"
                    )))
                }
            }
        }
        if airfoil.coordinates.is_empty() {
            return Err(GeometryError::BadFormat(format!(
                "no coordinates in {}",
                path.display()
            )));
        }

        // coordinates at maximum x belong to the trailing edge
        let x_max = airfoil
            .coordinates
            .iter()
            .map(|c| c.x)
            .fold(f64::NEG_INFINITY, f64::max);
        for c in &mut airfoil.coordinates {
            c.is_trailing_edge = (x_max - c.x).abs() <= X_MATCH_TOL;
        }

        if airfoil.name.is_none() {
            airfoil.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        airfoil.normalize()?;
        let thickness = airfoil.max_thickness()? / airfoil.chord_length()?;
        airfoil.relative_thickness = thickness;
        Ok(airfoil)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn coordinates(&self) -> &[Point] {
        &self.coordinates
    }

    pub fn scaled_coordinates(&self) -> &[Point] {
        &self.scaled
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn is_normalized(&self) -> bool {
        self.orientation_normalized
    }

    /// relative thickness as a fraction of chord
    pub fn relative_thickness(&self) -> f64 {
        self.relative_thickness
    }

    /// relative thickness in percent of chord
    pub fn relative_thickness_percent(&self) -> f64 {
        self.relative_thickness * 100.0
    }

    pub fn set_relative_thickness(&mut self, fraction: f64) {
        self.relative_thickness = fraction;
    }

    pub fn add_coordinate(&mut self, point: Point) {
        self.coordinates.push(point);
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn add_header(&mut self, line: String) {
        self.headers.push(line);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, kind: MarkerKind) -> Option<&Marker> {
        self.markers.iter().find(|m| m.kind == kind)
    }

    fn marker_index(&self, kind: MarkerKind) -> Result<usize, GeometryError> {
        self.marker(kind)
            .map(|m| m.index)
            .ok_or(GeometryError::MarkerMissing(kind))
    }

    fn set_marker(&mut self, kind: MarkerKind, index: usize) {
        match self.markers.iter_mut().find(|m| m.kind == kind) {
            Some(marker) => marker.index = index,
            None => self.markers.push(Marker::new(kind, index)),
        }
    }

    pub fn leading_edge(&self) -> Result<&Point, GeometryError> {
        let index = self.marker_index(MarkerKind::Le)?;
        Ok(&self.coordinates[index])
    }

    pub fn trailing_edge(&self) -> Result<&Point, GeometryError> {
        let index = self.marker_index(MarkerKind::Te)?;
        Ok(&self.coordinates[index])
    }

    pub fn chord_length(&self) -> Result<f64, GeometryError> {
        Ok((self.trailing_edge()?.x - self.leading_edge()?.x).abs())
    }

    fn reindex(&mut self) {
        for (i, c) in self.coordinates.iter_mut().enumerate() {
            c.index = i;
        }
    }

    /// Bring a raw imported contour into canonical form.
    ///
    /// Order-sensitive pipeline: nose insertion, centring, orientation,
    /// leading-edge marking, surface flags, trailing-edge subtype flags.
    /// On error the airfoil is left unchanged; the pipeline is idempotent
    /// on an already-normalized contour.
    pub fn normalize(&mut self) -> Result<(), GeometryError> {
        if self.coordinates.is_empty() {
            return Err(GeometryError::BadFormat(
                "cannot normalize an empty contour".into(),
            ));
        }
        let mut work = self.clone();
        work.ensure_nose_point();
        work.centre_on_nose();
        work.orient_counter_clockwise();
        work.mark_leading_edge()?;
        work.assign_surface_flags()?;
        work.mark_trailing_edges()?;
        *self = work;
        Ok(())
    }

    /// Insert a nose point at `x = 0` next to the minimum-x coordinate when
    /// the contour has none.
    fn ensure_nose_point(&mut self) {
        if self.coordinates.iter().any(|c| c.x.abs() <= POS_TOL) {
            return;
        }
        let i_min = self
            .coordinates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.x.partial_cmp(&b.x).unwrap())
            .map(|(i, _)| i)
            .unwrap_or(0);
        let y_min = self.coordinates[i_min].y;
        debug!("inserting nose point at (0, {y_min}) next to coordinate {i_min}");
        self.coordinates.insert(i_min + 1, Point::new(0, 0.0, y_min));
        self.reindex();
    }

    /// Translate the contour so the nose sits at the origin. Trailing-edge
    /// coordinates keep their x value and move only in y.
    fn centre_on_nose(&mut self) {
        let x_min = self
            .coordinates
            .iter()
            .map(|c| c.x)
            .fold(f64::INFINITY, f64::min);
        let nose = self
            .coordinates
            .iter()
            .min_by(|a, b| a.x.partial_cmp(&b.x).unwrap())
            .unwrap_or_else(|| unreachable!());
        let (dx, dy) = (x_min.abs(), nose.y.abs());
        for c in &mut self.coordinates {
            if !c.is_trailing_edge {
                c.x -= dx;
            }
            c.y -= dy;
        }
    }

    /// Reverse the sequence when it starts clockwise.
    fn orient_counter_clockwise(&mut self) {
        if self.coordinates.len() >= 2 && self.coordinates[0].y > self.coordinates[1].y {
            debug!("reversing clockwise contour");
            self.coordinates.reverse();
        }
        self.reindex();
        self.orientation_normalized = true;
    }

    fn mark_leading_edge(&mut self) -> Result<(), GeometryError> {
        let index = self
            .coordinates
            .iter()
            .position(|c| c.x.abs() <= POS_TOL)
            .ok_or_else(|| GeometryError::NotFound("no coordinate at x = 0".into()))?;
        self.set_marker(MarkerKind::Le, index);
        Ok(())
    }

    /// A coordinate is on the upper surface iff it precedes the leading
    /// edge in traversal order.
    fn assign_surface_flags(&mut self) -> Result<(), GeometryError> {
        let le = self.marker_index(MarkerKind::Le)?;
        for c in &mut self.coordinates {
            c.is_upper = c.index <= le;
        }
        Ok(())
    }

    /// Flag the trailing-edge corners. A candidate at `x >= 1` belongs to
    /// the top edge iff it precedes the leading edge in traversal order;
    /// the first candidate on each side wins.
    fn mark_trailing_edges(&mut self) -> Result<(), GeometryError> {
        let le = self.marker_index(MarkerKind::Le)?;
        for c in &mut self.coordinates {
            c.is_te_upper = false;
            c.is_te_lower = false;
        }
        let upper = self
            .coordinates
            .iter()
            .position(|c| c.x >= 1.0 - POS_TOL && c.index < le)
            .ok_or_else(|| {
                GeometryError::NotFound("no upper trailing edge candidate at x = 1".into())
            })?;
        let lower = self
            .coordinates
            .iter()
            .position(|c| c.x >= 1.0 - POS_TOL && c.index > le)
            .ok_or_else(|| {
                GeometryError::NotFound("no lower trailing edge candidate at x = 1".into())
            })?;
        self.coordinates[upper].is_te_upper = true;
        self.coordinates[upper].is_trailing_edge = true;
        self.coordinates[lower].is_te_lower = true;
        self.coordinates[lower].is_trailing_edge = true;
        self.set_marker(MarkerKind::Te, upper);
        Ok(())
    }

    /// Split the contour into the upper surface (x descending, trailing to
    /// leading edge) and the lower surface (x ascending, leading to trailing
    /// edge). Trailing-edge points without the matching corner flag are
    /// skipped; missing endpoints are padded so the upper surface runs from
    /// `(1, 0)` to `(0, 0)` and the lower surface back.
    pub fn separate_surfaces(&self) -> Result<(Vec<[f64; 2]>, Vec<[f64; 2]>), GeometryError> {
        let le = self.marker_index(MarkerKind::Le)?;
        let at_te = |c: &Point| c.x >= 1.0 - POS_TOL;

        let mut upper: Vec<[f64; 2]> = self
            .coordinates
            .iter()
            .filter(|c| c.index <= le && (!at_te(c) || c.is_te_upper))
            .map(|c| [c.x, c.y])
            .collect();
        upper.sort_by(|a, b| b[0].partial_cmp(&a[0]).unwrap());
        if upper.first().map_or(true, |p| p[0] < 1.0 - POS_TOL) {
            upper.insert(0, [1.0, 0.0]);
        }
        if upper.last().map_or(true, |p| p[0] > POS_TOL) {
            upper.push([0.0, 0.0]);
        }

        let mut lower: Vec<[f64; 2]> = self
            .coordinates
            .iter()
            .filter(|c| c.index > le && (!at_te(c) || c.is_te_lower))
            .map(|c| [c.x, c.y])
            .collect();
        lower.sort_by(|a, b| a[0].partial_cmp(&b[0]).unwrap());
        if lower.first().map_or(true, |p| p[0] > POS_TOL) {
            lower.insert(0, [0.0, 0.0]);
        }
        if lower.last().map_or(true, |p| p[0] < 1.0 - POS_TOL) {
            lower.push([1.0, 0.0]);
        }

        Ok((upper, lower))
    }

    /// Maximum distance between upper and lower surface over all chordwise
    /// stations where both surfaces carry a sample.
    pub fn max_thickness(&self) -> Result<f64, GeometryError> {
        let (upper, lower) = self.separate_surfaces()?;
        let mut best: f64 = 0.0;
        for up in &upper {
            let matched = lower
                .iter()
                .filter(|lo| (lo[0] - up[0]).abs() <= X_MATCH_TOL)
                .min_by(|a, b| {
                    (a[0] - up[0])
                        .abs()
                        .partial_cmp(&(b[0] - up[0]).abs())
                        .unwrap()
                });
            if let Some(lo) = matched {
                best = best.max((up[1] - lo[1]).abs());
            }
        }
        Ok(best)
    }

    /// Copy the canonical contour into the scaled contour, multiplying x by
    /// the chord, y by the thickness scale and z by the station radius.
    /// Replaces any previous scaled contour.
    pub fn apply_scaling(&mut self, chord: f64, max_thickness: f64, radius: f64) {
        self.scaled = self
            .coordinates
            .iter()
            .map(|c| {
                let mut p = c.clone();
                p.x = c.x * chord;
                p.y = c.y * max_thickness;
                p.z = c.z * radius;
                p
            })
            .collect();
    }

    /// Rotate every scaled coordinate about the pivot, angle in degrees.
    pub fn apply_twist_around(&mut self, angle_degrees: f64, pivot_x: f64, pivot_y: f64) {
        let phi = angle_degrees.to_radians();
        for p in &mut self.scaled {
            p.rotate_around(pivot_x, pivot_y, phi);
        }
    }

    /// Rotate the scaled contour about the quarter-chord point shifted by
    /// the pitch-axis offset (percent of chord).
    pub fn apply_twist_around_quarter_chord(
        &mut self,
        angle_degrees: f64,
        pitch_axis_percent: f64,
    ) -> Result<(), GeometryError> {
        if self.scaled.is_empty() {
            return Err(GeometryError::NotFound(
                "no scaled contour, call apply_scaling first".into(),
            ));
        }
        let x_min = self.scaled.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let x_max = self
            .scaled
            .iter()
            .map(|p| p.x)
            .fold(f64::NEG_INFINITY, f64::max);
        let pivot_x = x_min + (0.25 + pitch_axis_percent / 100.0) * (x_max - x_min);
        self.apply_twist_around(angle_degrees, pivot_x, 0.0);
        Ok(())
    }

    /// Translate the scaled contour in the section plane.
    pub fn apply_translation_xy(&mut self, dx: f64, dy: f64) {
        for p in &mut self.scaled {
            p.x += dx;
            p.y += dy;
        }
    }
}

/// Blend a synthetic airfoil of the target relative thickness (percent)
/// from two bracketing airfoils.
///
/// Both surfaces are resampled onto the merged abscissa set of the two
/// inputs and blended linearly; the result is normalization-compliant.
pub fn interpolate_between(
    a: &Airfoil,
    b: &Airfoil,
    target_percent: f64,
) -> Result<Airfoil, GeometryError> {
    let (thick, thin) = if a.relative_thickness_percent() >= b.relative_thickness_percent() {
        (a, b)
    } else {
        (b, a)
    };
    let thick_p = thick.relative_thickness_percent();
    let thin_p = thin.relative_thickness_percent();
    if target_percent > thick_p + POS_TOL || target_percent < thin_p - POS_TOL {
        return Err(GeometryError::OutOfRange {
            target: target_percent,
            low: thin_p,
            high: thick_p,
        });
    }
    let t = if (thin_p - thick_p).abs() <= POS_TOL {
        0.0
    } else {
        ((target_percent - thick_p) / (thin_p - thick_p)).abs()
    };

    let (up_thick, lo_thick) = thick.separate_surfaces()?;
    let (up_thin, lo_thin) = thin.separate_surfaces()?;

    let upper_xs = merged_abscissae(&up_thick, &up_thin);
    let lower_xs = merged_abscissae(&lo_thick, &lo_thin);

    let blend = |xs: &[f64], s_thick: &[[f64; 2]], s_thin: &[[f64; 2]]| {
        let (tx, ty) = ascending_arrays(s_thick);
        let (nx, ny) = ascending_arrays(s_thin);
        xs.iter()
            .map(|&x| {
                let y_thick = interpolate::linear(x, tx.view(), ty.view())?;
                let y_thin = interpolate::linear(x, nx.view(), ny.view())?;
                Ok((1.0 - t) * y_thick + t * y_thin)
            })
            .collect::<Result<Vec<f64>, InterpError>>()
    };
    let upper_ys = blend(&upper_xs, &up_thick, &up_thin)?;
    let lower_ys = blend(&lower_xs, &lo_thick, &lo_thin)?;

    // canonical order: upper from the trailing edge down to the nose,
    // then the lower surface back, closing at (1, 0)
    let mut out = Airfoil::new();
    out.set_name(format!("{target_percent:.1}pct-interpolated"));
    for (&x, &y) in upper_xs.iter().rev().zip(upper_ys.iter().rev()) {
        let index = out.coordinates.len();
        out.add_coordinate(Point::new(index, x, y));
    }
    let le_index = out.coordinates.len() - 1;
    for (&x, &y) in lower_xs.iter().zip(lower_ys.iter()).skip(1) {
        let index = out.coordinates.len();
        out.add_coordinate(Point::new(index, x, y));
    }
    let last = out.coordinates.len() - 1;
    for c in &mut out.coordinates {
        c.is_upper = c.index <= le_index;
    }
    out.coordinates[0].is_te_upper = true;
    out.coordinates[0].is_trailing_edge = true;
    out.coordinates[last].is_te_lower = true;
    out.coordinates[last].is_trailing_edge = true;
    out.set_marker(MarkerKind::Le, le_index);
    out.set_marker(MarkerKind::Te, 0);
    out.orientation_normalized = true;
    out.relative_thickness = target_percent / 100.0;
    Ok(out)
}

/// Sorted union of the abscissae of two surfaces, deduplicated.
fn merged_abscissae(a: &[[f64; 2]], b: &[[f64; 2]]) -> Vec<f64> {
    let mut xs: Vec<f64> = a.iter().chain(b.iter()).map(|p| p[0]).collect();
    xs.sort_by(|u, v| u.partial_cmp(v).unwrap());
    xs.dedup_by(|u, v| (*u - *v).abs() <= POS_TOL);
    xs
}

/// Surface samples as ascending parallel arrays for the linear kernel.
fn ascending_arrays(surface: &[[f64; 2]]) -> (Array1<f64>, Array1<f64>) {
    let mut points = surface.to_vec();
    points.sort_by(|a, b| a[0].partial_cmp(&b[0]).unwrap());
    let xs = Array1::from_iter(points.iter().map(|p| p[0]));
    let ys = Array1::from_iter(points.iter().map(|p| p[1]));
    (xs, ys)
}
