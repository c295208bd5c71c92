//! Bladed/AeroDyn full-field `.wnd` wind field: binary reader, grid and
//! velocity value types, and the bilinear velocity interpolator.
//!
//! The file is little-endian throughout. Velocities are stored quantized as
//! 16-bit integers scaled by the hub velocity and the per-component
//! turbulence intensity.

use std::fs;
use std::path::Path;

use log::info;
use ndarray::Array1;
use thiserror::Error;

use crate::geom::Vec3;
use crate::interpolate::{self, InterpError};

/// Offset of the first velocity sample in a `.wnd` file.
const BODY_OFFSET: usize = 104;
/// First two 16-bit words of a TurbSim full-field file.
const MAGIC: i16 = -99;
const FORMAT_ID: i16 = 4;

#[derive(Debug, Error)]
pub enum WindFieldError {
    #[error("cannot read wind field file: {0}")]
    Io(#[from] std::io::Error),
    #[error("file truncated: need {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("{0}")]
    BadFormat(String),
    #[error("wind field accessed before load")]
    NotLoaded,
    #[error("interpolation axis needs at least 2 points, got {0}")]
    AxisTooSmall(usize),
    #[error("iteration {iteration} is outside the usable range of {usable} iterations")]
    IterationOutOfRange { iteration: usize, usable: usize },
}

impl From<InterpError> for WindFieldError {
    fn from(value: InterpError) -> Self {
        match value {
            InterpError::AxisTooSmall(n) => WindFieldError::AxisTooSmall(n),
            InterpError::Domain(msg) => WindFieldError::BadFormat(msg),
        }
    }
}

/// The lateral/vertical sample raster of a wind field, centred laterally on
/// the rotor axis and vertically on the hub height.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    num_y: usize,
    num_z: usize,
    spacing_y: f64,
    spacing_z: f64,
    hub_height: f64,
}

impl Grid {
    pub fn new(
        num_y: usize,
        num_z: usize,
        spacing_y: f64,
        spacing_z: f64,
        hub_height: f64,
    ) -> Result<Self, WindFieldError> {
        if num_y < 2 || num_z < 2 {
            return Err(WindFieldError::BadFormat(format!(
                "grid needs at least 2 points per axis, got {num_y} x {num_z}"
            )));
        }
        if spacing_y <= 0.0 || spacing_z <= 0.0 {
            return Err(WindFieldError::BadFormat(format!(
                "grid spacings must be positive, got {spacing_y} and {spacing_z}"
            )));
        }
        Ok(Grid {
            num_y,
            num_z,
            spacing_y,
            spacing_z,
            hub_height,
        })
    }

    pub fn num_y(&self) -> usize {
        self.num_y
    }

    pub fn num_z(&self) -> usize {
        self.num_z
    }

    pub fn spacing_y(&self) -> f64 {
        self.spacing_y
    }

    pub fn spacing_z(&self) -> f64 {
        self.spacing_z
    }

    pub fn hub_height(&self) -> f64 {
        self.hub_height
    }

    pub fn points_per_timestep(&self) -> usize {
        self.num_y * self.num_z
    }

    /// lateral extent of the grid
    pub fn width_y(&self) -> f64 {
        (self.num_y - 1) as f64 * self.spacing_y
    }

    /// Lateral axis, centred on 0.
    pub fn axis_y(&self) -> Array1<f64> {
        let half = self.width_y() / 2.0;
        Array1::from_iter((0..self.num_y).map(|i| -half + i as f64 * self.spacing_y))
    }

    /// Vertical axis, centred on the hub height.
    pub fn axis_z(&self) -> Array1<f64> {
        let half = (self.num_z - 1) as f64 * self.spacing_z / 2.0;
        Array1::from_iter((0..self.num_z).map(|i| self.hub_height - half + i as f64 * self.spacing_z))
    }
}

/// Per-timestep velocity samples, row-major with z as the outer and y as
/// the inner index.
#[derive(Debug, Clone, Default)]
pub struct VelocityStore {
    points_per_timestep: usize,
    timesteps: Vec<Vec<Vec3>>,
}

impl VelocityStore {
    pub fn new(points_per_timestep: usize) -> Self {
        VelocityStore {
            points_per_timestep,
            timesteps: Vec::new(),
        }
    }

    pub fn push_timestep(&mut self, samples: Vec<Vec3>) -> Result<(), WindFieldError> {
        if samples.len() != self.points_per_timestep {
            return Err(WindFieldError::BadFormat(format!(
                "timestep has {} samples, grid needs {}",
                samples.len(),
                self.points_per_timestep
            )));
        }
        self.timesteps.push(samples);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.timesteps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timesteps.is_empty()
    }

    pub fn timestep(&self, index: usize) -> Option<&[Vec3]> {
        self.timesteps.get(index).map(Vec::as_slice)
    }
}

/// Timing derived from the longitudinal grid resolution: the turbine only
/// sees the middle of the record, padded on both ends by half the time the
/// grid needs to pass the rotor.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    delta_t: f64,
    padding: usize,
    total_timesteps: usize,
    v_hub: f64,
}

impl Timing {
    pub fn new(
        delta_x: f64,
        v_hub: f64,
        grid_width_y: f64,
        total_timesteps: usize,
    ) -> Result<Self, WindFieldError> {
        if v_hub <= 0.0 {
            return Err(WindFieldError::BadFormat(format!(
                "hub velocity must be positive, got {v_hub}"
            )));
        }
        let delta_t = delta_x / v_hub;
        let padding = ((grid_width_y / v_hub) / 2.0 / delta_t).ceil() as usize;
        Ok(Timing {
            delta_t,
            padding,
            total_timesteps,
            v_hub,
        })
    }

    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn total_timesteps(&self) -> usize {
        self.total_timesteps
    }

    pub fn v_hub(&self) -> f64 {
        self.v_hub
    }

    /// Timesteps available to the user once both pads are removed.
    pub fn usable_iterations(&self) -> usize {
        self.total_timesteps.saturating_sub(2 * self.padding)
    }

    /// Map a user iteration to the raw timestep index inside the padded
    /// record.
    pub fn raw_index(&self, user_iteration: usize) -> Result<usize, WindFieldError> {
        if user_iteration >= self.usable_iterations() {
            return Err(WindFieldError::IterationOutOfRange {
                iteration: user_iteration,
                usable: self.usable_iterations(),
            });
        }
        Ok(user_iteration + self.padding)
    }
}

/// A fully parsed wind field.
#[derive(Debug, Clone)]
pub struct WindField {
    pub grid: Grid,
    pub velocities: VelocityStore,
    pub timing: Timing,
}

/// Strategy for parsing a wind field file.
pub trait WindFieldReader {
    fn load(&self, path: &Path) -> Result<WindField, WindFieldError>;
}

/// Strategy for interpolating a velocity inside the grid.
pub trait VelocityInterpolator {
    /// Velocity at the query point (only y and z are used) for a raw
    /// timestep index.
    fn velocity_at(
        &self,
        point: Vec3,
        raw_timestep: usize,
        grid: &Grid,
        velocities: &VelocityStore,
    ) -> Result<Vec3, WindFieldError>;
}

fn read_bytes<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], WindFieldError> {
    buf.get(offset..offset + N)
        .ok_or(WindFieldError::Truncated {
            offset,
            needed: N,
            available: buf.len().saturating_sub(offset),
        })
        .map(|bytes| bytes.try_into().unwrap_or_else(|_| unreachable!()))
}

fn read_f32(buf: &[u8], offset: usize) -> Result<f64, WindFieldError> {
    Ok(f32::from_le_bytes(read_bytes(buf, offset)?) as f64)
}

fn read_i32(buf: &[u8], offset: usize) -> Result<i32, WindFieldError> {
    Ok(i32::from_le_bytes(read_bytes(buf, offset)?))
}

fn read_i16(buf: &[u8], offset: usize) -> Result<i16, WindFieldError> {
    Ok(i16::from_le_bytes(read_bytes(buf, offset)?))
}

/// Reader for the Bladed/AeroDyn full-field binary format produced by
/// TurbSim.
#[derive(Debug, Default)]
pub struct BladedWindReader;

impl BladedWindReader {
    pub fn new() -> Self {
        BladedWindReader
    }
}

impl WindFieldReader for BladedWindReader {
    fn load(&self, path: &Path) -> Result<WindField, WindFieldError> {
        let buf = fs::read(path)?;

        let magic = read_i16(&buf, 0)?;
        let format_id = read_i16(&buf, 2)?;
        if magic != MAGIC || format_id != FORMAT_ID {
            return Err(WindFieldError::BadFormat(format!(
                "not a TurbSim full-field file (magic {magic}, format {format_id})"
            )));
        }

        let hub_height = read_f32(&buf, 16)?;
        let ti_u = read_f32(&buf, 20)?;
        let ti_v = read_f32(&buf, 24)?;
        let ti_w = read_f32(&buf, 28)?;
        let spacing_z = read_f32(&buf, 32)?;
        let spacing_y = read_f32(&buf, 36)?;
        let delta_x = read_f32(&buf, 40)?;
        let raw_nt = read_i32(&buf, 44)?;
        let v_hub = read_f32(&buf, 48)?;
        let num_z = read_i32(&buf, 72)?;
        let num_y = read_i32(&buf, 76)?;

        if raw_nt <= 0 || num_z <= 0 || num_y <= 0 {
            return Err(WindFieldError::BadFormat(format!(
                "inconsistent grid dimensions: nt/2 = {raw_nt}, num_z = {num_z}, num_y = {num_y}"
            )));
        }
        let grid = Grid::new(num_y as usize, num_z as usize, spacing_y, spacing_z, hub_height)?;
        let total_timesteps = raw_nt as usize * 2;

        let needed = BODY_OFFSET + total_timesteps * grid.points_per_timestep() * 6;
        if buf.len() < needed {
            return Err(WindFieldError::Truncated {
                offset: BODY_OFFSET,
                needed: needed - BODY_OFFSET,
                available: buf.len().saturating_sub(BODY_OFFSET),
            });
        }

        // quantization: u carries the mean hub velocity, v and w are pure
        // fluctuations
        let scale_u = v_hub * (ti_u / 100.0) / 1000.0;
        let scale_v = v_hub * (ti_v / 100.0) / 1000.0;
        let scale_w = v_hub * (ti_w / 100.0) / 1000.0;

        let mut velocities = VelocityStore::new(grid.points_per_timestep());
        let mut offset = BODY_OFFSET;
        for _ in 0..total_timesteps {
            let mut samples = Vec::with_capacity(grid.points_per_timestep());
            for _ in 0..grid.points_per_timestep() {
                let raw_u = read_i16(&buf, offset)? as f64;
                let raw_v = read_i16(&buf, offset + 2)? as f64;
                let raw_w = read_i16(&buf, offset + 4)? as f64;
                offset += 6;
                samples.push(Vec3::new(
                    scale_u * raw_u + v_hub,
                    scale_v * raw_v,
                    scale_w * raw_w,
                ));
            }
            velocities.push_timestep(samples)?;
        }

        let timing = Timing::new(delta_x, v_hub, grid.width_y(), total_timesteps)?;
        info!(
            "loaded wind field {}: {} x {} grid, {} timesteps ({} usable), v_hub = {:.2} m/s",
            path.display(),
            grid.num_y(),
            grid.num_z(),
            total_timesteps,
            timing.usable_iterations(),
            v_hub
        );
        Ok(WindField {
            grid,
            velocities,
            timing,
        })
    }
}

fn lerp(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Bilinear interpolation over the bounding grid cell: two lerps along z
/// at the bracketing y columns, then one along y. Reads the four corners
/// straight from the flat timestep array instead of assembling a generic
/// n-point stencil, which keeps the per-query cost low on the hot path.
#[derive(Debug, Default)]
pub struct BilinearVelocityInterpolator;

impl BilinearVelocityInterpolator {
    pub fn new() -> Self {
        BilinearVelocityInterpolator
    }
}

impl VelocityInterpolator for BilinearVelocityInterpolator {
    fn velocity_at(
        &self,
        point: Vec3,
        raw_timestep: usize,
        grid: &Grid,
        velocities: &VelocityStore,
    ) -> Result<Vec3, WindFieldError> {
        let axis_y = grid.axis_y();
        let axis_z = grid.axis_z();
        let iy = interpolate::lower_index(axis_y.view(), point.y)?;
        let iz = interpolate::lower_index(axis_z.view(), point.z)?;

        let samples = velocities
            .timestep(raw_timestep)
            .ok_or(WindFieldError::IterationOutOfRange {
                iteration: raw_timestep,
                usable: velocities.len(),
            })?;

        let num_y = grid.num_y();
        let c00 = samples[iz * num_y + iy];
        let c10 = samples[(iz + 1) * num_y + iy];
        let c01 = samples[iz * num_y + iy + 1];
        let c11 = samples[(iz + 1) * num_y + iy + 1];

        let (y0, y1) = (axis_y[iy], axis_y[iy + 1]);
        let (z0, z1) = (axis_z[iz], axis_z[iz + 1]);

        let component = |a: f64, b: f64, c: f64, d: f64| {
            let left = lerp(point.z, z0, z1, a, b);
            let right = lerp(point.z, z0, z1, c, d);
            lerp(point.y, y0, y1, left, right)
        };
        Ok(Vec3::new(
            component(c00.x, c10.x, c01.x, c11.x),
            component(c00.y, c10.y, c01.y, c11.y),
            component(c00.z, c10.z, c01.z, c11.z),
        ))
    }
}

/// Orchestrates a reader and an interpolator over one owned wind field.
///
/// Every data-dependent accessor fails with [`WindFieldError::NotLoaded`]
/// before [`WindFieldManager::load`] has succeeded.
#[derive(Debug)]
pub struct WindFieldManager<'a> {
    reader: &'a dyn WindFieldReader,
    interpolator: &'a dyn VelocityInterpolator,
    field: Option<WindField>,
}

impl<'a> WindFieldManager<'a> {
    pub fn new(
        reader: &'a dyn WindFieldReader,
        interpolator: &'a dyn VelocityInterpolator,
    ) -> Self {
        WindFieldManager {
            reader,
            interpolator,
            field: None,
        }
    }

    pub fn load(&mut self, path: &Path) -> Result<(), WindFieldError> {
        self.field = Some(self.reader.load(path)?);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.field.is_some()
    }

    fn field(&self) -> Result<&WindField, WindFieldError> {
        self.field.as_ref().ok_or(WindFieldError::NotLoaded)
    }

    pub fn grid(&self) -> Result<&Grid, WindFieldError> {
        Ok(&self.field()?.grid)
    }

    pub fn timing(&self) -> Result<&Timing, WindFieldError> {
        Ok(&self.field()?.timing)
    }

    pub fn usable_iterations(&self) -> Result<usize, WindFieldError> {
        Ok(self.field()?.timing.usable_iterations())
    }

    /// Interpolated velocity at a point for a user iteration (pad-adjusted
    /// internally).
    pub fn velocity_at(&self, point: Vec3, user_iteration: usize) -> Result<Vec3, WindFieldError> {
        let field = self.field()?;
        let raw = field.timing.raw_index(user_iteration)?;
        self.interpolator
            .velocity_at(point, raw, &field.grid, &field.velocities)
    }
}

impl std::fmt::Debug for dyn WindFieldReader + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WindFieldReader")
    }
}

impl std::fmt::Debug for dyn VelocityInterpolator + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VelocityInterpolator")
    }
}
