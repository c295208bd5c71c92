//! Project orchestration: configuration, data-file dispatch, the airfoil
//! catalog and blade assembly.

use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::airfoil::{Airfoil, GeometryError};
use crate::blade::{self, BladeDefinition, BladeError, BladeSection};
use crate::config::{self, standard_schema, Config, ConfigError, RangeValue};
use crate::performance::{PerformanceError, PerformanceTable};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Performance(#[from] PerformanceError),
    #[error(transparent)]
    Blade(#[from] BladeError),
}

/// Project metadata from the configuration header keys.
#[derive(Debug, Clone, Default)]
pub struct ProjectInfo {
    pub name: Option<String>,
    pub id: Option<String>,
    pub revision: Option<String>,
    pub date: Option<String>,
    pub engineer: Option<String>,
}

/// Turbine description and operating envelope.
#[derive(Debug, Clone)]
pub struct TurbineDescription {
    pub is_horizontal: bool,
    pub number_of_blades: u32,
    /// hub radius [m]
    pub hub_radius: f64,
    /// rated rotor speed [rpm]
    pub rated_rotorspeed: f64,
    /// minimum rotor speed [rpm]
    pub min_rotorspeed: Option<f64>,
    /// rated electrical power [W]
    pub rated_electrical_power: f64,
    pub simulation_is_time_based: bool,
    pub wind_speed_range: Option<RangeValue>,
    pub tip_speed_ratio_range: Option<RangeValue>,
    pub pitch_angle_range: Option<RangeValue>,
}

/// Owns every airfoil geometry and performance table of a project, kept
/// sorted ascending by relative thickness for bracketing lookups.
#[derive(Debug, Clone, Default)]
pub struct AirfoilCatalog {
    geometries: Vec<Airfoil>,
    tables: Vec<PerformanceTable>,
}

impl AirfoilCatalog {
    pub fn new() -> Self {
        AirfoilCatalog::default()
    }

    pub fn add_geometry(&mut self, airfoil: Airfoil) {
        self.geometries.push(airfoil);
        self.geometries.sort_by(|a, b| {
            a.relative_thickness()
                .partial_cmp(&b.relative_thickness())
                .unwrap()
        });
    }

    pub fn add_table(&mut self, table: PerformanceTable) {
        self.tables.push(table);
    }

    pub fn geometries(&self) -> &[Airfoil] {
        &self.geometries
    }

    pub fn tables(&self) -> &[PerformanceTable] {
        &self.tables
    }

    pub fn geometry_by_name(&self, name: &str) -> Option<&Airfoil> {
        self.geometries
            .iter()
            .find(|g| g.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    pub fn table_for(&self, name: &str) -> Option<&PerformanceTable> {
        self.tables
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// The two catalog airfoils bracketing the target relative thickness
    /// (percent). A target exactly on a single stored thickness returns
    /// that airfoil twice.
    pub fn bracketing(&self, target_percent: f64) -> Result<(&Airfoil, &Airfoil), GeometryError> {
        let first = self
            .geometries
            .first()
            .ok_or_else(|| GeometryError::NotFound("the airfoil catalog is empty".into()))?;
        let last = self
            .geometries
            .last()
            .unwrap_or_else(|| unreachable!());
        let low = first.relative_thickness_percent();
        let high = last.relative_thickness_percent();
        if target_percent < low || target_percent > high {
            return Err(GeometryError::OutOfRange {
                target: target_percent,
                low,
                high,
            });
        }
        for pair in self.geometries.windows(2) {
            if target_percent <= pair[1].relative_thickness_percent() {
                return Ok((&pair[0], &pair[1]));
            }
        }
        Ok((first, last))
    }
}

/// A fully loaded project: validated configuration plus all referenced
/// data files.
#[derive(Debug, Clone)]
pub struct Project {
    pub info: ProjectInfo,
    pub turbine: TurbineDescription,
    pub catalog: AirfoilCatalog,
    pub blade: BladeDefinition,
}

impl Project {
    /// Parse the configuration file and bulk-load every referenced data
    /// file. Any parse error aborts the load; no partial project is
    /// returned.
    pub fn load(config_path: &Path) -> Result<Self, ProjectError> {
        let schema = standard_schema();
        let cfg = Config::from_file(config_path, &schema)?;

        let info = ProjectInfo {
            name: cfg.get_str("project_name").map(String::from),
            id: cfg.get_str("project_id").map(String::from),
            revision: cfg.get_str("project_revision").map(String::from),
            date: cfg.get_str("project_date").map(String::from),
            engineer: cfg.get_str("project_engineer").map(String::from),
        };
        let turbine = TurbineDescription {
            is_horizontal: cfg.get_bool("turbine_is_horizontal")?,
            number_of_blades: cfg.get_int("number_of_blades")? as u32,
            hub_radius: cfg.get_double("hub_radius")?,
            rated_rotorspeed: cfg.get_double("rated_rotorspeed")?,
            min_rotorspeed: cfg.get_double("min_rotorspeed").ok(),
            rated_electrical_power: cfg.get_double("rated_electrical_power")?,
            simulation_is_time_based: cfg.get_bool("simulation_is_time_based").unwrap_or(false),
            wind_speed_range: cfg.get_range("wind_speed_range").ok(),
            tip_speed_ratio_range: cfg.get_range("tip_speed_ratio_range").ok(),
            pitch_angle_range: cfg.get_range("pitch_angle_range").ok(),
        };

        let mut catalog = AirfoilCatalog::new();
        for path in config::read_file_list(cfg.get_path("airfoil_geometry_files_file")?)? {
            let airfoil = Airfoil::from_selig_file(&path)?;
            info!(
                "loaded airfoil {} (t = {:.1}%) from {}",
                airfoil.name().unwrap_or("?"),
                airfoil.relative_thickness_percent(),
                path.display()
            );
            catalog.add_geometry(airfoil);
        }
        for path in config::read_file_list(cfg.get_path("airfoil_performance_files_file")?)? {
            let table = PerformanceTable::from_file(&path)?;
            info!(
                "loaded performance table {} ({} points, Re = {:.0})",
                table.name(),
                table.points().len(),
                table.reynolds()
            );
            catalog.add_table(table);
        }
        for geometry in catalog.geometries() {
            let name = geometry.name().unwrap_or("?");
            if catalog.table_for(name).is_none() {
                warn!("airfoil {name} has no matching performance table");
            }
        }

        let blade = BladeDefinition::from_file(cfg.get_path("blade_geometry_file")?)?;
        info!(
            "project {:?}: {} airfoils, {} blade stations",
            info.name.as_deref().unwrap_or("unnamed"),
            catalog.geometries().len(),
            blade.n_stations()
        );
        Ok(Project {
            info,
            turbine,
            catalog,
            blade,
        })
    }

    /// Assemble one section per blade station.
    pub fn assemble_blade(&self) -> Result<Vec<BladeSection>, ProjectError> {
        let radii: Vec<f64> = self.blade.radius().iter().copied().collect();
        Ok(blade::assemble_sections(&self.blade, &self.catalog, &radii)?)
    }
}
