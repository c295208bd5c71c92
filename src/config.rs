//! Line-oriented configuration parser with a schema-driven key store.
//!
//! A line is empty, a comment (leading `#` or `;`, an inline `#` truncates
//! the rest), or a key followed by whitespace-separated values. The schema
//! decides which keys exist, their kind and whether they are required.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown configuration key {0:?}")]
    UnknownKey(String),
    #[error("required configuration key {0:?} is missing")]
    MissingRequired(String),
    #[error("{0}")]
    TypeError(String),
    #[error("{0}")]
    BadFormat(String),
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ConfigError>,
    },
}

/// Scalar value types a parameter can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Str,
    Bool,
    Int,
    Double,
}

/// Kind of a schema entry. Replaces runtime type sniffing on the parameter
/// object with an explicit tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Scalar(TypeTag),
    /// `start end step` triple of doubles
    Range,
    /// a single path to a data file
    FilePath,
    /// a single path to a file listing further data files
    FileList,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub key: String,
    pub kind: ParameterKind,
    pub required: bool,
}

/// The set of recognized keys.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<Parameter>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    pub fn entry(mut self, key: &str, kind: ParameterKind, required: bool) -> Self {
        self.entries.push(Parameter {
            key: key.to_string(),
            kind,
            required,
        });
        self
    }

    pub fn lookup(&self, key: &str) -> Option<&Parameter> {
        self.entries.iter().find(|p| p.key == key)
    }

    pub fn entries(&self) -> &[Parameter] {
        &self.entries
    }
}

/// The full key set of a pre-processor project file.
pub fn standard_schema() -> Schema {
    use ParameterKind::*;
    use TypeTag::*;
    Schema::new()
        .entry("project_name", Scalar(Str), false)
        .entry("project_id", Scalar(Str), false)
        .entry("project_revision", Scalar(Str), false)
        .entry("project_date", Scalar(Str), false)
        .entry("project_engineer", Scalar(Str), false)
        .entry("airfoil_geometry_files_file", FileList, true)
        .entry("airfoil_performance_files_file", FileList, true)
        .entry("blade_geometry_file", FilePath, true)
        .entry("turbine_is_horizontal", Scalar(Bool), true)
        .entry("number_of_blades", Scalar(Int), true)
        .entry("hub_radius", Scalar(Double), true)
        .entry("rated_rotorspeed", Scalar(Double), true)
        .entry("min_rotorspeed", Scalar(Double), false)
        .entry("rated_electrical_power", Scalar(Double), true)
        .entry("simulation_is_time_based", Scalar(Bool), false)
        .entry("wind_speed_range", Range, false)
        .entry("tip_speed_ratio_range", Range, false)
        .entry("pitch_angle_range", Range, false)
}

/// A parsed `start end step` triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeValue {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    Range(RangeValue),
    Path(PathBuf),
}

/// Case-insensitive `true`/`false` plus `1`/`0`.
pub fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::TypeError(format!(
            "cannot parse {value:?} as a boolean"
        ))),
    }
}

pub fn parse_int(value: &str) -> Result<i64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::TypeError(format!("cannot parse {value:?} as an integer")))
}

pub fn parse_double(value: &str) -> Result<f64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::TypeError(format!("cannot parse {value:?} as a number")))
}

/// A range takes exactly three values: start, end, step.
pub fn parse_range(values: &[&str]) -> Result<RangeValue, ConfigError> {
    match values {
        [start, end, step] => Ok(RangeValue {
            start: parse_double(start)?,
            end: parse_double(end)?,
            step: parse_double(step)?,
        }),
        _ => Err(ConfigError::TypeError(format!(
            "a range takes 3 values (start, end, step), got {}",
            values.len()
        ))),
    }
}

/// Schema-validated key/value store of one configuration file.
#[derive(Debug, Clone)]
pub struct Config {
    values: HashMap<String, Value>,
    base_dir: PathBuf,
}

impl Config {
    /// Parse and validate a configuration file against a schema. Parse
    /// errors carry the 1-based line number; missing required keys are
    /// reported after the whole file has been read.
    pub fn from_file(path: &Path, schema: &Schema) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        let mut values = HashMap::new();
        for (number, raw) in text.lines().enumerate() {
            // an inline '#' truncates the line, so leading '#' comments
            // fall out as empty lines
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let key = tokens.next().unwrap_or_else(|| unreachable!());
            let tokens: Vec<&str> = tokens.collect();
            let value = parse_line(schema, key, &tokens, &base_dir).map_err(|e| {
                ConfigError::AtLine {
                    line: number + 1,
                    source: Box::new(e),
                }
            })?;
            values.insert(key.to_string(), value);
        }

        for parameter in schema.entries() {
            if parameter.required && !values.contains_key(&parameter.key) {
                return Err(ConfigError::MissingRequired(parameter.key.clone()));
            }
        }
        Ok(Config { values, base_dir })
    }

    /// Directory of the configuration file; relative data paths resolve
    /// against it.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        match self.require(key)? {
            Value::Bool(b) => Ok(*b),
            other => Err(type_mismatch(key, "a boolean", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i64, ConfigError> {
        match self.require(key)? {
            Value::Int(i) => Ok(*i),
            other => Err(type_mismatch(key, "an integer", other)),
        }
    }

    /// Doubles also resolve range sub-keys: `<range>_start`, `<range>_end`
    /// and `<range>_step` read the matching component of a range value.
    pub fn get_double(&self, key: &str) -> Result<f64, ConfigError> {
        if let Some(value) = self.values.get(key) {
            return match value {
                Value::Double(d) => Ok(*d),
                Value::Int(i) => Ok(*i as f64),
                other => Err(type_mismatch(key, "a number", other)),
            };
        }
        for (suffix, pick) in [
            ("_start", 0),
            ("_end", 1),
            ("_step", 2),
        ] {
            if let Some(base) = key.strip_suffix(suffix) {
                if let Some(Value::Range(range)) = self.values.get(base) {
                    return Ok([range.start, range.end, range.step][pick]);
                }
            }
        }
        Err(ConfigError::MissingRequired(key.to_string()))
    }

    pub fn get_range(&self, key: &str) -> Result<RangeValue, ConfigError> {
        match self.require(key)? {
            Value::Range(r) => Ok(*r),
            other => Err(type_mismatch(key, "a range", other)),
        }
    }

    pub fn get_path(&self, key: &str) -> Result<&Path, ConfigError> {
        match self.require(key)? {
            Value::Path(p) => Ok(p),
            other => Err(type_mismatch(key, "a path", other)),
        }
    }

    fn require(&self, key: &str) -> Result<&Value, ConfigError> {
        self.values
            .get(key)
            .ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
    }
}

fn type_mismatch(key: &str, expected: &str, got: &Value) -> ConfigError {
    ConfigError::TypeError(format!("key {key:?} does not hold {expected}: {got:?}"))
}

fn parse_line(
    schema: &Schema,
    key: &str,
    values: &[&str],
    base_dir: &Path,
) -> Result<Value, ConfigError> {
    let parameter = schema
        .lookup(key)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    if values.is_empty() {
        return Err(ConfigError::TypeError(format!(
            "key {key:?} has no value"
        )));
    }
    match parameter.kind {
        ParameterKind::Scalar(tag) => {
            let [value] = values else {
                return Err(ConfigError::TypeError(format!(
                    "key {key:?} takes a single value, got {}",
                    values.len()
                )));
            };
            Ok(match tag {
                TypeTag::Str => Value::Str((*value).to_string()),
                TypeTag::Bool => Value::Bool(parse_bool(value)?),
                TypeTag::Int => Value::Int(parse_int(value)?),
                TypeTag::Double => Value::Double(parse_double(value)?),
            })
        }
        ParameterKind::FilePath | ParameterKind::FileList => {
            let [value] = values else {
                return Err(ConfigError::TypeError(format!(
                    "key {key:?} takes a single path, got {} values",
                    values.len()
                )));
            };
            Ok(Value::Path(base_dir.join(value)))
        }
        ParameterKind::Range => Ok(Value::Range(parse_range(values)?)),
    }
}

/// Read a file-list file: one path per line, `#` comments and blank lines
/// skipped, relative paths resolved against the list file's directory.
pub fn read_file_list(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let text = fs::read_to_string(path)?;
    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok(text
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(|line| base.join(line))
        .collect())
}
