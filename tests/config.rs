use std::error::Error;
use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use tempfile::tempdir;

use bladeprep::config::{
    parse_bool, parse_range, read_file_list, standard_schema, Config, ConfigError, ParameterKind,
    RangeValue, Schema, TypeTag,
};

fn test_schema() -> Schema {
    use ParameterKind::*;
    use TypeTag::*;
    Schema::new()
        .entry("name", Scalar(Str), false)
        .entry("enabled", Scalar(Bool), false)
        .entry("count", Scalar(Int), false)
        .entry("radius", Scalar(Double), false)
        .entry("speed_range", Range, false)
        .entry("data_file", FilePath, false)
}

fn write_config(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("run.cfg");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_bool_literals() {
    assert!(parse_bool("True").unwrap());
    assert!(parse_bool("TRUE").unwrap());
    assert!(parse_bool("1").unwrap());
    assert!(!parse_bool("False").unwrap());
    assert!(!parse_bool("0").unwrap());
    assert!(matches!(parse_bool("yes"), Err(ConfigError::TypeError(_))));
}

#[test]
fn test_range_takes_exactly_three_values() {
    let range = parse_range(&["3.0", "25.0", "0.5"]).unwrap();
    assert_eq!(
        range,
        RangeValue {
            start: 3.0,
            end: 25.0,
            step: 0.5
        }
    );
    assert!(matches!(
        parse_range(&["3.0", "25.0"]),
        Err(ConfigError::TypeError(_))
    ));
    assert!(matches!(
        parse_range(&["1", "2", "3", "4"]),
        Err(ConfigError::TypeError(_))
    ));
}

#[test]
fn test_parse_typed_values() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = write_config(
        dir.path(),
        "name rotor_a\n\
         enabled True\n\
         count 3\n\
         radius 63.5\n\
         speed_range 3.0 25.0 0.5\n\
         data_file blade.dat\n",
    );
    let config = Config::from_file(&path, &test_schema())?;
    assert_eq!(config.get_str("name"), Some("rotor_a"));
    assert!(config.get_bool("enabled")?);
    assert_eq!(config.get_int("count")?, 3);
    assert_abs_diff_eq!(config.get_double("radius")?, 63.5);
    let range = config.get_range("speed_range")?;
    assert_abs_diff_eq!(range.start, 3.0);
    assert_abs_diff_eq!(range.step, 0.5);
    assert_eq!(config.get_path("data_file")?, dir.path().join("blade.dat"));
    assert_eq!(config.base_dir(), dir.path());
    Ok(())
}

#[test]
fn test_range_sub_keys() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = write_config(dir.path(), "speed_range 3.0 25.0 0.5\n");
    let config = Config::from_file(&path, &test_schema())?;
    assert_abs_diff_eq!(config.get_double("speed_range_start")?, 3.0);
    assert_abs_diff_eq!(config.get_double("speed_range_end")?, 25.0);
    assert_abs_diff_eq!(config.get_double("speed_range_step")?, 0.5);
    assert!(matches!(
        config.get_double("speed_range_middle"),
        Err(ConfigError::MissingRequired(_))
    ));
    Ok(())
}

#[test]
fn test_comments_and_blank_lines() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = write_config(
        dir.path(),
        "# full-line comment\n\
         ; alternative comment style\n\
         \n\
         count 7 # inline comment\n",
    );
    let config = Config::from_file(&path, &test_schema())?;
    assert_eq!(config.get_int("count")?, 7);
    Ok(())
}

#[test]
fn test_unknown_key_carries_line_number() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = write_config(dir.path(), "name rotor_a\nbogus 1\n");
    let err = Config::from_file(&path, &test_schema()).unwrap_err();
    match err {
        ConfigError::AtLine { line, source } => {
            assert_eq!(line, 2);
            assert!(matches!(*source, ConfigError::UnknownKey(_)));
        }
        other => panic!("expected AtLine, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_bad_value_carries_line_number() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = write_config(dir.path(), "count twelve\n");
    let err = Config::from_file(&path, &test_schema()).unwrap_err();
    match err {
        ConfigError::AtLine { line, source } => {
            assert_eq!(line, 1);
            assert!(matches!(*source, ConfigError::TypeError(_)));
        }
        other => panic!("expected AtLine, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_single_valued_keys_reject_extra_tokens() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = write_config(dir.path(), "count 1 2\n");
    let err = Config::from_file(&path, &test_schema()).unwrap_err();
    assert!(matches!(err, ConfigError::AtLine { .. }));
    Ok(())
}

#[test]
fn test_standard_schema_requires_core_keys() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = write_config(dir.path(), "project_name demo\n");
    let err = Config::from_file(&path, &standard_schema()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingRequired(_)));
    Ok(())
}

#[test]
fn test_standard_schema_full_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = write_config(
        dir.path(),
        "project_name demo\n\
         airfoil_geometry_files_file geometries.lst\n\
         airfoil_performance_files_file polars.lst\n\
         blade_geometry_file blade.dat\n\
         turbine_is_horizontal True\n\
         number_of_blades 3\n\
         hub_radius 1.5\n\
         rated_rotorspeed 12.1\n\
         rated_electrical_power 5000.0\n\
         wind_speed_range 3.0 25.0 1.0\n",
    );
    let config = Config::from_file(&path, &standard_schema())?;
    assert!(config.get_bool("turbine_is_horizontal")?);
    assert_eq!(config.get_int("number_of_blades")?, 3);
    assert_eq!(
        config.get_path("blade_geometry_file")?,
        dir.path().join("blade.dat")
    );
    assert_abs_diff_eq!(config.get_double("wind_speed_range_end")?, 25.0);
    Ok(())
}

#[test]
fn test_read_file_list_resolves_relative_paths() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let list = dir.path().join("geometries.lst");
    fs::write(&list, "# airfoil contours\nnaca0018.dat\nsub/naca0024.dat\n\n")?;
    let paths = read_file_list(&list)?;
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0], dir.path().join("naca0018.dat"));
    assert_eq!(paths[1], dir.path().join("sub/naca0024.dat"));
    Ok(())
}
