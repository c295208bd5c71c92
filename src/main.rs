use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use log::info;

use bladeprep::export;
use bladeprep::project::Project;

fn main() -> ExitCode {
    env_logger::init();
    let Some(config) = env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: bladeprep <config-file>");
        return ExitCode::from(1);
    };
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

fn run(config: &Path) -> Result<(), Box<dyn Error>> {
    let project = Project::load(config)?;
    let sections = project.assemble_blade()?;

    let out_dir = config.parent().unwrap_or(Path::new("."));
    export::write_dxf(&out_dir.join("blade_sections.dxf"), &sections)?;
    export::write_tecplot(&out_dir.join("blade_sections.dat"), &sections)?;
    info!("exported {} blade sections to {}", sections.len(), out_dir.display());
    Ok(())
}
