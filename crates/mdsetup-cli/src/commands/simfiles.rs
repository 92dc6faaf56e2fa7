use super::print_written;
use crate::cli::SimfilesArgs;
use crate::config::{self, FileConfig};
use crate::error::Result;
use mdsetup::workflows::simfiles::{self, AMBERHOME_VAR, SimfilesOutcome};
use tracing::{info, warn};

pub fn run(args: SimfilesArgs, file_config: &FileConfig) -> Result<()> {
    let config = config::simfiles_config(&args, file_config)?;
    let library = config::template_library(file_config);

    info!(
        "Preparing {} files for '{}' in {}",
        config.kind,
        config.prefix,
        config.outdir.display()
    );
    match simfiles::run(&config, &library)? {
        SimfilesOutcome::Written(files) => {
            println!("Wrote {} simulation files:", files.len());
            print_written(&files);
        }
        SimfilesOutcome::MissingAmberHome => {
            warn!("No simulation files were written.");
            eprintln!(
                "No AMBER installation found. Set {}, pass --home or set simfiles.amber-home in the configuration.",
                AMBERHOME_VAR
            );
        }
    }
    Ok(())
}
