use crate::cli::SolvateArgs;
use crate::config::{self, FileConfig};
use crate::error::Result;
use mdsetup::workflows::solvate::{self, SolvateOutcome};
use tracing::info;

pub fn run(args: SolvateArgs, file_config: &FileConfig) -> Result<()> {
    let config = config::solvate_config(&args, file_config);
    let library = config::template_library(file_config);

    info!(
        "Solvating {} with the '{}' leap template",
        config.infile.display(),
        config.template
    );
    match solvate::run(&config, &library)? {
        SolvateOutcome::Completed { script, log } => {
            println!("tleap finished. Script: {}", script.display());
            println!("Output log: {}", log.display());
        }
        SolvateOutcome::TemplateNotFound(name) => {
            eprintln!("Leap template '{}' not found; nothing was run.", name);
        }
        SolvateOutcome::TleapFailed => {
            eprintln!(
                "tleap did not finish successfully; see {}.",
                config.log_path().display()
            );
        }
    }
    Ok(())
}
