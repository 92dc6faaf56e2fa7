use super::error::WorkflowError;
use super::templates::{TemplateGroup, TemplateLibrary};
use minijinja::context;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{error, info, instrument};

pub const DEFAULT_TLEAP: &str = "tleap";
pub const DEFAULT_LEAP_TEMPLATE: &str = "solvate";

#[derive(Debug, Clone)]
pub struct SolvateConfig {
    /// Structure loaded by the leap script.
    pub infile: PathBuf,
    /// Prefix of every file leap writes; the script and its log are `<prefix>.in`/`<prefix>.log`.
    pub prefix: PathBuf,
    pub template: String,
    pub tleap: PathBuf,
}

impl SolvateConfig {
    pub fn script_path(&self) -> PathBuf {
        self.prefix.with_extension("in")
    }

    pub fn log_path(&self) -> PathBuf {
        self.prefix.with_extension("log")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolvateOutcome {
    Completed { script: PathBuf, log: PathBuf },
    TemplateNotFound(String),
    TleapFailed,
}

/// Writes the leap script for `config.template` and runs `tleap -f <prefix>.in`.
///
/// An unknown template or a `tleap` that cannot be started or exits with a failure is logged;
/// the outcome says which. Only file-system failures while writing the script are errors.
#[instrument(skip_all, name = "solvate_workflow")]
pub fn run(
    config: &SolvateConfig,
    library: &TemplateLibrary,
) -> Result<SolvateOutcome, WorkflowError> {
    let script = config.script_path();
    let log = config.log_path();

    let rendered = library.render(
        TemplateGroup::Leap,
        &config.template,
        context! {
            input => config.infile.display().to_string(),
            prefix => config.prefix.display().to_string(),
        },
    )?;
    let Some(text) = rendered else {
        error!("Could not load {}.jinja2", config.template);
        return Ok(SolvateOutcome::TemplateNotFound(config.template.clone()));
    };
    info!("Writing tLeap input script to {}", script.display());
    fs::write(&script, text).map_err(WorkflowError::io(&script))?;

    info!("Generating AMBER topology and coordinate files.");
    if run_tleap(&config.tleap, &script, &log)? {
        Ok(SolvateOutcome::Completed { script, log })
    } else {
        Ok(SolvateOutcome::TleapFailed)
    }
}

/// Runs `tleap -f <script>` with stdout redirected into `log`. Returns whether it succeeded.
fn run_tleap(program: &Path, script: &Path, log: &Path) -> Result<bool, WorkflowError> {
    let log_file = File::create(log).map_err(WorkflowError::io(log))?;
    let status = Command::new(program)
        .arg("-f")
        .arg(script)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .status();
    match status {
        Ok(status) if status.success() => Ok(true),
        Ok(status) => {
            error!("Could not run tleap: {} exited with {}", program.display(), status);
            Ok(false)
        }
        Err(err) => {
            error!("Could not run tleap: {}: {}", program.display(), err);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(dir: &Path, template: &str, tleap: &str) -> SolvateConfig {
        SolvateConfig {
            infile: dir.join("input.pdb"),
            prefix: dir.join("solvated"),
            template: template.to_string(),
            tleap: PathBuf::from(tleap),
        }
    }

    #[test]
    fn script_and_log_paths_derive_from_prefix() {
        let config = config(Path::new("/work"), "solvate", "tleap");
        assert_eq!(config.script_path(), PathBuf::from("/work/solvated.in"));
        assert_eq!(config.log_path(), PathBuf::from("/work/solvated.log"));
    }

    #[test]
    fn unknown_template_writes_nothing() {
        let dir = tempdir().unwrap();
        let outcome = run(&config(dir.path(), "membrane", "tleap"), &TemplateLibrary::new()).unwrap();
        assert_eq!(outcome, SolvateOutcome::TemplateNotFound("membrane".into()));
        assert!(!dir.path().join("solvated.in").exists());
    }

    #[test]
    fn missing_binary_is_reported_not_raised() {
        let dir = tempdir().unwrap();
        let config = config(dir.path(), "solvate", "/nonexistent/bin/tleap");
        let outcome = run(&config, &TemplateLibrary::new()).unwrap();
        assert_eq!(outcome, SolvateOutcome::TleapFailed);

        let script = fs::read_to_string(dir.path().join("solvated.in")).unwrap();
        assert!(script.contains(&format!("loadpdb {}", dir.path().join("input.pdb").display())));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_decides_the_outcome() {
        let dir = tempdir().unwrap();
        let ok = run(&config(dir.path(), "fixed", "true"), &TemplateLibrary::new()).unwrap();
        assert!(matches!(ok, SolvateOutcome::Completed { .. }));
        assert!(dir.path().join("solvated.log").exists());

        let failed = run(&config(dir.path(), "fixed", "false"), &TemplateLibrary::new()).unwrap();
        assert_eq!(failed, SolvateOutcome::TleapFailed);
    }
}
