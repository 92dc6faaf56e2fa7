use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use crate::cli::{ImageArgs, SimfilesArgs, SolvateArgs};
use crate::error::{CliError, Result};
use crate::plot::{FigureType, PlotSettings};
use crate::utils::parser::MIN_DPI;
use mdsetup::workflows::simfiles::SimfilesConfig;
use mdsetup::workflows::solvate::SolvateConfig;
use mdsetup::workflows::templates::TemplateLibrary;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn simfiles_config(args: &SimfilesArgs, file_config: &FileConfig) -> Result<SimfilesConfig> {
    let defaults = DefaultsConfig::default();
    let file = &file_config.simfiles;

    let prefix = match &args.prefix {
        Some(prefix) => prefix.clone(),
        None => default_prefix(&std::env::current_dir()?)?,
    };

    let config = SimfilesConfig {
        topology: args.topology.clone(),
        outdir: args.outdir.clone(),
        prefix,
        temp1: args.temp1.or(file.temp1).unwrap_or(defaults.temp1).max(1.0),
        temp2: args.temp2.or(file.temp2).unwrap_or(defaults.temp2).max(1.0),
        force: args.force.or(file.force).unwrap_or(defaults.force).max(1.0),
        amber_home: args.home.clone(),
        configured_amber_home: file.amber_home.clone(),
        kind: args.kind.into(),
    };
    debug!(?config, "Resolved simfiles configuration");
    Ok(config)
}

/// The name of `dir`, used as the file prefix when `--prefix` is not given.
fn default_prefix(dir: &Path) -> Result<String> {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CliError::Argument(format!(
                "Cannot derive a prefix from '{}'; pass --prefix.",
                dir.display()
            ))
        })
}

pub fn solvate_config(args: &SolvateArgs, file_config: &FileConfig) -> SolvateConfig {
    let defaults = DefaultsConfig::default();
    let file = &file_config.solvate;

    let template = args
        .template
        .map(|choice| choice.name().to_string())
        .or_else(|| file.template.clone())
        .unwrap_or(defaults.leap_template);
    let tleap = file
        .tleap
        .clone()
        .unwrap_or_else(|| PathBuf::from(defaults.tleap));

    SolvateConfig {
        infile: args.infile.clone(),
        prefix: args.prefix.clone(),
        template,
        tleap,
    }
}

pub fn plot_settings(
    image: &ImageArgs,
    figure_type: Option<FigureType>,
    file_config: &FileConfig,
) -> PlotSettings {
    let defaults = DefaultsConfig::default();
    let file = &file_config.plot;

    PlotSettings {
        image_type: image
            .image_type
            .or(file.image_type)
            .unwrap_or(defaults.image_type),
        figure_type: figure_type
            .or(file.figure_type)
            .unwrap_or(defaults.figure_type),
        dpi: image.dpi.or(file.dpi).unwrap_or(defaults.dpi).max(MIN_DPI),
    }
}

pub fn template_library(file_config: &FileConfig) -> TemplateLibrary {
    match &file_config.template_dir {
        Some(dir) => {
            debug!("Using template overrides from {}", dir.display());
            TemplateLibrary::with_overrides(dir)
        }
        None => TemplateLibrary::new(),
    }
}
