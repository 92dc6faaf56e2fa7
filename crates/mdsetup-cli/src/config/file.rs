use crate::error::{CliError, Result};
use crate::plot::{FigureType, ImageType};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileSimfilesConfig {
    pub temp1: Option<f64>,
    pub temp2: Option<f64>,
    pub force: Option<f64>,
    #[serde(rename = "amber-home")]
    pub amber_home: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileSolvateConfig {
    pub tleap: Option<PathBuf>,
    pub template: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FilePlotConfig {
    pub dpi: Option<f64>,
    #[serde(rename = "image-type")]
    pub image_type: Option<ImageType>,
    #[serde(rename = "figure-type")]
    pub figure_type: Option<FigureType>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(rename = "template-dir")]
    pub template_dir: Option<PathBuf>,
    #[serde(default)]
    pub simfiles: FileSimfilesConfig,
    #[serde(default)]
    pub solvate: FileSolvateConfig,
    #[serde(default)]
    pub plot: FilePlotConfig,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads `explicit` if given, else the per-user config file if there is one.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No configuration file found; using built-in defaults.");
                Ok(Self::default())
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mdsetup").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
