mod builder;
mod defaults;
mod file;

pub use builder::{plot_settings, simfiles_config, solvate_config, template_library};
pub use file::FileConfig;
