use crate::plot::{FigureType, ImageType};
use mdsetup::workflows::solvate::{DEFAULT_LEAP_TEMPLATE, DEFAULT_TLEAP};

pub struct DefaultsConfig {
    pub temp1: f64,
    pub temp2: f64,
    pub force: f64,
    pub tleap: String,
    pub leap_template: String,
    pub dpi: f64,
    pub image_type: ImageType,
    pub figure_type: FigureType,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            temp1: 100.0,
            temp2: 300.0,
            force: 100.0,
            tleap: DEFAULT_TLEAP.to_string(),
            leap_template: DEFAULT_LEAP_TEMPLATE.to_string(),
            dpi: 600.0,
            image_type: ImageType::Png,
            figure_type: FigureType::Bar,
        }
    }
}
