pub mod rms2d;
pub mod rmsf;
pub mod rmsf10;
pub mod setup;
pub mod simfiles;
pub mod solvate;

use crate::cli::TrajectoryArgs;
use mdsetup::core::models::table::Table;
use mdsetup::workflows::analyze::TrajectoryInput;
use std::path::PathBuf;

fn trajectory_input(args: &TrajectoryArgs) -> TrajectoryInput {
    TrajectoryInput {
        topology: args.top.clone(),
        trajectory: args.traj.clone(),
        slice: args.slice(),
    }
}

/// `(index label, last column)` pairs of a fluctuation table, ready to plot.
fn table_points(table: &Table) -> Vec<(f64, f64)> {
    let values = table.last_column().unwrap_or_default();
    table
        .index
        .iter()
        .zip(values)
        .map(|(&label, value)| (label as f64, value))
        .collect()
}

fn print_written(files: &[PathBuf]) {
    for file in files {
        println!("  {}", file.display());
    }
}
