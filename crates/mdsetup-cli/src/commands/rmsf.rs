use super::{print_written, table_points, trajectory_input};
use crate::cli::RmsfArgs;
use crate::config::{self, FileConfig};
use crate::error::Result;
use crate::plot::{self, Series};
use crate::utils::progress::CliProgressHandler;
use mdsetup::core::selection::AtomMask;
use mdsetup::workflows::analyze;
use tracing::info;

pub fn run(args: RmsfArgs, file_config: &FileConfig, progress: &CliProgressHandler) -> Result<()> {
    let input = trajectory_input(&args.input);
    let masks: Vec<AtomMask> = args.types.iter().copied().map(AtomMask::from).collect();

    let reporter = progress.reporter();
    let report = analyze::residue_fluctuations(&input, &masks, &args.datadir, &reporter)?;

    println!("Saved r.m.s.f. for {} selection(s):", report.fluctuations.len());
    print_written(&report.files);

    if args.image.image {
        let settings = config::plot_settings(&args.image, args.figure_type, file_config);
        let points: Vec<(AtomMask, Vec<(f64, f64)>)> = report
            .fluctuations
            .iter()
            .map(|(mask, table)| (mask, table_points(table)))
            .collect();
        let series: Vec<Series<'_>> = points
            .iter()
            .map(|(mask, points)| Series {
                title: mask.key().to_string(),
                points,
            })
            .collect();

        let path = settings.image_path(&args.outfile);
        info!("Plotting {} panel(s)", series.len());
        plot::fluctuation_panels(&path, "RMSF", "RMSF (Å)", &series, args.label, &settings)?;
        println!("Figure saved to {}", path.display());
    }
    Ok(())
}
