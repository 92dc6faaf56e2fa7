use super::{print_written, table_points, trajectory_input};
use crate::cli::Rmsf10Args;
use crate::config::{self, FileConfig};
use crate::error::Result;
use crate::plot::{self, Series};
use crate::utils::progress::CliProgressHandler;
use mdsetup::workflows::analyze;

pub fn run(
    args: Rmsf10Args,
    file_config: &FileConfig,
    progress: &CliProgressHandler,
) -> Result<()> {
    let input = trajectory_input(&args.input);

    let reporter = progress.reporter();
    let report = analyze::mode_fluctuations(
        &input,
        args.nmodes,
        &args.datadir,
        &args.outfile,
        &reporter,
    )?;

    println!(
        "Fluctuations of the first {} modes over {} residues:",
        args.nmodes, report.n_residues
    );
    print_written(&report.files);
    println!("  {}", args.outfile.display());

    if args.image.image {
        let settings = config::plot_settings(&args.image, args.figure_type, file_config);
        let points = table_points(&report.result.calpha);
        let series = [Series {
            title: format!("RMSF{} of C-alpha", args.nmodes),
            points: &points,
        }];

        let path = settings.image_path(&args.outfile);
        plot::fluctuation_panels(
            &path,
            &format!("RMSF{}", args.nmodes),
            &format!("RMSF{} (Å)", args.nmodes),
            &series,
            args.width,
            &settings,
        )?;
        println!("Figure saved to {}", path.display());
    }
    Ok(())
}
