use super::trajectory_input;
use crate::cli::Rms2dArgs;
use crate::config::{self, FileConfig};
use crate::error::Result;
use crate::plot;
use crate::utils::progress::CliProgressHandler;
use mdsetup::core::selection::AtomMask;
use mdsetup::workflows::analyze;

pub fn run(args: Rms2dArgs, file_config: &FileConfig, progress: &CliProgressHandler) -> Result<()> {
    let input = trajectory_input(&args.input);
    let mask = AtomMask::from(args.selection);

    let reporter = progress.reporter();
    let report = analyze::pairwise_rmsd_matrix(&input, mask, &args.outfile, &reporter)?;
    println!(
        "Saved {0} x {0} r.m.s.d. matrix ({1}) to {2}",
        report.matrix.nrows(),
        mask,
        report.file.display()
    );

    if args.image.image {
        let settings = config::plot_settings(&args.image, None, file_config);
        let path = settings.image_path(&args.outfile);
        plot::heatmap(
            &path,
            &format!("2-D r.m.s.d. ({})", mask),
            &report.matrix,
            args.width,
            &settings,
        )?;
        println!("Figure saved to {}", path.display());
    }
    Ok(())
}
