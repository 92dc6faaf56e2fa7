use crate::cli::SetupArgs;
use crate::error::Result;
use mdsetup::workflows::scaffold;
use tracing::info;

pub fn run(args: SetupArgs) -> Result<()> {
    info!("Creating simulation directories in {}", args.outdir.display());
    let tree = scaffold::create_directory_tree(&args.outdir)?;
    println!(
        "Simulation tree of {} directories ready in {}",
        tree.len(),
        args.outdir.display()
    );
    Ok(())
}
