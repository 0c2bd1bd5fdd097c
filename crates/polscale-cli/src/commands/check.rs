use crate::cli::CheckArgs;
use crate::config::builder::build_config;
use crate::error::Result;
use crate::summary::Summary;
use polscale::core::io::xml::XmlDocument;
use polscale::engine::error::EngineError;
use polscale::workflows;
use tracing::info;

/// Runs the scaling pass in memory only.
pub fn run(args: CheckArgs) -> Result<()> {
    let config = build_config(&args.inputs, None, None)?;

    info!("Loading force field from {:?}", &config.forcefield_path);
    let mut document = XmlDocument::load(&config.forcefield_path).map_err(EngineError::from)?;
    let report = workflows::scale::run(&mut document, &config.core_config)?;

    print!("{}", Summary(&report));
    if report.coverage.is_complete() {
        println!("✓ Every atom class is covered by a fragment.");
    }
    println!("No output written.");
    Ok(())
}
