use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileSigmaConfig};
use super::models::AppConfig;
use crate::cli::InputArgs;
use crate::error::{CliError, Result};
use polscale::core::models::monomer::normalize_name;
use polscale::engine::config::{
    FactorSource, ScalingConfigBuilder, SigmaScaling, SigmaTargets,
};
use std::path::{Path, PathBuf};

/// Merges command-line arguments, the optional TOML file and built-in defaults, in that
/// order of precedence.
pub fn build_config(
    args: &InputArgs,
    output: Option<&Path>,
    pairs_csv: Option<&Path>,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let mut file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let inputs_file = file_config.inputs.take().unwrap_or_default();
    let scaling_file = file_config.scaling.take().unwrap_or_default();

    let forcefield_path = args
        .forcefield
        .clone()
        .or(file_config.forcefield)
        .ok_or_else(|| {
            CliError::Config(
                "A force field is required either in the config file or via --forcefield."
                    .to_string(),
            )
        })?;
    let output_path = output
        .map(Path::to_path_buf)
        .or(file_config.output)
        .unwrap_or_else(|| default_output_path(&forcefield_path, &defaults.output_suffix));
    let pairs_csv = pairs_csv.map(Path::to_path_buf).or(scaling_file.pairs_csv);

    let resolve = |cli: &Option<PathBuf>, file: Option<PathBuf>, default: &str| {
        cli.clone().or(file).unwrap_or_else(|| PathBuf::from(default))
    };

    let use_reference = args.reference
        || scaling_file
            .use_reference
            .unwrap_or(defaults.use_reference);
    let factor_source = if use_reference {
        FactorSource::Reference
    } else {
        FactorSource::Predicted
    };

    let polarizable = if args.polarizable.is_empty() {
        scaling_file.polarizable.unwrap_or_default()
    } else {
        args.polarizable.clone()
    };

    let sigma = merge_sigma(args.scale_sigma.as_deref(), scaling_file.sigma, &defaults)?;

    let core_config = ScalingConfigBuilder::new()
        .polarizability_path(resolve(
            &args.polarizability,
            inputs_file.polarizability,
            &defaults.polarizability,
        ))
        .monomers_path(resolve(
            &args.monomers,
            inputs_file.monomers,
            &defaults.monomers,
        ))
        .fragments_path(resolve(
            &args.fragments,
            inputs_file.fragments,
            &defaults.fragments,
        ))
        .structures_dir(resolve(
            &args.structures_dir,
            inputs_file.structures_dir,
            &defaults.structures_dir,
        ))
        .factor_source(factor_source)
        .sigma_scaling(sigma)
        .polarizable(polarizable)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        forcefield_path,
        output_path,
        pairs_csv,
        core_config,
    })
}

fn merge_sigma(
    cli_tokens: Option<&[String]>,
    file_val: Option<FileSigmaConfig>,
    defaults: &DefaultsConfig,
) -> Result<Option<SigmaScaling>> {
    if let Some(tokens) = cli_tokens {
        return SigmaScaling::from_tokens(tokens)
            .map(Some)
            .map_err(|e| CliError::Config(e.to_string()));
    }
    let Some(file_val) = file_val else {
        return Ok(None);
    };

    let factor = file_val.factor.unwrap_or(defaults.sigma_factor);
    if !factor.is_finite() || factor <= 0.0 {
        return Err(CliError::Config(format!(
            "`scaling.sigma.factor` must be a positive number, found {}",
            factor
        )));
    }
    let targets = if file_val.fragments.is_empty() {
        SigmaTargets::AllEligible
    } else {
        SigmaTargets::Named(
            file_val
                .fragments
                .iter()
                .map(|name| normalize_name(name))
                .collect(),
        )
    };
    Ok(Some(SigmaScaling { factor, targets }))
}

/// `field.xml` becomes `field-sc.xml` in the same directory.
fn default_output_path(forcefield: &Path, suffix: &str) -> PathBuf {
    let stem = forcefield
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match forcefield.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    forcefield.with_file_name(name)
}
