use crate::core::models::monomer::normalize_name;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_SIGMA_FACTOR: f64 = 0.985;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid sigma scaling factor '{0}': must be a positive number")]
    InvalidSigmaFactor(String),
}

/// Which scaling factor is applied to epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FactorSource {
    /// `k_pred` from the empirical formula.
    #[default]
    Predicted,
    /// `k_sapt` supplied in the dimer table.
    Reference,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SigmaTargets {
    /// Every fragment that is not already polarizable.
    AllEligible,
    /// Only the named fragments.
    Named(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SigmaScaling {
    pub factor: f64,
    pub targets: SigmaTargets,
}

impl Default for SigmaScaling {
    fn default() -> Self {
        Self {
            factor: DEFAULT_SIGMA_FACTOR,
            targets: SigmaTargets::AllEligible,
        }
    }
}

impl SigmaScaling {
    /// Interprets a sigma-scaling directive: an optional leading factor followed by
    /// optional fragment names.
    ///
    /// ```
    /// use polscale::engine::config::{SigmaScaling, SigmaTargets};
    ///
    /// let s = SigmaScaling::from_tokens(&["0.98", "C2C1im+"]).unwrap();
    /// assert_eq!(s.factor, 0.98);
    /// assert_eq!(s.targets, SigmaTargets::Named(vec!["c2c1im".to_string()]));
    /// ```
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ConfigError> {
        let mut scaling = Self::default();
        let mut names = tokens.iter().map(|t| t.as_ref()).peekable();

        if let Some(first) = names.peek() {
            if let Ok(factor) = first.parse::<f64>() {
                if !factor.is_finite() || factor <= 0.0 {
                    return Err(ConfigError::InvalidSigmaFactor(first.to_string()));
                }
                scaling.factor = factor;
                names.next();
            }
        }

        let names: Vec<String> = names.map(normalize_name).collect();
        if !names.is_empty() {
            scaling.targets = SigmaTargets::Named(names);
        }
        Ok(scaling)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputPaths {
    pub polarizability: PathBuf,
    pub monomers: PathBuf,
    pub fragments: PathBuf,
    pub structures_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalingConfig {
    pub inputs: InputPaths,
    pub factor_source: FactorSource,
    pub sigma: Option<SigmaScaling>,
    pub polarizable: Vec<String>, // Monomers whose polarization is already modelled
}

#[derive(Default)]
pub struct ScalingConfigBuilder {
    polarizability_path: Option<PathBuf>,
    monomers_path: Option<PathBuf>,
    fragments_path: Option<PathBuf>,
    structures_dir: Option<PathBuf>,
    factor_source: Option<FactorSource>,
    sigma: Option<SigmaScaling>,
    polarizable: Vec<String>,
}

impl ScalingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polarizability_path(mut self, path: PathBuf) -> Self {
        self.polarizability_path = Some(path);
        self
    }
    pub fn monomers_path(mut self, path: PathBuf) -> Self {
        self.monomers_path = Some(path);
        self
    }
    pub fn fragments_path(mut self, path: PathBuf) -> Self {
        self.fragments_path = Some(path);
        self
    }
    pub fn structures_dir(mut self, path: PathBuf) -> Self {
        self.structures_dir = Some(path);
        self
    }
    pub fn factor_source(mut self, source: FactorSource) -> Self {
        self.factor_source = Some(source);
        self
    }
    pub fn sigma_scaling(mut self, sigma: Option<SigmaScaling>) -> Self {
        self.sigma = sigma;
        self
    }
    pub fn polarizable(mut self, names: Vec<String>) -> Self {
        self.polarizable = names;
        self
    }

    pub fn build(self) -> Result<ScalingConfig, ConfigError> {
        let inputs = InputPaths {
            polarizability: self
                .polarizability_path
                .ok_or(ConfigError::MissingParameter("polarizability_path"))?,
            monomers: self
                .monomers_path
                .ok_or(ConfigError::MissingParameter("monomers_path"))?,
            fragments: self
                .fragments_path
                .ok_or(ConfigError::MissingParameter("fragments_path"))?,
            structures_dir: self
                .structures_dir
                .ok_or(ConfigError::MissingParameter("structures_dir"))?,
        };
        Ok(ScalingConfig {
            inputs,
            factor_source: self.factor_source.unwrap_or_default(),
            sigma: self.sigma,
            polarizable: self.polarizable,
        })
    }
}
