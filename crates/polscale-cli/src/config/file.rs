use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileInputsConfig {
    pub polarizability: Option<PathBuf>,
    pub monomers: Option<PathBuf>,
    pub fragments: Option<PathBuf>,
    pub structures_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSigmaConfig {
    pub factor: Option<f64>,
    /// Empty or absent: every eligible fragment.
    #[serde(default)]
    pub fragments: Vec<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileScalingConfig {
    pub use_reference: Option<bool>,
    pub polarizable: Option<Vec<String>>,
    pub pairs_csv: Option<PathBuf>,
    pub sigma: Option<FileSigmaConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub forcefield: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub inputs: Option<FileInputsConfig>,
    pub scaling: Option<FileScalingConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
