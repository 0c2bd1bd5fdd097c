use polscale::engine::config::ScalingConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub forcefield_path: PathBuf,
    pub output_path: PathBuf,
    pub pairs_csv: Option<PathBuf>,
    pub core_config: ScalingConfig,
}
