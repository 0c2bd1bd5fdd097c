use polscale::engine::config::DEFAULT_SIGMA_FACTOR;

pub struct DefaultsConfig {
    pub polarizability: String,
    pub monomers: String,
    pub fragments: String,
    pub structures_dir: String,
    pub sigma_factor: f64,
    pub output_suffix: String,
    pub use_reference: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            polarizability: "alpha.ff".to_string(),
            monomers: "fragment.inp".to_string(),
            fragments: "fragment.ff".to_string(),
            structures_dir: ".".to_string(),
            sigma_factor: DEFAULT_SIGMA_FACTOR,
            output_suffix: "-sc".to_string(),
            use_reference: false,
        }
    }
}
