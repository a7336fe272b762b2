// Configuration module entry point
// Loads and validates engine configuration

mod types;

// Re-export public types
pub use types::{Config, ListingConfig, LoggingConfig, MediaConfig, ServeConfig};

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; every key has a default and can also be set via
    /// `FILESERV`-prefixed environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("FILESERV").separator("__"))
            .set_default("serve.file_chunking_threshold_size", 262_144)?
            .set_default("serve.file_chunking_chunk_size", 65_536)?
            .set_default("serve.range_coalescing_threshold", 0)?
            .set_default("listing.render_vanity_footer", false)?
            .set_default("logging.access_log", true)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate option values that serde cannot reject on its own
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.serve.file_chunking_chunk_size == 0 {
            return Err(config::ConfigError::Message(
                "serve.file_chunking_chunk_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
