use crate::batch::GenerationService;
use crate::config::AppConfig;

/// Shared per-worker state of the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub generator: GenerationService,
    /// Bill-to name used when a request leaves it blank.
    pub default_customer: String,
}

impl AppState {
    pub fn new(generator: GenerationService, default_customer: impl Into<String>) -> Self {
        Self {
            generator,
            default_customer: default_customer.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let generator = GenerationService::new(config.build_renderer(), config.output_dir.clone())
            .with_retain_artifacts(config.retain_artifacts)
            .with_default_seed(config.seed);
        Self::new(generator, config.customer_name.clone())
    }
}
