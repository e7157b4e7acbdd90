//! Server configuration loaded from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::batch::settings::DEFAULT_CUSTOMER_NAME;
use crate::layout::{ArtifactRenderer, PdfRenderer, TypstRenderEngine, TypstRenderer};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has invalid value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Which backend turns layouts into artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    Pdf,
    Typst,
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "typst" => Ok(Self::Typst),
            other => Err(format!("unknown renderer `{}` (expected pdf or typst)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub output_dir: PathBuf,
    pub renderer: RendererKind,
    pub typst_binary: String,
    pub seed: Option<u64>,
    pub retain_artifacts: bool,
    pub customer_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            output_dir: PathBuf::from("./output_docs"),
            renderer: RendererKind::Pdf,
            typst_binary: "typst".to_string(),
            seed: None,
            retain_artifacts: false,
            customer_name: DEFAULT_CUSTOMER_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `TRADEDOCS_*` variables after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("TRADEDOCS_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("TRADEDOCS_PORT") {
            config.port = parse("TRADEDOCS_PORT", port)?;
        }
        if let Some(dir) = lookup("TRADEDOCS_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(renderer) = lookup("TRADEDOCS_RENDERER") {
            config.renderer = parse("TRADEDOCS_RENDERER", renderer)?;
        }
        if let Some(binary) = lookup("TRADEDOCS_TYPST_BIN") {
            config.typst_binary = binary;
        }
        if let Some(seed) = lookup("TRADEDOCS_SEED") {
            config.seed = Some(parse("TRADEDOCS_SEED", seed)?);
        }
        if let Some(retain) = lookup("TRADEDOCS_RETAIN_ARTIFACTS") {
            config.retain_artifacts = parse("TRADEDOCS_RETAIN_ARTIFACTS", retain)?;
        }
        if let Some(name) = lookup("TRADEDOCS_CUSTOMER_NAME") {
            config.customer_name = name;
        }

        Ok(config)
    }

    pub fn build_renderer(&self) -> Arc<dyn ArtifactRenderer> {
        match self.renderer {
            RendererKind::Pdf => Arc::new(PdfRenderer::new()),
            RendererKind::Typst => Arc::new(TypstRenderer::new(TypstRenderEngine::new(
                self.typst_binary.clone(),
            ))),
        }
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
