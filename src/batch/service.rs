use chrono::NaiveDate;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{BatchError, BatchOrchestrator, BatchReport, BatchSettings, Validator};
use crate::assets::{LogoLibrary, UploadedImage};
use crate::catalog::{Catalog, InputError};
use crate::layout::ArtifactRenderer;
use crate::workspace::{RunWorkspace, BUNDLE_FILENAME};

/// Where the product table of a run comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// The built-in example table.
    Example,
    Csv(Vec<u8>),
}

impl CatalogSource {
    pub fn load(&self) -> Result<Catalog, InputError> {
        match self {
            Self::Example => Ok(Catalog::example()),
            Self::Csv(bytes) => Catalog::from_csv_bytes(bytes),
        }
    }
}

/// Everything a caller submits for one run.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub catalog: Option<CatalogSource>,
    pub invoice_logos: Vec<UploadedImage>,
    pub purchase_order_logos: Vec<UploadedImage>,
    pub settings: BatchSettings,
}

#[derive(Debug, Clone)]
pub struct GeneratedBundle {
    pub filename: &'static str,
    pub bytes: Vec<u8>,
    pub report: BatchReport,
}

/// Long-lived entry point shared by every request.
#[derive(Clone)]
pub struct GenerationService {
    renderer: Arc<dyn ArtifactRenderer>,
    output_root: PathBuf,
    retain_artifacts: bool,
    default_seed: Option<u64>,
}

impl GenerationService {
    pub fn new(renderer: Arc<dyn ArtifactRenderer>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            output_root: output_root.into(),
            retain_artifacts: false,
            default_seed: None,
        }
    }

    /// Keep or delete the per-run directory once its bundle is built.
    pub fn with_retain_artifacts(mut self, retain: bool) -> Self {
        self.retain_artifacts = retain;
        self
    }

    /// Seed used when a request does not carry one.
    pub fn with_default_seed(mut self, seed: Option<u64>) -> Self {
        self.default_seed = seed;
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Validates the request, runs the batch and returns the bundle.
    ///
    /// Input problems surface before the run directory is created.
    pub fn generate(
        &self,
        request: GenerationRequest,
        run_date: NaiveDate,
    ) -> Result<GeneratedBundle, BatchError> {
        let mut settings = request.settings;
        if settings.seed.is_none() {
            settings.seed = self.default_seed;
        }
        settings.validate().map_err(BatchError::Settings)?;

        let catalog = request
            .catalog
            .ok_or(InputError::MissingCatalog)?
            .load()?;
        let logos = LogoLibrary::from_uploads(request.invoice_logos, request.purchase_order_logos);

        let workspace = RunWorkspace::create(&self.output_root)?;
        let orchestrator = BatchOrchestrator::new(self.renderer.as_ref(), &logos);
        let outcome = orchestrator.run_and_bundle(&catalog, &settings, run_date, &workspace);

        if !self.retain_artifacts {
            let run_id = workspace.run_id();
            if let Err(e) = workspace.remove() {
                warn!("Failed to clean up run {}: {}", run_id, e);
            }
        }

        let (report, bytes) = outcome?;
        info!("Bundle for run {} is {} bytes", report.run_id, bytes.len());
        Ok(GeneratedBundle {
            filename: BUNDLE_FILENAME,
            bytes,
            report,
        })
    }
}
