//! Batch orchestrator - drives one generation run end to end.
//!
//! Supplier groups are visited in first-appearance order. Each group gets one
//! number slot and one set of ancillary attributes, then one record per kind
//! the mode asks for. Records are composed, rendered and written into the
//! run's workspace, which is bundled once every group is done.

pub mod service;
pub mod settings;
pub mod validation;

pub use service::{CatalogSource, GeneratedBundle, GenerationRequest, GenerationService};
pub use settings::BatchSettings;
pub use validation::Validator;

use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::assets::LogoLibrary;
use crate::catalog::{Catalog, InputError};
use crate::document::{DocumentBuilder, DocumentKind, DocumentRecord, OrderGroup, ProductLine, SupplierParty};
use crate::layout::{compose, ArtifactRenderer, RenderError};
use crate::numbering::{DocumentRandomizer, DocumentSequence};
use crate::workspace::{RunWorkspace, WorkspaceError};
use settings::MAX_LINES_PER_GROUP;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

impl BatchError {
    /// True when the caller supplied bad input rather than the run failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Input(_) | Self::Settings(_))
    }
}

/// What one artifact of a run contains.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub kind: DocumentKind,
    pub sequence: u32,
    pub supplier: String,
    pub number: String,
    pub counterpart_number: Option<String>,
    pub filename: String,
    pub line_count: usize,
    /// Codes of the sampled lines, in table order.
    pub product_codes: Vec<String>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Option<Decimal>,
    pub total: Decimal,
    pub logo_embedded: bool,
}

impl DocumentSummary {
    fn new(record: &DocumentRecord, filename: String, logo_embedded: bool) -> Self {
        let totals = record.totals();
        Self {
            kind: record.kind(),
            sequence: record.sequence(),
            supplier: record.supplier().name.clone(),
            number: record.number().to_string(),
            counterpart_number: record.counterpart_number().map(ToString::to_string),
            filename,
            line_count: record.lines().len(),
            product_codes: record.lines().iter().map(|line| line.code.clone()).collect(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total: totals.total,
            logo_embedded,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub run_date: NaiveDate,
    /// Distinct supplier groups that produced documents.
    pub groups: usize,
    pub documents: Vec<DocumentSummary>,
}

impl BatchReport {
    pub fn artifact_names(&self) -> Vec<&str> {
        self.documents.iter().map(|doc| doc.filename.as_str()).collect()
    }

    pub fn of_kind(&self, kind: DocumentKind) -> impl Iterator<Item = &DocumentSummary> {
        self.documents.iter().filter(move |doc| doc.kind == kind)
    }
}

/// Runs a batch against one renderer and one set of logo collections.
pub struct BatchOrchestrator<'a> {
    renderer: &'a dyn ArtifactRenderer,
    logos: &'a LogoLibrary,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(renderer: &'a dyn ArtifactRenderer, logos: &'a LogoLibrary) -> Self {
        Self { renderer, logos }
    }

    /// Generates every artifact of the run into `workspace`.
    ///
    /// Stops after `settings.document_count` supplier groups or when the
    /// catalog runs out of suppliers, whichever comes first.
    pub fn run(
        &self,
        catalog: &Catalog,
        settings: &BatchSettings,
        run_date: NaiveDate,
        workspace: &RunWorkspace,
    ) -> Result<BatchReport, BatchError> {
        settings.validate().map_err(BatchError::Settings)?;

        let groups = catalog.group_by_supplier();
        let builder = DocumentBuilder::new(run_date);
        let mut sequence = DocumentSequence::new(builder.year());
        let mut randomizer = DocumentRandomizer::new(settings.seed);
        let mut documents = Vec::new();

        info!(
            "Run {}: {} catalog rows, {} suppliers, mode {:?}, count {}",
            workspace.run_id(),
            catalog.len(),
            groups.len(),
            settings.mode,
            settings.document_count
        );

        for (supplier, rows) in groups.iter() {
            if sequence.peek() > settings.document_count {
                break;
            }

            let lines: Vec<ProductLine> = randomizer
                .sample(rows, MAX_LINES_PER_GROUP)
                .into_iter()
                .map(|row| {
                    ProductLine::new(
                        row.product_name.clone(),
                        row.product_code.clone(),
                        randomizer.quantity(),
                        row.unit_price,
                    )
                })
                .collect();
            let address = randomizer.street_address(supplier);
            let group = OrderGroup {
                supplier: SupplierParty::new(supplier, address),
                customer_name: settings.customer_name.clone(),
                lines,
                attributes: randomizer.ancillary(),
            };
            let slot = sequence.next_slot();

            for record in builder.build_for_mode(settings.mode, &group, &slot) {
                documents.push(self.emit(&record, workspace)?);
            }
            info!("Supplier {} done as group {}", supplier, slot.index);
        }

        let report = BatchReport {
            run_id: workspace.run_id(),
            run_date,
            groups: (sequence.peek() - 1) as usize,
            documents,
        };
        info!(
            "Run {} produced {} artifacts for {} suppliers",
            report.run_id,
            report.documents.len(),
            report.groups
        );
        Ok(report)
    }

    /// Runs the batch and packs the workspace into one archive.
    pub fn run_and_bundle(
        &self,
        catalog: &Catalog,
        settings: &BatchSettings,
        run_date: NaiveDate,
        workspace: &RunWorkspace,
    ) -> Result<(BatchReport, Vec<u8>), BatchError> {
        let report = self.run(catalog, settings, run_date, workspace)?;
        let bytes = workspace.bundle()?;
        Ok((report, bytes))
    }

    fn emit(&self, record: &DocumentRecord, workspace: &RunWorkspace) -> Result<DocumentSummary, BatchError> {
        let logo = self.logos.resolve(record.kind(), &record.supplier().name);
        let logo_embedded = logo.is_some();

        let layout = compose(record, logo);
        let bytes = self.renderer.render(&layout)?;
        let filename = self.renderer.artifact_filename(&layout);

        workspace
            .write_artifact(&filename, &bytes)
            .map_err(|source| RenderError::WriteArtifact {
                filename: filename.clone(),
                source,
            })?;
        debug!("Wrote {} ({} bytes)", filename, bytes.len());

        Ok(DocumentSummary::new(record, filename, logo_embedded))
    }
}
