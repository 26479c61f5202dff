//! Extractor contract (§6.1)
//!
//! The real SQL extraction against the source HR schema is an external
//! collaborator (§1) and is not implemented here — only the shape of the
//! data it must deliver. [`JsonFileExtractor`] and [`StaticExtractor`]
//! exist so the rest of the crate is runnable and testable end to end.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::InputShapeError;
use super::model::{ConceptoRow, Legajo, ObraSocial, OtraActividad};

/// The four tables the extractor must deliver, keyed by `nro_legaj`.
/// Missing tables are modelled as empty (§6.1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorOutput {
    pub legajos: Vec<Legajo>,
    pub conceptos: Vec<ConceptoRow>,
    pub otra_actividad: Vec<OtraActividad>,
    pub obra_social: Vec<ObraSocial>,
}

/// Parameters an extractor is invoked with (§6.1): `(year, month,
/// optional_legajo_filter)`.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionParams {
    pub year: i32,
    pub month: u32,
    pub legajo_filter: Option<i64>,
}

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, params: ExtractionParams) -> Result<ExtractorOutput, InputShapeError>;
}

/// Extractor backed by a single pre-shaped JSON snapshot on disk, used by
/// the demo binary and by integration tests.
pub struct JsonFileExtractor {
    path: std::path::PathBuf,
}

impl JsonFileExtractor {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Extractor for JsonFileExtractor {
    async fn extract(&self, _params: ExtractionParams) -> Result<ExtractorOutput, InputShapeError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|_| InputShapeError::MissingColumn("file", "extractor_snapshot"))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| InputShapeError::MissingColumn("json", "extractor_snapshot"))
    }
}

/// In-memory extractor for unit and property tests.
#[derive(Default)]
pub struct StaticExtractor {
    pub output: ExtractorOutput,
}

#[async_trait]
impl Extractor for StaticExtractor {
    async fn extract(&self, params: ExtractionParams) -> Result<ExtractorOutput, InputShapeError> {
        let mut output = self.output.clone();
        if let Some(nro_legaj) = params.legajo_filter {
            output.legajos.retain(|l| l.nro_legaj == nro_legaj);
            output.conceptos.retain(|c| c.nro_legaj == nro_legaj);
            output.otra_actividad.retain(|o| o.nro_legaj == nro_legaj);
            output.obra_social.retain(|o| o.nro_legaj == nro_legaj);
        }
        Ok(output)
    }
}
