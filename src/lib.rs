//! SICOSS payroll declaration computation engine
//!
//! Computes the Argentine SICOSS declaration for a fiscal period: folds
//! concept rows into per-employee accumulators, applies the differential-
//! jubilation and ceiling rules, validates survivors, and emits the
//! fixed-width text export and the database rows.
//!
//! ## Pipeline
//!
//! Extractor → ConceptAggregator → CalculationStage → CeilingStage →
//! Validator → { TextEncoder, DatabaseWriter, Totals }. See
//! [`sicoss::pipeline::run`] for the orchestration entry point.

pub mod sicoss;

pub use sicoss::{
    Config, ConceptoRow, Escalafon, ExtractionParams, Extractor, ExtractorOutput, JsonFileExtractor,
    Legajo, LegajoRecord, ObraSocial, OtraActividad, PipelineError, PipelineOutcome, SicossRun,
    StaticExtractor, Totals,
};
