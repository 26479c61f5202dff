//! SICOSS error taxonomy (§7)
//!
//! Mirrors the teacher's `payroll::service::PayrollError`: a `thiserror`
//! enum per failure class, fatal errors short-circuit the run, warnings
//! accumulate without aborting it.

use rust_decimal::Decimal;

/// Fatal before a run starts: missing/invalid ceilings, out-of-range
/// percentage.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid ceiling: {0} must be non-negative")]
    InvalidCeiling(&'static str),

    #[error("invalid percentage: {0} is outside [0, 200]")]
    InvalidPercentage(Decimal),
}

/// Fatal: the extractor returned tables without required columns, or with
/// types that cannot be coerced. No partial output is produced.
#[derive(Debug, thiserror::Error)]
pub enum InputShapeError {
    #[error("missing required column `{0}` in table `{1}`")]
    MissingColumn(&'static str, &'static str),

    #[error("legajo {0} referenced by a concept row does not exist")]
    UnknownLegajo(i64),
}

/// Non-fatal: a monetary value went negative during ceiling application.
/// Clipped to zero; the run continues.
#[derive(Debug, Clone)]
pub struct ArithmeticWarning {
    pub nro_legaj: i64,
    pub field: &'static str,
}

/// Fatal for text output, retryable-per-chunk for database output.
#[derive(Debug, thiserror::Error)]
pub enum OutputWriteError {
    #[error("failed to create output directory `{0}`: {1}")]
    DirectoryCreation(String, std::io::Error),

    #[error("failed to write fixed-width file `{0}`: {1}")]
    FileWrite(String, std::io::Error),

    #[error("database insert failed for chunk starting at row {0}: {1}")]
    DatabaseChunk(usize, sqlx::Error),

    #[error("record for legajo {0} violates a NOT-NULL/length/type constraint: {1}")]
    ConstraintViolation(i64, String),
}

/// Top-level pipeline error. Wraps the other taxonomies and adds the
/// structured cancellation outcome required by §5/§7.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InputShape(#[from] InputShapeError),

    #[error(transparent)]
    OutputWrite(#[from] OutputWriteError),

    #[error("run was cancelled before completion")]
    Cancelled,
}
