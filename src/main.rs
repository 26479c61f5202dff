//! sicoss-cli — operational harness that runs the SICOSS pipeline end to
//! end: load an extractor snapshot, load configuration, run the pipeline,
//! write the fixed-width export, and optionally bulk-insert into Postgres.
//!
//! This binary is a demonstration harness, not the production CLI (out of
//! scope, spec.md §1) — the real deployment wires a SQL-backed extractor
//! and a scheduling/diagnostic layer around the same library entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sicoss_core::sicoss::db_writer::{self, WriteMode};
use sicoss_core::sicoss::extractor::{ExtractionParams, JsonFileExtractor};
use sicoss_core::{Config, PipelineError};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loads `Config` from the JSON file named by `SICOSS_CONFIG_PATH`, or
/// falls back to [`Config::default`] if the variable is unset — the real
/// parameter-table loader is an external collaborator (spec.md §1, §6.4).
fn load_config() -> Result<Config> {
    match std::env::var("SICOSS_CONFIG_PATH") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file `{path}`"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing config file `{path}`"))
        }
        Err(_) => Ok(Config::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    config.validate().context("invalid SICOSS configuration")?;

    let snapshot_path = std::env::var("SICOSS_EXTRACTOR_SNAPSHOT")
        .context("SICOSS_EXTRACTOR_SNAPSHOT must point at a JSON extractor snapshot")?;
    let extractor = JsonFileExtractor::new(PathBuf::from(snapshot_path));

    let year: i32 = std::env::var("SICOSS_YEAR")
        .context("SICOSS_YEAR must be set")?
        .parse()
        .context("SICOSS_YEAR must be an integer")?;
    let month: u32 = std::env::var("SICOSS_MONTH")
        .context("SICOSS_MONTH must be set")?
        .parse()
        .context("SICOSS_MONTH must be an integer")?;

    let params = ExtractionParams {
        year,
        month,
        legajo_filter: None,
    };

    let (_cancel_tx, cancel_rx) = watch::channel(false);

    tracing::info!(year, month, "starting SICOSS run");

    let outcome = match sicoss_core::sicoss::pipeline::run(&extractor, params, &config, 1, &cancel_rx).await {
        Ok(outcome) => outcome,
        Err(PipelineError::Cancelled) => {
            tracing::warn!("run cancelled before completion");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        surviving = outcome.records.len(),
        rejected = outcome.rejected,
        warnings = outcome.warnings.len(),
        bruto_total = %outcome.totals.bruto,
        "pipeline completed"
    );
    for warning in &outcome.warnings {
        tracing::warn!(nro_legaj = warning.nro_legaj, field = warning.field, "clipped negative value to zero");
    }

    let output_dir = std::env::var("SICOSS_OUTPUT_DIR").unwrap_or_else(|_| "./output".to_string());
    sicoss_core::sicoss::text_encoder::write_file(
        &outcome.records,
        &config,
        Path::new(&output_dir),
        &outcome.run.periodo_fiscal(),
    )?;
    tracing::info!(directory = %output_dir, "wrote fixed-width export");

    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .context("connecting to SICOSS database")?;

        let written = db_writer::write(
            &pool,
            &outcome.records,
            &config,
            &outcome.run.periodo_fiscal(),
            WriteMode::Append,
            &cancel_rx,
        )
        .await?;
        tracing::info!(rows = written, "wrote database rows");
    } else {
        tracing::info!("DATABASE_URL not set, skipping database write");
    }

    Ok(())
}
