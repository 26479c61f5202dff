//! Top-level orchestration (§2, §5)
//!
//! Wires the stages together in the mandated order and owns the two
//! concurrency primitives the spec allows: partitioned computation across
//! employees (no cross-employee state, so plain data parallelism) and a
//! cooperative cancellation signal checked between stages. Grounded in the
//! teacher's `payroll::service::PayrollService` orchestration shape.

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use super::aggregator;
use super::calculation;
use super::ceiling;
use super::config::Config;
use super::error::{ArithmeticWarning, PipelineError};
use super::extractor::{ExtractionParams, Extractor};
use super::model::LegajoRecord;
use super::totals::Totals;
use super::validator;

/// Identity and timing of one computation run over a fiscal period.
#[derive(Debug, Clone)]
pub struct SicossRun {
    pub id: Uuid,
    pub year: i32,
    pub month: u32,
    pub started_at: DateTime<Utc>,
}

impl SicossRun {
    fn new(year: i32, month: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            year,
            month,
            started_at: Utc::now(),
        }
    }

    /// `YYYYMM`, the format required by the database's `periodo_fiscal`
    /// column and conventionally used for the text file's basename (§6.3).
    pub fn periodo_fiscal(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

pub struct PipelineOutcome {
    pub run: SicossRun,
    pub records: Vec<LegajoRecord>,
    pub totals: Totals,
    pub rejected: usize,
    pub warnings: Vec<ArithmeticWarning>,
}

/// Runs CalculationStage then CeilingStage over `records`, optionally
/// splitting the work across `partitions` OS threads. An employee's final
/// record is identical either way — there is no cross-employee state
/// (§5) — so this is a pure throughput knob.
fn process_calculation_and_ceilings(
    records: &mut [LegajoRecord],
    config: &Config,
    partitions: usize,
) -> Vec<ArithmeticWarning> {
    if partitions <= 1 || records.len() <= 1 {
        let mut warnings = Vec::new();
        for record in records.iter_mut() {
            calculation::calculate(record, config);
            ceiling::apply(record, config, &mut warnings);
        }
        return warnings;
    }

    let chunk_size = (records.len() + partitions - 1) / partitions;
    let warnings = std::sync::Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        for chunk in records.chunks_mut(chunk_size.max(1)) {
            let config = &*config;
            let warnings = &warnings;
            scope.spawn(move || {
                let mut local = Vec::new();
                for record in chunk.iter_mut() {
                    calculation::calculate(record, config);
                    ceiling::apply(record, config, &mut local);
                }
                warnings.lock().expect("warnings mutex poisoned").extend(local);
            });
        }
    });

    warnings.into_inner().expect("warnings mutex poisoned")
}

/// Runs the full pipeline: extract, aggregate, calculate, apply ceilings,
/// validate, total. `partitions` controls the optional data-parallel split
/// of CalculationStage/CeilingStage (1 = single-threaded). `cancel` is
/// checked before each suspension point and before the final totals pass;
/// a flip to `true` aborts the run with [`PipelineError::Cancelled`] and no
/// partial output, per §5.
pub async fn run(
    extractor: &dyn Extractor,
    params: ExtractionParams,
    config: &Config,
    partitions: usize,
    cancel: &watch::Receiver<bool>,
) -> Result<PipelineOutcome, PipelineError> {
    config.validate()?;

    if *cancel.borrow() {
        return Err(PipelineError::Cancelled);
    }

    let output = extractor.extract(params).await?;

    if *cancel.borrow() {
        return Err(PipelineError::Cancelled);
    }

    let sicoss_run = SicossRun::new(params.year, params.month);

    let mut records = aggregator::aggregate(
        output.legajos,
        &output.conceptos,
        &output.otra_actividad,
        &output.obra_social,
        config,
    );

    if *cancel.borrow() {
        return Err(PipelineError::Cancelled);
    }

    let warnings = process_calculation_and_ceilings(&mut records, config, partitions);

    if *cancel.borrow() {
        return Err(PipelineError::Cancelled);
    }

    let outcome = validator::filter_survivors(records, config);
    let totals = Totals::from_records(&outcome.survivors);

    Ok(PipelineOutcome {
        run: sicoss_run,
        records: outcome.survivors,
        totals,
        rejected: outcome.rejected,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::sicoss::extractor::{ExtractorOutput, StaticExtractor};
    use crate::sicoss::model::{ConceptoRow, Escalafon, Legajo};

    fn legajo(nro: i64, situacion: i32) -> Legajo {
        Legajo {
            nro_legaj: nro,
            cuit: "20123456789".to_string(),
            apyno: "PEREZ JUAN".to_string(),
            conyugue: 0,
            hijos: 0,
            adherentes: 0,
            codigosituacion: situacion,
            codigocondicion: 1,
            codigozona: 1,
            codigoactividad: 99,
            codigocontratacion: 1,
            regimen: "1".to_string(),
            trabajadorconvencionado: None,
            provincialocalidad: "CABA".to_string(),
            aporteadicional: rust_decimal::Decimal::ZERO,
            estado: "activo".to_string(),
            licencia: false,
            codigorevista1: 1,
            fecharevista1: 1,
            codigorevista2: 0,
            fecharevista2: 0,
            codigorevista3: 0,
            fecharevista3: 0,
            dias_trabajados: 30,
            contrib_tarea_dif: rust_decimal::Decimal::ZERO,
        }
    }

    fn concepto(nro: i64, groups: &[i32], amount: rust_decimal::Decimal) -> ConceptoRow {
        ConceptoRow {
            nro_legaj: nro,
            codn_conce: 1,
            impp_conce: amount,
            tipo_conce: 'C',
            nov1_conce: rust_decimal::Decimal::ZERO,
            nro_orimp: 1,
            tipos_grupos: groups.iter().copied().collect(),
            codigoescalafon: Escalafon::NoDocente,
        }
    }

    #[tokio::test]
    async fn scenario_1_end_to_end() {
        let extractor = StaticExtractor {
            output: ExtractorOutput {
                legajos: vec![legajo(1, 1)],
                conceptos: vec![
                    concepto(1, &[21], dec!(80_000)),
                    concepto(1, &[9], dec!(6666.67)),
                ],
                otra_actividad: vec![],
                obra_social: vec![],
            },
        };
        let config = Config::default();
        let (_tx, rx) = watch::channel(false);

        let outcome = run(
            &extractor,
            ExtractionParams {
                year: 2026,
                month: 1,
                legajo_filter: None,
            },
            &config,
            1,
            &rx,
        )
        .await
        .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.rejected, 0);
        assert_eq!(outcome.records[0].importe_bruto, dec!(86666.67));
        assert_eq!(outcome.totals.bruto, dec!(86666.67));
    }

    #[tokio::test]
    async fn cancellation_before_extraction_aborts() {
        let extractor = StaticExtractor::default();
        let config = Config::default();
        let (_tx, rx) = watch::channel(true);

        let result = run(
            &extractor,
            ExtractionParams {
                year: 2026,
                month: 1,
                legajo_filter: None,
            },
            &config,
            1,
            &rx,
        )
        .await;

        assert!(matches!(result, Err(PipelineError::Cancelled)));
    }

    #[tokio::test]
    async fn rejected_employee_does_not_appear_in_output() {
        let extractor = StaticExtractor {
            output: ExtractorOutput {
                legajos: vec![legajo(1, 1)],
                conceptos: vec![],
                otra_actividad: vec![],
                obra_social: vec![],
            },
        };
        let config = Config::default();
        let (_tx, rx) = watch::channel(false);

        let outcome = run(
            &extractor,
            ExtractionParams {
                year: 2026,
                month: 1,
                legajo_filter: None,
            },
            &config,
            1,
            &rx,
        )
        .await
        .unwrap();

        assert_eq!(outcome.records.len(), 0);
        assert_eq!(outcome.rejected, 1);
    }

    #[tokio::test]
    async fn partitioned_and_single_threaded_runs_agree() {
        let legajos: Vec<Legajo> = (1..=20).map(|i| legajo(i, 1)).collect();
        let conceptos: Vec<ConceptoRow> = (1..=20)
            .flat_map(|i| {
                vec![
                    concepto(i, &[1], dec!(10_000) * rust_decimal::Decimal::from(i)),
                    concepto(i, &[9], dec!(1_000)),
                ]
            })
            .collect();

        let make_extractor = || StaticExtractor {
            output: ExtractorOutput {
                legajos: legajos.clone(),
                conceptos: conceptos.clone(),
                otra_actividad: vec![],
                obra_social: vec![],
            },
        };
        let config = Config::default();
        let (_tx, rx) = watch::channel(false);

        let single = run(
            &make_extractor(),
            ExtractionParams { year: 2026, month: 1, legajo_filter: None },
            &config,
            1,
            &rx,
        )
        .await
        .unwrap();
        let parallel = run(
            &make_extractor(),
            ExtractionParams { year: 2026, month: 1, legajo_filter: None },
            &config,
            4,
            &rx,
        )
        .await
        .unwrap();

        assert_eq!(single.totals.bruto, parallel.totals.bruto);
        assert_eq!(single.records.len(), parallel.records.len());
    }
}
