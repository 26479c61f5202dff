//! Validator (§4.4)
//!
//! A pure survival predicate plus the `retain`-based filter that applies
//! it across a run. Rejections are counted, not treated as errors (§7).

use rust_decimal::Decimal;

use super::config::Config;
use super::model::LegajoRecord;

const MATERNITY_OR_SPECIAL_LEAVE: [i32; 2] = [5, 11];
const POSITION_RESERVATION: i32 = 14;

/// True iff the record should appear in the output.
pub fn survives(record: &LegajoRecord, config: &Config) -> bool {
    let meaningful_amount = record.importe_bruto.abs()
        + record.importe_impon.abs()
        + record.importe_imponible_patronal.abs()
        + record.importe_sac.abs()
        + record.asignaciones_fliares_pagadas.abs();

    if meaningful_amount > Decimal::ZERO {
        return true;
    }
    if MATERNITY_OR_SPECIAL_LEAVE.contains(&record.legajo.codigosituacion) {
        return true;
    }
    if config.include_licenses && record.legajo.licencia {
        return true;
    }
    record.legajo.codigosituacion == POSITION_RESERVATION
}

/// Result of applying the validator across a run.
pub struct ValidationOutcome {
    pub survivors: Vec<LegajoRecord>,
    pub rejected: usize,
}

pub fn filter_survivors(mut records: Vec<LegajoRecord>, config: &Config) -> ValidationOutcome {
    let before = records.len();
    records.retain(|record| survives(record, config));
    let rejected = before - records.len();
    ValidationOutcome {
        survivors: records,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::sicoss::model::{Legajo, ObraSocial};

    fn legajo_with(situacion: i32, licencia: bool) -> Legajo {
        Legajo {
            nro_legaj: 1,
            cuit: "20123456789".to_string(),
            apyno: "PEREZ JUAN".to_string(),
            conyugue: 0,
            hijos: 0,
            adherentes: 0,
            codigosituacion: situacion,
            codigocondicion: 1,
            codigozona: 1,
            codigoactividad: 0,
            codigocontratacion: 1,
            regimen: "1".to_string(),
            trabajadorconvencionado: None,
            provincialocalidad: "CABA".to_string(),
            aporteadicional: Decimal::ZERO,
            estado: "activo".to_string(),
            licencia,
            codigorevista1: 1,
            fecharevista1: 1,
            codigorevista2: 0,
            fecharevista2: 0,
            codigorevista3: 0,
            fecharevista3: 0,
            dias_trabajados: 30,
            contrib_tarea_dif: Decimal::ZERO,
        }
    }

    #[test]
    fn scenario_5_zero_amounts_survive_on_special_situation() {
        let record = LegajoRecord::new(legajo_with(5, false), ObraSocial::default(), None);
        assert!(survives(&record, &Config::default()));
    }

    #[test]
    fn zero_amounts_are_dropped_by_default() {
        let record = LegajoRecord::new(legajo_with(1, false), ObraSocial::default(), None);
        assert!(!survives(&record, &Config::default()));
    }

    #[test]
    fn licence_survives_only_when_include_licenses_is_on() {
        let record = LegajoRecord::new(legajo_with(1, true), ObraSocial::default(), None);
        assert!(!survives(&record, &Config::default()));

        let mut config = Config::default();
        config.include_licenses = true;
        assert!(survives(&record, &config));
    }

    #[test]
    fn position_reservation_survives() {
        let record = LegajoRecord::new(legajo_with(14, false), ObraSocial::default(), None);
        assert!(survives(&record, &Config::default()));
    }

    #[test]
    fn any_nonzero_monetary_field_survives() {
        let mut record = LegajoRecord::new(legajo_with(1, false), ObraSocial::default(), None);
        record.importe_sac = dec!(0.01);
        assert!(survives(&record, &Config::default()));
    }

    #[test]
    fn filter_survivors_counts_rejections() {
        let records = vec![
            LegajoRecord::new(legajo_with(1, false), ObraSocial::default(), None),
            LegajoRecord::new(legajo_with(5, false), ObraSocial::default(), None),
        ];
        let outcome = filter_survivors(records, &Config::default());
        assert_eq!(outcome.survivors.len(), 1);
        assert_eq!(outcome.rejected, 1);
    }

    #[test]
    fn applying_validator_twice_is_idempotent() {
        let records = vec![
            LegajoRecord::new(legajo_with(1, false), ObraSocial::default(), None),
            LegajoRecord::new(legajo_with(5, false), ObraSocial::default(), None),
        ];
        let first = filter_survivors(records, &Config::default());
        let first_len = first.survivors.len();
        let second = filter_survivors(first.survivors, &Config::default());
        assert_eq!(second.survivors.len(), first_len);
        assert_eq!(second.rejected, 0);
    }
}
