//! CalculationStage (§4.2)
//!
//! Runs after the aggregator and before ceilings. Resolves the
//! differential-jubilation proration, sets `TipoDeOperacion`, and derives
//! `ImporteImponible_4/_5` and the salary-plus-additionals figure.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::config::Config;
use super::model::LegajoRecord;

/// Differential-jubilation proration tolerance (§4.2 step 2).
const DELTA_TOLERANCE: Decimal = dec!(5);

fn apply_differential_jubilation(record: &mut LegajoRecord, porc: Decimal) {
    if record.importe_imponible_6 <= Decimal::ZERO {
        record.tipo_de_operacion = 1;
        record.importe_sac_no_docente = record.importe_sac;
        return;
    }

    if porc.is_zero() {
        // A zero percentage cannot be used as a rescale divisor; there is
        // nothing sensible to prorate against, so fall back to the
        // unscaled Case B path rather than divide by zero.
        record.tipo_de_operacion = 1;
        record.importe_sac_no_docente = record.importe_sac;
        return;
    }

    record.importe_imponible_6 = (record.importe_imponible_6 * dec!(100) / porc).round_dp(2);
    let delta = (record.importe_imponible_6 - record.importe_impon).abs();

    if delta > DELTA_TOLERANCE && record.importe_imponible_6 < record.importe_impon {
        record.tipo_de_operacion = 2;
        record.importe_impon -= record.importe_imponible_6;
        record.importe_sac_no_docente = record.importe_sac - record.sac_investigador;
    } else {
        record.tipo_de_operacion = 1;
        record.importe_sac_no_docente = record.importe_sac;
        if delta <= DELTA_TOLERANCE {
            record.importe_imponible_6 = record.importe_impon;
        }
    }
}

fn compute_sueldo_mas_adicionales(record: &LegajoRecord) -> Decimal {
    let base = record.importe_imponible_patronal
        - record.importe_sac
        - record.importe_horas_extras
        - record.importe_zona_desfavorable
        - record.importe_vacaciones
        - record.importe_premios
        - record.importe_adicionales;
    if base > Decimal::ZERO {
        base - record.incremento_solidario
    } else {
        base
    }
}

/// Applies §4.2 to a single aggregated record.
pub fn calculate(record: &mut LegajoRecord, config: &Config) {
    record.porc_aporte_diferencial_jubilacion = config.porc_aporte_adicional_jubilacion;

    apply_differential_jubilation(record, config.porc_aporte_adicional_jubilacion);

    record.importe_imponible_4 = record.importe_impon;
    record.importe_imponible_5 = record.importe_imponible_4;
    record.importe_sac_otro_aporte = record.importe_sac;

    record.importe_sueldo_mas_adicionales = compute_sueldo_mas_adicionales(record);
}
