//! CeilingStage / Topes (§4.3)
//!
//! Applies the legal ceilings in the mandated order, then the ART base
//! computation, the final adjustments, and the non-negative clamp. The
//! clamp and ART/final-adjustment steps run even when `trunca_tope` is
//! off — §4.3 says to "skip entirely" the lettered ceiling steps, but the
//! surrounding invariants (§3.3: all monetary fields non-negative) are not
//! conditioned on truncation and must hold regardless.

use rust_decimal::Decimal;

use super::config::Config;
use super::error::ArithmeticWarning;
use super::model::LegajoRecord;

fn apply_employer_sac_ceiling(record: &mut LegajoRecord, config: &Config) {
    let tope_sac_patr = config.tope_sac_jubilatorio_patr();
    if record.importe_sac > tope_sac_patr {
        record.diferencia_sac_imponible_con_tope = record.importe_sac - tope_sac_patr;
        record.importe_imponible_patronal -= record.diferencia_sac_imponible_con_tope;
        record.importe_sac_patronal = tope_sac_patr;
    }
}

fn apply_employer_base_ceiling(record: &mut LegajoRecord, config: &Config) {
    record.importe_imponible_sin_sac =
        record.importe_imponible_patronal - record.importe_sac_patronal;
    if record.importe_imponible_sin_sac > config.tope_jubilatorio_patronal {
        record.diferencia_imponible_con_tope =
            record.importe_imponible_sin_sac - config.tope_jubilatorio_patronal;
        record.importe_imponible_patronal -= record.diferencia_imponible_con_tope;
    }
}

fn apply_employee_combined_ceiling(record: &mut LegajoRecord, config: &Config) {
    let tope_sac_pers = config.tope_sac_jubilatorio_pers();
    let tope_pers = config.tope_jubilatorio_personal;

    if record.importe_sac > Decimal::ZERO
        && record.importe_sac_no_docente > tope_pers + tope_sac_pers
    {
        record.diferencia_sac_imponible_con_tope = record.importe_sac_no_docente - tope_sac_pers;
        record.importe_impon -= record.diferencia_sac_imponible_con_tope;
        record.importe_sac_no_docente = tope_sac_pers;
    } else {
        let bruto_sin_sac =
            record.importe_bruto - record.importe_imponible_6 - record.importe_sac_no_docente;
        let cap_sueldo = (bruto_sin_sac - record.importe_no_remun).min(tope_pers);
        let cap_sac = record.importe_sac_no_docente.min(tope_sac_pers);
        record.importe_impon = cap_sueldo + cap_sac;
    }
}

fn apply_other_contributions_ceiling(record: &mut LegajoRecord, config: &Config) {
    let tope_sac_otro = config.tope_sac_otros_aportes();
    record.dif_sac_imponible_con_otro_tope = Decimal::ZERO;
    record.dif_imponible_con_otro_tope = Decimal::ZERO;

    if record.importe_sac_otro_aporte > tope_sac_otro {
        record.dif_sac_imponible_con_otro_tope = record.importe_sac_otro_aporte - tope_sac_otro;
        record.importe_imponible_4 -= record.dif_sac_imponible_con_otro_tope;
        record.importe_sac_otro_aporte = tope_sac_otro;
    }

    let otro_importe_imponible_sin_sac = record.importe_imponible_4 - record.importe_sac_otro_aporte;
    if otro_importe_imponible_sin_sac > config.tope_otros_aportes_personales {
        record.dif_imponible_con_otro_tope =
            otro_importe_imponible_sin_sac - config.tope_otros_aportes_personales;
        record.importe_imponible_4 -= record.dif_imponible_con_otro_tope;
    }
}

fn apply_special_rule(record: &mut LegajoRecord) {
    if record.importe_imponible_6 != Decimal::ZERO && record.tipo_de_operacion == 1 {
        record.importe_impon = Decimal::ZERO;
    }
}

fn apply_secondary_employment_proration(record: &mut LegajoRecord, config: &Config) {
    let Some(otra) = record.otra_actividad.clone() else {
        return;
    };
    if otra.importe_bruto_otra_actividad == Decimal::ZERO
        && otra.importe_sac_otra_actividad == Decimal::ZERO
    {
        return;
    }

    let tope_sac_pers = config.tope_sac_jubilatorio_pers();
    let suma_otra = otra.importe_bruto_otra_actividad + otra.importe_sac_otra_actividad;
    let tope_total = tope_sac_pers + config.tope_jubilatorio_patronal;

    if suma_otra >= tope_total {
        record.importe_impon = Decimal::ZERO;
        return;
    }

    let cap_sueldo =
        (config.tope_jubilatorio_patronal - otra.importe_bruto_otra_actividad).max(Decimal::ZERO);
    let cap_sac = (tope_sac_pers - otra.importe_sac_otra_actividad).max(Decimal::ZERO);
    record.importe_impon = record.importe_imponible_sin_sac.min(cap_sueldo)
        + record.importe_sac_patronal.min(cap_sac);
}

fn recompute_gross(record: &mut LegajoRecord) {
    record.importe_bruto = record.importe_imponible_patronal + record.importe_no_remun;
}

fn apply_topes(record: &mut LegajoRecord, config: &Config) {
    apply_employer_sac_ceiling(record, config);
    apply_employer_base_ceiling(record, config);
    apply_employee_combined_ceiling(record, config);
    apply_other_contributions_ceiling(record, config);
    apply_special_rule(record);
    apply_secondary_employment_proration(record, config);
    recompute_gross(record);
}

fn apply_art(record: &mut LegajoRecord, config: &Config) {
    let mut base = if config.art_con_tope {
        record.importe_imponible_4
    } else {
        record.remuner_78805
    };
    if config.non_remun_concepts_in_art {
        base += record.importe_no_remun;
    }
    record.importeimponible_9 = base;
}

fn apply_final_adjustments(record: &mut LegajoRecord, config: &Config) {
    record.remuner_78805 += record.no_remun_4y8;
    record.importe_imponible_4 += record.no_remun_4y8 + record.importe_tipo_91;
    record.importe_bruto += record.importe_no_remun_96;
    if config.family_allowance_into_gross {
        record.importe_bruto += record.asignaciones_fliares_pagadas;
        record.asignaciones_fliares_pagadas = Decimal::ZERO;
    }
}

fn clamp(value: &mut Decimal, nro_legaj: i64, field: &'static str, warnings: &mut Vec<ArithmeticWarning>) {
    if *value < Decimal::ZERO {
        warnings.push(ArithmeticWarning { nro_legaj, field });
        *value = Decimal::ZERO;
    }
    *value = value.round_dp(2);
}

/// Clips every stored monetary field to `[0, +inf)` and rounds it to the
/// cent (§4.3 post-conditions, §3.3, Testable Property 8).
fn clamp_and_round(record: &mut LegajoRecord, warnings: &mut Vec<ArithmeticWarning>) {
    let nro_legaj = record.nro_legaj();
    clamp(&mut record.importe_sac, nro_legaj, "importe_sac", warnings);
    clamp(&mut record.importe_horas_extras, nro_legaj, "importe_horas_extras", warnings);
    clamp(&mut record.importe_zona_desfavorable, nro_legaj, "importe_zona_desfavorable", warnings);
    clamp(&mut record.importe_vacaciones, nro_legaj, "importe_vacaciones", warnings);
    clamp(&mut record.importe_premios, nro_legaj, "importe_premios", warnings);
    clamp(&mut record.importe_adicionales, nro_legaj, "importe_adicionales", warnings);
    clamp(&mut record.importe_no_remun, nro_legaj, "importe_no_remun", warnings);
    clamp(&mut record.importe_maternidad, nro_legaj, "importe_maternidad", warnings);
    clamp(&mut record.importe_rectificacion_remun, nro_legaj, "importe_rectificacion_remun", warnings);
    clamp(&mut record.aporte_adicional_obra_social, nro_legaj, "aporte_adicional_obra_social", warnings);
    clamp(&mut record.importe_imponible_becario, nro_legaj, "importe_imponible_becario", warnings);
    clamp(&mut record.importe_sicoss_27430, nro_legaj, "importe_sicoss_27430", warnings);
    clamp(&mut record.importe_sicoss_dec56119, nro_legaj, "importe_sicoss_dec56119", warnings);
    clamp(&mut record.no_remun_4y8, nro_legaj, "no_remun_4y8", warnings);
    clamp(&mut record.incremento_solidario, nro_legaj, "incremento_solidario", warnings);
    clamp(&mut record.importe_tipo_91, nro_legaj, "importe_tipo_91", warnings);
    clamp(&mut record.importe_no_remun_96, nro_legaj, "importe_no_remun_96", warnings);
    clamp(&mut record.sac_investigador, nro_legaj, "sac_investigador", warnings);
    clamp(&mut record.importe_sac_doce, nro_legaj, "importe_sac_doce", warnings);
    clamp(&mut record.importe_sac_auto, nro_legaj, "importe_sac_auto", warnings);
    clamp(&mut record.importe_sac_nodo, nro_legaj, "importe_sac_nodo", warnings);
    clamp(&mut record.importe_imponible_6, nro_legaj, "importe_imponible_6", warnings);
    clamp(&mut record.cantidad_horas_extras, nro_legaj, "cantidad_horas_extras", warnings);
    clamp(&mut record.remuner_78805, nro_legaj, "remuner_78805", warnings);
    clamp(&mut record.importe_imponible_patronal, nro_legaj, "importe_imponible_patronal", warnings);
    clamp(&mut record.importe_sac_patronal, nro_legaj, "importe_sac_patronal", warnings);
    clamp(&mut record.importe_imponible_sin_sac, nro_legaj, "importe_imponible_sin_sac", warnings);
    clamp(&mut record.importe_bruto, nro_legaj, "importe_bruto", warnings);
    clamp(&mut record.importe_impon, nro_legaj, "importe_impon", warnings);
    clamp(&mut record.importe_imponible_4, nro_legaj, "importe_imponible_4", warnings);
    clamp(&mut record.importe_imponible_5, nro_legaj, "importe_imponible_5", warnings);
    clamp(&mut record.importe_sac_no_docente, nro_legaj, "importe_sac_no_docente", warnings);
    clamp(&mut record.importe_sac_otro_aporte, nro_legaj, "importe_sac_otro_aporte", warnings);
    clamp(&mut record.importe_sueldo_mas_adicionales, nro_legaj, "importe_sueldo_mas_adicionales", warnings);
    clamp(&mut record.diferencia_sac_imponible_con_tope, nro_legaj, "diferencia_sac_imponible_con_tope", warnings);
    clamp(&mut record.diferencia_imponible_con_tope, nro_legaj, "diferencia_imponible_con_tope", warnings);
    clamp(&mut record.dif_sac_imponible_con_otro_tope, nro_legaj, "dif_sac_imponible_con_otro_tope", warnings);
    clamp(&mut record.dif_imponible_con_otro_tope, nro_legaj, "dif_imponible_con_otro_tope", warnings);
    clamp(&mut record.importe_bruto_otra_actividad, nro_legaj, "importe_bruto_otra_actividad", warnings);
    clamp(&mut record.importe_sac_otra_actividad, nro_legaj, "importe_sac_otra_actividad", warnings);
    clamp(&mut record.importeimponible_9, nro_legaj, "importeimponible_9", warnings);
    clamp(&mut record.asignaciones_fliares_pagadas, nro_legaj, "asignaciones_fliares_pagadas", warnings);
    clamp(&mut record.importe_volun, nro_legaj, "importe_volun", warnings);
    clamp(&mut record.importe_adici, nro_legaj, "importe_adici", warnings);

    record.porc_aporte_diferencial_jubilacion = record
        .porc_aporte_diferencial_jubilacion
        .clamp(Decimal::ZERO, rust_decimal_macros::dec!(200));
}

/// Applies §4.3 to a single record already processed by the aggregator and
/// [`super::calculation::calculate`]. Negative values clipped during the
/// final clamp are appended to `warnings` rather than aborting the run.
pub fn apply(record: &mut LegajoRecord, config: &Config, warnings: &mut Vec<ArithmeticWarning>) {
    if config.trunca_tope {
        apply_topes(record, config);
    }
    apply_art(record, config);
    apply_final_adjustments(record, config);
    clamp_and_round(record, warnings);
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::sicoss::model::{Legajo, ObraSocial, OtraActividad};

    fn legajo_with(nro: i64) -> Legajo {
        Legajo {
            nro_legaj: nro,
            cuit: "20123456789".to_string(),
            apyno: "PEREZ JUAN".to_string(),
            conyugue: 0,
            hijos: 0,
            adherentes: 0,
            codigosituacion: 1,
            codigocondicion: 1,
            codigozona: 1,
            codigoactividad: 0,
            codigocontratacion: 1,
            regimen: "1".to_string(),
            trabajadorconvencionado: None,
            provincialocalidad: "CABA".to_string(),
            aporteadicional: Decimal::ZERO,
            estado: "activo".to_string(),
            licencia: false,
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

    fn config() -> Config {
        Config {
            tope_jubilatorio_patronal: dec!(800_000),
            tope_jubilatorio_personal: dec!(600_000),
            tope_otros_aportes_personales: dec!(700_000),
            ..Config::default()
        }
    }

    #[test]
    fn scenario_2_employer_sac_and_base_ceilings() {
        let mut record = LegajoRecord::new(legajo_with(1), ObraSocial::default(), None);
        record.importe_sac = dec!(500_000);
        record.importe_imponible_patronal = dec!(1_700_000);
        record.importe_sac_no_docente = dec!(500_000);
        record.importe_bruto = dec!(1_700_000);
        let config = config();
        let mut warnings = Vec::new();

        apply(&mut record, &config, &mut warnings);

        assert_eq!(record.diferencia_sac_imponible_con_tope, dec!(100_000));
        assert_eq!(record.importe_sac_patronal, dec!(400_000));
        assert_eq!(record.diferencia_imponible_con_tope, dec!(400_000));
        assert_eq!(record.importe_imponible_patronal, dec!(1_200_000));
        assert_eq!(record.importe_bruto, dec!(1_200_000));
    }

    #[test]
    fn scenario_4_secondary_employment_proration() {
        let mut record = LegajoRecord::new(legajo_with(1), ObraSocial::default(), None);
        record.otra_actividad = Some(OtraActividad {
            nro_legaj: 1,
            importe_bruto_otra_actividad: dec!(600_000),
            importe_sac_otra_actividad: dec!(250_000),
        });
        record.importe_imponible_sin_sac = dec!(900_000);
        record.importe_sac_patronal = dec!(400_000);
        record.importe_imponible_patronal = dec!(900_000) + dec!(400_000);

        let mut config = config();
        config.tope_jubilatorio_personal = dec!(600_000);
        let mut warnings = Vec::new();

        apply(&mut record, &config, &mut warnings);

        // capSueldo = max(800,000 - 600,000, 0) = 200,000
        // capSAC = max(300,000 - 250,000, 0) = 50,000
        assert_eq!(
            record.importe_impon,
            dec!(900_000).min(dec!(200_000)) + dec!(400_000).min(dec!(50_000))
        );
    }

    #[test]
    fn clamp_clips_negative_and_logs_warning() {
        let mut record = LegajoRecord::new(legajo_with(1), ObraSocial::default(), None);
        record.importe_sac = dec!(-50);
        let config = config();
        let mut warnings = Vec::new();

        apply(&mut record, &config, &mut warnings);

        assert_eq!(record.importe_sac, Decimal::ZERO);
        assert!(warnings.iter().any(|w| w.field == "importe_sac"));
    }

    #[test]
    fn truncation_off_skips_topes_but_still_clamps() {
        let mut record = LegajoRecord::new(legajo_with(1), ObraSocial::default(), None);
        record.importe_sac = dec!(-10);
        record.importe_imponible_patronal = dec!(2_000_000);
        let mut config = config();
        config.trunca_tope = false;
        let mut warnings = Vec::new();

        apply(&mut record, &config, &mut warnings);

        assert_eq!(record.importe_imponible_patronal, dec!(2_000_000));
        assert_eq!(record.importe_sac, Decimal::ZERO);
    }
}
