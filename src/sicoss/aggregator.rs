//! ConceptAggregator (§4.1)
//!
//! Folds concept rows into per-employee accumulators. The classification
//! table is implemented as data — a `const` slice of `(group_code, target)`
//! pairs — rather than branching, per spec.md §9 ("Group-code dispatch...
//! implement as data"), grounded in `original_source/processors/
//! conceptos_processor.py`'s `mapeo_simple` dict.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::config::Config;
use super::model::{ConceptoRow, Escalafon, Legajo, LegajoRecord, ObraSocial, OtraActividad};

/// One of the accumulator fields a concept row's amount can be folded
/// into via a plain group-code mapping (the "simple" cases of §4.1's
/// table — everything except group 9, 24, {11,12,13,14,15,48,49}, and 58,
/// which need row-level context beyond "add this amount here").
#[derive(Clone, Copy)]
enum SimpleTarget {
    ImporteHorasExtras,
    ImporteZonaDesfavorable,
    ImporteVacaciones,
    ImporteAdicionales,
    ImportePremios,
    ImporteNoRemun,
    ImporteRectificacionRemun,
    ImporteMaternidad,
    AporteAdicionalObraSocial,
    ImporteImponibleBecario,
    ImporteSICOSS27430,
    ImporteSICOSSDec56119,
    NoRemun4y8,
    IncrementoSolidario,
    ImporteTipo91,
    ImporteNoRemun96,
}

const SIMPLE_GROUP_TABLE: &[(i32, SimpleTarget)] = &[
    (6, SimpleTarget::ImporteHorasExtras),
    (7, SimpleTarget::ImporteZonaDesfavorable),
    (8, SimpleTarget::ImporteVacaciones),
    (21, SimpleTarget::ImporteAdicionales),
    (22, SimpleTarget::ImportePremios),
    (45, SimpleTarget::ImporteNoRemun),
    (46, SimpleTarget::ImporteRectificacionRemun),
    (47, SimpleTarget::ImporteMaternidad),
    (16, SimpleTarget::AporteAdicionalObraSocial),
    (67, SimpleTarget::ImporteImponibleBecario),
    (81, SimpleTarget::ImporteSICOSS27430),
    (83, SimpleTarget::ImporteSICOSSDec56119),
    (84, SimpleTarget::NoRemun4y8),
    (86, SimpleTarget::IncrementoSolidario),
    (91, SimpleTarget::ImporteTipo91),
    (96, SimpleTarget::ImporteNoRemun96),
];

/// Priority for TipoDeActividad, keyed by the investigator group code
/// that produced it (§4.1's `mapeo_prioridades`).
const PRIORITY_TABLE: &[(i32, i32)] = &[
    (11, 38),
    (12, 34),
    (13, 35),
    (14, 36),
    (15, 37),
    (48, 87),
    (49, 88),
];

const INVESTIGADOR_GROUPS: &[i32] = &[11, 12, 13, 14, 15, 48, 49];

fn simple_target(group: i32) -> Option<SimpleTarget> {
    SIMPLE_GROUP_TABLE
        .iter()
        .find(|(code, _)| *code == group)
        .map(|(_, target)| *target)
}

fn apply_simple(record: &mut LegajoRecord, target: SimpleTarget, amount: Decimal) {
    match target {
        SimpleTarget::ImporteHorasExtras => record.importe_horas_extras += amount,
        SimpleTarget::ImporteZonaDesfavorable => record.importe_zona_desfavorable += amount,
        SimpleTarget::ImporteVacaciones => record.importe_vacaciones += amount,
        SimpleTarget::ImporteAdicionales => record.importe_adicionales += amount,
        SimpleTarget::ImportePremios => record.importe_premios += amount,
        SimpleTarget::ImporteNoRemun => record.importe_no_remun += amount,
        SimpleTarget::ImporteRectificacionRemun => record.importe_rectificacion_remun += amount,
        SimpleTarget::ImporteMaternidad => record.importe_maternidad += amount,
        SimpleTarget::AporteAdicionalObraSocial => record.aporte_adicional_obra_social += amount,
        SimpleTarget::ImporteImponibleBecario => record.importe_imponible_becario += amount,
        SimpleTarget::ImporteSICOSS27430 => record.importe_sicoss_27430 += amount,
        SimpleTarget::ImporteSICOSSDec56119 => record.importe_sicoss_dec56119 += amount,
        SimpleTarget::NoRemun4y8 => record.no_remun_4y8 += amount,
        SimpleTarget::IncrementoSolidario => record.incremento_solidario += amount,
        SimpleTarget::ImporteTipo91 => record.importe_tipo_91 += amount,
        SimpleTarget::ImporteNoRemun96 => record.importe_no_remun_96 += amount,
    }
}

fn apply_sac(record: &mut LegajoRecord, escalafon: &Escalafon, amount: Decimal) {
    record.importe_sac += amount;
    match escalafon {
        Escalafon::Docente => record.importe_sac_doce += amount,
        Escalafon::Autoridad => record.importe_sac_auto += amount,
        Escalafon::NoDocente => record.importe_sac_nodo += amount,
        Escalafon::Investigador => record.sac_investigador += amount,
        Escalafon::Other(_) => {}
    }
}

fn apply_investigador_group(record: &mut LegajoRecord, group: i32, amount: Decimal) {
    record.importe_imponible_6 += amount;
    if let Some((_, priority)) = PRIORITY_TABLE.iter().find(|(code, _)| *code == group) {
        record.prioridad_tipo_de_actividad = record.prioridad_tipo_de_actividad.max(*priority);
    }
}

/// Folds all concept rows for one legajo into its accumulators (one row
/// contributes once per group code in its `tipos_grupos` set).
fn apply_concepto(record: &mut LegajoRecord, row: &ConceptoRow) {
    for &group in &row.tipos_grupos {
        if let Some(target) = simple_target(group) {
            apply_simple(record, target, row.impp_conce);
        } else if group == 9 {
            apply_sac(record, &row.codigoescalafon, row.impp_conce);
        } else if group == 24 {
            record.cantidad_horas_extras += row.nov1_conce;
        } else if INVESTIGADOR_GROUPS.contains(&group) {
            apply_investigador_group(record, group, row.impp_conce);
        } else if group == 58 {
            record.seguro_vida_obligatorio = true;
        }
        // Unknown group codes are ignored (non-fatal, §4.1 Failure modes).
    }
}

/// Resolves concept rows that are looked up by `codn_conce` rather than by
/// group code (SPEC_FULL.md §4.1 ADDED: explicit obra-social surcharge and
/// voluntary-contribution concept codes).
fn apply_concept_code_lookup(record: &mut LegajoRecord, row: &ConceptoRow, config: &Config) {
    if Some(row.codn_conce) == config.codigo_os_aporte_adicional {
        record.aporte_adicional_obra_social += row.impp_conce;
    }
    if Some(row.codn_conce) == config.codigo_concepto_voluntario {
        record.importe_volun += row.impp_conce;
    }
}

fn apply_investigador_reclass(record: &mut LegajoRecord) {
    if record.sac_investigador > Decimal::ZERO {
        record.importe_sac -= record.sac_investigador;
    }
}

fn compute_remuner_78805(record: &LegajoRecord) -> Decimal {
    record.importe_sac
        + record.importe_horas_extras
        + record.importe_zona_desfavorable
        + record.importe_vacaciones
        + record.importe_premios
        + record.importe_adicionales
        + record.importe_imponible_becario
}

fn assign_tipo_de_actividad(record: &mut LegajoRecord) {
    record.tipo_de_actividad = match record.prioridad_tipo_de_actividad {
        0 | 38 => record.legajo.codigoactividad,
        p @ (34 | 35 | 36 | 37 | 87 | 88) => p,
        _ => 0,
    };
}

/// Classifies and aggregates concept rows, producing one [`LegajoRecord`]
/// per legajo with every accumulator and derived-base field populated.
pub fn aggregate(
    legajos: Vec<Legajo>,
    conceptos: &[ConceptoRow],
    otra_actividad: &[OtraActividad],
    obra_social: &[ObraSocial],
    config: &Config,
) -> Vec<LegajoRecord> {
    let mut otra_by_legajo: HashMap<i64, OtraActividad> = otra_actividad
        .iter()
        .cloned()
        .map(|o| (o.nro_legaj, o))
        .collect();
    let mut obra_by_legajo: HashMap<i64, ObraSocial> = obra_social
        .iter()
        .cloned()
        .map(|o| (o.nro_legaj, o))
        .collect();

    let mut records: HashMap<i64, LegajoRecord> = legajos
        .into_iter()
        .map(|legajo| {
            let nro = legajo.nro_legaj;
            let obra = obra_by_legajo.remove(&nro).unwrap_or_default();
            let otra = otra_by_legajo.remove(&nro);
            (nro, LegajoRecord::new(legajo, obra, otra))
        })
        .collect();

    for row in conceptos {
        if let Some(record) = records.get_mut(&row.nro_legaj) {
            apply_concepto(record, row);
            apply_concept_code_lookup(record, row, config);
        }
        // Concept rows for unknown legajos are ignored here; the extractor
        // contract (§6.1) is responsible for referential integrity.
    }

    let mut out: Vec<LegajoRecord> = records.into_values().collect();
    out.sort_by_key(|r| r.nro_legaj());

    for record in &mut out {
        apply_investigador_reclass(record);

        record.remuner_78805 = compute_remuner_78805(record);
        record.importe_imponible_patronal = record.remuner_78805;
        record.importe_sac_patronal = record.importe_sac;
        record.importe_imponible_sin_sac =
            record.importe_imponible_patronal - record.importe_sac_patronal;
        record.importe_bruto = record.importe_imponible_patronal + record.importe_no_remun;
        record.importe_impon = record.remuner_78805;

        if let Some(otra) = &record.otra_actividad {
            record.importe_bruto_otra_actividad = otra.importe_bruto_otra_actividad;
            record.importe_sac_otra_actividad = otra.importe_sac_otra_actividad;
        }

        assign_tipo_de_actividad(record);
    }

    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rust_decimal_macros::dec;

    use super::*;

    fn legajo(nro: i64) -> Legajo {
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
            codigoactividad: 99,
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

    fn concepto(nro: i64, groups: &[i32], amount: Decimal, escalafon: Escalafon) -> ConceptoRow {
        ConceptoRow {
            nro_legaj: nro,
            codn_conce: 1,
            impp_conce: amount,
            tipo_conce: 'C',
            nov1_conce: Decimal::ZERO,
            nro_orimp: 1,
            tipos_grupos: groups.iter().copied().collect::<HashSet<_>>(),
            codigoescalafon: escalafon,
        }
    }

    #[test]
    fn scenario_1_no_ceilings_triggered() {
        let legajos = vec![legajo(1)];
        let conceptos = vec![
            concepto(1, &[21], dec!(80_000), Escalafon::NoDocente),
            concepto(1, &[9], dec!(6666.67), Escalafon::NoDocente),
        ];
        let config = Config::default();
        let records = aggregate(legajos, &conceptos, &[], &[], &config);
        let rec = &records[0];

        assert_eq!(rec.importe_sac, dec!(6666.67));
        assert_eq!(rec.remuner_78805, dec!(86666.67));
        assert_eq!(rec.importe_imponible_patronal, dec!(86666.67));
        assert_eq!(rec.importe_impon, dec!(86666.67));
        assert_eq!(rec.importe_bruto, dec!(86666.67));
    }

    #[test]
    fn unknown_group_is_ignored() {
        let legajos = vec![legajo(1)];
        let conceptos = vec![concepto(1, &[999], dec!(1234.56), Escalafon::NoDocente)];
        let records = aggregate(legajos, &conceptos, &[], &[], &Config::default());
        assert_eq!(records[0].remuner_78805, Decimal::ZERO);
    }

    #[test]
    fn investigator_sac_is_reclassified_out_of_importe_sac() {
        let legajos = vec![legajo(1)];
        let conceptos = vec![concepto(1, &[9], dec!(10_000), Escalafon::Investigador)];
        let records = aggregate(legajos, &conceptos, &[], &[], &Config::default());
        let rec = &records[0];
        assert_eq!(rec.sac_investigador, dec!(10_000));
        assert_eq!(rec.importe_sac, Decimal::ZERO);
    }

    #[test]
    fn investigator_group_sets_priority_and_activity() {
        let legajos = vec![legajo(1)];
        let conceptos = vec![concepto(1, &[15], dec!(500), Escalafon::NoDocente)];
        let records = aggregate(legajos, &conceptos, &[], &[], &Config::default());
        let rec = &records[0];
        assert_eq!(rec.importe_imponible_6, dec!(500));
        assert_eq!(rec.prioridad_tipo_de_actividad, 37);
        assert_eq!(rec.tipo_de_actividad, 37);
    }

    #[test]
    fn row_contributes_to_every_mapped_group() {
        let legajos = vec![legajo(1)];
        let conceptos = vec![concepto(1, &[6, 21], dec!(1000), Escalafon::NoDocente)];
        let records = aggregate(legajos, &conceptos, &[], &[], &Config::default());
        let rec = &records[0];
        assert_eq!(rec.importe_horas_extras, dec!(1000));
        assert_eq!(rec.importe_adicionales, dec!(1000));
    }
}
