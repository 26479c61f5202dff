//! SICOSS Data Model
//!
//! Inputs delivered by the extractor, and the per-employee working record
//! mutated in place by each pipeline stage.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payroll scale ("escalafón") carried by SAC (group 9) concept rows.
///
/// Determines which of `ImporteSACDoce`/`ImporteSACAuto`/`ImporteSACNodo`
/// a SAC amount is also folded into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Escalafon {
    NoDocente,
    Docente,
    Autoridad,
    Investigador,
    Other(String),
}

impl Escalafon {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "NODO" => Self::NoDocente,
            "DOCE" => Self::Docente,
            "AUTO" => Self::Autoridad,
            "INV" => Self::Investigador,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Employee record as delivered by the extractor (one per `nro_legaj`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Legajo {
    pub nro_legaj: i64,
    pub cuit: String,
    pub apyno: String,
    pub conyugue: i32,
    pub hijos: i32,
    pub adherentes: i32,
    pub codigosituacion: i32,
    pub codigocondicion: i32,
    pub codigozona: i32,
    pub codigoactividad: i32,
    pub codigocontratacion: i32,
    pub regimen: String,
    pub trabajadorconvencionado: Option<char>,
    pub provincialocalidad: String,
    pub aporteadicional: Decimal,
    pub estado: String,
    pub licencia: bool,

    /// Situación de revista history, carried through to the fixed-width
    /// export (§6.2 fields 30-35) and the database (§6.3 `sit_rev*`).
    pub codigorevista1: i32,
    pub fecharevista1: i32,
    pub codigorevista2: i32,
    pub fecharevista2: i32,
    pub codigorevista3: i32,
    pub fecharevista3: i32,
    pub dias_trabajados: i32,
    pub contrib_tarea_dif: Decimal,
}

impl Legajo {
    /// Normalizes `conyugue` to 0/1 per §3.1 ("0 or count>0; normalized to 0/1").
    pub fn conyugue_flag(&self) -> i32 {
        if self.conyugue > 0 {
            1
        } else {
            0
        }
    }
}

/// A single payroll concept line item for a legajo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptoRow {
    pub nro_legaj: i64,
    pub codn_conce: i32,
    pub impp_conce: Decimal,
    pub tipo_conce: char,
    pub nov1_conce: Decimal,
    pub nro_orimp: i32,
    pub tipos_grupos: HashSet<i32>,
    pub codigoescalafon: Escalafon,
}

/// Secondary employment amounts, zero or one per legajo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtraActividad {
    pub nro_legaj: i64,
    pub importe_bruto_otra_actividad: Decimal,
    pub importe_sac_otra_actividad: Decimal,
}

/// Social-security code override, zero or one per legajo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObraSocial {
    pub nro_legaj: i64,
    pub codigo_os: String,
}

impl Default for ObraSocial {
    fn default() -> Self {
        Self {
            nro_legaj: 0,
            codigo_os: "000000".to_string(),
        }
    }
}

/// Per-employee working record, mutated in place by every pipeline stage
/// in the order mandated by §2/§3.4. Created by merging a [`Legajo`] with
/// the aggregator's per-legajo output; discarded at the end of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegajoRecord {
    pub legajo: Legajo,
    pub obra_social: ObraSocial,
    pub otra_actividad: Option<OtraActividad>,

    // --- Accumulators (ConceptAggregator output, §3.2) ---
    pub importe_sac: Decimal,
    pub importe_horas_extras: Decimal,
    pub importe_zona_desfavorable: Decimal,
    pub importe_vacaciones: Decimal,
    pub importe_premios: Decimal,
    pub importe_adicionales: Decimal,
    pub importe_no_remun: Decimal,
    pub importe_maternidad: Decimal,
    pub importe_rectificacion_remun: Decimal,
    pub aporte_adicional_obra_social: Decimal,
    pub importe_imponible_becario: Decimal,
    pub importe_sicoss_27430: Decimal,
    pub importe_sicoss_dec56119: Decimal,
    pub no_remun_4y8: Decimal,
    pub incremento_solidario: Decimal,
    pub importe_tipo_91: Decimal,
    pub importe_no_remun_96: Decimal,
    pub sac_investigador: Decimal,
    pub importe_sac_doce: Decimal,
    pub importe_sac_auto: Decimal,
    pub importe_sac_nodo: Decimal,
    pub importe_imponible_6: Decimal,
    pub cantidad_horas_extras: Decimal,
    pub seguro_vida_obligatorio: bool,
    pub prioridad_tipo_de_actividad: i32,

    // --- Derived fields (CalculationStage / CeilingStage, §3.2) ---
    pub remuner_78805: Decimal,
    pub importe_imponible_patronal: Decimal,
    pub importe_sac_patronal: Decimal,
    pub importe_imponible_sin_sac: Decimal,
    pub importe_bruto: Decimal,
    pub importe_impon: Decimal,
    pub importe_imponible_4: Decimal,
    pub importe_imponible_5: Decimal,
    pub tipo_de_operacion: i32,
    pub importe_sac_no_docente: Decimal,
    pub importe_sac_otro_aporte: Decimal,
    pub importe_sueldo_mas_adicionales: Decimal,
    pub diferencia_sac_imponible_con_tope: Decimal,
    pub diferencia_imponible_con_tope: Decimal,
    pub dif_sac_imponible_con_otro_tope: Decimal,
    pub dif_imponible_con_otro_tope: Decimal,
    pub importe_bruto_otra_actividad: Decimal,
    pub importe_sac_otra_actividad: Decimal,
    pub importeimponible_9: Decimal,
    pub tipo_de_actividad: i32,
    pub asignaciones_fliares_pagadas: Decimal,
    pub porc_aporte_diferencial_jubilacion: Decimal,
    pub importe_volun: Decimal,
    pub importe_adici: Decimal,
}

impl LegajoRecord {
    /// Builds a fresh record with every accumulator/derived field at zero.
    pub fn new(legajo: Legajo, obra_social: ObraSocial, otra_actividad: Option<OtraActividad>) -> Self {
        Self {
            legajo,
            obra_social,
            otra_actividad,
            importe_sac: Decimal::ZERO,
            importe_horas_extras: Decimal::ZERO,
            importe_zona_desfavorable: Decimal::ZERO,
            importe_vacaciones: Decimal::ZERO,
            importe_premios: Decimal::ZERO,
            importe_adicionales: Decimal::ZERO,
            importe_no_remun: Decimal::ZERO,
            importe_maternidad: Decimal::ZERO,
            importe_rectificacion_remun: Decimal::ZERO,
            aporte_adicional_obra_social: Decimal::ZERO,
            importe_imponible_becario: Decimal::ZERO,
            importe_sicoss_27430: Decimal::ZERO,
            importe_sicoss_dec56119: Decimal::ZERO,
            no_remun_4y8: Decimal::ZERO,
            incremento_solidario: Decimal::ZERO,
            importe_tipo_91: Decimal::ZERO,
            importe_no_remun_96: Decimal::ZERO,
            sac_investigador: Decimal::ZERO,
            importe_sac_doce: Decimal::ZERO,
            importe_sac_auto: Decimal::ZERO,
            importe_sac_nodo: Decimal::ZERO,
            importe_imponible_6: Decimal::ZERO,
            cantidad_horas_extras: Decimal::ZERO,
            seguro_vida_obligatorio: false,
            prioridad_tipo_de_actividad: 0,
            remuner_78805: Decimal::ZERO,
            importe_imponible_patronal: Decimal::ZERO,
            importe_sac_patronal: Decimal::ZERO,
            importe_imponible_sin_sac: Decimal::ZERO,
            importe_bruto: Decimal::ZERO,
            importe_impon: Decimal::ZERO,
            importe_imponible_4: Decimal::ZERO,
            importe_imponible_5: Decimal::ZERO,
            tipo_de_operacion: 1,
            importe_sac_no_docente: Decimal::ZERO,
            importe_sac_otro_aporte: Decimal::ZERO,
            importe_sueldo_mas_adicionales: Decimal::ZERO,
            diferencia_sac_imponible_con_tope: Decimal::ZERO,
            diferencia_imponible_con_tope: Decimal::ZERO,
            dif_sac_imponible_con_otro_tope: Decimal::ZERO,
            dif_imponible_con_otro_tope: Decimal::ZERO,
            importe_bruto_otra_actividad: Decimal::ZERO,
            importe_sac_otra_actividad: Decimal::ZERO,
            importeimponible_9: Decimal::ZERO,
            tipo_de_actividad: 0,
            asignaciones_fliares_pagadas: Decimal::ZERO,
            porc_aporte_diferencial_jubilacion: Decimal::ZERO,
            importe_volun: Decimal::ZERO,
            importe_adici: Decimal::ZERO,
        }
    }

    pub fn nro_legaj(&self) -> i64 {
        self.legajo.nro_legaj
    }
}
