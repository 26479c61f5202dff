//! TextEncoder (§4.6/§6.2)
//!
//! Fixed-width record encoder for the SICOSS text declaration. Grounded in
//! `original_source/SicossProcessor.py`'s `_formatear_linea_sicoss`/
//! `_llenar_blancos`/`_llenar_importes` helpers, which are incomplete in the
//! original; the field table below (§6.2) is authoritative over them.

use std::path::Path;

use rust_decimal::Decimal;

use super::config::Config;
use super::error::OutputWriteError;
use super::model::LegajoRecord;

/// Right-truncates/pads with spaces on the right (fixed-text fields).
fn pad_text(value: &str, width: usize) -> String {
    let mut out: String = value.chars().take(width).collect();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}

/// Zero-pads an integer on the left to `width` characters.
fn pad_int(value: i64, width: usize) -> String {
    format!("{:0width$}", value, width = width)
}

/// Renders a money field as `"integer_part,decimal_part"` (comma decimal
/// separator, exactly two digits), left-padded with spaces to `width`.
fn pad_money(value: Decimal, width: usize) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() && rounded != Decimal::ZERO {
        "-"
    } else {
        ""
    };
    let formatted = format!("{:.2}", rounded.abs()).replace('.', ",");
    format!("{:>width$}", format!("{sign}{formatted}"), width = width)
}

/// Encodes a single surviving employee into one ~60-field fixed-width line
/// (no trailing line terminator — the caller appends CRLF).
pub fn encode_record(record: &LegajoRecord, config: &Config) -> String {
    let legajo = &record.legajo;
    let mut line = String::with_capacity(320);

    line.push_str(&pad_text(&legajo.cuit, 11)); // 1
    line.push_str(&pad_text(&legajo.apyno, 30)); // 2
    line.push_str(&pad_int(legajo.conyugue_flag() as i64, 1)); // 3
    line.push_str(&pad_int(legajo.hijos as i64, 2)); // 4
    line.push_str(&pad_int(legajo.codigosituacion as i64, 2)); // 5
    line.push_str(&pad_int(legajo.codigocondicion as i64, 2)); // 6
    line.push_str(&pad_int(record.tipo_de_actividad as i64, 3)); // 7
    line.push_str(&pad_int(legajo.codigozona as i64, 2)); // 8
    line.push_str(&pad_money(legajo.aporteadicional, 5)); // 9
    line.push_str(&pad_int(legajo.codigocontratacion as i64, 3)); // 10
    line.push_str(&pad_text(&record.obra_social.codigo_os, 6)); // 11
    line.push_str(&pad_int(legajo.adherentes as i64, 2)); // 12
    line.push_str(&pad_money(record.importe_bruto, 12)); // 13
    line.push_str(&pad_money(record.importe_impon, 12)); // 14
    line.push_str(&pad_money(record.asignaciones_fliares_pagadas, 9)); // 15
    line.push_str(&pad_money(record.importe_volun, 9)); // 16
    line.push_str(&pad_money(record.importe_adici, 9)); // 17
    line.push_str(&pad_money(record.importe_sicoss_dec56119.abs(), 9)); // 18
    line.push_str(&pad_money(Decimal::ZERO, 9)); // 19 literal
    line.push_str(&pad_text(&legajo.provincialocalidad, 50)); // 20
    line.push_str(&pad_money(record.importe_imponible_patronal, 12)); // 21
    line.push_str(&pad_money(record.importe_imponible_patronal, 12)); // 22
    line.push_str(&pad_money(record.importe_imponible_4, 12)); // 23
    line.push_str("00"); // 24 literal
    line.push_str("0"); // 25 literal
    line.push_str("000000,00"); // 26 literal
    line.push_str("1"); // 27 literal
    line.push_str(&pad_money(record.aporte_adicional_obra_social, 9)); // 28
    line.push_str(&pad_text(&legajo.regimen, 1)); // 29
    line.push_str(&pad_int(legajo.codigorevista1 as i64, 2)); // 30
    line.push_str(&pad_int(legajo.fecharevista1 as i64, 2)); // 31
    line.push_str(&pad_int(legajo.codigorevista2 as i64, 2)); // 32
    line.push_str(&pad_int(legajo.fecharevista2 as i64, 2)); // 33
    line.push_str(&pad_int(legajo.codigorevista3 as i64, 2)); // 34
    line.push_str(&pad_int(legajo.fecharevista3 as i64, 2)); // 35
    line.push_str(&pad_money(record.importe_sueldo_mas_adicionales, 12)); // 36
    line.push_str(&pad_money(record.importe_sac, 12)); // 37
    line.push_str(&pad_money(record.importe_horas_extras, 12)); // 38
    line.push_str(&pad_money(record.importe_zona_desfavorable, 12)); // 39
    line.push_str(&pad_money(record.importe_vacaciones, 12)); // 40
    line.push_str(&format!("0000000{}", pad_int(legajo.dias_trabajados as i64, 2))); // 41
    line.push_str(&pad_money(
        record.importe_imponible_4 - record.importe_tipo_91,
        12,
    )); // 42
    line.push_str(&pad_text(
        &legajo
            .trabajadorconvencionado
            .unwrap_or(config.trabajador_convencionado_default)
            .to_string(),
        1,
    )); // 43
    line.push_str(&pad_money(record.importe_imponible_6, 12)); // 44
    line.push_str(&pad_int(record.tipo_de_operacion as i64, 1)); // 45
    line.push_str(&pad_money(record.importe_adicionales, 12)); // 46
    line.push_str(&pad_money(record.importe_premios, 12)); // 47
    line.push_str(&pad_money(record.remuner_78805, 12)); // 48
    line.push_str(&pad_money(record.importe_imponible_6, 12)); // 49
    let horas_extras_ceil: i64 = record
        .cantidad_horas_extras
        .ceil()
        .to_string()
        .parse()
        .unwrap_or(0);
    line.push_str(&pad_int(horas_extras_ceil, 3)); // 50
    line.push_str(&pad_money(record.importe_no_remun, 12)); // 51
    line.push_str(&pad_money(record.importe_maternidad, 12)); // 52
    line.push_str(&pad_money(record.importe_rectificacion_remun, 9)); // 53
    line.push_str(&pad_money(record.importeimponible_9, 12)); // 54
    line.push_str(&pad_money(legajo.contrib_tarea_dif, 9)); // 55
    line.push_str("000"); // 56 literal
    line.push_str(&pad_int(record.seguro_vida_obligatorio as i64, 1)); // 57
    line.push_str(&pad_money(record.importe_sicoss_27430, 12)); // 58
    line.push_str(&pad_money(record.incremento_solidario, 12)); // 59
    line.push_str(&pad_money(Decimal::ZERO, 12)); // 60 placeholder

    line
}

/// Encodes every surviving record and writes them, CRLF-terminated and
/// Latin-1 encoded, to `<directory>/<basename>.txt`, creating `directory`
/// if it does not exist.
pub fn write_file(
    records: &[LegajoRecord],
    config: &Config,
    directory: &Path,
    basename: &str,
) -> Result<(), OutputWriteError> {
    std::fs::create_dir_all(directory)
        .map_err(|e| OutputWriteError::DirectoryCreation(directory.display().to_string(), e))?;

    let mut text = String::new();
    for record in records {
        text.push_str(&encode_record(record, config));
        text.push_str("\r\n");
    }

    let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode(&text);

    let path = directory.join(format!("{basename}.txt"));
    std::fs::write(&path, encoded)
        .map_err(|e| OutputWriteError::FileWrite(path.display().to_string(), e))
}
