//! DatabaseWriter (§4.7/§6.3)
//!
//! Maps surviving records onto `suc.afip_mapuche_sicoss` and bulk-inserts
//! them in chunks, grounded in `original_source/processors/
//! database_saver.py`'s `SicossDatabaseSaver` (`campo_mapping`, chunked
//! `executemany`). Uses `sqlx::QueryBuilder` for the chunked multi-row
//! INSERT instead of a string-built statement.

use rust_decimal::Decimal;
use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::watch;

use super::config::Config;
use super::error::OutputWriteError;
use super::model::LegajoRecord;

/// Maximum rows per INSERT statement (§4.7).
pub const CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Add rows to whatever already exists for the period.
    Append,
    /// Delete existing rows for the period before inserting.
    Replace,
}

fn validate_lengths(record: &LegajoRecord) -> Result<(), OutputWriteError> {
    let legajo = &record.legajo;
    if legajo.cuit.chars().count() > 11 {
        return Err(OutputWriteError::ConstraintViolation(
            legajo.nro_legaj,
            format!("cuil exceeds 11 characters: {:?}", legajo.cuit),
        ));
    }
    if legajo.apyno.chars().count() > 40 {
        return Err(OutputWriteError::ConstraintViolation(
            legajo.nro_legaj,
            format!("apnom exceeds 40 characters: {:?}", legajo.apyno),
        ));
    }
    if record.obra_social.codigo_os.chars().count() != 6 {
        return Err(OutputWriteError::ConstraintViolation(
            legajo.nro_legaj,
            format!("cod_os must be exactly 6 characters: {:?}", record.obra_social.codigo_os),
        ));
    }
    if legajo.provincialocalidad.chars().count() > 50 {
        return Err(OutputWriteError::ConstraintViolation(
            legajo.nro_legaj,
            format!("prov exceeds 50 characters: {:?}", legajo.provincialocalidad),
        ));
    }
    Ok(())
}

/// Validates every record against the NOT-NULL/length/type constraints of
/// `suc.afip_mapuche_sicoss` before any row is sent to the database.
pub fn validate_all(records: &[LegajoRecord]) -> Result<(), OutputWriteError> {
    for record in records {
        validate_lengths(record)?;
    }
    Ok(())
}

/// Creates the `suc` schema and `afip_mapuche_sicoss` table if they do not
/// already exist (§4.7: "the writer ensures the schema/table exist; it does
/// not create indices"). Column list matches [`COLUMNS`] plus the primary
/// key; types follow §6.3 (`char`/`varchar` for codes and names, `numeric`
/// for money, `int`/`bool` for status columns).
pub async fn ensure_schema(pool: &PgPool) -> Result<(), OutputWriteError> {
    sqlx::query("CREATE SCHEMA IF NOT EXISTS suc")
        .execute(pool)
        .await
        .map_err(|e| OutputWriteError::DatabaseChunk(0, e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS suc.afip_mapuche_sicoss (
            id BIGSERIAL PRIMARY KEY,
            periodo_fiscal CHAR(6) NOT NULL,
            cuil VARCHAR(11) NOT NULL,
            apnom VARCHAR(40) NOT NULL,
            conyuge BOOLEAN NOT NULL,
            cant_hijos INT NOT NULL,
            cod_situacion INT NOT NULL,
            cod_cond INT NOT NULL,
            cod_act INT NOT NULL,
            cod_zona INT NOT NULL,
            porc_aporte NUMERIC(5,2) NOT NULL,
            cod_mod_cont INT NOT NULL,
            cod_os CHAR(6) NOT NULL,
            cant_adh INT NOT NULL,
            rem_total NUMERIC(12,2) NOT NULL,
            rem_impo1 NUMERIC(12,2) NOT NULL,
            rem_impo2 NUMERIC(12,2) NOT NULL,
            rem_impo4 NUMERIC(12,2) NOT NULL,
            rem_impo5 NUMERIC(12,2) NOT NULL,
            rem_impo6 NUMERIC(12,2) NOT NULL,
            imponible_8 NUMERIC(12,2) NOT NULL,
            rem_imp9 NUMERIC(12,2) NOT NULL,
            sac NUMERIC(12,2) NOT NULL,
            horas_extras NUMERIC(12,2) NOT NULL,
            zona_desfav NUMERIC(12,2) NOT NULL,
            vacaciones NUMERIC(12,2) NOT NULL,
            sueldo_adicc NUMERIC(12,2) NOT NULL,
            adicionales NUMERIC(12,2) NOT NULL,
            premios NUMERIC(12,2) NOT NULL,
            cpto_no_remun NUMERIC(12,2) NOT NULL,
            maternidad NUMERIC(12,2) NOT NULL,
            rectificacion_remun NUMERIC(9,2) NOT NULL,
            asig_fam_pag NUMERIC(9,2) NOT NULL,
            aporte_vol NUMERIC(9,2) NOT NULL,
            imp_adic_os NUMERIC(9,2) NOT NULL,
            aporte_adic_os NUMERIC(9,2) NOT NULL,
            ley NUMERIC(12,2) NOT NULL,
            incsalarial NUMERIC(12,2) NOT NULL,
            sit_rev1 INT NOT NULL,
            dia_ini_sit_rev1 INT NOT NULL,
            sit_rev2 INT NOT NULL,
            dia_ini_sit_rev2 INT NOT NULL,
            sit_rev3 INT NOT NULL,
            dia_ini_sit_rev3 INT NOT NULL,
            cant_dias_trab INT NOT NULL,
            convencionado VARCHAR(1),
            tipo_oper INT NOT NULL,
            hstrab BOOLEAN NOT NULL,
            seguro BOOLEAN NOT NULL,
            regimen VARCHAR(1) NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| OutputWriteError::DatabaseChunk(0, e))?;

    Ok(())
}

/// Deletes any rows already present for `periodo_fiscal` (used by
/// [`WriteMode::Replace`]).
async fn clear_period(pool: &PgPool, periodo_fiscal: &str) -> Result<(), OutputWriteError> {
    sqlx::query("DELETE FROM suc.afip_mapuche_sicoss WHERE periodo_fiscal = $1")
        .bind(periodo_fiscal)
        .execute(pool)
        .await
        .map_err(|e| OutputWriteError::DatabaseChunk(0, e))?;
    Ok(())
}

fn bind_row<'a, Sep>(builder: &mut Separated<'_, 'a, Postgres, Sep>, record: &'a LegajoRecord, periodo_fiscal: &'a str)
where
    Sep: std::fmt::Display,
{
    let legajo = &record.legajo;
    builder.push_bind(periodo_fiscal);
    builder.push_bind(&legajo.cuit);
    builder.push_bind(&legajo.apyno);
    builder.push_bind(legajo.conyugue_flag() != 0);
    builder.push_bind(legajo.hijos);
    builder.push_bind(legajo.codigosituacion);
    builder.push_bind(legajo.codigocondicion);
    builder.push_bind(record.tipo_de_actividad);
    builder.push_bind(legajo.codigozona);
    builder.push_bind(legajo.aporteadicional);
    builder.push_bind(legajo.codigocontratacion);
    builder.push_bind(&record.obra_social.codigo_os);
    builder.push_bind(legajo.adherentes);
    builder.push_bind(record.importe_bruto);
    builder.push_bind(record.importe_impon);
    builder.push_bind(record.importe_imponible_patronal);
    builder.push_bind(record.importe_imponible_4);
    builder.push_bind(record.importe_imponible_5);
    builder.push_bind(record.importe_imponible_6);
    builder.push_bind(record.remuner_78805);
    builder.push_bind(record.importeimponible_9);
    builder.push_bind(record.importe_sac);
    builder.push_bind(record.importe_horas_extras);
    builder.push_bind(record.importe_zona_desfavorable);
    builder.push_bind(record.importe_vacaciones);
    builder.push_bind(record.importe_sueldo_mas_adicionales);
    builder.push_bind(record.importe_adicionales);
    builder.push_bind(record.importe_premios);
    builder.push_bind(record.importe_no_remun);
    builder.push_bind(record.importe_maternidad);
    builder.push_bind(record.importe_rectificacion_remun);
    builder.push_bind(record.asignaciones_fliares_pagadas);
    builder.push_bind(record.importe_volun);
    builder.push_bind(record.importe_adici);
    builder.push_bind(record.aporte_adicional_obra_social);
    builder.push_bind(record.importe_sicoss_27430);
    builder.push_bind(record.incremento_solidario);
    builder.push_bind(legajo.codigorevista1);
    builder.push_bind(legajo.fecharevista1);
    builder.push_bind(legajo.codigorevista2);
    builder.push_bind(legajo.fecharevista2);
    builder.push_bind(legajo.codigorevista3);
    builder.push_bind(legajo.fecharevista3);
    builder.push_bind(legajo.dias_trabajados);
    builder.push_bind(legajo.trabajadorconvencionado.map(|c| c.to_string()));
    builder.push_bind(record.tipo_de_operacion);
    builder.push_bind(record.cantidad_horas_extras.ceil() != Decimal::ZERO);
    builder.push_bind(record.seguro_vida_obligatorio);
    builder.push_bind(&legajo.regimen);
}

const COLUMNS: &str = "periodo_fiscal, cuil, apnom, conyuge, cant_hijos, cod_situacion, cod_cond, \
cod_act, cod_zona, porc_aporte, cod_mod_cont, cod_os, cant_adh, rem_total, rem_impo1, rem_impo2, \
rem_impo4, rem_impo5, rem_impo6, imponible_8, rem_imp9, sac, horas_extras, zona_desfav, vacaciones, \
sueldo_adicc, adicionales, premios, cpto_no_remun, maternidad, rectificacion_remun, asig_fam_pag, \
aporte_vol, imp_adic_os, aporte_adic_os, ley, incsalarial, sit_rev1, dia_ini_sit_rev1, sit_rev2, \
dia_ini_sit_rev2, sit_rev3, dia_ini_sit_rev3, cant_dias_trab, convencionado, tipo_oper, hstrab, \
seguro, regimen";

/// Inserts every surviving record for `periodo_fiscal` (a 6-character
/// `YYYYMM` string) in chunks of up to [`CHUNK_SIZE`] rows, returning the
/// total number of rows written. Checked against `cancel` between chunks.
pub async fn write(
    pool: &PgPool,
    records: &[LegajoRecord],
    _config: &Config,
    periodo_fiscal: &str,
    mode: WriteMode,
    cancel: &watch::Receiver<bool>,
) -> Result<usize, OutputWriteError> {
    validate_all(records)?;
    ensure_schema(pool).await?;

    if mode == WriteMode::Replace {
        clear_period(pool, periodo_fiscal).await?;
    }

    let mut written = 0usize;
    for (chunk_index, chunk) in records.chunks(CHUNK_SIZE).enumerate() {
        if *cancel.borrow() {
            break;
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO suc.afip_mapuche_sicoss ({COLUMNS}) "));
        builder.push_values(chunk, |mut row, record| {
            bind_row(&mut row, record, periodo_fiscal);
        });

        builder
            .build()
            .execute(pool)
            .await
            .map_err(|e| OutputWriteError::DatabaseChunk(chunk_index * CHUNK_SIZE, e))?;

        written += chunk.len();
    }

    Ok(written)
}
