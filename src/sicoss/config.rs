//! SICOSS run configuration
//!
//! Immutable per-run settings (§2.1, §6.4). Obtained from a parameter table
//! by an external configuration-loading layer (out of scope, §1); this
//! module only defines the typed surface and its validation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Immutable configuration for a single SICOSS run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tope_jubilatorio_patronal: Decimal,
    pub tope_jubilatorio_personal: Decimal,
    pub tope_otros_aportes_personales: Decimal,
    pub trunca_tope: bool,

    pub include_licenses: bool,
    pub include_retroactive: bool,
    pub family_allowance_into_gross: bool,
    pub art_con_tope: bool,
    pub non_remun_concepts_in_art: bool,
    pub informar_becarios: bool,

    pub porc_aporte_adicional_jubilacion: Decimal,
    pub trabajador_convencionado_default: char,

    /// Concept code whose amount resolves into `AporteAdicionalObraSocial`
    /// outside the group-code table (see SPEC_FULL.md §4.1 ADDED).
    pub codigo_os_aporte_adicional: Option<i32>,
    /// Concept code whose amount resolves into `IMPORTE_VOLUN`.
    pub codigo_concepto_voluntario: Option<i32>,
}

impl Config {
    /// SAC ceiling is half of the matching annual ceiling (§2.1).
    pub fn tope_sac_jubilatorio_patr(&self) -> Decimal {
        self.tope_jubilatorio_patronal / dec!(2)
    }

    pub fn tope_sac_jubilatorio_pers(&self) -> Decimal {
        self.tope_jubilatorio_personal / dec!(2)
    }

    pub fn tope_sac_otros_aportes(&self) -> Decimal {
        self.tope_otros_aportes_personales / dec!(2)
    }

    /// Validates the ceilings and percentage are well-formed before a run
    /// starts (§7, `ConfigurationError` is fatal before the run starts).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tope_jubilatorio_patronal < Decimal::ZERO {
            return Err(ConfigError::InvalidCeiling("tope_jubilatorio_patronal"));
        }
        if self.tope_jubilatorio_personal < Decimal::ZERO {
            return Err(ConfigError::InvalidCeiling("tope_jubilatorio_personal"));
        }
        if self.tope_otros_aportes_personales < Decimal::ZERO {
            return Err(ConfigError::InvalidCeiling("tope_otros_aportes_personales"));
        }
        if self.porc_aporte_adicional_jubilacion < Decimal::ZERO
            || self.porc_aporte_adicional_jubilacion > dec!(200)
        {
            return Err(ConfigError::InvalidPercentage(
                self.porc_aporte_adicional_jubilacion,
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tope_jubilatorio_patronal: dec!(800_000),
            tope_jubilatorio_personal: dec!(600_000),
            tope_otros_aportes_personales: dec!(700_000),
            trunca_tope: true,
            include_licenses: false,
            include_retroactive: false,
            family_allowance_into_gross: false,
            art_con_tope: true,
            non_remun_concepts_in_art: false,
            informar_becarios: false,
            porc_aporte_adicional_jubilacion: dec!(100),
            trabajador_convencionado_default: 'S',
            codigo_os_aporte_adicional: None,
            codigo_concepto_voluntario: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_percentage() {
        let mut config = Config::default();
        config.porc_aporte_adicional_jubilacion = dec!(250);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn rejects_negative_ceiling() {
        let mut config = Config::default();
        config.tope_jubilatorio_patronal = dec!(-1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCeiling(_))
        ));
    }

    #[test]
    fn derived_sac_ceilings_are_half() {
        let config = Config::default();
        assert_eq!(
            config.tope_sac_jubilatorio_patr(),
            config.tope_jubilatorio_patronal / dec!(2)
        );
        assert_eq!(
            config.tope_sac_jubilatorio_pers(),
            config.tope_jubilatorio_personal / dec!(2)
        );
    }
}
