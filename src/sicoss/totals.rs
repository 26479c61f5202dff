//! Totals (§4.5)
//!
//! Control totals over surviving employees, each rounded to the cent.
//! Addition is commutative, matching the "no ordering guarantee across
//! employees" rule in §5 — partitioned runs can sum their own subtotals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::LegajoRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub bruto: Decimal,
    pub imponible_1: Decimal,
    pub imponible_2: Decimal,
    pub imponible_4: Decimal,
    pub imponible_5: Decimal,
    pub imponible_6: Decimal,
    pub imponible_8: Decimal,
    pub imponible_9: Decimal,
}

impl Totals {
    pub fn from_records(records: &[LegajoRecord]) -> Self {
        let mut totals = records.iter().fold(Totals::default(), |mut acc, record| {
            acc.bruto += record.importe_bruto;
            acc.imponible_1 += record.importe_impon;
            acc.imponible_2 += record.importe_imponible_patronal;
            acc.imponible_4 += record.importe_imponible_4;
            acc.imponible_5 += record.importe_imponible_5;
            acc.imponible_6 += record.importe_imponible_6;
            acc.imponible_8 += record.remuner_78805;
            acc.imponible_9 += record.importeimponible_9;
            acc
        });
        totals.round();
        totals
    }

    fn round(&mut self) {
        self.bruto = self.bruto.round_dp(2);
        self.imponible_1 = self.imponible_1.round_dp(2);
        self.imponible_2 = self.imponible_2.round_dp(2);
        self.imponible_4 = self.imponible_4.round_dp(2);
        self.imponible_5 = self.imponible_5.round_dp(2);
        self.imponible_6 = self.imponible_6.round_dp(2);
        self.imponible_8 = self.imponible_8.round_dp(2);
        self.imponible_9 = self.imponible_9.round_dp(2);
    }

    /// Combines two partition subtotals (§5: "Totals are reduced via
    /// simple addition").
    pub fn combine(self, other: Totals) -> Totals {
        let mut combined = Totals {
            bruto: self.bruto + other.bruto,
            imponible_1: self.imponible_1 + other.imponible_1,
            imponible_2: self.imponible_2 + other.imponible_2,
            imponible_4: self.imponible_4 + other.imponible_4,
            imponible_5: self.imponible_5 + other.imponible_5,
            imponible_6: self.imponible_6 + other.imponible_6,
            imponible_8: self.imponible_8 + other.imponible_8,
            imponible_9: self.imponible_9 + other.imponible_9,
        };
        combined.round();
        combined
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::sicoss::model::{Legajo, ObraSocial};

    fn record_with_bruto(amount: Decimal) -> LegajoRecord {
        let legajo = Legajo {
            nro_legaj: 1,
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
        };
        let mut record = LegajoRecord::new(legajo, ObraSocial::default(), None);
        record.importe_bruto = amount;
        record
    }

    #[test]
    fn totals_sum_surviving_records() {
        let records = vec![record_with_bruto(dec!(100)), record_with_bruto(dec!(250.5))];
        let totals = Totals::from_records(&records);
        assert_eq!(totals.bruto, dec!(350.50));
    }

    #[test]
    fn empty_input_yields_zero_totals() {
        let totals = Totals::from_records(&[]);
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn combine_matches_summing_all_at_once() {
        let a = Totals::from_records(&[record_with_bruto(dec!(100))]);
        let b = Totals::from_records(&[record_with_bruto(dec!(200))]);
        let combined = a.combine(b);
        let whole = Totals::from_records(&[record_with_bruto(dec!(100)), record_with_bruto(dec!(200))]);
        assert_eq!(combined, whole);
    }
}
