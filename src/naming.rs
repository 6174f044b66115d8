//! Output file names.

use chrono::{Datelike, NaiveDate};

/// Lower-case Portuguese month names, January first.
pub const PT_BR_MONTHS: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

/// Default file name of the sales report.
pub const SALES_REPORT_FILE: &str = "Relatorio_Vendas_Numeracoes.xlsx";

/// Default folder, under the output directory, that stock reports are saved to.
pub const STOCK_REPORT_DIR: &str = "PLANILHAS DE ESTOQUE";

/// Name of `date`'s month in `months` (January first).
pub fn month_name(date: NaiveDate, months: &[&'static str; 12]) -> &'static str {
    months[date.month0() as usize]
}

/// `PLANILHA_ESTOQUE_<brand_tag>_<day> de <month>.xlsx` for `date`.
pub fn stock_report_file_name(brand_tag: &str, date: NaiveDate, months: &[&'static str; 12]) -> String {
    format!(
        "PLANILHA_ESTOQUE_{}_{} de {}.xlsx",
        brand_tag,
        date.day(),
        month_name(date, months)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stock_file_name() {
        assert_eq!(
            stock_report_file_name("URB_LAB", date(2025, 3, 7), &PT_BR_MONTHS),
            "PLANILHA_ESTOQUE_URB_LAB_7 de março.xlsx"
        );
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_name(date(2025, 1, 31), &PT_BR_MONTHS), "janeiro");
        assert_eq!(month_name(date(2025, 12, 1), &PT_BR_MONTHS), "dezembro");
    }

    #[test]
    fn test_custom_month_table() {
        const EN: [&str; 12] = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        assert_eq!(
            stock_report_file_name("X", date(2026, 10, 18), &EN),
            "PLANILHA_ESTOQUE_X_18 de October.xlsx"
        );
    }
}
