//! Declared layout of the consolidated proforma workbook.
//!
//! Column headers are literal strings matched exactly against the sheet,
//! diacritics and internal spacing included. Unknown sheet columns are
//! ignored; a declared column absent from the sheet is simply skipped and
//! the features that need it degrade with a message.

/// Sheet holding the master dataset.
pub const SHEET_MASTER: &str = "master_services";

// -- Date columns --
pub const COL_DATE: &str = "DATA";
pub const COL_INVOICE_DATE: &str = "DATA N.F.";
pub const COL_MONTH_DATE: &str = "MES_CONTABIL_DT";

// -- Categorical columns --
pub const COL_MONTH_LABEL: &str = "MES_CONTABIL";
pub const COL_PROFORMA: &str = "PROFORMA";
pub const COL_CLIENT: &str = "CLIENTE";
pub const COL_STATUS: &str = "STATUS";
pub const COL_BU: &str = "BU";
pub const COL_AREA: &str = "AREA";

// -- Numeric columns --
// The gross BRL header really does carry a double space before the dash.
pub const COL_GROSS_BRL: &str = "VALOR BRUTO BRL  - PF";
pub const COL_GROSS_USD: &str = "VALOR BRUTO USD";
pub const COL_INVOICED_BRL: &str = "VALOR FATURADO BRL";
pub const COL_NET_BRL: &str = "VALOR LÍQUIDO BRL";
pub const COL_TAXES: &str = "IMPOSTOS";
pub const COL_PERCENT: &str = "%";

/// How a declared column is coerced by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Date,
    Numeric,
    Text,
}

/// Every declared column in display order, with its coercion role.
pub const DECLARED_COLUMNS: &[(&str, ColumnRole)] = &[
    (COL_DATE, ColumnRole::Date),
    (COL_INVOICE_DATE, ColumnRole::Date),
    (COL_MONTH_LABEL, ColumnRole::Text),
    (COL_MONTH_DATE, ColumnRole::Date),
    (COL_PROFORMA, ColumnRole::Text),
    (COL_CLIENT, ColumnRole::Text),
    (COL_STATUS, ColumnRole::Text),
    (COL_BU, ColumnRole::Text),
    (COL_AREA, ColumnRole::Text),
    (COL_GROSS_BRL, ColumnRole::Numeric),
    (COL_GROSS_USD, ColumnRole::Numeric),
    (COL_INVOICED_BRL, ColumnRole::Numeric),
    (COL_NET_BRL, ColumnRole::Numeric),
    (COL_TAXES, ColumnRole::Numeric),
    (COL_PERCENT, ColumnRole::Numeric),
];

/// The sidebar filter columns with their display labels, in sidebar order.
pub const FILTER_COLUMNS: &[(&str, &str)] = &[
    (COL_AREA, "Área"),
    (COL_STATUS, "Status"),
    (COL_MONTH_LABEL, "Mês contábil"),
    (COL_BU, "BU"),
    (COL_CLIENT, "Cliente"),
];

/// Role of a declared column, or `None` for an unknown header.
pub fn role_of(column: &str) -> Option<ColumnRole> {
    DECLARED_COLUMNS
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, role)| *role)
}
