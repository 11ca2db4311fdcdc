use crate::core::Party;

/// Symbol used when the invoice declares no currency.
pub const FALLBACK_CURRENCY: &str = "€";

/// File name used when the invoice has no number.
pub const DEFAULT_FILE_NAME: &str = "Invoice.pdf";

/// Raw amount followed by the currency code, e.g. `"123.45 EUR"`.
///
/// An empty amount stays empty so the renderer can show its placeholder.
pub fn format_amount(amount: &str, currency: &str) -> String {
    if amount.is_empty() {
        return String::new();
    }
    let currency = if currency.is_empty() {
        FALLBACK_CURRENCY
    } else {
        currency
    };
    format!("{amount} {currency}")
}

/// Single address line: `street - zip city (province)`, every part optional.
pub fn compose_address(party: &Party) -> String {
    let mut line = party.address.clone();
    if !party.zip.is_empty() {
        line.push_str(" - ");
        line.push_str(&party.zip);
    }
    if !party.city.is_empty() {
        line.push(' ');
        line.push_str(&party.city);
    }
    if !party.province.is_empty() {
        line.push_str(" (");
        line.push_str(&party.province);
        line.push(')');
    }
    line
}

/// `Invoice_<number>.pdf` with path-unsafe characters replaced by `_`.
pub fn export_file_name(invoice_number: &str) -> String {
    if invoice_number.is_empty() {
        return DEFAULT_FILE_NAME.to_string();
    }
    let safe: String = invoice_number
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '_',
            other => other,
        })
        .collect();
    format!("Invoice_{safe}.pdf")
}
