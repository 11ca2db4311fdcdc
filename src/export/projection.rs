use crate::core::{FatturaError, FieldKind, FieldSpec, Invoice, Section};

use super::format::{compose_address, export_file_name, format_amount};
use super::{DOCUMENT_TITLE, ExportDocument, ExportEntry, ExportSection, ExportTable};

const LINE_TABLE_TITLE: &str = "Dettaglio Voci";
const LINE_COLUMNS: [&str; 5] = ["Descrizione", "Q.tà", "Prezzo", "IVA %", "Totale"];
const SUMMARY_TABLE_TITLE: &str = "Riepilogo IVA";
const SUMMARY_COLUMNS: [&str; 3] = ["Aliquota IVA", "Imponibile", "Imposta"];

/// Project an invoice into the document handed to a renderer.
///
/// Pure and deterministic: sections and their entries follow the field
/// registry, tables follow document order.
pub fn project(invoice: &Invoice) -> ExportDocument {
    let sections = Section::ALL
        .into_iter()
        .map(|section| ExportSection {
            title: section.title().to_string(),
            entries: section
                .fields()
                .filter_map(|spec| project_field(invoice, spec))
                .collect(),
        })
        .collect();

    let lines = ExportTable {
        title: LINE_TABLE_TITLE.to_string(),
        headers: LINE_COLUMNS.iter().map(|h| h.to_string()).collect(),
        rows: invoice
            .lines
            .iter()
            .map(|line| {
                vec![
                    line.description.clone(),
                    line.quantity.clone(),
                    line.unit_price.clone(),
                    line.vat_rate.clone(),
                    line.total_price.clone(),
                ]
            })
            .collect(),
    };

    let summary = ExportTable {
        title: SUMMARY_TABLE_TITLE.to_string(),
        headers: SUMMARY_COLUMNS.iter().map(|h| h.to_string()).collect(),
        rows: invoice
            .summary
            .iter()
            .map(|row| {
                vec![
                    row.vat_rate.clone(),
                    row.taxable_amount.clone(),
                    row.vat_amount.clone(),
                ]
            })
            .collect(),
    };

    ExportDocument {
        title: DOCUMENT_TITLE.to_string(),
        file_name: export_file_name(&invoice.header.number),
        sections,
        lines,
        summary,
    }
}

/// Like [`project`], failing with [`FatturaError::NoDataToExport`] when
/// there is no invoice.
pub fn try_project(invoice: Option<&Invoice>) -> Result<ExportDocument, FatturaError> {
    invoice.map(project).ok_or(FatturaError::NoDataToExport)
}

fn project_field(invoice: &Invoice, spec: &FieldSpec) -> Option<ExportEntry> {
    let raw = invoice.field(spec.path);
    let value = match spec.kind {
        FieldKind::Text => raw.to_string(),
        FieldKind::Amount => format_amount(raw, &invoice.currency),
        FieldKind::Address => invoice
            .party_of(spec.path)
            .map(compose_address)
            .unwrap_or_else(|| raw.to_string()),
        FieldKind::AddressPart | FieldKind::Hidden => return None,
    };
    Some(ExportEntry {
        label: spec.label.to_string(),
        value,
    })
}
