//! Export projection of mapped invoices.

use fattura::core::*;
use fattura::export::{self, DEFAULT_FILE_NAME, ExportDocument, project, try_project};
use fattura::fatturapa::map_invoice;

const SAMPLE: &str = include_str!("fixtures/IT01234567890_FPR12.xml");

fn sample() -> Invoice {
    map_invoice(SAMPLE).unwrap()
}

fn value<'a>(document: &'a ExportDocument, section: &str, label: &str) -> &'a str {
    document
        .sections
        .iter()
        .find(|s| s.title == section)
        .and_then(|s| s.entries.iter().find(|e| e.label == label))
        .map(|e| e.value.as_str())
        .unwrap_or_else(|| panic!("{section} / {label} missing"))
}

#[test]
fn preview_of_sample_invoice() {
    let document = project(&sample());
    insta::assert_snapshot!(document.to_string(), @r"
    FATTURA ELETTRONICA

    Intestazione Fattura
      Numero Fattura: 2024/17
      Data Fattura: 2024-03-15
      Tipo Documento: TD01
      Formato Trasmissione: FPR12
      Progressivo Invio: 00017
      Valuta: EUR
      Importo Totale: 305.00 EUR

    Dati Fornitore
      Denominazione: Alfa Servizi S.r.l.
      Partita IVA: 01234567890
      Codice Fiscale: 01234567890
      Regime Fiscale: RF01
      Indirizzo: Via Roma 1 - 00100 Roma (RM)
      Nazione: IT

    Dati Cliente
      Denominazione: Beta Commerce S.p.A.
      Partita IVA: 09876543210
      Codice Fiscale: N/A
      Indirizzo: Corso Buenos Aires 10 - 20124 Milano (MI)
      Nazione: IT

    Dati Pagamento
      Modalità: MP05
      Data Scadenza: 2024-04-14
      Importo: 305.00 EUR
      IBAN: IT60X0542811101000000123456

    Dettaglio Voci
      Descrizione | Q.tà | Prezzo | IVA % | Totale
      Consulenza tecnica | 2.00 | 100.00 | 22.00 | 200.00
      Trasferta & rimborso spese | 1.00 | 50.00 | 22.00 | 50.00

    Riepilogo IVA
      Aliquota IVA | Imponibile | Imposta
      22.00 | 250.00 | 55.00
    ");
}

#[test]
fn tables_keep_document_order_and_raw_values() {
    let document = project(&sample());

    assert_eq!(document.lines.rows.len(), 2);
    assert_eq!(
        document.lines.rows[0],
        ["Consulenza tecnica", "2.00", "100.00", "22.00", "200.00"]
    );
    assert_eq!(document.summary.rows, vec![vec!["22.00", "250.00", "55.00"]]);
}

#[test]
fn empty_invoice_projects_placeholders() {
    let document = project(&Invoice::default());

    assert_eq!(document.file_name, DEFAULT_FILE_NAME);
    assert_eq!(value(&document, "Intestazione Fattura", "Importo Totale"), "");
    assert_eq!(value(&document, "Dati Cliente", "Indirizzo"), "");
    assert!(document.lines.is_empty());
    assert!(document.summary.is_empty());

    let preview = document.to_string();
    assert!(preview.contains("  Numero Fattura: N/A"));
    assert!(!preview.contains("Dettaglio Voci"));
}

#[test]
fn amount_without_currency_uses_symbol() {
    let mut invoice = sample();
    invoice.currency.clear();
    let document = project(&invoice);
    assert_eq!(value(&document, "Dati Pagamento", "Importo"), "305.00 €");
}

#[test]
fn file_name_is_sanitized() {
    let mut invoice = sample();
    invoice.header.number = "A:1/2*3".into();
    assert_eq!(project(&invoice).file_name, "Invoice_A_1_2_3.pdf");
}

#[test]
fn edited_fields_are_projected() {
    let mut invoice = sample();
    invoice.customer.name = "Gamma S.r.l.".into();
    invoice.customer.province = String::new();
    invoice.payment.iban = String::new();

    let document = project(&invoice);
    assert_eq!(value(&document, "Dati Cliente", "Denominazione"), "Gamma S.r.l.");
    assert_eq!(
        value(&document, "Dati Cliente", "Indirizzo"),
        "Corso Buenos Aires 10 - 20124 Milano"
    );
    assert_eq!(value(&document, "Dati Pagamento", "IBAN"), "");
}

#[test]
fn try_project_requires_an_invoice() {
    assert_eq!(try_project(None), Err(FatturaError::NoDataToExport));
    assert_eq!(try_project(Some(&sample())), Ok(project(&sample())));
}

#[test]
fn projection_is_pure() {
    let invoice = sample();
    let before = invoice.clone();
    assert_eq!(export::project(&invoice), export::project(&invoice));
    assert_eq!(invoice, before);
}

#[test]
fn invoice_serializes_in_camel_case() {
    let json = serde_json::to_value(sample()).unwrap();
    assert_eq!(json["header"]["documentTypeVersion"], "FPR12");
    assert_eq!(json["totalAmount"], "305.00");
    assert_eq!(json["payment"]["dueDate"], "2024-04-14");
    assert_eq!(json["lines"][0]["unitPrice"], "100.00");
    assert_eq!(json["summary"][0]["taxableAmount"], "250.00");
}

#[cfg(feature = "json")]
#[test]
fn export_document_to_json() {
    let document = project(&sample());
    let json = document.to_json().unwrap();
    let parsed: ExportDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, document);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["fileName"], "Invoice_2024_17.pdf");
    assert_eq!(value["sections"][0]["title"], "Intestazione Fattura");
}
