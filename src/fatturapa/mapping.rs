use crate::core::{Invoice, InvoiceHeader, InvoiceLine, Party, PaymentInfo, SummaryLine};

use super::tree::XmlElement;

const GENERAL_DATA: &str = "DatiGeneraliDocumento";
const TRANSMISSION_DATA: &str = "DatiTrasmissione";
const SUPPLIER: &str = "CedentePrestatore";
const CUSTOMER: &str = "CessionarioCommittente";
const PAYMENT_DETAIL: [&str; 2] = ["DatiPagamento", "DettaglioPagamento"];
const LINE: &str = "DettaglioLinee";
const SUMMARY: &str = "DatiRiepilogo";

/// Trimmed text at `path` below `ctx`, or `""` when any segment is missing.
fn text_at(ctx: Option<&XmlElement>, path: &[&str]) -> String {
    ctx.and_then(|el| el.find_path(path))
        .map(XmlElement::text)
        .unwrap_or_default()
}

/// Map a parsed FatturaPA document into an [`Invoice`].
///
/// Never fails: every absent node becomes an empty string and every absent
/// repeated group an empty vector.
pub fn map_document(document: &XmlElement) -> Invoice {
    let root = Some(document);
    let currency = text_at(root, &[GENERAL_DATA, "Divisa"]);

    let header = InvoiceHeader {
        number: text_at(root, &[GENERAL_DATA, "Numero"]),
        date: text_at(root, &[GENERAL_DATA, "Data"]),
        document_type: text_at(root, &[GENERAL_DATA, "TipoDocumento"]),
        document_type_version: text_at(root, &[TRANSMISSION_DATA, "FormatoTrasmissione"]),
        progressive: text_at(root, &[TRANSMISSION_DATA, "ProgressivoInvio"]),
        currency: currency.clone(),
    };

    let payment_detail = document.find_path(&PAYMENT_DETAIL);
    let payment = PaymentInfo {
        method: text_at(payment_detail, &["ModalitaPagamento"]),
        due_date: text_at(payment_detail, &["DataScadenzaPagamento"]),
        amount: text_at(payment_detail, &["ImportoPagamento"]),
        iban: text_at(payment_detail, &["IBAN"]),
    };

    Invoice {
        header,
        supplier: map_party(document.find(SUPPLIER), true),
        customer: map_party(document.find(CUSTOMER), false),
        payment,
        lines: document.find_all(LINE).into_iter().map(map_line).collect(),
        summary: document
            .find_all(SUMMARY)
            .into_iter()
            .map(map_summary)
            .collect(),
        total_amount: text_at(root, &[GENERAL_DATA, "ImportoTotaleDocumento"]),
        currency,
    }
}

fn map_party(base: Option<&XmlElement>, with_regime: bool) -> Party {
    let mut name = text_at(base, &["Anagrafica", "Denominazione"]);
    if name.is_empty() {
        // Natural persons carry Nome/Cognome instead of Denominazione
        let given = text_at(base, &["Anagrafica", "Nome"]);
        let family = text_at(base, &["Anagrafica", "Cognome"]);
        name = format!("{given} {family}").trim().to_string();
    }

    let mut address = text_at(base, &["Sede", "Indirizzo"]);
    let street_number = text_at(base, &["Sede", "NumeroCivico"]);
    if !street_number.is_empty() {
        if !address.is_empty() {
            address.push(' ');
        }
        address.push_str(&street_number);
    }

    Party {
        name,
        vat_number: text_at(base, &["IdFiscaleIVA", "IdCodice"]),
        tax_code: text_at(base, &["CodiceFiscale"]),
        address,
        zip: text_at(base, &["Sede", "CAP"]),
        city: text_at(base, &["Sede", "Comune"]),
        province: text_at(base, &["Sede", "Provincia"]),
        country: text_at(base, &["Sede", "Nazione"]),
        fiscal_regime: if with_regime {
            text_at(base, &["RegimeFiscale"])
        } else {
            String::new()
        },
    }
}

fn map_line(item: &XmlElement) -> InvoiceLine {
    let item = Some(item);
    InvoiceLine {
        line_number: text_at(item, &["NumeroLinea"]),
        description: text_at(item, &["Descrizione"]),
        quantity: text_at(item, &["Quantita"]),
        unit: text_at(item, &["UnitaMisura"]),
        unit_price: text_at(item, &["PrezzoUnitario"]),
        total_price: text_at(item, &["PrezzoTotale"]),
        vat_rate: text_at(item, &["AliquotaIVA"]),
    }
}

fn map_summary(item: &XmlElement) -> SummaryLine {
    let item = Some(item);
    SummaryLine {
        taxable_amount: text_at(item, &["ImponibileImporto"]),
        vat_amount: text_at(item, &["Imposta"]),
        vat_rate: text_at(item, &["AliquotaIVA"]),
    }
}
