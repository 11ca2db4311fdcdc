use serde::{Deserialize, Serialize};

use super::registry::FieldPath;

/// The invoice aggregate as extracted from a FatturaPA document.
///
/// Every scalar is kept as the trimmed text of its source node. Absent nodes
/// are empty strings, absent repeated groups are empty vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub header: InvoiceHeader,
    /// CedentePrestatore.
    pub supplier: Party,
    /// CessionarioCommittente.
    pub customer: Party,
    pub payment: PaymentInfo,
    /// DettaglioLinee, in document order.
    pub lines: Vec<InvoiceLine>,
    /// DatiRiepilogo, in document order.
    pub summary: Vec<SummaryLine>,
    /// ImportoTotaleDocumento.
    pub total_amount: String,
    /// Divisa, used when formatting monetary amounts.
    pub currency: String,
}

/// Document identification. Never user-editable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceHeader {
    /// Numero.
    pub number: String,
    /// Data.
    pub date: String,
    /// TipoDocumento (e.g. "TD01").
    pub document_type: String,
    /// FormatoTrasmissione (e.g. "FPR12").
    pub document_type_version: String,
    /// ProgressivoInvio.
    pub progressive: String,
    /// Divisa, as declared in the document header.
    pub currency: String,
}

/// Supplier or customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    /// Partita IVA (IdCodice, without country prefix).
    pub vat_number: String,
    /// Codice fiscale.
    pub tax_code: String,
    /// Street and, when present, street number.
    pub address: String,
    pub zip: String,
    pub city: String,
    /// Two-letter province code.
    pub province: String,
    pub country: String,
    /// RegimeFiscale; only ever filled for the supplier.
    pub fiscal_regime: String,
}

/// First DettaglioPagamento of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    /// ModalitaPagamento (e.g. "MP05").
    pub method: String,
    pub due_date: String,
    pub amount: String,
    pub iban: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub line_number: String,
    pub description: String,
    pub quantity: String,
    pub unit: String,
    pub unit_price: String,
    pub total_price: String,
    pub vat_rate: String,
}

/// One VAT-rate bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub taxable_amount: String,
    pub vat_amount: String,
    pub vat_rate: String,
}

impl Invoice {
    /// Read the scalar leaf named by `path`.
    pub fn field(&self, path: FieldPath) -> &str {
        match path {
            FieldPath::HeaderNumber => &self.header.number,
            FieldPath::HeaderDate => &self.header.date,
            FieldPath::HeaderDocumentType => &self.header.document_type,
            FieldPath::HeaderDocumentTypeVersion => &self.header.document_type_version,
            FieldPath::HeaderProgressive => &self.header.progressive,
            FieldPath::HeaderCurrency => &self.header.currency,
            FieldPath::Currency => &self.currency,
            FieldPath::TotalAmount => &self.total_amount,
            FieldPath::SupplierName => &self.supplier.name,
            FieldPath::SupplierVatNumber => &self.supplier.vat_number,
            FieldPath::SupplierTaxCode => &self.supplier.tax_code,
            FieldPath::SupplierFiscalRegime => &self.supplier.fiscal_regime,
            FieldPath::SupplierAddress => &self.supplier.address,
            FieldPath::SupplierZip => &self.supplier.zip,
            FieldPath::SupplierCity => &self.supplier.city,
            FieldPath::SupplierProvince => &self.supplier.province,
            FieldPath::SupplierCountry => &self.supplier.country,
            FieldPath::CustomerName => &self.customer.name,
            FieldPath::CustomerVatNumber => &self.customer.vat_number,
            FieldPath::CustomerTaxCode => &self.customer.tax_code,
            FieldPath::CustomerAddress => &self.customer.address,
            FieldPath::CustomerZip => &self.customer.zip,
            FieldPath::CustomerCity => &self.customer.city,
            FieldPath::CustomerProvince => &self.customer.province,
            FieldPath::CustomerCountry => &self.customer.country,
            FieldPath::PaymentMethod => &self.payment.method,
            FieldPath::PaymentDueDate => &self.payment.due_date,
            FieldPath::PaymentAmount => &self.payment.amount,
            FieldPath::PaymentIban => &self.payment.iban,
        }
    }

    /// Mutable access to a scalar leaf. Editability is checked by the caller.
    pub(crate) fn field_mut(&mut self, path: FieldPath) -> &mut String {
        match path {
            FieldPath::HeaderNumber => &mut self.header.number,
            FieldPath::HeaderDate => &mut self.header.date,
            FieldPath::HeaderDocumentType => &mut self.header.document_type,
            FieldPath::HeaderDocumentTypeVersion => &mut self.header.document_type_version,
            FieldPath::HeaderProgressive => &mut self.header.progressive,
            FieldPath::HeaderCurrency => &mut self.header.currency,
            FieldPath::Currency => &mut self.currency,
            FieldPath::TotalAmount => &mut self.total_amount,
            FieldPath::SupplierName => &mut self.supplier.name,
            FieldPath::SupplierVatNumber => &mut self.supplier.vat_number,
            FieldPath::SupplierTaxCode => &mut self.supplier.tax_code,
            FieldPath::SupplierFiscalRegime => &mut self.supplier.fiscal_regime,
            FieldPath::SupplierAddress => &mut self.supplier.address,
            FieldPath::SupplierZip => &mut self.supplier.zip,
            FieldPath::SupplierCity => &mut self.supplier.city,
            FieldPath::SupplierProvince => &mut self.supplier.province,
            FieldPath::SupplierCountry => &mut self.supplier.country,
            FieldPath::CustomerName => &mut self.customer.name,
            FieldPath::CustomerVatNumber => &mut self.customer.vat_number,
            FieldPath::CustomerTaxCode => &mut self.customer.tax_code,
            FieldPath::CustomerAddress => &mut self.customer.address,
            FieldPath::CustomerZip => &mut self.customer.zip,
            FieldPath::CustomerCity => &mut self.customer.city,
            FieldPath::CustomerProvince => &mut self.customer.province,
            FieldPath::CustomerCountry => &mut self.customer.country,
            FieldPath::PaymentMethod => &mut self.payment.method,
            FieldPath::PaymentDueDate => &mut self.payment.due_date,
            FieldPath::PaymentAmount => &mut self.payment.amount,
            FieldPath::PaymentIban => &mut self.payment.iban,
        }
    }

    /// The party a composed address belongs to, if `path` is one of its parts.
    pub(crate) fn party_of(&self, path: FieldPath) -> Option<&Party> {
        match path {
            FieldPath::SupplierName
            | FieldPath::SupplierVatNumber
            | FieldPath::SupplierTaxCode
            | FieldPath::SupplierFiscalRegime
            | FieldPath::SupplierAddress
            | FieldPath::SupplierZip
            | FieldPath::SupplierCity
            | FieldPath::SupplierProvince
            | FieldPath::SupplierCountry => Some(&self.supplier),
            FieldPath::CustomerName
            | FieldPath::CustomerVatNumber
            | FieldPath::CustomerTaxCode
            | FieldPath::CustomerAddress
            | FieldPath::CustomerZip
            | FieldPath::CustomerCity
            | FieldPath::CustomerProvince
            | FieldPath::CustomerCountry => Some(&self.customer),
            FieldPath::HeaderNumber
            | FieldPath::HeaderDate
            | FieldPath::HeaderDocumentType
            | FieldPath::HeaderDocumentTypeVersion
            | FieldPath::HeaderProgressive
            | FieldPath::HeaderCurrency
            | FieldPath::Currency
            | FieldPath::TotalAmount
            | FieldPath::PaymentMethod
            | FieldPath::PaymentDueDate
            | FieldPath::PaymentAmount
            | FieldPath::PaymentIban => None,
        }
    }
}
