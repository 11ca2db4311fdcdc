use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::FatturaError;

/// A scalar leaf of the [`Invoice`](super::Invoice) aggregate.
///
/// The string form is the dotted path used by views (`customer.address`).
/// Ordering follows declaration order, which is also registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldPath {
    HeaderNumber,
    HeaderDate,
    HeaderDocumentType,
    HeaderDocumentTypeVersion,
    HeaderProgressive,
    HeaderCurrency,
    Currency,
    TotalAmount,
    SupplierName,
    SupplierVatNumber,
    SupplierTaxCode,
    SupplierFiscalRegime,
    SupplierAddress,
    SupplierZip,
    SupplierCity,
    SupplierProvince,
    SupplierCountry,
    CustomerName,
    CustomerVatNumber,
    CustomerTaxCode,
    CustomerAddress,
    CustomerZip,
    CustomerCity,
    CustomerProvince,
    CustomerCountry,
    PaymentMethod,
    PaymentDueDate,
    PaymentAmount,
    PaymentIban,
}

impl FieldPath {
    /// Every field path, in declaration order.
    pub const ALL: [FieldPath; 29] = [
        FieldPath::HeaderNumber,
        FieldPath::HeaderDate,
        FieldPath::HeaderDocumentType,
        FieldPath::HeaderDocumentTypeVersion,
        FieldPath::HeaderProgressive,
        FieldPath::HeaderCurrency,
        FieldPath::Currency,
        FieldPath::TotalAmount,
        FieldPath::SupplierName,
        FieldPath::SupplierVatNumber,
        FieldPath::SupplierTaxCode,
        FieldPath::SupplierFiscalRegime,
        FieldPath::SupplierAddress,
        FieldPath::SupplierZip,
        FieldPath::SupplierCity,
        FieldPath::SupplierProvince,
        FieldPath::SupplierCountry,
        FieldPath::CustomerName,
        FieldPath::CustomerVatNumber,
        FieldPath::CustomerTaxCode,
        FieldPath::CustomerAddress,
        FieldPath::CustomerZip,
        FieldPath::CustomerCity,
        FieldPath::CustomerProvince,
        FieldPath::CustomerCountry,
        FieldPath::PaymentMethod,
        FieldPath::PaymentDueDate,
        FieldPath::PaymentAmount,
        FieldPath::PaymentIban,
    ];

    /// Dotted path string.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldPath::HeaderNumber => "header.number",
            FieldPath::HeaderDate => "header.date",
            FieldPath::HeaderDocumentType => "header.documentType",
            FieldPath::HeaderDocumentTypeVersion => "header.documentTypeVersion",
            FieldPath::HeaderProgressive => "header.progressive",
            FieldPath::HeaderCurrency => "header.currency",
            FieldPath::Currency => "currency",
            FieldPath::TotalAmount => "totalAmount",
            FieldPath::SupplierName => "supplier.name",
            FieldPath::SupplierVatNumber => "supplier.vatNumber",
            FieldPath::SupplierTaxCode => "supplier.taxCode",
            FieldPath::SupplierFiscalRegime => "supplier.fiscalRegime",
            FieldPath::SupplierAddress => "supplier.address",
            FieldPath::SupplierZip => "supplier.zip",
            FieldPath::SupplierCity => "supplier.city",
            FieldPath::SupplierProvince => "supplier.province",
            FieldPath::SupplierCountry => "supplier.country",
            FieldPath::CustomerName => "customer.name",
            FieldPath::CustomerVatNumber => "customer.vatNumber",
            FieldPath::CustomerTaxCode => "customer.taxCode",
            FieldPath::CustomerAddress => "customer.address",
            FieldPath::CustomerZip => "customer.zip",
            FieldPath::CustomerCity => "customer.city",
            FieldPath::CustomerProvince => "customer.province",
            FieldPath::CustomerCountry => "customer.country",
            FieldPath::PaymentMethod => "payment.method",
            FieldPath::PaymentDueDate => "payment.dueDate",
            FieldPath::PaymentAmount => "payment.amount",
            FieldPath::PaymentIban => "payment.iban",
        }
    }

    /// Registry entry for this path, `None` only if the registry is broken
    /// (see [`validate_registry`]).
    pub fn spec(self) -> Option<&'static FieldSpec> {
        FIELD_REGISTRY.iter().find(|spec| spec.path == self)
    }

    pub fn is_editable(self) -> bool {
        self.spec().is_some_and(|spec| spec.editable)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldPath {
    type Err = FatturaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::ALL
            .into_iter()
            .find(|path| path.as_str() == s)
            .ok_or_else(|| FatturaError::UnknownField(s.to_string()))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Display/export section a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Header,
    Supplier,
    Customer,
    Payment,
}

impl Section {
    /// Sections in display order.
    pub const ALL: [Section; 4] = [
        Section::Header,
        Section::Supplier,
        Section::Customer,
        Section::Payment,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Header => "Intestazione Fattura",
            Section::Supplier => "Dati Fornitore",
            Section::Customer => "Dati Cliente",
            Section::Payment => "Dati Pagamento",
        }
    }

    /// Registry entries of this section, in declaration order.
    pub fn fields(self) -> impl Iterator<Item = &'static FieldSpec> {
        FIELD_REGISTRY.iter().filter(move |spec| spec.section == self)
    }
}

/// How a field is projected into the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Raw value.
    Text,
    /// Raw value followed by the invoice currency.
    Amount,
    /// Street line composed with zip, city and province of the same party.
    Address,
    /// Folded into the party's composed address, no row of its own.
    AddressPart,
    /// Readable by path, never exported.
    Hidden,
}

/// One declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub path: FieldPath,
    /// Label shown in the view and in the export.
    pub label: &'static str,
    pub editable: bool,
    pub section: Section,
    pub kind: FieldKind,
}

const fn field(
    path: FieldPath,
    label: &'static str,
    editable: bool,
    section: Section,
    kind: FieldKind,
) -> FieldSpec {
    FieldSpec {
        path,
        label,
        editable,
        section,
        kind,
    }
}

/// The field registry: what is displayed, where, and whether it is editable.
pub const FIELD_REGISTRY: &[FieldSpec] = &[
    // Intestazione
    field(FieldPath::HeaderNumber, "Numero Fattura", false, Section::Header, FieldKind::Text),
    field(FieldPath::HeaderDate, "Data Fattura", false, Section::Header, FieldKind::Text),
    field(FieldPath::HeaderDocumentType, "Tipo Documento", false, Section::Header, FieldKind::Text),
    field(
        FieldPath::HeaderDocumentTypeVersion,
        "Formato Trasmissione",
        false,
        Section::Header,
        FieldKind::Text,
    ),
    field(FieldPath::HeaderProgressive, "Progressivo Invio", false, Section::Header, FieldKind::Text),
    field(FieldPath::HeaderCurrency, "Valuta", false, Section::Header, FieldKind::Hidden),
    field(FieldPath::Currency, "Valuta", false, Section::Header, FieldKind::Text),
    field(FieldPath::TotalAmount, "Importo Totale", false, Section::Header, FieldKind::Amount),
    // Fornitore
    field(FieldPath::SupplierName, "Denominazione", false, Section::Supplier, FieldKind::Text),
    field(FieldPath::SupplierVatNumber, "Partita IVA", false, Section::Supplier, FieldKind::Text),
    field(FieldPath::SupplierTaxCode, "Codice Fiscale", false, Section::Supplier, FieldKind::Text),
    field(FieldPath::SupplierFiscalRegime, "Regime Fiscale", false, Section::Supplier, FieldKind::Text),
    field(FieldPath::SupplierAddress, "Indirizzo", false, Section::Supplier, FieldKind::Address),
    field(FieldPath::SupplierZip, "CAP", false, Section::Supplier, FieldKind::AddressPart),
    field(FieldPath::SupplierCity, "Comune", false, Section::Supplier, FieldKind::AddressPart),
    field(FieldPath::SupplierProvince, "Provincia", false, Section::Supplier, FieldKind::AddressPart),
    field(FieldPath::SupplierCountry, "Nazione", false, Section::Supplier, FieldKind::Text),
    // Cliente
    field(FieldPath::CustomerName, "Denominazione", true, Section::Customer, FieldKind::Text),
    field(FieldPath::CustomerVatNumber, "Partita IVA", true, Section::Customer, FieldKind::Text),
    field(FieldPath::CustomerTaxCode, "Codice Fiscale", true, Section::Customer, FieldKind::Text),
    field(FieldPath::CustomerAddress, "Indirizzo", true, Section::Customer, FieldKind::Address),
    field(FieldPath::CustomerZip, "CAP", true, Section::Customer, FieldKind::AddressPart),
    field(FieldPath::CustomerCity, "Comune", true, Section::Customer, FieldKind::AddressPart),
    field(FieldPath::CustomerProvince, "Provincia", true, Section::Customer, FieldKind::AddressPart),
    field(FieldPath::CustomerCountry, "Nazione", true, Section::Customer, FieldKind::Text),
    // Pagamento
    field(FieldPath::PaymentMethod, "Modalità", true, Section::Payment, FieldKind::Text),
    field(FieldPath::PaymentDueDate, "Data Scadenza", true, Section::Payment, FieldKind::Text),
    field(FieldPath::PaymentAmount, "Importo", false, Section::Payment, FieldKind::Amount),
    field(FieldPath::PaymentIban, "IBAN", true, Section::Payment, FieldKind::Text),
];

/// Iterate over the editable fields, in registry order.
pub fn editable_fields() -> impl Iterator<Item = &'static FieldSpec> {
    FIELD_REGISTRY.iter().filter(|spec| spec.editable)
}

/// Check that every [`FieldPath`] is declared exactly once and that each
/// composed address is declared before its parts in the same section.
pub fn validate_registry() -> Result<(), FatturaError> {
    for path in FieldPath::ALL {
        let count = FIELD_REGISTRY.iter().filter(|spec| spec.path == path).count();
        if count != 1 {
            return Err(FatturaError::Registry(format!(
                "{path} is declared {count} times"
            )));
        }
        if path.as_str().parse::<FieldPath>() != Ok(path) {
            return Err(FatturaError::Registry(format!(
                "{path} does not round-trip through its string form"
            )));
        }
    }

    let mut address_section = None;
    for spec in FIELD_REGISTRY {
        match spec.kind {
            FieldKind::Address => address_section = Some(spec.section),
            FieldKind::AddressPart if address_section != Some(spec.section) => {
                return Err(FatturaError::Registry(format!(
                    "{} is an address part without a preceding address in its section",
                    spec.path
                )));
            }
            _ => {}
        }
    }
    Ok(())
}
