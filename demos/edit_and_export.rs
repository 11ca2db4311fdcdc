//! Load a FatturaPA file, fix the customer's address and export a PDF.
//!
//! ```sh
//! RUST_LOG=fattura=debug cargo run --example edit_and_export --features pdf -- fattura.xml
//! ```

use fattura::core::*;
use fattura::pdf::PdfRenderer;
use fattura::session::{SessionController, SessionEvent};

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<p:FatturaElettronica versione="FPR12" xmlns:p="http://ivaservizi.agenziaentrate.gov.it/docs/xsd/fatture/v1.2">
  <FatturaElettronicaHeader>
    <DatiTrasmissione>
      <ProgressivoInvio>00001</ProgressivoInvio>
      <FormatoTrasmissione>FPR12</FormatoTrasmissione>
    </DatiTrasmissione>
    <CedentePrestatore>
      <DatiAnagrafici>
        <IdFiscaleIVA><IdPaese>IT</IdPaese><IdCodice>01234567890</IdCodice></IdFiscaleIVA>
        <Anagrafica><Denominazione>Alfa S.r.l.</Denominazione></Anagrafica>
        <RegimeFiscale>RF01</RegimeFiscale>
      </DatiAnagrafici>
      <Sede>
        <Indirizzo>Via Roma</Indirizzo><NumeroCivico>1</NumeroCivico>
        <CAP>00100</CAP><Comune>Roma</Comune><Provincia>RM</Provincia><Nazione>IT</Nazione>
      </Sede>
    </CedentePrestatore>
    <CessionarioCommittente>
      <DatiAnagrafici>
        <CodiceFiscale>RSSMRA80A01H501U</CodiceFiscale>
        <Anagrafica><Nome>Mario</Nome><Cognome>Rossi</Cognome></Anagrafica>
      </DatiAnagrafici>
      <Sede>
        <Indirizzo>Corso Buenos Aires 10</Indirizzo>
        <CAP>20124</CAP><Comune>Milano</Comune><Nazione>IT</Nazione>
      </Sede>
    </CessionarioCommittente>
  </FatturaElettronicaHeader>
  <FatturaElettronicaBody>
    <DatiGenerali>
      <DatiGeneraliDocumento>
        <TipoDocumento>TD01</TipoDocumento><Divisa>EUR</Divisa>
        <Data>2024-03-15</Data><Numero>2024/17</Numero>
        <ImportoTotaleDocumento>122.00</ImportoTotaleDocumento>
      </DatiGeneraliDocumento>
    </DatiGenerali>
    <DatiBeniServizi>
      <DettaglioLinee>
        <NumeroLinea>1</NumeroLinea><Descrizione>Consulenza tecnica</Descrizione>
        <Quantita>1.00</Quantita><PrezzoUnitario>100.00</PrezzoUnitario>
        <PrezzoTotale>100.00</PrezzoTotale><AliquotaIVA>22.00</AliquotaIVA>
      </DettaglioLinee>
      <DatiRiepilogo>
        <AliquotaIVA>22.00</AliquotaIVA><ImponibileImporto>100.00</ImponibileImporto>
        <Imposta>22.00</Imposta>
      </DatiRiepilogo>
    </DatiBeniServizi>
    <DatiPagamento>
      <DettaglioPagamento>
        <ModalitaPagamento>MP05</ModalitaPagamento>
        <ImportoPagamento>122.00</ImportoPagamento>
      </DettaglioPagamento>
    </DatiPagamento>
  </FatturaElettronicaBody>
</p:FatturaElettronica>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let file = match std::env::args().nth(1) {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            let descriptor = FileDescriptor {
                name: path,
                size: content.len() as u64,
                mime_type: None,
            };
            LoadedFile::new(descriptor, content)
        }
        None => LoadedFile::xml("IT01234567890_00001.xml", SAMPLE),
    };

    let mut controller = SessionController::new(SessionConfig::default(), PdfRenderer::default())?;
    controller.subscribe(|event: &SessionEvent| match event {
        SessionEvent::InvoiceLoaded(invoice) => {
            println!("Loaded invoice {} ({} lines)", invoice.header.number, invoice.lines.len())
        }
        SessionEvent::DataChanged { modified, .. } => println!("Modified: {modified:?}"),
        SessionEvent::ErrorOccurred(message) => eprintln!("Error: {message}"),
        _ => {}
    });

    controller.on_file_loaded(file);
    if let Some(message) = controller.last_error() {
        return Err(message.into());
    }

    controller.edit(FieldPath::CustomerProvince, "MI");
    controller.edit(FieldPath::PaymentDueDate, "2024-04-15");
    // Read-only, silently ignored.
    controller.edit_field("supplier.name", "Beta S.p.A.");

    let document = controller.prepare_export()?;
    println!("\n{document}");

    let artifact = controller.export()?;
    std::fs::write(&artifact.file_name, &artifact.bytes)?;
    println!("Written {} ({} bytes)", artifact.file_name, artifact.bytes.len());
    Ok(())
}
