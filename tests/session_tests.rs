//! Session controller: load lifecycle, editing, reset, export and events.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use fattura::core::*;
use fattura::export::{ExportDocument, InvoiceRenderer};
use fattura::session::{EditSession, SessionController, SessionEvent, SessionState};

const SAMPLE: &str = include_str!("fixtures/IT01234567890_FPR12.xml");

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct TextRenderer;

impl InvoiceRenderer for TextRenderer {
    fn render(&self, document: &ExportDocument) -> Result<Vec<u8>, FatturaError> {
        Ok(document.to_string().into_bytes())
    }
}

struct FailingRenderer;

impl InvoiceRenderer for FailingRenderer {
    fn render(&self, _document: &ExportDocument) -> Result<Vec<u8>, FatturaError> {
        Err(FatturaError::Render("out of paper".into()))
    }
}

type Events = Rc<RefCell<Vec<SessionEvent>>>;

fn controller() -> (SessionController, Events) {
    with_renderer(TextRenderer)
}

fn with_renderer(renderer: impl InvoiceRenderer + 'static) -> (SessionController, Events) {
    let controller = SessionController::new(SessionConfig::default(), renderer).unwrap();
    let events: Events = Rc::default();
    let sink = Rc::clone(&events);
    controller.subscribe(move |event: &SessionEvent| sink.borrow_mut().push(event.clone()));
    (controller, events)
}

fn loaded() -> (SessionController, Events) {
    let (mut controller, events) = controller();
    controller.on_file_loaded(LoadedFile::xml("fattura.xml", SAMPLE));
    events.borrow_mut().clear();
    (controller, events)
}

fn xml_with_number(number: &str) -> String {
    format!(
        "<FatturaElettronica><DatiGeneraliDocumento><Numero>{number}</Numero>\
         </DatiGeneraliDocumento></FatturaElettronica>"
    )
}

fn take(events: &Events) -> Vec<SessionEvent> {
    std::mem::take(&mut *events.borrow_mut())
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn starts_empty() {
    let (controller, events) = controller();
    assert_eq!(controller.state(), SessionState::Empty);
    assert!(controller.current_invoice().is_none());
    assert!(!controller.can_export());
    assert!(events.borrow().is_empty());
}

#[test]
fn rejects_invalid_config() {
    let config = SessionConfig::default().max_file_size(0);
    let err = SessionController::new(config, TextRenderer).unwrap_err();
    assert!(matches!(err, FatturaError::Config(_)));
}

#[test]
fn successful_load_publishes_invoice_and_enables_export() {
    let (mut controller, events) = controller();
    controller.on_file_loaded(LoadedFile::xml("IT01234567890_FPR12.xml", SAMPLE));

    assert_eq!(controller.state(), SessionState::Loaded);
    assert_eq!(controller.file_name(), Some("IT01234567890_FPR12.xml"));
    assert!(controller.can_export());
    assert!(controller.last_error().is_none());

    let invoice = controller.current_invoice().unwrap().clone();
    assert_eq!(invoice.header.number, "2024/17");
    assert_eq!(
        take(&events),
        vec![
            SessionEvent::InvoiceLoaded(invoice),
            SessionEvent::ExportEnabled(true),
            SessionEvent::ResetEnabled(false),
        ]
    );
}

#[test]
fn malformed_file_moves_to_error() {
    let (mut controller, events) = controller();
    controller.on_file_loaded(LoadedFile::xml("broken.xml", "<FatturaElettronica>"));

    assert_eq!(controller.state(), SessionState::Error);
    assert!(controller.current_invoice().is_none());
    let message = controller.last_error().unwrap().to_string();
    assert!(message.starts_with("malformed document"), "{message}");

    assert_eq!(
        take(&events),
        vec![
            SessionEvent::ErrorOccurred(message),
            SessionEvent::ExportEnabled(false),
        ]
    );
}

#[test]
fn failed_reload_keeps_previous_invoice() {
    let (mut controller, events) = loaded();
    controller.edit_field("customer.city", "Torino");
    let before = controller.current_invoice().unwrap().clone();
    take(&events);

    controller.on_file_loaded(LoadedFile::xml("broken.xml", "<<<"));

    assert_eq!(controller.state(), SessionState::Error);
    assert_eq!(controller.current_invoice(), Some(&before));
    assert!(controller.session().unwrap().is_modified(FieldPath::CustomerCity));
    assert_eq!(controller.file_name(), Some("fattura.xml"));
    assert!(controller.can_export());

    let events = take(&events);
    assert_eq!(events[0], SessionEvent::ExportEnabled(false));
    assert_eq!(events[1], SessionEvent::ResetEnabled(false));
    assert!(matches!(events[2], SessionEvent::ErrorOccurred(_)));
    assert_eq!(events[3], SessionEvent::ExportEnabled(true));
}

#[test]
fn retained_invoice_is_exported_but_not_edited_after_failed_reload() {
    let (mut controller, events) = loaded();
    controller.edit_field("customer.city", "Torino");
    controller.on_file_loaded(LoadedFile::xml("broken.xml", "<FatturaElettronica>"));
    take(&events);

    controller.edit_field("customer.city", "Genova");
    controller.reset_changes();
    assert_eq!(controller.current_invoice().unwrap().customer.city, "Torino");
    assert!(take(&events).is_empty());

    let artifact = controller.export().unwrap();
    assert_eq!(artifact.file_name, "Invoice_2024_17.pdf");
    let text = String::from_utf8(artifact.bytes).unwrap();
    assert!(text.contains("Torino"), "{text}");
    assert_eq!(controller.state(), SessionState::Error);
}

#[test]
fn previous_invoice_is_replaced_only_by_a_successful_load() {
    let (mut controller, _events) = loaded();
    let ticket = controller.begin_load();
    assert_eq!(controller.state(), SessionState::Loading);
    assert_eq!(controller.current_invoice().unwrap().header.number, "2024/17");
    assert!(!controller.can_export());
    assert_eq!(controller.prepare_export(), Err(FatturaError::NoDataToExport));

    controller.complete_load(ticket, Ok(LoadedFile::xml("next.xml", xml_with_number("18"))));
    assert_eq!(controller.state(), SessionState::Loaded);
    assert_eq!(controller.current_invoice().unwrap().header.number, "18");
    assert_eq!(controller.file_name(), Some("next.xml"));
}

#[test]
fn deeply_nested_document_loads() {
    let (mut controller, _events) = controller();
    let depth = 200_000;
    let xml = format!(
        "<FatturaElettronica>{}<DatiGeneraliDocumento><Numero>7</Numero>\
         </DatiGeneraliDocumento>{}</FatturaElettronica>",
        "<a>".repeat(depth),
        "</a>".repeat(depth)
    );
    controller.on_file_loaded(LoadedFile::xml("deep.xml", xml));

    assert_eq!(controller.state(), SessionState::Loaded);
    assert_eq!(controller.current_invoice().unwrap().header.number, "7");
}

#[test]
fn non_xml_and_oversized_files_are_rejected() {
    let (mut controller, _events) = controller();
    let pdf = LoadedFile::new(
        FileDescriptor {
            name: "fattura.pdf".into(),
            size: 8,
            mime_type: Some("application/pdf".into()),
        },
        "%PDF-1.4",
    );
    controller.on_file_loaded(pdf);
    assert_eq!(controller.state(), SessionState::Error);
    assert!(controller.last_error().unwrap().contains("unsupported file kind"));

    let mut small = SessionController::new(
        SessionConfig::default().max_file_size(100),
        TextRenderer,
    )
    .unwrap();
    small.on_file_loaded(LoadedFile::xml("fattura.xml", SAMPLE));
    assert_eq!(small.state(), SessionState::Error);
    assert!(small.last_error().unwrap().contains("file too large"));
}

#[test]
fn upload_error_is_reported() {
    let (mut controller, events) = controller();
    controller.on_upload_error("permission denied");

    assert_eq!(controller.state(), SessionState::Error);
    assert_eq!(controller.last_error(), Some("upload failed: permission denied"));
    assert!(take(&events).contains(&SessionEvent::ErrorOccurred(
        "upload failed: permission denied".into()
    )));
}

#[test]
fn new_load_supersedes_pending_one() {
    let (mut controller, _events) = controller();
    let first = controller.begin_load();
    assert_eq!(controller.state(), SessionState::Loading);
    let second = controller.begin_load();

    let stale = LoadedFile::xml("first.xml", xml_with_number("1"));
    assert!(!controller.complete_load(first, Ok(stale)));
    assert_eq!(controller.state(), SessionState::Loading);

    let fresh = LoadedFile::xml("second.xml", xml_with_number("2"));
    assert!(controller.complete_load(second, Ok(fresh)));
    assert_eq!(controller.current_invoice().unwrap().header.number, "2");

    // A late completion of the first load is still ignored.
    let late = LoadedFile::xml("first.xml", xml_with_number("1"));
    assert!(!controller.complete_load(first, Ok(late)));
    assert_eq!(controller.file_name(), Some("second.xml"));
}

#[test]
fn completion_after_clear_is_discarded() {
    let (mut controller, _events) = controller();
    let ticket = controller.begin_load();
    controller.clear();

    assert!(!controller.complete_load(ticket, Ok(LoadedFile::xml("a.xml", SAMPLE))));
    assert_eq!(controller.state(), SessionState::Empty);
}

#[tokio::test]
async fn slower_read_of_superseded_upload_is_dropped() {
    let (mut controller, _events) = controller();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    for (number, delay_ms) in [("old", 40), ("new", 5)] {
        let ticket = controller.begin_load();
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            let file = LoadedFile::xml(format!("{number}.xml"), xml_with_number(number));
            let _ = tx.send((ticket, file));
        });
    }
    drop(tx);

    let mut applied = Vec::new();
    while let Some((ticket, file)) = rx.recv().await {
        let name = file.descriptor.name.clone();
        applied.push((name, controller.complete_load(ticket, Ok(file))));
    }

    assert_eq!(
        applied,
        vec![("new.xml".to_string(), true), ("old.xml".to_string(), false)]
    );
    assert_eq!(controller.current_invoice().unwrap().header.number, "new");
}

// ---------------------------------------------------------------------------
// Editing and reset
// ---------------------------------------------------------------------------

#[test]
fn edit_updates_working_copy_only() {
    let (mut controller, events) = loaded();
    controller.edit_field("customer.city", "Torino");

    let session = controller.session().unwrap();
    assert_eq!(session.get(FieldPath::CustomerCity), "Torino");
    assert_eq!(session.original().customer.city, "Milano");
    assert!(session.is_modified(FieldPath::CustomerCity));

    let events = take(&events);
    assert_eq!(events.len(), 2);
    match &events[0] {
        SessionEvent::DataChanged { invoice, modified } => {
            assert_eq!(invoice.customer.city, "Torino");
            assert_eq!(modified, &vec![FieldPath::CustomerCity]);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(events[1], SessionEvent::ResetEnabled(true));
}

#[test]
fn reset_enabled_is_published_once() {
    let (mut controller, events) = loaded();
    controller.edit(FieldPath::CustomerCity, "Torino");
    controller.edit(FieldPath::PaymentIban, "IT00A0000000000000000000000");

    let toggles: Vec<_> = take(&events)
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::ResetEnabled(_)))
        .collect();
    assert_eq!(toggles, vec![SessionEvent::ResetEnabled(true)]);
}

#[test]
fn read_only_and_unknown_edits_are_ignored() {
    let (mut controller, events) = loaded();
    let before = controller.current_invoice().unwrap().clone();

    controller.edit_field("supplier.name", "Mallory S.r.l.");
    controller.edit_field("header.number", "X");
    controller.edit_field("payment.amount", "0.00");
    controller.edit_field("customer.shoeSize", "42");

    assert_eq!(controller.current_invoice().unwrap(), &before);
    assert!(!controller.session().unwrap().has_changes());
    assert!(take(&events).is_empty());
}

#[test]
fn edits_outside_loaded_are_ignored() {
    let (mut controller, events) = controller();
    controller.edit_field("customer.city", "Torino");
    controller.reset_changes();

    assert_eq!(controller.state(), SessionState::Empty);
    assert!(events.borrow().is_empty());
}

#[test]
fn reset_restores_original_and_publishes() {
    let (mut controller, events) = loaded();
    let original = controller.current_invoice().unwrap().clone();
    controller.edit_field("customer.name", "Gamma S.r.l.");
    controller.edit_field("payment.dueDate", "2024-05-31");
    take(&events);

    controller.reset_changes();

    assert_eq!(controller.current_invoice().unwrap(), &original);
    assert!(!controller.session().unwrap().has_changes());
    assert_eq!(
        take(&events),
        vec![
            SessionEvent::DataChanged {
                invoice: original.clone(),
                modified: vec![],
            },
            SessionEvent::FieldsReset(original),
            SessionEvent::ResetEnabled(false),
        ]
    );
}

#[test]
fn edit_session_without_controller() {
    let invoice = fattura::fatturapa::map_invoice(SAMPLE).unwrap();
    let mut session = EditSession::load(invoice.clone());

    assert_eq!(session.get_by_name("customer.name"), "Beta Commerce S.p.A.");
    assert_eq!(session.get_by_name("nope"), "");
    assert_eq!(session.get_by_name("header.currency"), "EUR");
    assert_eq!(session.get_by_name("currency"), "EUR");
    assert_eq!(
        session.set(FieldPath::SupplierVatNumber, "X"),
        Err(FatturaError::FieldNotEditable("supplier.vatNumber".into()))
    );
    session.set(FieldPath::CustomerName, "Beta Commerce S.p.A.").unwrap();
    assert!(session.has_changes());
    assert_eq!(session.current_invoice(), &invoice);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_without_invoice_fails() {
    let (controller, events) = controller();
    assert_eq!(controller.export().unwrap_err(), FatturaError::NoDataToExport);
    assert_eq!(
        take(&events),
        vec![SessionEvent::ErrorOccurred("no invoice data to export".into())]
    );
}

#[test]
fn export_uses_working_copy() {
    let (mut controller, _events) = loaded();
    controller.edit_field("customer.address", "Via Dante 5");
    controller.edit_field("customer.zip", "10121");
    controller.edit_field("customer.city", "Torino");
    controller.edit_field("customer.province", "TO");

    let artifact = controller.export().unwrap();
    assert_eq!(artifact.file_name, "Invoice_2024_17.pdf");
    let text = String::from_utf8(artifact.bytes).unwrap();
    assert!(text.contains("Indirizzo: Via Dante 5 - 10121 Torino (TO)"), "{text}");
    assert!(text.contains("Indirizzo: Via Roma 1 - 00100 Roma (RM)"), "{text}");
    assert_eq!(controller.state(), SessionState::Loaded);
}

#[test]
fn render_failure_is_published_and_state_kept() {
    let (mut controller, events) = with_renderer(FailingRenderer);
    controller.on_file_loaded(LoadedFile::xml("fattura.xml", SAMPLE));
    take(&events);

    let err = controller.export().unwrap_err();
    assert_eq!(err, FatturaError::Render("out of paper".into()));
    assert_eq!(controller.state(), SessionState::Loaded);
    assert!(controller.can_export());
    assert_eq!(
        take(&events),
        vec![SessionEvent::ErrorOccurred("render error: out of paper".into())]
    );
}

#[test]
fn prepared_export_is_a_snapshot() {
    let (mut controller, _events) = loaded();
    let document = controller.prepare_export().unwrap();
    controller.edit_field("customer.name", "Gamma S.r.l.");

    let customer = &document.sections[2];
    assert_eq!(customer.entries[0].value, "Beta Commerce S.p.A.");
    assert_ne!(controller.prepare_export().unwrap(), document);
}

// ---------------------------------------------------------------------------
// Clear
// ---------------------------------------------------------------------------

#[test]
fn clear_returns_to_empty() {
    let (mut controller, events) = loaded();
    controller.edit_field("customer.city", "Torino");
    take(&events);

    controller.clear();

    assert_eq!(controller.state(), SessionState::Empty);
    assert!(controller.session().is_none());
    assert!(controller.file_name().is_none());
    assert_eq!(
        take(&events),
        vec![SessionEvent::ExportEnabled(false), SessionEvent::ResetEnabled(false)]
    );
    assert_eq!(controller.export().unwrap_err(), FatturaError::NoDataToExport);
}
