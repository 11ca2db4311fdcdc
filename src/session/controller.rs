use crate::core::{FatturaError, FieldPath, Invoice, LoadedFile, SessionConfig, validate_registry};
use crate::export::{ExportArtifact, ExportDocument, InvoiceRenderer, render_invoice, try_project};
use crate::fatturapa;

use super::edit::EditSession;
use super::events::{Notifier, SessionEvent, SessionObserver};

/// Lifecycle of the controller. Editing happens inside `Loaded`.
///
/// A failed load ends in `Error` but keeps the invoice that was current
/// before it; that invoice can still be exported, not edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loading,
    Loaded,
    Error,
}

/// Identifies one load request. Only the most recent ticket can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Owner of the single current invoice.
///
/// Driven by the upload collaborator (`begin_load` / `complete_load`, or
/// `on_file_loaded` when the content is already in hand) and by the view
/// (`edit_field`, `reset_changes`, `export`). Everything the view needs to
/// redraw arrives as [`SessionEvent`]s.
pub struct SessionController {
    config: SessionConfig,
    state: SessionState,
    session: Option<EditSession>,
    last_error: Option<String>,
    file_name: Option<String>,
    generation: u64,
    notifier: Notifier,
    renderer: Box<dyn InvoiceRenderer>,
}

impl SessionController {
    /// Fails fast when the configuration or the field registry is invalid.
    pub fn new(
        config: SessionConfig,
        renderer: impl InvoiceRenderer + 'static,
    ) -> Result<Self, FatturaError> {
        config.validate()?;
        validate_registry()?;
        Ok(Self {
            config,
            state: SessionState::Empty,
            session: None,
            last_error: None,
            file_name: None,
            generation: 0,
            notifier: Notifier::new(),
            renderer: Box::new(renderer),
        })
    }

    pub fn subscribe(&self, observer: impl SessionObserver + 'static) {
        self.notifier.subscribe(observer);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Message of the last failed load, while in `Error`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Name of the file the current invoice came from.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Working copy of the current invoice.
    pub fn current_invoice(&self) -> Option<&Invoice> {
        self.session.as_ref().map(EditSession::current_invoice)
    }

    pub fn can_export(&self) -> bool {
        matches!(self.state, SessionState::Loaded | SessionState::Error) && self.session.is_some()
    }

    /// Start a load. Any earlier ticket becomes stale. The current invoice,
    /// if any, stays in place until the load succeeds.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        let had_session = self.session.is_some();
        self.last_error = None;
        self.transition(SessionState::Loading);
        if had_session {
            self.notifier.publish(&SessionEvent::ExportEnabled(false));
            self.notifier.publish(&SessionEvent::ResetEnabled(false));
        }
        LoadTicket(self.generation)
    }

    /// Deliver the outcome of the read started with `ticket`.
    ///
    /// Returns `false` when the ticket was superseded by a later load or a
    /// clear; the outcome is then dropped without touching any state.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        upload: Result<LoadedFile, FatturaError>,
    ) -> bool {
        if ticket.0 != self.generation || self.state != SessionState::Loading {
            tracing::warn!(
                ticket = ticket.0,
                current = self.generation,
                "discarding stale load completion"
            );
            return false;
        }

        let mapped = upload.and_then(|file| {
            file.check(&self.config)?;
            let invoice = fatturapa::map_invoice(&file.content)?;
            Ok((file.descriptor.name, invoice))
        });

        match mapped {
            Ok((name, invoice)) => {
                tracing::info!(
                    file = %name,
                    number = %invoice.header.number,
                    lines = invoice.lines.len(),
                    "invoice loaded"
                );
                self.file_name = Some(name);
                self.session = Some(EditSession::with_notifier(
                    invoice.clone(),
                    self.notifier.clone(),
                ));
                self.transition(SessionState::Loaded);
                self.notifier.publish(&SessionEvent::InvoiceLoaded(invoice));
                self.notifier.publish(&SessionEvent::ExportEnabled(true));
                self.notifier.publish(&SessionEvent::ResetEnabled(false));
            }
            Err(err) => self.fail_load(err),
        }
        true
    }

    /// Upload collaborator delivered a complete file.
    pub fn on_file_loaded(&mut self, file: LoadedFile) {
        let ticket = self.begin_load();
        self.complete_load(ticket, Ok(file));
    }

    /// Upload collaborator failed before producing content.
    pub fn on_upload_error(&mut self, message: impl Into<String>) {
        let ticket = self.begin_load();
        self.complete_load(ticket, Err(FatturaError::Upload(message.into())));
    }

    /// Edit a field by dotted path, as sent by a view.
    ///
    /// Unknown or read-only paths, and edits outside `Loaded`, are ignored.
    pub fn edit_field(&mut self, path: &str, value: impl Into<String>) {
        match path.parse::<FieldPath>() {
            Ok(path) => self.edit(path, value),
            Err(err) => tracing::debug!(%err, "edit ignored"),
        }
    }

    pub fn edit(&mut self, path: FieldPath, value: impl Into<String>) {
        if self.state != SessionState::Loaded {
            tracing::debug!(%path, state = ?self.state, "edit ignored outside loaded state");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let had_changes = session.has_changes();
        match session.set(path, value) {
            Ok(()) => {
                if !had_changes {
                    self.notifier.publish(&SessionEvent::ResetEnabled(true));
                }
            }
            Err(err) => tracing::debug!(%err, "edit ignored"),
        }
    }

    /// Undo every edit. No-op without a loaded invoice.
    pub fn reset_changes(&mut self) {
        if self.state != SessionState::Loaded {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.reset_to_original();
        let invoice = session.current_invoice().clone();
        self.notifier.publish(&SessionEvent::FieldsReset(invoice));
        self.notifier.publish(&SessionEvent::ResetEnabled(false));
    }

    /// Snapshot of the current invoice, ready for a renderer.
    ///
    /// In `Error` this is the invoice retained from before the failed load.
    /// Nothing is exported while a load is pending.
    pub fn prepare_export(&self) -> Result<ExportDocument, FatturaError> {
        let invoice = if self.can_export() {
            self.current_invoice()
        } else {
            None
        };
        try_project(invoice)
    }

    /// Project and render. Failures are published and returned; the state is
    /// never changed by an export.
    pub fn export(&self) -> Result<ExportArtifact, FatturaError> {
        let result = self
            .prepare_export()
            .and_then(|document| render_invoice(self.renderer.as_ref(), document));
        match &result {
            Ok(artifact) => tracing::info!(
                file = %artifact.file_name,
                bytes = artifact.bytes.len(),
                "invoice exported"
            ),
            Err(err) => {
                tracing::warn!(%err, "export failed");
                self.notifier
                    .publish(&SessionEvent::ErrorOccurred(err.to_string()));
            }
        }
        result
    }

    /// Drop everything and go back to `Empty`. Pending loads become stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.session = None;
        self.file_name = None;
        self.last_error = None;
        self.transition(SessionState::Empty);
        self.notifier.publish(&SessionEvent::ExportEnabled(false));
        self.notifier.publish(&SessionEvent::ResetEnabled(false));
    }

    fn fail_load(&mut self, err: FatturaError) {
        let retained = self.session.is_some();
        tracing::warn!(%err, retained, "invoice load failed");
        let message = err.to_string();
        self.last_error = Some(message.clone());
        self.transition(SessionState::Error);
        self.notifier.publish(&SessionEvent::ErrorOccurred(message));
        self.notifier.publish(&SessionEvent::ExportEnabled(retained));
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("session", &self.session)
            .field("last_error", &self.last_error)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
