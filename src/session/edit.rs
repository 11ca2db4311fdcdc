use std::collections::BTreeSet;

use crate::core::{FatturaError, FieldPath, Invoice};

use super::events::{Notifier, SessionEvent};

/// Original and working copy of one loaded invoice.
///
/// `original` is frozen at load time. `working` changes only through
/// [`set`](EditSession::set) and [`reset_to_original`](EditSession::reset_to_original);
/// callers get shared borrows of it and nothing else.
#[derive(Debug)]
pub struct EditSession {
    original: Invoice,
    working: Invoice,
    modified: BTreeSet<FieldPath>,
    notifier: Notifier,
}

impl EditSession {
    /// Start a session whose change notifications go nowhere.
    pub fn load(invoice: Invoice) -> Self {
        Self::with_notifier(invoice, Notifier::new())
    }

    /// Start a session publishing `DataChanged` through `notifier`.
    pub fn with_notifier(invoice: Invoice, notifier: Notifier) -> Self {
        Self {
            working: invoice.clone(),
            original: invoice,
            modified: BTreeSet::new(),
            notifier,
        }
    }

    pub fn get(&self, path: FieldPath) -> &str {
        self.working.field(path)
    }

    /// Look up a dotted path as sent by a view; unknown paths read as `""`.
    pub fn get_by_name(&self, path: &str) -> &str {
        path.parse::<FieldPath>()
            .map(|path| self.get(path))
            .unwrap_or("")
    }

    /// Write `value` into the working copy.
    ///
    /// Read-only fields are rejected with [`FatturaError::FieldNotEditable`]
    /// and leave the session untouched. Writing the original value back still
    /// counts as a modification.
    pub fn set(&mut self, path: FieldPath, value: impl Into<String>) -> Result<(), FatturaError> {
        if !path.is_editable() {
            return Err(FatturaError::FieldNotEditable(path.to_string()));
        }
        *self.working.field_mut(path) = value.into();
        self.modified.insert(path);
        tracing::debug!(%path, modified = self.modified.len(), "field edited");
        self.publish_change();
        Ok(())
    }

    pub fn reset_to_original(&mut self) {
        self.working = self.original.clone();
        self.modified.clear();
        tracing::debug!("edits discarded");
        self.publish_change();
    }

    /// The working copy.
    pub fn current_invoice(&self) -> &Invoice {
        &self.working
    }

    /// The invoice as it was loaded.
    pub fn original(&self) -> &Invoice {
        &self.original
    }

    /// Paths touched since load or the last reset, in registry order.
    pub fn modified_paths(&self) -> impl Iterator<Item = FieldPath> + '_ {
        self.modified.iter().copied()
    }

    pub fn is_modified(&self, path: FieldPath) -> bool {
        self.modified.contains(&path)
    }

    pub fn has_changes(&self) -> bool {
        !self.modified.is_empty()
    }

    fn publish_change(&self) {
        self.notifier.publish(&SessionEvent::DataChanged {
            invoice: self.working.clone(),
            modified: self.modified_paths().collect(),
        });
    }
}
