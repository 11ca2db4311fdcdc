use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::core::{FieldPath, Invoice};

/// Notification published to every subscribed observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new invoice is current; views rebuild from it.
    InvoiceLoaded(Invoice),
    /// Working data went back to the loaded state; editable inputs re-sync.
    FieldsReset(Invoice),
    /// Working data changed through an edit or a reset.
    DataChanged {
        invoice: Invoice,
        modified: Vec<FieldPath>,
    },
    /// A user-facing failure.
    ErrorOccurred(String),
    ExportEnabled(bool),
    /// Whether there are edits that a reset would undo.
    ResetEnabled(bool),
}

/// Receiver of [`SessionEvent`]s. Implemented for closures.
pub trait SessionObserver {
    fn notify(&mut self, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionEvent),
{
    fn notify(&mut self, event: &SessionEvent) {
        self(event)
    }
}

/// Shared fan-out handle. Clones publish to the same observers.
///
/// Single-threaded by construction. An observer must not subscribe from
/// inside a notification; such a publish is dropped with a warning.
#[derive(Clone, Default)]
pub struct Notifier {
    observers: Rc<RefCell<Vec<Box<dyn SessionObserver>>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: impl SessionObserver + 'static) {
        match self.observers.try_borrow_mut() {
            Ok(mut observers) => observers.push(Box::new(observer)),
            Err(_) => tracing::warn!("subscribe during notification ignored"),
        }
    }

    pub fn publish(&self, event: &SessionEvent) {
        match self.observers.try_borrow_mut() {
            Ok(mut observers) => {
                for observer in observers.iter_mut() {
                    observer.notify(event);
                }
            }
            Err(_) => tracing::warn!(?event, "re-entrant publish dropped"),
        }
    }

    /// Number of subscribed observers, `None` while a notification is running.
    pub fn observer_count(&self) -> Option<usize> {
        self.observers.try_borrow().map(|o| o.len()).ok()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observer_count())
            .finish()
    }
}
