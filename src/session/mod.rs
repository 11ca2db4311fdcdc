//! Edit sessions and the controller that owns the current one.
//!
//! State only changes on the thread that owns the [`SessionController`];
//! observers are notified synchronously, in subscription order.

mod controller;
mod edit;
mod events;

pub use controller::{LoadTicket, SessionController, SessionState};
pub use edit::EditSession;
pub use events::{Notifier, SessionEvent, SessionObserver};
