use std::rc::Rc;

use crate::dom::ElementId;
use crate::error::Result;

/// An event delivered to listeners registered on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    /// Event name as registered: `"change"`, `"keyup"`, `"click"`, …
    pub kind: String,
    /// The element the event was dispatched on.
    pub target: ElementId,
}

/// Handle for one listener registration.
///
/// Removing by token only touches that registration; listeners added by
/// other code on the same element are left alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub(crate) u64);

/// Element listener. An error stops the dispatch and is returned from
/// [`Document::dispatch`](crate::dom::Document::dispatch).
pub type Listener = Rc<dyn Fn(&DomEvent) -> Result<()>>;

/// Split a space-separated event list (`"keyup change"`).
pub fn split_events(spec: &str) -> Vec<String> {
    spec.split_whitespace().map(str::to_string).collect()
}
