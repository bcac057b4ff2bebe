//! In-memory element tree the binding engine reads from and writes to.
//!
//! # Overview
//!
//! A [`Document`] is built from markup (see `bindery-markup`) and keeps, per
//! element, its attributes, children, text, and form state (value, checked,
//! selected option). Listeners are registered per element and per event name
//! and are identified by a [`ListenerToken`], so a caller can remove exactly
//! what it added.
//!
//! ```rust
//! use bindery::dom::Document;
//!
//! let doc = Document::parse(r#"<input name="firstName">"#).unwrap();
//! let input = doc.find(doc.root(), "name", "firstName").unwrap();
//!
//! let token = doc.on(input, "change", |event| {
//!     println!("{} fired", event.kind);
//!     Ok(())
//! });
//! doc.type_text(input, "Patrick").unwrap();
//! doc.remove_listener(token);
//! ```

pub(crate) mod builder;
pub mod document;
pub mod event;

pub use document::{Document, ElementId, WeakDocument};
pub use event::{DomEvent, Listener, ListenerToken, split_events};
