//! Bindery: two-way property binding between a markup tree and a model.
//!
//! # Quick start
//!
//! ```rust
//! use bindery::prelude::*;
//!
//! let model = Model::with_attributes([
//!     ("firstName", Value::from("Bob")),
//!     ("pets", Value::array([Value::object([("name", Value::from("Gary"))])])),
//! ]);
//!
//! let mut view = View::from_markup(
//!     r#"<form>
//!         <input name="firstName" data-bind-events="keyup change">
//!         <input name="pets[0].name">
//!     </form>"#,
//!     model.clone(),
//! )
//! .unwrap();
//! view.bind(BindingOptions::default()).unwrap();
//!
//! // Element → model.
//! let doc = view.document();
//! let first = doc.find(view.root(), "name", "firstName").unwrap();
//! doc.type_text(first, "Patrick").unwrap();
//! assert_eq!(model.get("firstName"), Value::from("Patrick"));
//!
//! // Model → element.
//! model.set("firstName", "Sandy").unwrap();
//! assert_eq!(doc.value(first), "Sandy");
//!
//! // Nested paths.
//! set_path(&model, "pets[0].name", "Max").unwrap();
//! assert_eq!(get_path(&model, "pets[0].name").unwrap(), Value::from("Max"));
//!
//! view.unbind();
//! ```
//!
//! # Markup attributes
//!
//! | Attribute | Meaning |
//! |---|---|
//! | `name` | property path the element is bound to (`firstName`, `pets[0].name`) |
//! | `data-bind-events` | space-separated trigger events, default `change` |
//! | `data-bind-handler` | custom handler registered with [`View::handler`] |
//!
//! All three attribute names can be changed through [`BindingOptions`].

pub mod adapter;
pub mod dom;
pub mod error;
pub mod logging;
pub mod model;
pub mod options;
pub mod path;
pub mod propagate;
pub mod session;
pub mod value;
pub mod view;

pub use error::{Error, Result};
pub use model::Model;
pub use options::BindingOptions;
pub use value::Value;
pub use view::View;

/// The types most callers need.
pub mod prelude {
    pub use crate::adapter::{ElementAdapter, ElementHandler, HandlerCall, HandlerOp};
    pub use crate::dom::{Document, DomEvent, ElementId, ListenerToken};
    pub use crate::error::{Error, Result};
    pub use crate::logging::{LoggingConfig, init_logging};
    pub use crate::model::{ChangeSet, Model, Subscription};
    pub use crate::options::BindingOptions;
    pub use crate::path::{PropPath, get_path, resolve_get, resolve_set, set_path};
    pub use crate::session::{BindingSession, BoundElement};
    pub use crate::value::Value;
    pub use crate::view::View;
}
