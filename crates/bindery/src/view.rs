use std::collections::HashMap;
use std::rc::Rc;

use crate::adapter::{ElementAdapter, ElementHandler, HandlerCall};
use crate::dom::{Document, ElementId};
use crate::error::Result;
use crate::model::Model;
use crate::options::BindingOptions;
use crate::path::PropPath;
use crate::session::BindingSession;
use crate::value::Value;

/// An element subtree paired with a model.
///
/// Builder-style setup: register custom handlers by name, then call
/// [`bind`](View::bind) to wire every element under the root that carries a
/// property name.
///
/// ```rust
/// use bindery::{BindingOptions, Model, Value, View};
///
/// let model = Model::with_attributes([("firstName", Value::from("Bob"))]);
/// let mut view = View::from_markup(r#"<form><input name="firstName"></form>"#, model.clone())
///     .unwrap()
///     .handler("shout", |call| Ok(Value::from(call.doc.text(call.el).to_uppercase())));
/// view.bind(BindingOptions::default()).unwrap();
///
/// let input = view.document().find(view.root(), "name", "firstName").unwrap();
/// view.document().type_text(input, "Patrick").unwrap();
/// assert_eq!(model.get("firstName"), Value::from("Patrick"));
/// ```
pub struct View {
    doc: Document,
    root: ElementId,
    model: Model,
    handlers: HashMap<String, ElementHandler>,
    session: Option<BindingSession>,
}

impl View {
    pub fn new(doc: Document, root: ElementId, model: Model) -> Self {
        Self { doc, root, model, handlers: HashMap::new(), session: None }
    }

    /// Parse `src` into a fresh document rooted at [`Document::ROOT`].
    pub fn from_markup(src: &str, model: Model) -> Result<Self> {
        let doc = Document::parse(src)?;
        Ok(Self::new(doc, Document::ROOT, model))
    }

    /// Register a custom handler, looked up by elements naming it in their
    /// handler attribute. Handlers are resolved at bind time.
    pub fn handler(
        mut self,
        name: impl Into<String>,
        f: impl Fn(HandlerCall<'_>) -> Result<Value> + 'static,
    ) -> Self {
        self.handlers.insert(name.into(), Rc::new(f));
        self
    }

    // ── Binding ───────────────────────────────────────────────────────────

    /// Bind the view. A view that is already bound is unbound first, so
    /// binding twice never doubles the listeners.
    pub fn bind(&mut self, options: BindingOptions) -> Result<()> {
        if let Some(previous) = self.session.take() {
            log::warn!("view under {:?} is already bound; rebinding", self.root);
            previous.unbind();
        }
        let session = BindingSession::bind(&self.doc, &self.model, self.root, &self.handlers, options)?;
        self.session = Some(session);
        Ok(())
    }

    /// Remove the listeners added by [`bind`](View::bind). Does nothing if
    /// the view is not bound.
    pub fn unbind(&mut self) {
        if let Some(session) = self.session.take() {
            session.unbind();
        }
    }

    pub fn is_bound(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&BindingSession> {
        self.session.as_ref()
    }

    // ── Element values ────────────────────────────────────────────────────

    /// Read `el` the way a bound element is read when its trigger fires.
    pub fn element_value(&self, el: ElementId, prop_name: &str) -> Result<Value> {
        let path = PropPath::parse(prop_name)?;
        self.adapter_for(el)?.get(&self.doc, &self.model, el, &path)
    }

    /// Write `value` into `el` the way model changes are shown.
    pub fn set_element_value(&self, el: ElementId, value: &Value) -> Result<()> {
        self.adapter_for(el)?.set(&self.doc, &self.model, el, value)
    }

    fn adapter_for(&self, el: ElementId) -> Result<ElementAdapter> {
        let bound = self
            .session
            .as_ref()
            .and_then(|s| s.elements().iter().find(|b| b.el == el));
        if let Some(bound) = bound {
            return Ok(bound.adapter.clone());
        }
        let options = self.session.as_ref().map(|s| s.options().clone()).unwrap_or_default();
        ElementAdapter::for_element(&self.doc, el, &options, &self.handlers)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn root(&self) -> ElementId {
        self.root
    }
}
