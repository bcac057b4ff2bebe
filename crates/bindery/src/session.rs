//! One bind → unbind lifetime of a view.
//!
//! A [`BindingSession`] owns every listener it registers: one per bound
//! element on the document, plus one change listener on the model when
//! model changes are observed. Unbinding, or dropping the session, removes
//! exactly those and nothing else.

use std::collections::HashMap;
use std::rc::Rc;

use crate::adapter::{ElementAdapter, ElementHandler};
use crate::dom::{Document, DomEvent, ElementId, Listener, ListenerToken, split_events};
use crate::error::Result;
use crate::model::{ChangeSet, Model, Subscription};
use crate::options::{BindingOptions, DEFAULT_EVENTS};
use crate::path::{PropPath, resolve_get, resolve_set};
use crate::propagate::ChangePropagator;

/// An element wired to a property path.
#[derive(Debug, Clone)]
pub struct BoundElement {
    pub el: ElementId,
    pub path: PropPath,
    /// Events that write the element's value into the model.
    pub events: Vec<String>,
    pub adapter: ElementAdapter,
}

pub struct BindingSession {
    doc: Document,
    model: Model,
    root: ElementId,
    options: BindingOptions,
    elements: Rc<[BoundElement]>,
    tokens: Vec<ListenerToken>,
    subscription: Option<Subscription>,
}

impl BindingSession {
    /// Bind every descendant of `root` carrying `options.prop_name_attr`.
    ///
    /// Each element is first filled from the model, then gets a listener for
    /// its trigger events. If any element fails, the listeners registered so
    /// far are removed again and the error is returned.
    pub fn bind(
        doc: &Document,
        model: &Model,
        root: ElementId,
        handlers: &HashMap<String, ElementHandler>,
        options: BindingOptions,
    ) -> Result<Self> {
        let mut session = Self {
            doc: doc.clone(),
            model: model.clone(),
            root,
            options,
            elements: Rc::from(Vec::new()),
            tokens: Vec::new(),
            subscription: None,
        };

        let mut elements = Vec::new();
        for el in doc.query_attr(root, &session.options.prop_name_attr) {
            let bound = session.bind_element(el, handlers)?;
            elements.push(bound);
        }
        session.elements = elements.into();

        if session.options.observe_model {
            let propagator = ChangePropagator::new(doc, model, Rc::clone(&session.elements));
            let sub = model.on_change(Rc::new(move |changes: &ChangeSet| -> Result<()> {
                propagator.apply(changes)
            }));
            session.subscription = Some(sub);
        }

        log::debug!(
            "bound {} element(s) under {root:?} (observe_model: {})",
            session.elements.len(),
            session.options.observe_model
        );
        Ok(session)
    }

    fn bind_element(&mut self, el: ElementId, handlers: &HashMap<String, ElementHandler>) -> Result<BoundElement> {
        let raw = self.doc.attr(el, &self.options.prop_name_attr).unwrap_or_default();
        let path = PropPath::parse(&raw)?;
        let adapter = ElementAdapter::for_element(&self.doc, el, &self.options, handlers)?;
        let events = self
            .doc
            .attr(el, &self.options.events_attr)
            .filter(|spec| !spec.trim().is_empty())
            .map(|spec| split_events(&spec))
            .unwrap_or_else(|| split_events(DEFAULT_EVENTS));

        let value = resolve_get(&self.model, &path)?;
        log::trace!("{path}: {el:?} <- {value} ({adapter:?})");
        adapter.set(&self.doc, &self.model, el, &value)?;

        let bound = BoundElement { el, path, events, adapter };
        let token = self.doc.add_listener(el, &bound.events, self.element_listener(&bound));
        self.tokens.push(token);
        Ok(bound)
    }

    /// Reads the element and writes the model. Holds weak handles only: the
    /// document stores this listener.
    fn element_listener(&self, bound: &BoundElement) -> Listener {
        let doc = self.doc.downgrade();
        let model = self.model.downgrade();
        let BoundElement { el, path, adapter, .. } = bound.clone();
        Rc::new(move |event: &DomEvent| -> Result<()> {
            let (Some(doc), Some(model)) = (doc.upgrade(), model.upgrade()) else {
                return Ok(());
            };
            let value = adapter.get(&doc, &model, el, &path)?;
            log::trace!("{} on {el:?}: {path} <- {value}", event.kind);
            resolve_set(&model, &path, value)
        })
    }

    /// Remove this session's listeners.
    pub fn unbind(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(sub) = self.subscription.take() {
            self.model.off_change(sub);
        }
        let removed = self.tokens.drain(..).filter(|t| self.doc.remove_listener(*t)).count();
        if removed > 0 {
            log::debug!("unbound {removed} element listener(s) under {:?}", self.root);
        }
    }

    pub fn elements(&self) -> &[BoundElement] {
        &self.elements
    }

    pub fn options(&self) -> &BindingOptions {
        &self.options
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn is_observing_model(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Drop for BindingSession {
    fn drop(&mut self) {
        self.detach();
    }
}
