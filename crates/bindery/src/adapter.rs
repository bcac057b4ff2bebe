//! Reading and writing an element's value as a model [`Value`].
//!
//! The mapping depends only on the element's tag and `type` attribute, unless
//! the element names a custom handler, which then owns both directions. The
//! variant is picked once when the element is bound.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::{Document, ElementId};
use crate::error::{Error, Result};
use crate::model::Model;
use crate::options::BindingOptions;
use crate::path::{PropPath, resolve_get};
use crate::value::Value;

/// Checkbox and radio value reported when markup gives none.
const DEFAULT_CHECK_VALUE: &str = "on";

// ── Custom handlers ───────────────────────────────────────────────────────

/// Which direction a custom handler is asked to handle.
#[derive(Debug, Clone, Copy)]
pub enum HandlerOp<'a> {
    /// Report the element's value for `prop_name`.
    GetElVal { prop_name: &'a str },
    /// Show `prop_val` in the element. The handler's return is ignored.
    SetElVal { prop_val: &'a Value },
}

/// Everything a custom handler gets to work with.
#[derive(Clone, Copy)]
pub struct HandlerCall<'a> {
    pub doc: &'a Document,
    pub el: ElementId,
    pub model: &'a Model,
    pub op: HandlerOp<'a>,
}

/// A view-registered function that takes over value mapping for elements
/// naming it in their handler attribute.
pub type ElementHandler = Rc<dyn Fn(HandlerCall<'_>) -> Result<Value>>;

// ── ElementAdapter ────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum ElementAdapter {
    /// `input`, `select` and `textarea` other than checkboxes and radios:
    /// the raw value string.
    TextLike,
    Checkbox,
    Radio,
    /// Any other tag: its text content.
    Content,
    Custom { name: String, handler: ElementHandler },
}

impl ElementAdapter {
    /// Pick the adapter for `el`. Fails with [`Error::UnknownHandler`] when
    /// the element names a handler `handlers` does not contain. An empty
    /// handler attribute names no handler.
    pub fn for_element(
        doc: &Document,
        el: ElementId,
        options: &BindingOptions,
        handlers: &HashMap<String, ElementHandler>,
    ) -> Result<Self> {
        if let Some(name) = doc.attr(el, &options.handler_attr).filter(|n| !n.is_empty()) {
            let handler = handlers
                .get(&name)
                .cloned()
                .ok_or_else(|| Error::UnknownHandler(name.clone()))?;
            return Ok(ElementAdapter::Custom { name, handler });
        }

        let adapter = match doc.tag(el).as_str() {
            "input" | "select" | "textarea" => {
                match doc.attr(el, "type").map(|t| t.to_ascii_lowercase()).as_deref() {
                    Some("checkbox") => ElementAdapter::Checkbox,
                    Some("radio") => ElementAdapter::Radio,
                    _ => ElementAdapter::TextLike,
                }
            }
            _ => ElementAdapter::Content,
        };
        Ok(adapter)
    }

    /// The element's current value as the model should see it.
    ///
    /// An unchecked radio has no value of its own and reports whatever the
    /// model holds at `path`, so that syncing it back is a no-op.
    pub fn get(&self, doc: &Document, model: &Model, el: ElementId, path: &PropPath) -> Result<Value> {
        let value = match self {
            ElementAdapter::TextLike => Value::Str(doc.value(el)),
            ElementAdapter::Content => Value::Str(doc.text(el)),
            ElementAdapter::Checkbox => {
                let value = doc.value(el);
                match (doc.is_checked(el), value == DEFAULT_CHECK_VALUE) {
                    (true, true) => Value::Bool(true),
                    (true, false) => Value::Str(value),
                    (false, true) => Value::Bool(false),
                    (false, false) => Value::Null,
                }
            }
            ElementAdapter::Radio if doc.is_checked(el) => Value::Str(doc.value(el)),
            ElementAdapter::Radio => resolve_get(model, path)?,
            ElementAdapter::Custom { handler, .. } => handler(HandlerCall {
                doc,
                el,
                model,
                op: HandlerOp::GetElVal { prop_name: path.as_str() },
            })?,
        };
        Ok(value)
    }

    /// Show `value` in the element.
    pub fn set(&self, doc: &Document, model: &Model, el: ElementId, value: &Value) -> Result<()> {
        match self {
            ElementAdapter::TextLike => doc.set_value(el, &value.to_display()),
            ElementAdapter::Content => doc.set_text(el, &value.to_display()),
            ElementAdapter::Checkbox => {
                let checked = match value {
                    Value::Bool(b) => *b,
                    // A box with an explicit value is one of a group.
                    other => doc.value(el) == other.to_display(),
                };
                doc.set_checked(el, checked);
            }
            ElementAdapter::Radio => {
                let checked = doc.value(el) == value.to_display();
                doc.set_checked(el, checked);
            }
            ElementAdapter::Custom { handler, .. } => {
                handler(HandlerCall { doc, el, model, op: HandlerOp::SetElVal { prop_val: value } })?;
            }
        }
        Ok(())
    }

    /// Whether the element already shows `value`, in which case writing it
    /// again is skipped.
    ///
    /// A radio is judged by its checked state: reading an unchecked radio
    /// yields the model value, which would always look current.
    pub fn shows(&self, doc: &Document, model: &Model, el: ElementId, path: &PropPath, value: &Value) -> Result<bool> {
        if let ElementAdapter::Radio = self {
            return Ok(doc.is_checked(el) == (doc.value(el) == value.to_display()));
        }
        Ok(self.get(doc, model, el, path)?.loose_eq(value))
    }
}

impl fmt::Debug for ElementAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementAdapter::TextLike => f.write_str("TextLike"),
            ElementAdapter::Checkbox => f.write_str("Checkbox"),
            ElementAdapter::Radio => f.write_str("Radio"),
            ElementAdapter::Content => f.write_str("Content"),
            ElementAdapter::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter_for(doc: &Document, el: ElementId) -> ElementAdapter {
        ElementAdapter::for_element(doc, el, &BindingOptions::default(), &HashMap::new()).unwrap()
    }

    fn path(raw: &str) -> PropPath {
        PropPath::parse(raw).unwrap()
    }

    #[test]
    fn picks_variant_from_tag_and_type() {
        let doc = Document::parse(
            r#"<input id=a><input id=b type=CheckBox><input id=c type=radio>
               <select id=d><option>x</option></select><textarea id=e></textarea><span id=f></span>"#,
        )
        .unwrap();
        let kinds: Vec<String> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|id| format!("{:?}", adapter_for(&doc, doc.find(doc.root(), "id", id).unwrap())))
            .collect();
        assert_eq!(kinds, ["TextLike", "Checkbox", "Radio", "TextLike", "TextLike", "Content"]);
    }

    #[test]
    fn empty_handler_attribute_names_no_handler() {
        let doc = Document::parse(
            r#"<input id=a data-bind-handler=""><input id=b data-bind-handler><span id=c data-bind-handler></span>"#,
        )
        .unwrap();
        let kinds: Vec<String> = ["a", "b", "c"]
            .iter()
            .map(|id| format!("{:?}", adapter_for(&doc, doc.find(doc.root(), "id", id).unwrap())))
            .collect();
        assert_eq!(kinds, ["TextLike", "TextLike", "Content"]);

        let model = Model::with_attributes([("x", Value::from(1))]);
        let session = crate::session::BindingSession::bind(
            &doc,
            &model,
            doc.root(),
            &HashMap::new(),
            BindingOptions::default().prop_name_attr("id"),
        )
        .unwrap();
        assert_eq!(session.elements().len(), 3);
    }

    #[test]
    fn checkbox_values() {
        let doc = Document::parse(
            r#"<input name=married type=checkbox checked>
               <input name=single type=checkbox>
               <input name=color type=checkbox value=red checked>
               <input name=other type=checkbox value=red>"#,
        )
        .unwrap();
        let model = Model::new();
        let read = |name: &str| {
            let el = doc.find(doc.root(), "name", name).unwrap();
            ElementAdapter::Checkbox.get(&doc, &model, el, &path(name)).unwrap()
        };
        assert_eq!(read("married"), Value::Bool(true));
        assert_eq!(read("single"), Value::Bool(false));
        assert_eq!(read("color"), Value::from("red"));
        assert_eq!(read("other"), Value::Null);
    }

    #[test]
    fn checkbox_set() {
        let doc = Document::parse(r#"<input name=a type=checkbox><input name=b type=checkbox value=red>"#).unwrap();
        let model = Model::new();
        let a = doc.find(doc.root(), "name", "a").unwrap();
        let b = doc.find(doc.root(), "name", "b").unwrap();

        ElementAdapter::Checkbox.set(&doc, &model, a, &Value::Bool(true)).unwrap();
        assert!(doc.is_checked(a));
        ElementAdapter::Checkbox.set(&doc, &model, b, &Value::from("red")).unwrap();
        assert!(doc.is_checked(b));
        ElementAdapter::Checkbox.set(&doc, &model, b, &Value::from("blue")).unwrap();
        assert!(!doc.is_checked(b));
    }

    #[test]
    fn unchecked_radio_reports_model_value() {
        let doc = Document::parse(
            r#"<input type=radio name=color value=Yellow><input type=radio name=color value=Pink>"#,
        )
        .unwrap();
        let model = Model::with_attributes([("color", Value::from("Yellow"))]);
        let radios = doc.query_attr_eq(doc.root(), "name", "color");
        assert_eq!(
            ElementAdapter::Radio.get(&doc, &model, radios[1], &path("color")).unwrap(),
            Value::from("Yellow")
        );

        ElementAdapter::Radio.set(&doc, &model, radios[1], &Value::from("Pink")).unwrap();
        assert!(doc.is_checked(radios[1]));
        assert_eq!(
            ElementAdapter::Radio.get(&doc, &model, radios[1], &path("color")).unwrap(),
            Value::from("Pink")
        );
    }

    #[test]
    fn radio_shows_by_checked_state() {
        let doc = Document::parse(
            r#"<input type=radio name=color value=Yellow checked><input type=radio name=color value=Pink>"#,
        )
        .unwrap();
        let model = Model::with_attributes([("color", Value::from("Pink"))]);
        let radios = doc.query_attr_eq(doc.root(), "name", "color");
        let pink = Value::from("Pink");
        assert!(!ElementAdapter::Radio.shows(&doc, &model, radios[0], &path("color"), &pink).unwrap());
        assert!(!ElementAdapter::Radio.shows(&doc, &model, radios[1], &path("color"), &pink).unwrap());
        ElementAdapter::Radio.set(&doc, &model, radios[1], &pink).unwrap();
        assert!(ElementAdapter::Radio.shows(&doc, &model, radios[0], &path("color"), &pink).unwrap());
        assert!(ElementAdapter::Radio.shows(&doc, &model, radios[1], &path("color"), &pink).unwrap());
    }

    #[test]
    fn content_and_text_like() {
        let doc = Document::parse(r#"<input name=age><p name=bio>old</p>"#).unwrap();
        let model = Model::new();
        let age = doc.find(doc.root(), "name", "age").unwrap();
        let bio = doc.find(doc.root(), "name", "bio").unwrap();

        ElementAdapter::TextLike.set(&doc, &model, age, &Value::from(42)).unwrap();
        assert_eq!(doc.value(age), "42");
        ElementAdapter::Content.set(&doc, &model, bio, &Value::Null).unwrap();
        assert_eq!(
            ElementAdapter::Content.get(&doc, &model, bio, &path("bio")).unwrap(),
            Value::from("")
        );
    }

    #[test]
    fn custom_handler_owns_the_element() {
        let doc = Document::parse(r#"<span name=age data-bind-handler=years>3</span>"#).unwrap();
        let el = doc.find(doc.root(), "name", "age").unwrap();
        let mut handlers: HashMap<String, ElementHandler> = HashMap::new();
        handlers.insert(
            "years".into(),
            Rc::new(|call: HandlerCall<'_>| -> Result<Value> {
                match call.op {
                    HandlerOp::GetElVal { .. } => {
                        let text = call.doc.text(call.el);
                        Ok(Value::from(text.trim_end_matches(" years").parse::<f64>().unwrap_or(0.0)))
                    }
                    HandlerOp::SetElVal { prop_val } => {
                        call.doc.set_text(call.el, &format!("{prop_val} years"));
                        Ok(Value::Null)
                    }
                }
            }),
        );
        let model = Model::new();
        let adapter = ElementAdapter::for_element(&doc, el, &BindingOptions::default(), &handlers).unwrap();

        adapter.set(&doc, &model, el, &Value::from(7)).unwrap();
        assert_eq!(doc.text(el), "7 years");
        assert_eq!(adapter.get(&doc, &model, el, &path("age")).unwrap(), Value::from(7));
    }

    #[test]
    fn unknown_handler_is_an_error() {
        let doc = Document::parse(r#"<span name=age data-bind-handler=nope></span>"#).unwrap();
        let el = doc.find(doc.root(), "name", "age").unwrap();
        let err = ElementAdapter::for_element(&doc, el, &BindingOptions::default(), &HashMap::new()).unwrap_err();
        assert_eq!(err, Error::UnknownHandler("nope".into()));
    }
}
