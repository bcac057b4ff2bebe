use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bindery_markup::parse_str;

use crate::dom::builder;
use crate::dom::event::{DomEvent, Listener, ListenerToken, split_events};
use crate::error::Result;

// ── ElementId ─────────────────────────────────────────────────────────────

/// Index of an element inside its [`Document`]. Ids are never reused, even
/// after the element is detached.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

// ── Tree ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub(crate) enum Child {
    Element(ElementId),
    Text(String),
}

#[derive(Debug)]
pub(crate) struct ElementData {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<Child>,
    /// Current form value for `input`/`textarea`; unused for `select`, whose
    /// value derives from its options.
    pub(crate) value: String,
    /// Checked state for checkboxes/radios, selected state for `option`.
    pub(crate) checked: bool,
    /// Bumped on every value, checked or text write.
    pub(crate) revision: u64,
}

struct Registration {
    token: ListenerToken,
    target: ElementId,
    events: Vec<String>,
    listener: Listener,
}

pub(crate) struct Tree {
    elements: Vec<ElementData>,
    registrations: Vec<Registration>,
    next_token: u64,
}

impl Tree {
    fn new() -> Self {
        let root = ElementData {
            tag: "#root".to_string(),
            attrs: Vec::new(),
            parent: None,
            children: Vec::new(),
            value: String::new(),
            checked: false,
            revision: 0,
        };
        Self { elements: vec![root], registrations: Vec::new(), next_token: 1 }
    }

    pub(crate) fn el(&self, id: ElementId) -> &ElementData {
        &self.elements[id.0]
    }

    pub(crate) fn el_mut(&mut self, id: ElementId) -> &mut ElementData {
        &mut self.elements[id.0]
    }

    pub(crate) fn create(&mut self, parent: ElementId, tag: &str, attrs: Vec<(String, String)>) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs,
            parent: Some(parent),
            children: Vec::new(),
            value: String::new(),
            checked: false,
            revision: 0,
        });
        self.el_mut(parent).children.push(Child::Element(id));
        id
    }

    pub(crate) fn push_text(&mut self, parent: ElementId, text: &str) {
        self.el_mut(parent).children.push(Child::Text(text.to_string()));
    }

    pub(crate) fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.el(id).attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    fn is_attached(&self, mut id: ElementId) -> bool {
        loop {
            if id == Document::ROOT {
                return true;
            }
            match self.el(id).parent {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub(crate) fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: ElementId, out: &mut Vec<ElementId>) {
        for child in &self.el(id).children {
            if let Child::Element(c) = child {
                out.push(*c);
                self.collect_descendants(*c, out);
            }
        }
    }

    fn text(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        for child in &self.el(id).children {
            match child {
                Child::Text(t) => out.push_str(t),
                Child::Element(c) => self.collect_text(*c, out),
            }
        }
    }

    fn is_radio(&self, id: ElementId) -> bool {
        self.el(id).tag == "input"
            && self.attr(id, "type").is_some_and(|t| t.eq_ignore_ascii_case("radio"))
    }

    pub(crate) fn options(&self, select: ElementId) -> Vec<ElementId> {
        self.descendants(select)
            .into_iter()
            .filter(|id| self.el(*id).tag == "option")
            .collect()
    }

    fn option_value(&self, option: ElementId) -> String {
        self.attr(option, "value").map(str::to_string).unwrap_or_else(|| self.text(option))
    }

    fn value(&self, id: ElementId) -> String {
        if self.el(id).tag == "select" {
            self.options(id)
                .into_iter()
                .find(|o| self.el(*o).checked)
                .map(|o| self.option_value(o))
                .unwrap_or_default()
        } else {
            self.el(id).value.clone()
        }
    }
}

// ── Document ──────────────────────────────────────────────────────────────

/// A retained element tree with per-element listeners.
///
/// `Document` is a cheap shared handle: clones refer to the same tree. Every
/// method borrows the tree only for its own duration, so listeners are free to
/// read and write the document while an event is being dispatched.
///
/// ```rust
/// use bindery::dom::Document;
///
/// let doc = Document::parse(r#"<form><input name="firstName" value="Bob"></form>"#).unwrap();
/// let input = doc.find(doc.root(), "name", "firstName").unwrap();
/// assert_eq!(doc.value(input), "Bob");
/// ```
#[derive(Clone)]
pub struct Document(Rc<RefCell<Tree>>);

/// Non-owning handle kept by listeners stored inside the document.
#[derive(Clone)]
pub struct WeakDocument(Weak<RefCell<Tree>>);

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.0.upgrade().map(Document)
    }
}

impl Document {
    /// The implicit container every parsed fragment is attached to.
    pub const ROOT: ElementId = ElementId(0);

    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Tree::new())))
    }

    /// Parse markup into a fresh document under [`Document::ROOT`].
    pub fn parse(src: &str) -> Result<Self> {
        let doc = Self::new();
        doc.append_markup(Self::ROOT, src)?;
        Ok(doc)
    }

    pub fn root(&self) -> ElementId {
        Self::ROOT
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument(Rc::downgrade(&self.0))
    }

    // ── Structure ─────────────────────────────────────────────────────────

    /// Parse `src` and append the resulting elements to `parent`. Returns the
    /// new top-level elements.
    pub fn append_markup(&self, parent: ElementId, src: &str) -> Result<Vec<ElementId>> {
        let fragment = parse_str(src)?;
        Ok(builder::build(&mut self.0.borrow_mut(), parent, &fragment))
    }

    /// Detach every child of `el`. Detached elements keep their ids but are
    /// no longer found by queries.
    pub fn clear_children(&self, el: ElementId) {
        let mut tree = self.0.borrow_mut();
        let children = std::mem::take(&mut tree.el_mut(el).children);
        for child in children {
            if let Child::Element(c) = child {
                tree.el_mut(c).parent = None;
            }
        }
    }

    pub fn tag(&self, el: ElementId) -> String {
        self.0.borrow().el(el).tag.clone()
    }

    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.0.borrow().el(el).parent
    }

    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.0
            .borrow()
            .el(el)
            .children
            .iter()
            .filter_map(|c| match c {
                Child::Element(id) => Some(*id),
                Child::Text(_) => None,
            })
            .collect()
    }

    pub fn is_attached(&self, el: ElementId) -> bool {
        self.0.borrow().is_attached(el)
    }

    /// All elements under `el` in document order.
    pub fn descendants(&self, el: ElementId) -> Vec<ElementId> {
        self.0.borrow().descendants(el)
    }

    /// Descendants of `root` carrying attribute `name`, in document order.
    pub fn query_attr(&self, root: ElementId, name: &str) -> Vec<ElementId> {
        let tree = self.0.borrow();
        tree.descendants(root)
            .into_iter()
            .filter(|id| tree.attr(*id, name).is_some())
            .collect()
    }

    /// Descendants of `root` whose attribute `name` equals `value` exactly.
    pub fn query_attr_eq(&self, root: ElementId, name: &str, value: &str) -> Vec<ElementId> {
        let tree = self.0.borrow();
        tree.descendants(root)
            .into_iter()
            .filter(|id| tree.attr(*id, name) == Some(value))
            .collect()
    }

    pub fn find(&self, root: ElementId, name: &str, value: &str) -> Option<ElementId> {
        self.query_attr_eq(root, name, value).into_iter().next()
    }

    // ── Attributes ────────────────────────────────────────────────────────

    pub fn attr(&self, el: ElementId, name: &str) -> Option<String> {
        self.0.borrow().attr(el, name).map(str::to_string)
    }

    pub fn has_attr(&self, el: ElementId, name: &str) -> bool {
        self.0.borrow().attr(el, name).is_some()
    }

    pub fn set_attr(&self, el: ElementId, name: &str, value: &str) {
        let mut tree = self.0.borrow_mut();
        let attrs = &mut tree.el_mut(el).attrs;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    // ── Form state ────────────────────────────────────────────────────────

    /// Current value: the typed value of an `input`/`textarea`, the selected
    /// option's value of a `select` (empty when nothing is selected).
    pub fn value(&self, el: ElementId) -> String {
        self.0.borrow().value(el)
    }

    /// Write a value. For a `select`, selects the option whose value matches
    /// and deselects the rest.
    pub fn set_value(&self, el: ElementId, value: &str) {
        let mut tree = self.0.borrow_mut();
        if tree.el(el).tag == "select" {
            for option in tree.options(el) {
                let selected = tree.option_value(option) == value;
                tree.el_mut(option).checked = selected;
            }
        } else {
            tree.el_mut(el).value = value.to_string();
        }
        tree.el_mut(el).revision += 1;
    }

    pub fn is_checked(&self, el: ElementId) -> bool {
        self.0.borrow().el(el).checked
    }

    /// Checking a radio unchecks every other attached radio sharing its
    /// `name` attribute.
    pub fn set_checked(&self, el: ElementId, checked: bool) {
        let mut tree = self.0.borrow_mut();
        if checked && tree.is_radio(el) {
            if let Some(group) = tree.attr(el, "name").map(str::to_string) {
                let peers: Vec<ElementId> = tree
                    .descendants(Self::ROOT)
                    .into_iter()
                    .filter(|id| *id != el && tree.is_radio(*id) && tree.attr(*id, "name") == Some(group.as_str()))
                    .collect();
                for peer in peers {
                    tree.el_mut(peer).checked = false;
                }
            }
        }
        let data = tree.el_mut(el);
        data.checked = checked;
        data.revision += 1;
    }

    /// Concatenated text content of `el` and its descendants.
    pub fn text(&self, el: ElementId) -> String {
        self.0.borrow().text(el)
    }

    /// Replace the content of `el` with a single text run, detaching any
    /// child elements.
    pub fn set_text(&self, el: ElementId, text: &str) {
        self.clear_children(el);
        let mut tree = self.0.borrow_mut();
        if !text.is_empty() {
            tree.push_text(el, text);
        }
        tree.el_mut(el).revision += 1;
    }

    /// Number of value/checked/text writes `el` has received.
    pub fn revision(&self, el: ElementId) -> u64 {
        self.0.borrow().el(el).revision
    }

    // ── Events ────────────────────────────────────────────────────────────

    pub fn add_listener(&self, el: ElementId, events: &[String], listener: Listener) -> ListenerToken {
        let mut tree = self.0.borrow_mut();
        let token = ListenerToken(tree.next_token);
        tree.next_token += 1;
        tree.registrations.push(Registration {
            token,
            target: el,
            events: events.to_vec(),
            listener,
        });
        token
    }

    /// Register `f` for a space-separated list of events.
    pub fn on(
        &self,
        el: ElementId,
        events: &str,
        f: impl Fn(&DomEvent) -> Result<()> + 'static,
    ) -> ListenerToken {
        self.add_listener(el, &split_events(events), Rc::new(f))
    }

    /// Remove one registration. Returns `false` if it was already gone.
    pub fn remove_listener(&self, token: ListenerToken) -> bool {
        let mut tree = self.0.borrow_mut();
        let before = tree.registrations.len();
        tree.registrations.retain(|r| r.token != token);
        tree.registrations.len() != before
    }

    /// Remove every listener on `el`, whoever registered it.
    pub fn remove_all_listeners(&self, el: ElementId) -> usize {
        let mut tree = self.0.borrow_mut();
        let before = tree.registrations.len();
        tree.registrations.retain(|r| r.target != el);
        before - tree.registrations.len()
    }

    pub fn listener_count(&self, el: ElementId) -> usize {
        self.0.borrow().registrations.iter().filter(|r| r.target == el).count()
    }

    /// Run the listeners registered on `el` for `kind`, in registration
    /// order. Events do not bubble. The first error aborts the dispatch.
    pub fn dispatch(&self, el: ElementId, kind: &str) -> Result<()> {
        let listeners: Vec<Listener> = self
            .0
            .borrow()
            .registrations
            .iter()
            .filter(|r| r.target == el && r.events.iter().any(|e| e == kind))
            .map(|r| Rc::clone(&r.listener))
            .collect();
        log::trace!("dispatch {kind} on {el:?} to {} listener(s)", listeners.len());

        let event = DomEvent { kind: kind.to_string(), target: el };
        for listener in listeners {
            listener(&event)?;
        }
        Ok(())
    }

    /// Simulate a user click: toggles a checkbox, checks a radio, then fires
    /// `click` followed by `change` when the checked state moved.
    pub fn click(&self, el: ElementId) -> Result<()> {
        let (kind, was) = {
            let tree = self.0.borrow();
            let kind = tree.attr(el, "type").map(str::to_ascii_lowercase);
            (kind, tree.el(el).checked)
        };
        let now = match kind.as_deref() {
            Some("checkbox") => !was,
            Some("radio") => true,
            _ => was,
        };
        if now != was {
            self.set_checked(el, now);
        }
        self.dispatch(el, "click")?;
        if now != was {
            self.dispatch(el, "change")?;
        }
        Ok(())
    }

    /// Simulate typing: replace the value, then fire `input` and `change`.
    pub fn type_text(&self, el: ElementId, text: &str) -> Result<()> {
        self.set_value(el, text);
        self.dispatch(el, "input")?;
        self.dispatch(el, "change")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn form_state_from_markup() {
        let doc = Document::parse(
            r#"<form>
                <input name="firstName" value="Bob">
                <input name="married" type="checkbox" checked>
                <textarea name="bio">Lives in a pineapple</textarea>
                <select name="employed"><option>Yes</option><option value="n">No</option></select>
            </form>"#,
        )
        .unwrap();
        let root = doc.root();
        let first = doc.find(root, "name", "firstName").unwrap();
        let married = doc.find(root, "name", "married").unwrap();
        let bio = doc.find(root, "name", "bio").unwrap();
        let employed = doc.find(root, "name", "employed").unwrap();

        assert_eq!(doc.value(first), "Bob");
        assert_eq!(doc.value(married), "on");
        assert!(doc.is_checked(married));
        assert_eq!(doc.value(bio), "Lives in a pineapple");
        assert_eq!(doc.value(employed), "Yes");

        doc.set_value(employed, "n");
        assert_eq!(doc.value(employed), "n");
        doc.set_value(employed, "Maybe");
        assert_eq!(doc.value(employed), "");
    }

    #[test]
    fn radios_are_exclusive() {
        let doc = Document::parse(
            r#"<div>
                <input type="radio" name="color" value="Yellow" checked>
                <input type="radio" name="color" value="Pink">
                <input type="radio" name="other" value="x" checked>
            </div>"#,
        )
        .unwrap();
        let radios = doc.query_attr(doc.root(), "type");
        doc.set_checked(radios[1], true);
        assert!(!doc.is_checked(radios[0]));
        assert!(doc.is_checked(radios[1]));
        assert!(doc.is_checked(radios[2]));
    }

    #[test]
    fn text_replacement_detaches_children() {
        let doc = Document::parse(r#"<p id="p"><b name="x">bold</b> tail</p>"#).unwrap();
        let p = doc.find(doc.root(), "id", "p").unwrap();
        let b = doc.find(doc.root(), "name", "x").unwrap();
        assert_eq!(doc.text(p), "bold tail");
        doc.set_text(p, "plain");
        assert_eq!(doc.text(p), "plain");
        assert!(!doc.is_attached(b));
        assert!(doc.query_attr(doc.root(), "name").is_empty());
        assert_eq!(doc.revision(p), 1);
    }

    #[test]
    fn listeners_by_token() {
        let doc = Document::parse("<input name=a>").unwrap();
        let input = doc.find(doc.root(), "name", "a").unwrap();
        let hits = Rc::new(Cell::new(0));
        let h1 = Rc::clone(&hits);
        let h2 = Rc::clone(&hits);
        let mine = doc.on(input, "keyup change", move |_| {
            h1.set(h1.get() + 1);
            Ok(())
        });
        let _theirs = doc.on(input, "change", move |_| {
            h2.set(h2.get() + 10);
            Ok(())
        });

        doc.dispatch(input, "keyup").unwrap();
        assert_eq!(hits.get(), 1);
        doc.dispatch(input, "change").unwrap();
        assert_eq!(hits.get(), 12);

        assert!(doc.remove_listener(mine));
        assert!(!doc.remove_listener(mine));
        doc.dispatch(input, "change").unwrap();
        assert_eq!(hits.get(), 22);

        assert_eq!(doc.remove_all_listeners(input), 1);
        assert_eq!(doc.listener_count(input), 0);
    }

    #[test]
    fn click_toggles_checkbox_and_fires_change() {
        let doc = Document::parse(r#"<input name="married" type="checkbox">"#).unwrap();
        let input = doc.find(doc.root(), "name", "married").unwrap();
        let changes = Rc::new(Cell::new(0));
        let c = Rc::clone(&changes);
        doc.on(input, "change", move |e| {
            assert_eq!(e.kind, "change");
            c.set(c.get() + 1);
            Ok(())
        });
        doc.click(input).unwrap();
        assert!(doc.is_checked(input));
        doc.click(input).unwrap();
        assert!(!doc.is_checked(input));
        assert_eq!(changes.get(), 2);
    }

    #[test]
    fn append_markup_into_element() {
        let doc = Document::parse(r#"<table><tbody id="pets"></tbody></table>"#).unwrap();
        let body = doc.find(doc.root(), "id", "pets").unwrap();
        let added = doc
            .append_markup(body, r#"<tr><td><input name="pets[0].name"></td></tr>"#)
            .unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(doc.query_attr(body, "name").len(), 1);
        assert!(doc.append_markup(body, "<tr>").is_err());
    }
}
