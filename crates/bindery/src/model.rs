//! Observable attribute store.
//!
//! A [`Model`] owns a flat map of top-level attributes. Mutating one through
//! [`Model::set`] raises a single `change` notification carrying a
//! [`ChangeSet`]; values nested inside an attribute are plain data and can be
//! edited silently with [`Model::update_in_place`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::value::Value;

// ── ChangeSet ─────────────────────────────────────────────────────────────

/// The top-level attributes changed by one mutation, in the order they were
/// applied, with their new values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<(String, Value)>,
}

impl ChangeSet {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.changes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.changes.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

// ── Subscription ──────────────────────────────────────────────────────────

/// Handle returned by [`Model::on_change`]; pass it to [`Model::off_change`]
/// to remove exactly that listener.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Callback invoked with every change set. An error aborts the remaining
/// listeners and is returned from the mutating call.
pub type ChangeListener = Rc<dyn Fn(&ChangeSet) -> Result<()>>;

// ── Model ─────────────────────────────────────────────────────────────────

struct ModelInner {
    attributes: RefCell<BTreeMap<String, Value>>,
    changed: RefCell<ChangeSet>,
    listeners: RefCell<Vec<(Subscription, ChangeListener)>>,
    next_subscription: Cell<u64>,
}

/// Shared handle to an attribute store. Cloning is cheap and yields the same
/// store.
#[derive(Clone)]
pub struct Model(Rc<ModelInner>);

/// Non-owning handle, held by listeners the model itself keeps alive.
#[derive(Clone)]
pub struct WeakModel(Weak<ModelInner>);

impl WeakModel {
    pub fn upgrade(&self) -> Option<Model> {
        self.0.upgrade().map(Model)
    }
}

impl Model {
    pub fn new() -> Self {
        Self(Rc::new(ModelInner {
            attributes: RefCell::new(BTreeMap::new()),
            changed: RefCell::new(ChangeSet::default()),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(1),
        }))
    }

    /// Build a model with initial attributes. No notification is raised.
    pub fn with_attributes<K, I>(attrs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let model = Self::new();
        model
            .0
            .attributes
            .borrow_mut()
            .extend(attrs.into_iter().map(|(k, v)| (k.into(), v)));
        model
    }

    pub fn downgrade(&self) -> WeakModel {
        WeakModel(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Model) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Copy of a top-level attribute, `Null` when absent.
    pub fn get(&self, key: &str) -> Value {
        self.0.attributes.borrow().get(key).cloned().unwrap_or_default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.attributes.borrow().contains_key(key)
    }

    /// Borrow a top-level attribute without copying it.
    pub fn read<R>(&self, key: &str, f: impl FnOnce(&Value) -> R) -> R {
        let attrs = self.0.attributes.borrow();
        f(attrs.get(key).unwrap_or(&Value::Null))
    }

    /// Snapshot of every attribute.
    pub fn attributes(&self) -> BTreeMap<String, Value> {
        self.0.attributes.borrow().clone()
    }

    /// The change set of the most recent notifying mutation.
    pub fn changed_attributes(&self) -> ChangeSet {
        self.0.changed.borrow().clone()
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Set one attribute. Raises `change` only if the value differs.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.set_many([(key.into(), value.into())])
    }

    /// Set several attributes at once, raising a single `change` listing the
    /// ones that actually changed in the order given.
    pub fn set_many<K, I>(&self, attrs: I) -> Result<()>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut changes = Vec::new();
        {
            let mut current = self.0.attributes.borrow_mut();
            for (key, value) in attrs {
                let key = key.into();
                if current.get(&key) == Some(&value) {
                    continue;
                }
                current.insert(key.clone(), value.clone());
                changes.push((key, value));
            }
        }
        self.emit(ChangeSet { changes })
    }

    /// Remove an attribute. The change set reports it as `Null`.
    pub fn unset(&self, key: &str) -> Result<()> {
        let removed = self.0.attributes.borrow_mut().remove(key).is_some();
        if !removed {
            return Ok(());
        }
        self.emit(ChangeSet { changes: vec![(key.to_string(), Value::Null)] })
    }

    /// Mutate a nested value in place without raising `change`.
    ///
    /// Returns `None` if the attribute does not exist. The attribute store is
    /// borrowed for the duration of `f`, so `f` must not touch this model.
    pub fn update_in_place<R>(&self, key: &str, f: impl FnOnce(&mut Value) -> R) -> Option<R> {
        let mut attrs = self.0.attributes.borrow_mut();
        attrs.get_mut(key).map(f)
    }

    // ── Listeners ─────────────────────────────────────────────────────────

    pub fn on_change(&self, listener: ChangeListener) -> Subscription {
        let id = self.0.next_subscription.get();
        self.0.next_subscription.set(id + 1);
        let sub = Subscription(id);
        self.0.listeners.borrow_mut().push((sub, listener));
        sub
    }

    /// Returns `false` if the subscription was not registered.
    pub fn off_change(&self, sub: Subscription) -> bool {
        let mut listeners = self.0.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(s, _)| *s != sub);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    fn emit(&self, changes: ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        *self.0.changed.borrow_mut() = changes.clone();
        log::trace!("model change: {:?}", changes.names().collect::<Vec<_>>());

        // Listeners may read or write this model, so none of its cells stay
        // borrowed while they run.
        let listeners: Vec<ChangeListener> =
            self.0.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(&changes)?;
        }
        Ok(())
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.attributes.try_borrow() {
            Ok(attrs) => f.debug_tuple("Model").field(&*attrs).finish(),
            Err(_) => f.write_str("Model(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(model: &Model) -> Rc<RefCell<Vec<Vec<String>>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        model.on_change(Rc::new(move |changes: &ChangeSet| -> Result<()> {
            sink.borrow_mut().push(changes.names().map(str::to_string).collect());
            Ok(())
        }));
        seen
    }

    #[test]
    fn set_notifies_only_on_difference() {
        let model = Model::with_attributes([("firstName", Value::from("Bob"))]);
        let seen = recorder(&model);
        model.set("firstName", "Bob").unwrap();
        assert!(seen.borrow().is_empty());
        model.set("firstName", "Patrick").unwrap();
        assert_eq!(*seen.borrow(), vec![vec!["firstName".to_string()]]);
        assert_eq!(model.get("firstName"), Value::from("Patrick"));
    }

    #[test]
    fn set_many_keeps_order() {
        let model = Model::new();
        let seen = recorder(&model);
        model
            .set_many([("zeta", Value::from(1)), ("alpha", Value::from(2))])
            .unwrap();
        assert_eq!(*seen.borrow(), vec![vec!["zeta".to_string(), "alpha".to_string()]]);
        let last = model.changed_attributes();
        assert_eq!(last.get("alpha"), Some(&Value::from(2)));
    }

    #[test]
    fn unset_reports_null() {
        let model = Model::with_attributes([("color", Value::from("Pink"))]);
        let seen = recorder(&model);
        model.unset("color").unwrap();
        model.unset("color").unwrap();
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(model.changed_attributes().get("color"), Some(&Value::Null));
        assert!(!model.has("color"));
    }

    #[test]
    fn update_in_place_is_silent() {
        let pets = Value::array([Value::object([("name", Value::from("Gary"))])]);
        let model = Model::with_attributes([("pets", pets)]);
        let seen = recorder(&model);
        model.update_in_place("pets", |v| {
            if let Value::Array(items) = v {
                items.push(Value::object([("name", Value::from("Max"))]));
            }
        });
        assert!(seen.borrow().is_empty());
        assert_eq!(model.get("pets").as_array().map(<[Value]>::len), Some(2));
        assert!(model.update_in_place("missing", |_| ()).is_none());
    }

    #[test]
    fn off_change_removes_one_listener() {
        let model = Model::new();
        let sub = model.on_change(Rc::new(|_: &ChangeSet| -> Result<()> { Ok(()) }));
        let _other = model.on_change(Rc::new(|_: &ChangeSet| -> Result<()> { Ok(()) }));
        assert!(model.off_change(sub));
        assert!(!model.off_change(sub));
        assert_eq!(model.listener_count(), 1);
    }

    #[test]
    fn listeners_can_reenter() {
        let model = Model::with_attributes([("a", Value::from(1))]);
        let weak = model.downgrade();
        model.on_change(Rc::new(move |changes: &ChangeSet| -> Result<()> {
            if let (Some(m), true) = (weak.upgrade(), changes.contains("a")) {
                let doubled = m.get("a").as_f64().unwrap_or(0.0) * 2.0;
                m.set("b", doubled)?;
            }
            Ok(())
        }));
        model.set("a", 4).unwrap();
        assert_eq!(model.get("b"), Value::from(8));
    }
}
