//! Property paths: parsing `"pets[0].name"` and reading/writing through them.
//!
//! A single-segment path is handed to the model verbatim, brackets and all.
//! Longer paths walk left to right: a plain `key` segment reads through a
//! model's `get` or an object's field, a `key[index]` segment reads the array
//! at `key` and indexes it.
//!
//! Reading stops with `Null` at the first falsy intermediate value (`0`,
//! `""`, `false` included). Writing materializes missing or falsy plain
//! segments as empty objects, but never creates arrays or array elements.
//! Writes below a top-level attribute mutate it in place and do not raise
//! the root model's `change`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::Model;
use crate::value::Value;

// ── PathSegment ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// `name`
    Key(String),
    /// `pets[0]`
    Index { key: String, index: usize },
}

impl PathSegment {
    pub fn key(&self) -> &str {
        match self {
            PathSegment::Key(key) | PathSegment::Index { key, .. } => key,
        }
    }

    fn parse(path: &str, part: &str) -> Result<Self> {
        let Some(open) = part.find('[') else {
            if part.is_empty() {
                return Err(Error::malformed(path, "empty segment"));
            }
            return Ok(PathSegment::Key(part.to_string()));
        };
        let key = &part[..open];
        if key.is_empty() {
            return Err(Error::malformed(path, format!("segment `{part}` has no name before `[`")));
        }
        let inner = &part[open + 1..];
        let Some(close) = inner.find(']') else {
            return Err(Error::malformed(path, format!("segment `{part}` is missing `]`")));
        };
        if close + 1 != inner.len() {
            return Err(Error::malformed(path, format!("unexpected text after `]` in `{part}`")));
        }
        let digits = &inner[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::malformed(
                path,
                format!("index `{digits}` is not a non-negative integer"),
            ));
        }
        let index = digits
            .parse()
            .map_err(|_| Error::malformed(path, format!("index `{digits}` is too large")))?;
        Ok(PathSegment::Index { key: key.to_string(), index })
    }
}

// ── PropPath ──────────────────────────────────────────────────────────────

/// A parsed property path. Keeps the raw text, which is what change
/// notifications are matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl PropPath {
    /// Parse `raw`. Text without a dot, the empty string included, is a
    /// single top-level key.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments = if raw.contains('.') {
            raw.split('.')
                .map(|part| PathSegment::parse(raw, part))
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![PathSegment::Key(raw.to_string())]
        };
        Ok(Self { raw: raw.to_string(), segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// `true` for paths resolved directly against the model's own attributes.
    pub fn is_top_level(&self) -> bool {
        self.segments.len() == 1
    }
}

impl FromStr for PropPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PropPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────

fn missing_container(path: &PropPath, key: &str) -> Error {
    Error::MissingContainer { path: path.raw.clone(), key: key.to_string() }
}

fn not_a_container(path: &PropPath, key: &str) -> Error {
    Error::NotAContainer { path: path.raw.clone(), key: key.to_string() }
}

/// Index into the array held by `array`, which was read from `key`.
fn element_mut<'v>(array: &'v mut Value, path: &PropPath, key: &str, index: usize) -> Result<&'v mut Value> {
    let Value::Array(items) = array else {
        return Err(missing_container(path, key));
    };
    let len = items.len();
    items.get_mut(index).ok_or_else(|| Error::IndexOutOfRange {
        path: path.raw.clone(),
        key: key.to_string(),
        index,
        len,
    })
}

fn element(array: &Value, path: &PropPath, key: &str, index: usize) -> Result<Value> {
    let Value::Array(items) = array else {
        return Err(missing_container(path, key));
    };
    items.get(index).cloned().ok_or_else(|| Error::IndexOutOfRange {
        path: path.raw.clone(),
        key: key.to_string(),
        index,
        len: items.len(),
    })
}

// ── Get ───────────────────────────────────────────────────────────────────

/// Read the value at `path`. See the module docs for the falsy short-circuit.
pub fn resolve_get(model: &Model, path: &PropPath) -> Result<Value> {
    if path.is_top_level() {
        return Ok(model.get(&path.raw));
    }

    let last = path.segments.len() - 1;
    let mut current = Value::Model(model.clone());
    for (i, segment) in path.segments.iter().enumerate() {
        current = match segment {
            PathSegment::Key(key) => {
                let next = current.get_key(key);
                if i < last && !next.is_truthy() {
                    return Ok(Value::Null);
                }
                next
            }
            PathSegment::Index { key, index } => {
                let array = current.get_key(key);
                element(&array, path, key, *index)?
            }
        };
    }
    Ok(current)
}

/// Parse `raw` and read through it.
pub fn get_path(model: &Model, raw: &str) -> Result<Value> {
    resolve_get(model, &PropPath::parse(raw)?)
}

// ── Set ───────────────────────────────────────────────────────────────────

/// What a walk through one container produced.
enum Step {
    Done,
    /// The walk reached a nested model; continue at segment `.1` inside it
    /// once the enclosing attribute is no longer borrowed.
    Enter(Model, usize),
}

/// Write `value` at `path`, creating empty objects for missing plain
/// segments.
pub fn resolve_set(model: &Model, path: &PropPath, value: Value) -> Result<()> {
    if path.is_top_level() {
        return model.set(path.raw.clone(), value);
    }

    let mut value = Some(value);
    let mut current = model.clone();
    let mut at = 0;
    loop {
        match step_model(&current, path, at, &mut value)? {
            Step::Done => return Ok(()),
            Step::Enter(next, next_at) => {
                current = next;
                at = next_at;
            }
        }
    }
}

/// Parse `raw` and write through it.
pub fn set_path(model: &Model, raw: &str, value: impl Into<Value>) -> Result<()> {
    resolve_set(model, &PropPath::parse(raw)?, value.into())
}

fn step_model(model: &Model, path: &PropPath, at: usize, value: &mut Option<Value>) -> Result<Step> {
    let segment = &path.segments[at];
    let is_last = at + 1 == path.segments.len();

    match segment {
        PathSegment::Key(key) if is_last => {
            model.set(key.clone(), value.take().unwrap_or_default())?;
            Ok(Step::Done)
        }
        PathSegment::Key(key) => {
            if !model.read(key, Value::is_truthy) {
                model.set(key.clone(), Value::empty_object())?;
            }
            if let Value::Model(inner) = model.get(key) {
                return Ok(Step::Enter(inner, at + 1));
            }
            model
                .update_in_place(key, |slot| walk(slot, path, at + 1, value))
                .unwrap_or_else(|| Err(not_a_container(path, key)))
        }
        PathSegment::Index { key, index } => model
            .update_in_place(key, |array| {
                let slot = element_mut(array, path, key, *index)?;
                if is_last {
                    *slot = value.take().unwrap_or_default();
                    return Ok(Step::Done);
                }
                walk(slot, path, at + 1, value)
            })
            .unwrap_or_else(|| Err(missing_container(path, key))),
    }
}

/// Walk a plain graph starting at `current`, the container segment `at`
/// lives in.
fn walk(mut current: &mut Value, path: &PropPath, mut at: usize, value: &mut Option<Value>) -> Result<Step> {
    let last = path.segments.len() - 1;
    loop {
        if let Value::Model(inner) = &*current {
            return Ok(Step::Enter(inner.clone(), at));
        }
        current = match &path.segments[at] {
            PathSegment::Key(key) => {
                let Value::Object(map) = current else {
                    return Err(not_a_container(path, key));
                };
                if at == last {
                    map.insert(key.clone(), value.take().unwrap_or_default());
                    return Ok(Step::Done);
                }
                let slot = map.entry(key.clone()).or_default();
                if !slot.is_truthy() {
                    *slot = Value::empty_object();
                }
                slot
            }
            PathSegment::Index { key, index } => {
                let Value::Object(map) = current else {
                    return Err(missing_container(path, key));
                };
                let array = map.get_mut(key).ok_or_else(|| missing_container(path, key))?;
                let slot = element_mut(array, path, key, *index)?;
                if at == last {
                    *slot = value.take().unwrap_or_default();
                    return Ok(Step::Done);
                }
                slot
            }
        };
        at += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn person() -> Model {
        Model::with_attributes([
            ("firstName", Value::from("Bob")),
            ("count", Value::from(0)),
            (
                "pets",
                Value::array([Value::object([
                    ("name", Value::from("Gary")),
                    ("type", Value::from("Dog")),
                ])]),
            ),
        ])
    }

    fn change_counter(model: &Model) -> Rc<Cell<usize>> {
        let n = Rc::new(Cell::new(0));
        let c = Rc::clone(&n);
        model.on_change(Rc::new(move |_: &crate::model::ChangeSet| -> Result<()> {
            c.set(c.get() + 1);
            Ok(())
        }));
        n
    }

    #[test]
    fn parse_segments() {
        let p = PropPath::parse("pets[10].name").unwrap();
        assert_eq!(
            p.segments(),
            &[
                PathSegment::Index { key: "pets".into(), index: 10 },
                PathSegment::Key("name".into()),
            ]
        );
        assert!(!p.is_top_level());
        assert_eq!(p.to_string(), "pets[10].name");
    }

    #[test]
    fn single_segment_is_verbatim() {
        let p = PropPath::parse("pets[0]").unwrap();
        assert_eq!(p.segments(), &[PathSegment::Key("pets[0]".into())]);
    }

    #[test]
    fn malformed_paths() {
        for raw in ["a..b", ".", "a.", "a.[0]", "a.b[x]", "a.b[]", "a.b[0", "a.b[0]x", "a.b[-1]"] {
            assert!(
                matches!(PropPath::parse(raw), Err(Error::MalformedPath { .. })),
                "{raw} should be malformed"
            );
        }
    }

    #[test]
    fn top_level_matches_model_get() {
        let model = person();
        for name in ["firstName", "count", "pets", "missing"] {
            assert_eq!(get_path(&model, name).unwrap(), model.get(name));
        }
    }

    #[test]
    fn reads_through_arrays() {
        let model = person();
        assert_eq!(get_path(&model, "pets[0].name").unwrap(), Value::from("Gary"));
        assert_eq!(get_path(&model, "pets[0].missing").unwrap(), Value::Null);
    }

    #[test]
    fn falsy_intermediate_reads_null() {
        let model = Model::with_attributes([
            ("address", Value::from("")),
            ("stats", Value::object([("zero", Value::from(0))])),
        ]);
        assert_eq!(get_path(&model, "address.city").unwrap(), Value::Null);
        assert_eq!(get_path(&model, "nothing.here").unwrap(), Value::Null);
        // A falsy final value is returned as-is.
        assert_eq!(get_path(&model, "stats.zero").unwrap(), Value::from(0));
    }

    #[test]
    fn zero_and_false_intermediates_read_null() {
        let model = Model::with_attributes([("n", Value::from(0)), ("f", Value::from(false))]);
        assert_eq!(get_path(&model, "n.x").unwrap(), Value::Null);
        assert_eq!(get_path(&model, "f.x").unwrap(), Value::Null);
        assert_eq!(get_path(&model, "n.x.y").unwrap(), Value::Null);
    }

    #[test]
    fn empty_name_is_a_top_level_key() {
        let path = PropPath::parse("").unwrap();
        assert!(path.is_top_level());
        assert_eq!(path.segments(), [PathSegment::Key(String::new())]);

        let model = Model::new();
        set_path(&model, "", "x").unwrap();
        assert_eq!(model.get(""), Value::from("x"));
        assert_eq!(get_path(&model, "").unwrap(), Value::from("x"));
    }

    #[test]
    fn out_of_range_and_missing_arrays_fail() {
        let model = person();
        assert!(matches!(
            get_path(&model, "pets[3].name"),
            Err(Error::IndexOutOfRange { index: 3, len: 1, .. })
        ));
        assert!(matches!(get_path(&model, "toys[0].name"), Err(Error::MissingContainer { .. })));
        assert!(matches!(
            set_path(&model, "toys[0].name", "Ball"),
            Err(Error::MissingContainer { .. })
        ));
        assert!(matches!(
            set_path(&model, "pets[1].name", "Max"),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn round_trip() {
        let model = person();
        set_path(&model, "firstName", "Patrick").unwrap();
        assert_eq!(get_path(&model, "firstName").unwrap(), Value::from("Patrick"));
        set_path(&model, "pets[0].name", "Max").unwrap();
        assert_eq!(get_path(&model, "pets[0].name").unwrap(), Value::from("Max"));
        set_path(&model, "address.city", "Bikini Bottom").unwrap();
        assert_eq!(get_path(&model, "address.city").unwrap(), Value::from("Bikini Bottom"));
    }

    #[test]
    fn materializes_falsy_intermediates() {
        let model = Model::with_attributes([("address", Value::from(""))]);
        set_path(&model, "address.geo.lat", 1.5).unwrap();
        assert_eq!(get_path(&model, "address.geo").unwrap().as_object().map(|m| m.len()), Some(1));
        set_path(&model, "address.geo.lng", 2.5).unwrap();
        assert_eq!(get_path(&model, "address.geo.lat").unwrap(), Value::from(1.5));
        assert_eq!(get_path(&model, "address.geo.lng").unwrap(), Value::from(2.5));
    }

    #[test]
    fn nested_writes_are_silent() {
        let model = person();
        let changes = change_counter(&model);
        set_path(&model, "pets[0].name", "Max").unwrap();
        assert_eq!(changes.get(), 0);
        // Materializing a missing top-level container is a top-level write.
        set_path(&model, "address.city", "Rock Bottom").unwrap();
        assert_eq!(changes.get(), 1);
        set_path(&model, "address.zip", "00001").unwrap();
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn writes_into_nested_models_notify_them() {
        let owner = Model::with_attributes([("name", Value::from("Sandy"))]);
        let pets = Value::array([Value::object([("owner", Value::from(owner.clone()))])]);
        let model = Model::with_attributes([("pets", pets)]);
        let root_changes = change_counter(&model);
        let owner_changes = change_counter(&owner);

        set_path(&model, "pets[0].owner.name", "Squidward").unwrap();
        assert_eq!(owner.get("name"), Value::from("Squidward"));
        assert_eq!(get_path(&model, "pets[0].owner.name").unwrap(), Value::from("Squidward"));
        assert_eq!(owner_changes.get(), 1);
        assert_eq!(root_changes.get(), 0);
    }

    #[test]
    fn writing_through_a_scalar_fails() {
        let model = Model::with_attributes([("firstName", Value::from("Bob"))]);
        assert!(matches!(
            set_path(&model, "firstName.first", "B"),
            Err(Error::NotAContainer { .. })
        ));
    }

    #[test]
    fn array_terminal_replaces_element() {
        let model = Model::with_attributes([("tags", Value::array(["a".into(), "b".into()]))]);
        set_path(&model, "x.y", 1).unwrap();
        let wrapped = Model::with_attributes([(
            "box",
            Value::object([("tags", Value::array(["a".into()]))]),
        )]);
        set_path(&wrapped, "box.tags[0]", "z").unwrap();
        assert_eq!(get_path(&wrapped, "box.tags[0]").unwrap(), Value::from("z"));
        assert_eq!(model.get("x").get_key("y"), Value::from(1));
    }
}
