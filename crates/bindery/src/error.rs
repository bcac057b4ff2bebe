use bindery_markup::ParseError;
use thiserror::Error;

/// Everything that can go wrong while binding, resolving a path, or
/// dispatching a change.
///
/// Nothing in the engine catches these: they surface from `bind`, from
/// [`Model::set`](crate::model::Model::set) through the change listeners, and
/// from [`Document::dispatch`](crate::dom::Document::dispatch) through element
/// listeners.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("malformed property path `{path}`: {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("index {index} is out of range for `{key}` (length {len}) in `{path}`")]
    IndexOutOfRange { path: String, key: String, index: usize, len: usize },

    /// A bracketed segment whose array does not exist. Arrays are never
    /// materialized on write.
    #[error("no array at `{key}` in `{path}`")]
    MissingContainer { path: String, key: String },

    #[error("cannot write through `{key}` in `{path}`: value is not an object")]
    NotAContainer { path: String, key: String },

    #[error("view has no handler named `{0}`")]
    UnknownHandler(String),

    #[error(transparent)]
    Markup(#[from] ParseError),
}

impl Error {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPath { path: path.to_string(), reason: reason.into() }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
