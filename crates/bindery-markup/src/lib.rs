//! Lexer, parser, and AST for the HTML-subset markup bindery views are
//! declared in.
//!
//! This crate is intentionally dependency-free so tooling that only needs to
//! read markup (linters, template checkers) can use it without the binding
//! runtime.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ast`] | `Fragment`, `Node`, `ElementNode`, `Attr` |
//! | [`error`] | `ParseError` |
//! | [`lexer`] | `Lexer`, `Token`, entity decoding |
//! | [`parser`] | `parse_str` entry point |
//!
//! # Quick start
//!
//! ```rust
//! use bindery_markup::parse_str;
//!
//! let src = r#"
//!     <form>
//!         <input name="firstName" type="text">
//!         <span name="firstName"></span>
//!     </form>
//! "#;
//!
//! let doc = parse_str(src).unwrap();
//! let form = doc.root().unwrap();
//! assert_eq!(form.tag, "form");
//! assert_eq!(form.elements().count(), 2);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Attr, ElementNode, Fragment, Node};
pub use error::ParseError;
pub use parser::parse_str;
