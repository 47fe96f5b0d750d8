//! # equivalence
//!
//! Decide whether a declared configuration document and the document
//! observed on the remote side are "the same".
//!
//! Documents are decoded into the closed [`Value`] model, compacted with
//! [`normalize`] and compared with a [`Comparator`]:
//!
//! - map key order never matters
//! - lists compare as multisets
//! - `null`, `{}` and `[]` members are treated as absent
//! - configured keys (by default `metricExpressions`) are ignored at any depth
//!
//! ## Example
//!
//! ```
//! use equivalence::{Comparator, equal_line_by_line, equal_text};
//!
//! assert!(equal_text(r#"{"tags": ["a", "b"], "owner": null}"#, r#"{"tags": ["b", "a"]}"#));
//! assert!(equal_line_by_line("echo hi\r\n", "echo hi"));
//!
//! // Empty text means "unknown" and never matches
//! assert!(!equal_text("", ""));
//!
//! // Numbers in JSON text compare by value
//! assert!(equal_text(r#"{"n": 1}"#, r#"{"n": 1.0}"#));
//!
//! // Decoded values keep integers and floats apart by default
//! let comparator = Comparator::default();
//! let a = equivalence::from_json_str(r#"{"n": 1}"#).unwrap();
//! let b = equivalence::from_json_str(r#"{"n": 1.0}"#).unwrap();
//! assert!(!comparator.equal(&a, &b));
//! ```

#![warn(missing_docs)]

pub mod compare;
pub mod error;
pub mod lenient;
pub mod normalize;
pub mod text;
pub mod value;

pub use compare::{Comparator, DEFAULT_IGNORE_KEYS, ListMatching, NumberMode, Options, equal};
pub use error::{Error, Result};
pub use lenient::{OneOrMany, one_or_many};
pub use normalize::{Compacted, normalize};
pub use text::{
    SuppressFn, equal_line_by_line, equal_text, suppress_json_or_lines, suppress_lines,
    try_equal_text,
};
pub use value::{Number, Value, from_json_str};
