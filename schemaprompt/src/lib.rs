//! # schemaprompt
//!
//! Interactive, line-oriented configuration prompts driven by a nested schema.
//!
//! A schema is a tree of [`Section`]s and [`Leaf`] prompts. Walking it asks the
//! operator for every leaf in declared order and returns a JSON value tree of
//! the same shape, ready to be serialized.
//!
//! ## Features
//!
//! - Explicit section/leaf model, optionally loaded from a JSON description
//! - Typed answers: `str`, `int` and lenient `bool`
//! - Defaults shown in brackets and accepted with an empty line
//! - Integer answers are re-asked until they parse
//! - Works on any `BufRead`/`Write` pair, so prompts are scriptable in tests
//!
//! ## Quick Start
//!
//! ```rust
//! use schemaprompt::{Leaf, Prompter, SchemaNode, Section, walk};
//!
//! let schema: SchemaNode = Section::new()
//!     .section("server", Section::new()
//!         .leaf("host", Leaf::string("Host", "localhost"))
//!         .leaf("port", Leaf::integer("Port", 8080)))
//!     .into();
//!
//! let mut out = Vec::new();
//! let mut prompter = Prompter::new(&b"\n9000\n"[..], &mut out);
//! let value = walk(&schema, &mut prompter).unwrap();
//! assert_eq!(value["server"]["port"], 9000);
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - Schema nodes and scalar types
//! - [`prompt`] - Typed line prompts
//! - [`walk`] - Recursive schema walk
//! - [`error`] - Error types

#[macro_use]
extern crate log;

/// Error types for schema loading and prompting.
pub mod error;

/// Typed line prompts over arbitrary input/output streams.
pub mod prompt;

/// Schema nodes, scalar types and JSON schema loading.
pub mod schema;

/// Recursive schema walk.
pub mod walk;

pub use error::{CoercionError, PromptError, SchemaError};
pub use prompt::Prompter;
pub use schema::{Leaf, ScalarType, ScalarValue, SchemaNode, Section};
pub use serde_json::Value;
pub use walk::walk;
