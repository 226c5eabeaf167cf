//! # stratum-yaml
//!
//! YAML adapter for the stratum configuration stack.
//!
//! Wraps [`yaml-rust2`](https://docs.rs/yaml-rust2) behind a small
//! "text in, value tree out" surface:
//!
//! - [`parse_str`] — one YAML document into a [`stratum_value::ValueNode`]
//!   tree, with insertion-ordered mappings and `%`-safe bare scalars.
//! - [`parse_scalar`] — coerce a single string the way a YAML scalar
//!   would read, for environment-variable values.
//! - [`emit`] — a value tree back into YAML text, order preserved, so
//!   dumped configurations round-trip.
//!
//! Parse failures report line/column from the scanner. This crate does
//! no file I/O; callers read the text and attach filenames to errors.

mod emitter;
mod error;
mod parser;

pub use emitter::emit;
pub use error::{Error, Result};
pub use parser::{parse_scalar, parse_str};
