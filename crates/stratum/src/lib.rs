//! Layered configuration resolution with declarative validation.
//!
//! A configuration is an ordered stack of [`Source`]s (files,
//! environment variables, command-line arguments, programmatic
//! overlays), highest priority first. Reads go through lazy [`View`]s:
//! building a view costs nothing and touches no data; resolution walks
//! every source on demand and layers the results.
//!
//! # Key Features
//!
//! - **Layering**: every path resolves against the whole stack, so a
//!   single key can come from the environment while its sibling comes
//!   from a defaults file
//! - **Lazy views**: `config.view().key("redis").key("host")` is pure
//!   description; errors surface at access time with the full dotted
//!   path (`redis.host not found`)
//! - **Templates**: declarative [`Template`] values validate and
//!   convert whole subtrees in one call, with precise error paths like
//!   `servers#0.port: must be a number, not str`
//! - **Round-tripping**: [`RootConfig::dump`] flattens the stack back
//!   to YAML, order preserved, with optional redaction of sensitive
//!   paths
//!
//! # Example
//!
//! ```rust
//! use stratum::{Origin, RootConfig, Template};
//!
//! let mut config = RootConfig::new();
//! config.add(
//!     stratum_yaml::parse_str("host: localhost\nport: 6379\n").unwrap(),
//!     Origin::Default,
//! );
//! config.set_env_from(
//!     [("APP_PORT".to_string(), "9000".to_string())],
//!     "APP_",
//!     "__",
//! );
//!
//! let template = Template::schema([
//!     ("host", Template::string()),
//!     ("port", Template::integer()),
//! ]);
//! let resolved = config.view().get(&template).unwrap();
//! assert_eq!(resolved.as_map().unwrap()["port"].as_i64(), Some(9000));
//! ```

mod args;
mod env;
mod error;
mod flatten;
mod path;
mod paths;
mod root;
mod source;
mod template;
mod view;

pub use args::Namespace;
pub use error::{ConfigError, Result};
pub use flatten::REDACTED_TOMBSTONE;
pub use path::{Step, ViewPath};
pub use root::{Directories, RootConfig};
pub use source::{Origin, Source};
pub use template::{FilenameOptions, StrOptions, Template};
pub use view::{Match, MatchStack, View};

// Re-exported so callers can build trees without naming the value
// crate directly.
pub use stratum_value::ValueNode;
