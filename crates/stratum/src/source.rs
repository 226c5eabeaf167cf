//! Configuration sources: one layer of values plus its provenance.

use std::fmt;
use std::path::{Path, PathBuf};

use stratum_value::ValueNode;

/// Where a source's values came from. Rendered in log messages and
/// available to filename resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Loaded from a file on disk.
    File(PathBuf),
    /// Built from process environment variables.
    Environment,
    /// Built from parsed command-line arguments.
    CommandLine,
    /// Set programmatically at runtime.
    Overlay,
    /// Application- or plugin-provided defaults.
    Default,
    /// A caller-described origin.
    Named(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Environment => write!(f, "environment"),
            Origin::CommandLine => write!(f, "command line"),
            Origin::Overlay => write!(f, "overlay"),
            Origin::Default => write!(f, "default"),
            Origin::Named(name) => write!(f, "{name}"),
        }
    }
}

/// One layer in the configuration stack: a value tree plus provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    tree: ValueNode,
    origin: Origin,
    default: bool,
    base_for_paths: Option<PathBuf>,
}

impl Source {
    /// A source holding `tree`, attributed to `origin`.
    pub fn new(tree: ValueNode, origin: Origin) -> Self {
        Source {
            tree,
            origin,
            default: false,
            base_for_paths: None,
        }
    }

    /// Mark this source as a defaults layer. Default sources resolve
    /// like any other but can be excluded from dumps.
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    /// Override the directory relative filenames in this source resolve
    /// against.
    pub fn with_base_for_paths(mut self, base: impl Into<PathBuf>) -> Self {
        self.base_for_paths = Some(base.into());
        self
    }

    /// The value tree this source contributes.
    pub fn tree(&self) -> &ValueNode {
        &self.tree
    }

    /// The provenance descriptor.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Whether this is a defaults layer.
    pub fn is_default(&self) -> bool {
        self.default
    }

    /// The file this source was loaded from, if it was loaded from one.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::File(path) => Some(path),
            _ => None,
        }
    }

    /// The directory containing this source's file, if any.
    pub fn file_dir(&self) -> Option<&Path> {
        self.file_path().and_then(Path::parent)
    }

    /// The explicit base directory for relative filenames, if one was
    /// configured.
    pub fn base_for_paths(&self) -> Option<&Path> {
        self.base_for_paths.as_deref()
    }
}
