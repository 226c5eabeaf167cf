//! The root configuration: an ordered stack of sources.
//!
//! Index 0 is the highest priority. `set`-style operations push a new
//! source on top; `add`-style operations append underneath, which is
//! how application defaults are registered. Nothing is merged eagerly;
//! views resolve against the stack on demand.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use stratum_value::ValueNode;
use tracing::debug;

use crate::args::{self, Namespace};
use crate::env;
use crate::error::{ConfigError, Result};
use crate::flatten;
use crate::path::{Step, ViewPath};
use crate::source::{Origin, Source};
use crate::view::{self, Match, MatchStack, View};

/// Application directory context for filename resolution.
///
/// Discovery of platform-specific locations is the caller's business;
/// this only records the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    /// The application's own configuration directory. Relative paths
    /// from file sources resolve against this by default.
    pub config_dir: PathBuf,
    /// Candidate per-user configuration files, in priority order.
    pub user_config_paths: Vec<PathBuf>,
    /// A system-wide configuration file, if the platform has one.
    pub sys_config_path: Option<PathBuf>,
}

impl Directories {
    /// Directory context rooted at a single configuration directory,
    /// with the conventional `config.yaml` inside it as the user file.
    pub fn at(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let user = config_dir.join("config.yaml");
        Directories {
            config_dir,
            user_config_paths: vec![user],
            sys_config_path: None,
        }
    }
}

/// A layered configuration: the source stack plus lookup state.
#[derive(Debug, Clone, Default)]
pub struct RootConfig {
    sources: Vec<Source>,
    redactions: HashSet<ViewPath>,
    directories: Option<Directories>,
}

impl RootConfig {
    /// An empty configuration with no sources.
    pub fn new() -> Self {
        RootConfig::default()
    }

    /// Attach application directory context for filename resolution.
    pub fn with_directories(mut self, directories: Directories) -> Self {
        self.directories = Some(directories);
        self
    }

    /// The attached directory context, if any.
    pub fn directories(&self) -> Option<&Directories> {
        self.directories.as_ref()
    }

    /// The source stack, highest priority first.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// A view of the whole configuration.
    pub fn view(&self) -> View<'_> {
        View::new(self, ViewPath::root())
    }

    /// A view at a dotted key path.
    pub fn at(&self, dotted: &str) -> View<'_> {
        View::new(self, ViewPath::from_dotted(dotted))
    }

    /// Push a tree as the new highest-priority source.
    pub fn set(&mut self, tree: ValueNode, origin: Origin) {
        debug!(origin = %origin, "pushing override source");
        self.sources.insert(0, Source::new(tree, origin));
    }

    /// Append a tree as the new lowest-priority source, marked as a
    /// defaults layer.
    pub fn add(&mut self, tree: ValueNode, origin: Origin) {
        debug!(origin = %origin, "appending default source");
        self.sources.push(Source::new(tree, origin).as_default());
    }

    /// Push an already-built source on top of the stack.
    pub fn push_source(&mut self, source: Source) {
        debug!(origin = %source.origin(), "pushing source");
        self.sources.insert(0, source);
    }

    /// Load a YAML file as the new highest-priority source, optionally
    /// fixing the base directory its relative filename values resolve
    /// against.
    ///
    /// A file that does not exist contributes an empty mapping rather
    /// than failing, so optional user configuration files can be loaded
    /// unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file exists but cannot be
    /// read or parsed.
    pub fn set_file(
        &mut self,
        path: impl AsRef<Path>,
        base_for_paths: Option<PathBuf>,
    ) -> Result<()> {
        let source = load_file(path.as_ref(), base_for_paths)?;
        debug!(file = %path.as_ref().display(), "pushing file source");
        self.sources.insert(0, source);
        Ok(())
    }

    /// Load a YAML file as a lowest-priority defaults source,
    /// optionally fixing the base directory its relative filename
    /// values resolve against.
    pub fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        base_for_paths: Option<PathBuf>,
    ) -> Result<()> {
        let source = load_file(path.as_ref(), base_for_paths)?.as_default();
        debug!(file = %path.as_ref().display(), "appending default file source");
        self.sources.push(source);
        Ok(())
    }

    /// Load the configuration files named by the attached
    /// [`Directories`].
    ///
    /// Per-user files are pushed in their listed priority order; the
    /// system-wide file, if any, is appended as a defaults layer
    /// underneath. Files that do not exist contribute empty mappings.
    /// Without attached directories nothing is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] for the first file that exists but
    /// cannot be read or parsed.
    pub fn read(&mut self) -> Result<()> {
        let Some(directories) = self.directories.clone() else {
            debug!("no directories attached, nothing to read");
            return Ok(());
        };
        // Reverse so the first listed file ends up on top.
        for path in directories.user_config_paths.iter().rev() {
            self.set_file(path, None)?;
        }
        if let Some(path) = &directories.sys_config_path {
            self.add_file(path, None)?;
        }
        Ok(())
    }

    /// Build a source from environment variables carrying `prefix`,
    /// splitting nested keys on `sep`, and push it on top.
    pub fn set_env(&mut self, prefix: &str, sep: &str) {
        self.set_env_from(std::env::vars(), prefix, sep);
    }

    /// Like [`RootConfig::set_env`], but over an explicit variable
    /// iterator, for tests and custom environments.
    pub fn set_env_from<I>(&mut self, vars: I, prefix: &str, sep: &str)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let tree = env::tree_from_vars(vars, prefix, sep);
        debug!(prefix, "pushing environment source");
        self.sources.insert(0, Source::new(tree, Origin::Environment));
    }

    /// Build a source from a parsed-argument namespace and push it on
    /// top. Null values are dropped; with `dots`, dotted option names
    /// expand into nested mappings.
    pub fn set_args(&mut self, namespace: &Namespace, dots: bool) {
        let tree = args::tree_from_namespace(namespace, dots);
        debug!("pushing command-line source");
        self.sources.insert(0, Source::new(tree, Origin::CommandLine));
    }

    /// Set a single value, addressed by path, as a highest-priority
    /// overlay.
    pub fn set_at(&mut self, path: &ViewPath, value: ValueNode) {
        debug!(path = %path, "pushing overlay source");
        self.sources
            .insert(0, Source::new(singleton_tree(path, value), Origin::Overlay));
    }

    /// Set a single value as a lowest-priority default.
    pub fn add_at(&mut self, path: &ViewPath, value: ValueNode) {
        debug!(path = %path, "appending overlay default");
        self.sources.push(
            Source::new(singleton_tree(path, value), Origin::Overlay).as_default(),
        );
    }

    /// Remove every source and redaction flag, for test isolation.
    pub fn clear(&mut self) {
        debug!("clearing all sources");
        self.sources.clear();
        self.redactions.clear();
    }

    /// Re-read every file-backed source from disk in place,
    /// preserving stack order and per-source settings.
    ///
    /// # Errors
    ///
    /// Returns the first read or parse failure; sources before the
    /// failing one keep their re-read trees.
    pub fn reload(&mut self) -> Result<()> {
        debug!("reloading file sources");
        for source in &mut self.sources {
            let Some(path) = source.file_path().map(Path::to_path_buf) else {
                continue;
            };
            let fresh = load_file(&path, source.base_for_paths().map(Path::to_path_buf))?;
            let fresh = if source.is_default() {
                fresh.as_default()
            } else {
                fresh
            };
            *source = fresh;
        }
        Ok(())
    }

    /// Mark (or unmark) a path so dumps replace its value with a
    /// tombstone.
    pub fn set_redaction(&mut self, path: ViewPath, redact: bool) {
        if redact {
            self.redactions.insert(path);
        } else {
            self.redactions.remove(&path);
        }
    }

    /// Whether a path is marked for redaction.
    pub fn is_redacted(&self, path: &ViewPath) -> bool {
        self.redactions.contains(path)
    }

    pub(crate) fn redactions(&self) -> &HashSet<ViewPath> {
        &self.redactions
    }

    /// Resolve a path against every source, best match first.
    pub fn resolve(&self, path: &ViewPath) -> MatchStack<'_> {
        let matches = self
            .sources
            .iter()
            .filter_map(|source| {
                view::walk(source.tree(), path.steps()).map(|value| Match::new(value, source))
            })
            .collect();
        MatchStack::new(matches)
    }

    /// Merge all sources into a single tree, highest priority winning
    /// per key; sequences and scalars are replaced whole. With
    /// `redact`, marked paths are replaced by `"REDACTED"`.
    pub fn flatten(&self, redact: bool) -> ValueNode {
        flatten::flatten(self, true, redact)
    }

    /// Serialize the merged configuration as YAML text. With `full`,
    /// defaults layers are included; with `redact`, marked paths are
    /// tombstoned.
    pub fn dump(&self, full: bool, redact: bool) -> String {
        stratum_yaml::emit(&flatten::flatten(self, full, redact))
    }
}

/// Build the minimal tree that holds `value` at `path`. Index steps
/// produce sequences padded with nulls up to the index.
fn singleton_tree(path: &ViewPath, value: ValueNode) -> ValueNode {
    let mut node = value;
    for step in path.steps().iter().rev() {
        node = match step {
            Step::Key(key) => {
                let mut map = IndexMap::new();
                map.insert(key.clone(), node);
                ValueNode::Map(map)
            }
            Step::Index(index) => {
                let mut items = vec![ValueNode::Null; *index];
                items.push(node);
                ValueNode::Seq(items)
            }
        };
    }
    node
}

fn load_file(path: &Path, base_for_paths: Option<PathBuf>) -> Result<Source> {
    let tree = match std::fs::read_to_string(path) {
        Ok(text) => match stratum_yaml::parse_str(&text) {
            // An empty file reads as null; treat it as an empty layer.
            Ok(ValueNode::Null) => ValueNode::empty_map(),
            Ok(tree) => tree,
            Err(err) => return Err(ConfigError::read_yaml(path.to_path_buf(), err)),
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => ValueNode::empty_map(),
        Err(err) => return Err(ConfigError::read_io(path.to_path_buf(), err)),
    };
    let mut source = Source::new(tree, Origin::File(path.to_path_buf()));
    if let Some(base) = base_for_paths {
        source = source.with_base_for_paths(base);
    }
    Ok(source)
}
