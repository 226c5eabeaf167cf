//! View paths: sequences of mapping keys and list indices.

use std::fmt;

/// One step into a nested tree: a mapping key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Descend into a mapping by key.
    Key(String),
    /// Descend into a sequence by position.
    Index(usize),
}

impl From<&str> for Step {
    fn from(key: &str) -> Self {
        Step::Key(key.to_string())
    }
}

impl From<String> for Step {
    fn from(key: String) -> Self {
        Step::Key(key)
    }
}

impl From<usize> for Step {
    fn from(index: usize) -> Self {
        Step::Index(index)
    }
}

/// The location of a view within the configuration hierarchy.
///
/// Paths render with `.` between keys and `#` before indices
/// (`servers#0.port`); the empty path renders as `root`. The rendered
/// form is what error messages use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ViewPath(Vec<Step>);

impl ViewPath {
    /// The empty path, addressing the whole configuration.
    pub fn root() -> Self {
        ViewPath(Vec::new())
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The steps from the root, in order.
    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    /// A new path extending this one by `step`.
    pub fn child(&self, step: impl Into<Step>) -> Self {
        let mut steps = self.0.clone();
        steps.push(step.into());
        ViewPath(steps)
    }

    /// Parse a dotted key string into a path of keys (`"redis.host"`
    /// becomes two steps). Indices cannot be written this way.
    pub fn from_dotted(dotted: &str) -> Self {
        if dotted.is_empty() {
            return ViewPath::root();
        }
        ViewPath(dotted.split('.').map(Step::from).collect())
    }
}

impl FromIterator<Step> for ViewPath {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        ViewPath(iter.into_iter().collect())
    }
}

impl fmt::Display for ViewPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "root");
        }
        for (i, step) in self.0.iter().enumerate() {
            match step {
                Step::Key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                Step::Index(index) => write!(f, "#{index}")?,
            }
        }
        Ok(())
    }
}
