/// Restricts a diff to paths beneath a set of prefixes.
///
/// An empty prefix set matches everything. Prefixes are matched per path
/// segment: `"roads"` matches `"roads"` and `"roads/way/1"` but not
/// `"roadside/1"`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathFilter {
    prefixes: Vec<String>,
}

impl PathFilter {
    /// A filter matching every path.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter matching paths beneath any of the given prefixes.
    pub fn paths<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Should an entry at `path` be reported?
    pub fn matches(&self, path: &str) -> bool {
        self.is_all() || self.prefixes.iter().any(|p| is_under(path, p))
    }

    /// Can anything beneath the subtree at `path` match? Used to prune
    /// whole subtrees before reading them.
    pub fn may_contain(&self, path: &str) -> bool {
        if self.is_all() || path.is_empty() {
            return true;
        }
        self.prefixes
            .iter()
            .any(|p| is_under(path, p) || is_under(p, path))
    }
}

/// Is `path` equal to or a segment-wise descendant of `prefix`?
fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
