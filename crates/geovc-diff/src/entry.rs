use geovc_model::Node;

/// The kind of change a [`DiffEntry`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Present only on the new side.
    Added,
    /// Present only on the old side.
    Removed,
    /// Present on both sides with different content or metadata.
    Modified,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// One changed feature between two snapshots.
///
/// `path` is the full slash-separated path from the compared roots. At
/// least one side is always present.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffEntry {
    pub path: String,
    pub old: Option<Node>,
    pub new: Option<Node>,
}

impl DiffEntry {
    pub fn added(path: impl Into<String>, new: Node) -> Self {
        Self {
            path: path.into(),
            old: None,
            new: Some(new),
        }
    }

    pub fn removed(path: impl Into<String>, old: Node) -> Self {
        Self {
            path: path.into(),
            old: Some(old),
            new: None,
        }
    }

    pub fn modified(path: impl Into<String>, old: Node, new: Node) -> Self {
        Self {
            path: path.into(),
            old: Some(old),
            new: Some(new),
        }
    }

    pub fn change_type(&self) -> ChangeType {
        match (&self.old, &self.new) {
            (None, Some(_)) => ChangeType::Added,
            (Some(_), None) => ChangeType::Removed,
            _ => ChangeType::Modified,
        }
    }
}
