use geovc_types::ObjectId;

use crate::error::{RefError, RefResult};

/// The symbolic ref naming the checked-out branch.
pub const HEAD: &str = "HEAD";
/// Prefix of local branch refs.
pub const R_HEADS: &str = "refs/heads/";
/// Prefix of tag refs.
pub const R_TAGS: &str = "refs/tags/";
/// Prefix of remote-tracking refs.
pub const R_REMOTES: &str = "refs/remotes/";

/// What a ref points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefValue {
    /// A commit (or tag object) ID.
    Direct(ObjectId),
    /// The name of another ref.
    Symbolic(String),
}

/// A named pointer into the commit graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ref {
    pub name: String,
    pub value: RefValue,
}

impl Ref {
    pub fn direct(name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            name: name.into(),
            value: RefValue::Direct(id),
        }
    }

    pub fn symbolic(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: RefValue::Symbolic(target.into()),
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self.value, RefValue::Symbolic(_))
    }

    /// The target ID of a direct ref.
    pub fn id(&self) -> Option<ObjectId> {
        match &self.value {
            RefValue::Direct(id) => Some(*id),
            RefValue::Symbolic(_) => None,
        }
    }

    /// Serialize to the one-line text form:
    /// `<name> <hex>` for direct refs, `<name> ref: <target>` for
    /// symbolic ones.
    pub fn to_line(&self) -> String {
        match &self.value {
            RefValue::Direct(id) => format!("{} {}", self.name, id.to_hex()),
            RefValue::Symbolic(target) => format!("{} ref: {}", self.name, target),
        }
    }

    /// Parse the one-line text form.
    pub fn parse_line(line: &str) -> RefResult<Self> {
        let line = line.trim_end_matches('\n');
        let (name, rest) = line
            .split_once(' ')
            .ok_or_else(|| RefError::Parse(line.to_string()))?;
        if !is_valid_ref_name(name) {
            return Err(RefError::InvalidName(name.to_string()));
        }
        if let Some(target) = rest.strip_prefix("ref: ") {
            if !is_valid_ref_name(target) {
                return Err(RefError::InvalidName(target.to_string()));
            }
            return Ok(Self::symbolic(name, target));
        }
        let id = ObjectId::from_hex(rest).map_err(|_| RefError::Parse(line.to_string()))?;
        Ok(Self::direct(name, id))
    }
}

/// Ref naming rules: slash-separated non-empty segments of printable
/// ASCII, no whitespace or the `git`-reserved punctuation, no segment
/// starting with a dot, no `..`, and no trailing slash or dot.
pub fn is_valid_ref_name(name: &str) -> bool {
    if name.is_empty() || name.ends_with('/') || name.ends_with('.') || name.contains("..") {
        return false;
    }
    for segment in name.split('/') {
        if segment.is_empty() || segment.starts_with('.') || segment.ends_with(".lock") {
            return false;
        }
        let ok = segment.chars().all(|c| {
            c.is_ascii_graphic() && !matches!(c, '~' | '^' | ':' | '?' | '*' | '[' | '\\')
        });
        if !ok {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_raw([b; 20])
    }

    #[test]
    fn name_validation() {
        assert!(is_valid_ref_name("HEAD"));
        assert!(is_valid_ref_name("refs/heads/main"));
        assert!(is_valid_ref_name("refs/heads/feature-x_1.2"));
        assert!(!is_valid_ref_name(""));
        assert!(!is_valid_ref_name("refs//heads"));
        assert!(!is_valid_ref_name("refs/heads/"));
        assert!(!is_valid_ref_name("refs/heads/.hidden"));
        assert!(!is_valid_ref_name("refs/heads/a..b"));
        assert!(!is_valid_ref_name("refs/heads/main.lock"));
        assert!(!is_valid_ref_name("refs/heads/has space"));
        assert!(!is_valid_ref_name("refs/heads/cara^t"));
        assert!(!is_valid_ref_name("refs/heads/main."));
    }

    #[test]
    fn direct_line_round_trip() {
        let r = Ref::direct("refs/heads/main", oid(7));
        let line = r.to_line();
        assert_eq!(line, format!("refs/heads/main {}", oid(7).to_hex()));
        assert_eq!(Ref::parse_line(&line).unwrap(), r);
    }

    #[test]
    fn symbolic_line_round_trip() {
        let r = Ref::symbolic(HEAD, "refs/heads/main");
        let line = r.to_line();
        assert_eq!(line, "HEAD ref: refs/heads/main");
        let parsed = Ref::parse_line(&line).unwrap();
        assert!(parsed.is_symbolic());
        assert_eq!(parsed, r);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(matches!(Ref::parse_line("no-space"), Err(RefError::Parse(_))));
        assert!(matches!(
            Ref::parse_line("refs/heads/main nothex"),
            Err(RefError::Parse(_))
        ));
        assert!(matches!(
            Ref::parse_line("bad..name 0000000000000000000000000000000000000000"),
            Err(RefError::InvalidName(_))
        ));
        assert!(matches!(
            Ref::parse_line("HEAD ref: bad..target"),
            Err(RefError::InvalidName(_))
        ));
    }

    #[test]
    fn id_only_on_direct_refs() {
        assert_eq!(Ref::direct("refs/heads/main", oid(1)).id(), Some(oid(1)));
        assert_eq!(Ref::symbolic(HEAD, "refs/heads/main").id(), None);
    }
}
