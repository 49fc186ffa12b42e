#![forbid(unsafe_code)]

//! Property paths into a model graph.
//!
//! A [`Path`] is the pre-split form of a dot-delimited address such as
//! `x.y.z`. Splitting happens once, at parse time; comparisons afterwards are
//! segment-wise, never string re-parsing.
//!
//! A [`PathTable`] interns paths into dense [`PathId`]s so hot code (change
//! fan-out, subscriber lookup) compares integers.
//!
//! # Invariants
//!
//! 1. A parsed path has at least one segment and no segment is empty.
//! 2. `Path::parse(p.to_string())` yields `p` for every parsed path.
//! 3. `PathTable::intern` returns the same id for equal paths; ids are
//!    assigned densely in first-intern order starting at 0.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `PathError::Empty` | Input is `""` | Parse rejected |
//! | `PathError::EmptySegment` | `a..b`, `.a`, `a.` | Parse rejected |
//! | Unknown path | Not interned | `PathTable::get` returns `None` |

use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;

/// The only separator recognised inside a path string.
pub const SEPARATOR: char = '.';

/// Errors from parsing a path string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string was empty.
    Empty,
    /// A segment between separators was empty.
    EmptySegment {
        /// Zero-based index of the offending segment.
        index: usize,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty property path"),
            Self::EmptySegment { index } => {
                write!(f, "empty segment at position {index} in property path")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// A pre-split property path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<Box<str>>,
}

impl Path {
    /// Parse a dot-delimited path.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when the input is empty or contains an empty
    /// segment.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments = Vec::new();
        for (index, segment) in raw.split(SEPARATOR).enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment { index });
            }
            segments.push(Box::from(segment));
        }
        Ok(Self { segments })
    }

    /// A single-segment path naming a root property.
    ///
    /// The segment is taken verbatim; callers are responsible for passing a
    /// non-empty name.
    #[must_use]
    pub fn single(segment: impl Into<Box<str>>) -> Self {
        Self {
            segments: vec![segment.into()],
        }
    }

    /// The path of a child property one level below `self`.
    #[must_use]
    pub fn join(&self, segment: impl Into<Box<str>>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment.into());
        Self { segments }
    }

    /// The segments, root first.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.segments.iter().map(AsRef::as_ref)
    }

    /// Nesting depth below the model root (always at least 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The last segment (the property name itself).
    #[must_use]
    pub fn leaf_name(&self) -> &str {
        self.segments.last().map_or("", AsRef::as_ref)
    }

    /// Whether `self` is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.segments.len() < other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Dense identifier for an interned [`Path`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(u32);

impl PathId {
    /// The raw index of this id within its table.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Interner mapping paths to dense [`PathId`]s.
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    paths: Vec<Path>,
    ids: AHashMap<Path, PathId>,
}

impl PathTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `path`, returning its existing id or assigning the next one.
    pub fn intern(&mut self, path: Path) -> PathId {
        if let Some(&id) = self.ids.get(&path) {
            return id;
        }
        let id = PathId(self.paths.len() as u32);
        self.paths.push(path.clone());
        self.ids.insert(path, id);
        id
    }

    /// Look up the id of an already interned path.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<PathId> {
        self.ids.get(path).copied()
    }

    /// The path behind `id`.
    #[must_use]
    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.paths.get(id.index())
    }

    /// Number of interned paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no path has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// All interned paths in id order.
    pub fn iter(&self) -> impl Iterator<Item = (PathId, &Path)> + '_ {
        self.paths
            .iter()
            .enumerate()
            .map(|(i, p)| (PathId(i as u32), p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_dots() {
        let p = Path::parse("x.y.zet").unwrap();
        assert_eq!(p.segments().collect::<Vec<_>>(), ["x", "y", "zet"]);
        assert_eq!(p.depth(), 3);
        assert_eq!(p.leaf_name(), "zet");
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!(Path::parse(""), Err(PathError::Empty));
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert_eq!(
            Path::parse("a..b"),
            Err(PathError::EmptySegment { index: 1 })
        );
        assert_eq!(Path::parse(".a"), Err(PathError::EmptySegment { index: 0 }));
        assert_eq!(Path::parse("a."), Err(PathError::EmptySegment { index: 1 }));
    }

    #[test]
    fn display_rejoins_segments() {
        let p: Path = "a.b.c".parse().unwrap();
        assert_eq!(p.to_string(), "a.b.c");
    }

    #[test]
    fn join_extends_by_one_level() {
        let root = Path::single("x");
        let child = root.join("y");
        assert_eq!(child, Path::parse("x.y").unwrap());
        assert!(root.is_ancestor_of(&child));
        assert!(!child.is_ancestor_of(&root));
        assert!(!child.is_ancestor_of(&child));
    }

    #[test]
    fn sibling_prefix_is_not_ancestor() {
        let ab = Path::parse("a.b").unwrap();
        let abd = Path::parse("a.bd").unwrap();
        assert!(!ab.is_ancestor_of(&abd));
    }

    #[test]
    fn table_interns_densely() {
        let mut table = PathTable::new();
        let a = table.intern(Path::parse("a").unwrap());
        let b = table.intern(Path::parse("a.b").unwrap());
        let again = table.intern(Path::parse("a").unwrap());

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(a, again);
        assert_eq!(table.len(), 2);
        assert_eq!(table.path(b).unwrap().to_string(), "a.b");
        assert_eq!(table.get(&Path::parse("nope").unwrap()), None);
    }

    #[test]
    fn error_display() {
        assert_eq!(PathError::Empty.to_string(), "empty property path");
        assert_eq!(
            PathError::EmptySegment { index: 2 }.to_string(),
            "empty segment at position 2 in property path"
        );
    }
}
