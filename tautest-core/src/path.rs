//! Locations inside nested actual data.

use std::fmt;

use serde::{Serialize, Serializer};

/// One step of an [`ActualPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named field of a mapping.
    Name(String),
    /// Position inside a sequence.
    Index(usize),
}

/// Immutable path of field/index segments, e.g. `body.items[0].id`.
///
/// Appending returns a new path; two paths are equal iff their segments are.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ActualPath {
    segments: Vec<PathSegment>,
}

impl ActualPath {
    /// Creates a path rooted at a single named segment.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Name(root.into())],
        }
    }

    pub fn property(&self, name: impl Into<String>) -> Self {
        self.with_segment(PathSegment::Name(name.into()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.with_segment(PathSegment::Index(index))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    fn with_segment(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }
}

fn is_plain_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '$')
}

impl fmt::Display for ActualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "value");
        }
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Name(name) if position == 0 => write!(f, "{name}")?,
                PathSegment::Name(name) if is_plain_name(name) => write!(f, ".{name}")?,
                PathSegment::Name(name) => {
                    write!(f, "[{}]", serde_json::Value::String(name.clone()))?
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ActualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActualPath({self})")
    }
}

impl Serialize for ActualPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
