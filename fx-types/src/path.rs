//! Dotted-path addressing over nested JSON records.
//!
//! Records are arbitrary `serde_json::Value` trees mixing objects and
//! arrays. Every value is classified as a [`Node`] and traversal dispatches
//! on that tag: numeric segments index into sequences, any segment indexes
//! into mappings, and scalars or missing values stop the walk.
//!
//! None of the functions here panic or fail on malformed records; a path
//! that cannot be followed simply reads as absent or writes nothing.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use dashmap::DashMap;
use serde_json::{Map, Value};

/// Parsed segments keyed by the exact path string, kept for the process lifetime.
static PARSED_PATHS: LazyLock<DashMap<String, Vec<String>>> = LazyLock::new(DashMap::new);

/// Largest number of `null` slots a single write may append to an array.
const MAX_ARRAY_PADDING: usize = 1024;

/// Splits a dotted path into segments.
///
/// Results are memoized; callers always receive their own copy, so mutating
/// the returned vector never affects later calls. An empty string yields a
/// single empty segment.
pub fn parse_path(path: &str) -> Vec<String> {
    if let Some(segments) = PARSED_PATHS.get(path) {
        return segments.clone();
    }

    let segments: Vec<String> = path.split('.').map(str::to_owned).collect();
    PARSED_PATHS.insert(path.to_owned(), segments.clone());
    segments
}

/// Anything that can address a location in a record.
///
/// Implemented for dotted strings and for pre-split segment sequences.
pub trait AsPath {
    fn segments(&self) -> Cow<'_, [String]>;
}

impl AsPath for str {
    fn segments(&self) -> Cow<'_, [String]> {
        Cow::Owned(parse_path(self))
    }
}

impl AsPath for String {
    fn segments(&self) -> Cow<'_, [String]> {
        self.as_str().segments()
    }
}

impl AsPath for [String] {
    fn segments(&self) -> Cow<'_, [String]> {
        Cow::Borrowed(self)
    }
}

impl AsPath for Vec<String> {
    fn segments(&self) -> Cow<'_, [String]> {
        Cow::Borrowed(self.as_slice())
    }
}

/// A dotted path parsed once and reused for every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = parse_path(&raw);
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the path has no usable final segment (`""`, `"."`, `"a."`).
    pub fn is_degenerate(&self) -> bool {
        self.segments.last().is_none_or(|last| last.is_empty())
    }
}

impl AsPath for FieldPath {
    fn segments(&self) -> Cow<'_, [String]> {
        Cow::Borrowed(self.segments.as_slice())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Shape of a value as seen by the path walker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Mapping(&'a Map<String, Value>),
    Sequence(&'a [Value]),
    Scalar(&'a Value),
    Absent,
}

impl<'a> Node<'a> {
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None => Node::Absent,
            Some(Value::Object(map)) => Node::Mapping(map),
            Some(Value::Array(items)) => Node::Sequence(items),
            Some(other) => Node::Scalar(other),
        }
    }

    /// Steps one segment down. Scalars and absent values have no children.
    pub fn child(self, segment: &str) -> Option<&'a Value> {
        match self {
            Node::Mapping(map) => map.get(segment),
            Node::Sequence(items) => parse_index(segment).and_then(|index| items.get(index)),
            Node::Scalar(_) | Node::Absent => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Node::Mapping(_) | Node::Sequence(_))
    }
}

/// Reads the value at `path`, or `None` if any step along the way is missing.
pub fn get<'a, P: AsPath + ?Sized>(record: &'a Value, path: &P) -> Option<&'a Value> {
    let segments = path.segments();
    let mut current = record;
    for segment in segments.iter() {
        current = Node::of(Some(current)).child(segment)?;
    }
    Some(current)
}

/// Writes `value` at `path`, replacing whatever was there.
///
/// Missing or scalar intermediates are replaced by fresh containers: an array
/// when the parent is already an array and the next segment is numeric, an
/// object otherwise. Returns `false` without writing when the path has no
/// usable last segment, when the record root is not a container, or when a
/// segment cannot address an array (not an index, or too far past the end).
pub fn set<P: AsPath + ?Sized>(record: &mut Value, path: &P, value: Value) -> bool {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };
    if last.is_empty() {
        return false;
    }

    let mut current = record;
    for (position, segment) in parents.iter().enumerate() {
        let next_is_index = parse_index(&segments[position + 1]).is_some();
        current = match child_container_mut(current, segment, next_is_index) {
            Some(child) => child,
            None => return false,
        };
    }

    match slot_mut(current, last) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

/// Erases the value at `path` and returns it.
///
/// Object keys are removed outright; array slots are reset to `null` so that
/// sibling positions do not shift.
pub fn remove<P: AsPath + ?Sized>(record: &mut Value, path: &P) -> Option<Value> {
    let segments = path.segments();
    let (last, parents) = segments.split_last()?;

    let mut current = record;
    for segment in parents.iter() {
        current = match current {
            Value::Object(map) => map.get_mut(segment.as_str())?,
            Value::Array(items) => items.get_mut(parse_index(segment)?)?,
            _ => return None,
        };
    }

    match current {
        Value::Object(map) => map.remove(last.as_str()),
        Value::Array(items) => items.get_mut(parse_index(last)?).map(Value::take),
        _ => None,
    }
}

fn child_container_mut<'a>(
    container: &'a mut Value,
    segment: &str,
    next_is_index: bool,
) -> Option<&'a mut Value> {
    let make_array = next_is_index && container.is_array();
    let slot = slot_mut(container, segment)?;
    if !Node::of(Some(slot)).is_container() {
        *slot = if make_array {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }
    Some(slot)
}

fn slot_mut<'a>(container: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match container {
        Value::Object(map) => Some(map.entry(segment).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = parse_index(segment)?;
            if index >= items.len() {
                if index - items.len() > MAX_ARRAY_PADDING {
                    return None;
                }
                items.resize(index + 1, Value::Null);
            }
            items.get_mut(index)
        }
        _ => None,
    }
}

/// Canonical array indices only: `"0"`, `"7"`, `"12"`. `"01"` is a key, not an index.
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    segment.parse().ok()
}
