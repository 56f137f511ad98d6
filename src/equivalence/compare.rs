//! Deep structural comparison over recorded shapes.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::inspect::Shape;
use crate::message::preview;

/// How sequence elements are paired for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionOrdering {
    /// Elements are paired by index.
    #[default]
    Matching,
    /// Both sides are treated as unordered multisets.
    Any,
}

/// How much of the member set must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EquivalencyKind {
    /// The union of both sides' members must match.
    #[default]
    Full,
    /// Only members present on the expected shape are required; members
    /// unique to the actual side are not a mismatch.
    Partial,
}

/// Custom per-pair override. Returning `Some(verdict)` settles the pair
/// without further descent; `None` falls through to the default rules.
pub type Comparer = Arc<dyn Fn(&Shape, &Shape) -> Option<bool>>;

/// Configuration for a structural comparison.
#[derive(Clone, Default)]
pub struct EquivalenceOptions {
    members_to_ignore: HashSet<String>,
    types_to_ignore: HashSet<String>,
    kind: EquivalencyKind,
    ordering: CollectionOrdering,
    comparer: Option<Comparer>,
}

impl EquivalenceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore the member at the given dotted path, e.g. `"Settings.[0].Key"`.
    pub fn ignore_member(mut self, path: impl Into<String>) -> Self {
        self.members_to_ignore.insert(path.into());
        self
    }

    /// Ignore every member whose recorded structure name matches.
    pub fn ignore_type(mut self, type_name: impl Into<String>) -> Self {
        self.types_to_ignore.insert(type_name.into());
        self
    }

    pub fn kind(mut self, kind: EquivalencyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn ordering(mut self, ordering: CollectionOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn comparer(mut self, comparer: impl Fn(&Shape, &Shape) -> Option<bool> + 'static) -> Self {
        self.comparer = Some(Arc::new(comparer));
        self
    }
}

impl fmt::Debug for EquivalenceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquivalenceOptions")
            .field("members_to_ignore", &self.members_to_ignore)
            .field("types_to_ignore", &self.types_to_ignore)
            .field("kind", &self.kind)
            .field("ordering", &self.ordering)
            .field("comparer", &self.comparer.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

/// What kind of location a mismatch was found at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Value,
    Field,
    EnumerableItem,
    MapEntry,
}

/// A single mismatch found along one traversal path.
#[derive(Debug, Clone)]
pub struct ComparisonFailure {
    pub kind: MemberKind,
    /// Path segments from the root, e.g. `["address", "[2]", "street"]`.
    pub path: Vec<String>,
    pub expected: String,
    pub actual: String,
}

impl ComparisonFailure {
    /// Dotted path usable for ignore-list matching, e.g. `address.[2].street`.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Render the mismatch for a failure message.
    pub fn render(&self) -> String {
        if self.path.is_empty() {
            format!(
                "it did not match: expected {}, received {}",
                self.expected, self.actual
            )
        } else {
            format!(
                "property {} did not match: expected {}, received {}",
                self.path_string(),
                self.expected,
                self.actual
            )
        }
    }
}

/// Compare two shapes under the given options. An empty result means the
/// shapes are equivalent.
pub fn compare(
    actual: &Shape,
    expected: &Shape,
    options: &EquivalenceOptions,
) -> Vec<ComparisonFailure> {
    let mut failures = Vec::new();
    check(
        actual,
        expected,
        &mut Vec::new(),
        options,
        &mut failures,
        MemberKind::Value,
    );
    failures
}

fn ignored(path: &[String], options: &EquivalenceOptions) -> bool {
    options.members_to_ignore.contains(&path.join("."))
}

fn ignored_type(shape: &Shape, options: &EquivalenceOptions) -> bool {
    match shape {
        Shape::Structure { type_name, .. } => options.types_to_ignore.contains(type_name),
        _ => false,
    }
}

fn mismatch(
    kind: MemberKind,
    path: &[String],
    expected: &Shape,
    actual: &Shape,
) -> ComparisonFailure {
    ComparisonFailure {
        kind,
        path: path.to_vec(),
        expected: preview(&expected.describe()),
        actual: preview(&actual.describe()),
    }
}

fn check(
    actual: &Shape,
    expected: &Shape,
    path: &mut Vec<String>,
    options: &EquivalenceOptions,
    out: &mut Vec<ComparisonFailure>,
    kind: MemberKind,
) {
    // A cycle marker is a back-reference to an ancestor; the ancestor pair
    // has already been compared, so descending again would never terminate.
    if matches!(actual, Shape::Cycle) || matches!(expected, Shape::Cycle) {
        return;
    }

    if ignored_type(actual, options) || ignored_type(expected, options) {
        return;
    }

    if let Some(comparer) = &options.comparer {
        if let Some(verdict) = comparer(actual, expected) {
            if !verdict {
                out.push(mismatch(kind, path, expected, actual));
            }
            return;
        }
    }

    match (actual, expected) {
        (Shape::Null, Shape::Null) => {}
        (Shape::Scalar(a), Shape::Scalar(e)) => {
            if !a.matches(e) {
                out.push(mismatch(kind, path, expected, actual));
            }
        }
        (Shape::Sequence(a), Shape::Sequence(e)) => match options.ordering {
            CollectionOrdering::Matching => check_sequence_matching(a, e, path, options, out),
            CollectionOrdering::Any => check_sequence_any(a, e, path, options, out),
        },
        (Shape::Map(a), Shape::Map(e)) => check_map(a, e, path, options, out),
        (
            Shape::Structure { fields: a, .. },
            Shape::Structure {
                fields: e,
                ..
            },
        ) => check_structure(a, e, path, options, out),
        _ => out.push(mismatch(kind, path, expected, actual)),
    }
}

/// Index-paired comparison. A size difference is a single count failure;
/// otherwise the first mismatching index is reported and traversal stops.
fn check_sequence_matching(
    actual: &[Shape],
    expected: &[Shape],
    path: &mut Vec<String>,
    options: &EquivalenceOptions,
    out: &mut Vec<ComparisonFailure>,
) {
    if actual.len() != expected.len() {
        out.push(count_mismatch(path, expected.len(), actual.len()));
        return;
    }

    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        path.push(format!("[{index}]"));
        let skip = ignored(path, options);
        let before = out.len();
        if !skip {
            check(a, e, path, options, out, MemberKind::EnumerableItem);
        }
        path.pop();
        if out.len() > before {
            return;
        }
    }
}

/// Unordered multiset comparison: equal counts required, and every expected
/// element must be matched to a distinct actual element under recursive
/// equivalence (duplicates counted).
fn check_sequence_any(
    actual: &[Shape],
    expected: &[Shape],
    path: &mut Vec<String>,
    options: &EquivalenceOptions,
    out: &mut Vec<ComparisonFailure>,
) {
    if actual.len() != expected.len() {
        out.push(count_mismatch(path, expected.len(), actual.len()));
        return;
    }

    let mut used = vec![false; actual.len()];
    for expected_item in expected {
        let matched = actual
            .iter()
            .enumerate()
            .find(|&(index, actual_item)| !used[index] && equivalent(actual_item, expected_item, options));
        match matched {
            Some((index, _)) => used[index] = true,
            None => {
                out.push(ComparisonFailure {
                    kind: MemberKind::EnumerableItem,
                    path: path.clone(),
                    expected: preview(&expected_item.describe()),
                    actual: "no matching element".to_string(),
                });
                return;
            }
        }
    }
}

fn equivalent(actual: &Shape, expected: &Shape, options: &EquivalenceOptions) -> bool {
    let mut scratch = Vec::new();
    check(
        actual,
        expected,
        &mut Vec::new(),
        options,
        &mut scratch,
        MemberKind::Value,
    );
    scratch.is_empty()
}

fn count_mismatch(path: &[String], expected: usize, actual: usize) -> ComparisonFailure {
    ComparisonFailure {
        kind: MemberKind::EnumerableItem,
        path: path.to_vec(),
        expected: format!("{expected} items"),
        actual: format!("{actual} items"),
    }
}

/// Key-union comparison for maps. Partial mode tolerates keys unique to the
/// actual side.
fn check_map(
    actual: &[(String, Shape)],
    expected: &[(String, Shape)],
    path: &mut Vec<String>,
    options: &EquivalenceOptions,
    out: &mut Vec<ComparisonFailure>,
) {
    for (key, expected_value) in expected {
        path.push(format!("[{key}]"));
        if !ignored(path, options) {
            match lookup(actual, key) {
                Some(actual_value) => {
                    check(actual_value, expected_value, path, options, out, MemberKind::MapEntry)
                }
                None => out.push(ComparisonFailure {
                    kind: MemberKind::MapEntry,
                    path: path.clone(),
                    expected: preview(&expected_value.describe()),
                    actual: format!("no entry with key {key}"),
                }),
            }
        }
        path.pop();
    }

    if options.kind == EquivalencyKind::Full {
        for (key, actual_value) in actual {
            if lookup(expected, key).is_some() {
                continue;
            }
            path.push(format!("[{key}]"));
            if !ignored(path, options) {
                out.push(ComparisonFailure {
                    kind: MemberKind::MapEntry,
                    path: path.clone(),
                    expected: format!("no entry with key {key}"),
                    actual: preview(&actual_value.describe()),
                });
            }
            path.pop();
        }
    }
}

/// Member-union comparison for structures. Expected members are always
/// required; actual-only members fail under `Full` unless their value is
/// null (an absent member and a null member are equivalent).
fn check_structure(
    actual: &[(String, Shape)],
    expected: &[(String, Shape)],
    path: &mut Vec<String>,
    options: &EquivalenceOptions,
    out: &mut Vec<ComparisonFailure>,
) {
    for (name, expected_value) in expected {
        path.push(name.clone());
        if !ignored(path, options) && !ignored_type(expected_value, options) {
            match lookup(actual, name) {
                Some(actual_value) => {
                    check(actual_value, expected_value, path, options, out, MemberKind::Field)
                }
                None => out.push(ComparisonFailure {
                    kind: MemberKind::Field,
                    path: path.clone(),
                    expected: preview(&expected_value.describe()),
                    actual: "null".to_string(),
                }),
            }
        }
        path.pop();
    }

    if options.kind == EquivalencyKind::Full {
        for (name, actual_value) in actual {
            if lookup(expected, name).is_some() || matches!(actual_value, Shape::Null) {
                continue;
            }
            path.push(name.clone());
            if !ignored(path, options) && !ignored_type(actual_value, options) {
                out.push(ComparisonFailure {
                    kind: MemberKind::Field,
                    path: path.clone(),
                    expected: "null".to_string(),
                    actual: preview(&actual_value.describe()),
                });
            }
            path.pop();
        }
    }
}

fn lookup<'a>(fields: &'a [(String, Shape)], name: &str) -> Option<&'a Shape> {
    fields
        .iter()
        .find(|(candidate, _)| candidate == name)
        .map(|(_, shape)| shape)
}
