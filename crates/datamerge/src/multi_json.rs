//! Multi-pack JSON aggregation.
//!
//! Like a single-file JSON data loader, but every identifier maps to a list
//! of documents, one per pack that provides it. This lets several packs
//! contribute to, or override, the same definition in the way tags merge.
//! The order of a list is not meaningful: consumers that need precedence
//! must carry their own priority field inside each document.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use tracing::{debug, error};

use crate::identifier::Identifier;
use crate::resource::{Resource, ResourceManager};

/// Default file suffix for aggregated resources.
pub const JSON_SUFFIX: &str = ".json";

// ===========================================================================
// Errors
// ===========================================================================

/// Why a single resource was dropped from an aggregation pass.
///
/// Entry errors never abort the pass; they are logged and collected in
/// [`AggregateReport::skipped`].
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// The document parsed to nothing (empty input or JSON `null`).
    #[error("document is null or empty")]
    EmptyDocument,

    /// The document is not valid JSON, or not the shape the parser expects.
    #[error("malformed document: {detail}")]
    Parse { detail: String },

    /// Opening or reading the resource failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EntryError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            EntryError::Io(e.into())
        } else {
            EntryError::Parse {
                detail: e.to_string(),
            }
        }
    }
}

// ===========================================================================
// Parsers
// ===========================================================================

/// Turns a resource stream into a JSON value.
///
/// `Ok(None)` means the document was empty; the aggregator reports it as
/// [`EntryError::EmptyDocument`].
pub trait JsonParser {
    fn parse(&self, reader: &mut dyn Read) -> Result<Option<Value>, EntryError>;
}

impl<F> JsonParser for F
where
    F: Fn(&mut dyn Read) -> Result<Option<Value>, EntryError>,
{
    fn parse(&self, reader: &mut dyn Read) -> Result<Option<Value>, EntryError> {
        self(reader)
    }
}

/// Standard-conforming JSON via `serde_json`.
///
/// Whitespace-only input and the literal `null` are treated as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJsonParser;

impl JsonParser for StrictJsonParser {
    fn parse(&self, reader: &mut dyn Read) -> Result<Option<Value>, EntryError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(&content)? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }
}

// ===========================================================================
// Result map
// ===========================================================================

/// Parsed documents grouped by logical identifier.
///
/// Every list holds at least one value. Serializes as a JSON object keyed by
/// `namespace:path`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MultiJsonData {
    entries: BTreeMap<Identifier, Vec<Value>>,
}

impl MultiJsonData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `id`, creating the list on first use.
    pub fn push(&mut self, id: Identifier, value: Value) {
        self.entries.entry(id).or_default().push(value);
    }

    pub fn get(&self, id: &Identifier) -> Option<&[Value]> {
        self.entries.get(id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of documents across all identifiers.
    pub fn value_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &[Value])> {
        self.entries.iter().map(|(id, values)| (id, values.as_slice()))
    }
}

impl IntoIterator for MultiJsonData {
    type Item = (Identifier, Vec<Value>);
    type IntoIter = std::collections::btree_map::IntoIter<Identifier, Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ===========================================================================
// Report
// ===========================================================================

/// A resource that did not make it into the result.
#[derive(Debug)]
pub struct SkippedEntry {
    /// Logical identifier the resource would have contributed to.
    pub id: Identifier,
    /// Full resource identifier, including type prefix and suffix.
    pub source: Identifier,
    /// Originating pack, or `None` when the pack set could not be listed.
    pub pack: Option<String>,
    pub error: EntryError,
}

/// Output of one aggregation pass together with what it dropped.
#[derive(Debug, Default)]
pub struct AggregateReport {
    pub data: MultiJsonData,
    pub skipped: Vec<SkippedEntry>,
}

// ===========================================================================
// Loader
// ===========================================================================

/// Aggregates every `{resource_type}/**/*{suffix}` resource into a
/// [`MultiJsonData`].
#[derive(Debug, Clone)]
pub struct MultiJsonLoader<P = StrictJsonParser> {
    resource_type: String,
    suffix: String,
    parser: P,
}

impl MultiJsonLoader {
    /// A loader for `resource_type` reading `.json` files with
    /// [`StrictJsonParser`].
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            suffix: JSON_SUFFIX.to_string(),
            parser: StrictJsonParser,
        }
    }
}

impl<P: JsonParser> MultiJsonLoader<P> {
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Replace the parser, keeping resource type and suffix.
    pub fn with_parser<Q: JsonParser>(self, parser: Q) -> MultiJsonLoader<Q> {
        MultiJsonLoader {
            resource_type: self.resource_type,
            suffix: self.suffix,
            parser,
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Run one aggregation pass. Entries that fail are logged and dropped.
    pub fn aggregate<M: ResourceManager>(&self, manager: &M) -> MultiJsonData {
        self.aggregate_with_report(manager).data
    }

    /// Run one aggregation pass, returning the dropped entries alongside the
    /// data.
    pub fn aggregate_with_report<M: ResourceManager>(&self, manager: &M) -> AggregateReport {
        let suffix = self.suffix.as_str();
        let found = manager.find_resources(&self.resource_type, &|id: &Identifier| {
            id.path().ends_with(suffix)
        });

        let mut sources: Vec<Identifier> = found.into_keys().collect();
        sources.sort();

        let mut report = AggregateReport::default();

        for source in sources {
            let Some(id) = source.strip_resource_path(&self.resource_type, suffix) else {
                debug!(
                    resource = %source,
                    resource_type = %self.resource_type,
                    "Resource path does not match loader prefix/suffix, ignoring"
                );
                continue;
            };

            let copies = match manager.all_resources(&source) {
                Ok(copies) => copies,
                Err(e) => {
                    error!("Couldn't list data file {} from {}: {}", id, source, e);
                    report.skipped.push(SkippedEntry {
                        id,
                        source,
                        pack: None,
                        error: EntryError::Io(e),
                    });
                    continue;
                }
            };

            let mut packs_seen: HashSet<&str> = HashSet::new();
            for copy in &copies {
                if !packs_seen.insert(copy.pack_name()) {
                    debug!(
                        resource = %source,
                        pack = copy.pack_name(),
                        "Duplicate registration within one pack, ignoring"
                    );
                    continue;
                }

                match self.read_entry(copy) {
                    Ok(value) => report.data.push(id.clone(), value),
                    Err(EntryError::EmptyDocument) => {
                        error!(
                            "Couldn't load data file {} from {} (pack '{}') as it's null or empty",
                            id,
                            source,
                            copy.pack_name()
                        );
                        report.skipped.push(SkippedEntry {
                            id: id.clone(),
                            source: source.clone(),
                            pack: Some(copy.pack_name().to_string()),
                            error: EntryError::EmptyDocument,
                        });
                    }
                    Err(e) => {
                        error!(
                            "Couldn't parse data file {} from {} (pack '{}'): {}",
                            id,
                            source,
                            copy.pack_name(),
                            e
                        );
                        report.skipped.push(SkippedEntry {
                            id: id.clone(),
                            source: source.clone(),
                            pack: Some(copy.pack_name().to_string()),
                            error: e,
                        });
                    }
                }
            }
        }

        debug!(
            resource_type = %self.resource_type,
            identifiers = report.data.len(),
            documents = report.data.value_count(),
            skipped = report.skipped.len(),
            "Aggregation pass complete"
        );

        report
    }

    /// Parse one resource copy. The reader is dropped before returning.
    fn read_entry<R: Resource>(&self, resource: &R) -> Result<Value, EntryError> {
        let mut reader = resource.open()?;
        self.parser
            .parse(&mut reader)?
            .ok_or(EntryError::EmptyDocument)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
