//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests and, via the `test-utils` feature, in
//! integration tests.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor, Read};
use std::rc::Rc;

use crate::identifier::Identifier;
use crate::resource::{Resource, ResourceManager};

// ===========================================================================
// Reader bookkeeping
// ===========================================================================

#[derive(Debug, Default)]
struct ReaderStats {
    opened: Cell<usize>,
    live: Cell<usize>,
    max_live: Cell<usize>,
}

/// A reader that reports its own drop back to the owning [`MemoryResources`].
#[derive(Debug)]
pub struct TrackedReader {
    inner: Cursor<Vec<u8>>,
    stats: Rc<ReaderStats>,
}

impl Read for TrackedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.stats.live.set(self.stats.live.get() - 1);
    }
}

// ===========================================================================
// In-memory resource manager
// ===========================================================================

/// A resource held in memory. `content == None` simulates a read failure.
#[derive(Debug, Clone)]
pub struct MemoryResource {
    pack: String,
    content: Option<Rc<str>>,
    stats: Rc<ReaderStats>,
}

impl Resource for MemoryResource {
    type Reader = TrackedReader;

    fn pack_name(&self) -> &str {
        &self.pack
    }

    fn open(&self) -> io::Result<TrackedReader> {
        let Some(content) = &self.content else {
            return Err(io::Error::other(format!(
                "simulated read failure in pack '{}'",
                self.pack
            )));
        };

        let stats = &self.stats;
        stats.opened.set(stats.opened.get() + 1);
        stats.live.set(stats.live.get() + 1);
        stats.max_live.set(stats.max_live.get().max(stats.live.get()));

        Ok(TrackedReader {
            inner: Cursor::new(content.as_bytes().to_vec()),
            stats: Rc::clone(stats),
        })
    }
}

/// An ordered list of `(pack, identifier, content)` registrations.
///
/// Unlike a real pack directory, the same pack may register the same
/// identifier twice.
#[derive(Debug, Default)]
pub struct MemoryResources {
    entries: Vec<(Identifier, MemoryResource)>,
    unlistable: HashSet<Identifier>,
    stats: Rc<ReaderStats>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `content` for the full resource id `id` (e.g.
    /// `"ns:powers/foo.json"`) in `pack`.
    pub fn add(&mut self, pack: &str, id: &str, content: &str) -> &mut Self {
        self.push(pack, id, Some(Rc::from(content)))
    }

    /// Register a resource whose [`Resource::open`] always fails.
    pub fn add_unreadable(&mut self, pack: &str, id: &str) -> &mut Self {
        self.push(pack, id, None)
    }

    /// Make [`ResourceManager::all_resources`] fail for `id`.
    pub fn fail_listing(&mut self, id: &str) -> &mut Self {
        self.unlistable.insert(parse_id(id));
        self
    }

    /// Total readers opened so far.
    pub fn opened(&self) -> usize {
        self.stats.opened.get()
    }

    /// Readers opened and not yet dropped.
    pub fn live_readers(&self) -> usize {
        self.stats.live.get()
    }

    /// Highest number of readers that were open at the same time.
    pub fn max_live_readers(&self) -> usize {
        self.stats.max_live.get()
    }

    fn push(&mut self, pack: &str, id: &str, content: Option<Rc<str>>) -> &mut Self {
        self.entries.push((
            parse_id(id),
            MemoryResource {
                pack: pack.to_string(),
                content,
                stats: Rc::clone(&self.stats),
            },
        ));
        self
    }
}

fn parse_id(id: &str) -> Identifier {
    id.parse()
        .unwrap_or_else(|e| panic!("bad test identifier: {e}"))
}

impl ResourceManager for MemoryResources {
    type Resource = MemoryResource;

    fn find_resources(
        &self,
        prefix: &str,
        filter: &dyn Fn(&Identifier) -> bool,
    ) -> HashMap<Identifier, MemoryResource> {
        let mut found = HashMap::new();
        for (id, resource) in &self.entries {
            let under_prefix = id
                .path()
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'));
            if under_prefix && filter(id) {
                found
                    .entry(id.clone())
                    .or_insert_with(|| resource.clone());
            }
        }
        found
    }

    fn all_resources(&self, id: &Identifier) -> io::Result<Vec<MemoryResource>> {
        if self.unlistable.contains(id) {
            return Err(io::Error::other(format!("simulated listing failure for {id}")));
        }
        Ok(self
            .entries
            .iter()
            .filter(|(entry_id, _)| entry_id == id)
            .map(|(_, resource)| resource.clone())
            .collect())
    }
}
