//! Collaborator traits for locating and reading pack resources.
//!
//! The aggregator never touches the filesystem directly. It asks a
//! [`ResourceManager`] which resources exist and reads each one through the
//! [`Resource`] handle the manager returns. [`crate::pack_dir::PackStack`] is
//! the filesystem-backed implementation; tests use
//! [`crate::test_utils::MemoryResources`].

use std::collections::HashMap;
use std::io::{self, Read};

use crate::identifier::Identifier;

/// One physical copy of a resource, contributed by a single pack.
pub trait Resource {
    /// The stream type returned by [`Resource::open`]. Dropping it releases
    /// whatever the stream holds (file handle, buffer).
    type Reader: Read;

    /// Name of the pack this copy comes from.
    fn pack_name(&self) -> &str;

    /// Open a fresh stream over the resource contents.
    fn open(&self) -> io::Result<Self::Reader>;
}

/// Enumerates resources across an ordered set of overlaid packs.
pub trait ResourceManager {
    type Resource: Resource;

    /// Find every resource whose path lies under the `prefix` directory and
    /// satisfies `filter`.
    ///
    /// Keys are full resource identifiers (e.g. `ns:powers/foo.json`). When
    /// several packs provide the same identifier only one entry is returned;
    /// use [`ResourceManager::all_resources`] to get every copy.
    fn find_resources(
        &self,
        prefix: &str,
        filter: &dyn Fn(&Identifier) -> bool,
    ) -> HashMap<Identifier, Self::Resource>;

    /// Every copy of `id` across all packs, in pack order.
    fn all_resources(&self, id: &Identifier) -> io::Result<Vec<Self::Resource>>;
}
