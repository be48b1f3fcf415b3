//! datamerge -- merge JSON definitions contributed by overlaid data packs.
//!
//! Every pack may provide a file for the same logical identifier. Instead of
//! letting the last pack win, [`MultiJsonLoader`] collects one parsed
//! document per pack and groups them under the identifier, so consumers can
//! merge or override definitions the way tags do.
//!
//! ```rust,ignore
//! let mut packs = PackStack::new();
//! packs.push("base", "packs/base")?;
//! packs.push("addon", "packs/addon")?;
//!
//! // data/<ns>/powers/**/*.json -> <ns>:<path>
//! let data = MultiJsonLoader::new("powers").aggregate(&packs);
//! for (id, docs) in data.iter() {
//!     println!("{id}: {} contribution(s)", docs.len());
//! }
//! ```
//!
//! # Key Types
//!
//! - [`multi_json::MultiJsonLoader`] -- One aggregation pass per call.
//! - [`multi_json::MultiJsonData`] -- Identifier to non-empty document list.
//! - [`resource::ResourceManager`] -- Seam for resource discovery and reading.
//! - [`pack_dir::PackStack`] -- Directory packs as a `ResourceManager`.
//! - [`reload::ReloadListener`] -- Receives each fresh result.

pub mod config;
pub mod format;
pub mod identifier;
pub mod multi_json;
pub mod pack_dir;
pub mod reload;
pub mod resource;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{LoaderConfig, MergeConfig, PackEntry, load_merge_config};
pub use format::DataLoadError;
pub use identifier::Identifier;
pub use multi_json::{
    AggregateReport, EntryError, JsonParser, MultiJsonData, MultiJsonLoader, SkippedEntry,
    StrictJsonParser,
};
pub use pack_dir::{PackFile, PackStack};
pub use reload::{LatestData, ReloadListener};
pub use resource::{Resource, ResourceManager};
