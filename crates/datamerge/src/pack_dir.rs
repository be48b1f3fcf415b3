//! Filesystem-backed packs.
//!
//! A pack is a named directory laid out as `<root>/data/<namespace>/<path>`.
//! A [`PackStack`] overlays any number of packs in registration order and
//! serves their files through [`ResourceManager`].

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::format::DataLoadError;
use crate::identifier::Identifier;
use crate::resource::{Resource, ResourceManager};

/// Name of the directory under a pack root that holds namespaces.
pub const DATA_DIR: &str = "data";

/// A named pack directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pack {
    pub name: String,
    pub root: PathBuf,
}

/// One file inside one pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackFile {
    pack: String,
    path: PathBuf,
}

impl PackFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for PackFile {
    type Reader = BufReader<File>;

    fn pack_name(&self) -> &str {
        &self.pack
    }

    fn open(&self) -> io::Result<BufReader<File>> {
        File::open(&self.path).map(BufReader::new)
    }
}

/// An ordered overlay of pack directories.
#[derive(Debug, Clone, Default)]
pub struct PackStack {
    packs: Vec<Pack>,
}

impl PackStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pack. Names must be unique and the root must be a directory.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        root: impl Into<PathBuf>,
    ) -> Result<(), DataLoadError> {
        let name = name.into();
        let root = root.into();

        if self.packs.iter().any(|p| p.name == name) {
            return Err(DataLoadError::DuplicatePack { name });
        }
        if !root.is_dir() {
            return Err(DataLoadError::MissingPack { name, dir: root });
        }

        self.packs.push(Pack { name, root });
        Ok(())
    }

    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

impl ResourceManager for PackStack {
    type Resource = PackFile;

    fn find_resources(
        &self,
        prefix: &str,
        filter: &dyn Fn(&Identifier) -> bool,
    ) -> HashMap<Identifier, PackFile> {
        let mut found = HashMap::new();

        for pack in &self.packs {
            let data_dir = pack.root.join(DATA_DIR);
            let namespaces = match fs::read_dir(&data_dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(pack = %pack.name, "Couldn't list {}: {}", data_dir.display(), e);
                    continue;
                }
            };

            for ns_entry in namespaces.flatten() {
                if !ns_entry.file_type().is_ok_and(|t| t.is_dir()) {
                    continue;
                }
                let Ok(namespace) = ns_entry.file_name().into_string() else {
                    warn!(pack = %pack.name, "Skipping non UTF-8 namespace directory");
                    continue;
                };

                let ns_root = ns_entry.path();
                let scan_root = ns_root.join(prefix);
                if !scan_root.is_dir() {
                    continue;
                }

                for entry in WalkDir::new(&scan_root).sort_by_file_name() {
                    let entry = match entry {
                        Ok(entry) => entry,
                        Err(e) => {
                            warn!(pack = %pack.name, "Error walking {}: {}", scan_root.display(), e);
                            continue;
                        }
                    };
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let Some(path) = resource_path(&ns_root, entry.path()) else {
                        continue;
                    };

                    let id = Identifier::new(namespace.as_str(), path);
                    if filter(&id) {
                        found.entry(id).or_insert_with(|| PackFile {
                            pack: pack.name.clone(),
                            path: entry.path().to_path_buf(),
                        });
                    }
                }
            }
        }

        found
    }

    fn all_resources(&self, id: &Identifier) -> io::Result<Vec<PackFile>> {
        let relative = relative_file(id)?;

        Ok(self
            .packs
            .iter()
            .filter_map(|pack| {
                let path = pack.root.join(DATA_DIR).join(&relative);
                path.is_file().then(|| PackFile {
                    pack: pack.name.clone(),
                    path,
                })
            })
            .collect())
    }
}

/// `/`-joined path of `file` relative to `ns_root`, or `None` if any
/// component is not UTF-8.
fn resource_path(ns_root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(ns_root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// `<namespace>/<path>` as a filesystem path, refusing anything that would
/// leave the pack's data directory.
fn relative_file(id: &Identifier) -> io::Result<PathBuf> {
    let mut relative = PathBuf::from(id.namespace());
    for part in id.path().split('/') {
        relative.push(part);
    }

    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes || id.namespace().contains(['/', '\\']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("resource path escapes pack data directory: {id}"),
        ));
    }

    Ok(relative)
}
