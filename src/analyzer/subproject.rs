use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::{diagnostics::Diagnostics, scope::Scope};

/// Subprojects available to a project: folders and `.wrap` files under its
/// `subprojects/` directory.
#[derive(Debug, Clone, Default)]
pub struct SubprojectState {
    /// Subproject name to its source directory.
    available: IndexMap<String, PathBuf>,
}

impl SubprojectState {
    pub fn discover(project_root: &Path, subprojects_dir: &str) -> Self {
        let base = project_root.join(subprojects_dir);
        let mut available = IndexMap::new();

        let Ok(entries) = fs::read_dir(&base) else {
            trace!("no subprojects folder at {:?}", base);
            return SubprojectState { available };
        };

        let mut paths = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .collect::<Vec<_>>();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    available
                        .entry(name.to_string())
                        .or_insert_with(|| path.clone());
                }
            } else if path.extension().is_some_and(|ext| ext == "wrap") {
                let Some(name) = path.file_stem().and_then(|n| n.to_str()) else {
                    continue;
                };
                let directory = fs::read_to_string(&path)
                    .ok()
                    .and_then(|content| wrap_directory(&content))
                    .unwrap_or_else(|| name.to_string());
                available.insert(name.to_string(), base.join(directory));
            }
        }

        debug!("discovered {} subprojects in {:?}", available.len(), base);
        SubprojectState { available }
    }

    pub fn find(&self, name: &str) -> Option<&Path> {
        self.available.get(name).map(PathBuf::as_path)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.available.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

/// The `directory = ...` key of a wrap file.
fn wrap_directory(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        (key.trim() == "directory")
            .then(|| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Result of analyzing a subproject.
#[derive(Debug, Clone, Default)]
pub struct CachedSubproject {
    pub scope: Scope,
    pub diagnostics: Diagnostics,
}

/// Subproject results shared between analyses, keyed by the subproject's
/// directory and a checksum of its root build file.
#[derive(Debug, Clone, Default)]
pub struct SubprojectCache {
    entries: Arc<DashMap<(PathBuf, u32), Arc<CachedSubproject>>>,
}

impl SubprojectCache {
    pub fn new() -> Self {
        SubprojectCache::default()
    }

    pub fn get(&self, dir: &Path, checksum: u32) -> Option<Arc<CachedSubproject>> {
        self.entries
            .get(&(dir.to_path_buf(), checksum))
            .map(|entry| entry.value().clone())
    }

    /// Serves the cached result or runs `analyze` and stores its result.
    ///
    /// The map is not locked while `analyze` runs. If two analyses of the
    /// same key race, the first one stored is kept and returned to both.
    /// `None` (a cancelled analysis) is never cached.
    pub fn get_or_analyze(
        &self,
        dir: &Path,
        checksum: u32,
        analyze: impl FnOnce() -> Option<CachedSubproject>,
    ) -> Option<Arc<CachedSubproject>> {
        if let Some(cached) = self.get(dir, checksum) {
            trace!("subproject cache hit for {:?}", dir);
            return Some(cached);
        }

        let computed = Arc::new(analyze()?);
        let stored = self
            .entries
            .entry((dir.to_path_buf(), checksum))
            .or_insert(computed)
            .value()
            .clone();
        Some(stored)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn checksum(content: &str) -> u32 {
    crc32fast::hash(content.as_bytes())
}
