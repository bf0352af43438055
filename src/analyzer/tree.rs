use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use indexmap::IndexMap;
use tracing::{debug, info, instrument, warn};

use crate::{
    ast::{
        ast::{Ast, NodeId},
        parse_ast,
    },
    errors::errors::{Error, ErrorImpl},
    types::{
        namespace::{namespace, TypeNamespace},
        types::TypeSet,
    },
    Location,
};

use super::{
    analyzer::{
        AnalysisResult, IncludeOutcome, IncludeResolver, IncludedFile, SubprojectOutcome,
        TypeAnalyzer,
    },
    cancel::CancellationToken,
    config::AnalysisOptions,
    derivations::derivations,
    diagnostics::{Diagnostic, Diagnostics},
    options::{extract_options, Options},
    scope::Scope,
    subproject::{checksum, CachedSubproject, SubprojectCache, SubprojectState},
};

const BUILD_FILE: &str = "meson.build";
const OPTION_FILES: [&str; 2] = ["meson.options", "meson_options.txt"];
const SUBPROJECTS_DIR: &str = "subprojects";

/// A project analyzed from its root build file through every include.
#[derive(Debug, Clone)]
pub struct MesonTree {
    pub root_dir: PathBuf,
    /// Every analyzed file, in the order it was first reached, with its
    /// type slots filled.
    files: IndexMap<PathBuf, Ast>,
    /// Exit scope of the root build file.
    pub scope: Scope,
    /// Exit scopes of included files, keyed by directory relative to
    /// `root_dir`.
    pub subdir_scopes: BTreeMap<PathBuf, Scope>,
    pub options: Options,
    pub diagnostics: Diagnostics,
    pub subprojects: BTreeMap<String, Arc<CachedSubproject>>,
    pub cancelled: bool,
}

impl MesonTree {
    /// Loads the project rooted at `root_dir`. `memfiles` holds unsaved
    /// contents that take precedence over the files on disk.
    pub fn load(
        root_dir: &Path,
        config: &AnalysisOptions,
        memfiles: &HashMap<PathBuf, String>,
    ) -> Result<MesonTree, Error> {
        MesonTree::load_with(
            root_dir,
            config,
            memfiles,
            &SubprojectCache::new(),
            &CancellationToken::new(),
            namespace(),
        )
    }

    pub fn load_with(
        root_dir: &Path,
        config: &AnalysisOptions,
        memfiles: &HashMap<PathBuf, String>,
        cache: &SubprojectCache,
        cancel: &CancellationToken,
        ns: &TypeNamespace,
    ) -> Result<MesonTree, Error> {
        load_tree(root_dir, config, memfiles, cache, cancel, ns, &[])
    }

    pub fn root_file(&self) -> PathBuf {
        self.root_dir.join(BUILD_FILE)
    }

    pub fn root_ast(&self) -> Option<&Ast> {
        self.files.get(&self.root_file())
    }

    pub fn ast(&self, file: &Path) -> Option<&Ast> {
        self.files.get(&normalize(file))
    }

    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &Ast)> {
        self.files.iter()
    }

    /// Exit scope of `subdir`'s build file, relative to the project root.
    pub fn subdir_scope(&self, subdir: &Path) -> Option<&Scope> {
        self.subdir_scopes.get(subdir)
    }

    /// Types of `name` at the end of the root build file.
    pub fn variable_types(&self, name: &str) -> Option<&TypeSet> {
        self.scope.get(name)
    }
}

#[instrument(skip_all, fields(root = %root_dir.display()))]
fn load_tree(
    root_dir: &Path,
    config: &AnalysisOptions,
    memfiles: &HashMap<PathBuf, String>,
    cache: &SubprojectCache,
    cancel: &CancellationToken,
    ns: &TypeNamespace,
    chain: &[PathBuf],
) -> Result<MesonTree, Error> {
    let root_dir = std::path::absolute(root_dir).unwrap_or_else(|_| root_dir.to_path_buf());
    let root_dir = normalize(&root_dir);
    let root_file = root_dir.join(BUILD_FILE);
    let source = read_source(&root_file, memfiles)?;
    let options = load_options(&root_dir, memfiles);
    let subprojects = if config.analyze_subprojects {
        SubprojectState::discover(&root_dir, SUBPROJECTS_DIR)
    } else {
        SubprojectState::default()
    };

    let mut chain = chain.to_vec();
    chain.push(root_dir.clone());

    let mut loader = TreeLoader {
        root_dir: root_dir.clone(),
        ns,
        config,
        memfiles,
        cache,
        cancel: cancel.clone(),
        options: Arc::new(options),
        subprojects,
        chain,
        asts: IndexMap::new(),
        file_types: HashMap::new(),
        in_progress: HashSet::new(),
        depth: 0,
        subdir_scopes: BTreeMap::new(),
        diagnostics: Diagnostics::new(),
        subproject_results: BTreeMap::new(),
    };

    let ast = loader.parse(&root_file, &source);
    let options = loader.options.clone();
    loader.in_progress.insert(root_file.clone());
    let result = TypeAnalyzer::new(
        ns,
        derivations(),
        &options,
        config,
        &mut loader,
        cancel.clone(),
    )
    .run(&ast);
    loader.in_progress.remove(&root_file);
    loader.finish_file(&root_file, &result);
    for unused in &result.unused {
        loader
            .diagnostics
            .add(&unused.file, Diagnostic::warning(unused.location, "Unused assignment"));
    }

    info!(
        "loaded {} files, {} diagnostics{}",
        loader.asts.len(),
        loader.diagnostics.all().count(),
        if result.cancelled { " (cancelled)" } else { "" }
    );
    Ok(loader.into_tree(result))
}

/// Resolves includes and subprojects for one project.
struct TreeLoader<'a> {
    root_dir: PathBuf,
    ns: &'a TypeNamespace,
    config: &'a AnalysisOptions,
    memfiles: &'a HashMap<PathBuf, String>,
    cache: &'a SubprojectCache,
    cancel: CancellationToken,
    options: Arc<Options>,
    subprojects: SubprojectState,
    /// Project roots currently being loaded, outermost first.
    chain: Vec<PathBuf>,
    asts: IndexMap<PathBuf, Arc<Ast>>,
    file_types: HashMap<PathBuf, HashMap<NodeId, TypeSet>>,
    in_progress: HashSet<PathBuf>,
    depth: usize,
    subdir_scopes: BTreeMap<PathBuf, Scope>,
    diagnostics: Diagnostics,
    subproject_results: BTreeMap<String, Arc<CachedSubproject>>,
}

impl TreeLoader<'_> {
    fn parse(&mut self, file: &Path, source: &str) -> Arc<Ast> {
        if let Some(ast) = self.asts.get(file) {
            return ast.clone();
        }
        let ast = Arc::new(parse_ast(file.to_path_buf(), source));
        self.asts.insert(file.to_path_buf(), ast.clone());
        ast
    }

    fn finish_file(&mut self, file: &Path, result: &AnalysisResult) {
        let types = self.file_types.entry(file.to_path_buf()).or_default();
        for (id, set) in &result.types {
            types.entry(*id).or_default().union(set);
        }
        self.diagnostics.set(file, result.diagnostics.clone());
    }

    fn into_tree(self, result: AnalysisResult) -> MesonTree {
        let mut files = IndexMap::new();
        for (path, ast) in self.asts {
            let mut ast = Arc::unwrap_or_clone(ast);
            if let Some(types) = self.file_types.get(&path) {
                for (id, set) in types {
                    ast.set_types(*id, set.clone());
                }
            }
            files.insert(path, ast);
        }

        MesonTree {
            root_dir: self.root_dir,
            files,
            scope: result.scope,
            subdir_scopes: self.subdir_scopes,
            options: Arc::unwrap_or_clone(self.options),
            diagnostics: self.diagnostics,
            subprojects: self.subproject_results,
            cancelled: result.cancelled,
        }
    }
}

impl IncludeResolver for TreeLoader<'_> {
    fn include(&mut self, from: &Path, dir: &str, scope: &Scope) -> IncludeOutcome {
        let base = from.parent().unwrap_or(Path::new(""));
        let dir_path = normalize(&base.join(dir));
        let file = dir_path.join(BUILD_FILE);

        if self.in_progress.contains(&file) {
            debug!("cyclic include of {:?}", file);
            return IncludeOutcome::Cyclic;
        }
        if self.depth >= self.config.max_include_depth {
            warn!("include depth limit reached at {:?}", file);
            return IncludeOutcome::Skipped;
        }
        if self.cancel.is_cancelled() {
            return IncludeOutcome::Cancelled;
        }
        let Ok(source) = read_source(&file, self.memfiles) else {
            return IncludeOutcome::Missing(file);
        };

        let ast = self.parse(&file, &source);
        let (ns, config, options, cancel) = (
            self.ns,
            self.config,
            self.options.clone(),
            self.cancel.clone(),
        );

        self.in_progress.insert(file.clone());
        self.depth += 1;
        let result = TypeAnalyzer::new(ns, derivations(), &options, config, self, cancel)
            .with_scope(scope.clone())
            .nested()
            .run(&ast);
        self.depth -= 1;
        self.in_progress.remove(&file);
        self.finish_file(&file, &result);

        if result.cancelled {
            return IncludeOutcome::Cancelled;
        }

        let relative = dir_path
            .strip_prefix(&self.root_dir)
            .map(Path::to_path_buf)
            .unwrap_or(dir_path);
        self.subdir_scopes
            .entry(relative)
            .or_default()
            .union(&result.scope);
        IncludeOutcome::Analyzed(IncludedFile {
            scope: result.scope,
            reads: result.reads,
            unused: result.unused,
        })
    }

    fn subproject(&mut self, name: &str) -> SubprojectOutcome {
        if !self.config.analyze_subprojects {
            return SubprojectOutcome::Disabled;
        }
        if self.cancel.is_cancelled() {
            return SubprojectOutcome::Cancelled;
        }
        let Some(dir) = self.subprojects.find(name).map(normalize) else {
            return SubprojectOutcome::NotFound;
        };
        if self.chain.contains(&dir) {
            debug!("subproject {} is already being loaded", name);
            return SubprojectOutcome::Disabled;
        }
        let Ok(source) = read_source(&dir.join(BUILD_FILE), self.memfiles) else {
            return SubprojectOutcome::NotFound;
        };

        // Whatever a subproject assigns may be read through `get_variable`.
        let config = &AnalysisOptions {
            check_unused_variables: false,
            ..self.config.clone()
        };
        let (ns, memfiles, cache, cancel, chain) = (
            self.ns,
            self.memfiles,
            self.cache,
            &self.cancel,
            &self.chain,
        );
        let cached = cache.get_or_analyze(&dir, checksum(&source), || {
            let tree = load_tree(&dir, config, memfiles, cache, cancel, ns, chain).ok()?;
            (!tree.cancelled).then(|| CachedSubproject {
                scope: tree.scope,
                diagnostics: tree.diagnostics,
            })
        });

        match cached {
            Some(cached) => {
                let scope = cached.scope.clone();
                self.subproject_results.insert(name.to_string(), cached);
                SubprojectOutcome::Found(scope)
            }
            None if self.cancel.is_cancelled() => SubprojectOutcome::Cancelled,
            None => SubprojectOutcome::NotFound,
        }
    }
}

/// Contents of `file`, preferring an in-memory override.
pub fn read_source(file: &Path, memfiles: &HashMap<PathBuf, String>) -> Result<String, Error> {
    if let Some(content) = memfiles.get(file) {
        return Ok(content.clone());
    }
    fs::read_to_string(file).map_err(|error| {
        Error::new(
            ErrorImpl::Io {
                path: file.display().to_string(),
                message: error.to_string(),
            },
            Location::null(),
        )
    })
}

/// Options declared next to the root build file.
pub fn load_options(root_dir: &Path, memfiles: &HashMap<PathBuf, String>) -> Options {
    for name in OPTION_FILES {
        let file = root_dir.join(name);
        if let Ok(source) = read_source(&file, memfiles) {
            return extract_options(&parse_ast(file, &source));
        }
    }
    Options::new()
}

/// Resolves `.` and `..` without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
