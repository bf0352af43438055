use std::{
    collections::BTreeMap,
    fmt::Display,
    path::{Path, PathBuf},
};

use crate::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, location: Location, message: String) -> Self {
        Diagnostic {
            severity,
            location,
            message,
        }
    }

    pub fn error(location: Location, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, location, message.into())
    }

    pub fn warning(location: Location, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, location, message.into())
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.location, self.message)
    }
}

/// Diagnostics grouped by the file they were reported in.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    files: BTreeMap<PathBuf, Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn add(&mut self, file: &Path, diagnostic: Diagnostic) {
        self.files
            .entry(file.to_path_buf())
            .or_default()
            .push(diagnostic);
    }

    /// Replaces everything recorded for `file`.
    pub fn set(&mut self, file: &Path, diagnostics: Vec<Diagnostic>) {
        self.files.insert(file.to_path_buf(), diagnostics);
    }

    pub fn for_file(&self, file: &Path) -> &[Diagnostic] {
        self.files.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &Vec<Diagnostic>)> {
        self.files.iter()
    }

    pub fn all(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.values().flatten()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.all().filter(|d| d.severity == severity).count()
    }

    pub fn is_empty(&self) -> bool {
        self.files.values().all(Vec::is_empty)
    }
}
