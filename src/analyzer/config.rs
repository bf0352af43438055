/// Switches for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Warn about assigned identifiers that are not snake case.
    pub check_snake_case: bool,
    /// Warn about assignments whose value is never read.
    pub check_unused_variables: bool,
    /// Resolve `subproject(...)` calls against the `subprojects/` folder.
    pub analyze_subprojects: bool,
    /// Nesting limit for `subdir` includes.
    pub max_include_depth: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            check_snake_case: true,
            check_unused_variables: true,
            analyze_subprojects: true,
            max_include_depth: 64,
        }
    }
}
