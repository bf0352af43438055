//! Command-line front end for the build-file analyzer.
//!
//! ```bash
//! analyzer check path/to/project      # diagnostics for every reached file
//! analyzer types path/to/project      # inferred types of top-level variables
//! analyzer run path/to/meson.build    # interpret one file
//! analyzer parse path/to/meson.build  # dump the syntax tree
//! ```

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use analyzer::{
    analyzer::{
        cancel::CancellationToken,
        config::AnalysisOptions,
        diagnostics::{Diagnostic, Severity},
        tree::{load_options, read_source},
        MesonTree,
    },
    ast::{
        ast::{Ast, NodeId},
        parse_ast,
    },
    errors::errors::{Error, ErrorTip},
    interpreter::{interpret_file, SystemProcessRunner},
    render_diagnostic,
};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error};

#[derive(Parser)]
#[command(
    name = "analyzer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Type inference and interpretation for Meson build files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project and print its diagnostics
    Check(ProjectArgs),

    /// Print the inferred types of the root file's variables
    Types(ProjectArgs),

    /// Interpret a single build file
    Run {
        /// Build file to interpret
        file: PathBuf,
    },

    /// Print the syntax tree of a build file
    Parse {
        /// Build file to parse
        file: PathBuf,
    },
}

#[derive(Args)]
struct ProjectArgs {
    /// Project root containing `meson.build`
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Do not warn about identifiers that are not snake case
    #[arg(long)]
    no_snake_case: bool,

    /// Do not warn about assignments that are never read
    #[arg(long)]
    no_unused: bool,

    /// Do not resolve `subproject()` calls
    #[arg(long)]
    no_subprojects: bool,

    /// Nesting limit for `subdir()` includes
    #[arg(long, default_value_t = AnalysisOptions::default().max_include_depth)]
    max_depth: usize,
}

impl ProjectArgs {
    fn config(&self) -> AnalysisOptions {
        AnalysisOptions {
            check_snake_case: !self.no_snake_case,
            check_unused_variables: !self.no_unused,
            analyze_subprojects: !self.no_subprojects,
            max_include_depth: self.max_depth,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Check(args) => check_command(args),
        Commands::Types(args) => types_command(args),
        Commands::Run { file } => run_command(file),
        Commands::Parse { file } => parse_command(file),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            if let ErrorTip::Suggestion(tip) = err.get_tip() {
                eprintln!("tip: {}", tip);
            }
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new(match verbose {
            1 => "debug",
            _ => "trace",
        })
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_level(true);

    tracing_subscriber::registry()
        .with(formatter)
        .with(filter)
        .init();
}

fn check_command(args: &ProjectArgs) -> Result<ExitCode, Error> {
    let tree = MesonTree::load(&args.dir, &args.config(), &HashMap::new())?;

    for (file, diagnostics) in tree.diagnostics.iter() {
        print_diagnostics(file, diagnostics);
    }
    for (name, subproject) in &tree.subprojects {
        debug!("subproject {}", name);
        for (file, diagnostics) in subproject.diagnostics.iter() {
            print_diagnostics(file, diagnostics);
        }
    }

    let errors = tree.diagnostics.count(Severity::Error);
    let warnings = tree.diagnostics.count(Severity::Warning);
    println!("{} errors, {} warnings", errors, warnings);
    Ok(if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn types_command(args: &ProjectArgs) -> Result<ExitCode, Error> {
    let tree = MesonTree::load(&args.dir, &args.config(), &HashMap::new())?;

    for name in tree.scope.names() {
        if let Some(types) = tree.scope.get(name) {
            println!("{}: {}", name, types);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_command(file: &Path) -> Result<ExitCode, Error> {
    let source = read_source(file, &HashMap::new())?;
    let ast = parse_ast(file.to_path_buf(), &source);
    let options = load_options(file.parent().unwrap_or(Path::new(".")), &HashMap::new());

    let result = interpret_file(
        &ast,
        &options,
        &SystemProcessRunner::default(),
        &CancellationToken::new(),
    );
    print_diagnostics(file, &result.diagnostics);

    let mut names = result.scope.keys().collect::<Vec<_>>();
    names.sort();
    for name in names {
        if let Some(value) = result.get(name) {
            println!("{} = {}", name, value);
        }
    }

    Ok(if result.aborted {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn parse_command(file: &Path) -> Result<ExitCode, Error> {
    let source = read_source(file, &HashMap::new())?;
    let ast = parse_ast(file.to_path_buf(), &source);
    let mut out = String::new();
    dump_tree(&ast, ast.root(), 0, &mut out);
    print!("{}", out);
    Ok(ExitCode::SUCCESS)
}

fn dump_tree(ast: &Ast, id: NodeId, depth: usize, out: &mut String) {
    out.push_str(&format!(
        "{:indent$}{} {}\n",
        "",
        ast.kind(id).name(),
        ast.location(id),
        indent = depth * 2
    ));
    for child in ast.children(id) {
        dump_tree(ast, child, depth + 1, out);
    }
}

fn print_diagnostics(file: &Path, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let content = fs::read_to_string(file).unwrap_or_default();
    for diagnostic in diagnostics {
        eprintln!("{}", render_diagnostic(diagnostic, &content, file));
    }
}
