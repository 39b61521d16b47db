//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::model::{FindError, Meta, Origin, ResultItem, ResultSet};
use crate::core::paths::{canonical, display_path};
use crate::core::render::{OutputFormat, RenderConfig, Renderer};
use crate::resolver::config::ResolverConfig;
use crate::resolver::fs::{FileSystem, OsFileSystem};
use crate::resolver::locate::Pass;
use crate::resolver::log::LogLevel;
use crate::resolver::scan::scan_tree;
use crate::resolver::search::Resolver;
use crate::resolver::validate::is_valid_env;

/// venvfind - locate Python virtual environments near a directory.
#[derive(Parser, Debug)]
#[command(name = "venvfind")]
#[command(
    author,
    version,
    about,
    long_about = r#"venvfind emits a machine-readable result model for every command.

Each command prints a ResultSet in the selected format (default: jsonl).

Output formats:
- jsonl: one JSON object per line (best for piping into tools)
- json: a single JSON array
- md: human-friendly Markdown
- raw: found environment paths only, one per line

Examples:
    venvfind resolve
    venvfind resolve ~/work/api ~/work/worker
    venvfind check .venv
    venvfind scan ~/work --max-depth 4
"#
)]
pub struct Cli {
    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw (found paths only; handy for command substitution)"
    )]
    pub format: String,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    /// Quiet mode (no search diagnostics on stderr).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Suppress search diagnostics. Machine-readable results are still\n\
printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (per-probe diagnostics on stderr).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Report every cache consultation and ancestor step on stderr.\n\
Intended for debugging search behavior."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the nearest virtual environment for one or more directories.
    #[command(
        long_about = "Resolve the nearest virtual environment for each DIR.\n\n\
Within a directory, conventionally named candidates (env, venv, .env, .venv,\n\
virtualenv) are checked first, then any non-hidden subdirectory with the\n\
required marker files and directories. If nothing matches, the search climbs\n\
ancestor directories up to --max-depth levels.\n\n\
All DIRs share one resolver, so repeated or nested queries are served from\n\
its cache.\n\n\
Examples:\n\
  venvfind resolve\n\
  venvfind resolve ~/work/api --max-depth 2\n\
  venvfind resolve --names venv,.venv --no-parents\n"
    )]
    Resolve {
        /// Directories to resolve for (defaults to the current directory).
        #[arg(value_name = "DIR")]
        dirs: Vec<PathBuf>,

        /// Candidate directory names, in priority order.
        #[arg(
            long,
            value_name = "NAMES",
            value_delimiter = ',',
            long_help = "Comma-separated candidate directory names, checked in the given\n\
order before falling back to structure detection.\n\n\
Example: --names venv,.venv"
        )]
        names: Vec<String>,

        /// Marker file a candidate must contain (repeatable).
        #[arg(long = "require-file", value_name = "NAME")]
        require_file: Vec<String>,

        /// Marker subdirectory a candidate must contain (repeatable).
        #[arg(long = "require-dir", value_name = "NAME")]
        require_dir: Vec<String>,

        /// Do not search ancestor directories.
        #[arg(long)]
        no_parents: bool,

        /// Maximum ancestor levels to climb.
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Include the activation script path in found results.
        #[arg(
            long,
            long_help = "Decorate found environments with the path of their activation\n\
script (<env>/bin/activate). venvfind never activates anything itself."
        )]
        activate: bool,
    },

    /// Validate candidate directories directly.
    #[command(
        long_about = "Check whether each PATH is itself a valid virtual environment:\n\
every required marker file and marker directory must exist directly under it.\n\n\
Existence checks only; nothing is read or parsed.\n\n\
Examples:\n\
  venvfind check .venv\n\
  venvfind check /opt/envs/*\n"
    )]
    Check {
        /// Candidate directories to validate.
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Marker file a candidate must contain (repeatable).
        #[arg(long = "require-file", value_name = "NAME")]
        require_file: Vec<String>,

        /// Marker subdirectory a candidate must contain (repeatable).
        #[arg(long = "require-dir", value_name = "NAME")]
        require_dir: Vec<String>,
    },

    /// Scan a whole tree and report every virtual environment in it.
    #[command(
        long_about = "Walk the tree under DIR and report every directory that validates\n\
as a virtual environment. Gitignore rules are not consulted (environments\n\
are routinely gitignored). Hidden directories are skipped unless they match\n\
a configured common name; pass --hidden to include all of them.\n\n\
Examples:\n\
  venvfind scan ~/work\n\
  venvfind scan --max-depth 4 --hidden\n"
    )]
    Scan {
        /// Root of the tree to scan (defaults to the current directory).
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Maximum directory depth from the scan root.
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Include all hidden directories in the walk.
        #[arg(long)]
        hidden: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);
    let log_level = if cli.quiet {
        LogLevel::Silent
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Info
    };

    match cli.command {
        Commands::Resolve {
            dirs,
            names,
            require_file,
            require_dir,
            no_parents,
            max_depth,
            activate,
        } => {
            let mut config = ResolverConfig {
                search_parents: !no_parents,
                auto_activate: activate,
                log_level,
                ..Default::default()
            };
            if !names.is_empty() {
                config.common_names = names;
            }
            if !require_file.is_empty() {
                config.required_files = require_file;
            }
            if !require_dir.is_empty() {
                config.required_dirs = require_dir;
            }
            if let Some(depth) = max_depth {
                config.max_parent_depth = depth;
            }
            run_resolve(config, &dirs, render_config)
        }

        Commands::Check {
            paths,
            require_file,
            require_dir,
        } => {
            let mut config = ResolverConfig::default();
            if !require_file.is_empty() {
                config.required_files = require_file;
            }
            if !require_dir.is_empty() {
                config.required_dirs = require_dir;
            }
            config.validate()?;
            run_check(&config, &paths, render_config)
        }

        Commands::Scan {
            dir,
            max_depth,
            hidden,
        } => {
            let root = dir.unwrap_or_else(|| PathBuf::from("."));
            let root = canonical(&root);
            let result_set = scan_tree(&ResolverConfig::default(), &root, max_depth, hidden)?;
            print_result_set(&result_set, render_config);
            Ok(())
        }
    }
}

/// Resolve each start directory against one shared resolver
fn run_resolve(config: ResolverConfig, dirs: &[PathBuf], render_config: RenderConfig) -> Result<()> {
    let auto_activate = config.auto_activate;
    let resolver = Resolver::new(config)?;
    let active = active_env();

    let current_dir = PathBuf::from(".");
    let dirs: &[PathBuf] = if dirs.is_empty() {
        std::slice::from_ref(&current_dir)
    } else {
        dirs
    };

    let mut result_set = ResultSet::new();
    for dir in dirs {
        let start = display_path(dir);
        let outcome = resolver.resolve_entry(dir);
        let item = match outcome.path {
            Some(path) => {
                let origin = if outcome.cached {
                    Origin::Cache
                } else {
                    match outcome.pass {
                        Some(Pass::Name) => Origin::Name,
                        Some(Pass::Structure) => Origin::Structure,
                        None => Origin::Cache,
                    }
                };
                let meta = Meta {
                    depth: outcome.depth,
                    active: Some(active.as_deref() == Some(path.as_path())),
                    activate: auto_activate
                        .then(|| display_path(&path.join("bin").join("activate"))),
                };
                ResultItem::env(start, display_path(&path), origin).with_meta(meta)
            }
            None => ResultItem::miss(start),
        };
        result_set.push(item);
    }

    print_result_set(&result_set, render_config);
    Ok(())
}

/// Validate each candidate path directly
fn run_check(config: &ResolverConfig, paths: &[PathBuf], render_config: RenderConfig) -> Result<()> {
    let fs = OsFileSystem;
    let mut result_set = ResultSet::new();

    for path in paths {
        let shown = display_path(path);
        let item = if !fs.is_dir(path) && !fs.is_file(path) {
            ResultItem::error(FindError::new(
                "NOT_FOUND",
                format!("no such path: {}", shown),
            ))
            .with_start(shown)
        } else if is_valid_env(&fs, config, path) {
            ResultItem::env(shown.clone(), shown, Origin::Structure)
        } else {
            ResultItem::miss(shown)
        };
        result_set.push(item);
    }

    print_result_set(&result_set, render_config);
    Ok(())
}

/// The shell's currently active environment, if any
fn active_env() -> Option<PathBuf> {
    std::env::var_os("VIRTUAL_ENV")
        .map(PathBuf::from)
        .map(|p| canonical(&p))
}

fn print_result_set(result_set: &ResultSet, render_config: RenderConfig) {
    let renderer = Renderer::with_config(render_config);
    let rendered = renderer.render(result_set);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}
