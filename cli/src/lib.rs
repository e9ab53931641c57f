//! fontcat CLI: build, filter and query the typeface catalog.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use fontcat_core::output::{write_json_pretty, write_ndjson, write_plain};
use fontcat_core::paths::{PathExpr, SearchPaths};
use fontcat_core::scan::ScanOptions;
use fontcat_core::{Catalog, CatalogConfig, Services, Value};

/// CLI entrypoint for fontcat.
#[derive(Debug, Parser)]
#[command(name = "fontcat", about = "Build and query the catalog of installed typefaces")]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Per-user catalog directory (default: FONTCAT_CACHE_DIR or the platform cache dir)
    #[arg(long = "cache-dir", global = true, value_hint = ValueHint::DirPath)]
    cache_dir: Option<PathBuf>,

    /// Global reference catalog directory (default: FONTCAT_GLOBAL_DIR or the platform data dir)
    #[arg(long = "global-dir", global = true, value_hint = ValueHint::DirPath)]
    global_dir: Option<PathBuf>,

    /// TrueType font roots, replacing FONTCAT_TRUETYPE_PATH and the system directories
    #[arg(long = "truetype-path", global = true, value_hint = ValueHint::DirPath)]
    truetype_path: Vec<PathBuf>,

    /// Follow symlinks while expanding font roots
    #[arg(long = "follow-symlinks", global = true, action = ArgAction::SetTrue)]
    follow_symlinks: bool,

    /// Worker threads for reading font names (default: all cores)
    #[arg(short = 'J', long = "jobs", global = true)]
    jobs: Option<usize>,

    /// Emit a single JSON array
    #[arg(long = "json", global = true, action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", global = true, action = ArgAction::SetTrue)]
    ndjson: bool,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan the TrueType path into the local catalog
    Build,
    /// Rebuild the global reference catalog
    BuildGlobal {
        /// Root to scan instead of the TrueType path
        #[arg(value_hint = ValueHint::DirPath)]
        path: Option<PathBuf>,
    },
    /// Add a font file, or the digest-named files of a directory
    Extend {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
    },
    /// Drop catalog entries whose fonts are no longer on disk
    Filter,
    /// Write the entries that differ from the global catalog
    Delta,
    /// List families
    Families {
        /// Families of the last saved delta
        #[arg(long = "delta", action = ArgAction::SetTrue, conflicts_with = "global")]
        delta: bool,
        /// Families of the global reference
        #[arg(long = "global", action = ArgAction::SetTrue)]
        global: bool,
    },
    /// List the styles of a family
    Styles {
        family: String,
        /// Consult the global reference
        #[arg(long = "global", action = ArgAction::SetTrue)]
        global: bool,
    },
    /// Font files holding a face
    Search { family: String, style: String },
    /// Metric characteristics of a face
    Characteristics { family: String, style: String },
    /// Substitution rules for a family
    Substitutions { family: String },
    /// Suffixes cataloged for a file stem
    Suffixes { basename: String },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Plain,
    Json,
    Ndjson,
}

impl GlobalArgs {
    fn format(&self) -> OutputFormat {
        if self.ndjson {
            OutputFormat::Ndjson
        } else if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        }
    }

    fn config(&self) -> Result<CatalogConfig> {
        if let (Some(local), Some(global)) = (&self.cache_dir, &self.global_dir) {
            return Ok(CatalogConfig::new(local, global));
        }
        let mut config = CatalogConfig::from_env()?;
        if let Some(dir) = &self.cache_dir {
            config = config.with_local_dir(dir);
        }
        if let Some(dir) = &self.global_dir {
            config = config.with_global_dir(dir);
        }
        Ok(config)
    }

    fn search_paths(&self) -> SearchPaths {
        let paths = SearchPaths::from_env().follow_symlinks(self.follow_symlinks);
        if self.truetype_path.is_empty() {
            paths
        } else {
            paths.with_truetype(self.truetype_path.iter().cloned())
        }
    }
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    execute(cli, io::stdout().lock())
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("FONTCAT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(filter)
        .try_init();
}

fn execute(cli: Cli, mut out: impl Write) -> Result<()> {
    let format = cli.global.format();
    let mut catalog = open_catalog(&cli.global)?;

    match cli.command {
        Command::Build => {
            let summary = catalog.build_local()?;
            emit_one(&summary, format, &mut out, |s| {
                format!("{} files, {} faces, {} skipped", s.files, s.faces, s.skipped)
            })
        }
        Command::BuildGlobal { path } => {
            let expr = path.map(|p| PathExpr::with_sub_dirs(&p, cli.global.follow_symlinks));
            let summary = catalog.build_global(expr)?;
            emit_one(&summary, format, &mut out, |s| {
                format!("{} files, {} faces, {} skipped", s.files, s.faces, s.skipped)
            })
        }
        Command::Extend { path } => {
            let faces = catalog.extend_local(&path)?;
            emit_one(&faces, format, &mut out, |n| format!("{n} faces added"))
        }
        Command::Filter => {
            catalog.load();
            catalog.filter();
            catalog.filter_features();
            catalog.filter_characteristics();
            catalog.save()?;
            let kept = catalog.fonts().len();
            emit_one(&kept, format, &mut out, |n| format!("{n} faces kept"))
        }
        Command::Delta => {
            let summary = catalog.save_local_delta()?;
            emit_one(&summary, format, &mut out, |s| {
                format!(
                    "{} fonts, {} features, {} characteristics",
                    s.fonts, s.features, s.characteristics
                )
            })
        }
        Command::Families { delta, global } => {
            let families = if delta {
                catalog.delta_families()
            } else if global {
                catalog.global_families()
            } else {
                catalog.families()
            };
            emit(&families, format, &mut out)
        }
        Command::Styles { family, global } => {
            let styles = if global {
                catalog.global_styles(&family)
            } else {
                catalog.styles(&family)
            };
            emit(&styles, format, &mut out)
        }
        Command::Search { family, style } => emit(&catalog.search(&family, &style), format, &mut out),
        Command::Characteristics { family, style } => {
            emit(&catalog.characteristics(&family, &style), format, &mut out)
        }
        Command::Substitutions { family } => {
            let rules: Vec<Value> = catalog.substitutions(&family);
            emit(&rules, format, &mut out)
        }
        Command::Suffixes { basename } => emit(&catalog.suffixes(&basename), format, &mut out),
    }
}

fn open_catalog(args: &GlobalArgs) -> Result<Catalog> {
    let config = args.config()?;
    tracing::debug!(
        "local catalog {}, global catalog {}",
        config.local_dir.display(),
        config.global_dir.display()
    );
    let services = services(args.search_paths());
    Ok(Catalog::new(config, services).with_scan_options(ScanOptions { jobs: args.jobs }))
}

#[cfg(feature = "fontations")]
fn services(paths: SearchPaths) -> Services {
    let introspector = fontcat_core::fontations::FontationsIntrospector::new(paths.roots());
    Services::new(paths, introspector)
}

#[cfg(not(feature = "fontations"))]
fn services(paths: SearchPaths) -> Services {
    Services::new(paths, NoFontParsing)
}

/// Stand-in used when the binary is built without a font parser: catalogs
/// can be queried and filtered but not scanned.
#[cfg(not(feature = "fontations"))]
struct NoFontParsing;

#[cfg(not(feature = "fontations"))]
impl fontcat_core::FontIntrospector for NoFontParsing {
    fn introspect_names(&self, path: &std::path::Path) -> Result<Vec<fontcat_core::FontKey>> {
        Err(anyhow::anyhow!(
            "cannot read {}: built without the fontations feature",
            path.display()
        ))
    }

    fn font_exists(&self, _name: &str) -> bool {
        false
    }

    fn analyze_metrics(&self, name: &str) -> Result<Vec<String>> {
        Err(anyhow::anyhow!(
            "cannot analyze {name}: built without the fontations feature"
        ))
    }
}

fn emit<T: Serialize + Display>(items: &[T], format: OutputFormat, out: impl Write) -> Result<()> {
    match format {
        OutputFormat::Json => write_json_pretty(items, out),
        OutputFormat::Ndjson => write_ndjson(items, out),
        OutputFormat::Plain => write_plain(items, out),
    }
}

fn emit_one<T: Serialize>(
    item: &T,
    format: OutputFormat,
    mut out: impl Write,
    render: impl Fn(&T) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item)?;
            writeln!(out, "{json}")?;
        }
        OutputFormat::Ndjson => {
            let json = serde_json::to_string(item)?;
            writeln!(out, "{json}")?;
        }
        OutputFormat::Plain => writeln!(out, "{}", render(item))?,
    }
    Ok(())
}
