//! steelyard - See what an application bundle is made of.
//!
//! Usage:
//!   steelyard inspect <PATH>      Size breakdown of a bundle
//!   steelyard duplicates <PATH>   Find duplicated content
//!   steelyard layout <PATH>       Treemap geometry as JSON
//!   steelyard export <PATH>       Export the full tree to JSON
//!   steelyard --help              Show help

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use steelyard_analyze::{DuplicateAnalyzer, DuplicateConfig, DuplicateReport};
use steelyard_core::{ArchiveTree, InspectConfig, TreeDescription};
use steelyard_layout::{LayoutOptions, Rect, layout_tree};
use steelyard_scan::{ArchiveBuilder, ExtractedArchive, open_archive};

#[derive(Parser)]
#[command(
    name = "steelyard",
    version,
    about = "Break an application bundle down by size",
    long_about = "steelyard shows where the bytes of an application bundle go.\n\n\
                  It accepts a zipped package (.ipa) or an extracted directory, \
                  splits executables into segments and asset catalogs into \
                  renditions, and flags content that appears more than once."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the size breakdown of a bundle
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Maximum depth to display
        #[arg(short, long, default_value = "4")]
        depth: u32,

        /// Show all levels (no depth limit on display)
        #[arg(short, long)]
        all: bool,
    },

    /// Find duplicated files and directories
    Duplicates {
        #[command(flatten)]
        source: SourceArgs,

        /// Report nested duplicates too, not only the shallowest ones
        #[arg(short, long)]
        all: bool,

        /// Minimum size of a duplicate to report (e.g., "1KB", "1MB")
        #[arg(short, long, default_value = "0")]
        min_size: String,

        /// Maximum number of duplicate groups to show (0 = all)
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Compute a squarified treemap of the bundle
    Layout {
        #[command(flatten)]
        source: SourceArgs,

        /// Width of the frame
        #[arg(long, default_value = "1024")]
        width: f64,

        /// Height of the frame
        #[arg(long, default_value = "768")]
        height: f64,

        /// Deepest level to lay out
        #[arg(short, long, default_value = "3")]
        depth: u32,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the full tree to JSON
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Where to read the bundle from and how to break it down.
#[derive(Args)]
struct SourceArgs {
    /// Bundle to inspect: a zipped package or a directory
    path: PathBuf,

    /// Do not split executables into segments
    #[arg(long)]
    no_binaries: bool,

    /// Do not split asset catalogs into renditions
    #[arg(long)]
    no_assets: bool,

    /// Program reporting segment sizes
    #[arg(long, default_value = "size")]
    size_tool: PathBuf,

    /// Program reporting asset catalog contents
    #[arg(long, default_value = "xcrun")]
    asset_tool: PathBuf,

    /// Seconds to wait for an external tool
    #[arg(long, default_value = "30")]
    tool_timeout: u64,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,

    /// Skip hidden files
    #[arg(long)]
    skip_hidden: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Inspect { source, depth, all } => {
            run_inspect(&source, if all { None } else { Some(depth) })?;
        }
        Command::Duplicates {
            source,
            all,
            min_size,
            top,
            format,
        } => {
            run_duplicates(&source, all, &min_size, top, format)?;
        }
        Command::Layout {
            source,
            width,
            height,
            depth,
            output,
        } => {
            run_layout(&source, Rect::from_size(width, height), depth, output)?;
        }
        Command::Export { source, output } => {
            run_export(&source, output)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Open, build and mark duplicates.
///
/// The extracted bundle is returned alongside the tree so a temporary
/// directory outlives everything that reads from it.
fn build_tree(
    source: &SourceArgs,
    duplicates: DuplicateConfig,
) -> Result<(ExtractedArchive, ArchiveTree, DuplicateReport)> {
    eprintln!("Opening {}...", source.path.display());
    let bundle = open_archive(&source.path)
        .wrap_err_with(|| format!("Cannot open {}", source.path.display()))?;

    let config = InspectConfig::builder()
        .root(bundle.root())
        .introspect_binaries(!source.no_binaries)
        .introspect_assets(!source.no_assets)
        .size_tool(source.size_tool.clone())
        .asset_tool(source.asset_tool.clone())
        .tool_timeout_secs(source.tool_timeout)
        .threads(source.threads)
        .include_hidden(!source.skip_hidden)
        .build()
        .map_err(|e| eyre!("Invalid configuration: {e}"))?;

    let builder = ArchiveBuilder::from_config(&config).context("Cannot start external tools")?;
    let mut tree = builder.build(&config).context("Build failed")?;

    for warning in &tree.warnings {
        warn!(path = %warning.path.display(), kind = ?warning.kind, "{}", warning.message);
    }

    let report = DuplicateAnalyzer::with_config(duplicates).analyze(&mut tree);
    info!(
        nodes = tree.stats.total_files + tree.stats.total_dirs + tree.stats.synthetic_nodes,
        duplicates = report.nodes_with_duplicates,
        elapsed = ?tree.build_duration,
        "tree ready"
    );

    Ok((bundle, tree, report))
}

/// Print a summary and the indented tree.
fn run_inspect(source: &SourceArgs, max_depth: Option<u32>) -> Result<()> {
    let (_bundle, tree, report) = build_tree(source, DuplicateConfig::default())?;

    println!();
    println!("{}", "─".repeat(60));
    println!(" {} - {}", source.path.display(), format_size(tree.total_size()));
    println!(
        " {} files, {} directories, {} binaries, {} asset catalogs",
        tree.stats.total_files, tree.stats.total_dirs, tree.stats.binaries, tree.stats.asset_catalogs
    );
    if let Some((path, size)) = &tree.stats.largest_file {
        println!(
            " Largest file: {} ({})",
            display_relative(path, &tree.root_path),
            format_size(*size)
        );
    }
    println!(
        " Duplicated content: {} in {} groups",
        format_size(report.total_wasted_space),
        report.group_count
    );
    println!(" Built in {:.2}s", tree.build_duration.as_secs_f64());
    println!("{}", "─".repeat(60));
    println!();

    let description = TreeDescription::new(&tree.root);
    match max_depth {
        Some(depth) => print!("{}", description.max_depth(depth)),
        None => print!("{description}"),
    }

    if tree.has_warnings() {
        println!();
        println!("{} warning(s) during build", tree.warnings.len());
    }

    Ok(())
}

/// Report duplicate groups.
fn run_duplicates(
    source: &SourceArgs,
    all: bool,
    min_size: &str,
    top_n: usize,
    format: OutputFormat,
) -> Result<()> {
    let config = DuplicateConfig::builder()
        .min_size(parse_size(min_size)?)
        .max_groups(top_n)
        .top_level_only(!all)
        .build()
        .map_err(|e| eyre!("Invalid duplicate options: {e}"))?;
    let (_bundle, tree, report) = build_tree(source, config)?;

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Duplicate Content Report");
            println!("{}", "─".repeat(70));
            println!();

            if report.groups.is_empty() {
                println!(" No duplicated content found.");
            } else {
                println!(
                    " Found {} duplicate groups ({} nodes)",
                    report.group_count,
                    report.total_duplicate_nodes()
                );
                println!(" Total wasted space: {}", format_size(report.total_wasted_space));
                println!();

                for (i, group) in report.groups.iter().enumerate() {
                    println!(
                        " Group {} ({} copies, {} each, {} wasted)",
                        i + 1,
                        group.count(),
                        format_size(group.size),
                        format_size(group.wasted_bytes)
                    );
                    for path in group.paths() {
                        println!("   {}", display_relative(path, &tree.root_path));
                    }
                    println!();
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Write treemap rectangles as JSON.
fn run_layout(source: &SourceArgs, frame: Rect, depth: u32, output: Option<PathBuf>) -> Result<()> {
    if frame.is_empty() {
        return Err(eyre!("Frame must have a positive width and height"));
    }
    let (_bundle, tree, _) = build_tree(source, DuplicateConfig::default())?;

    let options = LayoutOptions {
        max_depth: depth,
        ..LayoutOptions::default()
    };
    let rects = layout_tree(&tree.root, frame, &options);
    write_json(&serde_json::to_string_pretty(&rects)?, output)
}

/// Export the full tree as JSON.
fn run_export(source: &SourceArgs, output: Option<PathBuf>) -> Result<()> {
    let (_bundle, tree, _) = build_tree(source, DuplicateConfig::default())?;
    write_json(&serde_json::to_string_pretty(&tree)?, output)
}

fn write_json(json: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .wrap_err_with(|| format!("Cannot write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{json}");
        }
    }
    Ok(())
}

/// Path relative to the bundle root, for display.
fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a size string (e.g., "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let number = |s: &str| -> Result<f64> {
        s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.')
            .parse()
            .wrap_err_with(|| format!("Invalid size: {s}"))
    };

    let (num, multiplier) = if s.ends_with("GB") || s.ends_with('G') {
        (number(&s)?, 1024 * 1024 * 1024)
    } else if s.ends_with("MB") || s.ends_with('M') {
        (number(&s)?, 1024 * 1024)
    } else if s.ends_with("KB") || s.ends_with('K') {
        (number(&s)?, 1024)
    } else {
        (number(&s)?, 1)
    };

    Ok((num * multiplier as f64) as u64)
}
