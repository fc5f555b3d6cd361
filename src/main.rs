//! hpak CLI - Command-line tool for HPI game archives.
//!
//! This is the main entry point for the hpak command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hpak_hpi::{normalize_path, DirectoryLayout, EntryInfo, HpiReader, ReadOptions};

/// hpak - HPI archive listing and extraction tool
#[derive(Parser)]
#[command(name = "hpak")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the header of an archive
    Info {
        /// Path to the archive
        #[arg(env = "HPAK_INPUT")]
        archive: PathBuf,
    },

    /// List contents of an archive without decoding file data
    List {
        /// Path to the archive
        #[arg(env = "HPAK_INPUT")]
        archive: PathBuf,

        /// Filter pattern (glob-style, case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show size and compression
        #[arg(short, long)]
        detailed: bool,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode archives and write their files to disk
    Extract {
        /// Archives to extract
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Output directory; each archive goes to a subdirectory named after it
        #[arg(short, long, env = "HPAK_OUTPUT")]
        output: PathBuf,

        /// Filter pattern (glob-style, case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Verify chunk checksums
        #[arg(long)]
        verify: bool,
    },

    /// Detect the top-level asset directories of an archive
    Layout {
        /// Path to the archive
        #[arg(env = "HPAK_INPUT")]
        archive: PathBuf,

        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Info { archive } => {
            cmd_info(&archive)?;
        }
        Commands::List {
            archive,
            filter,
            detailed,
            json,
        } => {
            cmd_list(&archive, filter.as_deref(), detailed, json)?;
        }
        Commands::Extract {
            archives,
            output,
            filter,
            verify,
        } => {
            cmd_extract(&archives, &output, filter.as_deref(), verify)?;
        }
        Commands::Layout { archive, json } => {
            cmd_layout(&archive, json)?;
        }
    }

    Ok(())
}

/// Install the log subscriber. `RUST_LOG` applies unless `-v` is given.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_info(path: &Path) -> Result<()> {
    let mut reader = HpiReader::open(path).context("Failed to open HPI archive")?;
    let header = *reader.header();

    println!("Archive:         {}", path.display());
    println!("Marker:          {}", String::from_utf8_lossy(&header.magic));
    println!(
        "Type:            {}",
        if header.is_save() { "saved game" } else { "archive" }
    );
    println!("Directory size:  {}", header.directory_size.get());
    println!("Header key:      {:#010x}", header.key());
    println!("Root offset:     {}", header.root_offset());

    let entries = reader.entries().context("Failed to read directory")?;
    let total: u64 = entries.iter().map(|e| e.size() as u64).sum();
    println!("Files:           {}", entries.len());
    println!("Total size:      {}", total);

    Ok(())
}

fn cmd_list(path: &Path, filter: Option<&str>, detailed: bool, json: bool) -> Result<()> {
    let filter = PathFilter::new(filter)?;
    let mut reader = HpiReader::open(path).context("Failed to open HPI archive")?;
    let entries: Vec<EntryInfo> = reader
        .entries()
        .context("Failed to read directory")?
        .into_iter()
        .filter(|e| filter.matches(e.path()))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        if detailed {
            let method = entry
                .compression()
                .map_or_else(|| "unknown".to_string(), |m| m.to_string());
            println!(
                "{:>12} {:>6} {:>8} {}",
                entry.size(),
                entry.chunk_count(),
                method,
                entry.path()
            );
        } else {
            println!("{}", entry.path());
        }
    }

    println!("\nTotal: {} entries", entries.len());

    Ok(())
}

fn cmd_extract(
    archives: &[PathBuf],
    output: &Path,
    filter: Option<&str>,
    verify: bool,
) -> Result<()> {
    let filter = PathFilter::new(filter)?;
    let options = ReadOptions {
        verify_checksums: verify,
        ..ReadOptions::default()
    };

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let pb = ProgressBar::new(archives.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let results: Vec<(&PathBuf, Result<usize>)> = archives
        .par_iter()
        .map(|path| {
            let result = extract_archive(path, output, &filter, &options);
            pb.set_message(path.display().to_string());
            pb.inc(1);
            (path, result)
        })
        .collect();
    pb.finish_and_clear();

    let mut failed = 0;
    let mut written = 0;
    for (path, result) in &results {
        match result {
            Ok(count) => {
                println!("{}: {} files", path.display(), count);
                written += count;
            }
            Err(e) => {
                eprintln!("Error extracting {}: {:#}", path.display(), e);
                failed += 1;
            }
        }
    }

    println!(
        "Extracted {} files from {} archives in {:?} ({} failed)",
        written,
        archives.len() - failed,
        start.elapsed(),
        failed
    );

    if failed > 0 {
        anyhow::bail!("{} of {} archives failed", failed, archives.len());
    }

    Ok(())
}

/// Decode one archive and write its matching files under `output/<stem>/`.
fn extract_archive(
    path: &Path,
    output: &Path,
    filter: &PathFilter,
    options: &ReadOptions,
) -> Result<usize> {
    let store = HpiReader::open_with_options(path, options.clone())
        .and_then(HpiReader::into_store)
        .context("Failed to decode HPI archive")?;

    let stem = path
        .file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("archive"));
    let root = output.join(stem);
    info!(archive = %path.display(), files = store.len(), "decoded");

    let mut written = 0;
    for (name, data) in store.iter() {
        if !filter.matches(name) {
            continue;
        }

        // Store keys never contain `..`, so this stays under `root`
        let output_path = root.join(name.trim_start_matches('/'));
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::write(&output_path, data)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        debug!(path = %output_path.display(), bytes = data.len(), "wrote");
        written += 1;
    }

    Ok(written)
}

fn cmd_layout(path: &Path, json: bool) -> Result<()> {
    let mut reader = HpiReader::open(path).context("Failed to open HPI archive")?;
    let paths: Vec<String> = reader
        .entries()
        .context("Failed to read directory")?
        .iter()
        .map(|e| normalize_path(e.path()))
        .collect();

    let layout = DirectoryLayout::detect_from_paths(paths.iter().map(String::as_str));

    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }

    let show = |dir: &Option<String>| dir.as_deref().unwrap_or("-").to_string();
    println!("units:     {}", show(&layout.units));
    println!("weapons:   {}", show(&layout.weapons));
    println!("unitpics:  {}", show(&layout.unitpics));
    println!("downloads: {}", show(&layout.downloads));

    Ok(())
}

/// Optional case-insensitive glob over archive paths.
///
/// Patterns are matched against the path without its leading `/`, and `*`
/// crosses directory boundaries.
struct PathFilter(Option<Pattern>);

impl PathFilter {
    const OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    fn new(pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .map(Pattern::new)
            .transpose()
            .context("Invalid filter pattern")?;
        Ok(Self(pattern))
    }

    fn matches(&self, path: &str) -> bool {
        match &self.0 {
            Some(pattern) => pattern.matches_with(path.trim_start_matches('/'), Self::OPTIONS),
            None => true,
        }
    }
}
