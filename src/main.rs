//! Romzip CLI - List and extract cartridge images from ZIP archives.
//!
//! This is the main entry point for the romzip command-line application.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use romzip::prelude::*;

/// Romzip - ZIP archive reader for cartridge images
#[derive(Parser)]
#[command(name = "romzip")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List entries of a ZIP archive
    List {
        /// Path to the ZIP file
        #[arg(short, long, env = "ROMZIP_ARCHIVE")]
        archive: PathBuf,

        /// Filter pattern (glob-style, case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Include empty and macOS metadata entries
        #[arg(long)]
        all: bool,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show the archive's end of central directory record
    Info {
        /// Path to the ZIP file
        #[arg(short, long, env = "ROMZIP_ARCHIVE")]
        archive: PathBuf,
    },

    /// Extract entries from a ZIP archive
    Extract {
        /// Path to the ZIP file
        #[arg(short, long, env = "ROMZIP_ARCHIVE")]
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, env = "ROMZIP_OUTPUT")]
        output: PathBuf,

        /// Filter pattern (glob-style, case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Only extract entries with a cartridge image extension
        #[arg(long)]
        roms_only: bool,

        /// Check each entry's CRC-32 after decompression
        #[arg(long)]
        verify_crc: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List {
            archive,
            filter,
            all,
            detailed,
        } => {
            cmd_list(&archive, filter.as_deref(), all, detailed)?;
        }
        Commands::Info { archive } => {
            cmd_info(&archive)?;
        }
        Commands::Extract {
            archive,
            output,
            filter,
            roms_only,
            verify_crc,
        } => {
            cmd_extract(&archive, &output, filter.as_deref(), roms_only, verify_crc)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_list(path: &Path, filter: Option<&str>, all: bool, detailed: bool) -> Result<()> {
    let mut archive = ZipArchive::open(path).context("Failed to open ZIP archive")?;
    let filter = NameFilter::new(filter)?;

    let mut count = 0;
    loop {
        let next = if all {
            archive.next_header()
        } else {
            archive.next_entry()
        };
        let Some(entry) = next else { break };

        if !filter.matches(&entry.filename) {
            continue;
        }

        if detailed {
            let (year, month, day) = entry.mod_date();
            let (hour, minute, second) = entry.mod_time();
            println!(
                "{:>10} {:>10} {:>8} {:08x} {:04}-{:02}-{:02} {:02}:{:02}:{:02} {}",
                entry.compressed_length,
                entry.uncompressed_length,
                method_name(&entry),
                entry.crc32,
                year,
                month,
                day,
                hour,
                minute,
                second,
                entry.filename
            );
        } else {
            println!("{}", entry.filename);
        }
        count += 1;
    }

    if archive.is_corrupt() {
        warn!("central directory ends in a malformed record; listing is incomplete");
    }

    println!("\nTotal: {} entries", count);

    Ok(())
}

fn cmd_info(path: &Path) -> Result<()> {
    let archive = ZipArchive::open(path).context("Failed to open ZIP archive")?;
    let ecd = archive.ecd();

    println!("Archive:            {}", archive.path().display());
    println!("File size:          {} bytes", archive.file_length());
    println!("EOCD offset:        {}", ecd.offset);
    println!("Disk number:        {}", ecd.disk_number);
    println!("Entries:            {}", ecd.cd_total_entries);
    println!("Central directory:  {} bytes at offset {}", ecd.cd_size, ecd.cd_offset);
    println!("Cartridge images:   {}", archive.rom_files());
    if !ecd.comment.is_empty() {
        println!("Comment:            {}", ecd.comment_str());
    }

    let invalid = archive
        .central_directory()
        .headers()
        .filter(|h| !h.has_valid_signature())
        .count();
    if invalid > 0 {
        warn!(invalid, "central directory records with an unexpected signature");
    }

    Ok(())
}

fn cmd_extract(
    path: &Path,
    output: &Path,
    filter: Option<&str>,
    roms_only: bool,
    verify_crc: bool,
) -> Result<()> {
    println!("Opening ZIP archive: {}", path.display());

    let mut handler = ZipHandler::with_options(HandlerOptions {
        verify_crc,
        ..HandlerOptions::default()
    });
    handler.open(path).context("Failed to open ZIP archive")?;

    let filter = NameFilter::new(filter)?;
    let total = handler
        .entries()
        .iter()
        .filter(|&e| is_selected(e, &filter, roms_only))
        .count();

    println!("Extracting {} entries...", total);

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let mut extracted = 0;
    let mut errors = 0;

    while handler.has_next() {
        if handler.next_file().is_none() {
            break;
        }
        let Some(entry) = handler.current_entry().cloned() else { break };
        if !is_selected(&entry, &filter, roms_only) {
            continue;
        }

        let Some(target) = output_path(output, &entry.filename) else {
            warn!(name = %entry.filename, "skipping entry with an unsafe path");
            errors += 1;
            pb.inc(1);
            continue;
        };

        match handler.decompress() {
            Ok(data) => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, data)
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                debug!(path = %target.display(), "extracted");
                extracted += 1;
            }
            Err(e) => {
                warn!(name = %entry.filename, kind = %e.kind(), "{}", e);
                errors += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!(
        "Extracted {} entries in {:?} ({} errors)",
        extracted,
        start.elapsed(),
        errors
    );

    Ok(())
}

fn method_name(entry: &EntryHeader) -> String {
    match entry.compression_method() {
        Ok(method) => method.to_string(),
        Err(raw) => format!("m{}", raw),
    }
}

/// Whether `cmd_extract` writes `entry` out. Directory entries never are.
fn is_selected(entry: &EntryHeader, filter: &NameFilter, roms_only: bool) -> bool {
    !entry.is_dir() && (!roms_only || entry.has_rom_extension()) && filter.matches(&entry.filename)
}

/// Where an entry lands under `root`, or `None` if its name escapes it.
fn output_path(root: &Path, name: &str) -> Option<PathBuf> {
    let relative = PathBuf::from(name.replace('\\', "/"));
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    safe.then(|| root.join(relative))
}

/// Case-insensitive glob filter over entry names.
struct NameFilter {
    pattern: Option<Pattern>,
}

impl NameFilter {
    fn new(pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .map(|p| Pattern::new(p).with_context(|| format!("Invalid filter pattern: {}", p)))
            .transpose()?;
        Ok(Self { pattern })
    }

    fn matches(&self, name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.pattern
            .as_ref()
            .map_or(true, |p| p.matches_with(name, options))
    }
}
