//! # CLI Module
//!
//! Command-line interface for the photo cleanup tool.
//!
//! ## Usage
//! ```bash
//! # Rename visually similar images in the current folder
//! photo-cleanup
//!
//! # Walk subfolders, quarantine exact copies under [Dupes]
//! photo-cleanup ~/Photos --recursive --move-suspected-duplicates --crc-match
//!
//! # Move images under 1920x1080 to [Junk] as well
//! photo-cleanup ~/Photos -r -s -w 1920 -h 1080
//!
//! # JSON output
//! photo-cleanup ~/Photos --output json
//! ```

use clap::{ArgAction, Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_cleanup::core::comparator::{DetectionMode, DEFAULT_THRESHOLD};
use photo_cleanup::core::pipeline::{Pipeline, PipelineResult, DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH};
use photo_cleanup::core::relocator::{RelocationMode, DUPES_FOLDER, JUNK_FOLDER};
use photo_cleanup::error::{CleanupError, Result};
use photo_cleanup::events::{
    Event, EventChannel, EventReceiver, FingerprintEvent, PipelineEvent, RelocateEvent,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;

/// Photo Cleanup - move duplicate and too-small images out of the way
#[derive(Parser, Debug)]
#[command(name = "photo-cleanup")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Folder to scan
    #[arg(default_value = ".")]
    folder: PathBuf,

    /// Recurse into subfolders of the target folder
    #[arg(short, long)]
    recursive: bool,

    /// Move images that are too small into the [Junk] folder
    #[arg(short = 's', long)]
    remove_small: bool,

    /// Move suspected duplicates into the [Dupes] folder instead of renaming them
    #[arg(short = 'd', long)]
    move_suspected_duplicates: bool,

    /// Find duplicates by image content (default; -n and -c take precedence)
    #[arg(short, long)]
    image_content: bool,

    /// Find duplicates by identical file names; works for all file types
    #[arg(short = 'n', long)]
    filename_match: bool,

    /// Find duplicates by CRC-32 of the contents; works for all file types
    #[arg(short, long)]
    crc_match: bool,

    /// Minimum width in pixels
    #[arg(short = 'w', long, default_value_t = DEFAULT_MIN_WIDTH)]
    min_width: u32,

    /// Minimum height in pixels
    #[arg(short = 'h', long, default_value_t = DEFAULT_MIN_HEIGHT)]
    min_height: u32,

    /// Hamming distance below which images count as duplicates (65 matches every image)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_THRESHOLD,
        value_parser = clap::value_parser!(u32).range(0..=65)
    )]
    threshold: u32,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

impl Cli {
    fn mode(&self) -> DetectionMode {
        DetectionMode::from_flags(self.filename_match, self.crc_match)
    }

    fn relocation(&self) -> RelocationMode {
        if self.move_suspected_duplicates {
            RelocationMode::Quarantine
        } else {
            RelocationMode::RenameInPlace
        }
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    photo_cleanup::init_tracing(if cli.verbose { "debug" } else { "warn" });

    let term = Term::stderr();
    let pretty = cli.output == OutputFormat::Pretty;
    let mode = cli.mode();

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Photo Cleanup").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line(&format!(
            "Processing '{}', finding duplicates by {}",
            cli.folder.display(),
            mode
        ))
        .ok();
        if cli.image_content && mode != DetectionMode::Image {
            term.write_line(&format!(
                "{}",
                style(format!("--image-content ignored, matching by {} instead", mode)).yellow()
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    let pipeline = Pipeline::builder()
        .root(&cli.folder)
        .recursive(cli.recursive)
        .mode(mode)
        .relocation(cli.relocation())
        .remove_small(cli.remove_small)
        .min_dimensions(cli.min_width, cli.min_height)
        .threshold(cli.threshold)
        .build();

    let (sender, receiver) = EventChannel::new();

    let progress = pretty.then(|| {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        pb
    });

    // Handle events in a separate thread
    let verbose = cli.verbose;
    let event_thread = thread::spawn(move || drive_progress(receiver, progress, verbose));

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;

    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, mode, cli.verbose),
        OutputFormat::Json => print_json_results(&result)?,
    }

    Ok(())
}

fn drive_progress(receiver: EventReceiver, progress: Option<ProgressBar>, verbose: bool) {
    let Some(pb) = progress else {
        // Keep the channel drained
        for _ in receiver.iter() {}
        return;
    };

    for event in receiver.iter() {
        match event {
            Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                pb.set_message(format!("{}", phase));
            }
            Event::Fingerprint(FingerprintEvent::Started { total_files }) => {
                pb.set_length(total_files as u64);
                pb.set_position(0);
            }
            Event::Fingerprint(FingerprintEvent::Progress(p)) => {
                pb.set_position(p.completed as u64);
                if verbose {
                    pb.set_message(format!(
                        "{} (cache: {})",
                        p.current_path.file_name().unwrap_or_default().to_string_lossy(),
                        p.cache_hits
                    ));
                }
            }
            Event::Relocate(RelocateEvent::Junked { from, .. }) => {
                pb.println(format!(
                    "  {} {} is too small",
                    style("junk").yellow(),
                    from.display()
                ));
            }
            Event::Relocate(RelocateEvent::Moved { from, to }) if verbose => {
                pb.println(format!(
                    "  {} {} -> {}",
                    style("move").cyan(),
                    from.display(),
                    to.display()
                ));
            }
            Event::Relocate(RelocateEvent::Collision { requested, actual }) if verbose => {
                pb.println(format!(
                    "  {} {} exists, using {}",
                    style("rename").dim(),
                    requested.display(),
                    actual.display()
                ));
            }
            Event::Relocate(RelocateEvent::Error { path, message }) => {
                pb.println(format!("  {} {}: {}", style("failed").red(), path.display(), message));
            }
            Event::Pipeline(PipelineEvent::Completed { .. })
            | Event::Pipeline(PipelineEvent::Error { .. }) => {
                pb.finish_and_clear();
            }
            _ => {}
        }
    }
}

fn print_pretty_results(term: &Term, result: &PipelineResult, mode: DetectionMode, verbose: bool) {
    term.write_line("").ok();
    term.write_line(&format!("{} Cleanup complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} files scanned in {:.1}s",
        style(result.total_files).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} duplicate groups found by {}",
        style(result.groups.len()).cyan(),
        mode
    ))
    .ok();

    term.write_line(&format!(
        "  {} files moved or renamed",
        style(result.relocations.len()).cyan()
    ))
    .ok();

    if !result.junked.is_empty() {
        term.write_line(&format!(
            "  {} too-small images moved to {}",
            style(result.junked.len()).yellow(),
            JUNK_FOLDER
        ))
        .ok();
    }

    if result.cache_hits > 0 {
        term.write_line(&format!("  {} cache hits", style(result.cache_hits).dim()))
            .ok();
    }

    if !result.errors.is_empty() {
        term.write_line(&format!(
            "  {} files could not be processed",
            style(result.errors.len()).red()
        ))
        .ok();
        if verbose {
            for error in &result.errors {
                term.write_line(&format!("    {}", style(error).dim())).ok();
            }
        }
    }

    term.write_line("").ok();

    if result.groups.is_empty() {
        term.write_line(&format!("  {}", style("No duplicates found").green()))
            .ok();
    } else {
        let moved: HashMap<&Path, &Path> = result
            .relocations
            .iter()
            .map(|r| (r.from.as_path(), r.to.as_path()))
            .collect();

        term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for (i, group) in result.groups.iter().enumerate() {
            term.write_line(&format!(
                "  {} ({} files)",
                style(format!("Group {}:", i + 1)).bold(),
                group.len()
            ))
            .ok();

            for (idx, record) in group.members().iter().enumerate() {
                let marker = if idx == 0 {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };

                let line = match moved.get(record.path.as_path()) {
                    Some(to) => format!(
                        "    {} {} {} {}",
                        marker,
                        record.path.display(),
                        style("->").dim(),
                        to.display()
                    ),
                    None => format!("    {} {}", marker, record.path.display()),
                };
                term.write_line(&line).ok();
            }

            term.write_line("").ok();
        }
    }

    // Footer
    term.write_line(&format!(
        "{}",
        style(format!(
            "No files were deleted. Suspected duplicates are renamed in place or kept under {}.",
            DUPES_FOLDER
        ))
        .dim()
    ))
    .ok();
}

fn print_json_results(result: &PipelineResult) -> Result<()> {
    let output = serde_json::to_string_pretty(result)
        .map_err(|e| CleanupError::Config(format!("could not encode results: {}", e)))?;
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["photo-cleanup"]);

        assert_eq!(cli.folder, PathBuf::from("."));
        assert_eq!(cli.min_width, 1200);
        assert_eq!(cli.min_height, 675);
        assert_eq!(cli.threshold, 8);
        assert_eq!(cli.mode(), DetectionMode::Image);
        assert_eq!(cli.relocation(), RelocationMode::RenameInPlace);
    }

    #[test]
    fn short_h_is_min_height() {
        let cli = Cli::parse_from(["photo-cleanup", "-h", "1080", "-w", "1920", "photos"]);

        assert_eq!(cli.min_height, 1080);
        assert_eq!(cli.min_width, 1920);
        assert_eq!(cli.folder, PathBuf::from("photos"));
    }

    #[test]
    fn filename_beats_checksum() {
        let cli = Cli::parse_from(["photo-cleanup", "-c", "-n", "-i"]);
        assert_eq!(cli.mode(), DetectionMode::Filename);

        let cli = Cli::parse_from(["photo-cleanup", "--crc-match"]);
        assert_eq!(cli.mode(), DetectionMode::Checksum);
    }

    #[test]
    fn threshold_range() {
        let cli = Cli::parse_from(["photo-cleanup", "-t", "65"]);
        assert_eq!(cli.threshold, 65);

        assert!(Cli::try_parse_from(["photo-cleanup", "-t", "66"]).is_err());
    }

    #[test]
    fn image_content_flag_is_accepted() {
        let cli = Cli::parse_from(["photo-cleanup", "-i"]);

        assert!(cli.image_content);
        assert_eq!(cli.mode(), DetectionMode::Image);
    }

    #[test]
    fn quarantine_flag() {
        let cli = Cli::parse_from(["photo-cleanup", "-d", "-r", "-s"]);

        assert_eq!(cli.relocation(), RelocationMode::Quarantine);
        assert!(cli.recursive);
        assert!(cli.remove_small);
    }
}
