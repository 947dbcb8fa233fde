//! pdfredact CLI - PDF redaction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfredact::upload::{
    redacted_name, sanitize_file_name, Upload, UploadError, UploadPolicy,
    DEFAULT_MAX_UPLOAD_BYTES,
};
use pdfredact::{
    scan_with_options, RedactOptions, RedactionReport, RedactionStrategy, Redactor, RuleSet,
    StampConfig, DEFAULT_STAMP_TEXT,
};

#[derive(Parser)]
#[command(name = "pdfredact")]
#[command(version)]
#[command(about = "Redact personal information from PDF documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Redact one or more PDFs
    Redact {
        /// Input PDF files
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Output directory (next to each input if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Rule set JSON file (baseline rules if not specified)
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Redaction strategy
        #[arg(long, value_enum, default_value = "overlay")]
        strategy: Strategy,

        /// Mark height multiplier
        #[arg(long, value_name = "FACTOR", default_value_t = 1.2)]
        margin: f32,

        /// Stamp text drawn on every page
        #[arg(long, value_name = "TEXT", default_value = DEFAULT_STAMP_TEXT)]
        stamp: String,

        /// Reject inputs larger than this many bytes
        #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
        max_size: usize,

        /// Write a JSON report of every redaction to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Match pages on one thread
        #[arg(long)]
        sequential: bool,
    },

    /// List what would be redacted, without writing anything
    Scan {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Rule set JSON file (baseline rules if not specified)
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active rules in evaluation order
    Rules {
        /// Rule set JSON file (baseline rules if not specified)
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Opaque rectangles only; text stays extractable
    Overlay,
    /// Rectangles plus removal of the matched text
    Remove,
}

impl From<Strategy> for RedactionStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Overlay => RedactionStrategy::VisualOverlay,
            Strategy::Remove => RedactionStrategy::ContentRemoval,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Redact {
            files,
            output,
            rules,
            strategy,
            margin,
            stamp,
            max_size,
            report,
            sequential,
        }) => {
            let mut options = RedactOptions::new()
                .with_strategy(strategy.into())
                .with_margin_factor(margin);
            if sequential {
                options = options.sequential();
            }
            cmd_redact(
                &files,
                output.as_deref(),
                rules.as_deref(),
                StampConfig::new(stamp),
                options,
                max_size,
                report.as_deref(),
            )
        }
        Some(Commands::Scan { input, rules, json }) => cmd_scan(&input, rules.as_deref(), json),
        Some(Commands::Rules { rules }) => cmd_rules(rules.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: pdfredact redact <FILES>...".yellow());
            println!("       pdfredact --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_rules(path: Option<&Path>) -> Result<RuleSet, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(RuleSet::from_json(&json)?)
        }
        None => Ok(RuleSet::baseline()?),
    }
}

/// Read `path` unless its size on disk already exceeds `max_size`.
fn read_limited(path: &Path, max_size: usize) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let size = fs::metadata(path)?.len();
    if size > max_size as u64 {
        return Err(UploadError::TooLarge {
            size: usize::try_from(size).unwrap_or(usize::MAX),
            limit: max_size,
        }
        .into());
    }
    Ok(fs::read(path)?)
}

fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = redacted_name(&sanitize_file_name(&file_name));
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn cmd_redact(
    files: &[PathBuf],
    output: Option<&Path>,
    rules: Option<&Path>,
    stamp: StampConfig,
    options: RedactOptions,
    max_size: usize,
    report: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let redactor = Redactor::with_options(load_rules(rules)?, stamp, options)?;
    let policy = UploadPolicy::new().with_max_bytes(max_size);

    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut reports: Vec<(String, RedactionReport)> = Vec::with_capacity(files.len());
    for input in files {
        pb.set_message(input.display().to_string());

        let data = read_limited(input, max_size).map_err(|e| format!("{}: {}", input.display(), e))?;
        let file_name = input.to_string_lossy();
        policy
            .check(&Upload::pdf(&file_name, &data))
            .map_err(|e| format!("{}: {}", input.display(), e))?;

        let (bytes, file_report) = redactor
            .redact_with_report(&data)
            .map_err(|e| format!("{}: {}", input.display(), e))?;

        let path = output_path(input, output);
        fs::write(&path, &bytes)?;
        log::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
        reports.push((path.display().to_string(), file_report));
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!("\n{}", "Redacted files:".green().bold());
    for (i, (path, file_report)) in reports.iter().enumerate() {
        let branch = if i + 1 == reports.len() { "└─" } else { "├─" };
        println!(
            "  {} {} ({} pages, {} marks)",
            branch.dimmed(),
            path,
            file_report.page_count,
            file_report.marks.len()
        );
    }

    let strategy = redactor.options().render.strategy;
    if !strategy.removes_text() {
        println!("\n{} {}", "Note:".yellow().bold(), strategy.guarantee());
    }

    if let Some(path) = report {
        let entries: Vec<serde_json::Value> = reports
            .iter()
            .map(|(output, file_report)| {
                serde_json::json!({ "output": output, "report": file_report })
            })
            .collect();
        fs::write(path, serde_json::to_string_pretty(&entries)?)?;
        println!("{} {}", "Report saved to".green(), path.display());
    }

    Ok(())
}

fn cmd_scan(input: &Path, rules: Option<&Path>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rules = load_rules(rules)?;
    let data = fs::read(input)?;
    let report = scan_with_options(&data, &rules, &RedactOptions::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Scan Results".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), report.page_count);
    println!("{}: {}", "Runs scanned".bold(), report.runs_scanned);
    println!("{}: {}", "Matches".bold(), report.matches.len());

    if !report.matches.is_empty() {
        println!();
        for m in &report.matches {
            println!(
                "  {} p{} {} [{}] {:?}",
                "•".dimmed(),
                m.page,
                m.rule.cyan(),
                m.category,
                m.run.text
            );
        }
    }

    Ok(())
}

fn cmd_rules(rules: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let rules = load_rules(rules)?;

    println!("{}", "Active Rules".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (i, rule) in rules.iter().enumerate() {
        println!(
            "{:>3}. {} [{}]",
            i + 1,
            rule.name().bold(),
            rule.category()
        );
        println!("     {}", rule.pattern().dimmed());
    }
    if rules.is_empty() {
        println!("{}", "(no rules)".yellow());
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfredact".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF redaction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_next_to_input() {
        let path = output_path(Path::new("/data/visit summary.pdf"), None);
        assert_eq!(path, PathBuf::from("/data/redacted-visit_summary.pdf"));
    }

    #[test]
    fn test_output_path_in_directory() {
        let path = output_path(Path::new("in/a.pdf"), Some(Path::new("out")));
        assert_eq!(path, PathBuf::from("out/redacted-a.pdf"));
    }

    #[test]
    fn test_strategy_conversion() {
        assert_eq!(RedactionStrategy::from(Strategy::Remove), RedactionStrategy::ContentRemoval);
        assert_eq!(RedactionStrategy::from(Strategy::Overlay), RedactionStrategy::VisualOverlay);
    }

    #[test]
    fn test_read_limited_checks_size_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.pdf");
        fs::write(&path, vec![b'x'; 64]).unwrap();

        let err = read_limited(&path, 16).unwrap_err();
        assert!(err.to_string().contains("64"), "{}", err);
        assert_eq!(read_limited(&path, 64).unwrap().len(), 64);
    }

    #[test]
    fn test_load_rules_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"{"include_defaults": false, "literals": [{"name": "clinic", "category": "institution", "terms": ["Acme Clinic"]}]}"#).unwrap();
        let rules = load_rules(Some(&path)).unwrap();
        assert_eq!(rules.len(), 1);
        assert!(rules.get("clinic").is_some());
    }
}
