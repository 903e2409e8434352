//! Roster CLI
//!
//! Command-line tool for checking unit CSV exports against the current unit
//! data and regenerating unit data files.

use clap::{Parser, Subcommand};
use roster_core::{
    create_history_entry, emit_category, emit_faction, load_current_units, run_sync,
    scan_directory, select_faction, CanonicalUnit, CsvPipeline, Differ, FactionTable,
    HistoryFile, RuleMatching, SyncEntry, SyncManifest, UnitType, ValidationReport, Vocabulary,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Army-list unit data reconciliation", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV export and print the normalized units
    Parse {
        /// Path to CSV export
        #[arg(short, long)]
        csv: PathBuf,

        /// Vocabulary file (JSON)
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Print units as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a CSV export against the current unit data
    Check {
        /// Path to CSV export
        #[arg(short, long)]
        csv: PathBuf,

        /// Current unit data (JSON array or generated .ts file)
        #[arg(long)]
        current: PathBuf,

        /// Only check this faction
        #[arg(short, long)]
        faction: Option<String>,

        /// Vocabulary file (JSON)
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Keyword / special-rule matching (loose, exact or off)
        #[arg(long, default_value = "loose")]
        rules: RuleMatching,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Append a summary of this run to a history file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Fail on duplicate unit ids
        #[arg(long)]
        strict_ids: bool,
    },

    /// Generate unit data files for one faction
    Emit {
        /// Path to CSV export
        #[arg(short, long)]
        csv: PathBuf,

        /// Faction name or id
        #[arg(short, long)]
        faction: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Only generate this category (troop, character, high-command, companion)
        #[arg(long)]
        category: Option<UnitType>,

        /// Vocabulary file (JSON)
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },

    /// Scan directories for CSV exports
    Scan {
        /// Root directories to scan
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,

        /// Vocabulary file (JSON)
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },

    /// Check and regenerate every faction listed in a manifest
    Sync {
        /// Path to manifest file (JSON)
        #[arg(short, long)]
        manifest: PathBuf,
    },

    /// Write the built-in vocabulary as an editable template
    InitVocabulary {
        /// Output path for the vocabulary file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write an example sync manifest
    InitManifest {
        /// Output path for the manifest file
        #[arg(short, long)]
        output: PathBuf,

        /// Output directory for generated files
        #[arg(long)]
        output_dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> roster_core::Result<()> {
    match command {
        Commands::Parse { csv, vocabulary, json } => cmd_parse(&csv, vocabulary.as_deref(), json),
        Commands::Check {
            csv,
            current,
            faction,
            vocabulary,
            rules,
            format,
            history,
            strict_ids,
        } => cmd_check(CheckArgs {
            csv: &csv,
            current: &current,
            faction: faction.as_deref(),
            vocabulary: vocabulary.as_deref(),
            rules,
            format: &format,
            history: history.as_deref(),
            strict_ids,
        }),
        Commands::Emit {
            csv,
            faction,
            output,
            category,
            vocabulary,
        } => cmd_emit(&csv, &faction, &output, category, vocabulary.as_deref()),
        Commands::Scan { root, vocabulary } => cmd_scan(&root, vocabulary.as_deref()),
        Commands::Sync { manifest } => cmd_sync(&manifest),
        Commands::InitVocabulary { output } => cmd_init_vocabulary(&output),
        Commands::InitManifest { output, output_dir } => cmd_init_manifest(&output, &output_dir),
    }
}

fn cmd_parse(csv: &Path, vocabulary: Option<&Path>, json: bool) -> roster_core::Result<()> {
    let vocabulary = Vocabulary::load_or_default(vocabulary)?;
    let units = CsvPipeline::new(&vocabulary).parse_file(csv)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&units)?);
        return Ok(());
    }

    println!("File: {}", csv.display());
    println!("Units: {}", units.len());
    println!();

    println!("id\tname\tfaction\ttype\tpoints\tavail\tcommand");
    println!("{}", "-".repeat(84));
    for unit in &units {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            unit.id,
            unit.name,
            unit.faction_id,
            unit.unit_type,
            unit.points_cost,
            unit.availability,
            unit.command.map(|c| c.to_string()).unwrap_or_default()
        );
    }

    Ok(())
}

struct CheckArgs<'a> {
    csv: &'a Path,
    current: &'a Path,
    faction: Option<&'a str>,
    vocabulary: Option<&'a Path>,
    rules: RuleMatching,
    format: &'a str,
    history: Option<&'a Path>,
    strict_ids: bool,
}

fn cmd_check(args: CheckArgs<'_>) -> roster_core::Result<()> {
    let vocabulary = Vocabulary::load_or_default(args.vocabulary)?;
    let factions = FactionTable::from_vocabulary(&vocabulary);

    let mut csv_units = CsvPipeline::new(&vocabulary)
        .strict_ids(args.strict_ids)
        .parse_file(args.csv)?;
    let mut current_units = load_current_units(args.current)?;

    let faction = args.faction.map(|f| factions.canonicalize(f));
    if let Some(faction) = &faction {
        csv_units = select_faction(&csv_units, faction);
        current_units.retain(|u| in_faction(u, faction, &factions));
    }

    let report = Differ::new(&vocabulary)
        .rule_matching(args.rules)
        .diff(&csv_units, &current_units);

    match args.format.to_lowercase().as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => print_report(&report),
        other => {
            eprintln!("Unknown format: {}. Supported formats: text, json", other);
            std::process::exit(1);
        }
    }

    if let Some(path) = args.history {
        let mut history = HistoryFile::load(path)?;
        history.add_entry(create_history_entry(
            faction.unwrap_or_else(|| "*".to_string()),
            args.csv,
            &report,
        ));
        history.save(path)?;
    }

    Ok(())
}

fn cmd_emit(
    csv: &Path,
    faction: &str,
    output: &Path,
    category: Option<UnitType>,
    vocabulary: Option<&Path>,
) -> roster_core::Result<()> {
    let vocabulary = Vocabulary::load_or_default(vocabulary)?;
    let faction = FactionTable::from_vocabulary(&vocabulary).canonicalize(faction);

    let units = CsvPipeline::new(&vocabulary).parse_file(csv)?;
    let units = select_faction(&units, &faction);
    if units.is_empty() {
        warn!(faction = %faction, "no units found for faction");
    }

    fs::create_dir_all(output)?;

    let files: Vec<(String, String)> = match category {
        Some(category) => vec![(
            roster_core::emitter::file_name(&faction, category),
            emit_category(&units, &faction, category)?,
        )],
        None => emit_faction(&units, &faction)?
            .into_iter()
            .map(|f| (f.file_name, f.content))
            .collect(),
    };

    for (file_name, content) in &files {
        let path = output.join(file_name);
        fs::write(&path, content)?;
        println!("  - {}", path.display());
    }
    println!("Wrote {} file(s) for faction '{}'", files.len(), faction);

    Ok(())
}

fn cmd_scan(roots: &[PathBuf], vocabulary: Option<&Path>) -> roster_core::Result<()> {
    let vocabulary = Vocabulary::load_or_default(vocabulary)?;
    let result = scan_directory(roots, &FactionTable::from_vocabulary(&vocabulary))?;

    println!("Scanned {} root(s):", result.roots.len());
    for root in &result.roots {
        println!("  {}", root.display());
    }
    println!();
    println!(
        "Found {} CSV export(s) for {} faction(s)",
        result.total_files(),
        result.factions().len()
    );

    for faction in result.factions() {
        println!();
        println!("{}", faction);
        for source in result.find_faction(faction) {
            println!("  {}", source.path.display());
        }
    }

    Ok(())
}

fn cmd_sync(manifest_path: &Path) -> roster_core::Result<()> {
    let manifest = SyncManifest::load(manifest_path)?;

    println!("Running sync with {} entries", manifest.entries.len());
    println!("Output: {}", manifest.output_dir.display());
    println!();

    let result = run_sync(&manifest)?;

    for outcome in &result.outcomes {
        print!(
            "{}: {} units, {} files",
            outcome.faction,
            outcome.unit_count,
            outcome.files_written.len()
        );
        match &outcome.report {
            Some(report) => {
                let counts = report.counts();
                println!(
                    ", {} missing, {} extra, {} mismatched",
                    counts.missing_in_current, counts.extra_in_current, counts.field_mismatches
                );
            }
            None => println!(", not checked"),
        }
    }

    println!();
    println!("Sync complete:");
    println!("  {} total files written", result.files_written());

    if !result.errors.is_empty() {
        println!("\nErrors ({}):", result.errors.len());
        for (path, err) in &result.errors {
            println!("  {}: {}", path.display(), err);
        }
    }

    Ok(())
}

fn cmd_init_vocabulary(output: &Path) -> roster_core::Result<()> {
    Vocabulary::default().save(output)?;
    println!("Created vocabulary file: {}", output.display());
    println!();
    println!("Edit the file to adjust characteristics and aliases, then pass it with:");
    println!("  roster check --vocabulary {} ...", output.display());

    Ok(())
}

fn cmd_init_manifest(output: &Path, output_dir: &Path) -> roster_core::Result<()> {
    let mut manifest = SyncManifest::new(output_dir);
    manifest.entries.push(SyncEntry {
        csv: PathBuf::from("exports/units.csv"),
        current: Some(PathBuf::from("data/units.json")),
        faction: "Scions of Taldabaoth".to_string(),
    });

    manifest.save(output)?;
    println!("Created manifest file: {}", output.display());
    println!();
    println!("Edit the file to configure your sync, then run:");
    println!("  roster sync --manifest {}", output.display());

    Ok(())
}

fn in_faction(unit: &CanonicalUnit, faction: &str, factions: &FactionTable) -> bool {
    unit.faction_labels().any(|f| factions.canonicalize(f) == faction)
}

fn print_report(report: &ValidationReport) {
    let counts = report.counts();

    println!("Missing in current ({}):", counts.missing_in_current);
    for unit in &report.missing_in_current {
        println!("  + {} [{}] ({})", unit.name, unit.id, unit.faction_id);
    }

    println!("\nExtra in current ({}):", counts.extra_in_current);
    for unit in &report.extra_in_current {
        println!("  - {} [{}] ({})", unit.name, unit.id, unit.primary_faction());
    }

    println!("\nField mismatches ({}):", counts.field_mismatches);
    for m in &report.field_mismatches {
        println!("  {}: {} csv={} current={}", m.unit_name, m.field, m.csv_value, m.current_value);
    }

    if !report.rule_drift.is_empty() {
        println!("\nRule drift, advisory ({}):", counts.rule_drift);
        for d in &report.rule_drift {
            println!(
                "  {} {}: csv only [{}], current only [{}]",
                d.unit_name,
                d.field.as_str(),
                d.only_in_csv.join(", "),
                d.only_in_current.join(", ")
            );
        }
    }

    if !report.duplicate_ids.is_empty() {
        println!("\nDuplicate ids in CSV: {}", report.duplicate_ids.join(", "));
    }

    println!();
    if report.is_clean() {
        println!("No drift found.");
    } else {
        println!(
            "Drift found: {} missing, {} extra, {} mismatched",
            counts.missing_in_current, counts.extra_in_current, counts.field_mismatches
        );
    }
}
