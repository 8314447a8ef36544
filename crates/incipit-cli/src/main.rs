use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use incipit_core::wml::{locate, NoteTable};
use incipit_core::{
    ConversionReport, ConversionSettings, EmphasisStyle, IncipitConverter, ReferenceStatus,
    WmlDocument,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("INCIPIT_GIT_HASH"), ")");

#[derive(Parser)]
#[command(name = "incipit")]
#[command(about = "Replace endnote citations with incipits and page references", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by `convert` and `preview`.
#[derive(Args)]
struct ExtractArgs {
    /// Words per incipit (2-7)
    #[arg(short = 'n', long)]
    words: Option<usize>,

    /// Emphasis of the incipit text: bold, italic or preserve
    #[arg(short, long)]
    style: Option<EmphasisStyle>,

    /// JSON settings file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document and write the result
    Convert {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Use literal text instead of extracting incipits
        #[arg(long, requires = "text")]
        no_extract: bool,

        /// Literal incipit used with --no-extract
        #[arg(long)]
        text: Option<String>,

        /// Ask Word to refresh fields when the document is opened
        #[arg(long)]
        update_fields: bool,
    },
    /// Show the incipit each reference would receive
    Preview {
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,
    },
    /// Count references and notes
    Info {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            extract,
            no_extract,
            text,
            update_fields,
        } => {
            let mut settings = load_settings(&extract)?;
            if no_extract {
                settings = settings.with_auto_extract(false);
            }
            if let Some(text) = text {
                settings = settings.with_manual_default(text);
            }
            if update_fields {
                settings = settings.with_update_fields_on_open(true);
            }
            convert(&input, &output, &settings, extract.json)
        }
        Commands::Preview { input, extract } => {
            let settings = load_settings(&extract)?;
            preview(&input, &settings, extract.json)
        }
        Commands::Info { input } => info(&input),
    }
}

fn load_settings(args: &ExtractArgs) -> Result<ConversionSettings> {
    let mut settings = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse settings file {}", path.display()))?
        }
        None => ConversionSettings::default(),
    };
    if let Some(words) = args.words {
        settings = settings.with_word_count(words);
    }
    if let Some(style) = args.style {
        settings = settings.with_emphasis_style(style);
    }
    settings.validate()?;
    Ok(settings)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn convert(input: &Path, output: &Path, settings: &ConversionSettings, json: bool) -> Result<()> {
    let bytes = read_input(input)?;
    let result = IncipitConverter::convert(&bytes, settings)
        .with_context(|| format!("failed to convert {}", input.display()))?;

    print_report(&result.report, json)?;
    if !result.report.is_success() {
        if result.report.references_found == 0 {
            bail!("{} does not use endnotes", input.display());
        }
        bail!("none of the {} endnote references could be converted", result.report.references_found);
    }

    fs::write(output, &result.document)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(
        output = %output.display(),
        converted = result.report.converted,
        "wrote converted document"
    );
    Ok(())
}

fn preview(input: &Path, settings: &ConversionSettings, json: bool) -> Result<()> {
    let bytes = read_input(input)?;
    let report = IncipitConverter::preview(&bytes, settings)
        .with_context(|| format!("failed to read {}", input.display()))?;
    print_report(&report, json)
}

fn info(input: &Path) -> Result<()> {
    let bytes = read_input(input)?;
    let document = WmlDocument::from_bytes(&bytes)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let located = locate(document.body(), document.styles());
    let notes = NoteTable::build(document.notes());
    let dangling: Vec<&str> = located
        .references
        .iter()
        .map(|r| r.note_id.as_str())
        .filter(|id| !notes.contains(id))
        .collect();

    println!("Document: {}", input.display());
    println!("  Main part: {}", document.main_part());
    println!("  Endnotes part: {}", document.endnotes_part());
    println!("  References: {}", located.references.len());
    println!("  Note entries: {}", notes.len());
    if !dangling.is_empty() {
        println!("  Dangling: {}", dangling.join(", "));
    }
    Ok(())
}

fn print_report(report: &ConversionReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    for entry in &report.entries {
        let status = match entry.status {
            ReferenceStatus::Converted => "converted",
            ReferenceStatus::ConvertedShort => "converted (short)",
            ReferenceStatus::Dangling => "dangling",
            ReferenceStatus::Planned => "planned",
        };
        print!("#{:<3} note {:<4} {:<17}", entry.ordinal, entry.note_id, status);
        if let Some(incipit) = &entry.incipit {
            print!(" \"{}\"", incipit);
        }
        if let Some(classification) = entry.classification {
            print!(" [{}]", classification);
        }
        println!();
        if let Some(excerpt) = &entry.note_excerpt {
            println!("      {}", excerpt);
        }
    }
    for issue in &report.issues {
        println!("warning: {}", issue);
    }
    println!(
        "{} of {} references converted",
        report.converted, report.references_found
    );
    Ok(())
}
