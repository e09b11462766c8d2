//! Datakit CLI
//!
//! Command-line interface for:
//! - Fetching media metadata (IMDb/OMDb, Spotify, Wikipedia) into a data
//!   model record, optionally persisted as inspection files
//! - Inferring a data dictionary from a local JSON file (offline)
//! - Validating a processed object against a built-in declarative model
//! - Diffing two nested JSON objects by key

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use datakit_model::{compare_keys, DataModel};
use datakit_retrieve::{retrieve, MediaQuery, Source};

#[derive(Parser)]
#[command(name = "datakit")]
#[command(
    author,
    version,
    about = "Datakit: media metadata retrieval, schema inference, and validation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve metadata and build a data model record.
    Fetch {
        /// Metadata source: imdb, spotify, or wiki
        #[arg(short, long)]
        source: Source,

        /// Film title to look up
        #[arg(long, conflicts_with_all = ["album", "book"])]
        film: Option<String>,

        /// Album to look up: ARTIST TITLE
        #[arg(long, num_args = 2, value_names = ["ARTIST", "TITLE"])]
        album: Option<Vec<String>>,

        /// Book title to look up
        #[arg(long, conflicts_with = "album")]
        book: Option<String>,

        /// Output directory for saved files
        #[arg(long, default_value = "output")]
        out: PathBuf,

        /// Persist schema/json-schema/object/table files
        #[arg(long)]
        save: bool,

        /// Also print the retrieved object and flattened columns
        #[arg(short, long)]
        verbose: bool,
    },

    /// Infer a data dictionary from a local JSON file (offline).
    Schema {
        /// Input JSON file
        input: PathBuf,

        /// Write the JSON-Schema descriptor here instead of printing it
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Validate a processed JSON object against a built-in model.
    Validate {
        /// Model name (see `--model help` output on mismatch)
        #[arg(short, long)]
        model: String,

        /// Input JSON file
        input: PathBuf,
    },

    /// Report keys missing from a candidate object relative to a reference.
    Diff {
        /// Reference JSON file
        reference: PathBuf,

        /// Candidate JSON file
        candidate: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Fetch {
            source,
            film,
            album,
            book,
            out,
            save,
            verbose,
        } => cmd_fetch(source, film, album, book, &out, save, verbose),
        Commands::Schema { input, out } => cmd_schema(&input, out.as_deref()),
        Commands::Validate { model, input } => cmd_validate(&model, &input),
        Commands::Diff {
            reference,
            candidate,
        } => cmd_diff(&reference, &candidate),
    }
}

fn cmd_fetch(
    source: Source,
    film: Option<String>,
    album: Option<Vec<String>>,
    book: Option<String>,
    out: &std::path::Path,
    save: bool,
    verbose: bool,
) -> Result<()> {
    let query = build_query(film, album, book)?;

    println!("retrieving {} from {}", query, source);
    let obj = retrieve(source, &query)?;
    let record = DataModel::extract(obj)?;

    println!("{}", "type schema:".bold());
    println!("{}", serde_json::to_string_pretty(&record.schema)?);

    if verbose {
        println!("{}", "retrieved object:".bold());
        println!("{}", record.serialized);
        println!("{}", "flattened columns:".bold());
        for (column, value) in &record.normalized {
            println!("  {column} = {value}");
        }
    }

    if save {
        let paths = record.save(out, source.as_str(), query.kind(), query.title())?;
        for path in [&paths.schema, &paths.json_schema, &paths.obj, &paths.table] {
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn build_query(
    film: Option<String>,
    album: Option<Vec<String>>,
    book: Option<String>,
) -> Result<MediaQuery> {
    match (film, album, book) {
        (Some(title), None, None) => Ok(MediaQuery::Film { title }),
        (None, Some(parts), None) => {
            let mut parts = parts.into_iter();
            match (parts.next(), parts.next()) {
                (Some(artist), Some(title)) => Ok(MediaQuery::Album { artist, title }),
                _ => bail!("--album needs ARTIST and TITLE"),
            }
        }
        (None, None, Some(title)) => Ok(MediaQuery::Book { title }),
        _ => bail!("specify exactly one of --film, --album, --book"),
    }
}

fn cmd_schema(input: &std::path::Path, out: Option<&std::path::Path>) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let obj: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", input.display()))?;
    let record = DataModel::extract(obj)?;

    println!("{}", "type schema:".bold());
    println!("{}", serde_json::to_string_pretty(&record.schema)?);

    let descriptor = serde_json::to_string_pretty(&record.json_schema)?;
    match out {
        Some(path) => {
            fs::write(path, descriptor).with_context(|| format!("writing {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => {
            println!("{}", "json schema:".bold());
            println!("{descriptor}");
        }
    }
    Ok(())
}

fn cmd_validate(model_name: &str, input: &std::path::Path) -> Result<()> {
    let model = datakit_model::builtin(model_name).ok_or_else(|| {
        anyhow!(
            "unknown model `{}` (available: {})",
            model_name,
            datakit_model::builtin_names().join(", ")
        )
    })?;

    let text = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let obj: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", input.display()))?;

    match model.validate(&obj) {
        Ok(()) => {
            println!("{} {}", "valid:".green().bold(), model.name);
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {}", "invalid:".red().bold(), err);
            for violation in &err.violations {
                eprintln!("  {} {}", "-".red(), violation);
            }
            Err(err.into())
        }
    }
}

fn cmd_diff(reference: &std::path::Path, candidate: &std::path::Path) -> Result<()> {
    let load = |path: &std::path::Path| -> Result<serde_json::Value> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    };
    let reference_obj = load(reference)?;
    let candidate_obj = load(candidate)?;

    match compare_keys(&reference_obj, &candidate_obj) {
        None => {
            println!("{}", "no missing keys".green());
            Ok(())
        }
        Some(diff) => {
            println!("{}", serde_json::to_string_pretty(&diff.to_json())?);
            bail!("candidate is missing keys relative to the reference");
        }
    }
}
