use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use corrframe_registry::{FieldClass, FieldCode};
use corrframe_selection::{FieldSelection, FieldSource, LoadPlan};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const DEFAULT_SELECTION: &str = "./fields.yaml";

#[derive(Parser)]
#[command(name = "corrframe", about = "Inspect registration field codes and field selections")]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every field code.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one field by code, key or canonical name.
    Show {
        #[arg(allow_negative_numbers = true)]
        field: FieldCode,
        #[arg(long)]
        json: bool,
    },
    /// Validate a field selection and print its frame plan.
    Plan {
        /// Defaults to $CORRFRAME_SELECTION, then ./fields.yaml.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct FieldRow {
    code: u8,
    key: &'static str,
    name: Option<&'static str>,
    class: FieldClass,
    distance: bool,
}

impl From<FieldCode> for FieldRow {
    fn from(field: FieldCode) -> Self {
        Self {
            code: field.code(),
            key: field.key(),
            name: field.name().as_str(),
            class: field.class(),
            distance: field.is_distance_field(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::List { json } => {
            let rows = field_rows();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:>4}  {:<20} {:<22} {}", "code", "key", "name", "class");
                for row in &rows {
                    print_row(row);
                }
            }
        }
        Command::Show { field, json } => {
            let row = FieldRow::from(field);
            if json {
                println!("{}", serde_json::to_string_pretty(&row)?);
            } else {
                print_row(&row);
            }
        }
        Command::Plan { config, json } => {
            let path = selection_path(config);
            let selection = FieldSelection::from_path(&path)
                .with_context(|| format!("invalid field selection {}", path.display()))?;
            let plan = selection.plan()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
        }
    }

    Ok(())
}

fn field_rows() -> Vec<FieldRow> {
    FieldCode::ALL.into_iter().map(FieldRow::from).collect()
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn selection_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("CORRFRAME_SELECTION").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SELECTION))
}

fn print_row(row: &FieldRow) {
    println!(
        "{:>4}  {:<20} {:<22} {}",
        row.code,
        row.key,
        row.name.unwrap_or("-"),
        row.class.as_str()
    );
}

fn print_plan(plan: &LoadPlan) {
    println!("{:>5}  {:<20} {:<22} {:>8} {:>8}", "frame", "field", "source", "weight", "averages");
    for entry in plan.iter() {
        let source = match entry.source {
            FieldSource::LoadByName(name) => name,
            FieldSource::Computed => "(computed)",
        };
        println!(
            "{:>5}  {:<20} {:<22} {:>8.3} {:>8}",
            entry.frame,
            entry.field.key(),
            source,
            entry.weight,
            entry.averages
        );
    }
    tracing::debug!(
        frames = plan.len(),
        distance_frames = plan.distance_frames().count(),
        "plan printed"
    );
}
