//! Rowmill CLI - run the batch stages over delimited files.
//!
//! Each subcommand is one stage: it reads one or more inputs (literal paths
//! or glob patterns), writes a single output, and prints the run summary.
//! Exit codes: 0 on success, 2 on usage errors (via clap), 1 on job failure.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rowmill::jobs::duplicates::{
    REPLICA_LABEL, count_replicas, flag_duplicates, remove_duplicates,
};
use rowmill::jobs::features::{TransformSpec, audit_empty, convert_units};
use rowmill::jobs::regression::fit_rows;
use rowmill::{Comparison, HeaderMode, JobConfig, io};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rowmill")]
#[command(about = "Batch deduplication and cleanup jobs for delimited tabular data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flag duplicate groups: emit key<TAB>count for groups at/over the threshold
    FlagDuplicates {
        /// Input files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Key field indices (comma separated); empty = whole row
        #[arg(long, value_delimiter = ',')]
        key_fields: Vec<usize>,

        /// Occurrence threshold
        #[arg(long, default_value_t = 2)]
        threshold: u64,

        /// Treat the first row as a header and keep it out of every group
        #[arg(long)]
        skip_header: bool,

        /// Abort on the first malformed record
        #[arg(long)]
        fail_fast: bool,
    },

    /// Sum the flagged groups into one replica total
    CountReplicas {
        /// Flagged key<TAB>count file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Keep only rows whose key occurs exactly once
    RemoveDuplicates {
        /// Input files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Key field indices (comma separated); empty = whole row
        #[arg(long, value_delimiter = ',')]
        key_fields: Vec<usize>,

        /// Treat the first row as a header and re-emit it unchanged
        #[arg(long)]
        skip_header: bool,

        /// Abort on the first malformed record
        #[arg(long)]
        fail_fast: bool,
    },

    /// Convert the housing dataset's units (sqft to m2, lac-rupees to GBP)
    ConvertUnits {
        /// Input files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Inputs have no header row to relabel
        #[arg(long)]
        no_header: bool,

        /// Abort on the first non-numeric cell
        #[arg(long)]
        fail_fast: bool,
    },

    /// Report the position of every empty cell as line<TAB>column
    AuditEmpty {
        /// Input files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Fit ordinary least squares over numeric rows (last column is the target)
    Fit {
        /// Input files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Inputs have no header row
        #[arg(long)]
        no_header: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        eprintln!("rowmill: {err:#}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::FlagDuplicates {
            inputs,
            output,
            key_fields,
            threshold,
            skip_header,
            fail_fast,
        } => {
            let rows = load_rows(&inputs)?;
            let cfg = JobConfig {
                key_fields,
                threshold,
                comparison: Comparison::AtLeast,
                header_mode: header_mode(skip_header),
                fail_fast,
                ..JobConfig::default()
            };
            let flags = flag_duplicates(rows, &cfg)?;
            io::csv::write_keyed_counts(&output, &flags.groups)?;
            flags.summary.print();
        }
        Commands::CountReplicas { input, output } => {
            let flagged = io::csv::read_keyed_counts(&input)?;
            let counted = count_replicas(&flagged)?;
            write_text(&output, format!("{REPLICA_LABEL}\t{}\n", counted.replicas))?;
            counted.summary.print();
        }
        Commands::RemoveDuplicates {
            inputs,
            output,
            key_fields,
            skip_header,
            fail_fast,
        } => {
            let rows = load_rows(&inputs)?;
            let cfg = JobConfig {
                key_fields,
                header_mode: header_mode(skip_header),
                fail_fast,
                ..JobConfig::default()
            };
            let deduped = remove_duplicates(rows, &cfg)?;
            io::csv::write_rows(&output, &deduped.rows)?;
            deduped.summary.print();
        }
        Commands::ConvertUnits {
            inputs,
            output,
            no_header,
            fail_fast,
        } => {
            let rows = load_rows(&inputs)?;
            let mut spec = TransformSpec::house_prices();
            if no_header {
                spec.header_mode = HeaderMode::Passthrough;
            }
            spec.fail_fast = fail_fast;
            let transformed = convert_units(rows, &spec)?;
            io::csv::write_rows(&output, &transformed.rows)?;
            transformed.summary.print();
        }
        Commands::AuditEmpty { inputs, output } => {
            let rows = load_rows(&inputs)?;
            let cells = audit_empty(&rows);
            let mut text = String::new();
            for cell in &cells {
                writeln!(text, "{}\t{}", cell.line, cell.column)?;
            }
            write_text(&output, text)?;
            println!("{} empty cells across {} rows", cells.len(), rows.len());
        }
        Commands::Fit {
            inputs,
            output,
            no_header,
        } => {
            let rows = load_rows(&inputs)?;
            let report = fit_rows(&rows, !no_header)?;
            let coefficients = report
                .coefficients
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let text = format!(
                "coefficients\t{coefficients}\nr_squared\t{}\nadj_r_squared\t{}\nobservations\t{}\n",
                report.r_squared, report.adj_r_squared, report.observations
            );
            write_text(&output, text)?;
            println!("fit over {} observations: R2 = {}", report.observations, report.r_squared);
        }
    }
    Ok(())
}

fn load_rows(inputs: &[String]) -> Result<Vec<rowmill::Record>> {
    let paths = io::glob::resolve_inputs(inputs)?;
    io::csv::read_rows_many(&paths)
}

fn header_mode(skip_header: bool) -> HeaderMode {
    if skip_header {
        HeaderMode::Skip
    } else {
        HeaderMode::Passthrough
    }
}

fn write_text(path: &Path, text: String) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("write {}", path.display()))
}
