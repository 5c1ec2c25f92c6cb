//! tree2oam: Describe a columnar tree as an object-array mapping
//!
//! Reads a JSON tree description (branches, element types and counters) and
//! prints the OAM schema a materialization engine needs to rebuild entries.
//!
//! Usage:
//!   # Read from file, output to stdout
//!   tree2oam events.json
//!
//!   # Group `Jet_pt`, `Jet_eta`, ... into a `Jet` record
//!   tree2oam --group-underscore events.json
//!
//!   # Read from stdin, report skipped branches on stderr
//!   cat events.json | tree2oam --report --compact

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use oamtree::{tree2oam_with_report, GroupingPolicy, NamingPolicy, OamConfig, TreeDescription};
use std::fs::File;
use std::io::{stdin, BufReader, Read};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tree2oam")]
#[command(about = "Convert a columnar tree description into an OAM schema", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Group `prefix_suffix` fields into `prefix` records
    #[arg(long)]
    group_underscore: bool,

    /// Smallest group collapsed into a record (default: 1)
    #[arg(long, requires = "group_underscore")]
    min_group_size: Option<usize>,

    /// Use full branch names instead of their last dotted segment
    #[arg(long)]
    raw_names: bool,

    /// Keep every counted field as its own list
    #[arg(long)]
    no_merge: bool,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,

    /// Print skipped branches to stderr
    #[arg(long)]
    report: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = OamConfig {
        naming: if args.raw_names {
            NamingPolicy::RawName
        } else {
            NamingPolicy::LastSegment
        },
        grouping: if args.group_underscore {
            GroupingPolicy::Underscore
        } else {
            GroupingPolicy::Identity
        },
        min_group_size: args.min_group_size.unwrap_or(1),
        array_of_structs: !args.no_merge,
    };

    let mut reader: Box<dyn Read> = if let Some(file_path) = &args.input {
        Box::new(BufReader::new(
            File::open(file_path).context(format!("Failed to open file: {}", file_path))?,
        ))
    } else {
        Box::new(BufReader::new(stdin()))
    };

    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .context("Failed to read tree description")?;

    let description = TreeDescription::from_json_slice(&mut content)?;
    info!(
        tree = %description.root.name,
        counters = description.counters.len(),
        "loaded tree description"
    );

    let (oam, report) = tree2oam_with_report(&description.root, &description.counter_map(), &config);

    if args.report {
        eprintln!("Skipped {} branch(es)", report.skipped());
        for name in &report.unnamed {
            eprintln!("  no field name: {}", name);
        }
        for name in &report.unsupported {
            eprintln!("  unsupported type: {}", name);
        }
    }

    let output = if args.compact {
        serde_json::to_string(&oam)?
    } else {
        serde_json::to_string_pretty(&oam)?
    };

    println!("{}", output);

    Ok(())
}
