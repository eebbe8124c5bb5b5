use clap::{Args, Parser, Subcommand};
use nu_plugin_segments::algo::taxonomy;
use nu_plugin_segments::ops::{self, Filter};
use serde_json::Value;
use std::io::{self, Read};

#[derive(Parser)]
#[command(
    name = "segments",
    version,
    about = "Pharmacy segment taxonomy, aggregation, and competitive positioning engine"
)]
struct Cli {
    /// Path to taxonomy JSON file. Defaults to $SEGMENTS_TAXONOMY, then
    /// $XDG_DATA_HOME/segments/taxonomy.json, then the embedded taxonomy
    #[arg(short, long, global = true)]
    taxonomy: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SegmentArgs {
    /// Taxonomy level: universe, category, family, range
    #[arg(short, long, default_value = "category")]
    level: String,
    /// Keep only products of this laboratory
    #[arg(long)]
    laboratory: Option<String>,
    /// Level of the segment to drill into (use with --within)
    #[arg(long, requires = "within")]
    within_level: Option<String>,
    /// Segment to drill into (use with --within-level)
    #[arg(long, requires = "within_level")]
    within: Option<String>,
    /// Enrich products first instead of using their taxonomy fields as-is
    #[arg(short, long)]
    enrich: bool,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

impl SegmentArgs {
    fn filter(&self) -> Filter {
        Filter {
            laboratory: self.laboratory.clone(),
            within_level: self.within_level.clone(),
            within: self.within.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in universe, category, family and range for JSON products on stdin
    Enrich {
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Group JSON products on stdin into a segment tree with statistics
    Aggregate(SegmentArgs),
    /// Sales and revenue per segment for JSON products on stdin
    Sales(SegmentArgs),
    /// Rank a laboratory against four competitors within a segment
    Positioning {
        /// Laboratory to position
        #[arg(long)]
        lab: String,
        /// Segment type: universe, category, family
        #[arg(short, long, default_value = "category")]
        segment_type: String,
        /// Segment name. If omitted, the lab's top segment is taken from products on stdin
        #[arg(long)]
        segment: Option<String>,
        /// Enrich stdin products before finding the top segment
        #[arg(short, long)]
        enrich: bool,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the embedded default taxonomy (a starting point for customization)
    Taxonomy,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let tables = ops::resolve_tables(cli.taxonomy.as_deref()).unwrap_or_else(|e| fail(&e));

    let result = match cli.command {
        Commands::Enrich { seed } => ops::op_enrich(&read_stdin_json(), &tables, seed),
        Commands::Aggregate(args) => ops::op_aggregate(
            &read_stdin_json(),
            &args.level,
            &args.filter(),
            args.enrich,
            &tables,
            args.seed,
        ),
        Commands::Sales(args) => ops::op_sales(
            &read_stdin_json(),
            &args.level,
            &args.filter(),
            args.enrich,
            &tables,
            args.seed,
        ),
        Commands::Positioning {
            lab,
            segment_type,
            segment,
            enrich,
            seed,
        } => match segment {
            Some(segment) => ops::op_positioning(&lab, &segment_type, &segment, &tables, seed),
            None => ops::op_position_top_segment(
                &read_stdin_json(),
                &lab,
                &segment_type,
                enrich,
                &tables,
                seed,
            ),
        },
        Commands::Taxonomy => serde_json::from_str(taxonomy::embedded_default_json())
            .map_err(|e| format!("embedded taxonomy is invalid: {e}")),
    };

    match result {
        Ok(output) => print_json(&output),
        Err(e) => fail(&e),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn read_stdin_json() -> Vec<Value> {
    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        fail(&format!("failed to read stdin: {e}"));
    }
    if buf.trim().is_empty() {
        return vec![];
    }
    let parsed: Value =
        serde_json::from_str(&buf).unwrap_or_else(|e| fail(&format!("invalid JSON on stdin: {e}")));
    match parsed {
        Value::Array(arr) => arr,
        Value::Null => vec![],
        single => vec![single],
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => fail(&format!("failed to write output: {e}")),
    }
}
