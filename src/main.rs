use clap::{Parser, ValueEnum};
use fitch_parsimony::alphabet::Alphabet;
use fitch_parsimony::io::{parse_newick, read_newick_file, write_results_file, OutputFormat};
use fitch_parsimony::parsimony::small_parsimony_batch;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Label the internal nodes of Newick trees with most-parsimonious ancestral
/// sequences (Fitch) and report each tree's parsimony cost.
#[derive(Parser, Debug)]
#[command(name = "fitch-parsimony", version, about = "Fitch small parsimony for Newick trees")]
struct Args {
    /// Path to a Newick file (one `;`-terminated tree per record, `.gz` allowed)
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Number of symbols per sequence; inferred from the first leaf when omitted
    #[arg(short = 'L', long = "label-length")]
    label_length: Option<usize>,

    /// The four alphabet symbols in code order
    #[arg(long = "alphabet", default_value_t = Alphabet::dna())]
    alphabet: Alphabet,

    /// Output path for the labeled trees (`.gz` compresses, `-` is stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output layout: xml | tsv
    #[arg(long = "format", value_enum, default_value_t = FormatArg::Xml)]
    format: FormatArg,

    /// Log filter, e.g. `info` or `fitch_parsimony=debug`
    #[arg(long = "log", default_value = "info")]
    log: String,

    /// Quiet mode: only warnings and errors are logged
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatArg { Xml, Tsv }

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xml => OutputFormat::Xml,
            FormatArg::Tsv => OutputFormat::Tsv,
        }
    }
}

fn main() {
    let args = Args::parse();
    install_tracing(if args.quiet { "warn" } else { args.log.as_str() });

    let t0 = Instant::now();
    let records = match read_newick_file(&args.input) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to read {:?}: {e}", args.input);
            std::process::exit(2);
        }
    };
    if records.is_empty() {
        error!("No trees parsed from {:?}.", args.input);
        std::process::exit(2);
    }
    info!("Read {} trees in {:.3}s", records.len(), t0.elapsed().as_secs_f64());

    let base_name = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tree");

    let mut failed = 0usize;
    let mut names = Vec::with_capacity(records.len());
    let mut trees = Vec::with_capacity(records.len());
    for (idx, newick) in records.iter().enumerate() {
        let name = format!("{base_name}_tree{idx}");
        match parse_newick(newick, &args.alphabet, args.label_length) {
            Ok(tree) => {
                names.push(name);
                trees.push(tree);
            }
            Err(e) => {
                warn!("Skipping {name}: {e}");
                failed += 1;
            }
        }
    }

    let t1 = Instant::now();
    let results = small_parsimony_batch(trees, &args.alphabet);
    info!("Labeled {} trees in {:.3}s", results.len(), t1.elapsed().as_secs_f64());

    // the summary would interleave with tree output sent to stdout
    let print_summary = args.output.as_deref().is_none_or(|o| o.as_os_str() != "-");
    let mut labeled = Vec::with_capacity(results.len());
    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(r) => {
                if print_summary {
                    println!("{name}\t{}\t{}", r.total_cost, r.root_record().label);
                }
                labeled.push((name, r));
            }
            Err(e) => {
                error!("Failed to label {name}: {e}");
                failed += 1;
            }
        }
    }

    if let Some(output) = &args.output {
        let t2 = Instant::now();
        if let Err(e) = write_results_file(output, &labeled, args.format.into()) {
            error!("Failed to write output {:?}: {e}", output);
            std::process::exit(4);
        }
        info!("Writing to {:?} {:.3}s", output, t2.elapsed().as_secs_f64());
    }

    if failed > 0 {
        error!("{failed} of {} trees failed", records.len());
        std::process::exit(3);
    }
}

fn install_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}
