use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use semicsr::{
    block_multiply_parallel, diamond_closure, diamond_closure_concurrent, dimacs, multiply,
    multiply_concurrent, snapshot, Arithmetic, BlockConfig, CsrMatrix, PoolConfig, Semiring,
    Tropical,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "semicsr bench - time sequential against concurrent sparse operations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Worker threads (defaults to SEMICSR_WORKERS or the CPU count)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(clap::Args)]
struct Input {
    /// DIMACS `.gr` file; a random matrix is generated when absent
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Side of the generated matrix
    #[arg(long, default_value_t = 256)]
    size: usize,

    /// Probability that a generated entry is stored
    #[arg(long, default_value_t = 0.02)]
    density: f64,

    /// Seed for the generated matrix
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Save the input as a snapshot
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Ring {
    Arithmetic,
    Tropical,
}

#[derive(Subcommand)]
enum Commands {
    /// Square the input matrix
    Multiply {
        #[command(flatten)]
        input: Input,

        /// Semiring used for the product
        #[arg(long, value_enum, default_value_t = Ring::Arithmetic)]
        ring: Ring,

        /// Also time the block-recursive product
        #[arg(long)]
        block: bool,
    },
    /// All-pairs shortest paths by diamond closure
    Closure {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Serialize)]
struct Report {
    operation: &'static str,
    semiring: &'static str,
    rows: usize,
    nnz: usize,
    workers: usize,
    sequential_ms: f64,
    concurrent_ms: f64,
    block_ms: Option<f64>,
    result_nnz: usize,
    matches: bool,
}

impl Report {
    fn print(&self, json: bool) -> Result<(), Box<dyn std::error::Error>> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        println!(
            "{} over {}: {}x{} with {} entries, {} workers",
            self.operation, self.semiring, self.rows, self.rows, self.nnz, self.workers
        );
        println!("  sequential: {:.2} ms", self.sequential_ms);
        println!("  concurrent: {:.2} ms", self.concurrent_ms);
        if let Some(block_ms) = self.block_ms {
            println!("  block:      {block_ms:.2} ms");
        }
        println!(
            "  result has {} entries, {}",
            self.result_nnz,
            if self.matches { "PASS" } else { "FAIL" }
        );
        Ok(())
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1e3
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let start = Instant::now();
    let value = f();
    (value, millis(start.elapsed()))
}

fn random_matrix<S: Semiring<Value = f64>>(input: &Input, zero_diagonal: bool) -> CsrMatrix<S> {
    let mut rng = StdRng::seed_from_u64(input.seed);
    let n = input.size;
    let mut triplets = Vec::new();

    for row in 0..n {
        for col in 0..n {
            if rng.gen_bool(input.density.clamp(0.0, 1.0)) {
                triplets.push((row, col, f64::from(rng.gen_range(1u32..100))));
            }
        }
        if zero_diagonal {
            triplets.push((row, row, 0.0));
        }
    }

    CsrMatrix::from_triplets(n, n, triplets)
}

fn load_input<S: Semiring<Value = f64>>(
    input: &Input,
    zero_diagonal: bool,
) -> Result<CsrMatrix<S>, Box<dyn std::error::Error>> {
    let matrix = match &input.dataset {
        Some(path) => {
            let graph = dimacs::parse::<f64, _>(std::io::BufReader::new(std::fs::File::open(path)?))?;
            let mut arcs = graph.arcs;
            if zero_diagonal {
                arcs.extend((0..graph.nodes).map(|i| (i, i, 0.0)));
            }
            CsrMatrix::from_triplets(graph.nodes, graph.nodes, arcs)
        }
        None => random_matrix(input, zero_diagonal),
    };

    if let Some(path) = &input.snapshot {
        snapshot::save(&matrix, path)?;
        log::info!("saved input snapshot to {}", path.display());
    }
    Ok(matrix)
}

fn run_multiply<S: Semiring<Value = f64>>(
    input: &Input,
    block: bool,
    config: &PoolConfig,
) -> Result<Report, Box<dyn std::error::Error>> {
    let m = load_input::<S>(input, false)?;

    let (sequential, sequential_ms) = timed(|| multiply(&m, &m));
    let (concurrent, concurrent_ms) = timed(|| multiply_concurrent(&m, &m, config));
    let concurrent = concurrent?;

    let mut matches = sequential == concurrent;
    let block_ms = if block {
        let padded = m.pad_to_power_of_two();
        let (product, ms) = timed(|| block_multiply_parallel(&padded, &padded, &BlockConfig::default()));
        // Generated weights are small integers, so regrouped sums stay exact
        matches &= product.restrict(m.nrows(), m.ncols()) == sequential;
        Some(ms)
    } else {
        None
    };

    Ok(Report {
        operation: "multiply",
        semiring: S::NAME,
        rows: m.nrows(),
        nnz: m.nnz(),
        workers: config.workers,
        sequential_ms,
        concurrent_ms,
        block_ms,
        result_nnz: sequential.nnz(),
        matches,
    })
}

fn run_closure(input: &Input, config: &PoolConfig) -> Result<Report, Box<dyn std::error::Error>> {
    let m = load_input::<Tropical<f64>>(input, true)?;

    let (sequential, sequential_ms) = timed(|| diamond_closure(&m));
    let (concurrent, concurrent_ms) = timed(|| diamond_closure_concurrent(&m, config));
    let concurrent = concurrent?;

    Ok(Report {
        operation: "closure",
        semiring: Tropical::<f64>::NAME,
        rows: m.nrows(),
        nnz: m.nnz(),
        workers: config.workers,
        sequential_ms,
        concurrent_ms,
        block_ms: None,
        result_nnz: sequential.nnz(),
        matches: sequential == concurrent,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = PoolConfig::from_env();
    if let Some(workers) = cli.workers {
        config = config.with_workers(workers);
    }

    let report = match &cli.command {
        Commands::Multiply { input, ring, block } => match ring {
            Ring::Arithmetic => run_multiply::<Arithmetic<f64>>(input, *block, &config)?,
            Ring::Tropical => run_multiply::<Tropical<f64>>(input, *block, &config)?,
        },
        Commands::Closure { input } => run_closure(input, &config)?,
    };

    report.print(cli.json)?;
    if !report.matches {
        std::process::exit(1);
    }
    Ok(())
}
