//! Benchmark driver for the multiplication kernels
//!
//! Generates (or loads) inputs, times every selected kernel and appends
//! the summaries to a CSV file.

use std::path::PathBuf;
use std::process::ExitCode;

use log::error;
use matbench::bench::memory::TrackingAllocator;
use matbench::bench::{benchmark, Algorithm, BenchResult, CsvReport};
use matbench::{
    load_csr, multiply_basic, multiply_cache_friendly, multiply_data_parallel, multiply_distributed,
    multiply_threaded, multiply_tiled, multiply_vectorized, BenchConfig, BenchMode, LocalExecutor,
    MatrixGenerator, Result,
};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("matbench {}", matbench::VERSION);
    println!("==============\n");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}\n", message);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(results) => {
            println!(
                "\nDone. {} result rows appended to {}",
                results.len(),
                config.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("benchmark aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!("Usage: matbench <mode> <sizes|path> <runs> [options]");
    println!();
    println!("Modes:");
    println!("  dense <sizes> <runs>        - basic, cache-friendly and tiled kernels");
    println!("  parallel <sizes> <runs>     - threaded, data-parallel and unrolled kernels");
    println!("  sparse <file.mtx> <runs>    - CSR matrix-vector product on a Matrix Market file");
    println!("  distributed <sizes> <runs>  - one row task per output row on a local executor");
    println!("  all <sizes> <runs>          - everything above");
    println!();
    println!("<sizes> is a comma-separated list of matrix sides, e.g. 200,400");
    println!();
    println!("Options:");
    println!("  --out <file.csv>   results file (default results/benchmark_results.csv)");
    println!("  --seed <u64>       generator seed (default 42)");
    println!("  --mtx <file.mtx>   sparse input for `all` (a random matrix is used otherwise)");
}

fn parse_args(args: &[String]) -> std::result::Result<BenchConfig, String> {
    let mut config = BenchConfig::default();
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => {
                let value = iter.next().ok_or("--out needs a path")?;
                config.output = PathBuf::from(value);
            }
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a value")?;
                config.seed = value.parse().map_err(|_| format!("invalid seed `{}`", value))?;
            }
            "--mtx" => {
                let value = iter.next().ok_or("--mtx needs a path")?;
                config.matrix_market = Some(PathBuf::from(value));
            }
            _ => positional.push(arg.as_str()),
        }
    }

    let (mode, target, runs) = match positional.as_slice() {
        [mode, target, runs] => (*mode, *target, *runs),
        _ => return Err("expected <mode> <sizes|path> <runs>".to_string()),
    };

    config.mode = BenchMode::parse(mode).ok_or_else(|| format!("unknown mode `{}`", mode))?;
    config.runs = runs
        .parse()
        .ok()
        .filter(|&r| r > 0)
        .ok_or_else(|| format!("runs must be a positive integer, got `{}`", runs))?;

    if config.mode == BenchMode::Sparse {
        config.matrix_market = Some(PathBuf::from(target));
    } else {
        config.sizes = target
            .split(',')
            .map(|s| s.trim().parse::<usize>().ok().filter(|&n| n > 0))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| format!("invalid size list `{}`", target))?;
    }

    Ok(config)
}

fn run(config: &BenchConfig) -> Result<Vec<BenchResult>> {
    let report = CsvReport::new(&config.output);
    let mut gen = MatrixGenerator::new(config.seed);
    let mut all = Vec::new();

    if config.mode != BenchMode::Sparse {
        for &n in &config.sizes {
            println!("\nGenerating random {}x{} matrices...", n, n);
            let a = gen.dense_matrix(n);
            let b = gen.dense_matrix(n);
            let mut results = Vec::new();

            if config.mode.includes(BenchMode::Dense) {
                println!("\n===== DENSE MULTIPLICATION =====");
                results.push(benchmark(Algorithm::Basic, n, config.runs, || {
                    multiply_basic(&a, &b)
                })?);
                results.push(benchmark(Algorithm::CacheFriendly, n, config.runs, || {
                    multiply_cache_friendly(&a, &b)
                })?);
                for &bs in &config.kernels.block_sizes {
                    results.push(benchmark(Algorithm::Tiled(bs), n, config.runs, || {
                        multiply_tiled(&a, &b, bs)
                    })?);
                }
            }

            if config.mode.includes(BenchMode::Parallel) {
                println!("\n===== PARALLEL MULTIPLICATION =====");
                let baseline =
                    benchmark(Algorithm::Basic, n, config.runs, || multiply_basic(&a, &b))?;
                for &w in &config.kernels.worker_counts {
                    let r = benchmark(Algorithm::Threaded(w), n, config.runs, || {
                        multiply_threaded(&a, &b, w)
                    })?;
                    println!(
                        "  threads={} speedup={:.2} efficiency={:.2}",
                        w,
                        r.summary.speedup_over(&baseline.summary),
                        r.summary.efficiency_over(&baseline.summary, w)
                    );
                    results.push(r);
                }
                let r = benchmark(Algorithm::DataParallel, n, config.runs, || {
                    multiply_data_parallel(&a, &b)
                })?;
                println!(
                    "  data-parallel on {} threads: speedup={:.2}",
                    config.kernels.system_params.n_threads,
                    r.summary.speedup_over(&baseline.summary)
                );
                results.push(r);
                let r = benchmark(Algorithm::Vectorized, n, config.runs, || {
                    multiply_vectorized(&a, &b)
                })?;
                println!("  vectorized: speedup={:.2}", r.summary.speedup_over(&baseline.summary));
                results.push(r);
                if !config.mode.includes(BenchMode::Dense) {
                    results.insert(0, baseline);
                }
            }

            if config.mode.includes(BenchMode::Distributed) {
                println!("\n===== ROW TASK DISPATCH =====");
                let executor = LocalExecutor::new(config.kernels.system_params.n_threads)?;
                results.push(benchmark(Algorithm::Distributed, n, config.runs, || {
                    multiply_distributed(&a, &b, &executor)
                })?);
            }

            report.append(&results)?;
            all.extend(results);
        }
    }

    if config.mode.includes(BenchMode::Sparse) {
        println!("\n===== SPARSE MULTIPLICATION =====");
        let m = match &config.matrix_market {
            Some(path) => load_csr(path)?,
            None => {
                let n = config.sizes.iter().copied().max().unwrap_or(1000);
                println!("No Matrix Market file given, generating a random {}x{} matrix", n, n);
                gen.sparse_matrix(n, config.sparse_density)?
            }
        };
        println!("Sparse matrix: {} x {}, non-zeros: {}", m.n_rows(), m.n_cols(), m.nnz());

        let x = gen.vector(m.n_cols());
        let result = benchmark(Algorithm::SparseCsr, m.n_rows(), config.runs, || m.multiply(&x))?;
        report.append(std::slice::from_ref(&result))?;
        all.push(result);
    }

    Ok(all)
}
