use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::hint::black_box;
use std::time::{Duration, Instant};
use vortex_kernel::{Backend, Kernel};

#[derive(Parser, Debug)]
#[command(author, version, about = "Vector kernel throughput benchmark", long_about = None)]
struct Args {
    /// Backend to measure (scalar, portable, sse, neon, simd128, avx2, auto) or "all"
    #[arg(short, long, default_value = "all")]
    backend: String,

    /// Vector dimension
    #[arg(short, long, default_value_t = 768)]
    dim: usize,

    #[arg(short, long, default_value_t = 1_000_000)]
    iterations: usize,

    /// Pin the benchmark thread to this core
    #[arg(short, long)]
    core: Option<usize>,

    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Emit the report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug)]
struct BackendReport {
    backend: String,
    lane_width: usize,
    dim: usize,
    iterations: usize,
    distance_ns: f64,
    similarity_ns: f64,
    normalize_ns: f64,
    /// Largest absolute deviation from the portable reference
    /// (0.0 means bit-identical results).
    reference_delta: f32,
}

fn resolve_backends(selection: &str) -> Result<Vec<Backend>> {
    if selection.eq_ignore_ascii_case("all") {
        return Ok(Backend::ALL.into_iter().filter(|b| b.is_available()).collect());
    }
    let backend: Backend = selection.parse().context("Invalid --backend")?;
    Ok(vec![backend])
}

fn pin_to_core(core: usize) {
    let Some(ids) = core_affinity::get_core_ids() else {
        warn!("Failed to enumerate cores. Benchmark thread is running floating.");
        return;
    };
    match ids.into_iter().find(|id| id.id == core) {
        Some(id) if core_affinity::set_for_current(id) => {
            info!("Benchmark thread pinned to core {}", core);
        }
        _ => warn!("Failed to pin benchmark thread to core {} (Running floating)", core),
    }
}

fn per_op(elapsed: Duration, iterations: usize) -> f64 {
    elapsed.as_nanos() as f64 / iterations.max(1) as f64
}

fn measure(backend: Backend, a: &[f32], b: &[f32], iterations: usize) -> Result<BackendReport> {
    let kernel = Kernel::new(backend).with_context(|| format!("Cannot run backend {}", backend))?;
    let reference = Kernel::PORTABLE;
    info!("Measuring {} over {} iterations (dim {})", backend, iterations, a.len());

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(kernel.distance(black_box(a), black_box(b)));
    }
    let distance_ns = per_op(start.elapsed(), iterations);

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(kernel.similarity(black_box(a), black_box(b)));
    }
    let similarity_ns = per_op(start.elapsed(), iterations);

    let mut scratch = a.to_vec();
    let start = Instant::now();
    for _ in 0..iterations {
        kernel.normalize_in_place(black_box(&mut scratch));
    }
    let normalize_ns = per_op(start.elapsed(), iterations);

    let mut normalized = a.to_vec();
    let mut normalized_ref = a.to_vec();
    kernel.normalize_in_place(&mut normalized);
    reference.normalize_in_place(&mut normalized_ref);
    let normalize_delta = normalized
        .iter()
        .zip(&normalized_ref)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f32, f32::max);

    let reference_delta = (kernel.distance(a, b) - reference.distance(a, b))
        .abs()
        .max((kernel.similarity(a, b) - reference.similarity(a, b)).abs())
        .max(normalize_delta);

    Ok(BackendReport {
        backend: backend.to_string(),
        lane_width: backend.lane_width(),
        dim: a.len(),
        iterations,
        distance_ns,
        similarity_ns,
        normalize_ns,
        reference_delta,
    })
}

fn print_table(reports: &[BackendReport]) {
    println!("--- VORTEX KERNEL BENCHMARK ---");
    println!(
        "{:<10} {:>5} {:>14} {:>14} {:>14} {:>12}",
        "Backend", "Lanes", "distance ns", "similarity ns", "normalize ns", "ref delta"
    );
    for r in reports {
        println!(
            "{:<10} {:>5} {:>14.2} {:>14.2} {:>14.2} {:>12.3e}",
            r.backend,
            r.lane_width,
            r.distance_ns,
            r.similarity_ns,
            r.normalize_ns,
            r.reference_delta
        );
    }
    println!("-------------------------------");
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let backends = resolve_backends(&args.backend)?;
    if let Some(core) = args.core {
        pin_to_core(core);
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let a: Vec<f32> = (0..args.dim).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
    let b: Vec<f32> = (0..args.dim).map(|_| rng.gen_range(-1.0f32..1.0)).collect();

    let reports = backends
        .into_iter()
        .map(|backend| measure(backend, &a, &b, args.iterations))
        .collect::<Result<Vec<_>>>()?;

    if args.json {
        let out = serde_json::to_string_pretty(&reports).context("Failed to serialize report")?;
        println!("{}", out);
    } else {
        print_table(&reports);
    }
    Ok(())
}
