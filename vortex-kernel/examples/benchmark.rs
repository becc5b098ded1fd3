use std::hint::black_box;
use std::time::Instant;
use vortex_kernel::{Backend, Kernel};

fn main() {
    let n = 768; // Typical sentence-embedding dimension
    let iterations = 1_000_000;

    let v1: Vec<f32> = (0..n).map(|i| (i as f32 * 0.013).sin()).collect();
    let v2: Vec<f32> = (0..n).map(|i| (i as f32 * 0.007).cos()).collect();

    let mut baseline = None;
    for backend in Backend::ALL {
        let kernel = match Kernel::new(backend) {
            Ok(kernel) => kernel,
            Err(_) => continue,
        };

        println!(
            "Benchmarking {} ({} lanes, {} iterations)...",
            backend,
            backend.lane_width(),
            iterations
        );

        let start = Instant::now();
        let mut sum = 0.0f32;
        for _ in 0..iterations {
            sum += kernel.distance(black_box(&v1), black_box(&v2));
        }
        let distance_time = start.elapsed();

        let start = Instant::now();
        let mut sim = 0.0f32;
        for _ in 0..iterations {
            sim += kernel.similarity(black_box(&v1), black_box(&v2));
        }
        let similarity_time = start.elapsed();

        let mut scratch = v1.clone();
        let start = Instant::now();
        for _ in 0..iterations {
            kernel.normalize_in_place(black_box(&mut scratch));
        }
        let normalize_time = start.elapsed();

        println!(
            "  distance: {:?}  similarity: {:?}  normalize: {:?}  (Dummy sums: {} / {})",
            distance_time, similarity_time, normalize_time, sum, sim
        );

        match baseline {
            None => baseline = Some(distance_time),
            Some(scalar_time) => println!(
                "  Speedup vs scalar (distance): {:.2}x",
                scalar_time.as_secs_f64() / distance_time.as_secs_f64()
            ),
        }
    }
}
