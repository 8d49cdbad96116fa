use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;
use walkway_pathfinding::{
    assemble_route_points, classify, route_on_grid, ImageSize, NormPoint, RouteParams,
};

/// A grass map crossed by a lattice of walkways with some randomly placed buildings on it.
fn synthetic_campus(width: u32, height: u32, rng: &mut StdRng) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb([60, 130, 60]));
    for x in 0..width {
        for y in 0..height {
            if x % 60 < 9 || y % 45 < 9 {
                image.put_pixel(x, y, Rgb([230, 230, 226]));
            }
        }
    }
    for _ in 0..40 {
        let x0 = rng.gen_range(0..width - 30);
        let y0 = rng.gen_range(0..height - 30);
        for x in x0..x0 + 30 {
            for y in y0..y0 + 30 {
                image.put_pixel(x, y, Rgb([170, 70, 50]));
            }
        }
    }
    image
}

fn campus_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let image = synthetic_campus(1280, 960, &mut rng);
    let size = ImageSize::new(image.width(), image.height());
    let scenarios: Vec<(NormPoint, NormPoint)> = (0..20)
        .map(|_| {
            (
                NormPoint::new(rng.gen(), rng.gen()),
                NormPoint::new(rng.gen(), rng.gen()),
            )
        })
        .collect();

    for scale in [2, 3, 4] {
        let params = RouteParams::default().with_scale(scale);
        c.bench_function(format!("classify 1280x960, scale {scale}").as_str(), |b| {
            b.iter(|| black_box(classify(&image, &params)))
        });

        let grid = classify(&image, &params);
        c.bench_function(format!("route on grid, scale {scale}").as_str(), |b| {
            b.iter(|| {
                for (start, end) in &scenarios {
                    black_box(route_on_grid(*start, *end, &grid, size, &params).ok());
                }
            })
        });
    }

    let params = RouteParams::default();
    let (start, end) = scenarios[0];
    c.bench_function("assemble route, scale 3", |b| {
        b.iter(|| black_box(assemble_route_points(start, end, &image, &params).ok()))
    });
}

criterion_group!(benches, campus_bench);
criterion_main!(benches);
