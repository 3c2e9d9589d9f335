use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use ipgallery_image::Image;
use ipgallery_imgproc::histogram;

fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("Histogram");

    for (width, height) in [(320, 240), (640, 480), (1920, 1080)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let mut rng = rand::rng();
        let data = (0..width * height)
            .map(|_| rng.random_range(40..200))
            .collect::<Vec<u8>>();
        let image = Image::<u8, 1>::new([*width, *height].into(), data).unwrap();
        let output = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();

        group.bench_with_input(
            BenchmarkId::new("compute_histogram", &parameter_string),
            &image,
            |b, src| {
                b.iter(|| {
                    let mut hist = vec![0usize; 256];
                    histogram::compute_histogram(src, &mut hist, 256).unwrap();
                    black_box(hist)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("equalize_histogram", &parameter_string),
            &(&image, &output),
            |b, i| {
                let (src, mut dst) = (i.0, i.1.clone());
                b.iter(|| black_box(histogram::equalize_histogram(src, &mut dst)))
            },
        );

        for tiles in [2, 8, 16].iter() {
            group.bench_with_input(
                BenchmarkId::new(format!("clahe_{tiles}x{tiles}"), &parameter_string),
                &(&image, &output),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| black_box(histogram::clahe(src, &mut dst, 2.0, (*tiles, *tiles))))
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_histogram);
criterion_main!(benches);
