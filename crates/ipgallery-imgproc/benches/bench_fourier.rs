use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use ipgallery_image::Image;
use ipgallery_imgproc::{
    dct,
    fourier::{self, Spectrum},
    frequency,
};

fn random_plane(width: usize, height: usize) -> Image<f32, 1> {
    let mut rng = rand::rng();
    let data = (0..width * height)
        .map(|_| rng.random_range(0.0..255.0))
        .collect::<Vec<f32>>();
    Image::new([width, height].into(), data).unwrap()
}

fn bench_fourier(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fourier");

    for (width, height) in [(320, 240), (640, 480), (1280, 720)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let padded_size = [
            fourier::optimal_dft_size(*width),
            fourier::optimal_dft_size(*height),
        ]
        .into();
        let image = fourier::pad_constant(&random_plane(*width, *height), padded_size, 0.0).unwrap();
        let mask = frequency::butterworth_low_pass(padded_size, 25.0, 2).unwrap();

        group.bench_with_input(
            BenchmarkId::new("dft_filter_round_trip", &parameter_string),
            &(&image, &mask),
            |b, i| {
                let (src, mask) = *i;
                b.iter(|| {
                    let mut spectrum = Spectrum::forward(src).unwrap();
                    spectrum.fftshift();
                    spectrum.apply_mask(mask).unwrap();
                    spectrum.ifftshift();
                    black_box(spectrum.inverse().real_part().unwrap())
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("butterworth_mask", &parameter_string),
            &padded_size,
            |b, size| b.iter(|| black_box(frequency::butterworth_high_pass(*size, 25.0, 2))),
        );

        let dct_size = [
            dct::optimal_dct_size(*width),
            dct::optimal_dct_size(*height),
        ]
        .into();
        let image = fourier::pad_constant(&random_plane(*width, *height), dct_size, 0.0).unwrap();

        group.bench_with_input(
            BenchmarkId::new("dct_round_trip", &parameter_string),
            &image,
            |b, src| {
                b.iter(|| {
                    let coeffs = dct::dct_2d(src).unwrap();
                    black_box(dct::idct_2d(&coeffs).unwrap())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_fourier);
criterion_main!(benches);
