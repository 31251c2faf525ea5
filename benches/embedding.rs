use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stegopix::{
    ColorMode, DctEmbedding, EmbeddingMethod, LsbEmbedding, Payload, PixelBuffer, PvdEmbedding,
};

fn carrier(width: u32, height: u32) -> PixelBuffer {
    let data = (0..width as usize * height as usize * 3)
        .map(|i| 100 + (i * 7 % 16) as u8)
        .collect();
    PixelBuffer::from_raw(width, height, ColorMode::Rgb, data).unwrap()
}

fn payload() -> Payload {
    let mut payload = Payload::new();
    payload.add_file_data("noise.bin", (0..4096u32).map(|i| (i * 31) as u8).collect());
    payload
}

fn embed_benchmark(c: &mut Criterion) {
    let payload = payload();

    c.bench_function("lsb embed 512x512", |b| {
        b.iter(|| {
            let mut method = LsbEmbedding::new(carrier(512, 512));
            method.embed(black_box(&payload)).unwrap();
            method.into_pixels()
        })
    });

    c.bench_function("pvd embed 512x512", |b| {
        b.iter(|| {
            let mut method = PvdEmbedding::new(carrier(512, 512));
            method.embed(black_box(&payload)).unwrap();
            method.into_pixels()
        })
    });

    c.bench_function("dct embed 1024x1024", |b| {
        b.iter(|| {
            let mut method = DctEmbedding::new(carrier(1024, 1024));
            method.embed(black_box(&payload)).unwrap();
            method.into_pixels()
        })
    });
}

fn extract_benchmark(c: &mut Criterion) {
    let mut method = LsbEmbedding::new(carrier(512, 512));
    method.embed(&payload()).unwrap();

    c.bench_function("lsb extract 512x512", |b| {
        b.iter(|| method.extract(black_box("")).unwrap())
    });
}

criterion_group!(benches, embed_benchmark, extract_benchmark);
criterion_main!(benches);
