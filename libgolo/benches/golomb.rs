use criterion::{black_box, criterion_group, criterion_main, Criterion};

use libgolo::{optimal_m, BitReader, BitWriter, Golomb, SignMode};

fn residuals() -> Vec<i32> {
    // Laplacian-ish spread, deterministic.
    let mut state = 0x1234_5678u32;
    (0..4096)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            ((state % 1201) as i32 - 600) / ((state % 7) as i32 + 1)
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let residuals = residuals();
    let m = optimal_m(&residuals, 65535);
    let coder = Golomb::new(m, SignMode::Interleaving).unwrap();

    c.bench_function("golomb_encode_4096", |b| {
        b.iter(|| {
            let mut bits = BitWriter::new(Vec::with_capacity(8192));
            for &r in black_box(&residuals) {
                coder.encode(r, &mut bits).unwrap();
            }
            bits.finish().unwrap()
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let residuals = residuals();
    let m = optimal_m(&residuals, 65535);
    let coder = Golomb::new(m, SignMode::Interleaving).unwrap();

    let mut bits = BitWriter::new(Vec::with_capacity(8192));
    for &r in &residuals {
        coder.encode(r, &mut bits).unwrap();
    }
    let encoded = bits.finish().unwrap();

    c.bench_function("golomb_decode_4096", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(black_box(&encoded[..]));
            for _ in 0..residuals.len() {
                black_box(coder.decode(&mut reader).unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
