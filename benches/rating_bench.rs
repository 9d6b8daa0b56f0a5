use criterion::{Criterion, black_box, criterion_group, criterion_main};
use starchart::model::Note;
use starchart::rating::compute_rating;

/// Synthetic dense chart: interleaved streams with periodic holds,
/// roughly four minutes long.
fn dense_chart(keys: usize, note_count: usize) -> Vec<Note> {
    (0..note_count)
        .map(|i| {
            let column = (i * 7 + i / 11) % keys;
            let head = (i * 55) as i32;
            if i % 9 == 0 {
                Note::hold(column, head, head + 180)
            } else {
                Note::tap(column, head)
            }
        })
        .collect()
}

fn rating_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("rating");
    group.sample_size(20);

    for &(keys, notes) in &[(4usize, 4_000usize), (7, 4_000), (7, 12_000)] {
        let chart = dense_chart(keys, notes);
        group.bench_function(format!("{keys}k_{notes}_notes"), |b| {
            b.iter(|| compute_rating(black_box(&chart), keys, 8.0));
        });
    }

    group.finish();
}

criterion_group!(benches, rating_benchmark);
criterion_main!(benches);
