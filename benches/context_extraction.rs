use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use scriba::trailing_sentences;

/// Build transcript-like material of roughly `sentences` sentences.
fn build_material(sentences: usize) -> String {
    let mut material = String::new();
    for i in 0..sentences {
        material.push_str(&format!(
            "This is sentence number {} of a long interview transcript about nothing in particular. ",
            i
        ));
        if i % 7 == 3 {
            material.push_str("Really? ");
        }
    }
    material
}

fn bench_trailing_sentences(c: &mut Criterion) {
    let mut group = c.benchmark_group("trailing_sentences");

    for sentence_count in [10usize, 100, 1000] {
        let material = build_material(sentence_count);
        group.bench_with_input(
            BenchmarkId::from_parameter(sentence_count),
            &material,
            |b, material| {
                b.iter(|| trailing_sentences(black_box(material), black_box(2)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_trailing_sentences);
criterion_main!(benches);
