use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use myst_nb_engine::{
    BlockTokenizer, CmarkTokenizer, ConvertOptions, myst_to_notebook, to_ipynb_string,
};
mod common;

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    group.sample_size(10);

    let content = common::generate_notebook(100);
    group.bench_function("cmark_tokenizer", |b| {
        b.iter(|| {
            let tokens = CmarkTokenizer.tokenize(std::hint::black_box(&content));
            std::hint::black_box(tokens);
        });
    });

    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    group.sample_size(10);
    let options = ConvertOptions::default();

    for cells in [10, 100, 1000] {
        let content = common::generate_notebook(cells);
        group.bench_with_input(BenchmarkId::new("myst_to_notebook", cells), &content, |b, text| {
            b.iter(|| myst_to_notebook(std::hint::black_box(text), &options));
        });
    }

    let nested = common::generate_nested_notebook(100);
    group.bench_function("nested_directives", |b| {
        b.iter(|| myst_to_notebook(std::hint::black_box(&nested), &options));
    });

    group.finish();
}

fn bench_write_ipynb(c: &mut Criterion) {
    let mut group = c.benchmark_group("interchange");
    group.sample_size(10);

    let notebook = match myst_to_notebook(&common::generate_notebook(100), &ConvertOptions::default()) {
        Ok(notebook) => notebook,
        Err(err) => panic!("benchmark notebook failed to convert: {err}"),
    };
    group.bench_function("to_ipynb_string", |b| {
        b.iter(|| to_ipynb_string(std::hint::black_box(&notebook)));
    });

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_convert, bench_write_ipynb);
criterion_main!(benches);
