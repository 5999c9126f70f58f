use criterion::{criterion_group, criterion_main, Criterion};
use matcher::tokenizer::normalize;
use matcher::{Corpus, RawDocument};

const RESUME: &str = "Senior software engineer with eight years of experience designing distributed \
systems. Led migration of monolithic services to Kubernetes, mentored junior developers, and owned \
on-call rotations. Skills: Rust, Go, PostgreSQL, Kafka, observability, performance tuning.";

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_resume", |b| b.iter(|| normalize(RESUME)));
}

fn bench_build(c: &mut Criterion) {
    let docs: Vec<RawDocument> = (0..200).map(|i| RawDocument::text(format!("r{i}.txt"), RESUME)).collect();
    c.bench_function("build_200_resumes", |b| b.iter(|| Corpus::build(docs.clone())));
}

criterion_group!(benches, bench_normalize, bench_build);
criterion_main!(benches);
