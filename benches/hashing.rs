//! Criterion benchmarks for verification string construction and hashing.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use entity_caps::{DataForm, DiscoInfo, FormField, HashAlgorithm, Identity};

fn client_reply(feature_count: usize) -> DiscoInfo {
    let mut info = DiscoInfo::new()
        .with_identity(Identity::new("client", "web").with_name("Jappix"))
        .with_identity(Identity::new("client", "web").with_lang("fr").with_name("Jappix"));
    for i in (0..feature_count).rev() {
        info = info.with_feature(format!("urn:xmpp:bench:feature:{i}"));
    }
    info.with_form(
        DataForm::new()
            .with_field(FormField::new("software_version", ["1.0"]))
            .with_field(FormField::new("FORM_TYPE", ["urn:xmpp:dataforms:softwareinfo"]))
            .with_field(FormField::new("os", ["Linux"]))
            .with_field(FormField::new("ip_version", ["ipv6", "ipv4"])),
    )
}

/// Benchmark: verification string construction with growing feature lists
fn bench_canonical(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical");

    for features in [4usize, 32, 256] {
        let info = client_reply(features);
        group.throughput(Throughput::Elements(features as u64));
        group.bench_with_input(BenchmarkId::new("features", features), &info, |b, info| {
            b.iter(|| black_box(info).canonical_string());
        });
    }

    group.finish();
}

/// Benchmark: full hash computation per algorithm
fn bench_verification_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("verification_hash");
    let info = client_reply(32);

    for algorithm in [HashAlgorithm::Sha1, HashAlgorithm::Sha256] {
        group.bench_with_input(
            BenchmarkId::new("algorithm", algorithm.name()),
            &algorithm,
            |b, algorithm| {
                b.iter(|| black_box(&info).verification_hash(*algorithm));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_canonical, bench_verification_hash);
criterion_main!(benches);
