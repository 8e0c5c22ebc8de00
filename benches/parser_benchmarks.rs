use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use properties::{
    Encoding, MapVariableHandler, Properties, WriterConfig, parse, to_string,
};

/// Generate a flat properties file with comments every few keys
fn generate_properties(entries: usize) -> String {
    let mut content = String::new();
    for i in 0..entries {
        if i % 5 == 0 {
            content.push_str(&format!("# group {}\n", i / 5));
        }
        content.push_str(&format!("app.setting.{} = value number {}\n", i, i));
    }
    content
}

/// Generate a chain of placeholders `depth` levels deep
fn generate_placeholder_chain(depth: usize) -> String {
    let mut content = String::from("level0 = root\n");
    for i in 1..depth {
        content.push_str(&format!("level{} = ${{level{}}}/{}\n", i, i - 1, i));
    }
    content
}

/// Benchmark parsing files of various sizes
fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    for entries in [10, 1_000, 20_000] {
        let content = generate_properties(entries);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", entries), &content, |b, content| {
            b.iter(|| parse(black_box(content)));
        });
    }

    group.finish();
}

/// Benchmark placeholder expansion
fn bench_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expansion");

    for depth in [2, 16, 64] {
        let props = parse(&generate_placeholder_chain(depth)).unwrap();
        let key = format!("level{}", depth - 1);
        group.bench_with_input(BenchmarkId::new("chain", depth), &key, |b, key| {
            b.iter(|| props.get(black_box(key)));
        });
    }

    let mut handler = MapVariableHandler::new();
    handler.insert("HOST", "db.example.com");
    handler.insert("PORT", "5432");
    let props = parse("url = jdbc:postgresql://${HOST}:${PORT}/${name}\nname = inventory")
        .unwrap()
        .with_resolver(handler);
    group.bench_function("resolver", |b| {
        b.iter(|| props.get(black_box("url")));
    });

    let props = parse(&generate_properties(1_000)).unwrap();
    group.bench_function("expanded_1000", |b| {
        b.iter(|| props.expanded());
    });

    group.finish();
}

/// Benchmark writing in both encodings
fn bench_writing(c: &mut Criterion) {
    let mut group = c.benchmark_group("writing");

    let mut props: Properties = parse(&generate_properties(1_000)).unwrap();
    props.set("unicode.key⌘", "välue with ⌘ and 😀");

    group.bench_function("to_string", |b| {
        b.iter(|| to_string(black_box(&props)));
    });

    for encoding in [Encoding::Utf8, Encoding::Iso8859_1] {
        let config = WriterConfig::new().with_encoding(encoding);
        group.bench_with_input(
            BenchmarkId::new("write", format!("{:?}", encoding)),
            &config,
            |b, config| {
                b.iter(|| {
                    let mut buf = Vec::with_capacity(64 * 1024);
                    props.write(&mut buf, config).map(|_| buf.len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_expansion, bench_writing);
criterion_main!(benches);
