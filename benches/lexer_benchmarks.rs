use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use properties::{LexerConfig, PropertiesLexer, TokenKind, lexer::is_whitespace};

/// Generate properties content of different sizes
fn generate_properties_content(size: &str) -> String {
    let entries = match size {
        "small" => 10,
        "medium" => 500,
        "large" => 10_000,
        _ => 1,
    };

    let mut content = String::new();
    for i in 0..entries {
        if i % 10 == 0 {
            content.push_str(&format!("# section {}\n", i / 10));
        }
        match i % 4 {
            0 => content.push_str(&format!("service.{}.name = service-{}\n", i, i)),
            1 => content.push_str(&format!("service.{}.port: {}\n", i, 8000 + i)),
            2 => content.push_str(&format!("service.{}.enabled true\n", i)),
            _ => content.push_str(&format!(
                "service.{}.url = http://${{service.{}.name}}:${{service.{}.port}}/\n",
                i,
                i - 3,
                i - 2
            )),
        }
    }
    content
}

/// Generate content where every line needs escape decoding
fn generate_escaped_content(entries: usize) -> String {
    let mut content = String::new();
    for i in 0..entries {
        content.push_str(&format!(
            "path\\:{}\\ key = C\\:\\\\dir\\\\{}\\tcol\\u00e4\\u2318 \\\n    continued\n",
            i, i
        ));
    }
    content
}

fn count_tokens(lexer: PropertiesLexer<'_>) -> usize {
    let mut token_count = 0;
    for token in lexer {
        match token {
            Ok(token) => {
                black_box(&token);
                token_count += 1;
            }
            Err(_) => break,
        }
    }
    token_count
}

/// Benchmark basic lexer tokenization
fn bench_lexer_tokenization(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_tokenization");

    for size in ["small", "medium", "large"] {
        let content = generate_properties_content(size);
        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("with_comments", size), &content, |b, content| {
            b.iter(|| count_tokens(PropertiesLexer::new(black_box(content))));
        });

        group.bench_with_input(
            BenchmarkId::new("without_comments", size),
            &content,
            |b, content| {
                let config = LexerConfig::new().with_save_comments(false);
                b.iter(|| {
                    count_tokens(PropertiesLexer::with_config(
                        black_box(content),
                        config.clone(),
                    ))
                });
            },
        );
    }

    group.finish();
}

/// Benchmark zero-copy scanning against escape decoding
fn bench_escape_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape_decoding");

    let plain = generate_properties_content("medium");
    let escaped = generate_escaped_content(500);

    group.throughput(Throughput::Bytes(plain.len() as u64));
    group.bench_function("borrowed", |b| {
        b.iter(|| count_tokens(PropertiesLexer::new(black_box(&plain))));
    });

    group.throughput(Throughput::Bytes(escaped.len() as u64));
    group.bench_function("decoded", |b| {
        b.iter(|| count_tokens(PropertiesLexer::new(black_box(&escaped))));
    });

    group.finish();
}

/// Benchmark comment-heavy input
fn bench_comment_lexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("comment_lexing");

    let mut content = String::new();
    for i in 0..1000 {
        content.push_str(&format!("# comment line {}\n! another comment {}\n", i, i));
        content.push_str(&format!("key{} = value{}\n", i, i));
    }

    group.bench_function("comments", |b| {
        b.iter(|| {
            PropertiesLexer::new(black_box(&content))
                .filter_map(Result::ok)
                .filter(|token| token.kind == TokenKind::Comment)
                .count()
        });
    });

    group.finish();
}

/// Benchmark character classification
fn bench_character_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("character_classification");

    let test_chars: Vec<char> = (0..=255u8).map(char::from).collect();

    group.bench_function("is_whitespace", |b| {
        b.iter(|| {
            test_chars
                .iter()
                .filter(|&&ch| is_whitespace(black_box(ch)))
                .count()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_tokenization,
    bench_escape_decoding,
    bench_comment_lexing,
    bench_character_classification
);
criterion_main!(benches);
