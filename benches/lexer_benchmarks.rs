use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dotenv_lexer::{GrammarId, Scanner, TokenKind, TokenStream};

/// Generate dotenv content of various sizes
fn generate_env_content(size_category: &str) -> String {
    let lines = match size_category {
        "small" => 10,
        "medium" => 200,
        "large" => 5_000,
        _ => 1,
    };

    let mut content = String::from("# generated settings\n");
    for i in 0..lines {
        content.push_str(&format!(
            "SERVICE_{i}_NAME=service-{i}\n\
             SERVICE_{i}_PORT={}\n\
             export SERVICE_{i}_ENABLED={} # toggled\n\
             SERVICE_{i}_URL=\"http://${{SERVICE_{i}_NAME}}:${{SERVICE_{i}_PORT}}/\"\n\
             SERVICE_{i}_NOTE='raw \\'text\\' {i}'\n\n",
            8000 + i,
            if i % 2 == 0 { "on" } else { "off" },
        ));
    }
    content
}

/// Benchmark raw tokenization through the grammar stack
fn bench_lexer_tokenization(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_tokenization");

    for size in ["small", "medium", "large"] {
        let content = generate_env_content(size);
        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("token_stream", size), &content, |b, content| {
            b.iter(|| {
                let mut stream = TokenStream::new(black_box(content), GrammarId::Main);
                let mut token_count = 0;
                while let Ok(token) = stream.next_token() {
                    black_box(&token);
                    if token.kind == TokenKind::Eos {
                        break;
                    }
                    token_count += 1;
                }
                token_count
            });
        });

        group.bench_with_input(BenchmarkId::new("iterator", size), &content, |b, content| {
            b.iter(|| {
                TokenStream::new(black_box(content), GrammarId::Main)
                    .filter_map(Result::ok)
                    .count()
            });
        });
    }

    group.finish();
}

/// Benchmark lookahead cost of the scanner
fn bench_scanner_lookahead(c: &mut Criterion) {
    let content = generate_env_content("medium");
    let mut group = c.benchmark_group("scanner_lookahead");
    group.throughput(Throughput::Bytes(content.len() as u64));

    group.bench_function("peek_then_consume", |b| {
        b.iter(|| {
            let mut scanner = Scanner::new(TokenStream::new(black_box(&content), GrammarId::Main));
            let mut names = 0;
            while scanner.valid().unwrap_or(false) {
                if scanner.consume(TokenKind::VarName).ok().flatten().is_some() {
                    names += 1;
                    continue;
                }
                let skipped = [
                    TokenKind::Assign,
                    TokenKind::VarValue,
                    TokenKind::SingleQuote,
                    TokenKind::DoubleQuote,
                    TokenKind::RawText,
                    TokenKind::Eol,
                ]
                .into_iter()
                .any(|kind| scanner.consume(kind).ok().flatten().is_some());
                if !skipped {
                    break;
                }
            }
            names
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lexer_tokenization, bench_scanner_lookahead);
criterion_main!(benches);
