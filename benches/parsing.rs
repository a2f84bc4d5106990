use criterion::{criterion_group, criterion_main, Criterion};

use cafemsg::parser::container::{ContainerParser, HEADER_SIZE};
use cafemsg::parser::matcher::MarkerSearch;
use cafemsg::parser::text::LegacyEncoding;

fn synthetic_container(tagged: bool) -> Vec<u8> {
    let mut raw = vec![0u8; HEADER_SIZE];
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(2000);
    if tagged {
        raw.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        raw.extend_from_slice(b"message\0message BenchEntry");
    } else {
        raw.extend_from_slice(text.as_bytes());
    }
    raw
}

fn bench_marker_search(c: &mut Criterion) {
    let raw = synthetic_container(true);
    let search = MarkerSearch::new(b"message\0");

    c.bench_function("find_last_marker", |b| b.iter(|| search.find_last(&raw)));
}

fn bench_parse(c: &mut Criterion) {
    let parser = ContainerParser::new(LegacyEncoding::Iso8859_1);
    let plain = synthetic_container(false);
    let tagged = synthetic_container(true);

    c.bench_function("parse_plain_container", |b| {
        b.iter(|| parser.parse(&plain).unwrap().text.len())
    });
    c.bench_function("parse_tagged_container", |b| {
        b.iter(|| parser.parse(&tagged).unwrap().text.len())
    });
}

criterion_group!(benches, bench_marker_search, bench_parse);
criterion_main!(benches);
