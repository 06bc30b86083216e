use std::hint::black_box;

use bencher::request_fixtures;
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use hearth_http::codec::{Inbound, MessageDecoder, decode_header_line, parse_request_line};
use hearth_http::protocol::{HTTP_LINE, LineKind};
use http::HeaderName;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Request line plus every header line, the way `HttpStream` reads a head.
fn benchmark_request_head(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("request_head");

    for fixture in request_fixtures() {
        let wire = fixture.wire();
        group.throughput(Throughput::Bytes(wire.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fixture.name()), &wire, |b, wire| {
            b.iter_batched_ref(
                || BytesMut::from(wire.as_str()),
                |bytes_mut| {
                    let mut decoder = MessageDecoder::new(LineKind::Path, HTTP_LINE);
                    let Ok(Some(Inbound::Line(line))) = decoder.decode(bytes_mut) else {
                        panic!("input should start with a request line");
                    };
                    let request_line = parse_request_line(&line).expect("input should be a valid request line");

                    decoder.expect_line(LineKind::Line, HTTP_LINE);
                    let mut previous: Option<HeaderName> = None;
                    while let Ok(Some(Inbound::Line(line))) = decoder.decode(bytes_mut) {
                        if line.is_empty() {
                            break;
                        }
                        let field = decode_header_line(&line, previous.as_ref()).expect("input should be valid headers");
                        previous = Some(field.name().clone());
                        black_box(field);
                    }
                    black_box(request_line);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_header_line(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("header_line");

    for fixture in request_fixtures() {
        let lines: Vec<&str> = fixture.header_lines().collect();
        group.bench_with_input(BenchmarkId::from_parameter(fixture.name()), &lines, |b, lines| {
            b.iter(|| {
                let mut previous: Option<HeaderName> = None;
                for line in lines {
                    let field = decode_header_line(line.as_bytes(), previous.as_ref()).expect("input should be valid headers");
                    previous = Some(field.name().clone());
                    black_box(field);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(decoder, benchmark_request_head, benchmark_header_line);
criterion_main!(decoder);
