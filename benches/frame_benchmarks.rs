// ABOUTME: Benchmark suite for frame envelope and method encode/decode
// ABOUTME: Measures the FrameDecoder hot path and the handshake/publish method codecs

use amqp091_core::codec::{encode_frame, FrameDecoder};
use amqp091_core::frame::{Frame, FramePayload};
use amqp091_core::methods::{basic, connection, Method};
use bytes::{Bytes, BytesMut};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

fn sample_start() -> Frame {
    Frame::method(
        0,
        Method::ConnectionStart(connection::Start {
            version_major: 9,
            version_minor: 1,
            server_properties: Bytes::from_static(b"some properties"),
            mechanisms: Bytes::from_static(b"PLAIN AMQPLAIN"),
            locales: Bytes::from_static(b"en_US"),
        }),
    )
}

fn sample_publish() -> Frame {
    Frame::method(
        1,
        Method::BasicPublish(basic::Publish {
            ticket: 0,
            exchange: "amq.topic".to_string(),
            routing_key: "routing.key.example".to_string(),
            mandatory: false,
            immediate: false,
        }),
    )
}

fn sample_body(len: usize) -> Frame {
    Frame {
        channel: 1,
        payload: FramePayload::Body(Bytes::from(vec![b'x'; len])),
    }
}

fn encode(frame: &Frame) -> BytesMut {
    let mut buf = BytesMut::new();
    encode_frame(frame, &mut buf);
    buf
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_frame");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("connection_start", |b| {
        let frame = sample_start();
        b.iter(|| encode(black_box(&frame)))
    });

    group.bench_function("basic_publish", |b| {
        let frame = sample_publish();
        b.iter(|| encode(black_box(&frame)))
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_frame");
    group.measurement_time(Duration::from_secs(10));

    let start_bytes = encode(&sample_start());
    group.bench_function("connection_start", |b| {
        b.iter(|| {
            let mut decoder = FrameDecoder::new();
            decoder.handle_input(black_box(&start_bytes)).unwrap()
        })
    });

    let publish_bytes = encode(&sample_publish());
    group.bench_function("basic_publish", |b| {
        b.iter(|| {
            let mut decoder = FrameDecoder::new();
            decoder.handle_input(black_box(&publish_bytes)).unwrap()
        })
    });

    group.finish();
}

fn bench_body_fragment_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("body_fragment");
    group.measurement_time(Duration::from_secs(10));

    for &size in &[128usize, 4096, 65_536] {
        let frame = sample_body(size);
        let bytes = encode(&frame);
        group.bench_with_input(BenchmarkId::new("decode", size), &bytes, |b, bytes| {
            b.iter(|| {
                let mut decoder = FrameDecoder::new();
                decoder.handle_input(black_box(bytes)).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_body_fragment_sizes
);
criterion_main!(benches);
