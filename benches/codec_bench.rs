//! Performance benchmarks for the envelope codec and hex conversion.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench codec_bench
//! ```

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use fabreader_core::{CardUid, KeyMaterial, hex};
use fabreader_protocol::payload::NfcTap;
use fabreader_protocol::{EnvelopeCodec, Message, MessageBuilder, MessageType};
use std::hint::black_box;

const DISPLAY_FRAME: &str = r#"{"is_response":false,"type":"display_text","payload":{"message":"Laser Cutter - in use by someone else","duration":10000}}"#;

/// Create a tap event, the most frequent outbound message.
fn create_tap_message() -> Message {
    let uid = CardUid::from_hex("04A1B2C3D4E5F6").unwrap();
    MessageBuilder::request(MessageType::NfcTap)
        .payload(&NfcTap { card_uid: uid })
        .unwrap()
        .build()
}

fn bench_encode_tap(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(1));

    let codec = EnvelopeCodec::new();
    let msg = create_tap_message();

    group.bench_function("encode_tap_message", |b| {
        b.iter(|| black_box(codec.encode(black_box(&msg)).unwrap()));
    });

    group.finish();
}

fn bench_decode_display(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(DISPLAY_FRAME.len() as u64));

    let codec = EnvelopeCodec::new();

    group.bench_function("decode_display_text", |b| {
        b.iter(|| black_box(codec.decode(black_box(DISPLAY_FRAME)).unwrap()));
    });

    group.finish();
}

fn bench_hex(c: &mut Criterion) {
    let mut group = c.benchmark_group("hex");

    group.bench_function("key_material_from_hex", |b| {
        b.iter(|| {
            black_box(KeyMaterial::from_hex(black_box("00112233445566778899aabbccddeeff")).unwrap())
        });
    });

    let uid = [0x04, 0xa1, 0xb2, 0xc3, 0xd4, 0xe5, 0xf6];
    group.bench_function("uid_to_hex", |b| {
        b.iter(|| black_box(hex::encode_upper(black_box(&uid))));
    });

    group.finish();
}

criterion_group!(benches, bench_encode_tap, bench_decode_display, bench_hex);
criterion_main!(benches);
