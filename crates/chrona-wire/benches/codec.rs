//! Benchmarks for the packet codec

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrona_core::{ActorId, VectorTimestamp};
use chrona_wire::Packet;

fn sample_packet(actor_count: u64) -> Packet {
    let mut stamp = VectorTimestamp::new(ActorId::new(0));
    for actor in 1..actor_count {
        stamp.merge(&VectorTimestamp::new(ActorId::new(actor)));
        stamp.tick(ActorId::new(0)).unwrap();
    }

    Packet::new(&stamp.serialize_to_binary(), b"GIEVTIMEPLX")
}

fn bench_packet_serialize(c: &mut Criterion) {
    let pkt = sample_packet(8);

    c.bench_function("packet_serialize", |b| {
        b.iter(|| black_box(&pkt).serialize_to_binary())
    });
}

fn bench_packet_deserialize(c: &mut Criterion) {
    let bytes = sample_packet(8).serialize_to_binary();

    c.bench_function("packet_deserialize", |b| {
        b.iter(|| Packet::deserialize_from_binary(black_box(&bytes)).unwrap())
    });
}

fn bench_stamp_roundtrip(c: &mut Criterion) {
    let bytes = sample_packet(32).stamp_bytes().to_vec();

    c.bench_function("stamp_roundtrip", |b| {
        b.iter(|| {
            let stamp = VectorTimestamp::deserialize_from_binary(black_box(&bytes)).unwrap();
            black_box(stamp.serialize_to_binary())
        })
    });
}

criterion_group!(
    benches,
    bench_packet_serialize,
    bench_packet_deserialize,
    bench_stamp_roundtrip
);
criterion_main!(benches);
