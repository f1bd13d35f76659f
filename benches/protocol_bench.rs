// benches/protocol_bench.rs

use bytes::{Bytes, BytesMut};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use peridot::core::cluster::key_hash_slot;
use peridot::core::protocol::{RespCodec, RespFrame};
use tokio_util::codec::{Decoder, Encoder};

fn bench_encode_command(c: &mut Criterion) {
    let frame = RespFrame::command(vec![
        Bytes::from_static(b"SET"),
        Bytes::from_static(b"benchmark:key:123456"),
        Bytes::from_static(b"some moderately sized value payload for the bench"),
    ]);
    c.bench_function("encode_set_command", |b| {
        b.iter(|| {
            let mut buf = BytesMut::with_capacity(128);
            RespCodec
                .encode(black_box(frame.clone()), &mut buf)
                .unwrap();
            black_box(buf)
        })
    });
}

fn bench_decode_reply(c: &mut Criterion) {
    let wire = b"*3\r\n$5\r\nfirst\r\n:12345\r\n*2\r\n$6\r\nnested\r\n$-1\r\n";
    c.bench_function("decode_nested_reply", |b| {
        b.iter(|| {
            let mut buf = BytesMut::from(&wire[..]);
            black_box(RespCodec.decode(&mut buf).unwrap())
        })
    });
}

fn bench_hash_slot(c: &mut Criterion) {
    c.bench_function("key_hash_slot", |b| {
        b.iter(|| black_box(key_hash_slot(black_box(b"user:{1000}:profile"))))
    });
    c.bench_function("key_hash_slot_no_tag", |b| {
        b.iter(|| black_box(key_hash_slot(black_box(b"plain-key-without-tag"))))
    });
}

criterion_group!(
    benches,
    bench_encode_command,
    bench_decode_reply,
    bench_hash_slot
);
criterion_main!(benches);
