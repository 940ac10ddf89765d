//! # Wallet Bridge Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Origin normalization | < 1µs |
//! | Method parsing | < 5µs |
//! | Replay guard check | < 1µs |
//! | Pending table register + resolve | < 10µs |
//! | Granted page call over the runtime channel | < 100µs |

use bc_wallet_host::domain::{Approval, Method, PendingApprovalTable};
use bc_wallet_host::{ChannelSurfaceHost, HostConfig, WalletHost};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use shared_bus::{MessageSender, ReplayGuard};
use shared_types::{ApprovalKind, CallId, Origin, RequestEnvelope, RuntimePayload};
use std::sync::Arc;
use std::time::Duration;

fn bench_origin_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("origin");
    for url in [
        "https://dapp.example",
        "HTTPS://User@Dapp.Example:443/path?q=1#frag",
        "http://[::1]:8080/",
    ] {
        group.bench_with_input(BenchmarkId::new("parse", url), url, |b, url| {
            b.iter(|| black_box(Origin::parse(url)))
        });
    }
    group.finish();
}

fn bench_method_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("methods");
    let sign = json!({ "message": "hello" });
    let add = json!({ "content": "aGVsbG8=", "name": "a.bin", "type": "application/octet-stream" });

    group.bench_function("signMessage", |b| {
        b.iter(|| black_box(Method::parse("signMessage", &sign)))
    });
    group.bench_function("ipfs_add", |b| {
        b.iter(|| black_box(Method::parse("ipfs_add", &add)))
    });
    group.bench_function("unsupported", |b| {
        b.iter(|| black_box(Method::parse("eth_sendTransaction", &sign)))
    });
    group.finish();
}

fn bench_replay_guard(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay-guard");
    group.throughput(Throughput::Elements(1));

    let mut guard = ReplayGuard::with_config(Duration::from_secs(600), Duration::from_secs(60));
    group.bench_function("fresh_id", |b| {
        b.iter(|| black_box(guard.check_and_record(CallId::new())))
    });

    let seen = CallId::new();
    let mut guard = ReplayGuard::new();
    let _ = guard.check_and_record(seen);
    group.bench_function("replayed_id", |b| {
        b.iter(|| black_box(guard.check_and_record(seen)))
    });
    group.finish();
}

fn bench_pending_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("pending-table");
    let (surfaces, _presented) = ChannelSurfaceHost::new();
    let table = PendingApprovalTable::new(Arc::new(surfaces), Duration::from_secs(300));
    let origin = Origin::parse("https://dapp.example").unwrap();

    group.bench_function("register_resolve", |b| {
        b.iter(|| {
            let (id, rx) = table.register(origin.clone(), ApprovalKind::Sign);
            table.resolve(id, Approval { payload: None });
            black_box(rx)
        })
    });
    group.finish();
}

fn bench_granted_call(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("runtime-channel");

    let (mut host, _presented) = rt.block_on(async {
        let (mut host, presented) = WalletHost::in_memory(HostConfig::default()).unwrap();
        host.start().unwrap();
        (host, presented)
    });
    let origin = Origin::parse("https://dapp.example").unwrap();
    host.registry().grant(origin.clone());
    let tab = host.content_port(1, "https://dapp.example");

    for method in ["getAccounts", "ipfs_getNodes"] {
        group.bench_with_input(BenchmarkId::new("dispatch", method), method, |b, method| {
            b.to_async(&rt).iter(|| {
                let payload = RuntimePayload::PageRequest {
                    call_id: CallId::new(),
                    request: RequestEnvelope::new(*method, json!({}), origin.clone()),
                };
                let tab = tab.clone();
                async move { black_box(tab.send_message(payload).await) }
            })
        });
    }
    group.finish();
    host.shutdown();
}

criterion_group!(
    benches,
    bench_origin_parse,
    bench_method_parse,
    bench_replay_guard,
    bench_pending_table,
    bench_granted_call,
);
criterion_main!(benches);
