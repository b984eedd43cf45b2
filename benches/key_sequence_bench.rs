use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use emacs_keys::editor::{KillRing, TextModel};
use emacs_keys::input::{normalize, KeyCode, KeyToken, RawKeyEvent, SequenceState, Step};
use emacs_keys::EmacsKeys;

/// キー正規化のベンチマーク
fn bench_normalize(c: &mut Criterion) {
    let events = [
        RawKeyEvent::ctrl(KeyCode::Letter('x')),
        RawKeyEvent::alt(KeyCode::Period).with_shift(),
        RawKeyEvent::plain(KeyCode::Enter),
        RawKeyEvent::ctrl(KeyCode::Space).with_shift(),
    ];

    c.bench_function("normalize_mixed", |b| {
        b.iter(|| {
            for event in &events {
                black_box(normalize(black_box(event)));
            }
        })
    });
}

/// シーケンス状態機械のベンチマーク
fn bench_sequence_state(c: &mut Criterion) {
    let tokens: Vec<KeyToken> = ["C-u", "4", "2", "C-x", "C-x", "M-g", "g", "C-n"]
        .iter()
        .map(|t| KeyToken::new(*t))
        .collect();

    c.bench_function("sequence_step", |b| {
        b.iter_batched(
            SequenceState::new,
            |mut state| {
                for token in &tokens {
                    if let Step::Resolved(key) = state.step(black_box(token)) {
                        let resolved = state.resolve(key);
                        state.reset();
                        state.set_last_command_key(resolved.key);
                    }
                }
            },
            BatchSize::SmallInput,
        )
    });
}

/// キー処理全体（正規化からディスパッチまで）のベンチマーク
fn bench_dispatch(c: &mut Criterion) {
    let text = "line\n".repeat(500);
    let keys = [
        RawKeyEvent::ctrl(KeyCode::Letter('u')),
        RawKeyEvent::plain(KeyCode::Digit('8')),
        RawKeyEvent::ctrl(KeyCode::Letter('n')),
        RawKeyEvent::ctrl(KeyCode::Letter('f')),
    ];

    c.bench_function("dispatch_motion", |b| {
        b.iter_batched(
            || EmacsKeys::new(TextModel::new(&text)),
            |mut session| {
                for event in &keys {
                    black_box(session.handle_key(event));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

/// キルリングのベンチマーク
fn bench_kill_ring(c: &mut Criterion) {
    c.bench_function("kill_ring_add_evict", |b| {
        b.iter_batched(
            KillRing::new,
            |mut ring| {
                for i in 0..200 {
                    ring.add(format!("entry {}", i));
                }
                black_box(ring.get(None));
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_normalize,
    bench_sequence_state,
    bench_dispatch,
    bench_kill_ring
);
criterion_main!(benches);
