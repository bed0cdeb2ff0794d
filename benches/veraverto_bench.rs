use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::rc::Rc;
use veraverto::{OpCtx, ShieldedView, TransformTable, Value, record};

// ─── Test Data ──────────────────────────────────────────────────────────────

/// A nested record with all supported shapes:
/// - Primitives: strings, i64, u64, f64, bool, null
/// - Sequences: simple and mixed-type
/// - Nested records: 3 levels deep
fn make_value() -> Value {
    record!({
        "id" => "user:abc123",
        "name" => "Alice",
        "age" => 28i64,
        "score" => 99.5f64,
        "active" => true,
        "deleted" => false,
        "metadata" => null,
        "tags" => ["developer", "rust", "database"],
        "count" => 1000u64,
        "profile" => {
            "bio" => "Software engineer",
            "avatar" => "https://example.com/avatar.jpg",
            "settings" => {
                "theme" => "dark",
                "notifications" => true,
                "privacy" => {
                    "public" => false,
                    "level" => 3i64,
                },
            },
        },
        "history" => [
            { "action" => "login", "timestamp" => 1234567890i64 },
            { "action" => "update", "timestamp" => 1234567900i64 },
        ],
        "mixed_seq" => [42i64, "text", true, { "nested" => "value" }],
    })
}

/// Baseline for the COW comparisons: rebuild every allocation in the tree.
/// `Value::clone` only bumps reference counts, so the full copy has to
/// recurse by hand.
fn deep_clone(value: &Value) -> Value {
    match value {
        Value::Seq(items) => Value::seq(items.iter().map(deep_clone).collect()),
        Value::Record(map) => {
            let mut out = veraverto::RecordMap::default();
            for (name, field) in map.iter() {
                out.insert(name.clone(), deep_clone(field));
            }
            Value::record(out)
        }
        other => other.clone(),
    }
}

fn make_table() -> TransformTable {
    TransformTable::new()
        .op("set_age", |ctx: &mut OpCtx, args: &[Value]| {
            ctx.set("age", args.first().cloned().unwrap_or_default());
            None
        })
        .op("set_theme", |ctx: &mut OpCtx, args: &[Value]| {
            let theme = args.first().cloned().unwrap_or_default();
            if let Some(mut profile) = ctx.field("profile") {
                if let Some(mut settings) = profile.field("settings") {
                    settings.set("theme", theme);
                }
            }
            None
        })
        .op("age", |ctx: &mut OpCtx, _args: &[Value]| ctx.get("age"))
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 1: Copying strategies
// ═══════════════════════════════════════════════════════════════════════════

fn bench_copying(c: &mut Criterion) {
    let mut group = c.benchmark_group("copying");

    let base = make_value();
    let table = make_table();

    group.bench_function("deep_clone (baseline)", |b| {
        b.iter(|| deep_clone(black_box(&base)))
    });

    group.bench_function("cow single-field edit", |b| {
        b.iter(|| {
            let mut chain = table.cow(black_box(&base));
            chain.call("set_age", &[Value::from(42i64)]).unwrap();
            chain.finish().unwrap()
        })
    });

    group.bench_function("cow nested edit", |b| {
        b.iter(|| {
            let mut chain = table.cow(black_box(&base));
            chain.call("set_theme", &[Value::from("light")]).unwrap();
            chain.finish().unwrap()
        })
    });

    group.bench_function("cow null transform", |b| {
        b.iter(|| table.cow(black_box(&base)).finish().unwrap())
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 2: Chain dispatch
// ═══════════════════════════════════════════════════════════════════════════

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.sample_size(500);
    group.measurement_time(std::time::Duration::from_secs(8));

    let base = make_value();
    let table = make_table();

    group.bench_function("lookup + read-only op", |b| {
        b.iter(|| {
            let mut chain = table.cow(black_box(&base));
            chain.call(black_box("age"), &[]).unwrap();
            chain.finish_result().unwrap()
        })
    });

    group.bench_function("ten chained calls", |b| {
        b.iter(|| {
            let mut chain = table.cow(black_box(&base));
            for n in 0..10i64 {
                chain.call("set_age", &[Value::from(n)]).unwrap();
            }
            chain.finish().unwrap()
        })
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 3: Mutate mode
// ═══════════════════════════════════════════════════════════════════════════

fn bench_mutate(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutate");

    let table = make_table();

    group.bench_function("mutate single-field edit", |b| {
        b.iter_batched(
            make_value,
            |mut target| {
                let mut chain = table.mutate(&mut target);
                chain.call("set_age", &[Value::from(42i64)]).unwrap();
                chain.finish().unwrap()
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("mutate nested edit", |b| {
        b.iter_batched(
            make_value,
            |mut target| {
                let mut chain = table.mutate(&mut target);
                chain.call("set_theme", &[Value::from("light")]).unwrap();
                chain.finish().unwrap()
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 4: Shield views directly
// ═══════════════════════════════════════════════════════════════════════════

fn bench_views(c: &mut Criterion) {
    let mut group = c.benchmark_group("views");
    group.sample_size(1000);
    group.measurement_time(std::time::Duration::from_secs(10));

    let base = make_value();

    group.bench_function("cow view get", |b| {
        b.iter(|| {
            let mut view = ShieldedView::cow(black_box(&base));
            black_box(view.get(black_box("name")))
        })
    });

    group.bench_function("cow view set + materialize", |b| {
        b.iter(|| {
            let mut view = ShieldedView::cow(black_box(&base));
            view.set("name", Value::from("Bobby"));
            view.into_value()
        })
    });

    group.bench_function("cow view keys", |b| {
        b.iter(|| {
            let view = ShieldedView::cow(black_box(&base));
            black_box(view.keys())
        })
    });

    group.bench_function("adopted literal read-back", |b| {
        let literal = make_value();
        b.iter(|| {
            let view = ShieldedView::adopt(black_box(literal.clone()));
            let out = view.snapshot();
            black_box(out.ptr_eq(&literal))
        })
    });

    group.bench_function("Rc bump (shallow clone)", |b| {
        let Value::Record(map) = &base else {
            panic!("expected record fixture");
        };
        b.iter(|| black_box(Rc::clone(map)))
    });

    group.finish();
}

// ─── Criterion Main ─────────────────────────────────────────────────────────

criterion_group!(
    benches,
    bench_copying,
    bench_dispatch,
    bench_mutate,
    bench_views,
);
criterion_main!(benches);
