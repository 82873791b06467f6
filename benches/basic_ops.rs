use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use colfam::{FamilyDef, RawPath, Slice, Store, StoreOptions, TableDef, WriteOptions};

fn setup_store() -> Store {
    let defs = vec![TableDef::new(
        "Table1",
        vec![
            FamilyDef::simple("Standard1"),
            FamilyDef::super_family("Super1"),
        ],
    )];
    Store::open(defs, StoreOptions::default()).unwrap()
}

fn populate(store: &Store, rows: usize, columns: usize) {
    for r in 0..rows {
        for c in 0..columns {
            store
                .insert(
                    "Table1",
                    Slice::from(format!("key{r:06}")),
                    &RawPath::column("Standard1", Slice::from(format!("c{c:03}"))),
                    Slice::from(vec![b'x'; 100]),
                    0,
                    &WriteOptions::default(),
                )
                .unwrap();
        }
    }
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.throughput(Throughput::Elements(1));

    group.bench_function("insert_durable_100b", |b| {
        let store = setup_store();
        let value = vec![b'x'; 100];
        let mut i = 0u64;
        b.iter(|| {
            store
                .insert(
                    "Table1",
                    Slice::from(format!("key{i:010}")),
                    &RawPath::column("Standard1", Slice::from("c1")),
                    Slice::from(value.as_slice()),
                    0,
                    &WriteOptions::default(),
                )
                .unwrap();
            i += 1;
        });
    });

    group.bench_function("insert_eventual_100b", |b| {
        let store = setup_store();
        let value = vec![b'x'; 100];
        let mut i = 0u64;
        b.iter(|| {
            store
                .insert(
                    "Table1",
                    Slice::from(format!("key{i:010}")),
                    &RawPath::column("Standard1", Slice::from("c1")),
                    Slice::from(value.as_slice()),
                    0,
                    &WriteOptions::eventual(),
                )
                .unwrap();
            i += 1;
        });
    });

    group.bench_function("insert_super_100b", |b| {
        let store = setup_store();
        let value = vec![b'x'; 100];
        let mut i = 0u64;
        b.iter(|| {
            store
                .insert(
                    "Table1",
                    Slice::from(format!("key{i:010}")),
                    &RawPath::group_column("Super1", Slice::from("sc1"), Slice::from("c1")),
                    Slice::from(value.as_slice()),
                    0,
                    &WriteOptions::default(),
                )
                .unwrap();
            i += 1;
        });
    });

    group.finish();
}

fn bench_get_column(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_column");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_column_hot", |b| {
        let store = setup_store();
        populate(&store, 1000, 1);
        let mut i = 0usize;
        b.iter(|| {
            let key = Slice::from(format!("key{:06}", i % 1000));
            black_box(
                store
                    .get_column(
                        "Table1",
                        &key,
                        &RawPath::column("Standard1", Slice::from("c000")),
                    )
                    .unwrap(),
            );
            i += 1;
        });
    });

    group.finish();
}

fn bench_get_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_slice");
    group.throughput(Throughput::Elements(1));

    group.bench_function("slice_100_columns", |b| {
        let store = setup_store();
        populate(&store, 1, 100);
        let key = Slice::from("key000000");
        b.iter(|| {
            black_box(
                store
                    .get_slice(
                        "Table1",
                        &key,
                        &RawPath::family("Standard1"),
                        &Slice::empty(),
                        &Slice::empty(),
                        true,
                        1000,
                    )
                    .unwrap(),
            );
        });
    });

    group.finish();
}

fn bench_get_key_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_key_range");
    group.throughput(Throughput::Elements(1));

    group.bench_function("range_100_of_10k", |b| {
        let store = setup_store();
        populate(&store, 10_000, 1);
        b.iter(|| {
            black_box(
                store
                    .get_key_range(
                        "Table1",
                        "Standard1",
                        &Slice::from("key005000"),
                        &Slice::empty(),
                        100,
                    )
                    .unwrap(),
            );
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_get_column,
    bench_get_slice,
    bench_get_key_range
);
criterion_main!(benches);
