use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use slotdb::common::tuple::encode_tuple;
use slotdb::{Attribute, IndexManager, RecordFileManager, Rid, Value};
use tempfile::tempdir;

fn bench_index_insert_sequential(c: &mut Criterion) {
    let attr = Attribute::int("k");
    c.bench_function("index_insert_sequential_1k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let im = IndexManager::new();
                let path = dir.path().join("bench.idx");
                im.create_file(&path).unwrap();
                let index = im.open_file(&path).unwrap();
                (dir, index)
            },
            |(_dir, mut index)| {
                for i in 0..1000 {
                    index.insert_entry(&attr, &Value::Int(i), Rid::new(0, i as u32)).unwrap();
                }
            },
            BatchSize::PerIteration,
        );
    });
}

fn bench_index_insert_duplicates(c: &mut Criterion) {
    let attr = Attribute::varchar("city", 32);
    let cities = ["berlin", "lima", "oslo", "quito"];
    c.bench_function("index_insert_duplicates_1k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let im = IndexManager::new();
                let path = dir.path().join("bench.idx");
                im.create_file(&path).unwrap();
                let index = im.open_file(&path).unwrap();
                (dir, index)
            },
            |(_dir, mut index)| {
                for i in 0..1000u32 {
                    let city = Value::varchar(cities[(i % 4) as usize]);
                    index.insert_entry(&attr, &city, Rid::new(i, 0)).unwrap();
                }
            },
            BatchSize::PerIteration,
        );
    });
}

fn bench_record_insert(c: &mut Criterion) {
    let attrs = vec![Attribute::varchar("name", 64), Attribute::int("age")];
    let tuple = encode_tuple(
        &attrs,
        &[Some(Value::varchar("benchmark row")), Some(Value::Int(42))],
    )
    .unwrap();

    c.bench_function("record_insert", |b| {
        let dir = tempdir().unwrap();
        let rfm = RecordFileManager::new();
        let path = dir.path().join("bench.db");
        rfm.create_file(&path).unwrap();
        let mut file = rfm.open_file(&path).unwrap();

        b.iter(|| {
            file.insert_record(&attrs, &tuple).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_index_insert_sequential,
    bench_index_insert_duplicates,
    bench_record_insert
);
criterion_main!(benches);
