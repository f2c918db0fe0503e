//! Integration tests for record files.
//!
//! These exercise the public API end to end: tuples go in through
//! `encode_tuple`, come back out byte-identical, and survive reopening.

use proptest::prelude::*;
use slotdb::common::tuple::{decode_tuple, encode_tuple};
use slotdb::{Attribute, CompOp, Error, RecordFile, RecordFileManager, Rid, ScanIterator, Value};
use tempfile::{tempdir, TempDir};

fn employee() -> Vec<Attribute> {
    vec![
        Attribute::varchar("name", 100),
        Attribute::int("age"),
        Attribute::real("height"),
        Attribute::int("salary"),
    ]
}

fn open_file(dir: &TempDir, name: &str) -> (RecordFileManager, RecordFile) {
    let rfm = RecordFileManager::new();
    let path = dir.path().join(name);
    rfm.create_file(&path).unwrap();
    let file = rfm.open_file(&path).unwrap();
    (rfm, file)
}

fn row(name: &str, age: i32, height: f32, salary: Option<i32>) -> Vec<u8> {
    encode_tuple(
        &employee(),
        &[
            Some(Value::varchar(name)),
            Some(Value::Int(age)),
            Some(Value::Real(height)),
            salary.map(Value::Int),
        ],
    )
    .unwrap()
}

/// Test the record file lifecycle through the manager.
#[test]
fn test_file_lifecycle() {
    let dir = tempdir().unwrap();
    let rfm = RecordFileManager::new();
    let path = dir.path().join("lifecycle.db");

    rfm.create_file(&path).unwrap();
    assert!(matches!(rfm.create_file(&path), Err(Error::FileExists(_))));

    let file = rfm.open_file(&path).unwrap();
    rfm.close_file(file).unwrap();

    rfm.destroy_file(&path).unwrap();
    assert!(matches!(rfm.open_file(&path), Err(Error::FileNotFound(_))));
}

/// Test that data and counters persist across close/reopen.
#[test]
fn test_records_persist_across_sessions() {
    let dir = tempdir().unwrap();
    let rfm = RecordFileManager::new();
    let path = dir.path().join("persist.db");
    rfm.create_file(&path).unwrap();

    let mut rids = Vec::new();
    {
        let mut file = rfm.open_file(&path).unwrap();
        for i in 0..500 {
            let data = row(&format!("emp{}", i), i, 1.0, Some(i * 10));
            rids.push(file.insert_record(&employee(), &data).unwrap());
        }
        rfm.close_file(file).unwrap();
    }

    let mut file = rfm.open_file(&path).unwrap();
    let counters = file.collect_counter_values();
    assert!(counters.appends > 1);
    for (i, rid) in rids.iter().enumerate() {
        let i = i as i32;
        assert_eq!(
            file.read_record(&employee(), *rid).unwrap(),
            row(&format!("emp{}", i), i, 1.0, Some(i * 10))
        );
    }

    // New inserts after reopening keep going
    let rid = file.insert_record(&employee(), &row("late", 1, 1.0, None)).unwrap();
    assert!(!rids.contains(&rid));
}

/// Deleting a record and inserting one of equal size reuses its slot
/// without growing the page's used space.
#[test]
fn test_compaction_reuses_slot() {
    let dir = tempdir().unwrap();
    let (_rfm, mut file) = open_file(&dir, "compact.db");

    let a = file.insert_record(&employee(), &row("aaaa", 1, 1.0, Some(1))).unwrap();
    let b = file.insert_record(&employee(), &row("bbbb", 2, 2.0, Some(2))).unwrap();
    let before = file.collect_counter_values();

    file.delete_record(a).unwrap();
    let c = file.insert_record(&employee(), &row("cccc", 3, 3.0, Some(3))).unwrap();

    assert_eq!(c, a);
    assert_eq!(file.collect_counter_values().since(&before).appends, 0);
    assert_eq!(file.read_record(&employee(), b).unwrap(), row("bbbb", 2, 2.0, Some(2)));
    assert_eq!(file.read_record(&employee(), c).unwrap(), row("cccc", 3, 3.0, Some(3)));
}

/// A relocating update resolves through the tombstone and the original
/// RID keeps working for later updates and deletes.
#[test]
fn test_relocated_record_keeps_its_rid() {
    let dir = tempdir().unwrap();
    let (_rfm, mut file) = open_file(&dir, "tombstone.db");
    let attrs = vec![Attribute::varchar("doc", 4000)];
    let doc = |len: usize, byte: u8| {
        encode_tuple(&attrs, &[Some(Value::varchar(vec![byte; len]))]).unwrap()
    };

    let home = file.insert_record(&attrs, &doc(10, b'a')).unwrap();
    let filler = file.insert_record(&attrs, &doc(3900, b'f')).unwrap();
    assert_eq!(home.page_num, filler.page_num);

    for (round, len) in [2000usize, 3000, 50, 3500].into_iter().enumerate() {
        let byte = b'b' + round as u8;
        file.update_record(&attrs, home, &doc(len, byte)).unwrap();
        assert_eq!(file.read_record(&attrs, home).unwrap(), doc(len, byte));
        assert_eq!(file.read_record(&attrs, filler).unwrap(), doc(3900, b'f'));
    }

    // A full scan sees the record once, at its home address
    let scan = file.scan(&attrs, "", CompOp::NoOp, None, &["doc"]).unwrap();
    let rids: Vec<Rid> = scan.map(|entry| entry.unwrap().0).collect();
    assert_eq!(rids, vec![home, filler]);

    file.delete_record(home).unwrap();
    assert!(matches!(file.read_record(&attrs, home), Err(Error::RecordNotFound(_))));
    let scan = file.scan(&attrs, "", CompOp::NoOp, None, &[]).unwrap();
    assert_eq!(scan.count(), 1);
}

/// Test a filtered, projected scan over many pages.
#[test]
fn test_scan_with_condition_and_projection() {
    let dir = tempdir().unwrap();
    let (_rfm, mut file) = open_file(&dir, "scan.db");
    let attrs = employee();

    for i in 0..300 {
        let salary = if i % 3 == 0 { None } else { Some(i) };
        file.insert_record(&attrs, &row(&"n".repeat(60), i, i as f32 / 10.0, salary))
            .unwrap();
    }

    let projected = vec![Attribute::int("salary"), Attribute::int("age")];
    let mut scan = file
        .scan(&attrs, "salary", CompOp::Lt, Some(&Value::Int(30)), &["salary", "age"])
        .unwrap();
    let mut ages = Vec::new();
    while let Some((_rid, tuple)) = scan.next_entry().unwrap() {
        let values = decode_tuple(&projected, &tuple).unwrap();
        assert_eq!(values[0], values[1]);
        if let Some(Value::Int(age)) = values[1] {
            ages.push(age);
        }
    }
    scan.close().unwrap();

    let expected: Vec<i32> = (0..30).filter(|i| i % 3 != 0).collect();
    assert_eq!(ages, expected);
}

/// Test the single-attribute read and the printable form.
#[test]
fn test_read_attribute_and_print() {
    let dir = tempdir().unwrap();
    let (rfm, mut file) = open_file(&dir, "print.db");
    let rid = file.insert_record(&employee(), &row("Tom", 25, 6.25, None)).unwrap();

    let mut expected = vec![0u8];
    expected.extend_from_slice(&6.25f32.to_le_bytes());
    assert_eq!(file.read_attribute(&employee(), rid, "height").unwrap(), expected);
    assert_eq!(file.read_attribute(&employee(), rid, "salary").unwrap(), vec![0x80]);

    let data = file.read_record(&employee(), rid).unwrap();
    assert_eq!(
        rfm.print_record(&employee(), &data).unwrap(),
        "name: Tom\tage: 25\theight: 6.25\tsalary: NULL"
    );
}

fn value_strategy() -> impl Strategy<Value = (Option<String>, Option<i32>, Option<f32>)> {
    (
        proptest::option::of("[a-z]{0,200}"),
        proptest::option::of(any::<i32>()),
        proptest::option::of(any::<f32>().prop_filter("finite", |f| f.is_finite())),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every inserted tuple reads back byte-identical, nulls included.
    #[test]
    fn prop_insert_read_round_trip(rows in prop::collection::vec(value_strategy(), 1..60)) {
        let dir = tempdir().unwrap();
        let (_rfm, mut file) = open_file(&dir, "prop.db");
        let attrs = vec![
            Attribute::varchar("s", 200),
            Attribute::int("i"),
            Attribute::real("r"),
        ];

        let mut stored = Vec::new();
        for (s, i, r) in rows {
            let data = encode_tuple(
                &attrs,
                &[s.map(Value::varchar), i.map(Value::Int), r.map(Value::Real)],
            )
            .unwrap();
            let rid = file.insert_record(&attrs, &data).unwrap();
            stored.push((rid, data));
        }

        for (rid, data) in &stored {
            prop_assert_eq!(&file.read_record(&attrs, *rid).unwrap(), data);
        }
    }
}
