//! Sequential record scan.

use crate::common::{Attribute, CompOp, PageId, Result, Rid, ScanIterator, Value};
use crate::record::record_format::{is_forwarded, project_record, record_field};
use crate::record::record_page::{RecordPage, Slot};
use crate::record::RecordFile;

/// Single-attribute filter: attribute position, operator, comparison value.
pub(crate) type Condition = (usize, CompOp, Option<Value>);

/// Forward cursor over every record of a [`RecordFile`], page by page and
/// slot by slot.
///
/// Relocated records are yielded once, under their home [`Rid`]. The scan
/// holds the file mutably, so the file cannot change underneath it.
pub struct RecordScan<'a> {
    file: &'a mut RecordFile,
    attrs: Vec<Attribute>,
    condition: Option<Condition>,
    projection: Vec<usize>,
    page_num: u32,
    slot_num: usize,
    current: Option<RecordPage>,
    exhausted: bool,
}

impl<'a> RecordScan<'a> {
    pub(crate) fn new(
        file: &'a mut RecordFile,
        attrs: Vec<Attribute>,
        condition: Option<Condition>,
        projection: Vec<usize>,
    ) -> Self {
        Self {
            file,
            attrs,
            condition,
            projection,
            page_num: 0,
            slot_num: 0,
            current: None,
            exhausted: false,
        }
    }

    fn load_next_page(&mut self) -> Result<()> {
        if self.page_num >= self.file.page_count() {
            self.exhausted = true;
            return Ok(());
        }
        self.current = Some(self.file.load(PageId::new(self.page_num))?);
        self.slot_num = 0;
        Ok(())
    }

    fn matches(&self, record: &[u8]) -> Result<bool> {
        let Some((position, op, value)) = &self.condition else {
            return Ok(true);
        };
        let Some(value) = value else {
            return Ok(false);
        };
        let Some(field) = record_field(&self.attrs, record, *position)? else {
            return Ok(false);
        };
        let actual = Value::from_bytes(self.attrs[*position].attr_type, field)?;
        Ok(actual.satisfies(*op, value))
    }

    fn advance(&mut self) -> Result<Option<(Rid, Vec<u8>)>> {
        while !self.exhausted {
            let Some(page) = &self.current else {
                self.load_next_page()?;
                continue;
            };
            if self.slot_num >= page.slot_count() {
                self.current = None;
                self.page_num += 1;
                continue;
            }

            let rid = Rid::new(self.page_num, self.slot_num as u32);
            let slot = page.slot(self.slot_num)?;
            self.slot_num += 1;

            let record = match slot {
                Slot::Free => continue,
                Slot::Live { offset, len } => {
                    let bytes = page.record_bytes(offset, len);
                    if is_forwarded(bytes) {
                        continue;
                    }
                    bytes.to_vec()
                }
                Slot::Tombstone { target, .. } => self.file.locate(target)?.bytes().to_vec(),
            };

            if self.matches(&record)? {
                let tuple = project_record(&self.attrs, &record, &self.projection)?;
                return Ok(Some((rid, tuple)));
            }
        }
        Ok(None)
    }
}

impl ScanIterator for RecordScan<'_> {
    fn next_entry(&mut self) -> Result<Option<(Rid, Vec<u8>)>> {
        let next = self.advance();
        if next.is_err() {
            self.exhausted = true;
        }
        next
    }

    fn close(&mut self) -> Result<()> {
        self.exhausted = true;
        self.current = None;
        Ok(())
    }
}

impl Iterator for RecordScan<'_> {
    type Item = Result<(Rid, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

#[cfg(test)]
mod tests {
    use crate::common::tuple::encode_tuple;
    use crate::common::{Attribute, CompOp, Error, Rid, ScanIterator, Value};
    use crate::record::{RecordFile, RecordFileManager};
    use tempfile::tempdir;

    fn attrs() -> Vec<Attribute> {
        vec![
            Attribute::varchar("name", 2000),
            Attribute::int("age"),
            Attribute::real("height"),
        ]
    }

    fn person(name: &str, age: Option<i32>, height: f32) -> Vec<u8> {
        encode_tuple(
            &attrs(),
            &[
                Some(Value::varchar(name)),
                age.map(Value::Int),
                Some(Value::Real(height)),
            ],
        )
        .unwrap()
    }

    fn populated(dir: &tempfile::TempDir) -> (RecordFile, Vec<Rid>) {
        let rfm = RecordFileManager::new();
        let path = dir.path().join("scan.db");
        rfm.create_file(&path).unwrap();
        let mut file = rfm.open_file(&path).unwrap();

        let rids = vec![
            file.insert_record(&attrs(), &person("ann", Some(20), 1.5)).unwrap(),
            file.insert_record(&attrs(), &person("bob", Some(35), 1.8)).unwrap(),
            file.insert_record(&attrs(), &person("cat", None, 1.6)).unwrap(),
            file.insert_record(&attrs(), &person("dan", Some(50), 1.7)).unwrap(),
        ];
        (file, rids)
    }

    fn collect(
        scan: impl Iterator<Item = crate::common::Result<(Rid, Vec<u8>)>>,
    ) -> Vec<(Rid, Vec<u8>)> {
        scan.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_unconditional_scan_yields_all() {
        let dir = tempdir().unwrap();
        let (mut file, rids) = populated(&dir);

        let scan = file.scan(&attrs(), "", CompOp::NoOp, None, &["name"]).unwrap();
        let results = collect(scan);
        let got: Vec<Rid> = results.iter().map(|(rid, _)| *rid).collect();
        assert_eq!(got, rids);

        let mut expected = vec![0u8];
        expected.extend_from_slice(&Value::varchar("ann").to_bytes());
        assert_eq!(results[0].1, expected);
    }

    #[test]
    fn test_condition_skips_nulls() {
        let dir = tempdir().unwrap();
        let (mut file, rids) = populated(&dir);

        let scan = file
            .scan(&attrs(), "age", CompOp::Ne, Some(&Value::Int(35)), &["age"])
            .unwrap();
        let got: Vec<Rid> = collect(scan).into_iter().map(|(rid, _)| rid).collect();
        assert_eq!(got, vec![rids[0], rids[3]]);

        let scan = file
            .scan(&attrs(), "height", CompOp::Ge, Some(&Value::Real(1.7)), &[])
            .unwrap();
        let got: Vec<(Rid, Vec<u8>)> = collect(scan);
        assert_eq!(got, vec![(rids[1], vec![]), (rids[3], vec![])]);
    }

    #[test]
    fn test_projection_of_null() {
        let dir = tempdir().unwrap();
        let (mut file, rids) = populated(&dir);

        let mut scan = file
            .scan(&attrs(), "name", CompOp::Eq, Some(&Value::varchar("cat")), &["age", "name"])
            .unwrap();
        let (rid, tuple) = scan.next_entry().unwrap().unwrap();
        assert_eq!(rid, rids[2]);
        assert_eq!(tuple[0], 0x80);
        assert_eq!(&tuple[1..], Value::varchar("cat").to_bytes().as_slice());
        assert!(scan.next_entry().unwrap().is_none());
        assert!(scan.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_scan_skips_deleted_and_reports_relocated_once() {
        let dir = tempdir().unwrap();
        let (mut file, rids) = populated(&dir);
        file.delete_record(rids[1]).unwrap();
        file.insert_record(&attrs(), &person(&"p".repeat(1950), Some(1), 0.0)).unwrap();
        file.insert_record(&attrs(), &person(&"p".repeat(1950), Some(2), 0.0)).unwrap();
        // Forces ann onto a new page behind a tombstone
        file.update_record(&attrs(), rids[0], &person(&"a".repeat(1500), Some(21), 1.5))
            .unwrap();

        let scan = file
            .scan(&attrs(), "age", CompOp::Gt, Some(&Value::Int(20)), &["age"])
            .unwrap();
        let got: Vec<Rid> = collect(scan).into_iter().map(|(rid, _)| rid).collect();
        assert!(got.contains(&rids[0]));
        assert!(!got.contains(&rids[1]));
        assert_eq!(got.iter().filter(|rid| **rid == rids[0]).count(), 1);
        assert_eq!(got.len(), 2); // ann (via tombstone) and dan
    }

    #[test]
    fn test_close_ends_scan() {
        let dir = tempdir().unwrap();
        let (mut file, _) = populated(&dir);
        let mut scan = file.scan(&attrs(), "", CompOp::NoOp, None, &[]).unwrap();
        assert!(scan.next_entry().unwrap().is_some());
        scan.close().unwrap();
        assert!(scan.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_missing_value_matches_nothing() {
        let dir = tempdir().unwrap();
        let (mut file, _) = populated(&dir);
        let mut scan = file.scan(&attrs(), "age", CompOp::Eq, None, &[]).unwrap();
        assert!(scan.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_bad_scan_arguments() {
        let dir = tempdir().unwrap();
        let (mut file, _) = populated(&dir);
        assert!(matches!(
            file.scan(&attrs(), "weight", CompOp::Eq, Some(&Value::Int(1)), &[]),
            Err(Error::AttributeNotFound(_))
        ));
        assert!(matches!(
            file.scan(&attrs(), "age", CompOp::Eq, Some(&Value::varchar("x")), &[]),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            file.scan(&attrs(), "", CompOp::NoOp, None, &["weight"]),
            Err(Error::AttributeNotFound(_))
        ));
    }
}
