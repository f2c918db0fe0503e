//! On-page record format.
//!
//! ```text
//! ┌────────┬────────┬─────┬────────┬─────────┬─────────┬─────┐
//! │ end[0] │ end[1] │ ... │ end[n] │ field 0 │ field 1 │ ... │
//! └────────┴────────┴─────┴────────┴─────────┴─────────┴─────┘
//!  (n + 1) u32 offsets, relative to record start
//! ```
//!
//! `end[0]` is the end of the offset array (where field 0 starts) and
//! `end[i + 1]` is where field `i` ends. Field `i` is NULL iff
//! `end[i + 1] == end[i]`; non-null fields keep their wire format, so an
//! empty string still occupies its 4-byte length prefix.
//!
//! The high bit of `end[0]` marks a record that was relocated here by an
//! update. Its slot is not the record's address (the tombstone at home is),
//! so sequential scans skip it.
//!
//! Records shorter than [`TOMBSTONE_SIZE`] are zero-padded.

use crate::common::config::{MAX_RECORD_SIZE, TOMBSTONE_SIZE, WORD_SIZE};
use crate::common::tuple::split_tuple;
use crate::common::{Attribute, ByteCursor, Error, NullBitmap, Result};

const FORWARDED_FLAG: u32 = 1 << 31;

/// Serialize an external-format tuple into an on-page record.
///
/// # Errors
/// - `Error::MalformedTuple` if `data` is truncated
/// - `Error::RecordTooLarge` if the record cannot fit on an empty page
pub(crate) fn encode_record(attrs: &[Attribute], data: &[u8]) -> Result<Vec<u8>> {
    let split = split_tuple(attrs, data)?;
    let header_len = (attrs.len() + 1) * WORD_SIZE;

    let mut ends = Vec::with_capacity(attrs.len() + 1);
    let mut body = Vec::new();
    ends.push(header_len as u32);
    for field in &split.fields {
        if let Some(bytes) = field {
            body.extend_from_slice(bytes);
        }
        ends.push((header_len + body.len()) as u32);
    }

    let mut record = Vec::with_capacity((header_len + body.len()).max(TOMBSTONE_SIZE));
    for end in ends {
        record.extend_from_slice(&end.to_le_bytes());
    }
    record.extend_from_slice(&body);
    if record.len() < TOMBSTONE_SIZE {
        record.resize(TOMBSTONE_SIZE, 0);
    }

    if record.len() > MAX_RECORD_SIZE {
        return Err(Error::RecordTooLarge {
            size: record.len(),
            max: MAX_RECORD_SIZE,
        });
    }
    Ok(record)
}

/// Field-end offsets of a record, with the forwarded flag stripped.
fn field_ends(attr_count: usize, record: &[u8]) -> Result<Vec<usize>> {
    let mut cursor = ByteCursor::new(record);
    let mut ends = Vec::with_capacity(attr_count + 1);
    for i in 0..=attr_count {
        let mut end = cursor.read_u32()?;
        if i == 0 {
            end &= !FORWARDED_FLAG;
        }
        ends.push(end as usize);
    }

    let in_order = ends.windows(2).all(|w| w[0] <= w[1]);
    if !in_order || ends[attr_count] > record.len() {
        return Err(Error::MalformedTuple(
            "record field offsets are out of order or past the record end".to_string(),
        ));
    }
    Ok(ends)
}

/// Bytes of field `index`, or `None` if it is NULL.
pub(crate) fn record_field<'a>(
    attrs: &[Attribute],
    record: &'a [u8],
    index: usize,
) -> Result<Option<&'a [u8]>> {
    let ends = field_ends(attrs.len(), record)?;
    let (start, end) = (ends[index], ends[index + 1]);
    Ok((end > start).then(|| &record[start..end]))
}

/// Build an external-format tuple holding the attributes at `positions`
/// (in that order) of an on-page record.
pub(crate) fn project_record(
    attrs: &[Attribute],
    record: &[u8],
    positions: &[usize],
) -> Result<Vec<u8>> {
    let ends = field_ends(attrs.len(), record)?;
    let mut nulls = NullBitmap::new(positions.len());
    let mut body = Vec::new();

    for (out_index, &pos) in positions.iter().enumerate() {
        let (start, end) = (ends[pos], ends[pos + 1]);
        if end == start {
            nulls.set_null(out_index);
        } else {
            body.extend_from_slice(&record[start..end]);
        }
    }

    let mut out = nulls.as_bytes().to_vec();
    out.extend_from_slice(&body);
    Ok(out)
}

/// Convert an on-page record back to the external tuple format.
pub(crate) fn decode_record(attrs: &[Attribute], record: &[u8]) -> Result<Vec<u8>> {
    let all: Vec<usize> = (0..attrs.len()).collect();
    project_record(attrs, record, &all)
}

pub(crate) fn is_forwarded(record: &[u8]) -> bool {
    record.len() >= WORD_SIZE
        && u32::from_le_bytes([record[0], record[1], record[2], record[3]]) & FORWARDED_FLAG != 0
}

pub(crate) fn mark_forwarded(record: &mut [u8]) {
    record[3] |= (FORWARDED_FLAG >> 24) as u8;
}
