//! External tuple format.
//!
//! Callers hand records to the record store, and receive them back from
//! reads and scans, in this layout:
//!
//! ```text
//! ┌──────────────────────┬─────────┬─────────┬─────┐
//! │ null bitmap          │ field 0 │ field 1 │ ... │
//! │ ceil(n/8) bytes      │         │         │     │
//! └──────────────────────┴─────────┴─────────┴─────┘
//! ```
//!
//! Only non-null fields are present, each in the [`Value`] wire format.

use super::{Attribute, ByteCursor, Error, NullBitmap, Result, Value};

/// A tuple buffer split into its bitmap and raw field slices.
#[derive(Debug)]
pub(crate) struct TupleFields<'a> {
    /// `None` for null attributes, otherwise the encoded field bytes.
    pub fields: Vec<Option<&'a [u8]>>,
}

/// Split `data` into per-attribute field slices.
///
/// Bytes past the end of the last field are ignored, so callers may pass an
/// oversized buffer.
pub(crate) fn split_tuple<'a>(attrs: &[Attribute], data: &'a [u8]) -> Result<TupleFields<'a>> {
    let nulls = NullBitmap::from_bytes(attrs.len(), data)?;
    let mut cursor = ByteCursor::at(data, NullBitmap::byte_len(attrs.len()));
    let mut fields = Vec::with_capacity(attrs.len());

    for (i, attr) in attrs.iter().enumerate() {
        if nulls.is_null(i) {
            fields.push(None);
            continue;
        }
        let len = Value::peek_len(attr.attr_type, &cursor)?;
        fields.push(Some(cursor.read_bytes(len)?));
    }

    Ok(TupleFields { fields })
}

/// Encode `values` (one per attribute, `None` = NULL) as a tuple buffer.
///
/// # Errors
/// - `Error::MalformedTuple` if the value count differs from the attribute count
/// - `Error::TypeMismatch` if a value does not match its attribute's type
pub fn encode_tuple(attrs: &[Attribute], values: &[Option<Value>]) -> Result<Vec<u8>> {
    if attrs.len() != values.len() {
        return Err(Error::MalformedTuple(format!(
            "{} values for {} attributes",
            values.len(),
            attrs.len()
        )));
    }

    let mut nulls = NullBitmap::new(attrs.len());
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => v.check_type(attrs[i].attr_type)?,
            None => nulls.set_null(i),
        }
    }

    let mut out = nulls.as_bytes().to_vec();
    for value in values.iter().flatten() {
        value.encode_into(&mut out);
    }
    Ok(out)
}

/// Decode a tuple buffer into one optional value per attribute.
pub fn decode_tuple(attrs: &[Attribute], data: &[u8]) -> Result<Vec<Option<Value>>> {
    let split = split_tuple(attrs, data)?;
    attrs
        .iter()
        .zip(split.fields)
        .map(|(attr, field)| {
            field
                .map(|bytes| Value::from_bytes(attr.attr_type, bytes))
                .transpose()
        })
        .collect()
}

/// Render a tuple as `name: value` pairs separated by tabs.
///
/// NULL fields print as `NULL`.
pub fn format_tuple(attrs: &[Attribute], data: &[u8]) -> Result<String> {
    let values = decode_tuple(attrs, data)?;
    let parts: Vec<String> = attrs
        .iter()
        .zip(values)
        .map(|(attr, value)| match value {
            Some(v) => format!("{}: {}", attr.name, v),
            None => format!("{}: NULL", attr.name),
        })
        .collect();
    Ok(parts.join("\t"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> Vec<Attribute> {
        vec![
            Attribute::varchar("name", 30),
            Attribute::int("age"),
            Attribute::real("height"),
            Attribute::int("salary"),
        ]
    }

    #[test]
    fn test_encode_layout() {
        let data = encode_tuple(
            &attrs(),
            &[Some(Value::varchar("Tom")), None, Some(Value::Real(1.5)), Some(Value::Int(9))],
        )
        .unwrap();

        // bitmap: attribute 1 is null
        assert_eq!(data[0], 0x40);
        assert_eq!(&data[1..5], &3u32.to_le_bytes());
        assert_eq!(&data[5..8], b"Tom");
        assert_eq!(data.len(), 1 + 7 + 4 + 4);
    }

    #[test]
    fn test_decode_matches_encode() {
        let values = vec![None, Some(Value::Int(25)), Some(Value::Real(177.8)), None];
        let data = encode_tuple(&attrs(), &values).unwrap();
        assert_eq!(decode_tuple(&attrs(), &data).unwrap(), values);
    }

    #[test]
    fn test_split_ignores_trailing_bytes() {
        let mut data = encode_tuple(&[Attribute::int("a")], &[Some(Value::Int(1))]).unwrap();
        data.extend_from_slice(&[0xAA; 10]);
        let split = split_tuple(&[Attribute::int("a")], &data).unwrap();
        assert_eq!(split.fields, vec![Some(&1i32.to_le_bytes()[..])]);
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        assert!(matches!(
            encode_tuple(&attrs(), &[None]),
            Err(Error::MalformedTuple(_))
        ));
        assert!(matches!(
            encode_tuple(&[Attribute::int("a")], &[Some(Value::Real(1.0))]),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_truncated_tuple() {
        let data =
            encode_tuple(&attrs(), &[Some(Value::varchar("Tom")), None, None, None]).unwrap();
        assert!(split_tuple(&attrs(), &data[..4]).is_err());
    }

    #[test]
    fn test_format_tuple() {
        let data = encode_tuple(
            &attrs(),
            &[Some(Value::varchar("Tom")), Some(Value::Int(25)), None, Some(Value::Int(6200))],
        )
        .unwrap();
        assert_eq!(
            format_tuple(&attrs(), &data).unwrap(),
            "name: Tom\tage: 25\theight: NULL\tsalary: 6200"
        );
    }
}
