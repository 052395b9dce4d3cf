//! Tiny protobuf subset: varint (wire type 0) and length-delimited
//! (wire type 2) fields. Enough to read and write ledger account ids and
//! their alias keys; anything else is rejected.

use crate::{Error, Result};

const WIRE_VARINT: u8 = 0;
const WIRE_LEN: u8 = 2;

/// Longest varint a `u64` can need.
const MAX_VARINT_LEN: usize = 10;

const fn tag(field: u8, wire: u8) -> u8 {
    (field << 3) | wire
}

pub(crate) fn put_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Field numbers used here are all < 16, so the tag is always one byte.
pub(crate) fn put_uint64(out: &mut Vec<u8>, field: u8, value: u64) {
    out.push(tag(field, WIRE_VARINT));
    put_varint(out, value);
}

pub(crate) fn put_bytes(out: &mut Vec<u8>, field: u8, value: &[u8]) {
    out.push(tag(field, WIRE_LEN));
    put_varint(out, value.len() as u64);
    out.extend_from_slice(value);
}

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Value<'a> {
    Varint(u64),
    Bytes(&'a [u8]),
}

/// Streaming field reader over a protobuf message.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = *self
                .buf
                .get(self.pos)
                .ok_or(Error::BadProto("truncated varint"))?;
            self.pos += 1;

            let bits = u64::from(byte & 0x7f);
            if i == MAX_VARINT_LEN - 1 && bits > 1 {
                return Err(Error::BadProto("varint overflows u64"));
            }
            value |= bits << (7 * i);

            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(Error::BadProto("varint too long"))
    }

    /// Next `(field number, value)`, or `None` at the end of the message.
    pub(crate) fn next_field(&mut self) -> Result<Option<(u64, Value<'a>)>> {
        if self.pos == self.buf.len() {
            return Ok(None);
        }

        let key = self.varint()?;
        let field = key >> 3;
        if field == 0 {
            return Err(Error::BadProto("field number zero"));
        }

        let value = match (key & 0x07) as u8 {
            WIRE_VARINT => Value::Varint(self.varint()?),
            WIRE_LEN => {
                let len = usize::try_from(self.varint()?)
                    .map_err(|_| Error::BadProto("length overflows usize"))?;
                let end = self
                    .pos
                    .checked_add(len)
                    .filter(|end| *end <= self.buf.len())
                    .ok_or(Error::BadProto("length exceeds payload"))?;
                let bytes = &self.buf[self.pos..end];
                self.pos = end;
                Value::Bytes(bytes)
            }
            _ => return Err(Error::BadProto("unsupported wire type")),
        };

        Ok(Some((field, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_encoding() {
        let mut out = Vec::new();
        put_varint(&mut out, 1040);
        assert_eq!(out, vec![0x90, 0x08]);

        let mut out = Vec::new();
        put_varint(&mut out, u64::MAX);
        assert_eq!(out.len(), MAX_VARINT_LEN);
        let mut reader = Reader::new(&out);
        assert_eq!(reader.varint().unwrap(), u64::MAX);
    }

    #[test]
    fn reads_mixed_fields() {
        let mut out = Vec::new();
        put_uint64(&mut out, 1, 50);
        put_bytes(&mut out, 4, b"abc");

        let mut reader = Reader::new(&out);
        assert_eq!(reader.next_field().unwrap(), Some((1, Value::Varint(50))));
        assert_eq!(reader.next_field().unwrap(), Some((4, Value::Bytes(b"abc"))));
        assert_eq!(reader.next_field().unwrap(), None);
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let mut reader = Reader::new(&[0x22, 0x05, 0x01]);
        assert!(matches!(reader.next_field(), Err(Error::BadProto(_))));

        let mut reader = Reader::new(&[0x08, 0x80]);
        assert!(matches!(reader.next_field(), Err(Error::BadProto(_))));
    }

    #[test]
    fn fixed_width_wire_types_are_rejected() {
        // field 1, wire type 1 (fixed64)
        let mut reader = Reader::new(&[0x09, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(reader.next_field(), Err(Error::BadProto(_))));
    }
}
