use crate::consts::{FIELD_SIZE, FIELD_VALUE_SIZE};
use crate::errors::{MddError, Result};
use byteorder::{ByteOrder, LittleEndian as LE};
use std::io::{self, Read, Write};

/// Bytes needed to hold `bits` bits. Non-positive sizes need none.
#[inline]
pub fn byte_len(bits: i64) -> usize {
    if bits <= 0 { 0 } else { ((bits + 7) / 8) as usize }
}

/// Writes `v` as a little-endian u64 followed by zero padding up to `FIELD_SIZE`.
pub fn write_padded_u64<W: Write>(w: &mut W, v: u64) -> io::Result<()> {
    let mut field = [0u8; FIELD_SIZE];
    LE::write_u64(&mut field[..FIELD_VALUE_SIZE], v);
    w.write_all(&field)
}

/// Reads one padded header field, ignoring the padding bytes.
pub fn read_padded_u64<R: Read>(r: &mut R, field: &'static str) -> Result<u64> {
    let mut buf = [0u8; FIELD_SIZE];
    read_exact_or_truncated(r, &mut buf, field)?;
    Ok(LE::read_u64(&buf[..FIELD_VALUE_SIZE]))
}

pub fn read_exact_or_truncated<R: Read>(r: &mut R, buf: &mut [u8], field: &'static str) -> Result<()> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => MddError::Truncated { field },
        _ => MddError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn padded_field_layout() {
        let mut out = Vec::new();
        write_padded_u64(&mut out, 0x0102).unwrap();
        assert_eq!(out, [0x02, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn padding_is_ignored_on_read() {
        let mut raw = 28u64.to_le_bytes().to_vec();
        raw.extend_from_slice(&[0xAB; 8]);
        assert_eq!(read_padded_u64(&mut Cursor::new(raw), "size").unwrap(), 28);
    }

    #[test]
    fn byte_len_rounds_up() {
        assert_eq!(byte_len(-5), 0);
        assert_eq!(byte_len(0), 0);
        assert_eq!(byte_len(1), 1);
        assert_eq!(byte_len(8), 1);
        assert_eq!(byte_len(9), 2);
    }
}
