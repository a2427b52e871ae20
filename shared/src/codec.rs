//! Cursor-based reader and writer for the binary wire format
//!
//! Integers above one byte use the varint scheme the server's bincode
//! configuration produces: values up to 250 are a single byte, 251 prefixes a
//! little-endian u16 and 252 prefixes a little-endian u32. Floats are
//! little-endian IEEE-754 singles; strings are a varint byte length followed
//! by UTF-8 bytes.

use thiserror::Error;

/// Marker byte announcing a two-byte varint payload.
pub const VARINT_U16: u8 = 251;
/// Marker byte announcing a four-byte varint payload.
pub const VARINT_U32: u8 = 252;

/// Largest value that fits in a single varint byte.
const VARINT_SINGLE_MAX: u32 = 250;

/// A packet could not be decoded. The connection is out of sync once this happens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty packet")]
    EmptyPacket,
    #[error("read of {needed} byte(s) at offset {offset} overruns packet of {len} bytes")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("no handler for opcode {0}")]
    UnknownOpcode(u8),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Reads the payload of an inbound packet. Byte 0 is the opcode and is skipped.
#[derive(Debug, Clone)]
pub struct PacketDecoder<'a> {
    buf: &'a [u8],
    off: usize,
}

impl<'a> PacketDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, off: 1 }
    }

    pub fn opcode(&self) -> Option<u8> {
        self.buf.first().copied()
    }

    /// Rewinds to the first payload byte.
    pub fn reset(&mut self) {
        self.off = 1;
    }

    pub fn offset(&self) -> usize {
        self.off
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.off)
    }

    fn take(&mut self, needed: usize) -> DecodeResult<&'a [u8]> {
        let end = self
            .off
            .checked_add(needed)
            .filter(|end| *end <= self.buf.len())
            .ok_or(DecodeError::UnexpectedEof {
                offset: self.off,
                needed,
                len: self.buf.len(),
            })?;

        let bytes = &self.buf[self.off..end];
        self.off = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn get_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn get_bool(&mut self) -> DecodeResult<bool> {
        Ok(self.get_u8()? != 0)
    }

    pub fn get_f32(&mut self) -> DecodeResult<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    pub fn get_varint(&mut self) -> DecodeResult<u32> {
        match self.get_u8()? {
            VARINT_U16 => Ok(u16::from_le_bytes(self.take_array()?) as u32),
            VARINT_U32 => Ok(u32::from_le_bytes(self.take_array()?)),
            byte => Ok(byte as u32),
        }
    }

    /// Invalid UTF-8 sequences are replaced rather than rejected; names are
    /// cleaned up for display anyway.
    pub fn get_string(&mut self) -> DecodeResult<String> {
        let len = self.get_varint()? as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Builds an outbound packet, opcode first.
#[derive(Debug, Clone, Default)]
pub struct PacketEncoder {
    buf: Vec<u8>,
}

impl PacketEncoder {
    pub fn new(opcode: u8) -> Self {
        Self::with_capacity(opcode, 16)
    }

    pub fn with_capacity(opcode: u8, capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity.max(1));
        buf.push(opcode);
        Self { buf }
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.put_u8(value as u8)
    }

    pub fn put_f32(&mut self, value: f32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Shortest varint form of `value`.
    pub fn put_varint(&mut self, value: u32) -> &mut Self {
        if value <= VARINT_SINGLE_MAX {
            self.put_u8(value as u8)
        } else if let Ok(short) = u16::try_from(value) {
            self.put_u8(VARINT_U16);
            self.buf.extend_from_slice(&short.to_le_bytes());
            self
        } else {
            self.put_fixed_varint(value)
        }
    }

    /// Four-byte varint form regardless of magnitude, so the field has a fixed offset.
    pub fn put_fixed_varint(&mut self, value: u32) -> &mut Self {
        self.put_u8(VARINT_U32).put_u32(value)
    }

    pub fn put_string(&mut self, value: &str) -> &mut Self {
        self.put_varint(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use bincode::Options;

    fn varint_packet(value: u32) -> Vec<u8> {
        let mut encoder = PacketEncoder::new(3);
        encoder.put_varint(value);
        encoder.finish()
    }

    #[test]
    fn test_decoder_skips_opcode() {
        let packet = [42u8, 7, 9];
        let mut decoder = PacketDecoder::new(&packet);
        assert_eq!(decoder.opcode(), Some(42));
        assert_eq!(decoder.get_u8().unwrap(), 7);
        assert_eq!(decoder.get_u8().unwrap(), 9);
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_decoder_reset_rewinds_to_payload() {
        let packet = [1u8, 5, 6];
        let mut decoder = PacketDecoder::new(&packet);
        decoder.get_u8().unwrap();
        decoder.get_u8().unwrap();
        decoder.reset();
        assert_eq!(decoder.offset(), 1);
        assert_eq!(decoder.get_u8().unwrap(), 5);
    }

    #[test]
    fn test_varint_boundaries() {
        for value in [0u32, 1, 250, 251, 65_535, 65_536, u32::MAX] {
            let packet = varint_packet(value);
            let mut decoder = PacketDecoder::new(&packet);
            assert_eq!(decoder.get_varint().unwrap(), value, "value {}", value);
            assert_eq!(decoder.remaining(), 0);
        }
    }

    #[test]
    fn test_varint_encoded_sizes() {
        assert_eq!(varint_packet(250).len(), 2);
        assert_eq!(varint_packet(251), vec![3, VARINT_U16, 251, 0]);
        assert_eq!(varint_packet(65_535), vec![3, VARINT_U16, 255, 255]);
        assert_eq!(varint_packet(65_536), vec![3, VARINT_U32, 0, 0, 1, 0]);
    }

    #[test]
    fn test_varint_matches_bincode_default_options() {
        let options = bincode::DefaultOptions::new();
        for value in [0u32, 17, 250, 251, 1_000, 65_535, 65_536, 3_000_000, u32::MAX] {
            let expected = options.serialize(&value).unwrap();
            assert_eq!(&varint_packet(value)[1..], expected.as_slice());
        }
    }

    #[test]
    fn test_fixed_varint_decodes_as_varint() {
        let mut encoder = PacketEncoder::new(0);
        encoder.put_fixed_varint(5);
        let packet = encoder.finish();
        assert_eq!(packet, vec![0, VARINT_U32, 5, 0, 0, 0]);

        let mut decoder = PacketDecoder::new(&packet);
        assert_eq!(decoder.get_varint().unwrap(), 5);
    }

    #[test]
    fn test_f32_little_endian() {
        let mut encoder = PacketEncoder::new(0);
        encoder.put_f32(1.5).put_f32(-0.25);
        let packet = encoder.finish();
        assert_eq!(&packet[1..5], &1.5f32.to_le_bytes());

        let mut decoder = PacketDecoder::new(&packet);
        assert_approx_eq!(decoder.get_f32().unwrap(), 1.5, 1e-6);
        assert_approx_eq!(decoder.get_f32().unwrap(), -0.25, 1e-6);
    }

    #[test]
    fn test_string_roundtrip_and_bincode_layout() {
        let mut encoder = PacketEncoder::new(0);
        encoder.put_string("héllo");
        let packet = encoder.finish();

        let expected = bincode::DefaultOptions::new().serialize("héllo").unwrap();
        assert_eq!(&packet[1..], expected.as_slice());

        let mut decoder = PacketDecoder::new(&packet);
        assert_eq!(decoder.get_string().unwrap(), "héllo");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let packet = [0u8, 2, 0xff, b'a'];
        let mut decoder = PacketDecoder::new(&packet);
        assert_eq!(decoder.get_string().unwrap(), "\u{fffd}a");
    }

    #[test]
    fn test_read_past_end_is_an_error() {
        let packet = [3u8, 1, 2];
        let mut decoder = PacketDecoder::new(&packet);
        assert_eq!(
            decoder.get_f32(),
            Err(DecodeError::UnexpectedEof {
                offset: 1,
                needed: 4,
                len: 3
            })
        );
    }

    #[test]
    fn test_truncated_varint_is_an_error() {
        let packet = [3u8, VARINT_U32, 1, 2];
        let mut decoder = PacketDecoder::new(&packet);
        assert!(matches!(
            decoder.get_varint(),
            Err(DecodeError::UnexpectedEof { needed: 4, .. })
        ));
    }

    #[test]
    fn test_truncated_string_is_an_error() {
        let packet = [3u8, 10, b'a', b'b'];
        let mut decoder = PacketDecoder::new(&packet);
        assert!(decoder.get_string().is_err());
    }
}
