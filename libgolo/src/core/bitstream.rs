//! Bit-level I/O over byte sinks and sources.
//!
//! Bits are packed MSB-first within each byte, and multi-bit fields are
//! written most significant bit first, so a writer/reader pair over the same
//! bytes is exactly symmetric: any sequence of `(value, width)` writes reads
//! back unchanged with the same widths.

use std::io::{Read, Write};

use crate::error::{CodecError, CodecResult};

/// Maximum width of a single `write_bits`/`read_bits` field.
pub const MAX_FIELD_BITS: u32 = 64;

/// Bit-level writer over a byte sink.
///
/// The trailing partial byte is zero-padded when the writer is finished.
pub struct BitWriter<W: Write> {
    sink: W,
    current: u8,
    filled: u8,
}

impl<W: Write> BitWriter<W> {
    pub fn new(sink: W) -> Self {
        BitWriter {
            sink,
            current: 0,
            filled: 0,
        }
    }

    /// Append a single bit, high-order position first within the byte.
    pub fn write_bit(&mut self, bit: u8) -> CodecResult<()> {
        if bit != 0 {
            self.current |= 1 << (7 - self.filled);
        }
        self.filled += 1;
        if self.filled == 8 {
            self.sink.write_all(&[self.current])?;
            self.current = 0;
            self.filled = 0;
        }
        Ok(())
    }

    /// Write the `count` least-significant bits of `value`, most significant
    /// bit first. `count` must be in `1..=64` and `value` must fit in it.
    pub fn write_bits(&mut self, value: u64, count: u32) -> CodecResult<()> {
        if count == 0 || count > MAX_FIELD_BITS {
            return Err(CodecError::InvalidParameter(format!(
                "bit field width {count} out of range 1..=64"
            )));
        }
        if count < MAX_FIELD_BITS && value >> count != 0 {
            return Err(CodecError::InvalidParameter(format!(
                "value {value} does not fit in {count} bits"
            )));
        }
        for i in (0..count).rev() {
            self.write_bit(((value >> i) & 1) as u8)?;
        }
        Ok(())
    }

    /// Zero-pad the trailing byte, flush, and return the sink.
    pub fn finish(mut self) -> CodecResult<W> {
        if self.filled > 0 {
            self.sink.write_all(&[self.current])?;
        }
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Bit-level reader over a byte source.
///
/// Reading past the end of the source yields `None` from [`read_bit`] and
/// zero-filled bits from [`read_bits`]; [`hit_eof`] reports whether the end
/// was reached.
///
/// [`read_bit`]: BitReader::read_bit
/// [`read_bits`]: BitReader::read_bits
/// [`hit_eof`]: BitReader::hit_eof
pub struct BitReader<R: Read> {
    source: R,
    current: u8,
    remaining: u8,
    eof: bool,
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R) -> Self {
        BitReader {
            source,
            current: 0,
            remaining: 0,
            eof: false,
        }
    }

    /// Read one bit. Returns `None` once the source is exhausted.
    pub fn read_bit(&mut self) -> CodecResult<Option<u8>> {
        if self.remaining == 0 {
            if self.eof {
                return Ok(None);
            }
            let mut byte = [0u8; 1];
            let mut read = 0;
            while read == 0 {
                match self.source.read(&mut byte) {
                    Ok(0) => {
                        self.eof = true;
                        return Ok(None);
                    }
                    Ok(n) => read = n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            self.current = byte[0];
            self.remaining = 8;
        }
        let bit = (self.current >> (self.remaining - 1)) & 1;
        self.remaining -= 1;
        Ok(Some(bit))
    }

    /// Read `count` bits (MSB first) into the low end of the result.
    ///
    /// Bits past the end of the source read as zero; check [`hit_eof`] when
    /// short reads matter.
    ///
    /// [`hit_eof`]: BitReader::hit_eof
    pub fn read_bits(&mut self, count: u32) -> CodecResult<u64> {
        if count == 0 || count > MAX_FIELD_BITS {
            return Err(CodecError::InvalidParameter(format!(
                "bit field width {count} out of range 1..=64"
            )));
        }
        let mut value = 0u64;
        for _ in 0..count {
            let bit = self.read_bit()?.unwrap_or(0);
            value = (value << 1) | bit as u64;
        }
        Ok(value)
    }

    /// True once a read has gone past the end of the source.
    pub fn hit_eof(&self) -> bool {
        self.eof
    }
}
