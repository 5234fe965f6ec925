//! Byte-order-aware cursors over raw payload buffers.
//!
//! The transcoder repositions these at arbitrary offsets while walking
//! interleaved attributes, so both cursors support absolute positioning and
//! every primitive access is bounds-checked.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

use crate::error::{Result, TranscodeError};
use crate::types::ByteOrder;

/// Bounds-checked reader over a borrowed payload.
pub struct EndianReader<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> EndianReader<'a> {
    pub fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    /// Move the cursor to an absolute byte offset.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Advance the cursor without reading.
    pub fn skip(&mut self, count: usize) {
        self.pos = self.pos.saturating_add(count);
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                TranscodeError::MalformedSource(format!(
                    "read of {count} bytes at offset {} past payload end ({} bytes)",
                    self.pos,
                    self.buf.len()
                ))
            })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(match self.order {
            ByteOrder::Little => LittleEndian::read_u16(bytes),
            ByteOrder::Big => BigEndian::read_u16(bytes),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(match self.order {
            ByteOrder::Little => LittleEndian::read_u32(bytes),
            ByteOrder::Big => BigEndian::read_u32(bytes),
        })
    }
}

/// Bounds-checked writer over a pre-sized output buffer.
pub struct EndianWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> EndianWriter<'a> {
    pub fn new(buf: &'a mut [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    /// Move the cursor to an absolute byte offset.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Advance the cursor without writing.
    pub fn skip(&mut self, count: usize) {
        self.pos = self.pos.saturating_add(count);
    }

    fn slot(&mut self, count: usize) -> Result<&mut [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                TranscodeError::MalformedSource(format!(
                    "write of {count} bytes at offset {} past buffer end ({} bytes)",
                    self.pos,
                    self.buf.len()
                ))
            })?;
        let slice = &mut self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.slot(1)?[0] = value;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        let order = self.order;
        let slot = self.slot(2)?;
        match order {
            ByteOrder::Little => LittleEndian::write_u16(slot, value),
            ByteOrder::Big => BigEndian::write_u16(slot, value),
        }
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        let order = self.order;
        let slot = self.slot(4)?;
        match order {
            ByteOrder::Little => LittleEndian::write_u32(slot, value),
            ByteOrder::Big => BigEndian::write_u32(slot, value),
        }
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_u32(value as u32)
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write_u32(value.to_bits())
    }
}
