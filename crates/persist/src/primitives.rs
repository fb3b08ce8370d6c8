//! Fixed-width little-endian read/write helpers.
//!
//! Every integer is a 4-byte `i32`, ore tags are a single `u8`, samples are
//! 4-byte IEEE-754 `f32`. The reader tracks its byte offset and names the
//! field it was reading in errors.

use std::io::{self, Read, Write};
use worldmap_common::Point;

use crate::error::PersistError;

pub(crate) struct ByteWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> ByteWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub(crate) fn bytes(&mut self, bytes: &[u8]) -> Result<(), PersistError> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    pub(crate) fn u8(&mut self, value: u8) -> Result<(), PersistError> {
        self.bytes(&[value])
    }

    pub(crate) fn i32(&mut self, value: i32) -> Result<(), PersistError> {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn f32(&mut self, value: f32) -> Result<(), PersistError> {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn point(&mut self, point: Point) -> Result<(), PersistError> {
        self.i32(point.x)?;
        self.i32(point.y)
    }

    /// Write a collection length as an `i32`.
    pub(crate) fn count(&mut self, len: usize, field: &'static str) -> Result<(), PersistError> {
        let value = i32::try_from(len).map_err(|_| PersistError::CountOverflow {
            field,
            len: len as u64,
        })?;
        self.i32(value)
    }

    /// A count followed by that many points.
    pub(crate) fn points(&mut self, points: &[Point], field: &'static str) -> Result<(), PersistError> {
        self.count(points.len(), field)?;
        for &p in points {
            self.point(p)?;
        }
        Ok(())
    }

    pub(crate) fn written(&self) -> u64 {
        self.written
    }
}

pub(crate) struct ByteReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> ByteReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Offset of the next byte to be read.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn array<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<[u8; N], PersistError> {
        let mut buf = [0u8; N];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => {
                self.offset += N as u64;
                Ok(buf)
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(PersistError::Truncated {
                offset: self.offset,
                field,
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn u8(&mut self, field: &'static str) -> Result<u8, PersistError> {
        Ok(self.array::<1>(field)?[0])
    }

    pub(crate) fn i32(&mut self, field: &'static str) -> Result<i32, PersistError> {
        Ok(i32::from_le_bytes(self.array(field)?))
    }

    pub(crate) fn f32(&mut self, field: &'static str) -> Result<f32, PersistError> {
        Ok(f32::from_le_bytes(self.array(field)?))
    }

    pub(crate) fn point(&mut self, field: &'static str) -> Result<Point, PersistError> {
        let x = self.i32(field)?;
        let y = self.i32(field)?;
        Ok(Point::new(x, y))
    }

    /// Read an `i32` length, rejecting negative values.
    pub(crate) fn count(&mut self, field: &'static str) -> Result<usize, PersistError> {
        let offset = self.offset;
        let value = self.i32(field)?;
        usize::try_from(value).map_err(|_| PersistError::NegativeCount {
            field,
            value,
            offset,
        })
    }

    /// A count followed by that many points.
    pub(crate) fn points(&mut self, field: &'static str) -> Result<Vec<Point>, PersistError> {
        let len = self.count(field)?;
        let mut points = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            points.push(self.point("point")?);
        }
        Ok(points)
    }

    /// Succeeds only if the source has no bytes left.
    pub(crate) fn expect_end(mut self) -> Result<(), PersistError> {
        let offset = self.offset;
        let extra = io::copy(&mut self.inner, &mut io::sink())?;
        if extra > 0 {
            return Err(PersistError::TrailingData { offset, extra });
        }
        Ok(())
    }
}

/// Upper bound on capacity reserved from an untrusted count.
pub(crate) const MAX_PREALLOC: usize = 4096;
