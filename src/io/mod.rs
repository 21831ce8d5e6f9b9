//! Binary persistence: little-endian readers/writers plus the TRACKDB and
//! TRACKMAP codecs.
//!
//! Format revision 1 fixes the on-disk word sizes: lengths and ids are
//! `u64`, reals are IEEE-754 `f64`, everything little-endian. A revision
//! byte follows each magic so future layouts can coexist.

pub mod map_codec;
pub mod track_codec;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Opens a file for reading, mapping a missing file to [`Error::NotFound`].
pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })
}

pub(crate) struct BinWriter<W: Write> {
    inner: W,
}

impl<W: Write> BinWriter<W> {
    pub fn new(inner: W) -> Self {
        BinWriter { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.inner.write_u8(v)?;
        Ok(())
    }

    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        self.inner.write_u64::<LE>(v)?;
        Ok(())
    }

    pub fn write_f64(&mut self, v: f64) -> Result<()> {
        self.inner.write_f64::<LE>(v)?;
        Ok(())
    }

    /// Length-prefixed UTF-8 string.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_u64(s.len() as u64)?;
        self.write_bytes(s.as_bytes())
    }

    /// Length-prefixed id list.
    pub fn write_ids(&mut self, ids: &[u64]) -> Result<()> {
        self.write_u64(ids.len() as u64)?;
        for &id in ids {
            self.write_u64(id)?;
        }
        Ok(())
    }
}

/// Upper bound for length prefixes; anything larger marks a corrupt file
/// rather than a huge allocation.
const MAX_LEN: u64 = u32::MAX as u64;

pub(crate) struct BinReader<R: Read> {
    inner: R,
}

impl<R: Read> BinReader<R> {
    pub fn new(inner: R) -> Self {
        BinReader { inner }
    }

    fn truncated(e: std::io::Error, what: &str) -> Error {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::Truncated(what.to_string())
        } else {
            Error::Io(e)
        }
    }

    /// Consumes and verifies a signature.
    pub fn expect_magic(&mut self, magic: &[u8], what: &str) -> Result<()> {
        let mut buf = vec![0u8; magic.len()];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| Self::truncated(e, what))?;
        if buf != magic {
            return Err(Error::BadMagic(what.to_string()));
        }
        Ok(())
    }

    pub fn read_u8(&mut self, what: &str) -> Result<u8> {
        self.inner.read_u8().map_err(|e| Self::truncated(e, what))
    }

    pub fn read_u64(&mut self, what: &str) -> Result<u64> {
        self.inner
            .read_u64::<LE>()
            .map_err(|e| Self::truncated(e, what))
    }

    pub fn read_f64(&mut self, what: &str) -> Result<f64> {
        self.inner
            .read_f64::<LE>()
            .map_err(|e| Self::truncated(e, what))
    }

    fn read_len(&mut self, what: &str) -> Result<usize> {
        let len = self.read_u64(what)?;
        if len > MAX_LEN {
            return Err(Error::Parse(format!("implausible length {len} in {what}")));
        }
        Ok(len as usize)
    }

    pub fn read_str(&mut self, what: &str) -> Result<String> {
        let len = self.read_len(what)?;
        let mut buf = vec![0u8; len];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| Self::truncated(e, what))?;
        String::from_utf8(buf).map_err(|e| Error::Parse(format!("bad string in {what}: {e}")))
    }

    pub fn read_ids(&mut self, what: &str) -> Result<Vec<u64>> {
        let len = self.read_len(what)?;
        let mut ids = Vec::with_capacity(len);
        for _ in 0..len {
            ids.push(self.read_u64(what)?);
        }
        Ok(ids)
    }
}
