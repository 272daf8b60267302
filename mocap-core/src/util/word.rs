use crate::error::{MocapError, Result};
use std::io::{Read, Seek, SeekFrom};

pub const SIZE_8_BIT: usize = 1;
pub const SIZE_16_BIT: usize = 2;
pub const SIZE_32_BIT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endian::Little
        } else {
            Endian::Big
        }
    }

    fn opposite(self) -> Self {
        match self {
            Endian::Little => Endian::Big,
            Endian::Big => Endian::Little,
        }
    }
}

/// Whether multi-byte words must be byte-swapped relative to the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EndianFlag {
    #[default]
    Same,
    Different,
}

impl EndianFlag {
    pub fn between(file: Endian, host: Endian) -> Self {
        if file == host {
            EndianFlag::Same
        } else {
            EndianFlag::Different
        }
    }

    pub fn for_file(file: Endian) -> Self {
        Self::between(file, Endian::native())
    }

    /// Byte order the raw stream is interpreted in under this flag.
    pub fn effective(self) -> Endian {
        match self {
            EndianFlag::Same => Endian::native(),
            EndianFlag::Different => Endian::native().opposite(),
        }
    }
}

/// Fixed-width primitive that can be assembled from raw bytes.
pub trait Word: Copy {
    const SIZE: usize;
    fn from_le_slice(buf: &[u8]) -> Self;
    fn from_be_slice(buf: &[u8]) -> Self;
}

macro_rules! impl_word {
    ($($t:ty),*) => {
        $(
            impl Word for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn from_le_slice(buf: &[u8]) -> Self {
                    let mut a = [0u8; std::mem::size_of::<$t>()];
                    a.copy_from_slice(buf);
                    <$t>::from_le_bytes(a)
                }

                fn from_be_slice(buf: &[u8]) -> Self {
                    let mut a = [0u8; std::mem::size_of::<$t>()];
                    a.copy_from_slice(buf);
                    <$t>::from_be_bytes(a)
                }
            }
        )*
    };
}

impl_word!(u8, i8, u16, i16, u32, i32, f32);

/// Endian-aware primitive reader over any byte stream.
///
/// A word of `bytes` raw bytes lands in the low-order bytes of the target
/// type and the remaining high bytes are zero. Running out of input inside a
/// word is a `Corrupt` error rather than a partially written value.
pub struct WordReader<R> {
    inner: R,
    flag: EndianFlag,
    pos: u64,
}

impl<R: Read> WordReader<R> {
    pub fn new(inner: R, flag: EndianFlag) -> Self {
        Self {
            inner,
            flag,
            pos: 0,
        }
    }

    pub fn flag(&self) -> EndianFlag {
        self.flag
    }

    pub fn set_flag(&mut self, flag: EndianFlag) {
        self.flag = flag;
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_raw(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(MocapError::Corrupt(format!(
                    "unexpected end of stream reading {} bytes at offset {}",
                    buf.len(),
                    self.pos
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read `bytes` bytes in host order, no reordering.
    pub fn read_word<T: Word>(&mut self, bytes: usize) -> Result<T> {
        self.read_word_as(bytes, EndianFlag::Same)
    }

    /// Read `bytes` bytes, swapping multi-byte words when the flag says so.
    pub fn read_word_with_endian<T: Word>(&mut self, bytes: usize) -> Result<T> {
        self.read_word_as(bytes, self.flag)
    }

    fn read_word_as<T: Word>(&mut self, bytes: usize, flag: EndianFlag) -> Result<T> {
        debug_assert!(bytes >= 1 && bytes <= T::SIZE);
        let bytes = bytes.clamp(1, T::SIZE);
        let mut raw = [0u8; 8];
        self.read_raw(&mut raw[..bytes])?;

        let mut word = [0u8; 8];
        let word = &mut word[..T::SIZE];
        match flag.effective() {
            Endian::Little => {
                word[..bytes].copy_from_slice(&raw[..bytes]);
                Ok(T::from_le_slice(word))
            }
            Endian::Big => {
                word[T::SIZE - bytes..].copy_from_slice(&raw[..bytes]);
                Ok(T::from_be_slice(word))
            }
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_word_with_endian(SIZE_8_BIT)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_word_with_endian(SIZE_8_BIT)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_word_with_endian(SIZE_16_BIT)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_word_with_endian(SIZE_16_BIT)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_word_with_endian(SIZE_32_BIT)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.read_raw(&mut buf)?;
        Ok(buf)
    }
}

impl<R: Read + Seek> WordReader<R> {
    pub fn seek_to(&mut self, off: u64) -> Result<()> {
        self.pos = self.inner.seek(SeekFrom::Start(off))?;
        Ok(())
    }

    pub fn stream_len(&mut self) -> Result<u64> {
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(self.pos))?;
        Ok(end)
    }
}
