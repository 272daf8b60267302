use crate::error::{MocapError, Result};
use crate::util::word::{Endian, EndianFlag, SIZE_8_BIT, SIZE_16_BIT, WordReader};
use crate::util::words::{char_text, split_words};
use std::io::Read;
use tracing::warn;

pub const PROCESSOR_NONE: u8 = 83;
pub const PROCESSOR_INTEL: u8 = 84;
pub const PROCESSOR_DEC: u8 = 85;
pub const PROCESSOR_MIPS: u8 = 86;

pub const MAX_DIMENSIONS: usize = 7;

/// Four-byte record opening the parameter section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterHeader {
    pub parameter_block: u8,
    pub id_number: u8,
    pub block_count: u8,
    pub processor_type: u8,
}

impl ParameterHeader {
    pub fn read_from<R: Read>(r: &mut WordReader<R>) -> Result<Self> {
        let mut b = [0u8; 4];
        r.read_raw(&mut b)?;
        let h = Self {
            parameter_block: b[0],
            id_number: b[1],
            block_count: b[2],
            processor_type: b[3],
        };
        if h.id_number != crate::container::header::C3D_ID {
            return Err(MocapError::Format(format!(
                "parameter section id {} is not 80, not an ADTech C3D file",
                h.id_number
            )));
        }
        Ok(h)
    }

    /// Byte order the file was written in; MIPS is the only big-endian writer.
    pub fn file_endian(&self) -> Endian {
        match self.processor_type {
            PROCESSOR_MIPS => Endian::Big,
            PROCESSOR_INTEL | PROCESSOR_DEC | PROCESSOR_NONE => Endian::Little,
            other => {
                warn!(processor_type = other, "unknown processor type, assuming little endian");
                Endian::Little
            }
        }
    }

    pub fn endian_flag(&self) -> EndianFlag {
        EndianFlag::for_file(self.file_endian())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteFormat {
    Char,
    Byte,
    Int16,
    Float,
}

impl ByteFormat {
    pub fn from_tag(tag: i8) -> Result<Self> {
        match tag {
            -1 => Ok(ByteFormat::Char),
            1 => Ok(ByteFormat::Byte),
            2 => Ok(ByteFormat::Int16),
            4 => Ok(ByteFormat::Float),
            other => Err(MocapError::Format(format!("unsupported byte format tag {other}"))),
        }
    }

    pub fn tag(self) -> i8 {
        match self {
            ByteFormat::Char => -1,
            ByteFormat::Byte => 1,
            ByteFormat::Int16 => 2,
            ByteFormat::Float => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ByteFormat::Char => "CHAR",
            ByteFormat::Byte => "BYTE",
            ByteFormat::Int16 => "INT_16_BIT",
            ByteFormat::Float => "FLOAT (REAL)",
        }
    }
}

/// Flattened multi-dimensional parameter payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterData {
    Char(Vec<u8>),
    Byte(Vec<u8>),
    Int16(Vec<i16>),
    Float(Vec<f32>),
}

impl ParameterData {
    pub fn format(&self) -> ByteFormat {
        match self {
            ParameterData::Char(_) => ByteFormat::Char,
            ParameterData::Byte(_) => ByteFormat::Byte,
            ParameterData::Int16(_) => ByteFormat::Int16,
            ParameterData::Float(_) => ByteFormat::Float,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ParameterData::Char(v) | ParameterData::Byte(v) => v.len(),
            ParameterData::Int16(v) => v.len(),
            ParameterData::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_from<R: Read>(r: &mut WordReader<R>, format: ByteFormat, count: usize) -> Result<Self> {
        Ok(match format {
            ByteFormat::Char => ParameterData::Char(r.read_bytes(count)?),
            ByteFormat::Byte => ParameterData::Byte(r.read_bytes(count)?),
            ByteFormat::Int16 => ParameterData::Int16(
                (0..count)
                    .map(|_| r.read_word_with_endian(SIZE_16_BIT))
                    .collect::<Result<_>>()?,
            ),
            ByteFormat::Float => ParameterData::Float(
                (0..count).map(|_| r.read_f32()).collect::<Result<_>>()?,
            ),
        })
    }
}

/// Leading (count, id) pair shared by group and parameter records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKey {
    pub name_len: u8,
    pub locked: bool,
    pub id: i16,
}

impl RecordKey {
    pub fn read_from<R: Read>(r: &mut WordReader<R>) -> Result<Self> {
        let count: i8 = r.read_word_with_endian(SIZE_8_BIT)?;
        let raw_id: u8 = r.read_word_with_endian(SIZE_8_BIT)?;
        let mut id = raw_id as i16;
        if id > 128 {
            id -= 256;
        }
        Ok(Self {
            name_len: count.unsigned_abs(),
            locked: count < 0,
            id,
        })
    }

    pub fn is_terminator(&self) -> bool {
        self.id == 0 || self.name_len == 0
    }

    pub fn is_group(&self) -> bool {
        self.id < 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Negative on disk; parameters attach by its absolute value.
    pub id: i16,
    pub name: String,
    pub locked: bool,
    pub next_offset: i16,
    pub description: String,
    pub parameters: Vec<Parameter>,
}

impl Group {
    /// Reads the rest of a group record after its key.
    pub fn read_body<R: Read>(r: &mut WordReader<R>, key: RecordKey) -> Result<Self> {
        let name = char_text(&r.read_bytes(key.name_len as usize)?);
        let next_offset = r.read_i16()?;
        let desc_len = r.read_u8()?;
        let description = char_text(&r.read_bytes(desc_len as usize)?);
        Ok(Self {
            id: key.id,
            name,
            locked: key.locked,
            next_offset,
            description,
            parameters: Vec::new(),
        })
    }

    pub fn number(&self) -> i16 {
        self.id.abs()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: i16,
    pub name: String,
    pub locked: bool,
    pub next_offset: i16,
    pub dimensions: Vec<u8>,
    pub data: ParameterData,
    pub description: String,
    /// Index of the owning group in the directory.
    pub group_index: usize,
}

impl Parameter {
    /// Reads the rest of a parameter record after its key. The owning group is
    /// resolved by the directory.
    pub fn read_body<R: Read>(r: &mut WordReader<R>, key: RecordKey) -> Result<Self> {
        let name = char_text(&r.read_bytes(key.name_len as usize)?);
        let next_offset = r.read_i16()?;
        let format = ByteFormat::from_tag(r.read_i8()?)?;
        let ndims = r.read_u8()? as usize;
        if ndims > MAX_DIMENSIONS {
            warn!(parameter = %name, ndims, "more dimensions than the format allows");
        }
        let dimensions = r.read_bytes(ndims)?;
        let count = dimensions.iter().map(|&d| d as usize).product::<usize>();
        let data = ParameterData::read_from(r, format, count)?;
        let desc_len = r.read_u8()?;
        let description = char_text(&r.read_bytes(desc_len as usize)?);
        Ok(Self {
            id: key.id,
            name,
            locked: key.locked,
            next_offset,
            dimensions,
            data,
            description,
            group_index: usize::MAX,
        })
    }

    pub fn format(&self) -> ByteFormat {
        self.data.format()
    }

    fn mismatch(&self, group: &str, requested: ByteFormat) -> MocapError {
        MocapError::TypeMismatch {
            group: group.to_string(),
            name: self.name.clone(),
            stored: self.format().name(),
            requested: requested.name(),
        }
    }

    pub fn as_chars(&self, group: &str) -> Result<&[u8]> {
        match &self.data {
            ParameterData::Char(v) => Ok(v),
            _ => Err(self.mismatch(group, ByteFormat::Char)),
        }
    }

    pub fn as_bytes(&self, group: &str) -> Result<&[u8]> {
        match &self.data {
            ParameterData::Byte(v) => Ok(v),
            _ => Err(self.mismatch(group, ByteFormat::Byte)),
        }
    }

    pub fn as_i16s(&self, group: &str) -> Result<&[i16]> {
        match &self.data {
            ParameterData::Int16(v) => Ok(v),
            _ => Err(self.mismatch(group, ByteFormat::Int16)),
        }
    }

    pub fn as_f32s(&self, group: &str) -> Result<&[f32]> {
        match &self.data {
            ParameterData::Float(v) => Ok(v),
            _ => Err(self.mismatch(group, ByteFormat::Float)),
        }
    }

    pub fn text(&self, group: &str) -> Result<String> {
        self.as_chars(group).map(char_text)
    }

    pub fn words(&self, group: &str) -> Result<Vec<String>> {
        self.as_chars(group).map(split_words)
    }
}
