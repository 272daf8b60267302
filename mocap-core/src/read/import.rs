use crate::container::data::{DataLayout, Frame, MotionData, Relocation};
use crate::container::directory::{ParameterDirectory, skip_padding};
use crate::container::groups::{Manufacturer, PointGroup, Subjects, Trial};
use crate::container::header::{BLOCK_LEN, Header};
use crate::container::parameter::ParameterHeader;
use crate::error::{MocapError, Result};
use crate::util::word::{EndianFlag, WordReader};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Start,
    ReadHeader,
    ReadParameterHeader,
    DetermineEndianness,
    ReadGroupsAndParameters,
    ReadFrames,
    Ready,
}

/// A fully decoded C3D file.
#[derive(Debug, Clone)]
pub struct C3dFile {
    pub header: Header,
    /// False for files whose first byte marks a missing header.
    pub header_present: bool,
    pub endian: EndianFlag,
    pub parameters: ParameterDirectory,
    pub point: PointGroup,
    pub trial: Trial,
    pub subjects: Subjects,
    pub manufacturer: Manufacturer,
    pub layout: DataLayout,
    pub data: MotionData,
}

struct Decoder<R> {
    r: WordReader<R>,
    stage: ImportStage,
}

impl<R: Read + Seek> Decoder<R> {
    fn enter(&mut self, stage: ImportStage) {
        debug!(?stage, offset = self.r.position(), "c3d import");
        self.stage = stage;
    }

    fn run(&mut self) -> Result<C3dFile> {
        self.enter(ImportStage::ReadHeader);
        let header = Header::read_from(&mut self.r)?;
        let header_present = header.is_some();
        let mut header = match header {
            Some(h) => {
                self.r.seek_to(h.parameter_offset())?;
                h
            }
            None => {
                warn!("file has no header record, layout comes from POINT parameters");
                Header::default()
            }
        };
        let section_start = self.r.position();

        self.enter(ImportStage::ReadParameterHeader);
        let ph = ParameterHeader::read_from(&mut self.r)?;

        self.enter(ImportStage::DetermineEndianness);
        let endian = ph.endian_flag();
        self.r.set_flag(endian);
        if header_present {
            if endian == EndianFlag::Different {
                header.swap_endian();
            }
            header.check()?;
        }

        self.enter(ImportStage::ReadGroupsAndParameters);
        let section_end =
            (ph.block_count > 0).then(|| section_start + ph.block_count as u64 * BLOCK_LEN);
        let parameters = ParameterDirectory::read_from(&mut self.r, ph, section_end)?;
        let point = PointGroup::from_directory(&parameters);
        let trial = Trial::from_directory(&parameters);
        let subjects = Subjects::from_directory(&parameters);
        let manufacturer = Manufacturer::from_directory(&parameters);

        self.enter(ImportStage::ReadFrames);
        let layout = if header_present {
            DataLayout {
                points: header.points as usize,
                analog: header.analog as usize,
                frames: header.frame_count(),
                scale: header.scale_factor,
            }
        } else {
            headerless_layout(&point)?
        };
        let data_block = if header_present && header.data_start_block > 0 {
            Some(header.data_start_block as u64)
        } else if point.data_start > 0 {
            Some(point.data_start as u64)
        } else {
            None
        };
        match data_block {
            Some(block) => self.r.seek_to((block - 1) * BLOCK_LEN)?,
            None if layout.byte_len() > 0 => skip_padding(&mut self.r)?,
            None => {}
        }

        let start = self.r.position();
        let len = self.r.stream_len()?;
        let need = layout.byte_len();
        if len.saturating_sub(start) < need {
            return Err(MocapError::Corrupt(format!(
                "data section needs {need} bytes from offset {start}, file has {}",
                len.saturating_sub(start)
            )));
        }
        let data = MotionData::read_from(&mut self.r, layout)?;

        self.enter(ImportStage::Ready);
        Ok(C3dFile {
            header,
            header_present,
            endian,
            parameters,
            point,
            trial,
            subjects,
            manufacturer,
            layout,
            data,
        })
    }
}

fn headerless_layout(point: &PointGroup) -> Result<DataLayout> {
    if point.used < 0 || point.frames < 0 {
        return Err(MocapError::Corrupt(format!(
            "POINT:USED {} / POINT:FRAMES {} out of range",
            point.used, point.frames
        )));
    }
    Ok(DataLayout {
        points: point.used as usize,
        analog: 0,
        frames: point.frames as usize,
        scale: point.scale,
    })
}

impl C3dFile {
    pub fn import(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path)?;
        let file = Self::decode(BufReader::new(f))?;
        info!(
            path = %path.display(),
            frames = file.frame_count(),
            points = file.point_count(),
            analog = file.analog_count(),
            "imported c3d"
        );
        Ok(file)
    }

    /// Decode from any seekable byte source.
    pub fn decode<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut d = Decoder {
            r: WordReader::new(reader, EndianFlag::Same),
            stage: ImportStage::Start,
        };
        d.run().inspect_err(|e| debug!(stage = ?d.stage, error = %e, "c3d import failed"))
    }

    pub fn frame(&self, i: usize) -> Option<&Frame> {
        self.data.frame(i)
    }

    pub fn frame_count(&self) -> usize {
        self.data.frame_count()
    }

    pub fn point_count(&self) -> usize {
        self.layout.points
    }

    pub fn analog_count(&self) -> usize {
        self.layout.analog
    }

    pub fn relocation(&self) -> &Relocation {
        &self.data.relocation
    }

    pub fn label(&self, marker: usize) -> String {
        self.point.labels.get(marker).cloned().unwrap_or_default()
    }

    pub fn frame_rate(&self) -> f32 {
        if self.header_present {
            self.header.frame_rate
        } else {
            self.point.rate
        }
    }
}
