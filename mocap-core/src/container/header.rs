use crate::error::{MocapError, Result};
use crate::util::word::{SIZE_8_BIT, SIZE_16_BIT, SIZE_32_BIT, WordReader};
use std::io::{Read, Seek};

pub const HEADER_LEN: u64 = 512;
pub const BLOCK_LEN: u64 = 512;
/// Parameter-block byte of a file that carries no header record.
pub const NO_HEADER_BLOCK: u8 = 1;
pub const C3D_ID: u8 = 80;

pub const EVENT_SLOTS: usize = 18;

/// The fixed 512-byte record at the start of a C3D file.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub parameter_block: u8,
    pub id_number: u8,
    pub points: u16,
    pub analog: u16,
    pub first_frame: u16,
    pub last_frame: u16,
    pub max_interpolation_gap: u16,
    /// Negative means float storage; magnitude scales integer samples.
    pub scale_factor: f32,
    pub data_start_block: u16,
    pub analog_per_frame: u16,
    pub frame_rate: f32,
    pub reserved_1: [i16; 135],
    pub key_value_1: i16,
    pub first_label_range_block: i16,
    pub key_value_2: i16,
    pub event_time_num: i16,
    pub reserved_2: i16,
    pub event_times: [f32; EVENT_SLOTS],
    pub event_display_flags: [i16; 9],
    pub reserved_3: i16,
    pub event_labels: [[u8; 4]; EVENT_SLOTS],
    pub reserved_4: [i16; 22],
}

impl Default for Header {
    fn default() -> Self {
        Self {
            parameter_block: 0,
            id_number: 0,
            points: 0,
            analog: 0,
            first_frame: 0,
            last_frame: 0,
            max_interpolation_gap: 0,
            scale_factor: 0.0,
            data_start_block: 0,
            analog_per_frame: 0,
            frame_rate: 0.0,
            reserved_1: [0; 135],
            key_value_1: 0,
            first_label_range_block: 0,
            key_value_2: 0,
            event_time_num: 0,
            reserved_2: 0,
            event_times: [0.0; EVENT_SLOTS],
            event_display_flags: [0; 9],
            reserved_3: 0,
            event_labels: [[0; 4]; EVENT_SLOTS],
            reserved_4: [0; 22],
        }
    }
}

fn swap_f32(v: f32) -> f32 {
    f32::from_bits(v.to_bits().swap_bytes())
}

impl Header {
    /// Reads the header in host byte order.
    ///
    /// Returns `None` and rewinds to the file start when the first byte marks
    /// a header-less file. The byte order is only known once the parameter
    /// header has been read, so callers fix it up with [`Header::swap_endian`].
    pub fn read_from<R: Read + Seek>(r: &mut WordReader<R>) -> Result<Option<Self>> {
        let parameter_block: u8 = r.read_word(SIZE_8_BIT)?;
        if parameter_block == NO_HEADER_BLOCK {
            r.seek_to(0)?;
            return Ok(None);
        }

        let mut h = Header {
            parameter_block,
            id_number: r.read_word(SIZE_8_BIT)?,
            points: r.read_word(SIZE_16_BIT)?,
            analog: r.read_word(SIZE_16_BIT)?,
            first_frame: r.read_word(SIZE_16_BIT)?,
            last_frame: r.read_word(SIZE_16_BIT)?,
            max_interpolation_gap: r.read_word(SIZE_16_BIT)?,
            scale_factor: r.read_word(SIZE_32_BIT)?,
            data_start_block: r.read_word(SIZE_16_BIT)?,
            analog_per_frame: r.read_word(SIZE_16_BIT)?,
            frame_rate: r.read_word(SIZE_32_BIT)?,
            ..Default::default()
        };
        for v in h.reserved_1.iter_mut() {
            *v = r.read_word(SIZE_16_BIT)?;
        }
        h.key_value_1 = r.read_word(SIZE_16_BIT)?;
        h.first_label_range_block = r.read_word(SIZE_16_BIT)?;
        h.key_value_2 = r.read_word(SIZE_16_BIT)?;
        h.event_time_num = r.read_word(SIZE_16_BIT)?;
        h.reserved_2 = r.read_word(SIZE_16_BIT)?;
        for v in h.event_times.iter_mut() {
            *v = r.read_word(SIZE_32_BIT)?;
        }
        for v in h.event_display_flags.iter_mut() {
            *v = r.read_word(SIZE_16_BIT)?;
        }
        h.reserved_3 = r.read_word(SIZE_16_BIT)?;
        for label in h.event_labels.iter_mut() {
            r.read_raw(label)?;
        }
        for v in h.reserved_4.iter_mut() {
            *v = r.read_word(SIZE_16_BIT)?;
        }
        debug_assert_eq!(r.position(), HEADER_LEN);
        Ok(Some(h))
    }

    /// Byte-swap every multi-byte field in place.
    pub fn swap_endian(&mut self) {
        self.points = self.points.swap_bytes();
        self.analog = self.analog.swap_bytes();
        self.first_frame = self.first_frame.swap_bytes();
        self.last_frame = self.last_frame.swap_bytes();
        self.max_interpolation_gap = self.max_interpolation_gap.swap_bytes();
        self.scale_factor = swap_f32(self.scale_factor);
        self.data_start_block = self.data_start_block.swap_bytes();
        self.analog_per_frame = self.analog_per_frame.swap_bytes();
        self.frame_rate = swap_f32(self.frame_rate);
        for v in self.reserved_1.iter_mut() {
            *v = v.swap_bytes();
        }
        self.key_value_1 = self.key_value_1.swap_bytes();
        self.first_label_range_block = self.first_label_range_block.swap_bytes();
        self.key_value_2 = self.key_value_2.swap_bytes();
        self.event_time_num = self.event_time_num.swap_bytes();
        self.reserved_2 = self.reserved_2.swap_bytes();
        for v in self.event_times.iter_mut() {
            *v = swap_f32(*v);
        }
        for v in self.event_display_flags.iter_mut() {
            *v = v.swap_bytes();
        }
        self.reserved_3 = self.reserved_3.swap_bytes();
        for v in self.reserved_4.iter_mut() {
            *v = v.swap_bytes();
        }
    }

    pub fn frame_count(&self) -> usize {
        if self.last_frame < self.first_frame {
            0
        } else {
            (self.last_frame - self.first_frame) as usize + 1
        }
    }

    pub fn check(&self) -> Result<()> {
        if self.id_number != C3D_ID {
            return Err(MocapError::Format(format!(
                "header id {} is not {C3D_ID}, not an ADTech C3D file",
                self.id_number
            )));
        }
        if self.last_frame < self.first_frame {
            return Err(MocapError::Corrupt(format!(
                "last frame {} precedes first frame {}",
                self.last_frame, self.first_frame
            )));
        }
        Ok(())
    }

    /// Absolute offset of the parameter section.
    pub fn parameter_offset(&self) -> u64 {
        (self.parameter_block.max(1) as u64 - 1) * BLOCK_LEN
    }

    pub fn float_storage(&self) -> bool {
        self.scale_factor < 0.0
    }

    pub fn event_label(&self, i: usize) -> String {
        crate::util::words::char_text(&self.event_labels[i])
    }
}
