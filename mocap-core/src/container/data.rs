use crate::error::Result;
use crate::util::word::{SIZE_8_BIT, SIZE_16_BIT, WordReader};
use std::io::Read;
use tracing::debug;

/// One marker sample as stored in the data section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub camera: f32,
    pub residual: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub points: Vec<PointSample>,
    pub analog: Vec<f32>,
}

/// Marker displacement between the first and the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Displacement {
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,
    pub dr: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relocation {
    pub markers: Vec<Displacement>,
}

impl Relocation {
    pub fn between(first: &Frame, last: &Frame) -> Self {
        let markers = first
            .points
            .iter()
            .zip(&last.points)
            .map(|(a, b)| {
                let (dx, dy, dz) = (b.x - a.x, b.y - a.y, b.z - a.z);
                Displacement {
                    dx,
                    dy,
                    dz,
                    dr: (dx * dx + dy * dy + dz * dz).sqrt(),
                }
            })
            .collect();
        Self { markers }
    }

    pub fn magnitude(&self, marker: usize) -> f32 {
        self.markers.get(marker).map(|d| d.dr).unwrap_or_default()
    }
}

/// Shape of the data section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataLayout {
    pub points: usize,
    pub analog: usize,
    pub frames: usize,
    pub scale: f32,
}

impl DataLayout {
    pub fn float_storage(&self) -> bool {
        self.scale < 0.0
    }

    pub fn point_record_len(&self) -> u64 {
        if self.float_storage() { 16 } else { 8 }
    }

    pub fn analog_sample_len(&self) -> u64 {
        if self.float_storage() { 4 } else { 2 }
    }

    pub fn frame_len(&self) -> u64 {
        self.points as u64 * self.point_record_len() + self.analog as u64 * self.analog_sample_len()
    }

    pub fn byte_len(&self) -> u64 {
        self.frames as u64 * self.frame_len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionData {
    pub frames: Vec<Frame>,
    pub relocation: Relocation,
}

impl MotionData {
    pub fn read_from<R: Read>(r: &mut WordReader<R>, layout: DataLayout) -> Result<Self> {
        debug!(
            frames = layout.frames,
            points = layout.points,
            analog = layout.analog,
            float = layout.float_storage(),
            "reading frames"
        );
        let mut frames = Vec::with_capacity(layout.frames);
        for _ in 0..layout.frames {
            frames.push(read_frame(r, &layout)?);
        }
        let relocation = match (frames.first(), frames.last()) {
            (Some(first), Some(last)) => Relocation::between(first, last),
            _ => Relocation::default(),
        };
        Ok(Self { frames, relocation })
    }

    pub fn frame(&self, i: usize) -> Option<&Frame> {
        self.frames.get(i)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

fn read_frame<R: Read>(r: &mut WordReader<R>, layout: &DataLayout) -> Result<Frame> {
    let scale = layout.scale;
    let mut points = Vec::with_capacity(layout.points);
    for _ in 0..layout.points {
        let p = if layout.float_storage() {
            let x = r.read_f32()?;
            let y = r.read_f32()?;
            let z = r.read_f32()?;
            // camera count in the low byte, residual in the high byte
            let word = r.read_f32()? as i16 as u16;
            PointSample {
                x,
                y,
                z,
                camera: (word & 0xff) as f32,
                residual: (word >> 8) as f32 * -scale,
            }
        } else {
            let x = r.read_i16()?;
            let y = r.read_i16()?;
            let z = r.read_i16()?;
            let camera: u8 = r.read_word_with_endian(SIZE_8_BIT)?;
            let residual: u8 = r.read_word_with_endian(SIZE_8_BIT)?;
            PointSample {
                x: x as f32 * scale,
                y: y as f32 * scale,
                z: z as f32 * scale,
                camera: camera as f32,
                residual: residual as f32 * scale,
            }
        };
        points.push(p);
    }

    let mut analog = Vec::with_capacity(layout.analog);
    for _ in 0..layout.analog {
        let v = if layout.float_storage() {
            r.read_f32()?
        } else {
            let raw: i16 = r.read_word_with_endian(SIZE_16_BIT)?;
            if scale == 0.0 { raw as f32 } else { raw as f32 / scale }
        };
        analog.push(v);
    }
    Ok(Frame { points, analog })
}
