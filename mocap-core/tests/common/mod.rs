#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

pub const INTEL: u8 = 84;
pub const DEC: u8 = 85;
pub const MIPS: u8 = 86;

/// Raw sample as written to disk. Integer storage truncates x, y, z to i16.
#[derive(Clone, Copy, Debug)]
pub struct RawPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub camera: u8,
    pub residual: u8,
}

pub fn raw(x: f32, y: f32, z: f32) -> RawPoint {
    RawPoint {
        x,
        y,
        z,
        camera: 0,
        residual: 0,
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Char(Vec<u8>, Vec<u8>),
    Byte(Vec<u8>, Vec<u8>),
    Int16(Vec<u8>, Vec<i16>),
    Float(Vec<u8>, Vec<f32>),
}

#[derive(Clone, Debug)]
enum Record {
    Group { id: u8, name: String, desc: String },
    Param { group: u8, name: String, value: Value, desc: String },
    Raw(Vec<u8>),
}

/// Hand-rolled C3D writer for tests.
#[derive(Clone, Debug)]
pub struct C3dBuilder {
    pub processor: u8,
    pub scale: f32,
    pub frame_rate: f32,
    pub points: usize,
    pub analog: usize,
    pub headerless: bool,
    /// Leave the header data-start block zero so the reader has to find the data.
    pub omit_data_start: bool,
    records: Vec<Record>,
    frames: Vec<(Vec<RawPoint>, Vec<f32>)>,
}

impl C3dBuilder {
    pub fn new(processor: u8, scale: f32, points: usize) -> Self {
        Self {
            processor,
            scale,
            frame_rate: 100.0,
            points,
            analog: 0,
            headerless: false,
            omit_data_start: false,
            records: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn analog(mut self, channels: usize) -> Self {
        self.analog = channels;
        self
    }

    pub fn headerless(mut self) -> Self {
        self.headerless = true;
        self
    }

    pub fn group(mut self, id: u8, name: &str) -> Self {
        self.records.push(Record::Group {
            id,
            name: name.into(),
            desc: String::new(),
        });
        self
    }

    pub fn param(mut self, group: u8, name: &str, value: Value) -> Self {
        self.records.push(Record::Param {
            group,
            name: name.into(),
            value,
            desc: String::new(),
        });
        self
    }

    pub fn text(self, group: u8, name: &str, s: &str) -> Self {
        let b = s.as_bytes().to_vec();
        self.param(group, name, Value::Char(vec![b.len() as u8], b))
    }

    /// Fixed-width string list, space padded.
    pub fn labels(self, group: u8, name: &str, width: u8, items: &[&str]) -> Self {
        let mut b = Vec::new();
        for s in items {
            let mut f = s.as_bytes().to_vec();
            f.resize(width as usize, b' ');
            b.extend(f);
        }
        self.param(group, name, Value::Char(vec![width, items.len() as u8], b))
    }

    pub fn int(self, group: u8, name: &str, v: i16) -> Self {
        self.param(group, name, Value::Int16(vec![1], vec![v]))
    }

    pub fn float(self, group: u8, name: &str, v: f32) -> Self {
        self.param(group, name, Value::Float(vec![1], vec![v]))
    }

    /// Bytes appended verbatim to the parameter section.
    pub fn raw_record(mut self, bytes: Vec<u8>) -> Self {
        self.records.push(Record::Raw(bytes));
        self
    }

    pub fn frame(mut self, points: Vec<RawPoint>, analog: Vec<f32>) -> Self {
        assert_eq!(points.len(), self.points);
        assert_eq!(analog.len(), self.analog);
        self.frames.push((points, analog));
        self
    }

    fn big(&self) -> bool {
        self.processor == MIPS
    }

    fn u16(&self, out: &mut Vec<u8>, v: u16) {
        if self.big() {
            out.extend_from_slice(&v.to_be_bytes());
        } else {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn i16(&self, out: &mut Vec<u8>, v: i16) {
        self.u16(out, v as u16);
    }

    fn f32(&self, out: &mut Vec<u8>, v: f32) {
        if self.big() {
            out.extend_from_slice(&v.to_be_bytes());
        } else {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn records(&self, data_start: u16) -> Vec<u8> {
        let mut recs = self.records.clone();
        if self.headerless {
            recs.push(Record::Group {
                id: 99,
                name: "POINT".into(),
                desc: String::new(),
            });
            for (name, value) in [
                ("USED", Value::Int16(vec![1], vec![self.points as i16])),
                ("FRAMES", Value::Int16(vec![1], vec![self.frames.len() as i16])),
                ("SCALE", Value::Float(vec![1], vec![self.scale])),
                ("RATE", Value::Float(vec![1], vec![self.frame_rate])),
                ("DATA_START", Value::Int16(vec![1], vec![data_start as i16])),
            ] {
                recs.push(Record::Param {
                    group: 99,
                    name: name.into(),
                    value,
                    desc: String::new(),
                });
            }
        }

        let mut out = Vec::new();
        let n = recs.len();
        for (i, r) in recs.iter().enumerate() {
            let next: i16 = if i + 1 == n { 0 } else { 1 };
            match r {
                Record::Group { id, name, desc } => {
                    out.push(name.len() as u8);
                    out.push((-(*id as i16)) as u8);
                    out.extend_from_slice(name.as_bytes());
                    self.i16(&mut out, next);
                    out.push(desc.len() as u8);
                    out.extend_from_slice(desc.as_bytes());
                }
                Record::Param {
                    group,
                    name,
                    value,
                    desc,
                } => {
                    out.push(name.len() as u8);
                    out.push(*group);
                    out.extend_from_slice(name.as_bytes());
                    self.i16(&mut out, next);
                    let (tag, dims): (i8, &Vec<u8>) = match value {
                        Value::Char(d, _) => (-1, d),
                        Value::Byte(d, _) => (1, d),
                        Value::Int16(d, _) => (2, d),
                        Value::Float(d, _) => (4, d),
                    };
                    out.push(tag as u8);
                    out.push(dims.len() as u8);
                    out.extend_from_slice(dims);
                    match value {
                        Value::Char(_, b) | Value::Byte(_, b) => out.extend_from_slice(b),
                        Value::Int16(_, v) => v.iter().for_each(|x| self.i16(&mut out, *x)),
                        Value::Float(_, v) => v.iter().for_each(|x| self.f32(&mut out, *x)),
                    }
                    out.push(desc.len() as u8);
                    out.extend_from_slice(desc.as_bytes());
                }
                Record::Raw(b) => out.extend_from_slice(b),
            }
        }
        out
    }

    fn data(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let float = self.scale < 0.0;
        for (points, analog) in &self.frames {
            for p in points {
                if float {
                    self.f32(&mut out, p.x);
                    self.f32(&mut out, p.y);
                    self.f32(&mut out, p.z);
                    let word = (p.residual as u16) << 8 | p.camera as u16;
                    self.f32(&mut out, word as f32);
                } else {
                    self.i16(&mut out, p.x as i16);
                    self.i16(&mut out, p.y as i16);
                    self.i16(&mut out, p.z as i16);
                    out.push(p.camera);
                    out.push(p.residual);
                }
            }
            for a in analog {
                if float {
                    self.f32(&mut out, *a);
                } else {
                    self.i16(&mut out, *a as i16);
                }
            }
        }
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let header_blocks: u16 = if self.headerless { 0 } else { 1 };
        let section_len = 4 + self.records(0).len();
        let param_blocks = section_len.div_ceil(512).max(1) as u16;
        let data_start = header_blocks + param_blocks + 1;

        let mut out = Vec::new();
        if !self.headerless {
            let mut h = Vec::with_capacity(512);
            h.push(2);
            h.push(80);
            self.u16(&mut h, self.points as u16);
            self.u16(&mut h, self.analog as u16);
            self.u16(&mut h, 1);
            self.u16(&mut h, self.frames.len() as u16);
            self.u16(&mut h, 0);
            self.f32(&mut h, self.scale);
            let ds = if self.omit_data_start { 0 } else { data_start };
            self.u16(&mut h, ds);
            self.u16(&mut h, self.analog as u16);
            self.f32(&mut h, self.frame_rate);
            h.resize(512, 0);
            out.extend(h);
        }

        let mut section = vec![1, 80, param_blocks as u8, self.processor];
        section.extend(self.records(data_start));
        section.resize(param_blocks as usize * 512, 0);
        out.extend(section);

        out.extend(self.data());
        out
    }

    pub fn write_to(&self, dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&self.build()).unwrap();
        path
    }
}

/// Single marker, two frames, int16 storage, no analog.
pub fn minimal(processor: u8) -> C3dBuilder {
    C3dBuilder::new(processor, 0.5, 1)
        .group(1, "POINT")
        .labels(1, "LABELS", 4, &["HEAD"])
        .frame(
            vec![RawPoint {
                x: 100.0,
                y: -200.0,
                z: 300.0,
                camera: 3,
                residual: 8,
            }],
            vec![],
        )
        .frame(
            vec![RawPoint {
                x: 110.0,
                y: -200.0,
                z: 300.0,
                camera: 2,
                residual: 4,
            }],
            vec![],
        )
}
