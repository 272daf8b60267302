use crate::container::parameter::{Group, Parameter, ParameterHeader, RecordKey};
use crate::error::{MocapError, Result};
use crate::util::word::WordReader;
use std::io::{Read, Seek};
use tracing::debug;

/// Group/parameter tree read from the parameter section.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDirectory {
    pub header: ParameterHeader,
    pub groups: Vec<Group>,
}

impl ParameterDirectory {
    /// Reads records until a zero id or name length, a zero next-offset, or
    /// `section_end` is reached.
    ///
    /// Records are walked back to back rather than through their offsets.
    /// Parameters may precede their group; they are attached once the whole
    /// chain has been read.
    pub fn read_from<R: Read>(
        r: &mut WordReader<R>,
        header: ParameterHeader,
        section_end: Option<u64>,
    ) -> Result<Self> {
        let mut groups: Vec<Group> = Vec::new();
        let mut pending: Vec<Parameter> = Vec::new();

        loop {
            if section_end.is_some_and(|end| r.position() >= end) {
                debug!(offset = r.position(), "parameter section exhausted");
                break;
            }
            let key = RecordKey::read_from(r)?;
            if key.is_terminator() {
                break;
            }
            let more = if key.is_group() {
                let g = Group::read_body(r, key)?;
                debug!(group = %g.name, id = g.id, "group");
                let more = g.next_offset != 0;
                groups.push(g);
                more
            } else {
                let p = Parameter::read_body(r, key)?;
                let more = p.next_offset != 0;
                pending.push(p);
                more
            };
            if !more {
                break;
            }
        }

        for mut p in pending {
            let Some(gi) = groups.iter().position(|g| g.number() == p.id) else {
                return Err(MocapError::Corrupt(format!(
                    "parameter {} refers to missing group {}",
                    p.name, p.id
                )));
            };
            p.group_index = gi;
            groups[gi].parameters.push(p);
        }

        Ok(Self { header, groups })
    }

    pub fn find_group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn group(&self, name: &str) -> Result<&Group> {
        self.find_group(name)
            .ok_or_else(|| MocapError::NotFound(format!("group {name}")))
    }

    pub fn find_parameter(&self, group: &str, name: &str) -> Option<&Parameter> {
        self.find_group(group).and_then(|g| g.parameter(name))
    }

    pub fn parameter(&self, group: &str, name: &str) -> Result<&Parameter> {
        self.group(group)?
            .parameter(name)
            .ok_or_else(|| MocapError::NotFound(format!("parameter {group}:{name}")))
    }

    pub fn i16s(&self, group: &str, name: &str) -> Result<&[i16]> {
        self.parameter(group, name)?.as_i16s(group)
    }

    pub fn f32s(&self, group: &str, name: &str) -> Result<&[f32]> {
        self.parameter(group, name)?.as_f32s(group)
    }

    pub fn bytes(&self, group: &str, name: &str) -> Result<&[u8]> {
        self.parameter(group, name)?.as_bytes(group)
    }

    pub fn text(&self, group: &str, name: &str) -> Result<String> {
        self.parameter(group, name)?.text(group)
    }

    pub fn words(&self, group: &str, name: &str) -> Result<Vec<String>> {
        self.parameter(group, name)?.words(group)
    }

    pub fn parameter_count(&self) -> usize {
        self.groups.iter().map(|g| g.parameters.len()).sum()
    }
}

/// Skip zero padding up to the first non-zero byte, leaving the reader on it.
pub fn skip_padding<R: Read + Seek>(r: &mut WordReader<R>) -> Result<()> {
    loop {
        let b = r.read_u8()?;
        if b != 0 {
            let at = r.position() - 1;
            return r.seek_to(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::parameter::PROCESSOR_INTEL;
    use crate::util::word::{Endian, EndianFlag};
    use std::io::Cursor;

    fn header() -> ParameterHeader {
        ParameterHeader {
            parameter_block: 2,
            id_number: 80,
            block_count: 1,
            processor_type: PROCESSOR_INTEL,
        }
    }

    fn group(out: &mut Vec<u8>, id: i8, name: &str, next: i16) {
        out.push(name.len() as u8);
        out.push(id as u8);
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&next.to_le_bytes());
        out.push(0);
    }

    fn int_param(out: &mut Vec<u8>, group_id: u8, name: &str, v: i16, next: i16) {
        out.push(name.len() as u8);
        out.push(group_id);
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&next.to_le_bytes());
        out.push(2);
        out.push(0);
        out.extend_from_slice(&v.to_le_bytes());
        out.push(0);
    }

    fn read(bytes: Vec<u8>, end: Option<u64>) -> Result<ParameterDirectory> {
        let mut r = WordReader::new(Cursor::new(bytes), EndianFlag::for_file(Endian::Little));
        ParameterDirectory::read_from(&mut r, header(), end)
    }

    #[test]
    fn links_parameters_by_group_id() {
        let mut b = Vec::new();
        group(&mut b, -1, "POINT", 10);
        group(&mut b, -2, "TRIAL", 10);
        int_param(&mut b, 2, "VIDEO_RATE_DIVIDER", 1, 10);
        int_param(&mut b, 1, "USED", 4, 0);
        let dir = read(b, None).unwrap();
        assert_eq!(dir.groups.len(), 2);
        assert_eq!(dir.i16s("POINT", "USED").unwrap(), &[4]);
        assert_eq!(dir.i16s("TRIAL", "VIDEO_RATE_DIVIDER").unwrap(), &[1]);
        assert_eq!(dir.parameter("POINT", "USED").unwrap().group_index, 0);
    }

    #[test]
    fn parameter_before_its_group_is_attached() {
        let mut b = Vec::new();
        int_param(&mut b, 3, "USED", 9, 10);
        group(&mut b, -3, "POINT", 0);
        let dir = read(b, None).unwrap();
        assert_eq!(dir.i16s("POINT", "USED").unwrap(), &[9]);
    }

    #[test]
    fn zero_id_stops_without_consuming_trailing_records() {
        let mut b = Vec::new();
        group(&mut b, -1, "POINT", 10);
        b.extend_from_slice(&[5, 0]);
        group(&mut b, -2, "JUNK", 0);
        let dir = read(b, None).unwrap();
        assert_eq!(dir.groups.len(), 1);
        assert!(dir.find_group("JUNK").is_none());
    }

    #[test]
    fn section_end_bounds_the_walk() {
        let mut b = Vec::new();
        group(&mut b, -1, "POINT", 10);
        let end = b.len() as u64;
        group(&mut b, -2, "JUNK", 0);
        let dir = read(b, Some(end)).unwrap();
        assert_eq!(dir.groups.len(), 1);
    }

    #[test]
    fn orphan_parameter_is_corrupt() {
        let mut b = Vec::new();
        group(&mut b, -1, "POINT", 10);
        int_param(&mut b, 4, "USED", 1, 0);
        assert!(matches!(read(b, None), Err(MocapError::Corrupt(_))));
    }

    #[test]
    fn missing_lookup_is_not_found() {
        let mut b = Vec::new();
        group(&mut b, -1, "POINT", 0);
        let dir = read(b, None).unwrap();
        assert!(matches!(dir.group("TRIAL"), Err(MocapError::NotFound(_))));
        assert!(matches!(
            dir.parameter("POINT", "USED"),
            Err(MocapError::NotFound(_))
        ));
    }

    #[test]
    fn skips_zero_padding() {
        let mut r = WordReader::new(Cursor::new(vec![0, 0, 0, 7, 8]), EndianFlag::Same);
        skip_padding(&mut r).unwrap();
        assert_eq!(r.position(), 3);
        assert_eq!(r.read_u8().unwrap(), 7);
    }
}
