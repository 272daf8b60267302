use crate::container::data::MotionData;
use std::io::Write;

/// Semicolon separated marker samples, one row per frame.
pub fn write_points(data: &MotionData, points: usize, mut w: impl Write) -> std::io::Result<()> {
    write!(w, "FrameNumber")?;
    for i in 1..=points {
        write!(w, ";X_{i};Y_{i};Z_{i};Camera_{i};Residual_{i}")?;
    }
    writeln!(w)?;
    for (i, frame) in data.frames.iter().enumerate() {
        write!(w, "{}", i + 1)?;
        for p in frame.points.iter().take(points) {
            write!(
                w,
                ";{:.6};{:.6};{:.6};{:.6};{:.6}",
                p.x, p.y, p.z, p.camera, p.residual
            )?;
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn write_analog(data: &MotionData, channels: usize, mut w: impl Write) -> std::io::Result<()> {
    write!(w, "FrameNumber")?;
    for i in 1..=channels {
        write!(w, ";Analog_{i}")?;
    }
    writeln!(w)?;
    for (i, frame) in data.frames.iter().enumerate() {
        write!(w, "{}", i + 1)?;
        for v in frame.analog.iter().take(channels) {
            write!(w, ";{v:.6}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::data::{Frame, PointSample};

    fn data() -> MotionData {
        MotionData {
            frames: vec![
                Frame {
                    points: vec![PointSample {
                        x: 1.0,
                        y: 2.5,
                        z: -3.0,
                        camera: 4.0,
                        residual: 0.25,
                    }],
                    analog: vec![0.5, -1.0],
                },
                Frame {
                    points: vec![PointSample::default()],
                    analog: vec![0.0, 0.0],
                },
            ],
            relocation: Default::default(),
        }
    }

    #[test]
    fn points_csv_layout() {
        let mut out = Vec::new();
        write_points(&data(), 1, &mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        let lines: Vec<_> = s.lines().collect();
        assert_eq!(lines[0], "FrameNumber;X_1;Y_1;Z_1;Camera_1;Residual_1");
        assert_eq!(lines[1], "1;1.000000;2.500000;-3.000000;4.000000;0.250000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn analog_csv_layout() {
        let mut out = Vec::new();
        write_analog(&data(), 2, &mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert_eq!(
            s,
            "FrameNumber;Analog_1;Analog_2\n1;0.500000;-1.000000\n2;0.000000;0.000000\n"
        );
    }
}
