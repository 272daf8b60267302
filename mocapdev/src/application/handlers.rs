use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use mocap_core::container::parameter::ByteFormat;
use mocap_core::domain::FileSummary;
use mocap_core::error::{MocapError, Result};
use mocap_core::export::{csv, text};
use mocap_core::util::word::Endian;
use mocap_core::{C3dFile, MotionQuery, Session, ViewerConfig};
use tracing::{info, warn};
use walkdir::WalkDir;

fn output(out: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match out {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(std::io::stdout().lock()),
    })
}

pub fn load_config(path: Option<&Path>) -> Result<ViewerConfig> {
    match path {
        Some(p) => ViewerConfig::load(p),
        None => Ok(ViewerConfig::default()),
    }
}

pub fn summarize(path: &Path, file: &C3dFile) -> FileSummary {
    FileSummary {
        path: path.display().to_string(),
        frames: file.frame_count(),
        points: file.point_count(),
        analog: file.analog_count(),
        frame_rate: file.frame_rate(),
        units: file.point.units.clone(),
        float_storage: file.layout.float_storage(),
        big_endian: file.parameters.header.file_endian() == Endian::Big,
        software: file.manufacturer.software.clone(),
    }
}

fn summary_line(s: &FileSummary) -> String {
    format!(
        "{}: {} frames @ {:.2} Hz, {} markers, {} analog, units={:?}, {}{}",
        s.path,
        s.frames,
        s.frame_rate,
        s.points,
        s.analog,
        s.units,
        if s.float_storage { "float" } else { "int16" },
        if s.big_endian { ", big-endian" } else { "" },
    )
}

fn to_json(value: &impl serde::Serialize) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| MocapError::Format(format!("json: {e}")))
}

pub fn handle_header(file: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let c3d = C3dFile::import(&file)?;
    if !c3d.header_present {
        warn!(path = %file.display(), "file has no header record");
    }
    let mut w = output(out.as_deref())?;
    text::write_header(&c3d.header, &mut w)?;
    w.flush()?;
    Ok(())
}

pub fn handle_params(file: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let c3d = C3dFile::import(&file)?;
    let mut w = output(out.as_deref())?;
    text::write_parameters(&c3d.parameters, &mut w)?;
    w.flush()?;
    Ok(())
}

pub fn handle_points(file: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let c3d = C3dFile::import(&file)?;
    let mut w = output(out.as_deref())?;
    csv::write_points(&c3d.data, c3d.point_count(), &mut w)?;
    w.flush()?;
    Ok(())
}

pub fn handle_analog(file: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let c3d = C3dFile::import(&file)?;
    if c3d.analog_count() == 0 {
        info!(path = %file.display(), "no analog channels");
    }
    let mut w = output(out.as_deref())?;
    csv::write_analog(&c3d.data, c3d.analog_count(), &mut w)?;
    w.flush()?;
    Ok(())
}

pub fn handle_info(file: PathBuf, json: bool, out: Option<PathBuf>) -> Result<()> {
    let c3d = C3dFile::import(&file)?;
    let summary = summarize(&file, &c3d);
    let mut w = output(out.as_deref())?;
    if json {
        writeln!(w, "{}", to_json(&summary)?)?;
    } else {
        writeln!(w, "{}", summary_line(&summary))?;
        if !c3d.point.labels.is_empty() {
            writeln!(w, "labels: {}", c3d.point.labels.join(" "))?;
        }
        let groups: Vec<String> = c3d
            .parameters
            .groups
            .iter()
            .map(|g| format!("{}({})", g.name, g.parameters.len()))
            .collect();
        writeln!(w, "groups: {}", groups.join(" "))?;
        let chars = c3d
            .parameters
            .groups
            .iter()
            .flat_map(|g| &g.parameters)
            .filter(|p| p.data.format() == ByteFormat::Char)
            .count();
        writeln!(
            w,
            "parameters: {} ({} text)",
            c3d.parameters.parameter_count(),
            chars
        )?;
    }
    w.flush()?;
    Ok(())
}

/// Files under `dir` with a `.c3d` extension in any case, sorted by path.
pub fn find_c3d_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|x| x.to_str())
                .is_some_and(|x| x.eq_ignore_ascii_case("c3d"))
        })
        .collect();
    files.sort();
    files
}

pub fn handle_scan(dir: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let files = find_c3d_files(&dir);
    let mut w = output(out.as_deref())?;
    let mut failed = 0usize;
    for path in &files {
        match C3dFile::import(path) {
            Ok(c3d) => writeln!(w, "{}", summary_line(&summarize(path, &c3d)))?,
            Err(e) => {
                failed += 1;
                warn!(path = %path.display(), error = %e, "import failed");
                writeln!(w, "{}: error: {e}", path.display())?;
            }
        }
    }
    w.flush()?;
    info!(files = files.len(), failed, "scan finished");
    Ok(())
}

fn open_session(file: &Path, config: ViewerConfig, k: Option<usize>) -> Result<Session> {
    let mut session = Session::new(config);
    session.load(file)?;
    if let Some(k) = k {
        session.recluster(k)?;
    }
    Ok(session)
}

pub fn handle_cluster(
    file: PathBuf,
    config: ViewerConfig,
    k: Option<usize>,
    json: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let session = open_session(&file, config, k)?;
    let rows = session.clusters();
    let cloud = session.cloud();
    let mut w = output(out.as_deref())?;
    if json {
        writeln!(w, "{}", to_json(&rows)?)?;
    } else {
        for r in &rows {
            let members: Vec<String> = r
                .member_ids
                .iter()
                .map(|&id| match cloud.map(|c| c.name(id)) {
                    Some(name) if !name.is_empty() => name.to_string(),
                    _ => format!("#{id}"),
                })
                .collect();
            writeln!(
                w,
                "{:<16} centroid=({:.4}, {:.4}, {:.4}) members={}",
                r.name,
                r.centroid.x,
                r.centroid.y,
                r.centroid.z,
                members.join(",")
            )?;
        }
    }
    w.flush()?;
    Ok(())
}

pub fn handle_bones(
    file: PathBuf,
    config: ViewerConfig,
    k: Option<usize>,
    cluster: Option<String>,
    json: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut session = open_session(&file, config, k)?;
    let name = match cluster {
        Some(n) => n,
        None => session.cluster(0)?.name,
    };
    let pairs = session.infer_bones(&name)?.pairs();
    let mut w = output(out.as_deref())?;
    if json {
        writeln!(w, "{}", to_json(&session.bone_graph())?)?;
    } else {
        let label = |id: usize| {
            session
                .cloud()
                .map(|c| c.name(id).to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("#{id}"))
        };
        writeln!(w, "{name}: {} bones", pairs.len())?;
        for (a, b) in pairs {
            writeln!(w, "{} - {}", label(a), label(b))?;
        }
    }
    w.flush()?;
    Ok(())
}

pub fn handle_play(
    file: PathBuf,
    config: ViewerConfig,
    ticks: usize,
    velocity: Option<i32>,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut session = open_session(&file, config, None)?;
    if let Some(v) = velocity {
        session.set_velocity(v);
    }
    session.play(true);
    let cadence = Duration::from_millis(session.config().tick_ms);
    let mut w = output(out.as_deref())?;
    for t in 1..=ticks {
        if t > 1 {
            std::thread::sleep(cadence);
        }
        let frame = session.tick();
        match session.centroid(frame) {
            Some(c) => writeln!(
                w,
                "tick {t}: frame {frame} centroid=({:.4}, {:.4}, {:.4}) visible={}",
                c.x,
                c.y,
                c.z,
                session.visible_points(frame).len()
            )?,
            None => writeln!(w, "tick {t}: frame {frame}")?,
        }
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 marker, 2 frames, int16, little endian; labels "HEAD", units "mm".
    fn sample() -> Vec<u8> {
        let mut h = vec![0u8; 512];
        h[0] = 2;
        h[1] = 80;
        h[2..4].copy_from_slice(&1u16.to_le_bytes());
        h[6..8].copy_from_slice(&1u16.to_le_bytes());
        h[8..10].copy_from_slice(&2u16.to_le_bytes());
        h[12..16].copy_from_slice(&1.0f32.to_le_bytes());
        h[16..18].copy_from_slice(&3u16.to_le_bytes());
        h[20..24].copy_from_slice(&50.0f32.to_le_bytes());

        let mut p = vec![1u8, 80, 1, 84];
        p.extend_from_slice(&[5, (-1i8) as u8]);
        p.extend_from_slice(b"POINT");
        p.extend_from_slice(&1i16.to_le_bytes());
        p.push(0);
        p.extend_from_slice(&[6, 1]);
        p.extend_from_slice(b"LABELS");
        p.extend_from_slice(&1i16.to_le_bytes());
        p.extend_from_slice(&[(-1i8) as u8, 1, 4]);
        p.extend_from_slice(b"HEAD");
        p.push(0);
        p.extend_from_slice(&[5, 1]);
        p.extend_from_slice(b"UNITS");
        p.extend_from_slice(&0i16.to_le_bytes());
        p.extend_from_slice(&[(-1i8) as u8, 1, 2]);
        p.extend_from_slice(b"mm");
        p.push(0);
        p.resize(512, 0);

        let mut d = Vec::new();
        for x in [100i16, 200] {
            for v in [x, 20, 30] {
                d.extend_from_slice(&v.to_le_bytes());
            }
            d.extend_from_slice(&[1, 0]);
        }

        [h, p, d].concat()
    }

    fn write_sample(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, sample()).unwrap();
        path
    }

    #[test]
    fn test_points_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_sample(&dir, "a.c3d");
        let out = dir.path().join("points.csv");
        handle_points(file, Some(out.clone())).unwrap();
        let text = std::fs::read_to_string(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "FrameNumber;X_1;Y_1;Z_1;Camera_1;Residual_1");
        assert_eq!(
            lines[1],
            "1;100.000000;20.000000;30.000000;1.000000;0.000000"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_info_json_summary() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_sample(&dir, "a.c3d");
        let out = dir.path().join("info.json");
        handle_info(file, true, Some(out.clone())).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(v["frames"], 2);
        assert_eq!(v["points"], 1);
        assert_eq!(v["units"], "mm");
        assert_eq!(v["big_endian"], false);
        assert_eq!(v["frame_rate"], 50.0);
    }

    #[test]
    fn test_scan_reports_good_and_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(&dir, "walk.C3D");
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("broken.c3d"), [2u8, 80, 0]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let found = find_c3d_files(dir.path());
        assert_eq!(found.len(), 2);

        let out = dir.path().join("scan.txt");
        handle_scan(dir.path().to_path_buf(), Some(out.clone())).unwrap();
        let text = std::fs::read_to_string(out).unwrap();
        assert!(text.contains("walk.C3D: 2 frames"));
        assert!(text.contains("broken.c3d: error:"));
    }

    #[test]
    fn test_cluster_and_play_output() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_sample(&dir, "a.c3d");

        let out = dir.path().join("clusters.txt");
        handle_cluster(
            file.clone(),
            ViewerConfig::default(),
            None,
            false,
            Some(out.clone()),
        )
        .unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Cluster_0 (1)"));
        assert!(text.contains("members=HEAD"));

        let out = dir.path().join("play.txt");
        handle_play(file, ViewerConfig::default(), 3, Some(1), Some(out.clone())).unwrap();
        let lines: Vec<String> = std::fs::read_to_string(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("tick 1: frame 1 centroid=(0.2000, 0.0200, 0.0300)"));
        assert!(lines[1].starts_with("tick 2: frame 0 "));
    }

    #[test]
    fn test_bones_on_unknown_cluster_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_sample(&dir, "a.c3d");
        let err = handle_bones(
            file,
            ViewerConfig::default(),
            None,
            Some("nope".into()),
            false,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, MocapError::NotFound(_)));
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, MocapError::Io(_)));
        assert_eq!(load_config(None).unwrap(), ViewerConfig::default());
    }
}
