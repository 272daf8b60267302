use crate::container::directory::ParameterDirectory;

// Missing or mistyped parameters fall back to the field default.
fn first_i16(dir: &ParameterDirectory, group: &str, name: &str) -> i16 {
    dir.i16s(group, name)
        .ok()
        .and_then(|v| v.first().copied())
        .unwrap_or_default()
}

fn first_f32(dir: &ParameterDirectory, group: &str, name: &str) -> f32 {
    dir.f32s(group, name)
        .ok()
        .and_then(|v| v.first().copied())
        .unwrap_or_default()
}

fn triple_i16(dir: &ParameterDirectory, group: &str, name: &str) -> [i16; 3] {
    match dir.i16s(group, name) {
        Ok(v) if v.len() >= 3 => [v[0], v[1], v[2]],
        _ => [0; 3],
    }
}

fn text(dir: &ParameterDirectory, group: &str, name: &str) -> String {
    dir.text(group, name).unwrap_or_default()
}

fn words(dir: &ParameterDirectory, group: &str, name: &str) -> Vec<String> {
    dir.words(group, name).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Signed axis named by `POINT:X_SCREEN` / `POINT:Y_SCREEN`, e.g. `+X` or `-Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAxis {
    pub axis: Axis,
    pub negative: bool,
}

impl ScreenAxis {
    pub fn parse(s: &str) -> Option<Self> {
        let b = s.trim().as_bytes();
        if b.len() != 2 {
            return None;
        }
        let negative = match b[0] {
            b'+' => false,
            b'-' => true,
            _ => return None,
        };
        let axis = match b[1] {
            b'X' => Axis::X,
            b'Y' => Axis::Y,
            b'Z' => Axis::Z,
            _ => return None,
        };
        Some(Self { axis, negative })
    }

    fn sign(self) -> f32 {
        if self.negative { -1.0 } else { 1.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointGroup {
    pub used: i16,
    pub scale: f32,
    pub rate: f32,
    pub data_start: i16,
    pub frames: i16,
    pub labels: Vec<String>,
    pub descriptions: Vec<String>,
    pub units: String,
    pub initial_command: String,
    pub x_screen: String,
    pub y_screen: String,
    pub movie_delay: f32,
    pub labels2: Vec<String>,
    pub descriptions2: Vec<String>,
    pub type_groups: Vec<String>,
    pub angles: Vec<String>,
    pub angle_units: String,
    pub scalars: Vec<String>,
    pub scalar_units: String,
    pub powers: Vec<String>,
    pub power_units: String,
    pub forces: Vec<String>,
    pub force_units: String,
    pub moments: Vec<String>,
    pub moment_units: String,
    pub reactions: Vec<String>,
}

impl PointGroup {
    pub fn from_directory(dir: &ParameterDirectory) -> Self {
        const G: &str = "POINT";
        Self {
            used: first_i16(dir, G, "USED"),
            scale: first_f32(dir, G, "SCALE"),
            rate: first_f32(dir, G, "RATE"),
            data_start: first_i16(dir, G, "DATA_START"),
            frames: first_i16(dir, G, "FRAMES"),
            labels: words(dir, G, "LABELS"),
            descriptions: words(dir, G, "DESCRIPTIONS"),
            units: text(dir, G, "UNITS").trim().to_string(),
            initial_command: text(dir, G, "INITIAL_COMMAND"),
            x_screen: text(dir, G, "X_SCREEN").trim().to_string(),
            y_screen: text(dir, G, "Y_SCREEN").trim().to_string(),
            movie_delay: first_f32(dir, G, "MOVIE_DELAY"),
            labels2: words(dir, G, "LABELS2"),
            descriptions2: words(dir, G, "DESCRIPTIONS2"),
            type_groups: words(dir, G, "TYPE_GROUPS"),
            angles: words(dir, G, "ANGLES"),
            angle_units: text(dir, G, "ANGLE_UNITS").trim().to_string(),
            scalars: words(dir, G, "SCALARS"),
            scalar_units: text(dir, G, "SCALAR_UNITS").trim().to_string(),
            powers: words(dir, G, "POWERS"),
            power_units: text(dir, G, "POWER_UNITS").trim().to_string(),
            forces: words(dir, G, "FORCES"),
            force_units: text(dir, G, "FORCE_UNITS").trim().to_string(),
            moments: words(dir, G, "MOMENTS"),
            moment_units: text(dir, G, "MOMENT_UNITS").trim().to_string(),
            reactions: words(dir, G, "REACTIONS"),
        }
    }

    pub fn multiplier_for_meters(&self) -> f32 {
        multiplier_for_meters(&self.units)
    }

    /// Convert device coordinates to the viewer's Y-up frame.
    ///
    /// Applies only when both screen parameters are set. An unrecognised
    /// Y_SCREEN keeps the raw y and z.
    pub fn check_screens(&self, x: f32, y: f32, z: f32) -> [f32; 3] {
        if self.x_screen.is_empty() || self.y_screen.is_empty() {
            return [x, y, z];
        }
        let (Some(sx), sy) = (
            ScreenAxis::parse(&self.x_screen),
            ScreenAxis::parse(&self.y_screen),
        ) else {
            return [x, y, z];
        };
        let sign_y = sy.map(ScreenAxis::sign).unwrap_or(1.0);
        let sy = sy.map(|s| s.axis);

        let pick = |a: Axis| match a {
            Axis::X => x,
            Axis::Y => y,
            Axis::Z => z,
        };
        let nx = sx.sign() * pick(sx.axis);
        let (ny, nz) = match (sx.axis, sy) {
            (Axis::X, Some(Axis::Y)) => (sign_y * y, -z),
            (Axis::X, Some(Axis::Z)) => (sign_y * z, -y),
            (Axis::Y, Some(Axis::X)) => (sign_y * x, -z),
            (Axis::Y, Some(Axis::Z)) => (sign_y * z, -x),
            (Axis::Z, Some(Axis::X)) => (sign_y * x, -y),
            (Axis::Z, Some(Axis::Y)) => (sign_y * y, -x),
            _ => (y, z),
        };
        [nx, ny, nz]
    }
}

/// Metres per unit of `POINT:UNITS`; unknown or empty units count as metres.
pub fn multiplier_for_meters(units: &str) -> f32 {
    match units.trim().to_ascii_lowercase().as_str() {
        "mm" => 0.001,
        "cm" => 0.01,
        "dm" => 0.1,
        "m" => 1.0,
        "km" => 1000.0,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trial {
    pub actual_start_field: i16,
    pub actual_end_field: i16,
    pub video_rate_divider: i16,
    pub camera_rate: f32,
    pub date: [i16; 3],
    pub time: [i16; 3],
}

impl Trial {
    pub fn from_directory(dir: &ParameterDirectory) -> Self {
        const G: &str = "TRIAL";
        Self {
            actual_start_field: first_i16(dir, G, "ACTUAL_START_FIELD"),
            actual_end_field: first_i16(dir, G, "ACTUAL_END_FIELD"),
            video_rate_divider: first_i16(dir, G, "VIDEO_RATE_DIVIDER"),
            camera_rate: first_f32(dir, G, "CAMERA_RATE"),
            date: triple_i16(dir, G, "DATE"),
            time: triple_i16(dir, G, "TIME"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subjects {
    pub is_static: i16,
    pub names: Vec<String>,
    pub model_params: Vec<String>,
    pub uses_prefixes: i16,
    pub label_prefixes: Vec<String>,
    pub used: i16,
    pub marker_sets: Vec<String>,
    pub display_sets: Vec<String>,
    pub models: Vec<String>,
}

impl Subjects {
    pub fn from_directory(dir: &ParameterDirectory) -> Self {
        const G: &str = "SUBJECTS";
        Self {
            is_static: first_i16(dir, G, "IS_STATIC"),
            names: words(dir, G, "NAMES"),
            model_params: words(dir, G, "MODEL_PARAMS"),
            uses_prefixes: first_i16(dir, G, "USES_PREFIXES"),
            label_prefixes: words(dir, G, "LABEL_PREFIXES"),
            used: first_i16(dir, G, "USED"),
            marker_sets: words(dir, G, "MARKER_SETS"),
            display_sets: words(dir, G, "DISPLAY_SETS"),
            models: words(dir, G, "MODELS"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manufacturer {
    pub company: String,
    pub software: String,
    pub version: String,
}

impl Manufacturer {
    pub fn from_directory(dir: &ParameterDirectory) -> Self {
        const G: &str = "MANUFACTURER";
        let version = dir
            .text(G, "VERSION")
            .or_else(|_| dir.text(G, "VERSION_LABEL"))
            .unwrap_or_default();
        Self {
            company: text(dir, G, "COMPANY"),
            software: text(dir, G, "SOFTWARE"),
            version,
        }
    }
}
