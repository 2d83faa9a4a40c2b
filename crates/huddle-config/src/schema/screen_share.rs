//! Screen share quality presets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Capture resolution requested when a share starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd720,
    #[default]
    #[serde(rename = "1080p")]
    Hd1080,
    #[serde(rename = "1440p")]
    Qhd1440,
    #[serde(rename = "4k")]
    Uhd4k,
    /// Native resolution of the captured surface.
    #[serde(rename = "source")]
    Source,
}

impl Resolution {
    /// Ideal `(width, height)`, or `None` for [`Resolution::Source`].
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Self::Hd720 => Some((1280, 720)),
            Self::Hd1080 => Some((1920, 1080)),
            Self::Qhd1440 => Some((2560, 1440)),
            Self::Uhd4k => Some((3840, 2160)),
            Self::Source => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hd720 => "720p",
            Self::Hd1080 => "1080p",
            Self::Qhd1440 => "1440p",
            Self::Uhd4k => "4k",
            Self::Source => "source",
        };
        f.write_str(label)
    }
}

/// Capture frame rate. Stored as a number (`30`, `60`, `120`) or `"max"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFrameRate", into = "RawFrameRate")]
pub enum FrameRate {
    Fps30,
    #[default]
    Fps60,
    Fps120,
    /// No frame-rate constraint.
    Max,
}

impl FrameRate {
    /// Ideal frames per second, or `None` for [`FrameRate::Max`].
    pub fn ideal(&self) -> Option<u32> {
        match self {
            Self::Fps30 => Some(30),
            Self::Fps60 => Some(60),
            Self::Fps120 => Some(120),
            Self::Max => None,
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ideal() {
            Some(fps) => write!(f, "{fps} FPS"),
            None => f.write_str("Max FPS"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawFrameRate {
    Number(u32),
    Text(String),
}

impl TryFrom<RawFrameRate> for FrameRate {
    type Error = String;

    fn try_from(raw: RawFrameRate) -> Result<Self, Self::Error> {
        match raw {
            RawFrameRate::Number(30) => Ok(Self::Fps30),
            RawFrameRate::Number(60) => Ok(Self::Fps60),
            RawFrameRate::Number(120) => Ok(Self::Fps120),
            RawFrameRate::Text(s) if s == "max" => Ok(Self::Max),
            RawFrameRate::Number(n) => Err(format!("unsupported fps {n}")),
            RawFrameRate::Text(s) => Err(format!("unsupported fps \"{s}\"")),
        }
    }
}

impl From<FrameRate> for RawFrameRate {
    fn from(fps: FrameRate) -> Self {
        match fps.ideal() {
            Some(n) => RawFrameRate::Number(n),
            None => RawFrameRate::Text("max".into()),
        }
    }
}

/// Quality used the next time screen sharing starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenShareSettings {
    pub resolution: Resolution,
    pub fps: FrameRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_1080p_at_60() {
        let settings = ScreenShareSettings::default();
        assert_eq!(settings.resolution, Resolution::Hd1080);
        assert_eq!(settings.fps, FrameRate::Fps60);
    }

    #[test]
    fn parses_numeric_and_max_fps() {
        let s: ScreenShareSettings = toml::from_str("resolution = \"4k\"\nfps = 120").unwrap();
        assert_eq!(s.resolution, Resolution::Uhd4k);
        assert_eq!(s.fps, FrameRate::Fps120);

        let s: ScreenShareSettings = toml::from_str("resolution = \"source\"\nfps = \"max\"").unwrap();
        assert_eq!(s.resolution, Resolution::Source);
        assert_eq!(s.fps, FrameRate::Max);
    }

    #[test]
    fn rejects_unknown_fps() {
        assert!(toml::from_str::<ScreenShareSettings>("fps = 45").is_err());
        assert!(toml::from_str::<ScreenShareSettings>("fps = \"fast\"").is_err());
    }

    #[test]
    fn max_fps_serializes_as_string() {
        let settings = ScreenShareSettings {
            resolution: Resolution::Hd720,
            fps: FrameRate::Max,
        };
        let text = toml::to_string(&settings).unwrap();
        assert!(text.contains("resolution = \"720p\""));
        assert!(text.contains("fps = \"max\""));
    }

    #[test]
    fn source_has_no_dimensions() {
        assert_eq!(Resolution::Source.dimensions(), None);
        assert_eq!(Resolution::Qhd1440.dimensions(), Some((2560, 1440)));
        assert_eq!(FrameRate::Fps30.to_string(), "30 FPS");
        assert_eq!(FrameRate::Max.to_string(), "Max FPS");
    }
}
