use serde::{Deserialize, Serialize};

/// Orientation requested for video capture connections.
///
/// A connection that does not support the requested orientation is skipped,
/// not failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Quality preset applied to the capture session as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPreset {
    Low,
    Medium,
    High,
    Hd1280x720,
    Hd1920x1080,
}

/// Session-wide capture configuration.
///
/// Stored on the session and re-applied to every active connection whenever
/// a value changes inside a configuration transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfiguration {
    pub orientation: VideoOrientation,
    pub frame_rate: f64,
    pub preset: SessionPreset,
}

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_rate <= 0.0 {
            return Err("frame rate must be positive".into());
        }
        if self.frame_rate > 240.0 {
            return Err(format!("frame rate out of range: {}", self.frame_rate));
        }
        Ok(())
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            orientation: VideoOrientation::LandscapeRight,
            frame_rate: 30.0,
            preset: SessionPreset::Medium,
        }
    }
}
