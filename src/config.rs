//! Renderer settings, stored as RON.
//!
//! ```ron
//! (width: 320, height: 200, fov_degrees: 90.0, near: 0.125, far: 32.0,
//!  max_spans: 8192, max_posts: 4096, max_vertices: 16384)
//! ```
//! Missing fields take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{fixed::Fixed, spans::MAX_SORT_DEPTH};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub fov_degrees: f32,
    /// Near bound in tiles.
    pub near: f32,
    /// Far bound in tiles.
    pub far: f32,
    pub max_spans: usize,
    pub max_posts: usize,
    pub max_vertices: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            fov_degrees: 90.0,
            near: 0.125,
            far: 32.0,
            max_spans: 8192,
            max_posts: 4096,
            max_vertices: 16384,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl RenderConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loading render config from {}", path.display());
        Self::from_ron_str(&text)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = ron::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "screen must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_degrees must be in (0, 180), got {}",
                self.fov_degrees
            )));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(ConfigError::Invalid(format!(
                "need 0 < near < far, got near {} far {}",
                self.near, self.far
            )));
        }
        // spans past this depth would share sort keys
        if self.far_bound() > MAX_SORT_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "far {} exceeds the sortable depth {}",
                self.far, MAX_SORT_DEPTH
            )));
        }
        if self.max_spans == 0 || self.max_posts == 0 || self.max_vertices == 0 {
            return Err(ConfigError::Invalid("buffer capacities must be non-zero".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn near_bound(&self) -> Fixed {
        Fixed::from_f32(self.near)
    }

    #[inline]
    pub fn far_bound(&self) -> Fixed {
        Fixed::from_f32(self.far)
    }
}
