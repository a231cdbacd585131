//! RON-backed engine configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```ron
//! (
//!     map: (seed: 7),
//!     strategy: Metatile,
//!     mode: Windowed,
//! )
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::cell::MAX_HEIGHT;
use crate::world::tile::TILE_SIZE;
use crate::world::tileset::MAX_TILES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config i/o: {0}")]
    Io(#[from] io::Error),

    #[error("config parse: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("config serialize: {0}")]
    Serialize(#[from] ron::Error),

    #[error("{0}: expected a .ron file")]
    Extension(PathBuf),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tile-store lookup backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupKind {
    Linear,
    #[default]
    Hashed,
}

/// How the world compiler turns cells into tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Rasterize cubes into a scratch buffer, then cut it into tiles.
    #[default]
    Rasterize,
    /// Composite predefined metatiles straight onto the tile map.
    Metatile,
}

/// What the engine keeps compiled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Compile the whole world once, then only stream.
    #[default]
    Precompiled,
    /// Recompile a camera-centred region whenever the camera drifts away.
    Windowed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dims {
    pub w: usize,
    pub h: usize,
}

impl Dims {
    pub const fn new(w: usize, h: usize) -> Self {
        Self { w, h }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub cols: usize,
    pub rows: usize,
    pub max_height: u8,
    pub seed: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cols: 200,
            rows: 16,
            max_height: MAX_HEIGHT,
            seed: 0x1234_5678,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub map: MapConfig,
    /// Tile store capacity, including the reserved empty tile.
    pub max_tiles: usize,
    pub lookup: LookupKind,
    pub strategy: Strategy,
    pub mode: Mode,
    /// Compile patch interior, in pixels.
    pub patch: Dims,
    /// Hardware mirror edge, in tile entries.
    pub mirror: usize,
    /// Display size, in pixels.
    pub screen: Dims,
    /// Region recompiled in windowed mode, in tiles.
    pub window_region: Dims,
    /// Camera drift (pixels, per axis) that starts a windowed recompile.
    pub rerender_threshold: i32,
    pub raster_slices: usize,
    pub extract_slices: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            max_tiles: MAX_TILES,
            lookup: LookupKind::default(),
            strategy: Strategy::default(),
            mode: Mode::default(),
            patch: Dims::new(512, 320),
            mirror: 64,
            screen: Dims::new(240, 160),
            window_region: Dims::new(64, 40),
            rerender_threshold: 64,
            raster_slices: 4,
            extract_slices: 5,
        }
    }
}

impl EngineConfig {
    /// Load and validate, falling back to defaults (with an error log) when
    /// the file is missing or broken.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::load_no_fallback(path).unwrap_or_else(|e| {
            log::error!("failed to load config '{}': {e}", path.display());
            Self::default()
        })
    }

    pub fn load_no_fallback<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("ron") {
            return Err(ConfigError::Extension(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = ron::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bad = |msg: String| Err(ConfigError::Invalid(msg));
        let t = TILE_SIZE;

        if self.map.cols == 0 || self.map.rows == 0 {
            return bad(format!("map {}x{} is empty", self.map.cols, self.map.rows));
        }
        if self.map.max_height > 16 {
            return bad(format!("max_height {} above 16", self.map.max_height));
        }
        if !(2..=u16::MAX as usize).contains(&self.max_tiles) {
            return bad(format!("max_tiles {} outside 2..=65535", self.max_tiles));
        }
        if !self.mirror.is_power_of_two() || self.mirror < 32 {
            return bad(format!("mirror {} is not a power of two >= 32", self.mirror));
        }
        if self.patch.w == 0 || self.patch.h == 0 || self.patch.w % t != 0 || self.patch.h % t != 0 {
            return bad(format!(
                "patch {}x{} must be a non-empty multiple of {t}",
                self.patch.w, self.patch.h
            ));
        }
        if self.screen.w + t > self.mirror * t || self.screen.h + t > self.mirror * t {
            return bad(format!(
                "screen {}x{} does not fit a {} entry mirror",
                self.screen.w, self.screen.h, self.mirror
            ));
        }
        if self.raster_slices == 0 || self.extract_slices == 0 {
            return bad("slice counts must be at least 1".into());
        }
        if self.rerender_threshold <= 0 {
            return bad(format!("rerender_threshold {} must be positive", self.rerender_threshold));
        }
        if self.mode == Mode::Windowed {
            let region = Dims::new(self.window_region.w * t, self.window_region.h * t);
            if region.w > self.patch.w || region.h > self.patch.h {
                return bad(format!(
                    "window region {}x{} px larger than patch {}x{}",
                    region.w, region.h, self.patch.w, self.patch.h
                ));
            }
            if region.w < self.screen.w || region.h < self.screen.h {
                return bad(format!(
                    "window region {}x{} px smaller than the screen",
                    region.w, region.h
                ));
            }
            if self.window_region.w > self.mirror || self.window_region.h > self.mirror {
                return bad(format!(
                    "window region {}x{} tiles larger than the mirror",
                    self.window_region.w, self.window_region.h
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        cfg.validate().unwrap();
        let windowed = EngineConfig {
            mode: Mode::Windowed,
            ..EngineConfig::default()
        };
        windowed.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = EngineConfig::from_ron_str("(map: (seed: 7), strategy: Metatile, lookup: Linear)").unwrap();
        assert_eq!(cfg.map.seed, 7);
        assert_eq!(cfg.map.cols, 200);
        assert_eq!(cfg.strategy, Strategy::Metatile);
        assert_eq!(cfg.lookup, LookupKind::Linear);
        assert_eq!(cfg.mirror, 64);
    }

    #[test]
    fn rejects_bad_values() {
        for text in [
            "(mirror: 48)",
            "(patch: (w: 500, h: 320))",
            "(max_tiles: 70000)",
            "(raster_slices: 0)",
            "(mode: Windowed, window_region: (w: 80, h: 40))",
            "(map: (cols: 0))",
        ] {
            let err = EngineConfig::from_ron_str(text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{text}: {err}");
        }
        assert!(matches!(
            EngineConfig::from_ron_str("(mirror: \"big\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.ron");
        let cfg = EngineConfig {
            max_tiles: 512,
            mode: Mode::Windowed,
            ..EngineConfig::default()
        };
        cfg.write(&path).unwrap();
        assert_eq!(EngineConfig::load_no_fallback(&path).unwrap(), cfg);

        let txt = dir.path().join("engine.txt");
        fs::write(&txt, "()").unwrap();
        assert!(matches!(
            EngineConfig::load_no_fallback(&txt),
            Err(ConfigError::Extension(_))
        ));

        // missing file falls back to defaults
        assert_eq!(EngineConfig::load(dir.path().join("missing.ron")), EngineConfig::default());
    }
}
