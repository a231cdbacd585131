use glam::IVec2;
use thiserror::Error;

use super::compiler::{CompileError, CompileStats, WorldCompiler};
use super::scheduler::{Scheduler, Work};
use super::stream::{StreamDelta, StreamingWindow};
use super::types::{Region, Screen, WorldExtent};
use crate::config::{ConfigError, EngineConfig, Mode};
use crate::renderer::Display;
use crate::world::cell::{IsoMap, MapError};
use crate::world::generator;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// What changed this frame, for the display.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub scroll: IVec2,
    pub delta: StreamDelta,
    /// The atlas was rebuilt and must be uploaded before `delta`.
    pub upload_atlas: bool,
}

/// Compiler, streaming window and (in windowed mode) scheduler wired into
/// one per-frame step. Positions are world pixels.
pub struct Engine {
    cfg: EngineConfig,
    map: IsoMap,
    compiler: WorldCompiler,
    window: StreamingWindow,
    scheduler: Option<Scheduler>,
}

impl Engine {
    pub fn new(map: IsoMap, cfg: EngineConfig) -> Result<Self, EngineError> {
        cfg.validate()?;
        let compiler = WorldCompiler::new(&map, &cfg);
        let screen = Screen::new(cfg.screen.w as i32, cfg.screen.h as i32);
        let window = StreamingWindow::new(cfg.mirror, screen);
        let scheduler = (cfg.mode == Mode::Windowed).then(|| {
            Scheduler::new(
                cfg.rerender_threshold,
                cfg.raster_slices,
                cfg.extract_slices,
                IVec2::ZERO,
            )
        });
        Ok(Self {
            cfg,
            map,
            compiler,
            window,
            scheduler,
        })
    }

    /// Generate the configured map and build an engine around it.
    pub fn from_config(cfg: EngineConfig) -> Result<Self, EngineError> {
        cfg.validate()?;
        let m = &cfg.map;
        let map = generator::generate(m.cols, m.rows, m.max_height, m.seed)?;
        Self::new(map, cfg)
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    #[inline]
    pub fn map(&self) -> &IsoMap {
        &self.map
    }

    #[inline]
    pub fn extent(&self) -> &WorldExtent {
        self.compiler.extent()
    }

    #[inline]
    pub fn compiler(&self) -> &WorldCompiler {
        &self.compiler
    }

    #[inline]
    pub fn window(&self) -> &StreamingWindow {
        &self.window
    }

    #[inline]
    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.scheduler.as_ref()
    }

    #[inline]
    pub fn stats(&self) -> &CompileStats {
        self.compiler.stats()
    }

    fn window_region(&self, center_px: IVec2) -> Region {
        let r = self.cfg.window_region;
        self.extent().region_around(center_px, r.w, r.h)
    }

    /// Compile what the mode needs around `camera_px` in one go and load the
    /// whole mirror.
    pub fn boot(&mut self, camera_px: IVec2) -> Result<Frame, EngineError> {
        match self.scheduler.as_mut() {
            None => {
                self.compiler.compile_world(&self.map);
            }
            Some(sched) => {
                let r = self.cfg.window_region;
                let region = self.compiler.extent().region_around(camera_px, r.w, r.h);
                self.compiler.compile_region(&self.map, region)?;
                sched.commit(camera_px);
            }
        }
        let delta = self.window.full_reload(camera_px, self.compiler.tile_map());
        Ok(Frame {
            scroll: self.window.scroll(camera_px),
            delta,
            upload_atlas: true,
        })
    }

    /// One frame of work for a camera at `camera_px`.
    ///
    /// Precompiled: incremental streaming only. Windowed: one scheduler step;
    /// the mirror is left alone while a cycle is rebuilding the tile map and
    /// is reloaded in full when the cycle uploads.
    pub fn frame(&mut self, camera_px: IVec2) -> Result<Frame, EngineError> {
        let Some(sched) = self.scheduler.as_mut() else {
            let delta = self.window.update(camera_px, self.compiler.tile_map());
            return Ok(Frame {
                scroll: self.window.scroll(camera_px),
                delta,
                upload_atlas: false,
            });
        };

        let work = sched.tick(camera_px);
        let idle = sched.phase().is_idle();
        let mut frame = Frame::default();
        match work {
            Work::Idle => {
                frame.delta = self.window.update(camera_px, self.compiler.tile_map());
            }
            Work::Rasterize { slice, of, target } => {
                if slice == 0 {
                    let region = self.window_region(target);
                    self.compiler.begin_region(region)?;
                }
                self.compiler.rasterize_slice(&self.map, slice, of)?;
            }
            Work::Extract { slice, of } => self.compiler.extract_slice(slice, of)?,
            Work::Upload { .. } => {
                frame.delta = self.window.full_reload(camera_px, self.compiler.tile_map());
                frame.upload_atlas = true;
            }
        }
        debug_assert!(idle || frame.delta.is_empty());
        frame.scroll = self.window.scroll(camera_px);
        Ok(frame)
    }

    /// Push `frame` to the display: atlas first, then mirror entries, then
    /// scroll.
    pub fn present(&self, display: &mut Display, frame: &Frame) {
        if frame.upload_atlas {
            display.upload_atlas(self.compiler.atlas());
        }
        display.apply(&self.window, &frame.delta);
        display.set_scroll(frame.scroll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Dims, MapConfig, Strategy};
    use crate::world::palette::Palette;

    fn small(mode: Mode, strategy: Strategy) -> EngineConfig {
        EngineConfig {
            map: MapConfig {
                cols: 80,
                rows: 16,
                max_height: 4,
                seed: 3,
            },
            mode,
            strategy,
            window_region: Dims::new(40, 30),
            rerender_threshold: 32,
            raster_slices: 3,
            extract_slices: 2,
            ..EngineConfig::default()
        }
    }

    fn vram_matches_window(display: &Display, engine: &Engine) {
        let w = engine.window();
        for r in 0..w.size() {
            for c in 0..w.size() {
                assert_eq!(display.vram().get(c, r), w.slot(c, r), "slot ({c},{r})");
            }
        }
    }

    #[test]
    fn precompiled_streams_every_frame() {
        let mut engine = Engine::from_config(small(Mode::Precompiled, Strategy::Rasterize)).unwrap();
        let mut display = Display::new(64, Palette::default());
        let mut cam = IVec2::new(200, 150);

        let boot = engine.boot(cam).unwrap();
        assert!(boot.upload_atlas && boot.delta.full_reload);
        engine.present(&mut display, &boot);
        assert_eq!(display.atlas().len(), engine.stats().tiles);

        for _ in 0..300 {
            cam += IVec2::new(3, 1);
            let f = engine.frame(cam).unwrap();
            assert!(!f.upload_atlas);
            engine.present(&mut display, &f);
        }
        assert_eq!(engine.window().first_mismatch(engine.compiler().tile_map()), None);
        vram_matches_window(&display, &engine);
        assert_eq!(display.atlas().len(), engine.stats().tiles);
    }

    #[test]
    fn windowed_recompiles_after_drift() {
        for strategy in [Strategy::Rasterize, Strategy::Metatile] {
            let cfg = small(Mode::Windowed, strategy);
            let mut engine = Engine::from_config(cfg.clone()).unwrap();
            let mut display = Display::new(64, Palette::default());
            let start = IVec2::new(300, 200);
            let boot = engine.boot(start).unwrap();
            engine.present(&mut display, &boot);
            let first = engine.compiler().tile_map().origin();

            // stay put: nothing happens
            let f = engine.frame(start).unwrap();
            assert!(f.delta.is_empty() && !f.upload_atlas);

            // jump past the threshold and run one whole cycle
            let moved = start + IVec2::new(120, 0);
            let cycle = cfg.raster_slices + cfg.extract_slices + 1;
            let mut uploads = 0;
            for i in 0..cycle {
                let f = engine.frame(moved).unwrap();
                if i + 1 < cycle {
                    assert!(f.delta.is_empty(), "{strategy:?} frame {i}");
                }
                uploads += f.upload_atlas as usize;
                engine.present(&mut display, &f);
            }
            assert_eq!(uploads, 1);
            let sched = engine.scheduler().unwrap();
            assert!(sched.phase().is_idle());
            assert_eq!(sched.committed(), moved);

            let region = engine.extent().region_around(moved, 40, 30);
            assert_eq!(engine.compiler().tile_map().origin(), region.origin);
            assert_ne!(region.origin, first);
            vram_matches_window(&display, &engine);
        }
    }

    #[test]
    fn bad_config_is_rejected() {
        let cfg = EngineConfig {
            mirror: 48,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Engine::from_config(cfg),
            Err(EngineError::Config(ConfigError::Invalid(_)))
        ));
    }
}
