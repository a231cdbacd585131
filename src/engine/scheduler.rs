//! Spreads a windowed recompile over several frames.
//!
//! ```text
//!   Idle ──drift──▶ Rasterizing(0..N) ──▶ Extracting(0..M) ──▶ Uploading ──▶ Idle
//! ```
//!
//! One step runs per frame. Leaving `Idle` snapshots the camera as the
//! cycle's target; every busy phase carries that snapshot, so a trigger
//! that arrives mid-cycle has nothing to overwrite and is simply ignored.

use glam::IVec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Rasterizing { step: usize, target: IVec2 },
    Extracting { step: usize, target: IVec2 },
    Uploading { target: IVec2 },
}

impl Phase {
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }
}

/// Work the caller must do this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Work {
    Idle,
    Rasterize { slice: usize, of: usize, target: IVec2 },
    Extract { slice: usize, of: usize },
    Upload { target: IVec2 },
}

pub struct Scheduler {
    phase: Phase,
    /// Camera position the visible region was last compiled around.
    committed: IVec2,
    threshold: i32,
    raster_slices: usize,
    extract_slices: usize,
}

impl Scheduler {
    pub fn new(threshold: i32, raster_slices: usize, extract_slices: usize, committed: IVec2) -> Self {
        Self {
            phase: Phase::Idle,
            committed,
            threshold,
            raster_slices: raster_slices.max(1),
            extract_slices: extract_slices.max(1),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn committed(&self) -> IVec2 {
        self.committed
    }

    /// Frames one full cycle takes, upload included.
    #[inline]
    pub fn cycle_len(&self) -> usize {
        self.raster_slices + self.extract_slices + 1
    }

    /// Strictly more than `threshold` pixels away on either axis.
    #[inline]
    pub fn drifted(&self, camera_px: IVec2) -> bool {
        let d = (camera_px - self.committed).abs();
        d.x > self.threshold || d.y > self.threshold
    }

    /// Mark `center` as compiled without running a cycle (startup).
    pub fn commit(&mut self, center: IVec2) {
        self.phase = Phase::Idle;
        self.committed = center;
    }

    /// Advance one step and say what to do for it.
    pub fn tick(&mut self, camera_px: IVec2) -> Work {
        if self.phase.is_idle() {
            if !self.drifted(camera_px) {
                return Work::Idle;
            }
            self.enter(Phase::Rasterizing {
                step: 0,
                target: camera_px,
            });
        }

        let (work, next) = match self.phase {
            Phase::Idle => return Work::Idle,
            Phase::Rasterizing { step, target } => (
                Work::Rasterize {
                    slice: step,
                    of: self.raster_slices,
                    target,
                },
                if step + 1 < self.raster_slices {
                    Phase::Rasterizing { step: step + 1, target }
                } else {
                    Phase::Extracting { step: 0, target }
                },
            ),
            Phase::Extracting { step, target } => (
                Work::Extract {
                    slice: step,
                    of: self.extract_slices,
                },
                if step + 1 < self.extract_slices {
                    Phase::Extracting { step: step + 1, target }
                } else {
                    Phase::Uploading { target }
                },
            ),
            Phase::Uploading { target } => {
                self.committed = target;
                (Work::Upload { target }, Phase::Idle)
            }
        };
        self.enter(next);
        work
    }

    fn enter(&mut self, next: Phase) {
        let kind = |p: &Phase| std::mem::discriminant(p);
        if kind(&next) != kind(&self.phase) {
            log::debug!("scheduler: {:?} -> {:?}", self.phase, next);
        }
        self.phase = next;
    }
}
