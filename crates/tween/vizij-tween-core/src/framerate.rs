//! Frame-quantized timing.
//!
//! [`FramerateTiming`] accumulates elapsed milliseconds and only lets an
//! update through once a full frame (`1000 / framerate` ms) has passed. Time
//! spent between frames is never lost: it is charged to the delay or the
//! duration even when the update itself is skipped.

use serde::{Deserialize, Serialize};

use crate::animation::{Animation, AnimationOptions, TimingStrategy, Transition};
use crate::error::TweenError;
use crate::scheduler::Registration;
use crate::state::Direction;
use crate::Result;

/// Animation driven by elapsed milliseconds at a target framerate.
pub type FramerateAnimation = Animation<FramerateTiming>;

/// How a seek to an explicit progress treats the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekPolicy {
    /// Seeking always lands past the delay; progress spans the duration only.
    #[default]
    SkipDelay,
    /// Progress spans delay plus duration; early seeks keep part of the delay.
    Weighted,
}

/// Remaining time of the current run, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Remaining {
    frame: f64,
    delay: f64,
    duration: f64,
}

/// Millisecond bookkeeping for a [`FramerateAnimation`].
#[derive(Debug, Clone, PartialEq)]
pub struct FramerateTiming {
    framerate: f64,
    seek: SeekPolicy,
    remaining: Option<Remaining>,
    duration_ms: f64,
    progress: Option<f64>,
}

impl FramerateTiming {
    pub fn new(framerate: f64) -> Result<Self> {
        if !(framerate.is_finite() && framerate > 0.0) {
            return Err(TweenError::InvalidFramerate { value: framerate });
        }
        Ok(Self {
            framerate,
            seek: SeekPolicy::default(),
            remaining: None,
            duration_ms: 0.0,
            progress: None,
        })
    }

    pub fn with_seek_policy(mut self, seek: SeekPolicy) -> Self {
        self.seek = seek;
        self
    }

    #[inline]
    pub fn framerate(&self) -> f64 {
        self.framerate
    }

    /// Length of one frame in milliseconds.
    #[inline]
    pub fn frame_duration(&self) -> f64 {
        1000.0 / self.framerate
    }

    #[inline]
    pub fn seek_policy(&self) -> SeekPolicy {
        self.seek
    }

    pub fn frame_remaining(&self) -> Option<f64> {
        self.remaining.map(|r| r.frame)
    }

    pub fn delay_remaining(&self) -> Option<f64> {
        self.remaining.map(|r| r.delay)
    }

    pub fn duration_remaining(&self) -> Option<f64> {
        self.remaining.map(|r| r.duration)
    }

    pub fn is_initialized(&self) -> bool {
        self.remaining.is_some()
    }
}

/// `remaining' = total * (1 - remaining / total)`, kept within `[0, total]`.
fn mirror(remaining: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        total * (1.0 - remaining / total).clamp(0.0, 1.0)
    }
}

impl TimingStrategy for FramerateTiming {
    type Tick = f64;

    fn should_update(&mut self, delta: &f64) -> bool {
        let frame_duration = self.frame_duration();
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        remaining.frame -= delta;
        if remaining.frame > 0.0 {
            return false;
        }
        // carry the overshoot into the next frame
        remaining.frame = frame_duration + remaining.frame % frame_duration;
        true
    }

    fn has_started(&self, delta: &f64) -> bool {
        self.remaining.map_or(false, |r| r.delay - delta <= 0.0)
    }

    fn started_update(&mut self, delta: &f64) {
        if let Some(r) = self.remaining.as_mut() {
            r.delay -= delta;
            r.duration += r.delay;
            r.delay = 0.0;
        }
    }

    fn not_started_update(&mut self, delta: &f64) {
        if let Some(r) = self.remaining.as_mut() {
            r.delay -= delta;
        }
    }

    fn update(&mut self, delta: &f64) -> bool {
        match self.remaining.as_mut() {
            Some(r) => {
                r.duration -= delta;
                r.delay <= 0.0 && r.duration <= 0.0
            }
            None => false,
        }
    }

    fn no_update(&mut self, delta: &f64, started: bool) {
        if let Some(r) = self.remaining.as_mut() {
            if started {
                r.duration -= delta;
            } else {
                r.delay -= delta;
            }
        }
    }

    fn paused_update(&mut self, _delta: &f64, registration: Option<&Registration>) {
        if let Some(registration) = registration {
            registration.detach();
        }
    }

    fn stopped_update(&mut self, _delta: &f64, registration: Option<&Registration>) {
        if let Some(registration) = registration {
            registration.detach();
        }
    }

    fn completed_update(&mut self, _delta: &f64, registration: Option<&Registration>) {
        if let Some(registration) = registration {
            registration.detach();
        }
    }

    fn transitioned(&mut self, transition: Transition, registration: Option<&Registration>) {
        let Some(registration) = registration else {
            return;
        };
        match transition {
            Transition::Play | Transition::Reverse => registration.attach(),
            Transition::Stop => registration.detach(),
            // the next update pass detaches a paused animation
            Transition::Pause => {}
        }
    }

    fn initialize_progress(&mut self, delay: f64, duration: f64, progress: Option<f64>) {
        let delay_ms = 1000.0 * delay;
        let duration_ms = 1000.0 * duration;
        let (delay, duration) = match (progress, self.seek) {
            (None, _) => (delay_ms, duration_ms),
            (Some(p), SeekPolicy::SkipDelay) => (0.0, (1.0 - p) * duration_ms),
            (Some(p), SeekPolicy::Weighted) => {
                let total = delay_ms + duration_ms;
                let position = p * total;
                if position < delay_ms {
                    (delay_ms - position, duration_ms)
                } else {
                    (0.0, (1.0 - p) * total)
                }
            }
        };
        self.duration_ms = duration_ms;
        self.remaining = Some(Remaining {
            frame: self.frame_duration(),
            delay,
            duration,
        });
    }

    fn uninitialize_progress(&mut self) {
        self.remaining = None;
    }

    fn invert_progress(&mut self, delay: f64, duration: f64) {
        let delay_ms = 1000.0 * delay;
        let duration_ms = 1000.0 * duration;
        self.duration_ms = duration_ms;
        if let Some(r) = self.remaining.as_mut() {
            // a delay already passed stays passed
            if r.delay > 0.0 {
                r.delay = mirror(r.delay, delay_ms);
            }
            r.duration = mirror(r.duration, duration_ms);
        }
    }

    fn refresh_progress(&mut self, direction: Option<Direction>) -> Option<f64> {
        self.progress = self.remaining.map(|r| {
            let progress = if r.delay > 0.0 {
                0.0
            } else if self.duration_ms > 0.0 {
                ((self.duration_ms - r.duration) / self.duration_ms).clamp(0.0, 1.0)
            } else {
                1.0
            };
            match direction {
                Some(Direction::Reverse) => 1.0 - progress,
                _ => progress,
            }
        });
        self.progress
    }

    fn progress(&self) -> Option<f64> {
        self.progress
    }
}

impl Animation<FramerateTiming> {
    /// Convenience constructor for the framerate strategy.
    pub fn with_framerate(options: AnimationOptions, framerate: f64) -> Result<Self> {
        Animation::new(options, FramerateTiming::new(framerate)?)
    }
}
