//! Serializable settings for schedulers and framerate animations.

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationOptions, Timing};
use crate::easing::{Easing, EasingKind};
use crate::error::TweenError;
use crate::framerate::{FramerateAnimation, FramerateTiming, SeekPolicy};
use crate::Result;

/// Configuration for a [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minimum interval between processed wakes, in whole milliseconds
    pub rate_ms: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { rate_ms: 5.0 }
    }
}

impl SchedulerConfig {
    /// Tighter wake interval for hosts that can afford it
    pub fn high_frequency() -> Self {
        Self { rate_ms: 4.0 }
    }

    #[inline]
    pub fn with_rate_ms(mut self, rate_ms: f64) -> Self {
        self.rate_ms = rate_ms;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.rate_ms.is_finite() || self.rate_ms < 1.0 {
            return Err(TweenError::InvalidRate {
                value: self.rate_ms,
            });
        }
        Ok(())
    }

    /// Validated copy with the rate rounded to whole milliseconds.
    pub fn normalized(self) -> Result<Self> {
        self.validate()?;
        Ok(Self {
            rate_ms: self.rate_ms.round(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Fixed-value settings for a [`FramerateAnimation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramerateSettings {
    /// Seconds before progress starts moving
    pub delay: f64,
    /// Seconds from start to completion
    pub duration: f64,
    /// Frames per second
    pub framerate: f64,
    pub easing: Option<EasingKind>,
    pub seek: SeekPolicy,
}

impl Default for FramerateSettings {
    fn default() -> Self {
        Self {
            delay: 0.0,
            duration: 0.0,
            framerate: 60.0,
            easing: None,
            seek: SeekPolicy::default(),
        }
    }
}

impl FramerateSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Animation options equivalent to these settings
    pub fn options(&self) -> AnimationOptions {
        AnimationOptions {
            delay: Timing::Fixed(self.delay),
            duration: Timing::Fixed(self.duration),
            easing: self.easing.map(Easing::from),
        }
    }

    /// Validate and construct the animation.
    pub fn build(&self) -> Result<FramerateAnimation> {
        let timing = FramerateTiming::new(self.framerate)?.with_seek_policy(self.seek);
        FramerateAnimation::new(self.options(), timing)
    }
}
