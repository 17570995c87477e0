//! Run/direction state of an animation.

use serde::{Deserialize, Serialize};

/// Direction an animation travels in, or was travelling in when paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards progress 1.0
    Forward,
    /// Towards progress 0.0
    Reverse,
}

impl Direction {
    /// The opposite direction
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// State of an animation.
///
/// Stopped animations hold no progress data. Paused animations hold progress
/// data and remember the direction they were paused in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AnimationState {
    #[default]
    Stopped,
    Playing,
    Reversing,
    Paused(Direction),
}

impl AnimationState {
    /// Get the name of this state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Reversing => "reversing",
            Self::Paused(Direction::Forward) => "paused_playing",
            Self::Paused(Direction::Reverse) => "paused_reversing",
        }
    }

    /// Playing, or paused while playing
    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused(Direction::Forward))
    }

    /// Reversing, or paused while reversing
    #[inline]
    pub fn is_reversing(&self) -> bool {
        matches!(self, Self::Reversing | Self::Paused(Direction::Reverse))
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused(_))
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Neither stopped nor paused
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Playing | Self::Reversing)
    }

    /// Direction of travel; `None` while stopped.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Stopped => None,
            Self::Playing => Some(Direction::Forward),
            Self::Reversing => Some(Direction::Reverse),
            Self::Paused(direction) => Some(*direction),
        }
    }

    pub fn play(&mut self) {
        *self = Self::Playing;
    }

    pub fn reverse(&mut self) {
        *self = Self::Reversing;
    }

    /// Pause, optionally forcing the direction. Without one a stopped state
    /// pauses as playing and any other state keeps its direction.
    pub fn pause(&mut self, direction: Option<Direction>) {
        let direction = direction
            .or_else(|| self.direction())
            .unwrap_or(Direction::Forward);
        *self = Self::Paused(direction);
    }

    pub fn stop(&mut self) {
        *self = Self::Stopped;
    }
}
