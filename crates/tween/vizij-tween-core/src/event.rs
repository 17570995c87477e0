//! Lifecycle events an animation notifies listeners about

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TweenError;
use crate::state::Direction;

/// Types of animation lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationEvent {
    /// Fired synchronously whenever the animation is played
    Play,
    /// Fired synchronously whenever the animation is reversed
    Reverse,
    /// Fired synchronously whenever the animation is paused
    Pause,
    /// Fired synchronously whenever the animation is stopped
    Stop,
    /// The delay has passed while playing, before the first update
    PlayStarted,
    /// The delay has passed while reversing, before the first update
    ReverseStarted,
    /// The delay has passed in either direction
    Started,
    /// Completed after being played
    PlayCompleted,
    /// Completed after being reversed
    ReverseCompleted,
    /// Completed in either direction
    Completed,
    /// Progress was advanced
    Updated,
}

impl AnimationEvent {
    pub const ALL: [AnimationEvent; 11] = [
        Self::Play,
        Self::Reverse,
        Self::Pause,
        Self::Stop,
        Self::PlayStarted,
        Self::ReverseStarted,
        Self::Started,
        Self::PlayCompleted,
        Self::ReverseCompleted,
        Self::Completed,
        Self::Updated,
    ];

    /// Get the name of this event
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Reverse => "reverse",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::PlayStarted => "playStarted",
            Self::ReverseStarted => "reverseStarted",
            Self::Started => "started",
            Self::PlayCompleted => "playCompleted",
            Self::ReverseCompleted => "reverseCompleted",
            Self::Completed => "completed",
            Self::Updated => "updated",
        }
    }

    /// Direction-specific "started" event
    #[inline]
    pub fn started_in(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Self::PlayStarted,
            Direction::Reverse => Self::ReverseStarted,
        }
    }

    /// Direction-specific "completed" event
    #[inline]
    pub fn completed_in(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Self::PlayCompleted,
            Direction::Reverse => Self::ReverseCompleted,
        }
    }

    /// Fired synchronously from a control method rather than from a tick
    #[inline]
    pub fn is_transition_event(&self) -> bool {
        matches!(self, Self::Play | Self::Reverse | Self::Pause | Self::Stop)
    }
}

impl FromStr for AnimationEvent {
    type Err = TweenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|event| event.name() == s)
            .ok_or_else(|| TweenError::UnknownEvent {
                name: s.to_string(),
            })
    }
}

impl std::fmt::Display for AnimationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for event in AnimationEvent::ALL {
            assert_eq!(event.name().parse::<AnimationEvent>().unwrap(), event);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = "finished".parse::<AnimationEvent>().unwrap_err();
        assert_eq!(
            err,
            TweenError::UnknownEvent {
                name: "finished".to_string()
            }
        );
        assert!("Play".parse::<AnimationEvent>().is_err());
    }

    #[test]
    fn test_directional_events() {
        assert_eq!(
            AnimationEvent::started_in(Direction::Forward),
            AnimationEvent::PlayStarted
        );
        assert_eq!(
            AnimationEvent::completed_in(Direction::Reverse),
            AnimationEvent::ReverseCompleted
        );
    }

    #[test]
    fn test_serde_uses_event_names() {
        let json = serde_json::to_string(&AnimationEvent::PlayStarted).unwrap();
        assert_eq!(json, "\"playStarted\"");
        let back: AnimationEvent = serde_json::from_str("\"reverseCompleted\"").unwrap();
        assert_eq!(back, AnimationEvent::ReverseCompleted);
    }

    #[test]
    fn test_event_classification() {
        assert!(AnimationEvent::Stop.is_transition_event());
        assert!(!AnimationEvent::Updated.is_transition_event());
    }
}
