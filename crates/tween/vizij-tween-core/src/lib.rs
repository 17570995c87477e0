//! Vizij Tween Core (engine-agnostic)
//!
//! Time-based progress tracking for tweens. An [`Animation`] turns a delay, a
//! duration and a direction into a normalized progress value and notifies
//! listeners at each lifecycle point. A [`Scheduler`] advances every active
//! animation in lock-step with a host [`TimeSource`].
//!
//! The timing model itself is pluggable through [`TimingStrategy`]; the crate
//! ships the frame-quantized [`FramerateTiming`] strategy.
//!
//! ```
//! use std::rc::Rc;
//! use vizij_tween_core::{FramerateSettings, ManualTimeSource, Scheduler, SchedulerConfig};
//!
//! let clock = Rc::new(ManualTimeSource::new());
//! let scheduler = Scheduler::new(SchedulerConfig::default(), clock.clone()).unwrap();
//!
//! let settings = FramerateSettings { duration: 0.5, framerate: 10.0, ..Default::default() };
//! let fade = scheduler.register(settings.build().unwrap());
//! fade.borrow_mut().play(None);
//!
//! while scheduler.is_running() {
//!     clock.advance(100.0);
//!     scheduler.wake();
//! }
//! assert!(fade.borrow().is_stopped());
//! ```

pub mod animation;
pub mod config;
pub mod easing;
pub mod error;
pub mod event;
pub mod framerate;
pub mod ids;
pub mod list;
pub mod scheduler;
pub mod state;
pub mod time;

// Re-exports for consumers (adapters)
pub use animation::{
    Animation, AnimationOptions, Callback, Timing, TimingContext, TimingStrategy, Transition,
};
pub use config::{FramerateSettings, SchedulerConfig};
pub use easing::{Easing, EasingFn, EasingKind};
pub use error::TweenError;
pub use event::AnimationEvent;
pub use framerate::{FramerateAnimation, FramerateTiming, SeekPolicy};
pub use ids::{AnimationId, IdAllocator};
pub use list::{HandleList, NodeHandle};
pub use scheduler::{Registration, Scheduler, SchedulerHandle, Tickable};
pub use state::{AnimationState, Direction};
pub use time::{drive, ManualTimeSource, SystemTimeSource, TimeSource};

/// Tween core result type
pub type Result<T> = core::result::Result<T, TweenError>;
