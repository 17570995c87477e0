//! The animation state machine.
//!
//! [`Animation`] owns the configuration (delay, duration, easing), the
//! [`AnimationState`] and the listener registry. How time turns into progress
//! is delegated to a [`TimingStrategy`], which receives every hook of the
//! update cycle and keeps whatever remaining-time bookkeeping it needs.

use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::easing::Easing;
use crate::error::{non_negative, TweenError};
use crate::event::AnimationEvent;
use crate::ids::AnimationId;
use crate::scheduler::Registration;
use crate::state::{AnimationState, Direction};
use crate::Result;

/// Listener invoked with the animation and its eased progress.
pub type Callback<S> = Box<dyn FnMut(&mut Animation<S>, Option<f64>)>;

/// Control transition an animation just went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Play,
    Reverse,
    Pause,
    Stop,
}

impl Transition {
    fn event(self) -> AnimationEvent {
        match self {
            Self::Play => AnimationEvent::Play,
            Self::Reverse => AnimationEvent::Reverse,
            Self::Pause => AnimationEvent::Pause,
            Self::Stop => AnimationEvent::Stop,
        }
    }
}

/// Parameters handed to computed delays and durations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingContext {
    /// Direction the animation is about to travel in
    pub direction: Direction,
    /// Progress requested by the control call, if any
    pub progress: Option<f64>,
}

/// A delay or duration in seconds.
#[derive(Clone)]
pub enum Timing {
    Fixed(f64),
    Computed(Rc<dyn Fn(&TimingContext) -> f64>),
}

impl Timing {
    pub fn computed(f: impl Fn(&TimingContext) -> f64 + 'static) -> Self {
        Self::Computed(Rc::new(f))
    }

    /// Seconds for the given context. Computed values that are negative or
    /// not finite are clamped to zero.
    pub fn resolve(&self, context: &TimingContext) -> f64 {
        match self {
            Self::Fixed(seconds) => *seconds,
            Self::Computed(f) => {
                let seconds = f(context);
                if non_negative(seconds) {
                    seconds
                } else {
                    log::warn!("computed timing {seconds} is not a valid duration, using 0");
                    0.0
                }
            }
        }
    }

    fn fixed(&self) -> Option<f64> {
        match self {
            Self::Fixed(seconds) => Some(*seconds),
            Self::Computed(_) => None,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::Fixed(0.0)
    }
}

impl From<f64> for Timing {
    fn from(seconds: f64) -> Self {
        Self::Fixed(seconds)
    }
}

impl fmt::Debug for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(seconds) => f.debug_tuple("Fixed").field(seconds).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Configuration shared by every timing strategy.
#[derive(Debug, Clone, Default)]
pub struct AnimationOptions {
    pub delay: Timing,
    pub duration: Timing,
    pub easing: Option<Easing>,
}

impl AnimationOptions {
    /// Check the fixed parts of the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(value) = self.delay.fixed() {
            if !non_negative(value) {
                return Err(TweenError::InvalidDelay { value });
            }
        }
        if let Some(value) = self.duration.fixed() {
            if !non_negative(value) {
                return Err(TweenError::InvalidDuration { value });
            }
        }
        Ok(())
    }
}

/// Hooks through which an [`Animation`] delegates its timing model.
///
/// `Tick` is whatever argument the strategy advances on (the framerate
/// strategy uses elapsed milliseconds). Its default value is an idle tick.
pub trait TimingStrategy {
    type Tick: Default;

    /// Whether this tick should advance the animation.
    fn should_update(&mut self, _tick: &Self::Tick) -> bool {
        true
    }

    /// Whether this tick takes the animation past its delay.
    fn has_started(&self, tick: &Self::Tick) -> bool;

    /// The delay elapsed during this tick.
    fn started_update(&mut self, _tick: &Self::Tick) {}

    /// The tick was spent inside the delay.
    fn not_started_update(&mut self, _tick: &Self::Tick) {}

    /// Advance the duration; returns true once the animation is complete.
    fn update(&mut self, tick: &Self::Tick) -> bool;

    /// The tick was gated by `should_update`.
    fn no_update(&mut self, _tick: &Self::Tick, _started: bool) {}

    /// Progress has been refreshed and listeners are about to be told.
    fn apply_update(&mut self, _tick: &Self::Tick) {}

    fn paused_update(&mut self, _tick: &Self::Tick, _registration: Option<&Registration>) {}

    /// The animation was ticked, or stopped again, while already stopped.
    fn stopped_update(&mut self, _tick: &Self::Tick, _registration: Option<&Registration>) {}

    fn completed_update(&mut self, _tick: &Self::Tick, _registration: Option<&Registration>) {}

    /// The animation was played, reversed, paused or stopped.
    fn transitioned(&mut self, _transition: Transition, _registration: Option<&Registration>) {}

    /// Set up remaining-time state for a fresh run or a seek.
    fn initialize_progress(&mut self, delay: f64, duration: f64, progress: Option<f64>);

    /// Discard remaining-time state.
    fn uninitialize_progress(&mut self);

    /// Mirror in-flight state so the other direction continues from the
    /// same position.
    fn invert_progress(&mut self, delay: f64, duration: f64);

    /// Recompute and cache progress for the given direction of travel.
    fn refresh_progress(&mut self, direction: Option<Direction>) -> Option<f64>;

    /// Cached progress; `None` when there is nothing to report.
    fn progress(&self) -> Option<f64>;
}

/// Progress from a control call: clamped to `[0, 1]`, NaN reads as 0.
fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// Time-based progress tracker driven by a [`TimingStrategy`].
pub struct Animation<S: TimingStrategy> {
    registration: Option<Registration>,
    delay: Timing,
    duration: Timing,
    easing: Option<Easing>,
    state: AnimationState,
    started: bool,
    epoch: u64,
    callbacks: HashMap<AnimationEvent, Vec<Callback<S>>>,
    strategy: S,
}

impl<S: TimingStrategy> Animation<S> {
    pub fn new(options: AnimationOptions, strategy: S) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            registration: None,
            delay: options.delay,
            duration: options.duration,
            easing: options.easing,
            state: AnimationState::Stopped,
            started: false,
            epoch: 0,
            callbacks: HashMap::new(),
            strategy,
        })
    }

    /// Play forward, optionally seeking to `progress` first.
    pub fn play(&mut self, progress: Option<f64>) -> &mut Self {
        let progress = progress.map(clamp_progress);
        if progress.is_none() && self.state == AnimationState::Playing {
            return self;
        }
        if progress.is_some() || self.state.is_stopped() {
            self.initialize(Direction::Forward, progress);
        } else if self.state.is_reversing() {
            self.invert(Direction::Forward);
        }
        self.state.play();
        self.transition(Transition::Play);
        self
    }

    /// Play backward. `progress` counts from the end, so 0.8 leaves 20% to go.
    pub fn reverse(&mut self, progress: Option<f64>) -> &mut Self {
        let progress = progress.map(clamp_progress);
        if progress.is_none() && self.state == AnimationState::Reversing {
            return self;
        }
        if progress.is_some() || self.state.is_stopped() {
            self.initialize(Direction::Reverse, progress);
        } else if self.state.is_playing() {
            self.invert(Direction::Reverse);
        }
        self.state.reverse();
        self.transition(Transition::Reverse);
        self
    }

    /// Pause, optionally seeking and/or forcing the paused direction.
    pub fn pause(&mut self, progress: Option<f64>, direction: Option<Direction>) -> &mut Self {
        let progress = progress.map(clamp_progress);
        let current = self.state.direction();
        let target = direction.or(current).unwrap_or(Direction::Forward);
        if progress.is_none() && self.state == AnimationState::Paused(target) {
            return self;
        }
        if progress.is_some() || self.state.is_stopped() {
            self.initialize(target, progress);
        } else if current != Some(target) {
            self.invert(target);
        }
        self.state.pause(Some(target));
        self.transition(Transition::Pause);
        self
    }

    /// Discard all progress and return to the stopped state.
    pub fn stop(&mut self) -> &mut Self {
        if self.state.is_stopped() {
            self.strategy
                .stopped_update(&S::Tick::default(), self.registration.as_ref());
            // completed runs keep their final progress until now
            if self.strategy.progress().is_some() {
                self.strategy.uninitialize_progress();
                self.strategy.refresh_progress(None);
            }
            return self;
        }
        self.started = false;
        self.strategy.uninitialize_progress();
        self.state.stop();
        self.transition(Transition::Stop);
        self
    }

    /// Run one update pass with the strategy's tick argument.
    pub fn update(&mut self, tick: S::Tick) -> &mut Self {
        let direction = match self.state {
            AnimationState::Stopped => {
                self.strategy
                    .stopped_update(&tick, self.registration.as_ref());
                return self;
            }
            AnimationState::Paused(_) => {
                self.strategy
                    .paused_update(&tick, self.registration.as_ref());
                return self;
            }
            AnimationState::Playing => Direction::Forward,
            AnimationState::Reversing => Direction::Reverse,
        };

        if !self.strategy.should_update(&tick) {
            self.strategy.no_update(&tick, self.started);
            return self;
        }

        let epoch = self.epoch;
        let tick = if self.started {
            tick
        } else if self.strategy.has_started(&tick) {
            self.started = true;
            self.strategy.started_update(&tick);
            self.strategy.refresh_progress(Some(direction));
            if !self.emit(AnimationEvent::started_in(direction), epoch)
                || !self.emit(AnimationEvent::Started, epoch)
            {
                return self;
            }
            // started_update already consumed this tick
            S::Tick::default()
        } else {
            self.strategy.not_started_update(&tick);
            return self;
        };

        let completed = self.strategy.update(&tick);
        self.strategy.refresh_progress(Some(direction));
        self.strategy.apply_update(&tick);
        if !self.emit(AnimationEvent::Updated, epoch) || !completed {
            return self;
        }

        if !self.emit(AnimationEvent::completed_in(direction), epoch)
            || !self.emit(AnimationEvent::Completed, epoch)
        {
            return self;
        }
        self.started = false;
        self.strategy.uninitialize_progress();
        self.state.stop();
        self.strategy
            .completed_update(&tick, self.registration.as_ref());
        self
    }

    /// Register a listener by event name.
    pub fn on(
        &mut self,
        name: &str,
        callback: impl FnMut(&mut Self, Option<f64>) + 'static,
    ) -> Result<&mut Self> {
        let event: AnimationEvent = name.parse()?;
        Ok(self.on_event(event, callback))
    }

    /// Register several listeners; if any name is unknown none are kept.
    pub fn on_many<'a, I>(&mut self, listeners: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (&'a str, Callback<S>)>,
    {
        let parsed = listeners
            .into_iter()
            .map(|(name, callback)| Ok((name.parse::<AnimationEvent>()?, callback)))
            .collect::<Result<Vec<_>>>()?;
        for (event, callback) in parsed {
            self.callbacks.entry(event).or_default().push(callback);
        }
        Ok(self)
    }

    pub fn on_event(
        &mut self,
        event: AnimationEvent,
        callback: impl FnMut(&mut Self, Option<f64>) + 'static,
    ) -> &mut Self {
        self.callbacks
            .entry(event)
            .or_default()
            .push(Box::new(callback));
        self
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    #[inline]
    pub fn is_reversing(&self) -> bool {
        self.state.is_reversing()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.state.is_stopped()
    }

    #[inline]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Whether the delay has elapsed in the current run.
    #[inline]
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Position in `[0, 1]` before easing. Reversing counts down from 1.
    pub fn progress(&self) -> Option<f64> {
        self.strategy.progress()
    }

    /// Progress as listeners see it.
    pub fn eased_progress(&self) -> Option<f64> {
        self.progress().map(|p| self.ease(p))
    }

    /// Share of the current run already covered, whichever the direction.
    pub fn travelled(&self) -> Option<f64> {
        let progress = self.progress()?;
        Some(if self.state.is_reversing() {
            1.0 - progress
        } else {
            progress
        })
    }

    pub fn ease(&self, progress: f64) -> f64 {
        match &self.easing {
            Some(easing) => easing.apply(progress),
            None => progress,
        }
    }

    pub fn easing(&self) -> Option<&Easing> {
        self.easing.as_ref()
    }

    pub fn delay(&self) -> &Timing {
        &self.delay
    }

    pub fn duration(&self) -> &Timing {
        &self.duration
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// Identity issued by the scheduler this animation is registered with.
    pub fn id(&self) -> Option<AnimationId> {
        self.registration.as_ref().map(Registration::id)
    }

    pub fn registration(&self) -> Option<&Registration> {
        self.registration.as_ref()
    }

    pub(crate) fn set_registration(&mut self, registration: Registration) {
        self.registration = Some(registration);
    }

    fn timings(&self, direction: Direction, progress: Option<f64>) -> (f64, f64) {
        let context = TimingContext {
            direction,
            progress,
        };
        (
            self.delay.resolve(&context),
            self.duration.resolve(&context),
        )
    }

    fn initialize(&mut self, direction: Direction, progress: Option<f64>) {
        let (delay, duration) = self.timings(direction, progress);
        self.strategy.initialize_progress(delay, duration, progress);
        self.started = false;
    }

    fn invert(&mut self, direction: Direction) {
        let (delay, duration) = self.timings(direction, None);
        self.strategy.invert_progress(delay, duration);
    }

    fn transition(&mut self, transition: Transition) {
        self.epoch = self.epoch.wrapping_add(1);
        let epoch = self.epoch;
        self.strategy.refresh_progress(self.state.direction());
        self.strategy
            .transitioned(transition, self.registration.as_ref());
        if self.emit(transition.event(), epoch) && transition != Transition::Stop {
            self.update(S::Tick::default());
        }
    }

    /// Run the listeners for `event`. Returns false when a listener moved the
    /// animation into another transition.
    fn emit(&mut self, event: AnimationEvent, epoch: u64) -> bool {
        let mut listeners = match self.callbacks.get_mut(&event) {
            Some(listeners) if !listeners.is_empty() => std::mem::take(listeners),
            _ => return self.epoch == epoch,
        };
        for listener in listeners.iter_mut() {
            let progress = self.eased_progress();
            listener(self, progress);
        }
        let slot = self.callbacks.entry(event).or_default();
        listeners.append(slot);
        *slot = listeners;
        self.epoch == epoch
    }
}

impl<S: TimingStrategy + fmt::Debug> fmt::Debug for Animation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners: usize = self.callbacks.values().map(Vec::len).sum();
        f.debug_struct("Animation")
            .field("id", &self.id())
            .field("delay", &self.delay)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("state", &self.state)
            .field("started", &self.started)
            .field("listeners", &listeners)
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl<S: TimingStrategy<Tick = f64>> Animation<S> {
    /// Advance by `delta_ms` elapsed milliseconds.
    pub fn tick(&mut self, delta_ms: f64) -> &mut Self {
        self.update(delta_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Unquantized strategy counting whole seconds.
    #[derive(Debug, Default)]
    struct Seconds {
        remaining: Option<(f64, f64)>,
        duration: f64,
        progress: Option<f64>,
    }

    impl TimingStrategy for Seconds {
        type Tick = f64;

        fn has_started(&self, tick: &f64) -> bool {
            self.remaining.map_or(false, |(delay, _)| delay - tick <= 0.0)
        }

        fn started_update(&mut self, tick: &f64) {
            if let Some((delay, duration)) = self.remaining.as_mut() {
                *delay -= tick;
                *duration += *delay;
                *delay = 0.0;
            }
        }

        fn not_started_update(&mut self, tick: &f64) {
            if let Some((delay, _)) = self.remaining.as_mut() {
                *delay -= tick;
            }
        }

        fn update(&mut self, tick: &f64) -> bool {
            match self.remaining.as_mut() {
                Some((delay, duration)) => {
                    *duration -= tick;
                    *delay <= 0.0 && *duration <= 0.0
                }
                None => false,
            }
        }

        fn initialize_progress(&mut self, delay: f64, duration: f64, progress: Option<f64>) {
            self.duration = duration;
            self.remaining = Some(match progress {
                Some(p) => (0.0, (1.0 - p) * duration),
                None => (delay, duration),
            });
        }

        fn uninitialize_progress(&mut self) {
            self.remaining = None;
        }

        fn invert_progress(&mut self, _delay: f64, duration: f64) {
            self.duration = duration;
            if let Some((_, left)) = self.remaining.as_mut() {
                *left = (duration - *left).clamp(0.0, duration);
            }
        }

        fn refresh_progress(&mut self, direction: Option<Direction>) -> Option<f64> {
            self.progress = self.remaining.map(|(delay, left)| {
                let p = if delay > 0.0 {
                    0.0
                } else if self.duration > 0.0 {
                    ((self.duration - left) / self.duration).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                if direction == Some(Direction::Reverse) {
                    1.0 - p
                } else {
                    p
                }
            });
            self.progress
        }

        fn progress(&self) -> Option<f64> {
            self.progress
        }
    }

    fn animation(delay: f64, duration: f64) -> Animation<Seconds> {
        let options = AnimationOptions {
            delay: delay.into(),
            duration: duration.into(),
            easing: None,
        };
        Animation::new(options, Seconds::default()).unwrap()
    }

    fn record(animation: &mut Animation<Seconds>) -> Rc<RefCell<Vec<AnimationEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for event in AnimationEvent::ALL {
            let log = log.clone();
            animation.on_event(event, move |_, _| log.borrow_mut().push(event));
        }
        log
    }

    #[test]
    fn rejects_invalid_fixed_timings() {
        let options = AnimationOptions {
            delay: Timing::Fixed(-1.0),
            ..Default::default()
        };
        assert_eq!(
            Animation::new(options, Seconds::default()).unwrap_err(),
            TweenError::InvalidDelay { value: -1.0 }
        );
        let options = AnimationOptions {
            duration: Timing::Fixed(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            Animation::new(options, Seconds::default()),
            Err(TweenError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn lifecycle_events_fire_in_order() {
        use AnimationEvent::*;
        let mut anim = animation(1.0, 2.0);
        let log = record(&mut anim);

        anim.play(None);
        anim.tick(1.0);
        anim.tick(1.0);
        anim.tick(1.0);

        assert_eq!(
            *log.borrow(),
            vec![Play, PlayStarted, Started, Updated, Updated, Updated, PlayCompleted, Completed]
        );
        assert!(anim.is_stopped());
        assert_eq!(anim.progress(), Some(1.0));
    }

    #[test]
    fn play_is_idempotent_without_progress() {
        let mut anim = animation(0.0, 1.0);
        let log = record(&mut anim);
        anim.play(None).play(None);
        let plays = log
            .borrow()
            .iter()
            .filter(|e| **e == AnimationEvent::Play)
            .count();
        assert_eq!(plays, 1);
    }

    #[test]
    fn reverse_progress_counts_from_end() {
        let mut anim = animation(0.0, 10.0);
        anim.reverse(Some(0.8));
        assert!((anim.progress().unwrap() - 0.2).abs() < 1e-9);
        assert!((anim.travelled().unwrap() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn progress_is_clamped() {
        let mut anim = animation(0.0, 10.0);
        anim.pause(Some(7.0), None);
        assert_eq!(anim.progress(), Some(1.0));
        anim.pause(Some(f64::NAN), None);
        assert_eq!(anim.progress(), Some(0.0));
    }

    #[test]
    fn reverse_keeps_position() {
        let mut anim = animation(0.0, 10.0);
        anim.play(None);
        anim.tick(3.0);
        assert_eq!(anim.progress(), Some(0.3));
        anim.reverse(None);
        assert!((anim.progress().unwrap() - 0.3).abs() < 1e-9);
        assert!((anim.travelled().unwrap() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn pause_direction_flip_inverts() {
        let mut anim = animation(0.0, 10.0);
        anim.play(Some(0.25));
        anim.pause(None, Some(Direction::Reverse));
        assert_eq!(anim.state(), AnimationState::Paused(Direction::Reverse));
        assert!((anim.progress().unwrap() - 0.25).abs() < 1e-9);
        anim.tick(5.0);
        assert!((anim.progress().unwrap() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn stop_clears_progress_and_started() {
        let mut anim = animation(0.0, 4.0);
        let log = record(&mut anim);
        anim.play(None);
        anim.tick(1.0);
        assert!(anim.has_started());
        anim.stop();
        assert!(anim.is_stopped());
        assert!(!anim.has_started());
        assert_eq!(anim.progress(), None);
        anim.stop();
        let stops = log
            .borrow()
            .iter()
            .filter(|e| **e == AnimationEvent::Stop)
            .count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn stop_listener_sees_no_progress() {
        let mut anim = animation(0.0, 4.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        anim.on("stop", move |_, p| sink.borrow_mut().push(p)).unwrap();
        anim.play(None).stop();
        assert_eq!(*seen.borrow(), vec![None]);
    }

    #[test]
    fn listeners_receive_eased_progress() {
        let options = AnimationOptions {
            delay: 0.0.into(),
            duration: 2.0.into(),
            easing: Some(Easing::new(|t, b, c, d| c * (t / d) * (t / d) + b)),
        };
        let mut anim = Animation::new(options, Seconds::default()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        anim.on("updated", move |_, p| sink.borrow_mut().push(p))
            .unwrap();
        anim.play(None);
        anim.tick(1.0);
        assert_eq!(seen.borrow().last().copied().flatten(), Some(0.25));
        assert_eq!(anim.progress(), Some(0.5));
    }

    #[test]
    fn unknown_names_register_nothing() {
        let mut anim = animation(0.0, 1.0);
        let noop = || -> Callback<Seconds> { Box::new(|_, _| {}) };
        let err = anim
            .on_many([("play", noop()), ("finished", noop())])
            .unwrap_err();
        assert_eq!(
            err,
            TweenError::UnknownEvent {
                name: "finished".into()
            }
        );
        assert!(anim.callbacks.values().all(Vec::is_empty));
        assert!(anim.on("Play", |_, _| {}).is_err());
    }

    #[test]
    fn completed_listener_can_loop() {
        let mut anim = animation(0.0, 1.0);
        let loops = Rc::new(RefCell::new(0));
        let counter = loops.clone();
        anim.on("completed", move |anim, _| {
            *counter.borrow_mut() += 1;
            if *counter.borrow() < 3 {
                anim.play(Some(0.0));
            }
        })
        .unwrap();
        anim.play(None);
        for _ in 0..5 {
            anim.tick(1.0);
        }
        assert_eq!(*loops.borrow(), 3);
        assert!(anim.is_stopped());
    }

    #[test]
    fn listener_stop_abandons_update_pass() {
        use AnimationEvent::*;
        let mut anim = animation(0.0, 2.0);
        let log = record(&mut anim);
        anim.on("started", |anim, _| {
            anim.stop();
        })
        .unwrap();
        anim.play(None);
        anim.tick(1.0);
        assert_eq!(*log.borrow(), vec![Play, PlayStarted, Started, Stop]);
        assert!(anim.is_stopped());
    }

    #[test]
    fn listeners_added_during_dispatch_wait_for_next_event() {
        let mut anim = animation(0.0, 10.0);
        let count = Rc::new(RefCell::new(0));
        let outer = count.clone();
        anim.on("updated", move |anim, _| {
            let inner = outer.clone();
            anim.on_event(AnimationEvent::Updated, move |_, _| {
                *inner.borrow_mut() += 1;
            });
        })
        .unwrap();
        anim.play(None);
        assert_eq!(*count.borrow(), 0);
        anim.tick(1.0);
        assert_eq!(*count.borrow(), 1);
        anim.tick(1.0);
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn computed_timings_see_context() {
        let options = AnimationOptions {
            delay: Timing::computed(|_| -3.0),
            duration: Timing::computed(|ctx| match ctx.direction {
                Direction::Forward => 4.0,
                Direction::Reverse => 2.0,
            }),
            easing: None,
        };
        let mut anim = Animation::new(options, Seconds::default()).unwrap();
        anim.reverse(None);
        assert_eq!(anim.strategy().duration, 2.0);
        assert_eq!(anim.strategy().remaining, Some((0.0, 2.0)));
    }
}
