//! Scheduler
//!
//! Keeps the set of ticking animations and advances all of them from one
//! host [`TimeSource`]. The loop runs only while the set is non-empty: the
//! first `add` starts it and the wake that finds the set empty stops it.
//!
//! Animations are held weakly. Dropping the last owner of an animation takes
//! it out of the set on the next wake.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;

use crate::animation::{Animation, TimingStrategy};
use crate::config::SchedulerConfig;
use crate::ids::{AnimationId, IdAllocator};
use crate::list::{HandleList, NodeHandle};
use crate::time::TimeSource;
use crate::Result;

/// Anything the scheduler can advance by elapsed milliseconds.
pub trait Tickable {
    fn registration(&self) -> Option<&Registration>;

    /// Take on the identity issued by a scheduler.
    fn enroll(&mut self, registration: Registration);

    fn tick(&mut self, delta_ms: f64);
}

impl<S: TimingStrategy<Tick = f64>> Tickable for Animation<S> {
    fn registration(&self) -> Option<&Registration> {
        Animation::registration(self)
    }

    fn enroll(&mut self, registration: Registration) {
        self.set_registration(registration);
    }

    fn tick(&mut self, delta_ms: f64) {
        Animation::tick(self, delta_ms);
    }
}

/// Membership of one animation in one scheduler.
///
/// Lets the animation put itself into, or take itself out of, the active set
/// without holding the scheduler alive.
#[derive(Clone)]
pub struct Registration {
    id: AnimationId,
    scheduler: SchedulerHandle,
    member: Weak<RefCell<dyn Tickable>>,
}

impl Registration {
    #[inline]
    pub fn id(&self) -> AnimationId {
        self.id
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    /// Start being ticked. No-op if already active or the scheduler is gone.
    pub fn attach(&self) {
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.attach_member(self.id, self.member.clone());
        }
    }

    /// Stop being ticked. No-op if not active or the scheduler is gone.
    pub fn detach(&self) {
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.remove_id(self.id);
        }
    }

    pub fn belongs_to(&self, scheduler: &Scheduler) -> bool {
        std::ptr::eq(self.scheduler.shared.as_ptr(), Rc::as_ptr(&scheduler.shared))
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("scheduler_alive", &(self.scheduler.shared.strong_count() > 0))
            .finish()
    }
}

/// A weak handle to a scheduler.
///
/// It won't prevent the scheduler from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Weak<Shared>,
}

impl SchedulerHandle {
    pub fn upgrade(&self) -> Option<Scheduler> {
        self.shared.upgrade().map(|shared| Scheduler { shared })
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

struct Member {
    id: AnimationId,
    target: Weak<RefCell<dyn Tickable>>,
}

struct SchedulerState {
    config: SchedulerConfig,
    ids: IdAllocator,
    active: HandleList<Member>,
    index: HashMap<AnimationId, NodeHandle>,
    running: bool,
    /// Time of the last processed wake, or of the start
    last_time: Option<f64>,
    in_wake: bool,
}

struct Shared {
    clock: Rc<dyn TimeSource>,
    state: RefCell<SchedulerState>,
}

/// Drives every active animation from a host time source.
///
/// Cloning yields another strong handle to the same scheduler.
#[derive(Clone)]
pub struct Scheduler {
    shared: Rc<Shared>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, clock: Rc<dyn TimeSource>) -> Result<Self> {
        let config = config.normalized()?;
        Ok(Self {
            shared: Rc::new(Shared {
                clock,
                state: RefCell::new(SchedulerState {
                    config,
                    ids: IdAllocator::new(),
                    active: HandleList::new(),
                    index: HashMap::new(),
                    running: false,
                    last_time: None,
                    in_wake: false,
                }),
            }),
        })
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    pub fn config(&self) -> SchedulerConfig {
        self.shared.state.borrow().config
    }

    /// Take ownership of an animation and issue its identity.
    ///
    /// The returned handle is the animation's owner; the scheduler only keeps
    /// a weak reference. Playing or reversing it puts it into the active set.
    pub fn register<S>(&self, animation: Animation<S>) -> Rc<RefCell<Animation<S>>>
    where
        S: TimingStrategy<Tick = f64> + 'static,
    {
        let id = self.shared.state.borrow_mut().ids.alloc_animation();
        let scheduler = self.handle();
        let shared = Rc::new_cyclic(|weak: &Weak<RefCell<Animation<S>>>| {
            let member: Weak<RefCell<Animation<S>>> = Weak::clone(weak);
            let mut animation = animation;
            animation.set_registration(Registration {
                id,
                scheduler,
                member,
            });
            RefCell::new(animation)
        });
        let running = shared.borrow().state().is_running();
        if running {
            let member: Weak<RefCell<Animation<S>>> = Rc::downgrade(&shared);
            self.attach_member(id, member);
        }
        shared
    }

    /// Track `animation`, issuing an identity if it has none from this
    /// scheduler. Idempotent.
    ///
    /// Returns false when `animation` is currently borrowed, e.g. from inside
    /// one of its own listeners; listeners should call
    /// [`Registration::attach`] on `anim.registration()` instead.
    pub fn add<A>(&self, animation: &Rc<RefCell<A>>) -> bool
    where
        A: Tickable + 'static,
    {
        let Ok(mut target) = animation.try_borrow_mut() else {
            log::warn!("cannot add an animation while it is borrowed");
            return false;
        };
        let id = match target.registration() {
            Some(registration) if registration.belongs_to(self) => registration.id(),
            previous => {
                if let Some(previous) = previous {
                    previous.detach();
                }
                let id = self.shared.state.borrow_mut().ids.alloc_animation();
                let member: Weak<RefCell<A>> = Rc::downgrade(animation);
                target.enroll(Registration {
                    id,
                    scheduler: self.handle(),
                    member,
                });
                id
            }
        };
        drop(target);
        let member: Weak<RefCell<A>> = Rc::downgrade(animation);
        self.attach_member(id, member);
        true
    }

    /// Stop tracking `animation`. Returns whether it was tracked.
    ///
    /// Returns false without removing anything when `animation` is mutably
    /// borrowed; listeners should call [`Registration::detach`] instead.
    pub fn remove<A>(&self, animation: &Rc<RefCell<A>>) -> bool
    where
        A: Tickable + 'static,
    {
        let id = match animation.try_borrow() {
            Ok(target) => match target.registration() {
                Some(registration) if registration.belongs_to(self) => registration.id(),
                _ => return false,
            },
            Err(_) => {
                log::warn!("cannot remove an animation while it is mutably borrowed");
                return false;
            }
        };
        let tracked = self.contains_id(id);
        self.remove_id(id);
        tracked
    }

    /// Stop tracking the animation with this identity.
    pub fn remove_id(&self, id: AnimationId) {
        let stop = {
            let mut state = self.shared.state.borrow_mut();
            match state.index.remove(&id) {
                Some(node) => {
                    state.active.remove(node);
                    state.running && state.active.is_empty()
                }
                None => false,
            }
        };
        if stop {
            self.stop();
        }
    }

    pub fn contains<A>(&self, animation: &Rc<RefCell<A>>) -> bool
    where
        A: Tickable + 'static,
    {
        animation
            .try_borrow()
            .ok()
            .and_then(|target| {
                target
                    .registration()
                    .filter(|registration| registration.belongs_to(self))
                    .map(Registration::id)
            })
            .map_or(false, |id| self.contains_id(id))
    }

    pub fn contains_id(&self, id: AnimationId) -> bool {
        self.shared.state.borrow().index.contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.shared.state.borrow().active.len()
    }

    /// Identities in the active set, in insertion order.
    pub fn active_ids(&self) -> Vec<AnimationId> {
        self.shared
            .state
            .borrow()
            .active
            .map(|member, _, _| member.id)
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.borrow().running
    }

    /// Process a wake requested through the time source.
    ///
    /// Ticks every active animation once at least `rate_ms` has elapsed since
    /// the last processed wake; earlier wakes only re-arm for the remainder.
    ///
    /// # Panics
    ///
    /// Panics if the time source reports a time earlier than the last wake.
    pub fn wake(&self) {
        let now = self.shared.clock.now();
        let (last, rate) = {
            let state = self.shared.state.borrow();
            if state.in_wake {
                drop(state);
                log::warn!("ignoring re-entrant scheduler wake");
                return;
            }
            if !state.running {
                return;
            }
            (state.last_time.unwrap_or(now), state.config.rate_ms)
        };

        let delta = now - last;
        assert!(
            delta >= 0.0,
            "time source went backwards: {now}ms is before the last wake at {last}ms"
        );
        if delta < rate {
            self.shared.clock.schedule_wake(rate - delta);
            return;
        }

        let snapshot: Vec<(NodeHandle, AnimationId, Weak<RefCell<dyn Tickable>>)> = {
            let mut state = self.shared.state.borrow_mut();
            state.in_wake = true;
            state.last_time = Some(now);
            state
                .active
                .iter()
                .map(|(node, member)| (node, member.id, member.target.clone()))
                .collect()
        };
        log::trace!("scheduler wake: {} animations, {delta}ms", snapshot.len());

        let mut dropped = Vec::new();
        for (node, id, target) in snapshot {
            // removed earlier in this pass
            if !self.shared.state.borrow().active.contains(node) {
                continue;
            }
            let Some(target) = target.upgrade() else {
                dropped.push(id);
                continue;
            };
            match target.try_borrow_mut() {
                Ok(mut animation) => animation.tick(delta),
                Err(_) => log::warn!("animation {id:?} is borrowed, skipping this wake"),
            };
        }

        let (empty, running) = {
            let mut state = self.shared.state.borrow_mut();
            for id in &dropped {
                if let Some(node) = state.index.remove(id) {
                    state.active.remove(node);
                }
            }
            state.in_wake = false;
            (state.active.is_empty(), state.running)
        };
        if !dropped.is_empty() {
            log::debug!("pruned {} dropped animations", dropped.len());
        }

        if !empty {
            self.shared.clock.schedule_wake(rate);
        } else if running {
            self.stop();
        } else {
            // stopped during the pass
            self.shared.clock.cancel_wake();
        }
    }

    fn attach_member(&self, id: AnimationId, target: Weak<RefCell<dyn Tickable>>) {
        let start = {
            let mut state = self.shared.state.borrow_mut();
            if !state.index.contains_key(&id) {
                let node = state.active.insert_last(Member { id, target });
                state.index.insert(id, node);
            }
            !state.running
        };
        if start {
            self.start();
        }
    }

    fn start(&self) {
        let now = self.shared.clock.now();
        let (rate, in_wake) = {
            let mut state = self.shared.state.borrow_mut();
            state.running = true;
            if !state.in_wake {
                state.last_time = Some(now);
            }
            (state.config.rate_ms, state.in_wake)
        };
        log::debug!("scheduler started, rate {rate}ms");
        if !in_wake {
            self.shared.clock.schedule_wake(rate);
        }
    }

    fn stop(&self) {
        let in_wake = {
            let mut state = self.shared.state.borrow_mut();
            state.running = false;
            if !state.in_wake {
                state.last_time = None;
            }
            state.in_wake
        };
        log::debug!("scheduler stopped");
        if !in_wake {
            self.shared.clock.cancel_wake();
        }
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Scheduler")
            .field("config", &state.config)
            .field("active", &state.active.len())
            .field("running", &state.running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualTimeSource;

    struct Counter {
        registration: Option<Registration>,
        ticks: Vec<f64>,
    }

    impl Counter {
        fn shared() -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                registration: None,
                ticks: Vec::new(),
            }))
        }
    }

    impl Tickable for Counter {
        fn registration(&self) -> Option<&Registration> {
            self.registration.as_ref()
        }

        fn enroll(&mut self, registration: Registration) {
            self.registration = Some(registration);
        }

        fn tick(&mut self, delta_ms: f64) {
            self.ticks.push(delta_ms);
        }
    }

    fn scheduler() -> (Rc<ManualTimeSource>, Scheduler) {
        let clock = Rc::new(ManualTimeSource::new());
        let scheduler = Scheduler::new(SchedulerConfig::default(), clock.clone()).unwrap();
        (clock, scheduler)
    }

    #[test]
    fn rejects_bad_rate() {
        let clock = Rc::new(ManualTimeSource::new());
        let result = Scheduler::new(SchedulerConfig { rate_ms: 0.2 }, clock);
        assert!(result.is_err());
    }

    #[test]
    fn add_starts_and_remove_stops() {
        let (clock, scheduler) = scheduler();
        let counter = Counter::shared();
        assert!(!scheduler.is_running());

        scheduler.add(&counter);
        assert!(scheduler.is_running());
        assert!(scheduler.contains(&counter));
        assert_eq!(clock.pending_wake(), Some(5.0));

        scheduler.remove(&counter);
        assert!(!scheduler.is_running());
        assert!(!scheduler.contains(&counter));
        assert_eq!(clock.pending_wake(), None);
    }

    #[test]
    fn add_is_idempotent() {
        let (_clock, scheduler) = scheduler();
        let counter = Counter::shared();
        scheduler.add(&counter);
        let id = counter.borrow().registration().map(Registration::id);
        scheduler.add(&counter);
        assert_eq!(scheduler.active_count(), 1);
        assert_eq!(counter.borrow().registration().map(Registration::id), id);
    }

    #[test]
    fn remove_untracked_is_noop() {
        let (_clock, scheduler) = scheduler();
        let tracked = Counter::shared();
        let untracked = Counter::shared();
        scheduler.add(&tracked);
        scheduler.remove(&untracked);
        scheduler.remove_id(AnimationId(99));
        assert_eq!(scheduler.active_count(), 1);
        assert!(scheduler.is_running());
    }

    #[test]
    fn early_wake_rearms_for_remainder() {
        let (clock, scheduler) = scheduler();
        let counter = Counter::shared();
        scheduler.add(&counter);

        clock.advance(3.0);
        scheduler.wake();
        assert!(counter.borrow().ticks.is_empty());
        assert_eq!(clock.pending_wake(), Some(5.0));

        clock.advance(4.0);
        scheduler.wake();
        assert_eq!(counter.borrow().ticks, vec![7.0]);
        assert_eq!(clock.pending_wake(), Some(12.0));
    }

    #[test]
    fn dropped_members_are_pruned() {
        let (clock, scheduler) = scheduler();
        let kept = Counter::shared();
        let gone = Counter::shared();
        scheduler.add(&kept);
        scheduler.add(&gone);
        drop(gone);

        clock.advance(5.0);
        scheduler.wake();
        assert_eq!(scheduler.active_count(), 1);
        assert_eq!(kept.borrow().ticks, vec![5.0]);

        drop(kept);
        clock.advance(5.0);
        scheduler.wake();
        assert_eq!(scheduler.active_count(), 0);
        assert!(!scheduler.is_running());
        assert_eq!(clock.pending_wake(), None);
    }

    #[test]
    fn ids_come_from_the_scheduler() {
        let (_clock, a) = scheduler();
        let (_clock_b, b) = scheduler();
        let first = Counter::shared();
        let second = Counter::shared();
        a.add(&first);
        b.add(&second);
        assert_eq!(first.borrow().registration().map(Registration::id), Some(AnimationId(0)));
        assert_eq!(second.borrow().registration().map(Registration::id), Some(AnimationId(0)));
        assert!(first.borrow().registration().unwrap().belongs_to(&a));
        assert!(!first.borrow().registration().unwrap().belongs_to(&b));
    }

    #[test]
    fn moving_between_schedulers_detaches() {
        let (_clock, a) = scheduler();
        let (_clock_b, b) = scheduler();
        let counter = Counter::shared();
        a.add(&counter);
        b.add(&counter);
        assert!(!a.contains(&counter));
        assert!(!a.is_running());
        assert!(b.contains(&counter));
    }

    #[test]
    fn dropped_scheduler_makes_registration_inert() {
        let (_clock, scheduler) = scheduler();
        let counter = Counter::shared();
        scheduler.add(&counter);
        let registration = counter.borrow().registration().cloned().unwrap();
        drop(scheduler);
        registration.detach();
        registration.attach();
        assert!(registration.scheduler().upgrade().is_none());
    }

    #[test]
    #[should_panic(expected = "time source went backwards")]
    fn backwards_time_panics() {
        let (clock, scheduler) = scheduler();
        clock.set(100.0);
        scheduler.add(&Counter::shared());
        clock.set(50.0);
        scheduler.wake();
    }
}
