//! Test Support
//!
//! Shared fakes for driving the session manager deterministically: a
//! manually advanced clock, a recording scheduler, shared storage handles,
//! and a UI that logs every call. All handles are `Rc`-shared clones so a
//! test keeps a view onto the state it hands the manager.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::session::clock::Clock;
use crate::session::cookie::CookieAttributes;
use crate::session::manager::{LogoutReason, SessionUi};
use crate::session::storage::{
    CookieJar, KeyValueStore, MemoryCookieJar, MemoryStore, StoreError, StoreResult,
};
use crate::session::timer::{Scheduler, TimerId};

/// Manually advanced clock.
#[derive(Clone, Default)]
pub struct FakeClock(Rc<Cell<u64>>);

impl FakeClock {
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }

    pub fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// An armed one-shot timer.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmedTimeout {
    pub id: TimerId,
    pub delay: Duration,
}

/// An armed repeating timer.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmedInterval {
    pub id: TimerId,
    pub period: Duration,
}

#[derive(Default)]
struct SchedulerState {
    next_id: TimerId,
    timeouts: Vec<ArmedTimeout>,
    intervals: Vec<ArmedInterval>,
}

/// Recording scheduler; tests fire timers by id through the owner.
#[derive(Clone, Default)]
pub struct FakeScheduler(Rc<RefCell<SchedulerState>>);

impl FakeScheduler {
    /// Currently armed one-shot timers, in arming order.
    pub fn one_shots(&self) -> Vec<ArmedTimeout> {
        self.0.borrow().timeouts.clone()
    }

    /// Currently armed repeating timers, in arming order.
    pub fn intervals(&self) -> Vec<ArmedInterval> {
        self.0.borrow().intervals.clone()
    }

    /// All armed ids (one-shots then intervals).
    pub fn armed_ids(&self) -> Vec<TimerId> {
        let state = self.0.borrow();
        state
            .timeouts
            .iter()
            .map(|t| t.id)
            .chain(state.intervals.iter().map(|t| t.id))
            .collect()
    }

    /// Mark a one-shot as fired so it no longer shows as armed. Intervals
    /// stay armed until cleared.
    pub fn complete(&self, id: TimerId) {
        self.0.borrow_mut().timeouts.retain(|t| t.id != id);
    }
}

impl Scheduler for FakeScheduler {
    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        let mut state = self.0.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.timeouts.push(ArmedTimeout { id, delay });
        id
    }

    fn set_interval(&mut self, period: Duration) -> TimerId {
        let mut state = self.0.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.intervals.push(ArmedInterval { id, period });
        id
    }

    fn clear(&mut self, id: TimerId) {
        let mut state = self.0.borrow_mut();
        state.timeouts.retain(|t| t.id != id);
        state.intervals.retain(|t| t.id != id);
    }
}

#[derive(Default)]
struct UiLog {
    shown: Vec<u32>,
    updates: Vec<u32>,
    hides: u32,
    notices: Vec<LogoutReason>,
    navigations: u32,
}

/// UI fake recording every call.
#[derive(Clone, Default)]
pub struct RecordingUi(Rc<RefCell<UiLog>>);

impl RecordingUi {
    pub fn shown(&self) -> Vec<u32> {
        self.0.borrow().shown.clone()
    }

    pub fn countdown_updates(&self) -> Vec<u32> {
        self.0.borrow().updates.clone()
    }

    pub fn hides(&self) -> u32 {
        self.0.borrow().hides
    }

    pub fn logout_notices(&self) -> Vec<LogoutReason> {
        self.0.borrow().notices.clone()
    }

    pub fn navigations(&self) -> u32 {
        self.0.borrow().navigations
    }
}

impl SessionUi for RecordingUi {
    fn show_warning(&mut self, seconds_left: u32) {
        self.0.borrow_mut().shown.push(seconds_left);
    }

    fn update_countdown(&mut self, seconds_left: u32) {
        self.0.borrow_mut().updates.push(seconds_left);
    }

    fn hide_warning(&mut self) {
        self.0.borrow_mut().hides += 1;
    }

    fn notify_logout(&mut self, reason: LogoutReason) {
        self.0.borrow_mut().notices.push(reason);
    }

    fn navigate_to_entry(&mut self) {
        self.0.borrow_mut().navigations += 1;
    }
}

/// Shared handle over a [`MemoryStore`].
#[derive(Clone, Default)]
pub struct SharedStore(Rc<RefCell<MemoryStore>>);

impl SharedStore {
    pub fn set_raw(&self, key: &str, value: &str) {
        self.0
            .borrow_mut()
            .set(key, value)
            .expect("memory store set is infallible");
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key)
    }

    pub fn raw_keys(&self) -> Vec<String> {
        self.0.borrow().keys()
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult {
        self.0.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> StoreResult {
        self.0.borrow_mut().remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.0.borrow().keys()
    }
}

/// Store handle whose writes can be made to fail mid-test. Reads keep
/// working so the logged-in flag stays visible while every mutation
/// errors, which is the failure mode logout must survive.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: Rc<RefCell<MemoryStore>>,
    failing: Rc<Cell<bool>>,
}

impl FlakyStore {
    pub fn fail_writes(&self) {
        self.failing.set(true);
    }

    pub fn raw_keys(&self) -> Vec<String> {
        self.inner.borrow().keys()
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult {
        if self.failing.get() {
            return Err(StoreError(format!("write rejected: {key}")));
        }
        self.inner.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> StoreResult {
        if self.failing.get() {
            return Err(StoreError(format!("remove rejected: {key}")));
        }
        self.inner.borrow_mut().remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.borrow().keys()
    }
}

/// Cookie jar whose writes can be made to fail mid-test.
#[derive(Clone, Default)]
pub struct FlakyCookieJar {
    inner: Rc<RefCell<MemoryCookieJar>>,
    failing: Rc<Cell<bool>>,
}

impl FlakyCookieJar {
    pub fn fail_writes(&self) {
        self.failing.set(true);
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.inner.borrow().get(name)
    }
}

impl CookieJar for FlakyCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.inner.borrow().get(name)
    }

    fn set(&mut self, name: &str, value: &str, attrs: &CookieAttributes) -> StoreResult {
        if self.failing.get() {
            return Err(StoreError(format!("cookie set rejected: {name}")));
        }
        self.inner.borrow_mut().set(name, value, attrs)
    }

    fn remove(&mut self, name: &str) -> StoreResult {
        if self.failing.get() {
            return Err(StoreError(format!("cookie remove rejected: {name}")));
        }
        self.inner.borrow_mut().remove(name)
    }
}

/// Shared handle over a [`MemoryCookieJar`].
#[derive(Clone, Default)]
pub struct SharedCookieJar(Rc<RefCell<MemoryCookieJar>>);

impl SharedCookieJar {
    pub fn get(&self, name: &str) -> Option<String> {
        self.0.borrow().get(name)
    }

    pub fn remove_raw(&self, name: &str) {
        self.0
            .borrow_mut()
            .remove(name)
            .expect("memory jar remove is infallible");
    }
}

impl CookieJar for SharedCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.0.borrow().get(name)
    }

    fn set(&mut self, name: &str, value: &str, attrs: &CookieAttributes) -> StoreResult {
        self.0.borrow_mut().set(name, value, attrs)
    }

    fn remove(&mut self, name: &str) -> StoreResult {
        self.0.borrow_mut().remove(name)
    }
}
