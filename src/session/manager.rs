//! Session Lifecycle Manager
//!
//! State machine behind the console's inactivity handling:
//!
//! ```text
//! Active -> ScheduledWarning -> Warning -> Active (extend)
//!                                       -> LoggedOut (expiry / user / cookie gone)
//! ```
//!
//! The manager runs on a single cooperative thread of execution (the
//! browser tab model). It owns the logged-in flag, the last-activity
//! timestamp and the single warning overlay; the host delivers DOM events
//! and fired timers back into it. No timer logic runs unless the logged-in
//! flag is true.

use std::time::Duration;

use crate::config::SessionSettings;
use crate::session::clock::Clock;
use crate::session::cookie::{self, SessionIdentity};
use crate::session::storage::{CookieJar, SecureStore};
use crate::session::timer::{Debounce, Scheduler, TimerId};
use crate::shared::crypto::SecureCodec;
use crate::shared::error::AppError;

/// Persisted storage keys.
pub mod keys {
    pub const LOGGED_IN: &str = "loggedIn";
    pub const LAST_ACTIVITY: &str = "lastActivity";
    pub const LOGOUT_REASON: &str = "logoutReason";
    pub const API_BASE_URL: &str = "apiBaseUrl";
    pub const THEME: &str = "theme";
    pub const LANGUAGE: &str = "language";
}

/// Keys that survive the logout purge: connection settings, presentation
/// preferences, and the transient logout-reason marker the entry page
/// reads for its notification.
pub const PRESERVED_KEYS: &[&str] = &[
    keys::API_BASE_URL,
    keys::THEME,
    keys::LANGUAGE,
    keys::LOGOUT_REASON,
];

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// Inactivity countdown reached zero
    Timeout,
    /// User chose "logout now" on the warning overlay
    UserLogout,
    /// Cookie poll found the session cookie gone
    CookieMissing,
}

impl LogoutReason {
    pub fn as_str(self) -> &'static str {
        match self {
            LogoutReason::Timeout => "timeout",
            LogoutReason::UserLogout => "user_logout",
            LogoutReason::CookieMissing => "cookie_missing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "timeout" => Some(Self::Timeout),
            "user_logout" => Some(Self::UserLogout),
            "cookie_missing" => Some(Self::CookieMissing),
            _ => None,
        }
    }
}

/// Kind of user interaction that counts as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Pointer,
    Key,
    Scroll,
    Touch,
    Click,
    Navigation,
}

/// A user-interaction event as delivered by the host.
#[derive(Debug, Clone, Copy)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    /// True when the event originated on the warning overlay itself.
    /// Such events must not count as activity; the overlay's own extend
    /// control goes through [`SessionManager::extend_session`] instead.
    pub on_warning_overlay: bool,
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind) -> Self {
        Self {
            kind,
            on_warning_overlay: false,
        }
    }

    pub fn on_overlay(kind: ActivityKind) -> Self {
        Self {
            kind,
            on_warning_overlay: true,
        }
    }
}

/// UI surface the manager drives. All operations are idempotent from the
/// manager's point of view; hiding a hidden overlay is a no-op.
pub trait SessionUi {
    /// Show the warning overlay with the countdown at `seconds_left`.
    fn show_warning(&mut self, seconds_left: u32);

    /// Update the visible countdown.
    fn update_countdown(&mut self, seconds_left: u32);

    /// Hide the warning overlay.
    fn hide_warning(&mut self);

    /// Show the transient logged-out notification.
    fn notify_logout(&mut self, reason: LogoutReason);

    /// Navigate to the entry page.
    fn navigate_to_entry(&mut self);
}

/// Timing configuration for the manager.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Inactivity tolerated before expiry
    pub timeout: Duration,
    /// Length of the visible countdown, in seconds
    pub countdown_secs: u32,
    /// Cookie-presence poll period
    pub cookie_poll_interval: Duration,
    /// Floor for the warning delay
    pub min_warning_delay: Duration,
    /// How long the logged-out notification stays up before navigation
    pub notification_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(3_600_000),
            countdown_secs: 10,
            cookie_poll_interval: Duration::from_secs(5),
            min_warning_delay: Duration::from_millis(1000),
            notification_delay: Duration::from_secs(2),
        }
    }
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            timeout: Duration::from_millis(settings.timeout_ms),
            countdown_secs: settings.countdown_secs,
            cookie_poll_interval: Duration::from_secs(settings.cookie_poll_interval_secs),
            min_warning_delay: Duration::from_millis(settings.min_warning_delay_ms),
            ..Self::default()
        }
    }
}

/// Active countdown: timer handle plus the visible seconds remaining.
/// Its presence is also the overlay singleton flag.
#[derive(Debug)]
struct Countdown {
    timer: TimerId,
    remaining: u32,
}

/// The session lifecycle manager.
pub struct SessionManager {
    config: SessionConfig,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
    store: SecureStore,
    cookies: Box<dyn CookieJar>,
    ui: Box<dyn SessionUi>,
    codec: SecureCodec,

    logged_in: bool,
    last_activity_ms: u64,
    warning: Debounce,
    countdown: Option<Countdown>,
    cookie_poll: Option<TimerId>,
    nav_delay: Option<TimerId>,
}

impl SessionManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SessionConfig,
        clock: Box<dyn Clock>,
        scheduler: Box<dyn Scheduler>,
        store: SecureStore,
        cookies: Box<dyn CookieJar>,
        ui: Box<dyn SessionUi>,
        codec: SecureCodec,
    ) -> Self {
        Self {
            config,
            clock,
            scheduler,
            store,
            cookies,
            ui,
            codec,
            logged_in: false,
            last_activity_ms: 0,
            warning: Debounce::new(),
            countdown: None,
            cookie_poll: None,
            nav_delay: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Whether the inactivity timeout has elapsed since the last activity.
    pub fn is_timed_out(&self) -> bool {
        let elapsed = self.clock.now_ms().saturating_sub(self.last_activity_ms);
        elapsed >= self.config.timeout.as_millis() as u64
    }

    /// Start a fresh session: write the cookie, persist the logged-in
    /// flag, seed activity, and arm the warning timer and cookie poll.
    pub fn establish_session(&mut self, identity: &SessionIdentity) -> Result<(), AppError> {
        cookie::write_session(
            self.cookies.as_mut(),
            &self.codec,
            identity,
            self.config.timeout.as_secs(),
        )?;
        self.store.set_json(keys::LOGGED_IN, &true)?;
        self.logged_in = true;
        self.update_last_activity();
        self.schedule_session_timeout();
        self.arm_cookie_poll();
        tracing::info!(user_id = identity.user_id, "Session established");
        Ok(())
    }

    /// Resume supervision after a page load. Reads the persisted
    /// logged-in flag; when it is false, nothing is armed.
    pub fn attach(&mut self) {
        self.logged_in = self.store.get_json(keys::LOGGED_IN).unwrap_or(false);
        if !self.logged_in {
            tracing::debug!("Not logged in, session supervision idle");
            return;
        }
        self.update_last_activity();
        self.schedule_session_timeout();
        self.arm_cookie_poll();
    }

    /// Record the current time as the last-activity marker.
    ///
    /// Side effect only; persistence failures are logged, never surfaced.
    pub fn update_last_activity(&mut self) {
        let now = self.clock.now_ms();
        self.last_activity_ms = now;
        if let Err(e) = self.store.set_json(keys::LAST_ACTIVITY, &now) {
            tracing::warn!(error = %e, "Failed to persist last activity");
        }
    }

    /// Arm (or re-arm) the deferred warning so it fires at
    /// `timeout - countdown`, floored at the configured minimum.
    pub fn schedule_session_timeout(&mut self) {
        if !self.logged_in {
            return;
        }
        let timeout_ms = self.config.timeout.as_millis() as u64;
        let countdown_ms = u64::from(self.config.countdown_secs) * 1000;
        let floor_ms = self.config.min_warning_delay.as_millis() as u64;
        let delay = timeout_ms.saturating_sub(countdown_ms).max(floor_ms);
        self.warning
            .reschedule(self.scheduler.as_mut(), Duration::from_millis(delay));
    }

    /// Show the warning overlay and start the one-second countdown.
    ///
    /// No-op when the overlay is already shown or when not logged in; the
    /// `countdown` field is the single shared overlay reference.
    pub fn start_countdown(&mut self) {
        if !self.logged_in || self.countdown.is_some() {
            return;
        }
        let remaining = self.config.countdown_secs;
        self.ui.show_warning(remaining);
        let timer = self.scheduler.set_interval(Duration::from_secs(1));
        self.countdown = Some(Countdown { timer, remaining });
        tracing::debug!(seconds = remaining, "Expiry warning shown");
    }

    /// "Extend" action on the warning overlay: dismiss the countdown,
    /// refresh activity and the cookie, and re-arm the warning timer.
    pub fn extend_session(&mut self) {
        if !self.logged_in {
            return;
        }
        if let Some(countdown) = self.countdown.take() {
            self.scheduler.clear(countdown.timer);
            self.ui.hide_warning();
        }
        self.update_last_activity();
        self.refresh_session_cookie();
        self.schedule_session_timeout();
        tracing::debug!("Session extended from warning overlay");
    }

    /// "Logout now" action on the warning overlay.
    pub fn logout_now(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            self.scheduler.clear(countdown.timer);
        }
        self.perform_session_logout(LogoutReason::UserLogout);
    }

    /// End the session. Idempotent: a second call only navigates.
    ///
    /// The logged-in flag flips first so no event or timer path can re-arm
    /// supervision mid-logout. Storage and cookie failures are swallowed
    /// and logged; the sequence always reaches the navigation step.
    pub fn perform_session_logout(&mut self, reason: LogoutReason) {
        if !self.logged_in {
            self.ui.navigate_to_entry();
            return;
        }
        self.logged_in = false;

        self.cancel_supervision_timers();
        self.ui.hide_warning();

        if let Err(e) = cookie::clear_session(self.cookies.as_mut()) {
            tracing::warn!(error = %e, "Failed to clear session cookie");
        }
        self.purge_storage();
        if let Err(e) = self.store.set_json(keys::LOGOUT_REASON, &reason.as_str()) {
            tracing::warn!(error = %e, "Failed to persist logout reason");
        }

        self.ui.notify_logout(reason);
        self.nav_delay = Some(self.scheduler.set_timeout(self.config.notification_delay));
        tracing::info!(reason = reason.as_str(), "Session logged out");
    }

    /// Consume the persisted logout-reason marker (read by the entry page
    /// to pick its notification).
    pub fn consume_logout_reason(&mut self) -> Option<LogoutReason> {
        let marker: String = self.store.get_json(keys::LOGOUT_REASON)?;
        if let Err(e) = self.store.remove(keys::LOGOUT_REASON) {
            tracing::warn!(error = %e, "Failed to clear logout reason marker");
        }
        LogoutReason::from_str(&marker)
    }

    /// A recognized user-interaction event.
    ///
    /// Refreshes activity and re-arms the warning timer, except for
    /// events originating on the warning overlay, which must not
    /// accidentally dismiss a warning the user has not consciously acted
    /// on. An active countdown keeps ticking either way; only
    /// [`extend_session`](Self::extend_session) dismisses it.
    pub fn on_user_activity(&mut self, event: ActivityEvent) {
        if !self.logged_in {
            return;
        }
        if event.on_warning_overlay {
            tracing::trace!(kind = ?event.kind, "Overlay interaction ignored as activity");
            return;
        }
        self.update_last_activity();
        self.schedule_session_timeout();
    }

    /// Tab regained visibility: re-validate elapsed inactivity against the
    /// timeout. Already exceeded means immediate logout; otherwise this
    /// counts as normal activity.
    pub fn on_visibility_regained(&mut self) {
        if !self.logged_in {
            return;
        }
        if self.is_timed_out() {
            self.perform_session_logout(LogoutReason::Timeout);
            return;
        }
        self.update_last_activity();
        self.schedule_session_timeout();
    }

    /// Timer callback from the host scheduler.
    pub fn on_timer(&mut self, id: TimerId) {
        if self.warning.acknowledge(id) {
            self.start_countdown();
            return;
        }
        if self.countdown.as_ref().is_some_and(|c| c.timer == id) {
            self.countdown_tick();
            return;
        }
        if self.cookie_poll == Some(id) {
            self.poll_session_cookie();
            return;
        }
        if self.nav_delay == Some(id) {
            self.nav_delay = None;
            self.ui.navigate_to_entry();
        }
    }

    fn countdown_tick(&mut self) {
        let Some(countdown) = self.countdown.as_mut() else {
            return;
        };
        countdown.remaining = countdown.remaining.saturating_sub(1);
        if countdown.remaining == 0 {
            self.perform_session_logout(LogoutReason::Timeout);
        } else {
            let remaining = countdown.remaining;
            self.ui.update_countdown(remaining);
        }
    }

    fn poll_session_cookie(&mut self) {
        if !self.logged_in {
            return;
        }
        if cookie::read_session(self.cookies.as_ref(), &self.codec).is_none() {
            tracing::info!("Session cookie missing or unreadable, logging out");
            self.perform_session_logout(LogoutReason::CookieMissing);
        }
    }

    fn refresh_session_cookie(&mut self) {
        let Some(mut identity) = cookie::read_session(self.cookies.as_ref(), &self.codec) else {
            // Absent cookie is the poll's concern, not extend's
            return;
        };
        identity.timestamp = self.clock.now_ms() as i64;
        if let Err(e) = cookie::write_session(
            self.cookies.as_mut(),
            &self.codec,
            &identity,
            self.config.timeout.as_secs(),
        ) {
            tracing::warn!(error = %e, "Failed to refresh session cookie");
        }
    }

    fn arm_cookie_poll(&mut self) {
        if let Some(id) = self.cookie_poll.take() {
            self.scheduler.clear(id);
        }
        self.cookie_poll = Some(self.scheduler.set_interval(self.config.cookie_poll_interval));
    }

    fn cancel_supervision_timers(&mut self) {
        self.warning.cancel(self.scheduler.as_mut());
        if let Some(countdown) = self.countdown.take() {
            self.scheduler.clear(countdown.timer);
        }
        if let Some(id) = self.cookie_poll.take() {
            self.scheduler.clear(id);
        }
    }

    fn purge_storage(&mut self) {
        for key in self.store.keys() {
            if PRESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Err(e) = self.store.remove(&key) {
                tracing::warn!(key = %key, error = %e, "Failed to remove persisted entry");
            }
        }
    }
}
