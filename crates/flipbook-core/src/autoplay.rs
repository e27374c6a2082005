//! Timer-driven page turning
//!
//! The scheduler owns the timer handle and decides, per tick, whether to
//! request another advance. It stops itself at the final spread.

use crate::input::NavIntent;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

pub struct AutoPlayScheduler {
    interval: Duration,
    enabled: bool,
    timer: Option<Interval>,
}

impl AutoPlayScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            enabled: false,
            timer: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Start the timer; the first tick fires one interval from now.
    /// Must be called from within a tokio runtime.
    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        let mut timer = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
        self.enabled = true;
        log::info!("Auto-play enabled ({} ms)", self.interval.as_millis());
    }

    pub fn disable(&mut self) {
        if self.enabled {
            log::info!("Auto-play disabled");
        }
        self.enabled = false;
        self.timer = None;
    }

    /// Clear the timer on viewer teardown
    pub fn cancel(&mut self) {
        self.disable();
    }

    /// Resolves on the next tick; pending forever while disabled
    pub async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Decide what a tick should do given the reader's position
    pub fn on_tick(&mut self, at_last_spread: bool) -> Option<NavIntent> {
        if !self.enabled {
            return None;
        }
        if at_last_spread {
            self.disable();
            return None;
        }
        Some(NavIntent::Advance)
    }

    /// Called after each committed flip. Returns true if this disabled auto-play.
    pub fn reached_end(&mut self, at_last_spread: bool) -> bool {
        if self.enabled && at_last_spread {
            self.disable();
            true
        } else {
            false
        }
    }
}
