//! Idle watcher: keeps the idle screen up while nothing plays and its clock current

use chrono::{Local, Timelike};
use tracing::debug;

use crate::session::Session;

/// Whether the idle screen is up, and for which wall-clock minute it was drawn
#[derive(Debug, Default)]
pub struct IdleScreenState {
    showing: bool,
    shown_minute: Option<u32>,
}

impl IdleScreenState {
    /// Record one poll result; true means the idle screen should be (re)shown
    pub fn observe(&mut self, idle: bool, minute: u32) -> bool {
        if !idle {
            self.showing = false;
            self.shown_minute = None;
            return false;
        }
        !self.showing || self.shown_minute != Some(minute)
    }

    pub fn mark_shown(&mut self, minute: u32) {
        self.showing = true;
        self.shown_minute = Some(minute);
    }
}

pub async fn watch_idle(session: &Session) {
    let poll = session.config.idle_poll();
    let mut state = IdleScreenState::default();

    while !session.shutdown.is_set() {
        tokio::time::sleep(poll).await;

        // An unreachable player counts as busy so nothing is pushed at it
        let idle = session.client.is_idle().await.unwrap_or(false);
        let minute = Local::now().minute();

        if state.observe(idle, minute) {
            debug!(minute, "Refreshing idle screen");
            session.show_idle_screen().await;
            state.mark_shown(minute);
        }
    }
}
