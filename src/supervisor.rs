//! Watchdog-based session supervisor
//!
//! The watchdog is the only recovery mechanism: a silent host, a noisy line
//! and a desynchronised command stream all end in the same full reset, after
//! which the entry dispatcher starts the application.

use crate::hal::watchdog::{Expiry, WatchdogTimeout};
use embedded_hal::watchdog::{Watchdog, WatchdogEnable};

pub struct Supervisor<W> {
    watchdog: W,
    timeout: WatchdogTimeout,
}

impl<W> Supervisor<W>
where
    W: WatchdogEnable<Time = WatchdogTimeout> + Watchdog + Expiry,
{
    /// Arms the watchdog with `timeout`. There is no way to stop it again.
    pub fn start(mut watchdog: W, timeout: WatchdogTimeout) -> Self {
        watchdog.start(timeout);
        Self { watchdog, timeout }
    }

    /// Restarts the countdown with a new period.
    pub fn arm(&mut self, timeout: WatchdogTimeout) {
        self.watchdog.start(timeout);
        self.timeout = timeout;
    }

    /// Restarts the countdown with the current period.
    #[inline]
    pub fn service(&mut self) {
        self.watchdog.feed();
    }

    #[inline]
    pub fn expired(&mut self) -> bool {
        self.watchdog.expired()
    }

    pub fn timeout(&self) -> WatchdogTimeout {
        self.timeout
    }

    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimWatchdog;

    #[test]
    fn fires_after_period_without_service() {
        let mut supervisor = Supervisor::start(SimWatchdog::new(), WatchdogTimeout::Ms16);
        let polls = (0..100).take_while(|_| !supervisor.expired()).count();
        assert_eq!(polls, 15);
        assert!(supervisor.expired());
    }

    #[test]
    fn service_restarts_countdown() {
        let mut supervisor = Supervisor::start(SimWatchdog::new(), WatchdogTimeout::Ms32);
        for _ in 0..20 {
            assert!(!supervisor.expired());
        }
        supervisor.service();
        for _ in 0..31 {
            assert!(!supervisor.expired());
        }
        assert!(supervisor.expired());
        assert_eq!(supervisor.watchdog().feeds(), 1);
    }

    #[test]
    fn arm_switches_period() {
        let mut supervisor = Supervisor::start(SimWatchdog::new(), WatchdogTimeout::Ms1000);
        supervisor.arm(WatchdogTimeout::Ms16);
        assert_eq!(supervisor.timeout(), WatchdogTimeout::Ms16);
        assert_eq!(supervisor.watchdog().arms(), &[WatchdogTimeout::Ms1000, WatchdogTimeout::Ms16]);
    }
}
