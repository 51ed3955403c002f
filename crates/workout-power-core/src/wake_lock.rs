//! Keep-screen-on bookkeeping.
//!
//! The hold is level-triggered: `wanted` says whether a run needs the
//! screen on, and [`WakeLock::request_if_needed`] may be called any number
//! of times to converge the held handle towards it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ports::{WakeLockHandle, WakeLockPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WakeLockStatus {
    Active,
    /// Wanted but not currently held.
    Inactive,
    /// Disabled in settings, or no run wants it.
    Off,
    Unsupported,
}

impl fmt::Display for WakeLockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WakeLockStatus::Active => "Active",
            WakeLockStatus::Inactive => "Inactive",
            WakeLockStatus::Off => "Off",
            WakeLockStatus::Unsupported => "Unsupported",
        };
        write!(f, "Wake Lock: {text}")
    }
}

pub struct WakeLock {
    port: Box<dyn WakeLockPort>,
    enabled: bool,
    wanted: bool,
    handle: Option<WakeLockHandle>,
    supported: bool,
}

impl WakeLock {
    pub fn new(port: Box<dyn WakeLockPort>) -> Self {
        Self {
            port,
            enabled: true,
            wanted: false,
            handle: None,
            supported: true,
        }
    }

    /// Apply the user's setting. Disabling releases any hold.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.release();
        }
    }

    pub fn set_wanted(&mut self, wanted: bool) {
        self.wanted = wanted;
        if wanted {
            self.request_if_needed();
        } else {
            self.release();
        }
    }

    /// Acquire a hold if one is wanted and not already held.
    pub fn request_if_needed(&mut self) {
        if !self.enabled || !self.wanted || self.handle.is_some() || !self.supported {
            return;
        }
        match self.port.request() {
            Ok(handle) => {
                tracing::debug!(handle = handle.0, "wake lock acquired");
                self.handle = Some(handle);
            }
            Err(e) => {
                if e.is_unsupported() {
                    self.supported = false;
                }
                tracing::debug!(error = %e, "wake lock request failed");
            }
        }
    }

    /// Hosts drop the hold when hidden; ask again when visible.
    pub fn on_visibility_change(&mut self, visible: bool) {
        if visible {
            self.request_if_needed();
        } else {
            self.handle = None;
        }
    }

    pub fn is_held(&self) -> bool {
        self.handle.is_some()
    }

    pub fn status(&self) -> WakeLockStatus {
        if !self.supported {
            WakeLockStatus::Unsupported
        } else if !self.enabled || !self.wanted {
            WakeLockStatus::Off
        } else if self.handle.is_some() {
            WakeLockStatus::Active
        } else {
            WakeLockStatus::Inactive
        }
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.port.release(handle) {
                tracing::debug!(error = %e, "wake lock release failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Capability, CapabilityError};
    use crate::ports::Unsupported;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeLock {
        requests: Arc<Mutex<u64>>,
        released: Arc<Mutex<Vec<u64>>>,
        fail: bool,
    }

    impl WakeLockPort for FakeLock {
        fn request(&mut self) -> Result<WakeLockHandle, CapabilityError> {
            if self.fail {
                return Err(CapabilityError::failed(Capability::WakeLock, "denied"));
            }
            let mut n = self.requests.lock().unwrap();
            *n += 1;
            Ok(WakeLockHandle(*n))
        }

        fn release(&mut self, handle: WakeLockHandle) -> Result<(), CapabilityError> {
            self.released.lock().unwrap().push(handle.0);
            Ok(())
        }
    }

    #[test]
    fn request_is_idempotent() {
        let port = FakeLock::default();
        let mut lock = WakeLock::new(Box::new(port.clone()));
        assert_eq!(lock.status(), WakeLockStatus::Off);
        lock.set_wanted(true);
        lock.request_if_needed();
        lock.request_if_needed();
        assert_eq!(*port.requests.lock().unwrap(), 1);
        assert_eq!(lock.status().to_string(), "Wake Lock: Active");

        lock.set_wanted(false);
        lock.set_wanted(false);
        assert_eq!(*port.released.lock().unwrap(), vec![1]);
        assert_eq!(lock.status(), WakeLockStatus::Off);
    }

    #[test]
    fn visibility_reacquires() {
        let port = FakeLock::default();
        let mut lock = WakeLock::new(Box::new(port.clone()));
        lock.set_wanted(true);
        lock.on_visibility_change(false);
        assert_eq!(lock.status(), WakeLockStatus::Inactive);
        lock.on_visibility_change(true);
        assert!(lock.is_held());
        assert_eq!(*port.requests.lock().unwrap(), 2);
    }

    #[test]
    fn failure_leaves_inactive_and_unsupported_sticks() {
        let mut lock = WakeLock::new(Box::new(FakeLock {
            fail: true,
            ..FakeLock::default()
        }));
        lock.set_wanted(true);
        assert_eq!(lock.status(), WakeLockStatus::Inactive);

        let mut lock = WakeLock::new(Box::new(Unsupported));
        lock.set_wanted(true);
        assert_eq!(lock.status().to_string(), "Wake Lock: Unsupported");
    }

    #[test]
    fn disabled_setting_never_requests() {
        let port = FakeLock::default();
        let mut lock = WakeLock::new(Box::new(port.clone()));
        lock.set_enabled(false);
        lock.set_wanted(true);
        assert_eq!(*port.requests.lock().unwrap(), 0);
        assert_eq!(lock.status(), WakeLockStatus::Off);
    }
}
