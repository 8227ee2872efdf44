//! Process-environment isolation for config tests.

use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

/// Every variable `Config::apply_env_overrides` consults.
const OVERRIDE_VARS: &[&str] = &[
    "CHAINPILOT_REASONING_PROVIDER",
    "CHAINPILOT_OPENAI_API_KEY",
    "OPENAI_API_KEY",
    "CHAINPILOT_STORAGE_DRIVER",
    "CHAINPILOT_DATA_DIR",
    "CHAINPILOT_MEMORY_DEPTH",
    "CHAINPILOT_GATEWAY_PORT",
    "PORT",
    "CHAINPILOT_GATEWAY_HOST",
    "HOST",
    "CHAINPILOT_LOG_LEVEL",
];

static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Exclusive view of the override variables: all of them start unset, tests
/// add their own with [`IsolatedEnv::set`], and the caller's values come back
/// on drop.
pub(super) struct IsolatedEnv {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl IsolatedEnv {
    pub(super) fn new() -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let mut env = Self {
            saved: Vec::with_capacity(OVERRIDE_VARS.len()),
            _lock: lock,
        };
        for &key in OVERRIDE_VARS {
            env.remember(key);
            // SAFETY: ENV_LOCK is held, so no other config test touches the
            // environment concurrently.
            unsafe {
                std::env::remove_var(key);
            }
        }
        env
    }

    pub(super) fn set(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.remember(key);
        // SAFETY: ENV_LOCK is held for the lifetime of `self`.
        unsafe {
            std::env::set_var(key, value);
        }
        self
    }

    fn remember(&mut self, key: &'static str) {
        if !self.saved.iter().any(|(saved, _)| *saved == key) {
            self.saved.push((key, std::env::var(key).ok()));
        }
    }
}

impl Drop for IsolatedEnv {
    fn drop(&mut self) {
        // Runs before `_lock` is released.
        for (key, previous) in self.saved.drain(..).rev() {
            // SAFETY: ENV_LOCK is still held.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
