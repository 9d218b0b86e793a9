#![allow(dead_code)]

use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard};

// The environment is process-global; serialize tests that touch it.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Overrides environment variables until dropped, then restores them.
pub struct EnvGuard {
    prev: Vec<(&'static str, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in self.prev.drain(..).rev() {
            unsafe {
                match value {
                    Some(val) => std::env::set_var(name, val),
                    None => std::env::remove_var(name),
                }
            }
        }
    }
}

/// Set (`Some`) or remove (`None`) each variable while the guard is alive.
pub fn with_env(vars: &[(&'static str, Option<&str>)]) -> EnvGuard {
    let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut prev = Vec::with_capacity(vars.len());
    for (name, value) in vars {
        prev.push((*name, std::env::var_os(name)));
        unsafe {
            match value {
                Some(val) => std::env::set_var(name, val),
                None => std::env::remove_var(name),
            }
        }
    }
    EnvGuard { prev, _lock: lock }
}
