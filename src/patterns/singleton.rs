//! Singleton, both eagerly (lazy_static) and lazily (OnceLock) initialised.
//!
//! Elsewhere in the crate managers are plain values passed around; this
//! module is the only place global instances live.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::thread;

use lazy_static::lazy_static;

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Debug)]
pub struct Registry {
    label: &'static str,
    hits: Mutex<u64>,
}

impl Registry {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            hits: Mutex::new(0),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Returns the count after this hit.
    pub fn hit(&self) -> u64 {
        let mut hits = match self.hits.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *hits += 1;
        *hits
    }
}

lazy_static! {
    static ref EAGER: Registry = Registry::new("eager");
}

static LAZY: OnceLock<Registry> = OnceLock::new();
static LAZY_CREATIONS: AtomicUsize = AtomicUsize::new(0);

pub fn eager() -> &'static Registry {
    &EAGER
}

/// Thread-safe lazy init; the closure runs at most once.
pub fn lazy() -> &'static Registry {
    LAZY.get_or_init(|| {
        LAZY_CREATIONS.fetch_add(1, Ordering::SeqCst);
        Registry::new("lazy")
    })
}

pub fn lazy_creations() -> usize {
    LAZY_CREATIONS.load(Ordering::SeqCst)
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Singleton");

    let a = lazy();
    let b = lazy();
    t.line(format!("lazy: same instance = {}", std::ptr::eq(a, b)));

    let c = eager();
    let d = eager();
    t.line(format!("eager: same instance = {}", std::ptr::eq(c, d)));

    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| lazy() as *const Registry as usize))
        .collect();
    let mut addresses = Vec::new();
    for handle in handles {
        match handle.join() {
            Ok(addr) => addresses.push(addr),
            Err(_) => anyhow::bail!("singleton worker thread panicked"),
        }
    }
    addresses.dedup();
    t.line(format!(
        "8 threads saw {} distinct instance(s); created {} time(s)",
        addresses.len(),
        lazy_creations()
    ));
    Ok(t)
}
