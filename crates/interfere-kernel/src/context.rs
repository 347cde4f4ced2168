//! Kernel context: tolerance and message verbosity.
//!
//! Verbosity is context-wide state. It is only changed through
//! [`VerbosityGuard`], which puts the previous level back when dropped.

use std::sync::atomic::{AtomicU8, Ordering};

use interfere_math::Tolerance;

/// Default message level (errors and warnings).
pub const DEFAULT_VERBOSITY: u8 = 1;

/// Kernel context shared by all operations of one run.
#[derive(Debug)]
pub struct Context {
    verbosity: AtomicU8,
    tolerance: Tolerance,
}

impl Context {
    /// Context with default tolerance and verbosity.
    pub fn new() -> Self {
        Self {
            verbosity: AtomicU8::new(DEFAULT_VERBOSITY),
            tolerance: Tolerance::DEFAULT,
        }
    }

    /// Geometric tolerance.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Current message level; 0 silences kernel diagnostics.
    pub fn verbosity(&self) -> u8 {
        self.verbosity.load(Ordering::Acquire)
    }

    /// Set the message level until the returned guard is dropped.
    pub fn scoped_verbosity(&self, level: u8) -> VerbosityGuard<'_> {
        let previous = self.verbosity.swap(level, Ordering::AcqRel);
        VerbosityGuard {
            ctx: self,
            previous,
        }
    }

    /// Silence kernel diagnostics until the returned guard is dropped.
    pub fn quiet(&self) -> VerbosityGuard<'_> {
        self.scoped_verbosity(0)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Restores the previous verbosity on drop.
#[derive(Debug)]
#[must_use = "verbosity is restored as soon as the guard is dropped"]
pub struct VerbosityGuard<'a> {
    ctx: &'a Context,
    previous: u8,
}

impl Drop for VerbosityGuard<'_> {
    fn drop(&mut self) {
        self.ctx.verbosity.store(self.previous, Ordering::Release);
    }
}
