use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness flag owned by a shown overlay instance.
///
/// Continuations that will eventually write into the instance take a
/// [`LiveGuard`] up front and check it when they complete; once the
/// instance is torn down the token is revoked and the completion does
/// nothing.
#[derive(Debug, Clone)]
pub struct LiveToken {
    alive: Arc<AtomicBool>,
}

impl LiveToken {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn guard(&self) -> LiveGuard {
        LiveGuard {
            alive: Arc::clone(&self.alive),
        }
    }

    pub fn revoke(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl Default for LiveToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a [`LiveToken`], held by pending work.
#[derive(Debug, Clone)]
pub struct LiveGuard {
    alive: Arc<AtomicBool>,
}

impl LiveGuard {
    pub fn is_live(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

/// Teardown actions registered by the currently shown instance.
///
/// Every dismissal path drains the same registry, so no cleanup step
/// depends on which trigger fired first.
#[derive(Default)]
pub struct DismissalRegistry {
    disposers: Vec<Box<dyn FnOnce() + Send>>,
}

impl DismissalRegistry {
    pub fn register(&mut self, disposer: impl FnOnce() + Send + 'static) {
        self.disposers.push(Box::new(disposer));
    }

    pub fn dispose_all(&mut self) {
        for disposer in self.disposers.drain(..) {
            disposer();
        }
    }
}
