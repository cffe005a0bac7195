//! Single-flight initialization.
//!
//! `InitGate` runs an expensive initializer (load or build the engine) at most
//! once at a time, on its own OS thread, and lets callers poll for the result
//! without blocking.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;

pub enum Readiness<T> {
    Ready(Arc<T>),
    Pending,
}

impl<T> Readiness<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready(_))
    }

    pub fn ready(self) -> Option<Arc<T>> {
        match self {
            Readiness::Ready(v) => Some(v),
            Readiness::Pending => None,
        }
    }
}

enum Phase<T> {
    Idle { last_error: Option<String> },
    Running,
    Ready(Arc<T>),
}

type Initializer<T> = dyn Fn() -> anyhow::Result<T> + Send + Sync;

pub struct InitGate<T> {
    phase: Arc<watch::Sender<Phase<T>>>,
    init: Arc<Initializer<T>>,
}

impl<T: Send + Sync + 'static> InitGate<T> {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let (tx, _rx) = watch::channel(Phase::Idle { last_error: None });
        Self { phase: Arc::new(tx), init: Arc::new(init) }
    }

    /// `Ready` once initialization has succeeded. Otherwise starts it if
    /// nothing is in flight and returns `Pending`.
    pub fn poll(&self) -> Readiness<T> {
        let mut ready = None;
        let start = self.phase.send_if_modified(|phase| match phase {
            Phase::Ready(v) => {
                ready = Some(Arc::clone(v));
                false
            }
            Phase::Running => false,
            Phase::Idle { .. } => {
                *phase = Phase::Running;
                true
            }
        });
        if let Some(v) = ready {
            return Readiness::Ready(v);
        }
        if start {
            self.spawn();
        }
        Readiness::Pending
    }

    /// Resolves once no attempt is in flight.
    pub async fn wait(&self) -> Readiness<T> {
        let mut rx = self.phase.subscribe();
        let ready = match rx.wait_for(|p| !matches!(p, Phase::Running)).await {
            Ok(phase) => match &*phase {
                Phase::Ready(v) => Some(Arc::clone(v)),
                _ => None,
            },
            Err(_) => None,
        };
        ready.map_or(Readiness::Pending, Readiness::Ready)
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.phase.borrow(), Phase::Ready(_))
    }

    /// Error message of the most recent failed attempt, if the gate is idle
    /// because of one.
    pub fn last_error(&self) -> Option<String> {
        match &*self.phase.borrow() {
            Phase::Idle { last_error } => last_error.clone(),
            _ => None,
        }
    }

    fn spawn(&self) {
        let phase = Arc::clone(&self.phase);
        let init = Arc::clone(&self.init);
        let spawned = std::thread::Builder::new().name("kbase-init".into()).spawn(move || {
            let _guard = ResetOnPanic(Arc::clone(&phase));
            let started = Instant::now();
            let next = match init() {
                Ok(value) => {
                    tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "initialization complete");
                    Phase::Ready(Arc::new(value))
                }
                Err(e) => {
                    let msg = format!("{e:#}");
                    tracing::error!(error = %msg, "initialization failed, next poll retries");
                    Phase::Idle { last_error: Some(msg) }
                }
            };
            phase.send_replace(next);
        });
        if let Err(e) = spawned {
            tracing::error!(error = %e, "could not start initializer thread");
            self.phase.send_replace(Phase::Idle { last_error: Some(e.to_string()) });
        }
    }
}

struct ResetOnPanic<T>(Arc<watch::Sender<Phase<T>>>);

impl<T> Drop for ResetOnPanic<T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.send_replace(Phase::Idle { last_error: Some("initializer panicked".into()) });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_polls_start_one_build() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let gate = Arc::new(InitGate::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(250));
            Ok(42u32)
        }));

        let pollers: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || gate.poll().is_ready())
            })
            .collect();
        for p in pollers {
            assert!(!p.join().unwrap());
        }

        let value = gate.wait().await.ready().expect("ready after wait");
        assert_eq!(*value, 42);
        assert!(gate.poll().is_ready());
        assert!(gate.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_returns_to_idle_and_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let gate = InitGate::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("model directory missing");
            }
            Ok("engine")
        });

        assert!(!gate.poll().is_ready());
        assert!(!gate.wait().await.is_ready());
        assert!(gate.last_error().unwrap().contains("model directory missing"));

        assert!(!gate.poll().is_ready());
        assert!(gate.wait().await.is_ready());
        assert!(gate.last_error().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn wait_on_untouched_gate_does_not_block() {
        let gate = InitGate::new(|| Ok(1u8));
        assert!(!gate.wait().await.is_ready());
        assert!(!gate.is_ready());
    }
}
