use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A one-way flag shared between whoever wants a long running loop to stop, and the loop itself.
/// Cloning gives another handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    triggered: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Relaxed);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let cancellation = Cancellation::new();
        let listener = cancellation.clone();
        assert!(!listener.is_triggered());

        cancellation.trigger();
        assert!(listener.is_triggered());

        // Triggering again is harmless
        listener.trigger();
        assert!(cancellation.is_triggered());
    }
}
