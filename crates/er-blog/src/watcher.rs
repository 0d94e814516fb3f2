/// Fires "load more" when the sentinel scrolls into view.
///
/// The browser build wraps an `IntersectionObserver`; the controller only
/// arms and disarms it.
pub trait ViewportWatcher {
    fn observe(&mut self);
    fn disconnect(&mut self);
    fn is_observing(&self) -> bool;

    /// Start over so the current visibility is reported again, even when it
    /// did not change since the last report.
    fn rearm(&mut self) {
        self.disconnect();
        self.observe();
    }
}

/// Watcher without a viewport, used off the DOM and in tests.
#[derive(Debug, Default)]
pub struct MemoryWatcher {
    observing: bool,
    arms: usize,
}

impl MemoryWatcher {
    /// How many times watching was (re)started.
    pub fn arms(&self) -> usize {
        self.arms
    }
}

impl ViewportWatcher for MemoryWatcher {
    fn observe(&mut self) {
        if !self.observing {
            self.observing = true;
            self.arms += 1;
        }
    }

    fn disconnect(&mut self) {
        self.observing = false;
    }

    fn is_observing(&self) -> bool {
        self.observing
    }
}
