//! Collects run metadata reported by the executor out of band.

use std::sync::OnceLock;

use parley_contract::executor::RunObserver;

/// Write-once holder for the engine-assigned run identifier.
///
/// The executor reports the id through [`RunObserver`] whenever its engine
/// assigns one; the sequencer reads it when deciding whether a `metadata`
/// event can be emitted. An id is never fabricated here.
#[derive(Debug, Default)]
pub struct EventAggregator {
    run_id: OnceLock<String>,
}

impl EventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded run id, if the executor has reported one yet.
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.get().map(String::as_str)
    }
}

impl RunObserver for EventAggregator {
    fn record_run_id(&self, run_id: &str) {
        // First write wins.
        let _ = self.run_id.set(run_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_recorded_id_wins() {
        let aggregator = EventAggregator::new();
        assert_eq!(aggregator.run_id(), None);

        aggregator.record_run_id("run-1");
        aggregator.record_run_id("run-2");
        assert_eq!(aggregator.run_id(), Some("run-1"));
    }
}
