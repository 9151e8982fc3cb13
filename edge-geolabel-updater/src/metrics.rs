use std::fmt;

use prometheus::{IntCounterVec, Opts, Registry};

use super::*;

/// Prometheus counters for update cycles, one series per [`CycleState`].
#[derive(Clone)]
pub struct CycleMetrics {
    cycles: IntCounterVec,
}

impl CycleMetrics {
    pub const CYCLES: &'static str = "geolocation_update_cycles_total";

    /// Registers the counters with `registry`.
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let opts = Opts::new(Self::CYCLES, "Geolocation update cycles by terminal state");
        let cycles = IntCounterVec::new(opts, &["state"])?;
        registry.register(Box::new(cycles.clone()))?;
        Ok(Self { cycles })
    }

    pub fn observe(&self, state: CycleState) {
        self.cycles.with_label_values(&[state.as_str()]).inc();
    }

    pub fn count(&self, state: CycleState) -> u64 {
        self.cycles.with_label_values(&[state.as_str()]).get()
    }
}

impl fmt::Debug for CycleMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleMetrics")
            .field("cycles", &Self::CYCLES)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_state() {
        let registry = Registry::new();
        let metrics = CycleMetrics::new(&registry).unwrap();

        metrics.observe(CycleState::Committed);
        metrics.observe(CycleState::Committed);
        metrics.observe(CycleState::FetchFailed);

        assert_eq!(metrics.count(CycleState::Committed), 2);
        assert_eq!(metrics.count(CycleState::FetchFailed), 1);
        assert_eq!(metrics.count(CycleState::PatchFailed), 0);

        let text = prometheus::TextEncoder::new()
            .encode_to_string(&registry.gather())
            .unwrap();
        assert!(text.contains(r#"geolocation_update_cycles_total{state="committed"} 2"#));
        assert!(text.contains(r#"geolocation_update_cycles_total{state="fetch_failed"} 1"#));
    }

    #[test]
    fn registers_once_per_registry() {
        let registry = Registry::new();
        CycleMetrics::new(&registry).unwrap();
        assert!(CycleMetrics::new(&registry).is_err());
    }
}
