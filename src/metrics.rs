#[derive(Debug, Clone)]
pub struct Metrics {
    pub pages_fetched: prometheus::IntCounterVec,
    pub tokens_fetched: prometheus::GaugeVec,
    failures: prometheus::IntCounterVec,
    pub last_update: prometheus::Gauge,
}

impl Metrics {
    pub fn new(registry: &prometheus::Registry) -> Result<Self, prometheus::Error> {
        let pages_fetched = prometheus::IntCounterVec::new(
            prometheus::Opts::new("eden_pages_fetched", "The number of pages loaded from upstream"),
            &["collection"],
        )?;
        registry.register(Box::new(pages_fetched.clone()))?;

        let tokens_fetched = prometheus::GaugeVec::new(
            prometheus::Opts::new(
                "eden_tokens_fetched",
                "The number of tokens in the last successful fetch of a collection",
            ),
            &["collection"],
        )?;
        registry.register(Box::new(tokens_fetched.clone()))?;

        let failures = prometheus::IntCounterVec::new(
            prometheus::Opts::new("eden_fetch_failures", "The number of failed collection fetches"),
            &["reason"],
        )?;
        registry.register(Box::new(failures.clone()))?;

        let last_update =
            prometheus::Gauge::new("last_updated", "The Unix Timestamp of the last update")?;
        registry.register(Box::new(last_update.clone()))?;

        Ok(Self {
            pages_fetched,
            tokens_fetched,
            failures,
            last_update,
        })
    }

    pub fn record_success(&self, symbol: &str, tokens: usize, pages: usize) {
        self.pages_fetched
            .with_label_values(&[symbol])
            .inc_by(pages as u64);
        self.tokens_fetched
            .with_label_values(&[symbol])
            .set(tokens as f64);

        let unix_timestamp = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        self.last_update.set(unix_timestamp.as_secs() as f64);
    }

    /// Counted per reason only, never per symbol.
    pub fn record_failure(&self, reason: &str) {
        self.failures.with_label_values(&[reason]).inc();
    }

    pub fn failures(&self, reason: &str) -> u64 {
        self.failures.with_label_values(&[reason]).get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records() {
        let registry = prometheus::Registry::new();
        let metrics = Metrics::new(&registry).unwrap();

        metrics.record_success("omb", 137, 3);
        metrics.record_failure("not_found");

        assert_eq!(metrics.pages_fetched.with_label_values(&["omb"]).get(), 3);
        assert_eq!(metrics.tokens_fetched.with_label_values(&["omb"]).get(), 137.0);
        assert_eq!(metrics.failures("not_found"), 1);
        assert!(metrics.last_update.get() > 0.0);

        let names: Vec<_> = registry
            .gather()
            .into_iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"eden_pages_fetched".to_string()));
        assert!(names.contains(&"last_updated".to_string()));
    }

    #[test]
    fn double_registration_fails() {
        let registry = prometheus::Registry::new();
        Metrics::new(&registry).unwrap();

        assert!(Metrics::new(&registry).is_err());
    }
}
