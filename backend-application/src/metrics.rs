use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    log_appends: AtomicU64,
    log_append_errors: AtomicU64,
    live_deliveries: AtomicU64,
    dropped_observers: AtomicU64,
    report_ops: AtomicU64,
    report_errors: AtomicU64,
}

impl Metrics {
    pub fn record_log_append(&self, delivered: usize, dropped: usize) {
        self.log_appends.fetch_add(1, Ordering::Relaxed);
        self.live_deliveries
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.dropped_observers
            .fetch_add(dropped as u64, Ordering::Relaxed);
    }

    pub fn record_log_append_error(&self) {
        self.log_append_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report(&self) {
        self.report_ops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_error(&self) {
        self.report_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self, active_observers: usize) -> String {
        let appends = self.log_appends.load(Ordering::Relaxed);
        let append_errors = self.log_append_errors.load(Ordering::Relaxed);
        let deliveries = self.live_deliveries.load(Ordering::Relaxed);
        let dropped = self.dropped_observers.load(Ordering::Relaxed);
        let reports = self.report_ops.load(Ordering::Relaxed);
        let report_errors = self.report_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE empire_log_appends_total counter\n\
empire_log_appends_total {}\n\
# TYPE empire_log_append_errors_total counter\n\
empire_log_append_errors_total {}\n\
# TYPE empire_live_deliveries_total counter\n\
empire_live_deliveries_total {}\n\
# TYPE empire_dropped_observers_total counter\n\
empire_dropped_observers_total {}\n\
# TYPE empire_report_ops_total counter\n\
empire_report_ops_total {}\n\
# TYPE empire_report_errors_total counter\n\
empire_report_errors_total {}\n\
# TYPE empire_live_observers gauge\n\
empire_live_observers {}\n",
            appends, append_errors, deliveries, dropped, reports, report_errors, active_observers
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prometheus_text_reflects_counters() {
        let metrics = Metrics::default();
        metrics.record_log_append(3, 1);
        metrics.record_log_append(2, 0);
        metrics.record_report();
        metrics.record_report_error();
        let text = metrics.render_prometheus(4);
        assert!(text.contains("empire_log_appends_total 2\n"));
        assert!(text.contains("empire_live_deliveries_total 5\n"));
        assert!(text.contains("empire_dropped_observers_total 1\n"));
        assert!(text.contains("empire_report_errors_total 1\n"));
        assert!(text.contains("empire_live_observers 4\n"));
    }
}
