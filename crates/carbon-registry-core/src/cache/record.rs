use serde::{Deserialize, Serialize};

/// Latest known observation for one metric name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Last reporter.
    pub source: String,
    /// Receive time of the last update, human-readable.
    pub date: String,
    pub value: f64,
    /// Collection time reported on the line, epoch seconds.
    pub timestamp: u64,
    /// Key; never changes once the record exists.
    pub metric: String,
    /// Observations merged since the last purge. Starts at 1.
    pub count: u64,
}

impl MetricRecord {
    pub(crate) fn first(
        metric: &str,
        source: &str,
        date: &str,
        value: f64,
        timestamp: u64,
    ) -> Self {
        Self {
            source: source.to_string(),
            date: date.to_string(),
            value,
            timestamp,
            metric: metric.to_string(),
            count: 1,
        }
    }

    /// Overwrite with a newer observation of the same metric.
    pub(crate) fn observe(&mut self, source: &str, date: &str, value: f64, timestamp: u64) {
        self.source.clear();
        self.source.push_str(source);
        self.date.clear();
        self.date.push_str(date);
        self.value = value;
        self.timestamp = timestamp;
        self.count = self.count.saturating_add(1);
    }
}
