//! Metrics snapshot export.
//!
//! Series are folded per metric into a total plus one breakdown per declared
//! label key:
//!
//! ```json
//! {"metrics": {"ws3.packets.rejected": {"kind": "counter", "total": 3,
//!   "labels": {"reason": {"checksum_mismatch": 3}, "station": {"ws3": 3}}}}}
//! ```

use std::collections::BTreeMap;

use metrics_util::debugging::{DebugValue, Snapshot};
use serde::Serialize;
use tracing::{debug, warn};
use ws3_metrics::metric_defs;

/// Per-label-value breakdown, keyed by label key then label value.
pub type Breakdown<T> = BTreeMap<String, BTreeMap<String, T>>;

/// Aggregated value of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MetricSummary {
    /// Sum of every counter series.
    Counter {
        /// Sum over all series.
        total: u64,
        /// Sums per declared label value.
        labels: Breakdown<u64>,
    },
    /// Sum of the last value of every gauge series.
    Gauge {
        /// Sum over all series.
        total: f64,
        /// Sums per declared label value.
        labels: Breakdown<f64>,
    },
}

/// Every declared metric that was emitted during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsExport {
    /// Summaries keyed by metric name.
    pub metrics: BTreeMap<String, MetricSummary>,
}

impl MetricsExport {
    /// Fold a recorder snapshot into per-metric summaries.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut export = MetricsExport::default();

        for (key, _unit, _description, value) in snapshot.into_vec() {
            let key = key.key();
            let Some(def) = metric_defs::find(key.name()) else {
                debug!(metric = key.name(), "skipping undeclared metric");
                continue;
            };

            let mut labels = Vec::new();
            for label in key.labels() {
                if def.has_label(label.key()) {
                    labels.push((label.key().to_string(), label.value().to_string()));
                } else {
                    warn!(metric = def.name, label = label.key(), "undeclared label");
                }
            }

            match value {
                DebugValue::Counter(n) => {
                    let entry = export
                        .metrics
                        .entry(def.name.to_string())
                        .or_insert_with(|| MetricSummary::Counter {
                            total: 0,
                            labels: BTreeMap::new(),
                        });
                    if let MetricSummary::Counter { total, labels: by } = entry {
                        *total += n;
                        for (k, v) in labels {
                            *by.entry(k).or_default().entry(v).or_default() += n;
                        }
                    }
                }
                DebugValue::Gauge(g) => {
                    let g = g.into_inner();
                    let entry = export
                        .metrics
                        .entry(def.name.to_string())
                        .or_insert_with(|| MetricSummary::Gauge {
                            total: 0.0,
                            labels: BTreeMap::new(),
                        });
                    if let MetricSummary::Gauge { total, labels: by } = entry {
                        *total += g;
                        for (k, v) in labels {
                            *by.entry(k).or_default().entry(v).or_default() += g;
                        }
                    }
                }
                DebugValue::Histogram(_) => {
                    debug!(metric = def.name, "histograms are not exported");
                }
            }
        }

        export
    }

    /// Counter total for `name`, if it was emitted.
    pub fn counter(&self, name: &str) -> Option<u64> {
        match self.metrics.get(name)? {
            MetricSummary::Counter { total, .. } => Some(*total),
            MetricSummary::Gauge { .. } => None,
        }
    }

    /// Counter value for one label value, if it was emitted.
    pub fn counter_for(&self, name: &str, label: &str, value: &str) -> Option<u64> {
        match self.metrics.get(name)? {
            MetricSummary::Counter { labels, .. } => labels.get(label)?.get(value).copied(),
            MetricSummary::Gauge { .. } => None,
        }
    }
}
