// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

/// How the aggregator should treat a submitted value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    /// A cumulative value the aggregator turns into a per-second rate.
    Rate,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Rate => "rate",
        }
    }
}

/// Destination of the metrics produced by a check run.
pub trait MetricSink {
    fn submit_metric(&mut self, kind: MetricKind, name: &str, value: f64, tags: &[String]);

    /// Send Gauge metric
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        self.submit_metric(MetricKind::Gauge, name, value, tags);
    }

    /// Send Rate metric
    fn rate(&mut self, name: &str, value: f64, tags: &[String]) {
        self.submit_metric(MetricKind::Rate, name, value, tags);
    }

    /// Called once after a successful run.
    fn commit(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub kind: MetricKind,
    pub name: String,
    pub value: f64,
    pub tags: Vec<String>,
}

/// Keeps submissions in memory until they are drained.
#[derive(Debug, Default)]
pub struct Buffer {
    pub metrics: Vec<Submission>,
    pub commits: usize,
}

impl Buffer {
    /// First submission named `name`.
    pub fn get(&self, name: &str) -> Option<&Submission> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn drain(&mut self) -> Vec<Submission> {
        std::mem::take(&mut self.metrics)
    }
}

impl MetricSink for Buffer {
    fn submit_metric(&mut self, kind: MetricKind, name: &str, value: f64, tags: &[String]) {
        self.metrics.push(Submission {
            kind,
            name: name.to_string(),
            value,
            tags: tags.to_vec(),
        });
    }

    fn commit(&mut self) {
        self.commits += 1;
    }
}

impl std::fmt::Display for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} [{}]",
            self.name,
            self.kind.as_str(),
            self.value,
            self.tags.join(",")
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_records_and_drains() {
        let mut sink = Buffer::default();
        let tags = vec!["device:sda".to_string()];
        sink.gauge("system.io.util", 12.5, &tags);
        sink.rate("system.io.r_s", 1100.0, &tags);
        sink.commit();

        assert_eq!(sink.commits, 1);
        assert_eq!(sink.get("system.io.r_s").unwrap().kind, MetricKind::Rate);
        assert_eq!(
            sink.get("system.io.util").unwrap().to_string(),
            "system.io.util gauge 12.5 [device:sda]"
        );

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert!(sink.metrics.is_empty());
    }
}
