use crate::cancel::Cancellation;
use crate::device::base::BulkWriter;
use log::{debug, warn};
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub packet_size: usize,
    pub fill_byte: u8,

    /// The run stops once this many packets have gone out.
    pub packet_ceiling: u64,
    pub bulk_timeout: Duration,
    pub sample_interval: Duration,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            packet_size: 100_000,
            fill_byte: 0xaa,
            packet_ceiling: 1_000_000,
            bulk_timeout: Duration::from_millis(10_000),
            sample_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    Draining,
    Stopped,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    CeilingReached,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ThroughputStats {
    packets_sent: u64,
    bytes_sent: u64,
    bytes_at_last_sample: u64,
}

impl ThroughputStats {
    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    fn record_packet(&mut self, length: usize) {
        self.packets_sent += 1;
        self.bytes_sent += length as u64;
    }

    fn take_since_last_sample(&mut self) -> u64 {
        let bytes = self.bytes_sent - self.bytes_at_last_sample;
        self.bytes_at_last_sample = self.bytes_sent;
        bytes
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThroughputSample {
    pub packets_sent: u64,
    pub bytes_sent: u64,
    pub interval: Duration,
    pub bytes_per_second: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThroughputSummary {
    pub packets_sent: u64,
    pub bytes_sent: u64,
    pub elapsed: Duration,
    pub average_bytes_per_second: f64,

    /// The most recent sample, if the run lasted long enough to take one.
    pub last_sample_bytes_per_second: Option<f64>,
    pub stop_reason: StopReason,
}

pub struct ThroughputRunner {
    config: BenchmarkConfig,
    payload: Vec<u8>,
    stats: ThroughputStats,
    state: RunnerState,
}

impl ThroughputRunner {
    pub fn new(config: BenchmarkConfig) -> Self {
        let payload = vec![config.fill_byte; config.packet_size];
        Self {
            config,
            payload,
            stats: ThroughputStats::default(),
            state: RunnerState::Idle,
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn stats(&self) -> ThroughputStats {
        self.stats
    }

    /// Streams the payload until `cancellation` fires or the packet ceiling is hit. The flag is
    /// only checked between transfers, so stopping can take up to one bulk timeout. Every call
    /// is a fresh benchmark, counting from zero.
    pub fn run<W, F>(
        &mut self,
        writer: &mut W,
        cancellation: &Cancellation,
        mut on_sample: F,
    ) -> ThroughputSummary
    where
        W: BulkWriter + ?Sized,
        F: FnMut(&ThroughputSample),
    {
        self.stats = ThroughputStats::default();
        self.state = RunnerState::Running;

        let start = Instant::now();
        let mut last_sample = start;
        let mut last_rate = None;

        let stop_reason = loop {
            if cancellation.is_triggered() {
                break StopReason::Cancelled;
            }
            if self.stats.packets_sent >= self.config.packet_ceiling {
                break StopReason::CeilingReached;
            }

            // Only complete transfers count, anything else is dropped.
            match writer.write_bulk(&self.payload, self.config.bulk_timeout) {
                Ok(length) if length == self.payload.len() => self.stats.record_packet(length),
                Ok(length) => warn!(
                    "Short bulk transfer, {} of {} bytes",
                    length,
                    self.payload.len()
                ),
                Err(error) => warn!("Bulk transfer failed: {}", error),
            }

            let now = Instant::now();
            let interval = now.duration_since(last_sample);
            if interval >= self.config.sample_interval && !interval.is_zero() {
                let bytes = self.stats.take_since_last_sample();
                let sample = ThroughputSample {
                    packets_sent: self.stats.packets_sent,
                    bytes_sent: self.stats.bytes_sent,
                    interval,
                    bytes_per_second: bytes as f64 / interval.as_secs_f64(),
                };
                last_rate = Some(sample.bytes_per_second);
                on_sample(&sample);
                last_sample = now;
            }
        };

        self.state = RunnerState::Draining;
        debug!("Benchmark stopping: {:?}", stop_reason);

        let elapsed = start.elapsed();
        let seconds = elapsed.as_secs_f64();
        let average_bytes_per_second = if seconds > 0.0 {
            self.stats.bytes_sent as f64 / seconds
        } else {
            0.0
        };

        let summary = ThroughputSummary {
            packets_sent: self.stats.packets_sent,
            bytes_sent: self.stats.bytes_sent,
            elapsed,
            average_bytes_per_second,
            last_sample_bytes_per_second: last_rate,
            stop_reason,
        };

        self.state = RunnerState::Stopped;
        summary
    }
}
