use ch34x_usb::throughput::{StopReason, ThroughputSample, ThroughputSummary};

const KB: f64 = 1024.0;
const MB: f64 = 1024.0 * 1024.0;
const GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn progress_line(sample: &ThroughputSample) -> String {
    format!(
        "Packets: {}, Sent: {:.2} MB, Speed: {:.6} KB/s",
        sample.packets_sent,
        sample.bytes_sent as f64 / MB,
        sample.bytes_per_second / KB
    )
}

pub fn summary_lines(summary: &ThroughputSummary, packet_ceiling: u64) -> Vec<String> {
    let mut lines = vec![
        String::from("=== Summary ==="),
        format!("Packets sent: {}", summary.packets_sent),
        format!("Data sent: {:.4} GB", summary.bytes_sent as f64 / GB),
        format!("Elapsed: {:.2} seconds", summary.elapsed.as_secs_f64()),
        format!(
            "Average speed: {:.2} MB/s",
            summary.average_bytes_per_second / MB
        ),
    ];

    if let Some(rate) = summary.last_sample_bytes_per_second {
        lines.push(format!("Last sample speed: {:.2} MB/s", rate / MB));
    }

    match summary.stop_reason {
        StopReason::CeilingReached => lines.push(format!(
            "Packet limit of {} reached, stopping.",
            packet_ceiling
        )),
        StopReason::Cancelled => lines.push(String::from("Stopped by user.")),
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn progress() {
        let sample = ThroughputSample {
            packets_sent: 21,
            bytes_sent: 2_100_000,
            interval: Duration::from_secs(1),
            bytes_per_second: 102_400.0,
        };
        assert_eq!(
            progress_line(&sample),
            "Packets: 21, Sent: 2.00 MB, Speed: 100.000000 KB/s"
        );
    }

    #[test]
    fn summary_after_ceiling() {
        let summary = ThroughputSummary {
            packets_sent: 10,
            bytes_sent: 10 * 1024 * 1024,
            elapsed: Duration::from_secs(2),
            average_bytes_per_second: 5.0 * MB,
            last_sample_bytes_per_second: Some(4.0 * MB),
            stop_reason: StopReason::CeilingReached,
        };
        let lines = summary_lines(&summary, 10);
        assert!(lines.contains(&String::from("Average speed: 5.00 MB/s")));
        assert!(lines.contains(&String::from("Last sample speed: 4.00 MB/s")));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Packet limit of 10 reached, stopping.")
        );
    }

    #[test]
    fn summary_without_samples() {
        let summary = ThroughputSummary {
            packets_sent: 0,
            bytes_sent: 0,
            elapsed: Duration::ZERO,
            average_bytes_per_second: 0.0,
            last_sample_bytes_per_second: None,
            stop_reason: StopReason::Cancelled,
        };
        let lines = summary_lines(&summary, 1_000_000);
        assert!(!lines.iter().any(|line| line.starts_with("Last sample")));
        assert!(lines.contains(&String::from("Elapsed: 0.00 seconds")));
        assert_eq!(lines.last().map(String::as_str), Some("Stopped by user."));
    }
}
