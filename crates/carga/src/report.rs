//! Console rendering of a finished run.
//!
//! Two tables (latency and throughput) plus a banner before the run and
//! summary lines after it. Also serializes the report as pretty JSON for
//! machine consumption.

use crate::config::BenchmarkConfig;
use crate::runner::BenchmarkReport;
use console::style;

/// Banner printed before the run starts.
#[must_use]
pub fn render_banner(config: &BenchmarkConfig) -> String {
    let mut out = format!(
        "Running {}s test @ {}\n",
        config.duration_secs, config.url
    );
    if config.pipeline == 1 {
        out.push_str(&format!("{} connections\n", config.concurrency));
    } else {
        out.push_str(&format!(
            "{} connections with {} pipelining factor\n",
            config.concurrency, config.pipeline
        ));
    }
    out
}

/// Render the full post-run report: latency table, throughput table,
/// summary lines.
#[must_use]
pub fn render(report: &BenchmarkReport) -> String {
    let mut out = String::new();

    if let Some(ref latency) = report.latency {
        let header = [
            "STAT", "1%", "10%", "50%", "97%", "99%", "AVG", "MIN", "MAX", "StdDev",
        ];
        let row = vec![
            "Latency".to_string(),
            format_duration_ms(latency.p1_ms),
            format_duration_ms(latency.p10_ms),
            format_duration_ms(latency.p50_ms),
            format_duration_ms(latency.p97_ms),
            format_duration_ms(latency.p99_ms),
            format_duration_ms(latency.avg_ms.round() as u64),
            format_duration_ms(latency.min_ms.round() as u64),
            format_duration_ms(latency.max_ms.round() as u64),
            format_duration_ms(latency.std_dev_ms.round() as u64),
        ];
        out.push_str(&render_table(&header, &[row]));
        out.push('\n');
    }

    let throughput = &report.throughput;
    let header = [
        "STAT", "1%", "10%", "50%", "97%", "99%", "AVG", "MIN", "StdDev",
    ];
    let req_row = vec![
        "Req/Sec".to_string(),
        format_count(throughput.requests[0]),
        format_count(throughput.requests[1]),
        format_count(throughput.requests[2]),
        format_count(throughput.requests[3]),
        format_count(throughput.requests[4]),
        format_count(throughput.requests_avg()),
        format_count(throughput.requests[0]),
        format_count(throughput.requests_std_dev() as u64),
    ];
    let bytes_row = vec![
        "Bytes/Sec".to_string(),
        format_bytes(throughput.sizes[0]),
        format_bytes(throughput.sizes[1]),
        format_bytes(throughput.sizes[2]),
        format_bytes(throughput.sizes[3]),
        format_bytes(throughput.sizes[4]),
        format_bytes(throughput.sizes_avg()),
        format_bytes(throughput.sizes[0]),
        format_bytes(throughput.sizes_std_dev() as u64),
    ];
    out.push_str(&render_table(&header, &[req_row, bytes_row]));
    out.push('\n');

    let counters = &report.counters;
    out.push_str(&format!(
        "{} requests in {:.2}s, {} read\n",
        format_count(counters.total),
        report.elapsed_secs,
        format_bytes(counters.bytes_read)
    ));
    out.push_str(&format!(
        "{} 2xx responses and {} non 2xx responses\n",
        format_count(counters.ok),
        format_count(counters.errors)
    ));
    out.push_str(&format!(
        "{} errors ({} timeouts)\n",
        format_count(counters.errors),
        format_count(counters.timeouts)
    ));

    out
}

/// Serialize the report as pretty JSON.
#[must_use]
pub fn to_json(report: &BenchmarkReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Pad-then-style table rendering; alignment is computed on the plain
/// strings so ANSI codes never skew the columns.
fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut out = String::new();
    let header_line = header
        .iter()
        .enumerate()
        .map(|(i, h)| style(format!("{h:<width$}", width = widths[i])).bold().to_string())
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(&header_line);
    out.push('\n');

    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                style(format!("{cell:<width$}", width = widths[i]))
                    .green()
                    .bold()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// "Nms" below one second, "N.NNs" above.
#[must_use]
pub fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.2}s", ms as f64 / 1000.0)
    }
}

/// "N B" below 1000, "N.N KB" below one million, "N.N MB" above.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_000_000 {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1000 {
        format!("{:.1} KB", bytes as f64 / 1000.0)
    } else {
        format!("{bytes} B")
    }
}

/// Plain count below 1000, "Nk" above.
#[must_use]
pub fn format_count(count: u64) -> String {
    if count < 1000 {
        format!("{count}")
    } else {
        format!("{}k", count / 1000)
    }
}
