//! Output formatting and logging utilities

use color_eyre::eyre::{Result, WrapErr};
use mc::sweep::TemperatureSummary;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = StdSystemTime::now();
        let duration = now
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        // Format as HH:MM:SS (only seconds precision)
        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Setup output logging to file or stdout
pub fn setup_output(output_path: Option<&String>) {
    match output_path {
        Some(path) => {
            if let Ok(log) = File::create(path) {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false);
                Registry::default().with(file_layer).init();
                info!("Output will be written to: {}", path);
            } else {
                eprintln!("Could not create output file: {}", path);
            }
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
            info!("Output will be printed to stdout");
        }
    }
}

/// Print the per-temperature sweep summary as a table
pub fn print_sweep_summary<W: Write>(writer: &mut W, summaries: &[TemperatureSummary]) -> Result<()> {
    writeln!(
        writer,
        "{:>10} {:>10} {:>10} {:>10} {:>7} {:>7}",
        "kT", "<m>", "<|m|>", "std(m)", "done", "failed"
    )?;
    for summary in summaries {
        writeln!(
            writer,
            "{:>10.4} {:>10} {:>10} {:>10} {:>7} {:>7}",
            summary.temperature,
            format_optional(summary.mean_magnetization),
            format_optional(summary.mean_abs_magnetization),
            format_optional(summary.std_magnetization),
            summary.completed,
            summary.failed
        )?;
    }
    Ok(())
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
}

/// Serialize `data` as pretty JSON into `path`
pub fn write_json<T: Serialize>(path: &str, data: &T) -> Result<()> {
    let file = File::create(path).wrap_err_with(|| format!("Unable to create data file: {}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .wrap_err_with(|| format!("Unable to write data file: {}", path))?;
    writer.flush()?;
    info!("Results written to: {}", path);
    Ok(())
}
