//! Export functionality for reconstructed dives
//!
//! Renders a [`DiveLog`] as the JSON dive document, and optionally as CSV
//! samples and a Subsurface (`.ssrf`) dive log.
//!
//! The JSON document renders absent *metadata* fields as `null` so the `meta`
//! block always has the same keys, while absent *sample* fields (temperature,
//! ppo2) are left out of the sample record entirely.

use crate::conversion::*;
use crate::types::*;
use crate::{DiveError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Export options for side-channel output files
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub csv: bool,
    pub ssrf: bool,
    pub output_dir: Option<String>,
}

/// Paths of the files written by [`export_all`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub csv_path: Option<PathBuf>,
    pub ssrf_path: Option<PathBuf>,
}

/// Write the dive document: metadata, then samples, then events
pub fn write_document<W: Write>(log: &DiveLog, out: &mut W) -> Result<()> {
    writeln!(out, "{{")?;
    write_meta(&log.meta, out)?;
    writeln!(out, ",")?;
    write_samples(&log.samples, out)?;
    writeln!(out, ",")?;
    write_events(&log.events, out)?;
    writeln!(out)?;
    writeln!(out, "}}")?;
    Ok(())
}

fn write_json_str<W: Write>(out: &mut W, value: &str) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value).map_err(io::Error::from)
}

fn write_opt_str<W: Write>(out: &mut W, value: Option<&str>) -> io::Result<()> {
    match value {
        Some(value) => write_json_str(out, value),
        None => write!(out, "null"),
    }
}

fn number_or_null(value: Option<String>) -> String {
    value.unwrap_or_else(|| "null".to_string())
}

fn write_meta<W: Write>(meta: &DiveMetadata, out: &mut W) -> io::Result<()> {
    writeln!(out, "  \"meta\": {{")?;

    write!(out, "    \"source_file\": ")?;
    write_json_str(out, &meta.source_file)?;
    writeln!(out, ",")?;

    let date = meta.datetime.as_ref().map(format_date);
    let time = meta.datetime.as_ref().map(format_time_of_day);
    let duration = meta.duration.map(format_duration);

    write!(out, "    \"date\": ")?;
    write_opt_str(out, date.as_deref())?;
    writeln!(out, ",")?;
    write!(out, "    \"time\": ")?;
    write_opt_str(out, time.as_deref())?;
    writeln!(out, ",")?;
    write!(out, "    \"duration\": ")?;
    write_opt_str(out, duration.as_deref())?;
    writeln!(out, ",")?;

    writeln!(out, "    \"otu\": null,")?;
    writeln!(out, "    \"cns\": null,")?;

    write!(out, "    \"divecomputer\": {{ \"model\": ")?;
    write_json_str(out, &meta.model)?;
    write!(out, ", \"serial\": ")?;
    write_opt_str(out, meta.serial.as_deref())?;
    writeln!(out, " }},")?;

    let (size, pressure) = match &meta.cylinder {
        Some(tank) => (
            format_fixed(tank.volume, 1),
            format_fixed(tank.workpressure, 1),
        ),
        None => (None, None),
    };
    writeln!(
        out,
        "    \"cylinder\": {{ \"size_l\": {}, \"work_pressure_bar\": {} }}",
        number_or_null(size),
        number_or_null(pressure)
    )?;

    write!(out, "  }}")
}

fn write_samples<W: Write>(samples: &[Sample], out: &mut W) -> io::Result<()> {
    if samples.is_empty() {
        return write!(out, "  \"samples\": []");
    }

    writeln!(out, "  \"samples\": [")?;
    for (index, sample) in samples.iter().enumerate() {
        write!(
            out,
            "    {{ \"index\": {}, \"time\": \"{}\", \"depth\": {}",
            index,
            format_clock(sample.time),
            number_or_null(format_depth(sample.depth))
        )?;
        if let Some(temperature) = sample.temperature {
            write!(
                out,
                ", \"temperature\": {}",
                number_or_null(format_temperature(temperature))
            )?;
        }
        if let Some(ppo2) = sample.ppo2 {
            write!(out, ", \"ppo2\": {}", number_or_null(format_ppo2(ppo2)))?;
        }
        write!(out, ", \"event\": null }}")?;
        if index + 1 < samples.len() {
            writeln!(out, ",")?;
        } else {
            writeln!(out)?;
        }
    }
    write!(out, "  ]")
}

fn write_events<W: Write>(events: &[Event], out: &mut W) -> io::Result<()> {
    if events.is_empty() {
        return write!(out, "  \"events\": []");
    }

    writeln!(out, "  \"events\": [")?;
    for (index, event) in events.iter().enumerate() {
        write!(out, "    {{ \"time\": \"{}\", \"type\": ", format_clock(event.time))?;
        write_json_str(out, &event.event_type)?;
        write!(out, ", \"note\": ")?;
        write_opt_str(out, event.name.as_deref())?;
        write!(out, " }}")?;
        if index + 1 < events.len() {
            writeln!(out, ",")?;
        } else {
            writeln!(out)?;
        }
    }
    write!(out, "  ]")
}

/// Compute the output path for an export next to the input (or in `output_dir`)
///
/// Creates the output directory when it does not exist yet.
pub fn compute_export_path(
    input_path: &Path,
    extension: &str,
    export_options: &ExportOptions,
) -> Result<PathBuf> {
    let base_name = input_path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("dive");

    let output_dir = match &export_options.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => match input_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    };
    fs::create_dir_all(&output_dir).map_err(|source| DiveError::Export {
        path: output_dir.display().to_string(),
        source,
    })?;

    Ok(output_dir.join(format!("{base_name}.{extension}")))
}

/// Run every export enabled in `export_options`
///
/// All exports are rendered in memory before the first file is created. If
/// any file cannot be written, the files already written by this call are
/// removed again.
pub fn export_all(
    log: &DiveLog,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<ExportReport> {
    let mut report = ExportReport::default();
    if !export_options.csv && !export_options.ssrf {
        return Ok(report);
    }
    if log.samples.is_empty() {
        warn!("no samples found in the dive data, skipping exports");
        return Ok(report);
    }

    let mut pending = Vec::new();
    if export_options.csv {
        if let Some(body) = csv_body(log)? {
            let path = compute_export_path(input_path, "csv", export_options)?;
            report.csv_path = Some(path.clone());
            pending.push((path, body));
        }
    }
    if export_options.ssrf {
        let path = compute_export_path(input_path, "ssrf", export_options)?;
        report.ssrf_path = Some(path.clone());
        pending.push((path, render_ssrf(log)?));
    }

    write_exports(&pending)?;
    Ok(report)
}

/// Write rendered exports, removing earlier ones if a later write fails
fn write_exports(pending: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    for (index, (path, body)) in pending.iter().enumerate() {
        if let Err(source) = fs::write(path, body) {
            for (written, _) in &pending[..index] {
                if let Err(e) = fs::remove_file(written) {
                    warn!("could not remove {}: {e}", written.display());
                }
            }
            return Err(DiveError::Export {
                path: path.display().to_string(),
                source,
            });
        }
        debug!("wrote {} bytes to {}", body.len(), path.display());
    }
    Ok(())
}

#[cfg(feature = "csv")]
fn csv_body(log: &DiveLog) -> Result<Option<Vec<u8>>> {
    render_csv(log).map(Some)
}

#[cfg(not(feature = "csv"))]
fn csv_body(_log: &DiveLog) -> Result<Option<Vec<u8>>> {
    warn!("CSV export requested but the csv feature is disabled");
    Ok(None)
}

/// Render samples as CSV (`index,time,depth,temperature,ppo2,event`)
///
/// Absent values are written as empty cells.
#[cfg(feature = "csv")]
pub fn render_csv(log: &DiveLog) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(["index", "time", "depth", "temperature", "ppo2", "event"])?;
    for (index, sample) in log.samples.iter().enumerate() {
        writer.write_record([
            index.to_string(),
            format_clock(sample.time),
            format_depth(sample.depth).unwrap_or_default(),
            sample
                .temperature
                .and_then(format_temperature)
                .unwrap_or_default(),
            sample.ppo2.and_then(format_ppo2).unwrap_or_default(),
            String::new(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| DiveError::Output(e.into_error()))
}

/// Export samples to a CSV file next to the input (or in `output_dir`)
#[cfg(feature = "csv")]
pub fn export_to_csv(
    log: &DiveLog,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<PathBuf> {
    let body = render_csv(log)?;
    let csv_path = compute_export_path(input_path, "csv", export_options)?;
    write_exports(&[(csv_path.clone(), body)])?;

    info!("exported {} samples to {}", log.samples.len(), csv_path.display());
    Ok(csv_path)
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the dive as a Subsurface XML dive log
pub fn render_ssrf(log: &DiveLog) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    write_ssrf(log, &mut body)?;
    Ok(body)
}

/// Export the dive as a Subsurface XML dive log file
pub fn export_to_ssrf(
    log: &DiveLog,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<PathBuf> {
    let body = render_ssrf(log)?;
    let ssrf_path = compute_export_path(input_path, "ssrf", export_options)?;
    write_exports(&[(ssrf_path.clone(), body)])?;

    info!("exported dive to {}", ssrf_path.display());
    Ok(ssrf_path)
}

/// Write a Subsurface XML dive log for one dive
pub fn write_ssrf<W: Write>(log: &DiveLog, out: &mut W) -> Result<()> {
    let meta = &log.meta;
    let model = xml_escape(&meta.model);

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<divelog program="dlf_parser" version="3">"#)?;
    writeln!(out, "  <settings>")?;
    writeln!(out, r#"    <divecomputerid model="{model}"/>"#)?;
    writeln!(out, "  </settings>")?;
    writeln!(out, "  <dives>")?;

    write!(out, r#"    <dive number="1""#)?;
    if let Some(datetime) = &meta.datetime {
        write!(
            out,
            r#" date="{}" time="{}""#,
            format_date(datetime),
            format_time_of_day(datetime)
        )?;
    }
    if let Some(duration) = meta.duration {
        write!(out, r#" duration="{}""#, format_duration(duration))?;
    }
    writeln!(out, ">")?;

    if let Some(tank) = &meta.cylinder {
        if let (Some(size), Some(pressure)) =
            (format_fixed(tank.volume, 1), format_fixed(tank.workpressure, 1))
        {
            writeln!(
                out,
                r#"      <cylinder size="{size} l" workpressure="{pressure} bar"/>"#
            )?;
        }
    }

    write!(out, r#"      <divecomputer model="{model}""#)?;
    if let Some(serial) = &meta.serial {
        write!(out, r#" serial="{}""#, xml_escape(serial))?;
    }
    writeln!(out, ">")?;

    for event in &log.events {
        write!(
            out,
            r#"        <event time="{} min" type="{}""#,
            format_clock(event.time),
            xml_escape(&event.event_type)
        )?;
        if let Some(name) = &event.name {
            write!(out, r#" name="{}""#, xml_escape(name))?;
        }
        writeln!(out, "/>")?;
    }

    for sample in &log.samples {
        write!(out, r#"        <sample time="{} min""#, format_clock(sample.time))?;
        if let Some(depth) = format_depth(sample.depth) {
            write!(out, r#" depth="{depth} m""#)?;
        }
        if let Some(temperature) = sample.temperature.and_then(format_temperature) {
            write!(out, r#" temp="{temperature} C""#)?;
        }
        if let Some(ppo2) = sample.ppo2.and_then(format_ppo2) {
            write!(out, r#" po2="{ppo2} bar""#)?;
        }
        writeln!(out, "/>")?;
    }

    writeln!(out, "      </divecomputer>")?;
    writeln!(out, "    </dive>")?;
    writeln!(out, "  </dives>")?;
    writeln!(out, "</divelog>")?;
    Ok(())
}
