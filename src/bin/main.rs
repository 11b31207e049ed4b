//! CLI binary for DLF Parser
//!
//! Decodes one dive log and writes the reconstructed dive as JSON to stdout.
//! Diagnostics go to stderr; the exit code identifies the failure class.

use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};
use dlf_parser::{
    export_all, format_clock, load_dive_file, parse_dive_bytes, write_document, DeviceContext,
    DeviceSelection, DiveError, DiveLog, ExportOptions, ReplayContext, StoreLimits,
    DEFAULT_PRODUCT, DEFAULT_VENDOR,
};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    " ",
    env!("VERGEN_GIT_COMMIT_DATE"),
    ")"
);

fn build_command() -> Command {
    Command::new("DLF Parser")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(LONG_VERSION)
        .about("Rebuild dive samples and events from a decoded dive log and print them as JSON.")
        .arg(
            Arg::new("file")
                .help("Dive log to decode")
                .required(false)
                .index(1),
        )
        .arg(
            Arg::new("vendor")
                .long("vendor")
                .help("Device vendor used to pick the decoder descriptor")
                .value_name("VENDOR")
                .default_value(DEFAULT_VENDOR),
        )
        .arg(
            Arg::new("product")
                .long("product")
                .help("Device product used to pick the decoder descriptor")
                .value_name("PRODUCT")
                .default_value(DEFAULT_PRODUCT),
        )
        .arg(
            Arg::new("max-samples")
                .long("max-samples")
                .help("Fail with an allocation error when the dive holds more samples than this")
                .value_name("COUNT")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("max-events")
                .long("max-events")
                .help("Fail with an allocation error when the dive holds more events than this")
                .value_name("COUNT")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Also export samples to <name>.csv")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ssrf")
                .long("ssrf")
                .help("Also export the dive to a Subsurface <name>.ssrf file")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for CSV/SSRF files (default: same as input file)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("list-devices")
                .long("list-devices")
                .help("List supported devices and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output on stderr")
                .action(clap::ArgAction::SetTrue),
        )
}

fn init_tracing(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("cannot install logger: {e}"))
}

fn main() {
    let matches = match build_command().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(&matches) {
        eprintln!("PARSER_ERR: {e}");
        let code = e.downcast_ref::<DiveError>().map_or(1, DiveError::exit_code);
        std::process::exit(code);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    init_tracing(matches.get_flag("debug"))?;

    if matches.get_flag("list-devices") {
        let context = ReplayContext::with_builtin_devices()?;
        let mut stdout = std::io::stdout().lock();
        for descriptor in context.descriptors() {
            writeln!(stdout, "{} {}", descriptor.vendor, descriptor.product)
                .map_err(DiveError::Output)?;
        }
        return Ok(());
    }

    let Some(file) = matches.get_one::<String>("file") else {
        eprint!("{}", build_command().render_help());
        return Err(DiveError::Usage("no dive log file given".to_string()).into());
    };
    let path = Path::new(file);

    let selection = DeviceSelection {
        vendor: matches
            .get_one::<String>("vendor")
            .cloned()
            .unwrap_or_else(|| DEFAULT_VENDOR.to_string()),
        product: matches
            .get_one::<String>("product")
            .cloned()
            .unwrap_or_else(|| DEFAULT_PRODUCT.to_string()),
    };
    let limits = StoreLimits {
        max_samples: matches.get_one::<usize>("max-samples").copied(),
        max_events: matches.get_one::<usize>("max-events").copied(),
    };
    let export_options = ExportOptions {
        csv: matches.get_flag("csv"),
        ssrf: matches.get_flag("ssrf"),
        output_dir: matches.get_one::<String>("output-dir").cloned(),
    };

    let data = load_dive_file(path)?;
    let context = ReplayContext::with_builtin_devices()?;
    let log = parse_dive_bytes(&data, file, &context, &selection, &limits)?;
    drop(data);

    info!(
        "dive spans {} with max depth {:.2} m{}",
        format_clock(log.sample_span_seconds()),
        log.max_depth(),
        if log.has_events() { "" } else { ", no events" }
    );

    let report = export_all(&log, path, &export_options)?;
    for written in [&report.csv_path, &report.ssrf_path].into_iter().flatten() {
        info!("wrote {}", written.display());
    }

    write_stdout_document(&log)?;

    debug!(
        "sample store grew {} times, event store {} times",
        log.stats.sample_growths, log.stats.event_growths
    );
    Ok(())
}

fn write_stdout_document(log: &DiveLog) -> Result<(), DiveError> {
    let mut out = BufWriter::new(std::io::stdout().lock());
    write_document(log, &mut out)?;
    out.flush()?;
    Ok(())
}
