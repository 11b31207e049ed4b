use crate::decoder::{DeviceContext, DeviceSelection};
use crate::error::DiveError;
use crate::parser::meta::collect_metadata;
use crate::parser::reconstruct::SampleReconstructor;
use crate::parser::store::StoreLimits;
use crate::types::DiveLog;
use crate::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Load a dive log file fully into memory
///
/// Opening, sizing the buffer and reading are reported as distinct failures.
pub fn load_dive_file(file_path: &Path) -> Result<Vec<u8>> {
    let path = file_path.display().to_string();
    let mut file = File::open(file_path).map_err(|source| DiveError::FileOpen {
        path: path.clone(),
        source,
    })?;

    let size = file
        .metadata()
        .map_err(|source| DiveError::Read {
            path: path.clone(),
            source,
        })?
        .len();
    let size = usize::try_from(size).map_err(|_| DiveError::Allocation {
        store: "input buffer",
        reason: format!("{size} bytes do not fit in memory"),
    })?;

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(size)
        .map_err(|e| DiveError::Allocation {
            store: "input buffer",
            reason: e.to_string(),
        })?;

    file.read_to_end(&mut buffer)
        .map_err(|source| DiveError::Read { path, source })?;

    debug!(
        "loaded {} bytes ({:.2} MB) from {}",
        buffer.len(),
        buffer.len() as f64 / 1024.0 / 1024.0,
        file_path.display()
    );
    Ok(buffer)
}

/// Parse a dive log file with the given decoding backend
pub fn parse_dive_file(
    file_path: &Path,
    context: &dyn DeviceContext,
    selection: &DeviceSelection,
    limits: &StoreLimits,
) -> Result<DiveLog> {
    let data = load_dive_file(file_path)?;
    let source_file = file_path.display().to_string();
    parse_dive_bytes(&data, &source_file, context, selection, limits)
}

/// Parse an in-memory dive log
///
/// Metadata is queried first, then the value stream is replayed through a
/// [`SampleReconstructor`]. Any failure aborts the whole parse; no partially
/// built log is ever returned.
pub fn parse_dive_bytes(
    data: &[u8],
    source_file: &str,
    context: &dyn DeviceContext,
    selection: &DeviceSelection,
    limits: &StoreLimits,
) -> Result<DiveLog> {
    let descriptor = context
        .find_descriptor(&selection.vendor, &selection.product)
        .ok_or_else(|| DiveError::DescriptorNotFound {
            vendor: selection.vendor.clone(),
            product: selection.product.clone(),
        })?;
    debug!(
        "using descriptor {} {} (model {})",
        descriptor.vendor, descriptor.product, descriptor.model
    );

    let mut parser = context.open_parser(descriptor, data)?;
    let meta = collect_metadata(parser.as_ref(), descriptor, source_file);

    let mut reconstructor = SampleReconstructor::new(limits);
    parser.samples_foreach(&mut |value| reconstructor.ingest(value))?;
    let (samples, events, stats) = reconstructor.finish();

    info!(
        "reconstructed {} samples and {} events from {} values ({} dropped, {} ignored)",
        samples.len(),
        events.len(),
        stats.total_values,
        stats.dropped_values,
        stats.ignored_values
    );

    Ok(DiveLog {
        meta,
        samples,
        events,
        stats,
    })
}
