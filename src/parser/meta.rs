//! Whole-dive metadata queries

use crate::decoder::{Descriptor, DiveParser};
use crate::types::DiveMetadata;

/// Query the header fields of a dive
///
/// Each field is optional; a parser that cannot answer a query simply leaves
/// the field unset. Only the first tank is reported.
pub fn collect_metadata(
    parser: &dyn DiveParser,
    descriptor: &Descriptor,
    source_file: &str,
) -> DiveMetadata {
    DiveMetadata {
        source_file: source_file.to_string(),
        datetime: parser.datetime(),
        duration: parser.dive_time(),
        model: descriptor.product.clone(),
        serial: parser.serial(),
        cylinder: parser.tank(0),
    }
}
