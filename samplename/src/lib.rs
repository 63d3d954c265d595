//! Sample metadata encoded in sequencing file names.
//!
//! File names are split on `_` and fields are picked by position. Which
//! positions hold which field depends on the naming [`Schema`]; raw
//! sequencer output is assigned a schema by [`classify`].

pub mod error;
pub mod metadata;
pub mod schema;

pub use error::SampleNameError;
pub use metadata::{ReadGroup, SampleMetadata};
pub use schema::{
    classify, Field, Schema, SchemaKind, ALIGNED, DEFAULT, LIS, PREFIX, RENAMED, SHIFTED,
};

use std::path::Path;

/// Return the last component of `path`.
pub fn file_name_of(path: &str) -> Result<&str, SampleNameError> {
    Path::new(path)
        .file_name()
        .and_then(|x| x.to_str())
        .ok_or_else(|| SampleNameError::NoFileName(path.to_string()))
}

/// Classify a raw sequencer file name and extract its fields.
///
/// `filename` should be a base name. Directory components take part in
/// the marker checks otherwise.
pub fn parse_raw(filename: &str) -> Result<SampleMetadata, SampleNameError> {
    classify(filename).extract(filename)
}
