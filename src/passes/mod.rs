//! Post-parse passes.
//!
//! A fixed pipeline run by the reader after the document tree is built:
//! data-URI resolution, image decoding, the two mesh-decompression passes,
//! then RTC recentering. Each pass is a standalone operation so callers can
//! parse without running them. Passes never escalate to fatal errors.

mod data_uri;
mod draco;
mod images;
mod meshopt;
mod rtc;

pub use data_uri::resolve_data_uris;
pub use draco::decode_draco;
pub use images::decode_images;
pub use meshopt::decode_meshopt;
pub use rtc::apply_rtc_center;

use crate::codec::DecodedAttribute;
use crate::model::{Accessor, Buffer, BufferView, Model};

/// Why a buffer view's bytes could not be produced.
pub(crate) enum ViewError {
    /// An index points outside its collection or slice bounds.
    OutOfRange(String),
    /// The backing buffer still carries an unresolved external URI.
    Unresolved(String),
}

impl ViewError {
    pub(crate) fn into_message(self) -> String {
        match self {
            Self::OutOfRange(m) | Self::Unresolved(m) => m,
        }
    }
}

/// Resolve a buffer view index to its byte slice.
pub(crate) fn buffer_view_bytes(model: &Model, index: i32) -> Result<&[u8], ViewError> {
    let view = usize::try_from(index)
        .ok()
        .and_then(|i| model.buffer_views.get(i))
        .ok_or_else(|| ViewError::OutOfRange(format!("bufferView {index} is out of range")))?;
    let buffer_index = view.buffer;
    let buffer = usize::try_from(buffer_index)
        .ok()
        .and_then(|i| model.buffers.get(i))
        .ok_or_else(|| ViewError::OutOfRange(format!("buffer {buffer_index} is out of range")))?;
    if buffer.data.is_empty() && buffer.uri.is_some() {
        return Err(ViewError::Unresolved(format!(
            "buffer {buffer_index} is an unresolved external reference"
        )));
    }
    let start = usize::try_from(view.byte_offset)
        .map_err(|_| ViewError::OutOfRange(format!("bufferView {index} has a negative offset")))?;
    let length = usize::try_from(view.byte_length)
        .map_err(|_| ViewError::OutOfRange(format!("bufferView {index} has a negative length")))?;
    let end = start.checked_add(length).ok_or_else(|| {
        ViewError::OutOfRange(format!("bufferView {index} overflows its buffer"))
    })?;
    buffer.data.get(start..end).ok_or_else(|| {
        ViewError::OutOfRange(format!(
            "bufferView {index} lies outside buffer {buffer_index}"
        ))
    })
}

/// Append an uncompressed stream as a fresh buffer, buffer view and
/// accessor; returns the new accessor index.
pub(crate) fn append_decoded(model: &mut Model, attr: &DecodedAttribute) -> i32 {
    let byte_length = attr.data.len() as i64;
    let buffer_index = model.buffers.len() as i32;
    model.buffers.push(Buffer {
        byte_length,
        data: attr.data.clone(),
        ..Default::default()
    });
    let view_index = model.buffer_views.len() as i32;
    model.buffer_views.push(BufferView {
        buffer: buffer_index,
        byte_offset: 0,
        byte_length,
        ..Default::default()
    });
    let accessor_index = model.accessors.len() as i32;
    model.accessors.push(Accessor {
        buffer_view: view_index,
        component_type: attr.component_type,
        normalized: attr.normalized,
        count: attr.count,
        element_type: attr.element_type,
        ..Default::default()
    });
    accessor_index
}
