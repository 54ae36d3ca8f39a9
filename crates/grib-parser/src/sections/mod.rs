//! Section parsing for both GRIB editions.
//!
//! Each message is a sequence of sections: an indicator, product metadata,
//! an optional grid description, an optional bitmap and packed data,
//! terminated by `7777`. Edition 1 and edition 2 lay these out differently
//! enough to get a module each.

pub mod edition1;
pub mod edition2;

use crate::GribError;

/// Bounds-checked slice of `len` bytes at `offset`.
pub(crate) fn take(data: &[u8], offset: usize, len: usize, section: u8) -> Result<&[u8], GribError> {
    data.get(offset..offset + len)
        .ok_or_else(|| GribError::InvalidSection {
            section,
            reason: format!(
                "needs {} bytes at offset {}, message has {}",
                len,
                offset,
                data.len()
            ),
        })
}
