// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The error type shared by every module in the crate.
//!
//! Only `StaleReference` is considered recoverable: the auto-size
//! estimator turns it into an "unchanged size" outcome.  Everything
//! else aborts the operation in progress and propagates upward.

use crate::canvas::LayerId;
use failure::Fail;

#[derive(Debug, Fail)]
pub enum LqrError {
    /// The layer handle no longer refers to a layer on the canvas.
    #[fail(display = "it seems that the selected layer ({}) is no longer valid", _0)]
    StaleReference(LayerId),

    #[fail(display = "unable to allocate a buffer of {} bytes", bytes)]
    AllocationFailure { bytes: usize },

    /// A direction index other than 0 (horizontal) or 1 (vertical).
    #[fail(display = "invalid resize direction {}: you just found a bug", _0)]
    InvalidDirection(i32),

    #[fail(display = "unsupported channel count {}", _0)]
    InvalidChannels(u8),

    #[fail(
        display = "buffer holds {} bytes, expected {} for {}x{}x{}",
        actual, expected, width, height, channels
    )]
    BufferSize {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
        channels: u8,
    },

    #[fail(
        display = "span of {} pixels at ({}, {}) falls outside a {}x{} drawable",
        len, x, y, width, height
    )]
    OutOfBounds {
        x: u32,
        y: u32,
        len: u32,
        width: u32,
        height: u32,
    },

    /// A visibility map records a removal step past its own depth.
    #[fail(display = "seam step {} exceeds visibility map depth {}", step, depth)]
    StepOutOfRange { step: u32, depth: u32 },

    #[fail(display = "settings file error: {}", _0)]
    Io(#[cause] std::io::Error),

    #[fail(display = "malformed settings: {}", _0)]
    Settings(#[cause] serde_yaml::Error),
}

impl LqrError {
    /// Whether the caller may report the error and carry on with the
    /// original size rather than abandoning the operation.
    pub fn is_recoverable(&self) -> bool {
        match self {
            LqrError::StaleReference(_) => true,
            _ => false,
        }
    }
}

impl From<std::io::Error> for LqrError {
    fn from(err: std::io::Error) -> Self {
        LqrError::Io(err)
    }
}

impl From<serde_yaml::Error> for LqrError {
    fn from(err: serde_yaml::Error) -> Self {
        LqrError::Settings(err)
    }
}

/// Allocate a zeroed byte buffer, reporting failure instead of aborting.
pub(crate) fn try_alloc(bytes: usize) -> Result<Vec<u8>, LqrError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(bytes)
        .map_err(|_| LqrError::AllocationFailure { bytes })?;
    buffer.resize(bytes, 0);
    Ok(buffer)
}
