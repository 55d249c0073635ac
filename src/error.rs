use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

/// Errors returned by every fallible operation in this crate.
///
/// Nothing here is retried internally except the wait for a freshly exported
/// node to appear, which surfaces as [`Error::Timeout`] when it gives up.
#[derive(Debug, Error)]
pub enum Error {
    /// Opening, reading or writing a control file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A control file held something other than what was expected.
    #[error("unexpected content {content:?} in {}", .path.display())]
    Parse { path: PathBuf, content: String },

    /// A value write was attempted on a pin configured as an input.
    #[error("cannot write gpio{pin}: it is configured as an input")]
    Direction { pin: u32 },

    /// Duty cycle outside `0..=period`.
    #[error("duty cycle {duty_cycle}ns exceeds period {period}ns")]
    Range { duty_cycle: u64, period: u64 },

    /// No chip descriptor was found under the GPIO root.
    #[error("no GPIO chip found under {}", .root.display())]
    NoChipFound { root: PathBuf },

    /// An exported node did not show up in time.
    #[error("{} did not appear within {waited:?}", .path.display())]
    Timeout { path: PathBuf, waited: Duration },

    /// PWM channel name without a numeric suffix.
    #[error("PWM channel {channel:?} has no numeric suffix")]
    InvalidChannel { channel: String },

    /// Logical pin number does not fit on the chip.
    #[error("logical pin {logical} is out of range for {chip}")]
    PinOutOfRange { logical: u32, chip: String },

    /// Export/unexport control file is read-only for this process.
    #[error("you do not have write access to {}", .path.display())]
    NotWritable { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            content: content.into(),
        }
    }
}
