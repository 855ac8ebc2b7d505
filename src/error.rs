//! Error types for the framebuffer and the scan engine.

use core::fmt;

/// A pixel coordinate or panel index fell outside the configured geometry.
///
/// The framebuffer is left unchanged; clipping is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange;

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("pixel coordinate out of range")
    }
}

impl core::error::Error for OutOfRange {}

#[cfg(feature = "defmt")]
impl defmt::Format for OutOfRange {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "OutOfRange");
    }
}

/// Hardware errors reported during a refresh cycle.
///
/// # Type Parameters
///
/// * `BusE` - Error type of the serial transport
/// * `PinE` - Error type shared by the control pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<BusE, PinE> {
    /// The serial transport failed while configuring or shifting data.
    Bus(BusE),
    /// A control pin (row select, output enable or latch) failed.
    Pin(PinE),
}

impl<BusE: fmt::Debug, PinE: fmt::Debug> fmt::Display for Error<BusE, PinE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "serial transport error: {e:?}"),
            Error::Pin(e) => write!(f, "control pin error: {e:?}"),
        }
    }
}

impl<BusE: fmt::Debug, PinE: fmt::Debug> core::error::Error for Error<BusE, PinE> {}

#[cfg(feature = "defmt")]
impl<BusE: defmt::Format, PinE: defmt::Format> defmt::Format for Error<BusE, PinE> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Bus(e) => defmt::write!(f, "Bus({})", e),
            Error::Pin(e) => defmt::write!(f, "Pin({})", e),
        }
    }
}
