//! Framebuffer and scan engine for monochrome DMD LED matrix panels.
//!
//! ## How DMD Panels Work
//!
//! A DMD ("dot matrix display") is a 32 × 16 monochrome LED panel. Like a
//! HUB75 panel it is not a random-access display: the column data lives in a
//! chain of shift registers and only one group of rows is lit at a time.
//!
//! ### Signal names
//! - **R-DATA** – Serial column data, one bit per pixel
//! - **CLK** – Shift-register clock (the SPI clock)
//! - **SCLK / LAT** – Latch; copies the shift-register contents to the column drivers
//! - **OE** – Output-Enable; blanks or lights the currently selected rows
//! - **A B** – Row-select lines, binary encoded, choosing one of four row groups
//!
//! ### 1/4 scan workflow
//! The panel is split into four interleaved row groups: rows {1, 5, 9, 13},
//! {2, 6, 10, 14}, {3, 7, 11, 15} and {4, 8, 12, 16}. One refresh cycle:
//! 1. Shifts the 16 bytes (128 pixels) of the current row group into the chain.
//!    The shift registers of the four rows of a group are daisy-chained, so
//!    the bytes for row 13 go out first and the bytes for row 1 go out last.
//! 2. Blanks the panel (OE off).
//! 3. Pulses the latch so the freshly shifted data reaches the column drivers.
//! 4. Drives A/B to select the row group that was just shifted.
//! 5. Lights the panel again (OE on).
//!
//! Repeating the cycle for the four groups fast enough (hundreds of calls per
//! second in aggregate) makes the eye see one steady image.
//!
//! ## Crate layout
//!
//! - [`framebuffer::FrameBuffer`] holds the bit-packed pixels for one or
//!   more panels and implements the `embedded-graphics` `DrawTarget`.
//! - [`geometry::RowPlanes`] precomputes the byte offsets that map the four
//!   sub-rows of a row group onto the buffer.
//! - [`sequencer::RowSequencer`] is the 4-state row-group cycle.
//! - [`scan::ScanEngine`] drives one refresh cycle per call over a
//!   [`transport::Transport`] and four `embedded-hal` output pins.
//! - [`shared::SharedScanEngine`] shares an engine between a timer interrupt
//!   and the drawing code.
//!
//! ## Multiple Panels
//! Panels are chained on the same data line. The geometry is given by the
//! `PANELS_WIDE` and `PANELS_HIGH` const parameters and every pixel written
//! through the global coordinate API is routed to the right panel, so a
//! 2 × 2 stack of panels looks like a single 64 × 32 canvas.
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types and emits a few `defmt`
//! log lines from the scan engine (transport configuration, skipped cycles).
//!
//! ```toml
//! [dependencies]
//! dmd-framebuffer = { version = "0.1.0", features = ["defmt"] }
//! ```
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use embedded_graphics::pixelcolor::BinaryColor;

pub mod error;
pub mod framebuffer;
pub mod geometry;
pub mod scan;
pub mod sequencer;
pub mod shared;
pub mod transport;

pub use error::{Error, OutOfRange};
pub use framebuffer::FrameBuffer;
pub use scan::{Refresh, ScanConfig, ScanEngine, ScanOutcome, ScanPins};
pub use sequencer::{RowSelect, RowSequencer};

/// Color type used in the framebuffer
pub type Color = BinaryColor;

/// Pixels across the x axis of a single panel
pub const PIXELS_ACROSS: usize = 32;

/// Pixels down the y axis of a single panel
pub const PIXELS_DOWN: usize = 16;

/// Bits stored per pixel
pub const BITS_PER_PIXEL: usize = 1;

/// Number of bytes one panel row occupies in the framebuffer
pub const PANEL_ROW_BYTES: usize = (PIXELS_ACROSS * BITS_PER_PIXEL).div_ceil(8);

/// Number of bytes needed for a single panel
pub const PANEL_BYTES: usize = PANEL_ROW_BYTES * PIXELS_DOWN;

/// Computes the total number of panels for a tiled layout
///
/// # Arguments
///
/// * `panels_wide` - Number of panels side by side
/// * `panels_high` - Number of panels stacked vertically
#[must_use]
pub const fn compute_total_panels(panels_wide: usize, panels_high: usize) -> usize {
    panels_wide * panels_high
}

/// Computes the `BYTES` value for [`FrameBuffer`]
///
/// # Arguments
///
/// * `panels_wide` - Number of panels side by side
/// * `panels_high` - Number of panels stacked vertically
///
/// # Returns
///
/// Size of the framebuffer in bytes
#[must_use]
pub const fn compute_buffer_size(panels_wide: usize, panels_high: usize) -> usize {
    PANEL_BYTES * compute_total_panels(panels_wide, panels_high)
}
