//! Bit-packed framebuffer for one or more chained DMD panels.
//!
//! Each byte holds eight horizontally adjacent pixels with bit 7 being the
//! leftmost one. The panel rows are stored one after another and every row
//! spans all chained panels:
//!
//! ```text
//! byte = y * rowsize + panel * 4 + x / 8      rowsize = total_panels * 4
//! mask = PIXEL_MASK[x % 8]
//! ```
//!
//! Pixels can be addressed per panel ([`FrameBuffer::set_pixel`]) or on the
//! global canvas formed by `PANELS_WIDE × PANELS_HIGH` panels
//! ([`FrameBuffer::set_point`] and the `embedded-graphics` `DrawTarget`).
//!
//! # Example
//! ```rust
//! use embedded_graphics::pixelcolor::BinaryColor;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{Line, PrimitiveStyle};
//! use dmd_framebuffer::compute_buffer_size;
//! use dmd_framebuffer::framebuffer::FrameBuffer;
//!
//! const WIDE: usize = 2;
//! const HIGH: usize = 1;
//! const BYTES: usize = compute_buffer_size(WIDE, HIGH);
//!
//! let mut fb = FrameBuffer::<WIDE, HIGH, BYTES>::new();
//!
//! // light one pixel on the second panel
//! fb.set_pixel(1, 0, 0, true).unwrap();
//! assert!(fb.get_pixel(1, 0, 0).unwrap());
//!
//! // draw across both panels
//! Line::new(Point::new(0, 8), Point::new(63, 8))
//!     .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
//!     .draw(&mut fb)
//!     .unwrap();
//! assert!(fb.get_point(Point::new(40, 8)).unwrap());
//! ```

use core::convert::Infallible;

use embedded_dma::ReadBuffer;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{OriginDimensions, Point, Size};

use crate::error::OutOfRange;
use crate::{compute_buffer_size, compute_total_panels, Color};
use crate::{PANEL_ROW_BYTES, PIXELS_ACROSS, PIXELS_DOWN};

/// Bit mask for each pixel position within a byte, indexed by `x % 8`.
pub const PIXEL_MASK: [u8; 8] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];

/// Framebuffer for a `PANELS_WIDE × PANELS_HIGH` stack of DMD panels.
///
/// # Type Parameters
/// - `PANELS_WIDE`: Number of panels side by side
/// - `PANELS_HIGH`: Number of panels stacked vertically
/// - `BYTES`: Size of the buffer, use [`compute_buffer_size`]
#[derive(Clone, PartialEq, Eq)]
#[repr(C)]
#[repr(align(4))]
pub struct FrameBuffer<const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize> {
    data: [u8; BYTES],
}

impl<const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize>
    FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES>
{
    /// Total number of chained panels.
    pub const TOTAL_PANELS: usize = compute_total_panels(PANELS_WIDE, PANELS_HIGH);

    /// Width of the global canvas in pixels.
    pub const WIDTH: usize = PIXELS_ACROSS * PANELS_WIDE;

    /// Height of the global canvas in pixels.
    pub const HEIGHT: usize = PIXELS_DOWN * PANELS_HIGH;

    /// Bytes per panel row across all chained panels.
    pub const ROW_SIZE: usize = Self::TOTAL_PANELS * PANEL_ROW_BYTES;

    const SIZE_CHECK: () = assert!(
        BYTES == compute_buffer_size(PANELS_WIDE, PANELS_HIGH) && BYTES > 0,
        "BYTES must equal compute_buffer_size(PANELS_WIDE, PANELS_HIGH)"
    );

    /// Create a new, blank framebuffer.
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::SIZE_CHECK;
        Self { data: [0; BYTES] }
    }

    /// Turn every pixel on or off.
    pub fn fill(&mut self, on: bool) {
        self.data.fill(if on { 0xff } else { 0x00 });
    }

    /// Raw framebuffer bytes in scan layout.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BYTES] {
        &self.data
    }

    /// Byte at `index`, as read by the scan engine.
    #[inline]
    #[must_use]
    pub(crate) fn byte(&self, index: usize) -> u8 {
        self.data[index]
    }

    #[inline]
    fn locate(panel: usize, x: usize, y: usize) -> Result<(usize, u8), OutOfRange> {
        if panel >= Self::TOTAL_PANELS || x >= PIXELS_ACROSS || y >= PIXELS_DOWN {
            return Err(OutOfRange);
        }
        let index = y * Self::ROW_SIZE + panel * PANEL_ROW_BYTES + x / 8;
        Ok((index, PIXEL_MASK[x & 0x07]))
    }

    #[inline]
    fn locate_point(p: Point) -> Result<(usize, usize, usize), OutOfRange> {
        if p.x < 0 || p.y < 0 {
            return Err(OutOfRange);
        }
        let (gx, gy) = (p.x as usize, p.y as usize);
        if gx >= Self::WIDTH || gy >= Self::HEIGHT {
            return Err(OutOfRange);
        }
        let panel = gx / PIXELS_ACROSS + PANELS_WIDE * (gy / PIXELS_DOWN);
        Ok((panel, gx % PIXELS_ACROSS, gy % PIXELS_DOWN))
    }

    /// Set or clear a single pixel of panel `panel`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `panel`, `x` or `y` is outside the panel
    /// geometry. The buffer is not modified in that case.
    pub fn set_pixel(&mut self, panel: usize, x: usize, y: usize, on: bool) -> Result<(), OutOfRange> {
        let (index, mask) = Self::locate(panel, x, y)?;
        if on {
            self.data[index] |= mask;
        } else {
            self.data[index] &= !mask;
        }
        Ok(())
    }

    /// Read a single pixel of panel `panel`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `panel`, `x` or `y` is outside the panel
    /// geometry.
    pub fn get_pixel(&self, panel: usize, x: usize, y: usize) -> Result<bool, OutOfRange> {
        let (index, mask) = Self::locate(panel, x, y)?;
        Ok(self.data[index] & mask != 0)
    }

    /// Set or clear a pixel on the global canvas.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] for points outside the canvas.
    pub fn set_point(&mut self, p: Point, on: bool) -> Result<(), OutOfRange> {
        let (panel, x, y) = Self::locate_point(p)?;
        self.set_pixel(panel, x, y, on)
    }

    /// Read a pixel on the global canvas.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] for points outside the canvas.
    pub fn get_point(&self, p: Point) -> Result<bool, OutOfRange> {
        let (panel, x, y) = Self::locate_point(p)?;
        self.get_pixel(panel, x, y)
    }
}

impl<const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize> Default
    for FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize> OriginDimensions
    for FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES>
{
    fn size(&self) -> Size {
        Size::new(Self::WIDTH as u32, Self::HEIGHT as u32)
    }
}

impl<const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize> DrawTarget
    for FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES>
{
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for pixel in pixels {
            // off-canvas pixels are clipped
            let _ = self.set_point(pixel.0, pixel.1.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color == BinaryColor::On);
        Ok(())
    }
}

unsafe impl<const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize> ReadBuffer
    for FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES>
{
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        (self.data.as_ptr(), BYTES)
    }
}

impl<const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize> core::fmt::Debug
    for FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("panels_wide", &PANELS_WIDE)
            .field("panels_high", &PANELS_HIGH)
            .field("size", &BYTES)
            .field("row_size", &Self::ROW_SIZE)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize> defmt::Format
    for FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "FrameBuffer<{}, {}, {}> row_size: {}",
            PANELS_WIDE,
            PANELS_HIGH,
            BYTES,
            Self::ROW_SIZE
        );
    }
}
