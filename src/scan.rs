//! Row-multiplexing scan engine.
//!
//! Every call to [`ScanEngine::refresh`] drives one complete refresh cycle for
//! the current row group:
//!
//! 1. Skip the cycle if another device owns the serial bus.
//! 2. Configure the transport if this is the first cycle.
//! 3. Shift out the column bytes of the row group, bottom sub-row first.
//! 4. Blank the panel (output-enable off).
//! 5. Pulse the latch.
//! 6. Drive the row-select lines for the row group and advance the sequencer.
//! 7. Light the panel again (output-enable on).
//!
//! The engine owns the framebuffer, so drawing goes through
//! [`ScanEngine::frame_mut`]. To draw from the main loop while refreshing from
//! a timer interrupt wrap the engine in a [`crate::shared::SharedScanEngine`].
//!
//! # Example
//! ```rust
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{ErrorType, OutputPin};
//! # struct Pin;
//! # impl ErrorType for Pin { type Error = Infallible; }
//! # impl OutputPin for Pin {
//! #     fn set_low(&mut self) -> Result<(), Infallible> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Infallible> { Ok(()) }
//! # }
//! # struct Spi;
//! # impl embedded_hal::spi::ErrorType for Spi { type Error = Infallible; }
//! # impl embedded_hal::spi::SpiBus for Spi {
//! #     fn read(&mut self, _: &mut [u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn write(&mut self, _: &[u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn transfer(&mut self, _: &mut [u8], _: &[u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn transfer_in_place(&mut self, _: &mut [u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn flush(&mut self) -> Result<(), Infallible> { Ok(()) }
//! # }
//! use dmd_framebuffer::compute_buffer_size;
//! use dmd_framebuffer::scan::{ScanEngine, ScanOutcome, ScanPins};
//! use dmd_framebuffer::transport::SpiTransport;
//!
//! const BYTES: usize = compute_buffer_size(1, 1);
//!
//! let pins = ScanPins { a: Pin, b: Pin, output_enable: Pin, latch: Pin };
//! let mut dmd = ScanEngine::<_, _, _, _, _, 1, 1, BYTES>::new(SpiTransport::new(Spi), pins);
//!
//! dmd.frame_mut().set_pixel(0, 3, 4, true).unwrap();
//!
//! // call this from a timer, a few hundred times per second
//! let outcome = dmd.refresh().unwrap();
//! assert!(matches!(outcome, ScanOutcome::Scanned(_)));
//! assert_eq!(dmd.state(), 1);
//! ```

use embedded_hal::digital::{ErrorType, OutputPin, PinState};

use crate::error::Error;
use crate::framebuffer::FrameBuffer;
use crate::geometry::RowPlanes;
use crate::sequencer::{RowSelect, RowSequencer};
use crate::transport::{SpiConfig, Transport};

/// Level at which the output-enable line lights the selected rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputEnablePolarity {
    /// High lights the rows, low blanks them
    #[default]
    ActiveHigh,
    /// Low lights the rows, high blanks them
    ActiveLow,
}

/// Runtime configuration of the scan engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanConfig {
    /// Transport configuration applied before the first cycle
    pub spi: SpiConfig,
    /// Polarity of the output-enable line
    pub output_enable: OutputEnablePolarity,
}

/// Control lines of a DMD panel.
#[derive(Debug)]
pub struct ScanPins<A, B, OE, LAT> {
    /// Row-select line A
    pub a: A,
    /// Row-select line B
    pub b: B,
    /// Output-enable line
    pub output_enable: OE,
    /// Latch (SCLK) line
    pub latch: LAT,
}

/// Result of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The row group with these row-select levels was shifted out and lit.
    Scanned(RowSelect),
    /// Another device owned the bus; nothing was touched.
    BusBusy,
    /// A previous refresh was still running; the request was dropped.
    InProgress,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ScanOutcome {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ScanOutcome::Scanned(select) => defmt::write!(f, "Scanned({})", select),
            ScanOutcome::BusBusy => defmt::write!(f, "BusBusy"),
            ScanOutcome::InProgress => defmt::write!(f, "InProgress"),
        }
    }
}

/// Anything that can run one refresh cycle.
pub trait Refresh {
    /// Error reported by a failed cycle
    type Error;

    /// Run one refresh cycle.
    ///
    /// # Errors
    ///
    /// Returns the hardware error that aborted the cycle.
    fn refresh(&mut self) -> Result<ScanOutcome, Self::Error>;
}

/// Error type of a [`ScanEngine`] using transport `T` and pins of type `P`.
pub type ScanError<T, P> = Error<<T as Transport>::Error, <P as ErrorType>::Error>;

/// Drives a `PANELS_WIDE × PANELS_HIGH` stack of DMD panels.
///
/// # Type Parameters
/// - `T`: Serial transport, usually a [`crate::transport::SpiTransport`]
/// - `A`, `B`, `OE`, `LAT`: Output pins for row select A/B, output-enable and
///   latch, all sharing one error type
/// - `PANELS_WIDE`, `PANELS_HIGH`, `BYTES`: Framebuffer geometry, see
///   [`FrameBuffer`]
pub struct ScanEngine<
    T,
    A,
    B,
    OE,
    LAT,
    const PANELS_WIDE: usize,
    const PANELS_HIGH: usize,
    const BYTES: usize,
> {
    frame: FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES>,
    sequencer: RowSequencer,
    planes: RowPlanes,
    transport: T,
    pins: ScanPins<A, B, OE, LAT>,
    config: ScanConfig,
    configured: bool,
}

impl<T, A, B, OE, LAT, const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize>
    ScanEngine<T, A, B, OE, LAT, PANELS_WIDE, PANELS_HIGH, BYTES>
where
    T: Transport,
    A: OutputPin,
    B: OutputPin<Error = A::Error>,
    OE: OutputPin<Error = A::Error>,
    LAT: OutputPin<Error = A::Error>,
{
    /// Create an engine with a blank framebuffer and the default [`ScanConfig`].
    pub fn new(transport: T, pins: ScanPins<A, B, OE, LAT>) -> Self {
        Self::with_config(transport, pins, ScanConfig::default())
    }

    /// Create an engine with a blank framebuffer.
    pub fn with_config(transport: T, pins: ScanPins<A, B, OE, LAT>, config: ScanConfig) -> Self {
        Self {
            frame: FrameBuffer::new(),
            sequencer: RowSequencer::new(),
            planes: RowPlanes::new(FrameBuffer::<PANELS_WIDE, PANELS_HIGH, BYTES>::TOTAL_PANELS),
            transport,
            pins,
            config,
            configured: false,
        }
    }

    /// The framebuffer being scanned.
    pub fn frame(&self) -> &FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES> {
        &self.frame
    }

    /// Mutable access to the framebuffer for drawing.
    pub fn frame_mut(&mut self) -> &mut FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES> {
        &mut self.frame
    }

    /// Row group that the next cycle will drive.
    pub fn state(&self) -> u8 {
        self.sequencer.state()
    }

    /// Row-plane offsets used to address the framebuffer.
    pub fn planes(&self) -> &RowPlanes {
        &self.planes
    }

    /// Active configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Whether the transport has been configured.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Run one refresh cycle for the current row group.
    ///
    /// Returns [`ScanOutcome::BusBusy`] without touching the transport, the
    /// pins or the row group if another device owns the bus.
    ///
    /// # Errors
    ///
    /// - [`Error::Bus`] if configuring or writing the transport fails. No pin
    ///   has been touched and the row group is unchanged.
    /// - [`Error::Pin`] if a control pin fails. Output-enable is still driven
    ///   back on when the panel was blanked. The row group only advances once
    ///   the latch and row-select lines were driven.
    pub fn refresh(&mut self) -> Result<ScanOutcome, ScanError<T, A>> {
        if self.transport.is_busy() {
            #[cfg(feature = "defmt")]
            defmt::trace!("dmd: bus busy, skipping row group {}", self.sequencer.state());
            return Ok(ScanOutcome::BusBusy);
        }

        if !self.configured {
            self.transport.configure(&self.config.spi).map_err(Error::Bus)?;
            self.configured = true;
            #[cfg(feature = "defmt")]
            defmt::debug!("dmd: transport configured {}", self.config.spi);
        }

        self.shift_out().map_err(Error::Bus)?;

        let select = self.sequencer.select();
        self.set_lit(false).map_err(Error::Pin)?;
        let latched = self.latch_and_select(select);
        if latched.is_ok() {
            self.sequencer.advance();
        }
        let restored = self.set_lit(true);
        latched.map_err(Error::Pin)?;
        restored.map_err(Error::Pin)?;

        Ok(ScanOutcome::Scanned(select))
    }

    /// Blank the panel, e.g. before the refresh timer is stopped.
    ///
    /// # Errors
    ///
    /// Returns the pin error if output-enable cannot be driven.
    pub fn blank(&mut self) -> Result<(), A::Error> {
        self.set_lit(false)
    }

    /// Give the transport and pins back.
    pub fn release(self) -> (T, ScanPins<A, B, OE, LAT>) {
        (self.transport, self.pins)
    }

    fn shift_out(&mut self) -> Result<(), T::Error> {
        let planes = self.planes;
        for [row3, row2, row1, row0] in planes.scan_indices(self.sequencer.state()) {
            self.transport.write(&[
                self.frame.byte(row3),
                self.frame.byte(row2),
                self.frame.byte(row1),
                self.frame.byte(row0),
            ])?;
        }
        self.transport.flush()
    }

    fn latch_and_select(&mut self, select: RowSelect) -> Result<(), A::Error> {
        self.pins.latch.set_high()?;
        self.pins.latch.set_low()?;
        self.pins.b.set_state(PinState::from(select.b()))?;
        self.pins.a.set_state(PinState::from(select.a()))
    }

    fn set_lit(&mut self, lit: bool) -> Result<(), A::Error> {
        let high = match self.config.output_enable {
            OutputEnablePolarity::ActiveHigh => lit,
            OutputEnablePolarity::ActiveLow => !lit,
        };
        self.pins.output_enable.set_state(PinState::from(high))
    }
}

impl<T, A, B, OE, LAT, const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize>
    Refresh for ScanEngine<T, A, B, OE, LAT, PANELS_WIDE, PANELS_HIGH, BYTES>
where
    T: Transport,
    A: OutputPin,
    B: OutputPin<Error = A::Error>,
    OE: OutputPin<Error = A::Error>,
    LAT: OutputPin<Error = A::Error>,
{
    type Error = ScanError<T, A>;

    fn refresh(&mut self) -> Result<ScanOutcome, Self::Error> {
        ScanEngine::refresh(self)
    }
}

impl<T, A, B, OE, LAT, const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize>
    core::fmt::Debug for ScanEngine<T, A, B, OE, LAT, PANELS_WIDE, PANELS_HIGH, BYTES>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScanEngine")
            .field("frame", &self.frame)
            .field("state", &self.sequencer.state())
            .field("planes", &self.planes)
            .field("config", &self.config)
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}
