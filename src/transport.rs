//! Serial transport used to shift column data into the panel.
//!
//! The scan engine only needs a byte sink with a one-time configuration step
//! and a way to find out whether another device currently owns the bus. The
//! [`Transport`] trait captures that, and [`SpiTransport`] implements it for
//! any `embedded-hal` [`SpiBus`].
//!
//! Other SPI devices (an Ethernet controller, an SD card, ...) often share
//! the clock and data lines with the panel. A [`BusGuard`] lets the scan
//! engine skip a cycle instead of clocking garbage into the panel, or into the
//! other device, while that device's chip select is asserted.

use embedded_hal::digital::InputPin;
use embedded_hal::spi::{ErrorType, Mode, SpiBus, MODE_0};
use fugit::HertzU32;

/// Clock rate and mode the transport is configured with before the first scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiConfig {
    /// SPI clock frequency
    pub frequency: HertzU32,
    /// SPI clock polarity and phase
    pub mode: Mode,
}

impl SpiConfig {
    /// 1 MHz, mode 0, 8-bit words.
    pub const DEFAULT: Self = Self {
        frequency: HertzU32::MHz(1),
        mode: MODE_0,
    };
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SpiConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SpiConfig {{ frequency: {}, mode: {} }}", self.frequency, self.mode);
    }
}

/// Byte-stream transport feeding the panel's shift registers.
pub trait Transport {
    /// Transport error type
    type Error;

    /// Apply clock rate and mode. Called once, before the first transfer.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the peripheral rejects the configuration.
    fn configure(&mut self, config: &SpiConfig) -> Result<(), Self::Error>;

    /// Shift out `words` in order.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the transfer fails.
    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error>;

    /// Wait until every written byte has left the transport.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the transfer fails.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Whether another device currently owns the bus.
    fn is_busy(&mut self) -> bool {
        false
    }
}

/// Detects contention with other devices sharing the serial bus.
pub trait BusGuard {
    /// Whether another device currently owns the bus.
    fn is_busy(&mut self) -> bool;
}

/// Guard for a bus that is not shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoContention;

impl BusGuard for NoContention {
    fn is_busy(&mut self) -> bool {
        false
    }
}

/// Watches the active-low chip select of another device on the same bus.
///
/// A pin that cannot be read counts as busy.
#[derive(Debug)]
pub struct ChipSelectGuard<P> {
    chip_select: P,
}

impl<P: InputPin> ChipSelectGuard<P> {
    /// Guard the bus with the other device's chip select input.
    pub fn new(chip_select: P) -> Self {
        Self { chip_select }
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.chip_select
    }
}

impl<P: InputPin> BusGuard for ChipSelectGuard<P> {
    fn is_busy(&mut self) -> bool {
        self.chip_select.is_low().unwrap_or(true)
    }
}

/// Hook used to reconfigure an SPI bus.
///
/// `embedded-hal` has no portable way to change clock rate or mode, so the
/// HAL specific call is supplied here.
pub type Reconfigure<SPI> = fn(&mut SPI, &SpiConfig) -> Result<(), <SPI as ErrorType>::Error>;

/// [`Transport`] over an `embedded-hal` [`SpiBus`].
///
/// Without a [`Reconfigure`] hook the bus is expected to already run at the
/// desired rate and mode, and configuring it is a no-op.
pub struct SpiTransport<SPI: ErrorType, G = NoContention> {
    spi: SPI,
    guard: G,
    reconfigure: Option<Reconfigure<SPI>>,
}

impl<SPI: SpiBus> SpiTransport<SPI, NoContention> {
    /// Wrap an SPI bus that is not shared with other devices.
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            guard: NoContention,
            reconfigure: None,
        }
    }
}

impl<SPI: SpiBus, G: BusGuard> SpiTransport<SPI, G> {
    /// Use `guard` to detect other devices on the bus.
    pub fn with_guard<G2: BusGuard>(self, guard: G2) -> SpiTransport<SPI, G2> {
        SpiTransport {
            spi: self.spi,
            guard,
            reconfigure: self.reconfigure,
        }
    }

    /// Use `reconfigure` to apply the [`SpiConfig`] before the first scan.
    #[must_use]
    pub fn with_reconfigure(mut self, reconfigure: Reconfigure<SPI>) -> Self {
        self.reconfigure = Some(reconfigure);
        self
    }

    /// Give the bus and guard back.
    pub fn release(self) -> (SPI, G) {
        (self.spi, self.guard)
    }
}

impl<SPI: SpiBus, G: BusGuard> Transport for SpiTransport<SPI, G> {
    type Error = SPI::Error;

    fn configure(&mut self, config: &SpiConfig) -> Result<(), Self::Error> {
        match self.reconfigure {
            Some(reconfigure) => reconfigure(&mut self.spi, config),
            None => Ok(()),
        }
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(words)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.spi.flush()
    }

    fn is_busy(&mut self) -> bool {
        self.guard.is_busy()
    }
}

impl<SPI: ErrorType, G> core::fmt::Debug for SpiTransport<SPI, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpiTransport")
            .field("reconfigure", &self.reconfigure.is_some())
            .finish_non_exhaustive()
    }
}
