//! Sharing a scan engine between a refresh interrupt and the drawing code.
//!
//! [`SharedScanEngine`] keeps the engine in a `critical_section::Mutex`, so it
//! can live in a `static` that both the timer interrupt and the main loop
//! reach. All access happens inside a critical section, which makes every
//! framebuffer update atomic with respect to the scan.
//!
//! Refreshes are never nested: a refresh requested while the engine is already
//! borrowed (for example from a handler that fires while a previous cycle is
//! still running) is dropped and reported as [`ScanOutcome::InProgress`].
//!
//! ```rust,ignore
//! static DMD: SharedScanEngine<Dmd> = SharedScanEngine::new(...);
//!
//! #[interrupt]
//! fn TIMER_IRQ_0() {
//!     let _ = DMD.refresh();
//! }
//!
//! DMD.with_frame(|fb| fb.set_pixel(0, 1, 2, true));
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

use crate::framebuffer::FrameBuffer;
use crate::scan::{Refresh, ScanEngine, ScanOutcome};
use crate::transport::Transport;

/// A scan engine guarded by a critical section.
pub struct SharedScanEngine<E> {
    engine: Mutex<RefCell<E>>,
}

impl<E> SharedScanEngine<E> {
    /// Wrap `engine`.
    pub const fn new(engine: E) -> Self {
        Self {
            engine: Mutex::new(RefCell::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine.
    ///
    /// Returns `None` if the engine is already borrowed further up the stack.
    pub fn with<R>(&self, f: impl FnOnce(&mut E) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut engine = self.engine.borrow(cs).try_borrow_mut().ok()?;
            Some(f(&mut *engine))
        })
    }

    /// Take the engine back.
    pub fn into_inner(self) -> E {
        self.engine.into_inner().into_inner()
    }
}

impl<E: Refresh> SharedScanEngine<E> {
    /// Run one refresh cycle unless one is already running.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if the cycle fails.
    pub fn refresh(&self) -> Result<ScanOutcome, E::Error> {
        self.with(|engine| engine.refresh())
            .unwrap_or(Ok(ScanOutcome::InProgress))
    }
}

impl<T, A, B, OE, LAT, const PANELS_WIDE: usize, const PANELS_HIGH: usize, const BYTES: usize>
    SharedScanEngine<ScanEngine<T, A, B, OE, LAT, PANELS_WIDE, PANELS_HIGH, BYTES>>
where
    T: Transport,
    A: OutputPin,
    B: OutputPin<Error = A::Error>,
    OE: OutputPin<Error = A::Error>,
    LAT: OutputPin<Error = A::Error>,
{
    /// Draw into the framebuffer.
    ///
    /// Returns `None` if the engine is already borrowed further up the stack.
    pub fn with_frame<R>(
        &self,
        f: impl FnOnce(&mut FrameBuffer<PANELS_WIDE, PANELS_HIGH, BYTES>) -> R,
    ) -> Option<R> {
        self.with(|engine| f(engine.frame_mut()))
    }
}
