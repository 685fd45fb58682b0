//! Interrupt-shared ownership slot
//!
//! The flicker task lives in the timer interrupt but is built in `main`.
//! [`InterruptCell`] hands it over once and then lends it out exclusively,
//! inside a critical section, so a tick always runs to completion with
//! interrupts masked.
//!
//! # Example
//!
//! ```ignore
//! use candle_flicker::{FlickerConfig, InterruptCell, TickScheduler, TimerConfig};
//!
//! static TASK: InterruptCell<TickScheduler<BoardPwm, Timer0>> = InterruptCell::new();
//!
//! fn main() -> ! {
//!     let scheduler = TickScheduler::new(
//!         &FlickerConfig::DEFAULT,
//!         TimerConfig::DEFAULT,
//!         BoardPwm::take(),
//!         Timer0::take(),
//!     )
//!     .unwrap();
//!     if TASK.install(scheduler).is_err() {
//!         panic!("flicker task installed twice");
//!     }
//!     enable_timer_interrupt();
//!
//!     supervisor.run()
//! }
//!
//! // Timer overflow interrupt
//! fn on_timer0_overflow() {
//!     TASK.with(|task| task.on_overflow());
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

/// Error returned when the cell already holds a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyInstalled<T>(pub T);

/// A `static`-friendly slot for one interrupt-owned value.
pub struct InterruptCell<T> {
    inner: Mutex<RefCell<Option<T>>>,
}

impl<T> InterruptCell<T> {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Move a value into the cell.
    ///
    /// Returns `Err(AlreadyInstalled(value))` if the cell is occupied.
    pub fn install(&self, value: T) -> Result<(), AlreadyInstalled<T>> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).borrow_mut();
            if slot.is_some() {
                return Err(AlreadyInstalled(value));
            }
            *slot = Some(value);
            Ok(())
        })
    }

    /// Run `f` with exclusive access to the value.
    ///
    /// Returns `None` if nothing is installed yet.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).borrow_mut();
            slot.as_mut().map(f)
        })
    }

    /// Take the value back out of the cell.
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().take())
    }

    /// Check whether a value is installed.
    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().is_some())
    }
}

impl<T> Default for InterruptCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
