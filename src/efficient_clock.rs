//! Timestamp providers for the history ring.
//!
//! The ring asks its clock for a 32-bit tick value on every record. Any
//! `FnMut() -> u32` works as a clock; this module also provides
//! [`TickClock`], which derives ticks from the CPU hardware counter.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::_rdtsc;

/// Conversion factor: how many CPU ticks per recorded timestamp unit.
/// Adjust this constant to match your CPU and desired resolution.
pub const TICKS_PER_UNIT: u64 = 30_000;

/// Source of the 32-bit timestamps stamped on each recorded event.
///
/// Must not call back into the ring it is installed in.
///
/// # Examples
///
/// ```
/// # use historing::efficient_clock::Clock;
/// fn rtc_seconds() -> u32 { 1_700_000_000 }
///
/// let mut clock = rtc_seconds;
/// assert_eq!(clock.now(), 1_700_000_000);
/// ```
pub trait Clock: Send {
    /// Returns the current tick value.
    fn now(&mut self) -> u32;
}

impl<F> Clock for F
where
    F: FnMut() -> u32 + Send,
{
    #[inline]
    fn now(&mut self) -> u32 {
        self()
    }
}

/// Clock driven by the CPU hardware counter.
///
/// Returns the ticks elapsed since the clock was created, divided by
/// [`TICKS_PER_UNIT`] and truncated to 32 bits. The value wraps after
/// `u32::MAX` units.
///
/// # Examples
///
/// ```
/// # use historing::efficient_clock::{Clock, TickClock};
/// let mut clock = TickClock::new();
/// let first = clock.now();
/// let second = clock.now();
/// assert!(second >= first);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct TickClock {
    base: u64,
}

impl TickClock {
    /// Creates a clock whose zero is the current counter value.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            base: get_timestamp(),
        }
    }

    /// Raw counter ticks elapsed since creation.
    #[inline]
    pub fn elapsed_ticks(&self) -> u64 {
        get_timestamp().saturating_sub(self.base)
    }

    /// Moves the zero point to the current counter value.
    pub fn reset(&mut self) {
        self.base = get_timestamp();
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TickClock {
    #[inline]
    fn now(&mut self) -> u32 {
        (self.elapsed_ticks() / TICKS_PER_UNIT) as u32
    }
}

/// Returns a monotonic timestamp with the highest precision available.
///
/// This function uses architecture-specific instructions when available:
/// - x86_64: RDTSC instruction (CPU time stamp counter)
/// - aarch64: CNTVCT_EL0 register (ARM virtual counter)
/// - Other platforms: System time with nanosecond precision
#[inline(always)]
pub fn get_timestamp() -> u64 {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        _rdtsc()
    }

    #[cfg(target_arch = "aarch64")]
    unsafe {
        let mut value: u64;
        std::arch::asm!("mrs {}, cntvct_el0", out(reg) value);
        value
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}
