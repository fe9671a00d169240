//! Mutex-guarded history ring for hosted programs.
//!
//! [`HistoRing`] has no internal locking. On a hosted target where events
//! are recorded from several threads the ring is wrapped in a
//! `parking_lot::Mutex`; each operation holds the lock for exactly the
//! duration of one ring operation.

use parking_lot::Mutex;

use crate::codec::CharSink;
use crate::efficient_clock::Clock;
use crate::history_ring::{HistoRing, InitError, Message};

/// A [`HistoRing`] behind a mutex, shareable between threads.
///
/// Borrowed text has to be `'static` since the ring may outlive any caller.
///
/// # Examples
///
/// ```
/// # use historing::{shared::SharedRing, HIST_NOVAL};
/// static RING: SharedRing = SharedRing::new();
///
/// RING.init(16, None).unwrap();
/// std::thread::spawn(|| RING.record("worker", "started", HIST_NOVAL))
///     .join()
///     .unwrap();
/// assert_eq!(RING.len(), 2);
/// ```
pub struct SharedRing {
    inner: Mutex<HistoRing<'static>>,
}

impl SharedRing {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(HistoRing::new()),
        }
    }

    pub fn init(&self, capacity: usize, clock: Option<Box<dyn Clock>>) -> Result<(), InitError> {
        self.inner.lock().init(capacity, clock)
    }

    pub fn init_with_clock(&self, capacity: usize, clock: impl Clock + 'static) -> Result<(), InitError> {
        self.inner.lock().init_with_clock(capacity, clock)
    }

    pub fn record(&self, origin: &'static str, message: impl Into<Message<'static>>, data: u32) {
        self.inner.lock().record(origin, message, data)
    }

    /// Drains under the lock. The sink runs while the lock is held and must
    /// not record into this ring.
    pub fn drain(&self, sink: Option<&mut dyn CharSink>) -> usize {
        self.inner.lock().drain(sink)
    }

    pub fn teardown(&self) {
        self.inner.lock().teardown()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.lock().is_initialized()
    }

    /// Runs `f` with exclusive access to the ring.
    pub fn with<R>(&self, f: impl FnOnce(&mut HistoRing<'static>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl Default for SharedRing {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide ring used by [`ghist!`](crate::ghist) and
/// [`ghistx!`](crate::ghistx). Starts uninitialized.
static GLOBAL_RING: SharedRing = SharedRing::new();

/// The process-wide ring.
///
/// Until someone calls `global().init(..)` recording into it is a no-op.
pub fn global() -> &'static SharedRing {
    &GLOBAL_RING
}

/// Records `msg` with no data into the process-wide ring.
#[macro_export]
macro_rules! ghist {
    ($msg:expr $(,)?) => {
        $crate::shared::global().record($crate::origin!(), $msg, $crate::HIST_NOVAL)
    };
}

/// Records `msg` with a data word into the process-wide ring.
#[macro_export]
macro_rules! ghistx {
    ($msg:expr, $data:expr $(,)?) => {{
        let data: u32 = $data;
        $crate::shared::global().record($crate::origin!(), $msg, data)
    }};
}
