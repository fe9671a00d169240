//! Core implementation of the history ring.
//!
//! This module provides [`HistoRing`], a fixed-capacity circular store of
//! lightweight events, and the drain protocol that renders those events to a
//! byte sink once the host has time to spare.

use std::fmt;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::codec::{emit_string, emit_string_far, format_unsigned, CharSink, Radix};
use crate::efficient_clock::Clock;

/// Data value meaning "no data supplied".
///
/// Records carrying this value are drained without a data clause. As a
/// consequence it cannot be recorded as genuine application data.
pub const HIST_NOVAL: u32 = 0xDEAD_BEEF;

/// Origin used by the record `init` adds after a successful initialization.
pub const INIT_ORIGIN: &str = "init";
/// Message used by the record `init` adds after a successful initialization.
pub const INIT_MESSAGE: &str = "history ring initialized";

/// Errors reported by [`HistoRing::init`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The requested capacity was zero. Nothing was changed.
    #[error("history ring capacity must be at least 1")]
    InvalidCapacity,

    /// Backing storage could not be reserved. The ring is left uninitialized.
    #[error("could not allocate {capacity} history slots")]
    AllocationFailed { capacity: usize },
}

/// A borrowed message, tagged with the storage it lives in.
///
/// The tag only decides which byte-fetch routine the drain uses; the ring
/// stores both kinds the same way.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Message<'a> {
    /// Ordinary memory-resident text.
    Ram(&'a str),
    /// Text in alternate read-only storage (program memory on split address
    /// space targets).
    Far(&'a str),
}

impl<'a> Message<'a> {
    #[inline]
    pub fn text(&self) -> &'a str {
        match *self {
            Message::Ram(s) | Message::Far(s) => s,
        }
    }

    #[inline]
    pub fn is_far(&self) -> bool {
        matches!(self, Message::Far(_))
    }

    /// Pushes the text through `sink` with the routine matching its storage.
    pub fn emit(&self, sink: &mut dyn CharSink) {
        match *self {
            Message::Ram(s) => emit_string(s, sink),
            Message::Far(s) => emit_string_far(s, sink),
        }
    }
}

impl<'a> From<&'a str> for Message<'a> {
    fn from(text: &'a str) -> Self {
        Message::Ram(text)
    }
}

/// One recorded event.
///
/// `origin` and `message` are borrowed; the referenced text has to outlive
/// the time the event spends in the ring.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HistItem<'a> {
    pub timestamp: u32,
    pub origin: &'a str,
    pub message: Message<'a>,
    pub data: u32,
}

impl HistItem<'static> {
    const EMPTY: HistItem<'static> = HistItem {
        timestamp: 0,
        origin: "",
        message: Message::Ram(""),
        data: HIST_NOVAL,
    };
}

impl<'a> HistItem<'a> {
    /// The data word, or `None` when the event was recorded without one.
    #[inline]
    pub fn data(&self) -> Option<u32> {
        if self.data == HIST_NOVAL {
            None
        } else {
            Some(self.data)
        }
    }

    /// Renders the event as one output line.
    ///
    /// Format: `<decimal timestamp> <origin>() <message>[ 0x<hex data>]\n`
    pub fn emit(&self, sink: &mut dyn CharSink) {
        format_unsigned(self.timestamp, Radix::DECIMAL).emit(sink);
        sink.put_char(b' ');
        emit_string(self.origin, sink);
        emit_string("() ", sink);
        self.message.emit(sink);
        if let Some(data) = self.data() {
            emit_string(" 0x", sink);
            format_unsigned(data, Radix::HEX).emit(sink);
        }
        sink.put_char(b'\n');
    }
}

fn until_nul(s: &str) -> &str {
    s.split('\0').next().unwrap_or("")
}

/// Same text as [`HistItem::emit`], without the line terminator.
impl fmt::Display for HistItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}() {}",
            self.timestamp,
            until_nul(self.origin),
            until_nul(self.message.text())
        )?;
        if let Some(data) = self.data() {
            write!(f, " 0x{:x}", data)?;
        }
        Ok(())
    }
}

/// A fixed-capacity, overwrite-on-full circular log of [`HistItem`]s.
///
/// The ring starts uninitialized. [`init`](Self::init) allocates the slots
/// once; after that [`record`](Self::record) never allocates and never
/// fails. When the ring is full the oldest unread event is silently
/// overwritten. [`drain`](Self::drain) removes every held event,
/// oldest-first, optionally rendering each one to a [`CharSink`].
///
/// # Thread Safety
///
/// All mutation goes through `&mut self` and there is no internal locking.
/// Hosts that record from several threads should use
/// [`SharedRing`](crate::shared::SharedRing) instead.
///
/// # Examples
///
/// ```
/// # use historing::{HistoRing, HIST_NOVAL};
/// let mut ring = HistoRing::new();
/// ring.init(4, None).unwrap();
/// ring.record("main", "boot", HIST_NOVAL);
/// ring.record("main", "sensor", 0xabcd);
///
/// let mut out = Vec::new();
/// let drained = ring.drain(Some(&mut |b: u8| out.push(b)));
/// assert_eq!(drained, 3);
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "0 init() history ring initialized\n1 main() boot\n2 main() sensor 0xabcd\n"
/// );
/// ```
pub struct HistoRing<'a> {
    slots: Vec<HistItem<'a>>,
    head: usize,
    tail: usize,
    count: usize,
    clock: Option<Box<dyn Clock>>,
    serial: u32,
}

impl<'a> HistoRing<'a> {
    /// Creates an uninitialized ring. Nothing is allocated.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: 0,
            tail: 0,
            count: 0,
            clock: None,
            serial: 0,
        }
    }

    /// Allocates `capacity` slots and installs `clock`.
    ///
    /// Re-initializing an initialized ring tears it down first, discarding
    /// all pending events. On success one bookkeeping event is recorded.
    ///
    /// # Errors
    ///
    /// * [`InitError::InvalidCapacity`] if `capacity` is zero; the ring is
    ///   left exactly as it was.
    /// * [`InitError::AllocationFailed`] if the slots could not be reserved;
    ///   the ring is left uninitialized.
    pub fn init(&mut self, capacity: usize, clock: Option<Box<dyn Clock>>) -> Result<(), InitError> {
        if capacity < 1 {
            warn!(capacity, "rejected history ring capacity");
            return Err(InitError::InvalidCapacity);
        }

        self.teardown();

        let mut slots: Vec<HistItem<'a>> = Vec::new();
        if slots.try_reserve_exact(capacity).is_err() {
            warn!(capacity, "history ring allocation failed");
            return Err(InitError::AllocationFailed { capacity });
        }
        slots.resize(capacity, HistItem::EMPTY);

        debug!(capacity, has_clock = clock.is_some(), "history ring initialized");
        self.slots = slots;
        self.clock = clock;
        self.head = 0;
        self.tail = 0;
        self.count = 0;
        self.serial = 0;

        self.record(INIT_ORIGIN, INIT_MESSAGE, HIST_NOVAL);
        Ok(())
    }

    /// Shorthand for [`init`](Self::init) with a clock installed.
    pub fn init_with_clock(&mut self, capacity: usize, clock: impl Clock + 'static) -> Result<(), InitError> {
        self.init(capacity, Some(Box::new(clock)))
    }

    /// Records an event.
    ///
    /// Pass [`HIST_NOVAL`] as `data` when there is nothing to attach. Does
    /// nothing on an uninitialized ring. Overwrites the oldest event when
    /// the ring is full.
    pub fn record(&mut self, origin: &'a str, message: impl Into<Message<'a>>, data: u32) {
        let capacity = self.slots.len();
        if capacity == 0 {
            return;
        }

        if self.count == capacity {
            self.tail = (self.tail + 1) % capacity;
            self.count -= 1;
            trace!(capacity, "history ring full, oldest event overwritten");
        }

        let timestamp = match self.clock.as_mut() {
            Some(clock) => clock.now(),
            None => {
                let serial = self.serial;
                self.serial = self.serial.wrapping_add(1);
                serial
            }
        };

        self.slots[self.head] = HistItem {
            timestamp,
            origin,
            message: message.into(),
            data,
        };
        self.head = (self.head + 1) % capacity;
        self.count += 1;
    }

    /// Removes every held event, oldest-first, and returns how many there
    /// were.
    ///
    /// With a sink, each event is rendered as one line (see
    /// [`HistItem::emit`]) before it is removed. Without one the history is
    /// simply discarded.
    pub fn drain(&mut self, mut sink: Option<&mut dyn CharSink>) -> usize {
        let capacity = self.slots.len();
        let mut drained = 0;

        while self.count > 0 {
            let item = self.slots[self.tail];
            if let Some(sink) = sink.as_deref_mut() {
                item.emit(sink);
            }
            self.tail = (self.tail + 1) % capacity;
            self.count -= 1;
            drained += 1;
        }

        if drained > 0 {
            trace!(drained, printed = sink.is_some(), "history ring drained");
        }
        drained
    }

    /// Drains into `sink`. Same as `drain(Some(sink))`.
    pub fn print(&mut self, sink: &mut dyn CharSink) -> usize {
        self.drain(Some(sink))
    }

    /// Drains without output. Same as `drain(None)`.
    pub fn clear(&mut self) -> usize {
        self.drain(None)
    }

    /// Releases the slots and returns to the uninitialized state.
    ///
    /// Safe to call on an uninitialized ring.
    pub fn teardown(&mut self) {
        if self.is_initialized() {
            debug!(capacity = self.slots.len(), pending = self.count, "history ring torn down");
        }
        *self = Self::new();
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Number of slots, zero when uninitialized.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of events currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.is_initialized() && self.count == self.slots.len()
    }

    #[inline]
    pub fn has_clock(&self) -> bool {
        self.clock.is_some()
    }

    /// Held events, oldest-first, without removing them.
    pub fn iter(&self) -> impl Iterator<Item = &HistItem<'a>> + '_ {
        let capacity = self.slots.len();
        (0..self.count).map(move |i| &self.slots[(self.tail + i) % capacity])
    }
}

impl Default for HistoRing<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HistoRing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoRing")
            .field("capacity", &self.slots.len())
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("count", &self.count)
            .field("has_clock", &self.clock.is_some())
            .field("serial", &self.serial)
            .finish()
    }
}

#[doc(hidden)]
pub fn function_name(path: &'static str) -> &'static str {
    let mut name = path.strip_suffix("::__here").unwrap_or(path);
    while let Some(outer) = name.strip_suffix("::{{closure}}") {
        name = outer;
    }
    match name.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

/// Name of the enclosing function, for use as an event origin.
///
/// ```
/// fn sample_adc() -> &'static str {
///     historing::origin!()
/// }
/// assert_eq!(sample_adc(), "sample_adc");
/// ```
#[macro_export]
macro_rules! origin {
    () => {{
        fn __here() {}
        $crate::history_ring::function_name(::core::any::type_name_of_val(&__here))
    }};
}

/// Records `msg` with no data, stamped with the enclosing function's name.
///
/// ```
/// # use historing::{hist, HistoRing};
/// let mut ring = HistoRing::new();
/// ring.init(8, None).unwrap();
/// hist!(ring, "button pressed");
/// assert_eq!(ring.len(), 2);
/// ```
#[macro_export]
macro_rules! hist {
    ($ring:expr, $msg:expr $(,)?) => {
        $ring.record($crate::origin!(), $msg, $crate::HIST_NOVAL)
    };
}

/// Records `msg` with a data word, stamped with the enclosing function's name.
///
/// `data` must be a `u32`; wider or signed values are rejected rather than
/// truncated.
///
/// ```compile_fail
/// # use historing::{histx, HistoRing};
/// let mut ring = HistoRing::new();
/// ring.init(8, None).unwrap();
/// let wide: u64 = 0x1_0000_0002;
/// histx!(ring, "wide", wide);
/// ```
#[macro_export]
macro_rules! histx {
    ($ring:expr, $msg:expr, $data:expr $(,)?) => {{
        let data: u32 = $data;
        $ring.record($crate::origin!(), $msg, data)
    }};
}
