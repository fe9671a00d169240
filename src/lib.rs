//! # historing
//!
//! A fixed-capacity, overwrite-on-full history log for targets that cannot
//! afford formatted logging at the point where something happens.
//!
//! * **Cheap recording**: a record is a timestamp, two borrowed strings and
//!   a 32-bit data word, written into a preallocated slot
//! * **Bounded memory**: when the ring is full the oldest event is
//!   overwritten, recording never fails
//! * **Deferred output**: events are drained later, oldest-first, one byte
//!   at a time through a caller-supplied sink
//! * **Clock optional**: without a timestamp source events are numbered
//!   0, 1, 2, ...
//!
//! ## Main Components
//!
//! * `HistoRing`: the ring itself and its drain protocol
//! * `codec`: allocation-free number formatting and string emission
//! * `efficient_clock`: timestamp sources
//! * `shared`: a mutex-guarded ring and the process-wide instance
//! * `sink`: sinks for `io::Write` targets and in-memory capture
//! * `drain_reader`: parser for captured drain output
//! * `config`: ring configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```
//! use historing::{hist, histx, HistoRing, Message};
//!
//! fn handle_irq(ring: &mut HistoRing<'static>, status: u32) {
//!     histx!(ring, "irq status", status);
//!     hist!(ring, Message::Far("irq done"));
//! }
//!
//! let mut ring = HistoRing::new();
//! ring.init(32, None).unwrap();
//! handle_irq(&mut ring, 0x80);
//!
//! let mut out = Vec::new();
//! ring.print(&mut |b: u8| out.push(b));
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "0 init() history ring initialized\n\
//!      1 handle_irq() irq status 0x80\n\
//!      2 handle_irq() irq done\n"
//! );
//! ```

pub mod codec;
pub mod config;
pub mod drain_reader;
pub mod efficient_clock;
pub mod history_ring;
pub mod shared;
pub mod sink;

pub use codec::{format_unsigned, CharSink, Radix};
pub use config::{ClockSource, ConfigError, RingConfig};
pub use drain_reader::{DrainReader, DrainedLine, ParseError};
pub use efficient_clock::{Clock, TickClock};
pub use history_ring::{HistItem, HistoRing, InitError, Message, HIST_NOVAL};
pub use shared::{global, SharedRing};
pub use sink::{LineCollector, WriteSink};
