use std::error::Error;
use std::io;

use historing::{ghist, ghistx, global, Message, RingConfig, WriteSink};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn poll_sensor(reading: u32) {
    ghistx!("sensor reading", reading);
}

fn handle_fault(code: u32) {
    ghistx!(Message::Far("fault latched"), code);
    ghist!("fault handler done");
}

fn main() -> Result<(), Box<dyn Error>> {
    let (writer, _guard) = tracing_appender::non_blocking(io::stderr());
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .init();

    let config = RingConfig::from_env()?;
    info!(capacity = config.capacity, clock = ?config.clock, "starting history demo");

    let ring = global();
    ring.with(|r| config.apply(r))?;

    // Twice the capacity, so the oldest half is overwritten.
    let events = config.capacity * 2;
    for i in 0..events {
        poll_sensor(i as u32 * 3);
        if i % 10 == 9 {
            handle_fault(i as u32);
        }
    }

    let mut sink = WriteSink::new(io::stdout().lock());
    let drained = ring.drain(Some(&mut sink));
    drop(sink.finish()?);
    info!(drained, "history drained");

    ring.teardown();
    Ok(())
}
