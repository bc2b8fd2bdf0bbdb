//! Edge timestamp capture for a 16-bit hardware timer.
//!
//! The capture interrupt latches the counter on every edge of the monitored
//! input, extends it to 32 bits with a software wrap count and pushes a
//! [`CaptureEvent`] into a fixed-size [`EventQueue`]. The poll loop drains the
//! queue through a [`CaptureConsumer`]. When the queue is full, events are
//! counted as dropped, never silently lost and never overwritten.
//!
//! ```
//! use edge_capture::{CaptureEvent, Edge, Enqueue, EventQueue};
//!
//! let mut queue = EventQueue::<4>::new();
//! assert_eq!(queue.push(CaptureEvent::new(100, Edge::Rising)), Enqueue::Stored);
//! assert_eq!(queue.pop(), Some(CaptureEvent::new(100, Edge::Rising)));
//! ```
//!
//! # Contexts
//! - [`CaptureSource::on_capture`] / [`CaptureSource::on_overflow`] run in the
//!   capture interrupt, which has exclusive access to the queue.
//! - [`CaptureConsumer`] runs in the poll loop and reaches the queue through an
//!   `rtic_core::Mutex`, one short lock per operation.
#![no_std]

pub mod clock;
pub mod config;
pub mod consumer;
pub mod drops;
pub mod event;
pub mod queue;
pub mod record;
pub mod source;
pub mod toggle;

pub use clock::TickClock;
pub use config::{CaptureConfig, CAPTURE_BUFFER_SIZE};
pub use consumer::CaptureConsumer;
pub use drops::DropMonitor;
pub use event::{CaptureEvent, Edge};
pub use queue::{Enqueue, EventQueue};
pub use record::{Banner, DeltaTracker, ParseError, Record, RunStart};
pub use source::{CaptureSource, CaptureTimer};
pub use toggle::{Requests, Toggle, Transition};

#[cfg(test)]
extern crate std;
