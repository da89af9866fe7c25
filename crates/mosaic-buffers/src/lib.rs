#![warn(clippy::pedantic)]

//! Recycling publish mailboxes.
//!
//! Decoding and publishing run at their own cadences. A decoder fills a
//! message and commits it to the quantity's [`RecyclingMailbox`]; later the
//! publisher drains every mailbox of a [`DataBuffers`] set into a
//! [`TransportSink`]. Only the most recent sample per quantity survives
//! between deliveries, and message storage is reused instead of
//! reallocated.
//!
//! ```text
//!   decoder ──acquire()──▶ Box<T> ──fill──▶ commit()
//!                                              │
//!                                      RecyclingMailbox<T>
//!                                              │
//!   publisher ──deliver_all()──▶ take() ──▶ TransportSink::send()
//!                                              │
//!                                          recycle()
//! ```
//!
//! # Concurrency
//!
//! Nothing in this crate locks. Every mutating method takes `&mut self`, so
//! the borrow checker enforces that commit and delivery never overlap. When
//! the two sides run as separate tasks, share the set behind a `Mutex` and
//! hold the lock for the duration of each `commit` or `deliver_all`.

pub mod config;
pub mod mailbox;
pub mod set;
pub mod sink;

pub use config::{PublishConfig, TopicConfig};
pub use mailbox::{MailboxStats, RecyclingMailbox};
pub use set::DataBuffers;
pub use sink::{CollectingSink, Delivered, TransportSink};
