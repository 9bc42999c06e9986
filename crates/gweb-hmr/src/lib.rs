//! Hot module reload protocol core for GWeb.
//!
//! The server pushes [`Message`]s over a one-way server-sent-events stream;
//! a [`Listener`] on the other end maps each message to an [`Action`] through
//! a [`DispatchTable`] and performs it on a [`ReloadSink`].
//!
//! # Quick Start
//!
//! ```ignore
//! use gweb_hmr::{EventSourceClient, Listener};
//!
//! let mut listener = Listener::new(|| println!("reload"));
//! EventSourceClient::new().run("http://127.0.0.1:8080/__hmr", &mut listener)?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! change detector ──publish──► hub ──SSE "data: reload"──► EventSourceClient
//!                                                              │
//!                                                     SseDecoder (frames)
//!                                                              │
//!                                                     Listener::on_message
//!                                                              │
//!                                                 DispatchTable ──► ReloadSink
//! ```

mod client;
mod dispatch;
mod error;
mod listener;
mod message;
pub mod sse;

pub use client::{DEFAULT_RETRY, EventSourceClient};
pub use dispatch::{Action, DispatchTable};
pub use error::HmrError;
pub use listener::{Listener, ListenerState, ReloadSink, Subscription};
pub use message::Message;
