//! Hot module reload endpoints.
//!
//! `GET <endpoint>` streams messages, `POST <endpoint>/notify` publishes one
//! and `GET <endpoint>/client.js` serves the browser listener.

mod debouncer;
mod hub;
mod notify;
mod script;
mod stream;

pub use hub::HmrHub;
pub(crate) use notify::notify_handler;
pub(crate) use script::script_handler;
pub(crate) use stream::stream_handler;
