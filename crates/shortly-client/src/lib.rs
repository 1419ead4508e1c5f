//! Client side of the Shortly summary flow.
//!
//! - [`ShortlyClient`] talks to the HTTP API
//! - [`Poller`] drives submit → trigger → poll until a summary arrives or the deadline passes
//! - [`RecentHistory`] keeps the last few summaries in a local JSON file

pub mod client;
pub mod error;
pub mod history;
pub mod poller;

pub use client::ShortlyClient;
pub use error::{ClientError, ClientResult};
pub use history::{HistoryEntry, RecentHistory, MAX_HISTORY_ENTRIES};
pub use poller::{PollConfig, Poller, ResultSource};
