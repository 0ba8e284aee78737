//! esbar Panel - debugger-bar diagnostics for a search client
//!
//! The panel records every call a [`SearchClient`](esbar_common::SearchClient)
//! makes, grouped by node, and renders them as highlighted HTML. Search calls
//! are replayed with `explain=1` at render time so scoring details can be
//! inspected next to the original query.
//!
//! ```ignore
//! let mut bar = Bar::new();
//! let panel = Panel::register(PanelConfig::default(), client.clone(), &mut bar);
//! // ... issue calls through `client` ...
//! let html = bar.render();
//! ```

pub mod authority;
pub mod bar;
pub mod config;
pub mod dump;
pub mod exception;
pub mod explain;
pub mod extract;
pub mod highlight;
pub mod html;
pub mod log;
mod panel;
pub mod recorder;

#[cfg(test)]
mod test_support;

pub use bar::{Bar, BarPanel, DebugBar};
pub use config::{ConfigError, DumpOptions, PanelConfig};
pub use exception::{render_exception, ExceptionPanel};
pub use explain::{explain_pass, ReplayedBucket, ReplayedEntry};
pub use extract::{extract_request, extract_response, Payload};
pub use highlight::{highlight, tokenize, Token, TokenKind};
pub use log::{LogEntry, QueryLog, Totals};
pub use panel::Panel;
pub use recorder::Recorder;
