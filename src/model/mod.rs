//! Wire types for scan session events.
//!
//! - [`ScanEvent`] - body of the start and end event requests
//! - [`ScanEventType`] / [`ScanEventStatus`] - closed enums with explicit
//!   wire encodings
//! - [`EventContext`] - caller and platform identity shared by every event
//! - [`ScanSummary`] - aggregated results of a finished scan
//!
//! # Example
//!
//! ```
//! use xscan::model::{EventContext, ScanEvent};
//!
//! let context = EventContext {
//!     plugin_name: "jfrog-idea-plugin".to_string(),
//!     plugin_version: "2.4.0".to_string(),
//!     ..EventContext::default()
//! };
//! let json = ScanEvent::started(&context).to_json().unwrap();
//! assert!(json.contains(r#""event_status":"started""#));
//! ```

mod event;

pub use event::*;
