pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod model;
pub mod output;
pub mod platform;
pub mod runner;
pub mod session;
pub mod version;

pub use config::{Config, ServerConfig};
pub use error::{SessionError, TransportError, VersionError};
pub use http::ResilientHttpClient;
pub use model::{ScanEvent, ScanEventStatus, ScanEventType};
pub use session::{ScanSessionClient, SessionState};
