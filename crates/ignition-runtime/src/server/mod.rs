//! Transport and dashboard server implementations bound by the built-in
//! modules.

pub mod dashboard;
pub mod transport;

pub use dashboard::DashboardServer;
pub use transport::TransportServer;
