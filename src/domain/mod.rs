pub mod analytics;
pub mod filter;
pub mod metrics;
pub mod preview;
pub mod route;
pub mod session;
pub mod ticket;
