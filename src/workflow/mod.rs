pub mod session;
pub mod tickets;
