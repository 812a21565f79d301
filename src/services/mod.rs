pub mod identity;
pub mod ticket_source;

pub use identity::IdentityProvider;
pub use ticket_source::TicketSource;
