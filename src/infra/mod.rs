pub mod hosted_auth;
pub mod hosted_table;
pub mod preview_auth;
pub mod sample;
