pub mod handlers;
pub mod password;
pub mod rate_limit;
pub mod session;
pub mod token;
