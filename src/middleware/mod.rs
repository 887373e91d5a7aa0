//! HTTP middleware.

pub mod request_deadline;
pub mod request_logger;

pub use request_deadline::RequestDeadline;
pub use request_logger::RequestLogger;
