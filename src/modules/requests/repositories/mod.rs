pub mod log_repository;
pub mod request_repository;

pub use log_repository::LogRepository;
pub use request_repository::{RequestFilter, RequestRepository};
