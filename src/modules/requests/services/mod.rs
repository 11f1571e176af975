pub mod id_generator;
pub mod request_service;

pub use request_service::{Actor, DashboardStats, RequestService};
