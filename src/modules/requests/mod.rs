// Requests module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{NewRequest, RequestPatch, RequestStatus, ServiceRequest, ServiceType};
pub use repositories::{LogRepository, RequestFilter, RequestRepository};
pub use services::RequestService;
