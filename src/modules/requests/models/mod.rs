pub mod activity_log;
pub mod service_request;

pub use activity_log::{field_label, ActivityLogEntry, ActivityLogWithCustomer, NewLogEntry};
pub use service_request::{NewRequest, RequestPatch, RequestStatus, ServiceRequest, ServiceType};
