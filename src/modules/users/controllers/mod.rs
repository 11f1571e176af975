pub mod auth_controller;

pub use auth_controller::require_user;
