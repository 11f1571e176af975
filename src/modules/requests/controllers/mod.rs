pub mod request_controller;
