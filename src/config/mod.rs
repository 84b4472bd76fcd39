pub mod app_config;
pub mod plans;
pub mod security_config;
pub mod swagger_config;
