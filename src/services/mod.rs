pub mod cotisations;
pub mod import_service;
pub mod ops_alert;
pub mod reminder_service;
pub mod sync_window;
pub mod threshold_service;
pub mod token_cipher;
pub mod trial_service;
