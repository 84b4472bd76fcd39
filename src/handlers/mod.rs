pub mod check_thresholds;
pub mod health;
pub mod monthly_reminder;
pub mod monthly_sync;
pub mod reconcile_trials;
pub mod sync_revenues;
