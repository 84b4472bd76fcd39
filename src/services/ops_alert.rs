use tracing::warn;

use crate::models::AppState;

/// Fire-and-forget operational alert for severe batch conditions. Failures
/// sending the alert itself are logged and swallowed.
pub async fn notify_admin(state: &AppState, subject: &str, html: &str) {
    let Some(admin) = &state.config.admin_email else {
        return;
    };
    if let Err(e) = state.email.send(admin, subject, html).await {
        warn!("Failed to send ops alert '{}': {}", subject, e);
    }
}
