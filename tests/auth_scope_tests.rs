mod common;

use chrono::{Duration, Utc};
use common::{create_test_app_state, TEST_CRON_SECRET};
use http::{header, HeaderMap, HeaderValue};
use jsonwebtoken::{encode, EncodingKey, Header};
use microcompta::config::security_config::{
    authorize_scheduler, authorize_scheduler_or_user, Claims, CronScope,
};
use secrecy::ExposeSecret;
use uuid::Uuid;

fn bearer(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", value)).unwrap(),
    );
    headers
}

#[test]
fn scheduler_secret_in_header_grants_all_users_scope() {
    let state = create_test_app_state();
    let scope =
        authorize_scheduler_or_user(&state.config, &bearer(TEST_CRON_SECRET), None).unwrap();
    assert_eq!(scope, CronScope::AllUsers);
}

#[test]
fn scheduler_secret_as_query_param_is_accepted() {
    let state = create_test_app_state();
    assert!(authorize_scheduler(&state.config, &HeaderMap::new(), Some(TEST_CRON_SECRET)).is_ok());
}

#[test]
fn user_jwt_scopes_the_run_to_that_user() {
    let state = create_test_app_state();
    let user_id = Uuid::new_v4();

    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::hours(1)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.expose_secret().as_bytes()),
    )
    .unwrap();

    let scope = authorize_scheduler_or_user(&state.config, &bearer(&token), None).unwrap();
    assert_eq!(scope, CronScope::User(user_id));
}

#[test]
fn expired_jwt_is_rejected() {
    let state = create_test_app_state();

    let now = Utc::now();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: (now - Duration::hours(2)).timestamp() as usize,
        iat: (now - Duration::hours(3)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.expose_secret().as_bytes()),
    )
    .unwrap();

    assert!(authorize_scheduler_or_user(&state.config, &bearer(&token), None).is_err());
}

#[test]
fn jwt_with_a_non_uuid_subject_is_rejected() {
    let state = create_test_app_state();

    let now = Utc::now();
    let claims = Claims {
        sub: "not-a-uuid".to_string(),
        exp: (now + Duration::hours(1)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.expose_secret().as_bytes()),
    )
    .unwrap();

    assert!(authorize_scheduler_or_user(&state.config, &bearer(&token), None).is_err());
}
