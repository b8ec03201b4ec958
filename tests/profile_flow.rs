//! Onboarding flows end to end over the service layer.

mod common;

use airpulse::onboarding::{OnboardingError, ProfileState};
use airpulse::profile::QueryError;
use airpulse::wallet::CurrentUser;
use common::{sample_profile, start_advisory, test_app, test_config};
use serde_json::json;
use std::sync::atomic::Ordering;

fn ada() -> CurrentUser {
    CurrentUser::new("sub-ada").with_email("ada@example.com")
}

#[tokio::test]
async fn test_first_visit_to_edit() {
    let advisory = start_advisory().await;
    let app = test_app(test_config(Some(&advisory)));
    let service = &app.state.service;
    let user = ada();

    let dashboard = service.dashboard(&user).await;
    assert_eq!(dashboard.profile, ProfileState::NoWallet);

    let provisioned = service.provision(&user).unwrap();
    assert!(provisioned.created);

    let state = service.onboarding_state(&user).await.unwrap();
    assert!(!state.editing);
    assert_eq!(state.completion_percent, 0.0);

    let submission = service.submit(&user, sample_profile()).await.unwrap();
    assert_eq!(submission.advice.as_deref(), Some(common::ADVICE_TEXT));
    assert_eq!(submission.air_quality.aqi, 57);

    let dashboard = service.dashboard(&user).await;
    assert_eq!(
        dashboard.profile,
        ProfileState::Found {
            profile: sample_profile()
        }
    );
    assert_eq!(
        dashboard.wallet.unwrap().address,
        provisioned.wallet.address
    );

    let state = service.onboarding_state(&user).await.unwrap();
    assert!(state.editing);
    assert_eq!(state.profile, sample_profile());
    assert_eq!(state.completion_percent, 100.0);
}

#[tokio::test]
async fn test_edit_overwrites_previous_profile() {
    let app = test_app(test_config(None));
    let service = &app.state.service;
    let user = ada();
    service.provision(&user).unwrap();

    service.submit(&user, sample_profile()).await.unwrap();

    let mut edited = sample_profile();
    edited.chronic_condition = vec!["none".to_string()];
    edited.preferred_walk_time = String::new();
    service.submit(&user, edited.clone()).await.unwrap();

    assert_eq!(service.get_profile(&user).await.unwrap(), edited);
    let state = service.onboarding_state(&user).await.unwrap();
    assert!((state.completion_percent - 600.0 / 7.0).abs() < 1e-9);
    assert_eq!(app.ledger.submissions.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_advice_failure_keeps_submission() {
    let app = test_app(test_config(None));
    let service = &app.state.service;
    let user = ada();
    service.provision(&user).unwrap();

    let submission = service.submit(&user, sample_profile()).await.unwrap();

    assert!(submission.advice.is_none());
    assert_eq!(submission.air_quality.aqi, 112);
    assert!(service.has_profile(&user).await.unwrap());
}

#[tokio::test]
async fn test_invalid_profile_never_reaches_ledger() {
    let app = test_app(test_config(None));
    let service = &app.state.service;
    let user = ada();
    service.provision(&user).unwrap();

    let mut profile = sample_profile();
    profile.age = 0;
    profile.location = String::new();

    match service.submit(&user, profile).await.unwrap_err() {
        OnboardingError::Invalid(fields) => {
            let names: Vec<_> = fields.iter().map(|f| f.field).collect();
            assert_eq!(names, vec!["age", "location"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(app.ledger.submissions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_reads_are_idempotent() {
    let app = test_app(test_config(None));
    let service = &app.state.service;
    let user = ada();
    service.provision(&user).unwrap();
    service.submit(&user, sample_profile()).await.unwrap();

    let first = service.get_profile(&user).await.unwrap();
    let second = service.get_profile(&user).await.unwrap();
    assert_eq!(first, second);
    assert!(service.has_profile(&user).await.unwrap());
    assert!(service.has_profile(&user).await.unwrap());
    assert_eq!(app.ledger.submissions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_users_are_isolated() {
    let app = test_app(test_config(None));
    let service = &app.state.service;
    let ada = ada();
    let grace = CurrentUser::new("sub-grace");

    let ada_wallet = service.provision(&ada).unwrap().wallet;
    let grace_wallet = service.provision(&grace).unwrap().wallet;
    assert_ne!(ada_wallet.address, grace_wallet.address);

    service.submit(&ada, sample_profile()).await.unwrap();

    assert!(service.has_profile(&ada).await.unwrap());
    assert!(!service.has_profile(&grace).await.unwrap());
    assert!(matches!(
        service.get_profile(&grace).await.unwrap_err(),
        OnboardingError::Query(QueryError::Absent)
    ));
}

#[tokio::test]
async fn test_reset_wallet_orphans_profile() {
    let app = test_app(test_config(None));
    let service = &app.state.service;
    let user = ada();
    let old = service.provision(&user).unwrap().wallet;
    service.submit(&user, sample_profile()).await.unwrap();

    service.reset_wallet(&user).unwrap();
    let new = service.provision(&user).unwrap();

    assert!(new.created);
    assert_ne!(new.wallet.address, old.address);
    assert!(!service.has_profile(&user).await.unwrap());
    assert!(app.ledger.stored(&old.address).is_some());
}

#[tokio::test]
async fn test_malformed_ledger_values() {
    let app = test_app(test_config(None));
    let service = &app.state.service;
    let user = ada();
    let wallet = service.provision(&user).unwrap().wallet;

    app.ledger.put_raw(&wallet.address, vec![json!("Ada")]);
    assert!(matches!(
        service.get_profile(&user).await.unwrap_err(),
        OnboardingError::Query(QueryError::Shape(_))
    ));

    let dashboard = service.dashboard(&user).await;
    assert!(matches!(dashboard.profile, ProfileState::Error { .. }));

    // The form still opens, as a new submission.
    let state = service.onboarding_state(&user).await.unwrap();
    assert!(!state.editing);
}

#[tokio::test]
async fn test_ledger_recovers_after_outage() {
    let app = test_app(test_config(None));
    let service = &app.state.service;
    let user = ada();
    service.provision(&user).unwrap();
    service.submit(&user, sample_profile()).await.unwrap();

    app.ledger.fail_views("upstream connect error");
    assert!(matches!(
        service.get_profile(&user).await.unwrap_err(),
        OnboardingError::Query(QueryError::Ledger(_))
    ));

    app.ledger.heal();
    assert_eq!(service.get_profile(&user).await.unwrap(), sample_profile());
}
