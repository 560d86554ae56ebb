mod helpers;

use deadline_notifier_api::API_KEY_HEADER;
use deadline_notifier_api_structs::{
    get_reminder_settings, get_service_health, update_reminder_settings,
};
use deadline_notifier_domain::ID;
use helpers::setup::spawn_app;
use reqwest::StatusCode;
use serde_json::json;

#[actix_web::test]
async fn test_status_ok() {
    let app = spawn_app().await;
    let res = app
        .client
        .get(app.url("/"))
        .send()
        .await
        .expect("Expected status request to succeed");
    assert_eq!(res.status(), StatusCode::OK);

    let body = res
        .json::<get_service_health::APIResponse>()
        .await
        .expect("Expected status body");
    let mut jobs = body.jobs.into_iter().map(|j| j.name).collect::<Vec<_>>();
    jobs.sort();
    assert_eq!(jobs, vec!["daily_digest", "reminder_sweep"]);
}

#[actix_web::test]
async fn test_reminder_settings_require_api_key() {
    let app = spawn_app().await;
    let path = format!("/user/{}/reminder-settings", ID::default());

    let res = app.client.get(app.url(&path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .client
        .get(app.url(&path))
        .header(API_KEY_HEADER, "not-the-key")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_get_reminder_settings_creates_defaults() {
    let app = spawn_app().await;
    let user_id = ID::default();

    let res = app
        .client
        .get(app.url(&format!("/user/{}/reminder-settings", user_id)))
        .header(API_KEY_HEADER, app.config.api_secret_key.as_str())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = res
        .json::<get_reminder_settings::APIResponse>()
        .await
        .unwrap();
    assert_eq!(body.settings.user_id, user_id);
    assert!(body.settings.reminders_enabled);
    assert_eq!(
        body.settings.reminder_minutes_before,
        app.config.default_reminder_minutes_before
    );
    assert_eq!(
        body.settings.daily_summary_time,
        app.config
            .default_daily_summary_time
            .format("%H:%M")
            .to_string()
    );
}

#[actix_web::test]
async fn test_update_reminder_settings() {
    let app = spawn_app().await;
    let path = format!("/user/{}/reminder-settings", ID::default());

    let res = app
        .client
        .put(app.url(&path))
        .header(API_KEY_HEADER, app.config.api_secret_key.as_str())
        .json(&json!({
            "remindersEnabled": false,
            "dailySummaryTime": "07:30",
            "reminderMinutesBefore": 15
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res
        .json::<update_reminder_settings::APIResponse>()
        .await
        .unwrap();
    assert!(!body.settings.reminders_enabled);
    assert_eq!(body.settings.daily_summary_time, "07:30");
    assert_eq!(body.settings.reminder_minutes_before, 15);

    // Fields left out are kept
    let res = app
        .client
        .put(app.url(&path))
        .header(API_KEY_HEADER, app.config.api_secret_key.as_str())
        .json(&json!({ "remindersEnabled": true }))
        .send()
        .await
        .unwrap();
    let body = res
        .json::<update_reminder_settings::APIResponse>()
        .await
        .unwrap();
    assert!(body.settings.reminders_enabled);
    assert_eq!(body.settings.reminder_minutes_before, 15);
}

#[actix_web::test]
async fn test_update_reminder_settings_validates_input() {
    let app = spawn_app().await;
    let path = format!("/user/{}/reminder-settings", ID::default());

    for body in &[
        json!({ "dailySummaryTime": "25:00" }),
        json!({ "dailySummaryTime": "9 am" }),
        json!({ "reminderMinutesBefore": 10081 }),
    ] {
        let res = app
            .client
            .put(app.url(&path))
            .header(API_KEY_HEADER, app.config.api_secret_key.as_str())
            .json(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
