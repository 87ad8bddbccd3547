use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use futures::future::BoxFuture;
use serde_json::{json, Value};
use tower::ServiceExt;

use wod_timer::{
    api::create_router,
    services::{GenerateRequest, LlmError, WorkoutGenerator},
    state::AppState,
    timer::ManualClock,
};

struct FixedGenerator(&'static str);

impl WorkoutGenerator for FixedGenerator {
    fn generate<'a>(&'a self, _request: &'a GenerateRequest) -> BoxFuture<'a, Result<String, LlmError>> {
        let reply = self.0.to_string();
        Box::pin(async move { Ok(reply) })
    }
}

fn app(clock: &ManualClock) -> Router {
    let state = AppState::new(
        0,
        "127.0.0.1".to_string(),
        Arc::new(FixedGenerator("16-Minute EMOM\n1. 12 Burpees\n2. 10 Pull-ups")),
        Arc::new(clock.clone()),
    );
    create_router(Arc::new(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>, user: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(&ManualClock::new());
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["activeTimers"], 0);
}

#[tokio::test]
async fn interval_timer_lifecycle() {
    let clock = ManualClock::new();
    let app = app(&clock);

    let (status, body) = send(
        &app,
        "POST",
        "/api/timers",
        Some(json!({
            "type": "interval",
            "initialMinutes": 10,
            "workoutText": "10-Minute EMOM\n1. 12 Burpees\n2. 15 Box Jumps"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["timer"]["display"], "00:00");
    assert_eq!(body["timer"]["heading"], "Round 1/10");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "POST", &format!("/api/timers/{id}/start"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isRunning"], true);

    clock.advance(75);
    let (_, body) = send(&app, "GET", &format!("/api/timers/{id}"), None, None).await;
    assert_eq!(body["display"], "01:15");
    assert_eq!(body["currentInterval"], 2);
    assert_eq!(body["intervalLabel"], "15 Box Jumps");

    let (_, body) = send(&app, "POST", &format!("/api/timers/{id}/pause"), None, None).await;
    assert_eq!(body["isRunning"], false);
    clock.advance(30);
    let (_, body) = send(&app, "POST", &format!("/api/timers/{id}/reset"), None, None).await;
    assert_eq!(body["totalSeconds"], 0);

    let (status, _) = send(&app, "DELETE", &format!("/api/timers/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, "GET", &format!("/api/timers/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Timer not found");
}

#[tokio::test]
async fn replacing_a_timer_resets_it() {
    let clock = ManualClock::new();
    let app = app(&clock);
    let (_, body) = send(&app, "POST", "/api/timers", Some(json!({ "type": "countup", "initialMinutes": 20 })), None).await;
    let id = body["id"].as_str().unwrap().to_string();

    send(&app, "POST", &format!("/api/timers/{id}/toggle"), None, None).await;
    clock.advance(42);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/timers/{id}"),
        Some(json!({ "timing": { "type": "countdown", "duration": 12, "description": "12-Minute AMRAP" } })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "countdown");
    assert_eq!(body["display"], "12:00");
    assert_eq!(body["isRunning"], false);

    clock.advance(5);
    let (_, body) = send(&app, "GET", &format!("/api/timers/{id}"), None, None).await;
    assert_eq!(body["totalSeconds"], 720);
}

#[tokio::test]
async fn invalid_timer_config_is_rejected() {
    let app = app(&ManualClock::new());
    let (status, body) = send(&app, "POST", "/api/timers", Some(json!({ "type": "countdown", "initialMinutes": 0 })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid timer configuration");
    assert!(body["details"][0].as_str().unwrap().contains("at least one minute"));
}

#[tokio::test]
async fn oversized_timer_config_is_rejected() {
    let app = app(&ManualClock::new());
    let bodies = [
        json!({ "type": "interval", "initialMinutes": 10, "intervalMinutes": 1_073_741_824u32 }),
        json!({ "type": "interval", "initialMinutes": 4_294_967_295u32, "intervalMinutes": 2, "workoutText": "10 Burpees" }),
        json!({ "type": "countup", "initialMinutes": 100_000 }),
        json!({ "timing": {
            "type": "interval",
            "duration": 20,
            "intervals": { "work": 1e12, "rest": 0, "rounds": 1 },
            "description": "Every forever"
        } }),
    ];

    for body in bodies {
        let (status, response) = send(&app, "POST", "/api/timers", Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["details"][0].as_str().unwrap().contains("limit"));
    }

    let (_, health) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(health["activeTimers"], 0);
}

#[tokio::test]
async fn huge_history_offset_is_harmless() {
    let app = app(&ManualClock::new());
    let (status, page) = send(&app, "GET", "/api/workouts?offset=18446744073709551615", None, Some("ana")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["hasMore"], false);
}

#[tokio::test]
async fn generate_parses_plain_text_workout() {
    let app = app(&ManualClock::new());
    let (status, body) = send(&app, "POST", "/api/generateWod", Some(json!({ "workoutFormat": "emom" })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timing"]["type"], "interval");
    assert_eq!(body["timing"]["duration"], 16.0);
    assert_eq!(body["system"]["source"], "parsed");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn workouts_require_a_user() {
    let app = app(&ManualClock::new());
    let (status, body) = send(&app, "GET", "/api/workouts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
async fn saved_workout_history_flow() {
    let app = app(&ManualClock::new());
    let workout = json!({ "workout": { "text": "Fran", "format": "for_time", "difficulty": "advanced" } });

    let (status, _) = send(&app, "POST", "/api/workouts", Some(json!({ "notes": "no workout" })), Some("ana")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, saved) = send(
        &app,
        "POST",
        "/api/workouts",
        Some(json!({ "workout": workout, "actualDuration": 7.5 })),
        Some("ana"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = saved["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/workouts/{id}"),
        Some(json!({ "favorite": true, "rating": 5 })),
        Some("ana"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["favorite"], true);

    let (_, page) = send(&app, "GET", "/api/workouts?favorite=true&formats=for_time", None, Some("ana")).await;
    assert_eq!(page["totalCount"], 1);
    assert_eq!(page["hasMore"], false);

    let (_, page) = send(&app, "GET", "/api/workouts", None, Some("ben")).await;
    assert_eq!(page["totalCount"], 0);

    let (status, _) = send(&app, "DELETE", &format!("/api/workouts/{id}"), None, Some("ben")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/workouts/{id}"), None, Some("ana")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn empty_feedback_is_rejected() {
    let app = app(&ManualClock::new());
    let (status, _) = send(&app, "POST", "/api/feedback", Some(json!({ "feedback": "  " })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/feedback",
        Some(json!({ "email": "a@b.c", "feedback": "Love the EMOM cues" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Feedback received");
}
