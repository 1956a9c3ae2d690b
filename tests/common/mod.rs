// tests/common/mod.rs

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex, Once,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use zirak_assessment::{api::ZirakApi, dashboard::SkillsDashboard};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
            )
            .with_test_writer()
            .init();
    });
}

/// In-memory stand-in for the platform the client talks to, with knobs for
/// failure injection and counters for call accounting.
#[derive(Default)]
pub struct FakePlatform {
    /// Answer every request with 401 while set.
    pub reject_auth: AtomicBool,
    /// Fail this many catalog fetches with a 500 before recovering.
    pub list_failures: AtomicUsize,
    /// Fail this many submissions with a 500 before recovering.
    pub submit_failures: AtomicUsize,
    /// Fail this many verified-skill additions with a 500 before
    /// recovering.
    pub verify_failures: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    /// Every submission payload the platform received, in order.
    pub submissions: Mutex<Vec<Value>>,
    /// Skills currently verified on the profile.
    pub verified: Mutex<Vec<String>>,
}

impl FakePlatform {
    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Grading key for the fixture tests.
fn answer_key(question_id: &str) -> Option<i64> {
    match question_id {
        "q1" => Some(0),
        "q2" => Some(2),
        "q3" => Some(1),
        "q4" => Some(3),
        _ => None,
    }
}

fn rust_test() -> Value {
    json!({
        "_id": "rust-test-1",
        "title": "Rust Fundamentals",
        "description": "Ownership, borrowing and the type system",
        "skillCategory": "Rust",
        "difficulty": "intermediate",
        "timeLimit": 1,
        "questions": [
            {
                "_id": "q1",
                "text": "Which keyword declares an immutable binding?",
                "options": ["let", "mut", "static", "const"],
                "difficulty": "easy"
            },
            {
                "_id": "q2",
                "text": "What does the ? operator do?",
                "options": ["Panics", "Loops", "Propagates errors", "Spawns a thread"],
                "difficulty": "medium"
            },
            {
                "_id": "q3",
                "text": "How many mutable references may exist at once?",
                "options": ["Unlimited", "One", "Two", "Zero"],
                "difficulty": "medium"
            },
            {
                "_id": "q4",
                "text": "Which trait enables the for loop?",
                "options": ["Display", "Clone", "Send", "Iterator"],
                "difficulty": "hard"
            }
        ]
    })
}

fn js_test() -> Value {
    json!({
        "_id": "js-test-1",
        "title": "JavaScript Basics",
        "description": "Syntax and core concepts",
        "skillCategory": "JavaScript",
        "difficulty": "beginner",
        "timeLimit": 15,
        "questions": [
            {
                "_id": "j1",
                "text": "Which keyword declares a block-scoped variable?",
                "options": ["var", "let", "def", "dim"]
            },
            {
                "_id": "j2",
                "text": "What does JSON stand for?",
                "options": [
                    "JavaScript Object Notation",
                    "Java Source Output Name",
                    "Joined String Object Net",
                    "None of these"
                ]
            }
        ]
    })
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Not authenticated" })),
    )
}

async fn list_tests(State(platform): State<Arc<FakePlatform>>) -> (StatusCode, Json<Value>) {
    if platform.reject_auth.load(Ordering::SeqCst) {
        return unauthorized();
    }
    if FakePlatform::take_failure(&platform.list_failures) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch skill tests" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "completedTests": [
                {
                    "_id": uuid::Uuid::new_v4().to_string(),
                    "testId": {
                        "_id": "js-test-1",
                        "title": "JavaScript Basics",
                        "skillCategory": "JavaScript",
                        "difficulty": "beginner"
                    },
                    "score": 85,
                    "passed": true,
                    "createdAt": "2026-08-01T10:00:00Z"
                }
            ],
            "recommendedTests": [rust_test()],
            "availableTests": [js_test()]
        })),
    )
}

async fn get_test(
    State(platform): State<Arc<FakePlatform>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if platform.reject_auth.load(Ordering::SeqCst) {
        return unauthorized();
    }
    match id.as_str() {
        "rust-test-1" => (
            StatusCode::OK,
            Json(json!({
                "test": rust_test(),
                "hasPreviousAttempt": true,
                "previousScore": 67
            })),
        ),
        "js-test-1" => (
            StatusCode::OK,
            Json(json!({
                "test": js_test(),
                "hasPreviousAttempt": false
            })),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Test not found" })),
        ),
    }
}

fn completion_secs(body: &Value) -> i64 {
    let parse = |key: &str| {
        body[key]
            .as_str()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
    };
    match (parse("startTime"), parse("endTime")) {
        (Some(start), Some(end)) => (end - start).num_seconds().max(0),
        _ => 0,
    }
}

async fn submit_test(
    State(platform): State<Arc<FakePlatform>>,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if platform.reject_auth.load(Ordering::SeqCst) {
        return unauthorized();
    }
    platform.submit_calls.fetch_add(1, Ordering::SeqCst);
    platform.submissions.lock().unwrap().push(body.clone());
    if FakePlatform::take_failure(&platform.submit_failures) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to submit test" })),
        );
    }

    let answers = body["answers"].as_array().cloned().unwrap_or_default();
    let mut correct = 0;
    let mut results = Vec::new();
    for answer in &answers {
        let question_id = answer["questionId"].as_str().unwrap_or_default().to_string();
        let selected = answer["selectedOption"].as_i64().unwrap_or(-1);
        let key = answer_key(&question_id);
        let is_correct = selected >= 0 && key == Some(selected);
        if is_correct {
            correct += 1;
        }
        results.push(json!({
            "questionId": question_id,
            "selectedOption": selected,
            "isCorrect": is_correct,
            "correctAnswer": key,
            "explanation": "See the study guide."
        }));
    }
    let total = answers.len().max(1);
    let score = (correct as f64 / total as f64 * 100.0).round() as i64;

    (
        StatusCode::OK,
        Json(json!({
            "score": score,
            "passed": score >= 70,
            "correctAnswers": correct,
            "totalQuestions": answers.len(),
            "completionTime": completion_secs(&body),
            "results": results
        })),
    )
}

async fn verified_skills(State(platform): State<Arc<FakePlatform>>) -> (StatusCode, Json<Value>) {
    if platform.reject_auth.load(Ordering::SeqCst) {
        return unauthorized();
    }
    let verified = platform.verified.lock().unwrap().clone();
    let records: Vec<Value> = verified
        .iter()
        .map(|skill| {
            json!({
                "_id": uuid::Uuid::new_v4().to_string(),
                "skill": skill,
                "score": 100,
                "verifiedAt": "2026-08-15T12:00:00Z"
            })
        })
        .collect();
    (
        StatusCode::OK,
        Json(json!({
            "verifiedSkills": records,
            "userVerifiedSkills": verified
        })),
    )
}

async fn add_verified_skill(
    State(platform): State<Arc<FakePlatform>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if platform.reject_auth.load(Ordering::SeqCst) {
        return unauthorized();
    }
    platform.verify_calls.fetch_add(1, Ordering::SeqCst);
    if FakePlatform::take_failure(&platform.verify_failures) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to add verified skill" })),
        );
    }
    let skill = match body["skillId"].as_str() {
        Some("rust-test-1") => "Rust",
        Some("js-test-1") => "JavaScript",
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Test not found" })),
            );
        }
    };
    platform.verified.lock().unwrap().push(skill.to_string());
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Skill added to your verified skills",
            "skill": skill
        })),
    )
}

/// Spawns the fake platform on a random port and returns its base URL plus
/// the handle for adjusting knobs mid-test.
pub async fn spawn_platform() -> (String, Arc<FakePlatform>) {
    init_tracing();
    let platform = Arc::new(FakePlatform::default());

    let app = Router::new()
        .route("/api/talent/skills/tests", get(list_tests))
        .route(
            "/api/talent/skills/tests/{id}",
            get(get_test).post(submit_test),
        )
        .route(
            "/api/talent/skills/verified",
            get(verified_skills).post(add_verified_skill),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(platform.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, platform)
}

/// Builds a client for the fake platform.
pub fn api_for(address: &str) -> Arc<ZirakApi> {
    Arc::new(ZirakApi::new(address, "test-token").expect("Failed to build client"))
}

/// Builds a dashboard whose three collaborators all point at the fake
/// platform.
pub fn dashboard_for(address: &str) -> SkillsDashboard {
    let api = api_for(address);
    SkillsDashboard::new(api.clone(), api.clone(), api)
}
