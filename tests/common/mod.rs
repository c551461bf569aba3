// tests/common/mod.rs

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use quiz_backend::{
    config::{Config, QuizSettings},
    quiz::{ManualClock, PromptKind, QuestionDefinition, QuizOption, SessionRegistry},
    routes,
    state::AppState,
    store::MemoryStore,
    utils::jwt::sign_jwt,
};

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
    pub sessions: Arc<SessionRegistry>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/quiz{}", self.address, path)
    }
}

/// A question with options `a`..`d`.
pub fn question(id: &str, correct: &str) -> QuestionDefinition {
    QuestionDefinition {
        id: id.to_string(),
        prompt: format!("Question {}", id),
        prompt_kind: PromptKind::Text,
        options: ["a", "b", "c", "d"]
            .iter()
            .map(|o| QuizOption {
                id: o.to_string(),
                text: format!("Option {}", o),
            })
            .collect(),
        correct_option_id: correct.to_string(),
        explanation: Some("Because.".to_string()),
    }
}

pub fn token(learner: &str) -> String {
    sign_jwt(learner, "learner", JWT_SECRET, 600).expect("Failed to sign token")
}

/// Spawns the app on a random port, backed by an in-memory store and a manual clock.
///
/// Assignment "unit-4" holds q1..q4 with correct answers b, c, d, a.
/// Assignment "empty" has no questions.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(
        MemoryStore::new()
            .with_assignment(
                "unit-4",
                vec![
                    question("q1", "b"),
                    question("q2", "c"),
                    question("q3", "d"),
                    question("q4", "a"),
                ],
            )
            .with_assignment("empty", Vec::new()),
    );
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let config = Config {
        database_url: String::new(),
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        log_dir: "logs".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        quiz: QuizSettings {
            tick_interval: Duration::from_millis(20),
            ..QuizSettings::default()
        },
    };

    let state = AppState::new(config, store.clone(), store.clone(), clock.clone());
    let sessions = state.sessions.clone();
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        clock,
        store,
        sessions,
    }
}
