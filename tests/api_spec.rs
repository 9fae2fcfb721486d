use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use railsecure::advisories::AdvisorySource;
use railsecure::api::{create_router, AppState};
use railsecure::error::ExternalServiceError;
use railsecure::generation::{GenerationRequest, TextGenerator};
use railsecure::models::*;
use railsecure::session::SessionRegistry;
use serde_json::json;

const QUIZ_TEXT: &str = "\
Question: Within how many hours must an early warning be sent under NIS2?
A: 12
B: 24
C: 48
D: 72
Correct Answer: B
Explanation: NIS2 requires an early warning within 24 hours.
---END_QUESTION---
Question: Which law gives further effect to GDPR in Ireland?
A: Data Protection Act 2018
B: Companies Act 2014
C: Railway Safety Act 2005
D: Freedom of Information Act 2014
Correct Answer: A
Explanation: The Data Protection Act 2018 implements GDPR in Irish law.
---END_QUESTION---
";

/// Generator that replays scripted replies, then echoes a default.
#[derive(Default)]
struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, ExternalServiceError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    fn replying(replies: Vec<Result<String, ExternalServiceError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ExternalServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Generated text".to_string()))
    }
}

/// Generator whose first reply arrives only after later ones.
#[derive(Default)]
struct SlowFirstGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for SlowFirstGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ExternalServiceError> {
        match self.calls.fetch_add(1, Ordering::SeqCst) {
            0 => {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok("first".to_string())
            }
            _ => Ok("second".to_string()),
        }
    }
}

struct FixedAdvisories {
    fail: bool,
}

#[async_trait]
impl AdvisorySource for FixedAdvisories {
    async fn recent(
        &self,
        window_days: u32,
        limit: usize,
    ) -> Result<Vec<Advisory>, ExternalServiceError> {
        if self.fail {
            return Err(ExternalServiceError::RateLimited("NVD returned 403".to_string()));
        }
        let advisory = |n: u32| Advisory {
            identifier: format!("CVE-2025-000{}", n),
            description: format!("Issue {} within {} days", n, window_days),
            published: Some(Utc.with_ymd_and_hms(2025, 3, n, 12, 0, 0).unwrap()),
            severity_score: Some(7.5),
            severity: Some("HIGH".to_string()),
            vector: None,
            url: format!("https://nvd.nist.gov/vuln/detail/CVE-2025-000{}", n),
        };
        Ok((1..=9).rev().map(advisory).take(limit).collect())
    }
}

fn base_state() -> AppState {
    AppState::new(SessionRegistry::new(), Arc::new(FixedAdvisories { fail: false }))
}

fn setup_with(generator: Arc<ScriptedGenerator>) -> TestServer {
    let app = create_router(base_state().with_generator(generator));
    TestServer::new(app).expect("Failed to create test server")
}

fn setup() -> TestServer {
    setup_with(Arc::new(ScriptedGenerator::default()))
}

async fn open_session(server: &TestServer) -> SessionInfo {
    server.post("/api/v1/sessions").await.json::<SessionInfo>()
}

mod health_and_catalogue {
    use super::*;

    #[tokio::test]
    async fn health_reports_generation_availability() {
        let server = TestServer::new(create_router(base_state())).unwrap();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["generation_available"], false);
    }

    #[tokio::test]
    async fn lists_modules_with_pick_lists() {
        let server = setup();

        let modules: Vec<serde_json::Value> = server.get("/api/v1/modules").await.json();

        let scenario = modules.iter().find(|m| m["id"] == "scenario").unwrap();
        assert_eq!(scenario["choices"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn serves_static_content_by_topic() {
        let server = setup();

        let response = server.get("/api/v1/content/cvss_scale").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["entries"].as_array().unwrap().len(), 5);

        server
            .get("/api/v1/content/timetables")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

mod sessions {
    use super::*;

    #[tokio::test]
    async fn creates_and_snapshots_an_empty_session() {
        let server = setup();

        let response = server.post("/api/v1/sessions").await;
        response.assert_status(StatusCode::CREATED);
        let info: SessionInfo = response.json();

        let snapshot: SessionSnapshot = server
            .get(&format!("/api/v1/sessions/{}", info.id))
            .await
            .json();
        assert_eq!(snapshot.session.id, info.id);
        assert!(snapshot.slots.is_empty());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let server = setup();
        let id = uuid::Uuid::new_v4();

        server
            .get(&format!("/api/v1/sessions/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .post(&format!("/api/v1/sessions/{}/compliance/ask", id))
            .json(&json!({ "query": "What is NIS2?" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ended_session_is_gone() {
        let server = setup();
        let info = open_session(&server).await;

        server
            .delete(&format!("/api/v1/sessions/{}", info.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/v1/sessions/{}", info.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unwritten_slot_reads_as_unrequested() {
        let server = setup();
        let info = open_session(&server).await;

        let item: GeneratedItem = server
            .get(&format!("/api/v1/sessions/{}/slots/scenario/current", info.id))
            .await
            .json();

        assert_eq!(item.status(), ItemStatus::Unrequested);
    }

    #[tokio::test]
    async fn sessions_do_not_share_slots() {
        let server = setup();
        let first = open_session(&server).await;
        let second = open_session(&server).await;

        server
            .post(&format!("/api/v1/sessions/{}/reference/ask", first.id))
            .json(&json!({ "query": "What does IEC 62443 cover?" }))
            .await
            .assert_status_ok();

        let item: GeneratedItem = server
            .get(&format!("/api/v1/sessions/{}/slots/reference/answer", second.id))
            .await
            .json();
        assert_eq!(item.status(), ItemStatus::Unrequested);
    }

    #[tokio::test]
    async fn clearing_a_slot_resets_it() {
        let server = setup();
        let info = open_session(&server).await;
        server
            .post(&format!("/api/v1/sessions/{}/compliance/ask", info.id))
            .json(&json!({ "query": "GDPR breach deadline?" }))
            .await;

        server
            .delete(&format!("/api/v1/sessions/{}/slots/compliance/answer", info.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let item: GeneratedItem = server
            .get(&format!("/api/v1/sessions/{}/slots/compliance/answer", info.id))
            .await
            .json();
        assert_eq!(item, GeneratedItem::default());
    }

    #[tokio::test]
    async fn clearing_a_module_resets_all_its_slots() {
        let server = setup();
        let info = open_session(&server).await;
        server
            .post(&format!("/api/v1/sessions/{}/phishing/sample", info.id))
            .json(&json!({ "email_type": "Supplier Invoice Notification" }))
            .await;
        server
            .post(&format!("/api/v1/sessions/{}/phishing/analysis", info.id))
            .json(&json!({ "email_text": "From: it@irishrail-support.com\nSubject: Reset" }))
            .await;

        server
            .delete(&format!("/api/v1/sessions/{}/modules/phishing", info.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let snapshot: SessionSnapshot = server
            .get(&format!("/api/v1/sessions/{}", info.id))
            .await
            .json();
        assert!(snapshot.slots.is_empty());
    }
}

mod generation {
    use super::*;

    #[tokio::test]
    async fn stores_generated_content_in_the_slot() {
        let generator = ScriptedGenerator::replying(vec![Ok("Subject: Payroll issue".to_string())]);
        let server = setup_with(generator.clone());
        let info = open_session(&server).await;

        let response = server
            .post(&format!("/api/v1/sessions/{}/phishing/sample", info.id))
            .json(&json!({ "email_type": "HR Policy Update / Payroll Issue" }))
            .await;

        response.assert_status_ok();
        let item: GeneratedItem = response.json();
        assert_eq!(item.status(), ItemStatus::Ready);
        assert_eq!(item.content(), Some("Subject: Payroll issue"));

        let sent = generator.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].temperature, 0.75);
        assert!(sent[0].prompt.user.contains("HR Policy Update / Payroll Issue"));
    }

    #[tokio::test]
    async fn service_failure_leaves_a_retryable_failed_slot() {
        let generator = ScriptedGenerator::replying(vec![
            Err(ExternalServiceError::Timeout),
            Ok("A ransomware scenario".to_string()),
        ]);
        let server = setup_with(generator);
        let info = open_session(&server).await;
        let path = format!("/api/v1/sessions/{}/scenario", info.id);
        let body = json!({ "category": "Ransomware Attack on Corporate Network" });

        let failed: GeneratedItem = server.post(&path).json(&body).await.json();
        assert_eq!(failed.status(), ItemStatus::Failed);
        assert!(failed.failure_reason().unwrap().contains("too long"));

        let retried = server.post(&path).json(&body).await;
        retried.assert_status_ok();
        assert_eq!(retried.json::<GeneratedItem>().content(), Some("A ransomware scenario"));
    }

    #[tokio::test]
    async fn unknown_choice_is_bad_input() {
        let server = setup();
        let info = open_session(&server).await;

        server
            .post(&format!("/api/v1/sessions/{}/incident_response/guide", info.id))
            .json(&json!({ "category": "Alien invasion" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_question_is_bad_input() {
        let server = setup();
        let info = open_session(&server).await;

        server
            .post(&format!("/api/v1/sessions/{}/compliance/ask", info.id))
            .json(&json!({ "query": "   " }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unavailable_without_a_generator() {
        let server = TestServer::new(create_router(base_state())).unwrap();
        let info = open_session(&server).await;

        server
            .post(&format!("/api/v1/sessions/{}/reference/ask", info.id))
            .json(&json!({ "query": "What is CER?" }))
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let item: GeneratedItem = server
            .get(&format!("/api/v1/sessions/{}/slots/reference/answer", info.id))
            .await
            .json();
        assert_eq!(item.status(), ItemStatus::Unrequested);
    }

    #[tokio::test]
    async fn overlapping_requests_settle_on_the_latest() {
        let state = base_state().with_generator(Arc::new(SlowFirstGenerator::default()));
        let server = TestServer::new(create_router(state)).unwrap();
        let info = open_session(&server).await;
        let path = format!("/api/v1/sessions/{}/scenario", info.id);
        let body = json!({ "category": "Ransomware Attack on Corporate Network" });

        let earlier = async { server.post(&path).json(&body).await };
        let later = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            server.post(&path).json(&body).await
        };
        let (earlier, later) = tokio::join!(earlier, later);

        later.assert_status_ok();
        assert_eq!(later.json::<GeneratedItem>().content(), Some("second"));
        earlier.assert_status_ok();
        assert_eq!(earlier.json::<GeneratedItem>().content(), Some("second"));

        let item: GeneratedItem = server
            .get(&format!("/api/v1/sessions/{}/slots/scenario/current", info.id))
            .await
            .json();
        assert_eq!(item.status(), ItemStatus::Ready);
        assert_eq!(item.content(), Some("second"));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found_even_without_a_generator() {
        let server = TestServer::new(create_router(base_state())).unwrap();

        server
            .post(&format!("/api/v1/sessions/{}/reference/ask", uuid::Uuid::new_v4()))
            .json(&json!({ "query": "What is CER?" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_session_does_not_spend_rate_budget() {
        let state = base_state()
            .with_generator(Arc::new(ScriptedGenerator::default()))
            .with_generation_rate_limit(1);
        let limiter = state.limiter.clone().unwrap();
        let server = TestServer::new(create_router(state)).unwrap();
        let missing = uuid::Uuid::new_v4();
        let body = json!({ "query": "What is NIS2?" });

        for _ in 0..3 {
            server
                .post(&format!("/api/v1/sessions/{}/compliance/ask", missing))
                .json(&body)
                .await
                .assert_status(StatusCode::NOT_FOUND);
        }
        assert!(limiter.check(missing));
    }

    #[tokio::test]
    async fn generation_is_rate_limited_per_session() {
        let state = base_state()
            .with_generator(Arc::new(ScriptedGenerator::default()))
            .with_generation_rate_limit(2);
        let server = TestServer::new(create_router(state)).unwrap();
        let first = open_session(&server).await;
        let second = open_session(&server).await;
        let ask = |id: uuid::Uuid| format!("/api/v1/sessions/{}/compliance/ask", id);
        let body = json!({ "query": "What is NIS2?" });

        server.post(&ask(first.id)).json(&body).await.assert_status_ok();
        server.post(&ask(first.id)).json(&body).await.assert_status_ok();
        server
            .post(&ask(first.id))
            .json(&body)
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);

        server.post(&ask(second.id)).json(&body).await.assert_status_ok();
    }
}

mod user_responses {
    use super::*;

    #[tokio::test]
    async fn responding_before_content_exists_conflicts() {
        let server = setup();
        let info = open_session(&server).await;

        server
            .post(&format!("/api/v1/sessions/{}/scenario/response", info.id))
            .json(&json!({ "strategy": "Isolate the affected segment" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        let item: GeneratedItem = server
            .get(&format!("/api/v1/sessions/{}/slots/scenario/current", info.id))
            .await
            .json();
        assert_eq!(item.status(), ItemStatus::Unrequested);
    }

    #[tokio::test]
    async fn evaluates_the_explanation_against_the_sample() {
        let generator = ScriptedGenerator::replying(vec![
            Ok("Subject: Urgent IT alert\nFrom: it@irishrail-securelogin.com".to_string()),
            Ok("Good catch on the domain.".to_string()),
        ]);
        let server = setup_with(generator.clone());
        let info = open_session(&server).await;

        server
            .post(&format!("/api/v1/sessions/{}/phishing/sample", info.id))
            .json(&json!({ "email_type": "Urgent IT Security Alert" }))
            .await
            .assert_status_ok();

        let response = server
            .post(&format!("/api/v1/sessions/{}/phishing/sample/explanation", info.id))
            .json(&json!({ "explanation": "The sender domain is a look-alike" }))
            .await;

        response.assert_status_ok();
        let item: GeneratedItem = response.json();
        assert_eq!(item.user_response.as_deref(), Some("The sender domain is a look-alike"));
        let evaluation = item.evaluation.expect("evaluation present");
        assert_eq!(evaluation.content(), Some("Good catch on the domain."));

        let sent = generator.requests();
        assert!(sent[1].prompt.user.contains("irishrail-securelogin.com"));
        assert!(sent[1].prompt.user.contains("look-alike"));
    }

    #[tokio::test]
    async fn failed_evaluation_keeps_the_response() {
        let generator = ScriptedGenerator::replying(vec![
            Ok("A signalling incident".to_string()),
            Err(ExternalServiceError::RateLimited("quota".to_string())),
        ]);
        let server = setup_with(generator);
        let info = open_session(&server).await;
        server
            .post(&format!("/api/v1/sessions/{}/scenario", info.id))
            .json(&json!({ "category": "Signalling System Compromise (OT)" }))
            .await;

        let item: GeneratedItem = server
            .post(&format!("/api/v1/sessions/{}/scenario/response", info.id))
            .json(&json!({ "strategy": "Switch to manual signalling" }))
            .await
            .json();

        assert_eq!(item.status(), ItemStatus::Ready);
        assert_eq!(item.user_response.as_deref(), Some("Switch to manual signalling"));
        assert_eq!(item.evaluation.map(|e| e.status()), Some(ItemStatus::Failed));
    }

    #[tokio::test]
    async fn generic_response_endpoint_rejects_blank_text() {
        let server = setup();
        let info = open_session(&server).await;
        server
            .post(&format!("/api/v1/sessions/{}/compliance/ask", info.id))
            .json(&json!({ "query": "GDPR?" }))
            .await;

        server
            .post(&format!("/api/v1/sessions/{}/slots/compliance/answer/response", info.id))
            .json(&json!({ "text": "  " }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let item: GeneratedItem = server
            .post(&format!("/api/v1/sessions/{}/slots/compliance/answer/response", info.id))
            .json(&json!({ "text": "Thanks, that helped" }))
            .await
            .json();
        assert_eq!(item.user_response.as_deref(), Some("Thanks, that helped"));
    }
}

mod quiz {
    use super::*;

    #[tokio::test]
    async fn generates_parses_and_grades_a_quiz() {
        let generator = ScriptedGenerator::replying(vec![Ok(QUIZ_TEXT.to_string())]);
        let server = setup_with(generator.clone());
        let info = open_session(&server).await;

        let view: QuizView = server
            .post(&format!("/api/v1/sessions/{}/quiz", info.id))
            .json(&json!({ "num_questions": 2 }))
            .await
            .json();
        assert_eq!(view.item.status(), ItemStatus::Ready);
        assert_eq!(view.questions.len(), 2);
        assert!(view.grade.is_none());
        assert_eq!(generator.requests()[0].max_tokens, 600);

        let graded: QuizView = server
            .post(&format!("/api/v1/sessions/{}/quiz/answers", info.id))
            .json(&json!({ "answers": { "0": "B", "1": "C" } }))
            .await
            .json();
        let grade = graded.grade.expect("graded");
        assert_eq!(grade.correct, 1);
        assert_eq!(grade.total, 2);
        assert_eq!(grade.percentage, 50);

        let reread: QuizView = server
            .get(&format!("/api/v1/sessions/{}/quiz", info.id))
            .await
            .json();
        assert_eq!(reread.grade.map(|g| g.correct), Some(1));
    }

    #[tokio::test]
    async fn unstructured_output_fails_the_slot() {
        let generator =
            ScriptedGenerator::replying(vec![Ok("Sure! Here are some fun facts.".to_string())]);
        let server = setup_with(generator);
        let info = open_session(&server).await;

        let view: QuizView = server
            .post(&format!("/api/v1/sessions/{}/quiz", info.id))
            .json(&json!({}))
            .await
            .json();

        assert_eq!(view.item.status(), ItemStatus::Failed);
        assert!(view.questions.is_empty());
    }

    #[tokio::test]
    async fn rejects_out_of_range_question_counts() {
        let server = setup();
        let info = open_session(&server).await;

        server
            .post(&format!("/api/v1/sessions/{}/quiz", info.id))
            .json(&json!({ "num_questions": 10 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn answering_without_a_quiz_conflicts() {
        let server = setup();
        let info = open_session(&server).await;

        server
            .post(&format!("/api/v1/sessions/{}/quiz/answers", info.id))
            .json(&json!({ "answers": { "0": "A" } }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}

mod tools {
    use super::*;

    #[tokio::test]
    async fn lists_advisories_with_defaults() {
        let server = setup();

        let listing: AdvisoryListing = server.get("/api/v1/advisories").await.json();

        assert_eq!(listing.window_days, 30);
        assert_eq!(listing.advisories.len(), 5);
        assert_eq!(listing.advisories[0].identifier, "CVE-2025-0009");
    }

    #[tokio::test]
    async fn clamps_the_advisory_window() {
        let server = setup();

        let listing: AdvisoryListing = server
            .get("/api/v1/advisories")
            .add_query_param("window_days", 365)
            .add_query_param("limit", 2)
            .await
            .json();

        assert_eq!(listing.window_days, 120);
        assert_eq!(listing.advisories.len(), 2);
    }

    #[tokio::test]
    async fn advisory_failure_is_a_bad_gateway() {
        let state = AppState::new(SessionRegistry::new(), Arc::new(FixedAdvisories { fail: true }));
        let server = TestServer::new(create_router(state)).unwrap();

        server
            .get("/api/v1/advisories")
            .await
            .assert_status(StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn generates_a_password_of_the_requested_length() {
        let server = setup();

        let generated: GeneratedPassword = server
            .post("/api/v1/password/generate")
            .json(&json!({ "length": 20, "symbols": false }))
            .await
            .json();

        assert_eq!(generated.password.chars().count(), 20);
        assert!(generated.password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn scores_a_weak_password() {
        let server = setup();

        let report: StrengthReport = server
            .post("/api/v1/password/strength")
            .json(&json!({ "candidate": "password" }))
            .await
            .json();

        assert!(report.score <= 1);
        assert!(!report.feedback.is_empty());
    }
}

mod security_auth {
    use super::*;

    fn setup_with_auth(api_key: &str) -> TestServer {
        let app = create_router(base_state().with_api_key(api_key));
        TestServer::new(app).expect("Failed to create test server")
    }

    #[tokio::test]
    async fn health_endpoint_is_accessible_without_auth() {
        let server = setup_with_auth("test-secret-key");

        server.get("/api/v1/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn protected_endpoint_requires_auth() {
        let server = setup_with_auth("test-secret-key");

        server
            .post("/api/v1/sessions")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_endpoint_accepts_valid_bearer_token() {
        let server = setup_with_auth("test-secret-key");

        server
            .post("/api/v1/sessions")
            .add_header("Authorization", "Bearer test-secret-key")
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn protected_endpoint_rejects_invalid_bearer_token() {
        let server = setup_with_auth("test-secret-key");

        server
            .get("/api/v1/modules")
            .add_header("Authorization", "Bearer wrong-key")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
