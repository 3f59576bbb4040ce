use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use helpdesk_chat::backend::{check_health, HttpBackend, RagBackend};
use helpdesk_chat::config::{parse_base_url, WidgetConfig};
use helpdesk_chat::errors::BackendError;
use helpdesk_chat::escalation::EscalationStage;
use helpdesk_chat::models::escalation::{EscalationForm, EscalationRequest, FormField};
use helpdesk_chat::render::render_message;
use helpdesk_chat::widget::{ChatWidget, EMAIL_SENT_TEXT};

#[derive(Clone, Default)]
struct Recorded {
    chat: Arc<Mutex<Vec<Value>>>,
    escalate: Arc<Mutex<Vec<Value>>>,
}

async fn chat_handler(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    rec.chat.lock().unwrap().push(body);
    Json(json!({ "answer": "**Hi** there\n1. Open the portal" }))
}

async fn escalate_handler(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    rec.escalate.lock().unwrap().push(body);
    Json(json!({
        "to": "helpdesk@uni.example",
        "cc": "ada@uni.example",
        "subject": "Enrolment question",
        "body": "{\"body\": \"Hello\\nWorld\"}"
    }))
}

async fn failing_handler() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

fn stub_router(rec: Recorded) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/escalate", post(escalate_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(rec)
}

fn failing_router() -> Router {
    Router::new()
        .route("/api/chat", post(failing_handler))
        .route("/api/escalate", post(failing_handler))
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn backend_for(base: &str) -> HttpBackend {
    HttpBackend::new(parse_base_url(base).unwrap()).unwrap()
}

fn sample_request() -> EscalationRequest {
    let mut form = EscalationForm::default();
    form.set(FormField::Name, "Ada");
    form.set(FormField::Surname, "Lovelace");
    form.set(FormField::StudentId, "123456");
    EscalationRequest::from_form(&form, "How do I enrol?", "Use the portal.").unwrap()
}

#[tokio::test]
async fn chat_posts_query_and_returns_answer() {
    let rec = Recorded::default();
    let base = serve(stub_router(rec.clone())).await;

    let answer = backend_for(&base).chat("hello").await.unwrap();

    assert_eq!(answer, "**Hi** there\n1. Open the portal");
    assert_eq!(rec.chat.lock().unwrap().as_slice(), &[json!({ "query": "hello" })]);
}

#[tokio::test]
async fn escalate_sends_wire_fields() {
    let rec = Recorded::default();
    let base = serve(stub_router(rec.clone())).await;

    let preview = backend_for(&base).escalate(&sample_request()).await.unwrap();

    assert_eq!(preview.to.as_deref(), Some("helpdesk@uni.example"));
    let sent = rec.escalate.lock().unwrap()[0].clone();
    assert_eq!(
        sent,
        json!({
            "query": "How do I enrol?",
            "name": "Ada",
            "surname": "Lovelace",
            "student_id": "123456",
            "email": "",
            "rag_answer": "Use the portal."
        })
    );
}

#[tokio::test]
async fn non_success_status_is_a_server_error() {
    let base = serve(failing_router()).await;
    let backend = backend_for(&base);

    let err = backend.chat("hello").await.unwrap_err();
    assert!(matches!(err, BackendError::Server { status: 500 }));
    assert_eq!(err.to_string(), "Server error: 500");

    let err = backend.escalate(&sample_request()).await.unwrap_err();
    assert_eq!(err.to_string(), "Server error: 500");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = backend_for(&format!("http://{}", addr))
        .chat("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn health_endpoint_status() {
    let healthy = serve(stub_router(Recorded::default())).await;
    assert!(backend_for(&healthy).health().await.is_ok());

    let missing = serve(failing_router()).await;
    assert!(matches!(
        backend_for(&missing).health().await,
        Err(BackendError::Server { status: 404 })
    ));
}

/// Accepts connections and keeps them open without ever writing a byte.
async fn serve_silently() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn health_gives_up_on_a_silent_backend() {
    let base = serve_silently().await;
    let backend = backend_for(&base).with_health_timeout(Duration::from_millis(200));

    let result = tokio::time::timeout(Duration::from_secs(5), backend.health())
        .await
        .expect("health() must finish on its own timeout");
    assert!(matches!(result, Err(BackendError::Transport(_))));
}

#[tokio::test]
async fn startup_health_check_returns_when_backend_never_answers() {
    let base = serve_silently().await;
    let backend = backend_for(&base);

    let healthy = tokio::time::timeout(
        Duration::from_secs(5),
        check_health(&backend, Duration::from_millis(200)),
    )
    .await
    .expect("startup health check must not block the session");
    assert!(!healthy);
}

#[tokio::test]
async fn full_escalation_round_trip_over_http() {
    let rec = Recorded::default();
    let base = serve(stub_router(rec.clone())).await;
    let mut config = WidgetConfig::new(&base).unwrap();
    config.send_delay = Duration::from_millis(10);
    let backend = Arc::new(backend_for(&base));
    let (mut widget, _events) = ChatWidget::new(backend, &config);

    assert!(widget.submit_question("How do I enrol?").await);
    let rendered = render_message(&widget.messages()[1]);
    assert!(rendered.contains("<strong>Hi</strong> there"));
    assert!(rendered.contains("<br>• Open the portal"));
    assert!(!rendered.contains("**"));

    widget.accept_escalation().unwrap();
    widget.set_form_field(FormField::Name, "Ada").unwrap();
    widget.set_form_field(FormField::Surname, "Lovelace").unwrap();
    widget.set_form_field(FormField::StudentId, "123456").unwrap();
    widget.set_form_field(FormField::Email, "ada@uni.example").unwrap();
    widget.submit_escalation().await.unwrap();

    let preview = widget.escalation_view().preview.unwrap();
    assert_eq!(preview.body_lines(), vec!["Hello", "World"]);
    assert_eq!(preview.subject, "Enrolment question");
    assert_eq!(
        rec.escalate.lock().unwrap()[0]["rag_answer"],
        "**Hi** there\n1. Open the portal"
    );

    widget.send_email().await.unwrap();
    assert_eq!(widget.escalation_stage(), EscalationStage::Idle);
    assert_eq!(widget.messages().last().unwrap().text, EMAIL_SENT_TEXT);
    assert_eq!(rec.chat.lock().unwrap().len(), 1);
    assert_eq!(rec.escalate.lock().unwrap().len(), 1);
}
