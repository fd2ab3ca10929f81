use super::*;

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{post, MethodRouter},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn api_router(handler: MethodRouter) -> Router {
    Router::new()
        .route(PHASES_PATH, handler.clone())
        .route(DOCUMENTS_PATH, handler.clone())
        .route(QUERY_PATH, handler)
}

fn client_for(server_url: String) -> HttpClassifierClient {
    HttpClassifierClient::new(&ClientSettings {
        server_url,
        ..ClientSettings::default()
    })
    .expect("client")
}

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn spawn_recording_server(reply: Value) -> (String, Recorded) {
    let recorded = Recorded::default();
    let sink = recorded.clone();
    let app = api_router(post(move |Json(body): Json<Value>| {
        let sink = sink.clone();
        let reply = reply.clone();
        async move {
            sink.bodies.lock().await.push(body);
            Json(reply)
        }
    }));
    (spawn_server(app).await, recorded)
}

#[tokio::test]
async fn load_phases_posts_project_type_and_keeps_order_and_duplicates() {
    let (url, recorded) =
        spawn_recording_server(json!({"success": true, "phases": ["Design", "Build", "Design"]}))
            .await;

    let phases = client_for(url).load_phases("Construction").await.expect("phases");

    assert_eq!(phases, vec!["Design", "Build", "Design"]);
    assert_eq!(
        recorded.bodies.lock().await.as_slice(),
        &[json!({"project_type": "Construction"})]
    );
}

#[tokio::test]
async fn load_documents_posts_both_keys() {
    let (url, recorded) =
        spawn_recording_server(json!({"success": true, "documents": ["Contract"]})).await;

    let documents = client_for(url)
        .load_documents("Construction", "Design")
        .await
        .expect("documents");

    assert_eq!(documents, vec!["Contract"]);
    assert_eq!(
        recorded.bodies.lock().await.as_slice(),
        &[json!({"project_type": "Construction", "project_phase": "Design"})]
    );
}

#[tokio::test]
async fn rejected_and_malformed_option_responses_map_to_load_errors() {
    let (url, _) = spawn_recording_server(json!({"success": false})).await;
    let err = client_for(url).load_phases("Construction").await.expect_err("must fail");
    assert_eq!(err, LoadError::Rejected(None));
    assert_eq!(err.placeholder(), "load failed");

    let (url, _) = spawn_recording_server(json!({"success": true})).await;
    let err = client_for(url).load_phases("Construction").await.expect_err("must fail");
    assert!(matches!(err, LoadError::Malformed(_)), "unexpected: {err:?}");

    let app = api_router(post(|| async { "<html>oops</html>" }));
    let url = spawn_server(app).await;
    let err = client_for(url)
        .load_documents("Construction", "Design")
        .await
        .expect_err("must fail");
    assert!(matches!(err, LoadError::Malformed(_)), "unexpected: {err:?}");
    assert_eq!(err.placeholder(), "load failed");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = client_for(format!("http://{addr}"));
    let err = client.load_phases("Construction").await.expect_err("must fail");
    assert!(matches!(err, LoadError::Transport(_)), "unexpected: {err:?}");
    assert_eq!(err.placeholder(), "load error");

    let err = client
        .classify(&sample_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClassificationError::Transport(_)));
    assert_eq!(err.marker(), "query error");
}

fn sample_request() -> ClassifyRequest {
    ClassifyRequest {
        project_type: "Construction".to_string(),
        project_phase: "Design".to_string(),
        document_name: "Contract".to_string(),
        amount: "1200000".to_string(),
    }
}

#[tokio::test]
async fn classify_returns_level_and_raw_steps() {
    let (url, recorded) = spawn_recording_server(json!({
        "success": true,
        "result_level": "Level A",
        "flowchart": {"steps": [["Engineer", "Review"], ["X"]]}
    }))
    .await;

    let result = client_for(url).classify(&sample_request()).await.expect("classify");

    assert_eq!(result.result_level, "Level A");
    assert_eq!(result.steps, Some(json!([["Engineer", "Review"], ["X"]])));
    assert_eq!(
        recorded.bodies.lock().await.as_slice(),
        &[json!({
            "project_type": "Construction",
            "project_phase": "Design",
            "document_name": "Contract",
            "amount": "1200000"
        })]
    );
}

#[tokio::test]
async fn classify_without_flowchart_yields_absent_steps() {
    let (url, _) =
        spawn_recording_server(json!({"success": true, "result_level": "Level C"})).await;
    let result = client_for(url).classify(&sample_request()).await.expect("classify");
    assert_eq!(result.steps, None);
}

#[tokio::test]
async fn classify_reads_failure_body_even_with_error_status() {
    let app = api_router(post(|| async {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "amount is not a number"})),
        )
            .into_response()
    }));
    let url = spawn_server(app).await;

    let err = client_for(url)
        .classify(&sample_request())
        .await
        .expect_err("must fail");

    assert_eq!(
        err,
        ClassificationError::Rejected {
            message: "amount is not a number".to_string()
        }
    );
    assert_eq!(err.marker(), "query failed");
}

#[tokio::test]
async fn configured_timeout_surfaces_as_transport_failure() {
    let app = api_router(post(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(json!({"success": true, "phases": []}))
    }));
    let url = spawn_server(app).await;
    let client = HttpClassifierClient::new(&ClientSettings {
        server_url: url,
        request_timeout: Some(Duration::from_millis(200)),
        ..ClientSettings::default()
    })
    .expect("client");

    let err = client.load_phases("Construction").await.expect_err("must time out");
    assert!(matches!(err, LoadError::Transport(_)), "unexpected: {err:?}");
}

struct CountingBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl ClassifierBackend for CountingBackend {
    async fn load_phases(&self, project_type: &str) -> Result<Vec<String>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![format!("{project_type} phase")])
    }

    async fn load_documents(
        &self,
        project_type: &str,
        project_phase: &str,
    ) -> Result<Vec<String>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![format!("{project_type}/{project_phase} doc")])
    }

    async fn classify(
        &self,
        request: &ClassifyRequest,
    ) -> Result<ClassificationResult, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ClassificationResult {
            result_level: format!("level for {}", request.document_name),
            steps: Some(json!([["Engineer", "Review"]])),
        })
    }
}

#[tokio::test]
async fn controller_loads_drive_through_a_backend_end_to_end() {
    let backend = CountingBackend {
        calls: AtomicUsize::new(0),
    };
    let mut controller = SelectionController::new(vec!["Construction".to_string()]);

    let load = controller
        .change_project_type("Construction")
        .expect("type")
        .expect("phase load");
    let response = run_load(&backend, load).await;
    assert!(controller.apply_phases(response.ticket, response.result));

    let load = controller
        .change_project_phase("Construction phase")
        .expect("phase")
        .expect("document load");
    let response = run_load(&backend, load).await;
    assert!(controller.apply_documents(response.ticket, response.result));

    controller
        .change_document_name("Construction/Construction phase doc")
        .expect("document");
    assert_eq!(
        controller.submit().expect_err("amount missing"),
        ValidationError::MissingAmount
    );
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);

    controller.set_amount("10");
    let submission = controller.submit().expect("submission");
    let (ticket, result) = run_submission(&backend, submission).await;
    let outcome = controller
        .apply_classification(ticket, result)
        .expect("current submission");

    assert_eq!(
        outcome.result_label,
        "level for Construction/Construction phase doc"
    );
    assert_eq!(outcome.steps, Some(json!([["Engineer", "Review"]])));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
}
