use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, App, HttpRequest, HttpServer, HttpResponse, Result as ActixResult};
use actix_cors::Cors;
use cropknn_core::{Error, KnnClassifier, Measurements, PredictionResult, RecommendationStats};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct RecommendRequest {
    query: Measurements,
    k: Option<i64>,
}

#[derive(Deserialize)]
struct BatchRecommendRequest {
    queries: Vec<Measurements>,
    k: Option<i64>,
}

#[derive(Serialize)]
struct RecommendResponse {
    result: Vec<PredictionResult>,
    narration: Option<String>,
    stats: RecommendationStats,
}

#[derive(Serialize)]
#[serde(untagged)]
enum BatchEntry {
    Ok { result: Vec<PredictionResult> },
    Err { error: String },
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        classifier: Arc<KnnClassifier>,
        host: String,
        port: u16,
    ) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(classifier.clone()))
                .configure(Self::configure)
        })
        .bind((host.as_str(), port))?
        .run()
        .await
    }

    /// Run the server on a fresh actix system, blocking the calling thread
    /// until it stops. Bind failures are returned, not logged.
    pub fn run_blocking(
        classifier: Arc<KnnClassifier>,
        host: String,
        port: u16,
    ) -> std::io::Result<()> {
        let sys = actix_web::rt::System::new();
        sys.block_on(Self::start(classifier, host, port))
    }

    /// Register all routes. Expects `web::Data<Arc<KnnClassifier>>` app data.
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::JsonConfig::default().error_handler(json_error))
            .route("/health", web::get().to(health))
            .route("/dataset", web::get().to(list_dataset))
            .route("/dataset/labels", web::get().to(list_labels))
            .route("/recommend", web::post().to(recommend))
            .route("/recommend/batch", web::post().to(recommend_batch));
    }
}

/// Resolve the requested neighbor count against the server default
fn resolve_k(requested: Option<i64>, default: usize) -> Result<usize, Error> {
    match requested {
        None => Ok(default),
        Some(k) if k <= 0 => Err(Error::invalid_input("k must be a positive integer")),
        Some(k) => Ok(usize::try_from(k).unwrap_or(usize::MAX)),
    }
}

fn bad_request(e: &Error) -> HttpResponse {
    warn!("Rejected request: {}", e);
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": e.to_string()
    }))
}

/// Malformed or incomplete JSON bodies get the same `{"error": ...}` envelope
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid input: {}", err);
    warn!("Rejected request: {}", message);
    let response = HttpResponse::BadRequest().json(serde_json::json!({
        "error": message
    }));
    InternalError::from_response(err, response).into()
}

async fn health(
    classifier: web::Data<Arc<KnnClassifier>>,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "dataset_size": classifier.dataset().len(),
    })))
}

async fn list_dataset(
    classifier: web::Data<Arc<KnnClassifier>>,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": classifier.dataset()
    })))
}

async fn list_labels(
    classifier: web::Data<Arc<KnnClassifier>>,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": classifier.dataset().labels()
    })))
}

async fn recommend(
    classifier: web::Data<Arc<KnnClassifier>>,
    req: web::Json<RecommendRequest>,
) -> ActixResult<HttpResponse> {
    let k = match resolve_k(req.k, classifier.k()) {
        Ok(k) => k,
        Err(e) => return Ok(bad_request(&e)),
    };

    match classifier.explain_with_k(&req.query, k) {
        Ok(recommendation) => {
            let stats = recommendation.stats(classifier.dataset().len());
            debug!("Recommended {:?} with k={}", stats.top_crop, stats.k);
            Ok(HttpResponse::Ok().json(RecommendResponse {
                narration: recommendation.narration(),
                stats,
                result: recommendation.predictions,
            }))
        }
        Err(e) => Ok(bad_request(&e)),
    }
}

async fn recommend_batch(
    classifier: web::Data<Arc<KnnClassifier>>,
    req: web::Json<BatchRecommendRequest>,
) -> ActixResult<HttpResponse> {
    let k = match resolve_k(req.k, classifier.k()) {
        Ok(k) => k,
        Err(e) => return Ok(bad_request(&e)),
    };

    let entries: Vec<BatchEntry> = classifier
        .recommend_batch_with_k(&req.queries, k)
        .into_iter()
        .map(|outcome| match outcome {
            Ok(result) => BatchEntry::Ok { result },
            Err(e) => BatchEntry::Err { error: e.to_string() },
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": entries
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::{json, Value};

    const RICE: &str = "Rice (அரிசி)";

    fn reference_query() -> Value {
        json!({
            "N": 90, "P": 42, "K": 43,
            "temperature": 20, "humidity": 82, "ph": 6.5, "rainfall": 202
        })
    }

    macro_rules! init_app {
        () => {{
            let classifier = Arc::new(KnnClassifier::builtin().unwrap());
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(classifier))
                    .configure(RestApi::configure),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_health() {
        let app = init_app!();
        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["dataset_size"], 33);
    }

    #[actix_web::test]
    async fn test_dataset_and_labels() {
        let app = init_app!();

        let req = actix_test::TestRequest::get().uri("/dataset").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"].as_array().unwrap().len(), 33);
        assert_eq!(body["result"][0]["label"], RICE);

        let req = actix_test::TestRequest::get().uri("/dataset/labels").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"].as_array().unwrap().len(), 22);
        assert_eq!(body["result"][0], RICE);
    }

    #[actix_web::test]
    async fn test_recommend_default_k() {
        let app = init_app!();
        let req = actix_test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({ "query": reference_query() }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["result"][0]["crop"], RICE);
        assert_eq!(body["result"][0]["confidence"], 80);
        assert_eq!(body["result"][0]["neighbors"].as_array().unwrap().len(), 5);
        assert_eq!(body["stats"]["k"], 5);
        assert!(body["narration"].as_str().unwrap().contains("80 percent"));
    }

    #[actix_web::test]
    async fn test_recommend_clamps_k() {
        let app = init_app!();
        let req = actix_test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({ "query": reference_query(), "k": 500 }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stats"]["k"], 33);
        assert_eq!(body["result"][0]["neighbors"].as_array().unwrap().len(), 33);
    }

    #[actix_web::test]
    async fn test_recommend_rejects_non_positive_k() {
        let app = init_app!();
        for k in [0, -3] {
            let req = actix_test::TestRequest::post()
                .uri("/recommend")
                .set_json(json!({ "query": reference_query(), "k": k }))
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_recommend_batch() {
        let app = init_app!();
        let req = actix_test::TestRequest::post()
            .uri("/recommend/batch")
            .set_json(json!({
                "queries": [reference_query(), reference_query()],
                "k": 1
            }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        let entries = body["result"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert_eq!(entry["result"][0]["crop"], RICE);
            assert_eq!(entry["result"][0]["confidence"], 100);
        }
    }

    #[actix_web::test]
    async fn test_recommend_incomplete_query_gets_error_envelope() {
        let app = init_app!();
        let bodies = [
            json!({ "query": { "N": 90, "P": 42, "K": 43, "temperature": 20, "humidity": 82, "rainfall": 202 } }),
            json!({ "query": { "N": 90, "P": 42, "K": 43, "temperature": 20, "humidity": 82, "ph": null, "rainfall": 202 } }),
        ];
        for body in bodies {
            let req = actix_test::TestRequest::post()
                .uri("/recommend")
                .set_json(body)
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = actix_test::read_body_json(resp).await;
            assert!(body["error"].as_str().unwrap().contains("Invalid input"));
        }
    }

    #[test]
    fn test_run_blocking_reports_occupied_port() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let classifier = Arc::new(KnnClassifier::builtin().unwrap());

        let result = RestApi::run_blocking(classifier, "127.0.0.1".to_string(), port);
        assert!(result.is_err());
        drop(listener);
    }

    #[test]
    fn test_resolve_k() {
        assert_eq!(resolve_k(None, 5), Ok(5));
        assert_eq!(resolve_k(Some(7), 5), Ok(7));
        assert!(matches!(resolve_k(Some(0), 5), Err(Error::InvalidInput(_))));
        assert!(matches!(resolve_k(Some(-1), 5), Err(Error::InvalidInput(_))));
    }
}
