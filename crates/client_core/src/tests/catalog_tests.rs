use super::*;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::domain::ItemId;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Clone)]
struct ServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<serde_json::Value>>>>,
}

async fn serve(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Url::parse(&format!("http://{addr}")).expect("url")
}

fn client(base: Url) -> HttpCatalogClient {
    HttpCatalogClient::new(base, Duration::from_secs(5)).expect("client")
}

async fn list_items() -> Json<serde_json::Value> {
    Json(serde_json::json!([
        {"id": 1, "title": "Lâmpadas", "image_url": "http://cdn/lampadas.svg"},
        {"id": 2, "title": "Pilhas e Baterias", "image_url": "http://cdn/baterias.svg"}
    ]))
}

async fn capture_point(
    State(state): State<ServerState>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(body);
    }
    StatusCode::CREATED
}

#[tokio::test]
async fn lists_items_from_catalog() {
    let base = serve(Router::new().route("/items", get(list_items))).await;

    let items = client(base).list_items().await.expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, ItemId(1));
    assert_eq!(items[1].title, "Pilhas e Baterias");
    assert_eq!(items[1].image_url, "http://cdn/baterias.svg");
}

#[tokio::test]
async fn empty_catalog_is_not_an_error() {
    let base = serve(Router::new().route(
        "/items",
        get(|| async { Json(serde_json::json!([])) }),
    ))
    .await;

    let items = client(base).list_items().await.expect("items");
    assert!(items.is_empty());
}

#[tokio::test]
async fn malformed_catalog_surfaces_items_fetch_error() {
    let base = serve(Router::new().route(
        "/items",
        get(|| async { Json(serde_json::json!([{"id": 1}])) }),
    ))
    .await;

    let err = client(base).list_items().await.expect_err("should fail");
    assert!(matches!(
        err,
        FormError::Fetch {
            resource: Resource::Items,
            ..
        }
    ));
}

#[tokio::test]
async fn server_error_on_catalog_is_reported() {
    let base = serve(Router::new().route(
        "/items",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;

    let err = client(base).list_items().await.expect_err("should fail");
    assert!(err.to_string().contains("item catalog"));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn create_point_posts_expected_body() {
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let base = serve(
        Router::new()
            .route("/points", post(capture_point))
            .with_state(state),
    )
    .await;

    let request = CreatePointRequest {
        name: "Recicla Centro".into(),
        email: "contato@recicla.org".into(),
        whatsapp: "11988887777".into(),
        state: "SP".into(),
        city: "São Paulo".into(),
        latitude: -23.5,
        longitude: -46.6,
        collect_items: vec![ItemId(2), ItemId(5)],
    };
    client(base).create_point(&request).await.expect("created");

    let body = rx.await.expect("captured body");
    assert_eq!(body["name"], "Recicla Centro");
    assert_eq!(body["state"], "SP");
    assert_eq!(body["city"], "São Paulo");
    assert_eq!(body["latitude"], -23.5);
    assert_eq!(body["collectItems"], serde_json::json!([2, 5]));
}

#[tokio::test]
async fn rejected_submission_maps_to_submission_failed() {
    let base = serve(Router::new().route(
        "/points",
        post(|| async { StatusCode::UNPROCESSABLE_ENTITY }),
    ))
    .await;

    let request = CreatePointRequest {
        name: String::new(),
        email: String::new(),
        whatsapp: String::new(),
        state: String::new(),
        city: String::new(),
        latitude: 0.0,
        longitude: 0.0,
        collect_items: Vec::new(),
    };
    let err = client(base)
        .create_point(&request)
        .await
        .expect_err("should fail");
    assert!(matches!(err, FormError::SubmissionFailed { .. }));
    assert!(err.to_string().contains("422"));
}

#[tokio::test]
async fn unreachable_api_reports_submission_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let base = Url::parse(&format!("http://{addr}")).expect("url");
    let request = CreatePointRequest {
        name: "x".into(),
        email: String::new(),
        whatsapp: String::new(),
        state: String::new(),
        city: String::new(),
        latitude: 0.0,
        longitude: 0.0,
        collect_items: Vec::new(),
    };
    let err = client(base)
        .create_point(&request)
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("failed to reach collect point endpoint"));
}
