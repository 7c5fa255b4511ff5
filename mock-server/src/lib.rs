use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// The only access token the server accepts.
pub const TEST_TOKEN: &str = "APP_USR-TEST";

/// Seller that owns the seeded listings.
pub const SELLER_ID: u64 = 123456;

/// Number of seeded listings for `SELLER_ID`.
pub const SELLER_ITEMS: usize = 7;

/// Category id answered with a plain-text 500.
pub const BROKEN_CATEGORY: &str = "broken";

const SITES: &[&str] = &["MLA", "MLB", "MLM", "MLU"];

#[derive(Default)]
pub struct Store {
    pub pictures: Vec<Value>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
struct Auth {
    access_token: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub seller_id: Option<u64>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

pub fn app() -> Router {
    app_with_store(Db::default())
}

pub fn app_with_store(db: Db) -> Router {
    Router::new()
        .route("/users/{id}", get(get_user))
        .route("/sites/{site_id}/categories", get(site_categories))
        .route("/categories/{id}", get(get_category))
        .route("/sites/{site_id}/search", get(search))
        .route("/pictures", post(upload_picture))
        .layer(middleware::from_fn(require_token))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// API-style error payload.
pub fn error_body(status: StatusCode, error: &str, message: &str) -> Value {
    json!({
        "message": message,
        "error": error,
        "status": status.as_u16(),
        "cause": []
    })
}

fn failure(status: StatusCode, error: &str, message: &str) -> Response {
    (status, Json(error_body(status, error, message))).into_response()
}

async fn require_token(Query(auth): Query<Auth>, request: Request, next: Next) -> Response {
    match auth.access_token.as_deref() {
        Some(TEST_TOKEN) => next.run(request).await,
        Some(_) => failure(StatusCode::UNAUTHORIZED, "unauthorized", "invalid access token"),
        None => failure(StatusCode::UNAUTHORIZED, "unauthorized", "access_token is required"),
    }
}

pub fn seller() -> Value {
    json!({
        "id": SELLER_ID,
        "nickname": "TEST_SELLER",
        "site_id": "MLA",
        "country_id": "AR",
        "user_type": "normal",
        "seller_reputation": {"level_id": "5_green", "power_seller_status": "platinum"}
    })
}

async fn get_user(Path(id): Path<String>) -> Response {
    if id == "me" || id == SELLER_ID.to_string() {
        return Json(seller()).into_response();
    }
    failure(StatusCode::NOT_FOUND, "not_found", &format!("User {id} not found"))
}

async fn site_categories(Path(site_id): Path<String>) -> Response {
    if !SITES.contains(&site_id.as_str()) {
        return failure(StatusCode::NOT_FOUND, "not_found", &format!("Site {site_id} not found"));
    }
    Json(json!([
        {"id": format!("{site_id}5725"), "name": "Accesorios para Vehículos"},
        {"id": format!("{site_id}1512"), "name": "Agro"},
        {"id": format!("{site_id}1403"), "name": "Alimentos y Bebidas"}
    ]))
    .into_response()
}

async fn get_category(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "MLA1403" => Json(json!({
            "id": "MLA1403",
            "name": "Alimentos y Bebidas",
            "path_from_root": [{"id": "MLA1403", "name": "Alimentos y Bebidas"}],
            "children_categories": [{"id": "MLA1423", "name": "Bebidas"}],
            "total_items_in_this_category": 1024
        }))
        .into_response(),
        BROKEN_CATEGORY => (StatusCode::INTERNAL_SERVER_ERROR, "internal failure").into_response(),
        _ => failure(StatusCode::NOT_FOUND, "not_found", &format!("Category {id} not found")),
    }
}

pub fn seller_items() -> Vec<Value> {
    (1..=SELLER_ITEMS)
        .map(|n| {
            json!({
                "id": format!("MLA{}", 1_000_000 + n),
                "title": format!("Listing {n}"),
                "price": 100 * n,
                "currency_id": "ARS",
                "seller": {"id": SELLER_ID}
            })
        })
        .collect()
}

async fn search(Path(site_id): Path<String>, Query(query): Query<SearchQuery>) -> Response {
    if !SITES.contains(&site_id.as_str()) {
        return failure(StatusCode::NOT_FOUND, "not_found", &format!("Site {site_id} not found"));
    }
    let Some(seller_id) = query.seller_id else {
        return failure(StatusCode::BAD_REQUEST, "bad_request", "seller_id is required");
    };

    let all = if seller_id == SELLER_ID && site_id == "MLA" {
        seller_items()
    } else {
        Vec::new()
    };
    let results: Vec<Value> = all.iter().skip(query.offset).take(query.limit).cloned().collect();
    debug!(%site_id, seller_id, returned = results.len(), "search");

    Json(json!({
        "site_id": site_id,
        "seller": {"id": seller_id},
        "paging": {
            "total": all.len(),
            "offset": query.offset,
            "limit": query.limit,
            "primary_results": all.len()
        },
        "results": results,
        "sort": {"id": "relevance", "name": "More relevant"}
    }))
    .into_response()
}

async fn upload_picture(State(db): State<Db>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return e.into_response(),
        };
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return e.into_response(),
        };

        let picture = json!({
            "id": format!("{}-MLA", Uuid::new_v4().simple()),
            "file_name": file_name,
            "bytes": bytes.len(),
            "max_size": "500x500",
            "variations": []
        });
        db.write().await.pictures.push(picture.clone());
        return (StatusCode::CREATED, Json(picture)).into_response();
    }
    failure(StatusCode::BAD_REQUEST, "bad_request", "file field is required")
}
