use alloy::primitives::Address;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::cache::ActivityService;
use crate::config::{Config, DEFAULT_PAGINATION_LIMIT, DEFAULT_PAGINATION_OFFSET};
use crate::error::ActivityError;
use crate::models::{ActivityPage, Pagination};

#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl From<PaginationQuery> for Pagination {
    fn from(q: PaginationQuery) -> Self {
        Pagination {
            offset: q.offset.unwrap_or(DEFAULT_PAGINATION_OFFSET),
            limit: q.limit.unwrap_or(DEFAULT_PAGINATION_LIMIT),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadAddress(String),
    Activity(ActivityError),
}

impl From<ActivityError> for ApiError {
    fn from(e: ActivityError) -> Self {
        ApiError::Activity(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadAddress(addr) => {
                (StatusCode::BAD_REQUEST, format!("invalid address: {}", addr))
            }
            ApiError::Activity(ActivityError::Explorer(e)) => {
                error!("Explorer failure: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            ApiError::Activity(ActivityError::InvalidTransaction(e)) => {
                warn!("Classification failure: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn parse_address(raw: &str) -> Result<Address, ApiError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|_| ApiError::BadAddress(raw.to_string()))
}

pub fn router(service: Arc<ActivityService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Panna activity API running" }))
        .route(
            "/addresses/:address/activities",
            get({
                let service = Arc::clone(&service);
                move |Path(address): Path<String>, Query(q): Query<PaginationQuery>| {
                    let service = Arc::clone(&service);
                    async move { get_activities(service, &address, q.into()).await }
                }
            })
            .delete({
                let service = Arc::clone(&service);
                move |Path(address): Path<String>| {
                    let service = Arc::clone(&service);
                    async move { evict(service, &address) }
                }
            }),
        )
        .layer(cors)
}

pub async fn serve(cfg: Config, service: Arc<ActivityService>) -> eyre::Result<()> {
    let app = router(service);

    let addr = SocketAddr::from(([127, 0, 0, 1], cfg.port));
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn get_activities(
    service: Arc<ActivityService>,
    address: &str,
    pagination: Pagination,
) -> Result<Json<ActivityPage>, ApiError> {
    let address = parse_address(address)?;
    let page = service
        .get_activities_by_address(&address, Some(pagination))
        .await?;
    Ok(Json(page))
}

fn evict(service: Arc<ActivityService>, address: &str) -> Result<StatusCode, ApiError> {
    let address = parse_address(address)?;
    if service.cache().reset(&address) {
        info!("Evicted cached activities for {}", address);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::BlockscoutClient;
    use crate::fixtures::{self, ADDR_A, TX_SENT};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn app_with_explorer(server: &MockServer) -> Router {
        let cfg = Config {
            explorer_url: server.uri(),
            retry_base_delay_ms: 1,
            ..Config::default()
        };
        let explorer = Arc::new(BlockscoutClient::new(&cfg).unwrap());
        router(Arc::new(ActivityService::new(explorer, &cfg)))
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn serves_activities_for_an_address() {
        let server = MockServer::start().await;
        let address: Address = ADDR_A.parse().unwrap();
        Mock::given(method("GET"))
            .and(path(format!(
                "/api/v2/addresses/{}/transactions",
                address.to_checksum(None)
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [fixtures::sent_eth()],
                "next_page_params": null
            })))
            .expect(1)
            .mount(&server)
            .await;
        let app = app_with_explorer(&server).await;

        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/addresses/{}/activities?offset=0&limit=5", ADDR_A))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["activities"][0]["activityType"], "Sent");
        assert_eq!(body["activities"][0]["amount"]["type"], "ETH");
        assert_eq!(body["activities"][0]["amount"]["value"], "100000000000000");
        assert_eq!(body["activities"][0]["status"], "success");
        assert_eq!(body["activities"][0]["transactionID"], TX_SENT);
        assert_eq!(body["metadata"]["count"], 1);
        assert_eq!(body["metadata"]["limit"], 5);
        assert_eq!(body["metadata"]["hasNextPage"], false);
    }

    #[tokio::test]
    async fn rejects_malformed_addresses() {
        let server = MockServer::start().await;
        let app = app_with_explorer(&server).await;

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/addresses/not-an-address/activities")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn explorer_failures_map_to_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;
        let app = app_with_explorer(&server).await;

        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/addresses/{}/activities", ADDR_A))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("400"));
    }

    #[tokio::test]
    async fn delete_evicts_only_known_entries() {
        let server = MockServer::start().await;
        let app = app_with_explorer(&server).await;

        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/addresses/{}/activities", ADDR_A))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_query_values_use_defaults() {
        let p: Pagination = PaginationQuery {
            offset: None,
            limit: Some(3),
        }
        .into();
        assert_eq!(p.offset, DEFAULT_PAGINATION_OFFSET);
        assert_eq!(p.limit, 3);
    }
}
