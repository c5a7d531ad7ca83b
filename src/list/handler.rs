//! HTTP handler for the shopping list API.
//!
//! A single front controller owns `/api`: the effective HTTP method picks
//! the operation and every failure is converted to the uniform
//! `{status, message}` body right here, so no data error can take the
//! process down. An `X-HTTP-Method` header, when present, overrides the
//! transport verb so clients behind proxies that only pass GET/POST can
//! still reach the service.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};

use super::{ItemId, ShoppingList, ShoppingListItem};
use crate::api::{ApiResponse, CreateShoppingListItem};
use crate::error::{ApiError, ProtocolError, ValidationError};
use crate::handler::AppState;
use crate::unpack_error;

const METHOD_OVERRIDE_HEADER: &str = "x-http-method";

pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let method = effective_method(&method, &headers);

    let result = match method.as_str() {
        "GET" => list(&state).await,
        "POST" => create(&state, &body).await,
        other => Err(ProtocolError(other.to_string()).into()),
    };

    match result {
        Ok(reply) => reply.into_response(),
        Err(err) => {
            match &err {
                ApiError::Storage(e) => {
                    tracing::error!("storage failure: {}", unpack_error(e));
                }
                _ => {
                    tracing::warn!("rejected {} request: {}", method, err);
                }
            }
            ApiResponse::from(&err).into_response()
        }
    }
}

fn effective_method(method: &Method, headers: &HeaderMap) -> String {
    headers
        .get(METHOD_OVERRIDE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| method.as_str().to_string())
}

async fn list(state: &AppState) -> Result<ApiResponse, ApiError> {
    let store = ShoppingList::new(state.db.connection());
    let entries = store.list_all().await?;
    Ok(ApiResponse::with_data(&entries))
}

async fn create(state: &AppState, body: &Bytes) -> Result<ApiResponse, ApiError> {
    let payload: CreateShoppingListItem =
        serde_json::from_slice(body).map_err(|_| ValidationError::InvalidBody)?;

    let item = match payload.item.as_deref().map(str::trim) {
        Some(item) if !item.is_empty() => item.to_string(),
        _ => return Err(ValidationError::MissingItem.into()),
    };
    // a quantity of zero counts as absent, same as a blank item
    let quantity = match payload.quantity {
        Some(q) if q != 0 => q,
        _ => return Err(ValidationError::MissingQuantity.into()),
    };

    let entry = ShoppingListItem::new(ItemId::generate(), &item, quantity)?;

    let store = ShoppingList::new(state.db.connection());
    store.insert(&entry).await?;

    tracing::info!(id = %entry.id(), "shopping list entry created");
    Ok(ApiResponse::with_message("Shopping List created OK"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::Database;
    use crate::handler::AppState;

    async fn test_router() -> Router {
        let cfg: Config =
            serde_yaml::from_str("app:\n  database: \":memory:\"\n  port: 0\n").unwrap();
        let db = Database::new(&cfg, std::path::Path::new(".")).await.unwrap();
        crate::list::routes().with_state(AppState { db: Arc::new(db) })
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get() -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri("/api")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_list_round_trips() {
        let router = test_router().await;

        let (status, body) = send(
            &router,
            post(r#"{"shoppingListItem":"Milk","shoppingListQuantity":2}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Shopping List created OK");

        let (status, body) = send(&router, get()).await;
        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["shoppingListItem"], "Milk");
        assert_eq!(data[0]["shoppingListQuantity"], 2);
        assert_eq!(data[0]["shoppingListId"].as_str().unwrap().len(), 36);
    }

    #[tokio::test]
    async fn list_on_empty_storage_returns_empty_data() {
        let router = test_router().await;

        let (status, body) = send(&router, get()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], 200);
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn blank_item_is_rejected() {
        let router = test_router().await;

        let (_, body) = send(
            &router,
            post(r#"{"shoppingListItem":"","shoppingListQuantity":1}"#),
        )
        .await;
        assert_eq!(body["status"], 405);
        assert!(body["message"].as_str().unwrap().contains("shoppingListItem"));
    }

    #[tokio::test]
    async fn zero_or_missing_quantity_is_rejected() {
        let router = test_router().await;

        let (_, body) = send(&router, post(r#"{"shoppingListItem":"Eggs"}"#)).await;
        assert_eq!(body["status"], 405);
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .contains("shoppingListQuantity")
        );

        let (_, body) = send(
            &router,
            post(r#"{"shoppingListItem":"Eggs","shoppingListQuantity":0}"#),
        )
        .await;
        assert_eq!(body["status"], 405);
    }

    #[tokio::test]
    async fn negative_quantity_fails_validation() {
        let router = test_router().await;

        let (_, body) = send(
            &router,
            post(r#"{"shoppingListItem":"Eggs","shoppingListQuantity":-3}"#),
        )
        .await;
        assert_eq!(body["status"], 422);
        assert!(body["message"].as_str().unwrap().contains("negative"));
    }

    #[tokio::test]
    async fn unsupported_method_writes_nothing() {
        let router = test_router().await;

        let req = Request::builder()
            .method("DELETE")
            .uri("/api")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&router, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["status"], 405);
        assert!(body["message"].as_str().unwrap().contains("DELETE"));

        let (_, body) = send(&router, get()).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn override_header_beats_transport_verb() {
        let router = test_router().await;

        // a GET tunneled through POST returns the list
        let req = Request::builder()
            .method("POST")
            .uri("/api")
            .header("X-HTTP-Method", "GET")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());

        // while a DELETE tunneled through POST is still rejected
        let req = Request::builder()
            .method("POST")
            .uri("/api")
            .header("X-HTTP-Method", "DELETE")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&router, req).await;
        assert_eq!(body["status"], 405);
    }

    #[tokio::test]
    async fn unparseable_body_is_rejected() {
        let router = test_router().await;

        let (_, body) = send(&router, post("not json")).await;
        assert_eq!(body["status"], 405);
        assert!(body["message"].as_str().unwrap().contains("JSON"));
    }
}
