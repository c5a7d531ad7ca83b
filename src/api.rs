use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::list::ShoppingListItem;

/// Body of a `POST /api` request. Both fields are optional at the wire
/// level; presence is checked in the handler so each missing field gets
/// its own error message.
#[derive(Debug, Deserialize)]
pub struct CreateShoppingListItem {
    #[serde(rename = "shoppingListItem")]
    pub item: Option<String>,
    #[serde(rename = "shoppingListQuantity")]
    pub quantity: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct WireShoppingListItem {
    #[serde(rename = "shoppingListId")]
    pub id: String,
    #[serde(rename = "shoppingListItem")]
    pub item: String,
    #[serde(rename = "shoppingListQuantity")]
    pub quantity: i64,
}

impl From<&ShoppingListItem> for WireShoppingListItem {
    fn from(entry: &ShoppingListItem) -> Self {
        WireShoppingListItem {
            id: entry.id().to_string(),
            item: entry.item().to_string(),
            quantity: entry.quantity(),
        }
    }
}

/// Uniform reply shape. `status` is embedded in the body and clients
/// branch on `status != 200`; the transport status line mirrors it.
#[derive(Debug, Serialize, Default)]
pub struct ApiResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<WireShoppingListItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn with_data(entries: &[ShoppingListItem]) -> Self {
        ApiResponse {
            status: 200,
            data: Some(entries.iter().map(WireShoppingListItem::from).collect()),
            message: None,
        }
    }

    pub fn with_message(msg: &str) -> Self {
        ApiResponse {
            status: 200,
            data: None,
            message: Some(msg.to_owned()),
        }
    }
}

impl From<&ApiError> for ApiResponse {
    fn from(err: &ApiError) -> Self {
        ApiResponse {
            status: err.status(),
            data: None,
            message: Some(err.to_string()),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
