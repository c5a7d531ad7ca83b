use thiserror::Error;

/// A field of a shopping list entry failed validation.
///
/// Each variant names exactly one offending field so the caller can tell
/// which input to correct.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("shoppingListItem is missing or empty")]
    MissingItem,

    #[error("shoppingListQuantity is missing or zero")]
    MissingQuantity,

    #[error("request body is not valid JSON")]
    InvalidBody,

    #[error("shopping list item is empty or insecure")]
    EmptyItem,

    #[error("shopping list item is too large")]
    OversizedItem,

    #[error("shopping list quantity is negative")]
    NegativeQuantity,

    #[error("shopping list id is malformed: {0}")]
    MalformedId(String),
}

impl ValidationError {
    pub fn status(&self) -> u16 {
        use ValidationError::*;
        match self {
            MissingItem | MissingQuantity | InvalidBody => 405,
            EmptyItem | OversizedItem | NegativeQuantity | MalformedId(_) => 422,
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("stored row is invalid: {0}")]
    InvalidRow(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid HTTP method request: {0}")]
pub struct ProtocolError(pub String);

/// Closed union of everything the API boundary can reject. Converted to
/// the uniform `{status, message}` reply exactly once, in the dispatcher.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ApiError {
    /// Status code embedded in the reply body; clients branch on
    /// `status != 200`.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(e) => e.status(),
            ApiError::Storage(_) => 500,
            ApiError::Protocol(_) => 405,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_status_codes() {
        assert_eq!(ApiError::from(ValidationError::MissingItem).status(), 405);
        assert_eq!(ApiError::from(ValidationError::InvalidBody).status(), 405);
        assert_eq!(ApiError::from(ValidationError::NegativeQuantity).status(), 422);
        assert_eq!(ApiError::from(ProtocolError("DELETE".to_string())).status(), 405);
        assert_eq!(ApiError::from(StorageError::InvalidRow("short id".into())).status(), 500);
    }
}
