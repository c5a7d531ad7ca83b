use std::fmt;

use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StorageError, ValidationError};

/// Upper bound on the stored item label, in characters. Matches the
/// column definition in the schema.
pub const MAX_ITEM_LEN: usize = 64;

/// Identifier of a shopping list entry. 16 bytes in storage, canonical
/// hyphenated form everywhere else. Always generated server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn generate() -> Self {
        ItemId(Uuid::new_v4())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Uuid::try_parse(input.trim())
            .map(ItemId)
            .map_err(|_| ValidationError::MalformedId(input.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        Uuid::from_slice(bytes)
            .map(ItemId)
            .map_err(|_| ValidationError::MalformedId(format!("{} byte id", bytes.len())))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// One row of the shopping list. Fields are only reachable through the
/// validated constructor, so every value in circulation already satisfies
/// the invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    id: ItemId,
    item: String,
    quantity: i64,
}

impl ShoppingListItem {
    /// Validates every field independently; the first offending field wins.
    pub fn new(id: ItemId, item: &str, quantity: i64) -> Result<Self, ValidationError> {
        let item = normalize_item(item)?;
        if quantity < 0 {
            return Err(ValidationError::NegativeQuantity);
        }
        Ok(ShoppingListItem { id, item, quantity })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// Trims surrounding whitespace, then rejects labels that end up empty or
/// carry control characters. Oversize is measured in characters, matching
/// the column definition.
fn normalize_item(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_control) {
        return Err(ValidationError::EmptyItem);
    }
    if trimmed.chars().count() > MAX_ITEM_LEN {
        return Err(ValidationError::OversizedItem);
    }
    Ok(trimmed.to_string())
}

pub struct ShoppingList<'a> {
    conn: &'a Connection,
}

impl<'a> ShoppingList<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Appends one row. Ids are freshly generated, so a duplicate key
    /// surfaces as the underlying database error.
    pub async fn insert(&self, entry: &ShoppingListItem) -> Result<(), StorageError> {
        let query = r#"
            INSERT INTO shoppingList (shoppingListId, shoppingListItem, shoppingListQuantity)
            VALUES (?, ?, ?)
        "#;

        self.conn
            .execute(
                query,
                libsql::params![entry.id().as_bytes().to_vec(), entry.item(), entry.quantity()],
            )
            .await?;

        Ok(())
    }

    /// Full-table scan in storage order, fully materialized. Rows are
    /// rebuilt through the validated constructor; a row that no longer
    /// satisfies the invariants is a storage error, not a panic.
    pub async fn list_all(&self) -> Result<Vec<ShoppingListItem>, StorageError> {
        let query = r#"
            SELECT shoppingListId, shoppingListItem, shoppingListQuantity
            FROM shoppingList
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut entries: Vec<ShoppingListItem> = vec![];

        while let Some(row) = rows.next().await? {
            let id_bytes: Vec<u8> = row.get(0)?;
            let item: String = row.get(1)?;
            let quantity: i64 = row.get(2)?;

            let id = ItemId::from_bytes(&id_bytes)
                .map_err(|e| StorageError::InvalidRow(e.to_string()))?;
            let entry = ShoppingListItem::new(id, &item, quantity)
                .map_err(|e| StorageError::InvalidRow(e.to_string()))?;
            entries.push(entry);
        }

        Ok(entries)
    }
}
