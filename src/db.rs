use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use libsql::{Builder, Connection, Database as LibsqlDatabase};

use crate::config::Config;

const SYSTEM_MIGRATIONS: &[(&str, &str)] = &[(
    "system/000_migrations_table.sql",
    include_str!("migrations/system/000_migrations_table.sql"),
)];

pub struct Database {
    db: LibsqlDatabase,
    conn: Connection,
    database_url: Option<String>,
    database_auth_token: Option<String>,
}

impl Database {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn is_replica(database_url: &Option<String>, database_auth_token: &Option<String>) -> bool {
        database_url.is_some() && database_auth_token.is_some()
    }

    /// Pushes local writes to the remote database when running in synced
    /// mode; a no-op for a purely local database.
    pub async fn sync(&self) -> Result<()> {
        if Self::is_replica(&self.database_url, &self.database_auth_token) {
            self.db
                .sync()
                .await
                .map_err(|e| anyhow::anyhow!("sync failed: {}", e))?;
        }
        Ok(())
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        match conn.execute(query, libsql::params![name]).await {
            Ok(_) => Ok(()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(())
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let database_url = cfg.app.database_url.clone();
        let database_auth_token = cfg.app.database_auth_token.clone();
        let path = database_path(cfg, data_dir);

        let db = match (&database_url, &database_auth_token) {
            (Some(url), Some(token)) => {
                tracing::info!("[db] running in synced database mode (offline writes)");
                let sync_interval = Duration::from_secs(cfg.app.sync_interval_seconds);
                Builder::new_synced_database(&path, url.clone(), token.clone())
                    .sync_interval(sync_interval)
                    .build()
                    .await?
            }
            _ => Builder::new_local(&path).build().await?,
        };

        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        for (filename, sql) in crate::list::migrations() {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database {
            db,
            conn,
            database_url,
            database_auth_token,
        })
    }
}

// libsql treats ":memory:" as an in-process database; it must not be
// joined onto the data directory.
fn database_path(cfg: &Config, data_dir: &Path) -> PathBuf {
    let name = cfg.app.get_db();
    if name == ":memory:" {
        PathBuf::from(name)
    } else {
        data_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_database_bootstraps_schema() {
        let cfg: Config =
            serde_yaml::from_str("app:\n  database: \":memory:\"\n  port: 0\n").unwrap();
        let db = Database::new(&cfg, Path::new(".")).await.unwrap();

        let mut rows = db
            .connection()
            .query("SELECT COUNT(*) FROM shoppingList", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }

    #[tokio::test]
    async fn run_migration_is_idempotent() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();

        let (name, sql) = SYSTEM_MIGRATIONS[0];
        Database::run_migration(&conn, name, sql).await.unwrap();

        let (name, sql) = crate::list::migrations()[0];
        Database::run_migration(&conn, name, sql).await.unwrap();
        Database::run_migration(&conn, name, sql).await.unwrap();

        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM _migrations WHERE name = ?",
                libsql::params![name],
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }
}
