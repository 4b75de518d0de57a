use crate::Database;
use anyhow::Result;
use rusqlite::OptionalExtension;
use serde::Serialize;
use serde::de::DeserializeOwned;

const SESSION_USER_KEY: &str = "current_user_id";

impl Database {
    // -- Collections --

    /// Full re-serialization of one collection into its row. Called after
    /// every mutation; there is no partial write path.
    pub fn save_collection<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let data = serde_json::to_string(value)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO collections (name, data, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(name) DO UPDATE SET
                     data = excluded.data,
                     updated_at = excluded.updated_at",
                (name, &data),
            )?;
            Ok(())
        })
    }

    /// Loads one collection snapshot. A missing row is `None`; a row that
    /// fails to parse is an error the caller downgrades to "empty".
    pub fn load_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let raw: Option<String> = self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT data FROM collections WHERE name = ?1",
                    [name],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(row)
        })?;

        match raw {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    // -- Session marker --

    pub fn set_session_user(&self, user_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO session (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                (SESSION_USER_KEY, user_id),
            )?;
            Ok(())
        })
    }

    pub fn session_user(&self) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT value FROM session WHERE key = ?1",
                    [SESSION_USER_KEY],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn clear_session_user(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM session WHERE key = ?1", [SESSION_USER_KEY])?;
            Ok(())
        })
    }
}
