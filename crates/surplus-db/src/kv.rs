//! Raw string-valued storage, the same granularity as browser local storage:
//! every value is read and written whole.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub fn get_item(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

pub fn set_item(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        (key, value),
    )?;
    Ok(())
}

pub fn remove_item(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
    Ok(())
}

/// Reads and parses a JSON value. A missing key is `None`; a value that does
/// not parse is an error naming the key.
pub fn read_json<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    match get_item(conn, key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("Corrupt value under '{}'", key))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    set_item(conn, key, &raw)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run(&conn).unwrap();
        conn
    }

    #[test]
    fn set_overwrites_whole_value() {
        let conn = conn();
        set_item(&conn, "k", "one").unwrap();
        set_item(&conn, "k", "two").unwrap();
        assert_eq!(get_item(&conn, "k").unwrap().as_deref(), Some("two"));

        remove_item(&conn, "k").unwrap();
        assert_eq!(get_item(&conn, "k").unwrap(), None);
    }

    #[test]
    fn corrupt_json_is_reported() {
        let conn = conn();
        set_item(&conn, "surplusFoods", "{not json").unwrap();
        let err = read_json::<Vec<u32>>(&conn, "surplusFoods").unwrap_err();
        assert!(err.to_string().contains("surplusFoods"));
    }
}
