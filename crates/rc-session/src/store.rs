use std::io::{Error as IoError, ErrorKind};
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rc_core::domain::StaffRole;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::CachedUser;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS current_user (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    email TEXT NOT NULL,
    name TEXT NOT NULL,
    role TEXT NOT NULL,
    verified_at TEXT NOT NULL
);
"#;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Explicit lifecycle for the cached sign-in: load at startup, save after a
/// successful verification, clear on logout. Never consulted ad hoc.
pub trait SessionStore: Send + Sync {
    fn init(&self) -> Result<(), SessionError>;
    fn save_user(&self, user: &CachedUser) -> Result<(), SessionError>;
    fn load_user(&self) -> Result<Option<CachedUser>, SessionError>;
    fn clear_user(&self) -> Result<(), SessionError>;
}

pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn new(path: &Path) -> Result<Self, SessionError> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn new_in_memory() -> Result<Self, SessionError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("sqlite mutex poisoned")
    }
}

impl SessionStore for SqliteSessionStore {
    fn init(&self) -> Result<(), SessionError> {
        let conn = self.lock_conn();
        let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        conn.execute_batch(SCHEMA_SQL)?;
        if version < SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn save_user(&self, user: &CachedUser) -> Result<(), SessionError> {
        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO current_user (id, email, name, role, verified_at)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 email = excluded.email,
                 name = excluded.name,
                 role = excluded.role,
                 verified_at = excluded.verified_at",
            params![
                user.email.as_str(),
                user.name.as_str(),
                role_to_str(user.role),
                user.verified_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn load_user(&self) -> Result<Option<CachedUser>, SessionError> {
        let conn = self.lock_conn();
        let user = conn
            .query_row(
                "SELECT email, name, role, verified_at FROM current_user WHERE id = 1",
                [],
                |row| {
                    let email: String = row.get(0)?;
                    let name: String = row.get(1)?;
                    let role: String = row.get(2)?;
                    let verified_at: String = row.get(3)?;

                    Ok(CachedUser {
                        email,
                        name,
                        role: parse_role(2, &role)?,
                        verified_at: parse_datetime_utc(3, &verified_at)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn clear_user(&self) -> Result<(), SessionError> {
        let conn = self.lock_conn();
        conn.execute("DELETE FROM current_user WHERE id = 1", [])?;
        Ok(())
    }
}

fn role_to_str(role: StaffRole) -> &'static str {
    match role {
        StaffRole::Recruiter => "recruiter",
        StaffRole::Admin => "admin",
    }
}

fn parse_role(column: usize, value: &str) -> rusqlite::Result<StaffRole> {
    match value {
        "recruiter" => Ok(StaffRole::Recruiter),
        "admin" => Ok(StaffRole::Admin),
        other => Err(sql_text_parse_error(column, "staff role", other)),
    }
}

fn parse_datetime_utc(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| sql_text_parse_error(column, "datetime", value))
}

fn sql_text_parse_error(column: usize, field: &'static str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        Type::Text,
        Box::new(IoError::new(
            ErrorKind::InvalidData,
            format!("invalid {field}: {value}"),
        )),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use rc_core::domain::StaffRole;

    use super::{SessionStore, SqliteSessionStore};
    use crate::models::CachedUser;

    fn ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid RFC3339 timestamp")
            .with_timezone(&Utc)
    }

    fn make_user(email: &str, when: &str) -> CachedUser {
        CachedUser {
            email: email.to_owned(),
            name: "Dana Whitfield".to_owned(),
            role: StaffRole::Recruiter,
            verified_at: ts(when),
        }
    }

    #[test]
    fn test_load_on_empty_store_is_none() {
        let store = SqliteSessionStore::new_in_memory().expect("in-memory store");
        store.init().expect("init schema");

        assert!(store.load_user().expect("load user").is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let store = SqliteSessionStore::new_in_memory().expect("in-memory store");
        store.init().expect("init schema");

        let user = make_user("dana@agency.example", "2026-02-01T08:30:00Z");
        store.save_user(&user).expect("save user");

        let loaded = store.load_user().expect("load user").expect("user present");
        assert_eq!(loaded, user);
    }

    #[test]
    fn test_save_replaces_the_single_row() {
        let store = SqliteSessionStore::new_in_memory().expect("in-memory store");
        store.init().expect("init schema");

        store
            .save_user(&make_user("dana@agency.example", "2026-02-01T08:30:00Z"))
            .expect("save first");
        store
            .save_user(&make_user("sam@agency.example", "2026-02-02T09:00:00Z"))
            .expect("save second");

        let loaded = store.load_user().expect("load user").expect("user present");
        assert_eq!(loaded.email, "sam@agency.example");
        assert_eq!(loaded.verified_at, ts("2026-02-02T09:00:00Z"));
    }

    #[test]
    fn test_clear_on_logout() {
        let store = SqliteSessionStore::new_in_memory().expect("in-memory store");
        store.init().expect("init schema");

        store
            .save_user(&make_user("dana@agency.example", "2026-02-01T08:30:00Z"))
            .expect("save user");
        store.clear_user().expect("clear user");

        assert!(store.load_user().expect("load user").is_none());

        // Clearing an already-empty store is a no-op, not an error.
        store.clear_user().expect("clear again");
    }

    #[test]
    fn test_init_is_idempotent() {
        let store = SqliteSessionStore::new_in_memory().expect("in-memory store");
        store.init().expect("first init");
        store.init().expect("second init");
    }
}
