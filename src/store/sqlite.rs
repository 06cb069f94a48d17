use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::Store;
use super::records::{self, Table};
use super::schema::SCHEMA;
use crate::config::MAX_SESSION_TTL_HOURS;
use crate::error::{Error, Result};
use crate::types::*;

const UPSERT_STAT: &str = "INSERT INTO stats (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::configure(conn)
    }

    /// Opens the database at `db_path`, creating its parent directory first.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(db_path)
    }

    /// A private in-memory database, mostly useful in tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Raw connection for assertions in store tests.
    #[cfg(test)]
    pub(crate) fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }

    fn create_record<T: Table>(&self, mut record: T) -> Result<T> {
        record.assign(new_id(), now());
        let conn = self.conn();
        records::insert(&conn, &record)?;
        records::get(&conn, record.id()).map_err(Error::from)
    }

    fn list_records<T: Table>(&self) -> Result<Vec<T>> {
        records::list(&self.conn()).map_err(Error::from)
    }

    fn delete_record<T: Table>(&self, id: &str) -> Result<bool> {
        records::delete::<T>(&self.conn(), id).map_err(Error::from)
    }
}

pub(super) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

/// Fixed-width UTC timestamps so that text ordering is chronological.
pub(super) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Lifetimes are capped at `MAX_SESSION_TTL_HOURS`.
fn ttl_duration(ttl_hours: f64) -> Duration {
    if !ttl_hours.is_finite() || ttl_hours <= 0.0 {
        return Duration::zero();
    }
    let hours = ttl_hours.min(MAX_SESSION_TTL_HOURS);
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

fn read_stats(conn: &Connection) -> rusqlite::Result<Stats> {
    let mut stmt = conn.prepare("SELECT key, value FROM stats")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
    })?;

    let mut stats = Stats::default();
    for row in rows {
        let (key, value) = row?;
        if let Some(key) = StatKey::parse(&key) {
            stats.set(key, value);
        }
    }
    Ok(stats)
}

fn read_snapshot(conn: &Connection) -> rusqlite::Result<PortalSnapshot> {
    Ok(PortalSnapshot {
        stats: read_stats(conn)?,
        cases: records::list(conn)?,
        clients: records::list(conn)?,
        tasks: records::list(conn)?,
        team: records::list(conn)?,
        resources: records::list(conn)?,
        support_desks: records::list(conn)?,
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let name = name.trim().to_string();
        if email.is_empty() || name.is_empty() {
            return Err(Error::Validation("Name and email are required.".to_string()));
        }

        let created_at = now();
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO users (email, password_hash, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![email, password_hash, name, format_datetime(&created_at)],
        );

        match result {
            Ok(_) => Ok(User {
                id: conn.last_insert_rowid(),
                email,
                password_hash: password_hash.to_string(),
                name,
                created_at,
            }),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE email = ?1",
            params![email.trim().to_lowercase()],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    name: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Session operations

    fn create_session(&self, user_id: i64, ttl_hours: f64) -> Result<Session> {
        let created_at = now();
        let expires_at = created_at
            .checked_add_signed(ttl_duration(ttl_hours))
            .ok_or_else(|| {
                Error::Config(format!("session TTL of {ttl_hours} hours is out of range"))
            })?;
        let session = Session {
            token: new_id(),
            user_id,
            created_at,
            expires_at,
        };

        self.conn().execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.token,
                session.user_id,
                format_datetime(&session.created_at),
                format_datetime(&session.expires_at),
            ],
        )?;
        Ok(session)
    }

    fn find_session(&self, token: &str) -> Result<Option<SessionUser>> {
        let conn = self.conn();
        let session = conn
            .query_row(
                "SELECT s.token, s.user_id, s.expires_at, u.email, u.name
                 FROM sessions s
                 JOIN users u ON u.id = s.user_id
                 WHERE s.token = ?1",
                params![token],
                |row| {
                    Ok(SessionUser {
                        token: row.get(0)?,
                        user_id: row.get(1)?,
                        expires_at: parse_datetime(&row.get::<_, String>(2)?),
                        email: row.get(3)?,
                        name: row.get(4)?,
                    })
                },
            )
            .optional()?;

        match session {
            Some(session) if session.expires_at <= Utc::now() => {
                conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn delete_session(&self, token: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    fn count_user_sessions(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn prune_expired_sessions(&self) -> Result<usize> {
        let rows = self.conn().execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![format_datetime(&Utc::now())],
        )?;
        Ok(rows)
    }

    // Stats operations

    fn ensure_stats(&self) -> Result<()> {
        let conn = self.conn();
        let mut stmt = conn.prepare("INSERT OR IGNORE INTO stats (key, value) VALUES (?1, 0)")?;
        for key in StatKey::ALL {
            stmt.execute(params![key.as_str()])?;
        }
        Ok(())
    }

    fn get_stats(&self) -> Result<Stats> {
        read_stats(&self.conn()).map_err(Error::from)
    }

    fn update_stats(&self, updates: &[(StatKey, f64)]) -> Result<Stats> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        for (key, value) in updates {
            let value = if value.is_finite() { *value } else { 0.0 };
            tx.execute(UPSERT_STAT, params![key.as_str(), value])?;
        }
        tx.commit()?;

        read_stats(&conn).map_err(Error::from)
    }

    // Case operations

    fn create_case(&self, case: Case) -> Result<Case> {
        self.create_record(case)
    }

    fn list_cases(&self) -> Result<Vec<Case>> {
        self.list_records()
    }

    fn delete_case(&self, id: &str) -> Result<bool> {
        self.delete_record::<Case>(id)
    }

    // Client operations

    fn create_client(&self, client: Client) -> Result<Client> {
        self.create_record(client)
    }

    fn list_clients(&self) -> Result<Vec<Client>> {
        self.list_records()
    }

    fn delete_client(&self, id: &str) -> Result<bool> {
        self.delete_record::<Client>(id)
    }

    // Task operations

    fn create_task(&self, task: Task) -> Result<Task> {
        self.create_record(task)
    }

    fn list_tasks(&self) -> Result<Vec<Task>> {
        self.list_records()
    }

    fn delete_task(&self, id: &str) -> Result<bool> {
        self.delete_record::<Task>(id)
    }

    // Team operations

    fn create_team_member(&self, member: TeamMember) -> Result<TeamMember> {
        self.create_record(member)
    }

    fn list_team_members(&self) -> Result<Vec<TeamMember>> {
        self.list_records()
    }

    fn delete_team_member(&self, id: &str) -> Result<bool> {
        self.delete_record::<TeamMember>(id)
    }

    // Resource operations

    fn create_resource(&self, resource: Resource) -> Result<Resource> {
        self.create_record(resource)
    }

    fn list_resources(&self) -> Result<Vec<Resource>> {
        self.list_records()
    }

    fn delete_resource(&self, id: &str) -> Result<bool> {
        self.delete_record::<Resource>(id)
    }

    // Support desk operations

    fn create_support_desk(&self, desk: SupportDesk) -> Result<SupportDesk> {
        self.create_record(desk)
    }

    fn list_support_desks(&self) -> Result<Vec<SupportDesk>> {
        self.list_records()
    }

    fn delete_support_desk(&self, id: &str) -> Result<bool> {
        self.delete_record::<SupportDesk>(id)
    }

    // Portal operations

    fn portal_snapshot(&self) -> Result<PortalSnapshot> {
        read_snapshot(&self.conn()).map_err(Error::from)
    }

    fn replace_portal_data(&self, import: &PortalImport) -> Result<PortalSnapshot> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        for key in StatKey::ALL {
            tx.execute(UPSERT_STAT, params![key.as_str(), import.stats.get(key)])?;
        }

        let written = records::replace_all(&tx, &import.cases)?
            + records::replace_all(&tx, &import.clients)?
            + records::replace_all(&tx, &import.tasks)?
            + records::replace_all(&tx, &import.team)?
            + records::replace_all(&tx, &import.resources)?
            + records::replace_all(&tx, &import.support_desks)?;

        tx.commit()?;
        tracing::info!("Replaced portal data ({} records)", written);

        read_snapshot(&conn).map_err(Error::from)
    }
}
