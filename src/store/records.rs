use rusqlite::{Connection, Row, params};

use super::sqlite::{format_datetime, parse_datetime};
use crate::types::{Case, Client, PortalRecord, Resource, SupportDesk, Task, TeamMember};

/// Row mapping for a portal collection table.
pub(super) trait Table: PortalRecord {
    const TABLE: &'static str;
    const COLUMNS: &'static str;
    /// Assignments applied when an upsert hits an existing id.
    const ON_CONFLICT: &'static str;

    /// Runs `sql` (an INSERT over `COLUMNS`) bound to this record.
    fn execute(&self, conn: &Connection, sql: &str) -> rusqlite::Result<usize>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

fn insert_sql<T: Table>() -> String {
    let placeholders = (1..=T::COLUMNS.split(',').count())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({placeholders})",
        T::TABLE,
        T::COLUMNS
    )
}

pub(super) fn insert<T: Table>(conn: &Connection, record: &T) -> rusqlite::Result<()> {
    record.execute(conn, &insert_sql::<T>())?;
    Ok(())
}

pub(super) fn upsert<T: Table>(conn: &Connection, record: &T) -> rusqlite::Result<()> {
    let sql = format!(
        "{} ON CONFLICT(id) DO UPDATE SET {}",
        insert_sql::<T>(),
        T::ON_CONFLICT
    );
    record.execute(conn, &sql)?;
    Ok(())
}

pub(super) fn get<T: Table>(conn: &Connection, id: &str) -> rusqlite::Result<T> {
    conn.query_row(
        &format!("SELECT {} FROM {} WHERE id = ?1", T::COLUMNS, T::TABLE),
        params![id],
        T::from_row,
    )
}

/// Newest first; rows sharing a timestamp come back in reverse insertion order.
pub(super) fn list<T: Table>(conn: &Connection) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} ORDER BY created_at DESC, rowid DESC",
        T::COLUMNS,
        T::TABLE
    ))?;
    let rows = stmt.query_map([], T::from_row)?;
    rows.collect()
}

pub(super) fn delete<T: Table>(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", T::TABLE),
        params![id],
    )?;
    Ok(rows > 0)
}

/// Clears the table and upserts every record carrying its required fields.
/// Returns how many records were written.
pub(super) fn replace_all<T: Table>(conn: &Connection, records: &[T]) -> rusqlite::Result<usize> {
    conn.execute(&format!("DELETE FROM {}", T::TABLE), [])?;

    let mut written = 0;
    for record in records.iter().filter(|r| r.has_required_fields()) {
        upsert(conn, record)?;
        written += 1;
    }

    let dropped = records.len() - written;
    if dropped > 0 {
        tracing::debug!("Skipped {} incomplete {} record(s) during import", dropped, T::KIND);
    }
    Ok(written)
}

impl Table for Case {
    const TABLE: &'static str = "cases";
    const COLUMNS: &'static str = "id, case_number, client, opponent, practice_area, next_date, status, courtroom, notes, created_at";
    const ON_CONFLICT: &'static str = "case_number = excluded.case_number, client = excluded.client,
        opponent = excluded.opponent, practice_area = excluded.practice_area,
        next_date = excluded.next_date, status = excluded.status, courtroom = excluded.courtroom,
        notes = excluded.notes, created_at = excluded.created_at";

    fn execute(&self, conn: &Connection, sql: &str) -> rusqlite::Result<usize> {
        conn.execute(
            sql,
            params![
                self.id,
                self.case_number,
                self.client,
                self.opponent,
                self.practice_area,
                self.next_date,
                self.status,
                self.courtroom,
                self.notes,
                format_datetime(&self.created_at),
            ],
        )
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Case {
            id: row.get(0)?,
            case_number: row.get(1)?,
            client: row.get(2)?,
            opponent: row.get(3)?,
            practice_area: row.get(4)?,
            next_date: row.get(5)?,
            status: row.get(6)?,
            courtroom: row.get(7)?,
            notes: row.get(8)?,
            created_at: parse_datetime(&row.get::<_, String>(9)?),
        })
    }
}

impl Table for Client {
    const TABLE: &'static str = "clients";
    const COLUMNS: &'static str =
        "id, organisation, primary_contact, email, phone, address, notes, created_at";
    const ON_CONFLICT: &'static str = "organisation = excluded.organisation,
        primary_contact = excluded.primary_contact, email = excluded.email,
        phone = excluded.phone, address = excluded.address, notes = excluded.notes,
        created_at = excluded.created_at";

    fn execute(&self, conn: &Connection, sql: &str) -> rusqlite::Result<usize> {
        conn.execute(
            sql,
            params![
                self.id,
                self.organisation,
                self.primary_contact,
                self.email,
                self.phone,
                self.address,
                self.notes,
                format_datetime(&self.created_at),
            ],
        )
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Client {
            id: row.get(0)?,
            organisation: row.get(1)?,
            primary_contact: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            address: row.get(5)?,
            notes: row.get(6)?,
            created_at: parse_datetime(&row.get::<_, String>(7)?),
        })
    }
}

impl Table for Task {
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static str = "id, title, owner, due, created_at";
    const ON_CONFLICT: &'static str = "title = excluded.title, owner = excluded.owner,
        due = excluded.due, created_at = excluded.created_at";

    fn execute(&self, conn: &Connection, sql: &str) -> rusqlite::Result<usize> {
        conn.execute(
            sql,
            params![
                self.id,
                self.title,
                self.owner,
                self.due,
                format_datetime(&self.created_at),
            ],
        )
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            owner: row.get(2)?,
            due: row.get(3)?,
            created_at: parse_datetime(&row.get::<_, String>(4)?),
        })
    }
}

impl Table for TeamMember {
    const TABLE: &'static str = "team_members";
    const COLUMNS: &'static str = "id, name, role, phone, email, created_at";
    const ON_CONFLICT: &'static str = "name = excluded.name, role = excluded.role,
        phone = excluded.phone, email = excluded.email, created_at = excluded.created_at";

    fn execute(&self, conn: &Connection, sql: &str) -> rusqlite::Result<usize> {
        conn.execute(
            sql,
            params![
                self.id,
                self.name,
                self.role,
                self.phone,
                self.email,
                format_datetime(&self.created_at),
            ],
        )
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TeamMember {
            id: row.get(0)?,
            name: row.get(1)?,
            role: row.get(2)?,
            phone: row.get(3)?,
            email: row.get(4)?,
            created_at: parse_datetime(&row.get::<_, String>(5)?),
        })
    }
}

impl Table for Resource {
    const TABLE: &'static str = "resources";
    const COLUMNS: &'static str = "id, title, type, link, owner, notes, created_at";
    const ON_CONFLICT: &'static str = "title = excluded.title, type = excluded.type,
        link = excluded.link, owner = excluded.owner, notes = excluded.notes,
        created_at = excluded.created_at";

    fn execute(&self, conn: &Connection, sql: &str) -> rusqlite::Result<usize> {
        conn.execute(
            sql,
            params![
                self.id,
                self.title,
                self.kind,
                self.link,
                self.owner,
                self.notes,
                format_datetime(&self.created_at),
            ],
        )
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Resource {
            id: row.get(0)?,
            title: row.get(1)?,
            kind: row.get(2)?,
            link: row.get(3)?,
            owner: row.get(4)?,
            notes: row.get(5)?,
            created_at: parse_datetime(&row.get::<_, String>(6)?),
        })
    }
}

impl Table for SupportDesk {
    const TABLE: &'static str = "support_desks";
    const COLUMNS: &'static str = "id, department, phone, email, hours, notes, created_at";
    const ON_CONFLICT: &'static str = "department = excluded.department, phone = excluded.phone,
        email = excluded.email, hours = excluded.hours, notes = excluded.notes,
        created_at = excluded.created_at";

    fn execute(&self, conn: &Connection, sql: &str) -> rusqlite::Result<usize> {
        conn.execute(
            sql,
            params![
                self.id,
                self.department,
                self.phone,
                self.email,
                self.hours,
                self.notes,
                format_datetime(&self.created_at),
            ],
        )
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(SupportDesk {
            id: row.get(0)?,
            department: row.get(1)?,
            phone: row.get(2)?,
            email: row.get(3)?,
            hours: row.get(4)?,
            notes: row.get(5)?,
            created_at: parse_datetime(&row.get::<_, String>(6)?),
        })
    }
}
