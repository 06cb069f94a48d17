//! Normalization of client-supplied records.
//!
//! Every entity is built from a loose JSON object. Field lookup goes through
//! an explicit precedence list: the first key holding a non-empty scalar
//! wins. Required text is trimmed (and may end up empty, which the caller
//! rejects or filters); optional text is trimmed and empty becomes `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Case, Client, Resource, Stats, SupportDesk, Task, TeamMember};

const CREATED_AT_KEYS: &[&str] = &["createdAt", "created_at"];

/// Current time at the precision timestamps are stored with.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Read-only view over a JSON object used by the normalizers.
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    #[must_use]
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// Value of the first key in `keys` holding non-blank text.
    #[must_use]
    pub fn optional(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .find_map(scalar_text)
    }

    /// Like [`Fields::optional`] but yields an empty string when absent.
    #[must_use]
    pub fn text(&self, keys: &[&str]) -> String {
        self.optional(keys).unwrap_or_default()
    }

    /// The supplied id when present, otherwise a fresh one.
    #[must_use]
    pub fn id_or_new(&self) -> String {
        self.optional(&["id"]).unwrap_or_else(new_id)
    }

    /// The supplied creation time, or `fallback` when missing or malformed.
    #[must_use]
    pub fn created_at_or(&self, fallback: DateTime<Utc>) -> DateTime<Utc> {
        CREATED_AT_KEYS
            .iter()
            .filter_map(|key| self.map.get(*key))
            .find(|v| scalar_text(v).is_some())
            .and_then(parse_timestamp)
            .unwrap_or(fallback)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Accepts RFC 3339, SQLite's `YYYY-MM-DD HH:MM:SS`, bare dates and epoch
/// milliseconds.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.trunc_subsecs(3)),
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                        .ok()
                        .map(|ndt| ndt.and_utc())
                })
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|ndt| ndt.and_utc())
                })
                .map(|dt| dt.trunc_subsecs(3))
        }
        _ => None,
    }
}

/// Shared behaviour of the six portal collections.
pub trait PortalRecord: Sized {
    /// Singular name used in log lines.
    const KIND: &'static str;
    /// Message returned when a create request lacks mandatory fields.
    const REQUIRED_MESSAGE: &'static str;

    /// Builds a normalized record. A supplied id is kept, otherwise a new one
    /// is generated; the creation time falls back to `now`.
    fn normalize(fields: &Fields<'_>, now: DateTime<Utc>) -> Self;

    fn has_required_fields(&self) -> bool;

    fn id(&self) -> &str;

    /// Overwrites the server-assigned fields.
    fn assign(&mut self, id: String, created_at: DateTime<Utc>);

    fn from_json(map: &Map<String, Value>, now: DateTime<Utc>) -> Self {
        Self::normalize(&Fields::new(map), now)
    }
}

impl PortalRecord for Case {
    const KIND: &'static str = "case";
    const REQUIRED_MESSAGE: &'static str = "Case number and client are required.";

    fn normalize(f: &Fields<'_>, now: DateTime<Utc>) -> Self {
        Self {
            id: f.id_or_new(),
            case_number: f.text(&["caseNumber", "case_number"]),
            client: f.text(&["client"]),
            opponent: f.optional(&["opponent", "opponent_name"]),
            practice_area: f.optional(&["practiceArea", "practice_area"]),
            next_date: f.optional(&["nextDate", "next_date"]),
            status: f.optional(&["status"]),
            courtroom: f.optional(&["courtroom"]),
            notes: f.optional(&["notes"]),
            created_at: f.created_at_or(now),
        }
    }

    fn has_required_fields(&self) -> bool {
        !self.case_number.is_empty() && !self.client.is_empty()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn assign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl PortalRecord for Client {
    const KIND: &'static str = "client";
    const REQUIRED_MESSAGE: &'static str = "Organisation name is required.";

    fn normalize(f: &Fields<'_>, now: DateTime<Utc>) -> Self {
        Self {
            id: f.id_or_new(),
            organisation: f.text(&["organisation", "name"]),
            primary_contact: f.optional(&["primaryContact", "primary_contact"]),
            email: f.optional(&["email"]),
            phone: f.optional(&["phone"]),
            address: f.optional(&["address"]),
            notes: f.optional(&["notes"]),
            created_at: f.created_at_or(now),
        }
    }

    fn has_required_fields(&self) -> bool {
        !self.organisation.is_empty()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn assign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl PortalRecord for Task {
    const KIND: &'static str = "task";
    const REQUIRED_MESSAGE: &'static str = "Title, owner, and due date are required.";

    fn normalize(f: &Fields<'_>, now: DateTime<Utc>) -> Self {
        Self {
            id: f.id_or_new(),
            title: f.text(&["title"]),
            owner: f.text(&["owner"]),
            due: f.text(&["due"]),
            created_at: f.created_at_or(now),
        }
    }

    fn has_required_fields(&self) -> bool {
        !self.title.is_empty() && !self.owner.is_empty() && !self.due.is_empty()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn assign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl PortalRecord for TeamMember {
    const KIND: &'static str = "team member";
    const REQUIRED_MESSAGE: &'static str = "Name and role are required.";

    fn normalize(f: &Fields<'_>, now: DateTime<Utc>) -> Self {
        Self {
            id: f.id_or_new(),
            name: f.text(&["name"]),
            role: f.text(&["role"]),
            phone: f.optional(&["phone"]),
            email: f.optional(&["email"]),
            created_at: f.created_at_or(now),
        }
    }

    fn has_required_fields(&self) -> bool {
        !self.name.is_empty() && !self.role.is_empty()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn assign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl PortalRecord for Resource {
    const KIND: &'static str = "resource";
    const REQUIRED_MESSAGE: &'static str = "Title is required.";

    fn normalize(f: &Fields<'_>, now: DateTime<Utc>) -> Self {
        Self {
            id: f.id_or_new(),
            title: f.text(&["title"]),
            kind: f.optional(&["type"]),
            link: f.optional(&["link"]),
            owner: f.optional(&["owner"]),
            notes: f.optional(&["notes"]),
            created_at: f.created_at_or(now),
        }
    }

    fn has_required_fields(&self) -> bool {
        !self.title.is_empty()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn assign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

impl PortalRecord for SupportDesk {
    const KIND: &'static str = "support desk";
    const REQUIRED_MESSAGE: &'static str = "Department is required.";

    fn normalize(f: &Fields<'_>, now: DateTime<Utc>) -> Self {
        Self {
            id: f.id_or_new(),
            department: f.text(&["department"]),
            phone: f.optional(&["phone"]),
            email: f.optional(&["email"]),
            hours: f.optional(&["hours"]),
            notes: f.optional(&["notes"]),
            created_at: f.created_at_or(now),
        }
    }

    fn has_required_fields(&self) -> bool {
        !self.department.is_empty()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn assign(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

/// A normalized bulk-replace payload. Entries are not yet filtered by
/// required fields; the store drops incomplete ones while importing.
#[derive(Debug, Clone, Default)]
pub struct PortalImport {
    pub stats: Stats,
    pub cases: Vec<Case>,
    pub clients: Vec<Client>,
    pub tasks: Vec<Task>,
    pub team: Vec<TeamMember>,
    pub resources: Vec<Resource>,
    pub support_desks: Vec<SupportDesk>,
}

impl PortalImport {
    /// Missing or non-array collections import as empty; non-object entries
    /// normalize to records without required fields.
    #[must_use]
    pub fn from_json(map: &Map<String, Value>) -> Self {
        let now = now();
        let empty = Map::new();
        let stats = map
            .get("stats")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        Self {
            stats: Stats::from_json(stats),
            cases: collection(map, "cases", now),
            clients: collection(map, "clients", now),
            tasks: collection(map, "tasks", now),
            team: collection(map, "team", now),
            resources: collection(map, "resources", now),
            support_desks: collection(map, "supportDesks", now),
        }
    }
}

fn collection<R: PortalRecord>(map: &Map<String, Value>, key: &str, now: DateTime<Utc>) -> Vec<R> {
    let empty = Map::new();
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| R::from_json(item.as_object().unwrap_or(&empty), now))
                .collect()
        })
        .unwrap_or_default()
}
