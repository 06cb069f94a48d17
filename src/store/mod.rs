mod records;
mod schema;
mod seed;
mod sqlite;

pub use seed::seed_defaults;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    /// Creates a user from an already hashed password. Email is trimmed and
    /// lowercased, name trimmed; either ending up empty is a validation error.
    fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<User>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    // Session operations
    fn create_session(&self, user_id: i64, ttl_hours: f64) -> Result<Session>;
    /// Resolves a token to its live session. Expired sessions are deleted and
    /// reported as absent.
    fn find_session(&self, token: &str) -> Result<Option<SessionUser>>;
    fn delete_session(&self, token: &str) -> Result<()>;
    fn count_user_sessions(&self, user_id: i64) -> Result<i64>;
    fn prune_expired_sessions(&self) -> Result<usize>;

    // Stats operations
    fn ensure_stats(&self) -> Result<()>;
    fn get_stats(&self) -> Result<Stats>;
    fn update_stats(&self, updates: &[(StatKey, f64)]) -> Result<Stats>;

    // Case operations
    fn create_case(&self, case: Case) -> Result<Case>;
    fn list_cases(&self) -> Result<Vec<Case>>;
    fn delete_case(&self, id: &str) -> Result<bool>;

    // Client operations
    fn create_client(&self, client: Client) -> Result<Client>;
    fn list_clients(&self) -> Result<Vec<Client>>;
    fn delete_client(&self, id: &str) -> Result<bool>;

    // Task operations
    fn create_task(&self, task: Task) -> Result<Task>;
    fn list_tasks(&self) -> Result<Vec<Task>>;
    fn delete_task(&self, id: &str) -> Result<bool>;

    // Team operations
    fn create_team_member(&self, member: TeamMember) -> Result<TeamMember>;
    fn list_team_members(&self) -> Result<Vec<TeamMember>>;
    fn delete_team_member(&self, id: &str) -> Result<bool>;

    // Resource operations
    fn create_resource(&self, resource: Resource) -> Result<Resource>;
    fn list_resources(&self) -> Result<Vec<Resource>>;
    fn delete_resource(&self, id: &str) -> Result<bool>;

    // Support desk operations
    fn create_support_desk(&self, desk: SupportDesk) -> Result<SupportDesk>;
    fn list_support_desks(&self) -> Result<Vec<SupportDesk>>;
    fn delete_support_desk(&self, id: &str) -> Result<bool>;

    // Portal operations
    fn portal_snapshot(&self) -> Result<PortalSnapshot>;
    /// Replaces stats and every collection in one transaction. Records
    /// missing required fields are skipped.
    fn replace_portal_data(&self, import: &PortalImport) -> Result<PortalSnapshot>;
}
