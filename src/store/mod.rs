//! Data provider abstraction.
//!
//! Every table is keyed by id. The SQLite repository is the persistent
//! provider; `MemoryStore` is the in-memory fixture provider used for demos and
//! tests. Listing methods return rows in insertion order.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{
    Assignment, ContactNote, ContactSignature, PointsEntry, Question, RosterEntry,
    SubmissionStatus, User,
};

#[async_trait]
pub trait Store: Send + Sync {
    // ==================== USERS ====================

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Insert a user or replace the row with the same id.
    async fn upsert_user(&self, user: &User) -> Result<(), AppError>;

    /// Returns `false` when no user has this id.
    async fn update_user_name(&self, id: &str, name: &str) -> Result<bool, AppError>;

    // ==================== ASSIGNMENTS ====================

    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, AppError>;

    async fn list_assignments(&self) -> Result<Vec<Assignment>, AppError>;

    /// Write the metadata row together with its roster snapshot.
    ///
    /// Fails with `AlreadyExists` without touching anything if the id is taken.
    async fn create_assignment(
        &self,
        assignment: &Assignment,
        roster: &[RosterEntry],
    ) -> Result<(), AppError>;

    async fn update_assignment_description(
        &self,
        id: &str,
        description: &str,
    ) -> Result<bool, AppError>;

    /// Remove metadata and roster. Returns `false` when the id is unknown.
    async fn delete_assignment(&self, id: &str) -> Result<bool, AppError>;

    // ==================== ROSTERS ====================

    async fn list_roster(&self, assignment_id: &str) -> Result<Vec<RosterEntry>, AppError>;

    /// Every roster row across all assignments, grouped by assignment in
    /// creation order.
    async fn list_all_roster_entries(&self) -> Result<Vec<RosterEntry>, AppError>;

    async fn get_roster_entry(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<RosterEntry>, AppError>;

    /// Set a row's status, stamping or clearing `submitted_at` as the status
    /// requires. The grade is left alone. Returns `false` when there is no row.
    async fn set_status(
        &self,
        assignment_id: &str,
        student_id: &str,
        status: SubmissionStatus,
        now: &str,
    ) -> Result<bool, AppError>;

    /// Set or clear a row's grade without touching its status.
    async fn set_grade(
        &self,
        assignment_id: &str,
        student_id: &str,
        grade: Option<&str>,
    ) -> Result<bool, AppError>;

    // ==================== QUESTIONS ====================

    async fn insert_question(&self, question: &Question) -> Result<(), AppError>;

    async fn list_questions(&self) -> Result<Vec<Question>, AppError>;

    async fn get_question(&self, id: &str) -> Result<Option<Question>, AppError>;

    /// Mark answered with `answer_text`. Returns `false` when the id is unknown.
    async fn answer_question(&self, id: &str, answer_text: &str) -> Result<bool, AppError>;

    // ==================== POINTS ====================

    async fn append_points(&self, entry: &PointsEntry) -> Result<(), AppError>;

    async fn list_points(&self, student_id: &str) -> Result<Vec<PointsEntry>, AppError>;

    // ==================== CONTACT BOOK ====================

    async fn insert_note(&self, note: &ContactNote) -> Result<(), AppError>;

    /// The most recently appended note.
    async fn latest_note(&self) -> Result<Option<ContactNote>, AppError>;

    async fn get_note(&self, id: &str) -> Result<Option<ContactNote>, AppError>;

    async fn get_signature(
        &self,
        note_id: &str,
        student_id: &str,
    ) -> Result<Option<ContactSignature>, AppError>;

    /// Insert unless a signature for the pair exists. Returns whether a row was
    /// written.
    async fn insert_signature(&self, signature: &ContactSignature) -> Result<bool, AppError>;

    async fn count_signatures(&self, note_id: &str) -> Result<usize, AppError>;
}
