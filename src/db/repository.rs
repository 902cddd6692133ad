//! SQLite implementation of the data store.
//!
//! Uses prepared statements; the assignment snapshot and deletion run in
//! transactions so metadata and roster never diverge.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Assignment, ContactNote, ContactSignature, PointsEntry, Question, QuestionStatus, Role,
    RosterEntry, Stamp, SubmissionStatus, User,
};
use crate::store::Store;

const ROSTER_COLUMNS: &str =
    "assignment_id, student_id, status, submitted_at, student_name, grade";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for Repository {
    // ==================== USER OPERATIONS ====================

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, name, role, class_id, number FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows =
            sqlx::query("SELECT id, name, role, class_id, number FROM users ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO users (id, name, role, class_id, number) VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   name = excluded.name,
                   role = excluded.role,
                   class_id = excluded.class_id,
                   number = excluded.number"#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.class_id)
        .bind(&user.number)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_user_name(&self, id: &str, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== ASSIGNMENT OPERATIONS ====================

    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, AppError> {
        let row = sqlx::query(
            "SELECT id, start_date, end_date, description, created_at, class_id, teacher_id FROM assignments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(assignment_from_row))
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        let rows = sqlx::query(
            "SELECT id, start_date, end_date, description, created_at, class_id, teacher_id FROM assignments ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(assignment_from_row).collect())
    }

    async fn create_assignment(
        &self,
        assignment: &Assignment,
        roster: &[RosterEntry],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // The UNIQUE id decides between concurrent creates
        let inserted = sqlx::query(
            "INSERT INTO assignments (id, start_date, end_date, description, created_at, class_id, teacher_id) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&assignment.id)
        .bind(&assignment.start_date)
        .bind(&assignment.end_date)
        .bind(&assignment.description)
        .bind(&assignment.created_at)
        .bind(&assignment.class_id)
        .bind(&assignment.teacher_id)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::AlreadyExists(format!(
                    "Assignment already exists: {}",
                    assignment.id
                )))
            }
            Err(e) => return Err(e.into()),
        }

        for (position, entry) in roster.iter().enumerate() {
            sqlx::query(
                "INSERT INTO roster_entries (assignment_id, student_id, position, status, submitted_at, student_name, grade) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&assignment.id)
            .bind(&entry.student_id)
            .bind(position as i64)
            .bind(entry.status.as_str())
            .bind(&entry.submitted_at)
            .bind(&entry.student_name)
            .bind(&entry.grade)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_assignment_description(
        &self,
        id: &str,
        description: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE assignments SET description = ? WHERE id = ?")
            .bind(description)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_assignment(&self, id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let roster = sqlx::query("DELETE FROM roster_entries WHERE assignment_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let metadata = sqlx::query("DELETE FROM assignments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(roster.rows_affected() > 0 || metadata.rows_affected() > 0)
    }

    // ==================== ROSTER OPERATIONS ====================

    async fn list_roster(&self, assignment_id: &str) -> Result<Vec<RosterEntry>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM roster_entries WHERE assignment_id = ? ORDER BY position",
            ROSTER_COLUMNS
        ))
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(roster_entry_from_row).collect())
    }

    async fn list_all_roster_entries(&self) -> Result<Vec<RosterEntry>, AppError> {
        let rows = sqlx::query(
            r#"SELECT r.assignment_id, r.student_id, r.status, r.submitted_at, r.student_name, r.grade
               FROM roster_entries r
               JOIN assignments a ON a.id = r.assignment_id
               ORDER BY a.seq, r.position"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(roster_entry_from_row).collect())
    }

    async fn get_roster_entry(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<RosterEntry>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM roster_entries WHERE assignment_id = ? AND student_id = ?",
            ROSTER_COLUMNS
        ))
        .bind(assignment_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(roster_entry_from_row))
    }

    async fn set_status(
        &self,
        assignment_id: &str,
        student_id: &str,
        status: SubmissionStatus,
        now: &str,
    ) -> Result<bool, AppError> {
        let query = match status.stamp(now) {
            Stamp::Set(now) => sqlx::query(
                "UPDATE roster_entries SET status = ?, submitted_at = ? WHERE assignment_id = ? AND student_id = ?",
            )
            .bind(status.as_str())
            .bind(now),
            Stamp::Clear => sqlx::query(
                "UPDATE roster_entries SET status = ?, submitted_at = NULL WHERE assignment_id = ? AND student_id = ?",
            )
            .bind(status.as_str()),
            Stamp::Keep => sqlx::query(
                "UPDATE roster_entries SET status = ? WHERE assignment_id = ? AND student_id = ?",
            )
            .bind(status.as_str()),
        };

        let result = query
            .bind(assignment_id)
            .bind(student_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_grade(
        &self,
        assignment_id: &str,
        student_id: &str,
        grade: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE roster_entries SET grade = ? WHERE assignment_id = ? AND student_id = ?",
        )
        .bind(grade)
        .bind(assignment_id)
        .bind(student_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== QUESTION OPERATIONS ====================

    async fn insert_question(&self, question: &Question) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO questions (id, student_id, assignment_id, question_text, status, answer_text, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&question.id)
        .bind(&question.student_id)
        .bind(&question.assignment_id)
        .bind(&question.question_text)
        .bind(question.status.as_str())
        .bind(&question.answer_text)
        .bind(&question.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_questions(&self) -> Result<Vec<Question>, AppError> {
        let rows = sqlx::query(
            "SELECT id, student_id, assignment_id, question_text, status, answer_text, created_at FROM questions ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(question_from_row).collect())
    }

    async fn get_question(&self, id: &str) -> Result<Option<Question>, AppError> {
        let row = sqlx::query(
            "SELECT id, student_id, assignment_id, question_text, status, answer_text, created_at FROM questions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(question_from_row))
    }

    async fn answer_question(&self, id: &str, answer_text: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE questions SET status = ?, answer_text = ? WHERE id = ?")
            .bind(QuestionStatus::Answered.as_str())
            .bind(answer_text)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== POINTS OPERATIONS ====================

    async fn append_points(&self, entry: &PointsEntry) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO points_log (id, student_id, change, reason, created_at, teacher_id) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.student_id)
        .bind(entry.change)
        .bind(&entry.reason)
        .bind(&entry.timestamp)
        .bind(&entry.teacher_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_points(&self, student_id: &str) -> Result<Vec<PointsEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT id, student_id, change, reason, created_at, teacher_id FROM points_log WHERE student_id = ? ORDER BY seq",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| PointsEntry {
                id: row.get("id"),
                student_id: row.get("student_id"),
                change: row.get("change"),
                reason: row.get("reason"),
                timestamp: row.get("created_at"),
                teacher_id: row.get("teacher_id"),
            })
            .collect())
    }

    // ==================== CONTACT BOOK OPERATIONS ====================

    async fn insert_note(&self, note: &ContactNote) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO contact_notes (id, note_date, content, teacher_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&note.id)
        .bind(&note.date)
        .bind(&note.content)
        .bind(&note.teacher_id)
        .bind(&note.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_note(&self) -> Result<Option<ContactNote>, AppError> {
        let row = sqlx::query(
            "SELECT id, note_date, content, teacher_id, created_at FROM contact_notes ORDER BY seq DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn get_note(&self, id: &str) -> Result<Option<ContactNote>, AppError> {
        let row = sqlx::query(
            "SELECT id, note_date, content, teacher_id, created_at FROM contact_notes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn get_signature(
        &self,
        note_id: &str,
        student_id: &str,
    ) -> Result<Option<ContactSignature>, AppError> {
        let row = sqlx::query(
            "SELECT note_id, student_id, status, signed_at FROM contact_signatures WHERE note_id = ? AND student_id = ?",
        )
        .bind(note_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ContactSignature {
            note_id: row.get("note_id"),
            student_id: row.get("student_id"),
            status: row.get("status"),
            signed_at: row.get("signed_at"),
        }))
    }

    async fn insert_signature(&self, signature: &ContactSignature) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO contact_signatures (note_id, student_id, status, signed_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&signature.note_id)
        .bind(&signature.student_id)
        .bind(&signature.status)
        .bind(&signature.signed_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_signatures(&self, note_id: &str) -> Result<usize, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM contact_signatures WHERE note_id = ?")
            .bind(note_id)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.get("n");
        Ok(count as usize)
    }
}

// Helper functions for row conversion

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, AppError> {
    let id: String = row.get("id");
    let role: String = row.get("role");
    let role = Role::parse(&role)
        .ok_or_else(|| AppError::Internal(format!("User {} has unknown role {:?}", id, role)))?;
    Ok(User {
        id,
        name: row.get("name"),
        role,
        class_id: row.get("class_id"),
        number: row.get("number"),
    })
}

fn assignment_from_row(row: &sqlx::sqlite::SqliteRow) -> Assignment {
    Assignment {
        id: row.get("id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        class_id: row.get("class_id"),
        teacher_id: row.get("teacher_id"),
    }
}

fn roster_entry_from_row(row: &sqlx::sqlite::SqliteRow) -> RosterEntry {
    let status: String = row.get("status");
    RosterEntry {
        assignment_id: row.get("assignment_id"),
        student_id: row.get("student_id"),
        status: SubmissionStatus::parse(&status).unwrap_or_default(),
        submitted_at: row.get("submitted_at"),
        student_name: row.get("student_name"),
        grade: row.get("grade"),
    }
}

fn question_from_row(row: &sqlx::sqlite::SqliteRow) -> Question {
    let status: String = row.get("status");
    Question {
        id: row.get("id"),
        student_id: row.get("student_id"),
        assignment_id: row.get("assignment_id"),
        question_text: row.get("question_text"),
        status: QuestionStatus::parse(&status).unwrap_or(QuestionStatus::Open),
        answer_text: row.get("answer_text"),
        timestamp: row.get("created_at"),
    }
}

fn note_from_row(row: &sqlx::sqlite::SqliteRow) -> ContactNote {
    ContactNote {
        id: row.get("id"),
        date: row.get("note_date"),
        content: row.get("content"),
        teacher_id: row.get("teacher_id"),
        created_at: row.get("created_at"),
    }
}
