//! In-memory data provider.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Store;
use crate::errors::AppError;
use crate::models::{
    Assignment, ContactNote, ContactSignature, PointsEntry, Question, QuestionStatus,
    RosterEntry, SubmissionStatus, User,
};

/// Id-keyed rows that remember insertion order.
#[derive(Debug)]
struct Table<T> {
    next_seq: u64,
    rows: BTreeMap<u64, T>,
    ids: HashMap<String, u64>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            rows: BTreeMap::new(),
            ids: HashMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn get(&self, id: &str) -> Option<&T> {
        self.ids.get(id).and_then(|seq| self.rows.get(seq))
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        let seq = self.ids.get(id)?;
        self.rows.get_mut(seq)
    }

    fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Append a new row; replaces in place when the id already exists.
    fn upsert(&mut self, id: &str, row: T) {
        if let Some(seq) = self.ids.get(id) {
            self.rows.insert(*seq, row);
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.ids.insert(id.to_string(), seq);
        self.rows.insert(seq, row);
    }

    fn remove(&mut self, id: &str) -> Option<T> {
        let seq = self.ids.remove(id)?;
        self.rows.remove(&seq)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    fn last(&self) -> Option<&T> {
        self.rows.values().next_back()
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    assignments: Table<Assignment>,
    rosters: HashMap<String, Vec<RosterEntry>>,
    questions: Table<Question>,
    points: Vec<PointsEntry>,
    notes: Table<ContactNote>,
    signatures: HashMap<(String, String), ContactSignature>,
}

impl Tables {
    fn roster_row(&mut self, assignment_id: &str, student_id: &str) -> Option<&mut RosterEntry> {
        self.rosters
            .get_mut(assignment_id)?
            .iter_mut()
            .find(|r| r.student_id == student_id)
    }
}

/// Store that keeps every table in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.tables.read().await.users.iter().cloned().collect())
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.tables.write().await.users.upsert(&user.id, user.clone());
        Ok(())
    }

    async fn update_user_name(&self, id: &str, name: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(id) {
            Some(user) => {
                user.name = name.to_string();
                true
            }
            None => false,
        })
    }

    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, AppError> {
        Ok(self.tables.read().await.assignments.get(id).cloned())
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        Ok(self.tables.read().await.assignments.iter().cloned().collect())
    }

    async fn create_assignment(
        &self,
        assignment: &Assignment,
        roster: &[RosterEntry],
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.assignments.contains(&assignment.id) {
            return Err(AppError::AlreadyExists(format!(
                "Assignment already exists: {}",
                assignment.id
            )));
        }
        tables
            .assignments
            .upsert(&assignment.id, assignment.clone());
        tables
            .rosters
            .insert(assignment.id.clone(), roster.to_vec());
        Ok(())
    }

    async fn update_assignment_description(
        &self,
        id: &str,
        description: &str,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.assignments.get_mut(id) {
            Some(assignment) => {
                assignment.description = description.to_string();
                true
            }
            None => false,
        })
    }

    async fn delete_assignment(&self, id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let had_roster = tables.rosters.remove(id).is_some();
        let had_metadata = tables.assignments.remove(id).is_some();
        Ok(had_roster || had_metadata)
    }

    async fn list_roster(&self, assignment_id: &str) -> Result<Vec<RosterEntry>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .rosters
            .get(assignment_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_all_roster_entries(&self) -> Result<Vec<RosterEntry>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .iter()
            .filter_map(|a| tables.rosters.get(&a.id))
            .flatten()
            .cloned()
            .collect())
    }

    async fn get_roster_entry(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<RosterEntry>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .rosters
            .get(assignment_id)
            .and_then(|rows| rows.iter().find(|r| r.student_id == student_id))
            .cloned())
    }

    async fn set_status(
        &self,
        assignment_id: &str,
        student_id: &str,
        status: SubmissionStatus,
        now: &str,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.roster_row(assignment_id, student_id) {
            Some(row) => {
                row.transition(status, now);
                true
            }
            None => false,
        })
    }

    async fn set_grade(
        &self,
        assignment_id: &str,
        student_id: &str,
        grade: Option<&str>,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.roster_row(assignment_id, student_id) {
            Some(row) => {
                row.grade = grade.map(str::to_string);
                true
            }
            None => false,
        })
    }

    async fn insert_question(&self, question: &Question) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .questions
            .upsert(&question.id, question.clone());
        Ok(())
    }

    async fn list_questions(&self) -> Result<Vec<Question>, AppError> {
        Ok(self.tables.read().await.questions.iter().cloned().collect())
    }

    async fn get_question(&self, id: &str) -> Result<Option<Question>, AppError> {
        Ok(self.tables.read().await.questions.get(id).cloned())
    }

    async fn answer_question(&self, id: &str, answer_text: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.questions.get_mut(id) {
            Some(question) => {
                question.status = QuestionStatus::Answered;
                question.answer_text = answer_text.to_string();
                true
            }
            None => false,
        })
    }

    async fn append_points(&self, entry: &PointsEntry) -> Result<(), AppError> {
        self.tables.write().await.points.push(entry.clone());
        Ok(())
    }

    async fn list_points(&self, student_id: &str) -> Result<Vec<PointsEntry>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .points
            .iter()
            .filter(|p| p.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn insert_note(&self, note: &ContactNote) -> Result<(), AppError> {
        self.tables.write().await.notes.upsert(&note.id, note.clone());
        Ok(())
    }

    async fn latest_note(&self) -> Result<Option<ContactNote>, AppError> {
        Ok(self.tables.read().await.notes.last().cloned())
    }

    async fn get_note(&self, id: &str) -> Result<Option<ContactNote>, AppError> {
        Ok(self.tables.read().await.notes.get(id).cloned())
    }

    async fn get_signature(
        &self,
        note_id: &str,
        student_id: &str,
    ) -> Result<Option<ContactSignature>, AppError> {
        let key = (note_id.to_string(), student_id.to_string());
        Ok(self.tables.read().await.signatures.get(&key).cloned())
    }

    async fn insert_signature(&self, signature: &ContactSignature) -> Result<bool, AppError> {
        let key = (signature.note_id.clone(), signature.student_id.clone());
        let mut tables = self.tables.write().await;
        if tables.signatures.contains_key(&key) {
            return Ok(false);
        }
        tables.signatures.insert(key, signature.clone());
        Ok(true)
    }

    async fn count_signatures(&self, note_id: &str) -> Result<usize, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .signatures
            .keys()
            .filter(|(note, _)| note == note_id)
            .count())
    }
}
