//! Submission rates, grade averages and the due-today summary.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate};

use crate::errors::AppError;
use crate::models::fields::{non_blank, required};
use crate::models::{
    ClassReport, ClassStats, ClassStatsRequest, DueSummary, RosterEntry, StudentRefRequest,
    StudentReport, StudentStats,
};
use crate::store::Store;

/// Round half up, matching how the mobile client displays percentages.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Running totals over roster rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub total: u32,
    pub submitted: u32,
    pub score_sum: f64,
    pub graded: u32,
}

impl Tally {
    pub fn add(&mut self, row: &RosterEntry) {
        self.total += 1;
        if row.is_submitted() {
            self.submitted += 1;
        }
        if let Some(score) = row.score() {
            self.score_sum += score;
            self.graded += 1;
        }
    }

    pub fn merge(&mut self, other: &Tally) {
        self.total += other.total;
        self.submitted += other.submitted;
        self.score_sum += other.score_sum;
        self.graded += other.graded;
    }

    /// Percentage of rows submitted; 0 when there are no rows.
    pub fn submission_rate(&self) -> i64 {
        if self.total == 0 {
            return 0;
        }
        round_half_up(f64::from(self.submitted) / f64::from(self.total) * 100.0)
    }

    /// Mean of numeric grades; 0 when nothing is graded.
    pub fn avg_score(&self) -> i64 {
        if self.graded == 0 {
            return 0;
        }
        round_half_up(self.score_sum / f64::from(self.graded))
    }
}

/// Stats of one student. Every assignment counts towards the total, whether
/// or not its roster contains the student; submissions and grades come from
/// the student's own rows.
pub async fn student_stats(
    store: &dyn Store,
    request: StudentRefRequest,
) -> Result<StudentStats, AppError> {
    let student_id = required(request.student_id, "studentId")?;

    let mut tally = Tally::default();
    for row in store
        .list_all_roster_entries()
        .await?
        .iter()
        .filter(|r| r.student_id == student_id)
    {
        tally.add(row);
    }
    let assignments = store.list_assignments().await?.len();
    tally.total = u32::try_from(assignments).unwrap_or(u32::MAX);

    Ok(StudentStats {
        total_assignments: tally.total,
        submitted_count: tally.submitted,
        submission_rate: tally.submission_rate(),
        avg_score: tally.avg_score(),
    })
}

/// Per-student and class-wide stats from one pass over all roster rows.
pub async fn class_stats(
    store: &dyn Store,
    request: ClassStatsRequest,
) -> Result<ClassReport, AppError> {
    let class_id = non_blank(request.class_id);
    let students: Vec<_> = store
        .list_users()
        .await?
        .into_iter()
        .filter(|u| u.is_student())
        .filter(|u| class_id.as_ref().map_or(true, |c| &u.class_id == c))
        .collect();

    let mut tallies: HashMap<&str, Tally> = students
        .iter()
        .map(|s| (s.id.as_str(), Tally::default()))
        .collect();

    let rows = store.list_all_roster_entries().await?;
    for row in &rows {
        if let Some(tally) = tallies.get_mut(row.student_id.as_str()) {
            tally.add(row);
        }
    }

    let mut class = Tally::default();
    let reports = students
        .iter()
        .map(|student| {
            let tally = tallies.get(student.id.as_str()).copied().unwrap_or_default();
            class.merge(&tally);
            StudentReport {
                id: student.id.clone(),
                name: student.name.clone(),
                submission_rate: tally.submission_rate(),
                avg_score: tally.avg_score(),
            }
        })
        .collect();

    Ok(ClassReport {
        class_stats: ClassStats {
            submission_rate: class.submission_rate(),
            avg_score: class.avg_score(),
        },
        students: reports,
    })
}

/// Calendar date of a stored due date in the server's timezone.
///
/// Accepts `yyyy-MM-dd` or a full RFC 3339 timestamp.
pub fn due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Assignments due on `today` with the seat numbers of students who have not
/// submitted. Assignments nobody is missing are left out.
pub async fn daily_summary(store: &dyn Store, today: NaiveDate) -> Result<Vec<DueSummary>, AppError> {
    let due: Vec<_> = store
        .list_assignments()
        .await?
        .into_iter()
        .filter(|a| due_date(&a.end_date) == Some(today))
        .collect();
    if due.is_empty() {
        return Ok(Vec::new());
    }

    let users = store.list_users().await?;
    let mut summary = Vec::new();

    for assignment in due {
        let submitted: Vec<String> = store
            .list_roster(&assignment.id)
            .await?
            .into_iter()
            .filter(RosterEntry::is_submitted)
            .map(|r| r.student_id)
            .collect();

        let missing: Vec<String> = users
            .iter()
            .filter(|u| u.is_student_in(&assignment.class_id))
            .filter(|u| !submitted.contains(&u.id))
            .map(|u| u.display_number().to_string())
            .collect();

        if missing.is_empty() {
            continue;
        }
        let subject = if assignment.description.trim().is_empty() {
            assignment.id
        } else {
            assignment.description
        };
        summary.push(DueSummary { subject, missing });
    }

    Ok(summary)
}
