//! Digital contact book with idempotent parent signatures.

use crate::errors::AppError;
use crate::models::fields::{non_blank, required};
use crate::models::{
    ContactNote, ContactSignature, CreateNoteRequest, LatestNote, LatestNoteRequest,
    SignNoteRequest, SIGNED,
};
use crate::services::{new_id, now_timestamp, today};
use crate::store::Store;

/// Result of a sign attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutcome {
    Signed,
    AlreadySigned,
}

impl SignOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SignOutcome::Signed => "Signed successfully",
            SignOutcome::AlreadySigned => "Already signed",
        }
    }
}

pub async fn create_note(
    store: &dyn Store,
    request: CreateNoteRequest,
) -> Result<ContactNote, AppError> {
    let content = required(request.content, "content")?;

    let note = ContactNote {
        id: new_id('N'),
        date: today().format("%Y-%m-%d").to_string(),
        content,
        teacher_id: non_blank(request.teacher_id),
        created_at: now_timestamp(),
    };
    store.insert_note(&note).await?;

    tracing::info!(note_id = %note.id, "Contact note created");
    Ok(note)
}

/// The last note written, regardless of its date, with the student's signature.
pub async fn latest(store: &dyn Store, request: LatestNoteRequest) -> Result<LatestNote, AppError> {
    let Some(note) = store.latest_note().await? else {
        return Ok(LatestNote {
            note: None,
            is_signed: false,
            signed_at: None,
        });
    };

    let signature = match non_blank(request.student_id) {
        Some(student_id) => store.get_signature(&note.id, &student_id).await?,
        None => None,
    };

    Ok(LatestNote {
        note: Some(note),
        is_signed: signature.is_some(),
        signed_at: signature.map(|s| s.signed_at),
    })
}

/// Sign a note for a student. A repeated sign is a successful no-op.
pub async fn sign(store: &dyn Store, request: SignNoteRequest) -> Result<SignOutcome, AppError> {
    let note_id = required(request.note_id, "noteId")?;
    let student_id = required(request.student_id, "studentId")?;

    if store.get_note(&note_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Note not found: {}", note_id)));
    }

    let signature = ContactSignature {
        note_id,
        student_id,
        status: SIGNED.to_string(),
        signed_at: now_timestamp(),
    };
    if store.insert_signature(&signature).await? {
        tracing::info!(note_id = %signature.note_id, student_id = %signature.student_id, "Note signed");
        Ok(SignOutcome::Signed)
    } else {
        Ok(SignOutcome::AlreadySigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn note(content: &str) -> CreateNoteRequest {
        CreateNoteRequest {
            content: Some(content.to_string()),
            teacher_id: Some("T001".to_string()),
        }
    }

    fn sign_req(note_id: &str, student: &str) -> SignNoteRequest {
        SignNoteRequest {
            note_id: Some(note_id.to_string()),
            student_id: Some(student.to_string()),
        }
    }

    fn for_student(student: &str) -> LatestNoteRequest {
        LatestNoteRequest {
            student_id: Some(student.to_string()),
        }
    }

    #[tokio::test]
    async fn test_no_notes_yet() {
        let store = MemoryStore::new();
        let result = latest(&store, for_student("S1")).await.unwrap();
        assert!(result.note.is_none());
        assert!(!result.is_signed);
    }

    #[tokio::test]
    async fn test_latest_is_last_appended() {
        let store = MemoryStore::new();
        create_note(&store, note("Bring crayons")).await.unwrap();
        let second = create_note(&store, note("Field trip form")).await.unwrap();

        let result = latest(&store, LatestNoteRequest::default()).await.unwrap();
        assert_eq!(result.note.unwrap().id, second.id);
        assert_eq!(second.date, today().format("%Y-%m-%d").to_string());
    }

    #[tokio::test]
    async fn test_signing_is_idempotent() {
        let store = MemoryStore::new();
        let created = create_note(&store, note("Sign please")).await.unwrap();

        assert_eq!(
            sign(&store, sign_req(&created.id, "S1")).await.unwrap(),
            SignOutcome::Signed
        );
        let first = latest(&store, for_student("S1")).await.unwrap();
        assert!(first.is_signed);

        assert_eq!(
            sign(&store, sign_req(&created.id, "S1")).await.unwrap(),
            SignOutcome::AlreadySigned
        );
        assert_eq!(store.count_signatures(&created.id).await.unwrap(), 1);

        let second = latest(&store, for_student("S1")).await.unwrap();
        assert_eq!(second.signed_at, first.signed_at);
        assert!(!latest(&store, for_student("S2")).await.unwrap().is_signed);
    }

    #[tokio::test]
    async fn test_sign_unknown_note() {
        let store = MemoryStore::new();
        let err = sign(&store, sign_req("N404", "S1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
