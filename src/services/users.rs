//! Login, profile and roster seeding.

use std::path::Path;

use crate::errors::AppError;
use crate::models::fields::required;
use crate::models::{LoginRequest, Role, StudentRef, UpdateProfileRequest, User};
use crate::store::Store;

/// Demo accounts written into an empty user table.
pub fn demo_users() -> Vec<User> {
    vec![
        User {
            id: "T001".to_string(),
            name: "Teacher Demo".to_string(),
            role: Role::Teacher,
            class_id: "ClassA".to_string(),
            number: None,
        },
        User {
            id: "S123456".to_string(),
            name: "Student Demo".to_string(),
            role: Role::Student,
            class_id: "ClassA".to_string(),
            number: None,
        },
    ]
}

/// Seed the demo accounts if no user exists yet. Returns whether it seeded.
pub async fn seed_demo(store: &dyn Store) -> Result<bool, AppError> {
    if !store.list_users().await?.is_empty() {
        return Ok(false);
    }
    for user in demo_users() {
        store.upsert_user(&user).await?;
    }
    tracing::info!("Seeded demo users");
    Ok(true)
}

/// Upsert every user of a JSON roster file.
pub async fn import_roster(store: &dyn Store, path: &Path) -> Result<usize, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Internal(format!("Failed to read roster {}: {}", path.display(), e))
    })?;
    let users: Vec<User> = serde_json::from_str(&raw)?;
    for user in &users {
        store.upsert_user(user).await?;
    }
    tracing::info!(count = users.len(), "Imported roster from {}", path.display());
    Ok(users.len())
}

pub async fn login(store: &dyn Store, request: LoginRequest) -> Result<User, AppError> {
    let user_id = required(request.user_id, "userId")?;
    store
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found: {}", user_id)))
}

pub async fn update_profile(
    store: &dyn Store,
    request: UpdateProfileRequest,
) -> Result<(), AppError> {
    let user_id = required(request.user_id, "userId")?;
    let name = required(request.name, "name")?;

    if !store.update_user_name(&user_id, &name).await? {
        return Err(AppError::NotFound(format!("User not found: {}", user_id)));
    }
    tracing::info!(user_id = %user_id, "Profile name updated");
    Ok(())
}

pub async fn list_students(store: &dyn Store) -> Result<Vec<StudentRef>, AppError> {
    Ok(store
        .list_users()
        .await?
        .iter()
        .filter(|u| u.is_student())
        .map(StudentRef::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_only_into_empty_table() {
        let store = MemoryStore::new();
        assert!(seed_demo(&store).await.unwrap());
        assert!(!seed_demo(&store).await.unwrap());
        assert_eq!(store.list_users().await.unwrap().len(), 2);

        let teacher = login(
            &store,
            LoginRequest {
                user_id: Some(" T001 ".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(teacher.role, Role::Teacher);
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let store = fixtures::classroom().await;
        let err = login(
            store.as_ref(),
            LoginRequest {
                user_id: Some("nobody".to_string()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = login(store.as_ref(), LoginRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err, AppError::missing_field("userId"));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = fixtures::classroom().await;
        update_profile(
            store.as_ref(),
            UpdateProfileRequest {
                user_id: Some("S1".to_string()),
                name: Some("Amy Lin".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(store.get_user("S1").await.unwrap().unwrap().name, "Amy Lin");

        let err = update_profile(
            store.as_ref(),
            UpdateProfileRequest {
                user_id: Some("S404".to_string()),
                name: Some("Ghost".to_string()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_students_skips_teachers() {
        let store = fixtures::classroom().await;
        let ids: Vec<String> = list_students(store.as_ref())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["S1", "S2", "S3"]);
    }

    #[tokio::test]
    async fn test_import_roster_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(
            &path,
            r#"[{"id":"S7","name":"Dee","role":"student","classId":"ClassA","number":"07"}]"#,
        )
        .unwrap();

        let store = fixtures::classroom().await;
        assert_eq!(import_roster(store.as_ref(), &path).await.unwrap(), 1);
        let user = store.get_user("S7").await.unwrap().unwrap();
        assert_eq!(user.display_number(), "07");
    }
}
