//! Integration tests for the homework backend.
//!
//! Each test runs the real router on a random port over a throwaway SQLite
//! database and talks to it through `ActionClient`.

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::client::{sort_by_deadline, ActionClient, ClientError};
use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::models::{Role, SubmissionStatus, User};
use crate::services::{today, users};
use crate::store::Store;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: ActionClient,
    base_url: String,
    store: Arc<dyn Store>,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let store: Arc<dyn Store> = Arc::new(Repository::new(pool));

        let mut config = Config::from_lookup(|_| None).expect("Default config");
        config.db_path = db_path;
        config.log_level = "warn".to_string();

        let state = AppState {
            store: store.clone(),
            config: Arc::new(config),
        };
        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: ActionClient::new(format!("{}/", base_url)).unwrap(),
            base_url,
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Fixture with teacher T001 and seat-numbered students S1, S2 in ClassA.
    async fn with_class() -> Self {
        let fixture = Self::new().await;
        for (id, name, role, number) in [
            ("T001", "Ms. Lin", Role::Teacher, None),
            ("S1", "Amy", Role::Student, Some("1")),
            ("S2", "Ben", Role::Student, Some("2")),
        ] {
            fixture
                .store
                .upsert_user(&User {
                    id: id.to_string(),
                    name: name.to_string(),
                    role,
                    class_id: "ClassA".to_string(),
                    number: number.map(str::to_string),
                })
                .await
                .unwrap();
        }
        fixture
    }

    async fn call(&self, action: &str, payload: Value) -> Result<Value, ClientError> {
        self.client.call(action, payload).await
    }

    async fn create(&self, id: &str, end_date: &str) -> Result<Value, ClientError> {
        self.call(
            "createAssignment",
            json!({
                "newAssignmentId": id,
                "startDate": "2026-10-01",
                "endDate": end_date,
                "description": format!("{} worksheet", id),
                "teacherId": "T001"
            }),
        )
        .await
    }

    async fn roster(&self, assignment_id: &str) -> Vec<Value> {
        let body = self
            .call("getAssignmentStatus", json!({ "assignmentId": assignment_id }))
            .await
            .unwrap();
        body["data"].as_array().cloned().unwrap_or_default()
    }
}

fn error_code(result: Result<Value, ClientError>) -> String {
    match result {
        Err(ClientError::Action { code, .. }) => code,
        other => panic!("expected an action error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = reqwest::get(format!("{}/health", fixture.base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_demo_seed_allows_login() {
    let fixture = TestFixture::new().await;
    assert!(users::seed_demo(fixture.store.as_ref()).await.unwrap());

    let teacher = fixture.client.login("T001").await.unwrap();
    assert_eq!(teacher.role, Role::Teacher);
    assert_eq!(teacher.class_id, "ClassA");

    let err = fixture.client.login("ghost").await.unwrap_err();
    assert!(matches!(err, ClientError::Action { ref code, .. } if code == "NOT_FOUND"));
}

#[tokio::test]
async fn test_homework_day_scenario() {
    let fixture = TestFixture::with_class().await;
    let due = today().format("%Y-%m-%d").to_string();

    let body = fixture.create("HW1", &due).await.unwrap();
    assert_eq!(body["message"], "作業建立成功: HW1 (Class ClassA)");

    let rows = fixture.roster("HW1").await;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["status"] == "未繳交"));

    let receipt = fixture
        .client
        .submit_scan(r#"{"studentId": "S1"}"#, Some("HW1"))
        .await
        .unwrap();
    assert_eq!(receipt.student_id, "S1");
    assert_eq!(receipt.assignment_id, "HW1");

    let rows = fixture.roster("HW1").await;
    assert_eq!(rows[0]["studentId"], "S1");
    assert_eq!(rows[0]["status"], "已繳交");
    assert_eq!(rows[0]["submittedAt"], json!(receipt.timestamp));
    assert_eq!(rows[1]["status"], "未繳交");

    let summary = fixture.call("getDailySummary", json!({})).await.unwrap();
    assert_eq!(
        summary["summary"],
        json!([{ "subject": "HW1 worksheet", "missing": ["2"] }])
    );

    let mine = fixture.client.assignments(Some("S2")).await.unwrap();
    assert_eq!(mine[0].status, Some(SubmissionStatus::NotSubmitted));
}

#[tokio::test]
async fn test_late_joiner_cannot_submit() {
    let fixture = TestFixture::with_class().await;
    fixture.create("HW1", "2026-10-20").await.unwrap();

    fixture
        .store
        .upsert_user(&User {
            id: "S9".to_string(),
            name: "Late".to_string(),
            role: Role::Student,
            class_id: "ClassA".to_string(),
            number: None,
        })
        .await
        .unwrap();

    let result = fixture
        .call(
            "submitAssignment",
            json!({ "studentId": "S9", "assignmentId": "HW1" }),
        )
        .await;
    assert_eq!(error_code(result), "STUDENT_NOT_IN_ROSTER");
    assert_eq!(fixture.roster("HW1").await.len(), 2);
}

#[tokio::test]
async fn test_duplicate_create_leaves_original() {
    let fixture = TestFixture::with_class().await;
    fixture.create("HW1", "2026-10-20").await.unwrap();
    fixture
        .call(
            "submitAssignment",
            json!({ "studentId": "S2", "assignmentId": "HW1" }),
        )
        .await
        .unwrap();

    let result = fixture.create("HW1", "2026-12-31").await;
    assert_eq!(error_code(result), "ALREADY_EXISTS");

    let listed = fixture.client.assignments(None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].end_date, "2026-10-20");
    assert_eq!(fixture.roster("HW1").await[1]["status"], "已繳交");
}

#[tokio::test]
async fn test_concurrent_creates_have_one_winner() {
    let fixture = TestFixture::with_class().await;

    for id in ["HW1", "HW2", "HW3"] {
        let (first, second) = tokio::join!(
            fixture.create(id, "2026-10-20"),
            fixture.create(id, "2026-10-21"),
        );
        let outcomes = [first, second];
        let created = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(created, 1, "exactly one create of {} succeeds", id);

        let loser = outcomes.into_iter().find(|r| r.is_err()).unwrap();
        assert_eq!(error_code(loser), "ALREADY_EXISTS");
        assert_eq!(fixture.roster(id).await.len(), 2);
    }
    assert_eq!(fixture.client.assignments(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_interleaved_submit_and_grade() {
    let fixture = TestFixture::with_class().await;
    fixture.create("HW1", "2026-10-20").await.unwrap();

    for round in 0..10 {
        let grade = (70 + round).to_string();
        let (submitted, graded) = tokio::join!(
            fixture.call(
                "submitAssignment",
                json!({ "studentId": "S1", "assignmentId": "HW1" }),
            ),
            fixture.call(
                "updateGrade",
                json!({ "studentId": "S1", "assignmentId": "HW1", "grade": grade }),
            ),
        );
        submitted.unwrap();
        graded.unwrap();

        let row = fixture.roster("HW1").await[0].clone();
        assert_eq!(row["status"], "已繳交");
        assert_eq!(row["grade"], json!(grade));

        fixture
            .call(
                "updateStatus",
                json!({ "studentId": "S1", "assignmentId": "HW1", "status": "未繳交" }),
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_submits_converge() {
    let fixture = TestFixture::with_class().await;
    fixture.create("HW1", "2026-10-20").await.unwrap();

    let submit = || {
        fixture.call(
            "submitAssignment",
            json!({ "studentId": "S2", "assignmentId": "HW1" }),
        )
    };
    let (a, b, c) = tokio::join!(submit(), submit(), submit());
    let stamps: Vec<Value> = [a, b, c]
        .into_iter()
        .map(|r| r.unwrap()["data"]["timestamp"].clone())
        .collect();

    let rows = fixture.roster("HW1").await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["status"], "已繳交");
    assert!(stamps.contains(&rows[1]["submittedAt"]));
}

#[tokio::test]
async fn test_unknown_teacher_is_unauthorized() {
    let fixture = TestFixture::with_class().await;
    let result = fixture
        .call(
            "createAssignment",
            json!({ "newAssignmentId": "HW1", "teacherId": "T404" }),
        )
        .await;
    assert_eq!(error_code(result), "UNAUTHORIZED");
    assert!(fixture.client.assignments(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_status_override_round_trip() {
    let fixture = TestFixture::with_class().await;
    fixture.create("HW1", "2026-10-20").await.unwrap();

    let set = |status: &'static str| {
        json!({ "studentId": "S1", "assignmentId": "HW1", "status": status })
    };

    fixture.call("updateStatus", set("已繳交")).await.unwrap();
    let submitted_at = fixture.roster("HW1").await[0]["submittedAt"].clone();
    assert!(submitted_at.is_string());

    fixture
        .call(
            "updateGrade",
            json!({ "studentId": "S1", "assignmentId": "HW1", "grade": "77" }),
        )
        .await
        .unwrap();
    fixture.call("updateStatus", set("訂正")).await.unwrap();
    let row = fixture.roster("HW1").await[0].clone();
    assert_eq!(row["status"], "訂正");
    assert_eq!(row["submittedAt"], submitted_at);
    assert_eq!(row["grade"], "77");

    fixture.call("updateStatus", set("未繳交")).await.unwrap();
    let row = fixture.roster("HW1").await[0].clone();
    assert_eq!(row["status"], "未繳交");
    assert_eq!(row["submittedAt"], Value::Null);

    let result = fixture
        .call(
            "updateStatus",
            json!({ "studentId": "S404", "assignmentId": "HW1", "status": "已繳交" }),
        )
        .await;
    assert_eq!(error_code(result), "NOT_FOUND");
}

#[tokio::test]
async fn test_grades_feed_statistics() {
    let fixture = TestFixture::with_class().await;
    fixture.create("HW1", "2026-10-20").await.unwrap();
    fixture.create("HW2", "2026-10-22").await.unwrap();

    for (student, assignment, grade) in [("S1", "HW1", json!(90)), ("S1", "HW2", json!("A+"))] {
        fixture
            .call(
                "updateGrade",
                json!({ "studentId": student, "assignmentId": assignment, "grade": grade }),
            )
            .await
            .unwrap();
    }
    fixture
        .call(
            "submitAssignment",
            json!({ "studentId": "S1", "assignmentId": "HW1" }),
        )
        .await
        .unwrap();

    let stats = fixture
        .call("getStudentStats", json!({ "studentId": "S1" }))
        .await
        .unwrap();
    assert_eq!(
        stats["stats"],
        json!({ "totalAssignments": 2, "submittedCount": 1, "submissionRate": 50, "avgScore": 90 })
    );

    let report = fixture
        .call("getClassStats", json!({ "classId": "ClassA" }))
        .await
        .unwrap();
    assert_eq!(report["classStats"]["submissionRate"], 25);
    assert_eq!(report["classStats"]["avgScore"], 90);
    assert_eq!(report["students"][1]["submissionRate"], 0);

    // Clearing a grade drops it from the average
    fixture
        .call(
            "updateGrade",
            json!({ "studentId": "S1", "assignmentId": "HW1", "grade": "" }),
        )
        .await
        .unwrap();
    let stats = fixture
        .call("getStudentStats", json!({ "studentId": "S1" }))
        .await
        .unwrap();
    assert_eq!(stats["stats"]["avgScore"], 0);
}

#[tokio::test]
async fn test_delete_keeps_questions() {
    let fixture = TestFixture::with_class().await;
    fixture.create("HW1", "2026-10-20").await.unwrap();
    fixture
        .call(
            "postQuestion",
            json!({ "studentId": "S1", "assignmentId": "HW1", "questionText": "Is #4 optional?" }),
        )
        .await
        .unwrap();

    let body = fixture
        .call("deleteAssignment", json!({ "assignmentId": "HW1" }))
        .await
        .unwrap();
    assert_eq!(body["message"], "Assignment deleted successfully");

    let result = fixture
        .call("getAssignmentStatus", json!({ "assignmentId": "HW1" }))
        .await;
    assert_eq!(error_code(result), "NOT_FOUND");

    let questions = fixture.call("getQuestions", json!({})).await.unwrap();
    assert_eq!(questions["questions"][0]["assignmentId"], "HW1");

    // The id can be reused once deleted
    fixture.create("HW1", "2026-11-01").await.unwrap();
    assert_eq!(fixture.roster("HW1").await.len(), 2);
}

#[tokio::test]
async fn test_question_scenario() {
    let fixture = TestFixture::with_class().await;

    let first = fixture
        .call(
            "postQuestion",
            json!({ "studentId": "S1", "questionText": "What is due Friday?" }),
        )
        .await
        .unwrap();
    fixture
        .call(
            "postQuestion",
            json!({ "studentId": "S2", "questionText": "Can I resubmit?" }),
        )
        .await
        .unwrap();
    let question_id = first["questionId"].as_str().unwrap().to_string();

    let listed = fixture.call("getQuestions", json!({})).await.unwrap();
    assert_eq!(listed["questions"][0]["studentId"], "S2");
    assert_eq!(listed["questions"][1]["status"], "Open");

    for answer in ["HW1", "HW1 and HW2"] {
        fixture
            .call(
                "answerQuestion",
                json!({ "questionId": question_id, "answerText": answer }),
            )
            .await
            .unwrap();
    }

    let mine = fixture
        .call("getQuestions", json!({ "studentId": "S1" }))
        .await
        .unwrap();
    let questions = mine["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0]["status"], "Answered");
    assert_eq!(questions[0]["answerText"], "HW1 and HW2");
    assert_eq!(questions[0]["questionText"], "What is due Friday?");

    let result = fixture
        .call(
            "answerQuestion",
            json!({ "questionId": "Qnope", "answerText": "?" }),
        )
        .await;
    assert_eq!(error_code(result), "NOT_FOUND");
}

#[tokio::test]
async fn test_points_balance_is_sum_of_changes() {
    let fixture = TestFixture::with_class().await;
    let changes: Vec<i64> = (1..=12).map(|i| if i % 3 == 0 { -i } else { i }).collect();

    for change in &changes {
        fixture
            .call(
                "adjustPoints",
                json!({ "studentId": "S1", "change": change, "teacherId": "T001" }),
            )
            .await
            .unwrap();
    }

    let body = fixture
        .call("getStudentPoints", json!({ "studentId": "S1" }))
        .await
        .unwrap();
    assert_eq!(body["points"], changes.iter().sum::<i64>());

    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0]["change"], -12);
    assert_eq!(history[9]["change"], -3);

    let empty = fixture
        .call("getStudentPoints", json!({ "studentId": "S2" }))
        .await
        .unwrap();
    assert_eq!(empty["points"], 0);
    assert_eq!(empty["history"], json!([]));
}

#[tokio::test]
async fn test_double_sign_writes_one_row() {
    let fixture = TestFixture::with_class().await;
    let created = fixture
        .call("createContactNote", json!({ "content": "Field trip form" }))
        .await
        .unwrap();
    let note_id = created["noteId"].as_str().unwrap().to_string();

    let sign = json!({ "noteId": note_id, "studentId": "S1" });
    let first = fixture.call("signContactNote", sign.clone()).await.unwrap();
    let second = fixture.call("signContactNote", sign).await.unwrap();
    assert_eq!(first["message"], "Signed successfully");
    assert_eq!(second["message"], "Already signed");
    assert_eq!(fixture.store.count_signatures(&note_id).await.unwrap(), 1);

    let latest = fixture
        .call("getLatestContactNote", json!({ "studentId": "S2" }))
        .await
        .unwrap();
    assert_eq!(latest["note"]["id"], json!(note_id));
    assert_eq!(latest["note"]["date"], json!(today().format("%Y-%m-%d").to_string()));
    assert_eq!(latest["isSigned"], false);
    assert_eq!(latest["signedAt"], Value::Null);
}

#[tokio::test]
async fn test_picker_order() {
    let fixture = TestFixture::with_class().await;
    fixture.create("HW1", "2026-10-25").await.unwrap();
    fixture.create("HW2", "").await.unwrap();
    fixture.create("HW3", "2026-10-19").await.unwrap();

    let mut listed = fixture.client.assignments(Some("S1")).await.unwrap();
    let created: Vec<&str> = listed.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(created, vec!["HW1", "HW2", "HW3"]);

    sort_by_deadline(&mut listed);
    let ordered: Vec<&str> = listed.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ordered, vec!["HW3", "HW1", "HW2"]);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let client = ActionClient::new("http://127.0.0.1:1/").unwrap();
    let err = client.call("getStudents", json!({})).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
