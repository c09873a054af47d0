//! HTTP-level tests driving the router in-process.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use filecab::store::Store;
use serde_json::{Value, json};

use common::TestApp;

#[tokio::test]
async fn health_check() {
    let app = TestApp::new();
    let resp = app.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_endpoint_uses_envelope() {
    let app = TestApp::new();
    let resp = app.get("/api/drawers").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["success"], false);
    assert_eq!(resp.body["message"], "Endpoint not found");
}

#[tokio::test]
async fn cabinet_round_trip() {
    let app = TestApp::new();

    let resp = app
        .post(
            "/api/cabinets",
            json!({ "name": "Cabinet 1", "status": "pending" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["success"], true);
    let created = resp.body["data"].clone();
    let id = created["id"].as_i64().unwrap();

    let resp = app.get(&format!("/api/cabinets?id={id}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    let fetched = &resp.body["data"];
    assert_eq!(fetched["name"], "Cabinet 1");
    assert_eq!(fetched["status"], "pending");
    assert_eq!(fetched["file_count"], 0);
    assert_eq!(fetched["added_by"], "Admin");
    assert_eq!(fetched["updated_at"], Value::Null);
    assert_eq!(*fetched, created);
}

#[tokio::test]
async fn cabinet_create_requires_name() {
    let app = TestApp::new();

    for body in [json!({ "name": "   " }), json!({ "description": "no name" })] {
        let resp = app.post("/api/cabinets", body).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body["success"], false);
        assert_eq!(resp.body["message"], "Cabinet name is required");
    }

    let resp = app.get("/api/cabinets").await;
    assert_eq!(resp.body["data"], json!([]));
}

#[tokio::test]
async fn cabinet_create_rejects_unknown_status() {
    let app = TestApp::new();
    let resp = app
        .post("/api/cabinets", json!({ "name": "A", "status": "closed" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(
        resp.body["message"]
            .as_str()
            .unwrap()
            .contains("active, pending, archived")
    );
}

#[tokio::test]
async fn cabinet_list_hides_archived_unless_requested() {
    let app = TestApp::new();
    let kept = app.create_cabinet("Kept").await;
    let archived = app.create_cabinet("Old").await;

    let resp = app
        .request(
            Method::PATCH,
            &format!("/api/cabinets?id={archived}"),
            Some(json!({ "status": "archived" })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app.get("/api/cabinets").await;
    let ids: Vec<i64> = resp.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![kept]);

    let resp = app.get("/api/cabinets?include_archived=true").await;
    assert_eq!(resp.body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn cabinet_update_partial() {
    let app = TestApp::new();
    let id = app.create_cabinet("Drawer").await;
    app.create_file(id, "Doc").await;

    let resp = app
        .request(
            Method::PUT,
            &format!("/api/cabinets?id={id}"),
            Some(json!({ "name": "  Drawer A ", "position": 4 })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let data = &resp.body["data"];
    assert_eq!(data["name"], "Drawer A");
    assert_eq!(data["position"], 4);
    assert_eq!(data["status"], "active");
    assert_eq!(data["file_count"], 1);
    assert!(data["updated_at"].is_string());
}

#[tokio::test]
async fn cabinet_update_without_fields_leaves_row_untouched() {
    let app = TestApp::new();
    let id = app.create_cabinet("Drawer").await;

    let resp = app
        .request(
            Method::PATCH,
            &format!("/api/cabinets?id={id}"),
            Some(json!({ "color": "red" })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "No fields to update");

    let cabinet = app.store.get_cabinet(id).unwrap().unwrap();
    assert!(cabinet.updated_at.is_none());
}

#[tokio::test]
async fn cabinet_update_errors() {
    let app = TestApp::new();

    let resp = app
        .request(Method::PATCH, "/api/cabinets", Some(json!({ "name": "x" })))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .request(
            Method::PATCH,
            "/api/cabinets?id=999",
            Some(json!({ "name": "x" })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["message"], "Cabinet not found");

    let resp = app.get("/api/cabinets?id=999").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app.get("/api/cabinets?id=abc").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["success"], false);
}

#[tokio::test]
async fn unsupported_method_is_405() {
    let app = TestApp::new();
    let resp = app.request(Method::DELETE, "/api/cabinets?id=1", None).await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.body["success"], false);

    let resp = app
        .request(Method::POST, "/api/dashboard_stats", Some(json!({})))
        .await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn malformed_json_is_400_envelope() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/cabinets")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.send(request).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["success"], false);
}

#[tokio::test]
async fn caller_header_sets_added_by() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/cabinets")
        .header("content-type", "application/json")
        .header("x-forwarded-user", "  mira ")
        .body(Body::from(json!({ "name": "Mira's" }).to_string()))
        .unwrap();
    let resp = app.send(request).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["data"]["added_by"], "mira");

    let cabinet_id = resp.body["data"]["id"].as_i64().unwrap();
    let file = app.create_file(cabinet_id, "Doc").await;
    assert_eq!(file["added_by"], "Admin");
}

#[tokio::test]
async fn file_numbers_increase_per_cabinet() {
    let app = TestApp::new();
    let cabinet_id = app.create_cabinet("Cabinet").await;

    let first = app.create_file(cabinet_id, "Doc A").await;
    let second = app.create_file(cabinet_id, "Doc A").await;

    assert_eq!(first["cabinet_number"], format!("C{cabinet_id}.1"));
    assert_eq!(second["cabinet_number"], format!("C{cabinet_id}.2"));
    assert_eq!(first["category"], "Documents");
    assert_eq!(first["status"], "available");

    let resp = app.get(&format!("/api/cabinets?id={cabinet_id}")).await;
    assert_eq!(resp.body["data"]["file_count"], 2);
}

#[tokio::test]
async fn file_create_validation() {
    let app = TestApp::new();
    let cabinet_id = app.create_cabinet("Cabinet").await;

    let resp = app
        .post("/api/files", json!({ "cabinet_id": 999, "filename": "Orphan" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Invalid cabinet_id");

    let resp = app.post("/api/files", json!({ "filename": "No cabinet" })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "cabinet_id is required");

    let resp = app
        .post("/api/files", json!({ "cabinet_id": cabinet_id, "filename": "" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Filename is required");

    let resp = app
        .post(
            "/api/files",
            json!({ "cabinet_id": cabinet_id, "filename": "Bat", "category": "Tools" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    // Failed attempts do not consume numbers.
    let file = app.create_file(cabinet_id, "First").await;
    assert_eq!(file["cabinet_number"], format!("C{cabinet_id}.1"));
}

#[tokio::test]
async fn file_get_includes_cabinet_name() {
    let app = TestApp::new();
    let cabinet_id = app.create_cabinet("Archive Room").await;
    let file = app.create_file(cabinet_id, "Deed").await;
    let id = file["id"].as_i64().unwrap();

    let resp = app.get(&format!("/api/files?id={id}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["cabinet_name"], "Archive Room");
    assert_eq!(resp.body["data"]["filename"], "Deed");

    let resp = app.get("/api/files").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn file_list_search_and_filter() {
    let app = TestApp::new();
    let cabinet_id = app.create_cabinet("Cabinet").await;
    for i in 1..=10 {
        app.create_file(cabinet_id, &format!("Invoice {i}")).await;
    }
    let resp = app
        .post(
            "/api/files",
            json!({
                "cabinet_id": cabinet_id,
                "filename": "Football",
                "category": "Sports",
                "status": "borrowed"
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let resp = app.get(&format!("/api/files?cabinet_id={cabinet_id}")).await;
    let numbers: Vec<&str> = resp.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["cabinet_number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers.len(), 11);
    assert_eq!(numbers[1], format!("C{cabinet_id}.2"));
    assert_eq!(numbers[9], format!("C{cabinet_id}.10"));

    let resp = app
        .get(&format!("/api/files?cabinet_id={cabinet_id}&search=football"))
        .await;
    assert_eq!(resp.body["data"].as_array().unwrap().len(), 1);

    let resp = app
        .get(&format!("/api/files?cabinet_id={cabinet_id}&status=borrowed"))
        .await;
    let data = resp.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["category"], "Sports");

    let resp = app
        .get(&format!("/api/files?cabinet_id={cabinet_id}&status=missing"))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn file_update_and_soft_delete() {
    let app = TestApp::new();
    let cabinet_id = app.create_cabinet("Cabinet").await;
    let file = app.create_file(cabinet_id, "Draft").await;
    let id = file["id"].as_i64().unwrap();

    let resp = app
        .request(
            Method::PATCH,
            &format!("/api/files?id={id}"),
            Some(json!({ "filename": "Final", "status": "borrowed", "description": "signed" })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["filename"], "Final");
    assert_eq!(resp.body["data"]["status"], "borrowed");
    assert_eq!(resp.body["data"]["description"], "signed");

    let resp = app
        .request(Method::PATCH, &format!("/api/files?id={id}"), Some(json!({})))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .request(Method::DELETE, &format!("/api/files?id={id}"), None)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["success"], true);

    // Second delete finds nothing to archive.
    let resp = app
        .request(Method::DELETE, &format!("/api/files?id={id}"), None)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["success"], false);

    let resp = app.get(&format!("/api/files?id={id}")).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app
        .request(
            Method::PUT,
            &format!("/api/files?id={id}"),
            Some(json!({ "filename": "Back" })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app.get(&format!("/api/files?cabinet_id={cabinet_id}")).await;
    assert_eq!(resp.body["data"], json!([]));

    let resp = app.get(&format!("/api/cabinets?id={cabinet_id}")).await;
    assert_eq!(resp.body["data"]["file_count"], 0);
}

#[tokio::test]
async fn file_uses_read_path() {
    let app = TestApp::new();
    let cabinet_id = app.create_cabinet("Cabinet").await;
    let file = app.create_file(cabinet_id, "Atlas").await;

    app.store
        .connection()
        .execute(
            "INSERT INTO file_uses (file_id, cabinet_id, borrower, purpose, created_at)
             VALUES (?1, ?2, 'Sam', 'Research', '2026-05-01T09:00:00.000000Z')",
            rusqlite::params![file["id"].as_i64().unwrap(), cabinet_id],
        )
        .unwrap();

    let resp = app
        .get(&format!("/api/file_uses?cabinet_id={cabinet_id}"))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let uses = resp.body["data"].as_array().unwrap();
    assert_eq!(uses.len(), 1);
    assert_eq!(uses[0]["borrower"], "Sam");
    assert_eq!(uses[0]["filename"], "Atlas");
    assert_eq!(uses[0]["cabinet_number"], file["cabinet_number"]);

    let resp = app.get("/api/file_uses").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_stats_buckets() {
    let app = TestApp::new();

    let resp = app.get("/api/dashboard_stats").await;
    assert_eq!(resp.status, StatusCode::OK);
    let stats = &resp.body["data"];
    assert_eq!(
        stats["files_by_status"],
        json!({ "available": 0, "borrowed": 0, "archived": 0 })
    );
    assert_eq!(
        stats["files_by_category"],
        json!({ "Documents": 0, "Sports": 0, "Objects": 0 })
    );

    let cabinet_id = app.create_cabinet("Cabinet").await;
    app.post(
        "/api/cabinets",
        json!({ "name": "Waiting", "status": "pending" }),
    )
    .await;
    for name in ["A", "B", "C", "D", "E"] {
        app.create_file(cabinet_id, name).await;
    }
    let resp = app
        .post(
            "/api/files",
            json!({ "cabinet_id": cabinet_id, "filename": "Vase", "category": "Objects" }),
        )
        .await;
    let vase_id = resp.body["data"]["id"].as_i64().unwrap();
    app.request(Method::DELETE, &format!("/api/files?id={vase_id}"), None)
        .await;

    let resp = app.get("/api/dashboard_stats").await;
    let stats = &resp.body["data"];
    assert_eq!(stats["total_files"], 5);
    assert_eq!(stats["total_cabinets"], 2);
    assert_eq!(stats["pending_cabinets"], 1);
    assert_eq!(stats["archived_files"], 1);
    assert_eq!(stats["files_by_category"]["Documents"], 5);
    assert_eq!(stats["files_by_category"]["Objects"], 0);
    let recent: Vec<&str> = stats["recent_files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["filename"].as_str().unwrap())
        .collect();
    assert_eq!(recent, vec!["E", "D", "C", "B"]);
}

#[tokio::test]
async fn logout_always_succeeds() {
    let app = TestApp::new();
    let resp = app.request(Method::POST, "/api/logout", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["success"], true);
    assert_eq!(resp.body["message"], "Logged out successfully");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_never_share_a_number() {
    let app = Arc::new(TestApp::new());
    let cabinet_id = app.create_cabinet("Busy").await;

    let tasks: Vec<_> = (0..10)
        .map(|i| {
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                let file = app.create_file(cabinet_id, &format!("File {i}")).await;
                file["cabinet_number"].as_str().unwrap().to_string()
            })
        })
        .collect();

    let mut numbers = Vec::new();
    for task in tasks {
        numbers.push(task.await.unwrap());
    }
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 10);
}
