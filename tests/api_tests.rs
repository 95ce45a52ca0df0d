//! API integration tests
//!
//! These run against a live server with the seed data loaded.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated admin token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["data"]["access_token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["data"]["access_token"].is_string());
    assert!(body["data"]["refresh_token"].is_string());
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["user"]["role"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "AUTHENTICATION");
}

#[tokio::test]
#[ignore]
async fn test_refresh_token_rotation() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"login": "admin", "password": "admin"}))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let refresh_token = body["data"]["refresh_token"].as_str().unwrap().to_string();

    // First refresh succeeds
    let response = client
        .post(format!("{}/auth/refresh", BASE_URL))
        .json(&json!({"refresh_token": refresh_token}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // The old token was revoked by the rotation
    let response = client
        .post(format!("{}/auth/refresh", BASE_URL))
        .json(&json!({"refresh_token": refresh_token}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["username"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/users", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_users_pagination() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/users?page=1&limit=5", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    let items = body["data"].as_array().expect("data is not an array");
    assert!(items.len() <= 5);
    assert!(body["pagination"]["total"].is_number());
    assert!(body["pagination"]["has_next"].is_boolean());
}

#[tokio::test]
#[ignore]
async fn test_create_student_and_duplicate_roll_number() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "username": "it_student1",
            "email": "it_student1@example.org",
            "password": "password123",
            "role": "student",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "profile": {
                "roll_number": "IT-ROLL-001",
                "class_level": "Grade 8"
            }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let user_id = body["data"]["id"].as_i64().expect("No user ID");

    // Same roll number again: the whole signup must roll back with a 409
    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "username": "it_student2",
            "email": "it_student2@example.org",
            "password": "password123",
            "role": "student",
            "first_name": "Grace",
            "last_name": "Hopper",
            "profile": {
                "roll_number": "IT-ROLL-001",
                "class_level": "Grade 8"
            }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"]["code"], "CONFLICT");

    // The username must still be free after the rollback
    let response = client
        .get(format!("{}/users?search=it_student2", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["pagination"]["total"], 0);

    // Cleanup
    let _ = client
        .delete(format!("{}/users/{}?force=true", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_course_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // Create course
    let response = client
        .post(format!("{}/courses", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "code": "ITT101",
            "name": "Integration Testing",
            "credits": 3,
            "capacity": 2
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let course_id = body["data"]["id"].as_i64().expect("No course ID");

    // Duplicate code rejected
    let response = client
        .post(format!("{}/courses", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "code": "ITT101",
            "name": "Duplicate"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Schedule slot
    let response = client
        .post(format!("{}/courses/{}/schedule", BASE_URL, course_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "day_of_week": 0,
            "start_time": "09:00",
            "end_time": "10:30",
            "room": "B-204"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Overlapping slot in the same room rejected
    let response = client
        .post(format!("{}/courses/{}/schedule", BASE_URL, course_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "day_of_week": 0,
            "start_time": "10:00",
            "end_time": "11:00",
            "room": "B-204"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Cleanup
    let response = client
        .delete(format!("{}/courses/{}", BASE_URL, course_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_get_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["users"]["total"].is_number());
    assert!(body["data"]["library"]["active_loans"].is_number());
    assert!(body["data"]["courses"]["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_get_settings() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/settings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["school"]["school_name"].is_string());
    assert!(body["data"]["circulation"]["loan_period_days"].is_number());
}
