//! Library circulation integration tests
//!
//! Exercises the loan/reservation bookkeeping end to end against a live
//! server. Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

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

async fn create_book(client: &Client, token: &str, isbn: &str, copies: i32) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "isbn": isbn,
            "title": "Circulation Test Book",
            "author": "Test Author",
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["id"].as_i64().expect("No book ID")
}

async fn delete_book(client: &Client, token: &str, book_id: i64) {
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_conflict() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "978-1-56619-909-4", 1).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "isbn": "978-1-56619-909-4",
            "title": "Duplicate",
            "author": "Someone Else",
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"]["code"], "CONFLICT");

    delete_book(&client, &token, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_loan_decrements_availability_and_return_restores_it() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "978-0-13-110362-7", 2).await;

    // Borrow
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"book_id": book_id}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["data"]["id"].as_i64().expect("No loan ID");

    // Availability dropped by one
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["available_copies"], 1);

    // Borrowing the same book twice is a conflict
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"book_id": book_id}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Return restores the counter
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["available_copies"], 2);

    // Returning again is a business-rule violation
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"]["code"], "BUSINESS_RULE");

    delete_book(&client, &token, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_reservation_queue_flow() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "978-0-262-03384-8", 1).await;

    // Reserving while copies are available is rejected
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"book_id": book_id}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // Register a second reader and exhaust the stock with an admin loan
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": "it_reader",
            "email": "it_reader@example.org",
            "password": "password123",
            "role": "student",
            "first_name": "Second",
            "last_name": "Reader",
            "profile": {"class_level": "Grade 9"}
        }))
        .send()
        .await
        .expect("Failed to send request");
    // 201 on first run, 409 when the account is left over from a previous run
    assert!(response.status() == 201 || response.status() == 409);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"login": "it_reader", "password": "password123"}))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let reader_token = body["data"]["access_token"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"book_id": book_id}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["data"]["id"].as_i64().unwrap();

    // The second reader joins the queue at position 1
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", reader_token))
        .json(&json!({"book_id": book_id}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["position"], 1);
    assert_eq!(body["data"]["status"], "pending");

    // Renewal is blocked while someone is waiting
    let response = client
        .post(format!("{}/loans/{}/renew", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Returning promotes the reservation instead of releasing the copy
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["available_copies"], 0);

    // Fulfil the hold at the desk
    let response = client
        .post(format!("{}/reservations/{}/fulfill", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reservation"]["status"], "fulfilled");
    let reader_loan_id = body["data"]["loan"]["id"].as_i64().unwrap();

    // A closed reservation cannot be cancelled
    let response = client
        .delete(format!("{}/reservations/{}", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // Cleanup: return the reader's loan and delete the book
    let _ = client
        .post(format!("{}/loans/{}/return", BASE_URL, reader_loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
    delete_book(&client, &token, book_id).await;
}
