mod common;

use chrono::Duration;
use serde_json::{json, Value};

use common::spawn_app;

#[tokio::test]
async fn create_chirp_censors_and_returns_201() {
    let app = spawn_app().await;
    let user = app.signed_in("alice@example.com", "Secur3Pass").await;
    let token = user["token"].as_str().unwrap();

    let response = app.create_chirp(token, "what a kerfuffle today").await;

    assert_eq!(201, response.status().as_u16());
    let chirp: Value = response.json().await.unwrap();
    assert_eq!(chirp["body"], "what a **** today");
    assert_eq!(chirp["user_id"], user["id"]);
}

#[tokio::test]
async fn create_chirp_rejects_long_body() {
    let app = spawn_app().await;
    let user = app.signed_in("alice@example.com", "Secur3Pass").await;
    let token = user["token"].as_str().unwrap();

    let response = app.create_chirp(token, &"a".repeat(141)).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn chirps_are_readable_without_authentication() {
    let app = spawn_app().await;
    let user = app.signed_in("alice@example.com", "Secur3Pass").await;
    let token = user["token"].as_str().unwrap();

    let first: Value = app.create_chirp(token, "first").await.json().await.unwrap();
    app.clock.advance(Duration::seconds(1));
    app.create_chirp(token, "second").await;

    let list = app
        .client
        .get(app.url("/api/chirps"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, list.status().as_u16());
    let chirps: Vec<Value> = list.json().await.unwrap();
    assert_eq!(chirps.len(), 2);
    assert_eq!(chirps[0]["body"], "first");

    let id = first["id"].as_str().unwrap();
    let single = app
        .client
        .get(app.url(&format!("/api/chirps/{}", id)))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, single.status().as_u16());
}

#[tokio::test]
async fn get_chirp_handles_bad_and_missing_ids() {
    let app = spawn_app().await;

    let bad = app
        .client
        .get(app.url("/api/chirps/not-a-uuid"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(400, bad.status().as_u16());

    let missing = app
        .client
        .get(app.url(&format!("/api/chirps/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, missing.status().as_u16());
}

#[tokio::test]
async fn only_the_owner_can_delete_a_chirp() {
    let app = spawn_app().await;
    let alice = app.signed_in("alice@example.com", "Secur3Pass").await;
    let bob = app.signed_in("bob@example.com", "B0bPass").await;
    let alice_token = alice["token"].as_str().unwrap();
    let bob_token = bob["token"].as_str().unwrap();

    let chirp: Value = app.create_chirp(alice_token, "mine").await.json().await.unwrap();
    let path = format!("/api/chirps/{}", chirp["id"].as_str().unwrap());

    let by_bob = app
        .client
        .delete(app.url(&path))
        .bearer_auth(bob_token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(403, by_bob.status().as_u16());

    let by_alice = app
        .client
        .delete(app.url(&path))
        .bearer_auth(alice_token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, by_alice.status().as_u16());

    let gone = app
        .client
        .delete(app.url(&path))
        .bearer_auth(alice_token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, gone.status().as_u16());
}

#[tokio::test]
async fn validate_chirp_returns_cleaned_body() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/validate_chirp"))
        .json(&json!({ "body": "I hear Sharbert is great" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["cleaned_body"], "I hear **** is great");
}
