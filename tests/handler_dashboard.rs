mod common;

use serde_json::json;

#[tokio::test]
async fn test_dashboard_requires_authentication() {
    let server = common::create_test_server(common::create_test_state(common::test_options()));

    server.get("/dashboard").await.assert_status_unauthorized();
}

#[tokio::test]
async fn test_dashboard_lists_history_in_creation_order() {
    let server = common::create_test_server(common::create_test_state(common::test_options()));
    let cookie = common::register(&server, "heidi@example.com", "pw").await;

    for (url, code) in [("https://one.com", "first"), ("https://two.com", "second")] {
        server
            .post("/create")
            .add_header("Cookie", cookie.clone())
            .json(&json!({ "url": url, "custom_code": code }))
            .await
            .assert_status_ok();
    }

    // Anonymous creations are not attributed to anyone.
    server
        .post("/create")
        .json(&json!({ "url": "https://three.com", "custom_code": "third" }))
        .await
        .assert_status_ok();

    let response = server.get("/dashboard").add_header("Cookie", cookie).await;

    response.assert_status_ok();
    let items = response.json::<serde_json::Value>();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["code"], "first");
    assert_eq!(items[0]["destination"], "https://one.com");
    assert_eq!(items[0]["short_url"], format!("{}/first", common::BASE_URL));
    assert_eq!(items[1]["code"], "second");
}

#[tokio::test]
async fn test_dashboard_is_per_user() {
    let server = common::create_test_server(common::create_test_state(common::test_options()));
    let ivan = common::register(&server, "ivan@example.com", "pw").await;
    let judy = common::register(&server, "judy@example.com", "pw").await;

    server
        .post("/create")
        .add_header("Cookie", ivan)
        .json(&json!({ "url": "https://ivan.com" }))
        .await
        .assert_status_ok();

    let response = server.get("/dashboard").add_header("Cookie", judy).await;

    response.assert_status_ok();
    assert!(response.json::<serde_json::Value>().as_array().unwrap().is_empty());
}
