mod common;

use catalog_assistant::services::providers::{mock::MockChatProvider, ChatRole};
use common::{test_config, FixedCatalogSearch, TestApp};
use serde_json::json;

const CATALOG_ROWS: &str = r#"[{"id":7,"product_name":"Trail Shell","final_price":129.0}]"#;

fn app_with(catalog: FixedCatalogSearch, chat: MockChatProvider) -> TestApp {
    TestApp::new(test_config(&[]), catalog, chat)
}

#[tokio::test]
async fn chat_answers_with_grounding_from_search() {
    let app = app_with(
        FixedCatalogSearch::returning(Some(CATALOG_ROWS), None),
        MockChatProvider::replying("The Trail Shell is waterproof."),
    );

    let response = app
        .post_json("/api/chat", &json!({ "message": "waterproof jacket?" }))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.json(),
        json!({
            "userMessage": "waterproof jacket?",
            "assistantResponse": "The Trail Shell is waterproof.",
            "productsFound": true
        })
    );

    assert_eq!(app.catalog.searches(), vec!["waterproof jacket?"]);

    let conversations = app.chat.conversations();
    assert_eq!(conversations.len(), 1);
    let messages = &conversations[0];
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::System);
    assert!(messages[0].content.contains(CATALOG_ROWS));
    assert_eq!(messages[1].role, ChatRole::User);
    assert_eq!(messages[1].content, "waterproof jacket?");
}

#[tokio::test]
async fn products_found_is_false_without_grounding() {
    let app = app_with(
        FixedCatalogSearch::empty(),
        MockChatProvider::replying("Sorry, nothing matches."),
    );

    let response = app
        .post_json("/api/chat", &json!({ "message": "flux capacitor" }))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.json()["productsFound"], false);
}

#[tokio::test]
async fn procedure_error_does_not_block_chat() {
    let app = app_with(
        FixedCatalogSearch::returning(None, Some("embedding quota exceeded")),
        MockChatProvider::replying("I could not find matching products."),
    );

    let response = app
        .post_json("/api/chat", &json!({ "message": "boots" }))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.json()["productsFound"], false);
}

#[tokio::test]
async fn model_failure_is_a_problem_response() {
    let app = app_with(
        FixedCatalogSearch::returning(Some(CATALOG_ROWS), None),
        MockChatProvider::failing("deployment not found"),
    );

    let response = app
        .post_json("/api/chat", &json!({ "message": "boots" }))
        .await;

    assert_eq!(response.status, 500);
    assert_eq!(response.content_type(), Some("application/problem+json"));
    assert_eq!(response.json()["detail"], "Chat completion failed");
    assert!(!response.text().contains("deployment not found"));
}

#[tokio::test]
async fn database_failure_fails_chat_before_calling_model() {
    let app = app_with(
        FixedCatalogSearch::unreachable(),
        MockChatProvider::replying("unused"),
    );

    let response = app
        .post_json("/api/chat", &json!({ "message": "boots" }))
        .await;

    assert_eq!(response.status, 500);
    assert!(app.chat.conversations().is_empty());
}

#[tokio::test]
async fn missing_message_is_rejected() {
    let app = TestApp::with_defaults();

    let response = app.post_json("/api/chat", &json!({ "text": "hi" })).await;

    assert_eq!(response.status, 422);
    assert!(app.chat.conversations().is_empty());
}

#[tokio::test]
async fn structured_chat_passes_json_through() {
    let reply = json!({
        "recommendations": [
            { "productName": "Trail Shell", "reason": "Waterproof", "confidence": "high" }
        ],
        "summary": "One strong match"
    });
    let app = app_with(
        FixedCatalogSearch::returning(Some(CATALOG_ROWS), None),
        MockChatProvider::replying(reply.to_string()),
    );

    let response = app
        .post_json("/api/chat/structured", &json!({ "message": "rain gear" }))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.json(), reply);

    let system = &app.chat.conversations()[0][0];
    assert!(system.content.contains(r#""confidence": "high|medium|low""#));
    assert!(system.content.ends_with(CATALOG_ROWS));
}

#[tokio::test]
async fn structured_chat_keeps_model_key_order() {
    let text = r#"{"summary":"One strong match","recommendations":[{"reason":"Waterproof","productName":"Trail Shell","confidence":"high"}]}"#;
    let app = app_with(
        FixedCatalogSearch::returning(Some(CATALOG_ROWS), None),
        MockChatProvider::replying(text),
    );

    let response = app
        .post_json("/api/chat/structured", &json!({ "message": "rain gear" }))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.text(), text);
}

#[tokio::test]
async fn structured_chat_wraps_prose_as_raw_response() {
    let text = "I'd suggest the Trail Shell.";
    let app = app_with(
        FixedCatalogSearch::returning(Some(CATALOG_ROWS), None),
        MockChatProvider::replying(text),
    );

    let response = app
        .post_json("/api/chat/structured", &json!({ "message": "rain gear" }))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.json(), json!({ "rawResponse": text }));
}

#[tokio::test]
async fn structured_chat_model_failure_is_a_problem_response() {
    let app = app_with(
        FixedCatalogSearch::empty(),
        MockChatProvider::failing("timeout"),
    );

    let response = app
        .post_json("/api/chat/structured", &json!({ "message": "rain gear" }))
        .await;

    assert_eq!(response.status, 500);
}
