//! Delivery against a mock Discord REST API.

use dueping_core::{Digest, DisplayEntry, DueError, EmbedSection, NotificationSink};
use dueping_discord::{DiscordClient, DiscordConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHANNEL: &str = "869951873749254228";

fn digest(mention: Option<&str>) -> Digest {
    Digest {
        mention: mention.map(str::to_string),
        sections: vec![
            EmbedSection {
                title: "Upcoming Due Dates!".to_string(),
                color: 0xcf2b2b,
                entries: vec![DisplayEntry {
                    label: "Essay".to_string(),
                    value: "<t:1722571199:D>".to_string(),
                }],
            },
            EmbedSection {
                title: "Next 7 Days".to_string(),
                color: 0xe0d019,
                entries: vec![],
            },
        ],
    }
}

fn client(server: &MockServer) -> DiscordClient {
    DiscordClient::new(DiscordConfig::new("bot-token", CHANNEL).with_api_base(server.uri()))
}

async fn mount_channel(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/channels/{CHANNEL}")))
        .and(header("authorization", "Bot bot-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": CHANNEL, "type": 0, "name": "due-dates"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn posts_embeds_without_ping_when_not_urgent() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/channels/{CHANNEL}/messages")))
        .and(header("authorization", "Bot bot-token"))
        .and(body_partial_json(json!({
            "embeds": [
                {"title": "Upcoming Due Dates!", "fields": [
                    {"name": "Essay", "value": "<t:1722571199:D>", "inline": false}
                ]},
                {"title": "Next 7 Days", "fields": []}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m1"})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).deliver(&digest(None)).await.unwrap();
}

#[tokio::test]
async fn ping_is_sent_before_embeds() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/channels/{CHANNEL}/messages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m"})))
        .expect(2)
        .mount(&server)
        .await;

    client(&server)
        .deliver(&digest(Some("<@&1088328245390348338>")))
        .await
        .unwrap();

    let posts: Vec<serde_json::Value> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["content"], "<@&1088328245390348338>");
    assert_eq!(posts[0]["allowed_mentions"]["parse"], json!(["roles"]));
    assert!(posts[0].get("embeds").is_none());
    assert_eq!(posts[1]["embeds"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_channel_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Unknown Channel", "code": 10003
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server).deliver(&digest(Some("<@&1>"))).await.unwrap_err();
    match err {
        DueError::Delivery(msg) => assert!(msg.contains("404"), "got: {msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn rejected_send_is_a_delivery_error() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "Missing Permissions", "code": 50013
        })))
        .mount(&server)
        .await;

    let err = client(&server).deliver(&digest(None)).await.unwrap_err();
    assert!(matches!(err, DueError::Delivery(_)));
}
