//! Tests for the api module

use super::*;
use crate::client::Client;
use crate::config::Config;
use crate::error::Error;
use chrono::TimeZone;
use chrono::Utc;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> Client {
    let config = Config::builder("test-token")
        .api_url(server.uri())
        .image_api_url(server.uri())
        .build();
    Client::with_config(config).unwrap()
}

fn envelope(data: Value) -> Value {
    json!({ "response": data, "meta": { "code": 200 } })
}

fn group_json(id: u32, name: &str) -> Value {
    json!({
        "id": id.to_string(),
        "group_id": id.to_string(),
        "name": name,
        "creator_user_id": "u1",
        "created_at": 1_609_550_645,
        "updated_at": 1_609_550_645,
        "members": [],
    })
}

fn message_json(id: &str, created_at: i64, text: &str) -> Value {
    json!({
        "id": id,
        "source_guid": "sg",
        "created_at": created_at,
        "user_id": "u1",
        "group_id": "1",
        "name": "Annie",
        "text": text,
        "favorited_by": [],
        "attachments": [],
    })
}

// ============================================================================
// Attachment Tests
// ============================================================================

#[test]
fn test_attachment_image_round_trip() {
    let raw = json!({ "type": "image", "url": "https://img.example.com/a.png" });
    let attachment: Attachment = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(
        attachment,
        Attachment::image("https://img.example.com/a.png")
    );
    assert_eq!(serde_json::to_value(&attachment).unwrap(), raw);
}

#[test]
fn test_attachment_location() {
    let raw = json!({ "type": "location", "lat": "44.5", "lng": "-104.7", "name": "Devils Tower" });
    let attachment: Attachment = serde_json::from_value(raw).unwrap();
    match &attachment {
        Attachment::Location { lat, lng, name } => {
            assert_eq!(lat, "44.5");
            assert_eq!(lng, "-104.7");
            assert_eq!(name, "Devils Tower");
        }
        other => panic!("expected Location, got {other:?}"),
    }
}

#[test]
fn test_attachment_mentions_without_loci() {
    let raw = json!({ "type": "mentions", "user_ids": ["u1", "u2"] });
    let attachment: Attachment = serde_json::from_value(raw).unwrap();
    assert_eq!(
        attachment,
        Attachment::Mentions {
            user_ids: vec!["u1".to_string(), "u2".to_string()],
            loci: None,
        }
    );
}

#[test]
fn test_attachment_unknown_type_round_trips() {
    let raw = json!({ "type": "poll", "poll_id": "p1", "options": ["a", "b"] });
    let attachment: Attachment = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(attachment.kind(), "poll");
    assert_eq!(serde_json::to_value(&attachment).unwrap(), raw);
}

#[test]
fn test_attachment_missing_type_fails() {
    let raw = json!({ "url": "https://img.example.com/a.png" });
    assert!(serde_json::from_value::<Attachment>(raw).is_err());
}

#[test]
fn test_message_with_attachments_deserializes() {
    let raw = json!({
        "id": "m1",
        "created_at": 1_609_550_645,
        "text": "look",
        "attachments": [
            { "type": "image", "url": "https://img.example.com/a.png" },
            { "type": "emoji", "placeholder": "x", "charmap": [[1, 2]] },
        ],
    });
    let message: Message = serde_json::from_value(raw).unwrap();
    assert_eq!(message.attachments.len(), 2);
    assert_eq!(message.attachments[0].kind(), "image");
    assert_eq!(message.attachments[1].kind(), "emoji");
}

// ============================================================================
// Group Tests
// ============================================================================

#[tokio::test]
async fn test_groups_list_pages_until_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            group_json(1, "one"),
            group_json(2, "two"),
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let groups = client.groups().list_all(Some(2), None).await.unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "one");
    assert_eq!(groups[1].name, "two");
}

#[tokio::test]
async fn test_groups_get_parses_entity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(group_json(1, "book club"))),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let group = client.groups().get("1").await.unwrap();

    assert_eq!(group.name, "book club");
    assert_eq!(
        group.created_at,
        Utc.timestamp_opt(1_609_550_645, 0).unwrap()
    );
}

#[tokio::test]
async fn test_groups_change_owner_status_table() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/groups/change_owners"))
        .and(body_partial_json(json!({
            "requests": [{ "group_id": "1", "owner_id": "u2" }],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "results": [{ "group_id": "1", "owner_id": "u2", "status": "403" }],
        }))))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let change = client.groups().change_owner("1", "u2").await.unwrap();

    assert!(!change.is_success());
    assert_eq!(change.reason(), "you must own a group to change its owner");
}

#[tokio::test]
async fn test_groups_former_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups/former"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!([group_json(9, "old")]))),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let former = client.groups().list_former().await.unwrap();
    assert_eq!(former.len(), 1);
    assert_eq!(former[0].name, "old");
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_messages_not_modified_is_an_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups/1/messages"))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let pager = client.messages("1").list().await.unwrap();

    assert!(pager.is_empty());
    let all = pager.all().await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_messages_list_before_sends_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups/1/messages"))
        .and(query_param("before_id", "m5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "count": 1,
            "messages": [message_json("m4", 4, "hello")],
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let pager = client.messages("1").list_before("m5").await.unwrap();

    assert_eq!(pager.len(), 1);
    assert_eq!(pager[0].id, "m4");
    assert_eq!(pager[0].text.as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_messages_ambiguous_cursor_fails_before_io() {
    let server = MockServer::start().await;
    // no mocks mounted: a request would fail loudly

    let client = test_client(&server);
    let mut params = crate::pagination::Params::new();
    params.insert("before_id".to_string(), "m1".to_string());
    params.insert("after_id".to_string(), "m2".to_string());

    let err = client.messages("1").list_with(params).await.unwrap_err();
    assert!(matches!(err, Error::AmbiguousCursor { .. }));
}

#[tokio::test]
async fn test_messages_create_rejects_empty_before_io() {
    let server = MockServer::start().await;

    let client = test_client(&server);
    let err = client
        .messages("1")
        .create(None, &[], None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyMessage));
}

#[tokio::test]
async fn test_messages_create_posts_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/groups/1/messages"))
        .and(body_partial_json(json!({
            "message": { "source_guid": "sg-1", "text": "hi there" },
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!({
            "message": message_json("m10", 10, "hi there"),
        }))))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let message = client
        .messages("1")
        .create(Some("hi there"), &[], Some("sg-1"))
        .await
        .unwrap();

    assert_eq!(message.id, "m10");
}

#[tokio::test]
async fn test_messages_create_generates_source_guid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/groups/1/messages"))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!({
            "message": message_json("m11", 11, "auto"),
        }))))
        .mount(&server)
        .await;

    let client = test_client(&server);
    client
        .messages("1")
        .create(Some("auto"), &[], None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let guid = body["message"]["source_guid"].as_str().unwrap();
    assert!(!guid.is_empty());
}

#[tokio::test]
async fn test_direct_messages_include_other_user() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/direct_messages"))
        .and(query_param("other_user_id", "u7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "count": 1,
            "direct_messages": [{
                "id": "d1",
                "created_at": 100,
                "sender_id": "u7",
                "recipient_id": "u1",
                "text": "psst",
            }],
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let pager = client.direct_messages("u7").list().await.unwrap();

    assert_eq!(pager.len(), 1);
    assert_eq!(pager[0].text.as_deref(), Some("psst"));
    assert_eq!(pager[0].conversation_key().unwrap(), "u1+u7");
}

#[tokio::test]
async fn test_gallery_sends_wire_timestamp() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/conversations/1/gallery"))
        .and(query_param("before", "2021-01-02T03:04:05.006Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "messages": [message_json("m1", 1, "pic")],
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let instant = Utc.with_ymd_and_hms(2021, 1, 2, 3, 4, 5).unwrap()
        + chrono::Duration::milliseconds(6);
    let pager = client.gallery("1").list_before(instant).await.unwrap();

    assert_eq!(pager.len(), 1);
}

#[tokio::test]
async fn test_leaderboard_period_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups/1/likes"))
        .and(query_param("period", "day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "messages": [message_json("m1", 1, "popular")],
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let best = client.leaderboard("1").list_day().await.unwrap();
    assert_eq!(best.len(), 1);
}

#[tokio::test]
async fn test_likes_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages/c1/m1/like"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/messages/c1/m1/unlike"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client.likes("c1", "m1").like().await.unwrap();
    client.likes("c1", "m1").unlike().await.unwrap();
}

// ============================================================================
// Membership Tests
// ============================================================================

fn add_mock(results_id: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path("/groups/1/members/add"))
        .respond_with(ResponseTemplate::new(202).set_body_json(envelope(json!({
            "results_id": results_id,
        }))))
}

fn member_json(guid: &str, nickname: &str) -> Value {
    json!({
        "id": format!("mem-{nickname}"),
        "user_id": format!("u-{nickname}"),
        "nickname": nickname,
        "muted": false,
        "guid": guid,
    })
}

#[tokio::test]
async fn test_add_rejects_item_without_identifier() {
    let server = MockServer::start().await;
    // no mocks: the rejection must happen before any I/O

    let client = test_client(&server);
    let item = NewMember {
        nickname: "nameless".to_string(),
        user_id: None,
        email: None,
        phone_number: None,
        guid: None,
    };
    let err = client.memberships("1").add(vec![item]).await.unwrap_err();
    assert!(matches!(err, Error::MissingIdentifier { .. }));
}

#[tokio::test]
async fn test_add_assigns_distinct_guids_to_identical_items() {
    let server = MockServer::start().await;
    add_mock("r1").mount(&server).await;

    let client = test_client(&server);
    let items = vec![
        NewMember::by_email("sam", "sam@example.com"),
        NewMember::by_email("sam", "sam@example.com"),
        NewMember::by_email("sam", "sam@example.com"),
    ];
    let request = client.memberships("1").add(items).await.unwrap();

    let guids: HashSet<&str> = request
        .requests()
        .iter()
        .map(|member| member.guid.as_deref().unwrap())
        .collect();
    assert_eq!(guids.len(), 3);

    // and the wire payload carries exactly those keys
    let received = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    let sent: HashSet<&str> = body["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|member| member["guid"].as_str().unwrap())
        .collect();
    assert_eq!(sent, guids);
}

#[tokio::test]
async fn test_poll_partitions_members_and_failures() {
    let server = MockServer::start().await;
    add_mock("r1").mount(&server).await;

    let client = test_client(&server);
    let memberships = client.memberships("1");
    let items = vec![
        NewMember::by_user_id("alice", "ua"),
        NewMember::by_email("bruno", "bruno@example.com"),
        NewMember::by_phone("carol", "+15555550100"),
    ];
    let mut request = memberships.add(items).await.unwrap();

    // first check finds the server still working on it
    Mock::given(method("GET"))
        .and(path("/groups/1/members/results/r1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // afterwards only alice and carol came through
    let guids: Vec<String> = request
        .requests()
        .iter()
        .map(|member| member.guid.clone().unwrap())
        .collect();
    Mock::given(method("GET"))
        .and(path("/groups/1/members/results/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "members": [
                member_json(&guids[0], "alice"),
                member_json(&guids[2], "carol"),
            ],
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let results = request
        .poll(Duration::from_secs(5), Duration::from_millis(10))
        .await
        .unwrap();

    assert_eq!(results.members.len(), 2);
    assert_eq!(results.members[0].nickname, "alice");
    assert_eq!(results.members[1].nickname, "carol");
    // the correlation key is not a real API field
    assert!(!results.members[0].extra.contains_key("guid"));

    assert_eq!(results.failures.len(), 1);
    assert_eq!(results.failures[0].nickname, "bruno");

    // terminal state is cached: get() replays without re-querying
    let replay = request.get().unwrap();
    assert_eq!(replay.members.len(), 2);
    assert!(request.is_ready().await.unwrap());
}

#[tokio::test]
async fn test_expired_results_are_terminal() {
    let server = MockServer::start().await;
    add_mock("r2").mount(&server).await;

    Mock::given(method("GET"))
        .and(path("/groups/1/members/results/r2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut request = client
        .memberships("1")
        .add(vec![NewMember::by_user_id("dana", "ud")])
        .await
        .unwrap();

    assert!(request.is_ready().await.unwrap());
    assert!(request.get().unwrap_err().is_expired());
    // replayed from cache, no second query (the mock expects exactly one)
    assert!(request.get().unwrap_err().is_expired());
    assert!(request.is_ready().await.unwrap());
}

#[tokio::test]
async fn test_poll_timeout_surfaces_not_ready() {
    let server = MockServer::start().await;
    add_mock("r3").mount(&server).await;

    Mock::given(method("GET"))
        .and(path("/groups/1/members/results/r3"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut request = client
        .memberships("1")
        .add(vec![NewMember::by_user_id("erin", "ue")])
        .await
        .unwrap();

    let err = request
        .poll(Duration::from_millis(50), Duration::from_millis(10))
        .await
        .unwrap_err();
    assert!(err.is_not_ready());
}

#[tokio::test]
async fn test_memberships_remove() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/groups/1/members/mem-9/remove"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client.memberships("1").remove("mem-9").await.unwrap();
}

// ============================================================================
// Chat / Bot / Block / User Tests
// ============================================================================

#[tokio::test]
async fn test_chats_list_pages() {
    let server = MockServer::start().await;

    let chat = json!({
        "created_at": 100,
        "updated_at": 200,
        "messages_count": 3,
        "other_user": { "id": "u2", "name": "Bea" },
    });

    Mock::given(method("GET"))
        .and(path("/chats"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([chat]))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/chats"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let chats = client.chats().list_all(None).await.unwrap();

    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].other_user.name, "Bea");
    assert_eq!(chats[0].messages_count, 3);
}

#[tokio::test]
async fn test_bots_create_and_post() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bots"))
        .and(body_partial_json(json!({
            "bot": { "name": "greeter", "group_id": "1" },
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!({
            "bot": { "bot_id": "b1", "group_id": "1", "name": "greeter" },
        }))))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/bots/post"))
        .and(body_partial_json(json!({ "bot_id": "b1", "text": "hello" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let bot = client
        .bots()
        .create("greeter", "1", None, None)
        .await
        .unwrap();
    assert_eq!(bot.bot_id, "b1");

    client.bots().post("b1", "hello", &[]).await.unwrap();
}

#[tokio::test]
async fn test_blocks_between_and_unblock() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blocks"))
        .and(query_param("user", "u1"))
        .and(query_param("otherUser", "u2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "between": true,
        }))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/blocks"))
        .and(query_param("otherUser", "u2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.blocks("u1").between("u2").await.unwrap());
    client.blocks("u1").unblock("u2").await.unwrap();
}

#[tokio::test]
async fn test_user_me() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": "u1",
            "name": "Annie",
            "email": "annie@example.com",
            "created_at": 100,
            "updated_at": 200,
            "sms": false,
        }))))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let me = client.user().me().await.unwrap();
    assert_eq!(me.id, "u1");
    assert_eq!(me.email.as_deref(), Some("annie@example.com"));
}

#[tokio::test]
async fn test_images_upload_unwraps_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pictures"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payload": {
                "url": "https://img.example.com/abc",
                "picture_url": "https://img.example.com/abc.preview",
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let uploaded = client
        .images()
        .upload(bytes::Bytes::from_static(b"\x89PNG"))
        .await
        .unwrap();

    assert_eq!(uploaded.url, "https://img.example.com/abc");
    assert_eq!(
        uploaded.picture_url.as_deref(),
        Some("https://img.example.com/abc.preview")
    );
}
