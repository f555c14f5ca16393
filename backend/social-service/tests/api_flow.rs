//! End-to-end HTTP tests against the in-memory store

use std::sync::Arc;

use actix_web::{
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test, web, App,
};
use serde_json::{json, Value};
use uuid::Uuid;

use social_service::config::FeedConfig;
use social_service::handlers;
use social_service::middleware::USER_ID_HEADER;
use social_service::repository::{CommentRepository, LikeRepository, MemoryStore};
use social_service::AppState;

async fn setup() -> (
    impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    Arc<MemoryStore>,
) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::in_memory(store.clone(), FeedConfig::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(handlers::configure),
    )
    .await;
    (app, store)
}

fn as_user(req: test::TestRequest, user: Uuid) -> test::TestRequest {
    req.insert_header((USER_ID_HEADER, user.to_string()))
}

async fn create_post<S>(app: &S, author: Uuid, caption: &str) -> Uuid
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = as_user(test::TestRequest::post().uri("/api/v1/posts"), author)
        .set_json(json!({ "caption": caption }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    body["id"].as_str().unwrap().parse().unwrap()
}

async fn feed<S>(app: &S, viewer: Uuid) -> Vec<Value>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = as_user(test::TestRequest::get().uri("/api/v1/posts"), viewer).to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    test::read_body_json(resp).await
}

async fn send<S>(app: &S, req: test::TestRequest, user: Uuid) -> StatusCode
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::call_service(app, as_user(req, user).to_request())
        .await
        .status()
}

#[actix_web::test]
async fn test_alice_sees_bobs_post_and_likes_it() {
    let (app, store) = setup().await;
    let alice = store.register_user("alice").await;
    let bob = store.register_user("bob").await;

    let follow = test::TestRequest::post().uri(&format!("/api/v1/users/{}/follow", bob));
    assert_eq!(send(&app, follow, alice).await, StatusCode::CREATED);

    let post_id = create_post(&app, bob, "hello").await;

    let items = feed(&app, alice).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["caption"], "hello");
    assert_eq!(items[0]["user"]["username"], "bob");
    assert_eq!(items[0]["is_liked"], false);
    assert_eq!(items[0]["like_count"], 0);

    let like = test::TestRequest::post().uri(&format!("/api/v1/posts/{}/like", post_id));
    assert_eq!(send(&app, like, alice).await, StatusCode::CREATED);

    let items = feed(&app, alice).await;
    assert_eq!(items[0]["is_liked"], true);
    assert_eq!(items[0]["like_count"], 1);
}

#[actix_web::test]
async fn test_follow_and_unfollow_change_visibility() {
    let (app, store) = setup().await;
    let alice = store.register_user("alice").await;
    let bob = store.register_user("bob").await;
    create_post(&app, bob, "from bob").await;

    assert!(feed(&app, alice).await.is_empty());

    let follow = test::TestRequest::post().uri(&format!("/api/v1/users/{}/follow", bob));
    assert_eq!(send(&app, follow, alice).await, StatusCode::CREATED);
    assert_eq!(feed(&app, alice).await.len(), 1);

    let again = test::TestRequest::post().uri(&format!("/api/v1/users/{}/follow", bob));
    assert_eq!(send(&app, again, alice).await, StatusCode::BAD_REQUEST);

    let unfollow = test::TestRequest::delete().uri(&format!("/api/v1/users/{}/unfollow", bob));
    assert_eq!(send(&app, unfollow, alice).await, StatusCode::NO_CONTENT);
    assert!(feed(&app, alice).await.is_empty());

    let missing = test::TestRequest::delete().uri(&format!("/api/v1/users/{}/unfollow", bob));
    assert_eq!(send(&app, missing, alice).await, StatusCode::NOT_FOUND);

    let self_follow = test::TestRequest::post().uri(&format!("/api/v1/users/{}/follow", alice));
    assert_eq!(send(&app, self_follow, alice).await, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_double_like_is_rejected_and_relike_works() {
    let (app, store) = setup().await;
    let alice = store.register_user("alice").await;
    let post_id = create_post(&app, alice, "mine").await;
    let uri = format!("/api/v1/posts/{}/like", post_id);

    assert_eq!(
        send(&app, test::TestRequest::post().uri(&uri), alice).await,
        StatusCode::CREATED
    );

    let resp = test::call_service(
        &app,
        as_user(test::TestRequest::post().uri(&uri), alice).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "conflict");

    assert_eq!(
        send(&app, test::TestRequest::delete().uri(&uri), alice).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        send(&app, test::TestRequest::delete().uri(&uri), alice).await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        send(&app, test::TestRequest::post().uri(&uri), alice).await,
        StatusCode::CREATED
    );

    assert_eq!(feed(&app, alice).await[0]["like_count"], 1);
}

#[actix_web::test]
async fn test_deleting_post_removes_likes_and_comments() {
    let (app, store) = setup().await;
    let alice = store.register_user("alice").await;
    let bob = store.register_user("bob").await;
    let post_id = create_post(&app, alice, "short-lived").await;

    let like = test::TestRequest::post().uri(&format!("/api/v1/posts/{}/like", post_id));
    assert_eq!(send(&app, like, bob).await, StatusCode::CREATED);
    let comment = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/comments", post_id))
        .set_json(json!({ "text": "nice" }));
    assert_eq!(send(&app, comment, bob).await, StatusCode::CREATED);

    let by_bob = test::TestRequest::delete().uri(&format!("/api/v1/posts/{}", post_id));
    assert_eq!(send(&app, by_bob, bob).await, StatusCode::FORBIDDEN);

    let by_alice = test::TestRequest::delete().uri(&format!("/api/v1/posts/{}", post_id));
    assert_eq!(send(&app, by_alice, alice).await, StatusCode::NO_CONTENT);

    let get = test::TestRequest::get().uri(&format!("/api/v1/posts/{}", post_id));
    assert_eq!(send(&app, get, alice).await, StatusCode::NOT_FOUND);

    let comments = test::TestRequest::get().uri(&format!("/api/v1/posts/{}/comments", post_id));
    assert_eq!(send(&app, comments, alice).await, StatusCode::NOT_FOUND);

    assert_eq!(store.like_count(post_id).await.unwrap(), 0);
    assert!(store.list_comments(post_id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_feed_filters_by_follows_and_orders_newest_first() {
    let (app, store) = setup().await;
    let viewer = store.register_user("viewer").await;
    let a = store.register_user("a").await;
    let b = store.register_user("b").await;
    let c = store.register_user("c").await;

    for target in [a, b] {
        let follow = test::TestRequest::post().uri(&format!("/api/v1/users/{}/follow", target));
        assert_eq!(send(&app, follow, viewer).await, StatusCode::CREATED);
    }

    let p1 = create_post(&app, a, "P1").await;
    let p2 = create_post(&app, viewer, "P2").await;
    create_post(&app, c, "hidden").await;
    let p3 = create_post(&app, b, "P3").await;

    let ids: Vec<String> = feed(&app, viewer)
        .await
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(
        ids,
        vec![p3.to_string(), p2.to_string(), p1.to_string()]
    );
}

#[actix_web::test]
async fn test_feed_pagination_uses_cursor_header() {
    let (app, store) = setup().await;
    let alice = store.register_user("alice").await;
    for i in 0..3 {
        create_post(&app, alice, &format!("post {}", i)).await;
    }

    let req = as_user(test::TestRequest::get().uri("/api/v1/posts?limit=2"), alice).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cursor = resp
        .headers()
        .get("x-next-cursor")
        .expect("next cursor header")
        .to_str()
        .unwrap()
        .to_string();
    let first: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(first.len(), 2);
    assert_eq!(first[0]["caption"], "post 2");

    let uri = format!("/api/v1/posts?limit=2&cursor={}", cursor);
    let req = as_user(test::TestRequest::get().uri(&uri), alice).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.headers().get("x-next-cursor").is_none());
    let rest: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0]["caption"], "post 0");

    let bad = test::TestRequest::get().uri("/api/v1/posts?limit=2&cursor=@@");
    assert_eq!(send(&app, bad, alice).await, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_comment_deletion_requires_author() {
    let (app, store) = setup().await;
    let alice = store.register_user("alice").await;
    let bob = store.register_user("bob").await;
    let post_id = create_post(&app, alice, "discuss").await;

    let req = as_user(
        test::TestRequest::post().uri(&format!("/api/v1/posts/{}/comments", post_id)),
        alice,
    )
    .set_json(json!({ "text": "first" }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment: Value = test::read_body_json(resp).await;
    assert_eq!(comment["user"]["username"], "alice");
    let uri = format!(
        "/api/v1/posts/{}/comments/{}",
        post_id,
        comment["id"].as_str().unwrap()
    );

    assert_eq!(
        send(&app, test::TestRequest::delete().uri(&uri), bob).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        send(&app, test::TestRequest::get().uri(&uri), bob).await,
        StatusCode::OK
    );
    assert_eq!(
        send(&app, test::TestRequest::delete().uri(&uri), alice).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        send(&app, test::TestRequest::get().uri(&uri), alice).await,
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_requests_without_identity_are_unauthorized() {
    let (app, _) = setup().await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/posts").to_request())
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "unauthorized");

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header((USER_ID_HEADER, "nope"))
        .set_json(json!({ "caption": "x" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_post_update_and_validation() {
    let (app, store) = setup().await;
    let alice = store.register_user("alice").await;
    let bob = store.register_user("bob").await;
    let post_id = create_post(&app, alice, "draft").await;
    let uri = format!("/api/v1/posts/{}", post_id);

    let by_bob = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "caption": "mine now" }));
    assert_eq!(send(&app, by_bob, bob).await, StatusCode::FORBIDDEN);

    let req = as_user(test::TestRequest::put().uri(&uri), alice)
        .set_json(json!({ "caption": "final", "type": "S" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["caption"], "final");
    assert_eq!(body["type"], "S");

    let too_long = test::TestRequest::post()
        .uri("/api/v1/posts")
        .set_json(json!({ "caption": "x".repeat(2201) }));
    assert_eq!(send(&app, too_long, alice).await, StatusCode::BAD_REQUEST);

    let malformed = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");
    assert_eq!(send(&app, malformed, alice).await, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_create_post_requires_caption_field() {
    let (app, store) = setup().await;
    let alice = store.register_user("alice").await;

    let missing = test::TestRequest::post()
        .uri("/api/v1/posts")
        .set_json(json!({}));
    assert_eq!(send(&app, missing, alice).await, StatusCode::BAD_REQUEST);

    let empty = test::TestRequest::post()
        .uri("/api/v1/posts")
        .set_json(json!({ "caption": "" }));
    assert_eq!(send(&app, empty, alice).await, StatusCode::CREATED);

    assert_eq!(feed(&app, alice).await.len(), 1);
}

#[actix_web::test]
async fn test_profiles_and_follow_listings() {
    let (app, store) = setup().await;
    let alice = store.register_user("alice").await;
    let bob = store.register_user("bob").await;

    let follow = test::TestRequest::post().uri(&format!("/api/v1/users/{}/follow", bob));
    assert_eq!(send(&app, follow, alice).await, StatusCode::CREATED);

    let req = as_user(test::TestRequest::get().uri("/api/v1/users/profile"), alice).to_request();
    let me: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(me["username"], "alice");

    let req = test::TestRequest::get()
        .uri("/api/v1/users/bob/profile")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/profiles?search=BO")
        .to_request();
    let found: Vec<Value> = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["username"], "bob");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}/followers", bob))
        .to_request();
    let followers: Vec<Value> = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0]["follower"]["username"], "alice");
    assert_eq!(followers[0]["following"]["username"], "bob");

    let req = test::TestRequest::get()
        .uri("/api/v1/users/nobody/profile")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_health_ready_and_metrics() {
    let (app, _) = setup().await;

    for uri in ["/health", "/ready", "/metrics"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
    }
}
