//! HTTP handlers and route configuration.

mod comments;
mod drafts;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/posts", web::get().to(posts::list_posts))
            .route("/posts/{slug}", web::get().to(posts::get_post))
            .route("/posts/{id}/comments", web::get().to(comments::list_comments))
            // Authoring
            .route("/posts", web::post().to(posts::create_post))
            .route("/posts/{id}", web::put().to(posts::update_post))
            .route("/drafts", web::post().to(drafts::save_draft))
            .route("/drafts", web::get().to(drafts::list_drafts))
            .route("/drafts/{id}", web::get().to(drafts::get_draft))
            .route("/drafts/{id}", web::delete().to(drafts::delete_draft))
            // Comments
            .route("/posts/{id}/comments", web::post().to(comments::add_comment))
            .route("/comments/{id}", web::delete().to(comments::delete_comment)),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use folio_core::domain::CurrentUser;
    use folio_core::ports::TokenService;
    use folio_core::services::PublishConfig;
    use folio_infra::{JwtConfig, JwtTokenService};
    use serde_json::{Value, json};
    use uuid::Uuid;

    use super::configure_routes;
    use crate::middleware::request_id::RequestIdMiddleware;
    use crate::state::AppState;

    fn tokens() -> Arc<dyn TokenService> {
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".into(),
            ..JwtConfig::default()
        }))
    }

    fn bearer(tokens: &Arc<dyn TokenService>, user: &CurrentUser) -> (String, String) {
        let token = tokens.generate_token(user).unwrap();
        ("Authorization".into(), format!("Bearer {token}"))
    }

    macro_rules! app {
        ($tokens:expr) => {
            test::init_service(
                App::new()
                    .wrap(RequestIdMiddleware)
                    .app_data(web::Data::new(AppState::in_memory(PublishConfig::default())))
                    .app_data(web::Data::new($tokens.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    fn post_body(slug: &str) -> Value {
        json!({
            "title": "Hello",
            "slug": slug,
            "content": "<p>Body</p>",
            "status": "published",
            "category": "Rust",
            "tags": ["async", "async"]
        })
    }

    #[actix_rt::test]
    async fn test_health() {
        let tokens = tokens();
        let app = app!(tokens);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "in-memory");
    }

    #[actix_rt::test]
    async fn test_publish_requires_a_user() {
        let tokens = tokens();
        let app = app!(tokens);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(post_body("hello"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Sign in to publish");
    }

    #[actix_rt::test]
    async fn test_publish_then_read() {
        let tokens = tokens();
        let app = app!(tokens);
        let author = CurrentUser::new(Uuid::new_v4(), "Ada");

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&tokens, &author))
            .set_json(post_body("hello"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"success": true, "slug": "hello"}));

        let req = test::TestRequest::get().uri("/api/posts/hello").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["html"], "<p>Body</p>");
        assert_eq!(body["data"]["authorName"], "Ada");
        assert_eq!(body["data"]["categories"][0]["slug"], "rust");
        assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"][0]["slug"], "hello");
    }

    #[actix_rt::test]
    async fn test_second_post_with_same_slug_is_rejected() {
        let tokens = tokens();
        let app = app!(tokens);
        let author = CurrentUser::new(Uuid::new_v4(), "Ada");

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = test::TestRequest::post()
                .uri("/api/posts")
                .insert_header(bearer(&tokens, &author))
                .set_json(post_body("taken"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);

            if expected == StatusCode::CONFLICT {
                let body: Value = test::read_body_json(resp).await;
                assert_eq!(body["errors"][0]["field"], "slug");
            }
        }
    }

    #[actix_rt::test]
    async fn test_validation_errors_are_listed_per_field() {
        let tokens = tokens();
        let app = app!(tokens);
        let author = CurrentUser::new(Uuid::new_v4(), "Ada");

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&tokens, &author))
            .set_json(json!({"title": "", "slug": "Bad Slug", "content": "", "status": "draft"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(resp).await;
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["title", "slug", "content"]);
    }

    #[actix_rt::test]
    async fn test_problem_body_carries_request_id() {
        let tokens = tokens();
        let app = app!(tokens);

        let req = test::TestRequest::get()
            .uri("/api/posts/missing")
            .insert_header(("x-request-id", "req-42"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-42");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["request_id"], "req-42");
    }

    #[actix_rt::test]
    async fn test_draft_save_updates_in_place() {
        let tokens = tokens();
        let app = app!(tokens);
        let author = CurrentUser::new(Uuid::new_v4(), "Ada");

        let req = test::TestRequest::post()
            .uri("/api/drafts")
            .insert_header(bearer(&tokens, &author))
            .set_json(json!({"title": "First"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        let draft_id = body["draftId"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/drafts")
            .insert_header(bearer(&tokens, &author))
            .set_json(json!({"id": &draft_id, "title": "Second"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["draftId"], draft_id.as_str());

        let req = test::TestRequest::get()
            .uri("/api/drafts")
            .insert_header(bearer(&tokens, &author))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let drafts = body["data"].as_array().unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0]["title"], "Second");
    }

    #[actix_rt::test]
    async fn test_drafts_require_a_token() {
        let tokens = tokens();
        let app = app!(tokens);

        let req = test::TestRequest::get().uri("/api/drafts").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_comment_thread_and_moderation() {
        let tokens = tokens();
        let app = app!(tokens);
        let author = CurrentUser::new(Uuid::new_v4(), "Ada");
        let mut admin = CurrentUser::new(Uuid::new_v4(), "Root");
        admin.roles.push("admin".into());

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&tokens, &author))
            .set_json(post_body("threaded"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/posts/threaded").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let post_id = body["data"]["id"].as_str().unwrap().to_string();
        let comments_uri = format!("/api/posts/{post_id}/comments");

        let req = test::TestRequest::post()
            .uri(&comments_uri)
            .insert_header(bearer(&tokens, &author))
            .set_json(json!({"content": "  First!  "}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let root_id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["content"], "First!");

        let req = test::TestRequest::post()
            .uri(&comments_uri)
            .insert_header(bearer(&tokens, &author))
            .set_json(json!({"content": "Reply", "replyToId": &root_id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri(&comments_uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["replies"][0]["content"], "Reply");

        let delete_uri = format!("/api/comments/{root_id}");
        let req = test::TestRequest::delete()
            .uri(&delete_uri)
            .insert_header(bearer(&tokens, &author))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete()
            .uri(&delete_uri)
            .insert_header(bearer(&tokens, &admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["deleted"], 2);

        let req = test::TestRequest::get().uri(&comments_uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }
}
