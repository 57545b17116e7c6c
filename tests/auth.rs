mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::json;
use uuid::Uuid;

use taskboard::auth::{AuthGate, TokenService};
use taskboard::error::ErrorEnvelope;
use taskboard::routes;

macro_rules! test_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(TokenService::new(common::TEST_JWT_SECRET, 24)))
                .wrap(ErrorEnvelope)
                .service(routes::health::health)
                .service(
                    web::scope("/api/v1")
                        .wrap(AuthGate)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_register_login_and_duplicate_flow() {
    let Some(pool) = common::try_pool().await else {
        return;
    };
    let app = test_app!(pool);
    let email = common::unique_email("register-flow");

    // Register
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "name": "Ann", "email": email, "password": "Passw0rd!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(user["role"], "MEMBER");
    assert_eq!(user["email"], email);
    assert!(user.get("password_hash").is_none());

    // Duplicate registration with a differently-cased email still collides
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "name": "Ann", "email": email.to_uppercase(), "password": "Passw0rd!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "TD-0017");
    assert_eq!(body["reqMethod"], "POST");

    // Login
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": email, "password": "Passw0rd!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], email);

    // Wrong password: its own code, no hint beyond "incorrect"
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": email, "password": "Passw0rd!!but-wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "TD-0018");

    // Unknown email
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": common::unique_email("nobody"), "password": "Passw0rd!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_weak_password_rejected() {
    let Some(pool) = common::try_pool().await else {
        return;
    };
    let app = test_app!(pool);

    for weak in ["short1!", "passw0rd!", "PASSW0RD!", "Password!", "Passw0rdd"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "name": "Ann",
                "email": common::unique_email("weak-password"),
                "password": weak,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "password {:?} should have been rejected",
            weak
        );
    }
}

#[actix_rt::test]
async fn test_token_grants_access_and_dies_with_its_user() {
    let Some(pool) = common::try_pool().await else {
        return;
    };
    let app = test_app!(pool);
    let email = common::unique_email("token-lifecycle");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "name": "Ann", "email": email, "password": "Passw0rd!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: serde_json::Value = test::read_body_json(resp).await;
    let user_id = Uuid::parse_str(user["id"].as_str().unwrap()).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": email, "password": "Passw0rd!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    // No token: 401 with the Unauthorized code
    let req = test::TestRequest::get().uri("/api/v1/tasks").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "TD-0007");

    // With the token: reads are allowed for any role
    let req = test::TestRequest::get()
        .uri("/api/v1/tasks")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Once the subject is soft-deleted the same token stops resolving
    common::soft_delete_user(&pool, user_id).await;
    let req = test::TestRequest::get()
        .uri("/api/v1/tasks")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
