use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
    routing::get,
};
use tower_http::cors::CorsLayer;

use crate::{AppState, routes};

mod auth;

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:80"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(routes::projects::router(&state))
        .merge(routes::work_items::router(&state))
        .merge(routes::backlogs::router(&state))
        .merge(routes::progress::router(&state))
        .merge(routes::remote_config::router())
        .merge(routes::sync::router())
        .merge(routes::reports::router())
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    let api_routes = Router::new()
        .nest("/auth", routes::auth::router())
        .merge(protected);

    Router::new()
        .route("/", get(routes::health::index))
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(cors_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use db::DBService;
    use tower::ServiceExt;

    use super::*;

    async fn setup_app() -> Router {
        let db = DBService::connect("sqlite::memory:").await.unwrap();
        let state = AppState::with_db(db, "test-secret").unwrap();
        router(state)
    }

    async fn request(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn register(app: &Router, email: &str, role: &str) {
        let (status, _) = request(
            app,
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "email": email,
                "name": format!("User {email}"),
                "password": "pass1234",
                "role": role,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn login(app: &Router, email: &str) -> String {
        let (status, json) = request(
            app,
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": "pass1234" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["token_type"], "bearer");
        json["data"]["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = setup_app().await;
        let (status, json) = request(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let app = setup_app().await;

        let (status, json) = request(&app, "GET", "/api/projects", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Unauthorized");

        let (status, _) = request(
            &app,
            "GET",
            "/api/projects",
            Some("not-a-real-token"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let app = setup_app().await;
        register(&app, "dup@example.com", "developer").await;

        let (status, json) = request(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "email": "dup@example.com",
                "name": "Again",
                "password": "pass1234",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let app = setup_app().await;
        register(&app, "dev@example.com", "developer").await;

        let (status, _) = request(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({
                "email": "dev@example.com",
                "password": "wrong",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn full_tracking_flow() {
        let app = setup_app().await;

        register(&app, "admin@example.com", "admin").await;
        register(&app, "dev@example.com", "developer").await;
        let admin_token = login(&app, "admin@example.com").await;
        let dev_token = login(&app, "dev@example.com").await;

        // Only admins may create projects.
        let (status, _) = request(
            &app,
            "POST",
            "/api/projects",
            Some(&dev_token),
            Some(serde_json::json!({ "name": "P1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, json) = request(
            &app,
            "POST",
            "/api/projects",
            Some(&admin_token),
            Some(serde_json::json!({ "name": "P1", "description": "pilot" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let project_id = json["data"]["id"].as_str().unwrap().to_string();

        // Project listing is scoped by role.
        let (_, json) = request(&app, "GET", "/api/projects", Some(&dev_token), None).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 0);
        let (_, json) = request(&app, "GET", "/api/projects", Some(&admin_token), None).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 1);

        let (status, json) = request(
            &app,
            "POST",
            "/api/work-items",
            Some(&admin_token),
            Some(serde_json::json!({
                "project_id": project_id,
                "title": "Implement reporting",
                "assigned_to": "dev@example.com",
                "estimated_hours": 10.0,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let item_id = json["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(json["data"]["actual_hours"], 0.0);

        // Two progress entries of three hours each.
        for _ in 0..2 {
            let (status, _) = request(
                &app,
                "POST",
                "/api/progress",
                Some(&dev_token),
                Some(serde_json::json!({
                    "work_item_id": item_id,
                    "hours_worked": 3.0,
                    "progress_percentage": 50.0,
                    "date": "2026-03-10",
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, json) =
            request(&app, "GET", "/api/work-items", Some(&dev_token), None).await;
        assert_eq!(status, StatusCode::OK);
        let items = json["data"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["actual_hours"], 6.0);

        let (status, json) = request(
            &app,
            "GET",
            "/api/reports/utilization",
            Some(&admin_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows = json["data"].as_array().unwrap();
        let dev_row = rows
            .iter()
            .find(|row| row["email"] == "dev@example.com")
            .expect("dev row");
        assert_eq!(dev_row["total_tasks"], 1);
        assert_eq!(dev_row["total_actual_hours"], 6.0);

        // A developer's report never contains anyone else's rows.
        let (_, json) = request(
            &app,
            "GET",
            "/api/reports/utilization",
            Some(&dev_token),
            None,
        )
        .await;
        let rows = json["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["email"], "dev@example.com");

        let (status, json) = request(
            &app,
            "GET",
            "/api/reports/project-status",
            Some(&dev_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows = json["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["total_work_items"], 1);
        assert_eq!(rows[0]["total_actual_hours"], 6.0);
    }

    #[tokio::test]
    async fn remote_config_is_replaced_and_redacted() {
        let app = setup_app().await;
        register(&app, "admin@example.com", "admin").await;
        let token = login(&app, "admin@example.com").await;

        for name in ["First", "Second"] {
            let (status, json) = request(
                &app,
                "POST",
                "/api/remote-config",
                Some(&token),
                Some(serde_json::json!({
                    "organization_url": "https://dev.azure.com/acme",
                    "project_name": name,
                    "access_token": "pat-secret",
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert!(json["data"].get("access_token").is_none());
        }

        let (status, json) =
            request(&app, "GET", "/api/remote-config", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["project_name"], "Second");
        assert_eq!(json["data"]["is_active"], true);
        assert!(json["data"].get("access_token").is_none());
    }

    #[tokio::test]
    async fn sync_without_config_is_a_bad_request() {
        let app = setup_app().await;
        register(&app, "dev@example.com", "developer").await;
        let token = login(&app, "dev@example.com").await;

        let (status, json) = request(&app, "POST", "/api/sync", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
    }
}
