// src/web/routes.rs
use crate::{
    services::{
        academics_service::{Enrollments, Groups, Programs, Subjects},
        account_service::{Accounts, Employees, Students},
        fitness_service::{Exercises, FollowUps, Progress, Recommendations, Routines},
        hr_service::{ContractTypes, EmployeeTypes},
        location_service::{Areas, Campuses, Cities, Countries, Departments, Faculties},
    },
    state::AppState,
    web::{
        auth_handlers, crud_handlers::crud_routes, fitness_handlers, mw_admin, mw_auth,
        view_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

fn academics_routes() -> Router<AppState> {
    let router = Router::new();
    let router = crud_routes::<Programs>(router, "/programs");
    let router = crud_routes::<Subjects>(router, "/subjects");
    let router = crud_routes::<Groups>(router, "/groups");
    crud_routes::<Enrollments>(router, "/enrollments")
}

// Só administradores
fn accounts_routes() -> Router<AppState> {
    let router = Router::new();
    let router = crud_routes::<Accounts>(router, "/users");
    let router = crud_routes::<Students>(router, "/students");
    crud_routes::<Employees>(router, "/employees")
        .route_layer(middleware::from_fn(mw_admin::require_admin))
}

fn fitness_routes() -> Router<AppState> {
    let router = Router::new()
        .route(
            "/routines/{id}/adopt/",
            post(fitness_handlers::adopt_routine),
        )
        .route(
            "/statistics/users/",
            get(fitness_handlers::user_statistics),
        )
        .route(
            "/statistics/instructors/",
            get(fitness_handlers::instructor_statistics),
        );
    let router = crud_routes::<Exercises>(router, "/exercises");
    let router = crud_routes::<Routines>(router, "/routines");
    let router = crud_routes::<Progress>(router, "/progress");
    let router = crud_routes::<Recommendations>(router, "/recommendations");
    crud_routes::<FollowUps>(router, "/followups")
}

fn hr_routes() -> Router<AppState> {
    let router = crud_routes::<ContractTypes>(Router::new(), "/contract-types");
    crud_routes::<EmployeeTypes>(router, "/employee-types")
}

fn locations_routes() -> Router<AppState> {
    let router = Router::new();
    let router = crud_routes::<Countries>(router, "/countries");
    let router = crud_routes::<Departments>(router, "/departments");
    let router = crud_routes::<Cities>(router, "/cities");
    let router = crud_routes::<Campuses>(router, "/campuses");
    let router = crud_routes::<Faculties>(router, "/faculties");
    crud_routes::<Areas>(router, "/areas")
}

/// API REST em JSON, montada em `/api`.
fn api_routes(app_state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/login/", post(auth_handlers::api_login))
        .route("/auth/logout/", post(auth_handlers::api_logout));

    let protected = Router::new()
        .route("/auth/me/", get(auth_handlers::api_me))
        .nest("/academics", academics_routes())
        .nest("/accounts", accounts_routes())
        .nest("/fitness", fitness_routes())
        .nest("/hr", hr_routes())
        .nest("/locations", locations_routes())
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_api_auth,
        ));

    public.merge(protected)
}

/// Páginas HTML por papel.
fn page_routes(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/app", get(view_handlers::show_home))
        .route("/app/{tab}", get(view_handlers::show_tab))
        .route(
            "/app/routines/{id}/adopt",
            post(view_handlers::adopt_routine),
        )
        .route("/app/actions/progress", post(view_handlers::log_progress))
        .route("/app/actions/exercises", post(view_handlers::create_exercise))
        .route("/app/actions/pre-designed", post(view_handlers::create_pre_designed))
        .route(
            "/app/actions/recommendations",
            post(view_handlers::send_recommendation),
        )
        .route("/app/actions/assignments", post(view_handlers::save_assignment))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ))
}

pub fn create_router(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route(
            "/login",
            get(auth_handlers::show_login_form).post(auth_handlers::handle_login),
        )
        .route("/logout", get(auth_handlers::handle_logout))
        .route("/", get(view_handlers::root));

    Router::new()
        .merge(public_routes)
        .merge(page_routes(&app_state))
        .nest("/api", api_routes(&app_state))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, seed};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    async fn test_app() -> Router {
        let pool = db::memory_pool().await;
        seed::seed_demo_data_with_cost(&pool, 4).await.unwrap();
        create_router(AppState { db_pool: pool })
            .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let response = send(
            app,
            json_request(
                "POST",
                "/api/auth/login/",
                None,
                json!({"email": email, "password": password}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn api_requires_authentication() {
        let app = test_app().await;
        let response = send(&app, get_request("/api/fitness/exercises/", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn login_returns_token_and_backend_user() {
        let app = test_app().await;
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/auth/login/",
                None,
                json!({"email": seed::DEMO_STUDENT_EMAIL, "password": seed::DEMO_PASSWORD}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["user"]["role"], "STUDENT");
        assert_eq!(body["user"]["student_details"]["email"], seed::DEMO_STUDENT_EMAIL);

        let token = body["token"].as_str().unwrap();
        let me = send(&app, get_request("/api/auth/me/", Some(token))).await;
        assert_eq!(me.status(), StatusCode::OK);
        assert_eq!(json_body(me).await["username"], seed::DEMO_STUDENT_USERNAME);

        let wrong = send(
            &app,
            json_request(
                "POST",
                "/api/auth/login/",
                None,
                json!({"email": seed::DEMO_STUDENT_EMAIL, "password": "errada"}),
            ),
        )
        .await;
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accounts_are_admin_only() {
        let app = test_app().await;
        let student = login(&app, seed::DEMO_STUDENT_EMAIL, seed::DEMO_PASSWORD).await;
        let response = send(&app, get_request("/api/accounts/users/", Some(&student))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = login(&app, seed::DEMO_ADMIN_USERNAME, seed::DEMO_ADMIN_PASSWORD).await;
        let response = send(&app, get_request("/api/accounts/users/", Some(&admin))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn exercises_crud_and_filters() {
        let app = test_app().await;
        let token = login(&app, seed::DEMO_STUDENT_EMAIL, seed::DEMO_PASSWORD).await;

        let created = send(
            &app,
            json_request(
                "POST",
                "/api/fitness/exercises/",
                Some(&token),
                json!({"name": "Burpees", "type": "cardio", "difficulty": "alta",
                       "created_by": seed::DEMO_STUDENT_USERNAME}),
            ),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = json_body(created).await;
        assert_eq!(created["difficulty"], "avanzado");
        assert_eq!(created["is_custom"], true);
        let id = created["id"].as_str().unwrap().to_string();

        let cardio = send(
            &app,
            get_request("/api/fitness/exercises/?type=cardio", Some(&token)),
        )
        .await;
        let cardio = json_body(cardio).await;
        assert!(cardio
            .as_array()
            .unwrap()
            .iter()
            .all(|e| e["type"] == "cardio"));

        let invalid = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/fitness/exercises/{id}/"),
                Some(&token),
                json!({"name": "", "type": "cardio"}),
            ),
        )
        .await;
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let deleted = send(
            &app,
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/fitness/exercises/{id}/"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let missing = send(
            &app,
            get_request(&format!("/api/fitness/exercises/{id}/"), Some(&token)),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn adopt_endpoint_copies_template() {
        let app = test_app().await;
        let token = login(&app, seed::DEMO_STUDENT_EMAIL, seed::DEMO_PASSWORD).await;

        let templates = send(
            &app,
            get_request("/api/fitness/routines/?is_template=true", Some(&token)),
        )
        .await;
        let templates = json_body(templates).await;
        let source = &templates.as_array().unwrap()[0];
        let source_id = source["id"].as_str().unwrap();

        let adopted = send(
            &app,
            json_request(
                "POST",
                &format!("/api/fitness/routines/{source_id}/adopt/"),
                Some(&token),
                json!({"user_id": seed::DEMO_STUDENT_USERNAME}),
            ),
        )
        .await;
        assert_eq!(adopted.status(), StatusCode::CREATED);
        let adopted = json_body(adopted).await;
        assert_ne!(adopted["id"], source["id"]);
        assert_eq!(adopted["is_pre_designed"], false);
        assert_eq!(adopted["base_routine_id"], source["id"]);
        assert_eq!(adopted["exercises"], source["exercises"]);
    }

    #[tokio::test]
    async fn students_adopt_only_for_themselves() {
        let app = test_app().await;
        let student = login(&app, seed::DEMO_STUDENT_EMAIL, seed::DEMO_PASSWORD).await;
        let trainer = login(&app, seed::DEMO_TRAINER_EMAIL, seed::DEMO_PASSWORD).await;

        let templates = send(
            &app,
            get_request("/api/fitness/routines/?is_template=true", Some(&student)),
        )
        .await;
        let templates = json_body(templates).await;
        let source_id = templates[0]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/fitness/routines/{source_id}/adopt/");

        let refused = send(
            &app,
            json_request("POST", &uri, Some(&student), json!({"user_id": "admin"})),
        )
        .await;
        assert_eq!(refused.status(), StatusCode::FORBIDDEN);

        let on_behalf = send(
            &app,
            json_request(
                "POST",
                &uri,
                Some(&trainer),
                json!({"user_id": seed::DEMO_STUDENT_USERNAME}),
            ),
        )
        .await;
        assert_eq!(on_behalf.status(), StatusCode::CREATED);
        assert_eq!(
            json_body(on_behalf).await["user_id"],
            seed::DEMO_STUDENT_USERNAME
        );
    }

    #[tokio::test]
    async fn pages_redirect_to_login_without_session() {
        let app = test_app().await;
        let response = send(&app, get_request("/app", None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn html_login_sets_session_cookie() {
        let app = test_app().await;
        let form = format!(
            "email={}&password={}",
            urlencoding::encode(seed::DEMO_STUDENT_EMAIL),
            seed::DEMO_PASSWORD
        );
        let response = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let page = send(
            &app,
            Request::builder()
                .uri("/app/routines")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(page.status(), StatusCode::OK);
        let bytes = to_bytes(page.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(seed::DEMO_ROUTINE_NAME));
        assert!(html.contains("Mis rutinas"));
    }

    #[tokio::test]
    async fn bad_html_login_shows_message() {
        let app = test_app().await;
        let response = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=nadie&password=x"))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Credenciales inválidas"));
    }
}
