pub mod board;
pub mod health;
pub mod resources;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::models::{
    ClientInteraction, Comment, Company, Contact, Deal, EmailSequence, Integration, Job,
    Preferences, Task,
};
use crate::pipeline::grouping::PipelineItem;
use crate::resources::Resource;
use crate::state::{AppState, HasBoard, HasStore};
use crate::validation::FormRules;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resource collections
        .merge(resource_routes::<Contact>())
        .merge(resource_routes::<Company>())
        .merge(resource_routes::<Deal>())
        .merge(resource_routes::<Job>())
        .merge(resource_routes::<Task>())
        .merge(resource_routes::<Comment>())
        .merge(resource_routes::<ClientInteraction>())
        .merge(resource_routes::<EmailSequence>())
        .merge(resource_routes::<Integration>())
        .merge(resource_routes::<Preferences>())
        // Pipeline boards
        .merge(board_routes::<Deal>())
        .merge(board_routes::<Job>())
        .with_state(state)
}

fn resource_routes<T>() -> Router<AppState>
where
    T: Resource + FormRules,
    AppState: HasStore<T>,
{
    let base = format!("/api/v1/{}", T::PATH);
    Router::new()
        .route(
            &base,
            get(resources::handle_list::<T>).post(resources::handle_create::<T>),
        )
        .route(
            &format!("{base}/state"),
            get(resources::handle_state::<T>).delete(resources::handle_reset::<T>),
        )
        .route(
            &format!("{base}/state/error"),
            delete(resources::handle_clear_error::<T>),
        )
        .route(
            &format!("{base}/:id"),
            put(resources::handle_update::<T>).delete(resources::handle_delete::<T>),
        )
}

fn board_routes<T>() -> Router<AppState>
where
    T: Resource + PipelineItem,
    AppState: HasBoard<T>,
{
    let base = format!("/api/v1/boards/{}", T::PATH);
    Router::new()
        .route(&base, get(board::handle_board::<T>))
        .route(&format!("{base}/stages"), get(board::handle_stages::<T>))
        .route(&format!("{base}/drags"), post(board::handle_start_drag::<T>))
        .route(
            &format!("{base}/drags/:session"),
            get(board::handle_drag_state::<T>),
        )
        .route(
            &format!("{base}/drags/:session/hover"),
            post(board::handle_hover::<T>),
        )
        .route(
            &format!("{base}/drags/:session/end"),
            post(board::handle_end_drag::<T>),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Registries;
    use crate::testing::{config, InMemoryFactory};
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(factory: InMemoryFactory) -> Router {
        build_router(AppState::build(&config(), Registries::default(), &factory))
    }

    fn deals_factory() -> InMemoryFactory {
        InMemoryFactory::default().seed(
            "deals",
            vec![
                json!({"id": "1", "title": "Acme renewal", "stageId": "lead", "amount": 1200}),
                json!({"id": "2", "title": "Globex pilot", "stageId": "qualified"}),
                json!({"id": "3", "title": "Initech expansion", "stageId": "lead"}),
            ],
        )
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(InMemoryFactory::default());
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_contact_crud_flow() {
        let app = app(InMemoryFactory::default().seed(
            "contacts",
            vec![json!({"id": "c1", "firstName": "Ada", "lastName": "Lovelace"})],
        ));

        let (status, body) = send(&app, Method::GET, "/api/v1/contacts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["loading"], false);

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/v1/contacts",
            Some(json!({"name": "Jane", "email": "jane@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/contacts/{id}"),
            Some(json!({"title": "Recruiter"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Recruiter");

        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/contacts/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, state) = send(&app, Method::GET, "/api/v1/contacts/state", None).await;
        let ids: Vec<&str> = state["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["c1"]);
    }

    #[tokio::test]
    async fn test_invalid_payload_rejected_inline() {
        let app = app(InMemoryFactory::default());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/contacts",
            Some(json!({"firstName": "Jane", "email": "not-an-email"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["fields"]["email"], "Email address is not valid");

        let (_, state) = send(&app, Method::GET, "/api/v1/contacts/state", None).await;
        assert!(state["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_reports_error_in_collection() {
        let app = app(InMemoryFactory::default().failing("tasks"));
        let (status, body) = send(&app, Method::GET, "/api/v1/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "network down");
        assert_eq!(body["loading"], false);
    }

    #[tokio::test]
    async fn test_failed_create_is_bad_gateway_and_leaves_items() {
        let app = app(InMemoryFactory::default().failing("contacts"));
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/contacts",
            Some(json!({"name": "Jane"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["message"], "network down");

        let (_, state) = send(&app, Method::GET, "/api/v1/contacts/state", None).await;
        assert!(state["items"].as_array().unwrap().is_empty());
        assert_eq!(state["error"], "network down");
    }

    #[tokio::test]
    async fn test_clear_error_route() {
        let app = app(InMemoryFactory::default().failing("tasks"));
        send(&app, Method::GET, "/api/v1/tasks", None).await;

        let (status, _) = send(&app, Method::DELETE, "/api/v1/tasks/state/error", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, state) = send(&app, Method::GET, "/api/v1/tasks/state", None).await;
        assert_eq!(state["error"], Value::Null);
    }

    #[tokio::test]
    async fn test_reset_route_drops_cached_items() {
        let app = app(InMemoryFactory::default().seed(
            "companies",
            vec![json!({"id": "co1", "name": "Acme"})],
        ));
        let (_, listed) = send(&app, Method::GET, "/api/v1/companies", None).await;
        assert_eq!(listed["items"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::DELETE, "/api/v1/companies/state", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, state) = send(&app, Method::GET, "/api/v1/companies/state", None).await;
        assert!(state["items"].as_array().unwrap().is_empty());
        assert_eq!(state["loading"], false);

        let (_, refetched) = send(&app, Method::GET, "/api/v1/companies", None).await;
        assert_eq!(refetched["items"][0]["id"], "co1");
    }

    #[tokio::test]
    async fn test_invalid_job_openings_never_reach_backend() {
        let app = app(InMemoryFactory::default());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/jobs",
            Some(json!({"title": "Eng", "stageId": "sourcing", "openings": 2.5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"]["openings"], "Must be a whole number");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/integrations",
            Some(json!({"provider": "zoom"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"]["kind"], "Integration type is required");
    }

    #[tokio::test]
    async fn test_board_groups_deals() {
        let app = app(deals_factory());
        let (status, body) = send(&app, Method::GET, "/api/v1/boards/deals", None).await;
        assert_eq!(status, StatusCode::OK);

        let lead = &body["columns"][0];
        assert_eq!(lead["stage"]["id"], "lead");
        assert_eq!(lead["count"], 2);
        assert_eq!(lead["totalAmount"], 1200.0);
        assert_eq!(lead["items"][1]["id"], "3");
        assert_eq!(body["columns"][1]["items"][0]["id"], "2");
    }

    #[tokio::test]
    async fn test_board_drag_flow() {
        let app = app(deals_factory());
        send(&app, Method::GET, "/api/v1/boards/deals", None).await;

        let (status, ticket) = send(
            &app,
            Method::POST,
            "/api/v1/boards/deals/drags",
            Some(json!({"itemId": "1", "sensor": "keyboard"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(ticket["state"]["state"], "dragging");
        let session = ticket["sessionId"].as_str().unwrap().to_string();

        let (status, outcome) = send(
            &app,
            Method::POST,
            &format!("/api/v1/boards/deals/drags/{session}/hover"),
            Some(json!({"stageId": "qualified"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["outcome"], "moved");
        assert_eq!(outcome["toStageId"], "qualified");

        let (status, ended) = send(
            &app,
            Method::POST,
            &format!("/api/v1/boards/deals/drags/{session}/end"),
            Some(json!({"reason": "drop"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ended["itemId"], "1");

        let (_, board) = send(&app, Method::GET, "/api/v1/boards/deals", None).await;
        assert_eq!(board["columns"][1]["count"], 2);
    }

    #[tokio::test]
    async fn test_hover_unknown_stage_is_bad_request() {
        let app = app(deals_factory());
        send(&app, Method::GET, "/api/v1/boards/deals", None).await;
        let (_, ticket) = send(
            &app,
            Method::POST,
            "/api/v1/boards/deals/drags",
            Some(json!({"itemId": "1"})),
        )
        .await;
        let session = ticket["sessionId"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/boards/deals/drags/{session}/hover"),
            Some(json!({"stageId": "sourcing"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNKNOWN_STAGE");
    }

    #[tokio::test]
    async fn test_job_board_stages() {
        let app = app(InMemoryFactory::default());
        let (status, body) = send(&app, Method::GET, "/api/v1/boards/jobs/stages", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "sourcing");
        assert_eq!(body[0]["displayColor"], "#94a3b8");
    }
}
