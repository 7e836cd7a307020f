//! `/users` resource: CRUD over users plus the read-only posts relation.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use roster_core::{numeric_id, validate_new_user, Post, User, UserChanges, UserId};

use crate::app::errors::{ApiError, ErrorKey};
use crate::app::services::AppServices;

const INVALID_NAME: &str = "user name is invalid, must be a string of length < 128!";
const INSERT_FAILED: &str = "user cannot be added to db!";
const LIST_FAILED: &str = "Failed to retrieve users";
const GET_INVALID_ID: &str = "Cannot retrieve user..";
const GET_NOT_FOUND: &str = "User ID not found in DB (ID cannot be located)";
const GET_FAILED: &str = "Server failed to retrieve user...";
const POSTS_FAILED: &str = "Server failed to get posts from user...";
const UPDATE_INVALID_ID: &str = "error updating user";
const UPDATE_NOT_FOUND: &str = "User not found";
const UPDATE_FAILED: &str = "Server failed to update user...";
const DELETE_INVALID_ID: &str = "Error removing user";
const DELETE_NOT_FOUND: &str = "id is not valid (user not found)";
const DELETE_FAILED: &str = "failed to remove";

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/posts", get(get_user_posts))
}

/// Run the numeric-id gate, turning a rejection into the endpoint's error body.
fn gate(raw: &str, key: ErrorKey, message: &str) -> Result<Option<UserId>, ApiError> {
    numeric_id(raw).map_err(|e| ApiError::from_domain(e, key, message))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    // A missing or non-JSON body has no string `name`, so it fails validation.
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let new_user = validate_new_user(&body)
        .map_err(|e| ApiError::from_domain(e, ErrorKey::Err, INVALID_NAME))?;

    let created = services
        .users()
        .insert(new_user.uppercased())
        .await
        .map_err(|e| ApiError::persistence(e, ErrorKey::Err, INSERT_FAILED))?;

    tracing::info!(user_id = %created.id, "user created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<User>>, ApiError> {
    services
        .users()
        .list()
        .await
        .map(Json)
        .map_err(|e| ApiError::persistence(e, ErrorKey::Error, LIST_FAILED))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let not_found = || ApiError::not_found(ErrorKey::Err, GET_NOT_FOUND);

    let Some(id) = gate(&id, ErrorKey::Err, GET_INVALID_ID)? else {
        return Err(not_found());
    };

    match services.users().get(id).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => Err(not_found()),
        Err(e) => Err(ApiError::persistence(e, ErrorKey::Err, GET_FAILED)),
    }
}

pub async fn get_user_posts(
    Extension(services): Extension<Arc<AppServices>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let not_found = || {
        ApiError::not_found(
            ErrorKey::Err,
            format!("Posts by user {raw_id} not found. User does not exist"),
        )
    };

    let Some(id) = gate(&raw_id, ErrorKey::Err, POSTS_FAILED)? else {
        return Err(not_found());
    };

    match services.users().user_posts(id).await {
        Ok(Some(posts)) => Ok(Json(posts)),
        Ok(None) => Err(not_found()),
        Err(e) => Err(ApiError::persistence(e, ErrorKey::Err, POSTS_FAILED)),
    }
}

/// Merge arbitrary fields into a user. Responds with the number of records
/// changed, not the updated record.
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<u64>, ApiError> {
    let not_found = || ApiError::not_found(ErrorKey::Err, UPDATE_NOT_FOUND);

    let Some(id) = gate(&id, ErrorKey::Message, UPDATE_INVALID_ID)? else {
        return Err(not_found());
    };
    let changes = body
        .map(|Json(v)| UserChanges::from_value(v))
        .unwrap_or_default();

    match services.users().update(id, changes).await {
        Ok(0) => Err(not_found()),
        Ok(count) => {
            tracing::info!(user_id = %id, count, "user updated");
            Ok(Json(count))
        }
        Err(e) => Err(ApiError::persistence(e, ErrorKey::Err, UPDATE_FAILED)),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<u64>, ApiError> {
    let not_found = || ApiError::not_found(ErrorKey::Message, DELETE_NOT_FOUND);

    let Some(id) = gate(&id, ErrorKey::Message, DELETE_INVALID_ID)? else {
        return Err(not_found());
    };

    match services.users().remove(id).await {
        Ok(0) => Err(not_found()),
        Ok(count) => {
            tracing::info!(user_id = %id, count, "user removed");
            Ok(Json(count))
        }
        Err(e) => Err(ApiError::persistence(e, ErrorKey::Message, DELETE_FAILED)),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use axum::response::Response;
    use serde_json::json;
    use tower::ServiceExt;

    use async_trait::async_trait;

    use roster_core::NewUser;
    use roster_infra::{InMemoryUserStore, StoreError, UserStore};

    use super::*;
    use crate::app::build_app;

    /// Store whose every call fails, for the 500 paths.
    struct FailingStore;

    fn unavailable() -> StoreError {
        StoreError::Unavailable("database is down".to_string())
    }

    #[async_trait]
    impl UserStore for FailingStore {
        async fn insert(&self, _user: NewUser) -> Result<User, StoreError> {
            Err(unavailable())
        }

        async fn list(&self) -> Result<Vec<User>, StoreError> {
            Err(unavailable())
        }

        async fn get(&self, _id: UserId) -> Result<Option<User>, StoreError> {
            Err(unavailable())
        }

        async fn user_posts(&self, _id: UserId) -> Result<Option<Vec<Post>>, StoreError> {
            Err(unavailable())
        }

        async fn update(&self, _id: UserId, _changes: UserChanges) -> Result<u64, StoreError> {
            Err(unavailable())
        }

        async fn remove(&self, _id: UserId) -> Result<u64, StoreError> {
            Err(unavailable())
        }
    }

    fn app_with(store: Arc<dyn UserStore>) -> Router {
        build_app(AppServices::new(store))
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        app.oneshot(req.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_uppercases_name() {
        let app = app_with(Arc::new(InMemoryUserStore::new()));
        let res = send(app, Method::POST, "/users", Some(json!({ "name": "alice" }))).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(json_body(res).await, json!({ "id": 1, "name": "ALICE" }));
    }

    #[tokio::test]
    async fn create_without_json_body_is_a_validation_error() {
        let app = app_with(Arc::new(InMemoryUserStore::new()));
        let res = send(app, Method::POST, "/users", None).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await, json!({ "err": INVALID_NAME }));
    }

    #[tokio::test]
    async fn fractional_ids_are_treated_as_missing() {
        let store = Arc::new(InMemoryUserStore::new());
        store.insert(NewUser::new("A")).await.unwrap();
        let app = app_with(store);

        let res = send(app.clone(), Method::GET, "/users/1.5", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = send(app, Method::GET, "/users/1.0", None).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn posts_not_found_message_echoes_raw_id() {
        let app = app_with(Arc::new(InMemoryUserStore::new()));
        let res = send(app, Method::GET, "/users/12/posts", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(res).await,
            json!({ "err": "Posts by user 12 not found. User does not exist" })
        );
    }

    #[tokio::test]
    async fn update_with_unmappable_fields_is_a_server_error() {
        let store = Arc::new(InMemoryUserStore::new());
        store.insert(NewUser::new("A")).await.unwrap();
        let app = app_with(store);

        let res = send(app.clone(), Method::PUT, "/users/1", Some(json!({ "shoe_size": 9 }))).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(res).await, json!({ "err": UPDATE_FAILED }));

        let res = send(app, Method::PUT, "/users/1", None).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app_with(Arc::new(InMemoryUserStore::new()));
        let res = send(app, Method::GET, "/health", None).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn store_failures_map_to_each_endpoints_500_body() {
        let app = app_with(Arc::new(FailingStore));
        let cases = [
            (Method::POST, "/users", Some(json!({ "name": "alice" })), json!({ "err": INSERT_FAILED })),
            (Method::GET, "/users", None, json!({ "error": LIST_FAILED })),
            (Method::GET, "/users/1", None, json!({ "err": GET_FAILED })),
            (Method::GET, "/users/1/posts", None, json!({ "err": POSTS_FAILED })),
            (Method::PUT, "/users/1", Some(json!({ "name": "Bob" })), json!({ "err": UPDATE_FAILED })),
            (Method::DELETE, "/users/1", None, json!({ "message": DELETE_FAILED })),
        ];

        for (method, uri, body, expected) in cases {
            let res = send(app.clone(), method.clone(), uri, body).await;
            assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
            assert_eq!(json_body(res).await, expected, "{method} {uri}");
        }
    }
}
