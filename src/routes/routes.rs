//! Defines routes for the JSON API surface.
//!
//! ## Structure
//! - **Bucket-level endpoints**
//!   - `POST   /storage/v1/b` — create bucket
//!   - `GET    /storage/v1/b` — list buckets
//!   - `GET    /storage/v1/b/{bucket}` — get bucket
//!   - `DELETE /storage/v1/b/{bucket}` — delete bucket
//!
//! - **Object-level endpoints**
//!   - `GET    /storage/v1/b/{bucket}/o` — list objects (prefix, delimiter)
//!   - `POST   /upload/storage/v1/b/{bucket}/o?name=` — media upload
//!   - `GET    /storage/v1/b/{bucket}/o/{*object}` — metadata or `alt=media`;
//!     a trailing `/acl` segment serves the ACL listing
//!   - `DELETE /storage/v1/b/{bucket}/o/{*object}` — delete / tombstone
//!   - `POST   /storage/v1/b/{bucket}/o/{source}/rewriteTo/b/{dest_bucket}/o/{dest_object}`
//!
//! The wildcard `{*object}` admits nested keys like `photos/2025/img.jpg`.
//! A catch-all segment cannot coexist with deeper sibling routes, so the
//! ACL and rewrite paths are not separate routes: the object handlers own
//! everything under `o/` and dispatch on the captured tail.

use crate::{
    handlers::{
        bucket_handlers::{create_bucket, delete_bucket, get_bucket, list_buckets},
        health_handlers::{healthz, readyz},
        object_handlers::{
            delete_object, get_object, insert_object, list_objects, rewrite_object,
        },
    },
    services::backend::SharedBackend,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build the router for the whole API surface. The router carries the
/// shared backend handle to every handler.
pub fn routes() -> Router<SharedBackend> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Bucket-level routes
        .route("/storage/v1/b", post(create_bucket).get(list_buckets))
        .route(
            "/storage/v1/b/{bucket}",
            get(get_bucket).delete(delete_bucket),
        )
        // Object-level routes
        .route("/storage/v1/b/{bucket}/o", get(list_objects))
        .route("/upload/storage/v1/b/{bucket}/o", post(insert_object))
        .route(
            "/storage/v1/b/{bucket}/o/{*object}",
            get(get_object).delete(delete_object).post(rewrite_object),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::object::{AclRule, Object};
    use crate::services::{backend::StorageBackend, memory::InMemoryBackend};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> (Arc<InMemoryBackend>, Router) {
        let backend = Arc::new(InMemoryBackend::new());
        let shared: SharedBackend = backend.clone();
        (backend, routes().with_state(shared))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn create_and_get_bucket() {
        let (_, app) = app();
        let response = app
            .clone()
            .oneshot(json_request("POST", "/storage/v1/b", json!({"name": "pics"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"kind": "storage#bucket", "id": "pics", "name": "pics"})
        );

        let response = app
            .oneshot(empty_request("GET", "/storage/v1/b/pics"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "pics");
    }

    #[tokio::test]
    async fn missing_bucket_renders_the_error_envelope() {
        let (_, app) = app();
        let response = app
            .oneshot(empty_request("GET", "/storage/v1/b/ghost"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let value = body_json(response).await;
        assert_eq!(value["error"]["code"], 404);
        assert!(!value["error"]["message"].as_str().unwrap().is_empty());
        assert!(value["error"]["errors"].is_array());
    }

    #[tokio::test]
    async fn malformed_create_bucket_body_is_a_400_envelope() {
        let (_, app) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/storage/v1/b")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = body_json(response).await;
        assert_eq!(value["error"]["code"], 400);
    }

    #[tokio::test]
    async fn recreating_a_bucket_with_a_different_flag_conflicts() {
        let (_, app) = app();
        app.clone()
            .oneshot(json_request("POST", "/storage/v1/b", json!({"name": "b"})))
            .await
            .unwrap();
        let response = app
            .oneshot(json_request(
                "POST",
                "/storage/v1/b",
                json!({"name": "b", "versioning": {"enabled": true}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"]["code"], 409);
    }

    #[tokio::test]
    async fn list_buckets_sorted_by_name() {
        let (backend, app) = app();
        for name in ["zeta", "alpha", "mid"] {
            backend.create_bucket(name, false).unwrap();
        }
        let response = app
            .oneshot(empty_request("GET", "/storage/v1/b"))
            .await
            .unwrap();
        let value = body_json(response).await;
        assert_eq!(value["kind"], "storage#buckets");
        let names: Vec<&str> = value["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn upload_then_fetch_object_metadata() {
        let (backend, app) = app();
        backend.create_bucket("pics", false).unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/upload/storage/v1/b/pics/o?name=beach.jpg")
            .header(header::CONTENT_TYPE, "image/jpeg")
            .body(Body::from(vec![0u8; 1024]))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["kind"], "storage#object");
        assert_eq!(value["size"], json!("1024"));
        assert_eq!(value["contentType"], "image/jpeg");

        let response = app
            .oneshot(empty_request("GET", "/storage/v1/b/pics/o/beach.jpg"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["id"], "pics/beach.jpg");
        assert_eq!(value["size"], json!("1024"));
    }

    #[tokio::test]
    async fn upload_without_name_is_rejected() {
        let (backend, app) = app();
        backend.create_bucket("pics", false).unwrap();
        let response = app
            .oneshot(empty_request("POST", "/upload/storage/v1/b/pics/o"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], 400);
    }

    #[tokio::test]
    async fn alt_media_returns_the_raw_content() {
        let (backend, app) = app();
        backend.create_bucket("b", false).unwrap();
        backend
            .create_object(Object::new("b", "hello.txt", "hello world", "text/plain", ""))
            .unwrap();

        let response = app
            .oneshot(empty_request("GET", "/storage/v1/b/b/o/hello.txt?alt=media"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello world");
    }

    #[tokio::test]
    async fn nested_object_keys_round_trip() {
        let (backend, app) = app();
        backend.create_bucket("b", false).unwrap();
        backend
            .create_object(Object::new("b", "photos/2025/img.jpg", "x", "image/jpeg", ""))
            .unwrap();
        let response = app
            .oneshot(empty_request("GET", "/storage/v1/b/b/o/photos/2025/img.jpg"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "photos/2025/img.jpg");
    }

    #[tokio::test]
    async fn list_objects_with_prefix_and_delimiter() {
        let (backend, app) = app();
        backend.create_bucket("b", false).unwrap();
        for key in ["photos/2025/a.jpg", "photos/2026/b.jpg", "photos/c.txt"] {
            backend
                .create_object(Object::new("b", key, "x", "text/plain", ""))
                .unwrap();
        }
        let response = app
            .oneshot(empty_request(
                "GET",
                "/storage/v1/b/b/o?prefix=photos/&delimiter=/",
            ))
            .await
            .unwrap();
        let value = body_json(response).await;
        assert_eq!(value["kind"], "storage#objects");
        assert_eq!(value["items"][0]["name"], "photos/c.txt");
        assert_eq!(value["prefixes"], json!(["photos/2025/", "photos/2026/"]));
    }

    #[tokio::test]
    async fn acl_listing_distinguishes_empty_from_populated() {
        let (backend, app) = app();
        backend.create_bucket("b", false).unwrap();
        backend
            .create_object(Object::new("b", "bare", "x", "text/plain", ""))
            .unwrap();
        let mut shared = Object::new("b", "shared", "x", "text/plain", "");
        shared.acl.push(AclRule {
            entity: "allUsers".into(),
            role: "READER".into(),
        });
        backend.create_object(shared).unwrap();

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/storage/v1/b/b/o/bare/acl"))
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({"kind": "storage#objectAccessControls"})
        );

        let response = app
            .oneshot(empty_request("GET", "/storage/v1/b/b/o/shared/acl"))
            .await
            .unwrap();
        let value = body_json(response).await;
        assert_eq!(value["items"][0]["entity"], "allUsers");
        assert_eq!(value["items"][0]["role"], "READER");
    }

    #[tokio::test]
    async fn acl_suffix_coexists_with_nested_object_keys() {
        // Both shapes travel through the same catch-all route: a nested
        // key read and an ACL read distinguished only by the tail.
        let (backend, app) = app();
        backend.create_bucket("b", false).unwrap();
        let mut obj = Object::new("b", "photos/2025/img.jpg", "x", "image/jpeg", "");
        obj.acl.push(AclRule {
            entity: "allUsers".into(),
            role: "READER".into(),
        });
        backend.create_object(obj).unwrap();

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/storage/v1/b/b/o/photos/2025/img.jpg"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["kind"], "storage#object");

        let response = app
            .oneshot(empty_request(
                "GET",
                "/storage/v1/b/b/o/photos/2025/img.jpg/acl",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["kind"], "storage#objectAccessControls");
        assert_eq!(value["items"][0]["object"], "photos/2025/img.jpg");
    }

    #[tokio::test]
    async fn malformed_list_query_is_a_400_envelope() {
        let (backend, app) = app();
        backend.create_bucket("b", false).unwrap();
        let response = app
            .oneshot(empty_request("GET", "/storage/v1/b/b/o?prefix=%FF"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = body_json(response).await;
        assert_eq!(value["error"]["code"], 400);
        assert!(!value["error"]["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn post_without_rewrite_marker_is_rejected() {
        let (backend, app) = app();
        backend.create_bucket("b", false).unwrap();
        let response = app
            .oneshot(empty_request("POST", "/storage/v1/b/b/o/just-a-key"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], 400);
    }

    #[tokio::test]
    async fn rewrite_reports_single_step_completion() {
        let (backend, app) = app();
        backend.create_bucket("src", false).unwrap();
        backend.create_bucket("dst", false).unwrap();
        backend
            .create_object(Object::new("src", "a", vec![9u8; 500], "text/plain", ""))
            .unwrap();

        let response = app
            .oneshot(empty_request(
                "POST",
                "/storage/v1/b/src/o/a/rewriteTo/b/dst/o/copy",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["totalBytesRewritten"], json!("500"));
        assert_eq!(value["objectSize"], json!("500"));
        assert_eq!(value["done"], json!(true));
        assert_eq!(value["rewriteToken"], json!(""));
        assert_eq!(value["resource"]["bucket"], "dst");
        assert_eq!(value["resource"]["name"], "copy");
    }

    #[tokio::test]
    async fn delete_object_then_404_on_get() {
        let (backend, app) = app();
        backend.create_bucket("b", false).unwrap();
        backend
            .create_object(Object::new("b", "o", "x", "text/plain", ""))
            .unwrap();

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/storage/v1/b/b/o/o"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(empty_request("GET", "/storage/v1/b/b/o/o"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn versioned_object_readable_by_explicit_generation() {
        let (backend, app) = app();
        backend.create_bucket("vb", true).unwrap();
        let first = backend
            .create_object(Object::new("vb", "o", "one", "text/plain", ""))
            .unwrap();
        backend
            .create_object(Object::new("vb", "o", "two", "text/plain", ""))
            .unwrap();
        backend.delete_object("vb", "o").unwrap();

        let uri = format!("/storage/v1/b/vb/o/o?generation={}", first.generation);
        let response = app
            .clone()
            .oneshot(empty_request("GET", &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["id"], format!("vb/o#{}", first.generation));

        // The live lookup sees only the tombstone.
        let response = app
            .oneshot(empty_request("GET", "/storage/v1/b/vb/o/o"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_endpoints_respond() {
        let (_, app) = app();
        let response = app
            .clone()
            .oneshot(empty_request("GET", "/healthz"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(empty_request("GET", "/readyz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
