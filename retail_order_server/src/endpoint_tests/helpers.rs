use actix_web::{http::StatusCode, test, web::ServiceConfig, App};
use serde::Serialize;

use crate::auth::{USER_ID_HEADER, USER_ROLES_HEADER};

/// Builds an app from `configure`, fires the request, and returns status plus body.
pub async fn send_request<F>(req: test::TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let _ = env_logger::try_init();
    let app = test::init_service(App::new().configure(configure)).await;
    // Middleware (ACL, signature) can short-circuit by returning `Err`, which the actix
    // runtime renders into a response before it reaches the socket. `call_service` panics
    // on that `Err`, so use `try_call_service` and render the error the way production does.
    match test::try_call_service(&app, req.to_request()).await {
        Ok(resp) => {
            let status = resp.status();
            let body = test::read_body(resp).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap_or_default();
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

pub fn get(path: &str) -> test::TestRequest {
    test::TestRequest::get().uri(path)
}

pub fn post_json<T: Serialize>(path: &str, body: &T) -> test::TestRequest {
    test::TestRequest::post().uri(path).set_json(body)
}

pub fn put_json<T: Serialize>(path: &str, body: &T) -> test::TestRequest {
    test::TestRequest::put().uri(path).set_json(body)
}

/// Stamps the identity headers the way the upstream auth proxy would for a plain user.
pub fn as_user(req: test::TestRequest, user_id: &str) -> test::TestRequest {
    req.insert_header((USER_ID_HEADER, user_id)).insert_header((USER_ROLES_HEADER, "user"))
}

pub fn as_admin(req: test::TestRequest, user_id: &str) -> test::TestRequest {
    req.insert_header((USER_ID_HEADER, user_id)).insert_header((USER_ROLES_HEADER, "user,admin"))
}
