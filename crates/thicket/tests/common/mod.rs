#![allow(dead_code)]

use thicket::{Method, Request, Response, Router};

pub const UUID: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";
pub const IP: &str = r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$";

/// A router with `:uuid` and `:ip` patterns registered.
pub fn router() -> Router {
    let mut router = Router::new();
    router.add_regex(":uuid", UUID).unwrap();
    router.add_regex(":ip", IP).unwrap();
    router
}

/// A deterministic, well-formed UUID for index `i`.
pub fn uuid(i: usize) -> String {
    format!("{i:08X}-4A90-46C8-948D-{i:012X}")
}

pub fn method(name: &str) -> Method {
    Method::from_str(name).unwrap_or_else(|| panic!("unknown method {name}"))
}

pub async fn ok(_req: Request) -> Response {
    Response::ok()
}

pub fn text(body: &'static str) -> impl Fn(Request) -> std::future::Ready<Response> + Send + Sync {
    move |_req| std::future::ready(Response::text(body))
}

pub async fn send(router: &Router, method_name: &str, path: &str) -> Response {
    router
        .handle_request(Request::new(method(method_name), path))
        .await
}

pub async fn status(router: &Router, method_name: &str, path: &str) -> u16 {
    send(router, method_name, path).await.status
}
