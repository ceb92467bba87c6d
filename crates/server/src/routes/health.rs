use axum::response::Json as ResponseJson;
use serde::Serialize;
use utils::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
}

pub async fn index() -> ResponseJson<ApiResponse<ServiceInfo>> {
    ResponseJson(ApiResponse::success(ServiceInfo {
        name: "Developer Utilization API",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health_check() -> ResponseJson<ApiResponse<&'static str>> {
    ResponseJson(ApiResponse::success("ok"))
}
