use axum::{
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::Value;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::mcp::TasteMapServer;
use crate::middleware::RequestId;
use crate::tools::ToolName;

pub(super) async fn list_tools(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: TasteMapServer::catalogue(),
        meta: ResponseMeta::new(req_id.0),
    })
}

/// `POST /api/v1/tools/{name}` with the tool's arguments as the JSON body.
/// An empty body means "all defaults".
pub(super) async fn call_tool(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let Some(tool) = ToolName::parse(&name) else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("unknown tool \"{name}\""),
        ));
    };

    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                format!("request body is not valid JSON: {e}"),
            )
        })?
    };

    match state.tools.call(tool, arguments).await {
        Ok(data) => Ok(Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        })),
        Err(err) => {
            tracing::warn!(
                tool = tool.as_str(),
                code = err.code(),
                error = %err,
                request_id = %req_id.0,
                "tool call failed"
            );
            Err(ApiError::from_tool(req_id.0, &err))
        }
    }
}
