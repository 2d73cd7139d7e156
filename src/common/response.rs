use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Envelope de sucesso: `{ "success": true, ...payload }`.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T: Serialize> {
    #[serde(skip)]
    status: StatusCode,
    success: bool,
    #[serde(flatten)]
    payload: T,
}

impl<T: Serialize> ActionResponse<T> {
    pub fn ok(payload: T) -> Self {
        Self { status: StatusCode::OK, success: true, payload }
    }

    pub fn created(payload: T) -> Self {
        Self { status: StatusCode::CREATED, success: true, payload }
    }
}

impl ActionResponse<NoPayload> {
    pub fn done() -> Self {
        Self::ok(NoPayload {})
    }
}

impl<T: Serialize> IntoResponse for ActionResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

// Ações que só respondem `{ "success": true }`
#[derive(Debug, Serialize, ToSchema)]
pub struct NoPayload {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Created {
        complaint_id: u32,
    }

    #[test]
    fn payload_is_flattened_next_to_success() {
        let body = serde_json::to_value(ActionResponse::created(Created { complaint_id: 7 })).unwrap();
        assert_eq!(body, json!({ "success": true, "complaintId": 7 }));

        let body = serde_json::to_value(ActionResponse::done()).unwrap();
        assert_eq!(body, json!({ "success": true }));
    }
}
