use axum::Json;
use serde::Serialize;

/// `{"success": true, ...body}` as every JSON route answers.
#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

pub fn ok<T: Serialize>(body: T) -> Json<ApiOk<T>> {
    Json(ApiOk {
        success: true,
        body,
    })
}

#[derive(Debug, Serialize)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Deleted {
        deleted_count: u64,
    }

    #[test]
    fn body_fields_sit_next_to_success() {
        let Json(envelope) = ok(Deleted { deleted_count: 3 });
        let value = serde_json::to_value(envelope).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "deletedCount": 3}));

        let Json(envelope) = ok(Empty {});
        let value = serde_json::to_value(envelope).unwrap();
        assert_eq!(value, serde_json::json!({"success": true}));
    }
}
