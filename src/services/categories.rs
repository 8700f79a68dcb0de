use crate::api::{ApiClient, ApiError, Method};
use crate::models::{CategoryInput, Envelope, SportCategory};

pub async fn list(api: &ApiClient) -> Result<Vec<SportCategory>, ApiError> {
    let env: Envelope<Vec<SportCategory>> = api.get("/categories", &[]).await?;
    Ok(env.data)
}

pub async fn create(api: &ApiClient, input: &CategoryInput) -> Result<SportCategory, ApiError> {
    let body = serde_json::to_value(input).map_err(|e| ApiError::Decode(e.to_string()))?;
    let env: Envelope<SportCategory> = api
        .send_json(Method::Post, "/admin/categories", body)
        .await?;
    Ok(env.data)
}

pub async fn update(
    api: &ApiClient,
    id: i64,
    input: &CategoryInput,
) -> Result<SportCategory, ApiError> {
    let body = serde_json::to_value(input).map_err(|e| ApiError::Decode(e.to_string()))?;
    let env: Envelope<SportCategory> = api
        .send_json(Method::Put, &format!("/admin/categories/{id}"), body)
        .await?;
    Ok(env.data)
}

pub async fn delete(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    api.send_empty(Method::Delete, &format!("/admin/categories/{id}"))
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::testing::MockTransport;

    #[tokio::test]
    async fn test_list_categories() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/categories",
            200,
            json!({"data": [{"id": 1, "name": "Futsal", "icon": "futsal.svg"}, {"id": 2, "name": "Badminton"}]}),
        );
        let api = ApiClient::new(mock);

        let cats = list(&api).await.unwrap();
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[1].icon, None);
    }
}
