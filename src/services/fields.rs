use chrono::NaiveDate;

use crate::api::{ApiClient, ApiError, Method};
use crate::models::{Envelope, Field, FieldInput, PageQuery, Paginated};

pub async fn list(api: &ApiClient, query: &PageQuery) -> Result<Paginated<Field>, ApiError> {
    api.get("/fields", &query.to_query()).await
}

pub async fn get(api: &ApiClient, id: i64) -> Result<Field, ApiError> {
    let env: Envelope<Field> = api.get(&format!("/fields/{id}"), &[]).await?;
    Ok(env.data)
}

/// Slots already taken on `date`, as "HH:MM" strings.
pub async fn booked_slots(api: &ApiClient, id: i64, date: NaiveDate) -> Result<Vec<String>, ApiError> {
    let query = [("date".to_string(), date.format("%Y-%m-%d").to_string())];
    let env: Envelope<Vec<String>> = api
        .get(&format!("/fields/{id}/booked-slots"), &query)
        .await?;
    Ok(env.data)
}

pub async fn create(api: &ApiClient, input: &FieldInput) -> Result<Field, ApiError> {
    let body = serde_json::to_value(input).map_err(|e| ApiError::Decode(e.to_string()))?;
    let env: Envelope<Field> = api.send_json(Method::Post, "/admin/fields", body).await?;
    Ok(env.data)
}

pub async fn update(api: &ApiClient, id: i64, input: &FieldInput) -> Result<Field, ApiError> {
    let body = serde_json::to_value(input).map_err(|e| ApiError::Decode(e.to_string()))?;
    let env: Envelope<Field> = api
        .send_json(Method::Put, &format!("/admin/fields/{id}"), body)
        .await?;
    Ok(env.data)
}

pub async fn delete(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    api.send_empty(Method::Delete, &format!("/admin/fields/{id}")).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::testing::MockTransport;

    #[tokio::test]
    async fn test_booked_slots_passes_date() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/fields/4/booked-slots",
            200,
            json!({"data": ["08:00", "09:00"]}),
        );
        let api = ApiClient::new(mock.clone());

        let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let slots = booked_slots(&api, 4, date).await.unwrap();
        assert_eq!(slots, vec!["08:00", "09:00"]);
        assert_eq!(
            mock.requests()[0].query,
            vec![("date".to_string(), "2025-06-16".to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let mock = Arc::new(MockTransport::new());
        let api = ApiClient::new(mock);

        let err = delete(&api, 99).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
