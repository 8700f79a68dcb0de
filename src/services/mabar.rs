use serde_json::json;

use crate::api::{ApiClient, ApiError, FilePart, Method};
use crate::models::{
    Envelope, JoinReceipt, JoinRequest, MabarSession, MabarTab, MabarType, NewMabarSession,
    PageQuery, Paginated,
};

pub async fn list(
    api: &ApiClient,
    query: &PageQuery,
    mabar_type: Option<MabarType>,
) -> Result<Paginated<MabarSession>, ApiError> {
    let mut q = query.to_query();
    if let Some(t) = mabar_type {
        q.push(("type".to_string(), t.as_str().to_string()));
    }
    api.get("/mabar", &q).await
}

pub async fn get(api: &ApiClient, id: i64) -> Result<MabarSession, ApiError> {
    let env: Envelope<MabarSession> = api.get(&format!("/mabar/{id}"), &[]).await?;
    Ok(env.data)
}

pub async fn mine(
    api: &ApiClient,
    tab: MabarTab,
    query: &PageQuery,
) -> Result<Paginated<MabarSession>, ApiError> {
    let mut q = query.to_query();
    q.push(("tab".to_string(), tab.as_str().to_string()));
    api.get("/my-mabar", &q).await
}

pub async fn create(
    api: &ApiClient,
    session: &NewMabarSession,
    cover: Option<FilePart>,
) -> Result<MabarSession, ApiError> {
    let mut fields = vec![
        ("booking_id".to_string(), session.booking_id.to_string()),
        ("title".to_string(), session.title.clone()),
        ("type".to_string(), session.mabar_type.as_str().to_string()),
        ("slots_total".to_string(), session.slots_total.to_string()),
        ("price_per_slot".to_string(), session.price_per_slot.to_string()),
    ];
    if let Some(d) = &session.description {
        fields.push(("description".to_string(), d.clone()));
    }
    if let Some(p) = &session.payment_instructions {
        fields.push(("payment_instructions".to_string(), p.clone()));
    }
    let env: Envelope<MabarSession> = api
        .send_multipart("/mabar", fields, cover.into_iter().collect())
        .await?;
    Ok(env.data)
}

/// Multipart update; the backend expects method spoofing for file uploads.
pub async fn update(
    api: &ApiClient,
    id: i64,
    mut fields: Vec<(String, String)>,
    cover: Option<FilePart>,
) -> Result<MabarSession, ApiError> {
    fields.push(("_method".to_string(), "PUT".to_string()));
    let env: Envelope<MabarSession> = api
        .send_multipart(&format!("/mabar/{id}"), fields, cover.into_iter().collect())
        .await?;
    Ok(env.data)
}

pub async fn cancel(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    api.send_empty(Method::Delete, &format!("/mabar/{id}")).await
}

pub async fn join(api: &ApiClient, id: i64, request: &JoinRequest) -> Result<JoinReceipt, ApiError> {
    let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
    let env: Envelope<JoinReceipt> = api
        .send_json(Method::Post, &format!("/mabar/{id}/join"), body)
        .await?;
    Ok(env.data)
}

pub async fn cancel_participation(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    api.send_empty(Method::Delete, &format!("/mabar/{id}/join"))
        .await
}

pub async fn approve(api: &ApiClient, id: i64, participant_id: i64) -> Result<(), ApiError> {
    api.send_empty(
        Method::Post,
        &format!("/mabar/{id}/participants/{participant_id}/approve"),
    )
    .await
}

/// Rejecting also discards any uploaded payment proof on the backend.
pub async fn reject(api: &ApiClient, id: i64, participant_id: i64) -> Result<(), ApiError> {
    api.send_empty(
        Method::Post,
        &format!("/mabar/{id}/participants/{participant_id}/reject"),
    )
    .await
}

pub async fn remove(api: &ApiClient, id: i64, participant_id: i64) -> Result<(), ApiError> {
    api.send_empty(
        Method::Delete,
        &format!("/mabar/{id}/participants/{participant_id}"),
    )
    .await
}

pub async fn add_guest(api: &ApiClient, id: i64, name: &str) -> Result<(), ApiError> {
    let _: serde_json::Value = api
        .send_json(
            Method::Post,
            &format!("/mabar/{id}/guests"),
            json!({ "name": name }),
        )
        .await?;
    Ok(())
}

pub async fn upload_proof(
    api: &ApiClient,
    id: i64,
    participant_id: i64,
    file: FilePart,
) -> Result<(), ApiError> {
    let _: serde_json::Value = api
        .send_multipart(
            &format!("/mabar/{id}/participants/{participant_id}/payment-proof"),
            Vec::new(),
            vec![file],
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::testing::MockTransport;
    use crate::api::RequestBody;

    #[tokio::test]
    async fn test_mine_adds_tab() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/my-mabar",
            200,
            json!({"data": [], "meta": {"current_page": 1, "per_page": 10, "total": 0, "last_page": 1}}),
        );
        let api = ApiClient::new(mock.clone());

        mine(&api, MabarTab::Created, &PageQuery::default())
            .await
            .unwrap();
        assert_eq!(
            mock.requests()[0].query,
            vec![("tab".to_string(), "created".to_string())]
        );
    }

    #[tokio::test]
    async fn test_update_spoofs_put() {
        let mock = Arc::new(MockTransport::new());
        let api = ApiClient::new(mock.clone());

        let _ = update(&api, 5, vec![("title".to_string(), "Baru".to_string())], None).await;

        let sent = mock.requests();
        assert_eq!(sent[0].method, Method::Post);
        match &sent[0].body {
            RequestBody::Multipart { fields, files } => {
                assert!(fields.contains(&("_method".to_string(), "PUT".to_string())));
                assert!(files.is_empty());
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_receipt() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Post,
            "/mabar/3/join",
            201,
            json!({"data": {"id": 44, "status": "awaiting_approval"}, "message": "ok"}),
        );
        let api = ApiClient::new(mock);

        let receipt = join(
            &api,
            3,
            &JoinRequest {
                name: "Rina".to_string(),
                phone: "0812".to_string(),
                email: "rina@example.com".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(receipt.id, Some(44));
    }

    #[tokio::test]
    async fn test_list_filters_by_type() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/mabar",
            200,
            json!({"data": [], "meta": {"current_page": 1, "per_page": 10, "total": 0, "last_page": 1}}),
        );
        let api = ApiClient::new(mock.clone());

        list(&api, &PageQuery::page(1), Some(MabarType::MiniTournament))
            .await
            .unwrap();
        assert!(mock.requests()[0]
            .query
            .contains(&("type".to_string(), "mini_tournament".to_string())));
    }

    #[tokio::test]
    async fn test_create_omits_empty_optionals() {
        let mock = Arc::new(MockTransport::new());
        let api = ApiClient::new(mock.clone());

        let session = NewMabarSession {
            booking_id: 8,
            title: "Futsal Jumat".to_string(),
            description: None,
            mabar_type: MabarType::OpenPlay,
            slots_total: 10,
            price_per_slot: 25000,
            payment_instructions: Some("Transfer BCA".to_string()),
        };
        let _ = create(&api, &session, None).await;

        match &mock.requests()[0].body {
            RequestBody::Multipart { fields, .. } => {
                assert!(fields.contains(&("type".to_string(), "open_play".to_string())));
                assert!(fields.iter().all(|(k, _)| k != "description"));
                assert!(fields.contains(&(
                    "payment_instructions".to_string(),
                    "Transfer BCA".to_string()
                )));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }
}
