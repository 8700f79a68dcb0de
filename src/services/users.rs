use crate::api::{ApiClient, ApiError, Method};
use crate::models::{Envelope, PageQuery, Paginated, ProfileUpdate, Role, User};

pub async fn admin_list(
    api: &ApiClient,
    query: &PageQuery,
    role: Option<Role>,
) -> Result<Paginated<User>, ApiError> {
    let mut q = query.to_query();
    if let Some(role) = role {
        q.push(("role".to_string(), role.as_str().to_string()));
    }
    api.get("/admin/users", &q).await
}

pub async fn update_profile(api: &ApiClient, update: &ProfileUpdate) -> Result<User, ApiError> {
    let body = serde_json::to_value(update).map_err(|e| ApiError::Decode(e.to_string()))?;
    let env: Envelope<User> = api.send_json(Method::Put, "/profile", body).await?;
    Ok(env.data)
}

pub async fn delete(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    api.send_empty(Method::Delete, &format!("/admin/users/{id}"))
        .await
}
