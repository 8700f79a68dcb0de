use serde_json::json;

use crate::api::{ApiClient, ApiError, Method};
use crate::models::{Envelope, User};

pub async fn me(api: &ApiClient) -> Result<User, ApiError> {
    let env: Envelope<User> = api.get("/me", &[]).await?;
    Ok(env.data)
}

pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<User, ApiError> {
    let env: Envelope<User> = api
        .send_json(
            Method::Post,
            "/login",
            json!({ "email": email, "password": password }),
        )
        .await?;
    Ok(env.data)
}

pub async fn register(
    api: &ApiClient,
    name: &str,
    email: &str,
    phone: &str,
    password: &str,
) -> Result<User, ApiError> {
    let env: Envelope<User> = api
        .send_json(
            Method::Post,
            "/register",
            json!({ "name": name, "email": email, "phone": phone, "password": password }),
        )
        .await?;
    Ok(env.data)
}

pub async fn logout(api: &ApiClient) -> Result<(), ApiError> {
    api.send_empty(Method::Post, "/logout").await
}
