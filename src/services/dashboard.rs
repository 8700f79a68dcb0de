use crate::api::{ApiClient, ApiError};
use crate::models::{DashboardStats, Envelope};

pub async fn stats(api: &ApiClient) -> Result<DashboardStats, ApiError> {
    let env: Envelope<DashboardStats> = api.get("/admin/dashboard", &[]).await?;
    Ok(env.data)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::testing::MockTransport;
    use crate::api::Method;

    #[tokio::test]
    async fn test_stats() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/admin/dashboard",
            200,
            json!({"data": {
                "total_users": 12,
                "total_fields": 3,
                "total_bookings": 40,
                "total_revenue": 4000000,
                "bookings_by_status": {"active": 30, "cancelled": 10}
            }}),
        );
        let api = ApiClient::new(mock);

        let s = stats(&api).await.unwrap();
        assert_eq!(s.total_users, 12);
        assert_eq!(s.active_mabar, 0);
        assert_eq!(s.bookings_by_status.get("active"), Some(&30));
    }
}
