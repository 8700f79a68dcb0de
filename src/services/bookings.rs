use crate::api::{ApiClient, ApiError, Method};
use crate::models::{Booking, BookingStatusInfo, Envelope, NewBooking, PageQuery, Paginated};

pub async fn find_by_invoice(api: &ApiClient, invoice: &str) -> Result<Booking, ApiError> {
    let invoice = urlencoding::encode(invoice);
    let env: Envelope<Booking> = api.get(&format!("/bookings/invoice/{invoice}"), &[]).await?;
    Ok(env.data)
}

pub async fn status_by_invoice(
    api: &ApiClient,
    invoice: &str,
) -> Result<BookingStatusInfo, ApiError> {
    let invoice = urlencoding::encode(invoice);
    let env: Envelope<BookingStatusInfo> = api
        .get(&format!("/bookings/invoice/{invoice}/status"), &[])
        .await?;
    Ok(env.data)
}

pub async fn my_bookings(api: &ApiClient, query: &PageQuery) -> Result<Paginated<Booking>, ApiError> {
    api.get("/bookings", &query.to_query()).await
}

pub async fn admin_list(api: &ApiClient, query: &PageQuery) -> Result<Paginated<Booking>, ApiError> {
    api.get("/admin/bookings", &query.to_query()).await
}

pub async fn create(api: &ApiClient, booking: &NewBooking) -> Result<Booking, ApiError> {
    let body = serde_json::to_value(booking).map_err(|e| ApiError::Decode(e.to_string()))?;
    let env: Envelope<Booking> = api.send_json(Method::Post, "/bookings", body).await?;
    Ok(env.data)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::testing::MockTransport;
    use crate::models::BookingStatus;

    fn booking_json(invoice: &str) -> serde_json::Value {
        json!({
            "id": 1,
            "invoice": invoice,
            "status": "waiting_payment",
            "booking_date": "2025-06-16",
            "time_slots": ["08:00"],
            "price": 100000,
            "created_at": "2025-06-16T01:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_find_by_invoice_unwraps_envelope() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/bookings/invoice/INV-001",
            200,
            json!({ "data": booking_json("INV-001") }),
        );
        let api = ApiClient::new(mock);

        let booking = find_by_invoice(&api, "INV-001").await.unwrap();
        assert_eq!(booking.invoice, "INV-001");
        assert_eq!(booking.status, BookingStatus::WaitingPayment);
    }

    #[tokio::test]
    async fn test_admin_list_sends_filters() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/admin/bookings",
            200,
            json!({
                "data": [booking_json("INV-1"), booking_json("INV-2")],
                "meta": {"current_page": 1, "per_page": 2, "total": 2, "last_page": 1}
            }),
        );
        let api = ApiClient::new(mock.clone());

        let page = admin_list(&api, &PageQuery::page(1).filter("status", "active"))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert!(!page.has_next());

        let sent = mock.requests();
        assert!(sent[0]
            .query
            .contains(&("status".to_string(), "active".to_string())));
    }

    #[tokio::test]
    async fn test_create_posts_json() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Post, "/bookings", 201, json!({ "data": booking_json("INV-9") }));
        let api = ApiClient::new(mock.clone());

        let created = create(
            &api,
            &NewBooking {
                field_id: 3,
                booking_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
                time_slots: vec!["08:00".to_string()],
                customer_name: None,
                customer_phone: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(created.invoice, "INV-9");

        match &mock.requests()[0].body {
            crate::api::RequestBody::Json(v) => {
                assert_eq!(v["field_id"], 3);
                assert!(v.get("customer_name").is_none());
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_status_by_invoice() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/bookings/invoice/INV-7/status",
            200,
            json!({"data": {"invoice": "INV-7", "status": "waiting_payment", "remaining_seconds": 120}}),
        );
        let api = ApiClient::new(mock);

        let info = status_by_invoice(&api, "INV-7").await.unwrap();
        assert_eq!(info.status, BookingStatus::WaitingPayment);
        assert_eq!(info.remaining_seconds, Some(120));
    }

    #[tokio::test]
    async fn test_my_bookings_sends_page() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/bookings",
            200,
            json!({
                "data": [booking_json("INV-3")],
                "meta": {"current_page": 2, "per_page": 1, "total": 3, "last_page": 3}
            }),
        );
        let api = ApiClient::new(mock.clone());

        let page = my_bookings(&api, &PageQuery::page(2)).await.unwrap();
        assert_eq!(page.data[0].invoice, "INV-3");
        assert!(page.has_next());
        assert!(mock.requests()[0]
            .query
            .contains(&("page".to_string(), "2".to_string())));
    }

    #[tokio::test]
    async fn test_invoice_is_one_path_segment() {
        let mock = Arc::new(MockTransport::new());
        let api = ApiClient::new(mock.clone());

        let _ = find_by_invoice(&api, "../../admin/users").await;
        let _ = status_by_invoice(&api, "INV 1/x").await;

        let sent = mock.requests();
        assert_eq!(sent[0].path, "/bookings/invoice/..%2F..%2Fadmin%2Fusers");
        assert_eq!(sent[1].path, "/bookings/invoice/INV%201%2Fx/status");
    }
}
