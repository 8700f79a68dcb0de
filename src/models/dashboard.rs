use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_fields: u64,
    pub total_bookings: u64,
    pub total_revenue: i64,
    #[serde(default)]
    pub active_mabar: u64,
    #[serde(default)]
    pub bookings_by_status: BTreeMap<String, u64>,
}
