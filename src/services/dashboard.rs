use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Customer;
use crate::services::CustomerService;

pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub total_customers: usize,
    pub vip_count: usize,
    pub new_member_count: usize,
    pub chart_data: BTreeMap<String, i64>,
    pub recent_customers: Vec<Customer>,
}

/// Home page figures for one user. `vip_count` ignores case while
/// `chart_data` keeps the stored spelling of each type.
pub async fn dashboard_for(customers: &CustomerService, user_id: Uuid) -> Result<Dashboard, AppError> {
    let all = customers.list_by_user(user_id).await?;
    let chart_data = customers.chart_summary(user_id).await?;

    let total_customers = all.len();
    let vip_count = all.iter().filter(|c| c.is_vip()).count();
    let recent_customers = all.into_iter().take(RECENT_LIMIT).collect();

    Ok(Dashboard {
        total_customers,
        vip_count,
        new_member_count: total_customers - vip_count,
        chart_data,
        recent_customers,
    })
}
