use serde::{Deserialize, Serialize};

use super::{InventoryItem, Role};

/// `GET /api/stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_patients: i64,
    pub total_doctors: i64,
    pub total_appointments: i64,
    pub monthly_revenue: f64,
    pub low_stock_items: Vec<InventoryItem>,
}

/// `GET /api/dashboard/admin-stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_patients: i64,
    pub total_appointments: i64,
    pub total_revenue: f64,
    pub inventory_count: i64,
}

/// Greeting shown on the `/api/{role}/dashboard` landing pages
pub fn welcome(role: Role, username: &str) -> String {
    match role {
        Role::Doctor => format!("Welcome Dr. {}", username),
        Role::Manager => format!("Welcome Manager {}", username),
        _ => format!("Welcome {}", username),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_keys_are_camel_case() {
        let stats = Stats {
            total_patients: 3,
            total_doctors: 2,
            total_appointments: 5,
            monthly_revenue: 1250.0,
            low_stock_items: vec![],
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalPatients"], 3);
        assert_eq!(json["monthlyRevenue"], 1250.0);
        assert!(json["lowStockItems"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_welcome_per_role() {
        assert_eq!(welcome(Role::Doctor, "mehta"), "Welcome Dr. mehta");
        assert_eq!(welcome(Role::Manager, "lee"), "Welcome Manager lee");
        assert_eq!(welcome(Role::Patient, "asha"), "Welcome asha");
    }
}
