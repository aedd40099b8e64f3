use super::Database;
use crate::error::ApiResult;
use crate::models::{AdminStats, Stats};

impl Database {
    /// Headline counts; revenue covers records created this calendar month (UTC)
    pub async fn stats(&self) -> ApiResult<Stats> {
        let (total_patients, total_doctors, total_appointments, monthly_revenue) =
            sqlx::query_as::<_, (i64, i64, i64, f64)>(
                "SELECT
                     (SELECT COUNT(*) FROM patients WHERE is_active),
                     (SELECT COUNT(*) FROM doctors WHERE is_active),
                     (SELECT COUNT(*) FROM appointments WHERE is_active),
                     (SELECT COALESCE(SUM(paid_amount), 0)::DOUBLE PRECISION
                      FROM billing_records
                      WHERE is_active
                        AND created_at >= timezone('UTC', date_trunc('month', timezone('UTC', NOW()))))",
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(Stats {
            total_patients,
            total_doctors,
            total_appointments,
            monthly_revenue,
            low_stock_items: self.low_stock_items().await?,
        })
    }

    pub async fn admin_stats(&self) -> ApiResult<AdminStats> {
        let (total_patients, total_appointments, total_revenue, inventory_count) =
            sqlx::query_as::<_, (i64, i64, f64, i64)>(
                "SELECT
                     (SELECT COUNT(*) FROM patients WHERE is_active),
                     (SELECT COUNT(*) FROM appointments WHERE is_active),
                     (SELECT COALESCE(SUM(total_amount), 0)::DOUBLE PRECISION
                      FROM billing_records WHERE is_active),
                     (SELECT COUNT(*) FROM inventory_items WHERE is_active)",
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(AdminStats {
            total_patients,
            total_appointments,
            total_revenue,
            inventory_count,
        })
    }
}
