//! Per-tenant settlement rules and discount tiers

use shared::models::{DiscountTier, SettlementRules};
use sqlx::SqliteConnection;

/// Load a tenant's rules. `None` when the tenant never configured any.
pub async fn find_rules(
    conn: &mut SqliteConnection,
    tenant_id: &str,
) -> Result<Option<SettlementRules>, sqlx::Error> {
    let row: Option<(f64, f64)> = sqlx::query_as(
        "SELECT tax_rate, service_charge_rate FROM settlement_rules WHERE tenant_id = ?",
    )
    .bind(tenant_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((tax_rate, service_charge_rate)) = row else {
        return Ok(None);
    };

    let tiers = list_tiers(conn, tenant_id).await?;
    Ok(Some(
        SettlementRules::new(tax_rate, service_charge_rate).with_tiers(tiers),
    ))
}

pub async fn list_tiers(
    conn: &mut SqliteConnection,
    tenant_id: &str,
) -> Result<Vec<DiscountTier>, sqlx::Error> {
    sqlx::query_as::<_, DiscountTier>(
        "SELECT min_order, percent FROM discount_tiers WHERE tenant_id = ? ORDER BY min_order",
    )
    .bind(tenant_id)
    .fetch_all(&mut *conn)
    .await
}

/// Replace a tenant's rules and tiers. Run inside a transaction.
pub async fn replace_rules(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    rules: &SettlementRules,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO settlement_rules (tenant_id, tax_rate, service_charge_rate, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (tenant_id)
        DO UPDATE SET
            tax_rate = excluded.tax_rate,
            service_charge_rate = excluded.service_charge_rate,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(tenant_id)
    .bind(rules.tax_rate)
    .bind(rules.service_charge_rate)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM discount_tiers WHERE tenant_id = ?")
        .bind(tenant_id)
        .execute(&mut *conn)
        .await?;

    for tier in &rules.discount_tiers {
        sqlx::query("INSERT INTO discount_tiers (tenant_id, min_order, percent) VALUES (?, ?, ?)")
            .bind(tenant_id)
            .bind(tier.min_order)
            .bind(tier.percent)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
