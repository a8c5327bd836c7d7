//! Payment rows

use shared::models::Payment;
use sqlx::SqliteExecutor;

/// Insert a payment. A second payment for the same order fails with a
/// unique-constraint violation on `payments.order_id`.
pub async fn insert_payment<'e, E: SqliteExecutor<'e>>(
    executor: E,
    payment: &Payment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, tenant_id, order_id, payment_method, subtotal,
            tax_rate, tax_amount, service_charge_rate, service_charge_amount,
            discount_percent, discount_amount, amount, paid_at, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payment.id)
    .bind(&payment.tenant_id)
    .bind(payment.order_id)
    .bind(payment.payment_method)
    .bind(payment.subtotal)
    .bind(payment.tax_rate)
    .bind(payment.tax_amount)
    .bind(payment.service_charge_rate)
    .bind(payment.service_charge_amount)
    .bind(payment.discount_percent)
    .bind(payment.discount_amount)
    .bind(payment.amount)
    .bind(payment.paid_at)
    .bind(payment.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_payment<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, tenant_id, order_id, payment_method, subtotal,
               tax_rate, tax_amount, service_charge_rate, service_charge_amount,
               discount_percent, discount_amount, amount, paid_at, created_at
        FROM payments
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_payment_by_order<'e, E: SqliteExecutor<'e>>(
    executor: E,
    order_id: i64,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, tenant_id, order_id, payment_method, subtotal,
               tax_rate, tax_amount, service_charge_rate, service_charge_amount,
               discount_percent, discount_amount, amount, paid_at, created_at
        FROM payments
        WHERE order_id = ?
        "#,
    )
    .bind(order_id)
    .fetch_optional(executor)
    .await
}

pub async fn exists_for_order<'e, E: SqliteExecutor<'e>>(
    executor: E,
    order_id: i64,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM payments WHERE order_id = ? LIMIT 1")
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

/// Stamp `paid_at` on an unconfirmed payment. Returns 0 when it was already confirmed.
pub async fn mark_paid<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    paid_at: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE payments SET paid_at = ? WHERE id = ? AND paid_at IS NULL")
        .bind(paid_at)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
