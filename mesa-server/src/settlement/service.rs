//! Invoice settlement engine
//!
//! Creates the single Payment that closes an order and moves the order to
//! `Paid`, both in one write transaction. Concurrent settlements of one order
//! queue on the write lock, so the later one sees `Paid`; a UNIQUE index on
//! `payments.order_id` backs "one payment per order" in the store itself.

use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{InvoiceDetails, OrderStatus, Payment, PaymentMethod, SettlementRules};
use shared::realtime::RealtimeEvent;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::Validate;

use super::calculator;
use crate::db::{begin_write, order_items, orders, payments, settlement_rules};
use crate::error::{ServiceResult, is_unique_violation};
use crate::live::EventPublisher;
use crate::orders::owned_order;

/// `POST /payments`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoice {
    pub order_id: i64,
    pub payment_method: PaymentMethod,
}

#[derive(Clone)]
pub struct SettlementService {
    pool: SqlitePool,
    publisher: Arc<dyn EventPublisher>,
    /// Applied to tenants that never stored their own rules
    defaults: SettlementRules,
}

impl SettlementService {
    pub fn new(
        pool: SqlitePool,
        publisher: Arc<dyn EventPublisher>,
        defaults: SettlementRules,
    ) -> Self {
        Self {
            pool,
            publisher,
            defaults,
        }
    }

    /// Settle an order: compute the invoice, store the payment, mark the order paid
    pub async fn create_invoice(
        &self,
        tenant_id: &str,
        input: CreateInvoice,
    ) -> ServiceResult<Payment> {
        let order_id = input.order_id;
        let mut tx = begin_write(&self.pool).await?;

        // 1. Order must be ours and still open
        let order = owned_order(
            orders::find_order(&mut *tx, order_id).await?,
            tenant_id,
            order_id,
        )?;
        match order.status {
            OrderStatus::Paid => {
                return Err(AppError::new(ErrorCode::PaymentAlreadyExists)
                    .with_detail("order_id", order_id)
                    .into());
            }
            OrderStatus::Cancelled => {
                return Err(AppError::new(ErrorCode::OrderAlreadyCancelled)
                    .with_detail("order_id", order_id)
                    .into());
            }
            _ => {}
        }

        // 2. Billable items
        let items = order_items::list_items_by_order(&mut tx, order_id).await?;
        if items.iter().all(|i| i.is_cancelled()) {
            return Err(AppError::new(ErrorCode::OrderEmpty)
                .with_detail("order_id", order_id)
                .into());
        }

        // 3. Compute
        let rules = settlement_rules::find_rules(&mut tx, tenant_id)
            .await?
            .unwrap_or_else(|| self.defaults.clone());
        let totals = calculator::compute_totals(calculator::subtotal(&items)?, &rules)?;

        // 4. Persist payment and close the order
        let now = now_millis();
        let payment = Payment {
            id: snowflake_id(),
            tenant_id: tenant_id.to_string(),
            order_id,
            payment_method: input.payment_method,
            subtotal: totals.subtotal,
            tax_rate: totals.tax_rate,
            tax_amount: totals.tax_amount,
            service_charge_rate: totals.service_charge_rate,
            service_charge_amount: totals.service_charge_amount,
            discount_percent: totals.discount_percent,
            discount_amount: totals.discount_amount,
            amount: totals.amount,
            paid_at: (!input.payment_method.is_deferred()).then_some(now),
            created_at: now,
        };

        if let Err(e) = payments::insert_payment(&mut *tx, &payment).await {
            if is_unique_violation(&e) {
                tracing::warn!(tenant_id = %tenant_id, order_id, "Duplicate payment rejected by store");
                return Err(AppError::new(ErrorCode::PaymentAlreadyExists)
                    .with_detail("order_id", order_id)
                    .into());
            }
            return Err(e.into());
        }

        if orders::update_status_if(&mut *tx, order_id, order.status, OrderStatus::Paid, now).await?
            == 0
        {
            return Err(AppError::with_message(
                ErrorCode::InvalidOrderTransition,
                "order status changed concurrently",
            )
            .with_detail("order_id", order_id)
            .into());
        }
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            order_id,
            payment_id = payment.id,
            method = ?payment.payment_method,
            subtotal = payment.subtotal,
            amount = payment.amount,
            "Invoice created"
        );

        // 5. Fan-out
        let from = order.status;
        let mut paid = order;
        paid.status = OrderStatus::Paid;
        paid.updated_at = now;
        let total_amount = paid.total_amount;
        self.publisher
            .publish(tenant_id, RealtimeEvent::OrderUpdated { order: paid });
        self.publisher.publish(
            tenant_id,
            RealtimeEvent::AdminOrderStatusChanged {
                order_id,
                from,
                to: OrderStatus::Paid,
                total_amount,
            },
        );

        Ok(payment)
    }

    /// Payment with its order and billed items
    pub async fn get_invoice_details(
        &self,
        tenant_id: &str,
        payment_id: i64,
    ) -> ServiceResult<InvoiceDetails> {
        let mut conn = self.pool.acquire().await?;
        let payment = owned_payment(
            payments::find_payment(&mut *conn, payment_id).await?,
            tenant_id,
        )?;
        self.invoice_details(&mut conn, payment).await
    }

    /// Invoice of an order; `PaymentNotFound` when the order is unsettled
    pub async fn get_invoice_by_order_id(
        &self,
        tenant_id: &str,
        order_id: i64,
    ) -> ServiceResult<InvoiceDetails> {
        let mut conn = self.pool.acquire().await?;
        owned_order(
            orders::find_order(&mut *conn, order_id).await?,
            tenant_id,
            order_id,
        )?;
        let payment = payments::find_payment_by_order(&mut *conn, order_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::PaymentNotFound).with_detail("order_id", order_id)
            })?;
        self.invoice_details(&mut conn, payment).await
    }

    /// Stamp `paid_at` on a deferred payment. Rejects double confirmation.
    pub async fn confirm_payment(&self, tenant_id: &str, payment_id: i64) -> ServiceResult<Payment> {
        let mut payment = owned_payment(
            payments::find_payment(&self.pool, payment_id).await?,
            tenant_id,
        )?;
        if payment.is_confirmed() {
            return Err(already_confirmed(payment_id).into());
        }

        let now = now_millis();
        if payments::mark_paid(&self.pool, payment_id, now).await? == 0 {
            return Err(already_confirmed(payment_id).into());
        }
        payment.paid_at = Some(now);

        tracing::info!(
            tenant_id = %tenant_id,
            payment_id,
            order_id = payment.order_id,
            "Payment confirmed"
        );
        Ok(payment)
    }

    /// Tenant's settlement rules, or the configured defaults
    pub async fn get_rules(&self, tenant_id: &str) -> ServiceResult<SettlementRules> {
        let mut conn = self.pool.acquire().await?;
        Ok(settlement_rules::find_rules(&mut conn, tenant_id)
            .await?
            .unwrap_or_else(|| self.defaults.clone()))
    }

    /// Replace a tenant's settlement rules
    pub async fn put_rules(
        &self,
        tenant_id: &str,
        mut rules: SettlementRules,
    ) -> ServiceResult<SettlementRules> {
        calculator::validate_rules(&rules)?;
        rules.discount_tiers.sort_by_key(|t| t.min_order);

        let mut tx = begin_write(&self.pool).await?;
        settlement_rules::replace_rules(&mut tx, tenant_id, &rules, now_millis()).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            tax_rate = rules.tax_rate,
            service_charge_rate = rules.service_charge_rate,
            tiers = rules.discount_tiers.len(),
            "Settlement rules updated"
        );
        Ok(rules)
    }

    async fn invoice_details(
        &self,
        conn: &mut sqlx::SqliteConnection,
        payment: Payment,
    ) -> ServiceResult<InvoiceDetails> {
        let order = orders::find_order(&mut *conn, payment.order_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", payment.order_id)
            })?;
        let items = order_items::list_items_by_order(conn, payment.order_id)
            .await?
            .into_iter()
            .filter(|i| !i.is_cancelled())
            .collect();
        Ok(InvoiceDetails {
            payment,
            order,
            items,
        })
    }
}

fn owned_payment(payment: Option<Payment>, tenant_id: &str) -> Result<Payment, AppError> {
    match payment {
        None => Err(AppError::new(ErrorCode::PaymentNotFound)),
        Some(p) if p.tenant_id != tenant_id => {
            tracing::warn!(
                target: "security",
                tenant_id = %tenant_id,
                payment_id = p.id,
                "Cross-tenant payment access rejected"
            );
            Err(AppError::access_denied())
        }
        Some(p) => Ok(p),
    }
}

fn already_confirmed(payment_id: i64) -> AppError {
    AppError::new(ErrorCode::PaymentAlreadyConfirmed).with_detail("payment_id", payment_id)
}
