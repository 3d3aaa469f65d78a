use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use shared::{ApiError, ApiResult, DbPool};
use tracing::info;

use crate::models::*;
use crate::schema::*;

/// Reads and writes repair orders together with their service links.
#[derive(Clone)]
pub struct RepairOrderStore {
    pool: DbPool,
}

impl RepairOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Inserts the order and one link row per service id in a single
    /// transaction.
    pub async fn create(
        &self,
        new_order: NewRepairOrder,
        service_ids: Vec<i32>,
    ) -> ApiResult<RepairOrderAggregate> {
        let mut conn = self.pool.get().await?;

        let aggregate = conn
            .transaction::<_, ApiError, _>(|conn| {
                Box::pin(async move {
                    let order = diesel::insert_into(repair_orders::table)
                        .values(&new_order)
                        .returning(RepairOrder::as_returning())
                        .get_result(conn)
                        .await?;

                    let links: Vec<NewRepairOrderService> = service_ids
                        .into_iter()
                        .map(|service_id| NewRepairOrderService {
                            service_id,
                            repair_order_id: order.id,
                        })
                        .collect();

                    let services = if links.is_empty() {
                        Vec::new()
                    } else {
                        diesel::insert_into(repair_order_services::table)
                            .values(&links)
                            .returning(RepairOrderService::as_returning())
                            .get_results(conn)
                            .await?
                    };

                    Ok(RepairOrderAggregate { order, services })
                })
            })
            .await?;

        info!(
            "Created repair order {} with {} service(s)",
            aggregate.order.id,
            aggregate.services.len()
        );
        Ok(aggregate)
    }

    pub async fn list(&self) -> ApiResult<Vec<RepairOrderAggregate>> {
        let mut conn = self.pool.get().await?;

        let orders = repair_orders::table
            .order(repair_orders::id.asc())
            .select(RepairOrder::as_select())
            .load(&mut conn)
            .await?;

        let links = RepairOrderService::belonging_to(&orders)
            .order(repair_order_services::id.asc())
            .select(RepairOrderService::as_select())
            .load(&mut conn)
            .await?;

        let aggregates = links
            .grouped_by(&orders)
            .into_iter()
            .zip(orders)
            .map(|(services, order)| RepairOrderAggregate { order, services })
            .collect();

        Ok(aggregates)
    }

    pub async fn get(&self, id: i32) -> ApiResult<RepairOrderAggregate> {
        let mut conn = self.pool.get().await?;

        let order = repair_orders::table
            .find(id)
            .select(RepairOrder::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .ok_or_else(repair_order_not_found)?;

        load_services(&mut conn, order).await
    }

    /// Overwrites the fields present in `changes` and returns the refreshed
    /// aggregate.
    pub async fn update(&self, id: i32, changes: RepairOrderChanges) -> ApiResult<RepairOrderAggregate> {
        if changes.is_empty() {
            return self.get(id).await;
        }

        let mut conn = self.pool.get().await?;

        let order = diesel::update(repair_orders::table.find(id))
            .set(&changes)
            .returning(RepairOrder::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(repair_order_not_found)?;

        info!("Updated repair order {} (status: {})", order.id, order.status);
        load_services(&mut conn, order).await
    }

    pub async fn delete(&self, id: i32) -> ApiResult<()> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, ApiError, _>(|conn| {
            Box::pin(async move {
                diesel::delete(
                    repair_order_services::table.filter(repair_order_services::repair_order_id.eq(id)),
                )
                .execute(conn)
                .await?;

                let deleted = diesel::delete(repair_orders::table.find(id))
                    .execute(conn)
                    .await?;
                if deleted == 0 {
                    return Err(repair_order_not_found());
                }
                Ok(())
            })
        })
        .await?;

        info!("Deleted repair order {}", id);
        Ok(())
    }
}

async fn load_services(
    conn: &mut AsyncPgConnection,
    order: RepairOrder,
) -> ApiResult<RepairOrderAggregate> {
    let services = RepairOrderService::belonging_to(&order)
        .order(repair_order_services::id.asc())
        .select(RepairOrderService::as_select())
        .load(conn)
        .await?;
    Ok(RepairOrderAggregate { order, services })
}

fn repair_order_not_found() -> ApiError {
    ApiError::not_found("Repair order not found")
}
