use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use shared::{ApiError, ApiResult, DbPool};
use tracing::info;

use crate::models::*;
use crate::schema::*;

/// Storage for the two reference tables.
#[derive(Clone)]
pub struct ReferenceStore {
    pool: DbPool,
}

impl ReferenceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_service(&self, new_service: NewService) -> ApiResult<Service> {
        let mut conn = self.pool.get().await?;
        let service = diesel::insert_into(services::table)
            .values(&new_service)
            .returning(Service::as_returning())
            .get_result(&mut conn)
            .await?;
        info!("Created service {} ({})", service.id, service.name);
        Ok(service)
    }

    pub async fn list_services(&self) -> ApiResult<Vec<Service>> {
        let mut conn = self.pool.get().await?;
        let rows = services::table
            .order(services::id.asc())
            .select(Service::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn get_service(&self, id: i32) -> ApiResult<Service> {
        let mut conn = self.pool.get().await?;
        services::table
            .find(id)
            .select(Service::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ApiError::not_found("Service not found"))
    }

    pub async fn delete_service(&self, id: i32) -> ApiResult<()> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(services::table.find(id))
            .execute(&mut conn)
            .await?;
        if deleted == 0 {
            return Err(ApiError::not_found("Service not found"));
        }
        info!("Deleted service {}", id);
        Ok(())
    }

    pub async fn create_employee(&self, new_employee: NewEmployee) -> ApiResult<Employee> {
        let mut conn = self.pool.get().await?;
        let employee = diesel::insert_into(employees::table)
            .values(&new_employee)
            .returning(Employee::as_returning())
            .get_result(&mut conn)
            .await?;
        info!("Created employee {} ({})", employee.id, employee.full_name);
        Ok(employee)
    }

    pub async fn list_employees(&self) -> ApiResult<Vec<Employee>> {
        let mut conn = self.pool.get().await?;
        let rows = employees::table
            .order(employees::id.asc())
            .select(Employee::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn get_employee(&self, id: i32) -> ApiResult<Employee> {
        let mut conn = self.pool.get().await?;
        employees::table
            .find(id)
            .select(Employee::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ApiError::not_found("Employee not found"))
    }

    pub async fn delete_employee(&self, id: i32) -> ApiResult<()> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(employees::table.find(id))
            .execute(&mut conn)
            .await?;
        if deleted == 0 {
            return Err(ApiError::not_found("Employee not found"));
        }
        info!("Deleted employee {}", id);
        Ok(())
    }
}
