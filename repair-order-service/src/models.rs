use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use shared::ApiError;

/// Status every repair order starts in. Later values are free text.
pub const INITIAL_STATUS: &str = "New";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::repair_orders)]
pub struct RepairOrder {
    pub id: i32,
    pub client_name: String,
    pub client_phone: String,
    pub car_make: String,
    pub car_model: String,
    pub car_plate: String,
    pub employee_id: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::repair_orders)]
pub struct NewRepairOrder {
    pub client_name: String,
    pub client_phone: String,
    pub car_make: String,
    pub car_model: String,
    pub car_plate: String,
    pub employee_id: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
}

/// Join row linking one repair order to one reference-data service id.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(RepairOrder))]
#[diesel(table_name = crate::schema::repair_order_services)]
pub struct RepairOrderService {
    pub id: i32,
    pub service_id: i32,
    pub repair_order_id: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::repair_order_services)]
pub struct NewRepairOrderService {
    pub service_id: i32,
    pub repair_order_id: i32,
}

/// Partial update; `None` columns are left out of the UPDATE.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::repair_orders)]
pub struct RepairOrderChanges {
    pub status: Option<String>,
    pub description: Option<String>,
}

impl RepairOrderChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.description.is_none()
    }
}

/// An order together with its association rows, as loaded from storage.
#[derive(Debug, Clone)]
pub struct RepairOrderAggregate {
    pub order: RepairOrder,
    pub services: Vec<RepairOrderService>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRepairOrderRequest {
    pub client_name: String,
    pub client_phone: String,
    pub car_make: String,
    pub car_model: String,
    pub car_plate: String,
    pub service_ids: Vec<i32>,
    pub employee_id: i32,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateRepairOrderRequest {
    /// Splits the request into the order row to insert and the service ids
    /// to link to it.
    pub fn into_new_order(self, created_at: DateTime<Utc>) -> (NewRepairOrder, Vec<i32>) {
        let new_order = NewRepairOrder {
            client_name: self.client_name,
            client_phone: self.client_phone,
            car_make: self.car_make,
            car_model: self.car_model,
            car_plate: self.car_plate,
            employee_id: self.employee_id,
            status: INITIAL_STATUS.to_string(),
            created_at,
            description: self.description,
        };
        (new_order, self.service_ids)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRepairOrderRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UpdateRepairOrderRequest> for RepairOrderChanges {
    fn from(request: UpdateRepairOrderRequest) -> Self {
        Self {
            status: request.status,
            description: request.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairOrderResponse {
    pub id: i32,
    pub client_name: String,
    pub client_phone: String,
    pub car_make: String,
    pub car_model: String,
    pub car_plate: String,
    pub employee_id: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
    pub service_ids: Vec<i32>,
}

impl TryFrom<RepairOrderAggregate> for RepairOrderResponse {
    type Error = ApiError;

    fn try_from(aggregate: RepairOrderAggregate) -> Result<Self, Self::Error> {
        let RepairOrderAggregate { order, services } = aggregate;
        if services.iter().any(|link| link.repair_order_id != order.id) {
            return Err(ApiError::MalformedAggregate(order.id));
        }

        Ok(Self {
            id: order.id,
            client_name: order.client_name,
            client_phone: order.client_phone,
            car_make: order.car_make,
            car_model: order.car_model,
            car_plate: order.car_plate,
            employee_id: order.employee_id,
            status: order.status,
            created_at: order.created_at,
            description: order.description,
            service_ids: services.into_iter().map(|link| link.service_id).collect(),
        })
    }
}
