use std::str::FromStr;

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use shared::ApiError;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::services)]
pub struct Service {
    pub id: i32,
    pub name: String,
    pub price: BigDecimal,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::services)]
pub struct NewService {
    pub name: String,
    pub price: BigDecimal,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::employees)]
pub struct Employee {
    pub id: i32,
    pub full_name: String,
    pub position: String,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::employees)]
pub struct NewEmployee {
    pub full_name: String,
    pub position: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub price: f64,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub duration_minutes: i32,
}

impl TryFrom<CreateServiceRequest> for NewService {
    type Error = ApiError;

    fn try_from(request: CreateServiceRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: request.name,
            price: price_to_decimal(request.price)?,
            duration_minutes: request.duration_minutes,
        })
    }
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            price: price_to_f64(&service.price),
            duration_minutes: service.duration_minutes,
        }
    }
}

// Goes through the shortest decimal rendering of the float so 29.99 is
// stored as 29.99 and not its binary approximation.
fn price_to_decimal(price: f64) -> Result<BigDecimal, ApiError> {
    if !price.is_finite() {
        return Err(ApiError::BadRequest(format!("invalid price: {}", price)));
    }
    BigDecimal::from_str(&price.to_string())
        .map_err(|e| ApiError::BadRequest(format!("invalid price {}: {}", price, e)))
}

// Parsing the decimal rendering yields the nearest float, so a price read
// back matches the float it was created from.
fn price_to_f64(price: &BigDecimal) -> f64 {
    price
        .to_string()
        .parse::<f64>()
        .ok()
        .or_else(|| price.to_f64())
        .unwrap_or_default()
}
