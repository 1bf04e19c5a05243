use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::AppEngine;
use crate::error::AppError;
use crate::model::department::Department;
use crate::store::RecordStore;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "開発部")]
    pub name: String,
}

/// List departments ordered by name
#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "Department list", body = [Department]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Department"
)]
pub async fn list_departments(engine: web::Data<AppEngine>) -> Result<HttpResponse, AppError> {
    let departments = engine.store().list_departments().await?;
    Ok(HttpResponse::Ok().json(departments))
}

/// Create Department
#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Invalid or duplicate department name"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Department"
)]
pub async fn create_department(
    engine: web::Data<AppEngine>,
    payload: web::Json<CreateDepartment>,
) -> Result<HttpResponse, AppError> {
    let name = payload.into_inner().name;
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }

    let department = engine.store().create_department(name.trim()).await?;
    tracing::info!(department_id = %department.id, name = %department.name, "Department created");
    Ok(HttpResponse::Created().json(department))
}
