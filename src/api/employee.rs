use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::AppEngine;
use crate::error::AppError;
use crate::model::employee::{Employee, EmployeeWithAttendance};
use crate::store::{EmployeeUpdate, NewEmployee, RecordStore};

#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[schema(example = "田中 太郎")]
    pub name: String,
    #[schema(example = "営業部")]
    pub department: String,
    #[schema(example = "tanaka@example.com", nullable = true)]
    pub email: Option<String>,
    #[schema(example = "👤", nullable = true)]
    pub avatar: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// List all employees joined with today's attendance
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Employees with today's attendance", body = [EmployeeWithAttendance]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn list_employees(engine: web::Data<AppEngine>) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let employees = engine.store().employees_with_attendance(today).await?;
    Ok(HttpResponse::Ok().json(employees))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid employee data"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    engine: web::Data<AppEngine>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    if payload.name.trim().is_empty() || payload.department.trim().is_empty() {
        return Err(AppError::Validation(
            "name and department must not be empty".into(),
        ));
    }

    // The department label is copied onto the employee at assignment time;
    // it does not track later department renames.
    let employee = engine
        .store()
        .create_employee(NewEmployee {
            name: payload.name,
            department: payload.department,
            email: payload.email,
            avatar: payload.avatar,
        })
        .await?;

    tracing::info!(employee_id = %employee.id, "Employee created");
    Ok(HttpResponse::Created().json(employee))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    engine: web::Data<AppEngine>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee = engine.require_employee(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "No fields provided for update"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    engine: web::Data<AppEngine>,
    path: web::Path<String>,
    payload: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let payload = payload.into_inner();

    let updated = engine
        .store()
        .update_employee(
            &employee_id,
            EmployeeUpdate {
                name: payload.name,
                department: payload.department,
                email: payload.email,
                avatar: payload.avatar,
            },
        )
        .await?
        .ok_or(AppError::NotFound("Employee"))?;

    Ok(HttpResponse::Ok().json(updated))
}
