use actix_web::{HttpResponse, Responder, web};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::error;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::utils::{name_cache, name_filter, summary::aggregate};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@company.com", format = "email", nullable = true)]
    pub email: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeProfile {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@company.com")]
    pub email: String,
    #[schema(example = 336.5)]
    pub total_hours: f64,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(
        example = json!([{
            "id": 1,
            "name": "Jane Doe",
            "email": "jane.doe@company.com",
            "total_hours": 336.5
        }])
    )]
    pub data: Vec<EmployeeProfile>,
}

/// Roster with per-employee email and lifetime hours
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Employee roster", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(pool: web::Data<PgPool>) -> impl Responder {
    let profiles = match load_roster(pool.get_ref()).await {
        Ok(profiles) => profiles,
        Err(e) => {
            error!(error = %e, "Failed to fetch employee roster");
            Vec::new()
        }
    };

    HttpResponse::Ok().json(EmployeeListResponse {
        success: true,
        data: profiles,
    })
}

async fn load_roster(pool: &PgPool) -> Result<Vec<EmployeeProfile>> {
    let employees =
        sqlx::query_as::<_, Employee>("SELECT id, name FROM employees ORDER BY name")
            .fetch_all(pool)
            .await?;

    // A pair of lookups per employee. Rosters here are tens of rows, not
    // thousands.
    let mut profiles = Vec::with_capacity(employees.len());
    for employee in employees {
        let email = sqlx::query_scalar::<_, String>(
            "SELECT email FROM users WHERE LOWER(name) = LOWER($1) LIMIT 1",
        )
        .bind(&employee.name)
        .fetch_optional(pool)
        .await?;

        let closed = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT date, start_time, end_time, location
            FROM attendance
            WHERE employee_id = $1 AND end_time IS NOT NULL
            "#,
        )
        .bind(employee.id)
        .fetch_all(pool)
        .await?;

        let worked = aggregate(closed);
        profiles.push(EmployeeProfile {
            id: employee.id,
            name: employee.name,
            email: email.unwrap_or_default(),
            total_hours: worked.total_hours,
        });
    }

    Ok(profiles)
}

/// Availability check for a new employee name, cheapest test first.
pub async fn is_name_available(pool: &PgPool, name: &str) -> bool {
    // 1. Cuckoo filter: definitely-absent fast path
    if !name_filter::might_exist(name) {
        return true;
    }

    // 2. Cache of known-taken names
    if name_cache::is_taken(name).await {
        return false;
    }

    // 3. Filter hit but cache miss: could be a false positive, ask the DB.
    //    On a lookup failure assume taken so a duplicate is never handed out.
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE LOWER(name) = LOWER($1))",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap_or(true);

    if exists {
        name_cache::mark_taken(name).await;
    }

    !exists
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({
            "success": true,
            "data": { "id": 7, "name": "Jane Doe", "email": "", "total_hours": 0 }
        })),
        (status = 400, description = "Missing or duplicate name", body = Object, example = json!({
            "success": false,
            "error": "Employee already exists"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "success": false,
            "error": "Internal Server Error"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<PgPool>,
    payload: web::Json<CreateEmployee>,
) -> impl Responder {
    let name = payload.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "Name is required"
        }));
    }

    if !is_name_available(pool.get_ref(), name).await {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "Employee already exists"
        }));
    }

    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    match insert_employee(pool.get_ref(), name, email).await {
        Ok(new_id) => {
            name_filter::insert(name);
            name_cache::mark_taken(name).await;

            HttpResponse::Created().json(json!({
                "success": true,
                "data": {
                    "id": new_id,
                    "name": name,
                    "email": email.unwrap_or(""),
                    "total_hours": 0
                }
            }))
        }

        Err(e) => {
            // The availability check is advisory; the unique index has the
            // final word when two requests race on the same name.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23505") {
                    name_cache::mark_taken(name).await;
                    return HttpResponse::BadRequest().json(json!({
                        "success": false,
                        "error": "Employee already exists"
                    }));
                }
            }

            error!(error = %e, name, "Failed to create employee");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": "Internal Server Error"
            }))
        }
    }
}

/// Employee ids are assigned MAX + 1 in the creating transaction. The
/// directory upsert keeps one row per email, renaming it to the latest
/// holder.
async fn insert_employee(
    pool: &PgPool,
    name: &str,
    email: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let max_id = sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(id) FROM employees")
        .fetch_one(&mut *tx)
        .await?;
    let new_id = max_id.unwrap_or(0) + 1;

    sqlx::query("INSERT INTO employees (id, name) VALUES ($1, $2)")
        .bind(new_id)
        .bind(name)
        .execute(&mut *tx)
        .await?;

    if let Some(email) = email {
        sqlx::query(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(name)
        .bind(email)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(new_id)
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee and their attendance removed", body = Object, example = json!({
            "success": true
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "success": false,
            "error": "Internal Server Error"
        }))
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> impl Responder {
    let employee_id = path.into_inner();

    match remove_employee(pool.get_ref(), employee_id).await {
        Ok(removed) => {
            if let Some(name) = removed {
                name_filter::remove(&name);
                name_cache::release(&name).await;
            }

            // Deleting an id that is already gone is not an error to the
            // caller.
            HttpResponse::Ok().json(json!({ "success": true }))
        }

        Err(e) => {
            error!(error = %e, employee_id, "Failed to delete employee");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": "Internal Server Error"
            }))
        }
    }
}

async fn remove_employee(pool: &PgPool, employee_id: i64) -> Result<Option<String>> {
    let mut tx = pool.begin().await?;

    let name = sqlx::query_scalar::<_, String>("SELECT name FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(&mut *tx)
        .await?;

    if name.is_none() {
        return Ok(None);
    }

    sqlx::query("DELETE FROM attendance WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(name)
}
