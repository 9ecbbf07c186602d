use actix_web::{HttpResponse, Responder, web};
use anyhow::Result;
use chrono::NaiveTime;
use serde::Serialize;
use sqlx::PgPool;
use tracing::error;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, AttendanceView, display_location};
use crate::utils::hours::{format_clock, span};
use crate::utils::summary::aggregate;

/// Listings stay readable even when a lookup fails: the handler logs the
/// error and answers with an empty data set instead of a 5xx.
#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    #[schema(example = true)]
    pub success: bool,
    pub data: Vec<AttendanceView>,
}

#[derive(sqlx::FromRow)]
struct TodayRow {
    employee_name: String,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    location: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct TodayView {
    #[schema(example = "Jane Doe")]
    pub employee_name: String,
    #[schema(example = "08:00", nullable = true)]
    pub start_time: Option<String>,
    #[schema(example = "16:00", nullable = true)]
    pub end_time: Option<String>,
    #[schema(example = "Berlin office")]
    pub location: String,
    #[schema(example = 8.0)]
    pub hours: f64,
}

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    #[schema(example = true)]
    pub success: bool,
    pub data: Vec<TodayView>,
}

/// Recent attendance for one employee
#[utoipa::path(
    get,
    path = "/api/attendance/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Most recent records, newest first", body = AttendanceListResponse)
    ),
    tag = "Attendance"
)]
pub async fn employee_attendance(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> impl Responder {
    let employee_id = path.into_inner();

    let views = match load_recent(pool.get_ref(), employee_id).await {
        Ok(views) => views,
        Err(e) => {
            error!(error = %e, employee_id, "Failed to fetch attendance");
            Vec::new()
        }
    };

    HttpResponse::Ok().json(AttendanceListResponse {
        success: true,
        data: views,
    })
}

async fn load_recent(pool: &PgPool, employee_id: i64) -> Result<Vec<AttendanceView>> {
    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT date, start_time, end_time, location
        FROM attendance
        WHERE employee_id = $1
        ORDER BY date DESC, start_time DESC
        LIMIT 100
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    let summary = aggregate(records);
    Ok(summary
        .records
        .iter()
        .map(|rh| AttendanceView::new(&rh.record, rh.hours))
        .collect())
}

/// Everyone who clocked in today
#[utoipa::path(
    get,
    path = "/api/today-attendance",
    responses(
        (status = 200, description = "Today's sessions across all employees", body = TodayResponse)
    ),
    tag = "Attendance"
)]
pub async fn today_attendance(pool: web::Data<PgPool>) -> impl Responder {
    let views = match load_today(pool.get_ref()).await {
        Ok(views) => views,
        Err(e) => {
            error!(error = %e, "Failed to fetch today's attendance");
            Vec::new()
        }
    };

    HttpResponse::Ok().json(TodayResponse {
        success: true,
        data: views,
    })
}

async fn load_today(pool: &PgPool) -> Result<Vec<TodayView>> {
    let rows = sqlx::query_as::<_, TodayRow>(
        r#"
        SELECT e.name AS employee_name, a.start_time, a.end_time, a.location
        FROM attendance a
        JOIN employees e ON a.employee_id = e.id
        WHERE a.date = CURRENT_DATE
        ORDER BY a.start_time DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            // Open sessions show 0 on the live board rather than null.
            TodayView {
                hours: span(row.start_time, row.end_time).value(),
                employee_name: row.employee_name,
                start_time: row.start_time.map(|t| format_clock(&t)),
                end_time: row.end_time.map(|t| format_clock(&t)),
                location: display_location(row.location.as_deref()),
            }
        })
        .collect())
}
