use actix_web::{HttpResponse, Responder, web};
use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::error;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, AttendanceView};
use crate::model::employee::Employee;
use crate::utils::hours::round2;
use crate::utils::summary::{MonthlySummary, aggregate, aggregate_within, month_span};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyHoursResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = 168.5)]
    pub total_hours: f64,
    #[schema(example = 21)]
    pub work_days: usize,
    pub data: Vec<AttendanceView>,
}

impl MonthlyHoursResponse {
    fn empty() -> Self {
        Self {
            success: true,
            total_hours: 0.0,
            work_days: 0,
            data: Vec::new(),
        }
    }
}

impl From<MonthlySummary> for MonthlyHoursResponse {
    fn from(summary: MonthlySummary) -> Self {
        Self {
            success: true,
            total_hours: summary.total_hours,
            work_days: summary.work_days,
            data: summary
                .records
                .iter()
                .map(|rh| AttendanceView::new(&rh.record, rh.hours))
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DashboardStats {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = 12)]
    pub total_employees: i64,
    #[schema(example = 9)]
    pub checked_in_today: i64,
    #[schema(example = 3)]
    pub absent_today: i64,
    #[schema(example = 1410.75)]
    pub total_monthly_hours: f64,
}

impl DashboardStats {
    fn empty() -> Self {
        Self {
            success: true,
            total_employees: 0,
            checked_in_today: 0,
            absent_today: 0,
            total_monthly_hours: 0.0,
        }
    }
}

struct EmployeeTotal {
    name: String,
    total_hours: f64,
}

/// Monthly summary for one employee
#[utoipa::path(
    get,
    path = "/api/monthly-hours/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("year" = Option<i32>, Query, description = "Four-digit year, defaults to the current year"),
        ("month" = Option<u32>, Query, description = "Month 1-12, defaults to the current month")
    ),
    responses(
        (status = 200, description = "Totals plus the month's records, newest first", body = MonthlyHoursResponse)
    ),
    tag = "Reports"
)]
pub async fn monthly_hours(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    query: web::Query<MonthQuery>,
) -> impl Responder {
    let employee_id = path.into_inner();
    let today = Local::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    // A nonsense month selects nothing, same as a month with no records.
    let (first, last) = match month_span(year, month) {
        Some(range) => range,
        None => return HttpResponse::Ok().json(MonthlyHoursResponse::empty()),
    };

    match load_month(pool.get_ref(), employee_id, first, last).await {
        Ok(summary) => HttpResponse::Ok().json(MonthlyHoursResponse::from(summary)),
        Err(e) => {
            error!(error = %e, employee_id, year, month, "Failed to build monthly summary");
            HttpResponse::Ok().json(MonthlyHoursResponse::empty())
        }
    }
}

async fn load_month(
    pool: &PgPool,
    employee_id: i64,
    first: NaiveDate,
    last: NaiveDate,
) -> Result<MonthlySummary> {
    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT date, start_time, end_time, location
        FROM attendance
        WHERE employee_id = $1 AND date BETWEEN $2 AND $3
        ORDER BY date DESC, start_time DESC
        "#,
    )
    .bind(employee_id)
    .bind(first)
    .bind(last)
    .fetch_all(pool)
    .await?;

    // The window is re-applied in memory so a stray out-of-range row can
    // never leak into a monthly total.
    Ok(aggregate_within(records, first, last))
}

/// Headline numbers for the admin landing page
#[utoipa::path(
    get,
    path = "/api/dashboard-stats",
    responses(
        (status = 200, description = "Headcount, today's check-ins and this month's hours", body = DashboardStats)
    ),
    tag = "Reports"
)]
pub async fn dashboard_stats(pool: web::Data<PgPool>) -> impl Responder {
    match load_stats(pool.get_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            error!(error = %e, "Failed to compute dashboard stats");
            HttpResponse::Ok().json(DashboardStats::empty())
        }
    }
}

async fn load_stats(pool: &PgPool) -> Result<DashboardStats> {
    let total_employees = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await?;

    let checked_in_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT employee_id) FROM attendance WHERE date = CURRENT_DATE",
    )
    .fetch_one(pool)
    .await?;

    let today = Local::now().date_naive();
    let total_monthly_hours = match month_span(today.year(), today.month()) {
        Some((first, _)) => {
            let records = sqlx::query_as::<_, AttendanceRecord>(
                r#"
                SELECT date, start_time, end_time, location
                FROM attendance
                WHERE date >= $1 AND end_time IS NOT NULL
                "#,
            )
            .bind(first)
            .fetch_all(pool)
            .await?;
            aggregate(records).total_hours
        }
        None => 0.0,
    };

    Ok(DashboardStats {
        success: true,
        total_employees,
        checked_in_today,
        absent_today: total_employees - checked_in_today,
        total_monthly_hours,
    })
}

/// Per-employee monthly totals as a CSV download
#[utoipa::path(
    get,
    path = "/api/reports/monthly/export",
    params(
        ("year" = Option<i32>, Query, description = "Four-digit year, defaults to the current year"),
        ("month" = Option<u32>, Query, description = "Month 1-12, defaults to the current month")
    ),
    responses(
        (status = 200, description = "CSV attachment with one row per employee", body = String, content_type = "text/csv"),
        (status = 400, description = "Invalid year or month", body = Object, example = json!({
            "success": false,
            "error": "Invalid year or month"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "success": false,
            "error": "Internal Server Error"
        }))
    ),
    tag = "Reports"
)]
pub async fn export_monthly_report(
    pool: web::Data<PgPool>,
    query: web::Query<MonthQuery>,
) -> impl Responder {
    let today = Local::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    // Unlike the JSON summaries, bad params are refused outright rather
    // than answered with an empty file.
    let (first, last) = match month_span(year, month) {
        Some(range) => range,
        None => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": "Invalid year or month"
            }));
        }
    };

    match collect_totals(pool.get_ref(), first, last).await {
        Ok(totals) => {
            let csv = build_monthly_csv(year, month, &totals);
            let filename = format!("monthly-hours-{year}-{month:02}.csv");
            HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{filename}\""),
                ))
                .body(csv)
        }
        Err(e) => {
            error!(error = %e, year, month, "Failed to export monthly report");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": "Internal Server Error"
            }))
        }
    }
}

async fn collect_totals(
    pool: &PgPool,
    first: NaiveDate,
    last: NaiveDate,
) -> Result<Vec<EmployeeTotal>> {
    let employees =
        sqlx::query_as::<_, Employee>("SELECT id, name FROM employees ORDER BY name")
            .fetch_all(pool)
            .await?;

    let mut totals = Vec::with_capacity(employees.len());
    for employee in employees {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT date, start_time, end_time, location
            FROM attendance
            WHERE employee_id = $1
            "#,
        )
        .bind(employee.id)
        .fetch_all(pool)
        .await?;

        totals.push(EmployeeTotal {
            name: employee.name,
            total_hours: aggregate_within(records, first, last).total_hours,
        });
    }

    Ok(totals)
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Title line, blank separator, header, one row per employee in roster
/// order, then a grand total over the same rounded figures the rows show.
fn build_monthly_csv(year: i32, month: u32, totals: &[EmployeeTotal]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Monthly Hours Report {year}-{month:02}\n"));
    out.push('\n');
    out.push_str("Name,Total Hours\n");

    let mut grand_total = 0.0;
    for row in totals {
        grand_total += row.total_hours;
        out.push_str(&format!("{},{:.2}\n", csv_field(&row.name), row.total_hours));
    }

    out.push_str(&format!("GRAND TOTAL,{:.2}\n", round2(grand_total)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_field_escapes_only_when_needed() {
        assert_eq!(csv_field("Jane Doe"), "Jane Doe");
        assert_eq!(csv_field("Doe, Jane"), "\"Doe, Jane\"");
        assert_eq!(csv_field("Jane \"JD\" Doe"), "\"Jane \"\"JD\"\" Doe\"");
    }

    #[test]
    fn report_layout_has_title_header_and_grand_total() {
        let totals = vec![
            EmployeeTotal {
                name: "Alice".into(),
                total_hours: 160.0,
            },
            EmployeeTotal {
                name: "Bob".into(),
                total_hours: 8.5,
            },
        ];
        let csv = build_monthly_csv(2025, 3, &totals);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Monthly Hours Report 2025-03");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Name,Total Hours");
        assert_eq!(lines[3], "Alice,160.00");
        assert_eq!(lines[4], "Bob,8.50");
        assert_eq!(lines[5], "GRAND TOTAL,168.50");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn empty_month_still_produces_a_valid_report() {
        let csv = build_monthly_csv(2025, 11, &[]);
        assert!(csv.starts_with("Monthly Hours Report 2025-11\n"));
        assert!(csv.ends_with("GRAND TOTAL,0.00\n"));
    }

    #[test]
    fn grand_total_is_rounded_once_more() {
        let totals = vec![
            EmployeeTotal {
                name: "A".into(),
                total_hours: 0.83,
            },
            EmployeeTotal {
                name: "B".into(),
                total_hours: 0.83,
            },
            EmployeeTotal {
                name: "C".into(),
                total_hours: 0.83,
            },
        ];
        let csv = build_monthly_csv(2025, 3, &totals);
        assert!(csv.ends_with("GRAND TOTAL,2.49\n"));
    }

    #[test]
    fn comma_names_stay_on_one_row() {
        let totals = vec![EmployeeTotal {
            name: "Doe, Jane".into(),
            total_hours: 40.0,
        }];
        let csv = build_monthly_csv(2025, 3, &totals);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[3], "\"Doe, Jane\",40.00");
        assert_eq!(lines.len(), 5);
    }
}
