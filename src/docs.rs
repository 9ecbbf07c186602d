use crate::api::attendance::{AttendanceListResponse, TodayResponse, TodayView};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeProfile};
use crate::api::report::{DashboardStats, MonthQuery, MonthlyHoursResponse};
use crate::model::attendance::AttendanceView;
use crate::model::employee::Employee;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Admin API",
        version = "1.0.0",
        description = r#"
## Attendance Administration Backend

This API powers the **admin backend** for employee attendance and work-hour tracking.

### 🔹 Key Features
- **Employee Management**
  - Roster with lifetime hours, case-insensitive unique names, cascading delete
- **Attendance**
  - Recent records per employee and a live board of today's sessions
- **Reports**
  - Monthly per-employee summaries, dashboard statistics, CSV export

### ⏱ Hours
Worked hours are computed at minute precision from `HH:MM` clock values,
overnight shifts roll over midnight, and every figure is rounded to two
decimals. Open sessions (no check-out yet) are listed but never counted
into totals.

### 📦 Response Format
- JSON-based RESTful responses
- Read endpoints degrade to an empty `data` set instead of failing

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::employee_attendance,
        crate::api::attendance::today_attendance,

        crate::api::report::monthly_hours,
        crate::api::report::dashboard_stats,
        crate::api::report::export_monthly_report
    ),
    components(
        schemas(
            Employee,
            EmployeeProfile,
            EmployeeListResponse,
            CreateEmployee,
            AttendanceView,
            AttendanceListResponse,
            TodayView,
            TodayResponse,
            MonthQuery,
            MonthlyHoursResponse,
            DashboardStats
        )
    ),
    tags(
        (name = "Employee", description = "Employee roster APIs"),
        (name = "Attendance", description = "Attendance listing APIs"),
        (name = "Reports", description = "Summaries, statistics and exports"),
    )
)]
pub struct ApiDoc;
