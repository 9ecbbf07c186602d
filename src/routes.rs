use crate::{
    api::{attendance, employee, report},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let api_limiter = build_limiter(config.rate_api_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(api_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /employees/{employee_id}
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            // /attendance/{employee_id}
            .service(
                web::resource("/attendance/{employee_id}")
                    .route(web::get().to(attendance::employee_attendance)),
            )
            // /today-attendance
            .service(
                web::resource("/today-attendance")
                    .route(web::get().to(attendance::today_attendance)),
            )
            // /monthly-hours/{employee_id}
            .service(
                web::resource("/monthly-hours/{employee_id}")
                    .route(web::get().to(report::monthly_hours)),
            )
            // /dashboard-stats
            .service(
                web::resource("/dashboard-stats")
                    .route(web::get().to(report::dashboard_stats)),
            )
            // /reports/monthly/export
            .service(
                web::resource("/reports/monthly/export")
                    .route(web::get().to(report::export_monthly_report)),
            ),
    );
}
