use crate::{
    api::{attendance, department, employee, performance, stats},
    config::Config,
    middleware::track_performance,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

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

    let api_limiter = Arc::new(build_limiter(config.rate_api_per_min));
    let mutation_limiter = Arc::new(build_limiter(config.rate_mutation_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(track_performance))
            .wrap(api_limiter)
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee)),
                    )
                    // /employees/{id}/toggle-attendance
                    .service(
                        web::resource("/{id}/toggle-attendance")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(attendance::toggle_attendance)),
                    )
                    // /employees/{id}/attendance/set
                    .service(
                        web::resource("/{id}/attendance/set")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(attendance::set_attendance)),
                    )
                    // /employees/{id}/attendance/history
                    .service(
                        web::resource("/{id}/attendance/history")
                            .route(web::get().to(attendance::attendance_history)),
                    )
                    // /employees/{id}/attendance/stats
                    .service(
                        web::resource("/{id}/attendance/stats")
                            .route(web::get().to(stats::employee_stats)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/bulk-update")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(attendance::bulk_update)),
                    )
                    .service(web::resource("/stats").route(web::get().to(stats::daily_stats))),
            )
            .service(
                web::scope("/departments").service(
                    web::resource("")
                        .route(web::get().to(department::list_departments))
                        .route(web::post().to(department::create_department)),
                ),
            )
            .service(
                web::scope("/performance")
                    .service(
                        web::resource("/stats")
                            .route(web::get().to(performance::performance_stats)),
                    )
                    .service(
                        web::resource("/metrics")
                            .route(web::get().to(performance::recent_metrics)),
                    ),
            ),
    );
}
