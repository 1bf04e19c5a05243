use std::time::Instant;

use actix_web::middleware::Next;
use actix_web::{
    Error,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};

use crate::metrics::PerformanceMonitor;

/// Times every API request into the injected performance monitor, error
/// responses included.
pub async fn track_performance(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req.path().to_string();
    let monitor = req.app_data::<Data<PerformanceMonitor>>().cloned();

    match next.call(req).await {
        Ok(res) => {
            if let Some(monitor) = &monitor {
                monitor.record_api(
                    &method,
                    &path,
                    started.elapsed().as_millis() as u64,
                    res.status().as_u16(),
                );
            }
            Ok(res)
        }
        Err(err) => {
            if let Some(monitor) = &monitor {
                monitor.record_api(
                    &method,
                    &path,
                    started.elapsed().as_millis() as u64,
                    err.as_response_error().status_code().as_u16(),
                );
            }
            Err(err)
        }
    }
}
