use crate::job_schedulers::JobMonitors;
use actix_web::{web, HttpResponse};
use deadline_notifier_api_structs::{get_service_health::*, JobStatusDTO};

async fn status(monitors: web::Data<JobMonitors>) -> HttpResponse {
    let jobs = monitors
        .all()
        .iter()
        .map(|job| JobStatusDTO {
            name: job.name().to_string(),
            running: job.is_running(),
            completed_runs: job.completed_runs(),
            failed_runs: job.failed_runs(),
            skipped_ticks: job.skipped_ticks(),
        })
        .collect();

    HttpResponse::Ok().json(APIResponse {
        message: "Deadline notifier is up".into(),
        jobs,
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
