mod digest;
mod error;
mod job_schedulers;
mod notification;
mod reminder;
mod settings;
mod shared;
mod status;

use actix_web::{dev::Server, middleware, web, App, HttpServer};
use deadline_notifier_infra::NotifierContext;
use job_schedulers::{start_daily_digest_job, start_reminder_sweep_job, JobMonitors};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub use shared::auth::API_KEY_HEADER;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    settings::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: NotifierContext) -> Result<Self, std::io::Error> {
        let monitors = JobMonitors::new();
        let (server, port) = Application::configure_server(context.clone(), monitors.clone())?;
        Application::start_job_schedulers(context, &monitors);

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: NotifierContext, monitors: &JobMonitors) {
        start_reminder_sweep_job(context.clone(), monitors.reminder_sweep.clone());
        start_daily_digest_job(context, monitors.daily_digest.clone());
    }

    fn configure_server(
        context: NotifierContext,
        monitors: JobMonitors,
    ) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            App::new()
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(context.clone()))
                .app_data(web::Data::new(monitors.clone()))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
