use crate::{
    error::NotifierError,
    shared::{
        auth::protect_route,
        reminder_state::ReminderStateStore,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use deadline_notifier_api_structs::get_reminder_settings::{APIResponse, PathParams};
use deadline_notifier_domain::{UserReminderSettings, ID};
use deadline_notifier_infra::NotifierContext;

fn handle_errors(e: UseCaseError) -> NotifierError {
    match e {
        UseCaseError::StorageError => NotifierError::InternalError,
    }
}

pub async fn get_reminder_settings_controller(
    http_req: HttpRequest,
    ctx: web::Data<NotifierContext>,
    path: web::Path<PathParams>,
) -> Result<HttpResponse, NotifierError> {
    protect_route(&http_req, &ctx)?;

    let usecase = GetReminderSettingsUseCase {
        user_id: path.user_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|settings| HttpResponse::Ok().json(APIResponse::new(settings)))
        .map_err(handle_errors)
}

/// Settings are created with the defaults when read for the first time
#[derive(Debug)]
pub struct GetReminderSettingsUseCase {
    pub user_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for GetReminderSettingsUseCase {
    type Response = UserReminderSettings;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminderSettings";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        ReminderStateStore::new(ctx)
            .get_settings(&self.user_id)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
