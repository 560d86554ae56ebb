use crate::{
    error::NotifierError,
    shared::{
        auth::protect_route,
        reminder_state::ReminderStateStore,
        timeout::bounded,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveTime;
use deadline_notifier_api_structs::update_reminder_settings::{APIResponse, PathParams, RequestBody};
use deadline_notifier_domain::{
    UserReminderSettings, UserReminderSettingsPatch, ID, MAX_REMINDER_MINUTES_BEFORE,
};
use deadline_notifier_infra::NotifierContext;

fn handle_errors(e: UseCaseError) -> NotifierError {
    match e {
        UseCaseError::StorageError => NotifierError::InternalError,
        UseCaseError::InvalidReminderMinutesBefore(minutes) => NotifierError::BadClientData(
            format!(
                "Invalid reminder minutes before: {}, must be between 0 and {}",
                minutes, MAX_REMINDER_MINUTES_BEFORE
            ),
        ),
    }
}

pub async fn update_reminder_settings_controller(
    http_req: HttpRequest,
    ctx: web::Data<NotifierContext>,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
) -> Result<HttpResponse, NotifierError> {
    protect_route(&http_req, &ctx)?;

    let daily_summary_time = match &body.daily_summary_time {
        Some(time) => Some(NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
            NotifierError::BadClientData(format!(
                "Invalid daily summary time: {}, must be formatted as HH:MM",
                time
            ))
        })?),
        None => None,
    };

    let usecase = UpdateReminderSettingsUseCase {
        user_id: path.user_id,
        patch: UserReminderSettingsPatch {
            reminders_enabled: body.reminders_enabled,
            daily_summary_time,
            reminder_minutes_before: body.reminder_minutes_before,
        },
    };

    execute(usecase, &ctx)
        .await
        .map(|settings| HttpResponse::Ok().json(APIResponse::new(settings)))
        .map_err(handle_errors)
}

#[derive(Debug)]
pub struct UpdateReminderSettingsUseCase {
    pub user_id: ID,
    pub patch: UserReminderSettingsPatch,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
    InvalidReminderMinutesBefore(u32),
}

#[async_trait::async_trait]
impl UseCase for UpdateReminderSettingsUseCase {
    type Response = UserReminderSettings;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateReminderSettings";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        if let Some(minutes) = self.patch.reminder_minutes_before {
            if minutes > MAX_REMINDER_MINUTES_BEFORE {
                return Err(UseCaseError::InvalidReminderMinutesBefore(minutes));
            }
        }

        let mut settings = ReminderStateStore::new(ctx)
            .get_settings(&self.user_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        self.patch.apply(&mut settings);

        bounded(
            ctx.config.call_timeout,
            ctx.repos.user_settings.save(&settings),
        )
        .await
        .map_err(|_| UseCaseError::StorageError)?;

        Ok(settings)
    }
}
