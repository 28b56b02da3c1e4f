use crate::{
    auth::jwt::TokenService,
    config::Config,
    repository::Repositories,
    service::{
        attendance::AttendanceRecorder, directory::Directory, schedule::ScheduleAssignor, shift::ShiftCatalog,
    },
    utils::username_index::UsernameIndex,
};
use std::sync::Arc;

/// Everything a handler needs, shared across workers as `web::Data<AppState>`.
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub shifts: ShiftCatalog,
    pub schedules: ScheduleAssignor,
    pub attendance: AttendanceRecorder,
    pub directory: Directory,
}

impl AppState {
    pub fn new(config: &Config, repos: Repositories, usernames: Arc<UsernameIndex>) -> Self {
        let tokens = Arc::new(TokenService::from_config(config));

        Self {
            shifts: ShiftCatalog::new(repos.shifts.clone()),
            schedules: ScheduleAssignor::new(repos.schedules.clone()),
            attendance: AttendanceRecorder::new(repos.attendance.clone(), repos.schedules.clone()),
            directory: Directory::new(repos.users, repos.roles, tokens.clone(), usernames)
                .with_role_choice(config.register_role_choice),
            tokens,
        }
    }
}
