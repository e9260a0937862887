use crate::config::Config;
use crate::repository::SharedRepository;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub repo: SharedRepository,
    pub config: Config,
}

impl FromRef<AppState> for SharedRepository {
    fn from_ref(state: &AppState) -> Self {
        state.repo.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
