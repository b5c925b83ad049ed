pub mod boards;
pub mod home;
pub mod posts;
pub mod reports;
pub mod uploads;

use axum::Router;

use crate::config::Config;
use crate::state::AppState;

/// All HTTP routes. Trailing-slash and bare collection paths are both served.
pub fn router(config: &Config) -> Router<AppState> {
    Router::new()
        .merge(home::router())
        .merge(boards::router())
        .merge(posts::router())
        .merge(reports::router())
        .merge(uploads::router(config.import.max_upload_bytes))
}
