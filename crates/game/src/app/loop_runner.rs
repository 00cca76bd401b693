use std::process::ExitCode;

use engine::{run_app, AppError};
use tracing::error;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_app(app.config, app.scenes) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Scene(err)) => {
            error!(error = %err, "scene_failed");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
