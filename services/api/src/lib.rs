mod cli;
mod infra;
mod listing;
mod routes;
mod server;

use polls::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
