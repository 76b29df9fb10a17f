mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use program_evaluator::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
