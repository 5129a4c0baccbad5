use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    docrag::cli::query::main().await
}
