use std::process::ExitCode;
use tailscale_log_agent::app;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    app::main().await
}
