pub mod api;
pub mod app;
pub mod browser;
pub mod cli;
pub mod logger;
pub mod page;
pub mod prompt;
pub mod session;

use api::ApiClient;
use app::App;
use browser::{NoopOpener, Opener, SystemOpener};
use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let api = ApiClient::new(&cli.base_url)?;

    let opener: Box<dyn Opener> = if cli.no_browser {
        Box::new(NoopOpener)
    } else {
        Box::new(SystemOpener::new())
    };

    let mut app = App::new(api, opener, page::artifact_dir());

    // Prompts see Ctrl+C themselves; this catches it while we wait on the network.
    let code = tokio::select! {
        result = app.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            app.abandon();
            ExitCode::from(130)
        }
    };

    Ok(code)
}
