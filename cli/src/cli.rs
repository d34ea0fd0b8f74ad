use clap::Parser;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5555";

#[derive(Parser, Debug)]
#[command(name = "tareas")]
#[command(about = "Console client for the task manager server", long_about = None)]
pub struct Cli {
    /// Server base URL
    #[arg(default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Never launch a browser; just print where the page was saved
    #[arg(long)]
    pub no_browser: bool,
}
