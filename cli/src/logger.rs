use colored::*;
use console::Term;
use std::fmt::Display;

/// User-facing console output. Diagnostic logging goes through `log` instead.
/// Tags match the server's startup log: [INFO] cyan, [OK] green, [WARN] yellow,
/// [ERROR] red, [TIP] magenta. Titles are bright purple.
pub struct Logger;

impl Logger {
    /// Boxed title centered on the terminal, followed by the server URL.
    pub fn banner(base_url: &str) {
        let width = Self::term_width().min(60);
        Self::divider(width);
        println!(
            "{:^width$}",
            "CLIENTE DE CONSOLA - SISTEMA DE TAREAS".bright_magenta().bold(),
            width = width
        );
        Self::divider(width);
        println!("{} {}", "Servidor:".cyan().bold(), base_url);
        Self::divider(width);
    }

    pub fn info<T: Display>(msg: T) {
        println!("{} {}", "[INFO]".cyan(), msg);
    }

    pub fn success<T: Display>(msg: T) {
        println!("{} {}", "[OK]".green(), msg);
    }

    pub fn warn<T: Display>(msg: T) {
        println!("{} {}", "[WARN]".yellow(), msg);
    }

    pub fn error<T: Display>(msg: T) {
        println!("{} {}", "[ERROR]".red(), msg);
    }

    /// A suggestion for something the user can do by hand.
    pub fn tip<T: Display>(msg: T) {
        println!("{} {}", "[TIP]".magenta(), msg);
    }

    /// Section header, underlined with dashes to its own length.
    pub fn header<T: Display>(msg: T) {
        let title = msg.to_string();
        println!("\n{}", title.bright_blue().bold());
        println!("{}", "-".repeat(title.chars().count()).bright_blue());
    }

    pub fn divider(width: usize) {
        println!("{}", "=".repeat(width).bright_blue());
    }

    /// Inline emphasis for usernames and paths.
    pub fn highlight<T: Display>(msg: T) -> String {
        msg.to_string().bright_cyan().bold().to_string()
    }

    pub fn dim<T: Display>(msg: T) -> String {
        msg.to_string().dimmed().to_string()
    }

    fn term_width() -> usize {
        let (_, cols) = Term::stdout().size();
        usize::from(cols).max(40)
    }
}
