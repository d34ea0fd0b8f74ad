use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Something that can show a URL or a local file to the user.
///
/// The console client only ever calls this; which program (if any) gets
/// launched is the implementation's business.
pub trait Opener {
    fn open_url(&self, url: &str) -> Result<()>;
    fn open_file(&self, path: &Path) -> Result<()>;
}

/// Launches the platform's default handler and returns without waiting for it.
#[derive(Debug, Clone)]
pub struct SystemOpener {
    platform: Platform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux under WSL: hand things to the Windows side.
    Wsl,
    MacOs,
    Windows,
    Linux,
    Unsupported,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            if is_wsl() { Platform::Wsl } else { Platform::Linux }
        } else {
            Platform::Unsupported
        }
    }
}

fn is_wsl() -> bool {
    if std::env::var_os("WSL_DISTRO_NAME").is_some() {
        return true;
    }
    std::fs::read_to_string("/proc/version")
        .map(|v| v.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

impl SystemOpener {
    pub fn new() -> Self {
        Self {
            platform: Platform::detect(),
        }
    }

    fn launch(&self, target: &str) -> Result<()> {
        let mut command = match self.platform {
            Platform::Wsl => match which::which("wslview") {
                Ok(wslview) => {
                    let mut c = Command::new(wslview);
                    c.arg(target);
                    c
                }
                Err(_) => windows_start("cmd.exe", target),
            },
            Platform::Windows => windows_start("cmd", target),
            Platform::MacOs => {
                let mut c = Command::new("open");
                c.arg(target);
                c
            }
            Platform::Linux => {
                let xdg_open = which::which("xdg-open")
                    .context("xdg-open is not installed")?;
                let mut c = Command::new(xdg_open);
                c.arg(target);
                c
            }
            Platform::Unsupported => {
                return Err(anyhow!("No hay un método conocido para abrir el navegador en esta plataforma"));
            }
        };

        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Could not launch a browser for {}", target))?;

        log::debug!("launched browser for {}", target);
        Ok(())
    }
}

impl Default for SystemOpener {
    fn default() -> Self {
        Self::new()
    }
}

/// `cmd /C start "" <target>`. The empty string is the window title.
fn windows_start(cmd: &str, target: &str) -> Command {
    let mut c = Command::new(cmd);
    c.args(["/C", "start", "", target]);
    c
}

/// Percent-encodes the characters `cmd.exe` treats as operators. `url` leaves
/// `&` alone in the userinfo, so a password could otherwise split the command.
fn cmd_safe_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '&' => out.push_str("%26"),
            '^' => out.push_str("%5E"),
            '|' => out.push_str("%7C"),
            _ => out.push(c),
        }
    }
    out
}

/// Translates a Linux path into the Windows path the WSL host can open.
fn wsl_to_windows_path(path: &Path) -> Result<PathBuf> {
    let output = Command::new("wslpath")
        .arg("-w")
        .arg(path)
        .stderr(Stdio::null())
        .output()
        .context("wslpath is not available")?;

    if !output.status.success() {
        return Err(anyhow!("wslpath failed for {}", path.display()));
    }
    Ok(PathBuf::from(String::from_utf8_lossy(&output.stdout).trim()))
}

impl Opener for SystemOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        match self.platform {
            Platform::Windows | Platform::Wsl => self.launch(&cmd_safe_url(url)),
            _ => self.launch(url),
        }
    }

    fn open_file(&self, path: &Path) -> Result<()> {
        let target = if self.platform == Platform::Wsl && which::which("wslview").is_err() {
            wsl_to_windows_path(path)?
        } else {
            path.to_path_buf()
        };
        self.launch(&target.to_string_lossy())
    }
}

/// Opens nothing. Used with `--no-browser`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOpener;

impl Opener for NoopOpener {
    fn open_url(&self, _url: &str) -> Result<()> {
        Err(anyhow!("Apertura automática desactivada"))
    }

    fn open_file(&self, _path: &Path) -> Result<()> {
        Err(anyhow!("Apertura automática desactivada"))
    }
}
