use crate::api::{ApiClient, LoginOutcome, PageOutcome, RegisterOutcome};
use crate::browser::Opener;
use crate::logger::Logger;
use crate::page;
use crate::prompt::{self, Input};
use crate::session::Session;
use anyhow::Result;
use colored::*;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// What the menu loop should do after an action.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Option 0: the user asked to leave.
    Quit,
    /// Ctrl+C or end of input at a prompt.
    Interrupted,
}

/// The interactive console client.
pub struct App {
    api: ApiClient,
    session: Session,
    opener: Box<dyn Opener>,
    artifact_dir: PathBuf,
}

impl App {
    pub fn new(api: ApiClient, opener: Box<dyn Opener>, artifact_dir: PathBuf) -> Self {
        Self {
            api,
            session: Session::new(),
            opener,
            artifact_dir,
        }
    }

    /// Banner, server check, then the menu loop until the user leaves.
    pub async fn run(&mut self) -> Result<ExitCode> {
        Logger::banner(self.api.base_url());

        if !self.check_server().await {
            println!();
            Logger::warn("No se puede continuar sin conexión al servidor");
            return Ok(ExitCode::FAILURE);
        }

        println!();
        Logger::success("Cliente iniciado correctamente");

        loop {
            self.show_menu();

            let flow = match prompt::text("Selecciona una opción:")? {
                Input::Value(choice) => self.dispatch(&choice).await?,
                Input::Cancelled => Flow::Continue,
                Input::Exit => Flow::Interrupted,
            };

            match flow {
                Flow::Continue => {}
                Flow::Quit => {
                    self.shutdown().await;
                    println!();
                    Logger::info("Hasta luego");
                    break;
                }
                Flow::Interrupted => {
                    println!();
                    Logger::warn("Interrupción del usuario");
                    self.shutdown().await;
                    Logger::info("Hasta luego");
                    break;
                }
            }
        }

        Ok(ExitCode::SUCCESS)
    }

    /// Called when the process is interrupted outside a prompt. No network,
    /// just local cleanup.
    pub fn abandon(&mut self) {
        println!();
        Logger::warn("Interrupción del usuario");
        self.session.clear();
        self.session.cleanup_artifacts();
        Logger::info("Hasta luego");
    }

    async fn dispatch(&mut self, choice: &str) -> Result<Flow> {
        match choice {
            "0" => Ok(Flow::Quit),
            "1" => self.register().await,
            "2" => {
                if self.session.is_logged_in() {
                    Logger::info("Ya tienes una sesión activa");
                    Ok(Flow::Continue)
                } else {
                    self.login().await
                }
            }
            "3" => {
                if self.session.is_logged_in() {
                    self.logout().await;
                } else {
                    Logger::error("No hay sesión activa para cerrar");
                }
                Ok(Flow::Continue)
            }
            _ => {
                Logger::error("Opción inválida");
                Ok(Flow::Continue)
            }
        }
    }

    fn show_menu(&self) {
        let status = match self.session.username() {
            Some(user) => format!("[{}]", user).green().bold(),
            None => "[No autenticado]".yellow().bold(),
        };
        println!("\n{} {}", status, "MENÚ PRINCIPAL".bold());
        println!("{}", "-".repeat(40).bright_blue());
        println!("{} Registrar nuevo usuario", "1.".bold());
        println!("{} Iniciar sesión", "2.".bold());
        if self.session.is_logged_in() {
            println!("{} Cerrar sesión", "3.".bold());
        }
        println!("{} Salir", "0.".bold());
        println!("{}", "-".repeat(40).bright_blue());
    }

    /// `GET /status`. Prints what the server offers and returns whether it answered.
    async fn check_server(&self) -> bool {
        let pb = spinner("Conectando con el servidor...");
        let result = self.api.status().await;
        pb.finish_and_clear();

        match result {
            Ok(status) => {
                let message = if status.message.is_empty() { "OK" } else { status.message.as_str() };
                Logger::success(format!("Servidor conectado: {}", message));

                if !status.endpoints.is_empty() {
                    let mut table = Table::new();
                    table.set_header(vec!["Endpoint", "Descripción"]);
                    for (route, description) in &status.endpoints {
                        table.add_row(vec![route, description]);
                    }
                    println!("{}", table);
                }
                if !status.version.is_empty() {
                    Logger::info(format!("Versión del servidor: {}", status.version));
                }
                if status.database.as_deref() == Some("Disconnected") {
                    Logger::warn("El servidor informa que la base de datos no responde");
                }
                true
            }
            Err(e) => {
                log::debug!("status check failed: {:?}", e);
                Logger::error(format!("No se puede conectar al servidor: {}", e));
                Logger::tip(format!(
                    "Verifica que el servidor esté ejecutándose en {}",
                    self.api.base_url()
                ));
                false
            }
        }
    }

    async fn register(&mut self) -> Result<Flow> {
        Logger::header("REGISTRO DE NUEVO USUARIO");

        let (username, password) = match read_credentials()? {
            ControlFlow::Continue(creds) => creds,
            ControlFlow::Break(flow) => return Ok(flow),
        };

        self.submit_registration(&username, &password).await;
        Ok(Flow::Continue)
    }

    async fn submit_registration(&mut self, username: &str, password: &str) {
        let pb = spinner("Registrando usuario...");
        let result = self.api.register(username, password).await;
        pb.finish_and_clear();

        match result {
            Ok(RegisterOutcome::Created) => {
                Logger::success("Usuario registrado exitosamente");
                Logger::tip("Ya puedes iniciar sesión");
            }
            Ok(RegisterOutcome::Rejected(message)) => Logger::error(message),
            Ok(RegisterOutcome::Unexpected(status)) => {
                Logger::error(format!("Error del servidor (código {})", status.as_u16()))
            }
            Err(e) => Logger::warn(format!("Error de conexión: {}", e)),
        }
    }

    async fn login(&mut self) -> Result<Flow> {
        Logger::header("INICIAR SESIÓN");

        let (username, password) = match read_credentials()? {
            ControlFlow::Continue(creds) => creds,
            ControlFlow::Break(flow) => return Ok(flow),
        };

        self.submit_login(&username, password).await;
        Ok(Flow::Continue)
    }

    async fn submit_login(&mut self, username: &str, password: String) {
        let pb = spinner("Validando credenciales...");
        let result = self.api.login(username, &password).await;
        pb.finish_and_clear();

        match result {
            Ok(LoginOutcome::Valid { username }) => {
                Logger::success(format!("Sesión iniciada como: {}", Logger::highlight(&username)));
                self.session.login(username, password);
                self.open_page().await;
            }
            Ok(LoginOutcome::Invalid(message)) => {
                self.session.clear();
                Logger::error(message);
            }
            Ok(LoginOutcome::Unexpected(status)) => {
                self.session.clear();
                Logger::error(format!("Error del servidor (código {})", status.as_u16()));
            }
            Err(e) => Logger::warn(format!("Error de conexión: {}", e)),
        }
    }

    /// Fetches `/tareas` with the retained credentials and tries to show it:
    /// the credential-embedded URL first, then the saved file, and finally
    /// just tells the user where to look.
    async fn open_page(&mut self) {
        let Some(creds) = self.session.credentials().cloned() else {
            Logger::error("Debes iniciar sesión primero");
            return;
        };

        Logger::header("ABRIENDO PÁGINA DE TAREAS");

        let pb = spinner("Obteniendo página de tareas...");
        let result = self.api.tareas(&creds.username, &creds.password).await;
        pb.finish_and_clear();

        match result {
            Ok(PageOutcome::Page(html)) => {
                // 1. Save a copy so there's always something to open by hand.
                let saved = match page::write_page(&self.artifact_dir, &html, &creds.username) {
                    Ok(path) => {
                        self.session.track_artifact(path.clone());
                        Logger::success("Página obtenida correctamente");
                        Some(path)
                    }
                    Err(e) => {
                        Logger::warn(format!("No se pudo guardar la página: {}", e));
                        None
                    }
                };

                // 2. Authenticated URL straight to the browser.
                let launched = self
                    .api
                    .authenticated_page_url(&creds.username, &creds.password)
                    .and_then(|url| self.opener.open_url(url.as_str()));
                match launched {
                    Ok(()) => {
                        Logger::success("Página abierta en el navegador");
                        Logger::info("Si el navegador solicita credenciales:");
                        Logger::info(format!("  Usuario: {}", creds.username));
                        Logger::info("  Contraseña: (la que usaste para iniciar sesión)");
                        return;
                    }
                    Err(e) => log::debug!("opening authenticated URL failed: {:?}", e),
                }

                // 3. The saved file.
                match saved {
                    Some(path) => match self.opener.open_file(&path) {
                        Ok(()) => {
                            Logger::info("Página abierta en el navegador");
                            Logger::tip(format!("Archivo guardado en: {}", Logger::highlight(path.display())));
                        }
                        Err(e) => {
                            log::debug!("opening saved page failed: {:?}", e);
                            Logger::warn("No se pudo abrir automáticamente");
                            Logger::tip(format!("Abre manualmente: {}", Logger::highlight(path.display())));
                        }
                    },
                    None => {
                        Logger::warn("No se encontró un método compatible para abrir el navegador automáticamente");
                        Logger::info(format!("Destino disponible en: {}", self.api.page_url()));
                        Logger::tip("Copia y pega el enlace en tu navegador");
                    }
                }
            }
            Ok(PageOutcome::Unauthorized) => {
                Logger::error("Credenciales inválidas o acceso no autorizado");
                Logger::tip("Intenta iniciar sesión nuevamente");
                self.session.clear();
            }
            Ok(PageOutcome::Unexpected { status, message }) => {
                Logger::error(format!("Error del servidor (código {})", status.as_u16()));
                if let Some(message) = message {
                    Logger::info(format!("Mensaje: {}", message));
                }
            }
            Err(e) => {
                Logger::warn(format!("Error al generar la página: {}", e));
                Logger::tip("Como alternativa, puedes acceder manualmente a:");
                Logger::info(format!("   {}", self.api.page_url()));
                Logger::info("   (pero necesitarás iniciar sesión desde el navegador)");
                Logger::info(format!("   Usuario: {}", creds.username));
                Logger::info(Logger::dim("   Contraseña: (la que usaste en el cliente)"));
            }
        }
    }

    /// Tells the server (which has nothing to do) and forgets everything locally.
    /// The local part happens whatever the server answers.
    async fn logout(&mut self) {
        let Some(username) = self.session.username().map(str::to_string) else {
            Logger::error("No hay sesión activa");
            return;
        };

        match self.api.logout().await {
            Ok(StatusCode::OK) => {}
            Ok(status) => {
                log::debug!("logout answered {}", status);
                Logger::warn(format!("El servidor respondió {} al cerrar sesión", status.as_u16()));
            }
            Err(e) => Logger::warn(format!("Error de conexión: {}", e)),
        }

        self.session.clear();
        self.session.cleanup_artifacts();
        Logger::info(format!("Sesión cerrada para: {}", username));
    }

    /// Leaving: log out if needed, then delete whatever we wrote no matter what.
    async fn shutdown(&mut self) {
        if self.session.is_logged_in() {
            self.logout().await;
        }
        self.session.clear();
        if !self.session.artifacts().is_empty() {
            log::debug!("removing {} temporary file(s)", self.session.artifacts().len());
        }
        self.session.cleanup_artifacts();
    }
}

/// Asks for username then password. Empty values are rejected here so we
/// don't bother the server with them.
fn read_credentials() -> Result<ControlFlow<Flow, (String, String)>> {
    let username = match prompt::text("Nombre de usuario:")? {
        Input::Value(v) => v,
        Input::Cancelled => return Ok(ControlFlow::Break(Flow::Continue)),
        Input::Exit => return Ok(ControlFlow::Break(Flow::Interrupted)),
    };
    if username.is_empty() {
        Logger::error("El nombre de usuario no puede estar vacío");
        return Ok(ControlFlow::Break(Flow::Continue));
    }

    let password = match prompt::password("Contraseña:")? {
        Input::Value(v) => v,
        Input::Cancelled => return Ok(ControlFlow::Break(Flow::Continue)),
        Input::Exit => return Ok(ControlFlow::Break(Flow::Interrupted)),
    };
    if password.is_empty() {
        Logger::error("La contraseña no puede estar vacía");
        return Ok(ControlFlow::Break(Flow::Continue));
    }

    Ok(ControlFlow::Continue((username, password)))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
