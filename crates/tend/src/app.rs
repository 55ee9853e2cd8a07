//! Interactive console over a workspace.
//!
//! Everything runs on one task: console lines, host messages and the
//! spawn-timeout reaper are multiplexed with `select!`, so the workspace is
//! only ever touched from one place.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use tend_core::{AppConfig, PageKey, SessionId};
use tend_emulator::VtScreen;
use tend_session::{EmulatorFactory, Workspace};
use tend_transport::{HostToUi, UiEndpoint};

use crate::command::{Command, HELP};

/// How often sessions stuck before readiness are checked.
const REAP_INTERVAL: Duration = Duration::from_millis(250);

/// Result of one console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Keep reading; print the text if non-empty
    Continue(String),
    /// Leave the loop
    Quit,
}

/// Console state: the workspace and the page being shown.
pub struct Console {
    workspace: Workspace<VtScreen>,
    page: PageKey,
}

impl Console {
    /// Build the workspace from config and show the first configured page.
    pub fn new(config: &AppConfig, endpoint: &UiEndpoint) -> Self {
        let dimensions = config.terminal.dimensions();
        let scrollback = config.terminal.scrollback_lines;
        let factory: EmulatorFactory<VtScreen> =
            Box::new(move |_| VtScreen::new(dimensions, scrollback));

        let mut workspace = Workspace::from_config(config, endpoint.sender(), factory);
        let page = config
            .pages
            .first()
            .map(|p| PageKey::new(p.key.clone()))
            .unwrap_or_else(|| PageKey::from("terminals"));
        workspace.show_page(&page);

        Self { workspace, page }
    }

    /// The underlying workspace.
    pub fn workspace(&self) -> &Workspace<VtScreen> {
        &self.workspace
    }

    /// The page commands apply to.
    pub fn page(&self) -> &PageKey {
        &self.page
    }

    /// Run one command.
    pub fn execute(&mut self, command: Command) -> Result<Step> {
        let output = match command {
            Command::Page(key) => {
                self.workspace.show_page(&key);
                self.page = key;
                let name = self.workspace.registry().pages().display_name(&self.page);
                format!("{} ({} tabs)", name, self.tab_count())
            }
            Command::New => {
                let session = self.workspace.add_session(&self.page);
                format!("Added {}", session.display_name)
            }
            Command::Tab(n) => {
                let id = self
                    .workspace
                    .select_tab(&self.page, n - 1)
                    .ok_or_else(|| anyhow!("no tab {n} on page {}", self.page))?;
                format!("Switched to {}", self.display_name(id))
            }
            Command::Close(tab) => {
                let id = match tab {
                    Some(n) => self.tab_id(n)?,
                    None => self.active_id()?,
                };
                let name = self.display_name(id);
                self.workspace.close_session(id);
                format!("Closed {name}")
            }
            Command::Type(text) => self.send(&text)?,
            Command::Enter => self.send("\r")?,
            Command::Resize(dimensions) => {
                let resized = self.workspace.resize_visible_pane(dimensions);
                format!("Resized {resized} pane(s) to {dimensions}")
            }
            Command::List => self.list(),
            Command::Screen => {
                let id = self.active_id()?;
                self.workspace
                    .view(id)
                    .map(|view| view.emulator().visible_lines().join("\n"))
                    .unwrap_or_default()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Step::Quit),
        };
        Ok(Step::Continue(output))
    }

    /// Apply a host message.
    pub fn handle_host_message(&mut self, message: HostToUi) {
        self.workspace.handle_host_message(message);
    }

    /// Close sessions stuck before readiness.
    pub fn reap(&mut self, now: Instant) -> Vec<SessionId> {
        self.workspace.reap_unready(now)
    }

    /// Close every session.
    pub fn shutdown(&mut self) -> usize {
        self.workspace.shutdown()
    }

    fn send(&mut self, text: &str) -> Result<String> {
        let id = self.active_id()?;
        if !self.workspace.send_input(id, text) {
            bail!("{} is not ready for input", self.display_name(id));
        }
        Ok(String::new())
    }

    fn list(&self) -> String {
        let sessions = self.workspace.sessions_for_page(&self.page);
        if sessions.is_empty() {
            return format!("No tabs on page {}", self.page);
        }

        let mut out = String::new();
        for (i, session) in sessions.iter().enumerate() {
            let marker = if session.is_active { '*' } else { ' ' };
            let status = if session.is_ready { "ready" } else { "starting" };
            let _ = writeln!(
                out,
                "{marker} {} {} [{status}]",
                i + 1,
                session.display_name
            );
        }
        out.trim_end().to_string()
    }

    fn tab_count(&self) -> usize {
        self.workspace.sessions_for_page(&self.page).len()
    }

    fn tab_id(&self, n: usize) -> Result<SessionId> {
        self.workspace
            .sessions_for_page(&self.page)
            .get(n - 1)
            .map(|s| s.id)
            .ok_or_else(|| anyhow!("no tab {n} on page {}", self.page))
    }

    fn active_id(&self) -> Result<SessionId> {
        self.workspace
            .active_session(&self.page)
            .map(|s| s.id)
            .ok_or_else(|| anyhow!("no session on page {}, use 'new'", self.page))
    }

    fn display_name(&self, id: SessionId) -> String {
        self.workspace
            .registry()
            .get(id)
            .map(|s| s.display_name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("page", &self.page)
            .field("workspace", &self.workspace)
            .finish()
    }
}

/// Drive the console until `quit`, end of input, or the host going away.
///
/// Every session is closed before returning, including on I/O errors.
pub async fn run<R, W>(
    console: &mut Console,
    endpoint: &mut UiEndpoint,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let result = serve(console, endpoint, input, &mut output).await;
    console.shutdown();
    let flushed = output.flush().await;
    result?;
    flushed?;
    Ok(())
}

async fn serve<R, W>(
    console: &mut Console,
    endpoint: &mut UiEndpoint,
    input: R,
    output: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut reaper = tokio::time::interval(REAP_INTERVAL);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Console input closed");
                    return Ok(());
                };
                let text = match Command::parse(&line) {
                    Ok(None) => continue,
                    Ok(Some(command)) => match console.execute(command) {
                        Ok(Step::Quit) => return Ok(()),
                        Ok(Step::Continue(text)) => text,
                        Err(e) => format!("error: {e}"),
                    },
                    Err(e) => format!("error: {e:#}"),
                };
                if !text.is_empty() {
                    output.write_all(text.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                    output.flush().await?;
                }
            }
            message = endpoint.recv() => {
                let Some(message) = message else {
                    info!("Host closed the transport");
                    return Ok(());
                };
                debug!("Host message: {:?}", message);
                console.handle_host_message(message);
            }
            _ = reaper.tick() => {
                for id in console.reap(Instant::now()) {
                    let line = format!("Session {id} did not start in time and was closed\n");
                    output.write_all(line.as_bytes()).await?;
                }
            }
        }
    }
}
