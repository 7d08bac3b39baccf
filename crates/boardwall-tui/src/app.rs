//! Application core: event loop, action dispatch, chrome rendering.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use boardwall_api::BackendClient;
use boardwall_core::{CpuUsage, Dashboard, DashboardState, SystemInfo, Viewport};

use crate::action::{Action, BackendStatus, Notification, NotificationLevel};
use crate::component::Component;
use crate::data_bridge::{HealthCheck, spawn_data_bridge};
use crate::event::{Event, EventReader, Rates};
use crate::screens::boards::BoardsScreen;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::cpu_bars::cpu_lines;

/// Header rows, borders included.
const HEADER_HEIGHT: u16 = 6;
/// Status bar rows.
const STATUS_HEIGHT: u16 = 1;
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);
const BRIDGE_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Terminal cells to layout units: rows count double so 2x1 squares are square.
pub fn viewport_for(cols: u16, rows: u16) -> Viewport {
    Viewport::new(f64::from(cols), f64::from(rows) * 2.0)
        .with_reserved_height(f64::from(HEADER_HEIGHT + STATUS_HEIGHT) * 2.0)
}

/// Top-level application state and event loop.
pub struct App {
    running: bool,
    backend_status: BackendStatus,
    dashboard_state: DashboardState,
    help_visible: bool,
    refresh_pending: bool,
    terminal_size: (u16, u16),
    boards: BoardsScreen,
    system_info: Option<SystemInfo>,
    cpu: Option<CpuUsage>,
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    client: Arc<BackendClient>,
    dashboard: Dashboard<BackendClient>,
    health: HealthCheck,
    data_cancel: CancellationToken,
}

impl App {
    /// `action_tx` must be the sender the dashboard's widget factory uses,
    /// so board widgets and the loop share one channel.
    pub fn new(
        client: Arc<BackendClient>,
        dashboard: Dashboard<BackendClient>,
        health: HealthCheck,
        action_tx: mpsc::UnboundedSender<Action>,
        action_rx: mpsc::UnboundedReceiver<Action>,
    ) -> Self {
        Self {
            running: true,
            backend_status: BackendStatus::default(),
            dashboard_state: DashboardState::Idle,
            help_visible: false,
            refresh_pending: false,
            terminal_size: (0, 0),
            boards: BoardsScreen::new(),
            system_info: None,
            cpu: None,
            notification: None,
            action_tx,
            action_rx,
            client,
            dashboard,
            health,
            data_cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));
        self.dashboard
            .on_resize(viewport_for(self.terminal_size.0, self.terminal_size.1));

        let bridge = tokio::spawn(spawn_data_bridge(
            Arc::clone(&self.client),
            self.dashboard.clone(),
            self.health,
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        let mut events = EventReader::spawn(Rates::default());

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        if tokio::time::timeout(BRIDGE_SHUTDOWN_TIMEOUT, bridge).await.is_err() {
            warn!("data bridge did not stop in time");
        }
        info!("TUI event loop ended");
        Ok(())
    }

    /// Global keys first, then the boards screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('r')) => Ok(Some(Action::RefreshBoards)),
            _ => self.boards.handle_key_event(key),
        }
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Resize(w, h) => {
                self.terminal_size = (*w, *h);
                self.dashboard.on_resize(viewport_for(*w, *h));
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::RefreshBoards => {
                if self.refresh_pending {
                    self.notify("refresh already running", NotificationLevel::Info);
                    return Ok(());
                }
                if self.dashboard_state != DashboardState::Running {
                    self.notify("dashboard is not running", NotificationLevel::Warning);
                    return Ok(());
                }
                self.refresh_pending = true;
                self.boards.update(action)?;
                self.spawn_refresh();
            }
            Action::RefreshDone => {
                self.refresh_pending = false;
                self.boards.update(action)?;
            }

            Action::Backend(status) => self.backend_status = status.clone(),
            Action::DashboardState(state) => {
                debug!(%state, "dashboard state");
                self.dashboard_state = *state;
            }
            Action::SystemInfo(info) => self.system_info = Some(info.clone()),
            Action::CpuUpdated(sample) => self.cpu = Some(sample.clone()),
            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
            }

            Action::LayoutChanged(_)
            | Action::BoardMounted(_)
            | Action::BoardPosition { .. }
            | Action::BoardResult { .. }
            | Action::BoardRemoved(_) => {
                if let Some(follow_up) = self.boards.update(action)? {
                    self.action_tx.send(follow_up)?;
                }
            }

            Action::Render => {}
        }
        Ok(())
    }

    fn notify(&mut self, message: impl Into<String>, level: NotificationLevel) {
        self.notification = Some((
            Notification {
                message: message.into(),
                level,
            },
            Instant::now(),
        ));
    }

    fn spawn_refresh(&self) {
        let dashboard = self.dashboard.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let notification = match dashboard.refresh_boards().await {
                Ok(count) => Notification {
                    message: format!("refreshed {count} boards"),
                    level: NotificationLevel::Info,
                },
                Err(e) => {
                    warn!(error = %e, "board refresh failed");
                    Notification {
                        message: format!("refresh failed: {e}"),
                        level: NotificationLevel::Warning,
                    }
                }
            };
            let _ = tx.send(Action::RefreshDone);
            let _ = tx.send(Action::Notify(notification));
        });
    }

    // ── Rendering ────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

        self.render_header(frame, layout[0]);
        self.boards.render(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        if let Some((ref notification, _)) = self.notification {
            render_notification(frame, area, notification);
        }

        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" boardwall ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut summary = vec![
            Span::styled(format!(" {} ", self.client.base_url()), Style::default().fg(theme::NEON_CYAN)),
            Span::styled("│ ", theme::key_hint()),
            Span::styled(self.dashboard_state.to_string(), Style::default().fg(theme::DIM_WHITE)),
        ];
        if let Some(info) = &self.system_info {
            summary.push(Span::styled(
                format!(
                    "  │ {} cores  {:.1} GB  {} boards",
                    info.cpu_cores, info.total_memory_gb, info.num_boards
                ),
                theme::key_hint(),
            ));
        }

        let max_lines = usize::from(inner.height.saturating_sub(1));
        let mut lines = vec![Line::from(summary)];
        lines.extend(
            cpu_lines(self.cpu.as_ref(), Utc::now(), inner.width.saturating_sub(1))
                .into_iter()
                .take(max_lines)
                .map(|line| {
                    let mut spans = vec![Span::raw(" ")];
                    spans.extend(line.spans);
                    Line::from(spans)
                }),
        );
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let indicator = match &self.backend_status {
            BackendStatus::Ready => {
                Span::styled("● backend ready", Style::default().fg(theme::SUCCESS_GREEN))
            }
            BackendStatus::Waiting => Span::styled(
                "◐ waiting for backend",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
            BackendStatus::Unavailable(reason) => Span::styled(
                format!("○ backend unavailable: {reason}"),
                Style::default().fg(theme::ERROR_RED),
            ),
        };

        let mut spans = vec![
            Span::raw(" "),
            indicator,
            Span::styled(format!(" │ {} boards", self.boards.len()), theme::key_hint()),
        ];
        if let Some(cell) = self.boards.selected() {
            spans.push(Span::styled(
                format!(" │ board {}", cell.board_id),
                Style::default().fg(theme::NEON_CYAN),
            ));
        }
        spans.push(Span::styled(" │ r refresh  ? help  q quit", theme::key_hint()));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 44u16.min(area.width.saturating_sub(4));
    let height = 13u16.min(area.height.saturating_sub(4));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    let help_area = Rect::new(area.x + x, area.y + y, width, height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        help_area,
    );

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("  Boards", Style::default().fg(theme::NEON_CYAN))),
        Line::from(Span::styled("  ──────", theme::key_hint())),
        entry("h/l ←/→", "Previous / next board"),
        entry("j/k ↑/↓", "Row below / above"),
        entry("r", "Reload every board"),
        Line::from(""),
        entry("?", "This help"),
        entry("q Ctrl+c", "Quit"),
        Line::from(""),
        Line::from(Span::styled("            Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let msg_len = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
    let height = 3u16;
    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + STATUS_HEIGHT + 1);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

    let (border_color, icon) = match notification.level {
        NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notification.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boardwall_api::TransportConfig;
    use boardwall_core::{BoardId, DashboardConfig, Position};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::action::BoardMount;
    use crate::widget::TuiWidgetFactory;

    fn app() -> App {
        let (tx, rx) = mpsc::unbounded_channel();
        let client =
            Arc::new(BackendClient::new("http://127.0.0.1:9", &TransportConfig::default()).unwrap());
        let dashboard = Dashboard::new(
            Arc::clone(&client),
            Arc::new(TuiWidgetFactory::new(tx.clone())),
            DashboardConfig::default(),
        );
        let health = HealthCheck {
            attempts: 1,
            backoff: Duration::from_millis(1),
        };
        App::new(client, dashboard, health, tx, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn viewport_counts_rows_twice_and_reserves_chrome() {
        assert_eq!(
            viewport_for(120, 40),
            Viewport::new(120.0, 80.0).with_reserved_height(14.0)
        );
    }

    #[tokio::test]
    async fn global_keys_map_to_actions() {
        let mut app = app();
        assert_eq!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap(), Some(Action::Quit));
        assert_eq!(
            app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
                .unwrap(),
            Some(Action::Quit)
        );
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('r'))).unwrap(),
            Some(Action::RefreshBoards)
        );
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('?'))).unwrap(),
            Some(Action::ToggleHelp)
        );
    }

    #[tokio::test]
    async fn help_overlay_swallows_other_keys() {
        let mut app = app();
        app.process_action(&Action::ToggleHelp).unwrap();
        assert_eq!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap(), None);
        assert_eq!(
            app.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::ToggleHelp)
        );
    }

    #[tokio::test]
    async fn refresh_before_running_only_warns() {
        let mut app = app();
        app.process_action(&Action::BoardMounted(BoardMount {
            board_id: BoardId(1),
            pairing: None,
            position: Position::start(),
        }))
        .unwrap();
        app.process_action(&Action::RefreshBoards).unwrap();

        assert_eq!(app.boards.len(), 1);
        let (notification, _) = app.notification.as_ref().unwrap();
        assert_eq!(notification.level, NotificationLevel::Warning);
    }

    #[tokio::test]
    async fn rejected_refresh_leaves_mounted_boards() {
        let mut app = app();
        app.process_action(&Action::BoardMounted(BoardMount {
            board_id: BoardId(1),
            pairing: None,
            position: Position::start(),
        }))
        .unwrap();
        // The UI believes the dashboard runs; the core is still idle and
        // rejects the refresh.
        app.process_action(&Action::DashboardState(DashboardState::Running))
            .unwrap();

        app.process_action(&Action::RefreshBoards).unwrap();
        app.process_action(&Action::RefreshBoards).unwrap();
        let (notification, _) = app.notification.as_ref().unwrap();
        assert_eq!(notification.message, "refresh already running");
        assert_eq!(app.boards.len(), 1);

        let done = app.action_rx.recv().await.unwrap();
        assert_eq!(done, Action::RefreshDone);
        app.process_action(&done).unwrap();
        let outcome = app.action_rx.recv().await.unwrap();
        app.process_action(&outcome).unwrap();

        assert!(!app.refresh_pending);
        assert_eq!(app.boards.len(), 1);
        let (notification, _) = app.notification.as_ref().unwrap();
        assert_eq!(notification.level, NotificationLevel::Warning);
    }
}
