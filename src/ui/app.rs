use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use usagebar_core::usage::{ChannelDispatcher, DeliveryReceiver, UsageFetcher};

use crate::config::Settings;
use crate::state::{SharedState, ShellState};

use super::components::{HelpPopup, StatusBar, TitleBar, UsagePanel};
use super::key_handler::{resolve_key, KeyAction};
use super::Layout;

/// Main application
pub struct App {
    state: SharedState,
    settings: Settings,
    fetcher: UsageFetcher,
    layout: Layout,
}

impl App {
    /// Create a new application
    pub fn new(settings: Settings, fetcher: UsageFetcher) -> Self {
        let state = ShellState::shared();
        let layout = Layout::new().with_status_bar(settings.ui.show_status_bar);

        Self {
            state,
            settings,
            fetcher,
            layout,
        }
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        // Listener runs on this loop, never on a fetch task
        let (dispatcher, mut deliveries) = ChannelDispatcher::channel();
        self.fetcher.set_dispatcher(dispatcher);
        let state = self.state.clone();
        self.fetcher
            .set_listener(move |snapshot| state.write().apply(snapshot));

        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Initial fetch, then the timer takes over
        self.refresh();
        self.schedule_next_refresh();
        info!(
            "usagebar started (refresh every {}s)",
            self.settings.refresh_interval_secs
        );

        // Main loop
        let result = self.main_loop(&mut terminal, &mut deliveries).await;

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        deliveries: &mut DeliveryReceiver,
    ) -> Result<()> {
        loop {
            // Check if we should quit
            {
                let state = self.state.read();
                if !state.running {
                    break;
                }
            }

            // Draw UI
            terminal.draw(|frame| {
                let state = self.state.read();
                let color = self.settings.ui.color;
                let areas = self.layout.calculate(frame.area());

                TitleBar::render(frame, areas.title, &state, color);
                UsagePanel::render(frame, areas.menu, &state, color);
                if let Some(status_area) = areas.status_bar {
                    StatusBar::render(frame, status_area, &state, color);
                }

                if state.show_help {
                    let popup_area = self.layout.popup_area(frame.area(), 60, 50);
                    HelpPopup::render(frame, popup_area, self.settings.refresh_interval_secs);
                }
            })?;

            // Tick spinner animation
            {
                let mut state = self.state.write();
                state.tick_spinner();
            }

            // Handle events with timeout
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            // Run listener callbacks queued by fetch tasks
            while let Ok(delivery) = deliveries.try_recv() {
                delivery.run();
            }

            // Scheduled refresh
            let due = {
                let state = self.state.read();
                state.next_refresh.is_some_and(|at| Instant::now() >= at)
            };
            if due {
                debug!("Scheduled refresh");
                self.refresh();
                self.schedule_next_refresh();
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let show_help = self.state.read().show_help;

        match resolve_key(code, modifiers, show_help) {
            KeyAction::None => {}
            KeyAction::Refresh => {
                debug!("Manual refresh");
                self.refresh();
            }
            KeyAction::ToggleHelp => self.state.write().toggle_help(),
            KeyAction::CloseHelp => self.state.write().show_help = false,
            KeyAction::Quit => self.state.write().quit(),
        }
    }

    /// Start a fetch in the background
    fn refresh(&self) {
        // The handle is not awaited; completion arrives as a delivery
        drop(self.fetcher.trigger_fetch());
    }

    fn schedule_next_refresh(&self) {
        let mut state = self.state.write();
        state.next_refresh = Some(Instant::now() + self.settings.refresh_interval());
    }
}
