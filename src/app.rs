use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame, Terminal,
};

use crate::config::Config;
use crate::daily::daily_forecast;
use crate::fetcher::{FetchMessage, Fetcher, Selection};
use crate::icons::Icon;
use crate::units::temperature;
use crate::weather::{DailyForecast, Location, Snapshot, Units};

const MISSING: &str = "--";
const TICK: Duration = Duration::from_millis(250);
/// A selection must stand this long before its requests go out, so a held
/// arrow key does not fire a pair of requests per city passed.
const SETTLE: Duration = Duration::from_millis(300);

const DAY_TOP: Color = Color::Blue;
const DAY_BOTTOM: Color = Color::Rgb(173, 216, 230);
const NIGHT_TOP: Color = Color::Black;
const NIGHT_BOTTOM: Color = Color::DarkGray;

pub struct App {
    cities: Vec<Location>,
    selection: Selection,
    snapshot: Snapshot,
    night: bool,
    units: Units,
    refresh_every: Option<Duration>,
    last_request: Instant,
    pending: bool,
    fetcher: Fetcher,
    tx: Sender<FetchMessage>,
    rx: Receiver<FetchMessage>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config, fetcher: Fetcher) -> Result<Self> {
        let city = config.start_city();
        let location = config
            .cities
            .get(city)
            .cloned()
            .context("No cities configured")?;
        let refresh_every = match config.ui.refresh_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(u64::from(minutes) * 60)),
        };
        let (tx, rx) = mpsc::channel();

        Ok(Self {
            cities: config.cities.clone(),
            selection: Selection {
                generation: 0,
                city,
            },
            snapshot: Snapshot::empty(location),
            night: config.ui.night,
            units: config.ui.units,
            refresh_every,
            last_request: Instant::now(),
            pending: false,
            fetcher,
            tx,
            rx,
            should_quit: false,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Makes `city` current and mints a fresh tag for its requests. Values
    /// already on screen stay until the new responses replace them.
    fn begin_selection(&mut self, city: usize) -> Selection {
        self.selection = Selection {
            generation: self.selection.generation + 1,
            city,
        };
        self.snapshot = self.snapshot.relocated(self.cities[city].clone());
        self.last_request = Instant::now();
        self.selection
    }

    /// Switches to `city`. Its requests go out once the selection settles.
    pub fn select(&mut self, city: usize) {
        if city >= self.cities.len() {
            return;
        }
        self.begin_selection(city);
        self.pending = true;
    }

    fn dispatch(&mut self) {
        self.pending = false;
        let selection = self.selection;
        self.fetcher.request(selection, &self.cities[selection.city], &self.tx);
    }

    /// Sends the requests for a selection that has stood for [`SETTLE`].
    /// Selections superseded before then never reach the network.
    fn dispatch_settled(&mut self) -> bool {
        if !self.pending || self.last_request.elapsed() < SETTLE {
            return false;
        }
        self.dispatch();
        true
    }

    pub fn refresh(&mut self) {
        self.select(self.selection.city);
    }

    pub fn next_city(&mut self) {
        self.select((self.selection.city + 1) % self.cities.len());
    }

    pub fn previous_city(&mut self) {
        let len = self.cities.len();
        self.select((self.selection.city + len - 1) % len);
    }

    /// Folds one response into the snapshot. Failed and stale responses
    /// leave it untouched.
    pub fn apply(&mut self, message: FetchMessage) {
        if message.selection() != self.selection {
            tracing::debug!(
                stale = message.selection().generation,
                current = self.selection.generation,
                "discarding stale response"
            );
            return;
        }
        match message {
            FetchMessage::Current {
                result: Ok(current),
                ..
            } => {
                self.snapshot = self.snapshot.with_current(current);
            }
            FetchMessage::Forecast {
                result: Ok(samples),
                ..
            } => {
                let daily = daily_forecast(&samples, &Local);
                tracing::debug!(
                    samples = samples.len(),
                    days = daily.len(),
                    "forecast reduced"
                );
                self.snapshot = self.snapshot.with_daily(daily);
            }
            FetchMessage::Current { result: Err(_), .. }
            | FetchMessage::Forecast { result: Err(_), .. } => {}
        }
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Right | KeyCode::Char('l') => self.next_city(),
            KeyCode::Left | KeyCode::Char('h') => self.previous_city(),
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(digit) = c.to_digit(10) {
                    self.select(digit as usize - 1);
                }
            }
            KeyCode::Char('n') | KeyCode::Char(' ') => self.night = !self.night,
            KeyCode::Char('u') => self.units = self.units.toggle(),
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
    }

    fn refresh_due(&self) -> bool {
        !self.pending
            && self
                .refresh_every
                .is_some_and(|every| self.last_request.elapsed() >= every)
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    app.refresh();
    app.dispatch();
    loop {
        app.dispatch_settled();
        app.drain_messages();
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }
        if app.should_quit {
            return Ok(());
        }

        if app.refresh_due() {
            tracing::debug!("periodic refresh");
            app.refresh();
        }
    }
}

fn text_style() -> Style {
    Style::default().fg(Color::White)
}

fn display_city(app: &App) -> Paragraph<'_> {
    Paragraph::new(vec![
        Line::from(Span::styled(
            app.snapshot().location.name.clone(),
            text_style().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("‹ {}/{} ›", app.selection().city + 1, app.cities.len()),
            text_style(),
        )),
    ])
    .alignment(Alignment::Center)
}

fn display_current(app: &App) -> Paragraph<'_> {
    let (glyph, name, temp) = match &app.snapshot().current {
        Some(current) => {
            let icon = Icon::from_code(&current.icon);
            let icon = if app.night { icon.night() } else { icon };
            (
                icon.glyph(),
                icon.name(),
                temperature::display(current.temperature, app.units),
            )
        }
        None => (MISSING, "", MISSING.to_string()),
    };
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(glyph, text_style())),
        Line::from(Span::styled(name, text_style().add_modifier(Modifier::DIM))),
        Line::from(Span::styled(
            temp,
            text_style().add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
}

fn display_day(day: &DailyForecast, units: Units) -> Paragraph<'_> {
    let icon = Icon::from_code(&day.sample.icon);
    Paragraph::new(vec![
        Line::from(Span::styled(day.weekday(), text_style())),
        Line::from(Span::styled(icon.glyph(), text_style())),
        Line::from(Span::styled(
            temperature::display(day.sample.temperature, units),
            text_style().add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
}

fn render_forecast(f: &mut Frame, app: &App, area: Rect) {
    let days = &app.snapshot.daily;
    if days.is_empty() {
        let placeholder = Paragraph::new(Span::styled(MISSING, text_style()))
            .alignment(Alignment::Center);
        f.render_widget(placeholder, area);
        return;
    }

    let count = days.len() as u32;
    let tiles = Layout::horizontal(days.iter().map(|_| Constraint::Ratio(1, count))).split(area);
    for (day, tile) in days.iter().zip(tiles.iter()) {
        f.render_widget(display_day(day, app.units), *tile);
    }
}

fn display_help(app: &App) -> Paragraph<'_> {
    let mode = if app.night { "day" } else { "night" };
    let units = match app.units {
        Units::Metric => "°F",
        Units::Imperial => "°C",
    };
    Paragraph::new(Span::styled(
        format!(" ←/→ city   n {mode}   u {units}   r refresh   q quit"),
        text_style(),
    ))
    .alignment(Alignment::Center)
}

fn ui(f: &mut Frame, app: &App) {
    let area = f.area();
    let (top, bottom) = if app.night {
        (NIGHT_TOP, NIGHT_BOTTOM)
    } else {
        (DAY_TOP, DAY_BOTTOM)
    };

    let halves =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    f.render_widget(Block::default().style(Style::default().bg(top)), halves[0]);
    f.render_widget(Block::default().style(Style::default().bg(bottom)), halves[1]);

    let rows = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    f.render_widget(display_city(app), rows[0]);
    f.render_widget(display_current(app), rows[1]);
    render_forecast(f, app, rows[3]);
    f.render_widget(display_help(app), rows[4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owm::{Endpoint, FetchError};
    use crate::weather::{CurrentWeather, ForecastSample};
    use ratatui::backend::TestBackend;
    use reqwest::StatusCode;

    // 2024-06-04T12:00:00Z
    const NOON: i64 = 1_717_502_400;
    const DAY: i64 = 24 * 3600;

    fn test_app() -> App {
        // nothing listens on the discard port; any request fails fast
        let fetcher = Fetcher::new(Endpoint::new("http://127.0.0.1:9", "test")).unwrap();
        App::new(&Config::default(), fetcher).unwrap()
    }

    fn current(temperature: f64, icon: &str) -> CurrentWeather {
        CurrentWeather {
            temperature,
            icon: icon.to_string(),
        }
    }

    fn daily_samples(days: i64) -> Vec<ForecastSample> {
        (0..days)
            .map(|d| ForecastSample {
                timestamp: NOON + d * DAY,
                temperature: 20.0 + d as f64,
                icon: "09d".to_string(),
            })
            .collect()
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_starts_on_configured_city() {
        let mut config = Config::default();
        config.ui.default_city = Some("Bengaluru".to_string());
        config.ui.night = true;
        let fetcher = Fetcher::new(Endpoint::new("http://127.0.0.1:9", "test")).unwrap();
        let app = App::new(&config, fetcher).unwrap();
        assert_eq!(app.selection().city, 3);
        assert_eq!(app.snapshot().location.name, "Bengaluru");
        assert!(app.night);
    }

    #[test]
    fn test_no_cities_is_an_error() {
        let mut config = Config::default();
        config.cities.clear();
        let fetcher = Fetcher::new(Endpoint::new("http://127.0.0.1:9", "test")).unwrap();
        assert!(App::new(&config, fetcher).is_err());
    }

    #[test]
    fn test_applies_current_and_forecast() {
        let mut app = test_app();
        let selection = app.begin_selection(1);

        app.apply(FetchMessage::Current {
            selection,
            result: Ok(current(29.5, "01d")),
        });
        app.apply(FetchMessage::Forecast {
            selection,
            result: Ok(daily_samples(4)),
        });

        assert_eq!(app.snapshot().location.name, "New Delhi");
        assert_eq!(app.snapshot().current, Some(current(29.5, "01d")));
        assert_eq!(app.snapshot().daily.len(), 3);
    }

    #[test]
    fn test_failure_keeps_previous_values() {
        let mut app = test_app();
        let selection = app.begin_selection(0);
        app.apply(FetchMessage::Current {
            selection,
            result: Ok(current(31.0, "10d")),
        });
        app.apply(FetchMessage::Forecast {
            selection,
            result: Ok(daily_samples(3)),
        });
        let before = app.snapshot().clone();

        let selection = app.begin_selection(0);
        app.apply(FetchMessage::Current {
            selection,
            result: Err(FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)),
        });
        app.apply(FetchMessage::Forecast {
            selection,
            result: Err(FetchError::Status(StatusCode::UNAUTHORIZED)),
        });

        assert_eq!(app.snapshot(), &before);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut app = test_app();
        let stale = app.begin_selection(0);
        let fresh = app.begin_selection(2);

        app.apply(FetchMessage::Current {
            selection: fresh,
            result: Ok(current(27.0, "02d")),
        });
        app.apply(FetchMessage::Current {
            selection: stale,
            result: Ok(current(35.0, "01d")),
        });
        app.apply(FetchMessage::Forecast {
            selection: stale,
            result: Ok(daily_samples(6)),
        });

        assert_eq!(app.snapshot().location.name, "Mumbai");
        assert_eq!(app.snapshot().current, Some(current(27.0, "02d")));
        assert!(app.snapshot().daily.is_empty());
    }

    #[test]
    fn test_new_forecast_replaces_old() {
        let mut app = test_app();
        let selection = app.begin_selection(0);
        app.apply(FetchMessage::Forecast {
            selection,
            result: Ok(daily_samples(6)),
        });
        assert_eq!(app.snapshot().daily.len(), 5);

        let selection = app.begin_selection(1);
        app.apply(FetchMessage::Forecast {
            selection,
            result: Ok(daily_samples(2)),
        });
        assert_eq!(app.snapshot().daily.len(), 1);
    }

    #[test]
    fn test_keys() {
        let mut app = test_app();
        app.handle_key(KeyCode::Char('n'));
        assert!(app.night);
        app.handle_key(KeyCode::Char(' '));
        assert!(!app.night);

        app.handle_key(KeyCode::Char('u'));
        assert_eq!(app.units, Units::Imperial);

        let generation = app.selection().generation;
        app.handle_key(KeyCode::Left);
        assert_eq!(app.selection().city, 3);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.selection().city, 0);
        app.handle_key(KeyCode::Char('3'));
        assert_eq!(app.selection().city, 2);
        app.handle_key(KeyCode::Char('9'));
        assert_eq!(app.selection().city, 2);
        assert_eq!(app.selection().generation, generation + 3);

        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    fn settled(app: &mut App) {
        if let Some(earlier) = Instant::now().checked_sub(SETTLE) {
            app.last_request = earlier;
        }
    }

    #[test]
    fn test_rapid_selections_send_only_the_last() {
        let mut app = test_app();
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Right);
        assert!(app.pending);
        assert!(!app.dispatch_settled());

        settled(&mut app);
        assert_eq!(app.selection().city, 3);
        assert!(app.dispatch_settled());
        assert!(!app.pending);
        assert!(!app.dispatch_settled());
    }

    #[test]
    fn test_refresh_due() {
        let mut app = test_app();
        app.refresh_every = None;
        assert!(!app.refresh_due());

        app.refresh_every = Some(Duration::ZERO);
        assert!(app.refresh_due());

        app.refresh_every = Some(Duration::from_secs(3600));
        assert!(!app.refresh_due());

        // a selection still waiting to settle is not refreshed over
        app.refresh_every = Some(Duration::ZERO);
        app.refresh();
        assert!(!app.refresh_due());
    }

    #[test]
    fn test_zero_refresh_minutes_disables_refresh() {
        let mut config = Config::default();
        config.ui.refresh_minutes = 0;
        let fetcher = Fetcher::new(Endpoint::new("http://127.0.0.1:9", "test")).unwrap();
        let app = App::new(&config, fetcher).unwrap();
        assert_eq!(app.refresh_every, None);
        assert!(!app.refresh_due());

        assert_eq!(test_app().refresh_every, Some(Duration::from_secs(15 * 60)));
    }

    #[test]
    fn test_drain_applies_queued_messages() {
        let mut app = test_app();
        let stale = app.begin_selection(0);
        let selection = app.begin_selection(1);
        app.tx
            .send(FetchMessage::Current {
                selection: stale,
                result: Ok(current(40.0, "01d")),
            })
            .unwrap();
        app.tx
            .send(FetchMessage::Current {
                selection,
                result: Ok(current(24.0, "04n")),
            })
            .unwrap();
        app.tx
            .send(FetchMessage::Forecast {
                selection,
                result: Ok(daily_samples(3)),
            })
            .unwrap();

        app.drain_messages();

        assert_eq!(app.snapshot().current, Some(current(24.0, "04n")));
        assert_eq!(app.snapshot().daily.len(), 2);
        assert!(app.rx.try_recv().is_err());
    }

    #[test]
    fn test_render_night_icon() {
        let mut app = test_app();
        let selection = app.begin_selection(0);
        app.apply(FetchMessage::Current {
            selection,
            result: Ok(current(18.0, "02d")),
        });

        let day = render(&app);
        assert!(day.contains("cloud.sun.fill"));

        app.handle_key(KeyCode::Char('n'));
        let night = render(&app);
        assert!(night.contains("cloud.moon.fill"));
        assert!(!night.contains("cloud.sun.fill"));
    }

    #[test]
    fn test_render_placeholders() {
        let app = test_app();
        let screen = render(&app);
        assert!(screen.contains("Muzaffarpur"));
        assert!(screen.contains(MISSING));
    }

    #[test]
    fn test_render_weather() {
        let mut app = test_app();
        let selection = app.begin_selection(0);
        app.apply(FetchMessage::Current {
            selection,
            result: Ok(current(31.2, "09d")),
        });
        app.apply(FetchMessage::Forecast {
            selection,
            result: Ok(daily_samples(3)),
        });

        let screen = render(&app);
        assert!(screen.contains("cloud.rain.fill"));
        assert!(screen.contains("31°"));
        assert!(screen.contains("21°"));
        assert!(screen.contains("22°"));
    }
}
