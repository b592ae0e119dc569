use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use neurosync_core::{
    Button, ButtonSet, CognitiveReading, CueId, EngineConfig, Mode, MonotonicClock, PlaybackMode,
    Rgb, SharedController, SimulatedSensor, ToneScheduler, SPLASH_STEP,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Tabs},
    Frame, Terminal,
};
use std::{
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::runtime::Handle;

use crate::drivers::{splash_frames, Frame as Board, TerminalBuzzer, TerminalFrontend};

/// Knob movement per arrow key, in ADC counts
const KNOB_STEP: i32 = 128;

pub struct DashboardApp {
    engine: SharedController,
    sensor: SimulatedSensor,
    frontend: TerminalFrontend,
    scheduler: ToneScheduler<TerminalBuzzer>,
    runtime: Handle,
    mode: Mode,
    reading: Option<CognitiveReading>,
    should_quit: bool,
}

impl DashboardApp {
    pub fn new(config: &EngineConfig, sensor: SimulatedSensor, runtime: Handle) -> Self {
        Self {
            engine: SharedController::new(config, Arc::new(MonotonicClock::new())),
            sensor,
            frontend: TerminalFrontend::new(),
            scheduler: ToneScheduler::new(TerminalBuzzer::new(), config.playback),
            runtime,
            mode: Mode::Monitor,
            reading: None,
            should_quit: false,
        }
    }

    fn press(&self, button: Button, held: ButtonSet) {
        self.engine.signal_edge(button, held);
    }

    /// Blocking playback holds up the tick loop until the cue has finished;
    /// this runs on a blocking thread, so waiting on the runtime is allowed.
    fn play(&self, cue: CueId) {
        let scheduler = self.scheduler.clone();
        match scheduler.mode() {
            PlaybackMode::Blocking => self.runtime.block_on(scheduler.play_cue(cue)),
            PlaybackMode::NonBlocking => {
                self.runtime
                    .spawn(async move { scheduler.play_cue(cue).await });
            }
        }
    }

    pub fn on_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('n') => self.press(Button::Next, ButtonSet::EMPTY),
            KeyCode::Char('b') => self.press(Button::Back, ButtonSet::EMPTY),
            KeyCode::Char('s') => self.press(Button::Set, ButtonSet::EMPTY),
            KeyCode::Char('c') => self.press(Button::Set, ButtonSet::EMPTY.with(Button::Next)),
            KeyCode::Up => self.sensor.nudge(KNOB_STEP, 0),
            KeyCode::Down => self.sensor.nudge(-KNOB_STEP, 0),
            KeyCode::Right => self.sensor.nudge(0, KNOB_STEP),
            KeyCode::Left => self.sensor.nudge(0, -KNOB_STEP),
            _ => {}
        }
    }

    pub fn on_tick(&mut self) {
        let summary = self.engine.tick(&mut self.sensor, &mut self.frontend);
        self.mode = summary.mode;
        if summary.reading.is_some() {
            self.reading = summary.reading;
        }
        for cue in self.frontend.take_cues() {
            self.play(cue);
        }
    }
}

pub fn run_tui(config: EngineConfig, sensor: SimulatedSensor, runtime: Handle) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = config.tick_interval();
    let mut app = DashboardApp::new(&config, sensor, runtime);
    for frame in splash_frames() {
        terminal.draw(|f| ui(f, &app, &frame))?;
        std::thread::sleep(SPLASH_STEP);
    }
    app.play(CueId::Startup);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, &app, app.frontend.frame()))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn ui(f: &mut Frame<'_>, app: &DashboardApp, frame: &Board) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Modes
                Constraint::Length(7), // Board
                Constraint::Length(3), // Attention
                Constraint::Length(3), // Relaxation
                Constraint::Min(0),
                Constraint::Length(3), // Footer
            ]
            .as_ref(),
        )
        .split(f.size());

    // 1. Mode tabs
    let selected = Mode::ALL.iter().position(|m| *m == app.mode).unwrap_or(0);
    let tabs = Tabs::new(Mode::ALL.iter().map(|m| m.label()).collect::<Vec<_>>())
        .block(Block::default().borders(Borders::ALL).title("NeuroSync"))
        .select(selected)
        .style(Style::default().fg(Color::Cyan))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    // 2. Board: display text and matrix side by side
    let board = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(16)].as_ref())
        .split(chunks[1]);

    let indicator = color(frame.indicator);
    let text: Vec<Line<'_>> = frame
        .lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let style = if i == 0 {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(l.clone(), style))
        })
        .collect();
    let display = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Display")
            .border_style(Style::default().fg(indicator)),
    );
    f.render_widget(display, board[0]);

    let matrix: Vec<Line<'_>> = frame
        .matrix_rows()
        .into_iter()
        .map(|row| {
            Line::from(
                row.chars()
                    .map(|c| {
                        if c == '#' {
                            Span::styled("██", Style::default().fg(indicator))
                        } else {
                            Span::styled("··", Style::default().fg(Color::DarkGray))
                        }
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    let matrix = Paragraph::new(matrix).block(Block::default().borders(Borders::ALL).title("Matrix"));
    f.render_widget(matrix, board[1]);

    // 3. Signals
    let (attention, relaxation) = app
        .reading
        .map(|r| (r.attention, r.relaxation))
        .unwrap_or((0.0, 0.0));
    let (attn_knob, relax_knob) = app.sensor.knobs();

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!("Attention (knob {})", attn_knob)))
        .gauge_style(Style::default().fg(Color::Blue).bg(Color::Black))
        .percent(attention.clamp(0.0, 100.0) as u16)
        .label(format!("{:.1}%", attention));
    f.render_widget(gauge, chunks[2]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!("Relaxation (knob {})", relax_knob)))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .percent((relaxation * 10.0).clamp(0.0, 100.0) as u16)
        .label(format!("{:.1}", relaxation));
    f.render_widget(gauge, chunks[3]);

    // 4. Footer
    let tones: Vec<String> = app
        .scheduler
        .device()
        .active()
        .iter()
        .map(|(b, hz)| format!("{:?} {} Hz", b, hz))
        .collect();
    let footer = format!(
        "n/b/s buttons | c SET+NEXT | arrows knobs | q quit | last cue: {} | {} notes | {}",
        app.frontend
            .last_cue()
            .map(|c| format!("{:?}", c))
            .unwrap_or_else(|| "-".to_string()),
        app.scheduler.device().finished(),
        if tones.is_empty() { "silent".to_string() } else { tones.join(", ") }
    );
    let footer = Paragraph::new(footer)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));
    f.render_widget(footer, chunks[5]);
}
