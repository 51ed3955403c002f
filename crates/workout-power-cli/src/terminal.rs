//! Terminal presentation: a full-screen view on a TTY, plain lines
//! otherwise.

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event as TermEvent, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers,
};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::tty::IsTty;
use crossterm::{execute, queue};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use workout_power_core::celebration::{Canvas, NullCanvas, Shape, Sprite};
use workout_power_core::{
    format_clock, CompletionReport, Event, Input, Phase, Point, Presenter, TimerView, Viewport,
};

/// Viewport pixels per character cell.
pub const CELL_WIDTH: f32 = 8.0;
pub const CELL_HEIGHT: f32 = 16.0;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const BAR_WIDTH: usize = 40;
const MIN_OPACITY: f32 = 0.08;
const COMPLETION_TITLE: &str = "Workout complete";

pub fn is_interactive() -> bool {
    io::stdin().is_tty() && io::stdout().is_tty()
}

pub fn viewport_for(cols: u16, rows: u16) -> Viewport {
    Viewport::new(f32::from(cols) * CELL_WIDTH, f32::from(rows) * CELL_HEIGHT)
}

pub fn map_key(key: KeyEvent) -> Option<Input> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('p') => Some(Input::TogglePause),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Input::Back),
        KeyCode::Char('q') | KeyCode::Esc => Some(Input::Back),
        _ => None,
    }
}

pub fn summary(report: &CompletionReport) -> String {
    format!(
        "Workout complete: {} ({} exercises, {})",
        report.workout,
        report.exercise_count,
        format_clock(report.estimated_total_secs)
    )
}

pub fn print_events(events: &[Event]) {
    let mut out = io::stdout().lock();
    for event in events {
        match serde_json::to_string(event) {
            Ok(line) => {
                if writeln!(out, "{line}").is_err() {
                    return;
                }
            }
            Err(e) => tracing::debug!(error = %e, "event not serializable"),
        }
    }
}

/// First row of a block of `lines` centered vertically in `rows`.
fn text_top(rows: usize, lines: usize) -> usize {
    rows.saturating_sub(lines) / 2
}

fn completion_lines(report: &CompletionReport, accent: Color) -> Vec<Line> {
    vec![
        Line::colored(COMPLETION_TITLE, accent),
        Line::plain(&report.workout),
        Line::plain(format!(
            "{} exercises in {}",
            report.exercise_count,
            format_clock(report.estimated_total_secs)
        )),
        Line::plain(""),
        Line::colored("q back", Color::DarkGrey),
    ]
}

/// Pixel center of the completion title, where confetti bursts from.
pub fn completion_anchor(viewport: Viewport) -> Point {
    let cols = (viewport.width / CELL_WIDTH) as usize;
    let rows = (viewport.height / CELL_HEIGHT) as usize;
    let line_count = completion_lines(&CompletionReport::default(), Color::Reset).len();
    let row = text_top(rows, line_count);
    let title = COMPLETION_TITLE.chars().count();
    let col = cols.saturating_sub(title) / 2;
    Point::new(
        (col as f32 + title as f32 / 2.0) * CELL_WIDTH,
        (row as f32 + 0.5) * CELL_HEIGHT,
    )
}

fn progress_bar(progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

// ── Input ───────────────────────────────────────────────────────────

/// Blocking key reader feeding the driver's input channel.
pub struct InputReader {
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl InputReader {
    pub fn spawn(tx: mpsc::Sender<Input>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let task = tokio::task::spawn_blocking(move || read_inputs(&tx, &flag));
        Self { stop, task }
    }

    pub async fn shutdown(self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Err(e) = self.task.await {
            tracing::debug!(error = %e, "input reader ended abnormally");
        }
    }
}

fn read_inputs(tx: &mpsc::Sender<Input>, stop: &AtomicBool) {
    while !stop.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "input poll failed");
                return;
            }
        }
        let input = match event::read() {
            Ok(TermEvent::Key(key)) => map_key(key),
            Ok(TermEvent::Resize(cols, rows)) => Some(Input::Resize(viewport_for(cols, rows))),
            Ok(TermEvent::FocusGained) => Some(Input::Visibility(true)),
            Ok(TermEvent::FocusLost) => Some(Input::Visibility(false)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "input read failed");
                return;
            }
        };
        if let Some(input) = input {
            if tx.blocking_send(input).is_err() {
                return;
            }
        }
    }
}

// ── Full screen ─────────────────────────────────────────────────────

struct Line {
    text: String,
    color: Option<Color>,
}

impl Line {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    fn colored(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    glyph: char,
    color: Color,
}

/// Alternate-screen view. Text is centered; particles are rasterized onto
/// the blank cells around it.
///
/// Raw mode and the alternate screen are left when the screen is dropped.
pub struct Screen {
    out: Stdout,
    cols: u16,
    rows: u16,
    accent: Color,
    lines: Vec<Line>,
    particles: Vec<Option<Cell>>,
    record_events: bool,
    events: Vec<Event>,
}

impl Screen {
    pub fn enter(accent: (u8, u8, u8), record_events: bool) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        enable_raw_mode()?;
        let mut screen = Self {
            out: io::stdout(),
            cols,
            rows,
            accent: Color::Rgb {
                r: accent.0,
                g: accent.1,
                b: accent.2,
            },
            lines: Vec::new(),
            particles: vec![None; usize::from(cols) * usize::from(rows)],
            record_events,
            events: Vec::new(),
        };
        execute!(
            screen.out,
            EnterAlternateScreen,
            EnableFocusChange,
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(screen)
    }

    pub fn viewport(&self) -> Viewport {
        viewport_for(self.cols, self.rows)
    }

    pub fn set_banner(&mut self, lines: &[&str]) {
        self.lines = lines.iter().map(|l| Line::plain(*l)).collect();
        self.repaint();
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        if (cols, rows) != (self.cols, self.rows) {
            self.cols = cols;
            self.rows = rows;
            self.particles = vec![None; usize::from(cols) * usize::from(rows)];
        }
    }

    fn repaint(&mut self) {
        if let Err(e) = self.paint() {
            tracing::debug!(error = %e, "paint failed");
        }
    }

    fn paint(&mut self) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        self.resize(cols, rows);
        let cols = usize::from(cols);
        let rows = usize::from(rows);
        let top = text_top(rows, self.lines.len());

        for row in 0..rows {
            // Writing the bottom-right cell scrolls some terminals.
            let width = if row + 1 == rows { cols.saturating_sub(1) } else { cols };
            let line = row.checked_sub(top).and_then(|i| self.lines.get(i));
            let text = line.map(|l| centered(&l.text, cols)).unwrap_or_default();

            queue!(self.out, MoveTo(0, row as u16))?;
            let mut current: Option<Color> = None;
            let mut run = String::new();
            for col in 0..width {
                let ch = text.get(col).copied().unwrap_or(' ');
                let (glyph, color) = match (ch, self.particles[row * cols + col]) {
                    (' ', Some(cell)) => (cell.glyph, cell.color),
                    (ch, _) => (ch, line.and_then(|l| l.color).unwrap_or(Color::Reset)),
                };
                if current != Some(color) {
                    if !run.is_empty() {
                        queue!(self.out, Print(&run))?;
                        run.clear();
                    }
                    queue!(self.out, SetForegroundColor(color))?;
                    current = Some(color);
                }
                run.push(glyph);
            }
            queue!(self.out, Print(run))?;
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }
}

fn centered(text: &str, cols: usize) -> Vec<char> {
    let chars: Vec<char> = text.chars().collect();
    let pad = cols.saturating_sub(chars.len()) / 2;
    std::iter::repeat(' ')
        .take(pad)
        .chain(chars)
        .take(cols)
        .collect()
}

fn glyph(sprite: &Sprite) -> char {
    match sprite.shape {
        Shape::Rect => match (sprite.rotation_deg.rem_euclid(180.0) / 45.0) as u8 {
            0 => '■',
            1 => '◆',
            2 => '▪',
            _ => '◆',
        },
        Shape::Dot if sprite.opacity > 0.5 => '•',
        Shape::Dot => '·',
        Shape::Glow if sprite.width > 24.0 => '✺',
        Shape::Glow => '*',
    }
}

fn dim(channel: u8, opacity: f32) -> u8 {
    (f32::from(channel) * (0.35 + 0.65 * opacity.clamp(0.0, 1.0))) as u8
}

impl Canvas for Screen {
    fn begin_frame(&mut self, _viewport: Viewport) {
        self.particles.iter_mut().for_each(|cell| *cell = None);
    }

    fn draw(&mut self, sprite: &Sprite) {
        if sprite.opacity < MIN_OPACITY {
            return;
        }
        let col = (sprite.center.x / CELL_WIDTH).floor();
        let row = (sprite.center.y / CELL_HEIGHT).floor();
        if col < 0.0 || row < 0.0 || col >= f32::from(self.cols) || row >= f32::from(self.rows) {
            return;
        }
        let index = row as usize * usize::from(self.cols) + col as usize;
        self.particles[index] = Some(Cell {
            glyph: glyph(sprite),
            color: Color::Rgb {
                r: dim(sprite.color.r, sprite.opacity),
                g: dim(sprite.color.g, sprite.opacity),
                b: dim(sprite.color.b, sprite.opacity),
            },
        });
    }

    fn end_frame(&mut self) {
        self.repaint();
    }
}

impl Presenter for Screen {
    fn render_timer(&mut self, view: &TimerView) {
        let mut label = view.phase_label.clone();
        if view.paused {
            label.push_str(" (paused)");
        }
        let mut lines = vec![
            Line::colored(label, self.accent),
            Line::plain(&view.title),
            Line::plain(""),
            Line::plain(&view.remaining_text),
            Line::plain(""),
            Line::colored(progress_bar(view.progress), self.accent),
            Line::plain(format!("{}  {}%", view.progress_text, view.progress_percent)),
            Line::plain(""),
        ];
        if !view.next_up.is_empty() {
            lines.push(Line::plain(format!("Next: {}", view.next_up.join(" | "))));
        }
        lines.push(Line::plain(format!(
            "{}   {}",
            view.estimated_total_text, view.wake_lock
        )));
        lines.push(Line::plain(""));
        lines.push(Line::colored("space pause   q back", Color::DarkGrey));
        self.lines = lines;
        self.repaint();
    }

    fn render_completion(&mut self, report: &CompletionReport) {
        self.lines = completion_lines(report, self.accent);
        self.repaint();
    }

    fn canvas(&mut self) -> &mut dyn Canvas {
        self
    }

    fn on_events(&mut self, events: &[Event]) {
        if self.record_events {
            self.events.extend_from_slice(events);
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            ResetColor,
            Show,
            DisableFocusChange,
            LeaveAlternateScreen
        );
        let _ = disable_raw_mode();
    }
}

// ── Plain output ────────────────────────────────────────────────────

/// One line per visible change, for pipes and dumb terminals.
///
/// With `json_events` only the event stream is printed.
pub struct PlainPresenter {
    json_events: bool,
    last: Option<(Phase, String, bool)>,
    canvas: NullCanvas,
}

impl PlainPresenter {
    pub fn new(json_events: bool) -> Self {
        Self {
            json_events,
            last: None,
            canvas: NullCanvas,
        }
    }

    fn emit(&self, line: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }
}

impl Presenter for PlainPresenter {
    fn render_timer(&mut self, view: &TimerView) {
        if self.json_events {
            return;
        }
        let key = (view.phase, view.remaining_text.clone(), view.paused);
        if self.last.as_ref() == Some(&key) {
            return;
        }
        let paused = if view.paused { "  paused" } else { "" };
        self.emit(&format!(
            "{:<9} {:<24} {:>5}  {}{paused}",
            view.phase_label, view.title, view.remaining_text, view.progress_text
        ));
        self.last = Some(key);
    }

    fn render_completion(&mut self, report: &CompletionReport) {
        if !self.json_events {
            self.emit(&summary(report));
        }
    }

    fn canvas(&mut self) -> &mut dyn Canvas {
        &mut self.canvas
    }

    fn on_events(&mut self, events: &[Event]) {
        if self.json_events {
            print_events(events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_inputs() {
        assert_eq!(map_key(key(KeyCode::Char(' '))), Some(Input::TogglePause));
        assert_eq!(map_key(key(KeyCode::Enter)), Some(Input::TogglePause));
        assert_eq!(map_key(key(KeyCode::Char('p'))), Some(Input::TogglePause));
        assert_eq!(map_key(key(KeyCode::Char('q'))), Some(Input::Back));
        assert_eq!(map_key(key(KeyCode::Esc)), Some(Input::Back));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Input::Back)
        );
        assert_eq!(map_key(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn cells_are_eight_by_sixteen_pixels() {
        let vp = viewport_for(80, 24);
        assert_eq!(vp.width, 640.0);
        assert_eq!(vp.height, 384.0);
    }

    #[test]
    fn completion_anchor_sits_on_the_title() {
        // 80x24: the five completion lines start at row 9, the title at column 32.
        let anchor = completion_anchor(viewport_for(80, 24));
        assert_eq!(anchor, Point::new(320.0, 152.0));

        let lines = completion_lines(&CompletionReport::default(), Color::Reset);
        assert_eq!(lines[0].text, COMPLETION_TITLE);
        let title = centered(&lines[0].text, 80);
        assert_eq!((anchor.x / CELL_WIDTH) as usize, title.len() - COMPLETION_TITLE.len() / 2);
    }

    #[test]
    fn centered_pads_and_truncates() {
        let line: String = centered("Work", 10).into_iter().collect();
        assert_eq!(line, "   Work");
        assert_eq!(centered("abcdef", 3), vec!['a', 'b', 'c']);
    }

    #[test]
    fn progress_bar_is_fixed_width() {
        assert_eq!(progress_bar(0.0).chars().count(), BAR_WIDTH);
        assert_eq!(progress_bar(1.5).chars().filter(|c| *c == '█').count(), BAR_WIDTH);
        assert_eq!(progress_bar(0.5).chars().filter(|c| *c == '█').count(), BAR_WIDTH / 2);
    }
}
