//! Tricorder Bridge: a terminal host with an embedded debug console.
//!
//! The bridge owns the screen, the render loop and the input line. Its own
//! command console understands `script` (start a capture session), `eval
//! <expr>` (immediate evaluation; bare `eval` repeats the previous
//! expression), `help` and `quit`. Watch lines are re-rendered every tick
//! at a fixed anchor in the top-right corner.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};
use tracing_subscriber::EnvFilter;

use tricorder_bridge::editor::PromptEditor;
use tricorder_bridge::keyboard;
use tricorder_bridge::scrollback::{Scrollback, ScrollbackSink};
use tricorder_console::{ConsoleKey, ConsoleSession, KeyOutcome, LogSink, Style, Value};
use tricorder_script::Interp;

const HOST_PROMPT: &str = ">";
const WATCH_PANEL_WIDTH: u16 = 32;

fn main() -> Result<()> {
    // RUST_LOG=tricorder_console=debug. Goes to stderr, off by default so
    // it cannot corrupt the alternate screen.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    tracing::info!("Tricorder Bridge starting...");

    let mut app = App::new();

    terminal::enable_raw_mode()?;
    execute!(io::stdout(), terminal::EnterAlternateScreen)?;
    let result = app.run();
    execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

struct App {
    session: ConsoleSession<Interp>,
    editor: PromptEditor,
    scrollback: Rc<RefCell<Scrollback>>,
    host_history: Rc<RefCell<Vec<String>>>,
    frames: Rc<RefCell<u64>>,
}

impl App {
    fn new() -> Self {
        let scrollback = Rc::new(RefCell::new(Scrollback::default()));
        let sink: Rc<dyn LogSink> = Rc::new(ScrollbackSink(Rc::clone(&scrollback)));
        let mut session = ConsoleSession::boot(sink, Interp::boot);

        // Host functions visible to expressions and watches.
        let started = Instant::now();
        session.engine_mut().register_native(
            "uptime",
            Rc::new(move |_args| Ok(Value::Num(started.elapsed().as_secs_f64()))),
        );
        let frames = Rc::new(RefCell::new(0u64));
        let frame_counter = Rc::clone(&frames);
        session.engine_mut().register_native(
            "frames",
            Rc::new(move |_args| Ok(Value::Num(*frame_counter.borrow() as f64))),
        );

        // Bare `eval` repeats the expression of the last `eval <expr>`.
        let host_history = Rc::new(RefCell::new(Vec::<String>::new()));
        let recall_source = Rc::clone(&host_history);
        session.set_recall_provider(Box::new(move || {
            recall_source
                .borrow()
                .iter()
                .rev()
                .find_map(|cmd| cmd.strip_prefix("eval ").map(|rest| rest.trim().to_string()))
                .filter(|rest| !rest.is_empty())
        }));

        Self {
            session,
            editor: PromptEditor::new(),
            scrollback,
            host_history,
            frames,
        }
    }

    fn run(&mut self) -> Result<()> {
        self.push("⚡ Tricorder Bridge online.", Style::Info);
        self.push("Commands: script, eval <expr>, help, quit.", Style::Info);

        loop {
            *self.frames.borrow_mut() += 1;
            self.render()?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if !self.handle_key(&key) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Returns `false` when the bridge should quit.
    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if let Some(console_key) = keyboard::map_console_key(key) {
            if self.session.handle_key(console_key, &mut self.editor) == KeyOutcome::Consumed {
                return true;
            }
            // Capture is inactive, so the same keys keep their host meaning.
            return match console_key {
                ConsoleKey::Commit => {
                    let line = self.editor.submit();
                    self.run_host_command(line.trim())
                }
                ConsoleKey::Cancel | ConsoleKey::Exit => false,
                _ => true,
            };
        }

        keyboard::apply_default_editing(key, &mut self.editor);
        true
    }

    fn run_host_command(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }
        self.push(&format!("{HOST_PROMPT} {line}"), Style::Echo);
        self.host_history.borrow_mut().push(line.to_string());

        if line == "script" {
            self.session.start_capture(&mut self.editor);
        } else if line == "eval" || line.starts_with("eval ") {
            self.session.eval_command(line["eval".len()..].trim());
        } else if line == "help" {
            self.push("script       start the interactive session", Style::Info);
            self.push("eval <expr>  evaluate once (bare eval repeats the last)", Style::Info);
            self.push("quit         leave the bridge", Style::Info);
        } else if line == "quit" || line == "exit" {
            return false;
        } else {
            self.push(
                &format!("Unknown command: {line}. Type help."),
                Style::Error,
            );
        }
        true
    }

    fn push(&self, text: &str, style: Style) {
        self.scrollback.borrow_mut().push(text, style);
    }

    fn render(&mut self) -> Result<()> {
        let mut out = io::stdout();
        let (cols, rows) = terminal::size()?;
        let rows = rows.max(3);

        queue!(out, cursor::Hide, terminal::Clear(terminal::ClearType::All))?;

        // Output area above the input row, newest lines last.
        let view_rows = (rows - 2) as usize;
        {
            let scrollback = self.scrollback.borrow();
            for (i, (text, style)) in scrollback.tail(view_rows).enumerate() {
                queue!(
                    out,
                    cursor::MoveTo(0, i as u16),
                    SetForegroundColor(color_for(*style)),
                    Print(clip(text, cols)),
                    ResetColor,
                )?;
            }
        }

        // Watch panel at its fixed anchor, one line per watch.
        let watches = self.session.watches();
        let frame = watches.borrow_mut().render_frame();
        let anchor = cols.saturating_sub(WATCH_PANEL_WIDTH);
        for (i, line) in frame.iter().enumerate() {
            let text = format!("{} = {}", line.name, line.text);
            queue!(
                out,
                cursor::MoveTo(anchor, i as u16),
                SetForegroundColor(Color::Magenta),
                Print(clip(&text, WATCH_PANEL_WIDTH)),
                ResetColor,
            )?;
        }

        // Input row with the resolved prompt.
        let prompt = self.session.resolve_prompt(HOST_PROMPT).to_string();
        let input_row = rows - 1;
        queue!(
            out,
            cursor::MoveTo(0, input_row),
            SetForegroundColor(Color::Cyan),
            Print(&prompt),
            Print(" "),
            ResetColor,
            Print(self.editor.value()),
        )?;

        let caret_col = prompt.chars().count()
            + 1
            + self.editor.value()[..self.editor.cursor()].chars().count();
        queue!(
            out,
            cursor::MoveTo(caret_col as u16, input_row),
            cursor::Show
        )?;

        out.flush()?;
        Ok(())
    }
}

fn clip(text: &str, width: u16) -> String {
    text.chars().take(width as usize).collect()
}

fn color_for(style: Style) -> Color {
    match style {
        Style::Normal => Color::White,
        Style::Echo => Color::Cyan,
        Style::Error => Color::Yellow,
        Style::Info => Color::Green,
    }
}
