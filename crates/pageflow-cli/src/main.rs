use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use pageflow_config::Config;
use pageflow_engine::registry::tags;
use pageflow_engine::{Bias, Command, Editor, LineAddress, ModelNode, Motion, PageSpec, Registry};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{env, fs, io::stdout, path::PathBuf, process};

enum Flow {
    Continue,
    Quit,
}

struct App {
    path: PathBuf,
    editor: Editor,
    status: String,
    dirty: bool,
}

impl App {
    fn new(path: PathBuf, page: PageSpec) -> Result<Self> {
        let content = if path.exists() {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };
        let mut editor = Editor::new(Registry::with_defaults(page), build_model(&content))?;
        editor.focus();
        Ok(Self {
            path,
            editor,
            status: String::new(),
            dirty: false,
        })
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Flow> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        let motion = match key.code {
            KeyCode::Left if ctrl => Some(Motion::WordBackward),
            KeyCode::Right if ctrl => Some(Motion::WordForward),
            KeyCode::Left => Some(Motion::Backward),
            KeyCode::Right => Some(Motion::Forward),
            KeyCode::Up => Some(Motion::Up),
            KeyCode::Down => Some(Motion::Down),
            KeyCode::Home if ctrl => Some(Motion::DocumentStart),
            KeyCode::End if ctrl => Some(Motion::DocumentEnd),
            KeyCode::Home => Some(Motion::LineStart),
            KeyCode::End => Some(Motion::LineEnd),
            _ => None,
        };
        if let Some(motion) = motion {
            let command = if shift {
                Command::Extend(motion)
            } else {
                Command::Move(motion)
            };
            self.editor.execute(&command)?;
            return Ok(Flow::Continue);
        }

        match key.code {
            KeyCode::Char('q') if ctrl => return Ok(Flow::Quit),
            KeyCode::Char('a') if ctrl => {
                self.editor.execute(&Command::SelectAll)?;
            }
            KeyCode::Char('s') if ctrl => self.save()?,
            KeyCode::Char(ch) if !ctrl => {
                self.editor.execute(&Command::InsertText(ch.to_string()))?;
                self.dirty = true;
            }
            KeyCode::Backspace => {
                let patch = self.editor.execute(&Command::DeleteBackward)?;
                self.dirty |= patch.edited;
            }
            KeyCode::Delete => {
                let patch = self.editor.execute(&Command::DeleteForward)?;
                self.dirty |= patch.edited;
            }
            KeyCode::Enter => {
                self.editor.execute(&Command::SplitBlock)?;
                self.dirty = true;
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn save(&mut self) -> Result<()> {
        fs::write(&self.path, self.document_text())?;
        self.dirty = false;
        self.status = format!("saved {}", self.path.display());
        Ok(())
    }

    /// Flatten the model back to plain text, one block per line.
    fn document_text(&self) -> String {
        let blocks = self.editor.model().children().unwrap_or(&[]);
        let mut text = String::new();
        for (index, block) in blocks.iter().enumerate() {
            if index > 0 {
                text.push('\n');
            }
            for child in block.children().unwrap_or(&[]) {
                match child.text() {
                    Some(leaf) => text.push_str(leaf),
                    None => {
                        for leaf in child.children().unwrap_or(&[]) {
                            text.push_str(leaf.text().unwrap_or_default());
                        }
                    }
                }
            }
        }
        text
    }
}

fn build_model(content: &str) -> ModelNode {
    let mut blocks: Vec<ModelNode> = content
        .lines()
        .map(|line| {
            let children = if line.is_empty() {
                Vec::new()
            } else {
                vec![ModelNode::leaf(tags::TEXT, line)]
            };
            ModelNode::branch(tags::PARAGRAPH, children)
        })
        .collect();
    if blocks.is_empty() {
        blocks.push(ModelNode::branch(tags::PARAGRAPH, Vec::new()));
    }
    ModelNode::branch(tags::DOCUMENT, blocks)
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file>", args[0]);
        process::exit(1);
    }
    let path = PathBuf::from(&args[1]);

    let page = match Config::load() {
        Ok(Some(config)) => config.page,
        Ok(None) => PageSpec::default(),
        Err(e) => {
            eprintln!("Error: failed to load config file: {e}");
            process::exit(1);
        }
    };

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(path, page)?;
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind != KeyEventKind::Release
        {
            match app.handle_key(key)? {
                Flow::Quit => return Ok(()),
                Flow::Continue => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let layout = app.editor.layout();
    let spec = layout.page_spec();
    let cursor = app.editor.cursor();
    let head = cursor.map(|c| c.head);
    let selection = cursor.map(|c| (c.start(), c.end()));

    // Show the page the cursor is on.
    let page_index = head
        .and_then(|offset| layout.locate_box(offset, Bias::Forward).ok())
        .map_or(0, |(address, _)| address.page);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let mut rows: Vec<Line> = Vec::new();
    for _ in 0..spec.padding_top as usize {
        rows.push(Line::default());
    }
    if let Some(page) = layout.pages().get(page_index) {
        for (line_index, line) in page.lines().iter().enumerate() {
            let address = LineAddress {
                page: page_index,
                line: line_index,
            };
            let mut offset = layout.line_start_offset(address).unwrap_or(0);
            let mut spans = vec![Span::raw(" ".repeat(spec.padding_left as usize))];
            for word in line.boxes() {
                if word.is_break {
                    spans.push(cell(' ', offset, selection, head));
                    offset += 1;
                    continue;
                }
                for ch in word.text.chars() {
                    spans.push(cell(ch, offset, selection, head));
                    offset += 1;
                }
            }
            rows.push(Line::from(spans));
        }
    }

    let title = format!(
        " {} - page {}/{} ",
        app.path.display(),
        page_index + 1,
        layout.pages().len()
    );
    let page_view = Paragraph::new(rows).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(page_view, chunks[0]);

    let position = head.map_or(String::new(), |offset| format!("offset {offset}"));
    let status = format!(
        "{}{} | {} | v{} | Ctrl+S save, Ctrl+Q quit",
        if app.dirty { "* " } else { "" },
        position,
        app.status,
        app.editor.version()
    );
    f.render_widget(Paragraph::new(Line::from(status)), chunks[1]);
}

fn cell(
    ch: char,
    offset: usize,
    selection: Option<(usize, usize)>,
    head: Option<usize>,
) -> Span<'static> {
    let mut style = Style::default();
    if let Some((start, end)) = selection
        && offset >= start
        && offset < end
    {
        style = style.bg(Color::Blue).fg(Color::White);
    }
    if head == Some(offset) {
        style = style.bg(Color::Yellow).fg(Color::Black);
    }
    Span::styled(ch.to_string(), style)
}
