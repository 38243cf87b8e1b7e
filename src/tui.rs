//! Terminal User Interface

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use kms_epid_gen::{ApplicationId, Epid, EpidGenerator, HOST_OS_PROFILES};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

const MAX_COUNT: u32 = 20;

#[derive(PartialEq, Eq)]
enum InputField {
    App,
    Protocol,
    Count,
    Host,
    Epid,
}

enum FocusedWidget {
    Input(InputField),
    Generate,
    Decode,
}

pub struct TuiApp {
    generator: EpidGenerator,
    app_state: ListState,
    // 0 is "random", then one entry per host profile
    host_state: ListState,
    protocol: String,
    count: String,
    epid: String,
    generated: Vec<String>,
    decoded: String,
    status_message: String,
    focused: FocusedWidget,
    should_quit: bool,
}

impl TuiApp {
    fn new(generator: EpidGenerator) -> Self {
        let mut app_state = ListState::default();
        app_state.select(Some(0));
        let mut host_state = ListState::default();
        host_state.select(Some(0));

        Self {
            generator,
            app_state,
            host_state,
            protocol: String::from("6"),
            count: String::from("1"),
            epid: String::new(),
            generated: Vec::new(),
            decoded: String::new(),
            status_message: String::new(),
            focused: FocusedWidget::Input(InputField::App),
            should_quit: false,
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('q') if !self.is_focused(InputField::Epid) => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.next_field();
            }
            KeyCode::BackTab => {
                self.prev_field();
            }
            KeyCode::Enter => {
                self.handle_enter();
            }
            KeyCode::Char(c) => {
                self.handle_char(c);
            }
            KeyCode::Backspace => {
                self.handle_backspace();
            }
            KeyCode::Up => self.move_selection(false),
            KeyCode::Down => self.move_selection(true),
            _ => {}
        }
    }

    fn is_focused(&self, field: InputField) -> bool {
        matches!(&self.focused, FocusedWidget::Input(f) if *f == field)
    }

    fn move_selection(&mut self, forward: bool) {
        match self.focused {
            FocusedWidget::Input(InputField::App) => {
                step(&mut self.app_state, ApplicationId::ALL.len(), forward)
            }
            FocusedWidget::Input(InputField::Host) => {
                step(&mut self.host_state, HOST_OS_PROFILES.len() + 1, forward)
            }
            _ => {}
        }
    }

    fn next_field(&mut self) {
        self.focused = match self.focused {
            FocusedWidget::Input(InputField::App) => FocusedWidget::Input(InputField::Protocol),
            FocusedWidget::Input(InputField::Protocol) => FocusedWidget::Input(InputField::Count),
            FocusedWidget::Input(InputField::Count) => FocusedWidget::Input(InputField::Host),
            FocusedWidget::Input(InputField::Host) => FocusedWidget::Input(InputField::Epid),
            FocusedWidget::Input(InputField::Epid) => FocusedWidget::Generate,
            FocusedWidget::Generate => FocusedWidget::Decode,
            FocusedWidget::Decode => FocusedWidget::Input(InputField::App),
        };
    }

    fn prev_field(&mut self) {
        self.focused = match self.focused {
            FocusedWidget::Input(InputField::App) => FocusedWidget::Decode,
            FocusedWidget::Input(InputField::Protocol) => FocusedWidget::Input(InputField::App),
            FocusedWidget::Input(InputField::Count) => FocusedWidget::Input(InputField::Protocol),
            FocusedWidget::Input(InputField::Host) => FocusedWidget::Input(InputField::Count),
            FocusedWidget::Input(InputField::Epid) => FocusedWidget::Input(InputField::Host),
            FocusedWidget::Generate => FocusedWidget::Input(InputField::Epid),
            FocusedWidget::Decode => FocusedWidget::Generate,
        };
    }

    fn handle_char(&mut self, c: char) {
        let digit = c.is_ascii_digit();
        let epid_char = digit || c == '-' || c == '.';
        match &self.focused {
            FocusedWidget::Input(InputField::Protocol) if digit => self.protocol.push(c),
            FocusedWidget::Input(InputField::Count) if digit => self.count.push(c),
            FocusedWidget::Input(InputField::Epid) if epid_char => self.epid.push(c),
            _ => {}
        }
    }

    fn handle_backspace(&mut self) {
        match &self.focused {
            FocusedWidget::Input(InputField::Protocol) => {
                self.protocol.pop();
            }
            FocusedWidget::Input(InputField::Count) => {
                self.count.pop();
            }
            FocusedWidget::Input(InputField::Epid) => {
                self.epid.pop();
            }
            _ => {}
        }
    }

    fn handle_enter(&mut self) {
        match self.focused {
            FocusedWidget::Generate => self.generate(),
            FocusedWidget::Decode => self.decode(),
            _ => {}
        }
    }

    fn generate(&mut self) {
        let protocol: u32 = match self.protocol.parse() {
            Ok(p) => p,
            Err(_) => {
                self.status_message = "Error: Protocol version must be a number".to_string();
                return;
            }
        };

        let count: u32 = match self.count.parse() {
            Ok(c) if (1..=MAX_COUNT).contains(&c) => c,
            _ => {
                self.status_message = format!("Error: Count must be between 1 and {}", MAX_COUNT);
                return;
            }
        };

        let app = ApplicationId::ALL[self.app_state.selected().unwrap_or(0)];
        let host = match self.host_state.selected().unwrap_or(0) {
            0 => None,
            i => HOST_OS_PROFILES.get(i - 1).map(|p| p.host),
        };

        let mut rng = rand::thread_rng();
        let mut generated = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let result = match host {
                Some(host) => self.generator.generate_for_host(&mut rng, app, protocol, host),
                None => self.generator.generate(&mut rng, app, protocol),
            };
            match result {
                Ok(epid) => generated.push(epid.to_string()),
                Err(e) => {
                    self.status_message = format!("Error: {}", e);
                    return;
                }
            }
        }

        if let Some(first) = generated.first() {
            self.epid = first.clone();
        }
        self.generated = generated;
        self.status_message = format!("Generated {} ePID(s) for {}", count, app.description());
    }

    fn decode(&mut self) {
        if self.epid.trim().is_empty() {
            self.status_message = "Error: ePID is required".to_string();
            return;
        }

        match self.epid.trim().parse::<Epid>() {
            Ok(epid) => {
                let host = HOST_OS_PROFILES
                    .iter()
                    .find(|p| p.type_code == epid.host_type)
                    .map(|p| p.description)
                    .unwrap_or("unknown host");
                self.decoded = format!(
                    "Host: {} (type {}, build {})\nGroup ID: {}\nKey ID: {:03}-{:06}\n\
                     Channel: {:02}\nLanguage: {}\nActivated: {} (day {:03})",
                    host,
                    epid.host_type,
                    epid.os_build,
                    epid.group_id,
                    epid.key_major(),
                    epid.key_minor(),
                    epid.license_channel,
                    epid.language,
                    epid.activation_date,
                    epid.day_of_year(),
                );
                self.status_message = "ePID decoded successfully!".to_string();
            }
            Err(e) => {
                self.status_message = format!("Error: {}", e);
            }
        }
    }
}

fn step(state: &mut ListState, len: usize, forward: bool) {
    let i = match state.selected() {
        Some(i) if forward => (i + 1) % len,
        Some(0) => len - 1,
        Some(i) => i - 1,
        None => 0,
    };
    state.select(Some(i));
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn ui(f: &mut Frame, app: &mut TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Status
            Constraint::Length(2), // Help
        ])
        .split(f.area());

    // Title
    let title = Paragraph::new("kms_epid_gen - KMS Host ePID Generator")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    // Left panel - Inputs
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Application
            Constraint::Length(3), // Protocol + count
            Constraint::Length(6), // Host
            Constraint::Length(3), // ePID
            Constraint::Length(3), // Buttons
        ])
        .split(main_chunks[0]);

    let apps: Vec<ListItem> = ApplicationId::ALL
        .iter()
        .map(|a| ListItem::new(a.description()))
        .collect();
    let apps_list = List::new(apps)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Application (↑↓ to select)")
                .border_style(focus_style(app.is_focused(InputField::App))),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");
    f.render_stateful_widget(apps_list, left_chunks[0], &mut app.app_state);

    let number_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(left_chunks[1]);

    let protocol_input = Paragraph::new(app.protocol.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Protocol Version")
            .border_style(focus_style(app.is_focused(InputField::Protocol))),
    );
    f.render_widget(protocol_input, number_chunks[0]);

    let count_input = Paragraph::new(app.count.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Count (1-{})", MAX_COUNT))
            .border_style(focus_style(app.is_focused(InputField::Count))),
    );
    f.render_widget(count_input, number_chunks[1]);

    let hosts: Vec<ListItem> = std::iter::once("Random host")
        .chain(HOST_OS_PROFILES.iter().map(|p| p.description))
        .map(ListItem::new)
        .collect();
    let hosts_list = List::new(hosts)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Host OS (↑↓ to select)")
                .border_style(focus_style(app.is_focused(InputField::Host))),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");
    f.render_stateful_widget(hosts_list, left_chunks[2], &mut app.host_state);

    let epid_input = Paragraph::new(app.epid.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("ePID to decode")
            .border_style(focus_style(app.is_focused(InputField::Epid))),
    );
    f.render_widget(epid_input, left_chunks[3]);

    // Buttons
    let button_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(left_chunks[4]);

    let gen_style = if matches!(app.focused, FocusedWidget::Generate) {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else {
        Style::default().fg(Color::Green)
    };
    let gen_btn = Paragraph::new("Generate")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(gen_style));
    f.render_widget(gen_btn, button_chunks[0]);

    let dec_style = if matches!(app.focused, FocusedWidget::Decode) {
        Style::default().fg(Color::Black).bg(Color::Blue)
    } else {
        Style::default().fg(Color::Blue)
    };
    let dec_btn = Paragraph::new("Decode")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(dec_style));
    f.render_widget(dec_btn, button_chunks[1]);

    // Right panel - Output
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[1]);

    let generated = Paragraph::new(app.generated.join("\n"))
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL).title("Generated ePIDs"))
        .wrap(Wrap { trim: false });
    f.render_widget(generated, right_chunks[0]);

    let decoded = Paragraph::new(app.decoded.as_str())
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL).title("Decoded ePID"))
        .wrap(Wrap { trim: false });
    f.render_widget(decoded, right_chunks[1]);

    // Status bar
    let status_color = if app.status_message.starts_with("Error") {
        Color::Red
    } else {
        Color::Green
    };
    let status = Paragraph::new(app.status_message.as_str())
        .style(Style::default().fg(status_color))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[2]);

    // Help bar
    let help_text =
        "Tab: Next field | Shift+Tab: Prev | Enter: Execute | ↑↓: Select | Esc/q: Quit";
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}

pub fn run_tui() -> Result<(), Box<dyn std::error::Error>> {
    // Fail before touching the terminal
    let generator = EpidGenerator::system()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = TuiApp::new(generator);

    // Main loop
    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_wraps_both_ways() {
        let mut state = ListState::default();
        state.select(Some(0));
        step(&mut state, 3, false);
        assert_eq!(state.selected(), Some(2));
        step(&mut state, 3, true);
        assert_eq!(state.selected(), Some(0));
    }
}
