use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
  layout::Rect,
  prelude::Color,
  style::Style,
  widgets::{Block, Borders},
};
use tui_textarea::{CursorMove, Input, TextArea};

use crate::tui::Frame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
  /// Enter was pressed. Carries the line as typed, which may be blank.
  Submitted(String),
  Cancelled,
}

#[derive(Debug, Default)]
pub struct TextInput {
  pub text_input: TextArea<'static>,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn init_style(&mut self, title: &str) {
    self.text_input.set_style(Style::default().fg(Color::White));
    self.text_input.set_block(Block::default().borders(Borders::ALL).title(title.to_string()));
  }

  pub fn get_text(&self) -> Option<String> {
    let input = String::from(self.text_input.lines().first()?.trim());
    if input.is_empty() {
      return None;
    }
    Some(input)
  }

  pub fn clear(&mut self) {
    self.text_input.move_cursor(CursorMove::Head);
    self.text_input.delete_line_by_end();
  }

  pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Option<InputEvent> {
    match key_event {
      KeyEvent { code: KeyCode::Esc, .. } => {
        self.clear();
        Some(InputEvent::Cancelled)
      },
      KeyEvent { code: KeyCode::Enter, .. } => {
        let line = self.text_input.lines().first().cloned().unwrap_or_default();
        // purposely don't send the key, we want to delete the line
        self.clear();
        Some(InputEvent::Submitted(line))
      },
      _ => {
        let changed = self.text_input.input(Input::from(key_event));
        if changed {
          let valid = self.get_text().is_some();
          self.text_input.set_style(Style::default().fg(if valid { Color::LightGreen } else { Color::White }));
        }
        None
      },
    }
  }

  pub fn render(&mut self, f: &mut Frame<'_>, area: Rect) {
    f.render_widget(&self.text_input, area);
  }
}
