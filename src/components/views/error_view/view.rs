use std::collections::VecDeque;

use crossterm::event::KeyCode;
use ratatui::{
  prelude::*,
  widgets::{Block, Borders, Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
  action::Action,
  components::{AsyncComponent, Component},
};

/// Where failures from the hero service end up. Errors queue up and are shown one at a time until each
/// is dismissed.
#[derive(Default)]
pub struct ErrorView {
  messages: VecDeque<String>,
  scroll: u16,
  last_height: u16,
  /// Rows the current message takes once wrapped at the last drawn width.
  wrapped_lines: u16,
}

impl ErrorView {
  pub fn push_message(&mut self, message: String) {
    if self.messages.is_empty() {
      self.reset_scroll(&message);
    }
    self.messages.push_back(message);
  }

  pub fn message(&self) -> Option<&str> {
    self.messages.front().map(String::as_str)
  }

  pub fn pending(&self) -> usize {
    self.messages.len()
  }

  fn reset_scroll(&mut self, message: &str) {
    self.scroll = 0;
    self.wrapped_lines = message.lines().count() as u16;
  }

  fn has_scrolled_to_bottom(&self) -> bool {
    self.scroll + self.last_height >= self.wrapped_lines
  }

  /// Drops the current message and moves on to the next one. Returns true once nothing is left.
  fn dismiss(&mut self) -> bool {
    self.messages.pop_front();
    self.last_height = 0;
    match self.messages.front().cloned() {
      Some(next) => {
        self.reset_scroll(&next);
        false
      },
      None => {
        self.scroll = 0;
        self.wrapped_lines = 0;
        true
      },
    }
  }
}

impl Component for ErrorView {
  fn register_action_handler(&mut self, _tx: UnboundedSender<Action>) -> color_eyre::Result<()> {
    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame, area: Rect) -> color_eyre::Result<()> {
    let message = self.message().unwrap_or_default().to_string();
    let title = match self.pending() {
      0 | 1 => "Error".to_string(),
      pending => format!("Error (1 of {pending})"),
    };
    let text = Paragraph::new(message).wrap(Wrap { trim: false });

    self.last_height = area.height.saturating_sub(2);
    self.wrapped_lines = text.line_count(area.width.saturating_sub(2)) as u16;

    let paragraph = text
      .block(
        Block::default()
          .title(title)
          .title_bottom(Line::from("esc: Dismiss").right_aligned())
          .style(Style::default().fg(Color::Red))
          .borders(Borders::ALL),
      )
      .scroll((self.scroll, 0));

    frame.render_widget(paragraph, area);
    Ok(())
  }
}

#[async_trait::async_trait]
impl AsyncComponent for ErrorView {
  async fn handle_events(&mut self, event: Option<crate::tui::Event>) -> color_eyre::Result<Option<Action>> {
    let Some(crate::tui::Event::Key(key)) = event else {
      return Ok(None);
    };
    let action = match key.code {
      KeyCode::Up => {
        self.scroll = self.scroll.saturating_sub(1);
        None
      },
      KeyCode::Down => {
        if !self.has_scrolled_to_bottom() {
          self.scroll += 1;
        }
        None
      },
      KeyCode::Esc | KeyCode::Enter => {
        if self.dismiss() {
          Some(Action::ExitError)
        } else {
          Some(Action::Render)
        }
      },
      _ => None,
    };
    Ok(action)
  }

  async fn update(&mut self, _action: Action) -> color_eyre::Result<Option<Action>> {
    Ok(None)
  }
}
