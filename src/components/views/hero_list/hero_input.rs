use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use crate::{
  action::Action,
  components::common::text_input::{InputEvent, TextInput},
  tui::Frame,
};

#[derive(Debug, Default)]
pub struct HeroInput {
  pub text_input: TextInput,
}

impl HeroInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn init_style(&mut self) {
    self.text_input.init_style("New hero name");
  }

  /// Blank submissions still produce `AddHero`; the list decides they are a no-op.
  pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Option<Action> {
    match self.text_input.handle_key_event(key_event)? {
      InputEvent::Submitted(name) => Some(Action::AddHero(name)),
      InputEvent::Cancelled => Some(Action::EndInputMode),
    }
  }

  pub fn render(&mut self, f: &mut Frame<'_>, area: Rect) {
    self.text_input.render(f, area);
  }
}
