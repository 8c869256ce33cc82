use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
  style::{Modifier, Style},
  text::{Line, Span},
  widgets::ListItem,
};

use crate::{hero::Hero, route::Route};

/// Intents a single item raises towards the list that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEvent {
  Delete,
  Navigate(Route),
}

/// Read-only view of one hero in the list.
#[derive(Debug, Clone, Copy)]
pub struct HeroItem<'a> {
  pub hero: &'a Hero,
}

impl<'a> HeroItem<'a> {
  pub fn new(hero: &'a Hero) -> Self {
    HeroItem { hero }
  }

  pub fn route(&self) -> Route {
    self.hero.route()
  }

  /// The delete signal, as raised by the delete control.
  pub fn emit_delete(&self) -> ItemEvent {
    ItemEvent::Delete
  }

  /// Delete and navigate are bound to different keys, so activating delete never also follows the link.
  pub fn handle_key_event(&self, key: KeyEvent) -> Option<ItemEvent> {
    match key {
      KeyEvent { code: KeyCode::Char('d' | 'D'), modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT, .. }
      | KeyEvent { code: KeyCode::Delete, .. } => Some(self.emit_delete()),
      KeyEvent { code: KeyCode::Enter, .. } => Some(ItemEvent::Navigate(self.route())),
      _ => None,
    }
  }

  pub fn render(&self) -> ListItem<'static> {
    let parts = vec![
      Span::styled(format!("{:>3} ", self.hero.id), Style::default().add_modifier(Modifier::DIM)),
      Span::styled(self.hero.name.clone(), Style::default()),
      Span::styled(format!(" (strength {})", self.hero.strength), Style::default().add_modifier(Modifier::DIM)),
    ];
    ListItem::from(Line::from(parts))
  }
}
