use std::sync::Arc;

use crossterm::event::KeyCode;
use ratatui::{
  prelude::*,
  widgets::{Block, Borders, Paragraph},
};
use tokio::{sync::mpsc::UnboundedSender, task::spawn};
use tracing::{error, info};

use crate::{
  action::Action,
  components::{AsyncComponent, Component},
  hero::{Hero, HeroService},
  route::Route,
};

/// Shows a single hero, the target of `/detail/{id}`.
pub struct HeroDetail {
  service: Arc<dyn HeroService>,
  id: Option<i64>,
  hero: Option<Hero>,
  action_tx: Option<UnboundedSender<Action>>,
}

impl HeroDetail {
  pub fn new(service: Arc<dyn HeroService>) -> Self {
    HeroDetail { service, id: None, hero: None, action_tx: None }
  }

  pub fn hero(&self) -> Option<&Hero> {
    self.hero.as_ref()
  }

  pub fn show(&mut self, id: i64) {
    self.id = Some(id);
    self.hero = None;
    let Some(tx) = self.action_tx.clone() else {
      return;
    };
    info!("HeroDetail: Loading hero {}", id);
    let service = self.service.clone();
    spawn(async move {
      match service.get_hero(id).await {
        Ok(hero) => {
          let _ = tx.send(Action::HeroLoaded(hero));
        },
        Err(err) => {
          error!("HeroDetail: Failed to load hero {}: {}", id, err);
          let _ = tx.send(Action::Error(format!("Failed to load hero {id}: {err}")));
        },
      }
    });
  }

  pub fn clear(&mut self) {
    self.id = None;
    self.hero = None;
  }
}

fn field(label: &str, value: String) -> Line<'static> {
  Line::from(vec![Span::styled(format!("{label}: "), Style::default().add_modifier(Modifier::DIM)), Span::raw(value)])
}

impl Component for HeroDetail {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> color_eyre::Result<()> {
    self.action_tx = Some(tx);
    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame, area: Rect) -> color_eyre::Result<()> {
    let lines = match &self.hero {
      Some(hero) => vec![
        field("id", hero.id.to_string()),
        field("name", hero.name.clone()),
        field("strength", hero.strength.to_string()),
        Line::default(),
        Line::from(Span::styled("esc: Back", Style::default().add_modifier(Modifier::DIM))),
      ],
      None => vec![Line::from("Loading hero...")],
    };
    let title = match &self.hero {
      Some(hero) => format!("{} Details", hero.name.to_uppercase()),
      None => self.id.map(|id| Route::Detail(id).to_string()).unwrap_or_default(),
    };
    let paragraph = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));

    frame.render_widget(paragraph, area);
    Ok(())
  }
}

#[async_trait::async_trait]
impl AsyncComponent for HeroDetail {
  async fn handle_events(&mut self, event: Option<crate::tui::Event>) -> color_eyre::Result<Option<Action>> {
    match event {
      Some(crate::tui::Event::Key(key)) => match key.code {
        KeyCode::Esc | KeyCode::Backspace => Ok(Some(Action::Navigate(Route::Heroes))),
        _ => Ok(None),
      },
      _ => Ok(None),
    }
  }

  async fn update(&mut self, action: Action) -> color_eyre::Result<Option<Action>> {
    match action {
      // a late answer for a hero we have navigated away from is dropped
      Action::HeroLoaded(hero) if Some(hero.id) == self.id => {
        self.hero = Some(hero);
        Ok(Some(Action::Render))
      },
      _ => Ok(None),
    }
  }
}
