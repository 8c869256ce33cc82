use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
  layout::{Constraint, Flex, Layout},
  prelude::Rect,
  widgets::Clear,
};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::info;

use crate::{
  action::Action,
  components::{AsyncComponent, Component, ErrorView, HeroDetail, HeroList},
  config::Config,
  hero::HeroService,
  mode::Mode,
  route::Route,
  tui::{self, Frame, Tui},
};

pub struct App {
  pub config: Config,
  pub tick_rate: f64,
  pub frame_rate: f64,
  pub hero_list: HeroList,
  pub hero_detail: HeroDetail,
  pub error_view: ErrorView,
  pub should_quit: bool,
  pub should_suspend: bool,
  pub mode: Mode,
  pub route: Route,
}

impl App {
  pub fn new(config: Config, service: Arc<dyn HeroService>, tick_rate: f64, frame_rate: f64) -> Self {
    Self {
      config,
      tick_rate,
      frame_rate,
      hero_list: HeroList::new(service.clone()),
      hero_detail: HeroDetail::new(service),
      error_view: ErrorView::default(),
      should_quit: false,
      should_suspend: false,
      mode: Mode::Default,
      route: Route::Heroes,
    }
  }

  pub fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.hero_list.register_action_handler(tx.clone())?;
    self.hero_detail.register_action_handler(tx.clone())?;
    self.error_view.register_action_handler(tx)?;
    Ok(())
  }

  fn showing_error(&self) -> bool {
    self.error_view.message().is_some()
  }

  /// The component the current route points at.
  fn route_component(&mut self) -> &mut dyn AsyncComponent {
    match self.route {
      Route::Heroes => &mut self.hero_list,
      Route::Detail(_) => &mut self.hero_detail,
    }
  }

  /// The component that receives terminal events. An open error takes them all.
  fn focused_component(&mut self) -> &mut dyn AsyncComponent {
    if self.showing_error() {
      return &mut self.error_view;
    }
    self.route_component()
  }

  /// An open error captures keys the way text input does, so only the input mode bindings apply.
  fn global_action(&self, key: &KeyEvent) -> Option<Action> {
    let mode = if self.showing_error() { Mode::Input } else { self.mode };
    self.config.keybindings.action_for(mode, key)
  }

  pub async fn handle_event(&mut self, event: tui::Event) -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    match event {
      tui::Event::Quit => actions.push(Action::Quit),
      tui::Event::Tick => actions.push(Action::Tick),
      tui::Event::Render => actions.push(Action::Render),
      tui::Event::Resize(x, y) => actions.push(Action::Resize(x, y)),
      tui::Event::Key(key) => actions.extend(self.global_action(&key)),
      _ => {},
    }
    if let Some(action) = self.focused_component().handle_events(Some(event)).await? {
      actions.push(action);
    }
    Ok(actions)
  }

  fn navigate(&mut self, route: Route) -> Option<Action> {
    if route == self.route {
      return None;
    }
    info!("Navigating from {} to {}", self.route, route);
    self.route = route;
    self.mode = Mode::Default;
    match route {
      Route::Heroes => {
        self.hero_detail.clear();
        Some(Action::Refresh)
      },
      Route::Detail(id) => {
        self.hero_list.on_deactivate();
        self.hero_detail.show(id);
        None
      },
    }
  }

  /// Applies app level effects of an action, then hands it to the routed component.
  pub async fn dispatch(&mut self, action: Action) -> Result<Vec<Action>> {
    let mut follow_ups = Vec::new();
    match &action {
      Action::StartInputMode => self.mode = Mode::Input,
      Action::EndInputMode => self.mode = Mode::Default,
      Action::Quit => self.should_quit = true,
      Action::Suspend => self.should_suspend = true,
      Action::Resume => self.should_suspend = false,
      Action::Error(message) => self.error_view.push_message(message.clone()),
      Action::Navigate(route) => follow_ups.extend(self.navigate(*route)),
      _ => {},
    }
    if let Some(action) = self.route_component().update(action).await? {
      follow_ups.push(action);
    }
    Ok(follow_ups)
  }

  fn draw(&mut self, frame: &mut Frame<'_>) -> Result<()> {
    let area = frame.area();
    self.route_component().draw(frame, area)?;
    if self.showing_error() {
      let popup = popup_area(area, 80, 40);
      frame.render_widget(Clear, popup);
      self.error_view.draw(frame, popup)?;
    }
    Ok(())
  }

  fn render(&mut self, tui: &mut Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
    tui.draw(|f| {
      if let Err(e) = self.draw(f) {
        let _ = action_tx.send(Action::Error(format!("Failed to draw: {:?}", e)));
      }
    })?;
    Ok(())
  }

  pub async fn run(&mut self) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();

    let mut tui = Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate);
    tui.enter()?;

    self.register_action_handler(action_tx.clone())?;
    action_tx.send(Action::Refresh)?;

    loop {
      if let Some(e) = tui.next().await {
        for action in self.handle_event(e).await? {
          action_tx.send(action)?;
        }
      }

      while let Ok(action) = action_rx.try_recv() {
        if action != Action::Tick && action != Action::Render {
          log::debug!("{action:?}");
        }
        match action {
          Action::Resize(w, h) => {
            tui.resize(Rect::new(0, 0, w, h))?;
            self.render(&mut tui, &action_tx)?;
          },
          Action::Render => self.render(&mut tui, &action_tx)?,
          _ => {},
        }
        for follow_up in self.dispatch(action).await? {
          action_tx.send(follow_up)?;
        }
      }

      if self.should_suspend {
        tui.suspend()?;
        action_tx.send(Action::Resume)?;
        tui = Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate);
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
  let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
  let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
  let [area] = vertical.areas(area);
  let [area] = horizontal.areas(area);
  area
}
