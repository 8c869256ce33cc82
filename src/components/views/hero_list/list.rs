use std::{sync::Arc, time::SystemTime};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, List, ListItem, ListState},
};
use tokio::{sync::mpsc::UnboundedSender, task::spawn};
use tracing::{error, info, warn};

use super::{HeroInput, HeroItem, InstructionFooter, ItemEvent};
use crate::{
  action::Action,
  components::{AsyncComponent, Component},
  hero::{Hero, HeroService, NewHero},
  tui::Frame,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
  Selection,
  Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadingOperation {
  None,
  LoadingHeroes(SystemTime),
  Adding(SystemTime),
}

/// Owns the hero collection. Service calls run on spawned tasks and report back as actions, so the
/// collection itself is only ever touched from `update`.
pub struct HeroList {
  service: Arc<dyn HeroService>,
  heroes: Vec<Hero>,
  mode: Mode,
  loading: LoadingOperation,
  list_state: ListState,
  hero_input: HeroInput,
  instruction_footer: InstructionFooter,
  action_tx: Option<UnboundedSender<Action>>,
}

impl HeroList {
  pub fn new(service: Arc<dyn HeroService>) -> Self {
    HeroList {
      service,
      heroes: Vec::new(),
      mode: Mode::Selection,
      loading: LoadingOperation::None,
      list_state: ListState::default(),
      hero_input: HeroInput::new(),
      instruction_footer: InstructionFooter::default(),
      action_tx: None,
    }
  }

  pub fn heroes(&self) -> &[Hero] {
    &self.heroes
  }

  /// One item per hero, in collection order.
  pub fn items(&self) -> Vec<HeroItem<'_>> {
    self.heroes.iter().map(HeroItem::new).collect()
  }

  pub fn selected_item(&self) -> Option<HeroItem<'_>> {
    self.heroes.get(self.list_state.selected()?).map(HeroItem::new)
  }

  fn sender(&self, operation: &str) -> Option<UnboundedSender<Action>> {
    if self.action_tx.is_none() {
      warn!("HeroList: {} requested before an action handler was registered", operation);
    }
    self.action_tx.clone()
  }

  /// Starts the single fetch of the collection. The result arrives as `HeroesLoaded`.
  pub fn on_activate(&mut self) {
    let Some(tx) = self.sender("activation") else {
      return;
    };
    info!("HeroList: Loading heroes");
    self.loading = LoadingOperation::LoadingHeroes(SystemTime::now());
    let service = self.service.clone();

    spawn(async move {
      match service.get_heroes().await {
        Ok(heroes) => {
          info!("HeroList: Loaded {} heroes", heroes.len());
          let _ = tx.send(Action::HeroesLoaded(heroes));
        },
        Err(err) => {
          error!("HeroList: Failed to load heroes: {}", err);
          let _ = tx.send(Action::Error(format!("Failed to load heroes: {err}")));
        },
      }
    });
  }

  pub fn on_deactivate(&mut self) {
    self.heroes.clear();
    self.list_state.select(None);
    self.mode = Mode::Selection;
    self.loading = LoadingOperation::None;
  }

  /// Asks the service to create a hero. Nothing is inserted until the service answers with `HeroAdded`.
  pub fn add(&mut self, name: &str) {
    let name = name.trim();
    if name.is_empty() {
      info!("HeroList: Ignoring add with a blank name");
      return;
    }
    let Some(tx) = self.sender("add") else {
      return;
    };
    info!("HeroList: Adding hero {}", name);
    self.loading = LoadingOperation::Adding(SystemTime::now());
    let service = self.service.clone();
    let new_hero = NewHero::new(name);

    spawn(async move {
      match service.add_hero(&new_hero).await {
        Ok(hero) => {
          info!("HeroList: Hero {} added with id {}", hero.name, hero.id);
          let _ = tx.send(Action::HeroAdded(hero));
        },
        Err(err) => {
          error!("HeroList: Failed to add hero {}: {}", new_hero.name, err);
          let _ = tx.send(Action::Error(format!("Failed to add hero {}: {err}", new_hero.name)));
        },
      }
    });
  }

  /// Removes the hero from the view straight away, then tells the service. A failed remote delete is
  /// reported but the hero is not put back.
  pub fn delete(&mut self, hero: &Hero) {
    let Some(index) = self.heroes.iter().position(|h| h.id == hero.id) else {
      info!("HeroList: Hero {} is not in the list, nothing to delete", hero.id);
      return;
    };
    let removed = self.heroes.remove(index);
    self.clamp_selection();
    info!("HeroList: Deleting hero {} with id {}", removed.name, removed.id);

    let Some(tx) = self.sender("delete") else {
      return;
    };
    let service = self.service.clone();
    spawn(async move {
      if let Err(err) = service.delete_hero(removed.id).await {
        error!("HeroList: Failed to delete hero {}: {}", removed.id, err);
        let _ = tx.send(Action::Error(format!("Failed to delete hero {}: {err}", removed.name)));
      }
    });
  }

  /// Ids stay unique: a refetch that already picked up the hero leaves nothing to append.
  fn append(&mut self, hero: Hero) {
    match self.heroes.iter_mut().find(|h| h.id == hero.id) {
      Some(existing) => {
        info!("HeroList: Hero {} already listed, replacing it", hero.id);
        *existing = hero;
      },
      None => self.heroes.push(hero),
    }
    if self.list_state.selected().is_none() {
      self.list_state.select(Some(0));
    }
  }

  fn replace(&mut self, heroes: Vec<Hero>) {
    self.heroes = heroes;
    if self.list_state.selected().is_none() && !self.heroes.is_empty() {
      self.list_state.select(Some(0));
    }
    self.clamp_selection();
  }

  fn clamp_selection(&mut self) {
    match self.list_state.selected() {
      _ if self.heroes.is_empty() => self.list_state.select(None),
      Some(selected) if selected >= self.heroes.len() => self.list_state.select(Some(self.heroes.len() - 1)),
      _ => {},
    }
  }

  pub fn select_previous(&mut self) {
    if self.heroes.is_empty() {
      return;
    }
    let final_index = self.heroes.len() - 1;
    let previous = match self.list_state.selected() {
      Some(0) | None => final_index,
      Some(selected) => selected.min(final_index + 1) - 1,
    };
    self.list_state.select(Some(previous));
  }

  pub fn select_next(&mut self) {
    if self.heroes.is_empty() {
      return;
    }
    let final_index = self.heroes.len() - 1;
    let next = match self.list_state.selected() {
      Some(selected) if selected < final_index => selected + 1,
      _ => 0,
    };
    self.list_state.select(Some(next));
  }

  /// Maps an event raised by the item at `index` to the action for the hero that item is bound to.
  pub fn item_event(&self, index: usize, event: ItemEvent) -> Option<Action> {
    let hero = self.heroes.get(index)?;
    let action = match event {
      ItemEvent::Delete => Action::DeleteHero(hero.clone()),
      ItemEvent::Navigate(route) => Action::Navigate(route),
    };
    Some(action)
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> Option<Action> {
    if self.mode == Mode::Input {
      return self.hero_input.handle_key_event(key);
    }
    match key {
      KeyEvent { code: KeyCode::Down, modifiers: KeyModifiers::NONE, .. } => Some(Action::SelectNext),
      KeyEvent { code: KeyCode::Up, modifiers: KeyModifiers::NONE, .. } => Some(Action::SelectPrevious),
      KeyEvent { code: KeyCode::Char('a' | 'A'), modifiers: KeyModifiers::NONE, .. } => Some(Action::InitNewHero),
      _ => {
        let index = self.list_state.selected()?;
        let event = self.heroes.get(index).map(HeroItem::new)?.handle_key_event(key)?;
        self.item_event(index, event)
      },
    }
  }

  fn render_list(&mut self, f: &mut Frame<'_>, area: Rect) {
    let title = match self.loading {
      LoadingOperation::LoadingHeroes(time) => format!("Loading Heroes...({})", format_time_elapsed(time)),
      LoadingOperation::Adding(time) => format!("Adding Hero...({})", format_time_elapsed(time)),
      LoadingOperation::None => format!("My Heroes ({})", self.heroes().len()),
    };

    let render_items: Vec<ListItem> = self.items().iter().map(|item| item.render()).collect();
    let list = List::new(render_items)
      .block(Block::default().title(title).borders(Borders::ALL))
      .style(Style::default().fg(Color::White))
      .highlight_style(Style::default().add_modifier(Modifier::BOLD))
      .highlight_symbol("→")
      .repeat_highlight_symbol(true);

    f.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl Component for HeroList {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> color_eyre::Result<()> {
    self.action_tx = Some(tx);
    self.hero_input.init_style();
    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> color_eyre::Result<()> {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Min(1),
        Constraint::Length(if self.mode == Mode::Input { 3 } else { 0 }),
        Constraint::Length(3),
      ])
      .split(area);

    self.render_list(frame, chunks[0]);

    if self.mode == Mode::Input {
      self.hero_input.render(frame, chunks[1]);
    }

    let has_selection = self.selected_item().is_some();
    self.instruction_footer.render(frame, chunks[2], self.mode == Mode::Input, has_selection);

    Ok(())
  }
}

#[async_trait::async_trait]
impl AsyncComponent for HeroList {
  async fn handle_events(&mut self, event: Option<crate::tui::Event>) -> color_eyre::Result<Option<Action>> {
    match event {
      Some(crate::tui::Event::Key(key)) => Ok(self.handle_key_events(key)),
      _ => Ok(None),
    }
  }

  async fn update(&mut self, action: Action) -> color_eyre::Result<Option<Action>> {
    match action {
      Action::Refresh => {
        self.on_activate();
        Ok(Some(Action::Render))
      },
      Action::HeroesLoaded(heroes) => {
        self.loading = LoadingOperation::None;
        self.replace(heroes);
        Ok(Some(Action::Render))
      },
      Action::SelectNext => {
        self.select_next();
        Ok(Some(Action::Render))
      },
      Action::SelectPrevious => {
        self.select_previous();
        Ok(Some(Action::Render))
      },
      Action::InitNewHero => {
        info!("HeroList: Opening hero input");
        self.mode = Mode::Input;
        self.hero_input.init_style();
        Ok(Some(Action::StartInputMode))
      },
      Action::EndInputMode => {
        self.mode = Mode::Selection;
        Ok(None)
      },
      Action::AddHero(name) => {
        self.mode = Mode::Selection;
        self.add(&name);
        Ok(Some(Action::EndInputMode))
      },
      Action::HeroAdded(hero) => {
        self.loading = LoadingOperation::None;
        self.append(hero);
        Ok(Some(Action::Render))
      },
      Action::DeleteHero(hero) => {
        self.delete(&hero);
        Ok(Some(Action::Render))
      },
      Action::Error(_) => {
        self.loading = LoadingOperation::None;
        Ok(None)
      },
      _ => Ok(None),
    }
  }
}

fn format_time_elapsed(time: SystemTime) -> String {
  match time.elapsed() {
    Ok(elapsed) => format!("{:.1}s", elapsed.as_secs_f64()),
    Err(err) => {
      warn!("Failed to get system time {}", err);
      String::from("xs")
    },
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use ratatui::{Terminal, backend::TestBackend};
  use tokio::sync::mpsc::{self, UnboundedReceiver};

  use super::*;
  use crate::{
    hero::mock_hero_service::{MockCall, MockHeroService},
    route::Route,
    tui::Event,
  };

  fn sample_heroes() -> Vec<Hero> {
    vec![Hero::new(1, "SpiderDude", 8), Hero::new(2, "WonderFull", 24), Hero::new(3, "SuperDude", 55)]
  }

  fn key(code: KeyCode) -> Option<Event> {
    Some(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
  }

  fn registered(service: Arc<MockHeroService>) -> (HeroList, UnboundedReceiver<Action>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut list = HeroList::new(service);
    list.register_action_handler(tx).unwrap();
    (list, rx)
  }

  /// Activates the list and feeds the fetch result back in, like the app loop would.
  async fn activated(service: Arc<MockHeroService>) -> (HeroList, UnboundedReceiver<Action>) {
    let (mut list, mut rx) = registered(service);
    list.update(Action::Refresh).await.unwrap();
    let loaded = rx.recv().await.unwrap();
    assert!(matches!(loaded, Action::HeroesLoaded(_)));
    list.update(loaded).await.unwrap();
    (list, rx)
  }

  /// Lets spawned service calls run to completion on the test runtime.
  async fn settle() {
    for _ in 0..10 {
      tokio::task::yield_now().await;
    }
  }

  fn render(list: &mut HeroList) -> String {
    let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
    terminal.draw(|f| list.draw(f, f.area()).unwrap()).unwrap();
    let buffer = terminal.backend().buffer();
    let area = buffer.area;
    (0..area.height)
      .map(|y| (0..area.width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n")
  }

  #[tokio::test]
  async fn test_sets_heroes_from_the_service() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));

    let (list, _rx) = activated(service.clone()).await;

    assert_eq!(list.heroes(), sample_heroes().as_slice());
    assert_eq!(service.calls(), vec![MockCall::GetHeroes]);
  }

  #[tokio::test]
  async fn test_collection_is_empty_before_fetch_resolves() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, _rx) = registered(service);

    list.update(Action::Refresh).await.unwrap();

    assert!(list.heroes().is_empty());
  }

  #[tokio::test]
  async fn test_renders_one_item_per_hero_in_order() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, _rx) = activated(service).await;

    let names: Vec<String> = list.items().iter().map(|item| item.hero.name.clone()).collect();
    assert_eq!(names, vec!["SpiderDude", "WonderFull", "SuperDude"]);

    let text = render(&mut list);
    assert_eq!(text.matches("strength").count(), 3);
    let positions: Vec<usize> = ["SpiderDude", "WonderFull", "SuperDude"].iter().map(|n| text.find(n).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
  }

  #[tokio::test]
  async fn test_delete_control_raises_delete_for_bound_hero_once() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, mut rx) = activated(service).await;

    let action = list.handle_events(key(KeyCode::Char('d'))).await.unwrap();

    assert_eq!(action, Some(Action::DeleteHero(sample_heroes()[0].clone())));
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn test_delete_signal_raises_delete_for_bound_hero() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (list, _rx) = activated(service).await;

    let items = list.items();
    let action = list.item_event(0, items[0].emit_delete());

    assert_eq!(action, Some(Action::DeleteHero(sample_heroes()[0].clone())));
  }

  #[tokio::test]
  async fn test_delete_signal_on_second_item_targets_second_hero() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, _rx) = activated(service).await;

    list.update(Action::SelectNext).await.unwrap();
    let action = list.handle_events(key(KeyCode::Delete)).await.unwrap();

    assert_eq!(action, Some(Action::DeleteHero(sample_heroes()[1].clone())));
  }

  #[tokio::test]
  async fn test_delete_removes_hero_before_service_answers() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, _rx) = activated(service.clone()).await;

    list.update(Action::DeleteHero(sample_heroes()[1].clone())).await.unwrap();

    let ids: Vec<i64> = list.heroes().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![1, 3]);
    settle().await;
    assert_eq!(service.delete_calls(), vec![2]);
  }

  #[tokio::test]
  async fn test_failed_delete_is_reported_but_not_rolled_back() {
    let service = Arc::new(MockHeroService::new(sample_heroes()).failing_delete());
    let (mut list, mut rx) = activated(service).await;

    list.update(Action::DeleteHero(sample_heroes()[0].clone())).await.unwrap();

    let reported = rx.recv().await.unwrap();
    assert!(matches!(reported, Action::Error(message) if message.contains("SpiderDude")));
    assert_eq!(list.heroes().len(), 2);
  }

  #[tokio::test]
  async fn test_delete_of_missing_hero_is_a_no_op() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, _rx) = activated(service.clone()).await;

    list.update(Action::DeleteHero(Hero::new(99, "Nobody", 0))).await.unwrap();

    assert_eq!(list.heroes().len(), 3);
    settle().await;
    assert!(service.delete_calls().is_empty());
  }

  #[tokio::test]
  async fn test_first_hero_links_to_its_detail_route() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, _rx) = activated(service).await;

    let action = list.handle_events(key(KeyCode::Enter)).await.unwrap();

    assert_eq!(action, Some(Action::Navigate(Route::Detail(1))));
    assert_eq!(list.items()[0].route().to_string(), "/detail/1");
  }

  #[tokio::test]
  async fn test_add_appends_hero_returned_by_service() {
    let service = Arc::new(MockHeroService::new(sample_heroes()).with_added(Hero::new(5, "Mr. Ice", 4)));
    let (mut list, mut rx) = activated(service.clone()).await;

    assert_eq!(list.handle_events(key(KeyCode::Char('a'))).await.unwrap(), Some(Action::InitNewHero));
    list.update(Action::InitNewHero).await.unwrap();
    for c in "Mr. Ice".chars() {
      assert_eq!(list.handle_events(key(KeyCode::Char(c))).await.unwrap(), None);
    }
    let submitted = list.handle_events(key(KeyCode::Enter)).await.unwrap().unwrap();
    assert_eq!(submitted, Action::AddHero("Mr. Ice".to_string()));
    assert_eq!(list.update(submitted).await.unwrap(), Some(Action::EndInputMode));
    assert_eq!(list.heroes().len(), 3);

    let added = rx.recv().await.unwrap();
    list.update(added).await.unwrap();

    assert_eq!(list.heroes().len(), 4);
    assert_eq!(list.heroes().last(), Some(&Hero::new(5, "Mr. Ice", 4)));
    assert_eq!(service.add_calls(), vec![NewHero::new("Mr. Ice")]);
    assert!(render(&mut list).contains("Mr. Ice"));
  }

  #[tokio::test]
  async fn test_added_hero_already_in_a_refetch_is_listed_once() {
    let mr_ice = Hero::new(5, "Mr. Ice", 4);
    let service = Arc::new(MockHeroService::new(sample_heroes()).with_added(mr_ice.clone()));
    let (mut list, mut rx) = activated(service).await;

    list.update(Action::AddHero("Mr. Ice".to_string())).await.unwrap();
    let added = rx.recv().await.unwrap();
    assert_eq!(added, Action::HeroAdded(mr_ice.clone()));

    let mut refetched = sample_heroes();
    refetched.push(mr_ice.clone());
    list.update(Action::Refresh).await.unwrap();
    list.update(Action::HeroesLoaded(refetched)).await.unwrap();
    list.update(added).await.unwrap();

    let ids: Vec<i64> = list.heroes().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 5]);
    assert_eq!(list.heroes().last(), Some(&mr_ice));
  }

  #[tokio::test]
  async fn test_add_with_empty_name_never_calls_service() {
    let service = Arc::new(MockHeroService::new(sample_heroes()).with_added(Hero::new(5, "Mr. Ice", 4)));
    let (mut list, mut rx) = activated(service.clone()).await;

    list.update(Action::AddHero(String::new())).await.unwrap();
    list.update(Action::AddHero("   ".to_string())).await.unwrap();
    settle().await;

    assert_eq!(list.heroes().len(), 3);
    assert!(service.add_calls().is_empty());
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn test_add_trims_name() {
    let service = Arc::new(MockHeroService::new(vec![]).with_added(Hero::new(1, "Mr. Ice", 4)));
    let (mut list, mut rx) = activated(service.clone()).await;

    list.update(Action::AddHero("  Mr. Ice  ".to_string())).await.unwrap();
    rx.recv().await.unwrap();

    assert_eq!(service.add_calls(), vec![NewHero::new("Mr. Ice")]);
  }

  #[tokio::test]
  async fn test_failed_add_reports_error_and_leaves_list_alone() {
    let service = Arc::new(MockHeroService::new(sample_heroes()).failing_add());
    let (mut list, mut rx) = activated(service).await;

    list.update(Action::AddHero("Mr. Ice".to_string())).await.unwrap();
    let reported = rx.recv().await.unwrap();

    assert!(matches!(reported, Action::Error(_)));
    list.update(reported).await.unwrap();
    assert_eq!(list.heroes().len(), 3);
    assert_eq!(list.loading, LoadingOperation::None);
  }

  #[tokio::test]
  async fn test_failed_fetch_reports_error() {
    let service = Arc::new(MockHeroService::new(sample_heroes()).failing_get());
    let (mut list, mut rx) = registered(service);

    list.update(Action::Refresh).await.unwrap();

    assert!(matches!(rx.recv().await.unwrap(), Action::Error(message) if message.starts_with("Failed to load heroes")));
    assert!(list.heroes().is_empty());
  }

  #[tokio::test]
  async fn test_deactivate_discards_collection() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, _rx) = activated(service).await;

    list.on_deactivate();

    assert!(list.heroes().is_empty());
    assert!(list.selected_item().is_none());
  }

  #[tokio::test]
  async fn test_select_wraps_around() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, _rx) = activated(service).await;

    list.select_previous();
    assert_eq!(list.selected_item().unwrap().hero.id, 3);
    list.select_next();
    assert_eq!(list.selected_item().unwrap().hero.id, 1);
  }

  #[tokio::test]
  async fn test_selection_is_clamped_after_deleting_last_hero() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, _rx) = activated(service).await;

    list.select_previous();
    list.update(Action::DeleteHero(sample_heroes()[2].clone())).await.unwrap();

    assert_eq!(list.selected_item().unwrap().hero.id, 2);
  }

  #[tokio::test]
  async fn test_escape_in_input_mode_ends_input_without_adding() {
    let service = Arc::new(MockHeroService::new(sample_heroes()));
    let (mut list, _rx) = activated(service.clone()).await;

    list.update(Action::InitNewHero).await.unwrap();
    let action = list.handle_events(key(KeyCode::Esc)).await.unwrap();

    assert_eq!(action, Some(Action::EndInputMode));
    assert!(service.add_calls().is_empty());
  }
}
