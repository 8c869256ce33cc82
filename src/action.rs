use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{hero::Hero, route::Route};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum Action {
  AddHero(String),
  DeleteHero(Hero),
  EndInputMode,
  Error(String),
  ExitError,
  HeroAdded(Hero),
  HeroLoaded(Hero),
  HeroesLoaded(Vec<Hero>),
  InitNewHero,
  Navigate(Route),
  Quit,
  Refresh,
  Render,
  Resize(u16, u16),
  Resume,
  SelectNext,
  SelectPrevious,
  StartInputMode,
  Suspend,
  Tick,
}
