use std::sync::Mutex;

use async_trait::async_trait;

use super::{Hero, HeroService, NewHero};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
  GetHeroes,
  GetHero(i64),
  AddHero(NewHero),
  DeleteHero(i64),
}

/// Test double for [`HeroService`]. Returns whatever it was configured with and records every call.
#[derive(Debug, Default)]
pub struct MockHeroService {
  heroes: Vec<Hero>,
  added: Option<Hero>,
  fail_get: bool,
  fail_add: bool,
  fail_delete: bool,
  calls: Mutex<Vec<MockCall>>,
}

impl MockHeroService {
  pub fn new(heroes: Vec<Hero>) -> Self {
    MockHeroService { heroes, ..Default::default() }
  }

  pub fn with_added(mut self, hero: Hero) -> Self {
    self.added = Some(hero);
    self
  }

  pub fn failing_get(mut self) -> Self {
    self.fail_get = true;
    self
  }

  pub fn failing_add(mut self) -> Self {
    self.fail_add = true;
    self
  }

  pub fn failing_delete(mut self) -> Self {
    self.fail_delete = true;
    self
  }

  pub fn calls(&self) -> Vec<MockCall> {
    self.calls.lock().unwrap().clone()
  }

  pub fn add_calls(&self) -> Vec<NewHero> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        MockCall::AddHero(hero) => Some(hero),
        _ => None,
      })
      .collect()
  }

  pub fn delete_calls(&self) -> Vec<i64> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        MockCall::DeleteHero(id) => Some(id),
        _ => None,
      })
      .collect()
  }

  fn record(&self, call: MockCall) {
    self.calls.lock().unwrap().push(call);
  }
}

#[async_trait]
impl HeroService for MockHeroService {
  async fn get_heroes(&self) -> Result<Vec<Hero>, Error> {
    self.record(MockCall::GetHeroes);
    if self.fail_get {
      return Err(Error::Service("Get heroes failed".to_string()));
    }
    Ok(self.heroes.clone())
  }

  async fn get_hero(&self, id: i64) -> Result<Hero, Error> {
    self.record(MockCall::GetHero(id));
    if self.fail_get {
      return Err(Error::Service("Get hero failed".to_string()));
    }
    self.heroes.iter().find(|hero| hero.id == id).cloned().ok_or(Error::NotFound(id))
  }

  async fn add_hero(&self, hero: &NewHero) -> Result<Hero, Error> {
    self.record(MockCall::AddHero(hero.clone()));
    match &self.added {
      Some(added) if !self.fail_add => Ok(added.clone()),
      _ => Err(Error::Service("Add hero failed".to_string())),
    }
  }

  async fn delete_hero(&self, id: i64) -> Result<(), Error> {
    self.record(MockCall::DeleteHero(id));
    if self.fail_delete {
      return Err(Error::Service("Delete hero failed".to_string()));
    }
    Ok(())
  }
}
