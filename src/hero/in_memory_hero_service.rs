use std::{path::Path, sync::Mutex};

use async_trait::async_trait;
use tracing::{info, warn};

use super::{Hero, HeroService, NewHero};
use crate::error::Error;

/// Hero store that lives for the length of the process. Ids are issued here and nowhere else.
pub struct InMemoryHeroService {
  heroes: Mutex<Vec<Hero>>,
}

impl InMemoryHeroService {
  pub fn new(heroes: Vec<Hero>) -> Self {
    InMemoryHeroService { heroes: Mutex::new(heroes) }
  }

  /// Seeds the store from a JSON array of heroes.
  pub fn from_json_file(path: &Path) -> Result<Self, Error> {
    info!("Loading heroes from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    let heroes: Vec<Hero> = serde_json::from_str(&contents)?;
    Ok(InMemoryHeroService::new(heroes))
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Hero>>, Error> {
    self.heroes.lock().map_err(|_| Error::Service("Hero store lock poisoned".to_string()))
  }
}

#[async_trait]
impl HeroService for InMemoryHeroService {
  async fn get_heroes(&self) -> Result<Vec<Hero>, Error> {
    Ok(self.lock()?.clone())
  }

  async fn get_hero(&self, id: i64) -> Result<Hero, Error> {
    self.lock()?.iter().find(|hero| hero.id == id).cloned().ok_or(Error::NotFound(id))
  }

  async fn add_hero(&self, hero: &NewHero) -> Result<Hero, Error> {
    let name = hero.name.trim();
    if name.is_empty() {
      return Err(Error::InvalidName);
    }
    let mut heroes = self.lock()?;
    let id = heroes.iter().map(|h| h.id).max().unwrap_or(0) + 1;
    let created = Hero::new(id, name, 0);
    info!("Created hero {} with id {}", created.name, created.id);
    heroes.push(created.clone());
    Ok(created)
  }

  async fn delete_hero(&self, id: i64) -> Result<(), Error> {
    let mut heroes = self.lock()?;
    let Some(index) = heroes.iter().position(|hero| hero.id == id) else {
      warn!("Attempted to delete missing hero {}", id);
      return Err(Error::NotFound(id));
    };
    let removed = heroes.remove(index);
    info!("Deleted hero {} with id {}", removed.name, removed.id);
    Ok(())
  }
}
