use serde::{Deserialize, Serialize};

use crate::{error::Error, route::Route};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
  pub id: i64,
  pub name: String,
  pub strength: i64,
}

impl Hero {
  pub fn new(id: i64, name: impl Into<String>, strength: i64) -> Self {
    Hero { id, name: name.into(), strength }
  }

  /// The detail route for this hero, `/detail/{id}`.
  pub fn route(&self) -> Route {
    Route::Detail(self.id)
  }
}

/// The partial record handed to [`HeroService::add_hero`]. The service assigns the id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHero {
  pub name: String,
}

impl NewHero {
  pub fn new(name: impl Into<String>) -> Self {
    NewHero { name: name.into() }
  }
}

#[async_trait::async_trait]
pub trait HeroService: Send + Sync {
  async fn get_heroes(&self) -> Result<Vec<Hero>, Error>;
  async fn get_hero(&self, id: i64) -> Result<Hero, Error>;
  async fn add_hero(&self, hero: &NewHero) -> Result<Hero, Error>;
  async fn delete_hero(&self, id: i64) -> Result<(), Error>;
}
