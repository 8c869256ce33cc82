pub mod in_memory_hero_service;
#[cfg(test)]
pub mod mock_hero_service;
pub mod types;

pub use in_memory_hero_service::InMemoryHeroService;
pub use types::{Hero, HeroService, NewHero};
