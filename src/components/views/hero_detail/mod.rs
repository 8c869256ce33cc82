pub mod view;

pub use view::HeroDetail;
