pub mod error_view;
pub mod hero_detail;
pub mod hero_list;

pub use error_view::view::ErrorView;
pub use hero_detail::HeroDetail;
pub use hero_list::HeroList;
