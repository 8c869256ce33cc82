pub mod list;

mod hero_input;
mod hero_item;
mod instruction_footer;

pub use hero_input::HeroInput;
pub use hero_item::{HeroItem, ItemEvent};
pub use instruction_footer::InstructionFooter;
pub use list::HeroList;
