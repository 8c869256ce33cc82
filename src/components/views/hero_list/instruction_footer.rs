use ratatui::{
  layout::Rect,
  style::{Color, Style},
  widgets::{Block, Borders, Paragraph},
};

use crate::tui::Frame;

#[derive(Default)]
pub struct InstructionFooter {}

impl InstructionFooter {
  pub fn instructions(&self, input_mode: bool, has_selection: bool) -> Vec<&'static str> {
    if input_mode {
      return vec!["enter: Add", "esc: Cancel"];
    }
    let mut instructions = vec!["q: Quit", "a: Add hero"];
    if has_selection {
      instructions.push("enter: Details");
      instructions.push("d: Delete");
    }
    instructions.push("r: Reload");
    instructions
  }

  pub fn render(&self, frame: &mut Frame<'_>, area: Rect, input_mode: bool, has_selection: bool) {
    let text = self.instructions(input_mode, has_selection).join(" | ");
    let paragraph =
      Paragraph::new(text).block(Block::default().borders(Borders::ALL)).style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
  }
}
