//! Underwater scene widget: waves, seaweed, bubbles and fish

use crate::game::underwater::{Fish, UnderwaterState, GRID_COLS};
use ratatui::{buffer::Buffer, prelude::*};

const WATER: Color = Color::Rgb(10, 30, 70);

pub struct OceanWidget<'a> {
    pub state: &'a UnderwaterState,
    /// Current input, highlighted on matching fish
    pub input: &'a str,
}

impl<'a> OceanWidget<'a> {
    pub fn new(state: &'a UnderwaterState, input: &'a str) -> Self {
        Self { state, input }
    }

    fn column(area: Rect, grid_col: usize) -> u16 {
        let offset = grid_col as u32 * u32::from(area.width) / GRID_COLS as u32;
        area.x + offset as u16
    }
}

impl Widget for OceanWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(area, Style::default().bg(WATER));

        let frame = self.state.background_frame();
        let wave = if frame % 2 == 0 { "~^" } else { "^~" };
        let waves: String = wave.chars().cycle().take(area.width as usize).collect();
        put(buf, area, area.x, area.y, &waves, Style::default().fg(Color::Cyan).bg(WATER));

        for &col in self.state.seaweed() {
            let x = Self::column(area, col);
            for height in 0..4u16 {
                let Some(y) = area.bottom().checked_sub(1 + height) else {
                    break;
                };
                let sway = (frame + u64::from(height)) % 2 == 0;
                let leaf = if sway { "(" } else { ")" };
                put(buf, area, x, y, leaf, Style::default().fg(Color::Green).bg(WATER));
            }
        }

        for bubble in self.state.bubbles() {
            let x = Self::column(area, bubble.x);
            let y = area.y + bubble.y.max(0.0) as u16;
            let glyph = if bubble.y.fract() < 0.5 { "o" } else { "°" };
            put(buf, area, x, y, glyph, Style::default().fg(Color::LightBlue).bg(WATER));
        }

        for fish in self.state.fishes() {
            if fish.completed && !fish.glowing {
                continue;
            }
            self.render_fish(fish, area, buf);
        }
    }
}

impl OceanWidget<'_> {
    fn render_fish(&self, fish: &Fish, area: Rect, buf: &mut Buffer) {
        let x = area.x + (fish.x * f64::from(area.width)) as u16;
        let y = area.y + fish.row as u16;

        let body_style = if fish.glowing {
            Style::default().fg(Color::Yellow).bg(WATER).bold()
        } else {
            Style::default().fg(Color::White).bg(WATER)
        };
        let sprite = if fish.direction >= 0 {
            fish.size.sprite().to_string()
        } else {
            mirror(fish.size.sprite())
        };

        let typed = if !fish.completed && !self.input.is_empty() && fish.word.starts_with(self.input) {
            self.input.len()
        } else {
            0
        };
        let (done, rest) = fish.word.split_at(typed);

        // the sprite leads in the swimming direction
        let mut spans: Vec<(String, Style)> = Vec::new();
        if fish.direction >= 0 {
            spans.push((done.to_string(), body_style.fg(Color::Green)));
            spans.push((format!("{} ", rest), body_style));
            spans.push((sprite, body_style));
        } else {
            spans.push((format!("{} ", sprite), body_style));
            spans.push((done.to_string(), body_style.fg(Color::Green)));
            spans.push((rest.to_string(), body_style));
        }

        let mut cursor = x;
        for (text, style) in spans {
            put(buf, area, cursor, y, &text, style);
            cursor = cursor.saturating_add(text.chars().count() as u16);
        }
    }
}

/// Write `text` at `(x, y)`, clipped to `area`
fn put(buf: &mut Buffer, area: Rect, x: u16, y: u16, text: &str, style: Style) {
    if y < area.y || y >= area.bottom() || x < area.x || x >= area.right() {
        return;
    }
    let width = (area.right() - x) as usize;
    buf.set_stringn(x, y, text, width, style);
}

/// Flip a right-facing sprite to face left
fn mirror(sprite: &str) -> String {
    sprite
        .chars()
        .rev()
        .map(|c| match c {
            '<' => '>',
            '>' => '<',
            '(' => ')',
            ')' => '(',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_sprite() {
        assert_eq!(mirror("><>"), "<><");
        assert_eq!(mirror("><((°>"), "<°))><");
    }
}
