//! Idle screen rendering
//!
//! Writes a full-HD PNG with a clock and a short prompt. The text block moves by
//! a random offset on every render so a screen left idle for hours does not burn in.

pub mod canvas;
pub mod font;

use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use fontdue::Font;
use rand::Rng;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::PlayerConfig;
use crate::constants::splash;
use canvas::{Canvas, Rgb, text_width};

const CLOCK_COLOR: Rgb = [140, 140, 170];
const TITLE_COLOR: Rgb = [255, 255, 255];
const SUBTITLE_COLOR: Rgb = [180, 190, 220];
const SHADOW_COLOR: Rgb = [0, 0, 0];

/// Producer of the image shown while nothing plays
pub trait IdleScreen {
    /// Render the screen for the current time and return the image path
    fn generate(&self) -> Result<PathBuf>;
}

/// Clock text such as "9:05 am"
pub fn clock_text(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string().to_lowercase()
}

pub struct SplashRenderer {
    path: PathBuf,
    bold: Option<Font>,
    regular: Option<Font>,
}

impl SplashRenderer {
    /// Resolve fonts once; rendering falls back to a plain gradient without them
    pub fn new(config: &PlayerConfig) -> Self {
        let configured = config.splash_font.as_deref();
        Self {
            path: config.splash_path(),
            bold: font::load_first(configured, splash::BOLD_FONT_CANDIDATES),
            regular: font::load_first(configured, splash::REGULAR_FONT_CANDIDATES),
        }
    }

    #[cfg(test)]
    pub fn without_fonts(path: PathBuf) -> Self {
        Self {
            path,
            bold: None,
            regular: None,
        }
    }

    pub fn render(&self, time: NaiveTime) -> Canvas {
        let mut canvas = Canvas::new(splash::WIDTH, splash::HEIGHT);
        canvas.fill_gradient();

        let Some(bold) = &self.bold else {
            return canvas;
        };
        let regular = self.regular.as_ref().unwrap_or(bold);

        let mut rng = rand::rng();
        let ox = rng.random_range(-splash::JITTER_X..=splash::JITTER_X);
        let oy = rng.random_range(-splash::JITTER_Y..=splash::JITTER_Y);

        let title_y = splash::TITLE_Y + oy;
        let lines = [
            (bold, splash::CLOCK_SIZE, clock_text(time), splash::CLOCK_Y + oy, CLOCK_COLOR, 4),
            (bold, splash::TITLE_SIZE, splash::TITLE.to_string(), title_y, TITLE_COLOR, 3),
            (regular, splash::SUBTITLE_SIZE, splash::SUBTITLE.to_string(), title_y + splash::SUBTITLE_GAP, SUBTITLE_COLOR, 2),
        ];

        for (font, size, text, y, color, shadow) in lines {
            let x = (canvas.width() as i32 - text_width(font, size, &text)) / 2 + ox;
            canvas.draw_text(font, size, &text, x + shadow, y + shadow, SHADOW_COLOR);
            canvas.draw_text(font, size, &text, x, y, color);
        }

        canvas
    }
}

impl IdleScreen for SplashRenderer {
    fn generate(&self) -> Result<PathBuf> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        if self.bold.is_none() {
            warn!("Rendering idle screen without text, no font available");
        }

        self.render(Local::now().time()).write_png(&self.path)?;
        debug!(path = %self.path.display(), "Idle screen rendered");
        Ok(self.path.clone())
    }
}
