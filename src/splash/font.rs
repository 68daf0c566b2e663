//! Font discovery via fontconfig and loading with fontdue

use anyhow::{Context, Result};
use fontconfig::{Fontconfig, Pattern};
use fontdue::{Font, FontSettings};
use std::ffi::CString;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Style suffixes recognised in full font names, longest first
const KNOWN_STYLES: &[&str] = &[
    "Bold Oblique",
    "Bold Italic",
    "ExtraBold",
    "SemiBold",
    "Bold",
    "Medium",
    "Book",
    "Regular",
    "Light",
    "Oblique",
    "Italic",
];

/// Split "DejaVu Sans Bold" into ("DejaVu Sans", Some("Bold"))
fn parse_font_name(font_name: &str) -> (&str, Option<&str>) {
    for style in KNOWN_STYLES {
        if let Some(prefix) = font_name.strip_suffix(style)
            && prefix.ends_with(' ')
        {
            let family = prefix.trim();
            if !family.is_empty() {
                return (family, Some(style));
            }
        }
    }
    (font_name, None)
}

/// Resolve a family (optionally with a style suffix) to a font file
pub fn find_font_path(font_name: &str) -> Result<PathBuf> {
    let fc = Fontconfig::new().context("Failed to initialize fontconfig")?;
    let (family, style) = parse_font_name(font_name);

    let mut pattern = Pattern::new(&fc);
    let family_cstr = CString::new(family).with_context(|| format!("Invalid family name: {}", family))?;
    pattern.add_string(fontconfig::FC_FAMILY, &family_cstr);
    if let Some(style) = style {
        let style_cstr = CString::new(style).with_context(|| format!("Invalid style name: {}", style))?;
        pattern.add_string(fontconfig::FC_STYLE, &style_cstr);
    }

    let matched = pattern.font_match();

    // fontconfig always returns something; a different family means ours is not installed
    if let Some(matched_family) = matched.get_string(fontconfig::FC_FAMILY)
        && !matched_family.eq_ignore_ascii_case(family)
    {
        anyhow::bail!("Font '{}' not found, fontconfig offered '{}'", font_name, matched_family);
    }

    let path = PathBuf::from(
        matched
            .filename()
            .with_context(|| format!("No font file found for '{}'", font_name))?,
    );
    if !path.exists() {
        anyhow::bail!("Font file '{}' does not exist", path.display());
    }

    debug!(font = font_name, family, style = ?style, path = %path.display(), "Resolved font");
    Ok(path)
}

pub fn load_font(font_name: &str) -> Result<Font> {
    let path = find_font_path(font_name)?;
    let data = fs::read(&path).with_context(|| format!("Failed to read font file {}", path.display()))?;
    Font::from_bytes(data, FontSettings::default())
        .map_err(|e| anyhow::anyhow!("Failed to parse font file '{}': {}", path.display(), e))
}

/// Load the configured font if any, else the first candidate that is installed
pub fn load_first(configured: Option<&str>, candidates: &[&str]) -> Option<Font> {
    let configured = configured.filter(|name| !name.trim().is_empty());

    for name in configured.into_iter().chain(candidates.iter().copied()) {
        match load_font(name) {
            Ok(font) => {
                info!(font = name, "Loaded splash font");
                return Some(font);
            }
            Err(e) => debug!(font = name, error = %e, "Font unavailable"),
        }
    }

    warn!(candidates = ?candidates, "No usable font found for the idle screen");
    None
}
