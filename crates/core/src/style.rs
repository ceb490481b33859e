//! Companion visual styles and their static configuration tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Anime,
    Cyberpunk,
    Fantasy,
}

pub const ALL_STYLES: [Style; 3] = [Style::Anime, Style::Cyberpunk, Style::Fantasy];

/// Static per-style configuration.
pub struct StyleProfile {
    pub name: &'static str,
    pub title: &'static str,
    pub personality: &'static str,
    pub prompt: &'static str,
    pub palette: [&'static str; 4],
}

const PROFILES: [StyleProfile; 3] = [
    StyleProfile {
        name: "anime",
        title: "Anime",
        personality: "cheerful, energetic, expressive, uses emoticons, friendly and supportive",
        prompt: "anime style, vibrant colors, detailed eyes, soft shading, beautiful character art, \
                 high quality, studio ghibli inspired, cel shaded",
        palette: ["ff6b9d", "c084fc", "67e8f9", "fbbf24"],
    },
    StyleProfile {
        name: "cyberpunk",
        title: "Cyberpunk",
        personality: "tech-savvy, cool, mysterious, uses modern slang, slightly sarcastic but caring",
        prompt: "cyberpunk style, neon colors, futuristic, high tech, chrome accents, \
                 holographic elements, blade runner aesthetic, digital art",
        palette: ["22d3ee", "a855f7", "f472b6", "84cc16"],
    },
    StyleProfile {
        name: "fantasy",
        title: "Fantasy",
        personality: "mystical, wise, gentle, speaks poetically, magical and enchanting",
        prompt: "fantasy art style, magical, ethereal glow, detailed illustration, \
                 mystical atmosphere, enchanted, fairy tale aesthetic, digital painting",
        palette: ["a78bfa", "f472b6", "34d399", "fcd34d"],
    },
];

/// Terms the image provider is asked to avoid for every style.
pub const NEGATIVE_PROMPT: &str = "low quality, blurry, distorted, deformed, ugly, bad anatomy, \
     bad hands, extra limbs, duplicate, watermark, signature, text, cropped";

impl Style {
    pub fn profile(self) -> &'static StyleProfile {
        match self {
            Self::Anime => &PROFILES[0],
            Self::Cyberpunk => &PROFILES[1],
            Self::Fantasy => &PROFILES[2],
        }
    }

    pub fn as_str(self) -> &'static str {
        self.profile().name
    }

    /// Full positive prompt for a companion portrait.
    pub fn portrait_prompt(self, name: &str) -> String {
        format!(
            "portrait of a cute virtual companion named {name}, friendly expression, \
             looking at viewer, {}, masterpiece, best quality",
            self.profile().prompt
        )
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = CoreError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_STYLES
            .into_iter()
            .find(|style| style.as_str() == wanted)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid style. Must be one of: {}",
                    ALL_STYLES.map(Style::as_str).join(", ")
                ))
            })
    }
}

/// Deterministic placeholder avatar URLs for `style`.
///
/// Cycles through the style palette; the same inputs always produce the
/// same list.
pub fn placeholders(style: Style, count: usize) -> Vec<String> {
    let profile = style.profile();
    (0..count)
        .map(|i| {
            let color = profile.palette[i % profile.palette.len()];
            format!(
                "https://via.placeholder.com/512x512/{color}/ffffff?text={}+Avatar+{}",
                profile.title,
                i + 1
            )
        })
        .collect()
}
