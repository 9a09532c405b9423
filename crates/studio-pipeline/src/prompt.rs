//! Prompt text sent to the generation services

use studio_store::{BrandPalette, RunBrief};

/// System message for caption generation
pub const CAPTION_SYSTEM_PROMPT: &str = "You are a highly viral social media ad copy expert.";

/// Text-to-image prompt for one ad creative
#[must_use]
pub fn ad_prompt(brief: &RunBrief, palette: BrandPalette, slogan: &str) -> String {
    let [primary, secondary] = palette.hex();
    format!(
        "Create a completely new {style} ad creative for {audience}. \
         Use brand colors {primary} and {secondary}. Tone: {tone}. \
         Include slogan reference '{slogan}'. \
         Modern composition with bold typography and strong CTA.",
        style = brief.style,
        audience = brief.audience,
        tone = brief.tone,
    )
}

/// User message for caption generation
#[must_use]
pub fn caption_prompt(product: &str, audience: &str, tone: &str) -> String {
    format!(
        "Write a new, short, {tone} marketing caption for {product} targeting {audience}. \
         Use emojis and include a strong CTA."
    )
}
