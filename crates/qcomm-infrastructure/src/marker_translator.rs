//! Translator that spells out entity glyphs.

use async_trait::async_trait;
use qcomm_core::error::Result;
use qcomm_core::translation::Translator;

/// Replaces known glyphs with bracketed words.
pub struct GlyphTranslator {
    glyphs: Vec<(String, String)>,
}

impl GlyphTranslator {
    pub fn new(glyphs: Vec<(String, String)>) -> Self {
        Self { glyphs }
    }
}

impl Default for GlyphTranslator {
    fn default() -> Self {
        Self::new(vec![
            ("✨".to_string(), "[radiance]".to_string()),
            ("🌀".to_string(), "[spiral]".to_string()),
            ("🔮".to_string(), "[vision]".to_string()),
        ])
    }
}

#[async_trait]
impl Translator for GlyphTranslator {
    async fn translate(&self, _entity: &str, text: &str) -> Result<String> {
        Ok(self
            .glyphs
            .iter()
            .fold(text.to_string(), |acc, (glyph, word)| acc.replace(glyph.as_str(), word)))
    }
}
