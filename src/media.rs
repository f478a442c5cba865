use crate::error::PipelineError;
use crate::state::{EntityKeyIndex, SubResourceTag};

pub const DEFAULT_MEDIA_BASE_URL: &str = "https://d28xe8vt774jo5.cloudfront.net";

/// Ability-video code for a raw sub-resource tag. Anything unrecognised plays the passive clip.
pub fn media_code(tag: &str) -> &'static str {
    match SubResourceTag::parse(tag) {
        Some(SubResourceTag::Q) => "Q1",
        Some(SubResourceTag::W) => "W1",
        Some(SubResourceTag::E) => "E1",
        Some(SubResourceTag::R) => "R1",
        Some(SubResourceTag::Passive) | None => "P1",
    }
}

pub fn pad_entity_key(key: &str) -> String {
    format!("{key:0>4}")
}

/// Builds every client-side locator: portraits, splash art, ability icons and videos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLocator {
    base_url: String,
    media_base_url: String,
}

impl MediaLocator {
    pub fn new(base_url: impl Into<String>, media_base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            media_base_url: media_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Video locator for `entity_id`'s `tag` ability; fails when the entity has no known key.
    pub fn build_media_reference(
        &self,
        index: &EntityKeyIndex,
        entity_id: &str,
        tag: &str,
    ) -> Result<String, PipelineError> {
        let Some(key) = index.get(entity_id) else {
            return Err(PipelineError::MediaUnavailable(entity_id.to_string()));
        };
        let padded = pad_entity_key(key);
        let code = media_code(tag);
        Ok(format!(
            "{}/champion-abilities/{padded}/ability_{padded}_{code}.webm",
            self.media_base_url
        ))
    }

    pub fn portrait_url(&self, version: &str, image_ref: &str) -> String {
        format!("{}/cdn/{version}/img/champion/{image_ref}", self.base_url)
    }

    pub fn splash_url(&self, entity_id: &str, skin_num: u32) -> String {
        format!(
            "{}/cdn/img/champion/splash/{entity_id}_{skin_num}.jpg",
            self.base_url
        )
    }

    pub fn passive_icon_url(&self, version: &str, image_ref: &str) -> String {
        format!("{}/cdn/{version}/img/passive/{image_ref}", self.base_url)
    }

    pub fn spell_icon_url(&self, version: &str, image_ref: &str) -> String {
        format!("{}/cdn/{version}/img/spell/{image_ref}", self.base_url)
    }
}
