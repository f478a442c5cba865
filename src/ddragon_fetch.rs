use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::PipelineError;
use crate::fetch::JsonFetcher;
use crate::locale::{dedup_locales, fallback_locales};
use crate::state::{
    Ability, Catalogue, CatalogueEntry, EntityDetail, EntityKeyIndex, LocaleList, LocaleSource,
    Skin,
};

pub const DEFAULT_BASE_URL: &str = "https://ddragon.leagueoflegends.com";

const MAX_SPELLS: usize = 4;

pub fn versions_url(base: &str) -> String {
    format!("{base}/api/versions.json")
}

pub fn languages_url(base: &str) -> String {
    format!("{base}/cdn/languages.json")
}

pub fn catalogue_url(base: &str, version: &str, locale: &str) -> String {
    format!("{base}/cdn/{version}/data/{locale}/champion.json")
}

pub fn detail_url(base: &str, version: &str, locale: &str, entity_id: &str) -> String {
    format!("{base}/cdn/{version}/data/{locale}/champion/{entity_id}.json")
}

/// The four loaders, sharing one fetcher and base URL.
#[derive(Clone)]
pub struct DdragonClient {
    base_url: String,
    fetcher: Arc<dyn JsonFetcher>,
}

impl DdragonClient {
    pub fn new(base_url: impl Into<String>, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resolve_latest_version(&self) -> Result<String, PipelineError> {
        let body = self.fetcher.fetch_body(&versions_url(&self.base_url))?;
        parse_versions_json(&body)
    }

    /// Never fails: any transport or parse problem yields the fallback list.
    pub fn resolve_locales(&self) -> LocaleList {
        let parsed = self
            .fetcher
            .fetch_body(&languages_url(&self.base_url))
            .map_err(PipelineError::from)
            .and_then(|body| parse_languages_json(&body));
        match parsed {
            Ok(locales) => LocaleList {
                locales,
                source: LocaleSource::Remote,
            },
            Err(err) => LocaleList {
                locales: fallback_locales(),
                source: LocaleSource::Fallback {
                    reason: err.to_string(),
                },
            },
        }
    }

    pub fn load_catalogue(&self, version: &str, locale: &str) -> Result<Catalogue, PipelineError> {
        let body = self
            .fetcher
            .fetch_body(&catalogue_url(&self.base_url, version, locale))?;
        parse_catalogue_json(&body)
    }

    pub fn load_detail(
        &self,
        version: &str,
        locale: &str,
        entity_id: &str,
    ) -> Result<EntityDetail, PipelineError> {
        let body = self
            .fetcher
            .fetch_body(&detail_url(&self.base_url, version, locale, entity_id))?;
        parse_detail_json(&body, entity_id)
    }
}

#[derive(Debug, Deserialize)]
struct RawImage {
    full: String,
}

#[derive(Debug, Deserialize)]
struct RawCatalogueChampion {
    id: String,
    key: String,
    name: String,
    #[serde(default)]
    tags: Vec<String>,
    image: Option<RawImage>,
}

#[derive(Debug, Deserialize)]
struct ChampionEnvelope<T> {
    data: Option<BTreeMap<String, T>>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(default)]
    difficulty: u8,
}

#[derive(Debug, Deserialize)]
struct RawAbility {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    image: Option<RawImage>,
}

#[derive(Debug, Deserialize)]
struct RawSkin {
    num: u32,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawChampionDetail {
    id: String,
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    tags: Vec<String>,
    info: Option<RawInfo>,
    #[serde(default)]
    blurb: String,
    passive: Option<RawAbility>,
    #[serde(default)]
    spells: Vec<RawAbility>,
    #[serde(default)]
    skins: Vec<RawSkin>,
}

pub fn parse_versions_json(raw: &str) -> Result<String, PipelineError> {
    let versions: Vec<String> = serde_json::from_str(raw.trim())
        .map_err(|err| PipelineError::DataUnavailable(format!("invalid versions json: {err}")))?;
    versions
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::DataUnavailable("No version data available".to_string()))
}

pub fn parse_languages_json(raw: &str) -> Result<Vec<String>, PipelineError> {
    let codes: Vec<String> = serde_json::from_str(raw.trim())
        .map_err(|err| PipelineError::DataUnavailable(format!("invalid languages json: {err}")))?;
    let locales = dedup_locales(codes);
    if locales.is_empty() {
        return Err(PipelineError::DataUnavailable(
            "empty language list".to_string(),
        ));
    }
    Ok(locales)
}

/// One pass over the raw collection: every entry lands in the index and in the sorted entries.
pub fn parse_catalogue_json(raw: &str) -> Result<Catalogue, PipelineError> {
    let envelope: ChampionEnvelope<RawCatalogueChampion> = serde_json::from_str(raw.trim())
        .map_err(|err| PipelineError::DataUnavailable(format!("invalid champion json: {err}")))?;
    let Some(data) = envelope.data else {
        return Err(PipelineError::DataUnavailable(
            "Invalid champion data format".to_string(),
        ));
    };

    let mut key_index = EntityKeyIndex::default();
    let mut entries = Vec::with_capacity(data.len());
    for champion in data.into_values() {
        key_index.insert(champion.id.clone(), champion.key);
        entries.push(CatalogueEntry {
            id: champion.id,
            display_name: champion.name,
            tags: champion.tags,
            image_ref: champion.image.map(|img| img.full).unwrap_or_default(),
        });
    }
    sort_by_display_name(&mut entries);

    Ok(Catalogue { entries, key_index })
}

pub fn parse_detail_json(raw: &str, entity_id: &str) -> Result<EntityDetail, PipelineError> {
    let envelope: ChampionEnvelope<RawChampionDetail> = serde_json::from_str(raw.trim())
        .map_err(|err| {
            PipelineError::DataUnavailable(format!("invalid detail json for {entity_id}: {err}"))
        })?;
    let Some(champion) = envelope.data.and_then(|mut data| data.remove(entity_id)) else {
        return Err(PipelineError::DataUnavailable(format!(
            "no detail record for {entity_id}"
        )));
    };

    Ok(EntityDetail {
        id: champion.id,
        display_name: champion.name,
        title: champion.title,
        tags: champion.tags,
        difficulty: champion.info.map(|info| info.difficulty).unwrap_or(0),
        blurb: champion.blurb,
        passive: champion.passive.map(ability_from_raw).unwrap_or_else(|| Ability {
            name: String::new(),
            description: String::new(),
            image_ref: String::new(),
        }),
        spells: champion
            .spells
            .into_iter()
            .take(MAX_SPELLS)
            .map(ability_from_raw)
            .collect(),
        skins: champion
            .skins
            .into_iter()
            .map(|skin| Skin {
                num: skin.num,
                name: skin.name,
            })
            .collect(),
    })
}

fn ability_from_raw(raw: RawAbility) -> Ability {
    Ability {
        name: raw.name,
        description: raw.description,
        image_ref: raw.image.map(|img| img.full).unwrap_or_default(),
    }
}

/// Case-folded comparison first so "aurelion" and "Aurelion" sit together, raw order breaks ties.
pub fn sort_by_display_name(entries: &mut [CatalogueEntry]) {
    entries.sort_by_cached_key(|entry| {
        (
            entry.display_name.to_lowercase(),
            entry.display_name.clone(),
            entry.id.clone(),
        )
    });
}
