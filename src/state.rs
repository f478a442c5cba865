use std::collections::{HashMap, VecDeque};

use chrono::Local;

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueEntry {
    pub id: String,
    pub display_name: String,
    pub tags: Vec<String>,
    pub image_ref: String,
}

/// EntityId -> EntityKey for one catalogue load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityKeyIndex {
    keys: HashMap<String, String>,
}

impl EntityKeyIndex {
    pub fn insert(&mut self, entity_id: impl Into<String>, key: impl Into<String>) {
        self.keys.insert(entity_id.into(), key.into());
    }

    pub fn get(&self, entity_id: &str) -> Option<&str> {
        self.keys.get(entity_id).map(String::as_str)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.keys.contains_key(entity_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(String, String)> for EntityKeyIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalogue {
    /// Sorted by display name.
    pub entries: Vec<CatalogueEntry>,
    pub key_index: EntityKeyIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ability {
    pub name: String,
    pub description: String,
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skin {
    pub num: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDetail {
    pub id: String,
    pub display_name: String,
    pub title: String,
    pub tags: Vec<String>,
    pub difficulty: u8,
    pub blurb: String,
    pub passive: Ability,
    /// At most four, in Q/W/E/R order.
    pub spells: Vec<Ability>,
    pub skins: Vec<Skin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubResourceTag {
    #[default]
    Passive,
    Q,
    W,
    E,
    R,
}

impl SubResourceTag {
    pub const ALL: [SubResourceTag; 5] = [
        SubResourceTag::Passive,
        SubResourceTag::Q,
        SubResourceTag::W,
        SubResourceTag::E,
        SubResourceTag::R,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SubResourceTag::Passive => "passive",
            SubResourceTag::Q => "q",
            SubResourceTag::W => "w",
            SubResourceTag::E => "e",
            SubResourceTag::R => "r",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    /// Index into `EntityDetail::spells`; `None` for the passive.
    pub fn spell_index(self) -> Option<usize> {
        match self {
            SubResourceTag::Passive => None,
            SubResourceTag::Q => Some(0),
            SubResourceTag::W => Some(1),
            SubResourceTag::E => Some(2),
            SubResourceTag::R => Some(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleSource {
    Remote,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleList {
    pub locales: Vec<String>,
    pub source: LocaleSource,
}

/// Work the orchestrator asks the provider to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    ResolveVersion,
    ResolveLocales,
    LoadCatalogue {
        generation: u64,
        version: String,
        locale: String,
    },
    LoadDetail {
        generation: u64,
        version: String,
        locale: String,
        entity_id: String,
    },
}

/// Results posted back by the provider; catalogue and detail echo their generation.
#[derive(Debug, Clone)]
pub enum Delta {
    VersionResolved(Result<String, PipelineError>),
    LocalesResolved(LocaleList),
    CatalogueLoaded {
        generation: u64,
        locale: String,
        result: Result<Catalogue, PipelineError>,
    },
    DetailLoaded {
        generation: u64,
        locale: String,
        entity_id: String,
        result: Result<EntityDetail, PipelineError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    ResolvingVersion,
    ResolvingLocales,
    LoadingCatalogue,
    LoadingDetail,
    Ready,
    LocaleChanging,
    Failed,
}

impl PipelinePhase {
    pub fn is_startup(self) -> bool {
        matches!(
            self,
            PipelinePhase::Idle
                | PipelinePhase::ResolvingVersion
                | PipelinePhase::ResolvingLocales
                | PipelinePhase::LoadingCatalogue
                | PipelinePhase::LoadingDetail
        )
    }

    pub fn is_interactive(self) -> bool {
        matches!(self, PipelinePhase::Ready | PipelinePhase::LocaleChanging)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MediaSlot {
    #[default]
    Closed,
    Open {
        entity_id: String,
        tag: SubResourceTag,
        locator: String,
    },
    Unavailable {
        notice: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    VersionResolved {
        version: String,
    },
    LocalesResolved {
        count: usize,
        fallback: bool,
    },
    CatalogueLoaded {
        generation: u64,
        locale: String,
        count: usize,
    },
    DetailLoaded {
        entity_id: String,
        locale: String,
    },
    SubResourceSelected {
        entity_id: String,
        tag: SubResourceTag,
    },
    LocaleChanged {
        locale: String,
    },
    MediaChanged(MediaSlot),
    Fatal {
        notice: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDetail {
    pub detail: EntityDetail,
    /// Locale the detail was fetched under.
    pub locale: String,
}

/// Session state. Written only by the orchestrator; everything else reads through accessors.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    version: Option<String>,
    locales: Vec<String>,
    locale: String,
    catalogue_locale: Option<String>,
    entries: Vec<CatalogueEntry>,
    key_index: EntityKeyIndex,
    selected_entity: Option<String>,
    active_detail: Option<ActiveDetail>,
    active_sub_resource: SubResourceTag,
    active_skin: u32,
    media: MediaSlot,
    search: String,
}

impl SelectionState {
    pub fn new(initial_locale: impl Into<String>) -> Self {
        Self {
            locale: initial_locale.into(),
            ..Self::default()
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Locale of the catalogue currently held, which lags `locale` while a change is in flight.
    pub fn catalogue_locale(&self) -> Option<&str> {
        self.catalogue_locale.as_deref()
    }

    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    pub fn key_index(&self) -> &EntityKeyIndex {
        &self.key_index
    }

    pub fn selected_entity(&self) -> Option<&str> {
        self.selected_entity.as_deref()
    }

    pub fn active_detail(&self) -> Option<&ActiveDetail> {
        self.active_detail.as_ref()
    }

    pub fn active_sub_resource(&self) -> SubResourceTag {
        self.active_sub_resource
    }

    pub fn active_skin(&self) -> u32 {
        self.active_skin
    }

    pub fn media(&self) -> &MediaSlot {
        &self.media
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn contains_entity(&self, entity_id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == entity_id)
    }

    /// Sorted entries whose display name contains the search query, case-insensitively.
    pub fn filtered_entries(&self) -> Vec<&CatalogueEntry> {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|entry| entry.display_name.to_lowercase().contains(&needle))
            .collect()
    }

    pub(crate) fn set_version(&mut self, version: String) {
        self.version = Some(version);
    }

    pub(crate) fn set_locales(&mut self, locales: Vec<String>) {
        self.locales = locales;
    }

    pub(crate) fn set_locale(&mut self, locale: String) {
        self.locale = locale;
    }

    /// Swaps entries and index together so both always describe the same load.
    pub(crate) fn replace_catalogue(&mut self, catalogue: Catalogue, locale: String) {
        let Catalogue { entries, key_index } = catalogue;
        self.entries = entries;
        self.key_index = key_index;
        self.catalogue_locale = Some(locale);
    }

    pub(crate) fn set_selected_entity(&mut self, entity_id: Option<String>) {
        self.selected_entity = entity_id;
    }

    pub(crate) fn set_active_detail(&mut self, detail: EntityDetail, locale: String) {
        self.active_detail = Some(ActiveDetail { detail, locale });
        self.active_sub_resource = SubResourceTag::Passive;
        self.active_skin = 0;
    }

    pub(crate) fn clear_active_detail(&mut self) {
        self.active_detail = None;
        self.active_sub_resource = SubResourceTag::Passive;
        self.active_skin = 0;
    }

    pub(crate) fn set_active_sub_resource(&mut self, tag: SubResourceTag) {
        self.active_sub_resource = tag;
    }

    pub(crate) fn set_active_skin(&mut self, num: u32) {
        self.active_skin = num;
    }

    /// Returns the slot that was released.
    pub(crate) fn release_media(&mut self) -> MediaSlot {
        std::mem::take(&mut self.media)
    }

    pub(crate) fn set_media(&mut self, media: MediaSlot) {
        self.media = media;
    }

    pub(crate) fn set_search(&mut self, query: String) {
        self.search = query;
    }
}

/// Bounded console shown in the bottom pane.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    lines: VecDeque<String>,
}

impl ConsoleLog {
    const MAX_LINES: usize = 200;

    pub fn push(&mut self, msg: impl Into<String>) {
        let stamp = Local::now().format("%H:%M:%S");
        self.lines.push_back(format!("{stamp} {}", msg.into()));
        while self.lines.len() > Self::MAX_LINES {
            self.lines.pop_front();
        }
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &String> + ExactSizeIterator {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}
