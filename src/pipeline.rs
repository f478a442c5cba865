use std::sync::mpsc::{self, Receiver, Sender};

use crate::config::ClientConfig;
use crate::error::PipelineError;
use crate::format::skin_choices;
use crate::locale::cycle_locale;
use crate::media::MediaLocator;
use crate::state::{
    Catalogue, ConsoleLog, Delta, EntityDetail, LocaleList, LocaleSource, MediaSlot,
    PipelineEvent, PipelinePhase, ProviderCommand, SelectionState, SubResourceTag,
};

pub const FATAL_NOTICE: &str =
    "There was an error loading data from Riot API. Please try again later.";
pub const MEDIA_UNAVAILABLE_NOTICE: &str = "Video unavailable for this champion";

/// Sequences the loaders and owns every write to `SelectionState`.
///
/// Methods return the next `ProviderCommand` to run, if any. Catalogue and
/// detail requests carry a generation; results whose generation is no longer
/// current are dropped, so the most recently issued request always wins.
pub struct Pipeline {
    state: SelectionState,
    phase: PipelinePhase,
    catalogue_generation: u64,
    detail_generation: u64,
    detail_loading: bool,
    fatal_notice: Option<String>,
    locator: MediaLocator,
    console: ConsoleLog,
    listeners: Vec<Sender<PipelineEvent>>,
}

impl Pipeline {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            state: SelectionState::new(config.initial_locale.clone()),
            phase: PipelinePhase::Idle,
            catalogue_generation: 0,
            detail_generation: 0,
            detail_loading: false,
            fatal_notice: None,
            locator: MediaLocator::new(config.base_url.clone(), config.media_base_url.clone()),
            console: ConsoleLog::default(),
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    pub fn fatal_notice(&self) -> Option<&str> {
        self.fatal_notice.as_deref()
    }

    pub fn is_detail_loading(&self) -> bool {
        self.detail_loading
    }

    pub fn catalogue_generation(&self) -> u64 {
        self.catalogue_generation
    }

    pub fn detail_generation(&self) -> u64 {
        self.detail_generation
    }

    pub fn locator(&self) -> &MediaLocator {
        &self.locator
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.console.push(msg);
    }

    pub fn subscribe(&mut self) -> Receiver<PipelineEvent> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    /// Live subscribers; a dropped receiver is pruned on the next emit.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn emit(&mut self, event: PipelineEvent) {
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn start(&mut self) -> Option<ProviderCommand> {
        if self.phase != PipelinePhase::Idle {
            self.push_log("[INFO] Pipeline already started");
            return None;
        }
        self.phase = PipelinePhase::ResolvingVersion;
        self.push_log("[INFO] Resolving latest version");
        Some(ProviderCommand::ResolveVersion)
    }

    pub fn apply(&mut self, delta: Delta) -> Option<ProviderCommand> {
        if self.phase == PipelinePhase::Failed {
            return None;
        }
        match delta {
            Delta::VersionResolved(result) => self.on_version(result),
            Delta::LocalesResolved(list) => self.on_locales(list),
            Delta::CatalogueLoaded {
                generation,
                locale,
                result,
            } => self.on_catalogue(generation, locale, result),
            Delta::DetailLoaded {
                generation,
                locale,
                entity_id,
                result,
            } => self.on_detail(generation, locale, entity_id, result),
        }
    }

    fn on_version(&mut self, result: Result<String, PipelineError>) -> Option<ProviderCommand> {
        if self.phase != PipelinePhase::ResolvingVersion {
            self.push_log("[INFO] Ignoring unexpected version result");
            return None;
        }
        match result {
            Ok(version) => {
                self.push_log(format!("[INFO] Latest version: {version}"));
                self.state.set_version(version.clone());
                self.phase = PipelinePhase::ResolvingLocales;
                self.emit(PipelineEvent::VersionResolved { version });
                Some(ProviderCommand::ResolveLocales)
            }
            Err(err) => self.fail(err),
        }
    }

    fn on_locales(&mut self, list: LocaleList) -> Option<ProviderCommand> {
        if self.phase != PipelinePhase::ResolvingLocales {
            self.push_log("[INFO] Ignoring unexpected locale list");
            return None;
        }
        let fallback = match &list.source {
            LocaleSource::Remote => false,
            LocaleSource::Fallback { reason } => {
                self.push_log(format!("[WARN] Language list unavailable ({reason}), using fallback"));
                true
            }
        };
        let count = list.locales.len();
        let current = self.state.locale().to_string();
        if !list.locales.iter().any(|code| *code == current) {
            if let Some(first) = list.locales.first().cloned() {
                self.push_log(format!(
                    "[WARN] Locale {current} not offered, switching to {first}"
                ));
                self.state.set_locale(first);
            }
        }
        self.state.set_locales(list.locales);
        self.phase = PipelinePhase::LoadingCatalogue;
        self.emit(PipelineEvent::LocalesResolved { count, fallback });
        self.issue_catalogue()
    }

    fn issue_catalogue(&mut self) -> Option<ProviderCommand> {
        let Some(version) = self.state.version().map(str::to_string) else {
            return self.fail(PipelineError::DataUnavailable(
                "No version available".to_string(),
            ));
        };
        self.catalogue_generation += 1;
        let locale = self.state.locale().to_string();
        self.push_log(format!(
            "[INFO] Loading champions ({locale}, gen {})",
            self.catalogue_generation
        ));
        Some(ProviderCommand::LoadCatalogue {
            generation: self.catalogue_generation,
            version,
            locale,
        })
    }

    fn issue_detail(&mut self, entity_id: String) -> Option<ProviderCommand> {
        let version = self.state.version()?.to_string();
        self.detail_generation += 1;
        self.detail_loading = true;
        let locale = self.state.locale().to_string();
        Some(ProviderCommand::LoadDetail {
            generation: self.detail_generation,
            version,
            locale,
            entity_id,
        })
    }

    fn on_catalogue(
        &mut self,
        generation: u64,
        locale: String,
        result: Result<Catalogue, PipelineError>,
    ) -> Option<ProviderCommand> {
        if generation != self.catalogue_generation {
            self.push_log(format!(
                "[INFO] Discarded stale champion list ({locale}, gen {generation})"
            ));
            return None;
        }
        let startup = self.phase == PipelinePhase::LoadingCatalogue;
        let catalogue = match result {
            Ok(catalogue) => catalogue,
            Err(err) if startup => return self.fail(err),
            Err(err) => return self.recover_locale_change(err),
        };

        let count = catalogue.entries.len();
        self.state.replace_catalogue(catalogue, locale.clone());
        self.push_log(format!("[INFO] Loaded {count} champions ({locale})"));
        self.emit(PipelineEvent::CatalogueLoaded {
            generation,
            locale,
            count,
        });

        let target = self
            .state
            .selected_entity()
            .filter(|id| self.state.contains_entity(id))
            .map(str::to_string)
            .or_else(|| self.state.entries().first().map(|entry| entry.id.clone()));
        self.state.set_selected_entity(target.clone());

        let Some(target) = target else {
            self.push_log("[WARN] Champion list is empty");
            self.release_media();
            self.state.clear_active_detail();
            self.phase = PipelinePhase::Ready;
            return None;
        };
        self.phase = if startup {
            PipelinePhase::LoadingDetail
        } else {
            PipelinePhase::Ready
        };
        self.issue_detail(target)
    }

    /// A failed locale switch puts the locale back to the one the held catalogue was loaded in.
    fn recover_locale_change(&mut self, err: PipelineError) -> Option<ProviderCommand> {
        self.push_log(format!("[WARN] Error loading champions: {err}"));
        self.phase = PipelinePhase::Ready;
        let restored = self.state.catalogue_locale().map(str::to_string)?;
        self.state.set_locale(restored.clone());
        self.emit(PipelineEvent::LocaleChanged { locale: restored });

        let selected = self.state.selected_entity().map(str::to_string)?;
        let shown = self
            .state
            .active_detail()
            .map(|active| active.detail.id.as_str() == selected && active.locale == self.state.locale())
            .unwrap_or(false);
        if shown {
            return None;
        }
        self.issue_detail(selected)
    }

    fn on_detail(
        &mut self,
        generation: u64,
        locale: String,
        entity_id: String,
        result: Result<EntityDetail, PipelineError>,
    ) -> Option<ProviderCommand> {
        if generation != self.detail_generation {
            self.push_log(format!(
                "[INFO] Discarded stale details for {entity_id} ({locale}, gen {generation})"
            ));
            return None;
        }
        self.detail_loading = false;
        let detail = match result {
            Ok(detail) => detail,
            Err(err) if self.phase == PipelinePhase::LoadingDetail => {
                // The roster is usable; another selection can still succeed.
                self.push_log(format!("[WARN] Error fetching details for {entity_id}: {err}"));
                self.phase = PipelinePhase::Ready;
                self.push_log("[INFO] Ready");
                return None;
            }
            Err(err) => {
                self.push_log(format!("[WARN] Error fetching details for {entity_id}: {err}"));
                return None;
            }
        };

        self.release_media();
        self.state.set_active_detail(detail, locale.clone());
        if self.phase == PipelinePhase::LoadingDetail {
            self.phase = PipelinePhase::Ready;
            self.push_log("[INFO] Ready");
        }
        self.emit(PipelineEvent::DetailLoaded {
            entity_id: entity_id.clone(),
            locale,
        });
        self.emit(PipelineEvent::SubResourceSelected {
            entity_id,
            tag: SubResourceTag::Passive,
        });
        None
    }

    fn fail(&mut self, err: PipelineError) -> Option<ProviderCommand> {
        self.push_log(format!("[ERROR] Error initializing app: {err}"));
        self.phase = PipelinePhase::Failed;
        self.detail_loading = false;
        if self.fatal_notice.is_none() {
            self.fatal_notice = Some(FATAL_NOTICE.to_string());
            self.emit(PipelineEvent::Fatal {
                notice: FATAL_NOTICE.to_string(),
            });
        }
        None
    }

    /// Reloads catalogue then detail under `locale`, keeping the resolved version.
    pub fn change_locale(&mut self, locale: &str) -> Option<ProviderCommand> {
        if !self.phase.is_interactive() {
            self.push_log("[INFO] Locale change ignored while loading");
            return None;
        }
        if locale == self.state.locale() {
            return None;
        }
        if !self.state.locales().iter().any(|code| code == locale) {
            self.push_log(format!("[WARN] Unknown locale {locale}"));
            return None;
        }
        self.push_log(format!("[INFO] Changing language to: {locale}"));
        self.state.set_locale(locale.to_string());
        // Any detail in flight belongs to the old locale.
        self.detail_generation += 1;
        self.detail_loading = false;
        self.state.set_search(String::new());
        self.phase = PipelinePhase::LocaleChanging;
        self.emit(PipelineEvent::LocaleChanged {
            locale: locale.to_string(),
        });
        self.issue_catalogue()
    }

    pub fn cycle_locale(&mut self, step: isize) -> Option<ProviderCommand> {
        let next = cycle_locale(self.state.locales(), self.state.locale(), step)?.to_string();
        self.change_locale(&next)
    }

    pub fn select_entity(&mut self, entity_id: &str) -> Option<ProviderCommand> {
        if !self.phase.is_interactive() {
            self.push_log("[INFO] Selection ignored while loading");
            return None;
        }
        if !self.state.contains_entity(entity_id) {
            self.push_log(format!("[WARN] Unknown champion {entity_id}"));
            return None;
        }
        self.state.set_selected_entity(Some(entity_id.to_string()));
        self.release_media();
        if self.phase == PipelinePhase::LocaleChanging {
            // The incoming catalogue re-issues detail for the selection.
            return None;
        }
        self.issue_detail(entity_id.to_string())
    }

    pub fn select_sub_resource(&mut self, tag: SubResourceTag) {
        let Some(entity_id) = self.state.active_detail().map(|active| active.detail.id.clone())
        else {
            self.push_log("[WARN] No champion data available for ability display");
            return;
        };
        self.release_media();
        self.state.set_active_sub_resource(tag);
        self.emit(PipelineEvent::SubResourceSelected { entity_id, tag });
    }

    pub fn open_media(&mut self) {
        let Some(entity_id) = self.state.active_detail().map(|active| active.detail.id.clone())
        else {
            self.push_log("[WARN] No champion selected for video");
            return;
        };
        self.release_media();
        let tag = self.state.active_sub_resource();
        let slot = match self.locator.build_media_reference(
            self.state.key_index(),
            &entity_id,
            tag.as_str(),
        ) {
            Ok(locator) => MediaSlot::Open {
                entity_id,
                tag,
                locator,
            },
            Err(err) => {
                self.push_log(format!("[WARN] {err}"));
                MediaSlot::Unavailable {
                    notice: MEDIA_UNAVAILABLE_NOTICE.to_string(),
                }
            }
        };
        self.state.set_media(slot.clone());
        self.emit(PipelineEvent::MediaChanged(slot));
    }

    pub fn close_media(&mut self) {
        self.release_media();
    }

    fn release_media(&mut self) {
        if self.state.release_media() != MediaSlot::Closed {
            self.emit(PipelineEvent::MediaChanged(MediaSlot::Closed));
        }
    }

    pub fn next_skin(&mut self) {
        let Some(choices) = self
            .state
            .active_detail()
            .map(|active| skin_choices(&active.detail))
        else {
            return;
        };
        let current = self.state.active_skin();
        let idx = choices
            .iter()
            .position(|skin| skin.num == current)
            .unwrap_or(0);
        let next = choices[(idx + 1) % choices.len()].num;
        self.state.set_active_skin(next);
    }

    pub fn set_search(&mut self, query: &str) {
        self.state.set_search(query.to_string());
    }
}
