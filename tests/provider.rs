use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use ddragon_terminal::config::ClientConfig;
use ddragon_terminal::ddragon_fetch::{
    DdragonClient, catalogue_url, detail_url, languages_url, versions_url,
};
use ddragon_terminal::fetch::StaticFetcher;
use ddragon_terminal::pipeline::Pipeline;
use ddragon_terminal::provider::{execute, spawn_provider};
use ddragon_terminal::state::{Delta, PipelinePhase, ProviderCommand};

const BASE: &str = "http://ddragon.test";
const VERSION: &str = "14.1.1";

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn seeded_fetcher() -> StaticFetcher {
    let mut fetcher = StaticFetcher::new()
        .with_body(versions_url(BASE), read_fixture("versions.json"))
        .with_body(languages_url(BASE), read_fixture("languages.json"));
    for locale in ["en_US", "ko_KR"] {
        fetcher = fetcher.with_body(
            catalogue_url(BASE, VERSION, locale),
            read_fixture(&format!("champion_{locale}.json")),
        );
        for id in ["Aatrox", "Ahri"] {
            fetcher = fetcher.with_body(
                detail_url(BASE, VERSION, locale, id),
                read_fixture(&format!("detail_{id}_{locale}.json")),
            );
        }
    }
    fetcher
}

fn config() -> ClientConfig {
    ClientConfig {
        base_url: BASE.to_string(),
        ..ClientConfig::default()
    }
}

/// Feeds deltas back into the pipeline until `done` holds or the deadline passes.
fn pump<F>(
    pipeline: &mut Pipeline,
    rx: &mpsc::Receiver<Delta>,
    cmd_tx: &mpsc::Sender<ProviderCommand>,
    done: F,
) where
    F: Fn(&Pipeline) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done(pipeline) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        assert!(!remaining.is_zero(), "pipeline did not settle in time");
        let Ok(delta) = rx.recv_timeout(remaining) else {
            panic!("provider stopped responding");
        };
        if let Some(next) = pipeline.apply(delta) {
            cmd_tx.send(next).expect("provider should be running");
        }
    }
}

#[test]
fn execute_maps_commands_to_deltas() {
    let client = DdragonClient::new(BASE, Arc::new(seeded_fetcher()));
    match execute(&client, ProviderCommand::ResolveVersion) {
        Delta::VersionResolved(Ok(version)) => assert_eq!(version, VERSION),
        other => panic!("unexpected delta {other:?}"),
    }
    match execute(
        &client,
        ProviderCommand::LoadDetail {
            generation: 9,
            version: VERSION.to_string(),
            locale: "ko_KR".to_string(),
            entity_id: "Ahri".to_string(),
        },
    ) {
        Delta::DetailLoaded {
            generation,
            locale,
            entity_id,
            result,
        } => {
            assert_eq!(generation, 9);
            assert_eq!(locale, "ko_KR");
            assert_eq!(entity_id, "Ahri");
            assert_eq!(result.expect("detail").title, "구미호");
        }
        other => panic!("unexpected delta {other:?}"),
    }
}

#[test]
fn provider_drives_startup_to_ready() {
    let client = DdragonClient::new(BASE, Arc::new(seeded_fetcher()));
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(client, tx, cmd_rx);

    let mut pipeline = Pipeline::new(&config());
    let first = pipeline.start().expect("start should issue a request");
    cmd_tx.send(first).expect("provider should be running");
    pump(&mut pipeline, &rx, &cmd_tx, |p| p.phase() == PipelinePhase::Ready);

    let state = pipeline.state();
    assert_eq!(state.version(), Some(VERSION));
    assert_eq!(state.locales().len(), 25);
    assert_eq!(state.entries().len(), 3);
    let active = state.active_detail().expect("detail should be loaded");
    assert_eq!(active.detail.id, "Aatrox");
}

#[test]
fn slow_stale_detail_never_overwrites_the_new_locale() {
    let stale_url = detail_url(BASE, VERSION, "en_US", "Ahri");
    let fetcher = seeded_fetcher().with_delay(&stale_url, Duration::from_millis(400));
    let client = DdragonClient::new(BASE, Arc::new(fetcher));
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(client, tx, cmd_rx);

    let mut pipeline = Pipeline::new(&config());
    let first = pipeline.start().expect("start should issue a request");
    cmd_tx.send(first).expect("provider should be running");
    pump(&mut pipeline, &rx, &cmd_tx, |p| p.phase() == PipelinePhase::Ready);

    let select = pipeline.select_entity("Ahri").expect("detail request");
    cmd_tx.send(select).expect("provider should be running");
    let change = pipeline.change_locale("ko_KR").expect("catalogue request");
    cmd_tx.send(change).expect("provider should be running");

    pump(&mut pipeline, &rx, &cmd_tx, |p| {
        p.console().contains("Discarded stale details for Ahri")
            && p.state()
                .active_detail()
                .is_some_and(|active| active.locale == "ko_KR")
    });

    let state = pipeline.state();
    let active = state.active_detail().expect("detail should be loaded");
    assert_eq!(active.detail.id, "Ahri");
    assert_eq!(active.detail.display_name, "아리");
    assert_eq!(state.locale(), "ko_KR");
    assert_eq!(state.catalogue_locale(), Some("ko_KR"));
}
