use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::ddragon_fetch::DdragonClient;
use crate::state::{Delta, ProviderCommand};

/// Runs each command on its own short-lived thread so a slow response never
/// holds back a newer one. Results may therefore arrive out of issue order;
/// the pipeline sorts that out by generation.
pub fn spawn_provider(
    client: DdragonClient,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let client = client.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                let _ = tx.send(execute(&client, cmd));
            });
        }
    })
}

/// Performs one command synchronously.
pub fn execute(client: &DdragonClient, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::ResolveVersion => Delta::VersionResolved(client.resolve_latest_version()),
        ProviderCommand::ResolveLocales => Delta::LocalesResolved(client.resolve_locales()),
        ProviderCommand::LoadCatalogue {
            generation,
            version,
            locale,
        } => {
            let result = client.load_catalogue(&version, &locale);
            Delta::CatalogueLoaded {
                generation,
                locale,
                result,
            }
        }
        ProviderCommand::LoadDetail {
            generation,
            version,
            locale,
            entity_id,
        } => {
            let result = client.load_detail(&version, &locale, &entity_id);
            Delta::DetailLoaded {
                generation,
                locale,
                entity_id,
                result,
            }
        }
    }
}
