//! Bridge between the egui shell and the console crates.
//! Pages never touch adapters directly; every operation goes through here.

use std::path::PathBuf;
use std::sync::Arc;

use eyre::WrapErr;
use tracing::{info, warn};

use mural_safe_adapters::{
    AdapterConfig, Eip1193Adapter, EtherscanAdapter, JsonFileStore, MemoryStore, SafeSdkAdapter,
    SystemClockAdapter,
};
use mural_safe_core::{
    CommandResult, Console, ConsoleCommand, Network, PortError, ProviderPort, SafeStorePort,
};

type DynStore = Box<dyn SafeStorePort + Send + Sync>;

type WalletConsole = Console<
    Eip1193Adapter,
    EtherscanAdapter,
    SafeSdkAdapter<Eip1193Adapter>,
    DynStore,
    SystemClockAdapter,
>;

#[derive(Clone)]
pub struct ConsoleBridge {
    console: Arc<WalletConsole>,
    provider_mode: &'static str,
    store_location: String,
}

impl ConsoleBridge {
    pub fn from_config(config: &AdapterConfig) -> eyre::Result<Self> {
        let provider = Eip1193Adapter::with_config(config);
        let provider_mode = provider.mode_label();
        let safe_sdk = SafeSdkAdapter::new(provider.clone(), config);
        let history = EtherscanAdapter::with_config(config);
        let (store, store_location) = open_store(config)?;

        info!(
            network = %config.network.name,
            chain_id = config.network.chain_id,
            provider = provider_mode,
            store = %store_location,
            "console ready"
        );

        Ok(Self {
            console: Arc::new(Console::new(
                config.network.clone(),
                provider,
                history,
                safe_sdk,
                store,
                SystemClockAdapter,
            )),
            provider_mode,
            store_location,
        })
    }

    /// Runs a command on the calling thread. Blocks on network I/O.
    pub fn run(&self, command: ConsoleCommand) -> Result<CommandResult, PortError> {
        self.console.handle(command)
    }

    pub fn network(&self) -> &Network {
        &self.console.network
    }

    /// False when no wallet can be reached, which the UI shows as onboarding.
    pub fn provider_available(&self) -> bool {
        self.console.provider.is_available()
    }

    pub fn provider_mode(&self) -> &'static str {
        self.provider_mode
    }

    pub fn store_location(&self) -> &str {
        &self.store_location
    }
}

fn open_store(config: &AdapterConfig) -> eyre::Result<(DynStore, String)> {
    let path = config.store_path.clone().or_else(default_store_path);
    match path {
        Some(path) => {
            let location = path.display().to_string();
            let store = JsonFileStore::open(path)
                .wrap_err_with(|| format!("failed to open safe store at {location}"))?;
            Ok((Box::new(store), location))
        }
        None => {
            warn!("no storage directory available, known safes will not persist");
            Ok((Box::new(MemoryStore::default()), "memory".to_owned()))
        }
    }
}

fn default_store_path() -> Option<PathBuf> {
    eframe::storage_dir(crate::APP_ID).map(|dir| dir.join("safes.json"))
}
