pub mod console;
pub mod domain;
pub mod forms;
pub mod onboarding;
pub mod ports;
pub mod routes;
pub mod units;

pub use console::{CommandResult, Console, ConsoleCommand, WalletConnection};
pub use domain::{
    HistoryEntry, Network, OwnerChange, ProviderEvent, ProviderEventKind, SafeAccountConfig,
    SafeInfo, SafeRecord, TimestampMs, TxReceipt, TxRequest, ETHERSCAN_V2_API_URL, SENTINEL_OWNER,
};
pub use forms::{
    parse_address, AddOwnerForm, CreateSafeForm, RemoveOwnerForm, SendEthForm,
};
pub use onboarding::{OnboardingAction, OnboardingButton, OnboardingPhase};
pub use ports::{
    ClockPort, HistoryPort, PortError, ProviderPort, SafeSdkPort, SafeStorePort,
};
pub use routes::{is_selected, NavRoute, Route, NAV_ROUTES};
pub use units::{format_ether, parse_ether, relative_time};
