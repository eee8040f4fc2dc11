pub mod protocol;
pub mod provider;
pub mod transport;

pub use protocol::{Reply, Request, TranslatedSegment};
pub use provider::{HttpTranslationProvider, StaticTranslationProvider, TranslationProvider};
pub use transport::{
    BackgroundService, ForegroundGateway, GatewayError, PendingLanguages, PendingTranslation,
};
