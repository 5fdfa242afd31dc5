pub mod error;
pub mod provider;
pub mod resources;
pub mod sdk;

pub use error::ProviderError;
pub use provider::SpotinstProvider;
