/// Client configuration artifacts
pub mod kubeconfig;
pub mod provider;

pub use provider::ProviderHandle;
