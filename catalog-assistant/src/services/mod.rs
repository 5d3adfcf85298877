pub mod catalog_search;
pub mod entity_client;
pub mod metrics;
pub mod prompts;
pub mod providers;

pub use catalog_search::{
    grounding_for, search_products, CatalogSearch, Grounding, PgCatalogSearch, ProcedureOutput,
    SearchError,
};
pub use entity_client::{EntityClient, EntityClientError};
pub use metrics::{get_metrics, init_metrics, record_backend_call};
pub use providers::{ChatMessage, ChatProvider, ProviderError};
