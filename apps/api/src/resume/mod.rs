// Resume parsing pipeline and the write-once resume store.
// All completion calls go through llm_client; nothing here talks to a provider directly.

pub mod extract;
pub mod handlers;
pub mod pipeline;
pub mod sample;
pub mod schema;
pub mod store;
pub mod upload;
