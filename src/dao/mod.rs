/// League document storage backends.
pub mod league_store;
/// Persisted document model.
pub mod models;
/// Storage abstraction layer errors.
pub mod storage;
