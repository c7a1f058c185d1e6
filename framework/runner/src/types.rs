/// Recommended error type for your load test `main` function. Run level failures are returned as
/// [anyhow::Error] and can be downcast to the concrete error, such as
/// [crate::config::ConfigError], when the caller needs to tell them apart.
pub type StampedeResult<T> = anyhow::Result<T>;
