/// Recommended result type for a scenario `main` function and any shared behaviour code written
/// for hooks. Compatible with [crate::prelude::HookResult] so `?` propagates errors.
pub type ProbeResult<T> = anyhow::Result<T>;
