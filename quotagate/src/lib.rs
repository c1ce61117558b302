//! QuotaGate CLI: replays synthetic metric bursts through a quota-gated
//! OpenTelemetry pipeline.

pub mod burst;
pub mod cli;
