//! `prople-courier-cli` is a small client used to inspect, pack and negotiate
//! `prople/courier` envelopes from a terminal
pub mod commands;
pub mod types;
