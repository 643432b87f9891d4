//! Subcommand implementations
//!
//! Map states on disk are the JSON wire form produced by
//! `convergent_core::crdt::codec::encode_map` with arbitrary JSON values.

use anyhow::{Context, Result};
use convergent_core::config::CheckerConfig;
use convergent_core::crdt::codec::{decode_map, encode_map};
use convergent_core::crdt::{LwwMap, MapState, PeerId, WireFormat};
use convergent_core::test_utils::{run_convergence_fuzz, FuzzReport};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Run the randomized law check described by `config`
pub fn check(config: &CheckerConfig) -> Result<FuzzReport> {
    info!(
        cases = config.cases,
        seed = config.seed,
        peers = config.peers,
        keys = config.keys,
        "checking merge laws"
    );

    let report = run_convergence_fuzz(config.cases, config.seed, &config.shape())?;
    Ok(report)
}

/// Read a JSON map state from disk
pub fn read_state(path: &Path) -> Result<MapState<Value>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let state = decode_map(&bytes, WireFormat::Json)
        .with_context(|| format!("Invalid map state in {}", path.display()))?;

    debug!(path = %path.display(), keys = state.len(), "loaded map state");
    Ok(state)
}

/// Encode a map state as JSON text
pub fn render_state(state: &MapState<Value>) -> Result<String> {
    let bytes = encode_map(state, WireFormat::Json)?;
    Ok(String::from_utf8(bytes)?)
}

/// Merge the state in `remote` into the state in `local` as replica `peer`
pub fn merge_files(local: &Path, remote: &Path, peer: PeerId) -> Result<MapState<Value>> {
    let local_state = read_state(local)?;
    let remote_state = read_state(remote)?;

    let merged = LwwMap::from_state(peer, local_state).merge(&remote_state);
    info!(
        peer = %merged.peer_id(),
        live = merged.len(),
        tombstones = merged.tombstone_count(),
        "merged map states"
    );

    Ok(merged.state())
}

/// Live contents of the state in `path`, as pretty JSON
pub fn show(path: &Path) -> Result<String> {
    // Reading never writes, so the replica identity is irrelevant
    let map = LwwMap::from_state(PeerId::new("reader"), read_state(path)?);
    info!(
        live = map.len(),
        tombstones = map.tombstone_count(),
        "map state summary"
    );

    Ok(serde_json::to_string_pretty(&map.value())?)
}
