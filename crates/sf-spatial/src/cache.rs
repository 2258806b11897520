//! On-disk street graph artefact.
//!
//! A cache file is one `bincode` payload holding a fixed magic, a format
//! version, and the graph's [`GraphParts`].  Decoding goes through
//! [`StreetGraph::from_parts`], so a cached graph is validated exactly like a
//! freshly built one.
//!
//! Writes go to a temporary file in the target directory which is then
//! renamed over the destination, so readers never observe a half-written
//! artefact.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::network::{GraphParts, StreetGraph};
use crate::{SpatialError, SpatialResult};

/// File identifier for persisted street graphs.
pub const GRAPH_MAGIC: [u8; 4] = *b"SFSG";

/// Current on-disk format version.
pub const GRAPH_VERSION: u16 = 1;

#[derive(Serialize, Deserialize)]
struct GraphFile {
    magic:   [u8; 4],
    version: u16,
    parts:   GraphParts,
}

/// Persist `graph` at `path`, replacing any existing file.
pub fn write_graph(path: &Path, graph: &StreetGraph) -> SpatialResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let payload = GraphFile {
        magic:   GRAPH_MAGIC,
        version: GRAPH_VERSION,
        parts:   graph.to_parts(),
    };

    let tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        bincode::serialize_into(&mut writer, &payload).map_err(|source| {
            SpatialError::CacheCodec { path: path.to_path_buf(), source }
        })?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| SpatialError::Io(e.error))?;
    Ok(())
}

/// Load and validate a graph written by [`write_graph`].
pub fn read_graph(path: &Path) -> SpatialResult<StreetGraph> {
    let file = File::open(path)?;
    let payload: GraphFile = bincode::deserialize_from(BufReader::new(file)).map_err(|source| {
        SpatialError::CacheCodec { path: path.to_path_buf(), source }
    })?;

    if payload.magic != GRAPH_MAGIC {
        return Err(SpatialError::InvalidCache {
            path:   path.to_path_buf(),
            reason: format!("expected magic {GRAPH_MAGIC:?}, found {:?}", payload.magic),
        });
    }
    if payload.version != GRAPH_VERSION {
        return Err(SpatialError::InvalidCache {
            path:   path.to_path_buf(),
            reason: format!(
                "unsupported format version {}; supported version is {GRAPH_VERSION}",
                payload.version
            ),
        });
    }

    StreetGraph::from_parts(payload.parts).map_err(|e| SpatialError::InvalidCache {
        path:   path.to_path_buf(),
        reason: e.to_string(),
    })
}
