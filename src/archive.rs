//! Archive Packager: serializes a project tree into one downloadable
//! `.tar.gz` blob.
//!
//! Source files get a second pass of fence stripping and prose filtering on
//! the way in, catching residual markers that survived assembly. Failure is
//! atomic: any error drops the whole buffer, no partial archive reaches the
//! caller.

use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::normalize::passes;
use crate::project::ProjectTree;

/// File extension of produced archives (without the leading dot).
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Extensions treated as source code and re-cleaned before insertion.
const SOURCE_EXTENSIONS: [&str; 4] = [".js", ".jsx", ".ts", ".tsx"];

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("could not add '{path}' to archive: {source}")]
    Entry {
        path: String,
        source: std::io::Error,
    },
    #[error("could not finalise archive: {0}")]
    Finalise(std::io::Error),
}

/// Pack a project tree into a gzip-compressed tar archive.
///
/// Entries are inserted in the tree's iteration order; every path appears
/// exactly once.
pub fn pack(tree: &ProjectTree) -> Result<Vec<u8>, ArchiveError> {
    let gz = GzEncoder::new(Vec::new(), Compression::default());
    let mut tar = tar::Builder::new(gz);

    for (path, content) in tree.iter() {
        let cleaned = if is_source_path(path) {
            let stripped = passes::fence_strip(content);
            passes::prose_filter(&stripped)
        } else {
            content.to_string()
        };
        let bytes = cleaned.as_bytes();

        let mut header = tar::Header::new_gnu();
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        tar.append_data(&mut header, path, bytes)
            .map_err(|e| ArchiveError::Entry {
                path: path.to_string(),
                source: e,
            })?;
    }

    tar.into_inner()
        .map_err(ArchiveError::Finalise)?
        .finish()
        .map_err(ArchiveError::Finalise)
}

fn is_source_path(path: &str) -> bool {
    SOURCE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Download file name for a packed project: `<project-id>.tar.gz`.
pub fn archive_filename(project_id: &str) -> String {
    format!("{}.{}", project_id, ARCHIVE_EXTENSION)
}
