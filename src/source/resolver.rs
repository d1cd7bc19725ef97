//! Source-name resolution and subtitle merging.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use url::Url;

use crate::engine::{AssetRef, MediaEngineContract, TrackKind};

const LOG_TARGET: &str = "r_playctl::source";

/// Subtitle sources are WebVTT text tracks.
pub const SUBTITLE_EXTENSION: &str = "vtt";

/// How names without a URL scheme are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemeMode {
    /// Remote playback requires an explicit `http`/`https` scheme; a bare
    /// name resolves only as a local file.
    #[default]
    Explicit,
    /// A bare name that is not a local file is retried as `https://{name}`.
    AutoHttps,
}

/// Error types for source resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    NotFound(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound(name) => write!(f, "No playable asset for: {}", name),
        }
    }
}

impl Error for ResolveError {}

/// Turns a logical name plus default extension into a playable [`AssetRef`].
#[derive(Debug, Clone)]
pub struct SourceResolver {
    media_root: PathBuf,
    mode: SchemeMode,
}

impl SourceResolver {
    pub fn new(media_root: impl Into<PathBuf>, mode: SchemeMode) -> Self {
        SourceResolver {
            media_root: media_root.into(),
            mode,
        }
    }

    pub fn mode(&self) -> SchemeMode {
        self.mode
    }

    /// Resolves `name` into an asset. Names with a parseable scheme go
    /// through remote validation; everything else is looked up under the
    /// media root, with an `https://` retry in [`SchemeMode::AutoHttps`].
    pub fn resolve(&self, name: &str, default_ext: &str) -> Result<AssetRef, ResolveError> {
        if let Ok(url) = Url::parse(name) {
            return self.validate_remote(name, url);
        }

        // No scheme: an existing local file always wins.
        if let Some(asset) = self.resolve_local(name, default_ext) {
            return Ok(asset);
        }

        if self.mode == SchemeMode::AutoHttps {
            if let Ok(url) = Url::parse(&format!("https://{}", name)) {
                trace!(target: LOG_TARGET, name, "Retrying bare name with https scheme.");
                return self.validate_remote(name, url);
            }
        }

        Err(ResolveError::NotFound(name.to_string()))
    }

    /// Looks up a subtitle resource under the media root, forcing the fixed
    /// subtitle extension. An empty name means no subtitles were requested.
    pub fn resolve_subtitles(&self, name: &str) -> Option<AssetRef> {
        if name.is_empty() {
            return None;
        }
        self.resolve_local(name, SUBTITLE_EXTENSION)
    }

    fn validate_remote(&self, name: &str, url: Url) -> Result<AssetRef, ResolveError> {
        match url.scheme() {
            "http" | "https" => {
                let host_ok = url.host_str().map_or(false, |host| !host.is_empty());
                let port_ok = url.port().map_or(true, |port| port > 0);
                if host_ok && port_ok {
                    Ok(AssetRef::new(url))
                } else {
                    warn!(target: LOG_TARGET, name, "Rejecting URL with invalid host or port.");
                    Err(ResolveError::NotFound(name.to_string()))
                }
            }
            // Local-file URLs pass through; the parser has already
            // percent-encoded the path.
            "file" => Ok(AssetRef::new(url)),
            other => {
                debug!(target: LOG_TARGET, scheme = other, "Rejecting unsupported scheme.");
                Err(ResolveError::NotFound(name.to_string()))
            }
        }
    }

    fn resolve_local(&self, name: &str, default_ext: &str) -> Option<AssetRef> {
        // A dotted suffix in the name wins over the configured default.
        let file_name = if Path::new(name).extension().is_some() {
            name.to_string()
        } else {
            format!("{}.{}", name, default_ext)
        };
        let path = self.media_root.join(&file_name);
        if !path.is_file() {
            trace!(target: LOG_TARGET, path = %path.display(), "No local file at path.");
            return None;
        }
        file_url(&path).map(AssetRef::new)
    }
}

/// Builds a `file://` URL from a filesystem path, percent-encoding each
/// segment.
fn file_url(path: &Path) -> Option<Url> {
    let mut encoded = String::from("file://");
    for segment in path.iter() {
        let segment = segment.to_string_lossy();
        if segment == "/" {
            continue;
        }
        encoded.push('/');
        encoded.push_str(&urlencoding::encode(&segment));
    }
    Url::parse(&encoded).ok()
}

/// Merges the subtitle's text track into the video asset through the engine's
/// composition hooks. Degrades silently: the original video comes back
/// whenever the subtitle cannot contribute.
pub async fn merge_with_subtitles(
    engine: &dyn MediaEngineContract,
    video: AssetRef,
    subtitle: &AssetRef,
) -> AssetRef {
    let tracks = match engine.load_tracks(subtitle).await {
        Ok(tracks) => tracks,
        Err(e) => {
            debug!(target: LOG_TARGET, error = %e, "Subtitle track loading failed; keeping original asset.");
            return video;
        }
    };
    if !tracks.contains(&TrackKind::Text) {
        debug!(target: LOG_TARGET, "Subtitle asset has no text track; keeping original asset.");
        return video;
    }
    match engine.compose_with_subtitles(&video, subtitle).await {
        Ok(merged) => merged,
        Err(e) => {
            debug!(target: LOG_TARGET, error = %e, "Subtitle composition failed; keeping original asset.");
            video
        }
    }
}
