//! Constants shared across crates.

use std::time::Duration;

/// Worker image used to download remote media.
pub const DEFAULT_DOWNLOADER_IMAGE: &str = "mattjmcnaughton/youtube-dl:2020.03.24";

/// Path at which the shared mount directory appears inside the worker container.
pub const CONTAINER_DOWNLOAD_DIRECTORY: &str = "/downloads";

/// Audio format requested when a download is restricted to audio.
pub const DEFAULT_AUDIO_FORMAT: &str = "mp3";

/// Length of the token prefixed to every downloaded file name.
pub const OUTPUT_TOKEN_LENGTH: usize = 8;

/// Length of random names for files produced without the downloader (fakes, test fixtures).
pub const RANDOM_FILE_NAME_LENGTH: usize = 16;

/// How long a presigned download link stays valid.
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(5 * 60);

/// Files uploaded longer ago than this are garbage collected.
pub const DEFAULT_GC_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
