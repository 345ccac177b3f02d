use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::services::media::Orientation;

/// Random bytes per token. 32 bytes keeps birthday-collision odds negligible
/// for any realistic object count.
const TOKEN_BYTES: usize = 32;

/// URL-safe, unpadded token from the OS CSPRNG. 43 characters for 32 bytes.
pub fn random_token() -> String {
    let mut raw = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut raw);
    URL_SAFE_NO_PAD.encode(raw)
}

/// Storage key for a published video, e.g. `landscape/<token>.mp4`.
///
/// Never derived from the uploaded filename: user input stays out of key
/// space entirely.
pub fn derive_video_key(orientation: Orientation) -> String {
    format!("{}/{}.mp4", orientation.key_prefix(), random_token())
}
