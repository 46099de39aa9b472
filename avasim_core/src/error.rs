//! Errors raised by a motion session.

use avasim_env::EnvError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Scene graph refused one of the owned objects; nothing was left behind
    #[error("Failed to attach '{object}' to the scene: {source}")]
    Attach {
        object: String,
        #[source]
        source: EnvError,
    },

    /// Operation needs the scene objects, but the session was torn down
    #[error("Session is detached from the scene")]
    Detached,

    #[error(transparent)]
    Env(#[from] EnvError),
}
