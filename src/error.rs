//! The single error type surfaced by core entry points (render, file I/O,
//! scene assembly).

use thiserror::Error;

/// Errors that can be returned from the core rendering engine.
///
/// Most per-ray failure modes (an out-of-range `t_hit`, an empty primitive
/// set, an unloaded texture) are recovered locally and never reach this
/// type; it exists for failures that abort or are reported to the caller of
/// a top-level entry point.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RenderError {
    /// The scene has no camera, or the camera is otherwise unusable (e.g.
    /// zero-area viewport).
    #[error("scene has no usable camera")]
    NoCamera,

    /// The scene has no framebuffer to render into, or the framebuffer's
    /// dimensions could not be resized to match the camera's viewport.
    #[error("no usable framebuffer: {0}")]
    NoFramebuffer(String),

    /// The scene has no object groups to render (nothing was pushed onto
    /// it before the first `finalize`/render call).
    #[error("scene has no object groups")]
    EmptyScene,

    /// An accelerator build ran out of memory (or hit an allocation limit).
    /// Not locally recoverable; the render is aborted.
    #[error("out of memory while building accelerator for {what}")]
    BuildOutOfMemory {
        /// What was being built, for diagnostics (e.g. `"object group BVH"`).
        what: String,
    },

    /// Reading or writing a framebuffer/mipmap file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path of the file being read or written.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A framebuffer or mipmap file did not have the expected magic number
    /// or version, or its header was otherwise malformed.
    #[error("malformed file {path}: {reason}")]
    MalformedFile {
        /// Path of the file being read.
        path: String,
        /// Human-readable description of what was wrong.
        reason: String,
    },
}
