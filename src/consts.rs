//! Shared numeric constants for the point-and-shoot engine.

// ── Timing ──────────────────────────────────────────────────────

/// Coalescing window for scroll/resize bursts before bounds are recomputed.
pub const DEBOUNCE_MS: u64 = 8;

/// How long a capture confirmation stays on screen.
pub const CONFIRMATION_MS: u64 = 2000;

// ── Geometry ────────────────────────────────────────────────────

/// Side length of the synthetic target drawn around the cursor.
pub const CURSOR_TARGET_SIZE: f64 = 20.0;

/// Above this many direct child nodes an element's own box is used as its
/// bounds instead of recursing into the subtree.
pub const LARGE_SUBTREE_LIMIT: usize = 150;

/// Maximum number of parent hops walked when translating frame coordinates.
pub const MAX_FRAME_DEPTH: usize = 10;

// ── Content ─────────────────────────────────────────────────────

/// Single characters that on their own are decoration, not content.
pub const MARKUP_CHARS: [char; 5] = ['•', '-', '|', '–', '—'];

// ── Capture ─────────────────────────────────────────────────────

/// Download request timeout.
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Download connect timeout.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;
