use thiserror::Error;

/// The error taxonomy for the routing engine.
///
/// Variants map 1:1 onto the response `code`s a caller surfaces; the HTTP
/// layer is the only place that turns one of these into a status code and a
/// JSON body.
#[derive(Debug, Error)]
pub enum Error {
    #[error("bad input: {0}")]
    InputError(String),

    #[error("graph not ready")]
    GraphNotReady,

    #[error("spatial index not ready")]
    SpatialIndexNotReady,

    #[error("no match found within search radius")]
    NoMatch,

    #[error("no path exists")]
    NoPath,

    /// An invariant was violated — a negative-weight improvement to an
    /// already-finalised node, a malformed adjacency entry, etc. Always a
    /// bug, never user-triggerable. Logged at the call site; surfaced to
    /// callers as `InternalError`.
    #[error("internal invariant violated: {0}")]
    IntegrityError(String),

    /// Build-time only: a feature could not be parsed into a node/edge.
    /// Never returned from a query path.
    #[error("data error: {0}")]
    DataError(String),

    /// On-disk graph cache read/write failure. Never fatal on its own —
    /// callers treat it as a rebuild-on-read-failure hint (spec §6).
    #[error("cache error: {0}")]
    CacheError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
