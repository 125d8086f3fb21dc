use crate::models::Track;

/// Post-normalization enrichment hook.
///
/// The production deployment feeds normalized tracks through a set of
/// sub-analyzers (genre refinement, feature inference) that live
/// outside this pipeline. They are injected here as an explicit
/// capability so a real implementation can be substituted without
/// touching the pipeline itself.
#[cfg_attr(test, mockall::automock)]
pub trait TrackEnricher: Send + Sync {
    /// Return the track to aggregate. Implementations may adjust
    /// fields but must keep the identity key stable.
    fn enrich(&self, track: Track) -> Track;
}

/// Default enricher: hands every track through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughEnricher;

impl TrackEnricher for PassthroughEnricher {
    fn enrich(&self, track: Track) -> Track {
        track
    }
}
