pub mod extract;
pub mod feed;
pub mod format;
pub mod pipeline;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use extract::ParagraphFetcher;
pub use feed::NewsApiFeed;
pub use pipeline::{deep_dive_signature, digest_signature, DeepDive, Digest, Pipeline, PipelineConfig};

pub mod prelude {
    pub use super::pipeline::{Pipeline, PipelineConfig};
    pub use gist_core::{Article, Error, FeedArticle, Result};
}
