pub mod clock;
pub mod error;
pub mod locks;
pub mod models;
pub mod sources;
pub mod storage;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
pub use locks::KeyedLocks;
pub use models::{InferenceModel, SpeechSynthesizer};
pub use sources::{ContentFetcher, NewsFeed};
pub use storage::{ArticleStorage, RecordingStorage};
pub use types::{Article, ArticleSource, FeedArticle, InsertOutcome, RecordingEntry, SpeechTask};
