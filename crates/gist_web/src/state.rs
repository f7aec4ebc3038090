use std::sync::Arc;
use gist_news::Pipeline;

pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}
