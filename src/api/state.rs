use std::sync::Arc;

use crate::agent::ResponseComposer;
use crate::config::Config;
use crate::db::ChatBackend;
use crate::llm::LlmProvider;
use crate::realtime::ConnectionRegistry;
use crate::search::SearchGateway;
use crate::speech::SpeechProvider;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn ChatBackend>,
    pub llm: LlmProvider,
    pub search: SearchGateway,
    pub speech: SpeechProvider,
    pub composer: ResponseComposer,
    pub registry: ConnectionRegistry,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<dyn ChatBackend>,
        llm: LlmProvider,
        search: SearchGateway,
        speech: SpeechProvider,
    ) -> Self {
        let config = Arc::new(config);
        let composer = ResponseComposer::new(llm.clone(), search.clone(), &config.agent);

        Self {
            config,
            db,
            llm,
            search,
            speech,
            composer,
            registry: ConnectionRegistry::new(),
        }
    }
}
