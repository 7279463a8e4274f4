use std::time::Instant;

use crate::config::SearchConfig;
use crate::llm::LlmClient;
use crate::talent::TalentClient;

#[derive(Clone)]
pub struct AppState {
    pub talent: TalentClient,
    pub llm: LlmClient,
    pub search: SearchConfig,
    pub page_size: u32,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(talent: TalentClient, llm: LlmClient, search: SearchConfig, page_size: u32) -> Self {
        assert!(page_size > 0, "Page size must be positive");
        assert!(
            search.default_limit <= search.max_limit,
            "Limit configuration must be ordered"
        );
        Self {
            talent,
            llm,
            search,
            page_size,
            start_time: Instant::now(),
        }
    }
}
