use clap::Parser;
use crate::prelude::*;

#[derive(Clone, Debug, Parser)]
pub struct BTPServerOptions {
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Difficulty level; 0 and 1 clamp both the clock and the search depth.
    #[arg(short, long, default_value_t = 2)]
    pub difficulty: u32,

    /// Per-move time budget in milliseconds; 0 asks for the default.
    #[arg(short, long, default_value_t = 1000)]
    pub time_limit: u32,

    /// Arena size in 64 KiB pages.
    #[arg(short, long, default_value_t = DEFAULT_MEMORY_PAGES)]
    pub memory_pages: usize,
}

impl BTPServerOptions {
    pub fn agent_config(&self) -> AgentConfig {
        let mut config = AgentConfig::default();

        config.time_limit = match self.time_limit {
            0  => 100_000,
            ms => ms,
        };
        config.difficulty_level = self.difficulty;
        config.memory_pages = self.memory_pages;

        config
    }
}
