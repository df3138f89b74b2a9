//! Engine level configuration.
//!
//! Values come from the process environment, after loading a `.env` file
//! from the working directory when one exists.
//!
//! - `FERRUM_INDEX_ORDER`: fanout of the primary key B+tree (default 4).

use std::env;

use crate::persistence::{DEFAULT_ORDER, MIN_ORDER};

pub const INDEX_ORDER_VAR: &str = "FERRUM_INDEX_ORDER";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub index_order: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            index_order: DEFAULT_ORDER,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<EngineConfig, String> {
        //! Load `.env` (a missing file is fine) and read the engine settings
        //! from the environment, falling back to the defaults.

        dotenvy::dotenv().ok();

        match env::var(INDEX_ORDER_VAR) {
            Ok(raw) => EngineConfig::default().with_index_order_str(&raw),
            Err(_) => Ok(EngineConfig::default()),
        }
    }

    pub fn with_index_order(mut self, index_order: usize) -> Result<EngineConfig, String> {
        if index_order < MIN_ORDER {
            return Err(format!(
                "invalid index order {}: must be at least {}",
                index_order, MIN_ORDER
            ));
        }
        self.index_order = index_order;
        Ok(self)
    }

    fn with_index_order_str(self, raw: &str) -> Result<EngineConfig, String> {
        let index_order = raw.trim().parse::<usize>().map_err(|_| {
            format!(
                "invalid value {} for {}: not a positive integer",
                raw, INDEX_ORDER_VAR
            )
        })?;
        self.with_index_order(index_order)
    }
}
