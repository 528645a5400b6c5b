use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{LiveRates, RateResolver, ResolvedRates, ResultEngine, rates::DEFAULT_RATE_TIMEOUT};

mod access;
mod balances;
mod expenses;
mod groups;
mod items;
mod payments;
mod settlement;
mod shares;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    rates: RateResolver,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Current rates from the live source, falling back to 1:1.
    ///
    /// These are never stored; expenses use the snapshot frozen at creation.
    pub async fn live_rates(&self) -> ResolvedRates {
        let mut resolved = self.rates.live_or_fallback().await;
        resolved.rates = resolved.rates.with_base();
        resolved
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    live_rates: Option<Arc<dyn LiveRates>>,
    rate_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Source of live exchange rates. Without one, new expenses lock 1:1
    /// rates.
    pub fn live_rates(mut self, source: Arc<dyn LiveRates>) -> EngineBuilder {
        self.live_rates = Some(source);
        self
    }

    /// Upper bound on a live rate lookup.
    pub fn rate_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.rate_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            rates: RateResolver::new(
                self.live_rates,
                self.rate_timeout.unwrap_or(DEFAULT_RATE_TIMEOUT),
            ),
        })
    }
}
