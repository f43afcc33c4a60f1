//! # Terms State
//!
//! The commercial terms resolver, built once at start-up for the configured
//! terms source. It caches nothing: every call reads terms and settings
//! from the database.

use silverline_db::{CommercialTermsResolver, Database, TermsStrategy};
use tracing::info;

/// Resolver shared by quoting and checkout.
#[derive(Debug, Clone)]
pub struct TermsState {
    resolver: CommercialTermsResolver,
}

impl TermsState {
    /// Builds the resolver for `strategy`.
    pub fn new(db: &Database, strategy: TermsStrategy) -> Self {
        info!(terms_source = %strategy, "Terms source selected");
        TermsState {
            resolver: CommercialTermsResolver::for_strategy(db, strategy),
        }
    }

    /// Returns the resolver.
    pub fn inner(&self) -> &CommercialTermsResolver {
        &self.resolver
    }
}
