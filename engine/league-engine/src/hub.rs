//! Registry of independently locked leagues

use crate::league::{League, LeagueState};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// Leagues keyed by name. Each [`League`] carries its own lock, so writers
/// to different leagues never contend.
#[derive(Debug, Default)]
pub struct LeagueHub {
    leagues: DashMap<String, Arc<League>>,
}

impl LeagueHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a league, creating an empty one on first use
    pub fn get_or_create(&self, name: &str) -> Arc<League> {
        self.leagues
            .entry(name.to_string())
            .or_insert_with(|| {
                info!(league = name, "Creating league");
                Arc::new(League::new(name))
            })
            .clone()
    }

    /// Register a league restored from saved state, replacing any league with the same name
    pub fn restore(&self, name: &str, state: LeagueState) -> Arc<League> {
        let league = Arc::new(League::from_state(name, state));
        self.leagues.insert(name.to_string(), league.clone());
        info!(league = name, "League restored");
        league
    }

    pub fn get(&self, name: &str) -> Option<Arc<League>> {
        self.leagues.get(name).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, name: &str) -> Option<Arc<League>> {
        self.leagues.remove(name).map(|(_, league)| league)
    }

    /// League names, sorted
    pub fn league_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.leagues.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.leagues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
    }
}
