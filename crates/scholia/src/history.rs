//! Per-user history of generated results.

use log::info;

use crate::accounts::User;
use crate::research::{render_markup, GroundingSource, ResearchRequest, ResearchResult};
use crate::store::{load_json, save_json, KeyValueStore};
use crate::Result;

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// The store key of a user's history.
pub fn history_key(user_id: &str) -> String {
    format!("history_{user_id}")
}

/// History operations on top of a [`KeyValueStore`].
pub struct History<S> {
    store: S,
    rng: fastrand::Rng,
}

impl<S: KeyValueStore> History<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self::with_rng(store, fastrand::Rng::new())
    }

    /// Wraps a store, drawing ids from `rng`.
    pub fn with_rng(store: S, rng: fastrand::Rng) -> Self {
        Self { store, rng }
    }

    fn load(&self, user: &User) -> Result<Vec<ResearchResult>> {
        Ok(load_json(&self.store, &history_key(&user.id))?.unwrap_or_default())
    }

    fn save(&mut self, user: &User, entries: &[ResearchResult]) -> Result<()> {
        save_json(&mut self.store, &history_key(&user.id), entries)
    }

    fn new_id(&mut self) -> String {
        (0..ID_LEN)
            .map(|_| ID_ALPHABET[self.rng.usize(..ID_ALPHABET.len())] as char)
            .collect()
    }

    /// The user's results, newest first.
    pub fn list(&self, user: &User) -> Result<Vec<ResearchResult>> {
        let mut entries = self.load(user)?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    /// Finds one result by id.
    pub fn get(&self, user: &User, id: &str) -> Result<Option<ResearchResult>> {
        Ok(self.load(user)?.into_iter().find(|entry| entry.id == id))
    }

    /// Stores a fresh model answer, rendering its text as markup.
    pub fn record(
        &mut self,
        user: &User,
        request: ResearchRequest,
        text: &str,
        sources: Vec<GroundingSource>,
    ) -> Result<ResearchResult> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        self.record_at(user, request, text, sources, timestamp)
    }

    fn record_at(
        &mut self,
        user: &User,
        request: ResearchRequest,
        text: &str,
        sources: Vec<GroundingSource>,
        timestamp: i64,
    ) -> Result<ResearchResult> {
        let mut entries = self.load(user)?;
        let mut id = self.new_id();
        while entries.iter().any(|entry| entry.id == id) {
            id = self.new_id();
        }

        let result = ResearchResult {
            id,
            content: render_markup(text),
            sources,
            request,
            timestamp,
            user_id: user.id.clone(),
        };
        entries.push(result.clone());
        self.save(user, &entries)?;

        info!("history: recorded {} for {}", result.id, user.name);
        Ok(result)
    }

    /// Replaces the markup of an edited result. Returns whether it existed.
    pub fn update_content(&mut self, user: &User, id: &str, markup: &str) -> Result<bool> {
        let mut entries = self.load(user)?;
        let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) else {
            return Ok(false);
        };
        entry.content = markup.to_owned();
        self.save(user, &entries)?;
        Ok(true)
    }

    /// Forgets all of the user's results.
    pub fn clear(&mut self, user: &User) -> Result<()> {
        info!("history: cleared for {}", user.name);
        self.store.remove(&history_key(&user.id))
    }
}
