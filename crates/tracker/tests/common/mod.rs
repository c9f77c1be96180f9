//! Shared test helpers: a scripted in-memory `ReelBackend` and reel
//! builders.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;

use reelgen_core::backend::ReelBackend;
use reelgen_core::error::CoreError;
use reelgen_core::reel::{Language, MediaRefs, Reel, ReelCreate, ReelPage, ScriptUpdate};
use reelgen_core::stage::ReelStage;
use reelgen_core::types::DbId;
use reelgen_tracker::config::TrackerConfig;

/// Poll interval used by every test.
pub const INTERVAL: Duration = Duration::from_millis(3000);

pub const SCRIPT: &str = "Walk for ten minutes after every meal to steady blood sugar.";

pub fn test_config() -> TrackerConfig {
    TrackerConfig::with_poll_interval(INTERVAL)
}

/// Build a reel whose payloads are consistent with `stage`.
pub fn reel(id: DbId, stage: ReelStage) -> Reel {
    let has_script = !matches!(stage, ReelStage::Pending | ReelStage::GeneratingScript);
    let mut media = MediaRefs::default();
    if matches!(
        stage,
        ReelStage::GeneratingVideo | ReelStage::PostProcessing | ReelStage::Completed
    ) {
        media.audio_path = Some(format!("audio/{id}.wav"));
    }
    if matches!(stage, ReelStage::PostProcessing | ReelStage::Completed) {
        media.video_raw_path = Some(format!("video/{id}_raw.mp4"));
    }
    if stage == ReelStage::Completed {
        media.video_final_path = Some(format!("video/{id}_final.mp4"));
    }

    Reel {
        id,
        topic: "diabetes tips".to_string(),
        language: Language::En,
        stage,
        script_text: has_script.then(|| SCRIPT.to_string()),
        media,
        error_text: (stage == ReelStage::Failed).then(|| "render error".to_string()),
        duration_seconds: (stage == ReelStage::Completed).then_some(42.5),
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        completed_at: (stage == ReelStage::Completed)
            .then(|| Utc.with_ymd_and_hms(2026, 3, 1, 10, 5, 0).unwrap()),
    }
}

/// Every request the fake received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(DbId),
    UpdateScript(DbId, String),
    Generate(DbId),
    Delete(DbId),
    Create(String),
    List(u32, u32),
}

/// Scripted backend.
///
/// Fetch responses are queued per reel; the last queued response repeats
/// forever. A gate holds requests for a reel until released, to simulate
/// a slow network.
#[derive(Default)]
pub struct FakeBackend {
    fetches: Mutex<HashMap<DbId, VecDeque<Result<Reel, CoreError>>>>,
    fetch_gates: Mutex<HashMap<DbId, Arc<Semaphore>>>,
    generate_gate: Mutex<Option<Arc<Semaphore>>>,
    update_failure: Mutex<Option<CoreError>>,
    generate_failure: Mutex<Option<CoreError>>,
    delete_failure: Mutex<Option<CoreError>>,
    created: Mutex<Option<Reel>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the queued fetch responses for `id`.
    pub fn script_fetches(&self, id: DbId, responses: Vec<Result<Reel, CoreError>>) {
        self.fetches
            .lock()
            .unwrap()
            .insert(id, responses.into_iter().collect());
    }

    /// Queue a sequence of successful fetches walking through `stages`.
    pub fn script_stages(&self, id: DbId, stages: &[ReelStage]) {
        self.script_fetches(id, stages.iter().map(|s| Ok(reel(id, *s))).collect());
    }

    /// Hold fetches for `id` until [`release_fetch`](Self::release_fetch).
    pub fn gate_fetch(&self, id: DbId) {
        self.fetch_gates
            .lock()
            .unwrap()
            .insert(id, Arc::new(Semaphore::new(0)));
    }

    pub fn release_fetch(&self, id: DbId) {
        if let Some(gate) = self.fetch_gates.lock().unwrap().get(&id) {
            gate.add_permits(1);
        }
    }

    pub fn gate_generate(&self) {
        *self.generate_gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_generate(&self) {
        if let Some(gate) = self.generate_gate.lock().unwrap().as_ref() {
            gate.add_permits(1);
        }
    }

    pub fn fail_update(&self, error: CoreError) {
        *self.update_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_generate(&self, error: CoreError) {
        *self.generate_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_delete(&self, error: CoreError) {
        *self.delete_failure.lock().unwrap() = Some(error);
    }

    /// Reel returned by the next `create_reel`.
    pub fn will_create(&self, reel: Reel) {
        *self.created.lock().unwrap() = Some(reel);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, id: DbId) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == Call::Fetch(id))
            .count()
    }

    pub fn called(&self, call: &Call) -> bool {
        self.calls.lock().unwrap().contains(call)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

async fn pass_gate(gate: Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        gate.acquire().await.unwrap().forget();
    }
}

#[async_trait]
impl ReelBackend for FakeBackend {
    async fn fetch_reel(&self, id: DbId) -> Result<Reel, CoreError> {
        self.record(Call::Fetch(id));
        let gate = self.fetch_gates.lock().unwrap().get(&id).cloned();
        pass_gate(gate).await;

        let mut fetches = self.fetches.lock().unwrap();
        let Some(queue) = fetches.get_mut(&id) else {
            return Err(CoreError::reel_not_found(id));
        };
        match queue.len() {
            0 => Err(CoreError::reel_not_found(id)),
            1 => queue[0].clone(),
            _ => queue.pop_front().unwrap(),
        }
    }

    async fn update_script(&self, id: DbId, update: &ScriptUpdate) -> Result<Reel, CoreError> {
        self.record(Call::UpdateScript(id, update.script_text.clone()));
        if let Some(error) = self.update_failure.lock().unwrap().clone() {
            return Err(error);
        }
        let mut updated = reel(id, ReelStage::ScriptReady);
        updated.script_text = Some(update.script_text.clone());
        Ok(updated)
    }

    async fn request_generation(&self, id: DbId) -> Result<Reel, CoreError> {
        self.record(Call::Generate(id));
        let gate = self.generate_gate.lock().unwrap().clone();
        pass_gate(gate).await;

        if let Some(error) = self.generate_failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(reel(id, ReelStage::GeneratingAudio))
    }

    async fn delete_reel(&self, id: DbId) -> Result<(), CoreError> {
        self.record(Call::Delete(id));
        match self.delete_failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn create_reel(&self, request: &ReelCreate) -> Result<Reel, CoreError> {
        self.record(Call::Create(request.topic.clone()));
        self.created
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CoreError::Validation("no reel scripted for create".into()))
    }

    async fn list_reels(&self, page: u32, per_page: u32) -> Result<ReelPage, CoreError> {
        self.record(Call::List(page, per_page));
        Ok(ReelPage {
            reels: Vec::new(),
            total: 0,
            page,
            per_page,
        })
    }
}

/// Yield until `cond` holds, letting spawned poll tasks run.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
