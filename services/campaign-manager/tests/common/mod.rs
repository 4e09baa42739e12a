#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::ads_client::AdsApi;
use shared::dto::{AdsService, MutateResult, Operation, Page, Selector};
use shared::error::RemoteCallError;

pub const LARGE_IMAGE: &[u8] = b"large-jpeg";
pub const SQUARE_IMAGE: &[u8] = b"square-jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    Get,
    Mutate,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub kind: CallKind,
    pub service: AdsService,
    pub request: Value,
    pub response: Option<Value>,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    next_id: i64,
    mutate_counts: HashMap<AdsService, usize>,
    failures: HashSet<(AdsService, usize)>,
    empty_results: HashSet<AdsService>,
    entries: Vec<Value>,
    fail_gets: bool,
    string_ids: bool,
}

/// In-process `AdsApi` that hands out fresh ids and records every call.
pub struct FakeAds {
    state: Mutex<State>,
}

impl FakeAds {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                next_id: 1000,
                ..State::default()
            }),
        })
    }

    /// Fail the `nth` (1-based) mutate sent to `service`.
    pub fn fail_on(&self, service: AdsService, nth: usize) {
        self.state.lock().unwrap().failures.insert((service, nth));
    }

    /// Answer mutates on `service` with an empty `value` list.
    pub fn empty_result_for(&self, service: AdsService) {
        self.state.lock().unwrap().empty_results.insert(service);
    }

    /// Entries returned by every `get`.
    pub fn with_entries(&self, entries: Vec<Value>) {
        self.state.lock().unwrap().entries = entries;
    }

    /// Return created ids as decimal strings instead of numbers.
    pub fn string_ids(&self) {
        self.state.lock().unwrap().string_ids = true;
    }

    pub fn fail_gets(&self) {
        self.state.lock().unwrap().fail_gets = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind == CallKind::Mutate)
            .collect()
    }

    pub fn mutated_services(&self) -> Vec<AdsService> {
        self.mutates().into_iter().map(|c| c.service).collect()
    }

    pub fn mutate_count(&self, service: AdsService) -> usize {
        self.mutates()
            .iter()
            .filter(|c| c.service == service)
            .count()
    }
}

fn created_entry(service: AdsService, id: Value) -> Value {
    match service {
        AdsService::BudgetService => json!({"budgetId": id}),
        AdsService::CampaignService | AdsService::AdGroupService => json!({"id": id}),
        AdsService::AdGroupCriterionService => json!({"criterion": {"id": id}}),
        AdsService::AssetService => json!({"assetId": id}),
        AdsService::AdGroupAdService => json!({"ad": {"id": id}}),
    }
}

fn injected(service: AdsService) -> RemoteCallError {
    RemoteCallError::Api {
        status: 400,
        body: format!("injected failure on {service}"),
    }
}

#[async_trait]
impl AdsApi for FakeAds {
    async fn get(&self, service: AdsService, selector: &Selector) -> Result<Page, RemoteCallError> {
        let mut state = self.state.lock().unwrap();
        let request = serde_json::to_value(selector).unwrap();
        if state.fail_gets {
            state.calls.push(Call {
                kind: CallKind::Get,
                service,
                request,
                response: None,
            });
            return Err(injected(service));
        }
        let entries = state.entries.clone();
        state.calls.push(Call {
            kind: CallKind::Get,
            service,
            request,
            response: Some(json!({"entries": entries})),
        });
        Ok(Page {
            total_num_entries: entries.len() as i64,
            entries,
        })
    }

    async fn mutate(
        &self,
        service: AdsService,
        operations: &[Operation],
    ) -> Result<MutateResult, RemoteCallError> {
        let mut state = self.state.lock().unwrap();
        let request = serde_json::to_value(operations).unwrap();
        let nth = {
            let count = state.mutate_counts.entry(service).or_insert(0);
            *count += 1;
            *count
        };
        if state.failures.contains(&(service, nth)) {
            state.calls.push(Call {
                kind: CallKind::Mutate,
                service,
                request,
                response: None,
            });
            return Err(injected(service));
        }
        let value: Vec<Value> = if state.empty_results.contains(&service) {
            Vec::new()
        } else {
            operations
                .iter()
                .map(|_| {
                    state.next_id += 1;
                    let id = if state.string_ids {
                        json!(state.next_id.to_string())
                    } else {
                        json!(state.next_id)
                    };
                    created_entry(service, id)
                })
                .collect()
        };
        state.calls.push(Call {
            kind: CallKind::Mutate,
            service,
            request,
            response: Some(Value::Array(value.clone())),
        });
        Ok(MutateResult { value })
    }
}

/// Writes both ad images into `dir`.
pub fn write_images(dir: &Path) {
    std::fs::write(dir.join("600x315.jpg"), LARGE_IMAGE).unwrap();
    std::fs::write(dir.join("300x300.jpg"), SQUARE_IMAGE).unwrap();
}
