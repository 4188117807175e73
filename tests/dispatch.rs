mod common;

use std::num::NonZeroUsize;

use common::{ENGLISH, label};
use crm_translator::Result;
use crm_translator::dispatch::submit_batches;
use crm_translator::model::{EntityMetadata, LanguageCode};
use crm_translator::outcome::OutcomeStatus;
use crm_translator::store::{
    Catalog, EntityFilters, EntityUpdate, ExecuteMultipleRequest, ExecuteMultipleResponse,
    InMemoryStore, MetadataStore, UpdateRequest,
};
use pretty_assertions::assert_eq;
use uuid::Uuid;

fn numbered_store(count: usize) -> (InMemoryStore, Vec<UpdateRequest>) {
    let mut catalog = Catalog::default();
    let mut requests = Vec::new();
    for index in 0..count {
        let mut entity = EntityMetadata::new(format!("new_entity{index}"));
        entity.display_name = Some(label(&[(ENGLISH, "Before")]));
        let mut update = EntityUpdate::from(&entity);
        update.display_name = Some(label(&[(ENGLISH, "After")]));
        requests.push(UpdateRequest::UpdateEntity(update));
        catalog.entities.push(entity);
    }
    (InMemoryStore::new(catalog), requests)
}

fn batch(size: usize) -> NonZeroUsize {
    NonZeroUsize::new(size).unwrap()
}

fn display_text(store: &InMemoryStore, entity: &str) -> String {
    common::entity_text(store, entity, |e| e.display_name.as_ref(), ENGLISH).unwrap()
}

#[test]
fn twelve_instructions_in_batches_of_five_take_three_submissions() {
    let (mut store, requests) = numbered_store(12);

    let outcomes = submit_batches(&mut store, "Entities", requests, batch(5));

    assert_eq!(store.submissions(), &[5, 5, 2]);
    let messages: Vec<&str> = outcomes.iter().map(|o| o.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Processed 5 records", "Processed 5 records", "Processed 2 records"]
    );
}

#[test]
fn failed_submission_does_not_stop_later_batches() {
    let (mut store, requests) = numbered_store(12);
    store.fail_submission(1);

    let outcomes = submit_batches(&mut store, "Attributes", requests, batch(5));

    assert_eq!(store.submissions(), &[5, 5, 2]);
    let statuses: Vec<OutcomeStatus> = outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            OutcomeStatus::Success,
            OutcomeStatus::Failure,
            OutcomeStatus::Success
        ]
    );
    assert!(outcomes[1].message.contains("submission 1 could not be delivered"));
    assert_eq!(display_text(&store, "new_entity4"), "After");
    assert_eq!(display_text(&store, "new_entity7"), "Before");
    assert_eq!(display_text(&store, "new_entity11"), "After");
}

#[test]
fn faulted_operations_are_reported_individually() {
    let (mut store, requests) = numbered_store(5);
    store.fault_on("new_entity1");
    store.fault_on("new_entity3");

    let outcomes = submit_batches(&mut store, "Entities", requests, batch(5));

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|outcome| outcome.is_failure()));
    assert_eq!(outcomes[0].message, "update of new_entity1 was rejected");
    assert_eq!(outcomes[1].message, "update of new_entity3 was rejected");
    assert_eq!(display_text(&store, "new_entity2"), "After");
    assert_eq!(display_text(&store, "new_entity4"), "After");
}

#[test]
fn nothing_to_send_means_no_submission() {
    let (mut store, _) = numbered_store(0);

    let outcomes = submit_batches(&mut store, "Entities", Vec::new(), batch(1));

    assert!(outcomes.is_empty());
    assert!(store.submissions().is_empty());
}

/// Store whose every submission comes back faulted with no per-operation
/// detail.
struct SilentFaultStore;

impl MetadataStore for SilentFaultStore {
    fn who_am_i(&self) -> Result<Uuid> {
        Ok(Uuid::nil())
    }

    fn provisioned_languages(&self) -> Result<Vec<LanguageCode>> {
        Ok(Vec::new())
    }

    fn list_entities(&self, _filters: EntityFilters) -> Result<Vec<EntityMetadata>> {
        Ok(Vec::new())
    }

    fn retrieve_entity(
        &self,
        _logical_name: &str,
        _filters: EntityFilters,
    ) -> Result<Option<EntityMetadata>> {
        Ok(None)
    }

    fn execute_multiple(
        &mut self,
        _request: &ExecuteMultipleRequest,
    ) -> Result<ExecuteMultipleResponse> {
        Ok(ExecuteMultipleResponse {
            is_faulted: true,
            responses: Vec::new(),
        })
    }
}

#[test]
fn faulted_response_without_details_fails_the_batch() {
    let (_, requests) = numbered_store(7);
    let mut store = SilentFaultStore;

    let outcomes = submit_batches(&mut store, "Attributes", requests, batch(5));

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|outcome| outcome.is_failure()));
    assert_eq!(outcomes[0].message, "Batch of 5 records faulted without details");
    assert_eq!(outcomes[1].message, "Batch of 2 records faulted without details");
}
