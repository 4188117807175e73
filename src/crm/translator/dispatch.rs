use std::num::NonZeroUsize;

use tracing::{info, instrument, warn};

use crate::crm::translator::outcome::Outcome;
use crate::crm::translator::store::{
    ExecuteMultipleRequest, ExecuteMultipleSettings, MetadataStore, UpdateRequest,
};

/// Entity metadata updates are sent one at a time.
pub const ENTITY_BATCH_SIZE: NonZeroUsize = NonZeroUsize::MIN;
/// Default number of attribute updates submitted together.
pub const ATTRIBUTE_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(size) => size,
    None => unreachable!(),
};

const SETTINGS: ExecuteMultipleSettings = ExecuteMultipleSettings {
    continue_on_error: true,
    return_responses: true,
};

/// Submits `requests` in consecutive batches of at most `batch_size`.
///
/// Every batch is sent even if earlier ones failed. A faulted response yields
/// one failure per faulted operation (or one for the batch when no operation
/// carries a fault), a failed call yields one failure for the whole batch,
/// and a clean response yields one success for the batch.
#[instrument(level = "info", skip(store, requests), fields(requests = requests.len()))]
pub fn submit_batches<S>(
    store: &mut S,
    sheet: &str,
    requests: Vec<UpdateRequest>,
    batch_size: NonZeroUsize,
) -> Vec<Outcome>
where
    S: MetadataStore + ?Sized,
{
    let mut outcomes = Vec::new();

    for batch in requests.chunks(batch_size.get()) {
        let request = ExecuteMultipleRequest {
            requests: batch.to_vec(),
            settings: SETTINGS,
        };

        match store.execute_multiple(&request) {
            Ok(response) if response.is_faulted => {
                let before = outcomes.len();
                for item in &response.responses {
                    if let Some(fault) = &item.fault {
                        warn!(
                            target_name = %describe(batch, item.request_index),
                            fault = %fault.message,
                            "operation faulted"
                        );
                        outcomes.push(Outcome::failure(sheet, fault.message.clone()));
                    }
                }
                if outcomes.len() == before {
                    warn!(count = batch.len(), "batch faulted without operation faults");
                    outcomes.push(Outcome::failure(
                        sheet,
                        format!("Batch of {} records faulted without details", batch.len()),
                    ));
                }
            }
            Ok(_) => {
                info!(count = batch.len(), "batch applied");
                outcomes.push(Outcome::success(
                    sheet,
                    format!("Processed {} records", batch.len()),
                ));
            }
            Err(error) => {
                warn!(error = %error, count = batch.len(), "batch submission failed");
                outcomes.push(Outcome::failure(
                    sheet,
                    format!("Error during executing multiple request : {error}"),
                ));
            }
        }
    }

    outcomes
}

fn describe(batch: &[UpdateRequest], index: usize) -> String {
    batch
        .get(index)
        .map(UpdateRequest::target)
        .unwrap_or_else(|| format!("#{index}"))
}
