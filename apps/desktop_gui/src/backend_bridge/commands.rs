//! Backend commands queued from UI to backend worker.

use client_core::FetchRequest;
use shared::protocol::CreatePointRequest;

/// Every command carries the epoch of the form that issued it so results for
/// an abandoned form can be told apart from the current one.
pub enum BackendCommand {
    Fetch {
        epoch: u64,
        request: FetchRequest,
    },
    Submit {
        epoch: u64,
        request: CreatePointRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Fetch { request, .. } => match request {
                FetchRequest::Location => "fetch_location",
                FetchRequest::Items => "fetch_items",
                FetchRequest::States => "fetch_states",
                FetchRequest::Cities { .. } => "fetch_cities",
            },
            BackendCommand::Submit { .. } => "submit_point",
        }
    }
}
