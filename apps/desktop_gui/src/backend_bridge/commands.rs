//! Backend commands queued from UI to backend worker.

use client_core::{LoadRequest, Submission};

pub enum BackendCommand {
    LoadOptions(LoadRequest),
    Classify(Submission),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadOptions(LoadRequest::Phases { .. }) => "load_phases",
            BackendCommand::LoadOptions(LoadRequest::Documents { .. }) => "load_documents",
            BackendCommand::Classify(_) => "classify",
        }
    }
}
