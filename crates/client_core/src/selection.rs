//! Cascading project type → phase → document selection.
//!
//! Every change at one level synchronously invalidates the levels below it
//! and hands back the load the caller has to run. Each load carries a
//! [`LoadTicket`] stamped with the epoch of the level it populates; a result
//! is only applied if that level's epoch has not moved since, so a response
//! that arrives after a newer reset is dropped instead of overwriting it.

use std::fmt;

use serde_json::Value;
use shared::{domain::ClassificationResult, protocol::ClassifyRequest};
use tracing::{debug, warn};

use crate::error::{ClassificationError, LoadError, SelectionError, ValidationError};

pub const TYPE_PROMPT: &str = "select project type...";
pub const PHASE_PROMPT: &str = "select project phase...";
pub const DOCUMENT_PROMPT: &str = "select document...";
pub const PHASE_DISABLED_PLACEHOLDER: &str = "select type first";
pub const DOCUMENT_DISABLED_PLACEHOLDER: &str = "select phase first";
pub const LOADING_PLACEHOLDER: &str = "loading...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    ProjectType,
    ProjectPhase,
    DocumentName,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::ProjectType => "project type",
            Level::ProjectPhase => "project phase",
            Level::DocumentName => "document name",
        })
    }
}

/// Options offered by a ready selector, behind one synthetic empty entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionList {
    prompt: &'static str,
    options: Vec<String>,
}

impl OptionList {
    pub fn new(prompt: &'static str, options: Vec<String>) -> Self {
        Self { prompt, options }
    }

    pub fn prompt(&self) -> &'static str {
        self.prompt
    }

    /// Backend-provided options in the order they were returned.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// `(value, label)` pairs as displayed, starting with the empty default.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once(("", self.prompt))
            .chain(self.options.iter().map(|option| (option.as_str(), option.as_str())))
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|option| option == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelState {
    Disabled { placeholder: &'static str },
    Loading,
    Ready(OptionList),
    Error { placeholder: &'static str },
}

impl LevelState {
    pub fn is_interactive(&self) -> bool {
        matches!(self, LevelState::Ready(_))
    }

    /// Text a selector shows while it holds no value.
    pub fn placeholder(&self) -> &'static str {
        match self {
            LevelState::Disabled { placeholder } | LevelState::Error { placeholder } => {
                placeholder
            }
            LevelState::Loading => LOADING_PLACEHOLDER,
            LevelState::Ready(options) => options.prompt(),
        }
    }

    pub fn options(&self) -> Option<&OptionList> {
        match self {
            LevelState::Ready(options) => Some(options),
            _ => None,
        }
    }

    fn is_populated(&self) -> bool {
        matches!(self, LevelState::Ready(_) | LevelState::Loading)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub project_type: String,
    pub project_phase: String,
    pub document_name: String,
    pub amount: String,
}

impl Selection {
    /// The amount is only checked for presence; it is passed through as typed.
    pub fn validate(&self) -> Result<ClassifyRequest, ValidationError> {
        if self.project_type.is_empty()
            || self.project_phase.is_empty()
            || self.document_name.is_empty()
        {
            return Err(ValidationError::IncompleteSelection);
        }
        if self.amount.is_empty() {
            return Err(ValidationError::MissingAmount);
        }
        Ok(ClassifyRequest {
            project_type: self.project_type.clone(),
            project_phase: self.project_phase.clone(),
            document_name: self.document_name.clone(),
            amount: self.amount.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub level: Level,
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Phases {
        ticket: LoadTicket,
        project_type: String,
    },
    Documents {
        ticket: LoadTicket,
        project_type: String,
        project_phase: String,
    },
}

impl LoadRequest {
    pub fn ticket(&self) -> LoadTicket {
        match self {
            LoadRequest::Phases { ticket, .. } | LoadRequest::Documents { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: SubmitTicket,
    pub request: ClassifyRequest,
}

/// What the result display and the flowchart should show after a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutcome {
    pub result_label: String,
    pub steps: Option<Value>,
    pub error: Option<ClassificationError>,
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    selection: Selection,
    project_types: LevelState,
    phases: LevelState,
    documents: LevelState,
    phase_epoch: u64,
    document_epoch: u64,
    submit_epoch: u64,
}

impl SelectionController {
    pub fn new(project_types: Vec<String>) -> Self {
        Self {
            selection: Selection::default(),
            project_types: LevelState::Ready(OptionList::new(TYPE_PROMPT, project_types)),
            phases: LevelState::Disabled {
                placeholder: PHASE_DISABLED_PLACEHOLDER,
            },
            documents: LevelState::Disabled {
                placeholder: DOCUMENT_DISABLED_PLACEHOLDER,
            },
            phase_epoch: 0,
            document_epoch: 0,
            submit_epoch: 0,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn level(&self, level: Level) -> &LevelState {
        match level {
            Level::ProjectType => &self.project_types,
            Level::ProjectPhase => &self.phases,
            Level::DocumentName => &self.documents,
        }
    }

    pub fn change_project_type(
        &mut self,
        new_type: &str,
    ) -> Result<Option<LoadRequest>, SelectionError> {
        ensure_selectable(Level::ProjectType, &self.project_types, new_type)?;

        self.selection.project_type = new_type.to_string();
        self.selection.project_phase.clear();
        self.selection.document_name.clear();
        self.phase_epoch += 1;
        self.document_epoch += 1;
        self.documents = LevelState::Disabled {
            placeholder: DOCUMENT_DISABLED_PLACEHOLDER,
        };

        if new_type.is_empty() {
            self.phases = LevelState::Disabled {
                placeholder: PHASE_DISABLED_PLACEHOLDER,
            };
            return Ok(None);
        }

        self.phases = LevelState::Loading;
        Ok(Some(LoadRequest::Phases {
            ticket: LoadTicket {
                level: Level::ProjectPhase,
                epoch: self.phase_epoch,
            },
            project_type: new_type.to_string(),
        }))
    }

    pub fn change_project_phase(
        &mut self,
        new_phase: &str,
    ) -> Result<Option<LoadRequest>, SelectionError> {
        ensure_selectable(Level::ProjectPhase, &self.phases, new_phase)?;

        self.selection.project_phase = new_phase.to_string();
        self.selection.document_name.clear();
        self.document_epoch += 1;

        if new_phase.is_empty() {
            self.documents = LevelState::Disabled {
                placeholder: DOCUMENT_DISABLED_PLACEHOLDER,
            };
            return Ok(None);
        }

        self.documents = LevelState::Loading;
        Ok(Some(LoadRequest::Documents {
            ticket: LoadTicket {
                level: Level::DocumentName,
                epoch: self.document_epoch,
            },
            project_type: self.selection.project_type.clone(),
            project_phase: new_phase.to_string(),
        }))
    }

    pub fn change_document_name(&mut self, new_document: &str) -> Result<(), SelectionError> {
        ensure_selectable(Level::DocumentName, &self.documents, new_document)?;
        self.selection.document_name = new_document.to_string();
        Ok(())
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.selection.amount = amount.into();
    }

    /// Applies a phase list load. Returns `false` when the ticket is stale or
    /// was already applied.
    pub fn apply_phases(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<String>, LoadError>,
    ) -> bool {
        if ticket.level != Level::ProjectPhase
            || ticket.epoch != self.phase_epoch
            || self.phases != LevelState::Loading
        {
            debug!(?ticket, current = self.phase_epoch, "discarding stale phase list");
            return false;
        }
        self.phases = populated(Level::ProjectPhase, PHASE_PROMPT, result);
        true
    }

    /// Applies a document list load. Returns `false` when the ticket is stale.
    pub fn apply_documents(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<String>, LoadError>,
    ) -> bool {
        if ticket.level != Level::DocumentName
            || ticket.epoch != self.document_epoch
            || self.documents != LevelState::Loading
        {
            debug!(?ticket, current = self.document_epoch, "discarding stale document list");
            return false;
        }
        self.documents = populated(Level::DocumentName, DOCUMENT_PROMPT, result);
        true
    }

    /// Validates the current selection and stamps a classification request.
    ///
    /// A validation failure hands back nothing to send, so no request is made.
    pub fn submit(&mut self) -> Result<Submission, ValidationError> {
        let request = self.selection.validate()?;
        self.submit_epoch += 1;
        Ok(Submission {
            ticket: SubmitTicket {
                epoch: self.submit_epoch,
            },
            request,
        })
    }

    /// Maps a classification response to display updates. Responses to
    /// anything but the latest submission yield `None`, as does any
    /// response before the first submission.
    ///
    /// Failures carry an empty step list so the previous diagram is cleared.
    pub fn apply_classification(
        &mut self,
        ticket: SubmitTicket,
        result: Result<ClassificationResult, ClassificationError>,
    ) -> Option<ClassificationOutcome> {
        if self.submit_epoch == 0 || ticket.epoch != self.submit_epoch {
            debug!(?ticket, current = self.submit_epoch, "discarding stale classification");
            return None;
        }
        Some(match result {
            Ok(result) => ClassificationOutcome {
                result_label: result.result_level,
                steps: result.steps,
                error: None,
            },
            Err(err) => {
                warn!("classification failed: {err}");
                let result_label = match &err {
                    ClassificationError::Rejected { message } if !message.is_empty() => {
                        format!("{}: {message}", err.marker())
                    }
                    _ => err.marker().to_string(),
                };
                ClassificationOutcome {
                    result_label,
                    steps: Some(Value::Array(Vec::new())),
                    error: Some(err),
                }
            }
        })
    }

    /// Checks that no downstream value or populated selector outlives its
    /// upstream value.
    pub fn invariants_hold(&self) -> bool {
        let selection = &self.selection;
        let type_ok = !selection.project_type.is_empty()
            || (selection.project_phase.is_empty() && !self.phases.is_populated());
        let phase_ok = !selection.project_phase.is_empty()
            || (selection.document_name.is_empty() && !self.documents.is_populated());
        let phase_offered = selection.project_phase.is_empty()
            || self
                .phases
                .options()
                .is_some_and(|options| options.contains(&selection.project_phase));
        let document_offered = selection.document_name.is_empty()
            || self
                .documents
                .options()
                .is_some_and(|options| options.contains(&selection.document_name));
        type_ok && phase_ok && phase_offered && document_offered
    }
}

fn ensure_selectable(
    level: Level,
    state: &LevelState,
    value: &str,
) -> Result<(), SelectionError> {
    if value.is_empty() {
        return Ok(());
    }
    let options = state.options().ok_or(SelectionError::LevelNotReady { level })?;
    if !options.contains(value) {
        return Err(SelectionError::UnknownOption {
            level,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn populated(
    level: Level,
    prompt: &'static str,
    result: Result<Vec<String>, LoadError>,
) -> LevelState {
    match result {
        Ok(options) => {
            debug!(%level, count = options.len(), "selector populated");
            LevelState::Ready(OptionList::new(prompt, options))
        }
        Err(err) => {
            warn!(%level, "failed to load options: {err}");
            LevelState::Error {
                placeholder: err.placeholder(),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
