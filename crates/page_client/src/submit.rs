//! Intercepts form submission, posts the form in the background and marks
//! the card done once the endpoint answers.

use std::{collections::HashSet, sync::Arc};

use shared::{
    domain::TransactionStatus,
    error::SubmitError,
    protocol::{FormPayload, SubmitAck},
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    dom::{Document, DomError, NodeId},
    form_data::collect_form_data,
    transition::RowTransition,
    transport::SubmitTransport,
};

/// A submit interaction: the form being submitted and, when a submit control
/// was activated, that control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitEvent {
    form: NodeId,
    submitter: Option<NodeId>,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form: NodeId) -> Self {
        Self {
            form,
            submitter: None,
            default_prevented: false,
        }
    }

    pub fn with_submitter(form: NodeId, submitter: NodeId) -> Self {
        Self {
            submitter: Some(submitter),
            ..Self::new(form)
        }
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn submitter(&self) -> Option<NodeId> {
        self.submitter
    }

    /// Stops the native, navigating submission.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The form was not registered; native submission goes ahead.
    NotIntercepted,
    /// The form could not be read from the document.
    Invalid(DomError),
    /// The endpoint answered with JSON. `row` is the card that was faded and
    /// moved, if one could be located.
    Completed {
        payload: FormPayload,
        ack: SubmitAck,
        row: Option<NodeId>,
    },
    /// Nothing in the document changed.
    Failed {
        payload: FormPayload,
        error: SubmitError,
    },
}

impl SubmitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SubmitOutcome::Completed { .. })
    }
}

#[derive(Clone)]
pub struct SubmitInterceptor {
    document: Arc<Mutex<Document>>,
    transport: Arc<dyn SubmitTransport>,
    transition: RowTransition,
    forms: HashSet<NodeId>,
}

impl SubmitInterceptor {
    pub fn new(
        document: Arc<Mutex<Document>>,
        transport: Arc<dyn SubmitTransport>,
        transition: RowTransition,
    ) -> Self {
        Self {
            document,
            transport,
            transition,
            forms: HashSet::new(),
        }
    }

    /// Registers the given forms. Returns how many were newly registered.
    pub fn attach<I>(&mut self, forms: I) -> usize
    where
        I: IntoIterator<Item = NodeId>,
    {
        forms
            .into_iter()
            .filter(|form| self.forms.insert(*form))
            .count()
    }

    /// Registers every `form` currently in the document. Forms added to the
    /// document afterwards stay unregistered.
    pub async fn attach_all(&mut self) -> usize {
        let forms = self.document.lock().await.elements_by_tag("form");
        let attached = self.attach(forms);
        debug!(attached, "registered submit handler on forms");
        attached
    }

    pub fn is_attached(&self, form: NodeId) -> bool {
        self.forms.contains(&form)
    }

    /// Handles one submit interaction end to end. The document lock is only
    /// held while reading the form and while applying the transition, never
    /// across the request.
    pub async fn handle_submit(&self, event: &mut SubmitEvent) -> SubmitOutcome {
        let form = event.form();
        if !self.is_attached(form) {
            debug!(%form, "form not registered, leaving submission alone");
            return SubmitOutcome::NotIntercepted;
        }
        event.prevent_default();

        let payload = {
            let doc = self.document.lock().await;
            collect_form_data(&doc, form, event.submitter())
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                error!(%form, "cannot read submitted form: {err}");
                return SubmitOutcome::Invalid(err);
            }
        };

        if let Some(raw) = payload.submit_type() {
            match raw.parse::<TransactionStatus>() {
                Ok(status) => debug!(
                    %form,
                    %status,
                    terminal = status.is_terminal(),
                    "submitting with status"
                ),
                Err(err) => warn!(%form, "{err}; sending it verbatim"),
            }
        }
        debug!(%form, fields = payload.len(), "submitting form");

        let response = match self.transport.submit(&payload).await {
            Ok(response) => response,
            Err(err) => {
                error!(%form, code = ?err.code(), "submit failed: {err}");
                return SubmitOutcome::Failed {
                    payload,
                    error: err,
                };
            }
        };

        if !response.is_success() {
            warn!(%form, status = response.status, "submit endpoint answered with an error status");
        }
        let ack = SubmitAck::from_value(response.body);
        info!(%form, ack = ?ack, "submit succeeded");

        let row = {
            let mut doc = self.document.lock().await;
            match self.transition.apply(&mut doc, form) {
                Ok(row) => Some(row),
                Err(err) => {
                    warn!(%form, "submitted card was not moved: {err}");
                    None
                }
            }
        };

        SubmitOutcome::Completed { payload, ack, row }
    }
}

#[cfg(test)]
#[path = "tests/submit_tests.rs"]
mod tests;
