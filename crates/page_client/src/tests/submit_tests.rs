use async_trait::async_trait;
use serde_json::{json, Value};
use shared::domain::OrderId;

use super::*;
use crate::transport::SubmitResponse;

/// Records every payload and answers with a canned result.
struct RecordingTransport {
    reply: Result<SubmitResponse, SubmitError>,
    sent: std::sync::Mutex<Vec<FormPayload>>,
}

impl RecordingTransport {
    fn ok(status: u16, body: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(SubmitResponse { status, body }),
            sent: std::sync::Mutex::new(Vec::new()),
        })
    }

    fn failing(error: SubmitError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            sent: std::sync::Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<FormPayload> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl SubmitTransport for RecordingTransport {
    async fn submit(&self, payload: &FormPayload) -> Result<SubmitResponse, SubmitError> {
        self.sent.lock().expect("sent lock").push(payload.clone());
        self.reply.clone()
    }
}

/// Collects formatted tracing output emitted on the current thread.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log lock")).into_owned()
    }
}

struct CardPage {
    document: Arc<Mutex<Document>>,
    list: NodeId,
    cards: Vec<NodeId>,
    forms: Vec<NodeId>,
    settle_buttons: Vec<NodeId>,
}

/// A list of order cards, each with a hidden `orderId` and a "Settled" button.
fn card_page(count: usize) -> CardPage {
    let mut doc = Document::new();
    let list = doc
        .append_element(doc.root(), "div", &[("id", "orders")])
        .expect("list");
    let mut cards = Vec::new();
    let mut forms = Vec::new();
    let mut settle_buttons = Vec::new();
    for index in 0..count {
        let card = doc
            .append_element(list, "div", &[("class", "card")])
            .expect("card");
        let form = doc.append_element(card, "form", &[]).expect("form");
        let order_id = format!("A-{index}");
        doc.append_element(
            form,
            "input",
            &[("type", "hidden"), ("name", "orderId"), ("value", order_id.as_str())],
        )
        .expect("order id");
        let settle = doc
            .append_element(form, "button", &[("data-type", "Settled")])
            .expect("button");
        cards.push(card);
        forms.push(form);
        settle_buttons.push(settle);
    }
    CardPage {
        document: Arc::new(Mutex::new(doc)),
        list,
        cards,
        forms,
        settle_buttons,
    }
}

async fn attached_interceptor(page: &CardPage, transport: Arc<RecordingTransport>) -> SubmitInterceptor {
    let mut interceptor =
        SubmitInterceptor::new(page.document.clone(), transport, RowTransition::default());
    interceptor.attach_all().await;
    interceptor
}

#[tokio::test]
async fn attach_all_registers_forms_present_at_init() {
    let page = card_page(2);
    let transport = RecordingTransport::ok(200, json!({}));
    let interceptor = attached_interceptor(&page, transport.clone()).await;

    let late_form = {
        let mut doc = page.document.lock().await;
        doc.append_element(page.list, "form", &[]).expect("late form")
    };

    assert!(interceptor.is_attached(page.forms[0]));
    assert!(interceptor.is_attached(page.forms[1]));
    assert!(!interceptor.is_attached(late_form));

    let mut event = SubmitEvent::new(late_form);
    let outcome = interceptor.handle_submit(&mut event).await;

    assert_eq!(outcome, SubmitOutcome::NotIntercepted);
    assert!(!event.default_prevented());
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn attach_counts_only_new_forms() {
    let page = card_page(2);
    let mut interceptor = SubmitInterceptor::new(
        page.document.clone(),
        RecordingTransport::ok(200, json!({})),
        RowTransition::default(),
    );

    assert_eq!(interceptor.attach([page.forms[0]]), 1);
    assert_eq!(interceptor.attach(page.forms.clone()), 1);
    assert_eq!(interceptor.attach_all().await, 0);
}

#[tokio::test]
async fn success_prevents_default_fades_and_moves_card_last() {
    let page = card_page(3);
    let transport = RecordingTransport::ok(200, json!({ "orderId": "A-0" }));
    let interceptor = attached_interceptor(&page, transport.clone()).await;

    let mut event = SubmitEvent::with_submitter(page.forms[0], page.settle_buttons[0]);
    let outcome = interceptor.handle_submit(&mut event).await;

    assert!(event.default_prevented());
    let (payload, ack, row) = match outcome {
        SubmitOutcome::Completed { payload, ack, row } => (payload, ack, row),
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(row, Some(page.cards[0]));
    assert_eq!(ack.order_id(), Some(&OrderId("A-0".into())));
    assert_eq!(payload.get("orderId"), Some("A-0"));
    assert_eq!(payload.status(), Some(TransactionStatus::Settled));

    let doc = page.document.lock().await;
    assert_eq!(doc.style(page.cards[0], "opacity"), Some("0.5"));
    assert_eq!(doc.last_child(page.list), Some(page.cards[0]));
    assert_eq!(
        doc.children(page.list),
        &[page.cards[1], page.cards[2], page.cards[0]]
    );
}

#[tokio::test]
async fn payload_is_exactly_the_fields_plus_optional_type() {
    let page = card_page(1);
    let transport = RecordingTransport::ok(200, json!({}));
    let interceptor = attached_interceptor(&page, transport.clone()).await;

    let mut with_type = SubmitEvent::with_submitter(page.forms[0], page.settle_buttons[0]);
    interceptor.handle_submit(&mut with_type).await;
    let mut without_submitter = SubmitEvent::new(page.forms[0]);
    interceptor.handle_submit(&mut without_submitter).await;

    let sent = transport.sent();
    assert_eq!(
        sent[0],
        [("orderId", "A-0"), ("type", "Settled")]
            .into_iter()
            .collect::<FormPayload>()
    );
    assert_eq!(
        sent[1],
        [("orderId", "A-0")].into_iter().collect::<FormPayload>()
    );
}

#[tokio::test]
async fn transport_failure_leaves_document_untouched() {
    let page = card_page(2);
    let transport = RecordingTransport::failing(SubmitError::Transport("connection refused".into()));
    let interceptor = attached_interceptor(&page, transport).await;

    let mut event = SubmitEvent::with_submitter(page.forms[0], page.settle_buttons[0]);
    let outcome = interceptor.handle_submit(&mut event).await;

    assert!(event.default_prevented());
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed {
            error: SubmitError::Transport(_),
            ..
        }
    ));
    let doc = page.document.lock().await;
    assert_eq!(doc.style(page.cards[0], "opacity"), None);
    assert_eq!(doc.children(page.list), page.cards.as_slice());
}

#[tokio::test]
async fn malformed_body_leaves_document_untouched() {
    let page = card_page(2);
    let transport = RecordingTransport::failing(SubmitError::Decode("expected value".into()));
    let interceptor = attached_interceptor(&page, transport).await;

    let mut event = SubmitEvent::new(page.forms[0]);
    let outcome = interceptor.handle_submit(&mut event).await;

    let error = match outcome {
        SubmitOutcome::Failed { error, .. } => error,
        other => panic!("expected failure, got {other:?}"),
    };
    assert_eq!(error.code(), shared::error::ErrorCode::Decode);
    let doc = page.document.lock().await;
    assert_eq!(doc.children(page.list), page.cards.as_slice());
}

#[tokio::test]
async fn error_status_with_json_still_completes() {
    let page = card_page(2);
    let transport = RecordingTransport::ok(500, json!({ "message": "db down" }));
    let interceptor = attached_interceptor(&page, transport).await;

    let mut event = SubmitEvent::new(page.forms[0]);
    let outcome = interceptor.handle_submit(&mut event).await;

    assert!(outcome.is_completed());
    let doc = page.document.lock().await;
    assert_eq!(doc.last_child(page.list), Some(page.cards[0]));
}

#[tokio::test]
async fn unknown_status_label_is_sent_verbatim() {
    let page = card_page(1);
    {
        let mut doc = page.document.lock().await;
        doc.set_attribute(page.settle_buttons[0], "data-type", "archived")
            .expect("relabel");
    }
    let transport = RecordingTransport::ok(200, json!({}));
    let interceptor = attached_interceptor(&page, transport.clone()).await;

    let mut event = SubmitEvent::with_submitter(page.forms[0], page.settle_buttons[0]);
    interceptor.handle_submit(&mut event).await;

    assert_eq!(transport.sent()[0].submit_type(), Some("archived"));
}

#[tokio::test]
async fn registered_but_unknown_form_is_invalid() {
    let page = card_page(1);
    let transport = RecordingTransport::ok(200, json!({}));
    let mut interceptor = attached_interceptor(&page, transport.clone()).await;
    let ghost = NodeId(999);
    interceptor.attach([ghost]);

    let mut event = SubmitEvent::new(ghost);
    let outcome = interceptor.handle_submit(&mut event).await;

    assert_eq!(outcome, SubmitOutcome::Invalid(DomError::UnknownNode(ghost)));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn concurrent_submits_each_complete() {
    let page = card_page(3);
    let transport = RecordingTransport::ok(200, json!({}));
    let interceptor = attached_interceptor(&page, transport.clone()).await;

    let mut handles = Vec::new();
    for form in [page.forms[0], page.forms[1]] {
        let interceptor = interceptor.clone();
        handles.push(tokio::spawn(async move {
            let mut event = SubmitEvent::new(form);
            interceptor.handle_submit(&mut event).await
        }));
    }
    for handle in handles {
        assert!(handle.await.expect("join").is_completed());
    }

    assert_eq!(transport.sent().len(), 2);
    let doc = page.document.lock().await;
    assert_eq!(doc.children(page.list)[0], page.cards[2]);
    assert_eq!(doc.style(page.cards[0], "opacity"), Some("0.5"));
    assert_eq!(doc.style(page.cards[1], "opacity"), Some("0.5"));
}

#[tokio::test]
async fn transport_failure_is_logged_as_error() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let page = card_page(1);
    let transport = RecordingTransport::failing(SubmitError::Transport("connection refused".into()));
    let interceptor = attached_interceptor(&page, transport).await;

    let mut event = SubmitEvent::new(page.forms[0]);
    interceptor.handle_submit(&mut event).await;

    let output = logs.contents();
    assert!(output.contains("ERROR"), "missing error line: {output}");
    assert!(output.contains("submit failed"), "missing failure message: {output}");
    assert!(output.contains("connection refused"), "missing cause: {output}");
    assert!(output.contains("code=Transport"), "missing error code: {output}");
}

#[tokio::test]
async fn malformed_body_is_logged_as_error() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let page = card_page(1);
    let transport = RecordingTransport::failing(SubmitError::Decode("expected value".into()));
    let interceptor = attached_interceptor(&page, transport).await;

    let mut event = SubmitEvent::new(page.forms[0]);
    interceptor.handle_submit(&mut event).await;

    let output = logs.contents();
    assert!(output.contains("ERROR"), "missing error line: {output}");
    assert!(output.contains("submit failed"), "missing failure message: {output}");
    assert!(output.contains("code=Decode"), "missing error code: {output}");
}

#[tokio::test]
async fn success_logs_ack_without_errors() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let page = card_page(1);
    let transport = RecordingTransport::ok(200, json!({ "orderId": "A-0" }));
    let interceptor = attached_interceptor(&page, transport).await;

    let mut event = SubmitEvent::with_submitter(page.forms[0], page.settle_buttons[0]);
    interceptor.handle_submit(&mut event).await;

    let output = logs.contents();
    assert!(output.contains("submit succeeded"), "missing success line: {output}");
    assert!(output.contains("terminal=true"), "missing status line: {output}");
    assert!(!output.contains("ERROR"), "unexpected error line: {output}");
}
