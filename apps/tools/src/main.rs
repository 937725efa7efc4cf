use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use page_client::{
    http_interceptor, load_settings, memory_toggle, Document, SubmitEvent, SubmitOutcome,
    ToggleMode,
};
use serde_json::json;
use shared::error::ErrorReport;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Toggle a query parameter on a page URL and print where the page goes.
    Toggle {
        #[arg(long)]
        url: String,
        #[arg(long)]
        param: String,
        #[arg(long)]
        value: String,
        /// Remove the parameter whenever present, whatever its value.
        #[arg(long)]
        presence_only: bool,
    },
    /// Submit one card form to the endpoint and print the outcome.
    Submit {
        /// Form field as `name=value`; repeatable.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Status carried by the submit button's `data-type`.
        #[arg(long = "type")]
        submit_type: Option<String>,
        /// Overrides the configured base URL.
        #[arg(long)]
        base_url: Option<String>,
    },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let mut settings = load_settings();

    match cli.command {
        Command::Toggle {
            url,
            param,
            value,
            presence_only,
        } => {
            if presence_only {
                settings.toggle_mode = ToggleMode::PresenceOnly;
            }
            let start = Url::parse(&url).with_context(|| format!("invalid page url '{url}'"))?;
            let toggle = memory_toggle(&settings, start);
            info!(param = %param, mode = %toggle.mode(), "toggling query parameter");
            println!("{}", toggle.toggle(&param, &value));
        }
        Command::Submit {
            fields,
            submit_type,
            base_url,
        } => {
            if let Some(base_url) = base_url {
                settings.base_url = base_url;
            }

            let (document, form, button) = single_card_page(&fields, submit_type.as_deref())?;
            let mut interceptor = http_interceptor(&settings, document)
                .with_context(|| format!("invalid submit endpoint '{}'", settings.base_url))?;
            interceptor.attach([form]);
            info!(
                base_url = %settings.base_url,
                fields = fields.len(),
                "submitting card"
            );

            let mut event = SubmitEvent::with_submitter(form, button);
            let report = match interceptor.handle_submit(&mut event).await {
                SubmitOutcome::Completed { payload, ack, row } => json!({
                    "status": "completed",
                    "payload": payload,
                    "ack": ack,
                    "card_moved": row.is_some(),
                }),
                SubmitOutcome::Failed { payload, error } => json!({
                    "status": "failed",
                    "payload": payload,
                    "error": ErrorReport::from(&error),
                }),
                SubmitOutcome::Invalid(err) => return Err(anyhow!(err)),
                SubmitOutcome::NotIntercepted => {
                    return Err(anyhow!("form {form} was not registered"))
                }
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// A list holding one card whose form carries `fields` as hidden inputs and a
/// submit button tagged with `submit_type`.
fn single_card_page(
    fields: &[(String, String)],
    submit_type: Option<&str>,
) -> Result<(Arc<Mutex<Document>>, page_client::NodeId, page_client::NodeId)> {
    let mut doc = Document::new();
    let list = doc.append_element(doc.root(), "div", &[])?;
    let card = doc.append_element(list, "div", &[("class", "card")])?;
    let form = doc.append_element(card, "form", &[])?;
    for (name, value) in fields {
        doc.append_element(
            form,
            "input",
            &[("type", "hidden"), ("name", name.as_str()), ("value", value.as_str())],
        )?;
    }
    let button = doc.append_element(form, "button", &[("type", "submit")])?;
    if let Some(submit_type) = submit_type {
        doc.set_attribute(button, "data-type", submit_type)?;
    }
    Ok((Arc::new(Mutex::new(doc)), form, button))
}
