//! The search-client panel: tab summary and detail view

use crate::bar::{BarPanel, DebugBar};
use crate::config::{DumpOptions, PanelConfig};
use crate::dump::{self, truncate};
use crate::explain::{copy_pass, explain_pass, ReplayedEntry};
use crate::extract::{extract_request, extract_response, Payload};
use crate::highlight::highlight;
use crate::html::escape;
use crate::log::Totals;
use crate::recorder::Recorder;
use esbar_common::SearchClient;
use serde_json::Value;
use std::sync::Arc;

/// Debugger-bar panel observing one search client
pub struct Panel {
    config: PanelConfig,
    client: Arc<dyn SearchClient>,
    recorder: Arc<Recorder>,
}

impl Panel {
    /// Start recording calls made through `client`
    pub fn attach(config: PanelConfig, client: Arc<dyn SearchClient>) -> Arc<Self> {
        let recorder = Arc::new(Recorder::new(config.default_authority.clone()));
        client.add_listener(recorder.clone());
        tracing::debug!("{} panel attached", config.title);

        Arc::new(Self {
            config,
            client,
            recorder,
        })
    }

    /// Attach to `client` and show the panel on `bar`
    pub fn register(
        config: PanelConfig,
        client: Arc<dyn SearchClient>,
        bar: &mut dyn DebugBar,
    ) -> Arc<Self> {
        let panel = Self::attach(config, client);
        bar.add_panel(panel.clone());
        panel
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn recorder(&self) -> &Arc<Recorder> {
        &self.recorder
    }

    pub fn totals(&self) -> Totals {
        self.recorder.totals()
    }

    /// "3 calls / 12.50 ms", or the product title before any call
    pub fn tab_label(&self) -> String {
        let totals = self.totals();
        match totals.query_count {
            0 => self.config.title.clone(),
            count => format!(
                "{} call{} / {:.2} ms",
                count,
                if count > 1 { "s" } else { "" },
                totals.total_ms()
            ),
        }
    }

    pub fn render_tab(&self) -> String {
        format!(
            "<span class=\"esbar-tab\" title=\"{}\">{}</span>",
            escape(&self.config.title),
            escape(&self.tab_label())
        )
    }

    /// Detail view of every logged call, grouped by authority
    ///
    /// Search calls are replayed with `explain` first unless disabled. Replays
    /// are not recorded; calls completing on other threads meanwhile are.
    pub fn render_panel(&self) -> Option<String> {
        let (log, totals) = self.recorder.snapshot();
        if log.is_empty() {
            return None;
        }

        let buckets = if self.config.explain {
            let _paused = self.recorder.pause();
            explain_pass(&log, self.client.as_ref(), &self.config.search_marker)
        } else {
            copy_pass(&log)
        };

        let total_time = if totals.total_time.is_zero() {
            "none".to_string()
        } else {
            format!("{:.3} ms", totals.total_ms())
        };

        let mut out = String::from("<div class=\"esbar\">");
        out.push_str(&format!(
            "<h1>Queries: {}, time: {}</h1>",
            totals.query_count, total_time
        ));

        for bucket in &buckets {
            out.push_str(&format!("<h2>{}</h2>", escape(bucket.authority)));
            out.push_str("<table><tr><th>Time&nbsp;ms</th><th>Request</th><th>Response</th></tr>");
            for entry in &bucket.entries {
                self.render_row(&mut out, entry);
            }
            out.push_str("</table>");
        }

        out.push_str("</div>");
        Some(out)
    }

    fn render_row(&self, out: &mut String, replayed: &ReplayedEntry<'_>) {
        let entry = replayed.entry;
        let request = &entry.request;

        out.push_str(&format!(
            "<tr><td>{:.3}</td><td title=\"{}\"><span class=\"esbar-method\">{}</span> <code>{}</code>{}</td><td>",
            entry.elapsed_ms(),
            entry.recorded_at.to_rfc3339(),
            escape(request.method.as_str()),
            escape(&request.path_and_query()),
            request_html(&extract_request(request))
        ));

        if let Some(response) = replayed.response() {
            out.push_str(&format!("<div>HTTP {}", response.status));
            if replayed.explained {
                out.push_str(" <span class=\"esbar-explained\">explained</span>");
            }
            out.push_str("</div>");
            out.push_str(&response_html(&extract_response(response), &self.config.dump));
        }

        if let Some(error) = &entry.error {
            out.push_str(&format!(
                "<div class=\"esbar-error\">{}</div>",
                escape(&error.to_string())
            ));
        }

        out.push_str("</td></tr>");
    }
}

/// Request bodies are shown in full; an absent body renders nothing
fn request_html(payload: &Payload) -> String {
    match payload {
        Payload::Document(Value::Null) => String::new(),
        Payload::Raw(text) => raw_html(text, usize::MAX),
        structured => {
            let value = structured.to_value();
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            format!("<pre class=\"esbar-json\">{}</pre>", highlight(&text))
        }
    }
}

fn response_html(payload: &Payload, options: &DumpOptions) -> String {
    match payload {
        Payload::Raw(text) => raw_html(text, options.truncate),
        structured => dump::to_html(&structured.to_value(), options),
    }
}

/// Undecodable text, escaped but not highlighted
fn raw_html(text: &str, max_chars: usize) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!(
        "<pre class=\"esbar-raw\">{}</pre>",
        escape(&truncate(text, max_chars))
    )
}

impl BarPanel for Panel {
    fn id(&self) -> &str {
        "esbar"
    }

    fn tab(&self) -> String {
        self.render_tab()
    }

    fn panel(&self) -> Option<String> {
        self.render_panel()
    }
}
