//! Debugger-bar host contract and a minimal in-process bar

use crate::html::{escape, BAR_CSS};
use std::sync::Arc;

/// A panel shown on the debugger bar
pub trait BarPanel: Send + Sync {
    /// Stable identifier, used for element IDs
    fn id(&self) -> &str;

    /// Short label shown on the bar itself
    fn tab(&self) -> String;

    /// Detail view; `None` when there is nothing to show
    fn panel(&self) -> Option<String>;
}

/// Surface panels are registered on
pub trait DebugBar {
    fn add_panel(&mut self, panel: Arc<dyn BarPanel>);
}

/// Bar rendering its panels into a single HTML fragment
#[derive(Default)]
pub struct Bar {
    panels: Vec<Arc<dyn BarPanel>>,
}

impl Bar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Stylesheet followed by every panel in registration order
    pub fn render(&self) -> String {
        let mut out = String::from(BAR_CSS);
        out.push_str("<div class=\"esbar-bar\">");
        for panel in &self.panels {
            out.push_str(&format!(
                "<section class=\"esbar-panel\" id=\"esbar-{}\"><div class=\"esbar-tab-row\">{}</div>",
                escape(panel.id()),
                panel.tab()
            ));
            if let Some(body) = panel.panel() {
                out.push_str(&body);
            }
            out.push_str("</section>");
        }
        out.push_str("</div>");
        out
    }
}

impl DebugBar for Bar {
    fn add_panel(&mut self, panel: Arc<dyn BarPanel>) {
        tracing::debug!("Registered bar panel {}", panel.id());
        self.panels.push(panel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Static {
        id: &'static str,
        body: Option<&'static str>,
    }

    impl BarPanel for Static {
        fn id(&self) -> &str {
            self.id
        }

        fn tab(&self) -> String {
            format!("tab-{}", self.id)
        }

        fn panel(&self) -> Option<String> {
            self.body.map(String::from)
        }
    }

    #[test]
    fn test_render_in_order() {
        let mut bar = Bar::new();
        bar.add_panel(Arc::new(Static { id: "one", body: Some("<p>first</p>") }));
        bar.add_panel(Arc::new(Static { id: "two", body: None }));
        assert_eq!(bar.len(), 2);

        let html = bar.render();
        assert!(html.starts_with("<style>"));
        let first = html.find("tab-one").unwrap();
        let second = html.find("tab-two").unwrap();
        assert!(first < second);
        assert!(html.contains("<p>first</p>"));
        assert!(html.contains("id=\"esbar-two\""));
    }
}
