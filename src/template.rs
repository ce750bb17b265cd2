//! Branded HTML template for alert emails.
//!
//! The template is static and has four named slots: `process_name`,
//! `hostname`, `timestamp` and `body`. It is rendered with minijinja with
//! auto-escaping turned off: alert text is inserted exactly as the supervisor
//! produced it.
//!
//! # Example
//!
//! ```
//! use halizard_alert::template::{AlertSlots, AlertTemplate};
//!
//! let template = AlertTemplate::new().unwrap();
//! let html = template
//!     .render(&AlertSlots {
//!         process_name: "iscsi-heartbeat",
//!         hostname: "xen-01",
//!         timestamp: "2024-01-01T00:00:00Z",
//!         body: "Node A lost quorum",
//!     })
//!     .unwrap();
//! assert!(html.contains("Process: iscsi-heartbeat <br />"));
//! ```

use minijinja::{AutoEscape, Environment, UndefinedBehavior, context};

use crate::error::ComposeError;

/// Name under which the alert template is registered.
pub const ALERT_TEMPLATE_NAME: &str = "alert_email";

/// Line break inserted in place of every `\n` of the alert body.
pub const HTML_LINE_BREAK: &str = "<br />";

/// Fixed HA-Lizard alert layout.
pub const ALERT_HTML_TEMPLATE: &str = r##"<table height="100" cellspacing="1" cellpadding="1" border="1" width="600" style="">
    <tbody>
        <tr>
            <td width="160"><img height="111" width="150" src="http://www.halizard.com/images/ha_lizard_alert_logo.png" alt="" /></td>
            <td width="440"><span style="color: rgb(0, 102, 0);"><strong><span style="font-size: larger;"><span style="font-family: Arial;">HA-Lizard Alert Notification<br />
            <br />
            Process: {{ process_name }} <br />
            Host: {{ hostname }} <br />
            Time: {{ timestamp }} </span></span></strong></span></td>
        </tr>
        <tr>
            <td width="600" colspan="2">
            <p><br />
            <span style="font-family: Arial;"><span style="font-size: smaller;"> {{ body }} <br />
            <br />
            </span></span></p>
            </td>
        </tr>
        <tr>
            <td bgcolor="#cccccc" width="600" colspan="2">
            <p style="text-align: left;"><strong><span style="font-size: smaller;"><span style="font-family: Arial;">website</span></span></strong><span style="font-size: smaller;"><span style="font-family: Arial;">: www.halizard.com&nbsp;&nbsp;&nbsp;&nbsp; <strong>forum</strong>: http://www.halizard.com/forum</span></span>&nbsp;&nbsp;&nbsp; <strong><span style="font-size: smaller;"><span style="font-family: Arial;">Sponsored by</span></span></strong><span style="font-size: smaller;"><span style="font-family: Arial;"> </span></span><a href="http://www.pulsesupply.com"><span style="font-size: smaller;"><span style="font-family: Arial;">Pulse Supply</span></span></a></p>
            </td>
        </tr>
    </tbody>
</table>
<p>&nbsp;</p>
"##;

/// Values substituted into the template. `body` must already carry HTML line
/// breaks (see [`html_line_breaks`]).
#[derive(Debug, Clone, Copy)]
pub struct AlertSlots<'a> {
    pub process_name: &'a str,
    pub hostname: &'a str,
    pub timestamp: &'a str,
    pub body: &'a str,
}

/// Replace every `\n` with `<br />`; nothing else is touched.
pub fn html_line_breaks(body: &str) -> String {
    body.replace('\n', HTML_LINE_BREAK)
}

/// Pre-loaded minijinja environment holding the alert template.
pub struct AlertTemplate {
    env: Environment<'static>,
}

impl AlertTemplate {
    pub fn new() -> Result<Self, ComposeError> {
        let mut env = Environment::new();
        // A misspelled slot must fail rather than silently render as empty.
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.add_template(ALERT_TEMPLATE_NAME, ALERT_HTML_TEMPLATE)
            .map_err(|e| ComposeError::Template(e.to_string()))?;
        Ok(Self { env })
    }

    pub fn render(&self, slots: &AlertSlots<'_>) -> Result<String, ComposeError> {
        let tmpl = self
            .env
            .get_template(ALERT_TEMPLATE_NAME)
            .map_err(|e| ComposeError::Template(e.to_string()))?;

        tmpl.render(context! {
            process_name => slots.process_name,
            hostname => slots.hostname,
            timestamp => slots.timestamp,
            body => slots.body,
        })
        .map_err(|e| ComposeError::Template(e.to_string()))
    }
}
