use std::fmt::Write;

use crate::agent::AgentMeta;
use crate::collection::ParameterSet;
use crate::handler::HandlerRegistry;

/// Render the XML self-description document.
///
/// The byte-level shape matters: cluster managers parse this output
/// against the fixed `ra-api-1` DTD, so the declaration, DOCTYPE,
/// two-space indentation and trailing newline are all part of the
/// contract. Reads the registries strictly read-only.
#[must_use]
pub fn render(meta: &AgentMeta, params: &ParameterSet, handlers: &HandlerRegistry) -> String {
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE resource-agent SYSTEM \"ra-api-1.dtd\">\n");
    let _ = writeln!(
        out,
        "<resource-agent name=\"{}\" version=\"{}\">",
        escape(meta.name()),
        escape(meta.version())
    );
    out.push_str("  <version>1.0</version>\n");
    let _ = writeln!(
        out,
        "  <longdesc lang=\"en\">{}</longdesc>",
        escape(meta.longdesc())
    );
    let _ = writeln!(
        out,
        "  <shortdesc lang=\"en\">{}</shortdesc>",
        escape(meta.shortdesc())
    );

    if params.is_empty() {
        out.push_str("  <parameters/>\n");
    } else {
        out.push_str("  <parameters>\n");
        for decl in params {
            let _ = writeln!(
                out,
                "    <parameter name=\"{}\" unique=\"{}\" required=\"{}\">",
                escape(decl.name()),
                flag(decl.unique()),
                flag(decl.required())
            );
            let _ = writeln!(
                out,
                "      <longdesc lang=\"en\">{}</longdesc>",
                escape(decl.longdesc())
            );
            let _ = writeln!(
                out,
                "      <shortdesc lang=\"en\">{}</shortdesc>",
                escape(decl.shortdesc())
            );
            match decl.default() {
                Some(default) => {
                    let _ = writeln!(
                        out,
                        "      <content type=\"{}\" default=\"{}\"/>",
                        decl.kind(),
                        escape(&default.to_string())
                    );
                }
                None => {
                    let _ = writeln!(out, "      <content type=\"{}\"/>", decl.kind());
                }
            }
            out.push_str("    </parameter>\n");
        }
        out.push_str("  </parameters>\n");
    }

    out.push_str("  <actions>\n");
    for handler in handlers.iter() {
        let _ = write!(out, "    <action name=\"{}\"", handler.action());
        for (name, value) in handler.defaults() {
            let _ = write!(out, " {}=\"{}\"", escape(name), escape(&value.to_string()));
        }
        out.push_str("/>\n");
    }
    out.push_str("  </actions>\n");
    out.push_str("</resource-agent>\n");

    out
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Escape text for use in XML content and attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
