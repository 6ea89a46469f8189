//! Adapter: a third-party XML provider made to look like a JSON report source.

use serde_json::{json, Value};
use thiserror::Error;

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Error, Debug, PartialEq)]
pub enum AdapterError {
    #[error("expected NAME:ID, got '{0}'")]
    MalformedInput(String),
    #[error("missing <{0}> element in provider xml")]
    MissingTag(&'static str),
}

/// Target interface the client understands.
pub trait Report {
    fn json_data(&self, raw: &str) -> Result<String, AdapterError>;
}

/// Adaptee. Only speaks XML.
#[derive(Debug, Default)]
pub struct XmlDataProvider;

impl XmlDataProvider {
    pub fn xml_data(&self, raw: &str) -> Result<String, AdapterError> {
        let (name, id) = raw
            .split_once(':')
            .ok_or_else(|| AdapterError::MalformedInput(raw.to_string()))?;
        Ok(format!("<user><name>{name}</name><id>{id}</id></user>"))
    }
}

pub struct XmlDataProviderAdapter {
    provider: XmlDataProvider,
}

impl XmlDataProviderAdapter {
    pub fn new(provider: XmlDataProvider) -> Self {
        Self { provider }
    }
}

fn element<'a>(xml: &'a str, tag: &'static str) -> Result<&'a str, AdapterError> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open).ok_or(AdapterError::MissingTag(tag))? + open.len();
    let end = xml[start..]
        .find(&close)
        .ok_or(AdapterError::MissingTag(tag))?;
    Ok(&xml[start..start + end])
}

impl Report for XmlDataProviderAdapter {
    fn json_data(&self, raw: &str) -> Result<String, AdapterError> {
        let xml = self.provider.xml_data(raw)?;
        let name = element(&xml, "name")?;
        let id = element(&xml, "id")?;

        let id: Value = match id.trim().parse::<i64>() {
            Ok(n) => json!(n),
            Err(_) => json!(id),
        };
        Ok(json!({ "name": name, "id": id }).to_string())
    }
}

/// Client that only knows about `Report`.
pub struct ReportClient {
    report: Box<dyn Report>,
}

impl ReportClient {
    pub fn new(report: Box<dyn Report>) -> Self {
        Self { report }
    }

    pub fn set_report(&mut self, report: Box<dyn Report>) {
        self.report = report;
    }

    pub fn get_report(&self, raw: &str) -> Result<String, AdapterError> {
        self.report.json_data(raw)
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Adapter: XML provider behind a JSON report");

    let provider = XmlDataProvider;
    t.line(format!("provider xml: {}", provider.xml_data("ALICE:23")?));

    let client = ReportClient::new(Box::new(XmlDataProviderAdapter::new(provider)));
    t.line(format!("client json:  {}", client.get_report("ALICE:23")?));

    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_wraps_fields_in_xml() {
        let xml = XmlDataProvider.xml_data("ALICE:23").unwrap();
        assert_eq!(xml, "<user><name>ALICE</name><id>23</id></user>");
    }

    #[test]
    fn test_adapter_produces_json_with_numeric_id() {
        let adapter = XmlDataProviderAdapter::new(XmlDataProvider);
        let json: Value = serde_json::from_str(&adapter.json_data("ALICE:23").unwrap()).unwrap();
        assert_eq!(json["name"], "ALICE");
        assert_eq!(json["id"], 23);
    }

    #[test]
    fn test_non_numeric_id_stays_a_string() {
        let adapter = XmlDataProviderAdapter::new(XmlDataProvider);
        let json: Value = serde_json::from_str(&adapter.json_data("BOB:x7").unwrap()).unwrap();
        assert_eq!(json["id"], "x7");
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let client = ReportClient::new(Box::new(XmlDataProviderAdapter::new(XmlDataProvider)));
        assert_eq!(
            client.get_report("no-separator"),
            Err(AdapterError::MalformedInput("no-separator".into()))
        );
    }

    #[test]
    fn test_element_reports_missing_tag() {
        assert_eq!(
            element("<user><name>A</name></user>", "id"),
            Err(AdapterError::MissingTag("id"))
        );
    }
}
