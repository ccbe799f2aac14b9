//! Result artifacts for scenario runs: result.json and a JUnit report.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AssertionResult {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportConfig {
    pub script: String,
    pub board: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestReport {
    pub status: String,
    pub stop_reason: String,
    pub ticks: u32,
    pub dropped: u32,
    pub cycles: u64,
    pub uart_len: usize,
    pub scenario_hash: String,
    pub config: ReportConfig,
    pub assertions: Vec<AssertionResult>,
}

pub fn write_result_json(path: &Path, report: &TestReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {path:?}"))
}

pub fn write_junit(path: &Path, report: &TestReport) -> anyhow::Result<()> {
    let failures = report.assertions.iter().filter(|a| !a.passed).count();
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<testsuite name=\"tickbed test\" tests=\"{}\" failures=\"{}\">\n",
        report.assertions.len(),
        failures
    ));
    for a in &report.assertions {
        if a.passed {
            xml.push_str(&format!("  <testcase name=\"{}\"/>\n", xml_escape(&a.name)));
        } else {
            let message = a.detail.as_deref().unwrap_or("assertion failed");
            xml.push_str(&format!(
                "  <testcase name=\"{}\">\n    <failure message=\"{}\"/>\n  </testcase>\n",
                xml_escape(&a.name),
                xml_escape(message)
            ));
        }
    }
    xml.push_str("</testsuite>\n");
    std::fs::write(path, xml).with_context(|| format!("Failed to write {path:?}"))
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report(passed: bool) -> TestReport {
        TestReport {
            status: if passed { "pass" } else { "fail" }.into(),
            stop_reason: "main_done".into(),
            ticks: 0,
            dropped: 0,
            cycles: 123,
            uart_len: 42,
            scenario_hash: "deadbeef".into(),
            config: ReportConfig {
                script: "s.yaml".into(),
                board: None,
            },
            assertions: vec![AssertionResult {
                name: "uart_contains \"a<b\"".into(),
                passed,
                detail: (!passed).then(|| "console output lacks it".to_string()),
            }],
        }
    }

    #[test]
    fn junit_escapes_names_and_marks_failures() {
        let dir = std::env::temp_dir().join("tickbed-report-test");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("junit.xml");

        write_junit(&path, &sample_report(false)).unwrap();
        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains("<testsuite name=\"tickbed test\" tests=\"1\" failures=\"1\">"));
        assert!(xml.contains("uart_contains &quot;a&lt;b&quot;"));
        assert!(xml.contains("<failure message="));

        write_junit(&path, &sample_report(true)).unwrap();
        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains("failures=\"0\""));
        assert!(!xml.contains("<failure"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
