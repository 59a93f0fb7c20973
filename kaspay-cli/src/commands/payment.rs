//! Payment commands

use anyhow::{Context, Result};
use kaspay_lib::client::ApiResponse;

use crate::{ui, ConnectionArgs};

/// Parse an attempt given inline or as `@path`.
fn load_attempt(attempt: &str) -> Result<serde_json::Value> {
    let text = match attempt.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payment attempt from {}", path))?,
        None => attempt.to_string(),
    };
    serde_json::from_str(&text).context("Payment attempt is not valid JSON")
}

pub async fn create(conn: &ConnectionArgs, attempt: &str) -> Result<()> {
    let attempt = load_attempt(attempt)?;
    let client = super::client(conn)?;
    let spinner = ui::spinner("Creating payment attempt...");
    let result = client.payment().create(&attempt).await;
    spinner.finish_and_clear();

    show(result?)
}

pub async fn execute(conn: &ConnectionArgs, attempt_id: &str) -> Result<()> {
    let client = super::client(conn)?;
    let result = client.payment().execute(attempt_id).await;
    show(result?)
}

pub async fn refund(conn: &ConnectionArgs, attempt_id: &str) -> Result<()> {
    let client = super::client(conn)?;
    let result = client.payment().refund(attempt_id).await;
    show(result?)
}

pub async fn cancel(conn: &ConnectionArgs, attempt_id: &str) -> Result<()> {
    let client = super::client(conn)?;
    let result = client.payment().cancel(attempt_id).await;
    show(result?)
}

fn show(response: ApiResponse) -> Result<()> {
    ui::json(&response.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_attempt_inline_and_file() {
        let inline = load_attempt(r#"{"amount": 10}"#).unwrap();
        assert_eq!(inline["amount"], 10);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"amount": 25, "currency": "IDR"}}"#).unwrap();
        let from_file = load_attempt(&format!("@{}", file.path().display())).unwrap();
        assert_eq!(from_file["currency"], "IDR");

        assert!(load_attempt("not json").is_err());
        assert!(load_attempt("@/nonexistent/attempt.json").is_err());
    }
}
