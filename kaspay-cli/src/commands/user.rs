//! User commands

use anyhow::Result;

use crate::{ui, ConnectionArgs};

pub async fn link(
    conn: &ConnectionArgs,
    merchant: &str,
    approve_url: &str,
    reject_url: &str,
) -> Result<()> {
    let client = super::client(conn)?;
    let attempt = client
        .user()
        .link(merchant, approve_url, reject_url)
        .await?;

    ui::header("Link Attempt");
    ui::key_value("ID", &attempt.id);
    ui::key_value("Confirmation URL", &attempt.confirmation_url);
    println!();
    ui::info("Redirect the user to the confirmation URL to approve the link");
    Ok(())
}

pub async fn unlink(conn: &ConnectionArgs, uaccount: &str, merchant: &str) -> Result<()> {
    let client = super::client(conn)?;
    let unlinked = client.user().unlink(uaccount, merchant).await?;

    ui::success(&format!("Unlinked {}", unlinked.uaccount));
    if !unlinked.message.is_empty() {
        ui::info(&unlinked.message);
    }
    Ok(())
}
