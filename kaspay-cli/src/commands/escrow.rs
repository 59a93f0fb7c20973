//! Escrow commands

use anyhow::Result;

use crate::{ui, ConnectionArgs};

pub async fn hold(conn: &ConnectionArgs, trxid: &str) -> Result<()> {
    let client = super::client(conn)?;
    let spinner = ui::spinner(&format!("Holding {}...", trxid));
    let result = client.escrow().hold(trxid).await;
    spinner.finish_and_clear();

    report(result?.status, "held", trxid);
    Ok(())
}

pub async fn release(conn: &ConnectionArgs, trxid: &str) -> Result<()> {
    let client = super::client(conn)?;
    let spinner = ui::spinner(&format!("Releasing {}...", trxid));
    let result = client.escrow().release(trxid).await;
    spinner.finish_and_clear();

    report(result?.status, "released", trxid);
    Ok(())
}

pub async fn refund(conn: &ConnectionArgs, trxid: &str) -> Result<()> {
    let client = super::client(conn)?;
    let spinner = ui::spinner(&format!("Refunding {}...", trxid));
    let result = client.escrow().refund(trxid).await;
    spinner.finish_and_clear();

    report(result?.status, "refunded", trxid);
    Ok(())
}

pub async fn status(conn: &ConnectionArgs, trxid: &str) -> Result<()> {
    let client = super::client(conn)?;
    let spinner = ui::spinner(&format!("Checking escrow of {}...", trxid));
    let result = client.escrow().status(trxid).await;
    spinner.finish_and_clear();

    let status = result?;
    ui::header("Escrow Status");
    ui::key_value("Transaction", trxid);
    ui::key_value("State", &status.escrow_status.to_string());
    Ok(())
}

fn report(ok: bool, verb: &str, trxid: &str) {
    if ok {
        ui::success(&format!("Escrow {} for {}", verb, trxid));
    } else {
        ui::warning(&format!("Kaspay reported the escrow was not {}", verb));
    }
}
