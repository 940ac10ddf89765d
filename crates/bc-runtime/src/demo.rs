//! Scripted walkthrough and one-shot calls.

use crate::wallet::Wallet;
use anyhow::Result;
use serde_json::Value;
use shared_types::{BridgeResult, StoreRequest};
use std::fmt::Debug;

/// Tab id used for the page under test.
pub const PAGE_TAB: u32 = 1;

/// Tab id of the second, never-connected page.
pub const OTHER_TAB: u32 = 2;

/// Connect, list accounts, ask for a signature, show that a second origin
/// is refused, then exercise the storage calls, which need no grant.
///
/// Expects the approver to approve the connect and deny the signature.
pub async fn run_demo(wallet: &mut Wallet, origin: &str, other_origin: &str) -> Result<()> {
    let page = wallet.open_tab(PAGE_TAB, origin)?;
    let other = wallet.open_tab(OTHER_TAB, other_origin)?;

    report("getAccounts before connect", page.get_accounts().await);
    report("connect", page.connect().await);
    report("getAccounts", page.get_accounts().await);
    report("signMessage(\"hello\")", page.sign_message("hello").await);
    report("getAccounts from second origin", other.get_accounts().await);

    report("ipfs_getCurrentNode", page.get_current_node().await);
    let upload = StoreRequest {
        name: Some("hello.txt".into()),
        mime_type: Some("text/plain".into()),
        ..StoreRequest::new("hello from the page")
    };
    let stored = page.store(upload).await;
    report("ipfs_add", stored.clone());
    if let Ok(stored) = stored {
        report("ipfs_get", page.retrieve(&stored.cid).await);
    }

    let connected = wallet.host().registry().list();
    println!("connected sites: {connected:?}");
    Ok(())
}

/// Issue one page call, connecting first when asked.
pub async fn run_call(
    wallet: &mut Wallet,
    origin: &str,
    method: &str,
    params: Value,
    connect: bool,
) -> Result<BridgeResult<Value>> {
    let page = wallet.open_tab(PAGE_TAB, origin)?;
    if connect {
        report("connect", page.connect().await);
    }
    Ok(page.request(method, params).await)
}

/// Print one call's outcome.
pub fn report<T: Debug>(label: &str, result: BridgeResult<T>) {
    match result {
        Ok(value) => println!("✓ {label}: {value:?}"),
        Err(e) => println!("✗ {label}: {e} [{}]", e.code()),
    }
}
