//! CLI commands

use ctas_core::{AccountId, Amount, RequestId, RequestStatus, Timestamp};
use ctas_events::{verify_chain, EventReader};
use ctas_projection::{RequestStats, RequestView};
use std::path::Path;

use crate::context::AppContext;

/// Deploy the system with its owner and initial treasury funding
pub fn deploy(
    ctx: &mut AppContext,
    owner: AccountId,
    initial_funding: Amount,
) -> Result<(), anyhow::Error> {
    let records = ctx.deploy(owner.clone(), initial_funding)?;

    println!(
        "✅ Deployed with owner {} and {} in the treasury (seq: {})",
        owner,
        initial_funding,
        records.last().map_or(0, |r| r.sequence)
    );
    Ok(())
}

/// Credit the treasury
pub fn deposit(ctx: &mut AppContext, from: &AccountId, amount: Amount) -> Result<Amount, anyhow::Error> {
    let (balance, _) = ctx.execute(|system| system.deposit(from, amount))?;

    println!("✅ Deposited {} from {} (balance: {})", amount, from, balance);
    Ok(balance)
}

pub fn add_ip(ctx: &mut AppContext, caller: &AccountId, account: AccountId) -> Result<(), anyhow::Error> {
    let (added, _) = ctx.execute(|system| system.add_ip(caller, account.clone()))?;

    if added {
        println!("✅ Whitelisted IP {}", account);
    } else {
        println!("ℹ️  {} is already whitelisted", account);
    }
    Ok(())
}

pub fn add_fund_manager(
    ctx: &mut AppContext,
    caller: &AccountId,
    account: AccountId,
) -> Result<(), anyhow::Error> {
    let (added, _) = ctx.execute(|system| system.add_fund_manager(caller, account.clone()))?;

    if added {
        println!("✅ Added fund manager {}", account);
    } else {
        println!("ℹ️  {} is already a fund manager", account);
    }
    Ok(())
}

pub fn remove_ip(ctx: &mut AppContext, caller: &AccountId, account: &AccountId) -> Result<(), anyhow::Error> {
    let (removed, _) = ctx.execute(|system| system.remove_ip(caller, account))?;

    if removed {
        println!("✅ Removed IP {}", account);
    } else {
        println!("ℹ️  {} was not whitelisted", account);
    }
    Ok(())
}

pub fn remove_fund_manager(
    ctx: &mut AppContext,
    caller: &AccountId,
    account: &AccountId,
) -> Result<(), anyhow::Error> {
    let (removed, _) = ctx.execute(|system| system.remove_fund_manager(caller, account))?;

    if removed {
        println!("✅ Removed fund manager {}", account);
    } else {
        println!("ℹ️  {} was not a fund manager", account);
    }
    Ok(())
}

/// File a fund request as a whitelisted IP. Prints and returns the new id.
pub fn request_fund(
    ctx: &mut AppContext,
    caller: &AccountId,
    amount: Amount,
    description: &str,
    deadline: Timestamp,
) -> Result<RequestId, anyhow::Error> {
    let (id, records) =
        ctx.execute(|system| system.request_fund(caller, amount, description, deadline))?;

    println!(
        "✅ Request {} filed by {} for {} (seq: {})",
        id,
        caller,
        amount,
        records.last().map_or(0, |r| r.sequence)
    );
    Ok(id)
}

pub fn approve(ctx: &mut AppContext, caller: &AccountId, id: RequestId) -> Result<(), anyhow::Error> {
    ctx.execute(|system| system.approve_request(caller, id))?;

    println!("✅ Request {} approved by {}", id, caller);
    Ok(())
}

pub fn reject(ctx: &mut AppContext, caller: &AccountId, id: RequestId) -> Result<(), anyhow::Error> {
    ctx.execute(|system| system.reject_request(caller, id))?;

    println!("✅ Request {} rejected by {}", id, caller);
    Ok(())
}

/// Pay an approved request out of the treasury
pub fn release(ctx: &mut AppContext, caller: &AccountId, id: RequestId) -> Result<(), anyhow::Error> {
    let (payout, _) = ctx.execute(|system| system.release_fund(caller, id))?;

    println!(
        "✅ Released {} to {} for request {} (treasury: {})",
        payout.amount, payout.destination, id, payout.remaining
    );
    Ok(())
}

/// Print the numeric status code (1=Pending, 2=Approved, 3=Rejected, 4=Released)
pub fn status(ctx: &AppContext, id: RequestId) -> Result<u8, anyhow::Error> {
    let code = ctx.system()?.check_request_status(id)?;

    println!("{}", code);
    Ok(code)
}

/// Print a request as JSON, read from the projection
pub fn show(ctx: &AppContext, id: RequestId) -> Result<RequestView, anyhow::Error> {
    let request = ctx.projection()?.get(id)?;

    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(request)
}

/// List requests from the projection, optionally filtered by status
pub fn list(ctx: &AppContext, status: Option<RequestStatus>) -> Result<Vec<RequestView>, anyhow::Error> {
    let projection = ctx.projection()?;
    let rows = match status {
        Some(status) => projection.list_by_status(status)?,
        None => projection.list_all()?,
    };

    if rows.is_empty() {
        println!("No requests");
        return Ok(rows);
    }

    println!(
        "{:>6}  {:<10}  {:>24}  {:<42}  {}",
        "ID", "STATUS", "AMOUNT", "REQUESTER", "DESCRIPTION"
    );
    for request in &rows {
        println!(
            "{:>6}  {:<10}  {:>24}  {:<42}  {}",
            request.id, request.status, request.amount, request.requester, request.description
        );
    }
    Ok(rows)
}

pub fn balance(ctx: &AppContext) -> Result<Amount, anyhow::Error> {
    let system = ctx.system()?;
    let balance = system.balance();
    let paid_out = system.treasury().total_paid_out()?;

    println!("Treasury balance: {} (paid out: {})", balance, paid_out);
    Ok(balance)
}

/// Request counts per status, read from the projection
pub fn stats(ctx: &AppContext) -> Result<RequestStats, anyhow::Error> {
    let stats = ctx.projection()?.stats()?;

    println!("Requests: {}", stats.total());
    println!("  pending:  {}", stats.pending);
    println!("  approved: {}", stats.approved);
    println!("  rejected: {}", stats.rejected);
    println!("  released: {}", stats.released);
    Ok(stats)
}

/// Verify the journal hash chain. Returns the number of verified records.
pub fn audit(journal_path: &Path) -> Result<usize, anyhow::Error> {
    let reader = EventReader::from_directory(journal_path)?;
    let records = reader.read_all()?;

    match verify_chain(&records) {
        Ok(()) => {
            println!("✅ Hash chain verified ({} records)", records.len());
            Ok(records.len())
        }
        Err(e) => {
            println!("❌ Hash chain broken: {}", e);
            Err(e.into())
        }
    }
}
