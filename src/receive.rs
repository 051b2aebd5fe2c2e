//! Push notification parsing and deploy-target selection.
//!
//! The push machinery writes one record per updated ref to the hook's
//! standard input: `<old-revision> <new-revision> <ref-name>`. Anything
//! that does not fit that shape is a protocol violation and aborts the
//! deploy cycle.

use std::io::BufRead;

use thiserror::Error;

use crate::types::{RefUpdate, Sha};

/// Errors reading push notifications.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// A record with fewer than the three required fields. The calling
    /// machinery never produces this, so it is not recoverable.
    #[error("expected 3 fields, received {count} from input '{line}'")]
    MalformedRecord { count: usize, line: String },

    /// The input stream could not be read.
    #[error("could not read push notification: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses one ref-update line.
///
/// Fields are whitespace-delimited with any amount of whitespace between
/// them; fields past the third are ignored.
pub fn parse_ref_update(line: &str) -> Result<RefUpdate, ReceiveError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(ReceiveError::MalformedRecord {
            count: fields.len(),
            line: line.to_string(),
        });
    }
    Ok(RefUpdate {
        old: Sha::from(fields[0]),
        new: Sha::from(fields[1]),
        ref_name: fields[2].to_string(),
    })
}

/// Drains ref-update records from `input` and returns the revision to
/// deploy.
///
/// Records whose ref is not `deploy_ref` are logged and skipped. When
/// several records update the deploy ref in one stream, the last one wins.
/// Returns an empty revision if no record matched; provisioning then
/// proceeds with the empty identifier and fails in the git call.
pub fn select_deploy_target(input: impl BufRead, deploy_ref: &str) -> Result<Sha, ReceiveError> {
    let mut target = Sha::default();

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let update = parse_ref_update(&line)?;
        tracing::info!(
            old = %update.old.short(),
            new = %update.new.short(),
            ref_name = %update.ref_name,
            "payload received"
        );
        if update.ref_name == deploy_ref {
            target = update.new;
        } else {
            tracing::debug!(ref_name = %update.ref_name, "not the deploy branch, skipping");
        }
    }

    Ok(target)
}
