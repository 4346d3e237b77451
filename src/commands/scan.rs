//! Implementation of the `guardrails scan` command.

use crate::cli::ScanArgs;
use guardrails::Guard;
use guardrails::config::Config;
use guardrails::diff::split_unified_diff;
use guardrails::error::{GuardError, Result};
use guardrails::exit_codes;
use guardrails::guard::{Review, ReviewRequest};
use std::fs;

/// Run a full review and print it as JSON on stdout.
pub fn cmd_scan(mut config: Config, args: ScanArgs) -> Result<i32> {
    if let Some(path) = &args.audit {
        config.audit_log_path = Some(path.clone());
    }

    let input = fs::read_to_string(&args.input).map_err(|e| {
        GuardError::UserError(format!(
            "failed to read input '{}': {}",
            args.input.display(),
            e
        ))
    })?;
    let request = build_request(&input, &args)?;

    let guard = Guard::from_config(&config)?;
    let review = guard.review(&request, None);

    let json = serde_json::to_string_pretty(&review)
        .map_err(|e| GuardError::Serialization(e.to_string()))?;
    println!("{}", json);

    for error in &review.audit_errors {
        eprintln!("Warning: {}", error);
    }

    Ok(exit_code_for(&review))
}

/// Build a review request from a JSON request or raw `git diff` output.
///
/// Flags override the corresponding request fields; `--copilot` paths are
/// added to the request's set.
fn build_request(input: &str, args: &ScanArgs) -> Result<ReviewRequest> {
    let mut request = if input.trim_start().starts_with('{') {
        serde_json::from_str::<ReviewRequest>(input)
            .map_err(|e| GuardError::UserError(format!("invalid review request: {}", e)))?
    } else {
        ReviewRequest {
            files: split_unified_diff(input),
            ..ReviewRequest::default()
        }
    };

    if let Some(repo) = &args.repo {
        request.repo_name = repo.clone();
    }
    if let Some(pr) = args.pr {
        request.pr_number = pr;
    }
    if let Some(commit) = &args.commit {
        request.commit_hash = commit.clone();
    }
    request
        .copilot_generated_files
        .extend(args.copilot.iter().cloned());

    if request.repo_name.trim().is_empty() {
        return Err(GuardError::UserError(
            "repository name is required (pass --repo or set repo_name)".to_string(),
        ));
    }

    Ok(request)
}

/// A blocked merge outranks a failed audit write.
fn exit_code_for(review: &Review) -> i32 {
    if review.decision.should_block {
        exit_codes::BLOCKED
    } else if review.audit_failed() {
        exit_codes::AUDIT_FAILURE
    } else {
        exit_codes::SUCCESS
    }
}
