//! `murmur post`: append a message to the feed under the resolved identity.

use murmur_core::feed::FeedEntry;

use crate::{identity_failure, CommandOutput, MurmurBackend};

pub fn run_post_for_test(args: &[&str], backend: &dyn MurmurBackend) -> CommandOutput {
    match execute_post(args, backend) {
        Ok(output) => output,
        Err((exit_code, message)) => CommandOutput::fail(exit_code, &message),
    }
}

#[derive(Debug, Default)]
struct PostArgs {
    explicit: Option<String>,
    json: bool,
    words: Vec<String>,
}

fn execute_post(args: &[&str], backend: &dyn MurmurBackend) -> Result<CommandOutput, (i32, String)> {
    let parsed = match parse_post_args(args)? {
        Some(p) => p,
        None => return Ok(CommandOutput::ok(format!("{HELP_TEXT}\n"))),
    };

    let body = parsed.words.join(" ");
    if body.trim().is_empty() {
        return Err((2, "post needs a message".to_string()));
    }

    // Refuse to post rather than post under a blank name.
    let report = match backend.identity(parsed.explicit.as_deref()) {
        Ok(r) => r,
        Err(err) => return Ok(identity_failure(&err)),
    };

    let entry = FeedEntry {
        time: backend.now_utc(),
        from: report.identity.to_string(),
        body,
    };
    backend
        .append_post(&report.identity.scope, &entry)
        .map_err(|e| (1, format!("post: {e}")))?;

    tracing::info!(from = %entry.from, scope = %report.identity.scope, "posted");

    if parsed.json {
        let text = serde_json::to_string_pretty(&entry)
            .map_err(|e| (1, format!("encode post: {e}")))?;
        return Ok(CommandOutput::ok(format!("{text}\n")));
    }
    Ok(CommandOutput::ok(format!("{}\n", entry.from)))
}

/// `Ok(None)` means help was requested.
fn parse_post_args(args: &[&str]) -> Result<Option<PostArgs>, (i32, String)> {
    let mut parsed = PostArgs::default();
    let mut iter = args.iter();
    let mut literal = false;
    while let Some(arg) = iter.next() {
        if literal {
            parsed.words.push((*arg).to_string());
            continue;
        }
        match *arg {
            "--" => literal = true,
            "-h" | "--help" => return Ok(None),
            "--json" => parsed.json = true,
            "--as" => {
                let value = iter
                    .next()
                    .ok_or_else(|| (2, "flag needs an argument: --as".to_string()))?;
                parsed.explicit = Some((*value).to_string());
            }
            v if v.starts_with("--as=") => {
                parsed.explicit = Some(v.trim_start_matches("--as=").to_string());
            }
            v if v.starts_with('-') && v.len() > 1 => {
                return Err((2, format!("unknown flag: {v}")));
            }
            v => parsed.words.push(v.to_string()),
        }
    }
    Ok(Some(parsed))
}

const HELP_TEXT: &str = "\
Post a message to the feed

Usage:
  murmur post [flags] <message...>

Flags:
      --as NAME   post as NAME instead of the generated identity
  -h, --help      help for post
      --json      Output the stored post as JSON";
