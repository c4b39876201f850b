//! `murmur read`: show recent posts in the current scope.

use crate::{CommandOutput, MurmurBackend};

const DEFAULT_LIMIT: usize = 20;

pub fn run_read_for_test(args: &[&str], backend: &dyn MurmurBackend) -> CommandOutput {
    let mut limit = DEFAULT_LIMIT;
    let mut json = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "-h" | "--help" => return CommandOutput::ok(format!("{HELP_TEXT}\n")),
            "--json" => json = true,
            "-n" | "--limit" => {
                let Some(value) = iter.next() else {
                    return CommandOutput::fail(2, &format!("flag needs an argument: {arg}"));
                };
                limit = match value.parse::<usize>() {
                    Ok(n) => n,
                    Err(_) => {
                        return CommandOutput::fail(2, &format!("invalid limit: {value}"));
                    }
                };
            }
            v => return CommandOutput::fail(2, &format!("unknown argument: {v}")),
        }
    }

    let scope = backend.current_scope();
    let posts = match backend.read_posts(&scope, limit) {
        Ok(p) => p,
        Err(e) => return CommandOutput::fail(1, &format!("read: {e}")),
    };

    if json {
        return match serde_json::to_string_pretty(&posts) {
            Ok(text) => CommandOutput::ok(format!("{text}\n")),
            Err(e) => CommandOutput::fail(1, &format!("encode posts: {e}")),
        };
    }

    let mut out = String::new();
    for post in &posts {
        out.push_str(&format!(
            "{} {}: {}\n",
            post.time.format("%Y-%m-%d %H:%M"),
            post.from,
            post.body
        ));
    }
    CommandOutput::ok(out)
}

const HELP_TEXT: &str = "\
Show recent posts

Usage:
  murmur read [flags]

Flags:
  -h, --help        help for read
      --json        Output as JSON
  -n, --limit N     number of posts (default 20)";
