//! `murmur whoami`: print the identity this session posts as.

use std::io::Write;

use tabwriter::TabWriter;

use crate::{identity_failure, CommandOutput, MurmurBackend};

#[derive(Debug, Default, PartialEq, Eq)]
struct WhoamiArgs {
    explicit: Option<String>,
    json: bool,
    explain: bool,
    help: bool,
}

pub fn run_whoami_for_test(args: &[&str], backend: &dyn MurmurBackend) -> CommandOutput {
    let parsed = match parse_whoami_args(args) {
        Ok(p) => p,
        Err(msg) => return CommandOutput::fail(2, &msg),
    };
    if parsed.help {
        return CommandOutput::ok(format!("{HELP_TEXT}\n"));
    }

    let report = match backend.identity(parsed.explicit.as_deref()) {
        Ok(r) => r,
        Err(err) => return identity_failure(&err),
    };

    if parsed.json {
        let mut payload = serde_json::Map::new();
        for (key, value) in report.fields() {
            payload.insert(key.to_string(), serde_json::Value::String(value));
        }
        return match serde_json::to_string_pretty(&serde_json::Value::Object(payload)) {
            Ok(text) => CommandOutput::ok(format!("{text}\n")),
            Err(e) => CommandOutput::fail(1, &format!("encode identity: {e}")),
        };
    }

    if parsed.explain {
        return match render_table(&report.fields()) {
            Ok(text) => CommandOutput::ok(text),
            Err(e) => CommandOutput::fail(1, &format!("render: {e}")),
        };
    }

    CommandOutput::ok(format!("{}\n", report.identity))
}

fn render_table(fields: &[(&'static str, String)]) -> std::io::Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    {
        let mut tw = TabWriter::new(&mut buf).padding(2);
        for (key, value) in fields {
            writeln!(tw, "{key}\t{value}")?;
        }
        tw.flush()?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn parse_whoami_args(args: &[&str]) -> Result<WhoamiArgs, String> {
    let mut parsed = WhoamiArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "-h" | "--help" | "help" => parsed.help = true,
            "--json" => parsed.json = true,
            "--explain" => parsed.explain = true,
            "--as" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "flag needs an argument: --as".to_string())?;
                parsed.explicit = Some((*value).to_string());
            }
            v if v.starts_with("--as=") => {
                parsed.explicit = Some(v.trim_start_matches("--as=").to_string());
            }
            v if v.starts_with('-') => return Err(format!("unknown flag: {v}")),
            v => return Err(format!("unexpected argument: {v}")),
        }
    }
    if parsed.json && parsed.explain {
        return Err("--json and --explain cannot be used together".to_string());
    }
    Ok(parsed)
}

const HELP_TEXT: &str = "\
Show the identity this session posts as

Usage:
  murmur whoami [flags]

Flags:
      --as NAME   use NAME instead of the generated identity (scope is always detected)
      --explain   show how the identity was resolved
  -h, --help      help for whoami
      --json      Output as JSON";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let parsed = parse_whoami_args(&["--as", "Ember", "--json"]).unwrap_or_default();
        assert_eq!(parsed.explicit.as_deref(), Some("Ember"));
        assert!(parsed.json);

        let parsed = parse_whoami_args(&["--as=bot@x"]).unwrap_or_default();
        assert_eq!(parsed.explicit.as_deref(), Some("bot@x"));
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(parse_whoami_args(&["--as"]).is_err());
        assert!(parse_whoami_args(&["--bogus"]).is_err());
        assert!(parse_whoami_args(&["extra"]).is_err());
        assert!(parse_whoami_args(&["--json", "--explain"]).is_err());
    }

    #[test]
    fn table_aligns_columns() {
        let text = render_table(&[("identity", "a@b".to_string()), ("seed", "s".to_string())])
            .unwrap_or_default();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("identity  a@b"), "{text:?}");
        assert!(lines[1].starts_with("seed      s"), "{text:?}");
    }
}
