// Process enumeration via the external ps primitive

use super::ProcessRecord;
use crate::error::Error;
use crate::exec;
use std::future::Future;

/// Source of process table snapshots.
///
/// The seam exists so the matcher and reaper can be exercised against
/// synthetic process lists in tests.
pub trait ProcessSource: Send + Sync {
    /// Enumerate all visible processes. An empty list is a valid result;
    /// a failure of the underlying primitive fails the whole call with no
    /// partial results.
    fn list(&self) -> impl Future<Output = Result<Vec<ProcessRecord>, Error>> + Send;
}

/// Production source backed by `ps ahxw -o "%u %p %c %a"`.
///
/// One row per process: owner, pid, short name, then the full argument
/// string, which may itself contain spaces and is rejoined from the tail.
#[derive(Debug, Clone, Copy, Default)]
pub struct PsSource;

const PS_ARGS: [&str; 3] = ["ahxw", "-o", "%u %p %c %a"];

impl ProcessSource for PsSource {
    async fn list(&self) -> Result<Vec<ProcessRecord>, Error> {
        let output = exec::run("ps", &PS_ARGS).await?;
        parse_ps_output(&output.stdout)
    }
}

fn parse_ps_output(stdout: &str) -> Result<Vec<ProcessRecord>, Error> {
    let mut records = Vec::new();

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        records.push(parse_ps_line(line)?);
    }

    Ok(records)
}

fn parse_ps_line(line: &str) -> Result<ProcessRecord, Error> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    if fields.len() < 4 {
        return Err(Error::execution(
            "ps",
            format!("unreadable process row: {line}"),
        ));
    }

    let pid: i32 = fields[1]
        .parse()
        .map_err(|_| Error::execution("ps", format!("unreadable pid in row: {line}")))?;

    Ok(ProcessRecord {
        owner: fields[0].to_string(),
        pid,
        name: fields[2].to_string(),
        command: fields[3..].join(" "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_row() {
        let record = parse_ps_line("root 1 systemd /sbin/init").unwrap();
        assert_eq!(record.owner, "root");
        assert_eq!(record.pid, 1);
        assert_eq!(record.name, "systemd");
        assert_eq!(record.command, "/sbin/init");
    }

    #[test]
    fn test_parse_command_with_spaces() {
        let record =
            parse_ps_line("alice 4242 python python app.py --port 8888").unwrap();
        assert_eq!(record.pid, 4242);
        assert_eq!(record.command, "python app.py --port 8888");
    }

    #[test]
    fn test_parse_output_skips_blank_lines() {
        let out = "root 1 systemd /sbin/init\n\n  alice 2 bash -bash\n";
        let records = parse_ps_output(out).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].command, "-bash");
    }

    #[test]
    fn test_parse_short_row_fails_whole_call() {
        let out = "root 1 systemd /sbin/init\ngarbage row\n";
        let result = parse_ps_output(out);
        assert!(matches!(result, Err(Error::Execution { .. })));
    }

    #[test]
    fn test_parse_non_numeric_pid_is_error() {
        assert!(parse_ps_line("root abc systemd /sbin/init").is_err());
    }
}
