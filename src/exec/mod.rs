// External command execution primitive

use crate::error::Error;
use tokio::process::Command;

/// Captured output of a finished external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run an external command to completion and capture its output.
///
/// A spawn failure or a nonzero exit status is an `Error::Execution`
/// carrying the command text and whatever detail the OS or the command's
/// stderr provided. Output is decoded lossily; process tables routinely
/// contain non-UTF-8 argument bytes.
pub async fn run(program: &str, args: &[&str]) -> Result<CommandOutput, Error> {
    let rendered = render(program, args);
    log::trace!("Running external command: {rendered}");

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| Error::execution(&rendered, e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let detail = if stderr.trim().is_empty() {
            format!("exit status {}", output.status)
        } else {
            format!("exit status {}: {}", output.status, stderr.trim())
        };
        return Err(Error::execution(&rendered, detail));
    }

    Ok(CommandOutput { stdout, stderr })
}

fn render(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
