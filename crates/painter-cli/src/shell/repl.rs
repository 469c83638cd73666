//! Line-oriented front end for [`Shell`].

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};

use super::{Action, ParseActionError, Shell};
use crate::TRACING_TARGET_SHELL;

const PROMPT: &str = "painter> ";
const KEY_PROMPT: &str = "Provide your OpenAI API key to continue (leave empty to skip): ";
const BANNER: &str = "Painting reader. Type 'help' for a list of commands.";

/// Runs the shell on standard input and output until `quit` or end of input.
pub async fn run_stdio(shell: &mut Shell, needs_key: bool) -> anyhow::Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();
    run_with(shell, input, output, needs_key).await
}

/// Runs the shell over arbitrary streams.
///
/// When `needs_key` is set the user is asked for an OpenAI key before the
/// first command.
pub async fn run_with<R, W>(
    shell: &mut Shell,
    input: R,
    mut output: W,
    needs_key: bool,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    write_line(&mut output, BANNER).await?;

    if needs_key {
        prompt_key(shell, &mut lines, &mut output).await?;
    }

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            write_line(&mut output, "").await?;
            break;
        };

        let action = match line.parse::<Action>() {
            Ok(Action::Key(None)) => {
                prompt_key(shell, &mut lines, &mut output).await?;
                continue;
            }
            Ok(action) => action,
            Err(ParseActionError::Empty) => continue,
            Err(error) => {
                write_line(&mut output, &format!("error: {error}")).await?;
                continue;
            }
        };

        let reply = shell.dispatch(action).await;
        write_line(&mut output, &reply.to_string()).await?;
        if reply.is_quit() {
            break;
        }
    }

    tracing::info!(
        target: TRACING_TARGET_SHELL,
        session_id = %shell.session().session_id(),
        cost = %shell.session().cost(),
        "Shell closed"
    );
    Ok(())
}

async fn prompt_key<R, W>(
    shell: &mut Shell,
    lines: &mut Lines<R>,
    output: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(KEY_PROMPT.as_bytes()).await?;
    output.flush().await?;

    let key = lines.next_line().await?.unwrap_or_default();
    if key.trim().is_empty() {
        write_line(
            output,
            "No key given. Extraction and recommendation stay disabled until you run 'key'.",
        )
        .await?;
        return Ok(());
    }

    let reply = shell.dispatch(Action::Key(Some(key))).await;
    write_line(output, &reply.to_string()).await
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> anyhow::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use painter_core::Session;
    use painter_core::mock::MockProvider;

    use super::*;
    use crate::shell::tests::MockFactory;

    fn shell(require_key: bool) -> Shell {
        let factory = MockFactory {
            provider: MockProvider::default(),
            require_key,
        };
        Shell::new(Session::default(), Arc::new(factory), 1)
    }

    async fn transcript(shell: &mut Shell, input: &str, needs_key: bool) -> String {
        let mut output = Vec::new();
        run_with(shell, input.as_bytes(), &mut output, needs_key)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_prompts_for_key_at_startup() {
        let mut shell = shell(true);
        let output = transcript(&mut shell, "sk-test\ncost\nquit\n", true).await;

        assert!(output.contains(KEY_PROMPT));
        assert!(output.contains("OpenAI API key set."));
        assert!(output.contains("Estimated cost: $0.0000 (0 call(s))"));
        assert!(output.contains("Bye."));
        assert!(shell.session().require_openai_api_key().is_ok());
    }

    #[tokio::test]
    async fn test_skipped_key_keeps_local_actions() {
        let mut shell = shell(true);
        let output = transcript(&mut shell, "\nshow\nkey\n\nquit\n", true).await;

        assert_eq!(output.matches(KEY_PROMPT).count(), 2);
        assert!(output.contains("No images uploaded."));
        assert!(shell.session().require_openai_api_key().is_err());
    }

    #[tokio::test]
    async fn test_reports_parse_errors_and_stops_at_eof() {
        let mut shell = shell(false);
        let output = transcript(&mut shell, "\n   \nfrobnicate\nextract\n", false).await;

        assert!(!output.contains(KEY_PROMPT));
        assert!(output.contains("error: unknown command 'frobnicate'"));
        assert!(output.contains("Nothing to extract."));
        assert!(output.ends_with(&format!("{PROMPT}\n")));
    }

    #[tokio::test]
    async fn test_quit_ignores_remaining_input() {
        let mut shell = shell(false);
        let output = transcript(&mut shell, "quit\nhelp\n", false).await;

        assert!(output.contains("Bye."));
        assert!(!output.contains("Commands:"));
    }
}
