use std::io::Write;

use crate::agent::Agent;
use crate::format;

const QUIT_SENTINEL: &str = "quit";

/// Outcome of feeding one input line through the loop.
#[derive(Debug)]
enum Step {
    /// Sentinel seen; stop without dispatching.
    Stop,
    /// Nothing to dispatch (blank line); prompt again. The reference
    /// client forwarded empty queries to the agent; re-prompting here
    /// avoids burning a round-trip on empty input.
    Idle,
    /// Formatted output to print.
    Reply(String),
}

/// Read-dispatch-print cycle. One query at a time: a new prompt is not
/// issued until the previous dispatch has completed and printed. Ends
/// on the quit sentinel or EOF.
///
/// # Errors
///
/// Returns an error only if reading stdin fails; a failed dispatch is
/// reported and the loop continues.
pub async fn run<A: Agent>(agent: &A) -> anyhow::Result<()> {
    loop {
        let Some(line) = read_line("\nQuery: ").await? else {
            break;
        };
        match step(agent, &line).await {
            Step::Stop => break,
            Step::Idle => {}
            Step::Reply(text) => println!("\nResponse:\n{text}"),
        }
    }
    Ok(())
}

async fn step<A: Agent>(agent: &A, line: &str) -> Step {
    let query = line.trim();
    if query.is_empty() {
        return Step::Idle;
    }
    if query.eq_ignore_ascii_case(QUIT_SENTINEL) {
        return Step::Stop;
    }
    match agent.respond(query).await {
        Ok(messages) => Step::Reply(format::render(&messages)),
        Err(e) => Step::Reply(format!("query failed: {e:#}")),
    }
}

/// Block on one line of stdin. Returns `None` on EOF.
async fn read_line(prompt: &str) -> anyhow::Result<Option<String>> {
    let prompt = prompt.to_owned();
    tokio::task::spawn_blocking(move || -> anyhow::Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        let mut line = String::new();
        let read = std::io::stdin().read_line(&mut line)?;
        Ok(if read == 0 { None } else { Some(line) })
    })
    .await?
}
