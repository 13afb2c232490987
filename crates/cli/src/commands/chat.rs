//! `medbrief chat` — Interactive or single-question chat mode.

use std::io::{BufRead, Write};

use medbrief_session::ChatSession;

pub async fn run(
    question: Option<String>,
    patient: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, store, backend) = super::setup()?;

    let mut session = ChatSession::new(store, backend, config.chat, config.retrieval);

    if let Some(q) = question {
        eprint!("  Thinking...");
        let reply = session.chat(&q, patient.as_deref()).await;
        eprint!("\r             \r");
        println!("{reply}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  medbrief — Medical Records Assistant");
    println!();
    if let Some(p) = &patient {
        println!("  Patient focus: {p}");
    }
    println!("  Type your question and press Enter.");
    println!("  Prefix with 'patient:<id> ' to focus on one patient.");
    println!("  Type 'reset' to clear history, 'quit' to exit.");
    println!();

    let stdin = std::io::stdin();
    let mut default_patient = patient;

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.eq_ignore_ascii_case("reset") {
            session.reset();
            println!("  Conversation history cleared.");
            continue;
        }

        // Per-message patient override: "patient:moayad what are his vitals?"
        let (scope, message) = match input.strip_prefix("patient:") {
            Some(rest) => match rest.split_once(' ') {
                Some((id, msg)) => {
                    default_patient = Some(id.trim().to_string());
                    (default_patient.clone(), msg.trim().to_string())
                }
                None => {
                    default_patient = Some(rest.trim().to_string());
                    println!("  Patient focus set to: {}", rest.trim());
                    continue;
                }
            },
            None => (default_patient.clone(), input.to_string()),
        };

        eprint!("  ...");
        let reply = session.chat(&message, scope.as_deref()).await;
        eprint!("\r     \r");
        println!();
        for reply_line in reply.lines() {
            println!("  Assistant > {reply_line}");
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}
