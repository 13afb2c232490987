//! `medbrief summarize` — Summarize a consultation transcript and ingest it.

use std::io::Read;

use medbrief_retrieval::ConsultationSummarizer;

pub async fn run(
    patient: &str,
    file: &str,
    no_ingest: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_config, store, backend) = super::setup()?;

    let transcript = if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)
            .map_err(|e| format!("Failed to read transcript file {file}: {e}"))?
    };

    let summarizer = ConsultationSummarizer::new(store, backend);

    if no_ingest {
        eprintln!("  Summarizing transcript...");
        let summary = summarizer.summarize_transcript(&transcript).await?;
        println!("{summary}");
        return Ok(());
    }

    eprintln!("  Summarizing transcript for {patient}...");
    let outcome = summarizer.process_transcript(patient, &transcript).await?;

    println!("{}", outcome.summary);
    println!();
    if outcome.ingested {
        println!("  Summary written to the index.");
    } else {
        eprintln!("  WARNING: summary could not be written to the index.");
    }

    Ok(())
}
