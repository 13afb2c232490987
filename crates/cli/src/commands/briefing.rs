//! `medbrief briefing` — Generate a doctor briefing for a patient.

use medbrief_retrieval::{BriefingGenerator, BriefingMode};

pub async fn run(patient: &str, mode: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (_config, store, backend) = super::setup()?;

    let generator = BriefingGenerator::new(store, backend);
    let mode = BriefingMode::parse(mode);

    eprintln!("  Generating {mode:?} briefing for {patient}...");
    let briefing = generator.doctor_briefing(patient, mode).await;

    println!("{}", "=".repeat(60));
    println!("MEDICAL BRIEFING: {}", patient.to_uppercase());
    println!("{}", "=".repeat(60));
    println!("{briefing}");

    Ok(())
}
