//! `medbrief condition` — Condition-focused summary for a patient.

use medbrief_retrieval::BriefingGenerator;

pub async fn run(patient: &str, condition: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (_config, store, backend) = super::setup()?;

    let generator = BriefingGenerator::new(store, backend);

    eprintln!("  Generating {condition} summary for {patient}...");
    let summary = generator.condition_summary(patient, condition).await;

    println!("{}", "=".repeat(60));
    println!("CONDITION SUMMARY: {}", condition.to_uppercase());
    println!("{}", "=".repeat(60));
    println!("{summary}");

    Ok(())
}
