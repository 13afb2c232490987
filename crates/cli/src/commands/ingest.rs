//! `medbrief ingest` — Write a record directly into the index.

use medbrief_core::error::ValidationError;
use medbrief_core::store::DocumentStore as _;

pub async fn run(
    patient: &str,
    text: &str,
    category: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyRecordText.into());
    }
    if patient.trim().is_empty() {
        return Err(ValidationError::EmptyPatientScope.into());
    }

    let (_config, store, _backend) = super::setup()?;

    store.write_record(patient, text, category).await?;
    println!("  Record written for patient {patient} (category: {category}).");

    Ok(())
}
