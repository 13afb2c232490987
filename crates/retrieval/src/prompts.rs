//! Prompt templates for every generation call.
//!
//! Templates live here so the orchestration modules stay free of large
//! string literals and so tests can assert against the exact text sent to
//! the backend.

/// System message for chat turns. The assembled context block is embedded
/// directly into the instruction rather than sent as a separate message.
pub fn chat_system(context: &str) -> String {
    format!(
        "You are a medical assistant AI with access to patient medical records. Your role is to:

1. **Answer medical questions** based on the provided patient records
2. **Provide consultation summaries** when requested
3. **Suggest next steps** based on medical history
4. **Generate briefings for doctors** when needed

**IMPORTANT GUIDELINES:**
- Always base your responses on the provided medical records
- Be professional and use appropriate medical terminology
- If information is not available in the records, clearly state this
- Never provide emergency medical advice - always recommend seeing a healthcare provider for urgent concerns
- Maintain patient confidentiality and professionalism
- Structure your responses clearly with relevant medical context

**CONTEXT FROM MEDICAL RECORDS:**
{context}

Please respond to the user's question based on this medical information."
    )
}

/// System message for comprehensive and recent briefings.
pub const COMPREHENSIVE_SYSTEM: &str = "You are a medical documentation specialist creating professional briefings for healthcare providers.";

/// System message for recent-developments briefings.
pub const RECENT_SYSTEM: &str =
    "You are a medical assistant creating focused briefings for immediate patient care.";

/// System message for condition-focused briefings.
pub fn condition_system(condition: &str) -> String {
    format!("You are a medical specialist creating a focused briefing about {condition}.")
}

/// User prompt for a comprehensive doctor briefing.
pub fn comprehensive_briefing(context: &str, patient_id: &str) -> String {
    format!(
        "Based on the complete medical records provided, generate a comprehensive medical briefing for healthcare providers about patient {patient_id}.

**MEDICAL RECORDS:**
{context}

**BRIEFING REQUIREMENTS:**
Create a structured, professional medical briefing that includes:

1. **PATIENT OVERVIEW**
   - Patient ID and basic information
   - Key medical conditions and diagnoses

2. **MEDICAL HISTORY SUMMARY**
   - Chronological overview of significant medical events
   - Current active conditions and treatments

3. **CURRENT STATUS**
   - Recent visits and findings
   - Current medications and treatments
   - Active symptoms or concerns

4. **TREATMENT PLAN & RECOMMENDATIONS**
   - Ongoing treatment protocols
   - Scheduled follow-ups
   - Recommendations for future care

5. **CLINICAL NOTES**
   - Important observations
   - Patient compliance and response to treatment
   - Any special considerations

**FORMAT:** Professional medical briefing suitable for doctor-to-doctor communication.
**TONE:** Clinical, precise, and comprehensive.
**LENGTH:** Comprehensive but concise - focus on clinically relevant information."
    )
}

/// User prompt for a recent-developments briefing.
pub fn recent_briefing(context: &str, patient_id: &str) -> String {
    format!(
        "Based on the medical records provided, generate a recent developments briefing for patient {patient_id}.

**MEDICAL RECORDS:**
{context}

**FOCUS:** Recent medical developments, current status, and immediate care needs.

Create a concise briefing covering:
1. **RECENT VISITS** (last 3 months)
2. **CURRENT SYMPTOMS/CONDITIONS**
3. **ACTIVE TREATMENTS**
4. **IMMEDIATE FOLLOW-UP NEEDS**
5. **URGENT CONSIDERATIONS**

Keep it focused on actionable, current information for immediate patient care."
    )
}

/// User prompt for a condition-focused summary.
pub fn condition_briefing(context: &str, patient_id: &str, condition: &str) -> String {
    format!(
        "Based on the medical records provided, generate a focused briefing about {condition} for patient {patient_id}.

**MEDICAL RECORDS:**
{context}

**CONDITION FOCUS:** {condition}

Create a detailed summary covering:
1. **CONDITION OVERVIEW** - Current status of {condition}
2. **TREATMENT HISTORY** - Past and current treatments for this condition
3. **PATIENT RESPONSE** - How patient has responded to treatments
4. **CURRENT MANAGEMENT** - Active treatment protocols
5. **RECOMMENDATIONS** - Next steps and considerations

Focus specifically on information related to {condition} and its management."
    )
}

/// System message for transcript summarization. Output is a flat text block
/// with fixed field labels so the result can be indexed and re-retrieved as
/// a consultation record.
pub const SUMMARY_SYSTEM: &str = "## Context
Your a helpful assistant, which task is to do a summarisation of the transcript of the recording of a medical appointment.

## Input
You will receive the full transcript

## Output
Output rules (strict):

Produce one contiguous text block, no JSON, no Markdown.

Use exactly the field labels below, each followed by a colon and a single space.

If a field is absent, leave the value empty (e.g. Plan_Assistive: on its own line).

Keep lists either as - item bullet lines or comma-separated—stay consistent.

Add also a short paragraph, with a natural language summary of the transcript

Field order (write them exactly):
Visit_Date:
Chief_Complaint:
Diagnosis_Stage:
Symptoms:
Exam_Findings:
Investigations:
Tests_Ordered:
Plan_Therapy:
Plan_Medications:
Plan_Assistive:
Plan_Follow_Up:

Process hints:
• Skim full transcript, extract only problem-specific info.
• Preserve critical numbers (doses, ROM, timelines).
• Use standard medical terminology and ICD-10 codes when explicit.
• Do not fabricate data.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_system_embeds_context() {
        let prompt = chat_system("=== RELEVANT MEDICAL RECORDS ===\n\nPatient: moayad");
        assert!(prompt.contains("Patient: moayad"));
        assert!(prompt.contains("CONTEXT FROM MEDICAL RECORDS"));
    }

    #[test]
    fn condition_briefing_names_condition_throughout() {
        let prompt = condition_briefing("records here", "tomas", "diabetes");
        assert!(prompt.contains("about diabetes for patient tomas"));
        assert!(prompt.contains("Current status of diabetes"));
    }

    #[test]
    fn summary_system_lists_all_field_labels() {
        for label in [
            "Visit_Date:",
            "Chief_Complaint:",
            "Diagnosis_Stage:",
            "Symptoms:",
            "Exam_Findings:",
            "Investigations:",
            "Tests_Ordered:",
            "Plan_Therapy:",
            "Plan_Medications:",
            "Plan_Assistive:",
            "Plan_Follow_Up:",
        ] {
            assert!(SUMMARY_SYSTEM.contains(label), "missing label {label}");
        }
    }
}
