//! Compose a small batch and write it to output/
//! Run with: cargo run -p hallticket --example sample_batch

use chrono::NaiveDate;
use hallticket::{BatchEmitter, DocumentComposer, RawRecord, TicketConfig};
use serde_json::json;
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all("output")?;

    let generated_at = NaiveDate::from_ymd_opt(2025, 3, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .ok_or("invalid timestamp")?;
    let mut config = TicketConfig::default();
    config.organization = "State Board of Technical Education".to_string();

    let records: Vec<RawRecord> = vec![
        json!({
            "id": "S-1001",
            "name": "Asha Rao",
            "rollNumber": "2025-DT-0001",
            "dob": "2004-07-09",
            "gender": "Female",
            "fatherName": "Vikram Rao",
            "examName": "Diploma Final Examination",
            "examDate": "15/03/2025",
            "examTime": "10:00 AM",
            "reportingTime": "09:00",
            "duration": "3 hours",
            "fee": "1500",
            "centerName": "Government Polytechnic",
            "address": "12 Station Road, Shivajinagar",
            "city": "Pune",
            "state": "Maharashtra"
        })
        .into(),
        // Skipped: no name
        json!({"id": "S-1002", "examName": "Diploma Final Examination"}).into(),
        json!({
            "id": "S-1003",
            "name": "Chetan Das",
            "applicationNumber": "APP-77",
            "examName": "Diploma Final Examination"
        })
        .into(),
    ];

    let composer = DocumentComposer::new(config, generated_at)?;
    let artifact = BatchEmitter::new(composer).emit(records).await;

    artifact.save_pdf("output/sample_batch.pdf")?;
    println!(
        "Wrote {} pages -> output/sample_batch.pdf",
        artifact.page_count()
    );
    println!("{}", artifact.summary_json()?);

    Ok(())
}
