use chrono::Local;
use clap::Args;
use lead_intake::error::AppError;
use lead_intake::intake::{JsonlLeadRepository, LeadRecord, LeadRepository, WireTag};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// JSON-lines store written by `serve --store-path`
    #[arg(long)]
    pub(crate) store_path: PathBuf,
    /// Emit one JSON document per lead instead of a text listing
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_list(args: ListArgs) -> Result<(), AppError> {
    let ListArgs { store_path, json } = args;

    if !store_path.exists() {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no lead store at {}", store_path.display()),
        )));
    }

    let repository = JsonlLeadRepository::open(&store_path)?;
    let records = repository.select_all()?;

    if json {
        for record in &records {
            match serde_json::to_string(record) {
                Ok(line) => println!("{line}"),
                Err(err) => eprintln!("skipping lead {}: {err}", record.id()),
            }
        }
        return Ok(());
    }

    if records.is_empty() {
        println!("No contact requests stored in {}", store_path.display());
        return Ok(());
    }

    println!(
        "{} contact request(s) in {}",
        records.len(),
        store_path.display()
    );
    for record in &records {
        println!("\n{}", render_record(record));
    }
    Ok(())
}

fn render_record(record: &LeadRecord) -> String {
    let lead = record.lead();
    let needs = lead
        .needs
        .iter()
        .map(|need| need.label())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        format!(
            "#{} received {}",
            record.id(),
            record
                .created_at()
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
        ),
        format!("  for:          {}", lead.requester_role.label()),
        format!("  level:        {}", lead.level.label()),
        format!("  needs:        {needs}"),
        format!("  modality:     {}", lead.modality.label()),
        format!("  weekly hours: {}", lead.weekly_hours.label()),
        format!("  goal:         {}", lead.goal.label()),
        format!("  availability: {}", lead.availability),
    ];
    if let Some(message) = &lead.message {
        lines.push(format!("  message:      {message}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_intake::intake::{LeadIntakeService, LeadSubmission};
    use std::sync::Arc;

    #[test]
    fn renders_labels_rather_than_tags() {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let repository =
            Arc::new(JsonlLeadRepository::open(temp.path().join("leads.jsonl")).expect("opens"));
        let service = LeadIntakeService::new(repository);
        let record = service
            .submit(LeadSubmission {
                requester_role: Some("for-child".to_string()),
                level: Some("1ere".to_string()),
                needs: Some(vec!["exam-prep".to_string(), "support".to_string()]),
                modality: Some("either".to_string()),
                weekly_hours: Some("3h+".to_string()),
                goal: Some("long-term".to_string()),
                availability: Some("Soirs de semaine".to_string()),
                message: Some("Prépare le bac de français aussi".to_string()),
            })
            .expect("lead persists");

        let rendered = render_record(&record);
        assert!(rendered.starts_with("#1 received "));
        assert!(rendered.contains("Pour mon enfant"));
        assert!(rendered.contains("1ère"));
        assert!(rendered.contains("Soutien scolaire, Préparation aux examens"));
        assert!(rendered.contains("Plus de 3 heures"));
        assert!(rendered.contains("message:      Prépare le bac"));
    }

    #[test]
    fn missing_store_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let err = run_list(ListArgs {
            store_path: temp.path().join("absent.jsonl"),
            json: false,
        })
        .expect_err("store must exist");
        assert!(err.to_string().contains("no lead store"));
        assert!(!temp.path().join("absent.jsonl").exists());
    }
}
