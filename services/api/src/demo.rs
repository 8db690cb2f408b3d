use crate::infra::{build_intake_service, LeadStore};
use clap::Args;
use lead_intake::config::StorageConfig;
use lead_intake::error::AppError;
use lead_intake::intake::{
    AcademicLevel, FormError, FormNotice, Goal, IntakeForm, LeadIntakeService, LeadSubmission,
    Modality, NeedTag, RequesterRole, SubmissionTransport, WeeklyHours, WireTag,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Persist demo leads to this JSON-lines file (defaults to memory)
    #[arg(long)]
    pub(crate) store_path: Option<PathBuf>,
    /// Skip the raw payload the server must reject
    #[arg(long)]
    pub(crate) skip_server_rejection: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        store_path,
        skip_server_rejection,
    } = args;

    let service = build_intake_service(&StorageConfig { path: store_path })?;

    println!("Contact form demo");

    let mut form = IntakeForm::default();
    form.set_requester_role(RequesterRole::Parent);
    form.set_level(AcademicLevel::Troisieme);
    form.set_modality(Modality::InPerson);
    form.set_weekly_hours(WeeklyHours::OneAndHalf);
    form.set_goal(Goal::LongTerm);
    form.set_availability("Mercredi après-midi, samedi matin");
    form.set_message("Préparation du brevet en fin d'année.");

    println!("\n1. Submitting without selecting a need");
    match form.submit_with(service.as_ref()) {
        Err(FormError::Invalid(errors)) => {
            for issue in errors.issues() {
                println!("   blocked locally: {} ({})", issue.field, issue.message);
            }
        }
        other => println!("   unexpected outcome: {other:?}"),
    }

    form.toggle_need(NeedTag::Support);
    form.toggle_need(NeedTag::ExamPrep);
    let selected = form
        .needs()
        .iter()
        .map(|need| need.label())
        .collect::<Vec<_>>()
        .join(", ");
    println!("\n2. Submitting with needs: {selected}");
    match form.submit_with(service.as_ref()) {
        Ok(notice) => print_notice(&notice),
        Err(err) => println!("   blocked locally: {err}"),
    }
    println!("   form cleared: {}", form.is_blank());

    if !skip_server_rejection {
        println!("\n3. Posting a payload that bypasses the form");
        let forged = LeadSubmission {
            requester_role: Some("self".to_string()),
            level: Some("cp".to_string()),
            needs: Some(Vec::new()),
            availability: Some("n'importe quand".to_string()),
            ..LeadSubmission::default()
        };
        report_raw(&service, forged);
    }

    println!("\nStored contact requests");
    let records = service.list_all()?;
    for record in &records {
        let lead = record.lead();
        println!(
            "- #{} {} | {} | {} | {}",
            record.id(),
            lead.level.label(),
            lead.modality.label(),
            lead.weekly_hours.label(),
            lead.availability
        );
    }

    Ok(())
}

fn report_raw(service: &LeadIntakeService<LeadStore>, payload: LeadSubmission) {
    match service.send(payload) {
        Ok(response) => {
            println!("   HTTP {}", response.status().as_u16());
            let mut form = IntakeForm::default();
            match form.finish(response) {
                FormNotice::ValidationFailed { message } => {
                    println!("   {message}");
                    for issue in form.errors() {
                        println!("   - {}: {}", issue.field, issue.message);
                    }
                }
                notice => print_notice(&notice),
            }
        }
        Err(err) => println!("   {err}"),
    }
}

fn print_notice(notice: &FormNotice) {
    match notice {
        FormNotice::Confirmation { message, id } => println!("   lead #{id}: {message}"),
        FormNotice::ValidationFailed { message } | FormNotice::Failure { message } => {
            println!("   {message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_persists_exactly_one_lead() {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let path = temp.path().join("demo.jsonl");

        run_demo(DemoArgs {
            store_path: Some(path.clone()),
            skip_server_rejection: false,
        })
        .expect("demo runs");

        let contents = std::fs::read_to_string(&path).expect("store written");
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains(r#""level":"3e""#));
        assert!(contents.contains(r#""needs":["support","exam-prep"]"#));
    }
}
