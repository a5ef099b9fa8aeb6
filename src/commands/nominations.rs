use crate::cli::{Cli, Commands};
use crate::domain::models::{DraftPatch, ListFilter};
use crate::services::nominations::NominationManager;
use crate::services::output::{print_one, print_out, record_row};
use crate::services::storage::JsonFileStore;

pub fn handle_nomination_commands(
    cli: &Cli,
    manager: &mut NominationManager<JsonFileStore>,
) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Create {
            nominator,
            nominee,
            cycle,
            justification,
        } => {
            let rec = manager.create(nominator, nominee, cycle, justification)?;
            print_one(cli.json, rec, |r| format!("created {} ({})", r.id, r.status))?;
        }
        Commands::Edit {
            id,
            actor,
            nominee,
            cycle,
            justification,
        } => {
            let patch = DraftPatch {
                nominee: nominee.clone(),
                award_cycle: cycle.clone(),
                justification: justification.clone(),
            };
            let rec = manager.update_draft(id, actor, patch)?;
            print_one(cli.json, rec, |r| format!("updated {}", r.id))?;
        }
        Commands::Submit { id } => {
            let rec = manager.submit(id)?;
            print_one(cli.json, rec, |r| {
                format!(
                    "submitted {} at {}",
                    r.id,
                    r.submitted_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "n/a".to_string())
                )
            })?;
        }
        Commands::StartReview { id, reviewer } => {
            let rec = manager.start_review(id, reviewer)?;
            print_one(cli.json, rec, |r| format!("{} under review", r.id))?;
        }
        Commands::Review {
            id,
            decision,
            reviewer,
        } => {
            let rec = match reviewer {
                Some(who) => manager.review_as(id, *decision, who)?,
                None => manager.review(id, *decision)?,
            };
            print_one(cli.json, rec, |r| format!("{} {}", r.id, r.status))?;
        }
        Commands::Vote { id } => {
            let rec = manager.vote(id)?;
            print_one(cli.json, rec, |r| format!("{} votes={}", r.id, r.votes))?;
        }
        Commands::Show { id } => {
            let rec = manager.get(id)?;
            if cli.json {
                print_one(true, rec, |_| String::new())?;
            } else {
                println!("id: {}", rec.id);
                println!("status: {}", rec.status);
                println!("cycle: {}", rec.award_cycle);
                println!("nominator: {}", rec.nominator);
                println!("nominee: {}", rec.nominee);
                println!("justification: {}", rec.justification);
                if let Some(at) = rec.submitted_at {
                    println!("submitted_at: {}", at.to_rfc3339());
                }
                if let Some(r) = &rec.reviewer {
                    println!("reviewer: {}", r);
                }
                println!("votes: {}", rec.votes);
                if !rec.attachments.is_empty() {
                    let names: Vec<_> = rec.attachments.iter().map(|a| a.filename.as_str()).collect();
                    println!("attachments: {}", names.join(", "));
                }
            }
        }
        Commands::List { cycle, status } => {
            let filter = ListFilter {
                award_cycle: cycle.clone(),
                status: *status,
            };
            let records = manager.list(&filter)?;
            print_out(cli.json, &records, record_row)?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}
