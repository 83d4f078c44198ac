//! Evolution log commands

use super::runtime::{report, Runtime};
use crate::core::evolutions::NewEvolutionForm;
use crate::core::workspace::Workspace;
use crate::domain::PatientId;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

/// Arguments for the evolutions command
#[derive(Args, Debug)]
pub struct EvolutionsArgs {
    #[command(subcommand)]
    pub command: EvolutionsCommand,
}

/// Evolution subcommands
#[derive(Subcommand, Debug)]
pub enum EvolutionsCommand {
    /// List the evolutions of a patient, newest clinical date first
    List {
        /// Patient id
        #[arg(short, long)]
        patient: PatientId,

        /// Only show notes of this profession
        #[arg(long, default_value = "")]
        profession: String,
    },

    /// Record an evolution for a patient
    Add {
        /// Patient id
        #[arg(short, long)]
        patient: PatientId,

        /// Profession the note is written under
        #[arg(long)]
        profession: String,

        /// Clinical date (YYYY-MM-DD); today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Note text
        #[arg(long)]
        content: String,
    },
}

impl EvolutionsArgs {
    /// Execute the evolutions command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runtime = match Runtime::load(config_path) {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let mut workspace = match runtime.workspace().await {
            Ok(w) => w,
            Err(code) => return Ok(code),
        };

        match &self.command {
            EvolutionsCommand::List {
                patient,
                profession,
            } => {
                if let Err(e) = workspace.select_patient(*patient).await {
                    return Ok(report("Failed to load patient records", &e));
                }
                workspace.evolutions_mut().set_profession_filter(profession.as_str());
                print_log(&workspace);
                Ok(0)
            }
            EvolutionsCommand::Add {
                patient,
                profession,
                date,
                content,
            } => {
                if let Err(e) = workspace.select_patient(*patient).await {
                    return Ok(report("Failed to load patient records", &e));
                }
                let mut form = NewEvolutionForm::new(profession.as_str(), content.as_str());
                if let Some(date) = date {
                    form = form.on(*date);
                }
                match workspace.add_evolution(form).await {
                    Ok(evolution) => {
                        println!(
                            "✅ Evolution recorded for {} ({})",
                            evolution.date.format("%d/%m/%Y"),
                            evolution.id
                        );
                        Ok(0)
                    }
                    Err(e) => Ok(report("Failed to record evolution", &e)),
                }
            }
        }
    }
}

fn print_log(workspace: &Workspace) {
    let catalog = workspace.catalog();
    let visible = workspace.evolutions().visible();
    let name = workspace
        .selected_patient()
        .map(|p| p.name.as_str())
        .unwrap_or("patient");

    println!("📋 Evolutions of {} ({})", name, visible.len());
    for evolution in visible {
        println!();
        println!(
            "  {}  {}  by {}",
            evolution.date.format("%d/%m/%Y"),
            catalog.profession_label(&evolution.profession),
            evolution.author_name().unwrap_or("unknown")
        );
        for line in evolution.content.lines() {
            println!("    {line}");
        }
    }
}
