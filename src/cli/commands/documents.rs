//! Document browser commands

use super::runtime::{report, Runtime};
use crate::core::documents::NewDocumentForm;
use crate::domain::PatientId;
use clap::{Args, Subcommand};

/// Arguments for the documents command
#[derive(Args, Debug)]
pub struct DocumentsArgs {
    #[command(subcommand)]
    pub command: DocumentsCommand,
}

/// Document subcommands
#[derive(Subcommand, Debug)]
pub enum DocumentsCommand {
    /// List the documents of a patient grouped by category
    List {
        /// Patient id
        #[arg(short, long)]
        patient: PatientId,
    },

    /// Register metadata of a document already stored at a URL
    Add {
        /// Patient id
        #[arg(short, long)]
        patient: PatientId,

        #[arg(long)]
        name: String,

        /// Type tag, e.g. pdf
        #[arg(long = "type")]
        doc_type: String,

        /// One of the configured document categories
        #[arg(long)]
        category: String,

        /// Location of the stored file
        #[arg(long)]
        file_url: String,
    },

    /// List document templates per profession
    Templates {
        /// Only this profession
        #[arg(long)]
        profession: Option<String>,
    },
}

impl DocumentsArgs {
    /// Execute the documents command
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
            DocumentsCommand::List { patient } => {
                if let Err(e) = workspace.select_patient(*patient).await {
                    return Ok(report("Failed to load patient records", &e));
                }
                let browser = workspace.documents();
                println!("📁 Documents ({})", browser.documents().len());
                for panel in browser.panels() {
                    println!();
                    println!("  {} ({})", panel.category, panel.documents.len());
                    for document in &panel.documents {
                        println!(
                            "    {}  {} [{}]  {}",
                            document.created_at.format("%Y-%m-%d"),
                            document.name,
                            document.doc_type,
                            document.file_url
                        );
                    }
                }
                let hidden = browser.hidden_count();
                if hidden > 0 {
                    println!();
                    println!("⚠️  {hidden} document(s) with an unknown category not shown");
                }
                Ok(0)
            }
            DocumentsCommand::Add {
                patient,
                name,
                doc_type,
                category,
                file_url,
            } => {
                if let Err(e) = workspace.select_patient(*patient).await {
                    return Ok(report("Failed to load patient records", &e));
                }
                let form = NewDocumentForm {
                    name: name.clone(),
                    doc_type: doc_type.clone(),
                    category: category.clone(),
                    file_url: file_url.clone(),
                };
                match workspace.register_document(form).await {
                    Ok(document) => {
                        println!("✅ Document registered under {}", document.category);
                        println!("   Id: {}", document.id);
                        Ok(0)
                    }
                    Err(e) => Ok(report("Failed to register document", &e)),
                }
            }
            DocumentsCommand::Templates { profession } => {
                let catalog = workspace.catalog();
                println!("📝 Document templates");
                for (value, names) in workspace.documents().templates() {
                    if profession.as_deref().is_some_and(|p| p != value.as_str()) {
                        continue;
                    }
                    let label = crate::domain::Profession::new(value.as_str())
                        .map(|p| catalog.profession_label(&p))
                        .unwrap_or_else(|_| value.clone());
                    println!();
                    println!("  {label}");
                    for name in names {
                        println!("    - {name}");
                    }
                }
                Ok(0)
            }
        }
    }
}
