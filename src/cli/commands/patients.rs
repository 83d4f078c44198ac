//! Patient roster commands

use super::runtime::{report, Runtime};
use crate::core::roster::NewPatientForm;
use crate::domain::{Patient, PatientId};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

/// Arguments for the patients command
#[derive(Args, Debug)]
pub struct PatientsArgs {
    #[command(subcommand)]
    pub command: PatientsCommand,
}

/// Patient subcommands
#[derive(Subcommand, Debug)]
pub enum PatientsCommand {
    /// List patients, optionally filtered by name or CPF
    List {
        /// Case-insensitive name fragment or verbatim CPF fragment
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Register a new patient
    Add(AddPatientArgs),

    /// Show one patient
    Show {
        /// Patient id
        id: PatientId,
    },
}

/// Fields of a new patient
#[derive(Args, Debug)]
pub struct AddPatientArgs {
    #[arg(long)]
    pub name: String,

    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    pub birth_date: String,

    #[arg(long)]
    pub cpf: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub emergency_contact: Option<String>,

    #[arg(long)]
    pub medical_history: Option<String>,
}

impl AddPatientArgs {
    fn to_form(&self) -> NewPatientForm {
        NewPatientForm {
            name: self.name.clone(),
            birth_date: self.birth_date.clone(),
            cpf: self.cpf.clone(),
            phone: self.phone.clone(),
            email: self.email.clone().unwrap_or_default(),
            address: self.address.clone().unwrap_or_default(),
            emergency_contact: self.emergency_contact.clone().unwrap_or_default(),
            medical_history: self.medical_history.clone().unwrap_or_default(),
        }
    }
}

impl PatientsArgs {
    /// Execute the patients command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runtime = match Runtime::load(config_path) {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let mut workspace = match runtime.workspace().await {
            Ok(w) => w,
            Err(code) => return Ok(code),
        };
        let today = Local::now().date_naive();

        match &self.command {
            PatientsCommand::List { search } => {
                let patients = workspace.roster().filter(search);
                println!("🧑‍⚕️ Patients ({})", patients.len());
                println!();
                for patient in patients {
                    print_row(patient, today);
                }
                Ok(0)
            }
            PatientsCommand::Add(args) => match workspace.add_patient(args.to_form()).await {
                Ok(patient) => {
                    println!("✅ Patient registered");
                    print_row(patient, today);
                    Ok(0)
                }
                Err(e) => Ok(report("Failed to register patient", &e)),
            },
            PatientsCommand::Show { id } => match workspace.roster().select(id) {
                Some(patient) => {
                    print_details(patient, today);
                    Ok(0)
                }
                None => {
                    println!("❌ Patient {id} not found");
                    Ok(1)
                }
            },
        }
    }
}

fn print_row(patient: &Patient, today: NaiveDate) {
    println!(
        "  {}  {:<30} {:>3} anos  CPF {}  {}",
        patient.id,
        patient.name,
        patient.age_on(today),
        patient.cpf,
        patient.phone
    );
}

fn print_details(patient: &Patient, today: NaiveDate) {
    println!("🧑 {}", patient.name);
    println!("  Id: {}", patient.id);
    println!(
        "  Birth date: {} ({} anos)",
        patient.birth_date.format("%d/%m/%Y"),
        patient.age_on(today)
    );
    println!("  CPF: {}", patient.cpf);
    println!("  Phone: {}", patient.phone);
    let optional = [
        ("E-mail", &patient.email),
        ("Address", &patient.address),
        ("Emergency contact", &patient.emergency_contact),
        ("Medical history", &patient.medical_history),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            println!("  {label}: {value}");
        }
    }
    println!("  Registered: {}", patient.created_at.format("%Y-%m-%d"));
}
