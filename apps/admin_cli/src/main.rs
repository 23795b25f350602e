use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use client_core::{
    AdminAction, CoordinatorError, FilterChoice, HttpTeacherGateway, Notification,
    NotificationLevel, NotificationSink, ReloadOutcome, TeacherAdminScreen,
};
use shared::domain::{TeacherDraft, TeacherId, TeacherRecord};
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser, Debug)]
#[command(about = "Manage teacher records through the school admin API")]
struct Cli {
    /// Overrides `api_base_url` from teacher_admin.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "All")]
        subject: String,
        #[arg(long, default_value = "All")]
        status: String,
    },
    Stats,
    Add {
        #[command(flatten)]
        fields: TeacherFields,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: TeacherFields,
    },
    Delete {
        id: String,
        /// Must be exactly DELETE.
        #[arg(long)]
        confirm: String,
    },
}

#[derive(Args, Debug)]
struct TeacherFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    classes: Option<i64>,
    #[arg(long)]
    experience: Option<i64>,
    #[arg(long)]
    total_students: Option<i64>,
    #[arg(long)]
    rating: Option<f64>,
    #[arg(long)]
    schedule: Option<String>,
    #[arg(long)]
    status: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    join_date: Option<NaiveDate>,
}

impl TeacherFields {
    fn apply(self, draft: &mut TeacherDraft) -> Result<()> {
        if let Some(v) = self.name {
            draft.name = v;
        }
        if let Some(v) = self.email {
            draft.email = v;
        }
        if let Some(v) = self.phone {
            draft.phone = v;
        }
        // An unknown subject leaves the field unset so validation reports it.
        if let Some(v) = self.subject {
            draft.subject = v.parse().ok();
        }
        if let Some(v) = self.classes {
            draft.classes = v;
        }
        if let Some(v) = self.experience {
            draft.experience = v;
        }
        if let Some(v) = self.total_students {
            draft.total_students = v;
        }
        if let Some(v) = self.rating {
            draft.rating = v;
        }
        if let Some(v) = self.schedule {
            draft.schedule = v;
        }
        if let Some(v) = self.status {
            draft.status = v.parse()?;
        }
        if let Some(v) = self.join_date {
            draft.join_date = Some(v.and_time(NaiveTime::MIN).and_utc());
        }
        Ok(())
    }
}

struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => eprintln!("{}", notification.message),
            NotificationLevel::Error => eprintln!("error: {}", notification.message),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = config::load_settings();
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }
    let base_url = config::parse_api_base_url(&settings.api_base_url)?;
    let gateway = match settings.request_timeout() {
        Some(timeout) => HttpTeacherGateway::with_timeout(base_url, timeout)
            .context("failed to build http client")?,
        None => HttpTeacherGateway::new(base_url),
    };
    let mut screen = TeacherAdminScreen::new(Arc::new(gateway), Arc::new(ConsoleNotifier));

    if let ReloadOutcome::Failed(_) = screen.reload().await {
        return Ok(ExitCode::FAILURE);
    }

    match cli.command {
        Command::List {
            search,
            subject,
            status,
        } => {
            if let Some(term) = search {
                screen.dispatch(AdminAction::SearchChanged(term)).await;
            }
            screen
                .dispatch(AdminAction::SubjectFilterChanged(FilterChoice::parse(&subject)?))
                .await;
            screen
                .dispatch(AdminAction::StatusFilterChanged(FilterChoice::parse(&status)?))
                .await;

            let view = screen.view();
            for teacher in &view.teachers {
                print_row(teacher);
            }
            println!("{} of {} teachers", view.teachers.len(), view.stats.total);
        }
        Command::Stats => {
            let stats = screen.view().stats;
            println!("total teachers:      {}", stats.total);
            println!("active:              {}", stats.active);
            println!("classes taught:      {}", stats.total_classes);
            println!("average experience:  {:.1} years", stats.average_experience);
        }
        Command::Add { fields } => {
            screen.dispatch(AdminAction::OpenAdd).await;
            let draft = screen
                .add_modal_mut()
                .draft_mut()
                .context("add dialog did not open")?;
            fields.apply(draft)?;

            let Some(created) = report(screen.submit_add().await) else {
                return Ok(ExitCode::FAILURE);
            };
            println!("{}", created.id);
        }
        Command::Edit { id, fields } => {
            if !screen.open_edit(&TeacherId(id)) {
                return Ok(ExitCode::FAILURE);
            }
            let draft = screen
                .edit_modal_mut()
                .draft_mut()
                .context("edit dialog did not open")?;
            fields.apply(draft)?;

            let Some(updated) = report(screen.submit_edit().await) else {
                return Ok(ExitCode::FAILURE);
            };
            print_row(&updated);
        }
        Command::Delete { id, confirm } => {
            if !screen.open_delete(&TeacherId(id)) {
                return Ok(ExitCode::FAILURE);
            }
            screen
                .dispatch(AdminAction::DeleteConfirmationChanged(confirm))
                .await;
            if report(screen.confirm_delete().await).is_none() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Prints what the notifier does not: inline field and confirmation errors.
fn report<T>(result: Result<T, CoordinatorError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(CoordinatorError::Validation(errors)) => {
            for (field, message) in errors.messages() {
                eprintln!("  {field}: {message}");
            }
            None
        }
        Err(CoordinatorError::Confirmation(mismatch)) => {
            eprintln!("{mismatch}");
            None
        }
        Err(_) => None,
    }
}

fn print_row(teacher: &TeacherRecord) {
    println!(
        "{:<26} {:<24} {:<30} {:<17} {:>2} {:<9} {:.1}",
        teacher.id,
        teacher.name,
        teacher.email,
        teacher.subject,
        teacher.classes,
        teacher.status,
        teacher.rating
    );
}
