//! Interactive shell and scripted demo over an [`AppContext`]

use crate::display;
use crate::forms::{self, WorkoutForm};
use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Local, Utc};
use gymtrack_applications::{AppContext, ApplicationError, ServiceResult};
use gymtrack_core::{not_found_error, Workout, WorkoutData, WorkoutType};
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

const SETTLE_POLL: Duration = Duration::from_millis(10);

pub struct Shell<'a, R, W> {
    context: &'a AppContext,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(context: &'a AppContext, input: R, output: W) -> Self {
        Self {
            context,
            input,
            output,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Read commands until `quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        self.context.session().wait_until_ready().await;
        writeln!(self.output, "🏋️ GymTrack shell")?;
        writeln!(self.output, "💡 Type 'help' for commands, 'quit' to exit\n")?;

        loop {
            let Some(line) = self.prompt("gymtrack> ")? else {
                break;
            };
            let mut parts = line.split_whitespace();
            let Some(command) = parts.next() else {
                continue;
            };
            let argument = parts.next();
            debug!(command = command, "Shell command");

            match command.to_lowercase().as_str() {
                "quit" | "exit" | "q" => break,
                "help" | "h" => self.show_help()?,
                "register" => self.register().await?,
                "login" => self.login().await?,
                "logout" => self.logout().await?,
                "add" => self.add().await?,
                "edit" => self.edit(argument).await?,
                "delete" | "rm" => self.delete(argument).await?,
                "list" | "ls" => self.list().await?,
                "refresh" => self.refresh().await?,
                "dashboard" | "home" => self.dashboard().await?,
                "profile" => self.profile().await?,
                other => writeln!(self.output, "Unknown command: {}. Type 'help'.", other)?,
            }
        }

        writeln!(self.output, "👋 Goodbye!")?;
        Ok(())
    }

    fn show_help(&mut self) -> Result<()> {
        writeln!(self.output, "Commands:")?;
        for (command, description) in [
            ("register", "Create an account"),
            ("login", "Sign in"),
            ("logout", "Sign out"),
            ("add", "Log a workout"),
            ("edit <n|id>", "Edit a workout"),
            ("delete <n|id>", "Delete a workout"),
            ("list", "Show all workouts, newest first"),
            ("refresh", "Reload workouts"),
            ("dashboard", "Stats and recent workouts"),
            ("profile", "Account details"),
            ("quit", "Exit"),
        ] {
            writeln!(self.output, "  {:<14} {}", command, description)?;
        }
        Ok(())
    }

    /// `None` at end of input
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt_or_empty(&mut self, label: &str) -> Result<String> {
        Ok(self.prompt(label)?.unwrap_or_default())
    }

    /// Prompt showing the current value; empty input keeps it
    fn prompt_keep(&mut self, label: &str, current: &str) -> Result<String> {
        let answer = self.prompt_or_empty(&format!("{} [{}]: ", label, current))?;
        Ok(if answer.trim().is_empty() {
            current.to_string()
        } else {
            answer
        })
    }

    async fn require_user(&mut self) -> Result<bool> {
        if self.context.session().is_authenticated().await {
            Ok(true)
        } else {
            writeln!(self.output, "Please log in first")?;
            Ok(false)
        }
    }

    async fn register(&mut self) -> Result<()> {
        let email = self.prompt_or_empty("Email: ")?;
        let password = self.prompt_or_empty("Password: ")?;
        let confirm = self.prompt_or_empty("Confirm password: ")?;

        if let Err(e) = forms::validate_registration(&email, &password, &confirm) {
            writeln!(self.output, "❌ {}", forms::form_message(&e))?;
            return Ok(());
        }

        let result = self.context.session().register(email.trim(), &password).await;
        match ApplicationError::check_auth(result) {
            Ok(()) => {
                wait_for(self.context, true).await;
                writeln!(self.output, "✅ Account created. Welcome!")?;
            }
            Err(e) => writeln!(self.output, "❌ Registration Failed: {}", e)?,
        }
        Ok(())
    }

    async fn login(&mut self) -> Result<()> {
        let email = self.prompt_or_empty("Email: ")?;
        let password = self.prompt_or_empty("Password: ")?;

        if let Err(e) = forms::validate_login(&email, &password) {
            writeln!(self.output, "❌ {}", forms::form_message(&e))?;
            return Ok(());
        }

        let result = self.context.session().login(email.trim(), &password).await;
        match ApplicationError::check_auth(result) {
            Ok(()) => {
                wait_for(self.context, true).await;
                writeln!(self.output, "✅ Welcome back!")?;
            }
            Err(e) => writeln!(self.output, "❌ Login Failed: {}", e)?,
        }
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        if !self.require_user().await? {
            return Ok(());
        }
        match ApplicationError::check_auth(self.context.session().logout().await) {
            Ok(()) => {
                wait_for(self.context, false).await;
                writeln!(self.output, "🚪 Logged out")?;
            }
            Err(e) => writeln!(self.output, "❌ {}", e)?,
        }
        Ok(())
    }

    fn read_workout_form(&mut self, mut form: WorkoutForm) -> Result<WorkoutForm> {
        let workout_type = self.prompt_keep("Type (Strength/Cardio)", &form.workout_type.to_string())?;
        form.workout_type = workout_type.trim().parse().unwrap_or(form.workout_type);
        form.exercise_name = self.prompt_keep("Exercise name", &form.exercise_name)?;

        match form.workout_type {
            WorkoutType::Strength => {
                form.sets = self.prompt_keep("Sets", &form.sets)?;
                form.reps = self.prompt_keep("Reps", &form.reps)?;
                form.weight = self.prompt_keep("Weight (kg)", &form.weight)?;
            }
            WorkoutType::Cardio => {
                form.duration = self.prompt_keep("Duration (min)", &form.duration)?;
            }
        }

        let today = Local::now().format("%Y-%m-%d").to_string();
        let current = if form.date.is_empty() { today } else { form.date.clone() };
        form.date = self.prompt_keep("Date (YYYY-MM-DD)", &current)?;
        Ok(form)
    }

    async fn add(&mut self) -> Result<()> {
        if !self.require_user().await? {
            return Ok(());
        }

        let form = self.read_workout_form(WorkoutForm::default())?;
        let data = match form.into_workout() {
            Ok(data) => data,
            Err(e) => {
                writeln!(self.output, "❌ {}", forms::form_message(&e))?;
                return Ok(());
            }
        };

        let result = self.context.workouts().add(data).await;
        self.report(result, "✅ Workout added successfully!", "Failed to add workout")
    }

    async fn edit(&mut self, target: Option<&str>) -> Result<()> {
        if !self.require_user().await? {
            return Ok(());
        }
        let workout = match self.resolve(target).await {
            Ok(workout) => workout,
            Err(e) => {
                writeln!(self.output, "❌ {}", e)?;
                return Ok(());
            }
        };

        let form = self.read_workout_form(WorkoutForm::from_data(&workout.data))?;
        let data = match form.into_workout() {
            Ok(data) => data,
            Err(e) => {
                writeln!(self.output, "❌ {}", forms::form_message(&e))?;
                return Ok(());
            }
        };

        let result = self
            .context
            .workouts()
            .edit(&workout.workout_id, data)
            .await;
        self.report(result, "✅ Workout updated successfully!", "Failed to update workout")
    }

    async fn delete(&mut self, target: Option<&str>) -> Result<()> {
        if !self.require_user().await? {
            return Ok(());
        }
        let workout = match self.resolve(target).await {
            Ok(workout) => workout,
            Err(e) => {
                writeln!(self.output, "❌ {}", e)?;
                return Ok(());
            }
        };

        let answer = self.prompt_or_empty(&format!(
            "Are you sure you want to delete \"{}\"? [y/N] ",
            workout.data.exercise_name
        ))?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            writeln!(self.output, "Cancelled")?;
            return Ok(());
        }

        let result = self.context.workouts().remove(&workout.workout_id).await;
        if result.success {
            writeln!(self.output, "🗑️ Workout deleted")?;
        } else {
            info!(error = ?result.error, "Delete failed");
            writeln!(self.output, "❌ Failed to delete workout")?;
        }
        Ok(())
    }

    /// Find a cached workout by 1-based list position or by id
    async fn resolve(&self, target: Option<&str>) -> Result<Workout> {
        let target = target.context("Usage: edit|delete <number or id>")?;
        let workouts = self.context.workouts().workouts().await;

        let found = match target.parse::<usize>() {
            Ok(position) if position >= 1 => workouts.into_iter().nth(position - 1),
            _ => workouts.into_iter().find(|w| w.workout_id == target),
        };
        found.ok_or_else(|| not_found_error!(format!("workout {}", target), "shell").into())
    }

    fn report(&mut self, result: ServiceResult, success: &str, fallback: &str) -> Result<()> {
        match ApplicationError::check(result) {
            Ok(_) => writeln!(self.output, "{}", success)?,
            Err(ApplicationError::Operation { message }) if !message.is_empty() => {
                writeln!(self.output, "❌ {}", message)?
            }
            Err(_) => writeln!(self.output, "❌ {}", fallback)?,
        }
        Ok(())
    }

    async fn list(&mut self) -> Result<()> {
        if !self.require_user().await? {
            return Ok(());
        }
        let snapshot = self.context.workouts().snapshot().await;
        write!(self.output, "{}", display::render_list(&snapshot.workouts))?;
        if let Some(error) = snapshot.error {
            writeln!(self.output, "⚠️ {}", error)?;
        }
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        if !self.require_user().await? {
            return Ok(());
        }
        let store = self.context.workouts();
        store.fetch().await;
        match store.error().await {
            Some(error) => writeln!(self.output, "❌ {}", error)?,
            None => writeln!(self.output, "🔄 {} workouts loaded", store.workouts().await.len())?,
        }
        Ok(())
    }

    async fn dashboard(&mut self) -> Result<()> {
        if !self.require_user().await? {
            return Ok(());
        }
        let user = self.context.session().current_user().await;
        let snapshot = self.context.workouts().snapshot().await;
        write!(
            self.output,
            "{}",
            display::render_dashboard(user.as_ref(), &snapshot.stats, &snapshot.workouts, Local::now())
        )?;
        Ok(())
    }

    async fn profile(&mut self) -> Result<()> {
        if !self.require_user().await? {
            return Ok(());
        }
        let user = self.context.session().current_user().await;
        let stats = self.context.workouts().stats().await;
        write!(self.output, "{}", display::render_profile(user.as_ref(), &stats))?;
        Ok(())
    }
}

/// Scripted walkthrough: register, log workouts, edit, delete, log out
pub async fn run_demo<W: Write>(context: &AppContext, out: &mut W) -> Result<()> {
    let session = context.session();
    let store = context.workouts();
    session.wait_until_ready().await;

    let email = format!("demo-{}@gymtrack.dev", &Uuid::new_v4().simple().to_string()[..8]);
    writeln!(out, "▶ Registering {}", email)?;
    ApplicationError::check_auth(session.register(&email, "demo-password").await)?;
    wait_for(context, true).await;

    let now = Local::now();
    let entries = [
        WorkoutData::strength("Bench Press", 3, 8, 70.0).on((now - ChronoDuration::days(2)).with_timezone(&Utc)),
        WorkoutData::cardio("Morning Run", 30).on((now - ChronoDuration::days(10)).with_timezone(&Utc)),
        WorkoutData::strength("Pull-up", 4, 10, 0.0).on(now.with_timezone(&Utc)),
    ];
    for data in entries {
        writeln!(out, "▶ Adding {}", data.exercise_name)?;
        ApplicationError::check(store.add(data).await)?;
    }

    let snapshot = store.snapshot().await;
    let user = session.current_user().await;
    write!(
        out,
        "\n{}",
        display::render_dashboard(user.as_ref(), &snapshot.stats, &snapshot.workouts, now)
    )?;

    if let Some(run) = snapshot
        .workouts
        .iter()
        .find(|w| w.data.workout_type == WorkoutType::Cardio)
    {
        writeln!(out, "\n▶ Extending {} to 45 minutes", run.data.exercise_name)?;
        let mut data = run.data.clone();
        data.duration = 45;
        ApplicationError::check(store.edit(&run.workout_id, data).await)?;
    }

    if let Some(last) = store.workouts().await.last().cloned() {
        writeln!(out, "▶ Deleting {}", last.data.exercise_name)?;
        ApplicationError::check(store.remove(&last.workout_id).await)?;
    }

    write!(out, "\n{}", display::render_list(&store.workouts().await))?;
    write!(
        out,
        "\n{}",
        display::render_profile(session.current_user().await.as_ref(), &store.stats().await)
    )?;

    writeln!(out, "\n▶ Logging out")?;
    ApplicationError::check_auth(session.logout().await)?;
    wait_for(context, false).await;
    let stats = store.stats().await;
    writeln!(
        out,
        "Cached workouts: {}, total: {}, this week: {}",
        store.workouts().await.len(),
        stats.total_workouts,
        stats.weekly_count
    )?;
    Ok(())
}

/// Wait until the workout store has followed the session
async fn wait_for(context: &AppContext, signed_in: bool) {
    let deadline =
        Instant::now() + Duration::from_millis(context.config().client.request_timeout_ms);
    let store = context.workouts();
    while Instant::now() < deadline {
        if store.current_user().await.is_some() == signed_in && !store.is_loading() {
            return;
        }
        tokio::time::sleep(SETTLE_POLL).await;
    }
}
