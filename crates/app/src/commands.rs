use std::sync::Arc;

use clap::{ArgGroup, Args, Subcommand};
use tracker::{
    AuthSession, BudgetPeriod, BudgetStore, Expense, ExpenseChanges, ExpenseCollection,
    ExpenseDraft, JsonFileStore, MoodCollection, MoodValue, Notifier, Task, TaskCollection,
    TaskNew, TaskUpdate, TrackerContext,
};

use crate::{config::AppConfig, error::Result};

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Expenses(ExpenseCommand),
    #[command(subcommand)]
    Moods(MoodCommand),
    #[command(subcommand)]
    Tasks(TaskCommand),
    #[command(subcommand)]
    Budget(BudgetCommand),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("period").args(["date", "month"])))]
pub struct PeriodArgs {
    /// Day, `YYYY-MM-DD`.
    #[arg(long)]
    date: Option<String>,
    /// Month, `YYYY-MM`.
    #[arg(long)]
    month: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    List(PeriodArgs),
    Add {
        amount: f64,
        description: String,
        /// Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Sum for a day (default today) or a month, with the budget in effect.
    Total(PeriodArgs),
}

#[derive(Subcommand, Debug)]
pub enum MoodCommand {
    List,
    Get { date: Option<String> },
    /// Numbers are stored as scores, anything else as a label.
    Set {
        value: String,
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    List {
        #[arg(long)]
        date: Option<String>,
    },
    Add {
        title: String,
        #[arg(long)]
        date: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    Toggle {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    SetDaily {
        amount: f64,
        #[arg(long)]
        date: Option<String>,
    },
    Daily {
        date: Option<String>,
    },
    SetMonthly {
        amount: f64,
        #[arg(long)]
        month: Option<String>,
    },
    Monthly {
        month: Option<String>,
    },
    /// Explicitly set budgets, both daily and monthly.
    List,
}

pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Budget(command) => run_budget(command, &budget_store(config)?),
        Command::Expenses(command) => {
            let ctx = context(config)?;
            let expenses = ExpenseCollection::new(ctx.clone()).await;
            run_expenses(command, &expenses, config).await?;
            print_toast(&ctx.notifier);
            Ok(())
        }
        Command::Moods(command) => {
            let ctx = context(config)?;
            let moods = MoodCollection::new(ctx.clone()).await;
            run_moods(command, &moods).await;
            print_toast(&ctx.notifier);
            Ok(())
        }
        Command::Tasks(command) => {
            let ctx = context(config)?;
            let tasks = TaskCollection::new(ctx.clone()).await;
            run_tasks(command, &tasks).await;
            print_toast(&ctx.notifier);
            Ok(())
        }
    }
}

fn context(config: &AppConfig) -> Result<TrackerContext> {
    let auth = match &config.token {
        Some(token) => AuthSession::with_token(token.clone()),
        None => {
            tracing::info!("no token configured, running logged out");
            AuthSession::new()
        }
    };
    Ok(TrackerContext::new(&config.base_url, auth, Notifier::new())?)
}

fn budget_store(config: &AppConfig) -> Result<BudgetStore> {
    let storage = JsonFileStore::open(&config.state_path)?;
    Ok(BudgetStore::new(Arc::new(storage)))
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn this_month() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

async fn run_expenses(
    command: ExpenseCommand,
    expenses: &ExpenseCollection,
    config: &AppConfig,
) -> Result<()> {
    match command {
        ExpenseCommand::List(PeriodArgs { date, month }) => {
            let records = match (date, month) {
                (Some(date), _) => expenses.by_date(&date),
                (None, Some(month)) => expenses.by_month(&month),
                (None, None) => expenses.records(),
            };
            records.iter().for_each(print_expense);
        }
        ExpenseCommand::Add {
            amount,
            description,
            date,
        } => {
            expenses
                .add(ExpenseDraft {
                    date: date.unwrap_or_else(today),
                    amount,
                    description,
                })
                .await;
            expenses.records().iter().for_each(print_expense);
        }
        ExpenseCommand::Edit {
            id,
            date,
            amount,
            description,
        } => {
            expenses
                .update(
                    &id,
                    ExpenseChanges {
                        date,
                        amount,
                        description,
                    },
                )
                .await;
            expenses.records().iter().for_each(print_expense);
        }
        ExpenseCommand::Delete { id } => {
            expenses.remove(&id).await;
            expenses.records().iter().for_each(print_expense);
        }
        ExpenseCommand::Total(PeriodArgs { date, month }) => {
            let budgets = budget_store(config)?;
            let (label, total, budget) = match (date, month) {
                (_, Some(month)) => (
                    month.clone(),
                    expenses.total_by_month(&month),
                    budgets.get_monthly(&month),
                ),
                (date, None) => {
                    let date = date.unwrap_or_else(today);
                    (
                        date.clone(),
                        expenses.total_by_date(&date),
                        budgets.get_daily(&date),
                    )
                }
            };
            println!("{label}: spent {total:.2} of {budget:.2}");
        }
    }
    Ok(())
}

async fn run_moods(command: MoodCommand, moods: &MoodCollection) {
    match command {
        MoodCommand::List => {
            for (date, value) in moods.moods() {
                println!("{date}  {value}");
            }
        }
        MoodCommand::Get { date } => {
            let date = date.unwrap_or_else(today);
            match moods.get_mood(&date) {
                Some(value) => println!("{date}  {value}"),
                None => println!("{date}  -"),
            }
        }
        MoodCommand::Set { value, date } => {
            let date = date.unwrap_or_else(today);
            moods.set_mood(&date, parse_mood(&value)).await;
            if let Some(value) = moods.get_mood(&date) {
                println!("{date}  {value}");
            }
        }
    }
}

fn parse_mood(raw: &str) -> MoodValue {
    match raw.trim().parse::<f64>() {
        Ok(score) => MoodValue::Score(score),
        Err(_) => MoodValue::Label(raw.trim().to_string()),
    }
}

async fn run_tasks(command: TaskCommand, tasks: &TaskCollection) {
    match command {
        TaskCommand::List { date } => {
            let records = match date {
                Some(date) => tasks.for_date(&date),
                None => tasks.records(),
            };
            records.iter().for_each(print_task);
            return;
        }
        TaskCommand::Add { title, date } => {
            tasks
                .add(TaskNew {
                    title,
                    date: date.unwrap_or_else(today),
                    completed: false,
                    order: None,
                })
                .await;
        }
        TaskCommand::Edit { id, title, date } => {
            tasks
                .update(
                    &id,
                    TaskUpdate {
                        title,
                        date,
                        ..Default::default()
                    },
                )
                .await;
        }
        TaskCommand::Toggle { id } => tasks.toggle_completion(&id).await,
        TaskCommand::Delete { id } => tasks.remove(&id).await,
    }
    tasks.records().iter().for_each(print_task);
}

fn run_budget(command: BudgetCommand, budgets: &BudgetStore) -> Result<()> {
    match command {
        BudgetCommand::SetDaily { amount, date } => {
            let date = date.unwrap_or_else(today);
            budgets.set_daily(&date, amount)?;
            println!("daily budget for {date}: {amount:.2}");
        }
        BudgetCommand::Daily { date } => {
            let date = date.unwrap_or_else(today);
            println!("{date}: {:.2}", budgets.get_daily(&date));
        }
        BudgetCommand::SetMonthly { amount, month } => {
            let month = month.unwrap_or_else(this_month);
            budgets.set_monthly(&month, amount)?;
            println!("monthly budget for {month}: {amount:.2}");
        }
        BudgetCommand::Monthly { month } => {
            let month = month.unwrap_or_else(this_month);
            println!("{month}: {:.2}", budgets.get_monthly(&month));
        }
        BudgetCommand::List => {
            for period in [BudgetPeriod::Daily, BudgetPeriod::Monthly] {
                for (key, amount) in budgets.explicit_budgets(period) {
                    println!("{key}  {amount:.2}");
                }
            }
        }
    }
    Ok(())
}

fn print_expense(expense: &Expense) {
    println!(
        "{:<26} {} {:>10.2}  {}",
        expense.ids.canonical().unwrap_or("-"),
        expense.date,
        expense.amount,
        expense.description
    );
}

fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    println!(
        "[{mark}] {:<26} {} {}",
        task.ids.canonical().unwrap_or("-"),
        task.date,
        task.title
    );
}

fn print_toast(notifier: &Notifier) {
    if let Some(toast) = notifier.current() {
        println!("[{}] {}", toast.level.as_str(), toast.message);
    }
}
