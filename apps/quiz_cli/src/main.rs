use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    judge, HttpTransport, RequestStatus, RequestStore, StoreSnapshot, SubmitOutcome,
    TopicController, View,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod render;

use command::{parse_command, Command};
use config::load_settings;
use render::{render_verdict, render_view};

const HELP: &str = "Type a topic and press Enter to get an explanation and a quiz.
Commands: /answer <question> <letter>, /help, /quit";

#[derive(Parser, Debug)]
#[command(about = "Ask the explanation service about a topic and take its quiz")]
struct Args {
    /// Base URL of the explanation service.
    #[arg(long)]
    api_url: Option<String>,
    /// Explain a single topic, print it, and exit.
    #[arg(long)]
    topic: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    let transport = HttpTransport::new(&settings.api_url)?;
    info!(endpoint = %transport.endpoint(), policy = ?settings.stale_policy, "using explanation service");

    let store = Arc::new(RequestStore::new());
    let controller = TopicController::new(Arc::clone(&store), Arc::new(transport))
        .with_stale_policy(settings.stale_policy);

    if let Some(topic) = args.topic {
        return run_once(&controller, topic).await;
    }

    store.subscribe(print_view_changes());
    run_interactive(&controller).await
}

async fn run_once(controller: &TopicController, topic: String) -> Result<()> {
    controller.store().set_draft(topic.clone());
    let outcome = controller.resolve(topic).await;
    let view = View::from_snapshot(&controller.store().snapshot());
    if let Some(text) = render_view(&view) {
        println!("{text}");
    }
    match outcome {
        SubmitOutcome::Applied(RequestStatus::Succeeded) => Ok(()),
        _ => bail!("topic request failed"),
    }
}

/// Prints the rendered view whenever it changes.
fn print_view_changes() -> impl Fn(&StoreSnapshot) + Send + Sync + 'static {
    let last = Mutex::new(View::Input);
    move |snapshot: &StoreSnapshot| {
        let view = View::from_snapshot(snapshot);
        let mut last = last.lock().unwrap_or_else(PoisonError::into_inner);
        if *last == view {
            return;
        }
        if let Some(text) = render_view(&view) {
            println!("{text}");
        }
        *last = view;
    }
}

async fn run_interactive(controller: &TopicController) -> Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Topic(text) => {
                let store = controller.store();
                store.set_draft(text);
                let draft = store.snapshot().draft;
                drop(controller.submit(draft));
            }
            Command::Answer { question, option } => {
                println!("{}", answer(&controller.store().snapshot(), question, option));
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Empty => {}
            Command::Invalid(message) => println!("{message}"),
        }
    }
    Ok(())
}

fn answer(snapshot: &StoreSnapshot, question: usize, option: usize) -> String {
    let View::Explanation(result) = View::from_snapshot(snapshot) else {
        return "There is no quiz on screen; submit a topic first.".to_string();
    };
    match result.test_cases.get(question) {
        Some(test_case) => render_verdict(&judge(test_case, option)),
        None => format!("There is no question {}.", question + 1),
    }
}
