use std::path::PathBuf;

use academic_muse_core::genai::render;
use academic_muse_core::storage::keys;
use academic_muse_core::{AcademicLevel, AiSettings, Config, KvStore, Prompt, TextGenClient};
use clap::Args;
use tracing::info;

#[derive(Args)]
pub struct TopicArgs {
    /// Topic to study
    #[arg(required_unless_present = "last")]
    topic: Option<String>,
    /// Academic level: bachelors, diploma, research, phd, masters, competitive
    #[arg(long, short, default_value = "bachelors")]
    level: AcademicLevel,
    /// Print without terminal styling
    #[arg(long)]
    plain: bool,
    /// Print the last generated text instead of asking again
    #[arg(long, conflicts_with = "topic")]
    last: bool,
}

#[derive(Args)]
pub struct EvaluateArgs {
    /// Your explanation of a topic
    #[arg(conflicts_with = "file")]
    text: Option<String>,
    /// Read the explanation from a file
    #[arg(long, short)]
    file: Option<PathBuf>,
    /// Print without terminal styling
    #[arg(long)]
    plain: bool,
    /// Print the last feedback instead of asking again
    #[arg(long, conflicts_with_all = ["text", "file"])]
    last: bool,
}

pub fn explain(args: TopicArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.last {
        return show_last(keys::TOPIC_EXPLANATION, args.plain);
    }
    let topic = args.topic.unwrap_or_default();
    let prompt = Prompt::topic_explanation(&topic, args.level)?;
    generate(prompt, args.plain)
}

pub fn keypoints(args: TopicArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.last {
        return show_last(keys::KEY_POINTS, args.plain);
    }
    let topic = args.topic.unwrap_or_default();
    let prompt = Prompt::key_takeaways(&topic, args.level)?;
    generate(prompt, args.plain)
}

pub fn evaluate(args: EvaluateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.last {
        return show_last(keys::UNDERSTANDING_FEEDBACK, args.plain);
    }
    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => String::new(),
    };
    let prompt = Prompt::comprehension_feedback(&text)?;
    generate(prompt, args.plain)
}

/// Send one request; store and print the text only when it succeeds.
fn generate(prompt: Prompt, plain: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let settings = AiSettings::from_env(&config.ai)?;
    let store = KvStore::open()?;

    let client = TextGenClient::new(settings);
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    eprintln!("Generating...");
    let text = rt.block_on(client.generate(&prompt))?;

    store.set(prompt.storage_key(), &text)?;
    info!(key = prompt.storage_key(), chars = text.len(), "generated text stored");
    print_text(&text, plain);
    Ok(())
}

fn show_last(key: &str, plain: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = KvStore::open()?;
    match store.get(key)? {
        Some(text) => print_text(&text, plain),
        None => eprintln!("Nothing generated yet"),
    }
    Ok(())
}

fn print_text(text: &str, plain: bool) {
    if plain {
        println!("{}", render::plain(text));
    } else {
        println!("{}", render::emphasize(text));
    }
}
