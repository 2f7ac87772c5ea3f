use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

use anyhow::{ensure, Context as _};
use colored::Colorize;
use glight_core::{
    Context, ContextConfig, Entity, FlushReport, RandomIds, TailPolicy, TypeRegistry,
    UnknownTypePolicy, UuidIds, Value,
};
use glight_log::inspect_with;
use glight_types::Record;
use serde_json::json;
use tracing::info;

use crate::cli::*;
use crate::render;

const FIRST_NAME: &str = "This is not lupus.";
const SECOND_NAME: &str = "naMmm2";
const CHILD_NAME: &str = "changedName";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Demo(args) => cmd_demo(args, config),
        Command::Inspect(args) => cmd_inspect(args, config, cli.format),
        Command::Replay(args) => cmd_replay(args, config, cli.format),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ContextConfig> {
    let mut config: ContextConfig = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ContextConfig::default(),
    };
    if cli.ignore_torn_tail {
        config.tail_policy = TailPolicy::Ignore;
    }
    Ok(config)
}

fn cmd_demo(args: DemoArgs, config: ContextConfig) -> anyhow::Result<()> {
    run_demo(&args.log, args.ids, &config)?;
    println!(
        "{} Demo complete, log at {}",
        "✓".green().bold(),
        args.log.display().to_string().bold()
    );
    Ok(())
}

fn demo_context(ids: IdScheme, config: &ContextConfig) -> Context {
    let mut registry = TypeRegistry::new();
    registry.register_entity("A").register_entity("B");
    match ids {
        IdScheme::Random => Context::with_parts(registry, RandomIds::new(), config.clone()),
        IdScheme::Uuid => Context::with_parts(registry, UuidIds, config.clone()),
    }
}

fn open_append(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("opening {} for append", path.display()))
}

fn open_read(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}

/// Three sessions over one log: build and edit a graph, reload and edit it
/// again, then reload and check the latest values won.
fn run_demo(log: &Path, ids: IdScheme, config: &ContextConfig) -> anyhow::Result<()> {
    File::create(log).with_context(|| format!("creating {}", log.display()))?;

    println!("{}", "== session 1 ==".bold());
    let ctx = demo_context(ids, config);
    let a = Entity::new("A")
        .with("name", "eName")
        .with("other", Value::Null)
        .into_ref();
    let mut hands = BTreeMap::new();
    hands.insert("left".to_string(), 1);
    let b = Entity::new("B")
        .with("name", "eName")
        .with("other", &a)
        .with("bodd", 34)
        .with("hands", Value::from(hands.clone()))
        .into_ref();
    let root = ctx.set_root(&b)?;

    // aggregates are written back whole
    hands.insert("right".to_string(), 2);
    root.set("hands", Value::from(hands))?;
    root.set("name", "naMmm")?;
    root.set("name", FIRST_NAME)?;
    print_pending(&ctx);
    print_flush(ctx.flush(open_append(log)?)?);

    let other = root.child("other")?.context("root.other is not an object")?;
    other.set("name", "rightHandObject")?;
    print_pending(&ctx);
    print_flush(ctx.flush(open_append(log)?)?);

    println!("{}", "== session 2 ==".bold());
    let ctx = demo_context(ids, config);
    let root = ctx.load(open_read(log)?)?;
    ensure!(
        root.value("name") == Some(Value::from(FIRST_NAME)),
        "root.name was not restored"
    );

    root.set("name", SECOND_NAME)?;
    print_objects(&ctx);
    print_pending(&ctx);

    root.set("other", Entity::new("A").with("name", "eName").into_ref())?;
    print_pending(&ctx);
    print_flush(ctx.flush(open_append(log)?)?);

    root.set("other", Entity::new("A").with("name", "eName").into_ref())?;
    let other = root.child("other")?.context("root.other is not an object")?;
    other.set("name", CHILD_NAME)?;
    print_pending(&ctx);
    print_flush(ctx.flush(open_append(log)?)?);
    ensure!(ctx.pending_len() == 0, "change set not empty after flush");

    println!("{}", "== stored ==".bold());
    for record in inspect_with(open_read(log)?, config.reader_options())? {
        println!("  {}", paint(&record));
    }

    println!("{}", "== session 3 ==".bold());
    let ctx = demo_context(ids, config);
    let root = ctx.load(open_read(log)?)?;
    let other = root.child("other")?.context("root.other is not an object")?;
    ensure!(
        other.value("name") == Some(Value::from(CHILD_NAME)),
        "root.other.name was not restored"
    );
    ensure!(
        root.value("name") == Some(Value::from(SECOND_NAME)),
        "root.name was not restored"
    );
    for line in render::outline(root.object()) {
        println!("  {line}");
    }
    Ok(())
}

fn print_pending(ctx: &Context) {
    println!("{} {{", "change set".cyan());
    for record in ctx.pending() {
        println!("  {}", paint(&record));
    }
    println!("}}");
}

fn print_flush(report: FlushReport) {
    println!(
        "{} flushed {} records ({} bytes)",
        "✓".green(),
        report.records.to_string().bold(),
        report.bytes
    );
}

fn print_objects(ctx: &Context) {
    println!("{}", "objects".cyan());
    for id in ctx.object_ids() {
        if let Some(object) = ctx.object(&id) {
            let type_tag = object.borrow().type_tag().to_owned();
            println!("  [{}] {}", id.to_string().yellow(), type_tag);
        }
    }
}

fn paint(record: &Record) -> String {
    match record {
        Record::Composite(c) => format!(
            "{} {} : {}",
            "composite".cyan(),
            c.id.to_string().yellow(),
            c.type_tag
        ),
        Record::Field(f) => format!(
            "{} {}.{} = {}",
            "field".blue(),
            f.parent.to_string().yellow(),
            f.attribute,
            f.value
        ),
    }
}

fn cmd_inspect(
    args: InspectArgs,
    config: ContextConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let records = inspect_with(open_read(&args.path)?, config.reader_options())?;
    match format {
        OutputFormat::Text => {
            for (index, record) in records.iter().enumerate() {
                println!("{:>5}  {}", index.to_string().dimmed(), paint(record));
            }
            println!("{} records", records.len().to_string().bold());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }
    Ok(())
}

fn cmd_replay(
    args: ReplayArgs,
    mut config: ContextConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    // no application types are registered here
    config.unknown_types = UnknownTypePolicy::Dynamic;
    let ctx = Context::with_config(TypeRegistry::new(), config);
    let root = ctx.load(open_read(&args.path)?)?;
    info!(objects = ctx.len(), path = %args.path.display(), "replayed log");

    match format {
        OutputFormat::Text => {
            for line in render::outline(root.object()) {
                println!("{line}");
            }
            if args.objects {
                print_objects(&ctx);
            }
            println!("{} {} objects restored", "✓".green().bold(), ctx.len());
        }
        OutputFormat::Json => {
            let mut doc = json!({
                "objects": ctx.len(),
                "root": render::to_json(root.object()),
            });
            if args.objects {
                let ids: Vec<String> = ctx.object_ids().iter().map(ToString::to_string).collect();
                doc["ids"] = json!(ids);
            }
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}
