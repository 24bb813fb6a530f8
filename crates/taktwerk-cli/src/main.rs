//! Demo driver for the taktwerk core: builds an engine, registers the
//! processors, and feeds it a scripted event sequence. The core itself never
//! reads a clock; every timestamp below is supplied by this binary.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use taktwerk_core::event::{
    ActionCompletedEvent, SetTimeAlarm, TimeEvent, WorkInstructionEvent, WorkInstructionStatus,
    WorkQueueMessage, WorkQueueStatus,
};
use taktwerk_core::{
    Engine, Event, EventProcessingEngine, EventPropagatingEngine, ScheduleRunnerProcessor,
    SideEffect, TimeAlarmProcessor, WorkQueueProcessor,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "taktwerk",
    about = "Deterministic takt-scheduling engine — scripted demo scenarios",
    version
)]
struct Cli {
    /// Print produced side effects as JSON lines
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Declare instructions, activate a queue, and run the action cascade
    WorkQueue,
    /// Set a time alarm and tick past it
    Alarm,
    /// Process a few events, then unwind the whole history stack
    StepBack,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::WorkQueue => run_work_queue_demo(cli.json),
        Commands::Alarm => run_alarm_demo(cli.json),
        Commands::StepBack => run_step_back_demo(cli.json),
    }
}

fn report(effects: &[SideEffect], json: bool) -> Result<()> {
    for effect in effects {
        if json {
            println!("{}", serde_json::to_string(effect)?);
        } else {
            println!("-> {effect}");
        }
    }
    Ok(())
}

fn instruction(
    id: &str,
    queue: &str,
    che: &str,
    move_time: DateTime<Utc>,
) -> Event {
    Event::WorkInstruction(WorkInstructionEvent {
        work_instruction_id: id.to_string(),
        work_queue_id: queue.to_string(),
        fetch_che: che.to_string(),
        status: WorkInstructionStatus::Pending,
        estimated_move_time: Some(move_time),
    })
}

fn run_work_queue_demo(json: bool) -> Result<()> {
    tracing::info!("work queue demo");
    let mut engine = EventPropagatingEngine::new(EventProcessingEngine::new());
    engine.register(Box::new(WorkQueueProcessor::new()));
    engine.register(Box::new(ScheduleRunnerProcessor::new()));

    let now = Utc::now();
    let move_time = now + Duration::seconds(10);
    let queue = "WQ-001";

    report(
        &engine.process_event(&instruction("WI-001", queue, "RTG-01", move_time)),
        json,
    )?;
    report(
        &engine.process_event(&instruction(
            "WI-002",
            queue,
            "RTG-02",
            move_time + Duration::seconds(5),
        )),
        json,
    )?;

    // Activation generates the takts; propagation hands them to the runner.
    let activated = engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
        queue,
        WorkQueueStatus::Active,
    )));
    report(&activated, json)?;

    // Tick at the move time: both chain heads activate.
    let started = engine.process_event(&Event::Time(TimeEvent::new(move_time)));
    report(&started, json)?;

    // Complete the first activated action and watch the cascade.
    if let Some(SideEffect::ActionActivated(first)) = started.first() {
        let cascaded = engine.process_event(&Event::ActionCompleted(ActionCompletedEvent {
            action_id: first.action_id,
            work_queue_id: queue.to_string(),
        }));
        report(&cascaded, json)?;
    }

    Ok(())
}

fn run_alarm_demo(json: bool) -> Result<()> {
    tracing::info!("time alarm demo");
    let mut engine = EventProcessingEngine::new();
    engine.register(Box::new(TimeAlarmProcessor::new()));

    let now = Utc::now();
    report(
        &engine.process_event(&Event::Time(TimeEvent::new(now))),
        json,
    )?;
    report(
        &engine.process_event(&Event::SetTimeAlarm(SetTimeAlarm {
            alarm_name: "alarm a".to_string(),
            trigger_time: now + Duration::seconds(15),
        })),
        json,
    )?;
    report(
        &engine.process_event(&Event::Time(TimeEvent::new(now + Duration::seconds(20)))),
        json,
    )?;

    Ok(())
}

fn run_step_back_demo(json: bool) -> Result<()> {
    tracing::info!("step-back demo");
    let mut engine = EventProcessingEngine::new();
    engine.register(Box::new(WorkQueueProcessor::new()));
    engine.register(Box::new(TimeAlarmProcessor::new()));

    let now = Utc::now();
    report(
        &engine.process_event(&instruction("WI-001", "WQ-001", "RTG-01", now)),
        json,
    )?;
    report(
        &engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
            "WQ-001",
            WorkQueueStatus::Active,
        ))),
        json,
    )?;

    println!("history size: {}", engine.history_size());
    while engine.step_back()? {
        println!("stepped back, history size: {}", engine.history_size());
    }

    // Back to the initial state: activating again creates an empty schedule.
    report(
        &engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
            "WQ-001",
            WorkQueueStatus::Active,
        ))),
        json,
    )?;

    Ok(())
}
