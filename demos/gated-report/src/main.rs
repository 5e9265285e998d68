//! Scrollwrap walkthrough: one full consent session, end to end.
//!
//! Demonstrates the whole gate lifecycle against an in-memory session store:
//!
//! 1. **Mount** — the gate blocks a generated report behind the terms
//! 2. **Scroll** — progress advances, the action stays disabled
//! 3. **Acknowledge** — the box alone never enables the action
//! 4. **Reach the end** — both conditions met, the action goes live
//! 5. **Commit** — one record persisted, content revealed, surface gone
//! 6. **Re-mount** — the same session never re-prompts
//! 7. **Broken storage** — persistence fails, the reveal happens anyway

use std::sync::Arc;

use colored::Colorize;

use scrollwrap_engine::{GateEngine, GateInputs, GateTuning, SurfaceProfile};
use scrollwrap_shell::ShellFrame;
use scrollwrap_store::mocks::FaultySessionKv;
use scrollwrap_store::{AcceptanceStore, InMemorySessionKv, SessionKv};
use scrollwrap_types::{
    AckSource, DocumentRef, InteractionId, RegionHandle, ScrollMetrics, SurfaceCapabilities,
    SurfaceEvent, TermsHandle,
};

const VIEWPORT: f64 = 600.0;
const CONTENT: f64 = 2400.0;

fn header(title: &str) {
    println!();
    println!("{}", "═".repeat(72).cyan());
    println!("  {}", title.cyan().bold());
    println!("{}", "═".repeat(72).cyan());
}

fn show(label: &str, engine: &GateEngine) {
    let frame = ShellFrame::project(&engine.snapshot(), engine.branding());
    let action = if frame.action.enabled {
        "ENABLED".green().bold()
    } else {
        "disabled".red()
    };
    println!(
        "  {label:<28} phase={} progress={:>3}% overlay={:?} action={} | {}",
        engine.phase().to_string().yellow(),
        frame.progress.percent,
        frame.overlay,
        action,
        frame.helper.to_string().dimmed(),
    );
}

fn inputs(kv: Arc<dyn SessionKv>, version: &str) -> GateInputs {
    GateInputs {
        document: DocumentRef::new("quarterly-report", version),
        terms: TermsHandle::new("terms-of-service-body"),
        protected_region: RegionHandle::new("report-region"),
        branding: None,
        capabilities: SurfaceCapabilities::default(),
        tuning: GateTuning::for_surface(SurfaceProfile::Desktop),
        store: Arc::new(AcceptanceStore::new(kv)),
        probe: None,
        client_context: "demo/gated-report".to_string(),
    }
}

fn scroll_to(engine: &GateEngine, offset: f64) {
    engine.handle_event(SurfaceEvent::Scroll {
        metrics: ScrollMetrics::new(offset, VIEWPORT, CONTENT),
    });
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_target(false)
        .init();

    println!();
    println!("{}", "Scrollwrap: scroll-gated consent walkthrough".cyan().bold());

    let session: Arc<InMemorySessionKv> = Arc::new(InMemorySessionKv::new());

    header("1. Mount: the report is blocked behind the terms");
    let engine = match GateEngine::mount(inputs(session.clone(), "3.1")).await {
        Ok(engine) => engine,
        Err(error) => {
            // A missing binding is a configuration mistake; the host leaves
            // the content non-gated and fixes its mount.
            eprintln!("  mount failed: {error}");
            return;
        }
    };
    engine.handle_event(SurfaceEvent::Layout {
        metrics: ScrollMetrics::new(0.0, VIEWPORT, CONTENT),
    });
    show("freshly mounted", &engine);

    header("2. Scroll partway: progress moves, the action does not");
    scroll_to(&engine, 900.0);
    show("scrolled to 900", &engine);

    header("3. Acknowledge early: the box alone is not enough");
    engine.handle_event(SurfaceEvent::AcknowledgmentToggled {
        source: AckSource::Control,
        interaction: InteractionId::new(1),
    });
    show("box checked", &engine);

    header("4. Reach the end: both conditions met");
    scroll_to(&engine, CONTENT - VIEWPORT);
    show("scrolled to the end", &engine);

    header("5. Commit: one record, one reveal, surface torn down");
    let committed = engine.invoke_primary().await;
    println!("  commit performed: {}", committed.to_string().green().bold());
    show("after commit", &engine);
    // A second invocation is a guarded no-op.
    let again = engine.invoke_primary().await;
    println!("  second invocation committed: {}", again.to_string().red());
    drop(engine);

    header("6. Re-mount in the same session: no re-prompt");
    match GateEngine::mount(inputs(session, "3.1")).await {
        Ok(remounted) => show("remounted", &remounted),
        Err(error) => eprintln!("  mount failed: {error}"),
    }

    header("7. Broken storage: the reveal still happens");
    let broken: Arc<FaultySessionKv> = Arc::new(FaultySessionKv::unavailable());
    match GateEngine::mount(inputs(broken.clone(), "3.1")).await {
        Ok(engine) => {
            engine.handle_event(SurfaceEvent::Layout {
                metrics: ScrollMetrics::new(0.0, VIEWPORT, 480.0),
            });
            engine.handle_event(SurfaceEvent::AcknowledgmentToggled {
                source: AckSource::Control,
                interaction: InteractionId::new(2),
            });
            let committed = engine.invoke_primary().await;
            println!(
                "  commit with unavailable storage: {} (write attempts: {})",
                committed.to_string().green().bold(),
                broken.write_attempts(),
            );
            show("after fallback commit", &engine);
        }
        Err(error) => eprintln!("  mount failed: {error}"),
    }

    println!();
    println!("{}", "Walkthrough complete.".cyan().bold());
}
