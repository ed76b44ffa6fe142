//! InputTap agent entry point.
//!
//! Wires the observation pipeline to the platform hook backend, registers a
//! console sink that prints every canonical event, and runs until Ctrl-C.
//!
//! ```text
//! main()
//!  └─ load_config()           -- TOML config (log level, click window)
//!  └─ ObserveInputUseCase     -- translation core + console sink
//!  └─ HookBackend::start()    -- dedicated hook thread (Windows)
//!  └─ ctrl_c().await          -- block until shutdown is requested
//!  └─ HookBackend::stop()     -- drain, emit HookDisabled, tear down
//! ```
//!
//! On platforms without a native backend the agent starts the mock backend
//! instead, which only produces the lifecycle events; this keeps the demo
//! runnable everywhere while the Windows build observes real input.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tap_agent::application::observe_input::{ObserveInputUseCase, WheelSettingsSource};
use tap_agent::infrastructure::hook::HookBackend;
use tap_agent::infrastructure::storage::config::{load_config, AgentConfig};
use tap_core::clock::EpochClock;
use tap_core::domain::event::{EventKind, InputEvent, WheelScroll};

#[cfg(target_os = "windows")]
use tap_agent::infrastructure::hook::windows::WindowsHookBackend;
#[cfg(target_os = "windows")]
use tap_agent::infrastructure::system::windows::{
    WindowsKeyTranslator, WindowsModifierProbe, WindowsWheelSettings,
};

#[cfg(not(target_os = "windows"))]
use tap_agent::infrastructure::hook::mock::MockHookBackend;
#[cfg(not(target_os = "windows"))]
use tap_agent::infrastructure::system::{
    FixedModifierProbe, StaticWheelSettings, UsLayoutKeyTranslator,
};
#[cfg(not(target_os = "windows"))]
use tap_core::domain::mask::ModifierMask;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().unwrap_or_else(|e| {
        eprintln!("failed to load config, using defaults: {e}");
        AgentConfig::default()
    });

    // Initialise structured logging. Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone())),
        )
        .init();

    info!("InputTap agent starting");

    let wheel = wheel_settings(&config);

    // Report the input properties the pipeline will run with.
    let props = wheel.wheel_properties();
    info!(
        multi_click_interval_ms = config.agent.multi_click_interval_ms,
        wheel_amount = props.amount,
        wheel_block_scroll = (props.scroll == WheelScroll::Block),
        "input properties"
    );

    let mut pipeline = build_pipeline(&config, wheel);
    pipeline.set_sink(Box::new(|event: &InputEvent| {
        info!("{}", describe(event));
        // The console sink only observes; nothing is suppressed.
        false
    }));

    let backend = hook_backend();
    backend.start(Box::new(pipeline))?;

    info!("InputTap agent ready. Press Ctrl-C to exit.");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    if let Err(e) = backend.stop() {
        warn!("hook backend stop failed: {e}");
    }

    // Give the hook thread a moment to drain and emit HookDisabled.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    info!("InputTap agent stopped");
    Ok(())
}

// ── Platform wiring ───────────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
fn wheel_settings(_config: &AgentConfig) -> Arc<dyn WheelSettingsSource> {
    Arc::new(WindowsWheelSettings)
}

#[cfg(not(target_os = "windows"))]
fn wheel_settings(config: &AgentConfig) -> Arc<dyn WheelSettingsSource> {
    let scroll = if config.wheel.page_scroll {
        WheelScroll::Block
    } else {
        WheelScroll::Unit
    };
    let amount = if config.wheel.page_scroll {
        1
    } else {
        config.wheel.scroll_lines
    };
    Arc::new(StaticWheelSettings::new(scroll, amount))
}

#[cfg(target_os = "windows")]
fn build_pipeline(config: &AgentConfig, wheel: Arc<dyn WheelSettingsSource>) -> ObserveInputUseCase {
    ObserveInputUseCase::new(
        Arc::new(EpochClock),
        Arc::new(WindowsKeyTranslator),
        Arc::new(WindowsModifierProbe),
        wheel,
        config.agent.multi_click_interval_ms,
    )
}

#[cfg(not(target_os = "windows"))]
fn build_pipeline(config: &AgentConfig, wheel: Arc<dyn WheelSettingsSource>) -> ObserveInputUseCase {
    ObserveInputUseCase::new(
        Arc::new(EpochClock),
        Arc::new(UsLayoutKeyTranslator),
        Arc::new(FixedModifierProbe(ModifierMask::empty())),
        wheel,
        config.agent.multi_click_interval_ms,
    )
}

#[cfg(target_os = "windows")]
fn hook_backend() -> impl HookBackend {
    WindowsHookBackend::new()
}

#[cfg(not(target_os = "windows"))]
fn hook_backend() -> impl HookBackend {
    warn!("no native hook backend for this platform; running the mock backend");
    MockHookBackend::new()
}

// ── Console formatting ────────────────────────────────────────────────────────

fn describe(event: &InputEvent) -> String {
    let mask = event.mask.bits();
    match event.kind {
        EventKind::HookEnabled => format!("hook enabled at {}", event.time),
        EventKind::HookDisabled => format!("hook disabled at {}", event.time),
        EventKind::KeyPressed(k) => {
            format!("key pressed: {:?} (raw {:#04X}) mask={mask:#06X}", k.keycode, k.rawcode)
        }
        EventKind::KeyReleased(k) => {
            format!("key released: {:?} (raw {:#04X}) mask={mask:#06X}", k.keycode, k.rawcode)
        }
        EventKind::KeyTyped(k) => match k.keychar {
            Some(ch) => format!("key typed: {ch:?} (raw {:#04X}) mask={mask:#06X}", k.rawcode),
            None => format!("key typed: <none> (raw {:#04X})", k.rawcode),
        },
        EventKind::MousePressed(m) => format!(
            "button {} pressed {} time(s) at ({}, {})",
            m.button.as_u16(),
            m.clicks,
            m.x,
            m.y
        ),
        EventKind::MouseReleased(m) => format!(
            "button {} released {} time(s) at ({}, {})",
            m.button.as_u16(),
            m.clicks,
            m.x,
            m.y
        ),
        EventKind::MouseClicked(m) => format!(
            "button {} clicked {} time(s) at ({}, {})",
            m.button.as_u16(),
            m.clicks,
            m.x,
            m.y
        ),
        EventKind::MouseMoved(m) => format!("mouse moved to ({}, {})", m.x, m.y),
        EventKind::MouseDragged(m) => format!("mouse dragged to ({}, {})", m.x, m.y),
        EventKind::MouseWheel(w) => format!(
            "wheel rotated {} ({:?}, amount {}) at ({}, {})",
            w.rotation, w.direction, w.amount, w.x, w.y
        ),
    }
}
