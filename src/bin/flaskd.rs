use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use flaskcore::config::FileConfig;
use flaskcore::host::{FlaskActor, FlaskItem, LoadOrderResolver, LogFeedback, TagId, TagResolver, WidgetSink};
use flaskcore::kernel::{ActorId, FlaskCategory, MonotonicClock};
use flaskcore::FlaskRuntime;

const PLUGINS: [&str; 3] = ["Skyrim.esm", "Update.esm", "TrueFlasks.esp"];
const HEALTH_TAG: &str = "0x800~TrueFlasks.esp";
const STAMINA_TAG: &str = "0x801~TrueFlasks.esp";

struct DemoActor {
    id: ActorId,
    player: bool,
    effects: HashMap<TagId, f32>,
}

impl FlaskActor for DemoActor {
    fn id(&self) -> ActorId {
        self.id
    }

    fn is_player(&self) -> bool {
        self.player
    }

    fn is_primary(&self) -> bool {
        self.player
    }

    fn sum_active_effect_magnitudes(&self, tag: TagId) -> f32 {
        self.effects.get(&tag).copied().unwrap_or(0.0)
    }
}

struct DemoPotion {
    name: &'static str,
    tags: Vec<TagId>,
}

impl FlaskItem for DemoPotion {
    fn is_food(&self) -> bool {
        false
    }

    fn is_poison(&self) -> bool {
        false
    }

    fn has_tag(&self, tag: TagId) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Runs a scripted flask session against the tick hooks", long_about = None)]
struct Args {
    /// Path to the TOML settings file; generated when missing.
    #[clap(short, long, value_parser, default_value = "flaskd.toml")]
    config: PathBuf,

    /// Where actor state is restored from and saved to on shutdown.
    #[clap(short, long, value_parser, default_value = "flaskd.state")]
    state: PathBuf,
}

/// Logs widget frames instead of drawing them.
struct TraceWidget;

impl WidgetSink for TraceWidget {
    fn update_flask(&self, payload: &str) {
        tracing::debug!("[WIDGET] {}", payload);
    }
}

/// Writes a config whose classification tags point at the demo plugin, unless one exists.
fn ensure_demo_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        return Ok(());
    }
    let mut file = FileConfig::spelled_out();
    file.health.tag = Some(HEALTH_TAG.into());
    file.stamina.tag = Some(STAMINA_TAG.into());
    std::fs::write(path, file.render()?).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    tracing::info!("flaskd booting...");

    let Args { config: config_path, state: state_path } = Args::parse();

    ensure_demo_config(&config_path)?;
    let resolver = LoadOrderResolver::new(PLUGINS);
    let config = FileConfig::load_or_create(&config_path)
        .context("loading configuration")?
        .resolve(&resolver);

    let runtime = FlaskRuntime::new(
        config,
        Arc::new(MonotonicClock::new()),
        Arc::new(LogFeedback),
        Arc::new(TraceWidget),
    );
    runtime.api().register_glow_listener(
        1,
        Arc::new(|category: FlaskCategory| tracing::info!("[GLOW] {} gauge flashes", category)),
    );

    if state_path.exists() {
        match runtime.load_from_file(&state_path) {
            Ok(count) => tracing::info!("Restored {} actors from {}", count, state_path.display()),
            Err(e) => tracing::warn!("Ignoring saved state {}: {}", state_path.display(), e),
        }
    }

    let health = resolver.resolve_tag(HEALTH_TAG).context("health tag does not resolve")?;
    let stamina = resolver.resolve_tag(STAMINA_TAG).context("stamina tag does not resolve")?;

    let player = DemoActor { id: 0x14, player: true, effects: HashMap::new() };
    let npcs: Vec<DemoActor> = (0..2)
        .map(|i| DemoActor { id: 0x0100_0000 + i, player: false, effects: HashMap::new() })
        .collect();
    let potions = [
        DemoPotion { name: "Healing Flask", tags: vec![health] },
        DemoPotion { name: "Flask of Vigor", tags: vec![stamina] },
        DemoPotion { name: "Fortify Smithing", tags: vec![] },
    ];

    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    let mut cadence = tokio::time::interval(Duration::from_millis(100));
    cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last = Instant::now();
    let mut frame: u64 = 0;

    tracing::info!("flaskd active. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = cadence.tick() => {}
        }

        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f32();
        last = now;
        frame += 1;

        let hooks = runtime.hooks();
        hooks.on_player_update(Some(&player), delta);
        for npc in &npcs {
            hooks.on_actor_update(Some(npc), delta);
        }

        // The player reaches for a potion every 1.5 s, cycling through the belt.
        if frame % 15 == 0 {
            let potion = &potions[(frame / 15) as usize % potions.len()];
            let accepted = hooks.on_drink(Some(&player), Some(potion));
            tracing::info!("Player drinks {}: {}", potion.name, if accepted { "ok" } else { "refused" });
        }
    }

    tracing::info!("Shutting down...");
    let saved = runtime
        .save_to_file(&state_path)
        .with_context(|| format!("saving state to {}", state_path.display()))?;
    tracing::info!("Persisted {} actors", saved);
    Ok(())
}
