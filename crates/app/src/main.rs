use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use experience::config::ExperienceConfig;

/// Config file path override.
const CONFIG_ENV: &str = "GREETING_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "assets/greeting.json";
/// Platform reduced-motion preference, read once at startup.
const REDUCED_MOTION_ENV: &str = "GREETING_REDUCED_MOTION";

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "For You".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    });

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match ExperienceConfig::load_from_path(&path) {
        Ok(config) => {
            info!("Loaded greeting config from {path}");
            config
        }
        Err(err) => {
            warn!("Greeting config {path} unusable ({err}), using defaults");
            ExperienceConfig::default()
        }
    };
    let platform_reduced = std::env::var(REDUCED_MOTION_ENV)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);

    app.insert_resource(config.motion(platform_reduced))
        .insert_resource(config)
        .add_plugins((
            experience::ExperiencePlugin,
            rendering::RenderingPlugin,
            ui::UiPlugin,
        ));

    app.run();
}
