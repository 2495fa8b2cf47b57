use bevy::prelude::*;
use bevy::winit::{UpdateMode, WinitSettings};
use bevy_egui::{EguiContexts, EguiPlugin, egui};
use std::time::Duration;

use carousel::*;
use rotation::Direction;
use settings::CarouselSettings;

mod carousel;
mod ring;
mod rotation;
mod settings;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Ring Carousel".into(),
                // Make it resize to the available space
                fit_canvas_to_parent: true,
                // Prevents issues with touch scrolling and back/forward gestures
                prevent_default_event_handling: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins((EguiPlugin { enable_multipass_for_primary_context: false }, RotationPlugin))
        .insert_resource(CarouselSettings::load_or_default())
        .add_systems(Startup, (setup, init_refresh_rate))
        .add_systems(Update, (keyboard_input, ui_system).before(handle_rotate_requests))
        .run();
}

fn init_refresh_rate(mut winit: ResMut<WinitSettings>) {
    winit.focused_mode = UpdateMode::reactive(Duration::from_secs_f32(1.0 / 60.0));
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    settings: Res<CarouselSettings>,
) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: settings.camera_fov_degrees.to_radians(),
            near: settings.camera_near,
            far: settings.camera_far,
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, settings.camera_distance).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let (mesh, material) = panel_assets(&mut meshes, &mut materials, &asset_server, &settings);
    spawn_carousel(&mut commands, &settings, &mesh, &material);
}

fn keyboard_input(keys: Res<ButtonInput<KeyCode>>, mut requests: EventWriter<RotateRequested>) {
    if keys.just_pressed(KeyCode::ArrowLeft) {
        requests.write(RotateRequested(Direction::Left));
    }
    if keys.just_pressed(KeyCode::ArrowRight) {
        requests.write(RotateRequested(Direction::Right));
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    mut settings: ResMut<CarouselSettings>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    carousel_query: Query<(Entity, &Carousel)>,
    panel_query: Query<&CarouselPanel>,
    mut requests: EventWriter<RotateRequested>,
) {
    let ctx = contexts.ctx_mut();
    let progress = carousel_query.iter().find_map(|(_, carousel)| carousel.progress());
    let front = carousel_query
        .iter()
        .find_map(|(_, carousel)| carousel.front_panel())
        .and_then(|panel| panel_query.get(panel).ok())
        .map(|panel| panel.index);

    egui::Window::new("Carousel")
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("◀ Left").clicked() {
                    requests.write(RotateRequested(Direction::Left));
                }
                if ui.button("Right ▶").clicked() {
                    requests.write(RotateRequested(Direction::Right));
                }
            });
            match progress {
                Some(progress) => ui.label(format!("Rotating... {:.0}%", progress * 100.0)),
                None => ui.label("Idle"),
            };
            if let Some(index) = front {
                ui.label(format!("Front panel: #{index}"));
            }

            ui.add_space(10.0);
            ui.collapsing("Settings", |ui| {
                ui.add(egui::Slider::new(&mut settings.item_count, 1..=36).text("Panels"));
                ui.add(egui::Slider::new(&mut settings.step, 1..=6).text("Step"));
                ui.add(egui::Slider::new(&mut settings.animation_secs, 0.0..=5.0).text("Duration (s)"));
                ui.add(egui::Slider::new(&mut settings.radius, 20.0..=200.0).text("Radius"));

                ui.add_space(15.0);
                if ui.button("Rebuild Carousel").clicked() {
                    info!("Rebuilding carousel");
                    for (entity, _) in &carousel_query {
                        despawn_carousel(&mut commands, entity);
                    }

                    let (mesh, material) = panel_assets(&mut meshes, &mut materials, &asset_server, &settings);
                    spawn_carousel(&mut commands, &settings, &mesh, &material);
                }
            });
        });
}
